pub mod bookings;
pub mod holidays;
pub mod leaves;
pub mod resources;
pub mod users;

use axum::{
    extract::State,
    http::header::CONTENT_TYPE,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::errors::ServiceError;
use service::metrics::{encode_metrics, DB_POOL_SWAPS};

use crate::auth::require_principal;
use crate::errors::JsonApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// `{"success": true, "data": …}` used by the booking-side routes.
#[derive(Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

pub fn envelope<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope { success: true, data })
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[utoipa::path(get, path = "/metrics", tag = "health", responses((status = 200, description = "Prometheus text exposition")))]
pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, JsonApiError> {
    DB_POOL_SWAPS.set(state.pool.swap_count() as i64);
    let text = encode_metrics().map_err(|e| ServiceError::Internal(e.to_string()))?;
    Ok(([(CONTENT_TYPE, prometheus::TEXT_FORMAT)], text))
}

/// Build the full application router: public health, metrics and docs, and
/// the bearer-protected `/api` routes.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    let api = Router::new()
        .route("/api/me", get(users::me))
        .route("/api/users", get(users::list))
        .route("/api/users/:id/role", put(users::set_role))
        .route("/api/admin/allowances", put(users::set_allowances))
        .route("/api/holidays", get(holidays::list).post(holidays::upsert))
        .route("/api/holidays/:date", axum::routing::delete(holidays::remove))
        .route("/api/leaves", get(leaves::list).post(leaves::create))
        .route(
            "/api/leaves/:id",
            get(leaves::get).put(leaves::set_status).patch(leaves::edit).delete(leaves::delete),
        )
        .route("/api/leaves/:id/days", get(leaves::days))
        .route("/api/resources", get(resources::list).post(resources::create))
        .route("/api/resources/:id", put(resources::update).delete(resources::delete))
        .route("/api/bookings", get(bookings::list).post(bookings::create))
        .route("/api/bookings/:id", axum::routing::delete(bookings::cancel))
        .route("/api/bookings/:id/reschedule", post(bookings::reschedule))
        .route("/api/bookings/:id/process", post(bookings::process))
        .route("/api/stats", get(bookings::stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_principal));

    public
        .merge(api)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
