use axum::{extract::State, http::StatusCode, Extension, Json};
use service::identity::Principal;
use service::resources::{ResourceInput, ResourceView};
use uuid::Uuid;

use crate::errors::{ApiJson, ApiPath, JsonApiError};
use crate::routes::{envelope, Envelope};
use crate::state::AppState;

#[utoipa::path(get, path = "/api/resources", tag = "resources", security(("bearer" = [])), responses((status = 200, description = "Resources by name", body = [crate::openapi::ResourceDoc])))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Envelope<Vec<ResourceView>>>, JsonApiError> {
    Ok(envelope(state.resources.list().await?))
}

#[utoipa::path(post, path = "/api/resources", tag = "resources", security(("bearer" = [])), request_body = crate::openapi::ResourceInputDoc, responses((status = 201, description = "Created", body = crate::openapi::ResourceDoc), (status = 400, description = "Invalid"), (status = 403, description = "Forbidden")))]
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<ResourceInput>,
) -> Result<(StatusCode, Json<Envelope<ResourceView>>), JsonApiError> {
    let created = state.resources.create(&principal, input).await?;
    Ok((StatusCode::CREATED, envelope(created)))
}

#[utoipa::path(put, path = "/api/resources/{id}", tag = "resources", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Resource ID")), request_body = crate::openapi::ResourceInputDoc, responses((status = 200, description = "Updated", body = crate::openapi::ResourceDoc), (status = 403, description = "Forbidden"), (status = 404, description = "Not found")))]
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ResourceInput>,
) -> Result<Json<Envelope<ResourceView>>, JsonApiError> {
    Ok(envelope(state.resources.update(&principal, id, input).await?))
}

#[utoipa::path(delete, path = "/api/resources/{id}", tag = "resources", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Resource ID")), responses((status = 200, description = "Deleted with its bookings"), (status = 403, description = "Forbidden"), (status = 404, description = "Not found")))]
pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Envelope<bool>>, JsonApiError> {
    state.resources.delete(&principal, id).await?;
    Ok(envelope(true))
}
