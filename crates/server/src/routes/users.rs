use axum::{extract::State, http::StatusCode, Extension, Json};
use service::identity::Principal;
use service::users::{AllowancesInput, RoleInput};
use uuid::Uuid;

use crate::errors::{ApiJson, ApiPath, JsonApiError};
use crate::state::AppState;

#[utoipa::path(get, path = "/api/me", tag = "users", security(("bearer" = [])), responses((status = 200, description = "Caller", body = crate::openapi::UserDoc), (status = 401, description = "Unauthorized")))]
pub async fn me(State(state): State<AppState>, Extension(principal): Extension<Principal>) -> Json<models::user::Model> {
    Json(state.users.me(&principal))
}

#[utoipa::path(get, path = "/api/users", tag = "users", security(("bearer" = [])), responses((status = 200, description = "All users", body = [crate::openapi::UserDoc]), (status = 403, description = "Forbidden")))]
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<models::user::Model>>, JsonApiError> {
    Ok(Json(state.users.list(&principal).await?))
}

#[utoipa::path(put, path = "/api/users/{id}/role", tag = "users", security(("bearer" = [])), params(("id" = Uuid, Path, description = "User ID")), request_body = crate::openapi::RoleDoc, responses((status = 200, description = "Updated", body = crate::openapi::UserDoc), (status = 400, description = "Unknown role"), (status = 403, description = "Forbidden"), (status = 404, description = "Not found")))]
pub async fn set_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<RoleInput>,
) -> Result<Json<models::user::Model>, JsonApiError> {
    Ok(Json(state.users.set_role(&principal, id, input).await?))
}

#[utoipa::path(put, path = "/api/admin/allowances", tag = "users", security(("bearer" = [])), request_body = crate::openapi::AllowancesDoc, responses((status = 204, description = "Applied to every user"), (status = 400, description = "Negative value"), (status = 403, description = "Forbidden")))]
pub async fn set_allowances(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<AllowancesInput>,
) -> Result<StatusCode, JsonApiError> {
    state.users.set_allowances(&principal, input).await?;
    Ok(StatusCode::NO_CONTENT)
}
