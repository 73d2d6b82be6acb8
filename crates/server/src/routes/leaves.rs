use axum::{extract::State, http::StatusCode, Extension, Json};
use service::identity::Principal;
use service::leave::domain::{LeaveDayView, LeaveView};
use service::leave::service::{CreateLeaveInput, EditLeaveInput, LeaveStatusInput};
use uuid::Uuid;

use crate::errors::{ApiJson, ApiPath, JsonApiError};
use crate::state::AppState;

#[utoipa::path(post, path = "/api/leaves", tag = "leaves", security(("bearer" = [])), request_body = crate::openapi::CreateLeaveDoc, responses((status = 201, description = "Pending leave with its days", body = crate::openapi::LeaveDoc), (status = 400, description = "INVALID_RANGE, INVALID_TYPE, NO_WORKING_DAYS or a half-day error")))]
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<CreateLeaveInput>,
) -> Result<(StatusCode, Json<LeaveView>), JsonApiError> {
    let created = state.leaves.create(&principal, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Admins see every leave with the owner's email; users see their own. Newest first.
#[utoipa::path(get, path = "/api/leaves", tag = "leaves", security(("bearer" = [])), responses((status = 200, description = "Leaves with days", body = [crate::openapi::LeaveDoc])))]
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<LeaveView>>, JsonApiError> {
    Ok(Json(state.leaves.list(&principal).await?))
}

#[utoipa::path(get, path = "/api/leaves/{id}", tag = "leaves", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Leave ID")), responses((status = 200, description = "Leave", body = crate::openapi::LeaveDoc), (status = 403, description = "Forbidden"), (status = 404, description = "Not found")))]
pub async fn get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<LeaveView>, JsonApiError> {
    Ok(Json(state.leaves.get(&principal, id).await?))
}

#[utoipa::path(get, path = "/api/leaves/{id}/days", tag = "leaves", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Leave ID")), responses((status = 200, description = "Days in date order", body = [crate::openapi::LeaveDayDoc]), (status = 403, description = "Forbidden"), (status = 404, description = "Not found")))]
pub async fn days(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<LeaveDayView>>, JsonApiError> {
    Ok(Json(state.leaves.days(&principal, id).await?))
}

/// Replace the dates of a pending leave and re-derive its days atomically.
#[utoipa::path(patch, path = "/api/leaves/{id}", tag = "leaves", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Leave ID")), request_body = crate::openapi::EditLeaveDoc, responses((status = 200, description = "Edited leave", body = crate::openapi::LeaveDoc), (status = 400, description = "NOT_PENDING, NO_WORKING_DAYS, INVALID_RANGE"), (status = 403, description = "Forbidden"), (status = 409, description = "Half-day on a multi-day range")))]
pub async fn edit(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<EditLeaveInput>,
) -> Result<Json<LeaveView>, JsonApiError> {
    Ok(Json(state.leaves.edit(&principal, id, input).await?))
}

#[utoipa::path(put, path = "/api/leaves/{id}", tag = "leaves", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Leave ID")), request_body = crate::openapi::LeaveStatusDoc, responses((status = 200, description = "Updated", body = crate::openapi::LeaveDoc), (status = 400, description = "Unknown status"), (status = 403, description = "Forbidden"), (status = 404, description = "Not found")))]
pub async fn set_status(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<LeaveStatusInput>,
) -> Result<Json<LeaveView>, JsonApiError> {
    Ok(Json(state.leaves.set_status(&principal, id, input).await?))
}

#[utoipa::path(delete, path = "/api/leaves/{id}", tag = "leaves", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Leave ID")), responses((status = 204, description = "Deleted"), (status = 403, description = "Not the owner or not pending"), (status = 404, description = "Not found")))]
pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    state.leaves.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
