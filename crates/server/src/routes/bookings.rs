use axum::{extract::State, http::StatusCode, Extension, Json};
use service::booking::domain::BookingView;
use service::booking::service::{CreateBookingInput, ProcessInput, RescheduleInput};
use service::booking::stats::ResourceUsage;
use service::identity::Principal;
use uuid::Uuid;

use crate::errors::{ApiJson, ApiPath, JsonApiError};
use crate::routes::{envelope, Envelope};
use crate::state::AppState;

type Enveloped<T> = Json<Envelope<T>>;

/// Admit a booking; the slot is checked under the resource's row lock.
#[utoipa::path(post, path = "/api/bookings", tag = "bookings", security(("bearer" = [])), request_body = crate::openapi::CreateBookingDoc, responses((status = 201, description = "Admitted", body = crate::openapi::BookingDoc), (status = 400, description = "INVALID_RANGE or inactive resource"), (status = 404, description = "Unknown resource"), (status = 409, description = "Overlaps an active booking")))]
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<CreateBookingInput>,
) -> Result<(StatusCode, Enveloped<BookingView>), JsonApiError> {
    let created = state.bookings.create(&principal, input).await?;
    Ok((StatusCode::CREATED, envelope(created)))
}

#[utoipa::path(get, path = "/api/bookings", tag = "bookings", security(("bearer" = [])), responses((status = 200, description = "Bookings by start", body = [crate::openapi::BookingDoc])))]
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Enveloped<Vec<BookingView>>, JsonApiError> {
    Ok(envelope(state.bookings.list(&principal).await?))
}

#[utoipa::path(post, path = "/api/bookings/{id}/reschedule", tag = "bookings", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Booking ID")), request_body = crate::openapi::RescheduleDoc, responses((status = 200, description = "Moved and proposed", body = crate::openapi::BookingDoc), (status = 403, description = "Forbidden"), (status = 409, description = "New slot taken")))]
pub async fn reschedule(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<RescheduleInput>,
) -> Result<Enveloped<BookingView>, JsonApiError> {
    Ok(envelope(state.bookings.reschedule(&principal, id, input).await?))
}

#[utoipa::path(post, path = "/api/bookings/{id}/process", tag = "bookings", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Booking ID")), request_body = crate::openapi::ProcessDoc, responses((status = 200, description = "Processed", body = crate::openapi::BookingDoc), (status = 400, description = "Not a processing outcome"), (status = 403, description = "Forbidden"), (status = 409, description = "Reactivation overlaps")))]
pub async fn process(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ProcessInput>,
) -> Result<Enveloped<BookingView>, JsonApiError> {
    Ok(envelope(state.bookings.process(&principal, id, input).await?))
}

#[utoipa::path(delete, path = "/api/bookings/{id}", tag = "bookings", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Booking ID")), responses((status = 200, description = "Cancelled", body = crate::openapi::BookingDoc), (status = 403, description = "Forbidden"), (status = 404, description = "Not found")))]
pub async fn cancel(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Enveloped<BookingView>, JsonApiError> {
    Ok(envelope(state.bookings.cancel(&principal, id).await?))
}

#[utoipa::path(get, path = "/api/stats", tag = "bookings", security(("bearer" = [])), responses((status = 200, description = "Utilisation per resource", body = [crate::openapi::ResourceUsageDoc])))]
pub async fn stats(State(state): State<AppState>) -> Result<Enveloped<Vec<ResourceUsage>>, JsonApiError> {
    let resources = state.resources.models().await?;
    Ok(envelope(state.bookings.stats(&resources).await?))
}
