use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use service::calendar::parse_date;
use service::holidays::Holiday;
use service::identity::Principal;

use crate::errors::{ApiJson, ApiPath, ApiQuery, JsonApiError};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HolidayInput {
    pub date: String,
    pub name: String,
}

/// All holidays, or those in `[start, end]` when both bounds are given.
#[utoipa::path(get, path = "/api/holidays", tag = "holidays", security(("bearer" = [])), params(("start" = Option<String>, Query, description = "First day, YYYY-MM-DD"), ("end" = Option<String>, Query, description = "Last day, YYYY-MM-DD")), responses((status = 200, description = "Holidays by date", body = [crate::openapi::HolidayDoc])))]
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<RangeQuery>,
) -> Result<Json<Vec<Holiday>>, JsonApiError> {
    let found = match (q.start.as_deref(), q.end.as_deref()) {
        (Some(start), Some(end)) => {
            state.holidays.in_range(parse_date("start", start)?, parse_date("end", end)?).await?
        }
        _ => state.holidays.all().await?,
    };
    Ok(Json(found))
}

#[utoipa::path(post, path = "/api/holidays", tag = "holidays", security(("bearer" = [])), request_body = crate::openapi::HolidayInputDoc, responses((status = 200, description = "Saved", body = crate::openapi::HolidayDoc), (status = 403, description = "Forbidden")))]
pub async fn upsert(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<HolidayInput>,
) -> Result<Json<Holiday>, JsonApiError> {
    principal.require_admin()?;
    let date = parse_date("date", &input.date)?;
    if input.name.trim().is_empty() {
        return Err(service::errors::ServiceError::InvalidRequest("holiday name required".into()).into());
    }
    Ok(Json(state.holidays.upsert(date, input.name.trim()).await?))
}

#[utoipa::path(delete, path = "/api/holidays/{date}", tag = "holidays", security(("bearer" = [])), params(("date" = String, Path, description = "Holiday date, YYYY-MM-DD")), responses((status = 204, description = "Removed"), (status = 403, description = "Forbidden"), (status = 404, description = "Not found")))]
pub async fn remove(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(date): ApiPath<String>,
) -> Result<StatusCode, JsonApiError> {
    principal.require_admin()?;
    state.holidays.remove(parse_date("date", &date)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
