use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::errors::JsonApiError;
use crate::state::AppState;

/// Resolve the bearer token to a `Principal` and attach it to the request.
///
/// Missing, malformed or unverifiable tokens end the request with 401.
pub async fn require_principal(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    // owned copy: the request body is not Sync, so no borrow may cross the await
    let header = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()).map(str::to_owned);
    let principal = state.identity.authenticate(header.as_deref()).await?;
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}
