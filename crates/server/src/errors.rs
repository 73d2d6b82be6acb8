use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

/// A service error rendered as `{"error": {"code", "message"}}`.
#[derive(Debug)]
pub struct JsonApiError(pub ServiceError);

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        JsonApiError(e)
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(r: JsonRejection) -> Self {
        JsonApiError(ServiceError::InvalidRequest(r.body_text()))
    }
}

impl From<PathRejection> for JsonApiError {
    fn from(r: PathRejection) -> Self {
        JsonApiError(ServiceError::InvalidRequest(r.body_text()))
    }
}

impl From<QueryRejection> for JsonApiError {
    fn from(r: QueryRejection) -> Self {
        JsonApiError(ServiceError::InvalidRequest(r.body_text()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = if err.is_internal() {
            error!(code = err.code(), cause = %err, "request failed");
            "internal server error".to_string()
        } else {
            if status == StatusCode::UNAUTHORIZED {
                warn!(cause = %err, "unauthorized request");
            }
            err.to_string()
        };
        let body = serde_json::json!({ "error": ErrorBody { code: err.code(), message } });
        (status, Json(body)).into_response()
    }
}

/// `Json` whose rejections use the error body above.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonApiError))]
pub struct ApiJson<T>(pub T);

/// `Path` whose rejections use the error body above.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(JsonApiError))]
pub struct ApiPath<T>(pub T);

/// `Query` whose rejections use the error body above.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(JsonApiError))]
pub struct ApiQuery<T>(pub T);

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("jwks unavailable: {0}")]
    Jwks(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
