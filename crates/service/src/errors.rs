use thiserror::Error;

/// Business errors surfaced to clients. Each variant maps to one stable code.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    InvalidRange(String),
    #[error("{0}")]
    InvalidType(String),
    #[error("half-day leave must start and end on the same day")]
    HalfDayRequiresSingleDay,
    #[error("halfDayPeriod must be 'morning' or 'evening' for a half-day leave")]
    HalfDayPeriodRequired,
    #[error("selected period contains only weekends and holidays")]
    NoWorkingDays,
    #[error("only pending leaves can be changed")]
    NotPending,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        ServiceError::Internal(e.to_string())
    }
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn forbidden() -> Self { Self::Forbidden("forbidden".into()) }

    /// Stable code for the wire and for logs.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::InvalidRequest(_) => "INVALID_REQUEST",
            ServiceError::InvalidRange(_) => "INVALID_RANGE",
            ServiceError::InvalidType(_) => "INVALID_TYPE",
            ServiceError::HalfDayRequiresSingleDay => "HALF_DAY_REQUIRES_SINGLE_DAY",
            ServiceError::HalfDayPeriodRequired => "HALF_DAY_PERIOD_REQUIRED",
            ServiceError::NoWorkingDays => "NO_WORKING_DAYS",
            ServiceError::NotPending => "NOT_PENDING",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Forbidden(_) => "FORBIDDEN",
            ServiceError::Unauthorized(_) => "UNAUTHORIZED",
            ServiceError::Internal(_) => "INTERNAL",
            ServiceError::Model(models::errors::ModelError::Validation(_)) => "INVALID_REQUEST",
            ServiceError::Model(models::errors::ModelError::Db(_)) => "INTERNAL",
        }
    }

    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self.code() {
            "CONFLICT" => 409,
            "NOT_FOUND" => 404,
            "FORBIDDEN" => 403,
            "UNAUTHORIZED" => 401,
            "INTERNAL" => 500,
            _ => 400,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.status() == 500
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceError;
    use models::errors::ModelError;

    #[test]
    fn codes_map_to_statuses() {
        let cases = [
            (ServiceError::InvalidRequest("x".into()), "INVALID_REQUEST", 400),
            (ServiceError::InvalidRange("x".into()), "INVALID_RANGE", 400),
            (ServiceError::InvalidType("x".into()), "INVALID_TYPE", 400),
            (ServiceError::HalfDayRequiresSingleDay, "HALF_DAY_REQUIRES_SINGLE_DAY", 400),
            (ServiceError::HalfDayPeriodRequired, "HALF_DAY_PERIOD_REQUIRED", 400),
            (ServiceError::NoWorkingDays, "NO_WORKING_DAYS", 400),
            (ServiceError::NotPending, "NOT_PENDING", 400),
            (ServiceError::Conflict("x".into()), "CONFLICT", 409),
            (ServiceError::not_found("leave"), "NOT_FOUND", 404),
            (ServiceError::forbidden(), "FORBIDDEN", 403),
            (ServiceError::Unauthorized("x".into()), "UNAUTHORIZED", 401),
            (ServiceError::Internal("x".into()), "INTERNAL", 500),
        ];
        for (err, code, status) in cases {
            assert_eq!(err.code(), code);
            assert_eq!(err.status(), status, "{code}");
        }
    }

    #[test]
    fn model_errors_split_by_kind() {
        assert_eq!(ServiceError::from(ModelError::Validation("bad".into())).status(), 400);
        assert!(ServiceError::from(ModelError::Db("down".into())).is_internal());
        assert!(ServiceError::from(sea_orm::DbErr::Custom("x".into())).is_internal());
    }
}
