use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing caller identity")]
    Unauthenticated,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PersistenceFailure(_)
            | AppError::Configuration(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to the caller. Server-side detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Unauthenticated => "caller identity is required".to_string(),
            AppError::InvalidInput(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::PersistenceFailure(_) => "failed to record ride".to_string(),
            AppError::Configuration(_) | AppError::Internal(_) => {
                "internal server error".to_string()
            }
        }
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "unauthenticated",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::PersistenceFailure(_) => "persistence_failure",
            AppError::Configuration(_) => "configuration_error",
            AppError::NotFound(_) => "not_found",
            AppError::Internal(_) => "internal",
        }
    }
}
