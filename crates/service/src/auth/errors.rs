use common::types::FieldError;
use thiserror::Error;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    /// Request-level rejection that is not tied to one input field.
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("user not found")]
    NotFound,
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    InvalidToken(String),
    #[error("Token has expired")]
    TokenExpired,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::BadRequest(_) => 1005,
            AuthError::Conflict(_) => 1002,
            AuthError::NotFound => 1003,
            AuthError::Unauthorized(_) => 1004,
            AuthError::InvalidToken(_) => 1006,
            AuthError::TokenExpired => 1007,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::Repository(_) => 1200,
        }
    }

    pub fn invalid_credentials() -> Self {
        AuthError::Unauthorized("Invalid email or password".into())
    }
}

impl From<models::errors::ModelError> for AuthError {
    fn from(err: models::errors::ModelError) -> Self {
        use models::errors::ModelError;
        match err {
            ModelError::Conflict(msg) => AuthError::Conflict(msg),
            ModelError::Validation(msg) => AuthError::BadRequest(msg),
            ModelError::Db(msg) => AuthError::Repository(msg),
        }
    }
}
