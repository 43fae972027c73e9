use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::{ApiResponse, FieldError};
use service::auth::errors::AuthError;
use service::errors::ServiceError;
use tracing::{error, warn};

/// Every failed request leaves the server as this envelope.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
    pub errors: Vec<FieldError>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), errors: Vec::new() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, message) }

    pub fn unauthorized(message: impl Into<String>) -> Self { Self::new(StatusCode::UNAUTHORIZED, message) }

    pub fn not_found(message: impl Into<String>) -> Self { Self::new(StatusCode::NOT_FOUND, message) }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: "Validation failed".into(), errors }
    }

    /// Logs the cause and hides it from the client.
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        error!(error = %cause, "internal server error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()>::failure(self.message, self.errors);
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => Self::validation(errors),
            ServiceError::BadRequest(msg) => Self::bad_request(msg),
            ServiceError::NotFound(msg) => Self::not_found(msg),
            ServiceError::Forbidden(msg) => Self::new(StatusCode::FORBIDDEN, msg),
            ServiceError::Conflict(msg) => Self::new(StatusCode::CONFLICT, msg),
            other @ (ServiceError::Db(_) | ServiceError::Model(_)) => Self::internal(other),
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(errors) => Self::validation(errors),
            AuthError::BadRequest(msg) => Self::bad_request(msg),
            AuthError::Conflict(msg) => Self::new(StatusCode::CONFLICT, msg),
            AuthError::NotFound => Self::not_found("User not found"),
            AuthError::Unauthorized(msg) | AuthError::InvalidToken(msg) => {
                warn!(reason = %msg, "request not authenticated");
                Self::unauthorized(msg)
            }
            AuthError::TokenExpired => Self::unauthorized(AuthError::TokenExpired.to_string()),
            other => {
                error!(code = other.code(), "auth failure");
                Self::internal(other)
            }
        }
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for JsonApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<MultipartError> for JsonApiError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}
