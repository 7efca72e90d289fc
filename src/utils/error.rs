use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the whole API. Validation and identity errors are
/// raised before storage is touched; `Storage` wraps any persistence failure
/// unmodified (no retries).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("Authentication Required: {0}")]
    AuthenticationRequired(String),

    #[error("Invalid Identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Storage Error: {0}")]
    Storage(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match *self {
            ApiError::Validation(..) => StatusCode::BAD_REQUEST,
            ApiError::AuthenticationRequired(..) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidIdentifier(..) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(..) => StatusCode::NOT_FOUND,
            ApiError::Storage(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = json!({
            "success": false,
            "message": self.to_string(),
            "httpStatusCode": self.status_code().as_u16(),
            "error": match *self {
                ApiError::Validation(..) => "VALIDATION_ERROR",
                ApiError::AuthenticationRequired(..) => "AUTHENTICATION_REQUIRED",
                ApiError::InvalidIdentifier(..) => "INVALID_IDENTIFIER",
                ApiError::NotFound(..) => "NOT_FOUND_ERROR",
                ApiError::Storage(..) => "STORAGE_ERROR",
            },
            "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
        });

        HttpResponse::build(self.status_code()).json(error_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(
            ApiError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::AuthenticationRequired("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::InvalidIdentifier("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Storage("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn message_passes_through_unmodified() {
        let err = ApiError::NotFound("Post not found".into());
        assert_eq!(err.to_string(), "Not Found: Post not found");
    }
}
