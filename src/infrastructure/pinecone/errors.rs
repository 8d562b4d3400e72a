use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::errors::PipelineError;
use crate::infrastructure::http::Transient;
use crate::infrastructure::logging::scrub_secrets;

/// Errors that can occur when calling the Pinecone API
#[derive(Error, Debug)]
pub enum PineconeError {
    /// Invalid request parameters (HTTP 400, 422)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid or missing API key (HTTP 401)
    #[error("Invalid API key - authentication failed")]
    Unauthorized,

    /// Forbidden, e.g. project quota reached (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unknown index or host (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists (HTTP 409)
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded - too many requests")]
    RateLimitExceeded,

    /// Server error (HTTP 5xx)
    #[error("Server error ({0}): {1}")]
    ServerError(StatusCode, String),

    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(#[source] reqwest::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Response body did not match the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Unknown or unexpected error
    #[error("Unknown error ({0}): {1}")]
    UnknownError(StatusCode, String),
}

impl PineconeError {
    /// Classify a non-success response
    ///
    /// Control-plane errors nest the message under `error.message`, data-plane
    /// errors put it at the top level; both shapes are understood.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = scrub_secrets(&extract_message(body));

        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::InvalidRequest(message)
            }
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::CONFLICT => Self::AlreadyExists(message),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimitExceeded,
            status if status.is_server_error() => Self::ServerError(status, message),
            status => Self::UnknownError(status, message),
        }
    }
}

fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("message"))
                .and_then(serde_json::Value::as_str)
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

impl Transient for PineconeError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded | Self::ServerError(_, _) | Self::Timeout | Self::NetworkError(_)
        )
    }
}

impl From<reqwest::Error> for PineconeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::NetworkError(err)
        }
    }
}

impl From<PineconeError> for PipelineError {
    fn from(err: PineconeError) -> Self {
        Self::Index(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_plane_error_shape() {
        let body = r#"{"error": {"code": "ALREADY_EXISTS", "message": "Resource gsu-chatbot already exists"}, "status": 409}"#;
        let err = PineconeError::from_status(StatusCode::CONFLICT, body);
        match err {
            PineconeError::AlreadyExists(msg) => assert_eq!(msg, "Resource gsu-chatbot already exists"),
            other => panic!("Expected AlreadyExists, got {other:?}"),
        }
    }

    #[test]
    fn test_data_plane_error_shape() {
        let body = r#"{"code": 3, "message": "Vector dimension 3 does not match the dimension of the index 1536", "details": []}"#;
        let err = PineconeError::from_status(StatusCode::BAD_REQUEST, body);
        assert!(err.to_string().contains("does not match the dimension"));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_transient_classification() {
        assert!(PineconeError::RateLimitExceeded.is_transient());
        assert!(PineconeError::from_status(StatusCode::SERVICE_UNAVAILABLE, "busy").is_transient());
        assert!(!PineconeError::Unauthorized.is_transient());
        assert!(!PineconeError::from_status(StatusCode::NOT_FOUND, "missing").is_transient());
    }

    #[test]
    fn test_converts_to_index_error() {
        let err: PipelineError = PineconeError::Unauthorized.into();
        assert!(matches!(err, PipelineError::Index(_)));
    }
}
