//! Error types for the admin API client.
//!
//! # Design
//! `Validation` is raised locally before any request leaves the process.
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status"; it is also produced when a custom-id lookup comes back empty.
//! All other non-2xx responses land in `Http` with the status code and the
//! server's message.

use thiserror::Error;

/// Errors returned by the admin client and the resource services.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required identifier was missing; no request was sent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The server returned 404, or a filtered lookup matched nothing.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The transport could not complete the round trip.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The caller's cancellation token fired.
    #[error("operation cancelled")]
    Cancelled,

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// A configuration value was missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status carried by remote errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_reports_404() {
        assert_eq!(ApiError::NotFound.status(), Some(404));
        assert!(ApiError::NotFound.is_not_found());
    }

    #[test]
    fn local_errors_have_no_status() {
        assert_eq!(ApiError::Validation("id".into()).status(), None);
        assert_eq!(ApiError::Cancelled.status(), None);
    }

    #[test]
    fn http_error_display_includes_message() {
        let err = ApiError::Http {
            status: 409,
            message: "UNIQUE violation".to_string(),
        };
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.to_string(), "HTTP 409: UNIQUE violation");
    }
}
