use std::fmt;
use thiserror::Error;

use crate::services::ApiError;

/// The error type surfaced by request handlers.
///
/// Vendor failures are mostly absorbed where they happen. Whatever does reach
/// the caller goes through this enum so the HTTP status is decided in one place.
#[derive(Error, Debug)]
pub enum ElementsError {
    /// Request data (query or body JSON) could not be decoded.
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// A setting is missing or unusable, e.g. an unknown display time zone.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Well-formed input that cannot be acted on: unknown contact, empty slot.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Cronofy failed or refused the call.
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for ElementsError {
    fn status_code(&self) -> u16 {
        match self {
            ElementsError::ParseError(_) => 400,
            ElementsError::ConfigError(_) => 500,
            ElementsError::ValidationError(_) => 400,
            ElementsError::ExternalServiceError { .. } => 502,
            ElementsError::RenderError(_) => 500,
            ElementsError::InternalError(_) => 500,
        }
    }
}

impl From<ApiError> for ElementsError {
    fn from(err: ApiError) -> Self {
        external_service_error("cronofy", err)
    }
}

impl From<serde_json::Error> for ElementsError {
    fn from(err: serde_json::Error) -> Self {
        ElementsError::ParseError(err.to_string())
    }
}

pub fn config_error<T: fmt::Display>(message: T) -> ElementsError {
    ElementsError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> ElementsError {
    ElementsError::ValidationError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> ElementsError {
    ElementsError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> ElementsError {
    ElementsError::InternalError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(validation_error("bad slot").status_code(), 400);
        assert_eq!(config_error("bad zone").status_code(), 500);
        assert_eq!(internal_error("no urls").status_code(), 500);
        assert_eq!(
            ElementsError::from(ApiError::NoCalendar).status_code(),
            502
        );
    }

    #[test]
    fn api_errors_keep_their_message() {
        let err = ElementsError::from(ApiError::Http("connection refused".to_string()));
        assert_eq!(
            err.to_string(),
            "External service error: cronofy - HTTP request failed: connection refused"
        );
    }
}
