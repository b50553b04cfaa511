use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{ValidationError, join_errors};

/// Errors returned by [`FneClient`](super::FneClient).
///
/// `Validation` errors are raised locally and mean no request was sent.
/// The client never retries on its own; see [`ClientError::is_retryable`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The payload or the requested transition failed local checks.
    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    /// No response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded the configured deadline. The operation may still
    /// complete server-side.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered with a structured error.
    #[error("service error: {0}")]
    Service(ServiceError),

    /// 401 (session invalid) or 403 (insufficient privilege).
    #[error("authentication error (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    /// Unknown invoice reference.
    #[error("invoice '{reference}' not found")]
    NotFound { reference: String },

    /// The invoice number already exists under a different idempotency key.
    #[error("conflict: {0}")]
    Conflict(ServiceError),

    /// The response body could not be decoded.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Correlation id to quote in support tickets, when the service sent one.
    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            Self::Service(e) | Self::Conflict(e) => e.correlation_id.as_deref(),
            _ => None,
        }
    }

    /// Whether re-invoking with the same idempotency key is worthwhile.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Service(e) => e.http_status >= 500,
            _ => false,
        }
    }

    /// Message suitable for display to the end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => {
                let fields = errors
                    .iter()
                    .map(|e| format!("{} ({})", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Please correct the following fields: {fields}")
            }
            Self::Network(_) => "The certification service could not be reached.".into(),
            Self::Timeout(_) => "The certification service did not answer in time. \
                 Check the invoice status before submitting again."
                .into(),
            Self::Service(e) | Self::Conflict(e) => e.to_string(),
            Self::Auth { status: 401, .. } => "Your session has expired. Please sign in again.".into(),
            Self::Auth { .. } => "You are not allowed to perform this action.".into(),
            Self::NotFound { reference } => format!("Invoice {reference} was not found."),
            Self::Decode(_) | Self::Config(_) => self.to_string(),
        }
    }

    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(vec![ValidationError::new(field, message)])
    }
}

/// Error body returned by the certification service on any 4xx/5xx.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub http_status: u16,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

/// One field-level issue reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub issue: Option<String>,
}

impl ServiceError {
    /// Error for a response whose body is not the structured error shape.
    pub fn from_status(http_status: u16, body: &str) -> Self {
        let body = body.trim();
        Self {
            http_status,
            code: format!("HTTP_{http_status}"),
            message: if body.is_empty() {
                format!("HTTP {http_status}")
            } else {
                body.chars().take(500).collect()
            },
            ..Self::default()
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        for detail in &self.details {
            match (&detail.field, &detail.issue) {
                (Some(field), Some(issue)) => write!(f, "; {field}: {issue}")?,
                (None, Some(issue)) => write!(f, "; {issue}")?,
                (Some(field), None) => write!(f, "; {field}")?,
                (None, None) => {}
            }
        }
        if let Some(id) = &self.correlation_id {
            write!(f, " (correlation id: {id})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_deserializes_full_body() {
        let json = r#"{
            "timestamp": "2025-03-01T10:00:00Z",
            "httpStatus": 422,
            "code": "INVALID_TAX_ID",
            "message": "buyer tax id is malformed",
            "details": [{"field": "buyer.taxId", "issue": "expected CI followed by digits"}],
            "correlationId": "c0ffee"
        }"#;
        let err: ServiceError = serde_json::from_str(json).unwrap();
        assert_eq!(err.http_status, 422);
        assert_eq!(err.details.len(), 1);
        assert_eq!(
            err.to_string(),
            "INVALID_TAX_ID: buyer tax id is malformed; buyer.taxId: expected CI followed by digits (correlation id: c0ffee)"
        );
    }

    #[test]
    fn from_status_uses_body_or_status() {
        let e = ServiceError::from_status(502, "  ");
        assert_eq!(e.code, "HTTP_502");
        assert_eq!(e.message, "HTTP 502");
        let e = ServiceError::from_status(500, "upstream down");
        assert_eq!(e.message, "upstream down");
    }

    #[test]
    fn retryable_errors() {
        assert!(ClientError::Network("reset".into()).is_retryable());
        assert!(ClientError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(ClientError::Service(ServiceError::from_status(503, "")).is_retryable());
        assert!(!ClientError::Service(ServiceError::from_status(400, "")).is_retryable());
        assert!(!ClientError::Conflict(ServiceError::from_status(409, "")).is_retryable());
    }

    #[test]
    fn user_message_carries_correlation_id() {
        let err = ClientError::Service(ServiceError {
            code: "DGI_UNAVAILABLE".into(),
            message: "certification backend unavailable".into(),
            correlation_id: Some("abc-123".into()),
            ..ServiceError::default()
        });
        assert_eq!(err.correlation_id(), Some("abc-123"));
        assert!(err.user_message().contains("abc-123"));
    }
}
