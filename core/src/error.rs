//! Error types for the service connector.
//!
//! # Design
//! Every failure of `Connector::request` surfaces as one `ConnectorError`
//! carrying an HTTP-like status and a formatted message. Callers tell the
//! failure classes apart by the status (0 when no response was obtained)
//! and the message text. The constructors below are the only way to build
//! one, so the message layout stays identical across failure classes.
//!
//! `TransportError` is the narrower error a `Transport` or `ClientFactory`
//! reports back to the connector before classification.

use crate::http::HttpMethod;

/// The single error kind returned by `Connector::request`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ConnectorError {
    status: u16,
    message: String,
}

/// Identifies the call a `ConnectorError` describes.
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'a> {
    pub connector: &'a str,
    pub method: HttpMethod,
    pub url: &'a str,
}

impl ConnectorError {
    /// No usable response: connection refused, timeout, or a client error
    /// that may have captured a response.
    pub fn transport(site: CallSite<'_>, error: &TransportError) -> Self {
        let (status, shown_status, reason) = match &error.response {
            Some(captured) => (
                captured.status,
                captured.status.to_string(),
                captured.reason.clone(),
            ),
            None => (0, "null".to_string(), "empty response".to_string()),
        };
        Self {
            status,
            message: format!(
                "Error connecting to {} ({} request to {} returned {} ({})) ({}).",
                site.connector, site.method, site.url, shown_status, reason, error.message
            ),
        }
    }

    /// A well-formed response whose status is not 200.
    pub fn status(site: CallSite<'_>, status: u16, reason: &str) -> Self {
        Self {
            status,
            message: format!(
                "Error connecting to {} ({} request to {} returned {} ({})).",
                site.connector, site.method, site.url, status, reason
            ),
        }
    }

    /// Status 200 with nothing in the body.
    pub fn empty_body(site: CallSite<'_>, status: u16, reason: &str) -> Self {
        Self {
            status,
            message: format!(
                "Error connecting to {} ({} request to {} returned {} ({}), but resulted in empty data.).",
                site.connector, site.method, site.url, status, reason
            ),
        }
    }

    /// Status 200 with a body that is not UTF-8 text, reported only by the
    /// text-returning `Connector::request`; `request_bytes` hands it back.
    pub fn undecodable_body(site: CallSite<'_>, status: u16, reason: &str, detail: &str) -> Self {
        Self {
            status,
            message: format!(
                "Error connecting to {} ({} request to {} returned {} ({}), but the body is not valid UTF-8: {}).",
                site.connector, site.method, site.url, status, reason, detail
            ),
        }
    }

    /// A parameter realm could not be turned into request data. Raised before
    /// any network traffic, hence status 0.
    pub fn invalid_option(site: CallSite<'_>, realm: &str, detail: &str) -> Self {
        Self {
            status: 0,
            message: format!(
                "Invalid {} option for {} ({} request to {}): {}.",
                realm, site.connector, site.method, site.url, detail
            ),
        }
    }

    /// HTTP status of the failed call, 0 when no response was obtained.
    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True when no HTTP status is attached (status 0): the request was
    /// rejected before sending, the client could not be built, or the
    /// transport failed without capturing a response. A transport failure
    /// that did capture a status line reports that status instead.
    pub fn has_no_response(&self) -> bool {
        self.status == 0
    }
}

/// Status line captured from a response that the client library still
/// reported as a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedResponse {
    pub status: u16,
    pub reason: String,
}

/// Failure reported by a `Transport` or `ClientFactory`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub response: Option<CapturedResponse>,
    pub message: String,
}

impl TransportError {
    /// Failure without any response, e.g. connection refused.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            response: None,
            message: message.into(),
        }
    }

    /// Failure that still carries the response status line.
    pub fn with_response(status: u16, reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            response: Some(CapturedResponse {
                status,
                reason: reason.into(),
            }),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> CallSite<'static> {
        CallSite {
            connector: "Billing",
            method: HttpMethod::Post,
            url: "https://api.example.com/v1/items",
        }
    }

    #[test]
    fn transport_error_without_response_uses_placeholders() {
        let err = ConnectorError::transport(site(), &TransportError::new("Connection refused"));
        assert_eq!(err.status_code(), 0);
        assert!(err.has_no_response());
        assert_eq!(
            err.to_string(),
            "Error connecting to Billing (POST request to https://api.example.com/v1/items \
             returned null (empty response)) (Connection refused)."
        );
    }

    #[test]
    fn transport_error_with_captured_response_keeps_status() {
        let cause = TransportError::with_response(503, "Service Unavailable", "http status: 503");
        let err = ConnectorError::transport(site(), &cause);
        assert_eq!(err.status_code(), 503);
        assert!(!err.has_no_response());
        assert!(err.message().contains("returned 503 (Service Unavailable)"));
        assert!(err.message().ends_with("(http status: 503)."));
    }

    #[test]
    fn status_error_message() {
        let err = ConnectorError::status(site(), 404, "Not Found");
        assert_eq!(err.status_code(), 404);
        assert_eq!(
            err.message(),
            "Error connecting to Billing (POST request to https://api.example.com/v1/items \
             returned 404 (Not Found))."
        );
    }

    #[test]
    fn empty_body_error_message() {
        let err = ConnectorError::empty_body(site(), 200, "OK");
        assert_eq!(err.status_code(), 200);
        assert!(err.message().ends_with("returned 200 (OK), but resulted in empty data.)."));
    }

    #[test]
    fn undecodable_body_keeps_status() {
        let err = ConnectorError::undecodable_body(site(), 200, "OK", "invalid utf-8 sequence");
        assert_eq!(err.status_code(), 200);
        assert!(!err.has_no_response());
        assert!(err.message().contains("returned 200 (OK), but the body is not valid UTF-8"));
    }

    #[test]
    fn invalid_option_has_no_status() {
        let err = ConnectorError::invalid_option(site(), "headers", "expected an object");
        assert_eq!(err.status_code(), 0);
        assert!(err.has_no_response());
        assert!(err.message().starts_with("Invalid headers option for Billing"));
    }
}
