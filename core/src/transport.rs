//! Pluggable HTTP transport.
//!
//! # Design
//! The connector never names a client library. On every call it resolves the
//! `TransportSettings` for that call (configuration plus the `verify` and
//! `timeout` realms), asks a `ClientFactory` for a fresh `Transport` built
//! with them, and hands it a plain-data `HttpRequest`. `UreqClientFactory` is
//! the default.
//!
//! Status codes are data, not errors: the ureq agent is configured with
//! `http_status_as_error(false)` and the connector classifies them itself.
//! Bodies are read as raw bytes, uncapped unless a limit is configured.

use std::time::Duration;

use ureq::http;

use crate::config::{ConnectorConfig, DEFAULT_TIMEOUT};
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Client settings for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    pub verify_tls: bool,
    pub timeout: Option<Duration>,
    /// Largest body accepted, in bytes; `None` for no cap.
    pub body_limit: Option<u64>,
}

impl TransportSettings {
    pub fn from_config(config: &ConnectorConfig) -> Self {
        Self {
            verify_tls: config.verify_tls,
            timeout: config.timeout,
            body_limit: config.body_limit,
        }
    }
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            verify_tls: true,
            timeout: Some(DEFAULT_TIMEOUT),
            body_limit: None,
        }
    }
}

/// Executes exactly one HTTP round-trip.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Produces a `Transport` configured for one call.
///
/// A factory shared across threads must be safe to call concurrently; the
/// transports it returns are used by a single call only.
pub trait ClientFactory: Send + Sync {
    fn create(&self, settings: &TransportSettings) -> Result<Box<dyn Transport>, TransportError>;
}

impl<F> ClientFactory for F
where
    F: Fn(&TransportSettings) -> Result<Box<dyn Transport>, TransportError> + Send + Sync,
{
    fn create(&self, settings: &TransportSettings) -> Result<Box<dyn Transport>, TransportError> {
        self(settings)
    }
}

/// Default factory: a blocking ureq agent per call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UreqClientFactory;

impl ClientFactory for UreqClientFactory {
    fn create(&self, settings: &TransportSettings) -> Result<Box<dyn Transport>, TransportError> {
        let tls = ureq::tls::TlsConfig::builder()
            .disable_verification(!settings.verify_tls)
            .build();
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .tls_config(tls)
            .timeout_global(settings.timeout)
            .build()
            .new_agent();
        Ok(Box::new(UreqTransport {
            agent,
            body_limit: settings.body_limit,
        }))
    }
}

/// `Transport` backed by a `ureq::Agent`.
pub struct UreqTransport {
    agent: ureq::Agent,
    body_limit: Option<u64>,
}

impl UreqTransport {
    /// Wrap a caller-built agent; bodies are read without a size cap.
    pub fn new(agent: ureq::Agent) -> Self {
        Self {
            agent,
            body_limit: None,
        }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = http::Request::builder()
            .method(to_http_method(request.method))
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let result = match &request.body {
            Some(body) => {
                let req = builder
                    .body(body.clone().into_bytes())
                    .map_err(|e| TransportError::new(e.to_string()))?;
                self.agent.run(req)
            }
            None => {
                let req = builder
                    .body(())
                    .map_err(|e| TransportError::new(e.to_string()))?;
                self.agent.run(req)
            }
        };
        let mut response = result.map_err(from_ureq_error)?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(self.body_limit.unwrap_or(u64::MAX))
            .read_to_vec()
            .map_err(|e| TransportError::with_response(status.as_u16(), reason.clone(), e.to_string()))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason,
            headers,
            body,
        })
    }
}

fn to_http_method(method: HttpMethod) -> http::Method {
    match method {
        HttpMethod::Get => http::Method::GET,
        HttpMethod::Post => http::Method::POST,
        HttpMethod::Put => http::Method::PUT,
        HttpMethod::Patch => http::Method::PATCH,
        HttpMethod::Delete => http::Method::DELETE,
        HttpMethod::Head => http::Method::HEAD,
        HttpMethod::Options => http::Method::OPTIONS,
    }
}

/// An agent that treats statuses as errors still tells us which status it saw.
fn from_ureq_error(error: ureq::Error) -> TransportError {
    match error {
        ureq::Error::StatusCode(code) => {
            let reason = http::StatusCode::from_u16(code)
                .ok()
                .and_then(|status| status.canonical_reason())
                .unwrap_or_default();
            TransportError::with_response(code, reason, format!("http status: {code}"))
        }
        other => TransportError::new(other.to_string()),
    }
}
