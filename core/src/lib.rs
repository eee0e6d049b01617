//! Synchronous outbound connector for configured web-service hosts.
//!
//! # Overview
//! A `Connector` issues exactly one blocking HTTP request per call against
//! its configured host. It merges the caller's parameter realms with the
//! deployment's fixed credentials, and returns the raw response body or a
//! single `ConnectorError` carrying a status code and a descriptive message.
//!
//! # Design
//! - `Connector` is stateless between calls; configuration is read-only.
//! - Request assembly (`build_request`) and outcome classification
//!   (`parse_response`) are pure, so the network boundary is explicit.
//! - Credentials come from an injected `CredentialsProvider`, the HTTP client
//!   from an injected `ClientFactory` (ureq by default).
//! - Bodies travel as bytes: `request_bytes` returns them untouched and
//!   `request` decodes them as UTF-8.
//! - No retries, no caching: callers own their retry policy.

pub mod config;
pub mod connector;
pub mod credentials;
pub mod error;
pub mod http;
pub mod options;
pub mod transport;

pub use config::ConnectorConfig;
pub use connector::{Connector, ConnectorRequest};
pub use credentials::{Credentials, CredentialsProvider, StaticCredentials};
pub use error::{ConnectorError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ACCEPT_JSON, ACCEPT_XML};
pub use options::{Parameters, RequestOptions};
pub use transport::{ClientFactory, Transport, TransportSettings, UreqClientFactory, UreqTransport};
