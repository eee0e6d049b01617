//! The outbound connector: one HTTP request per call, one error kind out.
//!
//! # Design
//! `Connector` holds read-only configuration (name, host, credentials
//! provider, client factory) and carries no mutable state between calls, so a
//! single value can be cloned and shared across threads freely.
//!
//! The work is split the same way for every call:
//! - `build_request` merges credentials and caller parameters into
//!   `RequestOptions` and turns them into a plain-data `HttpRequest`; the
//!   `verify` and `timeout` realms become the `TransportSettings` of the call;
//! - the transport from the client factory executes it once;
//! - `parse_response` classifies the outcome (transport failure, non-200
//!   status, empty body) into a `ConnectorError`, or hands back the raw body.
//!
//! A realm the connector cannot honour is rejected, never dropped.
//! `build_request` and `parse_response` never touch the network and are
//! tested directly.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

use crate::config::ConnectorConfig;
use crate::credentials::CredentialsProvider;
use crate::error::{CallSite, ConnectorError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, ACCEPT_JSON};
use crate::options::{self, Parameters, RequestOptions};
use crate::transport::{ClientFactory, TransportSettings, UreqClientFactory};

const CONTENT_TYPE: &str = "Content-Type";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Inputs of a single `Connector::request` call.
///
/// Defaults: method POST, no parameters, `Accept: application/json`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorRequest {
    pub path: String,
    pub method: HttpMethod,
    pub parameters: Parameters,
    pub accept: String,
}

impl ConnectorRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: HttpMethod::default(),
            parameters: Parameters::default(),
            accept: ACCEPT_JSON.to_string(),
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = accept.into();
        self
    }
}

/// Issues requests against one configured web-service host.
#[derive(Clone)]
pub struct Connector {
    name: String,
    config: ConnectorConfig,
    credentials: Arc<dyn CredentialsProvider>,
    factory: Arc<dyn ClientFactory>,
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Connector {
    /// `name` identifies the connector in error messages.
    pub fn new(
        name: impl Into<String>,
        config: ConnectorConfig,
        credentials: impl CredentialsProvider + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            credentials: Arc::new(credentials),
            factory: Arc::new(UreqClientFactory),
        }
    }

    /// Replace the default ureq-backed client factory.
    pub fn with_client_factory(mut self, factory: impl ClientFactory + 'static) -> Self {
        self.factory = Arc::new(factory);
        self
    }

    pub fn connector_type(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Join the host and `path`, stripping one trailing slash from the host
    /// and one leading slash from the path.
    pub fn url(&self, path: &str) -> String {
        let host = self.config.host.strip_suffix('/').unwrap_or(&self.config.host);
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{host}/{path}")
    }

    /// Configured `verify` and `timeout` (seconds, `null` for none),
    /// credentials in `query`, the accept header in `headers`, then every
    /// caller parameter on top.
    pub fn build_options(&self, request: &ConnectorRequest) -> RequestOptions {
        let credentials: Map<String, Value> = self
            .credentials
            .credentials()
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();

        let mut headers = Map::new();
        headers.insert("Accept".to_string(), Value::String(request.accept.clone()));

        let timeout = self
            .config
            .timeout
            .and_then(|timeout| Number::from_f64(timeout.as_secs_f64()))
            .map_or(Value::Null, Value::Number);

        let mut options = RequestOptions::new();
        options.merge(options::VERIFY, &Value::Bool(self.config.verify_tls));
        options.merge(options::TIMEOUT, &timeout);
        options.merge(options::QUERY, &Value::Object(credentials));
        options.merge(options::HEADERS, &Value::Object(headers));
        options.merge_all(&request.parameters);
        options
    }

    pub fn build_request(&self, request: &ConnectorRequest) -> Result<HttpRequest, ConnectorError> {
        self.prepare(request).map(|(http_request, _)| http_request)
    }

    fn prepare(&self, request: &ConnectorRequest) -> Result<(HttpRequest, TransportSettings), ConnectorError> {
        let base_url = self.url(&request.path);
        let site = CallSite {
            connector: &self.name,
            method: request.method,
            url: &base_url,
        };
        let options = self.build_options(request);

        if let Some((realm, _)) = options.realms().find(|(realm, _)| !is_known_realm(realm)) {
            return Err(ConnectorError::invalid_option(site, realm, "unsupported request option"));
        }

        let settings = TransportSettings {
            verify_tls: verify_option(&options, site)?,
            timeout: timeout_option(&options, site)?,
            body_limit: self.config.body_limit,
        };

        let url = match options.get(options::QUERY) {
            None | Some(Value::Null) => base_url.clone(),
            Some(Value::Object(fields)) => {
                let query = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(options::pairs(fields))
                    .finish();
                append_query(&base_url, &query)
            }
            Some(Value::String(raw)) => append_query(&base_url, raw.trim_start_matches('?')),
            Some(_) => {
                return Err(ConnectorError::invalid_option(
                    site,
                    options::QUERY,
                    "expected an object or a string",
                ))
            }
        };

        let mut headers = match options.get(options::HEADERS) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(fields)) => options::pairs(fields),
            Some(_) => {
                return Err(ConnectorError::invalid_option(
                    site,
                    options::HEADERS,
                    "expected an object",
                ))
            }
        };

        let body = match body_option(&options, site)? {
            Some((body, content_type)) => {
                if let Some(content_type) = content_type {
                    if !headers.iter().any(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE)) {
                        headers.push((CONTENT_TYPE.to_string(), content_type.to_string()));
                    }
                }
                Some(body)
            }
            None => None,
        };

        let http_request = HttpRequest {
            method: request.method,
            url,
            headers,
            body,
        };
        Ok((http_request, settings))
    }

    /// Classify the outcome of one round-trip against `url` (the joined URL,
    /// without query string).
    pub fn parse_response(
        &self,
        method: HttpMethod,
        url: &str,
        outcome: Result<HttpResponse, TransportError>,
    ) -> Result<Vec<u8>, ConnectorError> {
        let site = CallSite {
            connector: &self.name,
            method,
            url,
        };

        let response = match outcome {
            Ok(response) => response,
            Err(error) => {
                let err = ConnectorError::transport(site, &error);
                warn!(connector = %self.name, %method, url, status = err.status_code(), "transport failure");
                return Err(err);
            }
        };

        if response.status != 200 {
            warn!(connector = %self.name, %method, url, status = response.status, "unexpected status");
            return Err(ConnectorError::status(site, response.status, &response.reason));
        }

        if response.body.is_empty() {
            warn!(connector = %self.name, %method, url, "empty response body");
            return Err(ConnectorError::empty_body(site, response.status, &response.reason));
        }

        Ok(response.body)
    }

    /// Perform exactly one HTTP request and return the response body bytes
    /// exactly as received.
    pub fn request_bytes(&self, request: ConnectorRequest) -> Result<Vec<u8>, ConnectorError> {
        let (http_request, settings) = self.prepare(&request)?;
        let url = self.url(&request.path);
        debug!(connector = %self.name, method = %request.method, url = %url, "issuing request");

        let outcome = self
            .factory
            .create(&settings)
            .and_then(|transport| transport.execute(&http_request));
        self.parse_response(request.method, &url, outcome)
    }

    /// Perform exactly one HTTP request and return the response body as
    /// text. A body that is not UTF-8 is an error; use `request_bytes` for
    /// services answering in another charset.
    pub fn request(&self, request: ConnectorRequest) -> Result<String, ConnectorError> {
        let method = request.method;
        let url = self.url(&request.path);
        let body = self.request_bytes(request)?;
        String::from_utf8(body).map_err(|e| {
            warn!(connector = %self.name, %method, url = %url, "response body is not UTF-8");
            let site = CallSite {
                connector: &self.name,
                method,
                url: &url,
            };
            ConnectorError::undecodable_body(site, 200, "OK", &e.utf8_error().to_string())
        })
    }

    pub fn get(&self, path: &str, parameters: Parameters) -> Result<String, ConnectorError> {
        self.request(
            ConnectorRequest::new(path)
                .method(HttpMethod::Get)
                .parameters(parameters),
        )
    }

    pub fn post(&self, path: &str, parameters: Parameters) -> Result<String, ConnectorError> {
        self.request(ConnectorRequest::new(path).parameters(parameters))
    }
}

fn is_known_realm(realm: &str) -> bool {
    matches!(
        realm,
        options::QUERY
            | options::HEADERS
            | options::JSON
            | options::FORM_PARAMS
            | options::FORM
            | options::BODY
            | options::VERIFY
            | options::TIMEOUT
    )
}

fn verify_option(options: &RequestOptions, site: CallSite<'_>) -> Result<bool, ConnectorError> {
    match options.get(options::VERIFY) {
        Some(Value::Bool(verify)) => Ok(*verify),
        _ => Err(ConnectorError::invalid_option(site, options::VERIFY, "expected a boolean")),
    }
}

/// Seconds as a number; `null` or 0 leaves the call unbounded.
fn timeout_option(options: &RequestOptions, site: CallSite<'_>) -> Result<Option<Duration>, ConnectorError> {
    let invalid = || {
        ConnectorError::invalid_option(site, options::TIMEOUT, "expected a non-negative number of seconds")
    };
    match options.get(options::TIMEOUT) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(seconds)) => match seconds.as_f64() {
            Some(seconds) if seconds == 0.0 => Ok(None),
            Some(seconds) if seconds.is_finite() && seconds > 0.0 => Ok(Some(Duration::from_secs_f64(seconds))),
            _ => Err(invalid()),
        },
        Some(_) => Err(invalid()),
    }
}

fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query}")
}

/// Pick the body realm: `body`, then `json`, then `form_params` / `form`.
/// Returns the encoded body and the content type it implies.
fn body_option(
    options: &RequestOptions,
    site: CallSite<'_>,
) -> Result<Option<(String, Option<&'static str>)>, ConnectorError> {
    if let Some(value) = options.get(options::BODY) {
        return match value {
            Value::Null => Ok(None),
            Value::String(raw) => Ok(Some((raw.clone(), None))),
            _ => Err(ConnectorError::invalid_option(site, options::BODY, "expected a string")),
        };
    }

    if let Some(value) = options.get(options::JSON) {
        if value.is_null() {
            return Ok(None);
        }
        let encoded = serde_json::to_string(value)
            .map_err(|e| ConnectorError::invalid_option(site, options::JSON, &e.to_string()))?;
        return Ok(Some((encoded, Some(ACCEPT_JSON))));
    }

    for realm in [options::FORM_PARAMS, options::FORM] {
        match options.get(realm) {
            None => continue,
            Some(Value::Null) => return Ok(None),
            Some(Value::Object(fields)) => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(options::pairs(fields))
                    .finish();
                return Ok(Some((encoded, Some(FORM_URLENCODED))));
            }
            Some(_) => return Err(ConnectorError::invalid_option(site, realm, "expected an object")),
        }
    }

    Ok(None)
}
