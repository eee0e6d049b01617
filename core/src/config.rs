//! Per-connector configuration.
//!
//! # Design
//! The defaults are the safe ones: certificate verification on and a bounded
//! timeout. `permissive` reproduces the historical behaviour of the
//! internal-network deployments (no verification, no timeout) so it stays
//! available for compatibility testing, but it has to be asked for by name.
//!
//! The struct derives serde so a surrounding application can load it from
//! whatever format it already uses; this crate reads no files itself.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Base URL of the web service. A trailing slash is insignificant.
    pub host: String,

    /// Verify the server's TLS certificate.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,

    /// Overall per-request timeout. `None` leaves the transport unbounded.
    #[serde(
        default = "default_timeout",
        rename = "timeout_secs",
        with = "timeout_secs"
    )]
    pub timeout: Option<Duration>,

    /// Largest response body accepted, in bytes. `None` reads the body in
    /// full whatever its size.
    #[serde(default)]
    pub body_limit: Option<u64>,
}

fn default_verify_tls() -> bool {
    true
}

fn default_timeout() -> Option<Duration> {
    Some(DEFAULT_TIMEOUT)
}

impl ConnectorConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            verify_tls: default_verify_tls(),
            timeout: default_timeout(),
            body_limit: None,
        }
    }

    /// Certificate verification off and no timeout.
    pub fn permissive(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            verify_tls: false,
            timeout: None,
            body_limit: None,
        }
    }

    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_body_limit(mut self, body_limit: Option<u64>) -> Self {
        self.body_limit = body_limit;
        self
    }
}

mod timeout_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(timeout) => serializer.serialize_some(&timeout.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}
