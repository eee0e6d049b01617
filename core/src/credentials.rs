//! Credentials injected into the `query` realm of every request.

use std::collections::BTreeMap;

/// Static key/value pairs, e.g. an API key and secret.
pub type Credentials = BTreeMap<String, String>;

/// Supplies the credentials for one deployment of a connector.
///
/// Called once per request; the connector never caches the result.
pub trait CredentialsProvider: Send + Sync {
    fn credentials(&self) -> Credentials;
}

impl<F> CredentialsProvider for F
where
    F: Fn() -> Credentials + Send + Sync,
{
    fn credentials(&self) -> Credentials {
        self()
    }
}

/// A fixed credentials mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticCredentials(Credentials);

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticCredentials {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl CredentialsProvider for StaticCredentials {
    fn credentials(&self) -> Credentials {
        self.0.clone()
    }
}
