//! Parameter realms and the rule that merges them into request options.
//!
//! # Design
//! A realm (`query`, `headers`, `json`, `form_params`, `body`, ...) is a named
//! bucket of request options. Caller parameters are applied to the options in
//! order:
//! - an object value is merged field by field into the realm, creating it if
//!   absent; fields not mentioned keep their previous value;
//! - any other value replaces the realm wholesale. This includes the `query`
//!   realm that was pre-filled with credentials, so a scalar `query`
//!   parameter always wins over them.
//!
//! Values are `serde_json::Value` so a realm like `json` can carry an
//! arbitrary payload while `query` or `headers` stay flat key/value maps.

use serde_json::{Map, Value};

pub const QUERY: &str = "query";
pub const HEADERS: &str = "headers";
pub const JSON: &str = "json";
pub const FORM_PARAMS: &str = "form_params";
pub const FORM: &str = "form";
pub const BODY: &str = "body";
pub const VERIFY: &str = "verify";
pub const TIMEOUT: &str = "timeout";

/// Caller-supplied parameters, keyed by realm.
///
/// Entries keep their insertion order and the same realm may appear twice;
/// two object entries accumulate into one bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, Value)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a realm entry.
    pub fn with(mut self, realm: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((realm.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(realm, value)| (realm.as_str(), value))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Returned when a JSON value other than an object is offered as parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parameters must be a JSON object keyed by realm")]
pub struct NotAnObject;

impl TryFrom<Value> for Parameters {
    type Error = NotAnObject;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            Value::Null => Ok(Self::default()),
            _ => Err(NotAnObject),
        }
    }
}

/// The option set a request is assembled from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    realms: Map<String, Value>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one realm entry using the merge rule described in the module docs.
    pub fn merge(&mut self, realm: &str, value: &Value) {
        let Value::Object(fields) = value else {
            self.realms.insert(realm.to_string(), value.clone());
            return;
        };

        let bucket = self
            .realms
            .entry(realm.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !bucket.is_object() {
            *bucket = Value::Object(Map::new());
        }
        if let Value::Object(existing) = bucket {
            for (name, field) in fields {
                existing.insert(name.clone(), field.clone());
            }
        }
    }

    /// Apply every entry of `parameters`, in order.
    pub fn merge_all(&mut self, parameters: &Parameters) {
        for (realm, value) in parameters.iter() {
            self.merge(realm, value);
        }
    }

    pub fn get(&self, realm: &str) -> Option<&Value> {
        self.realms.get(realm)
    }

    pub fn realms(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.realms.iter().map(|(realm, value)| (realm.as_str(), value))
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.realms
    }
}

/// Render a scalar option value as it should appear in a query string,
/// header or form field. `None` for `null`; arrays and objects are
/// serialized as JSON.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Flatten an object realm into key/value pairs. Arrays repeat their key;
/// `null` fields are dropped.
pub(crate) fn pairs(fields: &Map<String, Value>) -> Vec<(String, String)> {
    let mut out = Vec::with_capacity(fields.len());
    for (name, value) in fields {
        match value {
            Value::Array(items) => {
                out.extend(
                    items
                        .iter()
                        .filter_map(scalar_text)
                        .map(|text| (name.clone(), text)),
                );
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    out.push((name.clone(), text));
                }
            }
        }
    }
    out
}
