//! Log event model and attribute merging

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute key reserved for the configured service name
pub const SERVICE_NAME_KEY: &str = "service.name";

/// Attribute key carrying the description of an error passed to `error`
pub const ERROR_KEY: &str = "error";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single key/value pair supplied at the call site
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for Attribute {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub body: String,
    pub level: LogLevel,
    pub attributes: BTreeMap<String, String>,
}

impl LogEvent {
    /// Build an event stamped with the current wall-clock time.
    ///
    /// Attributes are merged in order: `service.name`, then the caller's
    /// attributes, then `error` when an error is supplied. Later writes win.
    pub fn build(
        level: LogLevel,
        message: &str,
        service_name: &str,
        attrs: &[Attribute],
        error: Option<&dyn std::error::Error>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            body: message.to_string(),
            level,
            attributes: merge_attributes(service_name, attrs, error),
        }
    }
}

/// Combine the reserved service attribute with caller attributes
pub fn merge_attributes(
    service_name: &str,
    attrs: &[Attribute],
    error: Option<&dyn std::error::Error>,
) -> BTreeMap<String, String> {
    let mut merged = BTreeMap::new();
    merged.insert(SERVICE_NAME_KEY.to_string(), service_name.to_string());

    for attr in attrs {
        merged.insert(attr.key.clone(), attr.value.clone());
    }

    if let Some(err) = error {
        merged.insert(ERROR_KEY.to_string(), err.to_string());
    }

    merged
}
