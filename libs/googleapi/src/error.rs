use std::fmt;
use std::sync::Arc;

use http::{HeaderMap, StatusCode};
use serde_json::{Map, Value};

/// Prefix of every rendered [`Error`] message.
const MESSAGE_PREFIX: &str = "googleapi";

/// One entry of the `errors` array of a Google API error reply.
///
/// Only `reason` and `message` are surfaced; other members of the entry
/// (`domain`, `location`, ...) are accepted and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorItem {
    /// Machine-readable reason code, e.g. `keyInvalid`
    pub reason: String,
    /// Human-readable description
    pub message: String,
}

/// Error returned by a Google API call that completed with a non-2xx status.
///
/// Built by [`crate::check_response`] and friends. `body` always holds the raw
/// response text, whether or not it could be decoded into the structured
/// fields.
#[derive(Debug, Clone)]
pub struct Error {
    /// HTTP status code of the response
    pub code: StatusCode,
    /// Server-provided message, empty if the body had none
    pub message: String,
    /// Response headers, multi-value headers preserved
    pub header: HeaderMap,
    /// Entries of the reply's `errors` array
    pub errors: Vec<ErrorItem>,
    /// Typed detail payloads (e.g. `google.rpc.BadRequest`) as raw JSON
    pub details: Vec<Value>,
    /// Raw response body
    pub body: String,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Creates an error with only the status code set.
    #[must_use]
    pub fn new(code: StatusCode) -> Self {
        Self {
            code,
            message: String::new(),
            header: HeaderMap::new(),
            errors: Vec::new(),
            details: Vec::new(),
            body: String::new(),
            source: None,
        }
    }

    /// Attaches the underlying cause, reported by [`std::error::Error::source`].
    #[must_use]
    pub fn wrap<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    fn write_details(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let details = Value::Array(self.details.iter().map(sorted_keys).collect());
        match serde_json::to_string_pretty(&details) {
            Ok(rendered) => write!(f, "\nDetails:\n{rendered}"),
            // Values that cannot be rendered are omitted from the message.
            Err(_) => Ok(()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            return write!(
                f,
                "{MESSAGE_PREFIX}: got HTTP response code {} with body: {}",
                self.code.as_u16(),
                self.body
            );
        }

        write!(
            f,
            "{MESSAGE_PREFIX}: Error {}: {}",
            self.code.as_u16(),
            self.message
        )?;
        if let Some(item) = self.errors.first().filter(|item| !item.reason.is_empty()) {
            write!(f, ", {}", item.reason)?;
        }
        if !self.details.is_empty() {
            self.write_details(f)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

/// Copies `value` with every object's keys in lexicographic order.
fn sorted_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sorted_keys(v)))
                    .collect::<Map<_, _>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted_keys).collect()),
        other => other.clone(),
    }
}
