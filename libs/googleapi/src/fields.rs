//! Partial-response field selectors (the `fields` query parameter).

use std::fmt;

/// A field selector such as `items(id,name)` or `nextPageToken`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field(String);

impl Field {
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Field {
    fn from(selector: &str) -> Self {
        Self::new(selector)
    }
}

impl From<String> for Field {
    fn from(selector: String) -> Self {
        Self(selector)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Joins `fields` with `,` in the given order.
#[must_use]
pub fn combine_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
