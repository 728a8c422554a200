//! Serde adapters for numbers that Google APIs transmit as JSON strings.
//!
//! 64-bit integers do not survive JavaScript's number type, so the APIs send
//! them quoted: `{"size": "1234"}`. Decoding accepts quoted and bare numbers;
//! encoding always quotes.
//!
//! ```
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Object {
//!     #[serde(with = "googleapi::json::string")]
//!     size: u64,
//!     #[serde(with = "googleapi::json::string_vec")]
//!     generations: Vec<i64>,
//! }
//!
//! let obj: Object = serde_json::from_str(r#"{"size": "1234", "generations": ["1", 2]}"#)?;
//! assert_eq!(obj.size, 1234);
//! assert_eq!(obj.generations, vec![1, 2]);
//! assert_eq!(
//!     serde_json::to_string(&obj)?,
//!     r#"{"size":"1234","generations":["1","2"]}"#
//! );
//! # Ok::<(), serde_json::Error>(())
//! ```

use std::fmt::Display;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

fn parse_value<T, E>(value: &Value) -> Result<T, E>
where
    T: FromStr,
    T::Err: Display,
    E: serde::de::Error,
{
    match value {
        Value::String(s) => s.parse().map_err(E::custom),
        Value::Number(n) => n.to_string().parse().map_err(E::custom),
        other => Err(E::custom(format!(
            "expected a number or numeric string, got {other}"
        ))),
    }
}

/// A single string-encoded number.
pub mod string {
    use super::{Deserialize, Display, FromStr, Value, parse_value};
    use serde::{Deserializer, Serializer};

    /// Serializes `value` as a JSON string.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    /// Deserializes a number from a JSON string or number.
    ///
    /// # Errors
    ///
    /// Fails if the value is neither, or does not parse as `T`.
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        parse_value(&Value::deserialize(deserializer)?)
    }
}

/// A list of string-encoded numbers.
pub mod string_vec {
    use super::{Deserialize, Display, FromStr, Value, parse_value};
    use serde::ser::SerializeSeq;
    use serde::{Deserializer, Serializer};

    /// Serializes `values` as a JSON array of strings.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<T, S>(values: &[T], serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&value.to_string())?;
        }
        seq.end()
    }

    /// Deserializes an array of JSON strings or numbers; `null` yields an empty list.
    ///
    /// # Errors
    ///
    /// Fails if an element is neither, or does not parse as `T`.
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        Option::<Vec<Value>>::deserialize(deserializer)?
            .unwrap_or_default()
            .iter()
            .map(parse_value::<T, D::Error>)
            .collect()
    }
}
