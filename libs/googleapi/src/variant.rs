//! Conversion of self-describing JSON "variant" objects into typed shapes.
//!
//! Some APIs return polymorphic values as plain JSON objects whose `"type"`
//! member names the concrete shape (GeoJSON geometries are the typical
//! example). [`variant_type`] reads the discriminator; [`convert_variant`]
//! fills a typed value from the object.

use serde_json::{Map, Value};

/// Name of the discriminator member.
pub const VARIANT_TYPE_KEY: &str = "type";

/// A typed shape that a variant payload can be converted into.
///
/// Implementations declare their JSON key to field mapping explicitly in
/// [`Variant::set_field`]. Keys are matched case-sensitively.
///
/// ```
/// use googleapi::variant::Variant;
/// use serde_json::Value;
///
/// #[derive(Debug, Default)]
/// struct Point {
///     kind: String,
///     coordinates: Vec<f64>,
/// }
///
/// impl Variant for Point {
///     fn set_field(&mut self, key: &str, value: &Value) -> Result<(), serde_json::Error> {
///         match key {
///             "type" => self.kind = serde_json::from_value(value.clone())?,
///             "coordinates" => self.coordinates = serde_json::from_value(value.clone())?,
///             _ => {}
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Variant: Default {
    /// Stores `value` into the field mapped to `key`.
    ///
    /// Keys the shape does not declare must be ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` does not have the JSON type of the field.
    fn set_field(&mut self, key: &str, value: &Value) -> Result<(), serde_json::Error>;
}

/// Returns the `"type"` member of `payload`, or `""` if it is missing or not a string.
#[must_use]
pub fn variant_type(payload: &Map<String, Value>) -> &str {
    payload
        .get(VARIANT_TYPE_KEY)
        .and_then(Value::as_str)
        .unwrap_or_default()
}

/// Fills `target` from `payload`.
///
/// `target` is reset to its default first. Payload members without a
/// counterpart in the shape are dropped, and fields without a payload member
/// keep their default. Returns `false` if some declared field could not be
/// decoded (that field keeps its default, the others are still filled).
pub fn convert_variant<T: Variant>(payload: &Map<String, Value>, target: &mut T) -> bool {
    *target = T::default();
    let mut ok = true;
    for (key, value) in payload {
        if let Err(err) = target.set_field(key, value) {
            tracing::trace!(key = %key, error = %err, "variant field has an incompatible type");
            ok = false;
        }
    }
    ok
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq)]
    struct Point {
        kind: String,
        coordinates: Vec<f64>,
    }

    impl Variant for Point {
        fn set_field(&mut self, key: &str, value: &Value) -> Result<(), serde_json::Error> {
            match key {
                "type" => self.kind = serde_json::from_value(value.clone())?,
                "coordinates" => self.coordinates = serde_json::from_value(value.clone())?,
                _ => {}
            }
            Ok(())
        }
    }

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn test_variant_type() {
        assert_eq!(variant_type(&payload(json!({"type": "Point"}))), "Point");
        assert_eq!(variant_type(&payload(json!({"type": 7}))), "");
        assert_eq!(variant_type(&payload(json!({"kind": "Point"}))), "");
    }

    #[test]
    fn test_convert_matching_fields() {
        let mut point = Point::default();
        let ok = convert_variant(
            &payload(json!({"type": "Point", "coordinates": [1.0, 2.0]})),
            &mut point,
        );
        assert!(ok);
        assert_eq!(
            point,
            Point {
                kind: "Point".to_owned(),
                coordinates: vec![1.0, 2.0],
            }
        );
    }

    #[test]
    fn test_convert_ignores_unknown_fields() {
        let mut point = Point::default();
        let ok = convert_variant(
            &payload(json!({"type": "Point", "bogus": [1.0, 2.0]})),
            &mut point,
        );
        assert!(ok);
        assert_eq!(point.kind, "Point");
        assert!(point.coordinates.is_empty());
    }

    #[test]
    fn test_convert_is_case_sensitive() {
        let mut point = Point::default();
        assert!(convert_variant(
            &payload(json!({"Type": "Point", "COORDINATES": [1.0]})),
            &mut point,
        ));
        assert_eq!(point, Point::default());
    }

    #[test]
    fn test_convert_reports_type_mismatch() {
        let mut point = Point::default();
        let ok = convert_variant(
            &payload(json!({"type": "Point", "coordinates": "nope"})),
            &mut point,
        );
        assert!(!ok);
        assert_eq!(point.kind, "Point");
        assert!(point.coordinates.is_empty());
    }

    #[test]
    fn test_convert_resets_target() {
        let mut point = Point {
            kind: "Old".to_owned(),
            coordinates: vec![9.0],
        };
        assert!(convert_variant(&payload(json!({})), &mut point));
        assert_eq!(point, Point::default());
    }
}
