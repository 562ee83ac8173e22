//! Scalar values carried in session attributes.
//!
//! Host apps attach a flat map of attributes to a user session (user type,
//! platform, tier). The content service only understands scalars, so nested
//! data is not representable here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Flat attribute map attached to a user session.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A scalar attribute value.
///
/// Serialized untagged, so attributes appear as plain JSON scalars on the
/// wire.
///
/// # Examples
///
/// ```
/// use wavecx::AttributeValue;
///
/// let tier = AttributeValue::from("premium");
/// let age = AttributeValue::from(42);
///
/// assert_eq!(tier, AttributeValue::String("premium".to_string()));
/// assert_eq!(serde_json::to_string(&age).unwrap(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Boolean flag.
    Bool(bool),
    /// Whole number.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    String(String),
    /// Explicitly unset.
    #[default]
    Null,
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(AttributeValue::from(true), AttributeValue::Bool(true));
        assert_eq!(AttributeValue::from(3), AttributeValue::Int(3));
        assert_eq!(AttributeValue::from("x"), AttributeValue::String("x".to_string()));
        assert_eq!(AttributeValue::from(None::<i64>), AttributeValue::Null);
        assert_eq!(AttributeValue::from(Some(1.5)), AttributeValue::Float(1.5));
    }

    #[test]
    fn test_serializes_as_plain_scalars() {
        let mut attrs = Attributes::new();
        attrs.insert("userType".to_string(), "Premium Member".into());
        attrs.insert("visits".to_string(), 7.into());
        attrs.insert("beta".to_string(), false.into());

        let json = serde_json::to_value(&attrs).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "beta": false, "userType": "Premium Member", "visits": 7 })
        );

        let back: Attributes = serde_json::from_value(json).unwrap();
        assert_eq!(back, attrs);
    }
}
