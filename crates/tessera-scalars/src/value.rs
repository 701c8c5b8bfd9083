//! # AbiValue — Generic Structural Value
//!
//! The single in-memory representation shared by every generated type and
//! every scalar codec: nested ordered maps, lists, and scalar leaves.
//!
//! ## Design
//!
//! - Maps preserve insertion order (`Vec<(String, AbiValue)>`), because field
//!   order is the wire order and structural output must mirror it.
//! - Integers are carried as `i128`/`u128` so every fixed-width builtin up to
//!   128 bits fits without a separate variant per width.
//! - `Null` doubles as the "absent" marker for optional and extension fields.

use std::fmt;

/// A structural value: the interchange form consumed and produced by all
/// Tessera codecs.
#[derive(Debug, Clone, PartialEq)]
pub enum AbiValue {
    /// Absent / null. Used for optional and extension fields.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer (up to 128 bits).
    Int(i128),
    /// Unsigned integer (up to 128 bits).
    UInt(u128),
    /// IEEE-754 double. `float32` values are widened losslessly.
    Float(f64),
    /// Raw byte string.
    Bytes(Vec<u8>),
    /// UTF-8 text.
    String(String),
    /// Homogeneous-on-the-wire list (array-modified fields, variant arms).
    List(Vec<AbiValue>),
    /// Ordered field map. Key order is semantically significant.
    Map(Vec<(String, AbiValue)>),
}

impl AbiValue {
    /// Short kind label, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            AbiValue::Null => "null",
            AbiValue::Bool(_) => "bool",
            AbiValue::Int(_) => "int",
            AbiValue::UInt(_) => "uint",
            AbiValue::Float(_) => "float",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::String(_) => "string",
            AbiValue::List(_) => "list",
            AbiValue::Map(_) => "map",
        }
    }

    /// True when the value is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, AbiValue::Null)
    }

    /// Build an ordered map from `(key, value)` pairs.
    pub fn map<K: Into<String>>(entries: Vec<(K, AbiValue)>) -> Self {
        AbiValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Look up a key in a `Map` value. Returns `None` for non-maps.
    pub fn get(&self, key: &str) -> Option<&AbiValue> {
        match self {
            AbiValue::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Borrow the map entries, if this is a `Map`.
    pub fn as_map(&self) -> Option<&[(String, AbiValue)]> {
        match self {
            AbiValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Borrow the list elements, if this is a `List`.
    pub fn as_list(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the text, if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Signed reading of an integer value (either `Int` or in-range `UInt`).
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            AbiValue::Int(n) => Some(*n),
            AbiValue::UInt(n) => i128::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Unsigned reading of an integer value (either `UInt` or non-negative `Int`).
    pub fn as_u128(&self) -> Option<u128> {
        match self {
            AbiValue::UInt(n) => Some(*n),
            AbiValue::Int(n) => u128::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Convert from a `serde_json::Value`, e.g. a field of a parsed schema
    /// document or a test fixture. JSON numbers map to `Int`/`UInt`/`Float`;
    /// JSON objects keep their key order only as far as `serde_json` does.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => AbiValue::Null,
            serde_json::Value::Bool(b) => AbiValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    AbiValue::UInt(u as u128)
                } else if let Some(i) = n.as_i64() {
                    AbiValue::Int(i as i128)
                } else {
                    AbiValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => AbiValue::String(s.clone()),
            serde_json::Value::Array(items) => {
                AbiValue::List(items.iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(fields) => AbiValue::Map(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert to a `serde_json::Value`. `Bytes` become lowercase hex text;
    /// 128-bit integers outside the JSON number range become decimal text.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AbiValue::Null => serde_json::Value::Null,
            AbiValue::Bool(b) => serde_json::Value::Bool(*b),
            AbiValue::Int(n) => match i64::try_from(*n) {
                Ok(small) => serde_json::Value::from(small),
                Err(_) => serde_json::Value::String(n.to_string()),
            },
            AbiValue::UInt(n) => match u64::try_from(*n) {
                Ok(small) => serde_json::Value::from(small),
                Err(_) => serde_json::Value::String(n.to_string()),
            },
            AbiValue::Float(x) => serde_json::Value::from(*x),
            AbiValue::Bytes(raw) => serde_json::Value::String(hex::encode(raw)),
            AbiValue::String(s) => serde_json::Value::String(s.clone()),
            AbiValue::List(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
            AbiValue::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<bool> for AbiValue {
    fn from(b: bool) -> Self {
        AbiValue::Bool(b)
    }
}

impl From<i64> for AbiValue {
    fn from(n: i64) -> Self {
        AbiValue::Int(n as i128)
    }
}

impl From<u64> for AbiValue {
    fn from(n: u64) -> Self {
        AbiValue::UInt(n as u128)
    }
}

impl From<f64> for AbiValue {
    fn from(x: f64) -> Self {
        AbiValue::Float(x)
    }
}

impl From<&str> for AbiValue {
    fn from(s: &str) -> Self {
        AbiValue::String(s.to_owned())
    }
}

impl From<String> for AbiValue {
    fn from(s: String) -> Self {
        AbiValue::String(s)
    }
}

impl From<Vec<u8>> for AbiValue {
    fn from(raw: Vec<u8>) -> Self {
        AbiValue::Bytes(raw)
    }
}

impl<T: Into<AbiValue>> From<Vec<T>> for AbiValue {
    fn from(items: Vec<T>) -> Self {
        AbiValue::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_lookup_preserves_order() {
        let v = AbiValue::map(vec![("b", AbiValue::from(1u64)), ("a", AbiValue::from(2u64))]);
        let entries = v.as_map().unwrap();
        assert_eq!(entries[0].0, "b");
        assert_eq!(v.get("a"), Some(&AbiValue::UInt(2)));
        assert_eq!(v.get("missing"), None);
    }

    #[test]
    fn test_integer_readings() {
        assert_eq!(AbiValue::Int(-5).as_i128(), Some(-5));
        assert_eq!(AbiValue::Int(-5).as_u128(), None);
        assert_eq!(AbiValue::UInt(5).as_i128(), Some(5));
    }

    #[test]
    fn test_json_round_trip() {
        let json = serde_json::json!({
            "x": 1,
            "y": -2,
            "name": "alice",
            "flags": [true, false],
            "inner": {"z": null}
        });
        let v = AbiValue::from_json(&json);
        assert_eq!(v.to_json(), json);
    }

    #[test]
    fn test_bytes_render_as_hex() {
        let v = AbiValue::Bytes(vec![0xde, 0xad]);
        assert_eq!(v.to_json(), serde_json::json!("dead"));
    }
}
