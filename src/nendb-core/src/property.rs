use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{NenError, Result};

/// Property map attached to nodes and edges
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// PropertyValue is a scalar stored on a node or edge.
///
/// Composite values (arrays, objects) are not representable. On the wire it
/// is plain JSON: `null`, a boolean, a number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum PropertyValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            PropertyValue::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Int(i) => Some(*i as f64),
            PropertyValue::UInt(u) => Some(*u as f64),
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for PropertyValue {
            fn from(v: $t) -> Self {
                PropertyValue::Int(v as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for PropertyValue {
            fn from(v: $t) -> Self {
                PropertyValue::UInt(v as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for PropertyValue {
    fn from(v: f32) -> Self {
        PropertyValue::Float(v as f64)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::String(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::String(v)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(PropertyValue::Null)
    }
}

impl From<PropertyValue> for serde_json::Value {
    fn from(v: PropertyValue) -> Self {
        match v {
            PropertyValue::Null => serde_json::Value::Null,
            PropertyValue::Bool(b) => b.into(),
            PropertyValue::Int(i) => i.into(),
            PropertyValue::UInt(u) => u.into(),
            PropertyValue::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            PropertyValue::String(s) => s.into(),
        }
    }
}

impl TryFrom<serde_json::Value> for PropertyValue {
    type Error = NenError;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(PropertyValue::Null),
            Value::Bool(b) => Ok(PropertyValue::Bool(b)),
            Value::String(s) => Ok(PropertyValue::String(s)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(PropertyValue::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(PropertyValue::UInt(u))
                } else {
                    Ok(PropertyValue::Float(n.as_f64().unwrap_or_default()))
                }
            }
            Value::Array(_) => Err(NenError::validation("property value cannot be an array")),
            Value::Object(_) => Err(NenError::validation("property value cannot be an object")),
        }
    }
}

/// Check whether an arbitrary JSON value is acceptable as a property value.
///
/// Null and scalars are valid; arrays and objects are not.
pub fn is_valid_property_value(value: &serde_json::Value) -> bool {
    !matches!(value, serde_json::Value::Array(_) | serde_json::Value::Object(_))
}

/// Convert an untyped JSON object into a [`PropertyMap`], rejecting composites.
pub fn properties_from_json(
    object: serde_json::Map<String, serde_json::Value>,
) -> Result<PropertyMap> {
    let mut properties = PropertyMap::new();
    for (key, value) in object {
        let converted = PropertyValue::try_from(value)
            .map_err(|e| e.with_detail("property", key.clone()))?;
        properties.insert(key, converted);
    }
    Ok(properties)
}
