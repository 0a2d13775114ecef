// Dynamic option values
//
// This module defines the value model stored in an options container:
// scalars, ordered lists and maps, and opaque objects that carry a type
// name for class-token matching.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};

use crate::options::types::OptionType;

/// A value that carries a named runtime type.
///
/// Objects stored in an [`OptionValue::Object`] are matched against class
/// tokens in a prototype's `types` list through [`OptionObject::conforms_to`].
pub trait OptionObject: fmt::Debug + Send + Sync {
    /// The concrete type name reported in diagnostics.
    fn class_name(&self) -> &str;

    /// Returns true if this object is an instance of `name`.
    ///
    /// The default accepts the class name itself, case-insensitively.
    /// Implementors that also satisfy interface names should extend this.
    fn conforms_to(&self, name: &str) -> bool {
        self.class_name().eq_ignore_ascii_case(name)
    }

    /// Snapshot used for JSON export and hashing.
    fn to_json(&self) -> serde_json::Value;
}

/// A single option value.
#[derive(Debug, Clone, Default)]
pub enum OptionValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    /// Ordered list.
    Array(Vec<OptionValue>),
    /// Ordered mapping, addressable by nested paths.
    Map(IndexMap<String, OptionValue>),
    Object(Arc<dyn OptionObject>),
}

impl OptionValue {
    /// Returns the runtime type tag, or `None` for null.
    ///
    /// Lists and maps share the `array` tag.
    pub fn value_type(&self) -> Option<OptionType> {
        match self {
            OptionValue::Null => None,
            OptionValue::Bool(_) => Some(OptionType::Boolean),
            OptionValue::Integer(_) => Some(OptionType::Integer),
            OptionValue::Double(_) => Some(OptionType::Double),
            OptionValue::String(_) => Some(OptionType::String),
            OptionValue::Array(_) | OptionValue::Map(_) => Some(OptionType::Array),
            OptionValue::Object(_) => Some(OptionType::Object),
        }
    }

    /// Type name as reported in diagnostics; objects report their class.
    pub fn type_name(&self) -> String {
        match self {
            OptionValue::Null => "null".to_string(),
            OptionValue::Object(obj) => obj.class_name().to_string(),
            other => other
                .value_type()
                .map(|t| t.to_string())
                .unwrap_or_default(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, OptionValue::Null)
    }

    /// Returns true for lists, maps and objects.
    pub fn is_compound(&self) -> bool {
        matches!(
            self,
            OptionValue::Array(_) | OptionValue::Map(_) | OptionValue::Object(_)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            OptionValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Integer(i) => Some(*i as f64),
            OptionValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, OptionValue>> {
        match self {
            OptionValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<dyn OptionObject>> {
        match self {
            OptionValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Elements of a list, or the values of a map in order.
    pub fn elements(&self) -> Option<Vec<&OptionValue>> {
        match self {
            OptionValue::Array(items) => Some(items.iter().collect()),
            OptionValue::Map(map) => Some(map.values().collect()),
            _ => None,
        }
    }

    /// Converts this value into a `serde_json::Value` snapshot.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            OptionValue::Null => serde_json::Value::Null,
            OptionValue::Bool(b) => serde_json::Value::Bool(*b),
            OptionValue::Integer(i) => serde_json::Value::from(*i),
            OptionValue::Double(d) => serde_json::Value::from(*d),
            OptionValue::String(s) => serde_json::Value::String(s.clone()),
            OptionValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(OptionValue::to_json).collect())
            }
            OptionValue::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            OptionValue::Object(obj) => obj.to_json(),
        }
    }

    /// Loose equality used for allowed-value membership.
    ///
    /// Integers and doubles compare numerically, and a numeric string
    /// compares numerically against a number. Everything else must be
    /// of the same kind.
    pub fn loosely_equals(&self, other: &OptionValue) -> bool {
        match (self, other) {
            (OptionValue::Null, OptionValue::Null) => true,
            (OptionValue::Bool(a), OptionValue::Bool(b)) => a == b,
            (OptionValue::String(a), OptionValue::String(b)) => a == b,
            (OptionValue::String(s), n @ (OptionValue::Integer(_) | OptionValue::Double(_)))
            | (n @ (OptionValue::Integer(_) | OptionValue::Double(_)), OptionValue::String(s)) => {
                match (s.trim().parse::<f64>(), n.as_f64()) {
                    (Ok(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            (
                OptionValue::Integer(_) | OptionValue::Double(_),
                OptionValue::Integer(_) | OptionValue::Double(_),
            ) => self.as_f64() == other.as_f64(),
            (OptionValue::Array(a), OptionValue::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loosely_equals(y))
            }
            (OptionValue::Map(a), OptionValue::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.loosely_equals(w)))
            }
            (OptionValue::Array(a), OptionValue::Map(b))
            | (OptionValue::Map(b), OptionValue::Array(a)) => a.is_empty() && b.is_empty(),
            (OptionValue::Object(_), OptionValue::Object(_)) => self == other,
            _ => false,
        }
    }
}

impl PartialEq for OptionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OptionValue::Null, OptionValue::Null) => true,
            (OptionValue::Bool(a), OptionValue::Bool(b)) => a == b,
            (OptionValue::Integer(a), OptionValue::Integer(b)) => a == b,
            (OptionValue::Double(a), OptionValue::Double(b)) => a == b,
            (OptionValue::String(a), OptionValue::String(b)) => a == b,
            (OptionValue::Array(a), OptionValue::Array(b)) => a == b,
            (OptionValue::Map(a), OptionValue::Map(b)) => a == b,
            (OptionValue::Object(a), OptionValue::Object(b)) => {
                Arc::ptr_eq(a, b)
                    || (a.class_name() == b.class_name() && a.to_json() == b.to_json())
            }
            _ => false,
        }
    }
}

impl fmt::Display for OptionValue {
    /// Prints scalars bare; compound values print as JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Null => Ok(()),
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Integer(i) => write!(f, "{}", i),
            OptionValue::Double(d) => write!(f, "{}", d),
            OptionValue::String(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl Serialize for OptionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptionValue::Null => serializer.serialize_unit(),
            OptionValue::Bool(b) => serializer.serialize_bool(*b),
            OptionValue::Integer(i) => serializer.serialize_i64(*i),
            OptionValue::Double(d) => serializer.serialize_f64(*d),
            OptionValue::String(s) => serializer.serialize_str(s),
            OptionValue::Array(items) => serializer.collect_seq(items),
            OptionValue::Map(map) => serializer.collect_map(map),
            OptionValue::Object(obj) => obj.to_json().serialize(serializer),
        }
    }
}

impl From<serde_json::Value> for OptionValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => OptionValue::Null,
            serde_json::Value::Bool(b) => OptionValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => OptionValue::Integer(i),
                None => OptionValue::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => OptionValue::String(s),
            serde_json::Value::Array(items) => {
                OptionValue::Array(items.into_iter().map(OptionValue::from).collect())
            }
            serde_json::Value::Object(map) => OptionValue::Map(
                map.into_iter().map(|(k, v)| (k, OptionValue::from(v))).collect(),
            ),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Integer(i)
    }
}

impl From<i32> for OptionValue {
    fn from(i: i32) -> Self {
        OptionValue::Integer(i64::from(i))
    }
}

impl From<f64> for OptionValue {
    fn from(d: f64) -> Self {
        OptionValue::Double(d)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::String(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::String(s)
    }
}

impl From<Vec<OptionValue>> for OptionValue {
    fn from(items: Vec<OptionValue>) -> Self {
        OptionValue::Array(items)
    }
}

impl From<IndexMap<String, OptionValue>> for OptionValue {
    fn from(map: IndexMap<String, OptionValue>) -> Self {
        OptionValue::Map(map)
    }
}

impl<T: OptionObject + 'static> From<Arc<T>> for OptionValue {
    fn from(obj: Arc<T>) -> Self {
        OptionValue::Object(obj)
    }
}
