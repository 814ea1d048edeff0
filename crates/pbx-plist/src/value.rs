use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A dictionary with canonical (sorted) key ordering.
pub type Dictionary = BTreeMap<String, Value>;

/// A property-list value in the subset the project format uses.
///
/// Everything is a string at the leaves; the format has no native numbers or
/// booleans (`archiveVersion = 1` is the string `"1"`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    String(String),
    Array(Vec<Value>),
    Dict(Dictionary),
}

impl Value {
    /// Convenience constructor for a string value.
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// The string contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The elements, if this is an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The entries, if this is a dict.
    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Value::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    /// Dict entry lookup; `None` for non-dicts and missing keys.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_dict().and_then(|d| d.get(key))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}
