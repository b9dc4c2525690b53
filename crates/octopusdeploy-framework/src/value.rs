//! Terraform values
//!
//! A [`Value`] is what Terraform hands a provider: configuration, plans and
//! state. Unlike JSON it has an `Unknown` variant (known only after apply)
//! and distinguishes sets from lists.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::{FrameworkError, Result};
use crate::path::{AttributePath, PathStep};

#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Unknown,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<Value>),
    /// Element order is not significant
    Set(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(BTreeMap<String, Value>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Unknown, Value::Unknown) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => same_elements(a, b),
            (Value::Map(a), Value::Map(b)) | (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

fn numbers_equal(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x == y,
        _ => a.as_f64() == b.as_f64(),
    }
}

fn same_elements(a: &[Value], b: &[Value]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut matched = vec![false; b.len()];
    'outer: for item in a {
        for (i, candidate) in b.iter().enumerate() {
            if !matched[i] && item == candidate {
                matched[i] = true;
                continue 'outer;
            }
        }
        return false;
    }
    true
}

impl Value {
    /// Build an object from name/value pairs
    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a list of strings
    pub fn string_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::List(items.into_iter().map(|s| Value::String(s.into())).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    /// True when neither this value nor anything inside it is unknown
    pub fn is_fully_known(&self) -> bool {
        match self {
            Value::Unknown => false,
            Value::List(items) | Value::Set(items) => items.iter().all(Value::is_fully_known),
            Value::Map(entries) | Value::Object(entries) => {
                entries.values().all(Value::is_fully_known)
            }
            _ => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Elements of a list or set
    pub fn as_elements(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Entries of an object or map
    pub fn as_entries(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(entries) | Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_entries_mut(&mut self) -> Option<&mut BTreeMap<String, Value>> {
        match self {
            Value::Object(entries) | Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Attribute of an object; null when absent
    pub fn get(&self, name: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.as_entries()
            .and_then(|entries| entries.get(name))
            .unwrap_or(&NULL)
    }

    /// Set an attribute on an object, turning null into an empty object
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        if self.is_null() {
            *self = Value::Object(BTreeMap::new());
        }
        if let Some(entries) = self.as_entries_mut() {
            entries.insert(name.into(), value);
        }
    }

    /// Builder form of [`Value::set`]
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    /// Walk a path; `None` when a step does not exist
    pub fn get_path(&self, path: &AttributePath) -> Option<&Value> {
        let mut current = self;
        for step in path.steps() {
            current = match (step, current) {
                (PathStep::Attribute(name), Value::Object(entries)) => entries.get(name)?,
                (PathStep::Key(key), Value::Map(entries)) => entries.get(key)?,
                (PathStep::Index(index), Value::List(items) | Value::Set(items)) => {
                    items.get(*index)?
                }
                _ => return None,
            };
        }
        Some(current)
    }

    /// Convert from JSON; arrays become lists and objects become objects
    pub fn from_json(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => Value::Number(n),
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::List(items.into_iter().map(Value::from_json).collect()),
            JsonValue::Object(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert to JSON; fails on unknown values
    pub fn to_json(&self) -> Result<JsonValue> {
        self.to_json_at(&AttributePath::root())
    }

    fn to_json_at(&self, path: &AttributePath) -> Result<JsonValue> {
        Ok(match self {
            Value::Unknown => {
                return Err(FrameworkError::UnknownValue {
                    path: path.to_string(),
                });
            }
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Number(n) => JsonValue::Number(n.clone()),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::List(items) | Value::Set(items) => JsonValue::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| v.to_json_at(&path.clone().index(i)))
                    .collect::<Result<_>>()?,
            ),
            Value::Map(entries) | Value::Object(entries) => JsonValue::Object(
                entries
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), v.to_json_at(&path.clone().attr(k))?)))
                    .collect::<Result<_>>()?,
            ),
        })
    }

    /// Convert to JSON for decoding: unknown becomes null and null object
    /// members are dropped
    fn to_decodable_json(&self) -> JsonValue {
        match self {
            Value::Null | Value::Unknown => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Number(n) => JsonValue::Number(n.clone()),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::List(items) | Value::Set(items) => {
                JsonValue::Array(items.iter().map(Value::to_decodable_json).collect())
            }
            Value::Map(entries) | Value::Object(entries) => JsonValue::Object(
                entries
                    .iter()
                    .filter(|(_, v)| !v.is_null() && !v.is_unknown())
                    .map(|(k, v)| (k.clone(), v.to_decodable_json()))
                    .collect(),
            ),
        }
    }

    /// Decode into a model struct
    ///
    /// Unknown and null attributes are treated as absent, so `Option` fields
    /// become `None` and `#[serde(default)]` collections become empty.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.to_decodable_json())
            .map_err(|e| FrameworkError::Decode(e.to_string()))
    }

    /// Encode a model struct
    pub fn encode<T: Serialize>(model: &T) -> Result<Value> {
        let json = serde_json::to_value(model).map_err(|e| FrameworkError::Encode(e.to_string()))?;
        Ok(Value::from_json(json))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Model {
        id: Option<String>,
        name: String,
        #[serde(default)]
        tags: Vec<String>,
    }

    #[test]
    fn test_set_equality_ignores_order() {
        let a = Value::Set(vec!["a".into(), "b".into(), "b".into()]);
        let b = Value::Set(vec!["b".into(), "a".into(), "b".into()]);
        let c = Value::Set(vec!["a".into(), "a".into(), "b".into()]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(
            Value::List(vec!["a".into(), "b".into()]),
            Value::List(vec!["b".into(), "a".into()])
        );
    }

    #[test]
    fn test_number_equality() {
        assert_eq!(Value::from(3), Value::from_json(json!(3)));
        assert_eq!(Value::from_json(json!(1.5)), Value::from_json(json!(1.5)));
        assert_ne!(Value::from(3), Value::from(4));
    }

    #[test]
    fn test_decode_treats_unknown_and_null_as_absent() {
        let value = Value::object([
            ("id", Value::Unknown),
            ("name", Value::from("Production")),
            ("tags", Value::Null),
        ]);
        let model: Model = value.decode().unwrap();
        assert_eq!(
            model,
            Model {
                id: None,
                name: "Production".to_string(),
                tags: vec![],
            }
        );
    }

    #[test]
    fn test_encode_and_get() {
        let value = Value::encode(&Model {
            id: Some("Environments-1".to_string()),
            name: "Dev".to_string(),
            tags: vec!["a".to_string()],
        })
        .unwrap();
        assert_eq!(value.get("id").as_str(), Some("Environments-1"));
        assert_eq!(value.get("tags"), &Value::string_list(["a"]));
        assert!(value.get("missing").is_null());
    }

    #[test]
    fn test_to_json_rejects_unknown() {
        let value = Value::object([("list", Value::List(vec![Value::Unknown]))]);
        let err = value.to_json().unwrap_err();
        assert_eq!(err.to_string(), "Value is not fully known at list[0]");
        assert!(!value.is_fully_known());
    }

    #[test]
    fn test_get_path() {
        let value = Value::from_json(json!({
            "phase": [{"name": "Dev", "policy": [{"unit": "Days"}]}]
        }));
        let path = AttributePath::new("phase").index(0).attr("policy").index(0).attr("unit");
        assert_eq!(value.get_path(&path), Some(&Value::from("Days")));
        assert_eq!(value.get_path(&AttributePath::new("phase").index(3)), None);
    }

    #[test]
    fn test_set_on_null_creates_object() {
        let mut value = Value::Null;
        value.set("id", "x".into());
        assert_eq!(value.get("id").as_str(), Some("x"));
    }
}
