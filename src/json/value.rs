//! In-memory JSON value tree

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// A JSON number, keeping the integer/float distinction of the source text
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Number::Int(i) => Some(i),
            Number::Float(_) => None,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }
}

// Int and Float share one numeric domain: Int(3) == Float(3.0)
impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Self {
        Number::Int(i)
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Number::Float(f)
    }
}

/// Insertion-ordered string-keyed map with unique keys
///
/// Re-inserting an existing key replaces its value in place, so the key keeps
/// its original position.
#[derive(Debug, Clone, Default)]
pub struct Map {
    entries: Vec<(String, JsonValue)>,
    index: HashMap<String, usize>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key, returning the value it replaced (if any)
    pub fn insert(&mut self, key: impl Into<String>, value: JsonValue) -> Option<JsonValue> {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut JsonValue> {
        let i = *self.index.get(key)?;
        Some(&mut self.entries[i].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

// Mapping semantics: key order does not affect equality
impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Into<String>> FromIterator<(K, JsonValue)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, JsonValue)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// A dynamically typed JSON value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JsonValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<JsonValue>),
    Object(Map),
}

impl JsonValue {
    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsonValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            JsonValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value as `f64`, whichever subtype it was parsed as
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(|n| n.as_f64())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            JsonValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key when this value is an object
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.as_object().and_then(|map| map.get(key))
    }
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::serialize(self))
    }
}

impl FromStr for JsonValue {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        super::parse(s)
    }
}

impl From<bool> for JsonValue {
    fn from(b: bool) -> Self {
        JsonValue::Bool(b)
    }
}

impl From<i64> for JsonValue {
    fn from(i: i64) -> Self {
        JsonValue::Number(Number::Int(i))
    }
}

impl From<u32> for JsonValue {
    fn from(i: u32) -> Self {
        JsonValue::Number(Number::Int(i64::from(i)))
    }
}

impl From<f64> for JsonValue {
    fn from(f: f64) -> Self {
        JsonValue::Number(Number::Float(f))
    }
}

impl From<&str> for JsonValue {
    fn from(s: &str) -> Self {
        JsonValue::String(s.to_owned())
    }
}

impl From<String> for JsonValue {
    fn from(s: String) -> Self {
        JsonValue::String(s)
    }
}

impl From<Vec<JsonValue>> for JsonValue {
    fn from(items: Vec<JsonValue>) -> Self {
        JsonValue::Array(items)
    }
}

impl From<Map> for JsonValue {
    fn from(map: Map) -> Self {
        JsonValue::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_and_float_compare_equal() {
        assert_eq!(Number::Int(3), Number::Float(3.0));
        assert_ne!(Number::Int(3), Number::Float(3.5));
        assert_eq!(JsonValue::from(3i64), JsonValue::from(3.0));
    }

    #[test]
    fn test_map_repeated_key_overwrites_in_place() {
        let mut map = Map::new();
        map.insert("a", JsonValue::from(1i64));
        map.insert("b", JsonValue::from(2i64));
        let old = map.insert("a", JsonValue::from(9i64));

        assert_eq!(old, Some(JsonValue::from(1i64)));
        assert_eq!(map.len(), 2);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&JsonValue::from(9i64)));
    }

    #[test]
    fn test_map_equality_ignores_order() {
        let a: Map = [("x", JsonValue::Null), ("y", JsonValue::Bool(true))]
            .into_iter()
            .collect();
        let b: Map = [("y", JsonValue::Bool(true)), ("x", JsonValue::Null)]
            .into_iter()
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_accessors() {
        let mut map = Map::new();
        map.insert("n", JsonValue::from(1.5));
        let value = JsonValue::Object(map);

        assert_eq!(value.get("n").and_then(JsonValue::as_f64), Some(1.5));
        assert!(value.get("missing").is_none());
        assert!(JsonValue::from("s").get("n").is_none());
        assert_eq!(JsonValue::from(7u32).as_f64(), Some(7.0));
    }
}
