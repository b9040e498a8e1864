//! Request-scoped dynamic value bag.
//!
//! # Responsibilities
//! - Carry route defaults, captured placeholders and handler data
//! - Expose typed accessors that fail on mismatch instead of coercing
//!
//! # Design Decisions
//! - Values are a closed tagged union (string, int, bool, nested stash)
//! - Merge is shallow and last-writer-wins per key
//! - Serializes as a plain map so templates can read it directly

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// A single stash value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    Stash(Stash),
}

impl Value {
    /// Human readable name of the variant, used in mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Stash(_) => "stash",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Stash(stash) => {
                let json = serde_json::to_string(stash).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<u16> for Value {
    fn from(n: u16) -> Self {
        Value::Int(n.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Stash> for Value {
    fn from(stash: Stash) -> Self {
        Value::Stash(stash)
    }
}

/// String-keyed map of [`Value`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Stash(HashMap<String, Value>);

impl Stash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Typed string lookup. `Ok(None)` when absent, an error when the
    /// key holds something other than a string.
    pub fn get_str(&self, key: &str) -> Result<Option<&str>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s)),
            Some(other) => Err(mismatch(key, "string", other)),
        }
    }

    /// Typed integer lookup, see [`Stash::get_str`].
    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(Value::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(mismatch(key, "int", other)),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Copy every entry of `other` into this stash, overwriting existing
    /// keys. Nested stashes are replaced, not merged.
    pub fn merge(&mut self, other: &Stash) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn mismatch(key: &str, expected: &'static str, found: &Value) -> Error {
    Error::StashTypeMismatch {
        key: key.to_string(),
        expected,
        found: found.type_name(),
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Stash {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Stash {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_last_writer_wins() {
        let mut stash = Stash::from([("foo", "bar"), ("keep", "me")]);
        stash.merge(&Stash::from([("foo", "baz")]));

        assert_eq!(stash.get_str("foo").unwrap(), Some("baz"));
        assert_eq!(stash.get_str("keep").unwrap(), Some("me"));
        assert_eq!(stash.len(), 2);
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut stash = Stash::new();
        stash.insert("user", Stash::from([("name", "fry"), ("job", "delivery boy")]));
        stash.merge(&Stash::from([("user", Stash::from([("name", "leela")]))]));

        let Some(Value::Stash(user)) = stash.get("user") else {
            panic!("nested stash missing");
        };
        assert_eq!(user.get_str("name").unwrap(), Some("leela"));
        assert!(!user.contains_key("job"));
    }

    #[test]
    fn test_typed_accessors() {
        let mut stash = Stash::new();
        stash.insert("status", 404);
        stash.insert("name", "bender");

        assert_eq!(stash.get_int("status").unwrap(), Some(404));
        assert_eq!(stash.get_str("missing").unwrap(), None);

        let err = stash.get_str("status").unwrap_err();
        assert!(matches!(
            err,
            Error::StashTypeMismatch { expected: "string", found: "int", .. }
        ));
        assert!(stash.get_int("name").is_err());
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let stash = Stash::from([("who", Value::from("World")), ("admin", Value::from(true))]);
        let json = serde_json::to_value(&stash).unwrap();
        assert_eq!(json, serde_json::json!({ "who": "World", "admin": true }));
    }
}
