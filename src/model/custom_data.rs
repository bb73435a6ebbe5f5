//! Custom data tags attached to types and members.
//!
//! Decorators use custom data to attach cross-cutting semantics (for example
//! "this field is the persistence identifier") that unrelated ITD generators
//! later read without knowing who put them there.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An ordered map of tag key to tag values. A tag without values is a marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomData(BTreeMap<String, Vec<String>>);

impl CustomData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Set `key` to `values`, returning whether anything changed.
    pub fn put(&mut self, key: impl Into<String>, values: Vec<String>) -> bool {
        let key = key.into();
        if self.0.get(&key) == Some(&values) {
            return false;
        }
        self.0.insert(key, values);
        true
    }

    /// Builder-style variant of [`CustomData::put`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, values: Vec<String>) -> Self {
        self.put(key, values);
        self
    }

    /// Remove `key`, returning whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.0.remove(key).is_some()
    }
}
