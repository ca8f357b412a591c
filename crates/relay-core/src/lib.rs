//! Core decoding engine for the syslog relay
//! turns vendor syslog dialects (Stormshield WELF, Synology free text) into
//! vendor-tagged JSON envelopes, or passes the line through untouched.
pub mod classify;
pub mod decoder;
pub mod dialect;
pub mod error;
pub mod extract;
pub mod line;
pub mod normalize;

pub use classify::{Category, Classifier, Summary};
pub use decoder::{Decision, Decoder};
pub use dialect::{Capture, DecoderRegistry, Dialect, DialectRule, Membership};
pub use error::{DecodeError, PatternError};
pub use normalize::NormalizeStep;

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

// FIELD MAP //

/// Insertion-ordered map of normalized field name -> string value.
///
/// Keys are unique. Inserting an existing key overwrites its value in place,
/// so the position of the first insertion is kept. Lookups go through a
/// key -> position index, lines with thousands of keys stay linear.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&pos| self.entries[pos].1.as_str())
    }

    /// Value of `key`, or `""` when absent. Handy for summaries.
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut String> {
        let pos = *self.index.get(key)?;
        Some(&mut self.entries[pos].1)
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

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut String> {
        self.entries.iter_mut().map(|(_, v)| v)
    }
}

// the index is derived from the entries, order is what matters
impl PartialEq for FieldMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for FieldMap {}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ENVELOPE //

/// Tagged JSON wrapper handed to the downstream listener:
/// `{"integration": <tag>, <tag>: {...fields}}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub integration: &'static str,
    pub fields: FieldMap,
}

impl Envelope {
    pub fn new(integration: &'static str, fields: FieldMap) -> Self {
        Self { integration, fields }
    }

    /// Single-line JSON. serde_json never emits raw newlines in compact
    /// mode, control characters inside values are escaped.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("integration", self.integration)?;
        map.serialize_entry(self.integration, &self.fields)?;
        map.end()
    }
}
