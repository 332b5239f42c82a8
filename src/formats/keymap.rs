// Hash -> field name table needed to decode a telemetry record
// Sent out-of-band as a JSON sidecar: {"<hash as decimal>": "<name>"}

use crate::encoding::hash::{key_hash, placeholder_name};
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyMapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse key map JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KeyMapError>;

/// Mapping from 32-bit key hash to the original field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyMap {
    names: BTreeMap<u32, String>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pre-shared map from a known schema
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut map = Self::new();
        for key in keys {
            map.insert(key_hash(key), key);
        }
        map
    }

    /// Bind `hash` to `name`, returning the name it was bound to before
    pub fn insert(&mut self, hash: u32, name: impl Into<String>) -> Option<String> {
        self.names.insert(hash, name.into())
    }

    pub fn get(&self, hash: u32) -> Option<&str> {
        self.names.get(&hash).map(String::as_str)
    }

    /// Field name for `hash`, or the `field_<hex>` placeholder when unknown
    pub fn resolve(&self, hash: u32) -> String {
        match self.get(hash) {
            Some(name) => name.to_string(),
            None => placeholder_name(hash),
        }
    }

    pub fn contains(&self, hash: u32) -> bool {
        self.names.contains_key(&hash)
    }

    /// Copy every entry of `other` into this map; `other` wins on conflicts
    pub fn merge(&mut self, other: &KeyMap) {
        for (hash, name) in other.iter() {
            self.names.insert(hash, name.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.names.iter().map(|(hash, name)| (*hash, name.as_str()))
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON sidecar file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write a JSON sidecar file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

impl FromIterator<(u32, String)> for KeyMap {
    fn from_iter<T: IntoIterator<Item = (u32, String)>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for KeyMap {
    type Item = (u32, String);
    type IntoIter = btree_map::IntoIter<u32, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.into_iter()
    }
}
