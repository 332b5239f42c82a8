// Metadata stored alongside a captured telemetry record

use super::keymap::KeyMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata trailer of a capture file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CaptureMetadata {
    /// Satellite the record came from
    #[serde(default)]
    pub cubesat_name: String,

    /// Crate version that wrote the file
    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,

    /// Signal strength when the record was received, in dBm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rssi: Option<i16>,

    /// Names for the record's key hashes
    #[serde(default)]
    pub key_map: KeyMap,

    /// Additional properties
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl CaptureMetadata {
    pub fn new(cubesat_name: impl Into<String>, key_map: KeyMap) -> Self {
        Self {
            cubesat_name: cubesat_name.into(),
            version: crate::VERSION.to_string(),
            key_map,
            ..Default::default()
        }
    }

    pub fn with_reception(mut self, captured_at: DateTime<Utc>, rssi: Option<i16>) -> Self {
        self.captured_at = Some(captured_at);
        self.rssi = rssi;
        self
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.extra.insert(key.into(), value);
    }

    pub fn get_extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
