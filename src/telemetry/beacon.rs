// Periodic status beacon
// Collects readings from telemetry sources and transmits them as a binary record

use crate::core::constants::MAX_STRING_LEN;
use crate::encoding::{BinaryDecoder, BinaryEncoder, EncodeError};
use crate::formats::keymap::KeyMap;
use crate::link::{LinkError, PacketLink};
use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SensorError {
    #[error("Sensor read failed: {0}")]
    Read(String),

    #[error("Sensor not responding")]
    NotResponding,
}

#[derive(Error, Debug)]
pub enum BeaconError {
    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Link error: {0}")]
    Link(#[from] LinkError),
}

pub type Result<T> = std::result::Result<T, BeaconError>;

/// A timestamped measurement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    /// Seconds since the Unix epoch
    pub timestamp: f64,
    pub value: ReadingValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReadingValue {
    Scalar(f64),
    Vector([f64; 3]),
}

/// One entry of the beacon state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BeaconValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Vector([f64; 3]),
    Reading(SensorReading),
}

/// Ordered beacon state
pub type BeaconState = Vec<(String, BeaconValue)>;

/// Outcome of reading one entry of a source
pub type SensorResult = std::result::Result<BeaconValue, SensorError>;

/// Something the beacon can report on: a sensor, a flag, a counter.
///
/// Entry keys are suffixes. The beacon stores them as
/// `<name>_<index>_<suffix>`, or `<name>_<index>` when the suffix is empty.
pub trait TelemetrySource: Send {
    fn name(&self) -> &str;

    /// Read the current values. Each entry succeeds or fails on its own.
    fn sample(&mut self) -> Vec<(String, SensorResult)>;

    /// Entries with the same keys and shapes as `sample`, without touching hardware
    fn template(&self) -> Vec<(String, BeaconValue)>;
}

pub struct Beacon {
    name: String,
    boot_time: DateTime<Utc>,
    sources: Vec<Box<dyn TelemetrySource>>,
}

impl Beacon {
    pub fn new(name: impl Into<String>, boot_time: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            boot_time,
            sources: Vec::new(),
        }
    }

    /// Append a source. Its position becomes the index in its keys.
    pub fn add_source(&mut self, source: impl TelemetrySource + 'static) -> &mut Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sample every source. A failed reading is logged and left out; the
    /// rest of its source is still reported.
    pub fn build_state(&mut self, now: DateTime<Utc>) -> BeaconState {
        let uptime = (now - self.boot_time).num_milliseconds() as f64 / 1000.0;
        let mut state: BeaconState = vec![
            ("name".to_string(), BeaconValue::Text(self.name.clone())),
            (
                "time".to_string(),
                BeaconValue::Text(now.format("%Y-%m-%d %H:%M:%S").to_string()),
            ),
            ("uptime".to_string(), BeaconValue::Float(uptime)),
        ];

        for (index, source) in self.sources.iter_mut().enumerate() {
            let prefix = format!("{}_{}", source.name(), index);
            for (suffix, reading) in source.sample() {
                match reading {
                    Ok(value) => state.push((source_key(&prefix, &suffix), value)),
                    Err(e) => {
                        error!(sensor = source.name(), index, entry = %suffix, error = %e, "Error sampling telemetry source");
                    }
                }
            }
        }

        state
    }

    /// Sample and encode in one step
    pub fn encode(&mut self, now: DateTime<Utc>) -> Result<(Vec<u8>, KeyMap)> {
        let state = self.build_state(now);
        Ok(encode_state(&state)?)
    }

    /// Key map covering every field this beacon can produce, built from
    /// source templates so sensors are never read
    pub fn generate_key_mapping(&self) -> Result<KeyMap> {
        let mut state: BeaconState = vec![
            ("name".to_string(), BeaconValue::Text(self.name.clone())),
            ("time".to_string(), BeaconValue::Text("template".to_string())),
            ("uptime".to_string(), BeaconValue::Float(0.0)),
        ];
        for (index, source) in self.sources.iter().enumerate() {
            let prefix = format!("{}_{}", source.name(), index);
            state.extend(
                source
                    .template()
                    .into_iter()
                    .map(|(suffix, value)| (source_key(&prefix, &suffix), value)),
            );
        }

        let (_, key_map) = encode_state(&state)?;
        Ok(key_map)
    }

    /// Legacy JSON beacon, keys in state order
    pub fn to_json(&mut self, now: DateTime<Utc>) -> Result<String> {
        let state = self.build_state(now);
        Ok(serde_json::to_string(&OrderedState(&state))?)
    }

    /// Transmit the binary beacon
    pub async fn send<L: PacketLink>(&mut self, link: &mut L, now: DateTime<Utc>) -> Result<bool> {
        let (bytes, _) = self.encode(now)?;
        debug!(bytes = bytes.len(), "Sending beacon");
        Ok(link.send(&bytes).await?)
    }

    /// Transmit the legacy JSON beacon
    pub async fn send_json<L: PacketLink>(
        &mut self,
        link: &mut L,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let json = self.to_json(now)?;
        debug!(bytes = json.len(), "Sending JSON beacon");
        Ok(link.send(json.as_bytes()).await?)
    }
}

fn source_key(prefix: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}_{suffix}")
    }
}

/// Encode a beacon state.
///
/// Bools and ints take the smallest integer width, floats go out as
/// float32, text is cut to 255 bytes, vectors split into `<key>_0..2` and
/// readings into `<key>_timestamp` plus `<key>_value` or `<key>_value_0..2`.
pub fn encode_state(state: &[(String, BeaconValue)]) -> std::result::Result<(Vec<u8>, KeyMap), EncodeError> {
    let mut encoder = BinaryEncoder::new();

    for (key, value) in state {
        match value {
            BeaconValue::Bool(b) => encoder.add_int_auto(key, i64::from(*b))?,
            BeaconValue::Int(i) => encoder.add_int_auto(key, *i)?,
            BeaconValue::Float(f) => encoder.add_float(key, *f, false),
            BeaconValue::Text(text) => {
                encoder.add_string(key, truncate_utf8(text, MAX_STRING_LEN), MAX_STRING_LEN)?
            }
            BeaconValue::Vector(v) => add_vector(&mut encoder, key, v),
            BeaconValue::Reading(reading) => {
                encoder.add_float(&format!("{key}_timestamp"), reading.timestamp, false);
                let value_key = format!("{key}_value");
                match &reading.value {
                    ReadingValue::Scalar(f) => encoder.add_float(&value_key, *f, false),
                    ReadingValue::Vector(v) => add_vector(&mut encoder, &value_key, v),
                }
            }
        }
    }

    let bytes = encoder.to_bytes();
    Ok((bytes, encoder.get_key_map()))
}

fn add_vector(encoder: &mut BinaryEncoder, key: &str, v: &[f64; 3]) {
    for (i, component) in v.iter().enumerate() {
        encoder.add_float(&format!("{key}_{i}"), *component, false);
    }
}

// Longest prefix of `s` within `max` bytes that ends on a char boundary
fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Decode a beacon received from another satellite
pub fn decode_binary_beacon(data: &[u8], key_map: Option<&KeyMap>) -> BinaryDecoder {
    BinaryDecoder::new(data, key_map)
}

struct OrderedState<'a>(&'a [(String, BeaconValue)]);

impl Serialize for OrderedState<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
