// Binary telemetry decoder
// Parses eagerly and keeps whatever decoded before the first anomaly

use super::parser::{parse_field_header, parse_value};
use super::tags::TypeTag;
use super::value::WireValue;
use crate::formats::keymap::KeyMap;
use std::collections::HashMap;

/// Decoded view of one telemetry record
#[derive(Debug, Clone, Default)]
pub struct BinaryDecoder {
    values: HashMap<String, WireValue>,
    order: Vec<String>,
    consumed: usize,
    total: usize,
}

impl BinaryDecoder {
    /// Decode `data`, naming fields from `key_map` when given.
    ///
    /// Radio frames arrive truncated often enough that a partial record is more
    /// useful than none: a short header, a short payload or a reserved tag ends
    /// the scan, and every field before it is kept. This never fails.
    pub fn new(data: &[u8], key_map: Option<&KeyMap>) -> Self {
        let empty = KeyMap::new();
        let key_map = key_map.unwrap_or(&empty);

        let mut decoder = Self {
            total: data.len(),
            ..Default::default()
        };

        let mut input = data;
        while !input.is_empty() {
            let (rest, (hash, raw_tag)) = match parse_field_header(input) {
                Ok(parsed) => parsed,
                Err(_) => {
                    tracing::debug!(remaining = input.len(), "truncated field header, stopping");
                    break;
                }
            };

            let Some(tag) = TypeTag::from_wire(raw_tag) else {
                tracing::warn!(
                    tag = raw_tag,
                    offset = data.len() - input.len(),
                    "reserved type tag, stopping"
                );
                break;
            };

            let (rest, value) = match parse_value(tag, rest) {
                Ok(parsed) => parsed,
                Err(_) => {
                    tracing::debug!(
                        %tag,
                        remaining = rest.len(),
                        "truncated field payload, stopping"
                    );
                    break;
                }
            };

            decoder.insert(key_map.resolve(hash), value);
            input = rest;
            decoder.consumed = data.len() - input.len();
        }

        tracing::debug!(
            fields = decoder.order.len(),
            consumed = decoder.consumed,
            total = decoder.total,
            "decoded record"
        );
        decoder
    }

    // A later field with the same resolved name overwrites the value in place
    fn insert(&mut self, name: String, value: WireValue) {
        if self.values.insert(name.clone(), value).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, key: &str) -> Option<&WireValue> {
        self.values.get(key)
    }

    pub fn get_int(&self, key: &str) -> Option<i128> {
        self.get(key).and_then(WireValue::as_int)
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(WireValue::as_float)
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).map(WireValue::to_string)
    }

    /// Copy of every decoded name -> value pair
    pub fn get_all(&self) -> HashMap<String, WireValue> {
        self.values.clone()
    }

    /// Decoded fields in wire order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &WireValue)> {
        self.order
            .iter()
            .filter_map(|name| self.values.get(name).map(|value| (name.as_str(), value)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Bytes covered by fully decoded fields
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// True when every input byte belonged to a decoded field
    pub fn is_complete(&self) -> bool {
        self.consumed == self.total
    }
}
