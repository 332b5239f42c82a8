// Binary telemetry encoder
// Record layout: [key_hash:4 BE][type_tag:1][payload]... with no record header

use super::hash::key_hash;
use super::tags::IntWidth;
use super::value::WireValue;
use crate::core::constants::{FIELD_HEADER_LEN, MAX_STRING_LEN};
use crate::formats::keymap::KeyMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Unsupported integer size: {0} (expected 1, 2, 4 or 8)")]
    UnsupportedIntSize(usize),

    #[error("Integer {value} does not fit in {size} byte(s)")]
    IntOutOfRange { value: i128, size: usize },

    #[error("String too long: {len} > {max}")]
    StringTooLong { len: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, EncodeError>;

/// Accumulates named values and serializes them into one telemetry record
#[derive(Debug, Clone, Default)]
pub struct BinaryEncoder {
    fields: Vec<(String, WireValue)>,
    key_map: KeyMap,
}

impl BinaryEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an integer pinned to `size` bytes (1, 2, 4 or 8).
    /// The signed tag is used when the value fits it, otherwise the unsigned one.
    pub fn add_int(&mut self, key: &str, value: impl Into<i128>, size: usize) -> Result<()> {
        let width = IntWidth::from_size(size).ok_or(EncodeError::UnsupportedIntSize(size))?;
        self.add_int_with_width(key, value.into(), width)
    }

    /// Add an integer using the smallest width that holds it
    pub fn add_int_auto(&mut self, key: &str, value: impl Into<i128>) -> Result<()> {
        let value = value.into();
        self.add_int_with_width(key, value, IntWidth::for_value(value))
    }

    fn add_int_with_width(&mut self, key: &str, value: i128, width: IntWidth) -> Result<()> {
        let wire = WireValue::from_int(value, width).ok_or(EncodeError::IntOutOfRange {
            value,
            size: width.size(),
        })?;
        self.push(key, wire);
        Ok(())
    }

    /// Add a float as float64 when `double_precision` is set, float32 otherwise
    pub fn add_float(&mut self, key: &str, value: f64, double_precision: bool) {
        let wire = if double_precision {
            WireValue::Float64(value)
        } else {
            WireValue::Float32(value as f32)
        };
        self.push(key, wire);
    }

    /// Add a length-prefixed UTF-8 string of at most `max_length` bytes (capped at 255)
    pub fn add_string(&mut self, key: &str, value: &str, max_length: usize) -> Result<()> {
        let max = max_length.min(MAX_STRING_LEN);
        let len = value.len();
        if len > max {
            return Err(EncodeError::StringTooLong { len, max });
        }
        self.push(key, WireValue::String(value.to_string()));
        Ok(())
    }

    /// Add an already-typed value. Strings longer than 255 bytes are rejected.
    pub fn add_value(&mut self, key: &str, value: WireValue) -> Result<()> {
        if let WireValue::String(s) = &value {
            if s.len() > MAX_STRING_LEN {
                return Err(EncodeError::StringTooLong {
                    len: s.len(),
                    max: MAX_STRING_LEN,
                });
            }
        }
        self.push(key, value);
        Ok(())
    }

    // Re-adding a key replaces its value but keeps its original position
    fn push(&mut self, key: &str, value: WireValue) {
        tracing::trace!(key, tag = %value.tag(), "adding field");
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    /// Serialize every field in insertion order and record its hash in the key map
    pub fn to_bytes(&mut self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());

        for (key, value) in &self.fields {
            let hash = key_hash(key);
            if let Some(previous) = self.key_map.insert(hash, key.as_str()) {
                if previous != *key {
                    tracing::warn!(
                        hash = %format!("{:08x}", hash),
                        previous = %previous,
                        key = %key,
                        "key hash collision, key map now names the later field"
                    );
                }
            }

            out.extend_from_slice(&hash.to_be_bytes());
            out.push(value.tag().to_wire());
            value.write_payload(&mut out);
        }

        tracing::debug!(fields = self.fields.len(), bytes = out.len(), "encoded record");
        out
    }

    /// Snapshot of the hash -> name table filled by `to_bytes`
    pub fn get_key_map(&self) -> KeyMap {
        self.key_map.clone()
    }

    /// Size `to_bytes` will produce
    pub fn encoded_len(&self) -> usize {
        self.fields
            .iter()
            .map(|(_, value)| {
                let payload = match value {
                    WireValue::String(s) => 1 + s.len(),
                    other => other.tag().payload_len().unwrap_or(0),
                };
                FIELD_HEADER_LEN + payload
            })
            .sum()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in insertion order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &WireValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::tags::TypeTag;

    #[test]
    fn test_empty_encoder() {
        let mut encoder = BinaryEncoder::new();
        assert!(encoder.to_bytes().is_empty());
        assert!(encoder.get_key_map().is_empty());
    }

    #[test]
    fn test_wire_layout() {
        let mut encoder = BinaryEncoder::new();
        encoder.add_int("x", 7, 1).unwrap();
        let bytes = encoder.to_bytes();

        let hash = key_hash("x").to_be_bytes();
        assert_eq!(bytes, vec![hash[0], hash[1], hash[2], hash[3], 1, 7]);
    }

    #[test]
    fn test_string_layout() {
        let mut encoder = BinaryEncoder::new();
        encoder.add_string("name", "Sat", 255).unwrap();
        let bytes = encoder.to_bytes();

        assert_eq!(bytes.len(), 5 + 1 + 3);
        assert_eq!(bytes[4], 0);
        assert_eq!(bytes[5], 3);
        assert_eq!(&bytes[6..], b"Sat");
    }

    #[test]
    fn test_int_tag_selection() {
        let mut encoder = BinaryEncoder::new();
        encoder.add_int("a", -128, 1).unwrap();
        encoder.add_int("b", 255, 1).unwrap();
        encoder.add_int("c", 40_000, 2).unwrap();
        encoder.add_int("d", -2_147_483_648i64, 4).unwrap();
        encoder.add_int("e", u64::MAX, 8).unwrap();

        let tags: Vec<TypeTag> = encoder.fields().map(|(_, v)| v.tag()).collect();
        assert_eq!(
            tags,
            vec![
                TypeTag::Int8,
                TypeTag::UInt8,
                TypeTag::UInt16,
                TypeTag::Int32,
                TypeTag::UInt64
            ]
        );
    }

    #[test]
    fn test_unsupported_int_size() {
        let mut encoder = BinaryEncoder::new();
        encoder.add_int("ok", 1, 1).unwrap();

        assert_eq!(
            encoder.add_int("bad", 1, 3),
            Err(EncodeError::UnsupportedIntSize(3))
        );
        assert_eq!(encoder.len(), 1, "failed add must not leave a field behind");
    }

    #[test]
    fn test_int_out_of_range() {
        let mut encoder = BinaryEncoder::new();
        assert_eq!(
            encoder.add_int("too_big", 256, 1),
            Err(EncodeError::IntOutOfRange { value: 256, size: 1 })
        );
        assert_eq!(
            encoder.add_int("too_small", -32_769, 2),
            Err(EncodeError::IntOutOfRange { value: -32_769, size: 2 })
        );
        assert!(encoder.is_empty());
    }

    #[test]
    fn test_auto_width() {
        let mut encoder = BinaryEncoder::new();
        encoder.add_int_auto("small", 87).unwrap();
        encoder.add_int_auto("byte", 200).unwrap();
        encoder.add_int_auto("short", -1000).unwrap();
        encoder.add_int_auto("mid", 40_000).unwrap();
        encoder.add_int_auto("long", 1i64 << 40).unwrap();

        let tags: Vec<TypeTag> = encoder.fields().map(|(_, v)| v.tag()).collect();
        assert_eq!(
            tags,
            vec![
                TypeTag::Int8,
                TypeTag::UInt8,
                TypeTag::Int16,
                TypeTag::Int32,
                TypeTag::Int64
            ]
        );
    }

    #[test]
    fn test_float_precision() {
        let mut encoder = BinaryEncoder::new();
        encoder.add_float("single", 1.5, false);
        encoder.add_float("double", 1.5, true);

        let tags: Vec<TypeTag> = encoder.fields().map(|(_, v)| v.tag()).collect();
        assert_eq!(tags, vec![TypeTag::Float32, TypeTag::Float64]);
        assert_eq!(encoder.to_bytes().len(), (5 + 4) + (5 + 8));
    }

    #[test]
    fn test_string_length_limits() {
        let mut encoder = BinaryEncoder::new();

        assert_eq!(
            encoder.add_string("s", "hello", 4),
            Err(EncodeError::StringTooLong { len: 5, max: 4 })
        );

        let long = "x".repeat(256);
        assert_eq!(
            encoder.add_string("s", &long, 1000),
            Err(EncodeError::StringTooLong { len: 256, max: 255 })
        );

        // Limit applies to encoded bytes, not characters
        assert!(encoder.add_string("s", "ééé", 5).is_err());
        assert!(encoder.add_string("s", &"x".repeat(255), 255).is_ok());
        assert_eq!(encoder.len(), 1);
    }

    #[test]
    fn test_re_adding_key_keeps_position() {
        let mut encoder = BinaryEncoder::new();
        encoder.add_int("first", 1, 1).unwrap();
        encoder.add_int("second", 2, 1).unwrap();
        encoder.add_float("first", 3.0, false);

        let keys: Vec<&str> = encoder.fields().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["first", "second"]);
        assert_eq!(encoder.fields().next().unwrap().1, &WireValue::Float32(3.0));
    }

    #[test]
    fn test_to_bytes_is_idempotent() {
        let mut encoder = BinaryEncoder::new();
        encoder.add_int("battery_level", 87, 1).unwrap();
        encoder.add_string("name", "PySquared-1", 255).unwrap();

        let first = encoder.to_bytes();
        let map_after_first = encoder.get_key_map();
        let second = encoder.to_bytes();

        assert_eq!(first, second);
        assert_eq!(encoder.get_key_map(), map_after_first);
        assert_eq!(map_after_first.len(), 2);
        assert_eq!(map_after_first.get(key_hash("name")), Some("name"));
    }

    #[test]
    fn test_key_map_is_a_snapshot() {
        let mut encoder = BinaryEncoder::new();
        encoder.add_int("a", 1, 1).unwrap();
        encoder.to_bytes();
        let snapshot = encoder.get_key_map();

        encoder.add_int("b", 2, 1).unwrap();
        encoder.to_bytes();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(encoder.get_key_map().len(), 2);
    }

    #[test]
    fn test_encoded_len() {
        let mut encoder = BinaryEncoder::new();
        encoder.add_int("a", 1, 8).unwrap();
        encoder.add_string("b", "abc", 255).unwrap();
        encoder.add_float("c", 0.0, false);
        assert_eq!(encoder.encoded_len(), encoder.to_bytes().len());
    }
}
