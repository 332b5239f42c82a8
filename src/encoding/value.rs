// Typed field values, one variant per wire tag

use super::tags::{IntWidth, TypeTag};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A telemetry value as it travels on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireValue {
    String(String),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
}

impl WireValue {
    /// Pick the signed tag of `width` if the value fits it, else the unsigned one.
    /// Returns None when neither range can hold the value.
    pub fn from_int(value: i128, width: IntWidth) -> Option<Self> {
        match width {
            IntWidth::One => i8::try_from(value)
                .map(WireValue::Int8)
                .or_else(|_| u8::try_from(value).map(WireValue::UInt8))
                .ok(),
            IntWidth::Two => i16::try_from(value)
                .map(WireValue::Int16)
                .or_else(|_| u16::try_from(value).map(WireValue::UInt16))
                .ok(),
            IntWidth::Four => i32::try_from(value)
                .map(WireValue::Int32)
                .or_else(|_| u32::try_from(value).map(WireValue::UInt32))
                .ok(),
            IntWidth::Eight => i64::try_from(value)
                .map(WireValue::Int64)
                .or_else(|_| u64::try_from(value).map(WireValue::UInt64))
                .ok(),
        }
    }

    pub fn tag(&self) -> TypeTag {
        match self {
            WireValue::String(_) => TypeTag::String,
            WireValue::Int8(_) => TypeTag::Int8,
            WireValue::UInt8(_) => TypeTag::UInt8,
            WireValue::Int16(_) => TypeTag::Int16,
            WireValue::UInt16(_) => TypeTag::UInt16,
            WireValue::Int32(_) => TypeTag::Int32,
            WireValue::UInt32(_) => TypeTag::UInt32,
            WireValue::Int64(_) => TypeTag::Int64,
            WireValue::UInt64(_) => TypeTag::UInt64,
            WireValue::Float32(_) => TypeTag::Float32,
            WireValue::Float64(_) => TypeTag::Float64,
        }
    }

    /// Append the payload (without key hash or tag) in big-endian order.
    /// Strings must already be within the length-byte limit.
    pub fn write_payload(&self, out: &mut Vec<u8>) {
        match self {
            WireValue::String(s) => {
                let bytes = s.as_bytes();
                out.push(bytes.len() as u8);
                out.extend_from_slice(bytes);
            }
            WireValue::Int8(v) => out.extend_from_slice(&v.to_be_bytes()),
            WireValue::UInt8(v) => out.extend_from_slice(&v.to_be_bytes()),
            WireValue::Int16(v) => out.extend_from_slice(&v.to_be_bytes()),
            WireValue::UInt16(v) => out.extend_from_slice(&v.to_be_bytes()),
            WireValue::Int32(v) => out.extend_from_slice(&v.to_be_bytes()),
            WireValue::UInt32(v) => out.extend_from_slice(&v.to_be_bytes()),
            WireValue::Int64(v) => out.extend_from_slice(&v.to_be_bytes()),
            WireValue::UInt64(v) => out.extend_from_slice(&v.to_be_bytes()),
            WireValue::Float32(v) => out.extend_from_slice(&v.to_be_bytes()),
            WireValue::Float64(v) => out.extend_from_slice(&v.to_be_bytes()),
        }
    }

    /// Integer view. Floats truncate toward zero, strings are parsed.
    pub fn as_int(&self) -> Option<i128> {
        match self {
            WireValue::String(s) => s.trim().parse::<i128>().ok(),
            WireValue::Int8(v) => Some((*v).into()),
            WireValue::UInt8(v) => Some((*v).into()),
            WireValue::Int16(v) => Some((*v).into()),
            WireValue::UInt16(v) => Some((*v).into()),
            WireValue::Int32(v) => Some((*v).into()),
            WireValue::UInt32(v) => Some((*v).into()),
            WireValue::Int64(v) => Some((*v).into()),
            WireValue::UInt64(v) => Some((*v).into()),
            WireValue::Float32(v) => float_to_int(f64::from(*v)),
            WireValue::Float64(v) => float_to_int(*v),
        }
    }

    /// Floating point view. Integers convert, strings are parsed.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            WireValue::String(s) => s.trim().parse::<f64>().ok(),
            WireValue::Int8(v) => Some((*v).into()),
            WireValue::UInt8(v) => Some((*v).into()),
            WireValue::Int16(v) => Some((*v).into()),
            WireValue::UInt16(v) => Some((*v).into()),
            WireValue::Int32(v) => Some((*v).into()),
            WireValue::UInt32(v) => Some((*v).into()),
            WireValue::Int64(v) => Some(*v as f64),
            WireValue::UInt64(v) => Some(*v as f64),
            WireValue::Float32(v) => Some((*v).into()),
            WireValue::Float64(v) => Some(*v),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireValue::String(s) => Some(s),
            _ => None,
        }
    }
}

fn float_to_int(value: f64) -> Option<i128> {
    if value.is_finite() {
        Some(value.trunc() as i128)
    } else {
        None
    }
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireValue::String(s) => write!(f, "{}", s),
            WireValue::Int8(v) => write!(f, "{}", v),
            WireValue::UInt8(v) => write!(f, "{}", v),
            WireValue::Int16(v) => write!(f, "{}", v),
            WireValue::UInt16(v) => write!(f, "{}", v),
            WireValue::Int32(v) => write!(f, "{}", v),
            WireValue::UInt32(v) => write!(f, "{}", v),
            WireValue::Int64(v) => write!(f, "{}", v),
            WireValue::UInt64(v) => write!(f, "{}", v),
            WireValue::Float32(v) => write!(f, "{}", v),
            WireValue::Float64(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_int_prefers_signed() {
        assert_eq!(WireValue::from_int(127, IntWidth::One), Some(WireValue::Int8(127)));
        assert_eq!(WireValue::from_int(-128, IntWidth::One), Some(WireValue::Int8(-128)));
        assert_eq!(WireValue::from_int(200, IntWidth::One), Some(WireValue::UInt8(200)));
        assert_eq!(WireValue::from_int(256, IntWidth::One), None);
        assert_eq!(WireValue::from_int(-129, IntWidth::One), None);

        assert_eq!(
            WireValue::from_int(3_000_000_000, IntWidth::Four),
            Some(WireValue::UInt32(3_000_000_000))
        );
        assert_eq!(
            WireValue::from_int(u64::MAX as i128, IntWidth::Eight),
            Some(WireValue::UInt64(u64::MAX))
        );
        assert_eq!(WireValue::from_int(u64::MAX as i128 + 1, IntWidth::Eight), None);
    }

    #[test]
    fn test_payload_bytes() {
        let mut out = Vec::new();
        WireValue::Int16(-2).write_payload(&mut out);
        assert_eq!(out, vec![0xFF, 0xFE]);

        out.clear();
        WireValue::UInt32(0x1234_5678).write_payload(&mut out);
        assert_eq!(out, vec![0x12, 0x34, 0x56, 0x78]);

        out.clear();
        WireValue::String("Hi".to_string()).write_payload(&mut out);
        assert_eq!(out, vec![2, b'H', b'i']);

        out.clear();
        WireValue::Float32(1.0).write_payload(&mut out);
        assert_eq!(out, vec![0x3F, 0x80, 0x00, 0x00]);
    }

    #[test]
    fn test_payload_len_matches_tag() {
        let values = [
            WireValue::Int8(1),
            WireValue::UInt16(2),
            WireValue::Int32(3),
            WireValue::UInt64(4),
            WireValue::Float32(5.0),
            WireValue::Float64(6.0),
        ];
        for value in values {
            let mut out = Vec::new();
            value.write_payload(&mut out);
            assert_eq!(Some(out.len()), value.tag().payload_len());
        }
    }

    #[test]
    fn test_coercions() {
        assert_eq!(WireValue::Float32(4.9).as_int(), Some(4));
        assert_eq!(WireValue::Float64(-4.9).as_int(), Some(-4));
        assert_eq!(WireValue::Float64(f64::NAN).as_int(), None);
        assert_eq!(WireValue::UInt64(u64::MAX).as_int(), Some(u64::MAX as i128));
        assert_eq!(WireValue::Int8(-3).as_float(), Some(-3.0));
        assert_eq!(WireValue::String("42".to_string()).as_int(), Some(42));
        assert_eq!(WireValue::String("2.5".to_string()).as_float(), Some(2.5));
        assert_eq!(WireValue::String("abc".to_string()).as_int(), None);
        assert_eq!(WireValue::UInt8(7).to_string(), "7");
        assert_eq!(WireValue::UInt8(7).as_str(), None);
    }
}
