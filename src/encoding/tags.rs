// Wire type tags for telemetry fields

use serde::{Deserialize, Serialize};
use std::fmt;

/// One-byte code identifying a field's type and width on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    String,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl TypeTag {
    /// Every tag, in wire-value order
    pub const ALL: [TypeTag; 11] = [
        TypeTag::String,
        TypeTag::Int8,
        TypeTag::Int16,
        TypeTag::Int32,
        TypeTag::Int64,
        TypeTag::Float32,
        TypeTag::Float64,
        TypeTag::UInt8,
        TypeTag::UInt16,
        TypeTag::UInt32,
        TypeTag::UInt64,
    ];

    /// The byte written after the key hash
    pub fn to_wire(self) -> u8 {
        match self {
            TypeTag::String => 0,
            TypeTag::Int8 => 1,
            TypeTag::Int16 => 2,
            TypeTag::Int32 => 3,
            TypeTag::Int64 => 4,
            TypeTag::Float32 => 5,
            TypeTag::Float64 => 6,
            TypeTag::UInt8 => 11,
            TypeTag::UInt16 => 12,
            TypeTag::UInt32 => 13,
            TypeTag::UInt64 => 14,
        }
    }

    /// Look up a wire byte; reserved values return None
    pub fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(TypeTag::String),
            1 => Some(TypeTag::Int8),
            2 => Some(TypeTag::Int16),
            3 => Some(TypeTag::Int32),
            4 => Some(TypeTag::Int64),
            5 => Some(TypeTag::Float32),
            6 => Some(TypeTag::Float64),
            11 => Some(TypeTag::UInt8),
            12 => Some(TypeTag::UInt16),
            13 => Some(TypeTag::UInt32),
            14 => Some(TypeTag::UInt64),
            _ => None,
        }
    }

    /// Fixed payload width in bytes, or None for the length-prefixed string
    pub fn payload_len(self) -> Option<usize> {
        match self {
            TypeTag::String => None,
            TypeTag::Int8 | TypeTag::UInt8 => Some(1),
            TypeTag::Int16 | TypeTag::UInt16 => Some(2),
            TypeTag::Int32 | TypeTag::UInt32 | TypeTag::Float32 => Some(4),
            TypeTag::Int64 | TypeTag::UInt64 | TypeTag::Float64 => Some(8),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::String => "string",
            TypeTag::Int8 => "int8",
            TypeTag::UInt8 => "uint8",
            TypeTag::Int16 => "int16",
            TypeTag::UInt16 => "uint16",
            TypeTag::Int32 => "int32",
            TypeTag::UInt32 => "uint32",
            TypeTag::Int64 => "int64",
            TypeTag::UInt64 => "uint64",
            TypeTag::Float32 => "float32",
            TypeTag::Float64 => "float64",
        };
        write!(f, "{}", name)
    }
}

/// Integer widths the encoder can pin a value to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    One,
    Two,
    Four,
    Eight,
}

impl IntWidth {
    /// Width for a size in bytes; only 1, 2, 4 and 8 exist
    pub fn from_size(size: usize) -> Option<Self> {
        match size {
            1 => Some(IntWidth::One),
            2 => Some(IntWidth::Two),
            4 => Some(IntWidth::Four),
            8 => Some(IntWidth::Eight),
            _ => None,
        }
    }

    /// Smallest width for a value when the caller does not pin one.
    /// A byte covers -128..=255 because either tag of that width can hold it.
    pub fn for_value(value: i128) -> Self {
        if (-128..=255).contains(&value) {
            IntWidth::One
        } else if (i16::MIN as i128..=i16::MAX as i128).contains(&value) {
            IntWidth::Two
        } else if (i32::MIN as i128..=i32::MAX as i128).contains(&value) {
            IntWidth::Four
        } else {
            IntWidth::Eight
        }
    }

    pub fn size(self) -> usize {
        match self {
            IntWidth::One => 1,
            IntWidth::Two => 2,
            IntWidth::Four => 4,
            IntWidth::Eight => 8,
        }
    }

    pub fn signed_tag(self) -> TypeTag {
        match self {
            IntWidth::One => TypeTag::Int8,
            IntWidth::Two => TypeTag::Int16,
            IntWidth::Four => TypeTag::Int32,
            IntWidth::Eight => TypeTag::Int64,
        }
    }

    pub fn unsigned_tag(self) -> TypeTag {
        match self {
            IntWidth::One => TypeTag::UInt8,
            IntWidth::Two => TypeTag::UInt16,
            IntWidth::Four => TypeTag::UInt32,
            IntWidth::Eight => TypeTag::UInt64,
        }
    }
}
