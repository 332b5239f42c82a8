// Compact self-describing binary telemetry codec
// Replaces JSON beacons: field names travel as 32-bit hashes, numbers as fixed-width big-endian

pub mod decoder;
pub mod encoder;
pub mod hash;
pub mod parser;
pub mod tags;
pub mod value;

pub use decoder::BinaryDecoder;
pub use encoder::{BinaryEncoder, EncodeError};
pub use hash::{key_hash, placeholder_name};
pub use tags::{IntWidth, TypeTag};
pub use value::WireValue;
