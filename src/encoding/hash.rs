// Field name hashing
// Records carry a 32-bit hash instead of the field name

use crate::core::constants::PLACEHOLDER_PREFIX;

/// Hash a field name to the 32-bit identifier sent on the wire.
///
/// CRC-32 (IEEE) over the UTF-8 bytes. The value is stable across processes
/// and platforms, so a key map generated on the ground stays valid for every
/// record the satellite sends.
pub fn key_hash(key: &str) -> u32 {
    crc32fast::hash(key.as_bytes())
}

/// Name used for a field whose hash is not in the key map
pub fn placeholder_name(hash: u32) -> String {
    format!("{}{:08x}", PLACEHOLDER_PREFIX, hash)
}
