// Capture files: a received telemetry record followed by its metadata
// Layout: <record><MAGIC><base64(json metadata)>

use super::metadata::CaptureMetadata;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode metadata: {0}")]
    MetadataDecode(String),

    #[error("Failed to parse metadata JSON: {0}")]
    MetadataJson(#[from] serde_json::Error),

    #[error("Failed to decode base64 metadata: {0}")]
    Base64Decode(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, CaptureError>;

/// Separator between the record and the metadata trailer
pub const MAGIC: &[u8] = b"\x00\xffsquared\xeecap\x00\x01";

/// Load a capture file. Files without the trailer load as a bare record
/// with default metadata.
pub fn load_capture(filename: impl AsRef<Path>) -> Result<(Vec<u8>, CaptureMetadata)> {
    let mut file = File::open(filename)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    split_capture(data)
}

/// Split raw capture bytes into record and metadata
pub fn split_capture(mut data: Vec<u8>) -> Result<(Vec<u8>, CaptureMetadata)> {
    match find_magic(&data) {
        Some(idx) => {
            let metadata = decode_metadata(&data[idx + MAGIC.len()..])?;
            data.truncate(idx);
            debug!(record = data.len(), keys = metadata.key_map.len(), "Loaded capture");
            Ok((data, metadata))
        }
        None => Ok((data, CaptureMetadata::default())),
    }
}

/// Save a record and its metadata
pub fn save_capture(
    filename: impl AsRef<Path>,
    record: &[u8],
    metadata: &CaptureMetadata,
) -> Result<()> {
    let mut file = File::create(filename)?;
    file.write_all(record)?;
    file.write_all(MAGIC)?;
    file.write_all(STANDARD.encode(metadata.to_json()?).as_bytes())?;
    Ok(())
}

// The trailer is base64 and never contains MAGIC, so the last match is the
// separator even when the record happens to contain the same bytes
fn find_magic(data: &[u8]) -> Option<usize> {
    data.windows(MAGIC.len()).rposition(|window| window == MAGIC)
}

fn decode_metadata(encoded: &[u8]) -> Result<CaptureMetadata> {
    let decoded = STANDARD.decode(encoded.trim_ascii())?;
    let json = String::from_utf8(decoded).map_err(|e| CaptureError::MetadataDecode(e.to_string()))?;
    Ok(CaptureMetadata::from_json(&json)?)
}
