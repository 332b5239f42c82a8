// PYSQUARED-RS: telemetry encoding and authenticated command link for PySquared CubeSats
// Copyright 2024 - Licensed under GPLv3

pub mod auth;
pub mod command;
pub mod core;
pub mod encoding;
pub mod formats;
pub mod link;
pub mod telemetry;

// Re-export commonly used types
pub use auth::{compare_digest, HmacAuthenticator};
pub use command::{Command, CommandHandler, Outcome, ReplayGuard, Uplink};
pub use self::core::{constants::*, SatelliteConfig};
pub use encoding::{BinaryDecoder, BinaryEncoder, EncodeError, TypeTag, WireValue};
pub use formats::{load_capture, save_capture, CaptureMetadata, KeyMap};
pub use link::{LinkError, PacketLink};
pub use telemetry::{Beacon, BeaconValue, TelemetrySource};

/// Crate version, recorded in capture files
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_record_round_trip_through_reexports() {
        let mut encoder = BinaryEncoder::new();
        encoder.add_int("battery", 85, 1).unwrap();
        encoder.add_float("solar", 12.5, false);
        encoder.add_string("name", "PySquared-1", 255).unwrap();
        let bytes = encoder.to_bytes();

        let decoder = BinaryDecoder::new(&bytes, Some(&encoder.get_key_map()));
        assert_eq!(decoder.get_int("battery"), Some(85));
        assert_eq!(decoder.get_string("name").as_deref(), Some("PySquared-1"));

        let auth = HmacAuthenticator::new("shared_secret_key_123");
        let signature = auth.generate_hmac("battery=85", 1);
        assert!(auth.verify_hmac("battery=85", 1, &signature));
    }
}
