// Constants and configuration shared across the link layer
pub mod config;
pub mod constants;

pub use config::{ConfigError, SatelliteConfig};
pub use constants::*;
