// Satellite configuration relevant to the link layer
// Loaded from the flight config JSON; keys owned by other subsystems pass through untouched

use super::constants::{DEFAULT_OSCAR_PASSWORD, MODULATIONS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required value: {0}")]
    Missing(&'static str),

    #[error("Unsupported radio modulation: {0}")]
    InvalidModulation(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Link-layer settings from the satellite's config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatelliteConfig {
    /// Name commands must carry to be accepted
    pub cubesat_name: String,

    /// Shared secret for command signatures
    pub hmac_secret: String,

    /// Password for unsigned commands when legacy authentication is enabled
    #[serde(default)]
    pub super_secret_code: Option<String>,

    /// Accept unsigned password-only commands
    #[serde(default)]
    pub legacy_password_auth: bool,

    #[serde(default = "default_oscar_password")]
    pub oscar_password: String,

    #[serde(default)]
    pub jokes: Vec<String>,

    #[serde(default = "default_modulation")]
    pub modulation: String,

    /// Pause before acknowledging so the ground station can switch to receive
    #[serde(default = "default_send_delay_ms")]
    pub send_delay_ms: u64,

    #[serde(default = "default_listen_timeout_ms")]
    pub listen_timeout_ms: u64,

    /// Attempts the ground station makes before giving up on a command
    #[serde(default = "default_uplink_retries")]
    pub uplink_retries: u32,

    /// Keys owned by other subsystems
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

fn default_oscar_password() -> String {
    DEFAULT_OSCAR_PASSWORD.to_string()
}

fn default_modulation() -> String {
    "LoRa".to_string()
}

fn default_send_delay_ms() -> u64 {
    200
}

fn default_listen_timeout_ms() -> u64 {
    1000
}

fn default_uplink_retries() -> u32 {
    5
}

impl SatelliteConfig {
    /// Create a config with defaults for everything but name and secret
    pub fn new(cubesat_name: impl Into<String>, hmac_secret: impl Into<String>) -> Self {
        Self {
            cubesat_name: cubesat_name.into(),
            hmac_secret: hmac_secret.into(),
            super_secret_code: None,
            legacy_password_auth: false,
            oscar_password: default_oscar_password(),
            jokes: Vec::new(),
            modulation: default_modulation(),
            send_delay_ms: default_send_delay_ms(),
            listen_timeout_ms: default_listen_timeout_ms(),
            uplink_retries: default_uplink_retries(),
            extra: HashMap::new(),
        }
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config back out, extras included
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cubesat_name.is_empty() {
            return Err(ConfigError::Missing("cubesat_name"));
        }
        if self.hmac_secret.is_empty() {
            return Err(ConfigError::Missing("hmac_secret"));
        }
        if self.legacy_password_auth
            && self.super_secret_code.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::Missing("super_secret_code"));
        }
        check_modulation(&self.modulation)
    }

    /// Change the radio modulation after checking it is supported
    pub fn set_modulation(&mut self, modulation: &str) -> Result<()> {
        check_modulation(modulation)?;
        self.modulation = modulation.to_string();
        Ok(())
    }

    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }

    pub fn listen_timeout(&self) -> Duration {
        Duration::from_millis(self.listen_timeout_ms)
    }
}

fn check_modulation(modulation: &str) -> Result<()> {
    if MODULATIONS.contains(&modulation) {
        Ok(())
    } else {
        Err(ConfigError::InvalidModulation(modulation.to_string()))
    }
}
