//! Simulation configuration

use std::env;

use puyo_duel_types::SOFT_PUT_INTERVAL;
use thiserror::Error;

/// Environment variable toggling garbage exchange
pub const ENV_GARBAGE: &str = "PUYO_DUEL_GARBAGE";

/// Environment variable overriding the soft-put input interval
pub const ENV_SOFT_PUT_INTERVAL: &str = "PUYO_DUEL_SOFT_PUT_INTERVAL";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("soft put interval must be at least one frame")]
    ZeroSoftPutInterval,
}

/// Per-simulation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Send garbage to the opponent; when off, sent garbage is discarded
    pub enable_garbage: bool,
    /// Frames between two soft-put navigation inputs
    pub soft_put_interval: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            enable_garbage: true,
            soft_put_interval: SOFT_PUT_INTERVAL,
        }
    }
}

impl SimConfig {
    pub fn with_garbage(mut self, enable: bool) -> Self {
        self.enable_garbage = enable;
        self
    }

    pub fn with_soft_put_interval(mut self, frames: u32) -> Self {
        self.soft_put_interval = frames;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.soft_put_interval == 0 {
            return Err(ConfigError::ZeroSoftPutInterval);
        }
        Ok(())
    }

    /// Create from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create from any key lookup, e.g. a map in tests
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_GARBAGE) {
            config.enable_garbage = parse_bool(ENV_GARBAGE, &value)?;
        }

        if let Some(value) = lookup(ENV_SOFT_PUT_INTERVAL) {
            config.soft_put_interval =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: ENV_SOFT_PUT_INTERVAL,
                        value: value.clone(),
                    })?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}
