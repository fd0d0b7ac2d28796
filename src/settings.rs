//! Loading gate settings from files and the environment.
//!
//! Settings are read once, before the gate is built. Every field has a
//! default, so an empty source yields the stock 5 calls/second gate.
//!
//! Environment variables use the `RATE_GATE_` prefix, e.g.
//! `RATE_GATE_CAPACITY=10` or `RATE_GATE_TIMEOUT_POLICY=proceed`.

use std::path::Path;
use std::time::Duration;

use config::{Config as ConfigLoader, Environment, File};
use serde::{Deserialize, Serialize};

use crate::bandwidth::{Bandwidth, BandwidthConfig, DEFAULT_CAPACITY, DEFAULT_REFILL_TOKENS};
use crate::error::ConfigError;
use crate::gate::{GateConfig, TimeoutPolicy, DEFAULT_CANCEL_POLL_INTERVAL, DEFAULT_WAIT_BUDGET};
use crate::types::Uint;

/// Prefix of the environment variables read by [`GateSettings::from_env`].
pub const ENV_PREFIX: &str = "RATE_GATE";

/// Serializable form of a [`GateConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSettings {
    #[serde(default = "default_capacity")]
    pub capacity: Uint,
    #[serde(default = "default_refill_tokens")]
    pub refill_tokens: Uint,
    #[serde(default = "default_refill_period_ms")]
    pub refill_period_ms: u64,
    #[serde(default = "default_wait_budget_ms")]
    pub wait_budget_ms: u64,
    #[serde(default)]
    pub timeout_policy: TimeoutPolicy,
    #[serde(default = "default_cancel_poll_interval_ms")]
    pub cancel_poll_interval_ms: u64,
}

fn default_capacity() -> Uint {
    DEFAULT_CAPACITY
}

fn default_refill_tokens() -> Uint {
    DEFAULT_REFILL_TOKENS
}

fn default_refill_period_ms() -> u64 {
    1_000
}

fn default_wait_budget_ms() -> u64 {
    u64::try_from(DEFAULT_WAIT_BUDGET.as_millis()).unwrap_or(u64::MAX)
}

fn default_cancel_poll_interval_ms() -> u64 {
    u64::try_from(DEFAULT_CANCEL_POLL_INTERVAL.as_millis()).unwrap_or(u64::MAX)
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            refill_tokens: default_refill_tokens(),
            refill_period_ms: default_refill_period_ms(),
            wait_budget_ms: default_wait_budget_ms(),
            timeout_policy: TimeoutPolicy::default(),
            cancel_poll_interval_ms: default_cancel_poll_interval_ms(),
        }
    }
}

impl GateSettings {
    /// Reads settings from `RATE_GATE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = ConfigLoader::builder()
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Reads settings from a file, with environment variables taking precedence.
    ///
    /// The format is taken from the extension (`.toml`, `.yaml`, `.json`, ...).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings = ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Validates the settings into a [`GateConfig`].
    pub fn into_config(self) -> Result<GateConfig, ConfigError> {
        GateConfig::try_from(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .try_parsing(true)
}

impl TryFrom<GateSettings> for GateConfig {
    type Error = ConfigError;

    fn try_from(settings: GateSettings) -> Result<Self, Self::Error> {
        if settings.cancel_poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }

        let bandwidth = Bandwidth::try_from(BandwidthConfig {
            capacity: settings.capacity,
            refill_tokens: settings.refill_tokens,
            refill_period_ms: settings.refill_period_ms,
        })?;

        Ok(GateConfig {
            bandwidth,
            wait_budget: Duration::from_millis(settings.wait_budget_ms),
            timeout_policy: settings.timeout_policy,
            cancel_poll_interval: Duration::from_millis(settings.cancel_poll_interval_ms),
        })
    }
}
