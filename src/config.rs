//! Configuration for the SINMAM service
//!
//! Settings are resolved once at start-up, layered as:
//! 1. Built-in defaults
//! 2. Optional TOML file (`--config`)
//! 3. Environment variables prefixed `SINMAM_`, nested with `__`
//!    (e.g. `SINMAM_MONITOR__MAX_HISTORY=100`)
//!
//! The resulting values are immutable snapshots handed to the store,
//! the simulator and the API server. Nothing re-reads the environment
//! per request.

use crate::error::{Result, SinmamError};
use crate::types::RiskThresholds;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Environment variable prefix
const ENV_PREFIX: &str = "SINMAM";

/// Largest start-up backfill the demo generator accepts
pub const MAX_INITIAL_READINGS: usize = 10_000;
/// Largest gap between backfilled readings (one day)
pub const MAX_BACKFILL_SPACING_MINUTES: i64 = 24 * 60;

/// Retention and classification settings consumed by the reading store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorConfig {
    /// Maximum number of readings retained
    pub max_history: usize,
    /// Normal pulse range
    pub thresholds: RiskThresholds,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            max_history: 50,
            thresholds: RiskThresholds::default(),
        }
    }
}

impl MonitorConfig {
    /// Reject capacities and ranges the store cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.max_history == 0 {
            return Err(config_error("monitor.max_history must be at least 1"));
        }
        if self.thresholds.lower > self.thresholds.upper {
            return Err(config_error(format!(
                "monitor.thresholds.lower ({}) exceeds monitor.thresholds.upper ({})",
                self.thresholds.lower, self.thresholds.upper
            )));
        }
        Ok(())
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSettings {
    /// Listen address
    pub addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3001".to_string(),
        }
    }
}

/// Demo-mode data generation (off unless explicitly enabled)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Run the synthetic reading generator
    pub enabled: bool,
    /// Seconds between synthetic readings
    pub interval_secs: u64,
    /// Synthetic readings backfilled at start-up
    pub initial_readings: usize,
    /// Minutes between backfilled readings
    pub backfill_spacing_minutes: i64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: 15,
            initial_readings: 20,
            backfill_spacing_minutes: 15,
        }
    }
}

impl SimulationConfig {
    /// Reject generator settings that would produce unordered or
    /// unrepresentable timestamps
    pub fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            return Err(config_error("simulation.interval_secs must be at least 1"));
        }
        if !(1..=MAX_BACKFILL_SPACING_MINUTES).contains(&self.backfill_spacing_minutes) {
            return Err(config_error(format!(
                "simulation.backfill_spacing_minutes must be between 1 and {}, got {}",
                MAX_BACKFILL_SPACING_MINUTES, self.backfill_spacing_minutes
            )));
        }
        if self.initial_readings > MAX_INITIAL_READINGS {
            return Err(config_error(format!(
                "simulation.initial_readings must be at most {}, got {}",
                MAX_INITIAL_READINGS, self.initial_readings
            )));
        }
        Ok(())
    }
}

/// Fully resolved service settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub server: ServerSettings,
    pub monitor: MonitorConfig,
    pub simulation: SimulationConfig,
}

impl Settings {
    /// Resolve settings from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Settings::default();

        let mut builder = Config::builder()
            .set_default("server.addr", defaults.server.addr.clone())?
            .set_default("monitor.max_history", defaults.monitor.max_history as i64)?
            .set_default(
                "monitor.thresholds.upper",
                i64::from(defaults.monitor.thresholds.upper),
            )?
            .set_default(
                "monitor.thresholds.lower",
                i64::from(defaults.monitor.thresholds.lower),
            )?
            .set_default("simulation.enabled", defaults.simulation.enabled)?
            .set_default(
                "simulation.interval_secs",
                defaults.simulation.interval_secs as i64,
            )?
            .set_default(
                "simulation.initial_readings",
                defaults.simulation.initial_readings as i64,
            )?
            .set_default(
                "simulation.backfill_spacing_minutes",
                defaults.simulation.backfill_spacing_minutes,
            )?;

        if let Some(path) = path {
            debug!("Loading configuration file: {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.monitor.validate()?;
        settings.simulation.validate()?;

        debug!(
            "Resolved settings: addr={}, max_history={}, thresholds={}..{}",
            settings.server.addr,
            settings.monitor.max_history,
            settings.monitor.thresholds.lower,
            settings.monitor.thresholds.upper
        );

        Ok(settings)
    }
}

fn config_error(message: impl Into<String>) -> SinmamError {
    SinmamError::Config(config::ConfigError::Message(message.into()))
}
