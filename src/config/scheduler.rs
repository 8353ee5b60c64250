//! Scheduler configuration: pool size, service durations, time compression.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::flight::FlightKind;

/// Default simulated landing service time in seconds.
const DEFAULT_LANDING_SECS: u64 = 300;
/// Default simulated takeoff service time in seconds.
const DEFAULT_TAKEOFF_SECS: u64 = 300;
/// Default compression: 60 simulated seconds elapse per real second.
const DEFAULT_TIME_COMPRESSION: u32 = 60;

/// Scheduler configuration.
///
/// Service durations are declared in simulated seconds and divided by the
/// time-compression factor to obtain the real suspension applied by the
/// dispatcher workers. The defaults reproduce five-minute services at
/// one simulated minute per real second.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of runway slots and dispatcher workers.
    pub runway_count: u32,
    /// Simulated landing service time in seconds.
    pub landing_secs: u64,
    /// Simulated takeoff service time in seconds.
    pub takeoff_secs: u64,
    /// Simulated seconds of service per real second of suspension.
    pub time_compression: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            runway_count: 2,
            landing_secs: DEFAULT_LANDING_SECS,
            takeoff_secs: DEFAULT_TAKEOFF_SECS,
            time_compression: DEFAULT_TIME_COMPRESSION,
        }
    }
}

impl SchedulerConfig {
    /// Create a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of runways (and workers).
    #[must_use]
    pub const fn with_runway_count(mut self, count: u32) -> Self {
        self.runway_count = count;
        self
    }

    /// Set the simulated landing service time in seconds.
    #[must_use]
    pub const fn with_landing_secs(mut self, secs: u64) -> Self {
        self.landing_secs = secs;
        self
    }

    /// Set the simulated takeoff service time in seconds.
    #[must_use]
    pub const fn with_takeoff_secs(mut self, secs: u64) -> Self {
        self.takeoff_secs = secs;
        self
    }

    /// Set the time-compression factor.
    #[must_use]
    pub const fn with_time_compression(mut self, factor: u32) -> Self {
        self.time_compression = factor;
        self
    }

    /// Real suspension a dispatcher applies for one service of `kind`.
    #[must_use]
    pub fn service_duration(&self, kind: FlightKind) -> Duration {
        let secs = match kind {
            FlightKind::Arrival => self.landing_secs,
            FlightKind::Departure => self.takeoff_secs,
        };
        #[allow(clippy::cast_precision_loss)]
        let simulated = secs as f64;
        Duration::from_secs_f64(simulated / f64::from(self.time_compression.max(1)))
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.runway_count == 0 {
            return Err("runway_count must be greater than 0".into());
        }
        if self.landing_secs == 0 || self.takeoff_secs == 0 {
            return Err("service times must be greater than 0".into());
        }
        if self.time_compression == 0 {
            return Err("time_compression must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse a configuration from a JSON string and validate it.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build a configuration from environment variables over defaults,
    /// loading `.env` first when present. Recognized keys:
    /// `RUNWAY_COUNT`, `LANDING_SECS`, `TAKEOFF_SECS`, `TIME_COMPRESSION`.
    ///
    /// # Errors
    ///
    /// Returns a message for an unparsable value or failed validation.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        let mut cfg = Self::default();
        if let Some(v) = read_env("RUNWAY_COUNT")? {
            cfg.runway_count = v;
        }
        if let Some(v) = read_env("LANDING_SECS")? {
            cfg.landing_secs = v;
        }
        if let Some(v) = read_env("TAKEOFF_SECS")? {
            cfg.takeoff_secs = v;
        }
        if let Some(v) = read_env("TIME_COMPRESSION")? {
            cfg.time_compression = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn read_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, String> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("{key} has invalid value `{raw}`")),
        Err(_) => Ok(None),
    }
}
