//! Layered runtime settings.
//!
//! Values are resolved from, lowest to highest precedence: built-in defaults,
//! an optional TOML/YAML/JSON file, `FLEETWATCH_*` environment variables, and
//! command-line overrides.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::TimeRange;
use crate::sync::{SyncConfig, DEFAULT_BASE_URL};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Base URL of the telemetry API.
    pub api_url: String,
    #[serde(deserialize_with = "crate::data::duration::deserialize")]
    pub dashboard_interval: Duration,
    #[serde(deserialize_with = "crate::data::duration::deserialize")]
    pub host_interval: Duration,
    #[serde(deserialize_with = "crate::data::duration::deserialize")]
    pub history_interval: Duration,
    #[serde(deserialize_with = "crate::data::duration::deserialize")]
    pub request_timeout: Duration,
    /// Initial history range in hours (1, 6, 24 or 168).
    pub default_range: u32,
}

impl Settings {
    /// Resolve settings from defaults, `file`, the environment and `overrides`.
    ///
    /// `overrides` are `(key, value)` pairs with the same keys and string
    /// formats as the file.
    pub fn load(file: Option<&Path>, overrides: &[(&str, String)]) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("api_url", DEFAULT_BASE_URL)?
            .set_default("dashboard_interval", "5s")?
            .set_default("host_interval", "3s")?
            .set_default("history_interval", "30s")?
            .set_default("request_timeout", "10s")?
            .set_default("default_range", 24)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(Environment::with_prefix("FLEETWATCH"));

        for (key, value) in overrides {
            builder = builder.set_override(*key, value.as_str())?;
        }

        let settings: Settings = builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("dashboard_interval", self.dashboard_interval),
            ("host_interval", self.host_interval),
            ("history_interval", self.history_interval),
            ("request_timeout", self.request_timeout),
        ] {
            if value.is_zero() {
                bail!("{} must be greater than zero", name);
            }
        }
        self.time_range()?;
        Ok(())
    }

    /// The initial history range.
    pub fn time_range(&self) -> Result<TimeRange> {
        TimeRange::from_hours(self.default_range).ok_or_else(|| {
            anyhow!(
                "default_range must be one of 1, 6, 24 or 168 hours, got {}",
                self.default_range
            )
        })
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            dashboard_interval: self.dashboard_interval,
            host_interval: self.host_interval,
            history_interval: self.history_interval,
        }
    }
}
