//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! midtide-config.toml file: which spot to forecast, the session search
//! parameters, where forecast snapshots live and how calendar events are
//! published. Every section and field is optional; anything missing takes the
//! default shown in [`Config::default`].

use crate::OptimizationParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Default config file name, resolved against the working directory
pub const CONFIG_FILE: &str = "midtide-config.toml";

/// Application configuration loaded from midtide-config.toml
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Forecast spot
    pub spot: SpotConfig,
    /// Session search parameters
    pub params: OptimizationParams,
    /// Forecast API and snapshot settings
    pub forecast: ForecastConfig,
    /// Calendar publishing
    pub calendar: CalendarConfig,
}

/// Surf spot to forecast
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SpotConfig {
    /// Surfline spot id
    pub id: String,
    /// Human-readable spot name for logs and reports
    pub name: String,
    /// Forecast horizon in days
    pub days: u32,
    /// Sample interval hint in hours
    pub interval_hours: u32,
}

/// Forecast provider and snapshot settings
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Base URL of the forecast API
    pub base_url: String,
    /// Where the last fetched forecast is saved
    pub snapshot_path: String,
    /// A snapshot younger than this is reused instead of calling the API
    pub cache_ttl_minutes: u64,
}

/// Calendar event settings
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Publish to Google Calendar; when false events are printed instead
    pub enabled: bool,
    pub calendar_id: String,
    /// Base URL of the Google Calendar v3 API
    pub api_base: String,
    /// Stored OAuth token JSON (its `token` field is the bearer token)
    pub token_path: String,
    /// Event title
    pub summary: String,
    /// IANA time zone the session timestamps are expressed in
    pub time_zone: String,
}

impl Default for SpotConfig {
    fn default() -> Self {
        SpotConfig {
            id: "5842041f4e65fad6a7708841".to_string(),
            name: "Pacific Beach".to_string(),
            days: 3,
            interval_hours: 1,
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        ForecastConfig {
            base_url: "https://services.surfline.com".to_string(),
            snapshot_path: "data/forecast.json".to_string(),
            cache_ttl_minutes: 60,
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        CalendarConfig {
            enabled: true,
            calendar_id: "primary".to_string(),
            api_base: "https://www.googleapis.com/calendar/v3".to_string(),
            token_path: "data/token.json".to_string(),
            summary: "gnar sesh".to_string(),
            time_zone: "America/Los_Angeles".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from midtide-config.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(spot = %config.spot.name, "loaded configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save current configuration as pretty TOML
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }
}
