//! Configuration management for the PVPC bot
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files with support for environment variable overrides.

use crate::error::{PvpcError, Result};
use crate::tariff::{BandKind, TariffBand, TariffCalendar};
use chrono::Weekday;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

mod defaults;

/// Environment variable overriding `data.cache_dir`
pub const ENV_CACHE_DIR: &str = "PVPC_BOT_CACHE_DIR";
/// Environment variable overriding `logging.level`
pub const ENV_LOG_LEVEL: &str = "PVPC_BOT_LOG_LEVEL";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// IANA timezone the tariff calendar is defined in
    pub timezone: String,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Price data source configuration
    pub data: DataConfig,

    /// Tariff band table and weekend rule
    pub tariff: TariffConfig,

    /// Message labels and symbols
    pub message: MessageConfig,

    /// Destinations and daily summary settings
    pub publishing: PublishingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional console-specific level
    pub console_level: Option<String>,

    /// Optional file-specific level
    pub file_level: Option<String>,

    /// Path to log file (its directory receives the daily rolled files)
    pub file: String,

    /// Number of rolled files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

/// ESIOS download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Archive download endpoint
    pub api_url: String,

    /// Directory for `YYYY-MM-DD_data.json` cache files
    pub cache_dir: String,

    /// Per-request timeout
    pub timeout_seconds: u64,

    /// Total download attempts before giving up
    pub max_attempts: u32,

    /// Fixed wait between attempts
    pub retry_delay_seconds: u64,
}

/// Tariff table as written in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TariffConfig {
    /// Weekday bands in matching order
    pub bands: Vec<TariffBand>,

    /// Days resolved as a single all-day valle (0=Mon, 6=Sun)
    pub weekend_days: Vec<u8>,
}

/// Texts used to compose the hourly message.
///
/// Templates use `{name}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageConfig {
    /// Leading symbol per logical band
    pub band_symbols: BTreeMap<BandKind, String>,

    /// Fallback symbol for a band with no entry
    pub unknown_symbol: String,

    /// Narration for the first hour of a band
    pub starting: String,

    /// Narration for any later hour
    pub currently_in: String,

    /// `{symbol} {narration} ... {band} {range}` header
    pub header: String,

    /// Range text, `{start}` and `{end}`
    pub range: String,

    /// Range text for whole-day frames
    pub all_day: String,

    /// Current hour line, `{price}`
    pub current_price: String,

    /// Next hour line, `{price}` and `{trend}`
    pub next_price: String,

    /// Cheapest hour line, `{price}`, `{hour}`, `{next_hour}`
    pub min_line: String,

    /// Most expensive hour line, `{price}`, `{hour}`, `{next_hour}`
    pub max_line: String,

    /// Platform character limit applied after composition
    pub max_length: usize,
}

/// One social-media destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Platform name (twitter, telegram, mastodon, blsk)
    pub platform: String,

    /// Account used in simulation mode; `None` skips the platform there
    pub test_account: Option<String>,

    /// Account used in production
    pub production_account: Option<String>,

    /// Relay endpoint; posts are only logged when unset
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Publishing and daily-summary configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishingConfig {
    /// Hour at which tomorrow's chart and post are produced; `None` disables it
    pub summary_hour: Option<u32>,

    /// Directory for chart, script and post artifacts
    pub output_dir: String,

    /// Handle shown in the chart title
    pub chart_handle: String,

    /// Configured destinations
    pub destinations: Vec<DestinationConfig>,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the default locations, falling back to defaults
    pub fn load() -> Result<Self> {
        let default_paths = ["pvpc_bot.yaml", "/etc/pvpc-bot/config.yaml"];

        let mut config = match default_paths.iter().find(|p| Path::new(p).exists()) {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply environment-style overrides through a lookup function
    pub fn apply_overrides<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(dir) = lookup(ENV_CACHE_DIR).filter(|v| !v.trim().is_empty()) {
            self.data.cache_dir = dir;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            self.logging.level = level;
        }
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parsed timezone
    pub fn tz(&self) -> Result<Tz> {
        self.timezone.parse::<Tz>().map_err(|_| {
            PvpcError::validation(
                "timezone".to_string(),
                format!("unknown timezone {}", self.timezone),
            )
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.tz()?;
        crate::logging::parse_log_level(&self.logging.level)?;

        self.tariff.calendar()?;

        if self.data.api_url.trim().is_empty() {
            return Err(PvpcError::validation(
                "data.api_url",
                "Endpoint cannot be empty",
            ));
        }

        if self.data.max_attempts == 0 {
            return Err(PvpcError::validation(
                "data.max_attempts",
                "Must be greater than 0",
            ));
        }

        if self.message.max_length == 0 {
            return Err(PvpcError::validation(
                "message.max_length",
                "Must be greater than 0",
            ));
        }

        if let Some(hour) = self.publishing.summary_hour
            && hour > 23
        {
            return Err(PvpcError::validation(
                "publishing.summary_hour",
                "Must be between 0 and 23",
            ));
        }

        if self
            .publishing
            .destinations
            .iter()
            .any(|d| d.platform.trim().is_empty())
        {
            return Err(PvpcError::validation(
                "publishing.destinations",
                "Platform cannot be empty",
            ));
        }

        Ok(())
    }
}

impl TariffConfig {
    /// Build the validated calendar
    pub fn calendar(&self) -> Result<TariffCalendar> {
        let weekend = self
            .weekend_days
            .iter()
            .map(|d| weekday_from_index(*d))
            .collect::<Result<Vec<_>>>()?;
        TariffCalendar::new(self.bands.clone(), weekend)
    }
}

fn weekday_from_index(day: u8) -> Result<Weekday> {
    Ok(match day {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        6 => Weekday::Sun,
        _ => {
            return Err(PvpcError::validation(
                "tariff.weekend_days".to_string(),
                format!("{} is not a day index (0=Mon..6=Sun)", day),
            ));
        }
    })
}

impl MessageConfig {
    /// Symbol for a band, falling back to `unknown_symbol`
    pub fn symbol_for(&self, band: BandKind) -> &str {
        self.band_symbols
            .get(&band)
            .map_or(self.unknown_symbol.as_str(), String::as_str)
    }
}
