//! Error types and handling for the PVPC bot
//!
//! This module defines the error types used throughout the application.
//! Data-quality faults carry the offending hour or range so the reporting
//! cycle can log them and abort without publishing.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Result type alias for PVPC bot operations
pub type Result<T> = std::result::Result<T, PvpcError>;

/// Main error type for the PVPC bot
#[derive(Debug, Error)]
pub enum PvpcError {
    /// No tariff band covers a weekday timestamp (calendar bug)
    #[error("No tariff band matched {timestamp}")]
    NoBandMatched { timestamp: NaiveDateTime },

    /// An hour range resolved to zero price entries
    #[error("Empty hour range [{start}, {end})")]
    EmptyRange { start: usize, end: usize },

    /// A price value could not be parsed as a decimal number
    #[error("Malformed price at hour {hour}: {raw:?}")]
    MalformedPrice { hour: usize, raw: String },

    /// The following day's series could not be obtained
    #[error("No price data for next day {date}: {message}")]
    NoNextDayData { date: NaiveDate, message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Network-related errors
    #[error("Network error: {message}")]
    Network { message: String },

    /// Upstream API returned an unusable payload
    #[error("API error: {message}")]
    Api { message: String },

    /// Publishing to a destination failed
    #[error("Publish error: {destination} - {message}")]
    Publish {
        destination: String,
        message: String,
    },

    /// Chart or report rendering failed
    #[error("Render error: {message}")]
    Render { message: String },
}

impl PvpcError {
    /// Create a new no-band-matched error
    pub fn no_band_matched(timestamp: NaiveDateTime) -> Self {
        PvpcError::NoBandMatched { timestamp }
    }

    /// Create a new empty-range error
    pub fn empty_range(start: usize, end: usize) -> Self {
        PvpcError::EmptyRange { start, end }
    }

    /// Create a new malformed-price error
    pub fn malformed_price<S: Into<String>>(hour: usize, raw: S) -> Self {
        PvpcError::MalformedPrice {
            hour,
            raw: raw.into(),
        }
    }

    /// Create a new missing next-day data error
    pub fn no_next_day_data<S: Into<String>>(date: NaiveDate, message: S) -> Self {
        PvpcError::NoNextDayData {
            date,
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        PvpcError::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        PvpcError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        PvpcError::Serialization {
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        PvpcError::Io {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        PvpcError::Network {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        PvpcError::Api {
            message: message.into(),
        }
    }

    /// Create a new publish error
    pub fn publish<S: Into<String>>(destination: S, message: S) -> Self {
        PvpcError::Publish {
            destination: destination.into(),
            message: message.into(),
        }
    }

    /// Create a new render error
    pub fn render<S: Into<String>>(message: S) -> Self {
        PvpcError::Render {
            message: message.into(),
        }
    }

    /// Whether the error stems from bad or incomplete upstream price data
    pub fn is_data_fault(&self) -> bool {
        matches!(
            self,
            PvpcError::EmptyRange { .. }
                | PvpcError::MalformedPrice { .. }
                | PvpcError::NoNextDayData { .. }
        )
    }
}

impl From<std::io::Error> for PvpcError {
    fn from(err: std::io::Error) -> Self {
        PvpcError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for PvpcError {
    fn from(err: serde_yaml::Error) -> Self {
        PvpcError::serialization(err.to_string())
    }
}

impl From<serde_json::Error> for PvpcError {
    fn from(err: serde_json::Error) -> Self {
        PvpcError::serialization(err.to_string())
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for PvpcError {
    fn from(err: reqwest::Error) -> Self {
        PvpcError::network(err.to_string())
    }
}

impl From<chrono::ParseError> for PvpcError {
    fn from(err: chrono::ParseError) -> Self {
        PvpcError::validation("datetime".to_string(), err.to_string())
    }
}
