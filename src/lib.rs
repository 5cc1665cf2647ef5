//! # pvpc-bot - hourly PVPC electricity price publisher
//!
//! Fetches the Spanish regulated hourly electricity prices (PVPC), works out
//! which tariff band the current hour belongs to, and publishes a short
//! status message. Once a day it also publishes a chart and a blog post for
//! the following day.
//!
//! ## Architecture
//!
//! - `tariff`: clock boundaries, bands and the weekday/weekend calendar
//! - `series`: fixed-point prices and the hourly series
//! - `timeframe`: band resolution for a timestamp
//! - `extremes`: first-occurrence min/max over an hour range
//! - `trend`: direction between consecutive prices
//! - `message`: pure composition of the hourly text
//! - `provider`: ESIOS download client and on-disk cache
//! - `publish`: destinations, log and webhook publishers
//! - `report`: chart, price table, Chart.js script and Jekyll post
//! - `cycle`: one fetch-compose-publish run
//! - `config`, `logging`, `error`, `cli`: ambient plumbing

pub mod cli;
pub mod config;
pub mod cycle;
pub mod error;
pub mod extremes;
pub mod logging;
pub mod message;
pub mod provider;
pub mod publish;
pub mod report;
pub mod series;
pub mod tariff;
pub mod timeframe;
pub mod trend;

// Re-export commonly used types
pub use config::Config;
pub use cycle::{CycleOutcome, ReportingCycle};
pub use error::{PvpcError, Result};
pub use extremes::{ExtremumPair, HourPrice, HourRange, find_extremes};
pub use message::MessageComposer;
pub use series::{Price, PriceSeries};
pub use tariff::{BandKind, ClockTime, TariffBand, TariffCalendar};
pub use timeframe::{TimeFrame, TimeFrameResolver};
pub use trend::Trend;
