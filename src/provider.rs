//! Price data providers
//!
//! A provider returns the hourly series for one date. Caching and retry
//! belong to the provider; callers see a single awaited call.

use crate::config::DataConfig;
use crate::error::{PvpcError, Result};
use crate::series::PriceSeries;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::time::Duration;

pub mod cache;
#[cfg(feature = "http")]
pub mod esios;
pub mod payload;

pub use cache::FileCache;
#[cfg(feature = "http")]
pub use esios::EsiosProvider;
pub use payload::parse_pvpc_payload;

/// Source of daily price series
#[async_trait::async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch(&self, date: NaiveDate) -> Result<PriceSeries>;
}

/// Fixed-delay retry budget for downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, at least 1
    pub max_attempts: u32,
    /// Wait between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(cfg: &DataConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            delay: Duration::from_secs(cfg.retry_delay_seconds),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(300),
        }
    }
}

/// Provider serving preloaded series, used for offline runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    series: HashMap<NaiveDate, PriceSeries>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.series.insert(series.date(), series);
        self
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.date(), series);
    }
}

#[async_trait::async_trait]
impl PriceProvider for MemoryProvider {
    async fn fetch(&self, date: NaiveDate) -> Result<PriceSeries> {
        self.series
            .get(&date)
            .cloned()
            .ok_or_else(|| PvpcError::api(format!("no price data loaded for {}", date)))
    }
}

/// Provider reading only the on-disk cache
#[derive(Debug, Clone)]
pub struct CacheOnlyProvider {
    cache: FileCache,
}

impl CacheOnlyProvider {
    pub fn new(cache: FileCache) -> Self {
        Self { cache }
    }
}

#[async_trait::async_trait]
impl PriceProvider for CacheOnlyProvider {
    async fn fetch(&self, date: NaiveDate) -> Result<PriceSeries> {
        let body = self
            .cache
            .read(date)
            .ok_or_else(|| PvpcError::api(format!("no cached data for {}", date)))?;
        parse_pvpc_payload(date, &body)
    }
}
