//! ESIOS (Red Eléctrica) archive download client

use super::{FileCache, PriceProvider, RetryPolicy, parse_pvpc_payload};
use crate::config::DataConfig;
use crate::error::{PvpcError, Result};
use crate::logging::{StructuredLogger, get_logger};
use crate::series::PriceSeries;
use chrono::NaiveDate;
use reqwest::header::{ACCEPT, USER_AGENT};
use std::time::Duration;

/// Downloads the daily PVPC archive, caching accepted payloads on disk
pub struct EsiosProvider {
    client: reqwest::Client,
    api_url: String,
    cache: FileCache,
    retry: RetryPolicy,
    logger: StructuredLogger,
}

impl EsiosProvider {
    pub fn new(cfg: &DataConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_seconds.max(1)))
            .build()?;
        Ok(Self {
            client,
            api_url: cfg.api_url.clone(),
            cache: FileCache::new(&cfg.cache_dir),
            retry: RetryPolicy::from_config(cfg),
            logger: get_logger("esios"),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    async fn download(&self, date: NaiveDate) -> Result<String> {
        let day = date.format("%Y-%m-%d").to_string();
        let resp = self
            .client
            .get(&self.api_url)
            .query(&[("locale", "es"), ("date", day.as_str())])
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, concat!("pvpc-bot/", env!("CARGO_PKG_VERSION")))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(PvpcError::api(format!(
                "ESIOS HTTP error for {}: {}",
                day,
                resp.status()
            )));
        }
        Ok(resp.text().await?)
    }

    fn cached(&self, date: NaiveDate) -> Option<PriceSeries> {
        let body = self.cache.read(date)?;
        match parse_pvpc_payload(date, &body) {
            Ok(series) => Some(series),
            Err(e) => {
                self.logger
                    .warn(&format!("Ignoring invalid cache entry for {}: {}", date, e));
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl PriceProvider for EsiosProvider {
    async fn fetch(&self, date: NaiveDate) -> Result<PriceSeries> {
        if let Some(series) = self.cached(date) {
            return Ok(series);
        }

        let mut last_error = None;
        for attempt in 1..=self.retry.max_attempts {
            self.logger.info(&format!(
                "Fetching data from ESIOS for {} (attempt {}/{})",
                date, attempt, self.retry.max_attempts
            ));
            let outcome = match self.download(date).await {
                Ok(body) => parse_pvpc_payload(date, &body).map(|series| (series, body)),
                Err(e) => Err(e),
            };
            match outcome {
                Ok((series, body)) => {
                    if let Err(e) = self.cache.write(date, &body) {
                        self.logger.warn(&format!("Could not cache data: {}", e));
                    }
                    return Ok(series);
                }
                Err(e) => {
                    self.logger.warn(&format!("Attempt {} failed: {}", attempt, e));
                    last_error = Some(e);
                }
            }
            if attempt < self.retry.max_attempts {
                self.logger.info(&format!(
                    "Waiting {} seconds before retrying",
                    self.retry.delay.as_secs()
                ));
                tokio::time::sleep(self.retry.delay).await;
            }
        }

        Err(PvpcError::api(format!(
            "Failed to fetch valid data for {} after {} attempts: {}",
            date,
            self.retry.max_attempts,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }
}
