//! One reporting cycle: fetch, resolve, compose, publish
//!
//! Everything that can fail on bad data runs before the first publish call,
//! so a failed cycle never posts a partial message.

use crate::config::Config;
use crate::error::{PvpcError, Result};
use crate::extremes::find_extremes;
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::message::MessageComposer;
use crate::provider::PriceProvider;
use crate::publish::{Post, Publisher, truncate_message};
use crate::report::{ChartRenderer, DailySummary, SummaryBuilder, SvgChartRenderer};
use crate::tariff::TariffCalendar;
use crate::timeframe::TimeFrameResolver;
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

/// Result of publishing one post to one destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub platform: String,
    pub account: String,
    /// Whether this was the daily summary image post
    pub summary: bool,
    pub outcome: std::result::Result<String, String>,
}

/// What a completed cycle produced
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub message: String,
    pub summary: Option<DailySummary>,
    pub deliveries: Vec<Delivery>,
}

impl CycleOutcome {
    pub fn failed_deliveries(&self) -> usize {
        self.deliveries.iter().filter(|d| d.outcome.is_err()).count()
    }
}

/// Drives one run against injected collaborators
pub struct ReportingCycle {
    config: Config,
    calendar: TariffCalendar,
    tz: Tz,
    provider: Arc<dyn PriceProvider>,
    publishers: Vec<Arc<dyn Publisher>>,
    summary: SummaryBuilder,
}

impl ReportingCycle {
    /// Validate the configuration and wire the default SVG renderer
    pub fn new(
        config: Config,
        provider: Arc<dyn PriceProvider>,
        publishers: Vec<Arc<dyn Publisher>>,
    ) -> Result<Self> {
        config.validate()?;
        let renderer: Arc<dyn ChartRenderer> = Arc::new(SvgChartRenderer::new(
            &config.publishing.output_dir,
            &config.publishing.chart_handle,
        ));
        Ok(Self {
            calendar: config.tariff.calendar()?,
            tz: config.tz()?,
            summary: SummaryBuilder::new(&config.publishing.output_dir, renderer),
            config,
            provider,
            publishers,
        })
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.summary = SummaryBuilder::new(&self.config.publishing.output_dir, renderer);
        self
    }

    /// Current wall-clock time in the tariff timezone
    pub fn local_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.tz).naive_local()
    }

    /// Run the cycle for local time `now`
    pub async fn run(&self, now: NaiveDateTime) -> Result<CycleOutcome> {
        let logger = get_logger_with_context(
            LogContext::new("cycle").with_cycle(now.format("%Y-%m-%dT%H:%M").to_string()),
        );

        let message = match self.compose(now).await {
            Ok(message) => message,
            Err(e) => {
                logger.error(&format!("Cycle aborted, nothing published: {}", e));
                return Err(e);
            }
        };
        logger.info(&format!("Message: {}", message.replace('\n', " | ")));

        let summary = if self.is_summary_hour(now) {
            match self.build_summary(now).await {
                Ok(summary) => Some(summary),
                Err(e) => {
                    logger.error(&format!("Daily summary failed: {}", e));
                    None
                }
            }
        } else {
            None
        };

        let deliveries = self
            .publish_all(&logger, &message, summary.as_ref())
            .await;

        Ok(CycleOutcome {
            message,
            summary,
            deliveries,
        })
    }

    /// Fetch, resolve and compose without publishing
    pub async fn compose(&self, now: NaiveDateTime) -> Result<String> {
        let today = self.provider.fetch(now.date()).await?;
        let frame = TimeFrameResolver::new(&self.calendar).resolve(now)?;
        let extremes = find_extremes(&today, frame.hour_range())?;

        let next_date = (now + Duration::hours(1)).date();
        let next_day = if next_date != now.date() {
            let series = self
                .provider
                .fetch(next_date)
                .await
                .map_err(|e| PvpcError::no_next_day_data(next_date, e.to_string()))?;
            Some(series)
        } else {
            None
        };

        let text = MessageComposer::new(&self.config.message).compose(
            now,
            &today,
            next_day.as_ref(),
            &frame,
            &extremes,
        )?;
        Ok(truncate_message(&text, self.config.message.max_length))
    }

    fn is_summary_hour(&self, now: NaiveDateTime) -> bool {
        self.config.publishing.summary_hour == Some(now.hour())
    }

    async fn build_summary(&self, now: NaiveDateTime) -> Result<DailySummary> {
        let next_date = now.date() + Duration::days(1);
        let series = self.provider.fetch(next_date).await?;
        self.summary.build(&series, self.published_at(now)).await
    }

    fn published_at(&self, now: NaiveDateTime) -> DateTime<FixedOffset> {
        match self.tz.from_local_datetime(&now).earliest() {
            Some(local) => local.fixed_offset(),
            None => Utc.from_utc_datetime(&now).fixed_offset(),
        }
    }

    async fn publish_all(
        &self,
        logger: &StructuredLogger,
        message: &str,
        summary: Option<&DailySummary>,
    ) -> Vec<Delivery> {
        let hourly = Post::text(message);
        let summary_post = summary.map(DailySummary::post);
        let mut deliveries = Vec::new();

        for publisher in &self.publishers {
            logger.info(&format!(
                "Publishing to {} ({})",
                publisher.platform(),
                publisher.account()
            ));
            if let Some(post) = &summary_post {
                deliveries.push(deliver(logger, publisher.as_ref(), post, true).await);
            }
            deliveries.push(deliver(logger, publisher.as_ref(), &hourly, false).await);
        }
        deliveries
    }
}

async fn deliver(
    logger: &StructuredLogger,
    publisher: &dyn Publisher,
    post: &Post,
    summary: bool,
) -> Delivery {
    let outcome = match publisher.publish(post).await {
        Ok(receipt) => {
            logger.info(&format!("Published to {}: {}", publisher.platform(), receipt));
            Ok(receipt)
        }
        Err(e) => {
            logger.error(&format!(
                "Failed to publish to {}: {}",
                publisher.platform(),
                e
            ));
            Err(e.to_string())
        }
    };
    Delivery {
        platform: publisher.platform().to_string(),
        account: publisher.account().to_string(),
        summary,
        outcome,
    }
}
