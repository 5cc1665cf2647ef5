use chrono::{NaiveDate, NaiveDateTime};
use pvpc_bot::config::Config;
use pvpc_bot::error::{PvpcError, Result};
use pvpc_bot::provider::{MemoryProvider, PriceProvider};
use pvpc_bot::publish::{Post, Publisher};
use pvpc_bot::series::PriceSeries;
use pvpc_bot::ReportingCycle;
use std::sync::{Arc, Mutex};

struct RecordingPublisher {
    platform: String,
    fail: bool,
    posts: Mutex<Vec<Post>>,
}

impl RecordingPublisher {
    fn new(platform: &str, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            platform: platform.to_string(),
            fail,
            posts: Mutex::new(Vec::new()),
        })
    }

    fn posts(&self) -> Vec<Post> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Publisher for RecordingPublisher {
    fn platform(&self) -> &str {
        &self.platform
    }

    fn account(&self) -> &str {
        "tester"
    }

    async fn publish(&self, post: &Post) -> Result<String> {
        self.posts.lock().unwrap().push(post.clone());
        if self.fail {
            return Err(PvpcError::publish(self.platform.as_str(), "refused"));
        }
        Ok(format!("ok-{}", self.posts.lock().unwrap().len()))
    }
}

/// Provider whose fetches fail for selected dates
struct FlakyProvider {
    inner: MemoryProvider,
    broken: Vec<NaiveDate>,
}

#[async_trait::async_trait]
impl PriceProvider for FlakyProvider {
    async fn fetch(&self, date: NaiveDate) -> Result<PriceSeries> {
        if self.broken.contains(&date) {
            return Err(PvpcError::network("connection reset"));
        }
        self.inner.fetch(date).await
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn at(d: u32, h: u32) -> NaiveDateTime {
    day(d).and_hms_opt(h, 0, 0).unwrap()
}

fn series(date: NaiveDate, base: i64) -> PriceSeries {
    let raws: Vec<String> = (0..24).map(|h| format!("{},0", base + h * 3)).collect();
    PriceSeries::from_raw(date, &raws).unwrap()
}

fn config(output_dir: &std::path::Path) -> Config {
    let mut cfg = Config::default();
    cfg.publishing.output_dir = output_dir.to_string_lossy().to_string();
    cfg
}

fn cycle(
    cfg: Config,
    provider: Arc<dyn PriceProvider>,
    publishers: &[Arc<RecordingPublisher>],
) -> ReportingCycle {
    let publishers: Vec<Arc<dyn Publisher>> = publishers
        .iter()
        .map(|p| p.clone() as Arc<dyn Publisher>)
        .collect();
    ReportingCycle::new(cfg, provider, publishers).unwrap()
}

#[tokio::test]
async fn publishes_hourly_message_to_every_destination() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(MemoryProvider::new().with_series(series(day(4), 100)));
    let a = RecordingPublisher::new("twitter", false);
    let b = RecordingPublisher::new("mastodon", false);
    let c = cycle(config(dir.path()), provider, &[a.clone(), b.clone()]);

    let outcome = c.run(at(4, 10)).await.unwrap();

    assert!(outcome.message.starts_with("🔴 Empieza periodo punta"));
    assert!(outcome.summary.is_none());
    assert_eq!(outcome.deliveries.len(), 2);
    assert_eq!(a.posts(), vec![Post::text(outcome.message.clone())]);
    assert_eq!(b.posts().len(), 1);
}

#[tokio::test]
async fn last_hour_without_next_day_publishes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FlakyProvider {
        inner: MemoryProvider::new().with_series(series(day(4), 100)),
        broken: vec![day(5)],
    });
    let p = RecordingPublisher::new("telegram", false);
    let c = cycle(config(dir.path()), provider, &[p.clone()]);

    let err = c.run(at(4, 23)).await.unwrap_err();
    assert!(matches!(err, PvpcError::NoNextDayData { .. }));
    assert!(p.posts().is_empty());
}

#[tokio::test]
async fn last_hour_uses_next_day_first_price() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(
        MemoryProvider::new()
            .with_series(series(day(4), 100))
            .with_series(series(day(5), 50)),
    );
    let p = RecordingPublisher::new("telegram", false);
    let c = cycle(config(dir.path()), provider, &[p.clone()]);

    let outcome = c.run(at(4, 23)).await.unwrap();
    assert!(outcome.message.contains("En esta hora: 0.169"));
    assert!(outcome.message.contains("En la hora siguiente: 0.050↘"));
}

#[tokio::test]
async fn missing_today_data_publishes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(MemoryProvider::new());
    let p = RecordingPublisher::new("twitter", false);
    let c = cycle(config(dir.path()), provider, &[p.clone()]);

    assert!(c.run(at(4, 12)).await.is_err());
    assert!(p.posts().is_empty());
}

#[tokio::test]
async fn malformed_band_data_publishes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut raws: Vec<String> = (0..24).map(|h| format!("{},0", 100 + h)).collect();
    for raw in raws.iter_mut().take(14).skip(10) {
        *raw = "--".to_string();
    }
    let bad = PriceSeries::from_raw(day(4), &raws).unwrap();
    let provider = Arc::new(MemoryProvider::new().with_series(bad));
    let p = RecordingPublisher::new("twitter", false);
    let c = cycle(config(dir.path()), provider, &[p.clone()]);

    let err = c.run(at(4, 11)).await.unwrap_err();
    assert!(err.is_data_fault());
    assert!(p.posts().is_empty());
}

#[tokio::test]
async fn summary_hour_posts_chart_before_message() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(
        MemoryProvider::new()
            .with_series(series(day(4), 100))
            .with_series(series(day(5), 80)),
    );
    let p = RecordingPublisher::new("mastodon", false);
    let c = cycle(config(dir.path()), provider, &[p.clone()]);

    let outcome = c.run(at(4, 21)).await.unwrap();
    let summary = outcome.summary.expect("summary at 21:00");
    assert_eq!(summary.date, day(5));
    assert!(summary.image_path.exists());
    assert!(summary.script_path.exists());
    assert!(summary.post_path.ends_with("2024-03-04-post.md"));

    let posts = p.posts();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].text, "Evolución precio para el día 2024-03-05");
    let image = posts[0].image.as_ref().unwrap();
    assert!(image.alt_text.contains("Mínimo a las 0:00 (0.080)"));
    assert!(image.alt_text.contains("Máximo a las 23:00 (0.149)"));
    assert_eq!(posts[1].text, outcome.message);
}

#[tokio::test]
async fn failed_summary_still_posts_message() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FlakyProvider {
        inner: MemoryProvider::new().with_series(series(day(4), 100)),
        broken: vec![day(5)],
    });
    let p = RecordingPublisher::new("mastodon", false);
    let c = cycle(config(dir.path()), provider, &[p.clone()]);

    let outcome = c.run(at(4, 21)).await.unwrap();
    assert!(outcome.summary.is_none());
    assert_eq!(p.posts(), vec![Post::text(outcome.message.clone())]);
}

#[tokio::test]
async fn failing_destination_does_not_stop_others() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(MemoryProvider::new().with_series(series(day(4), 100)));
    let broken = RecordingPublisher::new("twitter", true);
    let ok = RecordingPublisher::new("blsk", false);
    let c = cycle(config(dir.path()), provider, &[broken.clone(), ok.clone()]);

    let outcome = c.run(at(4, 15)).await.unwrap();
    assert_eq!(outcome.failed_deliveries(), 1);
    assert_eq!(broken.posts().len(), 1);
    assert_eq!(ok.posts().len(), 1);
}

#[tokio::test]
async fn message_is_truncated_to_configured_length() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.message.max_length = 10;
    let provider = Arc::new(MemoryProvider::new().with_series(series(day(4), 100)));
    let p = RecordingPublisher::new("twitter", false);
    let c = cycle(cfg, provider, &[p.clone()]);

    let outcome = c.run(at(4, 8)).await.unwrap();
    assert_eq!(outcome.message.chars().count(), 10);
    assert!(outcome.message.starts_with("🟠 Empieza"));
}

fn dated(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One row per real hour, priced 100 + row €/MWh
fn rising_series(date: NaiveDate, rows: i64) -> PriceSeries {
    let raws: Vec<String> = (0..rows).map(|i| format!("{},0", 100 + i)).collect();
    PriceSeries::from_raw(date, &raws).unwrap()
}

#[tokio::test]
async fn spring_forward_day_quotes_by_wall_clock() {
    let dir = tempfile::tempdir().unwrap();
    let sunday = dated(2024, 3, 31);
    let provider = Arc::new(
        MemoryProvider::new()
            .with_series(rising_series(sunday, 23))
            .with_series(series(dated(2024, 4, 1), 50)),
    );
    let p = RecordingPublisher::new("telegram", false);
    let c = cycle(config(dir.path()), provider, &[p.clone()]);

    let three = c.run(sunday.and_hms_opt(3, 0, 0).unwrap()).await.unwrap();
    assert!(three.message.contains("En esta hora: 0.102\n"));
    assert!(three.message.contains("En la hora siguiente: 0.103↗"));

    let ten_pm = c.run(sunday.and_hms_opt(22, 0, 0).unwrap()).await.unwrap();
    assert!(ten_pm.message.contains("En esta hora: 0.121\n"));
    assert!(ten_pm.message.contains("En la hora siguiente: 0.122↗"));

    let last = c.run(sunday.and_hms_opt(23, 0, 0).unwrap()).await.unwrap();
    assert!(last.message.contains("En esta hora: 0.122\n"));
    assert!(last.message.contains("En la hora siguiente: 0.050↘"));

    assert_eq!(p.posts().len(), 3);
}

#[tokio::test]
async fn fall_back_day_covers_all_rows() {
    let dir = tempfile::tempdir().unwrap();
    let sunday = dated(2024, 10, 27);
    let provider = Arc::new(
        MemoryProvider::new()
            .with_series(rising_series(sunday, 25))
            .with_series(series(dated(2024, 10, 28), 50)),
    );
    let p = RecordingPublisher::new("mastodon", false);
    let c = cycle(config(dir.path()), provider, &[p.clone()]);

    let midnight = c.run(sunday.and_hms_opt(0, 0, 0).unwrap()).await.unwrap();
    assert!(midnight.message.starts_with("🟢 Empieza periodo valle (todo el día)"));
    assert!(midnight.message.contains("Mín: 0.100, entre las 0:00 y las 1:00"));
    assert!(midnight.message.contains("Máx: 0.124, entre las 23:00 y las 24:00"));

    let three = c.run(sunday.and_hms_opt(3, 0, 0).unwrap()).await.unwrap();
    assert!(three.message.contains("En esta hora: 0.104\n"));

    let last = c.run(sunday.and_hms_opt(23, 0, 0).unwrap()).await.unwrap();
    assert!(last.message.contains("En esta hora: 0.124\n"));
    assert!(last.message.contains("En la hora siguiente: 0.050↘"));
}
