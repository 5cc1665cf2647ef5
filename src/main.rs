use anyhow::{Context, Result};
use clap::Parser;
use pvpc_bot::cli::Args;
use pvpc_bot::logging::init_logging;
use pvpc_bot::provider::PriceProvider;
use pvpc_bot::publish::{build_publishers, destinations_for};
use pvpc_bot::{Config, ReportingCycle};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };
    if args.config.is_some() {
        config.apply_overrides(|key| std::env::var(key).ok());
    }
    init_logging(&config.logging).map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;

    info!(
        "pvpc-bot {} starting (simulation: {})",
        env!("APP_VERSION"),
        args.simulate
    );

    let provider = build_provider(&config)?;
    let destinations = destinations_for(&config.publishing, args.simulate);
    if destinations.is_empty() {
        warn!("No destinations configured for this mode; the message will only be logged");
    }
    let publishers = build_publishers(&destinations)?;

    let cycle = ReportingCycle::new(config, provider, publishers)
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    let now = args.effective_now(cycle.local_now())?;
    info!("Running cycle for {}", now);

    match cycle.run(now).await {
        Ok(outcome) => {
            let failed = outcome.failed_deliveries();
            if failed > 0 {
                warn!("{} of {} deliveries failed", failed, outcome.deliveries.len());
            }
            info!("Cycle complete");
            Ok(())
        }
        Err(e) => {
            error!("Cycle failed: {}", e);
            Err(anyhow::anyhow!("Cycle error: {}", e))
        }
    }
}

#[cfg(feature = "http")]
fn build_provider(config: &Config) -> Result<Arc<dyn PriceProvider>> {
    let provider = pvpc_bot::provider::EsiosProvider::new(&config.data)?;
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "http"))]
fn build_provider(config: &Config) -> Result<Arc<dyn PriceProvider>> {
    let cache = pvpc_bot::provider::FileCache::new(&config.data.cache_dir);
    Ok(Arc::new(pvpc_bot::provider::CacheOnlyProvider::new(cache)))
}
