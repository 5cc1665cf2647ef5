use super::*;
use crate::tariff::default_bands;

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: "/tmp/pvpc-bot.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.esios.ree.es/archives/70/download_json".to_string(),
            cache_dir: "/tmp".to_string(),
            timeout_seconds: 30,
            max_attempts: 3,
            retry_delay_seconds: 300,
        }
    }
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            bands: default_bands(),
            weekend_days: vec![5, 6],
        }
    }
}

impl Default for MessageConfig {
    fn default() -> Self {
        let band_symbols = BTreeMap::from([
            (BandKind::Valle, "🟢".to_string()),
            (BandKind::Llano, "🟠".to_string()),
            (BandKind::Punta, "🔴".to_string()),
        ]);
        Self {
            band_symbols,
            unknown_symbol: "?".to_string(),
            starting: "Empieza".to_string(),
            currently_in: "Estamos en".to_string(),
            header: "{symbol} {narration} periodo {band} ({range}). Precios PVPC".to_string(),
            range: "entre las {start} y las {end}".to_string(),
            all_day: "todo el día".to_string(),
            current_price: "En esta hora: {price}".to_string(),
            next_price: "En la hora siguiente: {price}{trend}".to_string(),
            min_line: "Mín: {price}, entre las {hour}:00 y las {next_hour}:00 (hora más económica)"
                .to_string(),
            max_line: "Máx: {price}, entre las {hour}:00 y las {next_hour}:00 (hora más cara)"
                .to_string(),
            max_length: 280,
        }
    }
}

impl Default for PublishingConfig {
    fn default() -> Self {
        let destination = |platform: &str, test: &str, production: &str| DestinationConfig {
            platform: platform.to_string(),
            test_account: Some(test.to_string()),
            production_account: Some(production.to_string()),
            webhook_url: None,
        };
        Self {
            summary_hour: Some(21),
            output_dir: "/tmp".to_string(),
            chart_handle: "@botElectrico".to_string(),
            destinations: vec![
                destination("twitter", "fernand0Test", "botElectrico"),
                destination("telegram", "testFernand0", "botElectrico"),
                destination(
                    "mastodon",
                    "@fernand0Test@fosstodon.org",
                    "@botElectrico@mas.to",
                ),
                destination("blsk", "fernand0test.bsky.social", "botElectrico.bsky.social"),
            ],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: "Europe/Madrid".to_string(),
            logging: LoggingConfig::default(),
            data: DataConfig::default(),
            tariff: TariffConfig::default(),
            message: MessageConfig::default(),
            publishing: PublishingConfig::default(),
        }
    }
}
