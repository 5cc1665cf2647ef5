//! Command-line interface

use crate::error::{PvpcError, Result};
use crate::tariff::ClockTime;
use chrono::{NaiveDate, NaiveDateTime};
use clap::Parser;
use std::path::PathBuf;

/// Clock used in simulation when none is given
pub const DEFAULT_SIMULATION_CLOCK: &str = "21:00";

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "pvpc-bot")]
#[command(about = "Publishes hourly PVPC electricity prices and tariff bands", long_about = None)]
#[command(version = env!("APP_VERSION"))]
pub struct Args {
    /// Configuration file (defaults to pvpc_bot.yaml or /etc/pvpc-bot/config.yaml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Simulation mode: publish to test accounts
    #[arg(short = 's', long = "simulate")]
    pub simulate: bool,

    /// Pin the clock (HH:MM or YYYY-MM-DDTHH:MM); only honoured with -s
    #[arg(
        short = 't',
        long = "time",
        value_name = "CLOCK",
        num_args = 0..=1,
        default_missing_value = DEFAULT_SIMULATION_CLOCK
    )]
    pub time: Option<String>,
}

impl Args {
    /// Timestamp to run at: pinned in simulation, otherwise `wall_clock`
    pub fn effective_now(&self, wall_clock: NaiveDateTime) -> Result<NaiveDateTime> {
        if !self.simulate {
            return Ok(wall_clock);
        }
        let clock = self.time.as_deref().unwrap_or(DEFAULT_SIMULATION_CLOCK);
        parse_clock(clock, wall_clock.date())
    }
}

/// Parse `HH:MM` on `today`, or a full `YYYY-MM-DDTHH:MM`.
///
/// `24:00` means midnight of the following day.
pub fn parse_clock(value: &str, today: NaiveDate) -> Result<NaiveDateTime> {
    let value = value.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M") {
        return Ok(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M") {
        return Ok(ts);
    }
    let clock = ClockTime::parse(value).map_err(|_| {
        PvpcError::validation(
            "time".to_string(),
            format!("expected HH:MM or YYYY-MM-DDTHH:MM, got {:?}", value),
        )
    })?;
    Ok(clock.on(today))
}
