//! Hourly PVPC price series for one calendar day
//!
//! Prices arrive as localized €/MWh strings (`"140,27"`). They are normalized
//! into an exact fixed-point [`Price`] so comparisons never depend on binary
//! floating point.

use crate::error::{PvpcError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Zone the market publishes its days in
pub const MARKET_TZ: Tz = chrono_tz::Europe::Madrid;

fn market_midnight(date: NaiveDate) -> Option<DateTime<Tz>> {
    MARKET_TZ
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
}

/// Hourly entries published for `date`: 24, or 23/25 on DST change days
pub fn hours_in_day(date: NaiveDate) -> Option<usize> {
    let start = market_midnight(date)?;
    let end = market_midnight(date.succ_opt()?)?;
    usize::try_from((end - start).num_hours()).ok()
}

/// Wall-clock start hour of each row.
///
/// Rows are consecutive real hours from local midnight. A series whose
/// length does not match the day is taken as one row per clock hour.
fn wall_clock_hours(date: NaiveDate, rows: usize) -> Vec<usize> {
    match market_midnight(date) {
        Some(start) if hours_in_day(date) == Some(rows) => (0..rows)
            .map(|i| (start + Duration::hours(i as i64)).hour() as usize)
            .collect(),
        _ => (0..rows).collect(),
    }
}

/// Fixed-point price in millionths of €/kWh (same integer as thousandths of €/MWh)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    const MICROS_PER_EUR: i64 = 1_000_000;

    pub const fn from_micro_eur_per_kwh(micros: i64) -> Self {
        Self(micros)
    }

    pub const fn micro_eur_per_kwh(self) -> i64 {
        self.0
    }

    /// Parse a €/MWh decimal string using either `,` or `.` as decimal separator.
    ///
    /// When both separators are present, `.` is taken as a thousands separator.
    /// Digits past the third decimal are rounded half away from zero.
    pub fn parse_eur_per_mwh(raw: &str) -> Option<Self> {
        let s = raw.trim();
        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let normalized = if s.contains(',') {
            s.replace('.', "").replace(',', ".")
        } else {
            s.to_string()
        };

        let (int_part, frac_part) = match normalized.split_once('.') {
            Some((i, f)) => (i, f),
            None => (normalized.as_str(), ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return None;
        }

        let mut value: i64 = 0;
        for b in int_part.bytes() {
            value = value.checked_mul(10)?.checked_add(i64::from(b - b'0'))?;
        }
        let frac = frac_part.as_bytes();
        for i in 0..3 {
            let digit = frac.get(i).map_or(0, |b| i64::from(b - b'0'));
            value = value.checked_mul(10)?.checked_add(digit)?;
        }
        if frac.get(3).is_some_and(|b| *b >= b'5') {
            value = value.checked_add(1)?;
        }
        Some(Self(if negative { -value } else { value }))
    }

    /// Parse a €/kWh decimal string (`"0.145"`)
    pub fn parse_eur_per_kwh(raw: &str) -> Option<Self> {
        // €/kWh with six decimals is €/MWh with three
        let s = raw.trim().replace(',', ".");
        let (int_part, frac_part) = s.split_once('.').unwrap_or((s.as_str(), ""));
        if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let mut frac: String = frac_part.chars().take(6).collect();
        while frac.len() < 6 {
            frac.push('0');
        }
        let shifted = format!("{}{}.{}", int_part, &frac[..3], &frac[3..]);
        let rest: String = frac_part.chars().skip(6).collect();
        Self::parse_eur_per_mwh(&format!("{}{}", shifted, rest))
    }

    pub fn as_eur_per_kwh(self) -> f64 {
        self.0 as f64 / Self::MICROS_PER_EUR as f64
    }

    /// Value rounded to thousandths of €/kWh, half away from zero
    fn rounded_millis(self) -> i64 {
        let abs = self.0.abs();
        let millis = (abs + 500) / 1000;
        if self.0 < 0 { -millis } else { millis }
    }
}

impl fmt::Display for Price {
    /// Three decimals in €/kWh, as published
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.rounded_millis();
        let sign = if millis < 0 { "-" } else { "" };
        let abs = millis.abs();
        write!(f, "{}{}.{:03}", sign, abs / 1000, abs % 1000)
    }
}

/// One hourly entry; keeps the raw text so bad data can be reported precisely
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricePoint {
    pub hour: usize,
    pub raw: String,
    price: Option<Price>,
}

impl PricePoint {
    pub fn new(hour: usize, raw: &str) -> Self {
        Self {
            hour,
            raw: raw.to_string(),
            price: Price::parse_eur_per_mwh(raw),
        }
    }

    pub fn from_price(hour: usize, price: Price) -> Self {
        Self {
            hour,
            raw: price.to_string(),
            price: Some(price),
        }
    }

    /// Parsed price, or `MalformedPrice` naming this hour
    pub fn price(&self) -> Result<Price> {
        self.price
            .ok_or_else(|| PvpcError::malformed_price(self.hour, self.raw.as_str()))
    }

    pub fn is_valid(&self) -> bool {
        self.price.is_some()
    }
}

/// Ordered, contiguous hourly prices for one day.
///
/// `PricePoint::hour` is the row position. On DST change days it differs
/// from the wall-clock hour, which [`PriceSeries::wall_hour`] gives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSeries {
    date: NaiveDate,
    points: Vec<PricePoint>,
    wall_hours: Vec<usize>,
}

impl PriceSeries {
    /// Build a series, enforcing contiguous hour indices starting at 0
    pub fn new(date: NaiveDate, points: Vec<PricePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(PvpcError::empty_range(0, 0));
        }
        for (idx, p) in points.iter().enumerate() {
            if p.hour != idx {
                return Err(PvpcError::validation(
                    "series.hour".to_string(),
                    format!("expected hour {} but found {}", idx, p.hour),
                ));
            }
        }
        let wall_hours = wall_clock_hours(date, points.len());
        Ok(Self {
            date,
            points,
            wall_hours,
        })
    }

    /// Build from raw €/MWh strings in hour order
    pub fn from_raw<S: AsRef<str>>(date: NaiveDate, raws: &[S]) -> Result<Self> {
        let points = raws
            .iter()
            .enumerate()
            .map(|(hour, raw)| PricePoint::new(hour, raw.as_ref()))
            .collect();
        Self::new(date, points)
    }

    /// Build from already-normalized prices in hour order
    pub fn from_prices(date: NaiveDate, prices: &[Price]) -> Result<Self> {
        let points = prices
            .iter()
            .enumerate()
            .map(|(hour, p)| PricePoint::from_price(hour, *p))
            .collect();
        Self::new(date, points)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn get(&self, hour: usize) -> Option<&PricePoint> {
        self.points.get(hour)
    }

    /// Price at `hour`; missing hours are an empty range, bad values are malformed
    pub fn price_at(&self, hour: usize) -> Result<Price> {
        self.points
            .get(hour)
            .ok_or_else(|| PvpcError::empty_range(hour, hour + 1))?
            .price()
    }

    /// Wall-clock hour the row starts at
    pub fn wall_hour(&self, row: usize) -> usize {
        self.wall_hours.get(row).copied().unwrap_or(row)
    }

    /// First row starting at wall-clock `hour`; `None` for a skipped hour
    pub fn row_for_hour(&self, hour: usize) -> Option<usize> {
        self.wall_hours.iter().position(|h| *h == hour)
    }

    /// Rows whose wall-clock hour lies in `[start, end)`
    pub fn rows_between(&self, start: usize, end: usize) -> Range<usize> {
        let first_from = |hour: usize| {
            self.wall_hours
                .iter()
                .position(|h| *h >= hour)
                .unwrap_or(self.wall_hours.len())
        };
        let (first, last) = (first_from(start), first_from(end));
        first..last.max(first)
    }

    /// `(row, price)` for every well-formed entry
    pub fn valid_prices(&self) -> Vec<(usize, Price)> {
        self.points
            .iter()
            .filter_map(|p| p.price().ok().map(|price| (p.hour, price)))
            .collect()
    }
}
