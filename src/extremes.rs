//! Minimum and maximum price search over an hour range

use crate::error::{PvpcError, Result};
use crate::logging::get_logger;
use crate::series::{Price, PriceSeries};
use crate::tariff::ClockTime;

/// Half-open range of wall-clock hours, `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourRange {
    pub start: usize,
    pub end: usize,
}

impl HourRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Hours covered by a clock interval; an end of `00:00` or `24:00` means 24
    pub fn from_interval(start: ClockTime, end: ClockTime) -> Self {
        Self {
            start: start.as_range_start(),
            end: end.as_range_end(),
        }
    }

    /// Every hour of the series, including both copies of a repeated DST hour
    pub fn whole_day(series: &PriceSeries) -> Self {
        Self {
            start: 0,
            end: series.wall_hour(series.len().saturating_sub(1)) + 1,
        }
    }
}

/// A series row with its wall-clock hour and price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourPrice {
    pub row: usize,
    pub hour: usize,
    pub price: Price,
}

/// Cheapest and most expensive hour within a range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtremumPair {
    pub min: HourPrice,
    pub max: HourPrice,
}

/// Scan the rows of `series` inside `range` for the first-occurring minimum
/// and maximum.
///
/// Malformed hours are skipped. The call fails with `EmptyRange` when the
/// clipped range holds no entries and with `MalformedPrice` when every entry
/// in it is malformed.
pub fn find_extremes(series: &PriceSeries, range: HourRange) -> Result<ExtremumPair> {
    let rows = series.rows_between(range.start, range.end);
    if rows.is_empty() {
        return Err(PvpcError::empty_range(range.start, range.end));
    }

    let mut best: Option<ExtremumPair> = None;
    let mut first_fault: Option<PvpcError> = None;

    for point in &series.points()[rows] {
        let price = match point.price() {
            Ok(p) => p,
            Err(e) => {
                get_logger("extremes").warn(&format!(
                    "Skipping hour {} in [{}, {}): {}",
                    point.hour, range.start, range.end, e
                ));
                first_fault.get_or_insert(e);
                continue;
            }
        };
        let here = HourPrice {
            row: point.hour,
            hour: series.wall_hour(point.hour),
            price,
        };
        match best.as_mut() {
            None => best = Some(ExtremumPair { min: here, max: here }),
            Some(pair) => {
                // strict comparisons keep the earliest hour on ties
                if price < pair.min.price {
                    pair.min = here;
                }
                if price > pair.max.price {
                    pair.max = here;
                }
            }
        }
    }

    match (best, first_fault) {
        (Some(pair), _) => Ok(pair),
        (None, Some(fault)) => Err(fault),
        (None, None) => Err(PvpcError::empty_range(range.start, range.end)),
    }
}
