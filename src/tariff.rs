//! Tariff calendar for the 2.0TD access toll
//!
//! The calendar is a typed table of named clock intervals. It is validated
//! once at construction to partition the 24 hours of a weekday with no gaps
//! and no overlaps, so resolving a timestamp can never fall through.

use crate::error::{PvpcError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Wall-clock boundary in `HH:MM` form, where `24:00` is the next midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    /// Midnight at the start of the day
    pub const MIDNIGHT: Self = Self { minutes: 0 };
    /// Midnight at the end of the day (`24:00`)
    pub const END_OF_DAY: Self = Self {
        minutes: MINUTES_PER_DAY,
    };

    /// Build from hours and minutes; `24:00` is the only valid value past 23:59
    pub fn new(hour: u16, minute: u16) -> Result<Self> {
        let minutes = u32::from(hour) * 60 + u32::from(minute);
        if minute >= 60 || minutes > u32::from(MINUTES_PER_DAY) {
            return Err(PvpcError::validation(
                "clock".to_string(),
                format!("{:02}:{:02} is not a valid HH:MM boundary", hour, minute),
            ));
        }
        Ok(Self {
            minutes: minutes as u16,
        })
    }

    /// Parse an `HH:MM` string
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || {
            PvpcError::validation("clock".to_string(), format!("invalid HH:MM value {:?}", s))
        };
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || m.len() != 2 {
            return Err(invalid());
        }
        let hour: u16 = h.parse().map_err(|_| invalid())?;
        let minute: u16 = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute)
    }

    pub fn hour(self) -> u16 {
        self.minutes / 60
    }

    pub fn minute(self) -> u16 {
        self.minutes % 60
    }

    pub fn minutes_since_midnight(self) -> u16 {
        self.minutes
    }

    /// Hour index when used as the start of an hour range
    pub fn as_range_start(self) -> usize {
        usize::from(self.hour())
    }

    /// Hour index when used as the end of an hour range.
    ///
    /// `00:00` as an end means midnight at the end of the day, so it maps to 24.
    pub fn as_range_end(self) -> usize {
        if self.minutes == 0 {
            24
        } else {
            usize::from(self.hour())
        }
    }

    /// Anchor this boundary to a calendar date; `24:00` lands on the next day
    pub fn on(self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(chrono::NaiveTime::MIN) + Duration::minutes(i64::from(self.minutes))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl TryFrom<String> for ClockTime {
    type Error = PvpcError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Logical price-significance band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandKind {
    /// Off-peak
    Valle,
    /// Mid
    Llano,
    /// Peak
    Punta,
}

impl BandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valle => "valle",
            Self::Llano => "llano",
            Self::Punta => "punta",
        }
    }
}

impl fmt::Display for BandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the calendar: `[start, end)` with a display name and its logical band
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffBand {
    /// Numbered display name (e.g. `punta1`)
    pub name: String,

    /// Logical band the row repeats
    pub band: BandKind,

    /// Inclusive start
    pub start: ClockTime,

    /// Exclusive end; `24:00` for the last row
    pub end: ClockTime,
}

impl TariffBand {
    pub fn new(name: &str, band: BandKind, start: ClockTime, end: ClockTime) -> Self {
        Self {
            name: name.to_string(),
            band,
            start,
            end,
        }
    }
}

/// Validated, immutable tariff table plus the weekend override rule
#[derive(Debug, Clone)]
pub struct TariffCalendar {
    bands: Vec<TariffBand>,
    weekend_days: Vec<Weekday>,
    weekend_band: BandKind,
}

impl TariffCalendar {
    /// Build a calendar, rejecting tables that do not partition 00:00-24:00
    pub fn new(bands: Vec<TariffBand>, weekend_days: Vec<Weekday>) -> Result<Self> {
        validate_partition(&bands)?;
        Ok(Self {
            bands,
            weekend_days,
            weekend_band: BandKind::Valle,
        })
    }

    /// Bands in declared order
    pub fn bands(&self) -> &[TariffBand] {
        &self.bands
    }

    pub fn weekend_band(&self) -> BandKind {
        self.weekend_band
    }

    pub fn is_weekend(&self, weekday: Weekday) -> bool {
        self.weekend_days.contains(&weekday)
    }
}

impl Default for TariffCalendar {
    fn default() -> Self {
        Self {
            bands: default_bands(),
            weekend_days: vec![Weekday::Sat, Weekday::Sun],
            weekend_band: BandKind::Valle,
        }
    }
}

/// Six-row weekday table of the 2.0TD toll
pub fn default_bands() -> Vec<TariffBand> {
    let hhmm = |h: u16| ClockTime { minutes: h * 60 };
    vec![
        TariffBand::new("valle", BandKind::Valle, hhmm(0), hhmm(8)),
        TariffBand::new("llano1", BandKind::Llano, hhmm(8), hhmm(10)),
        TariffBand::new("punta1", BandKind::Punta, hhmm(10), hhmm(14)),
        TariffBand::new("llano2", BandKind::Llano, hhmm(14), hhmm(18)),
        TariffBand::new("punta2", BandKind::Punta, hhmm(18), hhmm(22)),
        TariffBand::new("llano3", BandKind::Llano, hhmm(22), hhmm(24)),
    ]
}

/// Check that the bands cover 00:00-24:00 exactly once
pub fn validate_partition(bands: &[TariffBand]) -> Result<()> {
    if bands.is_empty() {
        return Err(PvpcError::validation("tariff.bands", "no bands configured"));
    }

    let mut names = HashSet::new();
    for b in bands {
        if b.start >= b.end {
            return Err(PvpcError::validation(
                "tariff.bands".to_string(),
                format!("band {} has start {} not before end {}", b.name, b.start, b.end),
            ));
        }
        if !names.insert(b.name.as_str()) {
            return Err(PvpcError::validation(
                "tariff.bands".to_string(),
                format!("duplicate band name {}", b.name),
            ));
        }
    }

    let mut sorted: Vec<&TariffBand> = bands.iter().collect();
    sorted.sort_by_key(|b| b.start);

    let mut cursor = ClockTime::MIDNIGHT;
    for b in sorted {
        if b.start > cursor {
            return Err(PvpcError::validation(
                "tariff.bands".to_string(),
                format!("gap between {} and {}", cursor, b.start),
            ));
        }
        if b.start < cursor {
            return Err(PvpcError::validation(
                "tariff.bands".to_string(),
                format!("band {} overlaps before {}", b.name, cursor),
            ));
        }
        cursor = b.end;
    }
    if cursor != ClockTime::END_OF_DAY {
        return Err(PvpcError::validation(
            "tariff.bands".to_string(),
            format!("bands end at {} instead of 24:00", cursor),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse(s).unwrap()
    }

    #[test]
    fn parse_and_display() {
        assert_eq!(t("08:00").to_string(), "08:00");
        assert_eq!(t("24:00"), ClockTime::END_OF_DAY);
        assert_eq!(t("9:30").minutes_since_midnight(), 570);
        assert!(ClockTime::parse("24:01").is_err());
        assert!(ClockTime::parse("10:60").is_err());
        assert!(ClockTime::parse("1000").is_err());
        assert!(ClockTime::parse("ab:cd").is_err());
    }

    #[test]
    fn range_end_treats_midnight_as_24() {
        assert_eq!(t("00:00").as_range_end(), 24);
        assert_eq!(t("24:00").as_range_end(), 24);
        assert_eq!(t("14:00").as_range_end(), 14);
        assert_eq!(t("00:00").as_range_start(), 0);
    }

    #[test]
    fn end_of_day_anchors_to_next_date() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let next = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(ClockTime::END_OF_DAY.on(d), next.and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(t("10:00").on(d), d.and_hms_opt(10, 0, 0).unwrap());
    }

    #[test]
    fn default_table_partitions_the_day() {
        assert!(validate_partition(&default_bands()).is_ok());
        let cal = TariffCalendar::default();
        assert_eq!(cal.bands().len(), 6);
        assert!(cal.is_weekend(Weekday::Sun));
        assert!(!cal.is_weekend(Weekday::Fri));
    }

    #[test]
    fn gaps_and_overlaps_are_rejected() {
        let mut gap = default_bands();
        gap[1].end = t("09:00");
        assert!(validate_partition(&gap).is_err());

        let mut overlap = default_bands();
        overlap[2].start = t("09:00");
        assert!(validate_partition(&overlap).is_err());

        let mut short = default_bands();
        short.pop();
        assert!(validate_partition(&short).is_err());

        let mut dup = default_bands();
        dup[3].name = "llano1".into();
        assert!(validate_partition(&dup).is_err());

        assert!(TariffCalendar::new(Vec::new(), Vec::new()).is_err());
    }

    #[test]
    fn serde_uses_hhmm_strings() {
        let band = TariffBand::new("punta1", BandKind::Punta, t("10:00"), t("14:00"));
        let yaml = serde_yaml::to_string(&band).unwrap();
        assert!(yaml.contains("10:00"));
        assert!(yaml.contains("punta"));
        let back: TariffBand = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, band);
    }
}
