//! Resolution of a wall-clock timestamp into its active tariff band

use crate::error::{PvpcError, Result};
use crate::tariff::{BandKind, ClockTime, TariffCalendar};
use chrono::{Datelike, NaiveDateTime, Timelike};

/// Active band for one timestamp, anchored to that timestamp's date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFrame {
    /// Band start as a concrete timestamp
    pub start: NaiveDateTime,

    /// Band end (exclusive); `24:00` becomes next-day midnight
    pub end: NaiveDateTime,

    /// Numbered display name from the calendar (`llano1`), or the weekend band
    pub band_name: String,

    /// Logical band (`llano`)
    pub band: BandKind,

    /// Configured clock interval
    pub raw_interval: (ClockTime, ClockTime),

    /// Set when the weekend rule made the whole day one band
    pub whole_day: bool,
}

impl TimeFrame {
    /// True when `now` falls in the first hour of this band instance
    pub fn is_first_hour(&self, now: NaiveDateTime) -> bool {
        now.hour() == self.start.hour()
    }

    /// Wall-clock hours the band covers
    pub fn hour_range(&self) -> crate::extremes::HourRange {
        crate::extremes::HourRange::from_interval(self.raw_interval.0, self.raw_interval.1)
    }
}

/// Looks up bands in an injected calendar
#[derive(Debug, Clone)]
pub struct TimeFrameResolver<'a> {
    calendar: &'a TariffCalendar,
}

impl<'a> TimeFrameResolver<'a> {
    pub fn new(calendar: &'a TariffCalendar) -> Self {
        Self { calendar }
    }

    /// Return the band containing `timestamp` (`start <= timestamp < end`)
    pub fn resolve(&self, timestamp: NaiveDateTime) -> Result<TimeFrame> {
        let date = timestamp.date();

        if self.calendar.is_weekend(date.weekday()) {
            let band = self.calendar.weekend_band();
            return Ok(TimeFrame {
                start: ClockTime::MIDNIGHT.on(date),
                end: ClockTime::END_OF_DAY.on(date),
                band_name: band.as_str().to_string(),
                band,
                raw_interval: (ClockTime::MIDNIGHT, ClockTime::END_OF_DAY),
                whole_day: true,
            });
        }

        self.calendar
            .bands()
            .iter()
            .find_map(|b| {
                let start = b.start.on(date);
                let end = b.end.on(date);
                (start <= timestamp && timestamp < end).then(|| TimeFrame {
                    start,
                    end,
                    band_name: b.name.clone(),
                    band: b.band,
                    raw_interval: (b.start, b.end),
                    whole_day: false,
                })
            })
            .ok_or_else(|| PvpcError::no_band_matched(timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn weekday_ten_oclock_is_first_peak() {
        let cal = TariffCalendar::default();
        let resolver = TimeFrameResolver::new(&cal);
        // 2024-03-04 is a Monday
        let frame = resolver.resolve(at(2024, 3, 4, 10, 0)).unwrap();
        assert_eq!(frame.band, BandKind::Punta);
        assert_eq!(frame.band_name, "punta1");
        assert_eq!(frame.raw_interval.0.to_string(), "10:00");
        assert_eq!(frame.raw_interval.1.to_string(), "14:00");
        assert!(frame.is_first_hour(at(2024, 3, 4, 10, 0)));
        assert!(!frame.whole_day);
    }

    #[test]
    fn last_band_ends_next_midnight() {
        let cal = TariffCalendar::default();
        let frame = TimeFrameResolver::new(&cal)
            .resolve(at(2024, 3, 4, 23, 59))
            .unwrap();
        assert_eq!(frame.band_name, "llano3");
        assert_eq!(frame.end, at(2024, 3, 5, 0, 0));
    }

    #[test]
    fn weekend_is_single_valle() {
        let cal = TariffCalendar::default();
        let resolver = TimeFrameResolver::new(&cal);
        // 2024-03-09 is a Saturday
        let frame = resolver.resolve(at(2024, 3, 9, 13, 0)).unwrap();
        assert_eq!(frame.band, BandKind::Valle);
        assert!(frame.whole_day);
        assert_eq!(frame.start, at(2024, 3, 9, 0, 0));
        assert_eq!(frame.end, at(2024, 3, 10, 0, 0));
        assert!(!frame.is_first_hour(at(2024, 3, 9, 13, 0)));
        assert!(frame.is_first_hour(at(2024, 3, 9, 0, 30)));
    }
}
