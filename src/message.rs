//! Composition of the hourly status message
//!
//! The composer is a pure function of its inputs: it never reads the clock
//! and never fetches data. The caller supplies the next day's series when the
//! following hour belongs to another date.

use crate::config::MessageConfig;
use crate::error::{PvpcError, Result};
use crate::extremes::{ExtremumPair, HourPrice};
use crate::series::{Price, PriceSeries};
use crate::timeframe::TimeFrame;
use crate::trend::Trend;
use chrono::{Duration, NaiveDateTime, Timelike};

/// How the message introduces the current band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Narration {
    /// First hour of this band instance
    Starting,
    /// Any later hour of the band
    CurrentlyIn,
}

impl Narration {
    pub fn for_hour(frame: &TimeFrame, now: NaiveDateTime) -> Self {
        if frame.is_first_hour(now) {
            Self::Starting
        } else {
            Self::CurrentlyIn
        }
    }
}

/// Current and next hour prices with their trend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourQuote {
    pub current: Price,
    pub next: Price,
    pub trend: Trend,
}

/// Look up the price for `now` and for the hour after it.
///
/// Wall-clock hours are mapped to rows, so DST change days read the right
/// entry; a repeated hour reads its first copy. When the next hour falls on
/// the following date its price is the first row of `next_day`; a missing or
/// mismatched `next_day` is `NoNextDayData`.
pub fn quote_hour(
    now: NaiveDateTime,
    today: &PriceSeries,
    next_day: Option<&PriceSeries>,
) -> Result<HourQuote> {
    let hour = now.hour() as usize;
    let row = today
        .row_for_hour(hour)
        .ok_or_else(|| PvpcError::empty_range(hour, hour + 1))?;
    let current = today.price_at(row)?;

    let next_time = now + Duration::hours(1);
    let next = if next_time.date() == now.date() {
        today.price_at(row + 1)?
    } else {
        let wanted = next_time.date();
        let series = next_day.ok_or_else(|| {
            PvpcError::no_next_day_data(wanted, "series for the following day was not supplied")
        })?;
        if series.date() != wanted {
            return Err(PvpcError::no_next_day_data(
                wanted,
                format!("supplied series is for {}", series.date()),
            ));
        }
        series.price_at(0)?
    };

    Ok(HourQuote {
        current,
        next,
        trend: Trend::classify(current, next),
    })
}

/// Builds the hourly post from injected labels
#[derive(Debug, Clone, Copy)]
pub struct MessageComposer<'a> {
    labels: &'a MessageConfig,
}

impl<'a> MessageComposer<'a> {
    pub fn new(labels: &'a MessageConfig) -> Self {
        Self { labels }
    }

    /// Compose the status text for `now`.
    ///
    /// The band extremum summary is appended only in the band's first hour.
    pub fn compose(
        &self,
        now: NaiveDateTime,
        today: &PriceSeries,
        next_day: Option<&PriceSeries>,
        frame: &TimeFrame,
        extremes: &ExtremumPair,
    ) -> Result<String> {
        let quote = quote_hour(now, today, next_day)?;
        let narration = Narration::for_hour(frame, now);

        let range = if frame.whole_day {
            self.labels.all_day.clone()
        } else {
            fill(
                &self.labels.range,
                &[
                    ("start", frame.raw_interval.0.to_string()),
                    ("end", frame.raw_interval.1.to_string()),
                ],
            )
        };
        let narration_text = match narration {
            Narration::Starting => &self.labels.starting,
            Narration::CurrentlyIn => &self.labels.currently_in,
        };

        let mut lines = vec![
            fill(
                &self.labels.header,
                &[
                    ("symbol", self.labels.symbol_for(frame.band).to_string()),
                    ("narration", narration_text.clone()),
                    ("band", frame.band.as_str().to_string()),
                    ("range", range),
                ],
            ),
            fill(
                &self.labels.current_price,
                &[("price", quote.current.to_string())],
            ),
            fill(
                &self.labels.next_price,
                &[
                    ("price", quote.next.to_string()),
                    ("trend", quote.trend.symbol().to_string()),
                ],
            ),
        ];

        if narration == Narration::Starting {
            lines.push(extremum_line(&self.labels.min_line, extremes.min));
            lines.push(extremum_line(&self.labels.max_line, extremes.max));
        }

        Ok(lines.join("\n"))
    }
}

fn extremum_line(template: &str, at: HourPrice) -> String {
    fill(
        template,
        &[
            ("price", at.price.to_string()),
            ("hour", at.hour.to_string()),
            ("next_hour", (at.hour + 1).to_string()),
        ],
    )
}

/// Replace `{key}` placeholders
pub(crate) fn fill(template: &str, values: &[(&str, String)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extremes::find_extremes;
    use crate::tariff::TariffCalendar;
    use crate::timeframe::TimeFrameResolver;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn flat_series(date: NaiveDate) -> PriceSeries {
        let raws: Vec<String> = (0..24).map(|h| format!("{},0", 100 + h * 5)).collect();
        PriceSeries::from_raw(date, &raws).unwrap()
    }

    #[test]
    fn fill_replaces_all_placeholders() {
        let s = fill("{a}-{b}-{a}", &[("a", "1".into()), ("b", "2".into())]);
        assert_eq!(s, "1-2-1");
    }

    #[test]
    fn first_hour_of_band_includes_summary() {
        let labels = MessageConfig::default();
        let cal = TariffCalendar::default();
        let now = day(4).and_hms_opt(8, 0, 0).unwrap();
        let series = flat_series(day(4));
        let frame = TimeFrameResolver::new(&cal).resolve(now).unwrap();
        let ext = find_extremes(&series, frame.hour_range()).unwrap();

        let text = MessageComposer::new(&labels)
            .compose(now, &series, None, &frame, &ext)
            .unwrap();
        let expected = "🟠 Empieza periodo llano (entre las 08:00 y las 10:00). Precios PVPC\n\
                        En esta hora: 0.140\n\
                        En la hora siguiente: 0.145↗\n\
                        Mín: 0.140, entre las 8:00 y las 9:00 (hora más económica)\n\
                        Máx: 0.145, entre las 9:00 y las 10:00 (hora más cara)";
        assert_eq!(text, expected);
    }

    #[test]
    fn later_hour_omits_summary() {
        let labels = MessageConfig::default();
        let cal = TariffCalendar::default();
        let now = day(4).and_hms_opt(9, 15, 0).unwrap();
        let series = flat_series(day(4));
        let frame = TimeFrameResolver::new(&cal).resolve(now).unwrap();
        let ext = find_extremes(&series, frame.hour_range()).unwrap();

        let text = MessageComposer::new(&labels)
            .compose(now, &series, None, &frame, &ext)
            .unwrap();
        assert!(text.starts_with("🟠 Estamos en periodo llano"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn last_hour_needs_next_day() {
        let now = day(4).and_hms_opt(23, 0, 0).unwrap();
        let series = flat_series(day(4));
        assert!(matches!(
            quote_hour(now, &series, None),
            Err(PvpcError::NoNextDayData { .. })
        ));

        let wrong = flat_series(day(9));
        assert!(matches!(
            quote_hour(now, &series, Some(&wrong)),
            Err(PvpcError::NoNextDayData { .. })
        ));

        let tomorrow = flat_series(day(5));
        let q = quote_hour(now, &series, Some(&tomorrow)).unwrap();
        assert_eq!(q.next.to_string(), "0.100");
        assert_eq!(q.trend, Trend::Down);
    }

    #[test]
    fn short_dst_day_reads_rows_by_wall_clock() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let raws: Vec<String> = (0..23).map(|i| format!("{},0", 100 + i)).collect();
        let series = PriceSeries::from_raw(d, &raws).unwrap();

        let q = quote_hour(d.and_hms_opt(1, 0, 0).unwrap(), &series, None).unwrap();
        assert_eq!(q.current.to_string(), "0.101");
        assert_eq!(q.next.to_string(), "0.102");
        let q = quote_hour(d.and_hms_opt(3, 0, 0).unwrap(), &series, None).unwrap();
        assert_eq!(q.current.to_string(), "0.102");
        let q = quote_hour(d.and_hms_opt(22, 0, 0).unwrap(), &series, None).unwrap();
        assert_eq!(q.current.to_string(), "0.121");
        assert_eq!(q.next.to_string(), "0.122");
        assert!(matches!(
            quote_hour(d.and_hms_opt(2, 30, 0).unwrap(), &series, None),
            Err(PvpcError::EmptyRange { start: 2, end: 3 })
        ));
    }

    #[test]
    fn whole_day_frame_uses_all_day_text() {
        let labels = MessageConfig::default();
        let cal = TariffCalendar::default();
        // Saturday
        let now = day(9).and_hms_opt(12, 0, 0).unwrap();
        let series = flat_series(day(9));
        let frame = TimeFrameResolver::new(&cal).resolve(now).unwrap();
        let ext = find_extremes(&series, frame.hour_range()).unwrap();
        let text = MessageComposer::new(&labels)
            .compose(now, &series, None, &frame, &ext)
            .unwrap();
        assert!(text.starts_with("🟢 Estamos en periodo valle (todo el día)"));
    }
}
