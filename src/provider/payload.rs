//! Parsing of the ESIOS archive 70 (PVPC) JSON download

use crate::error::{PvpcError, Result};
use crate::series::{PricePoint, PriceSeries, hours_in_day};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct PvpcRow {
    #[serde(rename = "Dia")]
    dia: Option<String>,
    #[serde(rename = "Hora")]
    hora: Option<String>,
    /// Peninsula, Balearic and Canary price in €/MWh
    #[serde(rename = "PCB")]
    pcb: Option<String>,
}

/// Parse a download body into the series for `date`.
///
/// Bodies carrying `errors`, lacking `PVPC`, dated for another day or with a
/// row count other than the day's length (23 or 25 on DST change days) are
/// rejected. Individual unparsable prices are
/// kept as malformed points.
pub fn parse_pvpc_payload(date: NaiveDate, body: &str) -> Result<PriceSeries> {
    let value: serde_json::Value = serde_json::from_str(body)?;

    if let Some(errors) = value.get("errors") {
        return Err(PvpcError::api(format!("ESIOS reported errors: {}", errors)));
    }
    let rows = value
        .get("PVPC")
        .cloned()
        .ok_or_else(|| PvpcError::api("PVPC data missing from response"))?;
    let rows: Vec<PvpcRow> = serde_json::from_value(rows)?;

    let expected = hours_in_day(date).unwrap_or(24);
    if rows.len() != expected {
        return Err(PvpcError::api(format!(
            "expected {} hourly entries for {}, got {}",
            expected,
            date,
            rows.len()
        )));
    }

    let mut points = Vec::with_capacity(rows.len());
    for (hour, row) in rows.iter().enumerate() {
        if let Some(dia) = row.dia.as_deref() {
            let row_date = NaiveDate::parse_from_str(dia.trim(), "%d/%m/%Y")?;
            if row_date != date {
                return Err(PvpcError::api(format!(
                    "payload is for {} (hour {}), expected {}",
                    row_date,
                    row.hora.as_deref().unwrap_or("?"),
                    date
                )));
            }
        }
        points.push(PricePoint::new(hour, row.pcb.as_deref().unwrap_or("")));
    }

    PriceSeries::new(date, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(date: &str, n: usize) -> String {
        let rows: Vec<_> = (0..n)
            .map(|h| json!({"Dia": date, "Hora": format!("{:02}-{:02}", h, h + 1), "PCB": format!("{},{:02}", 100 + h, h)}))
            .collect();
        json!({ "PVPC": rows }).to_string()
    }

    #[test]
    fn parses_a_full_day() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let s = parse_pvpc_payload(d, &body("15/01/2024", 24)).unwrap();
        assert_eq!(s.len(), 24);
        assert_eq!(s.price_at(3).unwrap().micro_eur_per_kwh(), 103_030);
    }

    #[test]
    fn accepts_dst_lengths() {
        let d = NaiveDate::from_ymd_opt(2024, 10, 27).unwrap();
        assert_eq!(parse_pvpc_payload(d, &body("27/10/2024", 25)).unwrap().len(), 25);
        assert!(parse_pvpc_payload(d, &body("27/10/2024", 24)).is_err());

        let d = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let s = parse_pvpc_payload(d, &body("31/03/2024", 23)).unwrap();
        assert_eq!(s.wall_hour(2), 3);
        assert!(parse_pvpc_payload(d, &body("31/03/2024", 24)).is_err());
    }

    #[test]
    fn rejects_errors_and_missing_data() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert!(matches!(
            parse_pvpc_payload(d, r#"{"errors": [{"code": 502}]}"#),
            Err(PvpcError::Api { .. })
        ));
        assert!(matches!(
            parse_pvpc_payload(d, r#"{"other": []}"#),
            Err(PvpcError::Api { .. })
        ));
        assert!(matches!(
            parse_pvpc_payload(d, "not json"),
            Err(PvpcError::Serialization { .. })
        ));
    }

    #[test]
    fn rejects_other_dates() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert!(parse_pvpc_payload(d, &body("16/01/2024", 24)).is_err());
    }

    #[test]
    fn keeps_bad_prices_as_malformed_points() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let mut rows: Vec<_> = (0..24).map(|_| json!({"PCB": "120,5"})).collect();
        rows[4] = json!({"Hora": "04-05"});
        let s = parse_pvpc_payload(d, &json!({ "PVPC": rows }).to_string()).unwrap();
        assert!(matches!(
            s.price_at(4),
            Err(PvpcError::MalformedPrice { hour: 4, .. })
        ));
        assert!(s.price_at(5).is_ok());
    }
}
