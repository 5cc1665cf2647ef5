#![no_main]
use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;
use pvpc_bot::extremes::{HourRange, find_extremes};

fuzz_target!(|data: &[u8]| {
    let Ok(body) = std::str::from_utf8(data) else {
        return;
    };
    let Some(date) = NaiveDate::from_ymd_opt(2024, 1, 15) else {
        return;
    };

    // Any accepted payload must survive a whole-day extremum scan
    if let Ok(series) = pvpc_bot::provider::parse_pvpc_payload(date, body) {
        let _ = find_extremes(&series, HourRange::whole_day(&series));
    }
});
