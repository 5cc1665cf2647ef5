#![no_main]
use libfuzzer_sys::fuzz_target;
use pvpc_bot::series::Price;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing must never panic, and accepted values must format
    if let Some(p) = Price::parse_eur_per_mwh(s) {
        let _ = p.to_string();
    }
    if let Some(p) = Price::parse_eur_per_kwh(s) {
        let _ = p.to_string();
    }
    let _ = pvpc_bot::tariff::ClockTime::parse(s);
});
