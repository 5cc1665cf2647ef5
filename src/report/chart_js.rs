//! Chart.js module embedded by the blog post

use crate::extremes::{ExtremumPair, HourPrice};
use crate::series::{Price, PriceSeries};

/// Canvas element id the script draws into
pub const CANVAS_ID: &str = "acquisitions";

/// Exact €/kWh value with six decimals
fn js_number(price: Price) -> String {
    let micros = price.micro_eur_per_kwh();
    let sign = if micros < 0 { "-" } else { "" };
    let abs = micros.abs();
    format!("{}{}.{:06}", sign, abs / 1_000_000, abs % 1_000_000)
}

fn annotation(index: usize, label: &str, at: HourPrice, x_adjust: i32, y_adjust: i32) -> String {
    let value = js_number(at.price);
    let point = format!(
        "point{}: {{ type: 'point', xValue: {}, yValue: {}, backgroundColor: 'rgba(255, 99, 132, 0.25)' }},",
        index, at.row, value
    );
    let text = format!(
        "label{}: {{ type: 'label', backgroundColor: 'rgba(245,245,245)', xValue: {}, yValue: {}, xAdjust: {}, yAdjust: {}, content: ['{}: {} ({}:00)'], textAlign: 'start', callout: {{ display: true, side: 10 }} }},",
        index, at.row, value, x_adjust, y_adjust, label, at.price, at.hour
    );
    format!("{0}{1}\n{0}{2}\n", " ".repeat(24), point, text)
}

/// Script rendering the day's line chart with min/max annotations
pub fn render_chart_js(series: &PriceSeries, extremes: &ExtremumPair) -> String {
    let data = series
        .points()
        .iter()
        .map(|p| {
            let hour = series.wall_hour(p.hour);
            match p.price() {
                Ok(price) => format!("{{hour: {}, pvpc: {}}}", hour, js_number(price)),
                Err(_) => format!("{{hour: {}, pvpc: null}}", hour),
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut js = String::new();
    js.push_str("import Chart from 'chart.js/auto';\n");
    js.push_str("import annotationPlugin from 'chartjs-plugin-annotation';\n");
    js.push_str("Chart.register(annotationPlugin);\n\n");
    js.push_str("(async function() {\n");
    js.push_str(&format!("    const data = [{}];\n", data));
    js.push_str(&format!(
        "    new Chart(document.getElementById('{}'), {{\n",
        CANVAS_ID
    ));
    js.push_str("        type: 'line',\n");
    js.push_str("        options: {\n");
    js.push_str("            animation: false,\n");
    js.push_str("            plugins: {\n");
    js.push_str("                legend: { display: false },\n");
    js.push_str("                tooltip: { enabled: false },\n");
    js.push_str("                annotation: {\n");
    js.push_str("                    annotations: {\n");
    js.push_str(&annotation(1, "Min", extremes.min, 100, -200));
    js.push_str(&annotation(2, "Max", extremes.max, -300, -100));
    js.push_str("                    }\n");
    js.push_str("                }\n");
    js.push_str("            }\n");
    js.push_str("        },\n");
    js.push_str(&format!(
        "        data: {{ labels: data.map(row => row.hour), datasets: [{{ label: '{}', data: data.map(row => row.pvpc) }}] }}\n",
        super::summary_title(series.date())
    ));
    js.push_str("    });\n");
    js.push_str("})();\n");
    js
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extremes::{HourRange, find_extremes};
    use chrono::NaiveDate;

    #[test]
    fn numbers_are_exact() {
        assert_eq!(js_number(Price::from_micro_eur_per_kwh(140_270)), "0.140270");
        assert_eq!(js_number(Price::from_micro_eur_per_kwh(-5)), "-0.000005");
    }

    #[test]
    fn script_lists_data_and_annotations() {
        let d = NaiveDate::from_ymd_opt(2024, 4, 3).unwrap();
        let s = PriceSeries::from_raw(d, &["140,27", "126,84", "x", "180"]).unwrap();
        let ext = find_extremes(&s, HourRange::whole_day(&s)).unwrap();
        let js = render_chart_js(&s, &ext);

        assert!(js.contains("{hour: 0, pvpc: 0.140270}, {hour: 1, pvpc: 0.126840}, {hour: 2, pvpc: null}"));
        assert!(js.contains("content: ['Min: 0.127 (1:00)']"));
        assert!(js.contains("content: ['Max: 0.180 (3:00)']"));
        assert!(js.contains("label: 'Evolución precio para el día 2024-04-03'"));
        assert!(js.contains("getElementById('acquisitions')"));
    }
}
