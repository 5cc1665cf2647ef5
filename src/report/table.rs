//! Markdown price table for the daily post

use crate::extremes::ExtremumPair;
use crate::series::PriceSeries;
use crate::trend::Trend;

/// Clock faces for hours 0-11, reused for 12-23
pub const CLOCK_FACES: [&str; 12] = [
    "🕛", "🕐", "🕑", "🕒", "🕓", "🕔", "🕕", "🕖", "🕗", "🕘", "🕙", "🕚",
];

const MIN_COLOR: &str = "MediumSeaGreen";
const MAX_COLOR: &str = "Tomato";
const CELLS_PER_ROW: usize = 4;

/// One cell per hour, four hours per row.
///
/// Each cell carries a clock face, the hour, the trend from the previous
/// hour and the price; the day's min and max cells get a colored border.
pub fn render_table(series: &PriceSeries, extremes: &ExtremumPair) -> String {
    let mut table = String::new();
    let mut previous = None;

    for (i, point) in series.points().iter().enumerate() {
        let hour = series.wall_hour(i);
        let mut cell = format!("{} ({:02}:00) ", CLOCK_FACES[hour % 12], hour);
        let price = point.price().ok();
        if let (Some(prev), Some(cur)) = (previous, price) {
            cell.push_str(Trend::classify(prev, cur).symbol());
            cell.push(' ');
        }
        match price {
            Some(p) => cell.push_str(&p.to_string()),
            None => cell.push_str("n/d"),
        }

        let color = if i == extremes.min.row {
            Some(MIN_COLOR)
        } else if i == extremes.max.row {
            Some(MAX_COLOR)
        } else {
            None
        };
        if let Some(color) = color {
            cell = format!("<span style='border:2px solid {};'>{}</span>", color, cell);
        }

        table.push_str(&format!("| {} ", cell));
        if (i + 1) % CELLS_PER_ROW == 0 {
            table.push_str("|\n");
        }
        previous = price;
    }
    if series.len() % CELLS_PER_ROW != 0 {
        table.push_str("|\n");
    }
    table.push('\n');
    table
}
