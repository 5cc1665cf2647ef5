//! SVG line chart of a day's prices

use crate::error::{PvpcError, Result};
use crate::extremes::{ExtremumPair, HourPrice};
use crate::series::PriceSeries;
use std::path::{Path, PathBuf};

/// Renders a day's chart to an image file
#[async_trait::async_trait]
pub trait ChartRenderer: Send + Sync {
    /// Render the chart for `series.date()` and return the image path
    async fn render(&self, series: &PriceSeries, extremes: &ExtremumPair) -> Result<PathBuf>;
}

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 50.0;
/// Vertical padding around the price range, µ€/kWh
const Y_PADDING: i64 = 10_000;

/// Writes `{dir}/{YYYY-MM-DD}_image.svg`
#[derive(Debug, Clone)]
pub struct SvgChartRenderer {
    output_dir: PathBuf,
    handle: String,
}

impl SvgChartRenderer {
    pub fn new<P: AsRef<Path>>(output_dir: P, handle: &str) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            handle: handle.to_string(),
        }
    }

    pub fn path_for(&self, series: &PriceSeries) -> PathBuf {
        self.output_dir
            .join(format!("{}_image.svg", series.date().format("%Y-%m-%d")))
    }
}

#[async_trait::async_trait]
impl ChartRenderer for SvgChartRenderer {
    async fn render(&self, series: &PriceSeries, extremes: &ExtremumPair) -> Result<PathBuf> {
        let svg = render_svg(series, extremes, &self.handle)?;
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.path_for(series);
        tokio::fs::write(&path, svg).await?;
        Ok(path)
    }
}

struct Scale {
    hours: usize,
    low: i64,
    high: i64,
}

impl Scale {
    fn x(&self, row: usize) -> f64 {
        let span = (self.hours.max(2) - 1) as f64;
        MARGIN_LEFT + row as f64 * (WIDTH - MARGIN_LEFT - MARGIN_RIGHT) / span
    }

    fn y(&self, micros: i64) -> f64 {
        let frac = (micros - self.low) as f64 / (self.high - self.low) as f64;
        HEIGHT - MARGIN_BOTTOM - frac * (HEIGHT - MARGIN_TOP - MARGIN_BOTTOM)
    }
}

/// Build the SVG document
pub fn render_svg(series: &PriceSeries, extremes: &ExtremumPair, handle: &str) -> Result<String> {
    let valid = series.valid_prices();
    if valid.is_empty() {
        return Err(PvpcError::render(format!(
            "no valid prices to chart for {}",
            series.date()
        )));
    }
    let scale = Scale {
        hours: series.len(),
        low: extremes.min.price.micro_eur_per_kwh() - Y_PADDING,
        high: extremes.max.price.micro_eur_per_kwh() + Y_PADDING,
    };

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\" font-size=\"12\">\n",
        w = WIDTH,
        h = HEIGHT
    ));
    svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "<text x=\"{}\" y=\"24\" text-anchor=\"middle\" font-size=\"15\">{}</text>\n",
        WIDTH / 2.0,
        xml_escape(&format!(
            "[{}] PVPC. {}",
            handle,
            super::summary_title(series.date())
        ))
    ));

    // axes
    let bottom = HEIGHT - MARGIN_BOTTOM;
    svg.push_str(&format!(
        "<line x1=\"{l}\" y1=\"{t}\" x2=\"{l}\" y2=\"{b}\" stroke=\"black\"/>\n\
         <line x1=\"{l}\" y1=\"{b}\" x2=\"{r}\" y2=\"{b}\" stroke=\"black\"/>\n",
        l = MARGIN_LEFT,
        t = MARGIN_TOP,
        b = bottom,
        r = WIDTH - MARGIN_RIGHT
    ));
    for row in (0..series.len()).step_by(4) {
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{}\" text-anchor=\"middle\">{}</text>\n",
            scale.x(row),
            bottom + 18.0,
            series.wall_hour(row)
        ));
    }
    svg.push_str(&format!(
        "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\">Horas</text>\n",
        (WIDTH + MARGIN_LEFT - MARGIN_RIGHT) / 2.0,
        HEIGHT - 10.0
    ));
    svg.push_str(&format!(
        "<text x=\"16\" y=\"{y}\" text-anchor=\"middle\" transform=\"rotate(-90 16 {y})\">Precio</text>\n",
        y = (HEIGHT + MARGIN_TOP - MARGIN_BOTTOM) / 2.0
    ));

    let points = valid
        .iter()
        .map(|(row, price)| {
            format!(
                "{:.1},{:.1}",
                scale.x(*row),
                scale.y(price.micro_eur_per_kwh())
            )
        })
        .collect::<Vec<_>>()
        .join(" ");
    svg.push_str(&format!(
        "<polyline fill=\"none\" stroke=\"steelblue\" stroke-width=\"2\" points=\"{}\"/>\n",
        points
    ));

    svg.push_str(&marker(&scale, "Max", extremes.max, "tomato"));
    svg.push_str(&marker(&scale, "Min", extremes.min, "mediumseagreen"));
    svg.push_str("</svg>\n");
    Ok(svg)
}

fn marker(scale: &Scale, label: &str, at: HourPrice, color: &str) -> String {
    let x = scale.x(at.row);
    let y = scale.y(at.price.micro_eur_per_kwh());
    let anchor = if at.row * 2 < scale.hours { "start" } else { "end" };
    let dx = if anchor == "start" { 8.0 } else { -8.0 };
    format!(
        "<circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"4\" fill=\"{c}\"/>\n\
         <text x=\"{tx:.1}\" y=\"{ty:.1}\" text-anchor=\"{a}\" fill=\"{c}\">{l}: {p} ({h}:00)</text>\n",
        x = x,
        y = y,
        c = color,
        tx = x + dx,
        ty = y - 6.0,
        a = anchor,
        l = label,
        p = at.price,
        h = at.hour
    )
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extremes::{HourRange, find_extremes};
    use chrono::NaiveDate;

    fn sample() -> PriceSeries {
        let raws: Vec<String> = (0..24).map(|h| format!("{},5", 100 + (h * 7) % 40)).collect();
        PriceSeries::from_raw(NaiveDate::from_ymd_opt(2024, 4, 4).unwrap(), &raws).unwrap()
    }

    #[test]
    fn svg_mentions_title_and_extremes() {
        let s = sample();
        let ext = find_extremes(&s, HourRange::whole_day(&s)).unwrap();
        let svg = render_svg(&s, &ext, "@bot&co").unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("[@bot&amp;co] PVPC. Evolución precio para el día 2024-04-04"));
        assert!(svg.contains(&format!("Min: {} ({}:00)", ext.min.price, ext.min.hour)));
        assert!(svg.contains(&format!("Max: {} ({}:00)", ext.max.price, ext.max.hour)));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn flat_day_does_not_divide_by_zero() {
        let d = NaiveDate::from_ymd_opt(2024, 4, 4).unwrap();
        let s = PriceSeries::from_raw(d, &["100"; 24]).unwrap();
        let ext = find_extremes(&s, HourRange::whole_day(&s)).unwrap();
        let svg = render_svg(&s, &ext, "@b").unwrap();
        assert!(!svg.contains("NaN"));
    }

    #[tokio::test]
    async fn renderer_writes_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let s = sample();
        let ext = find_extremes(&s, HourRange::whole_day(&s)).unwrap();
        let renderer = SvgChartRenderer::new(dir.path(), "@b");
        let path = renderer.render(&s, &ext).await.unwrap();
        assert!(path.ends_with("2024-04-04_image.svg"));
        let body = std::fs::read_to_string(path).unwrap();
        assert!(body.contains("polyline"));
    }
}
