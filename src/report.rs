//! Daily summary for the following day
//!
//! Produces the chart image, the Chart.js script and the blog post, and the
//! image post published to every destination before the hourly message.

use crate::error::Result;
use crate::extremes::{ExtremumPair, HourRange, find_extremes};
use crate::logging::get_logger;
use crate::publish::Post;
use crate::series::PriceSeries;
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod chart_js;
pub mod post;
pub mod svg;
pub mod table;

pub use chart_js::render_chart_js;
pub use post::{PostContent, render_post};
pub use svg::{ChartRenderer, SvgChartRenderer};
pub use table::render_table;

/// Title shared by the chart, the script dataset and the post
pub fn summary_title(date: NaiveDate) -> String {
    format!("Evolución precio para el día {}", date.format("%Y-%m-%d"))
}

/// Image description naming the cheapest and most expensive hours
pub fn alt_text(title: &str, extremes: &ExtremumPair) -> String {
    format!(
        "{}. Mínimo a las {}:00 ({}). Máximo a las {}:00 ({}).",
        title, extremes.min.hour, extremes.min.price, extremes.max.hour, extremes.max.price
    )
}

/// Artifacts written for one summary
#[derive(Debug, Clone)]
pub struct DailySummary {
    /// Day the prices belong to
    pub date: NaiveDate,
    pub title: String,
    pub alt_text: String,
    pub extremes: ExtremumPair,
    pub image_path: PathBuf,
    pub script_path: PathBuf,
    pub post_path: PathBuf,
    pub table: String,
}

impl DailySummary {
    /// Image post announcing the summary
    pub fn post(&self) -> Post {
        Post::with_image(
            self.title.as_str(),
            self.image_path.clone(),
            self.alt_text.as_str(),
        )
    }
}

/// Writes summary artifacts into an output directory
#[derive(Clone)]
pub struct SummaryBuilder {
    output_dir: PathBuf,
    renderer: Arc<dyn ChartRenderer>,
}

impl SummaryBuilder {
    pub fn new<P: AsRef<Path>>(output_dir: P, renderer: Arc<dyn ChartRenderer>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            renderer,
        }
    }

    /// Build the summary for `series`, dating the post at `published`
    pub async fn build(
        &self,
        series: &PriceSeries,
        published: DateTime<FixedOffset>,
    ) -> Result<DailySummary> {
        let logger = get_logger("report");
        let date = series.date();
        let extremes = find_extremes(series, HourRange::whole_day(series))?;
        let title = summary_title(date);
        let alt_text = alt_text(&title, &extremes);

        let image_path = self.renderer.render(series, &extremes).await?;
        logger.info(&format!("Chart written to {}", image_path.display()));

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let script_path = self
            .output_dir
            .join(format!("{}_chart.js", date.format("%Y-%m-%d")));
        tokio::fs::write(&script_path, render_chart_js(series, &extremes)).await?;

        let table = render_table(series, &extremes);
        let post_path = self.output_dir.join(format!(
            "{}-post.md",
            published.date_naive().format("%Y-%m-%d")
        ));
        let post = render_post(&PostContent {
            title: &title,
            published,
            alt_text: &alt_text,
            image_file: &file_name(&image_path),
            script_file: &file_name(&script_path),
            table: &table,
        });
        tokio::fs::write(&post_path, post).await?;
        logger.info(&format!("Post written to {}", post_path.display()));

        Ok(DailySummary {
            date,
            title,
            alt_text,
            extremes,
            image_path,
            script_path,
            post_path,
            table,
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
