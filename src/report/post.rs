//! Jekyll post for the daily summary

use chrono::{DateTime, FixedOffset};

/// Pieces the post is assembled from
#[derive(Debug, Clone)]
pub struct PostContent<'a> {
    pub title: &'a str,
    pub published: DateTime<FixedOffset>,
    pub alt_text: &'a str,
    pub image_file: &'a str,
    pub script_file: &'a str,
    pub table: &'a str,
}

/// Markdown with Jekyll front matter, image, chart canvas and price table
pub fn render_post(content: &PostContent<'_>) -> String {
    format!(
        "---\n\
         layout: post\n\
         title:  '{title}'\n\
         date:   {date}\n\
         categories: jekyll update\n\
         ---\n\n\
         {alt}\n\n\
         ![{alt}]({image})\n\n\
         <canvas id=\"{canvas}\"></canvas>\n\
         <script type=\"module\" src=\"{script}\"></script>\n\n\
         {table}",
        title = content.title.replace('\'', "''"),
        date = content.published.format("%Y-%m-%d %H:%M:%S %z"),
        alt = content.alt_text,
        image = content.image_file,
        canvas = super::chart_js::CANVAS_ID,
        script = content.script_file,
        table = content.table,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn front_matter_and_body() {
        let published = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 10, 21, 0, 59)
            .unwrap();
        let post = render_post(&PostContent {
            title: "Evolución precio para el día 2024-06-11",
            published,
            alt_text: "alt",
            image_file: "2024-06-11_image.svg",
            script_file: "2024-06-11_chart.js",
            table: "| a |\n",
        });
        assert!(post.starts_with("---\nlayout: post\ntitle:  'Evolución precio para el día 2024-06-11'\n"));
        assert!(post.contains("date:   2024-06-10 21:00:59 +0200\n"));
        assert!(post.contains("![alt](2024-06-11_image.svg)"));
        assert!(post.contains("src=\"2024-06-11_chart.js\""));
        assert!(post.ends_with("| a |\n"));
    }
}
