//! Chart rendering.
//!
//! The analytics run hands numeric summaries to a [`ChartRenderer`] and, when
//! one is configured, a [`TagCloudRenderer`]. The bundled implementations
//! write plain SVG. A tag cloud renderer may report itself unavailable, in
//! which case the run carries on without that figure.

use crate::analysis::{AnalyticsReport, TagCount};
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const PLATFORM_CHART: &str = "response_rates_by_platform.svg";
pub const FUNNEL_CHART: &str = "engagement_funnel.svg";
pub const TAG_CLOUD: &str = "technologies_wordcloud.svg";

/// Data for a single-series bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<(String, f64)>,
    /// Fixed top of the y axis; the tallest bar is used when `None`.
    pub y_max: Option<f64>,
    pub color: &'static str,
}

pub trait ChartRenderer {
    fn render_bar_chart(&self, chart: &BarChart, path: &Path) -> Result<()>;
}

/// What a tag cloud renderer did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloudOutcome {
    Rendered,
    /// The capability is missing; carries a human-readable reason.
    Unavailable(String),
}

pub trait TagCloudRenderer {
    fn render(&self, tags: &[TagCount], path: &Path) -> Result<CloudOutcome>;
}

/// Bar charts as standalone SVG documents.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
        }
    }
}

impl SvgRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Build the SVG markup for a bar chart.
    pub fn bar_chart_svg(&self, chart: &BarChart) -> String {
        let (w, h) = (self.width as f64, self.height as f64);
        let (left, right, top, bottom) = (70.0, 20.0, 50.0, 110.0);
        let plot_w = (w - left - right).max(1.0);
        let plot_h = (h - top - bottom).max(1.0);

        let tallest = chart.bars.iter().map(|(_, v)| *v).fold(0.0, f64::max);
        let y_max = chart.y_max.unwrap_or(tallest).max(1.0);

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}" font-family="sans-serif">"#,
            self.width, self.height, self.width, self.height
        );
        svg.push_str(r#"<rect width="100%" height="100%" fill="white"/>"#);
        svg.push('\n');
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="30" text-anchor="middle" font-size="18">{}</text>"#,
            w / 2.0,
            escape(&chart.title)
        );

        // Dashed grid lines with tick labels.
        for step in 0..=4 {
            let value = y_max * step as f64 / 4.0;
            let y = top + plot_h - plot_h * step as f64 / 4.0;
            let _ = writeln!(
                svg,
                r##"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="#ccc" stroke-dasharray="4 3"/>"##,
                left,
                y,
                left + plot_w,
                y
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="11">{}</text>"#,
                left - 6.0,
                y + 4.0,
                trim_number(value)
            );
        }

        if !chart.bars.is_empty() {
            let slot = plot_w / chart.bars.len() as f64;
            let bar_w = slot * 0.6;

            for (i, (label, value)) in chart.bars.iter().enumerate() {
                let bar_h = plot_h * (value.max(0.0) / y_max).min(1.0);
                let x = left + slot * i as f64 + (slot - bar_w) / 2.0;
                let y = top + plot_h - bar_h;
                let cx = x + bar_w / 2.0;
                let _ = writeln!(
                    svg,
                    r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
                    x, y, bar_w, bar_h, chart.color
                );
                let _ = writeln!(
                    svg,
                    r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="11">{}</text>"#,
                    cx,
                    y - 4.0,
                    trim_number(*value)
                );
                let _ = writeln!(
                    svg,
                    r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="12" transform="rotate(-35 {:.1} {:.1})">{}</text>"#,
                    cx,
                    top + plot_h + 16.0,
                    cx,
                    top + plot_h + 16.0,
                    escape(label)
                );
            }
        }

        let _ = writeln!(
            svg,
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="black"/>"#,
            left,
            top + plot_h,
            left + plot_w,
            top + plot_h
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="13">{}</text>"#,
            left + plot_w / 2.0,
            h - 10.0,
            escape(&chart.x_label)
        );
        let _ = writeln!(
            svg,
            r#"<text x="18" y="{:.1}" text-anchor="middle" font-size="13" transform="rotate(-90 18 {:.1})">{}</text>"#,
            top + plot_h / 2.0,
            top + plot_h / 2.0,
            escape(&chart.y_label)
        );
        svg.push_str("</svg>\n");

        svg
    }
}

impl ChartRenderer for SvgRenderer {
    fn render_bar_chart(&self, chart: &BarChart, path: &Path) -> Result<()> {
        fs::write(path, self.bar_chart_svg(chart))
            .with_context(|| format!("Failed to write chart {}", path.display()))?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

/// Tag cloud laid out as rows of words sized by frequency.
#[derive(Debug, Clone)]
pub struct SvgTagCloud {
    pub width: u32,
    pub height: u32,
}

impl SvgTagCloud {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn cloud_svg(&self, tags: &[TagCount]) -> String {
        let (min_size, max_size) = (14.0, 48.0);
        let top = tags.iter().map(|t| t.count).max().unwrap_or(1).max(1) as f64;
        let palette = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b"];

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}" font-family="sans-serif">"#,
            self.width, self.height, self.width, self.height
        );
        svg.push_str(r#"<rect width="100%" height="100%" fill="white"/>"#);
        svg.push('\n');

        let (mut x, mut y, mut row_h) = (16.0, 16.0, 0.0_f64);
        for (i, tag) in tags.iter().enumerate() {
            let size = min_size + (max_size - min_size) * tag.count as f64 / top;
            // Rough advance width for a sans-serif face.
            let advance = size * 0.6 * tag.tag.chars().count() as f64 + size * 0.5;

            if x + advance > self.width as f64 && x > 16.0 {
                x = 16.0;
                y += row_h + 8.0;
                row_h = 0.0;
            }
            if y + size > self.height as f64 {
                break;
            }
            row_h = row_h.max(size);

            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" font-size="{:.1}" fill="{}">{}</text>"#,
                x,
                y + size,
                size,
                palette[i % palette.len()],
                escape(&tag.tag)
            );
            x += advance;
        }

        svg.push_str("</svg>\n");
        svg
    }
}

impl TagCloudRenderer for SvgTagCloud {
    fn render(&self, tags: &[TagCount], path: &Path) -> Result<CloudOutcome> {
        if tags.is_empty() {
            return Ok(CloudOutcome::Unavailable("no technology tags recorded".to_string()));
        }
        fs::write(path, self.cloud_svg(tags))
            .with_context(|| format!("Failed to write tag cloud {}", path.display()))?;
        Ok(CloudOutcome::Rendered)
    }
}

/// Stand-in used when tag clouds are turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTagCloud;

impl TagCloudRenderer for NoTagCloud {
    fn render(&self, _tags: &[TagCount], _path: &Path) -> Result<CloudOutcome> {
        Ok(CloudOutcome::Unavailable(
            "tag cloud rendering is disabled".to_string(),
        ))
    }
}

/// Files written by [`render_figures`] and notes about skipped ones.
#[derive(Debug, Clone, Default)]
pub struct FigureSummary {
    pub dir: PathBuf,
    pub written: Vec<PathBuf>,
    pub notes: Vec<String>,
}

/// Write the platform, funnel and tag cloud figures into `dir`.
pub fn render_figures(
    report: &AnalyticsReport,
    dir: &Path,
    charts: &dyn ChartRenderer,
    cloud: &dyn TagCloudRenderer,
) -> Result<FigureSummary> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create figures directory {}", dir.display()))?;
        info!("Created figures directory: {}", dir.display());
    }

    let mut summary = FigureSummary {
        dir: dir.to_path_buf(),
        ..Default::default()
    };

    let platform_chart = BarChart {
        title: "Response Rates by Platform".to_string(),
        x_label: "Platform".to_string(),
        y_label: "Response Rate (%)".to_string(),
        bars: report
            .engagements
            .by_platform
            .iter()
            .map(|g| (g.group.clone(), g.rate))
            .collect(),
        y_max: Some(100.0),
        color: "skyblue",
    };
    let path = dir.join(PLATFORM_CHART);
    charts.render_bar_chart(&platform_chart, &path)?;
    summary.written.push(path);

    let funnel_chart = BarChart {
        title: "Engagement Funnel".to_string(),
        x_label: "Status".to_string(),
        y_label: "Count".to_string(),
        bars: report
            .engagements
            .funnel
            .iter()
            .map(|s| (s.stage.clone(), s.count as f64))
            .collect(),
        y_max: None,
        color: "lightgreen",
    };
    let path = dir.join(FUNNEL_CHART);
    charts.render_bar_chart(&funnel_chart, &path)?;
    summary.written.push(path);

    let path = dir.join(TAG_CLOUD);
    match cloud.render(&report.companies.all_technologies, &path)? {
        CloudOutcome::Rendered => summary.written.push(path),
        CloudOutcome::Unavailable(reason) => {
            info!("Skipping tag cloud: {}", reason);
            summary.notes.push(format!("Tag cloud skipped: {}", reason));
        }
    }

    Ok(summary)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Company, Engagement};
    use tempfile::TempDir;

    fn sample_report() -> AnalyticsReport {
        let companies = vec![Company {
            name: "Acme".to_string(),
            industry: "Software".to_string(),
            technologies: "Rust, Go".to_string(),
            ..Default::default()
        }];
        let engagements = vec![Engagement {
            platform: "LinkedIn".to_string(),
            engagement_type: "Comment".to_string(),
            status: Some("Initial Contact".to_string()),
            ..Default::default()
        }];
        AnalyticsReport::build(&companies, &engagements, &[], 10)
    }

    #[test]
    fn test_bar_chart_svg() {
        let chart = BarChart {
            title: "R&D <rates>".to_string(),
            x_label: "Platform".to_string(),
            y_label: "Rate".to_string(),
            bars: vec![("A".to_string(), 50.0), ("B".to_string(), 12.5)],
            y_max: Some(100.0),
            color: "skyblue",
        };
        let svg = SvgRenderer::default().bar_chart_svg(&chart);

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("R&amp;D &lt;rates&gt;"));
        assert!(svg.contains(">12.5<"));
        assert_eq!(svg.matches("fill=\"skyblue\"").count(), 2);
    }

    #[test]
    fn test_render_figures_with_cloud() {
        let dir = TempDir::new().unwrap();
        let figures = dir.path().join("figures");

        let summary = render_figures(
            &sample_report(),
            &figures,
            &SvgRenderer::default(),
            &SvgTagCloud::new(800, 400),
        )
        .unwrap();

        assert_eq!(summary.written.len(), 3);
        assert!(figures.join(PLATFORM_CHART).exists());
        assert!(figures.join(FUNNEL_CHART).exists());
        let cloud = fs::read_to_string(figures.join(TAG_CLOUD)).unwrap();
        assert!(cloud.contains(">Rust<"));
    }

    #[test]
    fn test_cloud_draws_every_tag() {
        let dir = TempDir::new().unwrap();
        let companies: Vec<Company> = (0..15)
            .map(|i| Company {
                name: format!("Firm {}", i),
                industry: "Software".to_string(),
                technologies: format!("Tech{:02}", i),
                ..Default::default()
            })
            .collect();
        let report = AnalyticsReport::build(&companies, &[], &[], 10);

        render_figures(
            &report,
            dir.path(),
            &SvgRenderer::default(),
            &SvgTagCloud::new(800, 400),
        )
        .unwrap();

        let cloud = fs::read_to_string(dir.path().join(TAG_CLOUD)).unwrap();
        for i in 0..15 {
            assert!(cloud.contains(&format!(">Tech{:02}<", i)));
        }
    }

    #[test]
    fn test_unavailable_cloud_does_not_fail() {
        let dir = TempDir::new().unwrap();

        let summary = render_figures(
            &sample_report(),
            dir.path(),
            &SvgRenderer::default(),
            &NoTagCloud,
        )
        .unwrap();

        assert_eq!(summary.written.len(), 2);
        assert_eq!(summary.notes.len(), 1);
        assert!(!dir.path().join(TAG_CLOUD).exists());
    }
}
