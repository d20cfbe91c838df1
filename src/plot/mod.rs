// src/plot/mod.rs
use anyhow::{Context, Result};
use plotly::common::Title;
use plotly::layout::Axis;
use plotly::{Bar, Layout, Plot};
use plotters::prelude::*;
use std::{fs, path::Path};
use tracing::info;

use crate::analyze::Bucket;
use crate::export::ensure_parent;

const CHART_SIZE: (u32, u32) = (1000, 600);

/// Labels for the score distribution chart.
#[derive(Debug, Clone)]
pub struct ChartLabels {
    pub title: String,
    pub x: String,
    pub y: String,
}

impl Default for ChartLabels {
    fn default() -> Self {
        Self {
            title: "Overall Score Distribution".into(),
            x: "Overall Score".into(),
            y: "Number of Universities".into(),
        }
    }
}

/// Render the histogram as an SVG image at `path`. One rectangle per bucket,
/// spanning `[lower, upper]`.
#[tracing::instrument(level = "info", skip(buckets, labels, path), fields(path = %path.display()))]
pub fn write_histogram(buckets: &[Bucket], labels: &ChartLabels, path: &Path) -> Result<()> {
    ensure_parent(path)?;

    let (x_lo, x_hi) = match (buckets.first(), buckets.last()) {
        (Some(first), Some(last)) => (first.lower, last.upper),
        _ => (0.0, 1.0),
    };
    let y_hi = buckets.iter().map(|b| b.count).max().unwrap_or(0) + 1;

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).context("filling chart background")?;
    {
        let mut chart = ChartBuilder::on(&root)
            .caption(&labels.title, ("sans-serif", 28))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(x_lo..x_hi, 0usize..y_hi)
            .context("laying out histogram axes")?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(labels.x.as_str())
            .y_desc(labels.y.as_str())
            .draw()
            .context("drawing histogram axes")?;

        chart
            .draw_series(buckets.iter().map(|b| {
                Rectangle::new([(b.lower, 0), (b.upper, b.count)], BLUE.mix(0.6).filled())
            }))
            .context("drawing histogram bars")?;
    }
    root.present().with_context(|| format!("writing histogram to {:?}", path))?;

    info!(buckets = buckets.len(), "saved score histogram");
    Ok(())
}

/// Build an interactive bar chart of precomputed buckets. Buckets are equal
/// width, so bars at the midpoints with no gap tile the score range.
pub fn histogram_plot(buckets: &[Bucket], labels: &ChartLabels) -> Plot {
    let x: Vec<f64> = buckets.iter().map(Bucket::midpoint).collect();
    let y: Vec<usize> = buckets.iter().map(|b| b.count).collect();

    let trace = Bar::new(x, y).name("scores");

    let layout = Layout::new()
        .title(Title::with_text(&labels.title))
        .bar_gap(0.0)
        .show_legend(false)
        .x_axis(Axis::new().title(Title::with_text(&labels.x)))
        .y_axis(Axis::new().title(Title::with_text(&labels.y)));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}

/// Write the interactive chart as a standalone HTML page.
#[tracing::instrument(level = "info", skip(buckets, labels, path), fields(path = %path.display()))]
pub fn write_histogram_html(buckets: &[Bucket], labels: &ChartLabels, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let plot = histogram_plot(buckets, labels);
    fs::write(path, plot.to_html())
        .with_context(|| format!("writing histogram to {:?}", path))?;
    info!(buckets = buckets.len(), "saved interactive histogram");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::histogram;
    use tempfile::tempdir;

    #[test]
    fn test_plot_has_one_trace() {
        let buckets = histogram(&[1.0, 2.0, 3.0], 3);
        let plot = histogram_plot(&buckets, &ChartLabels::default());
        let json = plot.to_json();
        assert!(json.contains("Overall Score Distribution"));
        assert!(json.contains("\"type\":\"bar\""));
    }

    #[test]
    fn test_writes_svg_image() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("charts/score_distribution.svg");
        let buckets = histogram(&[55.0, 60.0, 90.0, 91.2], 30);
        write_histogram(&buckets, &ChartLabels::default(), &path)?;
        let svg = fs::read_to_string(&path)?;
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<rect"));
        assert!(svg.contains("Number of Universities"));
        Ok(())
    }

    #[test]
    fn test_empty_buckets_still_render() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("empty.svg");
        write_histogram(&[], &ChartLabels::default(), &path)?;
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_writes_html_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("charts/score_distribution.html");
        let buckets = histogram(&[55.0, 60.0, 90.0, 91.2], 30);
        write_histogram_html(&buckets, &ChartLabels::default(), &path)?;
        let html = fs::read_to_string(&path)?;
        assert!(html.contains("Number of Universities"));
        Ok(())
    }

    #[test]
    fn test_unwritable_chart_path_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let buckets = histogram(&[1.0, 2.0], 2);
        // the target path is an existing directory
        assert!(write_histogram(&buckets, &ChartLabels::default(), dir.path()).is_err());
        assert!(write_histogram_html(&buckets, &ChartLabels::default(), dir.path()).is_err());
        Ok(())
    }
}
