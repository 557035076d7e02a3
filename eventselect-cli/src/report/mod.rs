//! Plot rendering
//!
//! Turns filled distributions into an image or a JSON export. The output
//! format is chosen from the file extension:
//! - `svg`: hand-built SVG document
//! - `png`: the same SVG rasterised with resvg (feature `png`)
//! - `json`: the plotted histograms, serialized
//!
//! Parent directories of the output path are created as needed.

pub mod svg;

#[cfg(feature = "png")]
pub mod png;

use eventselect_core::{Comparison, Distribution, Histogram};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Canvas size in pixels
pub const CANVAS_WIDTH: u32 = 800;
pub const CANVAS_HEIGHT: u32 = 600;

/// Histogram outline width
pub const LINE_WIDTH: f64 = 2.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unsupported output format: '{0}' (expected svg, png or json)")]
    UnsupportedFormat(String),
    #[error("JSON export error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "png")]
    #[error("PNG encoding error: {0}")]
    Png(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// RGB line colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` notation
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

/// One histogram drawn as an outline
#[derive(Debug, Clone, Serialize)]
pub struct Series<'a> {
    pub label: &'a str,
    pub color: Color,
    pub histogram: &'a Histogram,
}

/// Everything needed to draw one canvas
#[derive(Debug, Clone, Serialize)]
pub struct Plot<'a> {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub show_legend: bool,
    pub series: Vec<Series<'a>>,
}

impl<'a> Plot<'a> {
    /// Single-sample plot, drawn in blue without a legend
    pub fn single(distribution: &'a Distribution) -> Self {
        let histogram = &distribution.histogram;
        Self {
            title: histogram.title.clone(),
            x_label: histogram.x_label.clone(),
            y_label: histogram.y_label.clone(),
            show_legend: false,
            series: vec![Series {
                label: distribution.label(),
                color: Color::BLUE,
                histogram,
            }],
        }
    }

    /// Signal (red) over background (blue) with a legend
    ///
    /// The canvas takes its title and axis labels from the signal histogram.
    pub fn comparison(comparison: &'a Comparison) -> Self {
        let colors = [Color::RED, Color::BLUE];
        let series = comparison
            .legend()
            .into_iter()
            .zip(colors)
            .map(|((distribution, label), color)| Series {
                label,
                color,
                histogram: &distribution.histogram,
            })
            .collect();

        let signal = &comparison.signal.histogram;
        Self {
            title: signal.title.clone(),
            x_label: signal.x_label.clone(),
            y_label: signal.y_label.clone(),
            show_legend: true,
            series,
        }
    }

    /// Largest bin count over all series
    pub fn max_count(&self) -> u64 {
        self.series
            .iter()
            .map(|s| s.histogram.max_count())
            .max()
            .unwrap_or(0)
    }
}

/// Render a plot to bytes in the given format
pub fn render_to_bytes(plot: &Plot<'_>, format: &str) -> Result<Vec<u8>> {
    match format.to_ascii_lowercase().as_str() {
        "svg" => Ok(svg::render(plot).into_bytes()),
        #[cfg(feature = "png")]
        "png" => png::svg_to_png(&svg::render(plot)),
        "json" => Ok(serde_json::to_vec_pretty(plot)?),
        other => Err(RenderError::UnsupportedFormat(other.to_string())),
    }
}

/// Render a plot to a file (format inferred from extension)
pub fn render_to_file(plot: &Plot<'_>, path: &Path) -> Result<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let bytes = render_to_bytes(plot, ext)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;

    log::info!("Wrote {} ({} series)", path.display(), plot.series.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventselect_core::{AnalysisConfig, Analyzer, EventRecord, MemorySource, SelectionMode};

    fn comparison() -> Comparison {
        let record = EventRecord {
            lepton_count: 2,
            lepton_pt: vec![40000.0, 30000.0],
            lepton_eta: vec![0.1, -0.2],
            lepton_phi: vec![0.0, 1.0],
            lepton_charge: vec![1, -1],
            lepton_type: vec![11, -11],
            missing_et: 35000.0,
            missing_phi: 0.5,
        };
        let signal = MemorySource::new("sig", vec![record.clone(), record.clone()]);
        let background = MemorySource::new("bkg", vec![record]);
        Analyzer::new(AnalysisConfig::new(), SelectionMode::Default)
            .unwrap()
            .compare(&signal, &background)
            .unwrap()
    }

    #[test]
    fn test_comparison_styling() {
        let cmp = comparison();
        let plot = Plot::comparison(&cmp);
        assert!(plot.show_legend);
        assert_eq!(plot.title, "Transverse Mass (Signal)");
        assert_eq!(plot.series[0].label, "Signal");
        assert_eq!(plot.series[0].color, Color::RED);
        assert_eq!(plot.series[1].label, "Background");
        assert_eq!(plot.series[1].color, Color::BLUE);
        assert_eq!(plot.max_count(), 2);
    }

    #[test]
    fn test_single_plot_is_blue_without_legend() {
        let cmp = comparison();
        let plot = Plot::single(&cmp.background);
        assert!(!plot.show_legend);
        assert_eq!(plot.series.len(), 1);
        assert_eq!(plot.series[0].color, Color::BLUE);
    }

    #[test]
    fn test_render_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let cmp = comparison();
        let plot = Plot::comparison(&cmp);

        let svg_path = dir.path().join("plots/nested/mt.svg");
        render_to_file(&plot, &svg_path).unwrap();
        let svg = std::fs::read_to_string(&svg_path).unwrap();
        assert!(svg.starts_with("<svg"));

        let json_path = dir.path().join("out/mt.json");
        render_to_file(&plot, &json_path).unwrap();
        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&json_path).unwrap()).unwrap();
        assert_eq!(value["series"][0]["label"], "Signal");
        assert_eq!(value["series"][0]["color"], "#ff0000");
        assert_eq!(value["series"][1]["histogram"]["counts"].as_array().unwrap().len(), 50);
    }

    #[test]
    fn test_unsupported_format() {
        let dir = tempfile::tempdir().unwrap();
        let cmp = comparison();
        let path = dir.path().join("mt.gif");

        let err = render_to_file(&Plot::comparison(&cmp), &path).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedFormat(ref f) if f == "gif"));
        assert!(!path.exists());
    }
}
