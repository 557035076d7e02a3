//! SVG canvas for histogram outlines
//!
//! Coordinates are pixels with the origin at the top-left corner. Each
//! series is drawn as a closed step outline (ROOT "HIST" style) over a
//! shared frame; the y range starts at zero and is taken from the largest
//! bin across all series.

use super::{Color, Plot, Series, CANVAS_HEIGHT, CANVAS_WIDTH, LINE_WIDTH};
use std::fmt::Write as FmtWrite;

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 70.0;

const FONT: &str = "Helvetica, Arial, sans-serif";
const TICK_LENGTH: f64 = 8.0;

/// Legend box in canvas fractions, measured from the bottom-left corner
const LEGEND_NDC: (f64, f64, f64, f64) = (0.65, 0.75, 0.88, 0.88);

/// Headroom above the tallest bin
const Y_HEADROOM: f64 = 1.05;

/// Data-to-pixel mapping of the plot frame
struct Frame {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    x_min: f64,
    x_max: f64,
    y_max: f64,
}

impl Frame {
    fn x(&self, value: f64) -> f64 {
        self.left + (value - self.x_min) / (self.x_max - self.x_min) * (self.right - self.left)
    }

    fn y(&self, value: f64) -> f64 {
        self.bottom - value / self.y_max * (self.bottom - self.top)
    }
}

/// Render the plot as a standalone SVG document
pub fn render(plot: &Plot<'_>) -> String {
    let width = CANVAS_WIDTH as f64;
    let height = CANVAS_HEIGHT as f64;

    let (x_min, x_max) = plot
        .series
        .first()
        .map(|s| (s.histogram.low, s.histogram.high))
        .unwrap_or((0.0, 1.0));
    let (y_ticks, y_max) = y_axis(plot.max_count());

    let frame = Frame {
        left: MARGIN_LEFT,
        right: width - MARGIN_RIGHT,
        top: MARGIN_TOP,
        bottom: height - MARGIN_BOTTOM,
        x_min,
        x_max,
        y_max,
    };

    let mut out = String::with_capacity(16 * 1024);
    // Writing to a String cannot fail
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height,
    );
    let _ = writeln!(out, r#"<rect width="{}" height="{}" fill="white" />"#, width, height);

    draw_title(&mut out, &plot.title, width);
    for series in &plot.series {
        draw_series(&mut out, &frame, series);
    }
    draw_axes(&mut out, &frame, &plot.x_label, &plot.y_label, &y_ticks);
    if plot.show_legend {
        draw_legend(&mut out, &plot.series, width, height);
    }

    out.push_str("</svg>\n");
    out
}

fn draw_title(out: &mut String, title: &str, width: f64) {
    let _ = writeln!(
        out,
        r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="20" text-anchor="middle">{}</text>"#,
        width / 2.0,
        MARGIN_TOP / 2.0 + 7.0,
        FONT,
        escape(title)
    );
}

fn draw_series(out: &mut String, frame: &Frame, series: &Series<'_>) {
    let histogram = series.histogram;
    let mut points = Vec::with_capacity(2 * histogram.bins() + 2);
    points.push((frame.x(histogram.low), frame.y(0.0)));
    for (index, &count) in histogram.counts().iter().enumerate() {
        let (lo, hi) = histogram.bin_edges(index);
        let y = frame.y(count as f64);
        points.push((frame.x(lo), y));
        points.push((frame.x(hi), y));
    }
    points.push((frame.x(histogram.high), frame.y(0.0)));

    let _ = write!(out, r#"<polyline points=""#);
    for (i, (x, y)) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:.2},{:.2}", x, y);
    }
    let _ = writeln!(
        out,
        r#"" fill="none" stroke="{}" stroke-width="{}" />"#,
        series.color.to_hex(),
        LINE_WIDTH
    );
}

fn draw_axes(out: &mut String, frame: &Frame, x_label: &str, y_label: &str, y_ticks: &[f64]) {
    let black = Color::BLACK.to_hex();
    let _ = writeln!(
        out,
        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="{}" stroke-width="1" />"#,
        frame.left,
        frame.top,
        frame.right - frame.left,
        frame.bottom - frame.top,
        black
    );

    for value in ticks(frame.x_min, frame.x_max, 10) {
        let x = frame.x(value);
        let _ = writeln!(
            out,
            r#"<line x1="{x:.2}" y1="{b:.2}" x2="{x:.2}" y2="{t:.2}" stroke="{c}" stroke-width="1" />"#,
            x = x,
            b = frame.bottom,
            t = frame.bottom - TICK_LENGTH,
            c = black
        );
        let _ = writeln!(
            out,
            r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="14" text-anchor="middle">{}</text>"#,
            x,
            frame.bottom + 20.0,
            FONT,
            format_tick(value)
        );
    }

    for &value in y_ticks {
        let y = frame.y(value);
        let _ = writeln!(
            out,
            r#"<line x1="{l:.2}" y1="{y:.2}" x2="{r:.2}" y2="{y:.2}" stroke="{c}" stroke-width="1" />"#,
            l = frame.left,
            r = frame.left + TICK_LENGTH,
            y = y,
            c = black
        );
        let _ = writeln!(
            out,
            r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="14" text-anchor="end">{}</text>"#,
            frame.left - 6.0,
            y + 5.0,
            FONT,
            format_tick(value)
        );
    }

    let _ = writeln!(
        out,
        r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="16" text-anchor="end">{}</text>"#,
        frame.right,
        frame.bottom + 48.0,
        FONT,
        escape(x_label)
    );
    let (lx, ly) = (MARGIN_LEFT / 2.0 - 12.0, frame.top);
    let _ = writeln!(
        out,
        r#"<text x="{lx:.2}" y="{ly:.2}" font-family="{f}" font-size="16" text-anchor="end" transform="rotate(-90 {lx:.2} {ly:.2})">{t}</text>"#,
        lx = lx,
        ly = ly,
        f = FONT,
        t = escape(y_label)
    );
}

fn draw_legend(out: &mut String, series: &[Series<'_>], width: f64, height: f64) {
    let (x1, y1, x2, y2) = LEGEND_NDC;
    let left = x1 * width;
    let right = x2 * width;
    let top = (1.0 - y2) * height;
    let bottom = (1.0 - y1) * height;

    let _ = writeln!(
        out,
        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="white" stroke="{}" stroke-width="1" />"#,
        left,
        top,
        right - left,
        bottom - top,
        Color::BLACK.to_hex()
    );

    let row_height = (bottom - top) / series.len().max(1) as f64;
    for (index, entry) in series.iter().enumerate() {
        let y = top + row_height * (index as f64 + 0.5);
        let _ = writeln!(
            out,
            r#"<line x1="{:.2}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="{}" stroke-width="{}" />"#,
            left + 10.0,
            left + 40.0,
            entry.color.to_hex(),
            LINE_WIDTH,
            y = y
        );
        let _ = writeln!(
            out,
            r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="14">{}</text>"#,
            left + 50.0,
            y + 5.0,
            FONT,
            escape(entry.label)
        );
    }
}

/// Tick positions and the axis maximum for a count axis starting at zero
fn y_axis(max_count: u64) -> (Vec<f64>, f64) {
    let top = (max_count as f64 * Y_HEADROOM).max(1.0);
    let ticks = ticks(0.0, top, 6);
    (ticks, top)
}

/// "Nice" tick positions inside `[min, max]`
fn ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    let step = nice_step((max - min) / (target.max(2) - 1) as f64);
    let first = (min / step).ceil() as i64;
    let last = (max / step + 1e-9).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

fn nice_step(rough: f64) -> f64 {
    if !(rough.is_finite() && rough > 0.0) {
        return 1.0;
    }
    let exp = rough.log10().floor();
    let frac = rough / 10.0_f64.powf(exp);
    let nice = if frac <= 1.5 {
        1.0
    } else if frac <= 3.5 {
        2.0
    } else if frac <= 7.5 {
        5.0
    } else {
        10.0
    };
    nice * 10.0_f64.powf(exp)
}

fn format_tick(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.1}", value)
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventselect_core::{Distribution, Histogram, HistogramConfig};

    fn distribution(name: &str, values: &[f64]) -> Distribution {
        let title = format!("Transverse Mass ({})", name);
        let mut histogram = Histogram::new(name, title, &HistogramConfig::default()).unwrap();
        for &v in values {
            histogram.fill(v);
        }
        Distribution {
            histogram,
            cutflow: Default::default(),
        }
    }

    #[test]
    fn test_document_structure() {
        let dist = distribution("Sample", &[10.0, 11.0, 95.0]);
        let svg = render(&Plot::single(&dist));

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r#"width="800""#));
        assert!(svg.contains(r#"height="600""#));
        assert!(svg.contains("Transverse Mass (Sample)"));
        assert!(svg.contains("mT [GeV]"));
        assert!(svg.contains("Events"));
        assert_eq!(svg.matches("<polyline").count(), 1);
        assert!(svg.contains(r##"stroke="#0000ff" stroke-width="2""##));
    }

    #[test]
    fn test_outline_has_two_points_per_bin() {
        let dist = distribution("Sample", &[]);
        let svg = render(&Plot::single(&dist));
        let points = svg
            .lines()
            .find(|l| l.starts_with("<polyline"))
            .and_then(|l| l.split('"').nth(1))
            .unwrap();
        assert_eq!(points.split(' ').count(), 2 * 50 + 2);
    }

    #[test]
    fn test_labels_are_escaped() {
        let dist = distribution("a<b & c", &[]);
        let svg = render(&Plot::single(&dist));
        assert!(svg.contains("Transverse Mass (a&lt;b &amp; c)"));
        assert!(!svg.contains("a<b"));
    }

    #[test]
    fn test_ticks() {
        assert_eq!(ticks(0.0, 200.0, 10), (0..=10).map(|i| i as f64 * 20.0).collect::<Vec<_>>());
        assert_eq!(y_axis(0).1, 1.0);
        let (y_ticks, top) = y_axis(100);
        assert!((top - 105.0).abs() < 1e-9);
        assert_eq!(y_ticks.last().copied(), Some(100.0));
        assert_eq!(format_tick(40.0), "40");
        assert_eq!(format_tick(0.5), "0.5");
    }
}
