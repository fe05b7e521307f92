//! Bar charts rendered as SVG.
//!
//! Dashboards embed the result as a base64 data URI, so the markup is built
//! by hand and kept self-contained (inline styles, no external fonts).

use base64::{Engine as _, engine::general_purpose};
use std::fmt::Write;

const WIDTH: f64 = 900.0;
const HEIGHT_HORIZONTAL: f64 = 320.0;
const HEIGHT_VERTICAL: f64 = 600.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 60.0;
const MARGIN_LEFT_HORIZONTAL: f64 = 150.0;
const MARGIN_LEFT_VERTICAL: f64 = 70.0;
const BAR_FILL: &str = "skyblue";
const BAR_STROKE: &str = "black";
const TICKS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Bars grow upwards, labels are drawn on the bars
    Vertical,
    /// Bars grow to the right, labels sit on the vertical axis
    Horizontal,
}

#[derive(Debug, Clone)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub orientation: Orientation,
    /// Upper bound of the value axis. Derived from the data when `None`.
    pub value_max: Option<f64>,
    pub bars: Vec<(String, f64)>,
}

impl BarChart {
    pub fn new(title: impl Into<String>, orientation: Orientation) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            orientation,
            value_max: None,
            bars: Vec::new(),
        }
    }

    pub fn labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn value_max(mut self, value_max: f64) -> Self {
        self.value_max = Some(value_max);
        self
    }

    pub fn bars(mut self, bars: Vec<(String, f64)>) -> Self {
        self.bars = bars;
        self
    }

    fn axis_max(&self) -> f64 {
        if let Some(max) = self.value_max.filter(|m| *m > 0.0) {
            return max;
        }
        let highest = self.bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
        if highest > 0.0 { highest * 1.15 } else { 1.0 }
    }

    pub fn render_svg(&self) -> String {
        let height = match self.orientation {
            Orientation::Horizontal => HEIGHT_HORIZONTAL,
            Orientation::Vertical => HEIGHT_VERTICAL,
        };
        let left = match self.orientation {
            Orientation::Horizontal => MARGIN_LEFT_HORIZONTAL,
            Orientation::Vertical => MARGIN_LEFT_VERTICAL,
        };
        let plot = Plot {
            left,
            top: MARGIN_TOP,
            width: WIDTH - left - MARGIN_RIGHT,
            height: height - MARGIN_TOP - MARGIN_BOTTOM,
            max: self.axis_max(),
        };

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{height}" viewBox="0 0 {WIDTH} {height}" font-family="sans-serif" font-size="12">"#
        );
        let _ = write!(
            svg,
            r#"<rect width="{WIDTH}" height="{height}" fill="white"/>"#
        );
        let _ = write!(
            svg,
            r#"<text class="title" x="{}" y="28" text-anchor="middle" font-size="16" font-weight="bold">{}</text>"#,
            WIDTH / 2.0,
            escape_xml(&self.title)
        );

        match self.orientation {
            Orientation::Horizontal => self.render_horizontal(&mut svg, &plot),
            Orientation::Vertical => self.render_vertical(&mut svg, &plot),
        }

        // axes
        let _ = write!(
            svg,
            r#"<line x1="{l}" y1="{t}" x2="{l}" y2="{b}" stroke="black"/><line x1="{l}" y1="{b}" x2="{r}" y2="{b}" stroke="black"/>"#,
            l = plot.left,
            t = plot.top,
            b = plot.bottom(),
            r = plot.right(),
        );
        let _ = write!(
            svg,
            r#"<text class="x-label" x="{}" y="{}" text-anchor="middle">{}</text>"#,
            plot.left + plot.width / 2.0,
            height - 15.0,
            escape_xml(&self.x_label)
        );
        let (cx, cy) = (18.0, plot.top + plot.height / 2.0);
        let _ = write!(
            svg,
            r#"<text class="y-label" x="{cx}" y="{cy}" text-anchor="middle" transform="rotate(-90 {cx} {cy})">{}</text>"#,
            escape_xml(&self.y_label)
        );

        svg.push_str("</svg>");
        svg
    }

    fn render_horizontal(&self, svg: &mut String, plot: &Plot) {
        for i in 0..=TICKS {
            let value = plot.max * i as f64 / TICKS as f64;
            let x = plot.left + plot.width * i as f64 / TICKS as f64;
            let _ = write!(
                svg,
                r#"<text class="tick" x="{x:.1}" y="{:.1}" text-anchor="middle">{value:.1}</text>"#,
                plot.bottom() + 16.0
            );
        }

        if self.bars.is_empty() {
            return;
        }
        let band = plot.height / self.bars.len() as f64;
        let thickness = band * 0.8;
        // first bar at the bottom
        for (index, (label, value)) in self.bars.iter().enumerate() {
            let y = plot.bottom() - band * (index as f64 + 1.0) + (band - thickness) / 2.0;
            let length = plot.scale(*value, plot.width);
            let _ = write!(
                svg,
                r#"<rect class="bar" x="{:.1}" y="{y:.1}" width="{length:.1}" height="{thickness:.1}" fill="{BAR_FILL}" stroke="{BAR_STROKE}"/>"#,
                plot.left
            );
            let _ = write!(
                svg,
                r#"<text class="value" x="{:.1}" y="{:.1}">{value:.2}</text>"#,
                plot.left + length + 6.0,
                y + thickness / 2.0 + 4.0
            );
            let _ = write!(
                svg,
                r#"<text class="category" x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
                plot.left - 8.0,
                y + thickness / 2.0 + 4.0,
                escape_xml(label)
            );
        }
    }

    fn render_vertical(&self, svg: &mut String, plot: &Plot) {
        for i in 0..=TICKS {
            let value = plot.max * i as f64 / TICKS as f64;
            let y = plot.bottom() - plot.height * i as f64 / TICKS as f64;
            let _ = write!(
                svg,
                r#"<text class="tick" x="{:.1}" y="{:.1}" text-anchor="end">{value:.1}</text>"#,
                plot.left - 6.0,
                y + 4.0
            );
        }

        if self.bars.is_empty() {
            return;
        }
        let band = plot.width / self.bars.len() as f64;
        let thickness = band * 0.5;
        for (index, (label, value)) in self.bars.iter().enumerate() {
            let x = plot.left + band * index as f64 + (band - thickness) / 2.0;
            let length = plot.scale(*value, plot.height);
            let center = x + thickness / 2.0;
            let _ = write!(
                svg,
                r#"<rect class="bar" x="{x:.1}" y="{:.1}" width="{thickness:.1}" height="{length:.1}" fill="{BAR_FILL}" stroke="{BAR_STROKE}"/>"#,
                plot.bottom() - length
            );
            let _ = write!(
                svg,
                r#"<text class="value" x="{center:.1}" y="{:.1}" text-anchor="middle">{value:.2}</text>"#,
                plot.bottom() - length - 6.0
            );
            let base = plot.bottom() - 8.0;
            let _ = write!(
                svg,
                r#"<text class="category" x="{center:.1}" y="{base:.1}" transform="rotate(-90 {center:.1} {base:.1})" dy="4">{}</text>"#,
                escape_xml(label)
            );
        }
    }

    /// `data:` URI for embedding in an `<img>` tag
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:image/svg+xml;base64,{}",
            general_purpose::STANDARD.encode(self.render_svg())
        )
    }
}

struct Plot {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    max: f64,
}

impl Plot {
    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Length of a bar for `value` along an axis of `span` pixels
    fn scale(&self, value: f64, span: f64) -> f64 {
        if !value.is_finite() || value <= 0.0 {
            return 0.0;
        }
        (value / self.max * span).min(span)
    }
}

pub fn escape_xml(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(orientation: Orientation, bars: Vec<(&str, f64)>) -> BarChart {
        BarChart::new("Average Grades per Subject", orientation)
            .labels("Average Grade", "Subjects")
            .bars(bars.into_iter().map(|(l, v)| (l.to_string(), v)).collect())
    }

    #[test]
    fn test_empty_chart_draws_axes_only() {
        let svg = chart(Orientation::Horizontal, vec![]).render_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Average Grades per Subject"));
        assert!(svg.contains("<line"));
        assert!(!svg.contains(r#"class="bar""#));
    }

    #[test]
    fn test_bars_and_value_labels() {
        let svg = chart(Orientation::Horizontal, vec![("Math", 4.25), ("Physics", 5.0)])
            .render_svg();
        assert_eq!(svg.matches(r#"class="bar""#).count(), 2);
        assert!(svg.contains(">4.25<"));
        assert!(svg.contains(">5.00<"));
        assert!(svg.contains(">Math<"));
    }

    #[test]
    fn test_labels_are_escaped() {
        let svg = chart(Orientation::Vertical, vec![("R&D <lab>", 3.0)]).render_svg();
        assert!(svg.contains("R&amp;D &lt;lab&gt;"));
        assert!(!svg.contains("<lab>"));
    }

    #[test]
    fn test_zero_value_keeps_label() {
        let svg = chart(Orientation::Vertical, vec![("Anna Nowak", 0.0)]).render_svg();
        assert!(svg.contains(r#"height="0.0""#));
        assert!(svg.contains(">0.00<"));
        assert!(svg.contains(">Anna Nowak<"));
    }

    #[test]
    fn test_fixed_value_axis() {
        let chart = chart(Orientation::Vertical, vec![("A", 6.0)]).value_max(6.49);
        assert_eq!(chart.axis_max(), 6.49);
        let svg = chart.render_svg();
        // top tick shows the fixed maximum
        assert!(svg.contains(">6.5<"));
    }

    #[test]
    fn test_data_uri() {
        let chart = chart(Orientation::Horizontal, vec![("Math", 2.0)]);
        let uri = chart.to_data_uri();
        let encoded = uri
            .strip_prefix("data:image/svg+xml;base64,")
            .expect("data uri prefix");
        let decoded = general_purpose::STANDARD.decode(encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), chart.render_svg());
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"a'b"c"#), "a&apos;b&quot;c");
        assert_eq!(escape_xml("plain"), "plain");
    }
}
