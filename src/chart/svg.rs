//! SVG serialization of chart frames

use std::fmt::Write as _;

use super::arc::arc_path;
use super::color::Rgb;
use super::renderer::Frame;
use crate::config::ChartConfig;
use crate::legend::Legend;

/// Fixed-size SVG surface the chart is drawn on
#[derive(Debug, Clone)]
pub struct SvgCanvas {
    pub width: f64,
    pub height: f64,
    /// Chart center inside the canvas
    pub center: (f64, f64),
    /// Top-left corner of the legend group
    pub legend_origin: (f64, f64),
    pub stroke: Rgb,
    pub stroke_width: f64,
    pub legend: Legend,
}

impl SvgCanvas {
    pub fn from_config(config: &ChartConfig) -> Self {
        Self {
            width: config.width + config.margin,
            height: config.height + config.margin,
            center: (config.width / 2.0 + 5.0, config.height / 2.0 + 5.0),
            legend_origin: (config.width + config.legend_offset, 10.0),
            stroke: config.stroke_color,
            stroke_width: config.stroke_width,
            legend: Legend::from_config(config),
        }
    }

    /// Convert a point in canvas coordinates to chart-center coordinates
    pub fn to_chart(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.center.0, y - self.center.1)
    }

    pub fn render(&self, frame: &Frame) -> String {
        let mut svg = String::with_capacity(256 + frame.slices.len() * 160);
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height,
        );

        let _ = write!(
            svg,
            r#"<g class="graph" transform="translate({}, {})">"#,
            self.center.0, self.center.1
        );
        for slice in &frame.slices {
            let _ = write!(
                svg,
                r#"<path class="arc{exiting}" data-id="{id}" d="{d}" fill="{fill}" stroke="{stroke}" stroke-width="{sw}"/>"#,
                exiting = if slice.exiting { " exiting" } else { "" },
                id = escape(slice.id.as_str()),
                d = arc_path(&slice.arc, frame.outer_radius, frame.inner_radius),
                fill = slice.fill,
                stroke = self.stroke,
                sw = self.stroke_width,
            );
        }
        svg.push_str("</g>");

        let _ = write!(
            svg,
            r#"<g class="legend" transform="translate({}, {})">"#,
            self.legend_origin.0, self.legend_origin.1
        );
        svg.push_str(&self.legend.render_svg(&frame.legend));
        svg.push_str("</g></svg>");
        svg
    }
}

impl Default for SvgCanvas {
    fn default() -> Self {
        Self::from_config(&ChartConfig::default())
    }
}

/// Escape text for HTML/SVG content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
