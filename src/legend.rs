//! Legend & Tooltip Presentation
//!
//! Secondary visual aids keyed off the renderer's color scale: a legend of
//! circle swatches per category, and the hover tooltip.

use serde::Serialize;
use std::fmt::Write as _;

use crate::chart::svg::escape;
use crate::chart::{OrdinalScale, Rgb};
use crate::config::ChartConfig;

/// One legend row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub name: String,
    pub color: Rgb,
}

/// One entry per domain name, in domain order
pub fn legend_entries(scale: &OrdinalScale) -> Vec<LegendEntry> {
    scale
        .domain()
        .iter()
        .filter_map(|name| {
            scale.lookup(name).map(|color| LegendEntry {
                name: name.clone(),
                color,
            })
        })
        .collect()
}

/// Vertical legend of circle swatches
#[derive(Debug, Clone)]
pub struct Legend {
    pub shape_radius: f64,
    /// Gap between consecutive swatches
    pub shape_padding: f64,
    /// Distance from swatch edge to label
    pub label_offset: f64,
    pub text_fill: Rgb,
}

impl Legend {
    pub fn from_config(config: &ChartConfig) -> Self {
        Self {
            shape_radius: config.legend_shape_radius,
            shape_padding: config.legend_shape_padding,
            label_offset: 10.0,
            text_fill: config.legend_text_color,
        }
    }

    /// Vertical distance between rows
    pub fn row_height(&self) -> f64 {
        self.shape_radius * 2.0 + self.shape_padding
    }

    /// SVG content for the legend group
    pub fn render_svg(&self, entries: &[LegendEntry]) -> String {
        let mut svg = String::new();
        let r = self.shape_radius;
        for (i, entry) in entries.iter().enumerate() {
            let _ = write!(
                svg,
                r#"<g class="cell" transform="translate(0, {y})"><circle class="swatch" cx="{r}" cy="{r}" r="{r}" fill="{fill}"/><text class="label" x="{tx}" y="{ty}" fill="{text}">{name}</text></g>"#,
                y = i as f64 * self.row_height(),
                fill = entry.color,
                tx = r * 2.0 + self.label_offset,
                ty = r + 4.0,
                text = self.text_fill,
                name = escape(&entry.name),
            );
        }
        svg
    }
}

impl Default for Legend {
    fn default() -> Self {
        Self::from_config(&ChartConfig::default())
    }
}

/// Page position of the pointer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, serde::Deserialize)]
pub struct PointerPosition {
    pub page_x: f64,
    pub page_y: f64,
}

impl PointerPosition {
    pub fn new(page_x: f64, page_y: f64) -> Self {
        Self { page_x, page_y }
    }
}

/// Hover tooltip for one slice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub name: String,
    pub cost: f64,
    pub position: PointerPosition,
    /// Formatted cost including the currency symbol
    pub cost_label: String,
}

impl Tooltip {
    pub fn new(name: impl Into<String>, cost: f64, position: PointerPosition, currency: &str) -> Self {
        Self {
            name: name.into(),
            cost,
            position,
            cost_label: format_cost(cost, currency),
        }
    }

    pub fn html(&self) -> String {
        format!(
            r#"<div class="name">{}</div><div class="cost">{}</div><div class="delete">Click slice to delete</div>"#,
            escape(&self.name),
            escape(&self.cost_label),
        )
    }

    /// Inline style placing the tooltip at the pointer
    pub fn style(&self) -> String {
        translate_style(self.position)
    }
}

/// `transform` style for an absolutely positioned element
pub fn translate_style(position: PointerPosition) -> String {
    format!(
        "transform: translate({}px,{}px)",
        position.page_x, position.page_y
    )
}

/// Currency symbol followed by the shortest decimal form of the amount
pub fn format_cost(cost: f64, symbol: &str) -> String {
    format!("{}{}", symbol, cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cost() {
        assert_eq!(format_cost(5.0, "$"), "$5");
        assert_eq!(format_cost(12.5, "$"), "$12.5");
        assert_eq!(format_cost(1000.0, "€"), "€1000");
    }

    #[test]
    fn test_entries_follow_domain() {
        let mut scale = OrdinalScale::set3();
        scale.set_domain(["Coffee", "Rent"]);
        let entries = legend_entries(&scale);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Coffee");
        assert_eq!(entries[0].color, "#8dd3c7".parse().unwrap());
        assert_eq!(entries[1].name, "Rent");
    }

    #[test]
    fn test_legend_rows() {
        let legend = Legend::default();
        assert_eq!(legend.row_height(), 30.0);

        let svg = legend.render_svg(&[
            LegendEntry { name: "Coffee".into(), color: Rgb::new(1, 2, 3) },
            LegendEntry { name: "Rent".into(), color: Rgb::new(4, 5, 6) },
        ]);
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains("translate(0, 30)"));
        assert!(svg.contains("fill=\"#010203\""));
        assert!(svg.contains(">Rent</text>"));
        assert!(svg.contains("fill=\"#ffffff\">Coffee"));
    }

    #[test]
    fn test_tooltip_html_and_style() {
        let tooltip = Tooltip::new("Coffee <latte>", 5.0, PointerPosition::new(120.0, 48.5), "$");

        assert_eq!(
            tooltip.html(),
            "<div class=\"name\">Coffee &lt;latte&gt;</div><div class=\"cost\">$5</div><div class=\"delete\">Click slice to delete</div>"
        );
        assert_eq!(tooltip.style(), "transform: translate(120px,48.5px)");
    }
}
