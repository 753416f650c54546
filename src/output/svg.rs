//! SVG output encoder.
//!
//! Collects vector elements and serializes them to an SVG document. The
//! document's `width`/`height` attributes can carry a physical size (for
//! example `6in`) while the `viewBox` stays in pixels.

use std::fmt::Write as FmtWrite;

use crate::color::Rgba;
use crate::render::{TextAnchor, TextStyle};

/// SVG encoder for vector output.
#[derive(Debug, Clone)]
pub struct SvgEncoder {
    /// Width in pixels (viewBox units).
    width: u32,
    /// Height in pixels (viewBox units).
    height: u32,
    /// Physical `width`/`height` attribute values, if any.
    physical: Option<(String, String)>,
    /// Background color (None for transparent).
    background: Option<Rgba>,
    /// SVG elements
    elements: Vec<SvgElement>,
}

/// An SVG element.
///
/// Field names are self-documenting and match SVG attribute names.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum SvgElement {
    /// Rectangle
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Rgba>,
        stroke: Option<Rgba>,
        stroke_width: f32,
    },
    /// Circle
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
        fill: Option<Rgba>,
        stroke: Option<Rgba>,
    },
    /// Line
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: Rgba,
        stroke_width: f32,
    },
    /// Polyline, or polygon when filled
    Polyline {
        points: Vec<(f32, f32)>,
        stroke: Option<Rgba>,
        stroke_width: f32,
        fill: Option<Rgba>,
    },
    /// Text
    Text {
        x: f32,
        y: f32,
        text: String,
        style: TextStyle,
    },
}

impl Default for SvgEncoder {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl SvgEncoder {
    /// Create a new SVG encoder with given dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            physical: None,
            background: Some(Rgba::WHITE),
            elements: Vec::new(),
        }
    }

    /// Set background color (None for transparent).
    #[must_use]
    pub fn background(mut self, color: Option<Rgba>) -> Self {
        self.background = color;
        self
    }

    /// Record a physical size, e.g. `("6in", "4in")`.
    #[must_use]
    pub fn physical_size(mut self, width: impl Into<String>, height: impl Into<String>) -> Self {
        self.physical = Some((width.into(), height.into()));
        self
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Elements in drawing order.
    #[must_use]
    pub fn elements(&self) -> &[SvgElement] {
        &self.elements
    }

    /// Add a raw element.
    pub fn add_element(&mut self, element: SvgElement) {
        self.elements.push(element);
    }

    /// Render to SVG string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(4096 + self.elements.len() * 96);

        let (width_attr, height_attr) = self
            .physical
            .clone()
            .unwrap_or_else(|| (self.width.to_string(), self.height.to_string()));
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width_attr}" height="{height_attr}" viewBox="0 0 {} {}">"#,
            self.width, self.height
        );

        if let Some(bg) = self.background {
            let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="{}"/>"#, bg.to_css());
        }

        for element in &self.elements {
            let _ = writeln!(svg, "  {}", element_to_svg(element));
        }

        svg.push_str("</svg>\n");
        svg
    }
}

fn paint(color: Option<Rgba>) -> String {
    color.map_or_else(|| "none".to_string(), Rgba::to_css)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Convert an SVG element to its string representation.
fn element_to_svg(element: &SvgElement) -> String {
    match element {
        SvgElement::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
            stroke_width,
        } => {
            let stroke_attr = stroke
                .map(|s| format!(r#" stroke="{}" stroke-width="{stroke_width}""#, s.to_css()))
                .unwrap_or_default();
            format!(
                r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{}"{stroke_attr}/>"#,
                paint(*fill)
            )
        }
        SvgElement::Circle {
            cx,
            cy,
            r,
            fill,
            stroke,
        } => {
            let stroke_attr = stroke
                .map(|s| format!(r#" stroke="{}""#, s.to_css()))
                .unwrap_or_default();
            format!(
                r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{}"{stroke_attr}/>"#,
                paint(*fill)
            )
        }
        SvgElement::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
            stroke_width,
        } => format!(
            r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{}" stroke-width="{stroke_width}"/>"#,
            stroke.to_css()
        ),
        SvgElement::Polyline {
            points,
            stroke,
            stroke_width,
            fill,
        } => {
            let points_str = points
                .iter()
                .map(|(x, y)| format!("{x},{y}"))
                .collect::<Vec<_>>()
                .join(" ");
            let tag = if fill.is_some() { "polygon" } else { "polyline" };
            let stroke_attr = stroke
                .map(|s| format!(r#" stroke="{}" stroke-width="{stroke_width}""#, s.to_css()))
                .unwrap_or_default();
            format!(
                r#"<{tag} points="{points_str}" fill="{}"{stroke_attr}/>"#,
                paint(*fill)
            )
        }
        SvgElement::Text { x, y, text, style } => {
            let anchor = match style.anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
                TextAnchor::End => "end",
            };
            let weight = if style.bold { r#" font-weight="bold""# } else { "" };
            let transform = if style.rotate.abs() > f32::EPSILON {
                format!(r#" transform="rotate({} {x} {y})""#, style.rotate)
            } else {
                String::new()
            };
            format!(
                r#"<text x="{x}" y="{y}" font-size="{}" fill="{}" text-anchor="{anchor}" font-family="sans-serif"{weight}{transform}>{}</text>"#,
                style.size,
                style.color.to_css(),
                escape(text)
            )
        }
    }
}
