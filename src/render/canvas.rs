//! Drawing surface abstraction.
//!
//! Charts draw through [`Canvas`], which has a raster implementation on
//! [`Framebuffer`] and a vector implementation on [`SvgEncoder`]. Raster
//! output does not draw text.

use tracing::trace;

use super::primitives::{
    draw_circle, draw_circle_outline, draw_rect, draw_rect_outline, draw_thick_line, fill_polygon,
};
use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::geometry::{Point, Rect};
use crate::output::{SvgElement, SvgEncoder};

/// Horizontal text alignment relative to the anchor point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAnchor {
    /// Text starts at the anchor.
    #[default]
    Start,
    /// Text is centred on the anchor.
    Middle,
    /// Text ends at the anchor.
    End,
}

/// How a run of text is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels.
    pub size: f32,
    /// Fill color.
    pub color: Rgba,
    /// Horizontal alignment.
    pub anchor: TextAnchor,
    /// Clockwise rotation in degrees about the anchor.
    pub rotate: f32,
    /// Bold weight.
    pub bold: bool,
}

impl TextStyle {
    /// Left-aligned, unrotated text.
    #[must_use]
    pub const fn new(size: f32, color: Rgba) -> Self {
        Self {
            size,
            color,
            anchor: TextAnchor::Start,
            rotate: 0.0,
            bold: false,
        }
    }

    /// Set alignment.
    #[must_use]
    pub const fn anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Set rotation.
    #[must_use]
    pub const fn rotate(mut self, degrees: f32) -> Self {
        self.rotate = degrees;
        self
    }

    /// Set bold weight.
    #[must_use]
    pub const fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }
}

/// A surface charts can be drawn on. Coordinates are pixels from the
/// top-left corner.
pub trait Canvas {
    /// Surface width in pixels.
    fn width(&self) -> u32;

    /// Surface height in pixels.
    fn height(&self) -> u32;

    /// Fill a rectangle.
    fn fill_rect(&mut self, rect: Rect, fill: Rgba);

    /// Outline a rectangle.
    fn stroke_rect(&mut self, rect: Rect, stroke: Rgba, width: f32);

    /// Draw a straight line.
    fn line(&mut self, from: Point, to: Point, stroke: Rgba, width: f32);

    /// Draw connected line segments.
    fn polyline(&mut self, points: &[Point], stroke: Rgba, width: f32) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], stroke, width);
        }
    }

    /// Fill a circle.
    fn circle(&mut self, center: Point, radius: f32, fill: Rgba);

    /// Outline a circle.
    fn circle_outline(&mut self, center: Point, radius: f32, stroke: Rgba);

    /// Fill a closed polygon.
    fn polygon(&mut self, points: &[Point], fill: Rgba);

    /// Draw text.
    fn text(&mut self, at: Point, text: &str, style: &TextStyle);
}

impl Canvas for Framebuffer {
    fn width(&self) -> u32 {
        Framebuffer::width(self)
    }

    fn height(&self) -> u32 {
        Framebuffer::height(self)
    }

    fn fill_rect(&mut self, rect: Rect, fill: Rgba) {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }
        let x0 = rect.x.round().max(0.0);
        let y0 = rect.y.round().max(0.0);
        let x1 = rect.right().round().max(x0);
        let y1 = rect.bottom().round().max(y0);
        draw_rect(
            self,
            x0 as i32,
            y0 as i32,
            ((x1 - x0) as u32).max(1),
            ((y1 - y0) as u32).max(1),
            fill,
        );
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Rgba, width: f32) {
        draw_rect_outline(
            self,
            rect.x.round() as i32,
            rect.y.round() as i32,
            rect.width.round().max(1.0) as u32,
            rect.height.round().max(1.0) as u32,
            stroke,
            width.round().max(1.0) as u32,
        );
    }

    fn line(&mut self, from: Point, to: Point, stroke: Rgba, width: f32) {
        draw_thick_line(self, from, to, width, stroke);
    }

    fn circle(&mut self, center: Point, radius: f32, fill: Rgba) {
        draw_circle(self, center.x.round() as i32, center.y.round() as i32, radius.round() as i32, fill);
    }

    fn circle_outline(&mut self, center: Point, radius: f32, stroke: Rgba) {
        draw_circle_outline(
            self,
            center.x.round() as i32,
            center.y.round() as i32,
            radius.round() as i32,
            stroke,
        );
    }

    fn polygon(&mut self, points: &[Point], fill: Rgba) {
        fill_polygon(self, points, fill);
    }

    fn text(&mut self, _at: Point, text: &str, _style: &TextStyle) {
        trace!(text, "raster canvas skips text");
    }
}

impl Canvas for SvgEncoder {
    fn width(&self) -> u32 {
        SvgEncoder::width(self)
    }

    fn height(&self) -> u32 {
        SvgEncoder::height(self)
    }

    fn fill_rect(&mut self, rect: Rect, fill: Rgba) {
        self.add_element(SvgElement::Rect {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            fill: Some(fill),
            stroke: None,
            stroke_width: 0.0,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Rgba, width: f32) {
        self.add_element(SvgElement::Rect {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            fill: None,
            stroke: Some(stroke),
            stroke_width: width,
        });
    }

    fn line(&mut self, from: Point, to: Point, stroke: Rgba, width: f32) {
        self.add_element(SvgElement::Line {
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
            stroke,
            stroke_width: width,
        });
    }

    fn polyline(&mut self, points: &[Point], stroke: Rgba, width: f32) {
        self.add_element(SvgElement::Polyline {
            points: points.iter().map(|p| (p.x, p.y)).collect(),
            stroke: Some(stroke),
            stroke_width: width,
            fill: None,
        });
    }

    fn circle(&mut self, center: Point, radius: f32, fill: Rgba) {
        self.add_element(SvgElement::Circle {
            cx: center.x,
            cy: center.y,
            r: radius,
            fill: Some(fill),
            stroke: None,
        });
    }

    fn circle_outline(&mut self, center: Point, radius: f32, stroke: Rgba) {
        self.add_element(SvgElement::Circle {
            cx: center.x,
            cy: center.y,
            r: radius,
            fill: None,
            stroke: Some(stroke),
        });
    }

    fn polygon(&mut self, points: &[Point], fill: Rgba) {
        self.add_element(SvgElement::Polyline {
            points: points.iter().map(|p| (p.x, p.y)).collect(),
            stroke: None,
            stroke_width: 0.0,
            fill: Some(fill),
        });
    }

    fn text(&mut self, at: Point, text: &str, style: &TextStyle) {
        self.add_element(SvgElement::Text {
            x: at.x,
            y: at.y,
            text: text.to_string(),
            style: *style,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw_sample(canvas: &mut dyn Canvas) {
        canvas.fill_rect(Rect::new(10.0, 10.0, 20.0, 20.0), Rgba::RED);
        canvas.line(Point::new(0.0, 50.0), Point::new(99.0, 50.0), Rgba::BLACK, 1.0);
        canvas.circle(Point::new(70.0, 70.0), 5.0, Rgba::BLUE);
        canvas.text(Point::new(5.0, 95.0), "label", &TextStyle::new(10.0, Rgba::BLACK));
    }

    #[test]
    fn test_raster_canvas() {
        let mut fb = Framebuffer::new(100, 100).unwrap();
        fb.clear(Rgba::WHITE);
        draw_sample(&mut fb);
        assert_eq!(fb.get_pixel(15, 15), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(70, 70), Some(Rgba::BLUE));
        assert_eq!(Canvas::width(&fb), 100);
    }

    #[test]
    fn test_svg_canvas() {
        let mut svg = SvgEncoder::new(100, 100);
        draw_sample(&mut svg);
        let out = svg.render();
        assert!(out.contains("<rect x=\"10\" y=\"10\""));
        assert!(out.contains("<line"));
        assert!(out.contains("<circle"));
        assert!(out.contains(">label</text>"));
    }

    #[test]
    fn test_fractional_rect_covers_a_pixel() {
        let mut fb = Framebuffer::new(10, 10).unwrap();
        Canvas::fill_rect(&mut fb, Rect::new(2.2, 2.2, 0.4, 0.4), Rgba::RED);
        assert_eq!(fb.get_pixel(2, 2), Some(Rgba::RED));
    }
}
