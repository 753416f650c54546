//! Geometry types for Grammar of Graphics.
//!
//! Defines the marks a layer draws. Layers draw in the order they were added.

use super::aes::Aes;

/// Shape types for point geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointShape {
    /// Filled circle.
    #[default]
    Circle,
    /// Filled square.
    Square,
    /// Filled triangle.
    Triangle,
    /// Diamond shape.
    Diamond,
    /// Open circle.
    Ring,
}

impl PointShape {
    /// Shapes cycled through when `shape` is mapped to a column.
    pub const CYCLE: [PointShape; 5] = [
        PointShape::Circle,
        PointShape::Triangle,
        PointShape::Square,
        PointShape::Diamond,
        PointShape::Ring,
    ];
}

/// How overlapping marks sharing one x position are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// Draw at the mapped position, overlapping.
    #[default]
    Identity,
    /// Stack values on top of each other.
    Stack,
    /// Place marks side by side within the band.
    Dodge,
}

/// Geometry type specification.
#[derive(Debug, Clone, PartialEq)]
pub enum GeomType {
    /// Points.
    Point {
        /// Point shape (ignored when `shape` is mapped).
        shape: PointShape,
    },
    /// Lines connecting points in x order.
    Line {
        /// Line width.
        width: f32,
    },
    /// Box plot of y per x level.
    Boxplot {
        /// Box width (fraction of the band).
        width: f32,
    },
    /// Columns from zero to y.
    Col {
        /// Column width (fraction of the band).
        width: f32,
        /// Arrangement of columns sharing an x position.
        position: Position,
    },
    /// Error bars between two bounds.
    Errorbar {
        /// Cap width (fraction of the band).
        width: f32,
        /// Arrangement of bars sharing an x position.
        position: Position,
    },
    /// Horizontal reference line.
    Hline {
        /// Y intercept.
        yintercept: f64,
    },
}

/// A geometry layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Geom {
    /// The geometry type.
    pub geom_type: GeomType,
    /// Layer-specific aesthetics, merged over the chart's.
    pub aes: Option<Aes>,
}

impl Geom {
    const fn of(geom_type: GeomType) -> Self {
        Self {
            geom_type,
            aes: None,
        }
    }

    /// Create a point geometry.
    #[must_use]
    pub fn point() -> Self {
        Self::of(GeomType::Point {
            shape: PointShape::Circle,
        })
    }

    /// Create a line geometry.
    #[must_use]
    pub fn line() -> Self {
        Self::of(GeomType::Line { width: 1.0 })
    }

    /// Create a box plot geometry.
    #[must_use]
    pub fn boxplot() -> Self {
        Self::of(GeomType::Boxplot { width: 0.75 })
    }

    /// Create a column geometry, stacked by default.
    #[must_use]
    pub fn col() -> Self {
        Self::of(GeomType::Col {
            width: 0.9,
            position: Position::Stack,
        })
    }

    /// Create an error bar geometry.
    #[must_use]
    pub fn errorbar() -> Self {
        Self::of(GeomType::Errorbar {
            width: 0.5,
            position: Position::Identity,
        })
    }

    /// Create a horizontal line.
    #[must_use]
    pub fn hline(yintercept: f64) -> Self {
        Self::of(GeomType::Hline { yintercept })
    }

    /// Set layer aesthetics.
    #[must_use]
    pub fn aes(mut self, aes: Aes) -> Self {
        self.aes = Some(aes);
        self
    }

    /// Set point shape (points only).
    #[must_use]
    pub fn shape(mut self, shape: PointShape) -> Self {
        if let GeomType::Point { shape: s } = &mut self.geom_type {
            *s = shape;
        }
        self
    }

    /// Set line width, box width, column width or cap width.
    #[must_use]
    pub fn width(mut self, width: f32) -> Self {
        match &mut self.geom_type {
            GeomType::Line { width: w }
            | GeomType::Boxplot { width: w }
            | GeomType::Col { width: w, .. }
            | GeomType::Errorbar { width: w, .. } => *w = width.max(0.0),
            GeomType::Point { .. } | GeomType::Hline { .. } => {}
        }
        self
    }

    /// Set position adjustment (columns and error bars).
    #[must_use]
    pub fn position(mut self, position: Position) -> Self {
        match &mut self.geom_type {
            GeomType::Col { position: p, .. } | GeomType::Errorbar { position: p, .. } => {
                *p = position;
            }
            _ => {}
        }
        self
    }

    /// Short name of the mark, used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self.geom_type {
            GeomType::Point { .. } => "point",
            GeomType::Line { .. } => "line",
            GeomType::Boxplot { .. } => "boxplot",
            GeomType::Col { .. } => "col",
            GeomType::Errorbar { .. } => "errorbar",
            GeomType::Hline { .. } => "hline",
        }
    }
}
