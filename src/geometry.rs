//! Geometric primitives for layout and rendering.

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate the distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A rectangle defined by position and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X coordinate of the top-left corner.
    pub x: f32,
    /// Y coordinate of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle from two corner points (in any order).
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(a.x.min(b.x), a.y.min(b.y), (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check if a point is inside the rectangle.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Get the center point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Shrink by margins; the result never has negative size.
    #[must_use]
    pub fn inset(&self, top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self::new(
            self.x + left,
            self.y + top,
            (self.width - left - right).max(0.0),
            (self.height - top - bottom).max(0.0),
        )
    }

    /// Cell `(row, col)` of an `nrow` x `ncol` grid over this rectangle,
    /// with `gap` pixels between cells.
    #[must_use]
    pub fn grid_cell(&self, row: usize, col: usize, nrow: usize, ncol: usize, gap: f32) -> Self {
        let nrow = nrow.max(1);
        let ncol = ncol.max(1);
        let cell_w = ((self.width - gap * (ncol - 1) as f32) / ncol as f32).max(0.0);
        let cell_h = ((self.height - gap * (nrow - 1) as f32) / nrow as f32).max(0.0);
        Self::new(
            self.x + col as f32 * (cell_w + gap),
            self.y + row as f32 * (cell_h + gap),
            cell_w,
            cell_h,
        )
    }

    /// Get the area of the rectangle.
    #[must_use]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert_relative_eq!(p1.distance(p2), 5.0);
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Point::new(5.0, 5.0)));
        assert!(!rect.contains(Point::new(15.0, 5.0)));
    }

    #[test]
    fn test_from_corners_normalizes() {
        let r = Rect::from_corners(Point::new(10.0, 2.0), Point::new(4.0, 8.0));
        assert_eq!(r, Rect::new(4.0, 2.0, 6.0, 6.0));
    }

    #[test]
    fn test_inset_never_negative() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).inset(8.0, 8.0, 8.0, 8.0);
        assert_relative_eq!(r.width, 0.0);
        assert_relative_eq!(r.height, 0.0);
    }

    #[test]
    fn test_grid_cell() {
        let area = Rect::new(0.0, 0.0, 210.0, 100.0);
        let cell = area.grid_cell(1, 2, 2, 3, 10.0);
        assert_relative_eq!(cell.width, 63.333_332, epsilon = 1e-3);
        assert_relative_eq!(cell.height, 45.0);
        assert_relative_eq!(cell.x, 146.666_66, epsilon = 1e-3);
        assert_relative_eq!(cell.y, 55.0);
    }

    #[test]
    fn test_rect_area() {
        assert_relative_eq!(Rect::new(0.0, 0.0, 10.0, 5.0).area(), 50.0);
    }
}
