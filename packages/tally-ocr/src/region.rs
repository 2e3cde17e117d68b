use serde::{Deserialize, Serialize};

/// A pixel coordinate on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Vertex {
    pub x: i32,
    pub y: i32,
}

impl Vertex {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Quadrilateral locating a token, ordered top-left, top-right,
/// bottom-right, bottom-left. Always exactly four points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingPolygon {
    pub vertices: [Vertex; 4],
}

impl BoundingPolygon {
    pub fn new(vertices: [Vertex; 4]) -> Self {
        Self { vertices }
    }

    /// Axis-aligned rectangle with its top-left corner at `(x, y)`.
    /// Edges past the `i32` range are clamped to it.
    pub fn from_rect(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::from_corners(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    /// Axis-aligned rectangle spanning `(min_x, min_y)` to `(max_x, max_y)`.
    pub fn from_corners(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self::new([
            Vertex::new(min_x, min_y),
            Vertex::new(max_x, min_y),
            Vertex::new(max_x, max_y),
            Vertex::new(min_x, max_y),
        ])
    }

    /// All four vertices collapsed onto the origin.
    pub fn degenerate() -> Self {
        Self::default()
    }

    /// Builds a polygon from an arbitrary vertex list. Exactly four points are
    /// kept in order; any other non-empty count collapses to its bounding
    /// rectangle. Returns `None` for an empty list.
    pub fn from_points(points: &[Vertex]) -> Option<Self> {
        match points {
            [] => None,
            [a, b, c, d] => Some(Self::new([*a, *b, *c, *d])),
            _ => {
                let min_x = points.iter().map(|v| v.x).min()?;
                let max_x = points.iter().map(|v| v.x).max()?;
                let min_y = points.iter().map(|v| v.y).min()?;
                let max_y = points.iter().map(|v| v.y).max()?;
                Some(Self::from_corners(min_x, min_y, max_x, max_y))
            }
        }
    }

    pub fn min_x(&self) -> i32 {
        self.vertices.iter().map(|v| v.x).min().unwrap_or_default()
    }

    pub fn max_x(&self) -> i32 {
        self.vertices.iter().map(|v| v.x).max().unwrap_or_default()
    }

    pub fn min_y(&self) -> i32 {
        self.vertices.iter().map(|v| v.y).min().unwrap_or_default()
    }

    pub fn max_y(&self) -> i32 {
        self.vertices.iter().map(|v| v.y).max().unwrap_or_default()
    }

    pub fn is_degenerate(&self) -> bool {
        self.min_x() == self.max_x() && self.min_y() == self.max_y()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rect_extents() {
        let poly = BoundingPolygon::from_rect(10, 20, 30, 5);
        assert_eq!(poly.min_x(), 10);
        assert_eq!(poly.max_x(), 40);
        assert_eq!(poly.min_y(), 20);
        assert_eq!(poly.max_y(), 25);
        assert!(!poly.is_degenerate());
    }

    #[test]
    fn test_from_points_collapses_irregular_lists() {
        let points = [Vertex::new(5, 5), Vertex::new(15, 2), Vertex::new(9, 12)];
        let poly = BoundingPolygon::from_points(&points).unwrap();
        assert_eq!(poly, BoundingPolygon::from_rect(5, 2, 10, 10));
        assert!(BoundingPolygon::from_points(&[]).is_none());
    }

    #[test]
    fn test_extreme_coordinates_do_not_overflow() {
        let points = [Vertex::new(i32::MIN, i32::MIN), Vertex::new(i32::MAX, 0), Vertex::new(0, i32::MAX)];
        let poly = BoundingPolygon::from_points(&points).unwrap();
        assert_eq!(poly.min_x(), i32::MIN);
        assert_eq!(poly.max_x(), i32::MAX);
        assert_eq!(poly.max_y(), i32::MAX);

        let rect = BoundingPolygon::from_rect(i32::MAX - 5, 0, 100, 10);
        assert_eq!(rect.max_x(), i32::MAX);
    }

    #[test]
    fn test_degenerate() {
        assert!(BoundingPolygon::degenerate().is_degenerate());
    }
}
