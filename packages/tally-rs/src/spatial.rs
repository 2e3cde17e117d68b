//! Geometry queries over bounding polygons.
//!
//! All extractors assume axis-aligned text; rotation is not corrected.
use serde::{Deserialize, Serialize};
use tally_ocr::BoundingPolygon;

/// A floating-point page position, used for centroids.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

pub fn leftmost_x(bbox: &BoundingPolygon) -> i32 {
    bbox.min_x()
}

pub fn rightmost_x(bbox: &BoundingPolygon) -> i32 {
    bbox.max_x()
}

pub fn top_y(bbox: &BoundingPolygon) -> i32 {
    bbox.min_y()
}

/// Midpoint of the polygon's vertical extent.
pub fn vertical_center(bbox: &BoundingPolygon) -> f64 {
    (bbox.min_y() as f64 + bbox.max_y() as f64) / 2.0
}

pub fn same_line(a: &BoundingPolygon, b: &BoundingPolygon, tolerance: f64) -> bool {
    (vertical_center(a) - vertical_center(b)).abs() <= tolerance
}

/// Average of the four vertices.
pub fn centroid(bbox: &BoundingPolygon) -> Point {
    let (sum_x, sum_y) = bbox
        .vertices
        .iter()
        .fold((0.0, 0.0), |(sx, sy), v| (sx + v.x as f64, sy + v.y as f64));
    let n = bbox.vertices.len() as f64;
    Point {
        x: sum_x / n,
        y: sum_y / n,
    }
}

pub fn centroid_distance(a: &BoundingPolygon, b: &BoundingPolygon) -> f64 {
    centroid(a).distance(&centroid(b))
}

/// Bounding-box height as a coarse stand-in for the rendered font size.
pub fn font_size(bbox: &BoundingPolygon) -> i32 {
    bbox.max_y().saturating_sub(bbox.min_y())
}
