//! One polygon primitive shared by roofs, obstacles and panels.
//!
//! Coordinates are `[x, y]` in full-resolution image pixels (x right,
//! y down) unless a function says otherwise. Vector operations run on
//! `geo`; only pixel-centre rasterization lives here.

pub mod polygon;
pub mod rect;

pub use polygon::{Aabb, Polygon, ShapeKind};
pub use rect::OrientedRect;

use geo_types::Coord;

/// 2D point in pixel coordinates.
pub type Point = [f64; 2];

#[inline]
pub fn coord(p: Point) -> Coord<f64> {
    Coord { x: p[0], y: p[1] }
}

#[inline]
pub fn to_point(c: Coord<f64>) -> Point {
    [c.x, c.y]
}
