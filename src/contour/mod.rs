//! Connected components and their outer boundaries.
//!
//! - [`components`]: 8-connected labelling with running moment sums.
//! - [`trace`]: crack-following outer boundary. The traced ring runs along
//!   pixel edges, so its shoelace area equals the component's pixel count
//!   (holes are ignored).
//! - [`simplify`]: Douglas–Peucker reduction of closed rings.

pub mod components;
pub mod simplify;
pub mod trace;

pub use components::{label_components, Component, Labels};
pub use simplify::simplify_closed;
pub use trace::trace_outer_boundary;

use crate::geometry::Point;
use crate::image::BinaryMask;

/// One traced component in full-image coordinates.
#[derive(Clone, Debug)]
pub struct Contour {
    pub component: Component,
    /// Corner vertices of the outer pixel boundary.
    pub boundary: Vec<Point>,
}

/// Label `mask`, keep components with `min_pixels..=max_pixels` pixels and
/// trace their outer boundaries. Output follows label order (row-major seed
/// order), so it is deterministic.
pub fn outer_contours(mask: &BinaryMask, min_pixels: usize, max_pixels: usize) -> Vec<Contour> {
    let (labels, comps) = label_components(mask);
    comps
        .into_iter()
        .filter(|c| c.pixel_count >= min_pixels && c.pixel_count <= max_pixels)
        .map(|component| {
            let boundary = trace_outer_boundary(&labels, &component);
            Contour {
                component,
                boundary,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Polygon, ShapeKind};

    #[test]
    fn contour_area_matches_pixel_count() {
        let mut m = BinaryMask::with_origin([7, 3], 12, 10);
        // Plus-shaped blob and a separate 2x2 square.
        for (x, y) in [(4, 2), (3, 3), (4, 3), (5, 3), (4, 4)] {
            m.set(x, y, true);
        }
        for (x, y) in [(9, 7), (10, 7), (9, 8), (10, 8)] {
            m.set(x, y, true);
        }
        let contours = outer_contours(&m, 1, usize::MAX);
        assert_eq!(contours.len(), 2);
        for c in &contours {
            let poly = Polygon::new(ShapeKind::Roof, c.boundary.clone());
            assert!((poly.area() - c.component.pixel_count as f64).abs() < 1e-9);
            assert!(poly.is_simple());
        }
        let plus = Polygon::new(ShapeKind::Roof, contours[0].boundary.clone());
        assert_eq!(plus.len(), 12);
        assert!(plus.bounds().min[0] >= 7.0 + 3.0 - 1e-9);
    }

    #[test]
    fn size_filter_drops_small_components() {
        let mut m = BinaryMask::new(6, 6);
        m.set(0, 0, true);
        for y in 2..5 {
            for x in 2..5 {
                m.set(x, y, true);
            }
        }
        let contours = outer_contours(&m, 2, usize::MAX);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].component.pixel_count, 9);
    }
}
