use super::{Point, Polygon, ShapeKind};
use serde::Serialize;

/// Rectangle with arbitrary rotation. `angle` is the image-space angle
/// (`atan2(dy, dx)`, radians) of the local x axis; `half` holds the half
/// extents along the local x and y axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct OrientedRect {
    pub center: Point,
    pub half: [f64; 2],
    pub angle: f64,
}

impl OrientedRect {
    pub fn new(center: Point, width: f64, height: f64, angle: f64) -> Self {
        Self {
            center,
            half: [0.5 * width, 0.5 * height],
            angle,
        }
    }

    pub fn width(&self) -> f64 {
        2.0 * self.half[0]
    }

    pub fn height(&self) -> f64 {
        2.0 * self.half[1]
    }

    pub fn area(&self) -> f64 {
        4.0 * self.half[0] * self.half[1]
    }

    /// Angle of the longer side, in radians.
    pub fn long_axis_angle(&self) -> f64 {
        if self.half[0] >= self.half[1] {
            self.angle
        } else {
            self.angle + std::f64::consts::FRAC_PI_2
        }
    }

    /// Long side over short side (`>= 1`), infinite for a segment.
    pub fn aspect_ratio(&self) -> f64 {
        let long = self.half[0].max(self.half[1]);
        let short = self.half[0].min(self.half[1]);
        if short <= f64::EPSILON {
            f64::INFINITY
        } else {
            long / short
        }
    }

    /// Corners in local order (-x,-y), (+x,-y), (+x,+y), (-x,+y).
    pub fn corners(&self) -> [Point; 4] {
        let (s, c) = self.angle.sin_cos();
        let ux = [c * self.half[0], s * self.half[0]];
        let uy = [-s * self.half[1], c * self.half[1]];
        let [cx, cy] = self.center;
        [
            [cx - ux[0] - uy[0], cy - ux[1] - uy[1]],
            [cx + ux[0] - uy[0], cy + ux[1] - uy[1]],
            [cx + ux[0] + uy[0], cy + ux[1] + uy[1]],
            [cx - ux[0] + uy[0], cy - ux[1] + uy[1]],
        ]
    }

    pub fn to_polygon(&self, kind: ShapeKind) -> Polygon {
        Polygon::new(kind, self.corners().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotated_rect_keeps_area() {
        let r = OrientedRect::new([5.0, 5.0], 4.0, 2.0, 0.3);
        let poly = r.to_polygon(ShapeKind::Panel);
        assert!((poly.area() - 8.0).abs() < 1e-9);
        let c = poly.centroid();
        assert!((c[0] - 5.0).abs() < 1e-9 && (c[1] - 5.0).abs() < 1e-9);
        assert!((r.aspect_ratio() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn long_axis_follows_longer_side() {
        let r = OrientedRect::new([0.0, 0.0], 1.0, 3.0, 0.0);
        assert!((r.long_axis_angle() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
