//! Roof geometry: areas, orientation and an approximate slope class.
//!
//! Areas are shoelace areas scaled by `mpp²`. The edge margin is measured on
//! the raster: roof mask pixels minus the mask eroded by the margin. The
//! orientation is the compass bearing of the long axis of the minimum-area
//! rectangle, folded into `[0, 180)`.
//!
//! The slope class is a shape heuristic, not a pitch measurement: a single
//! aerial image carries no height information. Its thresholds live in
//! [`SlopeHeuristic`].
use crate::angle::axis_bearing_deg;
use crate::geometry::Polygon;
use crate::morphology::erode_with_border;
use crate::obstacles::Obstacle;
use crate::types::RoofRegion;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlopeClass {
    Flat,
    Gabled,
    Hipped,
    Complex,
}

/// Tunable constants of the slope classifier.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SlopeHeuristic {
    /// Polygon area over minimum-rectangle area needed for flat/gabled.
    pub min_rectangularity: f64,
    pub max_rect_vertices: usize,
    /// Rectangular roofs more elongated than this read as gabled.
    pub flat_max_aspect: f64,
    /// Polygon area over convex-hull area needed for hipped.
    pub min_convexity: f64,
    pub max_hipped_vertices: usize,
}

impl Default for SlopeHeuristic {
    fn default() -> Self {
        Self {
            min_rectangularity: 0.85,
            max_rect_vertices: 6,
            flat_max_aspect: 1.6,
            min_convexity: 0.85,
            max_hipped_vertices: 10,
        }
    }
}

impl SlopeHeuristic {
    pub fn classify(&self, shape: &ShapeFactors) -> SlopeClass {
        if shape.rectangularity >= self.min_rectangularity
            && shape.vertices <= self.max_rect_vertices
        {
            if shape.aspect_ratio < self.flat_max_aspect {
                SlopeClass::Flat
            } else {
                SlopeClass::Gabled
            }
        } else if shape.convexity >= self.min_convexity
            && shape.vertices <= self.max_hipped_vertices
        {
            SlopeClass::Hipped
        } else {
            SlopeClass::Complex
        }
    }
}

/// Dimensionless shape measures of a roof outline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeFactors {
    pub rectangularity: f64,
    pub convexity: f64,
    pub aspect_ratio: f64,
    pub vertices: usize,
    /// Image-space angle of the long axis (radians).
    pub long_axis_angle: f64,
}

impl ShapeFactors {
    pub fn of(polygon: &Polygon) -> Self {
        let area = polygon.area();
        let rect = polygon.min_area_rect();
        let hull_area = polygon.convex_hull().area();
        let ratio = |denom: f64| if denom > f64::EPSILON { area / denom } else { 0.0 };
        Self {
            rectangularity: rect.map_or(0.0, |r| ratio(r.area())),
            convexity: ratio(hull_area),
            aspect_ratio: rect.map_or(1.0, |r| r.aspect_ratio()),
            vertices: polygon.len(),
            long_axis_angle: rect.map_or(0.0, |r| r.long_axis_angle()),
        }
    }
}

/// Shading-independent roof measures.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoofShape {
    pub total_area_m2: f64,
    pub obstacle_area_m2: f64,
    pub margin_area_m2: f64,
    /// `total - obstacles - margin`, clamped at 0.
    pub usable_area_m2: f64,
    /// Compass bearing of the long axis, degrees in `[0, 180)`. An axis has
    /// no direction, so bearings `b` and `b + 180` are folded onto the
    /// smaller one; the two roof faces point at `orientation_deg ± 90`.
    pub orientation_deg: f64,
    pub slope_class: SlopeClass,
    pub factors: ShapeFactors,
}

/// Complete roof characterization. Built once per roof.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoofGeometry {
    #[serde(flatten)]
    pub shape: RoofShape,
    pub shading_score: f64,
}

impl RoofGeometry {
    pub fn new(shape: RoofShape, shading_score: f64) -> Self {
        Self {
            shape,
            shading_score: shading_score.clamp(0.0, 1.0),
        }
    }

    pub fn usable_area_m2(&self) -> f64 {
        self.shape.usable_area_m2
    }
}

#[derive(Clone, Debug, Default)]
pub struct RoofGeometryAnalyzer {
    heuristic: SlopeHeuristic,
}

impl RoofGeometryAnalyzer {
    pub fn new(heuristic: SlopeHeuristic) -> Self {
        Self { heuristic }
    }

    pub fn analyze(
        &self,
        roof: &RoofRegion,
        obstacles: &[Obstacle],
        meters_per_pixel: f64,
        edge_margin_m: f64,
    ) -> RoofShape {
        let px_to_m2 = meters_per_pixel * meters_per_pixel;
        let total_area_m2 = roof.polygon.area() * px_to_m2;
        let obstacle_area_m2 =
            obstacles.iter().map(|o| o.polygon.area()).sum::<f64>() * px_to_m2;

        let margin_px = (edge_margin_m / meters_per_pixel).round().max(0.0) as usize;
        let inner = erode_with_border(&roof.mask, margin_px).count();
        let margin_area_m2 = roof.mask.count().saturating_sub(inner) as f64 * px_to_m2;

        let factors = ShapeFactors::of(&roof.polygon);
        RoofShape {
            total_area_m2,
            obstacle_area_m2,
            margin_area_m2,
            usable_area_m2: (total_area_m2 - obstacle_area_m2 - margin_area_m2).max(0.0),
            orientation_deg: axis_bearing_deg(factors.long_axis_angle),
            slope_class: self.heuristic.classify(&factors),
            factors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{OrientedRect, ShapeKind};
    use crate::types::RegionId;

    fn region(points: Vec<[f64; 2]>) -> RoofRegion {
        let polygon = Polygon::new(ShapeKind::Roof, points);
        RoofRegion {
            id: RegionId(1),
            mask: polygon.rasterize(400, 400),
            polygon,
            source_pass: "test".into(),
        }
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<[f64; 2]> {
        vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]]
    }

    #[test]
    fn areas_scale_with_square_of_resolution() {
        let roof = region(rect(100.0, 100.0, 200.0, 180.0));
        let analyzer = RoofGeometryAnalyzer::default();
        let shape = analyzer.analyze(&roof, &[], 0.1, 0.0);
        assert!((shape.total_area_m2 - 80.0).abs() < 1e-9);
        assert_eq!(shape.margin_area_m2, 0.0);
        assert!((shape.usable_area_m2 - 80.0).abs() < 1e-9);

        let coarse = analyzer.analyze(&roof, &[], 0.2, 0.0);
        assert!((coarse.total_area_m2 - 4.0 * shape.total_area_m2).abs() < 1e-9);
    }

    #[test]
    fn margin_is_the_eroded_band() {
        let roof = region(rect(100.0, 100.0, 200.0, 180.0));
        // 0.5 m at 0.1 m/px => 5 px band.
        let shape = RoofGeometryAnalyzer::default().analyze(&roof, &[], 0.1, 0.5);
        let band_px = 100.0 * 80.0 - 90.0 * 70.0;
        assert!((shape.margin_area_m2 - band_px * 0.01).abs() < 1e-9);
        assert!((shape.usable_area_m2 - 63.0).abs() < 1e-9);
    }

    #[test]
    fn orientation_follows_long_axis() {
        let analyzer = RoofGeometryAnalyzer::default();
        let wide = analyzer.analyze(&region(rect(50.0, 50.0, 250.0, 110.0)), &[], 0.1, 0.0);
        assert!((wide.orientation_deg - 90.0).abs() < 1e-6);
        let tall = analyzer.analyze(&region(rect(50.0, 50.0, 110.0, 250.0)), &[], 0.1, 0.0);
        assert!(tall.orientation_deg.abs() < 1e-6);
    }

    #[test]
    fn orientation_is_folded_into_a_half_turn() {
        let analyzer = RoofGeometryAnalyzer::default();
        for step in 0..24 {
            let angle = -std::f64::consts::PI + step as f64 * 0.27;
            let poly = OrientedRect::new([200.0, 200.0], 180.0, 60.0, angle)
                .to_polygon(ShapeKind::Roof);
            let roof = RoofRegion {
                id: RegionId(1),
                mask: poly.rasterize(400, 400),
                polygon: poly,
                source_pass: "test".into(),
            };
            let shape = analyzer.analyze(&roof, &[], 0.1, 0.0);
            assert!(
                (0.0..180.0).contains(&shape.orientation_deg),
                "angle {angle}: {}",
                shape.orientation_deg
            );
            let expected = axis_bearing_deg(angle);
            let diff = (shape.orientation_deg - expected).abs();
            assert!(
                diff.min(180.0 - diff) < 1e-6,
                "angle {angle}: {} vs {expected}",
                shape.orientation_deg
            );
        }
    }

    #[test]
    fn slope_classes_follow_shape() {
        let analyzer = RoofGeometryAnalyzer::default();
        let classify = |pts| analyzer.analyze(&region(pts), &[], 0.1, 0.0).slope_class;
        assert_eq!(classify(rect(0.0, 0.0, 100.0, 90.0)), SlopeClass::Flat);
        assert_eq!(classify(rect(0.0, 0.0, 200.0, 60.0)), SlopeClass::Gabled);
        let octagon = vec![
            [30.0, 0.0],
            [70.0, 0.0],
            [100.0, 30.0],
            [100.0, 70.0],
            [70.0, 100.0],
            [30.0, 100.0],
            [0.0, 70.0],
            [0.0, 30.0],
        ];
        assert_eq!(classify(octagon), SlopeClass::Hipped);
        let ell = vec![
            [0.0, 0.0],
            [100.0, 0.0],
            [100.0, 40.0],
            [40.0, 40.0],
            [40.0, 100.0],
            [0.0, 100.0],
        ];
        assert_eq!(classify(ell), SlopeClass::Complex);
    }

    #[test]
    fn geometry_clamps_shading() {
        let shape = RoofGeometryAnalyzer::default().analyze(
            &region(rect(0.0, 0.0, 10.0, 10.0)),
            &[],
            0.1,
            0.0,
        );
        assert_eq!(RoofGeometry::new(shape, 1.4).shading_score, 1.0);
    }
}
