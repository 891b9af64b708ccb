//! Obstacle detection inside one roof.
//!
//! Pixels whose intensity departs from the roof's own statistics by more than
//! `k_sigma` standard deviations (and at least `min_contrast`) form an anomaly
//! mask. After an opening, every 8-connected blob is checked for size,
//! distance to the roof edge and solidity, then traced. Only polygons that
//! the roof polygon contains are returned. The type tag is for reporting;
//! packing treats every obstacle the same.
use crate::contour::{label_components, simplify_closed, trace_outer_boundary, Component};
use crate::geometry::{Polygon, ShapeKind};
use crate::image::{BinaryMask, ImageF32};
use crate::morphology;
use crate::types::RoofRegion;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    Vent,
    Chimney,
    Skylight,
    Unknown,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Obstacle {
    pub polygon: Polygon,
    pub kind: ObstacleKind,
    /// Blob size in pixels.
    pub pixel_area: usize,
    /// Mean blob intensity minus mean roof intensity, `[0, 1]` units.
    pub contrast: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleOptions {
    pub k_sigma: f64,
    /// Minimum absolute departure from the roof mean, `[0, 1]` units.
    pub min_contrast: f64,
    pub open_radius_px: usize,
    /// Blobs reaching into this band along the roof boundary are boundary
    /// noise.
    pub edge_band_px: usize,
    pub min_area_px: usize,
    pub max_roof_fraction: f64,
    pub min_solidity: f64,
    /// Streaks (ridge lines, gutters, cast-shadow edges) whose principal
    /// axes differ by more than this ratio are not obstacles.
    pub max_elongation: f64,
    /// Dark blobs up to this fraction of the roof are vents, larger ones
    /// chimneys.
    pub vent_max_roof_fraction: f64,
    /// Share of one polarity needed to call a blob bright or dark.
    pub polarity_majority: f64,
    pub simplify_epsilon_px: f64,
}

impl Default for ObstacleOptions {
    fn default() -> Self {
        Self {
            k_sigma: 2.0,
            min_contrast: 0.12,
            open_radius_px: 1,
            edge_band_px: 2,
            min_area_px: 12,
            max_roof_fraction: 0.25,
            min_solidity: 0.5,
            max_elongation: 6.0,
            vent_max_roof_fraction: 0.004,
            polarity_majority: 0.8,
            simplify_epsilon_px: 0.75,
        }
    }
}

impl ObstacleOptions {
    pub fn validate(&self) -> Result<(), String> {
        if !self.k_sigma.is_finite()
            || self.k_sigma < 0.0
            || !self.min_contrast.is_finite()
            || self.min_contrast < 0.0
        {
            return Err("obstacle k_sigma and min_contrast must be non-negative".into());
        }
        if !(0.0..=1.0).contains(&self.max_roof_fraction)
            || !(0.0..=1.0).contains(&self.vent_max_roof_fraction)
            || !(0.0..=1.0).contains(&self.min_solidity)
            || !(0.5..=1.0).contains(&self.polarity_majority)
        {
            return Err("obstacle fractions must lie in [0, 1] (polarity_majority in [0.5, 1])".into());
        }
        if self.max_elongation.is_nan() || self.max_elongation < 1.0 {
            return Err(format!(
                "obstacle max_elongation must be at least 1, got {}",
                self.max_elongation
            ));
        }
        if self.simplify_epsilon_px < 0.0 {
            return Err("obstacle simplify_epsilon_px must be non-negative".into());
        }
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Polarity {
    Dark,
    Bright,
}

#[derive(Clone, Debug)]
pub struct ObstacleDetector {
    options: ObstacleOptions,
}

impl ObstacleDetector {
    pub fn new(options: ObstacleOptions) -> Self {
        Self { options }
    }

    /// Obstacles of `roof`, in row-major blob order.
    pub fn detect(&self, image: &ImageF32, roof: &RoofRegion) -> Vec<Obstacle> {
        let opts = &self.options;
        let mask = &roof.mask;
        let Some((mean, std)) = image.masked_stats(mask) else {
            return Vec::new();
        };
        let roof_pixels = mask.count();

        let mut polarity = vec![None; mask.w * mask.h];
        let mut anomalies = BinaryMask::with_origin(mask.origin, mask.w, mask.h);
        let spread = (opts.k_sigma * std).max(opts.min_contrast);
        for y in 0..mask.h {
            for x in 0..mask.w {
                if !mask.get(x as isize, y as isize) {
                    continue;
                }
                let (gx, gy) = (mask.origin[0] + x, mask.origin[1] + y);
                if gx >= image.w || gy >= image.h {
                    continue;
                }
                let v = image.get(gx, gy) as f64;
                let p = if v < mean - spread {
                    Some(Polarity::Dark)
                } else if v > mean + spread {
                    Some(Polarity::Bright)
                } else {
                    None
                };
                if p.is_some() {
                    polarity[mask.idx(x, y)] = p;
                    anomalies.set(x, y, true);
                }
            }
        }
        let anomalies = morphology::open(&anomalies, opts.open_radius_px);
        if anomalies.is_blank() {
            return Vec::new();
        }

        let interior = morphology::erode_with_border(mask, opts.edge_band_px);
        let (labels, comps) = label_components(&anomalies);
        let mut in_band = vec![false; comps.len()];
        let mut dark = vec![0usize; comps.len()];
        let mut bright = vec![0usize; comps.len()];
        let mut sums = vec![0.0f64; comps.len()];
        for y in 0..mask.h {
            for x in 0..mask.w {
                let label = labels.get(x as isize, y as isize);
                if label == 0 {
                    continue;
                }
                let i = label as usize - 1;
                if !interior.get(x as isize, y as isize) {
                    in_band[i] = true;
                }
                match polarity[mask.idx(x, y)] {
                    Some(Polarity::Dark) => dark[i] += 1,
                    Some(Polarity::Bright) => bright[i] += 1,
                    None => {}
                }
                sums[i] += image.get(mask.origin[0] + x, mask.origin[1] + y) as f64;
            }
        }

        let max_pixels = opts.max_roof_fraction * roof_pixels as f64;
        let mut out = Vec::new();
        for (i, comp) in comps.iter().enumerate() {
            if in_band[i] || comp.pixel_count < opts.min_area_px {
                continue;
            }
            if comp.pixel_count as f64 > max_pixels {
                debug!(
                    "roof {:?}: blob of {} px exceeds {:.0}% of roof",
                    roof.id,
                    comp.pixel_count,
                    opts.max_roof_fraction * 100.0
                );
                continue;
            }
            if comp.elongation() > opts.max_elongation {
                continue;
            }
            let boundary = trace_outer_boundary(&labels, comp);
            if solidity(comp, &boundary) < opts.min_solidity {
                continue;
            }
            let ring = simplify_closed(&boundary, opts.simplify_epsilon_px);
            let polygon = Polygon::new(ShapeKind::Obstacle, ring);
            if polygon.len() < 3 || !polygon.is_simple() || !roof.polygon.contains_polygon(&polygon)
            {
                continue;
            }
            let kind = self.classify(comp, dark[i], bright[i], roof_pixels);
            out.push(Obstacle {
                polygon,
                kind,
                pixel_area: comp.pixel_count,
                contrast: sums[i] / comp.pixel_count as f64 - mean,
            });
        }
        debug!(
            "roof {:?}: {} blobs, {} obstacles (mean={:.3} std={:.3})",
            roof.id,
            comps.len(),
            out.len(),
            mean,
            std
        );
        out
    }

    fn classify(
        &self,
        comp: &Component,
        dark: usize,
        bright: usize,
        roof_pixels: usize,
    ) -> ObstacleKind {
        let total = (dark + bright).max(1) as f64;
        let majority = self.options.polarity_majority;
        if bright as f64 / total >= majority {
            ObstacleKind::Skylight
        } else if dark as f64 / total >= majority {
            if comp.pixel_count as f64 <= self.options.vent_max_roof_fraction * roof_pixels as f64 {
                ObstacleKind::Vent
            } else {
                ObstacleKind::Chimney
            }
        } else {
            ObstacleKind::Unknown
        }
    }
}

/// Pixel count over the area of the convex hull of the traced boundary.
fn solidity(comp: &Component, boundary: &[[f64; 2]]) -> f64 {
    let hull = Polygon::new(ShapeKind::Obstacle, boundary.to_vec()).convex_hull();
    let hull_area = hull.area();
    if hull_area <= f64::EPSILON {
        return 0.0;
    }
    comp.pixel_count as f64 / hull_area
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RegionId;

    fn roof_scene(
        w: usize,
        h: usize,
        roof: [usize; 4],
        blobs: &[([usize; 4], f32)],
    ) -> (ImageF32, RoofRegion) {
        let mut img = ImageF32::new(w, h);
        for y in roof[1]..roof[3] {
            for x in roof[0]..roof[2] {
                img.set(x, y, 0.7);
            }
        }
        for &([x0, y0, x1, y1], v) in blobs {
            for y in y0..y1 {
                for x in x0..x1 {
                    img.set(x, y, v);
                }
            }
        }
        let [x0, y0, x1, y1] = roof.map(|v| v as f64);
        let polygon = Polygon::new(
            ShapeKind::Roof,
            vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]],
        );
        let region = RoofRegion {
            id: RegionId(1),
            mask: polygon.rasterize(w, h),
            polygon,
            source_pass: "test".into(),
        };
        (img, region)
    }

    #[test]
    fn chimney_vent_and_skylight_are_tagged() {
        let (img, roof) = roof_scene(
            200,
            160,
            [20, 20, 180, 140],
            &[
                ([60, 50, 76, 66], 0.1),
                ([120, 40, 124, 44], 0.1),
                ([100, 100, 130, 115], 1.0),
            ],
        );
        let obstacles = ObstacleDetector::new(ObstacleOptions::default()).detect(&img, &roof);
        let kinds: Vec<_> = obstacles.iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![ObstacleKind::Vent, ObstacleKind::Chimney, ObstacleKind::Skylight]
        );
        assert_eq!(obstacles[1].pixel_area, 256);
        assert!((obstacles[1].polygon.area() - 256.0).abs() < 1e-9);
        assert!(obstacles[2].contrast > 0.0 && obstacles[1].contrast < 0.0);
        assert!(obstacles.iter().all(|o| roof.polygon.contains_polygon(&o.polygon)));
    }

    #[test]
    fn blobs_touching_the_roof_edge_are_ignored() {
        let (img, roof) = roof_scene(100, 100, [10, 10, 90, 90], &[([10, 40, 20, 50], 0.0)]);
        let obstacles = ObstacleDetector::new(ObstacleOptions::default()).detect(&img, &roof);
        assert!(obstacles.is_empty());
    }

    #[test]
    fn uniform_roof_has_no_obstacles() {
        let (img, roof) = roof_scene(80, 80, [10, 10, 70, 70], &[]);
        let obstacles = ObstacleDetector::new(ObstacleOptions::default()).detect(&img, &roof);
        assert!(obstacles.is_empty());
    }

    #[test]
    fn specks_below_min_area_are_noise() {
        let (img, roof) = roof_scene(100, 100, [10, 10, 90, 90], &[([50, 50, 53, 53], 0.0)]);
        let obstacles = ObstacleDetector::new(ObstacleOptions::default()).detect(&img, &roof);
        assert!(obstacles.is_empty());
    }

    #[test]
    fn blob_covering_a_large_share_of_the_roof_is_not_an_obstacle() {
        // 60x60 dark patch on a 100x100 roof: 36% of its pixels.
        let (img, roof) = roof_scene(120, 120, [10, 10, 110, 110], &[([30, 30, 90, 90], 0.1)]);
        let sensitive = ObstacleOptions {
            k_sigma: 1.0,
            ..ObstacleOptions::default()
        };
        let obstacles = ObstacleDetector::new(sensitive.clone()).detect(&img, &roof);
        assert!(obstacles.is_empty(), "{obstacles:?}");

        let unbounded = ObstacleOptions {
            max_roof_fraction: 1.0,
            ..sensitive
        };
        let obstacles = ObstacleDetector::new(unbounded).detect(&img, &roof);
        assert_eq!(obstacles.len(), 1);
        assert_eq!(obstacles[0].pixel_area, 3600);
        assert_eq!(obstacles[0].kind, ObstacleKind::Chimney);
    }

    #[test]
    fn thin_streaks_are_not_obstacles() {
        let (img, roof) = roof_scene(160, 100, [10, 10, 150, 90], &[([40, 48, 110, 52], 0.1)]);
        let obstacles = ObstacleDetector::new(ObstacleOptions::default()).detect(&img, &roof);
        assert!(obstacles.is_empty());

        let lenient = ObstacleOptions {
            max_elongation: 100.0,
            ..ObstacleOptions::default()
        };
        let obstacles = ObstacleDetector::new(lenient).detect(&img, &roof);
        assert_eq!(obstacles.len(), 1);
    }
}
