//! Multi-pass roof segmentation.
//!
//! Each [`PassSpec`] binarizes one pyramid level (Otsu on intensity or a
//! Sobel edge map), cleans the mask with square morphology, traces the outer
//! boundary of every 8-connected component and lifts it to full resolution.
//! Candidates outside the area window or degenerate after simplification are
//! dropped. The per-pass candidate lists are then folded, coarse first, into
//! the accepted list: a candidate whose own area is covered by an accepted
//! region beyond `overlap_thresh` is discarded.
//!
//! Passes are independent and run in parallel; the fold keeps pass order, so
//! the result does not depend on scheduling.

mod options;
pub mod threshold;

pub use options::{PassMode, PassSpec, SegmentationOptions};

use crate::contour::{outer_contours, simplify_closed};
use crate::diagnostics::{PassReport, SegmentationStage};
use crate::edges::{edge_mask, sobel_gradients};
use crate::geometry::{Polygon, ShapeKind};
use crate::image::{BinaryMask, ImageF32};
use crate::morphology;
use crate::pyramid::Pyramid;
use crate::types::{RegionId, RoofRegion};
use log::debug;
use rayon::prelude::*;
use std::time::Instant;
use threshold::{binarize_above, otsu_threshold};

/// Candidates of one pass, in component label order.
struct PassOutput {
    candidates: Vec<Polygon>,
    report: PassReport,
}

#[derive(Clone, Debug, Default)]
pub struct RegionSegmenter {
    options: SegmentationOptions,
}

impl RegionSegmenter {
    pub fn new(options: SegmentationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SegmentationOptions {
        &self.options
    }

    /// Segment a pyramid whose level 0 is the full-resolution image. Zero
    /// regions is a valid outcome.
    pub fn segment(&self, pyramid: &Pyramid) -> (Vec<RoofRegion>, SegmentationStage) {
        let start = Instant::now();
        let (width, height) = pyramid
            .level(0)
            .map(|l| (l.w, l.h))
            .unwrap_or((0, 0));
        let (min_area, max_area) = self.options.area_limits(width * height);
        debug!(
            "RegionSegmenter::segment w={} h={} passes={} area=[{:.1}, {:.1}]",
            width,
            height,
            self.options.passes.len(),
            min_area,
            max_area
        );

        let outputs: Vec<PassOutput> = self
            .options
            .passes
            .par_iter()
            .map(|spec| self.run_pass(pyramid, spec, min_area, max_area))
            .collect();

        let (accepted, reports) = merge_passes(outputs, self.options.overlap_thresh);

        let regions: Vec<RoofRegion> = accepted
            .into_iter()
            .enumerate()
            .map(|(i, (polygon, source_pass))| RoofRegion {
                id: RegionId(i as u32 + 1),
                mask: polygon.rasterize(width, height),
                polygon,
                source_pass,
            })
            .collect();

        let stage = SegmentationStage {
            min_area_px: min_area,
            max_area_px: max_area,
            passes: reports,
            regions: regions.len(),
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        debug!(
            "RegionSegmenter::segment regions={} degenerate={}",
            stage.regions,
            stage.degenerate_total()
        );
        (regions, stage)
    }

    fn run_pass(
        &self,
        pyramid: &Pyramid,
        spec: &PassSpec,
        min_area: f64,
        max_area: f64,
    ) -> PassOutput {
        let start = Instant::now();
        let mut report = PassReport::empty(&spec.name, spec.level, spec.mode);
        let Some(level) = pyramid.level(spec.level) else {
            debug!("segment pass {} skipped: level {} missing", spec.name, spec.level);
            return PassOutput {
                candidates: Vec::new(),
                report,
            };
        };
        report.level_width = level.w;
        report.level_height = level.h;

        let (lo, hi) = level.min_max();
        if hi - lo < self.options.min_contrast {
            debug!(
                "segment pass {} skipped: contrast {:.3} below {:.3}",
                spec.name,
                hi - lo,
                self.options.min_contrast
            );
            report.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            return PassOutput {
                candidates: Vec::new(),
                report,
            };
        }

        let Some((mask, threshold)) = self.binarize(level, spec.mode) else {
            report.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            return PassOutput {
                candidates: Vec::new(),
                report,
            };
        };
        report.skipped = false;
        report.threshold = Some(threshold);

        let scale = Pyramid::scale_to_full(spec.level);
        let min_pixels = ((min_area / (scale * scale)).floor() as usize).max(1);
        let contours = outer_contours(&mask, min_pixels, usize::MAX);
        report.components = contours.len();

        let mut candidates = Vec::new();
        for contour in contours {
            let lifted: Vec<_> = contour
                .boundary
                .iter()
                .map(|p| [p[0] * scale, p[1] * scale])
                .collect();
            let ring = simplify_closed(&lifted, self.options.simplify_epsilon_px);
            let polygon = Polygon::new(ShapeKind::Roof, ring);
            let area = polygon.area();
            if polygon.len() < 3 || area <= f64::EPSILON || !polygon.is_simple() {
                report.degenerate += 1;
                continue;
            }
            if area < min_area || area > max_area {
                report.rejected_area += 1;
                continue;
            }
            candidates.push(polygon);
        }
        report.candidates = candidates.len();
        report.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "segment pass {} level={} components={} candidates={} degenerate={} rejected_area={}",
            spec.name,
            spec.level,
            report.components,
            report.candidates,
            report.degenerate,
            report.rejected_area
        );
        PassOutput { candidates, report }
    }

    /// Foreground mask after morphology, plus the threshold used.
    fn binarize(&self, level: &ImageF32, mode: PassMode) -> Option<(BinaryMask, f32)> {
        match mode {
            PassMode::Intensity => {
                let t = otsu_threshold(level)?;
                let raw = binarize_above(level, t);
                let closed = morphology::close(&raw, self.options.close_radius_px);
                Some((morphology::open(&closed, self.options.open_radius_px), t))
            }
            PassMode::Edges => {
                let grad = sobel_gradients(level);
                let max = grad.mag.data.iter().copied().fold(0.0f32, f32::max);
                let raw = edge_mask(&grad, self.options.edge_threshold);
                if raw.is_blank() {
                    return None;
                }
                // Edge lines are only a few pixels wide; opening would erase
                // them, so this pass only bridges gaps.
                let closed = morphology::close(&raw, self.options.close_radius_px + 1);
                Some((closed, self.options.edge_threshold * max))
            }
        }
    }
}

/// Fold per-pass candidates into the accepted list in pass order.
fn merge_passes(
    outputs: Vec<PassOutput>,
    overlap_thresh: f64,
) -> (Vec<(Polygon, String)>, Vec<PassReport>) {
    outputs.into_iter().fold(
        (Vec::new(), Vec::new()),
        |(mut accepted, mut reports), PassOutput { candidates, mut report }| {
            for candidate in candidates {
                let covered = accepted
                    .iter()
                    .map(|(a, _): &(Polygon, String)| candidate.overlap_fraction(a))
                    .fold(0.0f64, f64::max);
                if covered > overlap_thresh {
                    report.merged_away += 1;
                } else {
                    report.accepted += 1;
                    accepted.push((candidate, report.name.clone()));
                }
            }
            reports.push(report);
            (accepted, reports)
        },
    )
}

/// Convenience wrapper building the default pyramid for `image`.
pub fn segment_image(
    image: ImageF32,
    options: &SegmentationOptions,
) -> (Vec<RoofRegion>, SegmentationStage) {
    let pyramid = Pyramid::build(
        image,
        &crate::pyramid::PyramidOptions::new(options.deepest_level() + 1),
    );
    RegionSegmenter::new(options.clone()).segment(&pyramid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(w: usize, h: usize, rects: &[([usize; 4], f32)]) -> ImageF32 {
        let mut img = ImageF32::new(w, h);
        for &([x0, y0, x1, y1], v) in rects {
            for y in y0..y1 {
                for x in x0..x1 {
                    img.set(x, y, v);
                }
            }
        }
        img
    }

    #[test]
    fn single_bright_rectangle_becomes_one_region() {
        let img = scene(200, 160, &[([40, 30, 160, 120], 0.9)]);
        let (regions, stage) = segment_image(img, &SegmentationOptions::default());
        assert_eq!(regions.len(), 1);
        let roof = &regions[0];
        assert_eq!(roof.id, RegionId(1));
        assert_eq!(roof.source_pass, "coarse-intensity");
        let area = roof.polygon.area();
        assert!((area - 120.0 * 90.0).abs() / (120.0 * 90.0) < 0.05, "area {area}");
        // Finer passes found the same roof and were merged away.
        assert!(stage.passes[1].merged_away >= 1);
        assert_eq!(stage.regions, 1);
    }

    #[test]
    fn blank_image_yields_no_regions() {
        let img = scene(64, 64, &[]);
        let (regions, stage) = segment_image(img, &SegmentationOptions::default());
        assert!(regions.is_empty());
        assert!(stage.passes.iter().all(|p| p.skipped));
    }

    #[test]
    fn specks_below_minimum_area_are_rejected() {
        // 400x400 => min area 160 px²; the 6x6 speck is far below.
        let img = scene(
            400,
            400,
            &[([50, 50, 250, 200], 0.8), ([320, 320, 326, 326], 0.8)],
        );
        let opts = SegmentationOptions {
            passes: vec![PassSpec::new("fine", 0, PassMode::Intensity)],
            ..SegmentationOptions::default()
        };
        let (regions, _) = segment_image(img, &opts);
        assert_eq!(regions.len(), 1);
    }

    #[test]
    fn two_separate_roofs_keep_row_major_order() {
        let img = scene(
            240,
            120,
            &[([130, 20, 220, 100], 0.85), ([10, 40, 100, 110], 0.85)],
        );
        let (regions, _) = segment_image(img, &SegmentationOptions::default());
        assert_eq!(regions.len(), 2);
        // The right roof starts on an earlier row, so it is labelled first.
        assert!(regions[0].polygon.centroid()[0] > regions[1].polygon.centroid()[0]);
        assert_eq!(regions[1].id, RegionId(2));
    }

    #[test]
    fn pinched_outline_is_counted_as_degenerate() {
        // Two squares meeting at one corner form a single 8-connected blob
        // whose traced ring touches itself at (100, 100).
        let img = scene(
            200,
            200,
            &[([40, 40, 100, 100], 0.9), ([100, 100, 160, 160], 0.9)],
        );
        let opts = SegmentationOptions {
            passes: vec![PassSpec::new("fine", 0, PassMode::Intensity)],
            close_radius_px: 0,
            open_radius_px: 0,
            ..SegmentationOptions::default()
        };
        let (regions, stage) = segment_image(img, &opts);
        assert!(regions.is_empty());
        let pass = &stage.passes[0];
        assert!(!pass.skipped);
        assert_eq!(pass.components, 1);
        assert_eq!(pass.degenerate, 1);
        assert_eq!(pass.candidates, 0);
        assert_eq!(stage.degenerate_total(), 1);
    }

    #[test]
    fn dark_low_contrast_roof_is_found_by_edges() {
        // Roof 0.1 darker than the ground: the bright class is the ground,
        // whose outline is the whole frame and fails the area window.
        let img = scene(
            200,
            200,
            &[([0, 0, 200, 200], 0.65), ([80, 80, 120, 120], 0.55)],
        );
        let (regions, stage) = segment_image(img, &SegmentationOptions::default());
        assert_eq!(regions.len(), 1);
        let roof = &regions[0];
        assert_eq!(roof.source_pass, "fine-edges");
        let area = roof.polygon.area();
        assert!((1600.0..2200.0).contains(&area), "area {area}");
        let c = roof.polygon.centroid();
        assert!((c[0] - 100.0).abs() < 2.0 && (c[1] - 100.0).abs() < 2.0, "{c:?}");

        for pass in &stage.passes[..2] {
            assert!(!pass.skipped, "{}", pass.name);
            assert_eq!(pass.candidates, 0, "{}", pass.name);
            assert!(pass.rejected_area >= 1, "{}", pass.name);
        }
        assert_eq!(stage.passes[2].accepted, 1);
    }

    #[test]
    fn region_mask_matches_polygon() {
        let img = scene(100, 100, &[([20, 20, 70, 60], 1.0)]);
        let (regions, _) = segment_image(img, &SegmentationOptions::default());
        let roof = &regions[0];
        assert_eq!(roof.mask.count(), roof.polygon.pixel_area());
    }
}
