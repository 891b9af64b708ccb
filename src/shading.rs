//! Image-local shading proxy.
//!
//! Three cues from the roof pixels, each in `[0, 1]`:
//! - dark fraction: share of pixels below `dark_ratio × roof mean`,
//! - variation: coefficient of variation of the roof intensity,
//! - ring: how much darker the roof is than the band of `ring_px` pixels
//!   around it.
//!
//! `score = clamp(1 − w_dark·dark − w_var·var − w_ring·ring)`. There is no
//! sun-position model; the weights are empirical.
use crate::image::{BinaryMask, ImageF32};
use crate::morphology::dilate;
use crate::types::RoofRegion;
use serde::{Deserialize, Serialize};

/// Score reported when the roof mask covers no pixels.
pub const NEUTRAL_SHADING: f64 = 0.5;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingOptions {
    pub dark_ratio: f64,
    pub ring_px: usize,
    pub dark_weight: f64,
    pub variation_weight: f64,
    pub ring_weight: f64,
}

impl Default for ShadingOptions {
    fn default() -> Self {
        Self {
            dark_ratio: 0.6,
            ring_px: 6,
            dark_weight: 0.6,
            variation_weight: 0.5,
            ring_weight: 0.3,
        }
    }
}

impl ShadingOptions {
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            self.dark_ratio,
            self.dark_weight,
            self.variation_weight,
            self.ring_weight,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("shading ratios and weights must be finite and non-negative".into());
        }
        Ok(())
    }
}

/// Individual cues behind a shading score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadingCues {
    pub dark_fraction: f64,
    pub variation: f64,
    pub ring_contrast: f64,
}

#[derive(Clone, Debug, Default)]
pub struct ShadingEstimator {
    options: ShadingOptions,
}

impl ShadingEstimator {
    pub fn new(options: ShadingOptions) -> Self {
        Self { options }
    }

    /// Score in `[0, 1]`, 1 = unshaded. Deterministic in the input pixels.
    pub fn estimate(&self, image: &ImageF32, roof: &RoofRegion) -> f64 {
        match self.cues(image, &roof.mask) {
            Some(cues) => self.score(&cues),
            None => NEUTRAL_SHADING,
        }
    }

    pub fn score(&self, cues: &ShadingCues) -> f64 {
        let o = &self.options;
        (1.0 - o.dark_weight * cues.dark_fraction
            - o.variation_weight * cues.variation
            - o.ring_weight * cues.ring_contrast)
            .clamp(0.0, 1.0)
    }

    pub fn cues(&self, image: &ImageF32, mask: &BinaryMask) -> Option<ShadingCues> {
        let (mean, std) = image.masked_stats(mask)?;
        let n = image.masked_values(mask).count() as f64;
        let cut = self.options.dark_ratio * mean;
        let dark = image.masked_values(mask).filter(|&v| v < cut).count() as f64;
        let variation = if mean > f64::EPSILON {
            (std / mean).min(1.0)
        } else {
            1.0
        };
        let ring_contrast = ring_mean(image, mask, self.options.ring_px)
            .filter(|&ring| ring > f64::EPSILON)
            .map_or(0.0, |ring| ((ring - mean) / ring).clamp(0.0, 1.0));
        Some(ShadingCues {
            dark_fraction: dark / n,
            variation,
            ring_contrast,
        })
    }
}

/// Mean intensity of the band of width `ring_px` around `mask`, clipped to
/// the image.
fn ring_mean(image: &ImageF32, mask: &BinaryMask, ring_px: usize) -> Option<f64> {
    if ring_px == 0 {
        return None;
    }
    let x0 = mask.origin[0].saturating_sub(ring_px);
    let y0 = mask.origin[1].saturating_sub(ring_px);
    let x1 = (mask.origin[0] + mask.w + ring_px).min(image.w);
    let y1 = (mask.origin[1] + mask.h + ring_px).min(image.h);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    let mut canvas = BinaryMask::with_origin([x0, y0], x1 - x0, y1 - y0);
    for (gx, gy) in mask.iter_set() {
        if gx >= x0 && gx < x1 && gy >= y0 && gy < y1 {
            canvas.set(gx - x0, gy - y0, true);
        }
    }
    let ring = dilate(&canvas, ring_px).subtract(mask);
    let (sum, n) = image
        .masked_values(&ring)
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Polygon, ShapeKind};
    use crate::types::RegionId;

    fn region(w: usize, h: usize, r: [f64; 4]) -> RoofRegion {
        let polygon = Polygon::new(
            ShapeKind::Roof,
            vec![[r[0], r[1]], [r[2], r[1]], [r[2], r[3]], [r[0], r[3]]],
        );
        RoofRegion {
            id: RegionId(1),
            mask: polygon.rasterize(w, h),
            polygon,
            source_pass: "test".into(),
        }
    }

    fn fill(img: &mut ImageF32, r: [usize; 4], v: f32) {
        for y in r[1]..r[3] {
            for x in r[0]..r[2] {
                img.set(x, y, v);
            }
        }
    }

    #[test]
    fn uniform_bright_roof_is_unshaded() {
        let mut img = ImageF32::new(60, 60);
        fill(&mut img, [10, 10, 50, 50], 0.8);
        let roof = region(60, 60, [10.0, 10.0, 50.0, 50.0]);
        let score = ShadingEstimator::default().estimate(&img, &roof);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cast_shadow_lowers_score() {
        let mut img = ImageF32::new(60, 60);
        fill(&mut img, [10, 10, 50, 50], 0.8);
        fill(&mut img, [10, 10, 30, 50], 0.2);
        let roof = region(60, 60, [10.0, 10.0, 50.0, 50.0]);
        let estimator = ShadingEstimator::default();
        let cues = estimator.cues(&img, &roof.mask).expect("cues");
        assert!((cues.dark_fraction - 0.5).abs() < 1e-9);
        let score = estimator.estimate(&img, &roof);
        assert!(score < 0.6, "score {score}");
    }

    #[test]
    fn roof_darker_than_surroundings_is_penalised() {
        let mut img = ImageF32::new(60, 60);
        fill(&mut img, [0, 0, 60, 60], 0.9);
        fill(&mut img, [10, 10, 50, 50], 0.45);
        let roof = region(60, 60, [10.0, 10.0, 50.0, 50.0]);
        let estimator = ShadingEstimator::default();
        let cues = estimator.cues(&img, &roof.mask).expect("cues");
        assert!((cues.ring_contrast - 0.5).abs() < 1e-6);
        assert!((estimator.estimate(&img, &roof) - 0.85).abs() < 1e-6);
    }

    #[test]
    fn empty_mask_is_neutral() {
        let img = ImageF32::new(10, 10);
        let roof = region(10, 10, [20.0, 20.0, 30.0, 30.0]);
        assert_eq!(ShadingEstimator::default().estimate(&img, &roof), NEUTRAL_SHADING);
    }
}
