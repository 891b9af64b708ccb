use serde::{Deserialize, Serialize};

/// How a pass turns a pyramid level into a foreground mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PassMode {
    /// Otsu threshold on intensity; the bright class is foreground.
    Intensity,
    /// Sobel magnitude above `edge_threshold` of the level maximum.
    Edges,
}

/// One binarization/scale combination of the segmenter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PassSpec {
    pub name: String,
    /// Pyramid level, 0 = full resolution.
    pub level: usize,
    pub mode: PassMode,
}

impl PassSpec {
    pub fn new(name: impl Into<String>, level: usize, mode: PassMode) -> Self {
        Self {
            name: name.into(),
            level,
            mode,
        }
    }
}

/// Knobs of the region segmenter. Area limits are fractions of the image
/// pixel count so they follow the input resolution.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationOptions {
    /// Passes in merge order, coarse first.
    pub passes: Vec<PassSpec>,
    pub min_area_frac: f64,
    /// Absolute lower bound on the minimum area (px²).
    pub min_area_floor_px: f64,
    pub max_area_frac: f64,
    /// Images with fewer pixels use `small_image_min_area_frac` instead.
    pub small_image_px: usize,
    pub small_image_min_area_frac: f64,
    /// A later candidate is dropped when more than this fraction of its own
    /// area is covered by an accepted region.
    pub overlap_thresh: f64,
    /// Levels whose intensity range is below this (in `[0, 1]` units) yield
    /// no candidates.
    pub min_contrast: f32,
    pub close_radius_px: usize,
    pub open_radius_px: usize,
    pub edge_threshold: f32,
    /// Douglas–Peucker tolerance in full-resolution pixels.
    pub simplify_epsilon_px: f64,
}

impl Default for SegmentationOptions {
    fn default() -> Self {
        Self {
            passes: vec![
                PassSpec::new("coarse-intensity", 1, PassMode::Intensity),
                PassSpec::new("fine-intensity", 0, PassMode::Intensity),
                PassSpec::new("fine-edges", 0, PassMode::Edges),
            ],
            min_area_frac: 0.001,
            min_area_floor_px: 64.0,
            max_area_frac: 0.95,
            small_image_px: 10_000,
            small_image_min_area_frac: 0.01,
            overlap_thresh: 0.5,
            min_contrast: 0.08,
            close_radius_px: 2,
            open_radius_px: 1,
            edge_threshold: 0.25,
            simplify_epsilon_px: 1.5,
        }
    }
}

impl SegmentationOptions {
    /// `(min_area, max_area)` in full-resolution px² for an image of
    /// `pixel_count` pixels.
    pub fn area_limits(&self, pixel_count: usize) -> (f64, f64) {
        let n = pixel_count as f64;
        let normal_min = (self.min_area_frac * n).max(self.min_area_floor_px);
        // The small-image rule only ever relaxes the minimum.
        let min_area = if pixel_count < self.small_image_px {
            (self.small_image_min_area_frac * n).min(normal_min)
        } else {
            normal_min
        };
        (min_area, self.max_area_frac * n)
    }

    /// Deepest pyramid level any pass reads.
    pub fn deepest_level(&self) -> usize {
        self.passes.iter().map(|p| p.level).max().unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.passes.is_empty() {
            return Err("segmentation needs at least one pass".into());
        }
        if !(0.0..=1.0).contains(&self.min_area_frac)
            || !(0.0..=1.0).contains(&self.small_image_min_area_frac)
            || !(0.0..=1.0).contains(&self.max_area_frac)
        {
            return Err("segmentation area fractions must lie in [0, 1]".into());
        }
        if self.min_area_floor_px < 0.0 {
            return Err("min_area_floor_px must be non-negative".into());
        }
        if !(0.0..=1.0).contains(&self.overlap_thresh) {
            return Err(format!(
                "overlap_thresh must lie in [0, 1], got {}",
                self.overlap_thresh
            ));
        }
        if !(0.0..=1.0).contains(&self.edge_threshold) || self.min_contrast < 0.0 {
            return Err("edge_threshold must lie in [0, 1] and min_contrast be non-negative".into());
        }
        if self.simplify_epsilon_px < 0.0 {
            return Err("simplify_epsilon_px must be non-negative".into());
        }
        Ok(())
    }
}
