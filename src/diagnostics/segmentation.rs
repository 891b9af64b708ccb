use crate::segmentation::PassMode;
use serde::Serialize;

/// Statistics for one segmentation pass.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    pub name: String,
    pub level: usize,
    pub mode: PassMode,
    pub level_width: usize,
    pub level_height: usize,
    /// Otsu threshold (intensity passes) or absolute magnitude cut (edge passes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,
    /// The level was missing or had no usable contrast.
    pub skipped: bool,
    pub components: usize,
    pub degenerate: usize,
    pub rejected_area: usize,
    pub candidates: usize,
    pub accepted: usize,
    pub merged_away: usize,
    pub elapsed_ms: f64,
}

impl PassReport {
    pub fn empty(name: &str, level: usize, mode: PassMode) -> Self {
        Self {
            name: name.to_string(),
            level,
            mode,
            level_width: 0,
            level_height: 0,
            threshold: None,
            skipped: true,
            components: 0,
            degenerate: 0,
            rejected_area: 0,
            candidates: 0,
            accepted: 0,
            merged_away: 0,
            elapsed_ms: 0.0,
        }
    }
}

/// Segmenter trace: area limits in full-resolution px² plus per-pass stats.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationStage {
    pub min_area_px: f64,
    pub max_area_px: f64,
    pub passes: Vec<PassReport>,
    pub regions: usize,
    pub elapsed_ms: f64,
}

impl SegmentationStage {
    pub fn degenerate_total(&self) -> usize {
        self.passes.iter().map(|p| p.degenerate).sum()
    }
}
