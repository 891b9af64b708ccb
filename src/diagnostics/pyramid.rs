use crate::image::traits::ImageView;
use crate::pyramid::Pyramid;
use serde::Serialize;

/// Size and intensity range of one pyramid level.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PyramidLevelReport {
    pub level_index: usize,
    pub width: usize,
    pub height: usize,
    pub mean_intensity: f32,
    /// `max - min`; passes on levels below the segmenter's minimum contrast
    /// are skipped.
    pub contrast: f32,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PyramidStage {
    pub elapsed_ms: f64,
    pub levels: Vec<PyramidLevelReport>,
}

impl PyramidStage {
    pub fn from_pyramid(pyramid: &Pyramid, elapsed_ms: f64) -> Self {
        let levels = pyramid
            .levels
            .iter()
            .enumerate()
            .map(|(level_index, lvl)| {
                let sum: f32 = lvl.rows().map(|r| r.iter().sum::<f32>()).sum();
                let (lo, hi) = lvl.min_max();
                PyramidLevelReport {
                    level_index,
                    width: lvl.w,
                    height: lvl.h,
                    mean_intensity: sum / lvl.pixel_count().max(1) as f32,
                    contrast: hi - lo,
                }
            })
            .collect();
        Self { elapsed_ms, levels }
    }
}
