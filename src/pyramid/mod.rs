//! Grayscale image pyramid with separable blur and 2× decimation.
//!
//! Level 0 is the full-resolution image normalised to `[0, 1]`. Each further
//! level blurs the previous one with a separable filter (Gaussian by default)
//! and keeps every other row and column. Border samples clamp to the image
//! extents. The segmenter runs its coarse passes on level 1 and scales the
//! traced boundaries back by `scale_to_full`.

pub mod filters;

use crate::image::{ImageF32, ImageView, ImageViewMut};
use filters::{SeparableFilter, GAUSSIAN_5TAP, IDENTITY};
use serde::{Deserialize, Serialize};

/// Options controlling pyramid construction.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PyramidOptions {
    /// Number of pyramid levels (>= 1).
    pub levels: usize,
    /// Number of initial downscale steps that blur before decimating.
    /// `0` decimates without filtering.
    pub blur_levels: usize,
    #[serde(skip)]
    pub filter: SeparableFilter,
}

impl Default for PyramidOptions {
    fn default() -> Self {
        Self {
            levels: 2,
            blur_levels: 2,
            filter: GAUSSIAN_5TAP,
        }
    }
}

impl PyramidOptions {
    pub fn new(levels: usize) -> Self {
        Self {
            levels,
            blur_levels: levels,
            ..Self::default()
        }
    }

    pub fn with_blur_levels(mut self, blur_levels: usize) -> Self {
        self.blur_levels = blur_levels;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct Pyramid {
    pub levels: Vec<ImageF32>,
}

impl Pyramid {
    /// Build from a normalised level-0 image. At least one level is always
    /// produced.
    pub fn build(level0: ImageF32, options: &PyramidOptions) -> Self {
        let count = options.levels.max(1);
        let mut levels = Vec::with_capacity(count);
        levels.push(level0);

        let mut horiz_cache = Vec::new();
        let mut cached_rows = Vec::new();
        for lvl in 1..count {
            let prev = &levels[lvl - 1];
            if prev.w < 2 || prev.h < 2 {
                break;
            }
            let mut down = ImageF32::new(prev.w.div_ceil(2), prev.h.div_ceil(2));
            let filter = if lvl <= options.blur_levels {
                options.filter
            } else {
                IDENTITY
            };
            downsample(prev, &mut down, filter, &mut horiz_cache, &mut cached_rows);
            levels.push(down);
        }
        Self { levels }
    }

    pub fn level(&self, index: usize) -> Option<&ImageF32> {
        self.levels.get(index)
    }

    /// Factor mapping level coordinates back to level 0.
    pub fn scale_to_full(index: usize) -> f64 {
        (1u64 << index.min(30)) as f64
    }
}

fn downsample(
    src: &ImageF32,
    dst: &mut ImageF32,
    filter: SeparableFilter,
    horiz_cache: &mut Vec<f32>,
    cached_rows: &mut Vec<isize>,
) {
    if src.w == 0 || src.h == 0 || dst.w == 0 || dst.h == 0 {
        return;
    }
    let taps = filter.taps();
    let radius = filter.radius();
    let taps_len = taps.len();
    let cache_width = dst.w;

    horiz_cache.clear();
    horiz_cache.resize(cache_width * taps_len, 0.0);
    cached_rows.clear();
    cached_rows.resize(taps_len, -1);

    for y in 0..dst.h {
        let center_sy = (y * 2) as isize;
        for ky in 0..taps_len {
            let sy = clamp_index(center_sy + ky as isize - radius as isize, src.h) as isize;
            if cached_rows[ky] != sy {
                let cache_row = &mut horiz_cache[ky * cache_width..(ky + 1) * cache_width];
                filter_row_downsample(src.row(sy as usize), cache_row, taps, radius);
                cached_rows[ky] = sy;
            }
        }
        let dst_row = dst.row_mut(y);
        for (x, dst_px) in dst_row.iter_mut().enumerate() {
            *dst_px = taps
                .iter()
                .enumerate()
                .map(|(ky, tap)| tap * horiz_cache[ky * cache_width + x])
                .sum();
        }
    }
}

fn filter_row_downsample(row: &[f32], out: &mut [f32], taps: &[f32], radius: usize) {
    let max_x = row.len();
    for (i, dst_px) in out.iter_mut().enumerate() {
        let sx = (i * 2) as isize;
        *dst_px = taps
            .iter()
            .enumerate()
            .map(|(k, tap)| tap * row[clamp_index(sx + k as isize - radius as isize, max_x)])
            .sum();
    }
}

fn clamp_index(idx: isize, upper: usize) -> usize {
    if idx < 0 {
        0
    } else {
        (idx as usize).min(upper.saturating_sub(1))
    }
}
