//! Global Otsu thresholding on normalised intensities.
use crate::image::{BinaryMask, ImageF32};

const BINS: usize = 256;

/// Otsu threshold of a `[0, 1]` image: the returned value separates the two
/// classes with maximal between-class variance; foreground is `> t`.
/// `None` when the image holds a single intensity bin.
pub fn otsu_threshold(img: &ImageF32) -> Option<f32> {
    if img.data.is_empty() {
        return None;
    }
    let mut hist = [0u64; BINS];
    for &v in &img.data {
        hist[bin_of(v)] += 1;
    }
    let total = img.data.len() as f64;
    let sum_all: f64 = hist.iter().enumerate().map(|(i, &c)| i as f64 * c as f64).sum();

    // Plateau of maximal variance as (first, last, value); the threshold is
    // its midpoint so empty histogram gaps do not bias it toward one class.
    let mut best: Option<(usize, usize, f64)> = None;
    let mut w_bg = 0.0;
    let mut sum_bg = 0.0;
    for (t, &count) in hist.iter().enumerate().take(BINS - 1) {
        w_bg += count as f64;
        sum_bg += t as f64 * count as f64;
        let w_fg = total - w_bg;
        if w_bg == 0.0 || w_fg == 0.0 {
            continue;
        }
        let mean_bg = sum_bg / w_bg;
        let mean_fg = (sum_all - sum_bg) / w_fg;
        let between = w_bg * w_fg * (mean_bg - mean_fg).powi(2);
        best = match best {
            Some((first, _, b)) if (between - b).abs() <= 1e-9 * b => Some((first, t, b)),
            Some((_, _, b)) if between <= b => best,
            _ => Some((t, t, between)),
        };
    }
    best.map(|(first, last, _)| ((first + last) as f32 * 0.5 + 0.5) / (BINS - 1) as f32)
}

#[inline]
fn bin_of(v: f32) -> usize {
    ((v.clamp(0.0, 1.0) * (BINS - 1) as f32).round() as usize).min(BINS - 1)
}

/// Foreground where `img > threshold`.
pub fn binarize_above(img: &ImageF32, threshold: f32) -> BinaryMask {
    let mut mask = BinaryMask::new(img.w, img.h);
    for (dst, &v) in mask.data.iter_mut().zip(&img.data) {
        *dst = (v > threshold) as u8;
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bimodal_image_splits_between_modes() {
        let mut img = ImageF32::new(10, 10);
        for (i, px) in img.data.iter_mut().enumerate() {
            *px = if i < 30 { 0.8 } else { 0.2 };
        }
        let t = otsu_threshold(&img).expect("threshold");
        assert!(t > 0.2 && t < 0.8, "t = {t}");
        assert_eq!(binarize_above(&img, t).count(), 30);
    }

    #[test]
    fn flat_image_has_no_threshold() {
        let img = ImageF32::new(4, 4);
        assert!(otsu_threshold(&img).is_none());
    }
}
