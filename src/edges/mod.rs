//! Gradient-based edge maps for the segmenter's edge pass.
//!
//! Sobel gradients are computed with border clamping; the edge map keeps
//! pixels whose magnitude exceeds a fraction of the strongest response.

pub mod grad;

pub use grad::{sobel_gradients, Grad};

use crate::image::BinaryMask;

/// Binary edge map: `mag >= rel_threshold * max(mag)`. A flat image (no
/// gradient at all) yields an empty map.
pub fn edge_mask(grad: &Grad, rel_threshold: f32) -> BinaryMask {
    let mut mask = BinaryMask::new(grad.mag.w, grad.mag.h);
    let max = grad.mag.data.iter().copied().fold(0.0f32, f32::max);
    if max <= f32::EPSILON {
        return mask;
    }
    let cut = rel_threshold.clamp(0.0, 1.0) * max;
    for (dst, &m) in mask.data.iter_mut().zip(&grad.mag.data) {
        *dst = (m >= cut && m > 0.0) as u8;
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageF32;

    #[test]
    fn step_edge_marks_the_transition_columns() {
        let mut img = ImageF32::new(8, 4);
        for y in 0..4 {
            for x in 4..8 {
                img.set(x, y, 1.0);
            }
        }
        let mask = edge_mask(&sobel_gradients(&img), 0.5);
        for y in 0..4 {
            let row: Vec<u8> = (0..8).map(|x| mask.data[mask.idx(x, y)]).collect();
            assert_eq!(row, vec![0, 0, 1, 1, 0, 0, 0, 0]);
        }
    }

    #[test]
    fn flat_image_has_no_edges() {
        let img = ImageF32::new(5, 5);
        assert!(edge_mask(&sobel_gradients(&img), 0.1).is_blank());
    }
}
