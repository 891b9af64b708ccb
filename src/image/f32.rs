//! Owned single-channel f32 image in row-major layout (stride == width).
//!
//! Pyramid levels and gradient magnitudes live here. Intensities converted
//! from 8-bit input are normalised to `[0, 1]`.
use super::mask::BinaryMask;
use super::u8::ImageU8;
use crate::image::traits::ImageView;

#[derive(Clone, Debug)]
pub struct ImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Number of f32 elements between consecutive rows (equals `w`)
    pub stride: usize,
    /// Backing storage in row-major order
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![0.0; w * h],
        }
    }

    /// Normalise an 8-bit view into `[0, 1]`.
    pub fn from_u8(gray: &ImageU8<'_>) -> Self {
        let mut out = Self::new(gray.w, gray.h);
        for y in 0..gray.h {
            let src = gray.row(y);
            let start = y * out.stride;
            for (dst, &px) in out.data[start..start + gray.w].iter_mut().zip(src) {
                *dst = px as f32 / 255.0;
            }
        }
        out
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Minimum and maximum intensity, `(0, 0)` for an empty image.
    pub fn min_max(&self) -> (f32, f32) {
        if self.data.is_empty() {
            return (0.0, 0.0);
        }
        self.data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Intensities under the set pixels of `mask` (full-image coordinates);
    /// mask pixels outside the image are skipped.
    pub fn masked_values<'a>(&'a self, mask: &'a BinaryMask) -> impl Iterator<Item = f64> + 'a {
        mask.iter_set()
            .filter(move |&(x, y)| x < self.w && y < self.h)
            .map(move |(x, y)| self.get(x, y) as f64)
    }

    /// Mean and population standard deviation under `mask`, `None` when the
    /// mask covers no pixel of the image.
    pub fn masked_stats(&self, mask: &BinaryMask) -> Option<(f64, f64)> {
        let (n, sum) = self
            .masked_values(mask)
            .fold((0usize, 0.0), |(n, s), v| (n + 1, s + v));
        if n == 0 {
            return None;
        }
        let mean = sum / n as f64;
        let var = self
            .masked_values(mask)
            .map(|v| (v - mean) * (v - mean))
            .sum::<f64>()
            / n as f64;
        Some((mean, var.sqrt()))
    }
}

impl crate::image::traits::ImageView for ImageF32 {
    type Pixel = f32;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

impl crate::image::traits::ImageViewMut for ImageF32 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let start = y * self.stride;
        let end = start + self.w;
        &mut self.data[start..end]
    }
}
