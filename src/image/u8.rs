use crate::error::{AnalysisError, AnalysisResult};

/// Borrowed 8-bit grayscale raster as decoded by the caller.
#[derive(Clone, Debug)]
pub struct ImageU8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // bytes between rows
    pub data: &'a [u8],
}

impl<'a> ImageU8<'a> {
    /// Tightly packed view (`stride == w`).
    pub fn new(w: usize, h: usize, data: &'a [u8]) -> Self {
        Self {
            w,
            h,
            stride: w,
            data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    /// Reject empty, truncated or inconsistently strided buffers.
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.w == 0 || self.h == 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "image dimensions must be positive, got {}x{}",
                self.w, self.h
            )));
        }
        if self.stride < self.w {
            return Err(AnalysisError::InvalidInput(format!(
                "stride {} is smaller than width {}",
                self.stride, self.w
            )));
        }
        let required = (self.h - 1)
            .checked_mul(self.stride)
            .and_then(|n| n.checked_add(self.w))
            .ok_or_else(|| {
                AnalysisError::InvalidInput(format!(
                    "{}x{} image with stride {} overflows the address space",
                    self.w, self.h, self.stride
                ))
            })?;
        if self.data.len() < required {
            return Err(AnalysisError::InvalidInput(format!(
                "pixel buffer holds {} bytes, {}x{} (stride {}) needs {}",
                self.data.len(),
                self.w,
                self.h,
                self.stride,
                required
            )));
        }
        Ok(())
    }
}

impl<'a> crate::image::traits::ImageView for ImageU8<'a> {
    type Pixel = u8;

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
    fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_zero_and_short_buffers() {
        let data = vec![0u8; 12];
        assert!(ImageU8::new(4, 3, &data).validate().is_ok());
        assert!(ImageU8::new(0, 3, &data).validate().is_err());
        assert!(ImageU8::new(4, 4, &data).validate().is_err());
        let bad_stride = ImageU8 {
            w: 4,
            h: 3,
            stride: 2,
            data: &data,
        };
        assert!(bad_stride.validate().is_err());
    }

    #[test]
    fn validate_rejects_overflowing_dimensions() {
        let data = vec![0u8; 16];
        let huge = ImageU8 {
            w: 4,
            h: usize::MAX,
            stride: 4,
            data: &data,
        };
        assert!(matches!(huge.validate(), Err(AnalysisError::InvalidInput(_))));
        let wide = ImageU8 {
            w: usize::MAX,
            h: 2,
            stride: usize::MAX,
            data: &data,
        };
        assert!(matches!(wide.validate(), Err(AnalysisError::InvalidInput(_))));
    }
}
