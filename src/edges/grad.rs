//! Sobel image gradients with magnitude.
//!
//! - Convolves the 3×3 kernel pair (`X` and `Y`) with border clamping.
//! - Outputs per-pixel `gx`, `gy`, `mag = sqrt(gx^2+gy^2)`.
//!
//! Complexity: O(W·H); memory: three float buffers.
use crate::image::{ImageF32, ImageView, ImageViewMut};

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Per-pixel gradient buffers.
#[derive(Clone, Debug)]
pub struct Grad {
    /// Horizontal derivative (convolution with kernel X)
    pub gx: ImageF32,
    /// Vertical derivative (convolution with kernel Y)
    pub gy: ImageF32,
    /// Euclidean magnitude per pixel
    pub mag: ImageF32,
}

/// Compute Sobel gradients on a single-channel float image.
pub fn sobel_gradients(l: &ImageF32) -> Grad {
    let (w, h) = (l.w, l.h);
    let mut gx = ImageF32::new(w, h);
    let mut gy = ImageF32::new(w, h);
    let mut mag = ImageF32::new(w, h);
    if w == 0 || h == 0 {
        return Grad { gx, gy, mag };
    }

    for y in 0..h {
        let rows = [l.row(y.saturating_sub(1)), l.row(y), l.row((y + 1).min(h - 1))];
        let out_gx = gx.row_mut(y);
        let out_gy = gy.row_mut(y);
        let out_mag = mag.row_mut(y);
        for x in 0..w {
            let x_idx = [x.saturating_sub(1), x, (x + 1).min(w - 1)];
            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            for (ky, row) in rows.iter().enumerate() {
                for (kx, &xi) in x_idx.iter().enumerate() {
                    sum_x += row[xi] * SOBEL_KERNEL_X[ky][kx];
                    sum_y += row[xi] * SOBEL_KERNEL_Y[ky][kx];
                }
            }
            out_gx[x] = sum_x;
            out_gy[x] = sum_y;
            out_mag[x] = (sum_x * sum_x + sum_y * sum_y).sqrt();
        }
    }

    Grad { gx, gy, mag }
}
