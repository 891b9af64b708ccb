//! Raster containers shared by every pipeline stage.
//!
//! - [`ImageU8`]: borrowed 8-bit grayscale view handed in by the caller.
//! - [`ImageF32`]: owned float image in `[0, 1]`, used for pyramid levels,
//!   gradients and intensity statistics.
//! - [`BinaryMask`]: owned 0/1 mask with an origin offset, used for
//!   binarized passes, region masks and obstacle candidates.
pub mod f32;
pub mod io;
pub mod mask;
pub mod traits;
pub mod u8;

pub use self::f32::ImageF32;
pub use self::mask::BinaryMask;
pub use self::traits::{ImageView, ImageViewMut, Rows};
pub use self::u8::ImageU8;
