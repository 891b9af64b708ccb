//! I/O helpers for the boundary tools.
//!
//! - `load_grayscale_image`: read a PNG/JPEG into an owned 8-bit gray buffer.
//! - `save_grayscale_u8`: write an owned gray buffer to a PNG.
//! - `render_layout_mask`: paint roofs, obstacles and panels into a gray buffer.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::ImageU8;
use crate::geometry::Polygon;
use crate::types::AnalysisRun;
use image::{GrayImage, ImageBuffer, Luma};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Owned 8-bit grayscale buffer with a borrowed view conversion.
#[derive(Clone, Debug)]
pub struct GrayImageU8 {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayImageU8 {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Borrow as a read-only `ImageU8` view
    pub fn as_view(&self) -> ImageU8<'_> {
        ImageU8::new(self.width, self.height, &self.data)
    }

    fn fill_polygon(&mut self, polygon: &Polygon, value: u8) {
        let mask = polygon.rasterize(self.width, self.height);
        for (x, y) in mask.iter_set() {
            self.data[y * self.width + x] = value;
        }
    }
}

/// Load an image from disk and convert to 8-bit grayscale.
pub fn load_grayscale_image(path: &Path) -> Result<GrayImageU8, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_luma8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    Ok(GrayImageU8::new(width, height, img.into_raw()))
}

/// Save an 8-bit grayscale buffer to a PNG.
pub fn save_grayscale_u8(buffer: &GrayImageU8, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let image: GrayImage =
        ImageBuffer::<Luma<u8>, Vec<u8>>::from_raw(
            buffer.width as u32,
            buffer.height as u32,
            buffer.data.clone(),
        )
        .ok_or_else(|| "Failed to create image buffer".to_string())?;
    image
        .save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Paint the analysis into a `width × height` buffer: roofs 96, obstacles 32,
/// panels 255. Later layers overwrite earlier ones.
pub fn render_layout_mask(run: &AnalysisRun, width: usize, height: usize) -> GrayImageU8 {
    let mut out = GrayImageU8::new(width, height, vec![0; width * height]);
    for roof in &run.regions {
        out.fill_polygon(&roof.polygon, 96);
        for obstacle in &roof.obstacles {
            out.fill_polygon(&obstacle.polygon, 32);
        }
        for panel in &roof.layout.panels {
            out.fill_polygon(&panel.corners, 255);
        }
    }
    out
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
