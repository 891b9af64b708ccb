use rooftop_solar::image::ImageU8;

/// Owned grayscale scene with axis-aligned blocks painted onto a flat
/// background.
pub struct SyntheticScene {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl SyntheticScene {
    pub fn new(width: usize, height: usize, background: u8) -> Self {
        assert!(width > 0 && height > 0, "image dimensions must be positive");
        Self {
            width,
            height,
            data: vec![background; width * height],
        }
    }

    /// Fill `[x0, x1) × [y0, y1)` with `value`.
    pub fn fill_rect(
        &mut self,
        x0: usize,
        y0: usize,
        x1: usize,
        y1: usize,
        value: u8,
    ) -> &mut Self {
        assert!(x0 < x1 && x1 <= self.width, "bad x range {x0}..{x1}");
        assert!(y0 < y1 && y1 <= self.height, "bad y range {y0}..{y1}");
        for y in y0..y1 {
            self.data[y * self.width + x0..y * self.width + x1].fill(value);
        }
        self
    }

    pub fn view(&self) -> ImageU8<'_> {
        ImageU8::new(self.width, self.height, &self.data)
    }
}

/// 320×240 scene with one bright 160×100 px roof on a dark background; at
/// 0.1 m/px the roof measures 16 × 10 m.
pub fn single_roof() -> SyntheticScene {
    let mut scene = SyntheticScene::new(320, 240, 40);
    scene.fill_rect(80, 70, 240, 170, 200);
    scene
}

/// [`single_roof`] with a dark 12×12 px chimney near the roof center.
pub fn roof_with_chimney() -> SyntheticScene {
    let mut scene = single_roof();
    scene.fill_rect(154, 114, 166, 126, 70);
    scene
}

/// The roof of [`single_roof`] imaged at twice the resolution.
pub fn single_roof_2x() -> SyntheticScene {
    let mut scene = SyntheticScene::new(640, 480, 40);
    scene.fill_rect(160, 140, 480, 340, 200);
    scene
}
