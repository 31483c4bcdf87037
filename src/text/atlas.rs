use crate::render::TextureImage;
use log::warn;

/// Pixel rectangle inside the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Glyph bitmaps packed row by row into one BGRA image.
///
/// Texels are white; coverage lives in the alpha channel, so the alpha shader
/// can tint glyphs with any colour.
pub struct GlyphAtlas {
    width: u32,
    height: u32,
    padding: u32,
    pixels: Vec<u8>,
    // shelf cursor
    pack_x: u32,
    pack_y: u32,
    row_height: u32,
}

impl GlyphAtlas {
    pub fn new(width: u32, height: u32, padding: u32) -> Self {
        let mut pixels = vec![0u8; width as usize * height as usize * 4];
        for px in pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[255, 255, 255, 0]);
        }

        Self {
            width,
            height,
            padding,
            pixels,
            pack_x: padding,
            pack_y: padding,
            row_height: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reserves a `width` x `height` region, or `None` once the atlas is full.
    /// A failed request leaves the packing cursor where it was.
    pub fn allocate(&mut self, width: u32, height: u32) -> Option<AtlasRegion> {
        let (mut x, mut y, mut row_height) = (self.pack_x, self.pack_y, self.row_height);
        if x + width + self.padding > self.width {
            x = self.padding;
            y += row_height + self.padding;
            row_height = 0;
        }

        if x + width + self.padding > self.width || y + height + self.padding > self.height {
            warn!(
                "glyph atlas {}x{} is full, cannot fit {}x{}",
                self.width, self.height, width, height
            );
            return None;
        }

        self.pack_x = x + width + self.padding;
        self.pack_y = y;
        self.row_height = row_height.max(height);
        Some(AtlasRegion {
            x,
            y,
            width,
            height,
        })
    }

    /// Stores `coverage` at `(x, y)` relative to `region`. Writes outside the
    /// region are ignored.
    pub fn set_coverage(&mut self, region: &AtlasRegion, x: u32, y: u32, coverage: f32) {
        if x >= region.width || y >= region.height {
            return;
        }
        let idx = ((region.y + y) as usize * self.width as usize + (region.x + x) as usize) * 4;
        self.pixels[idx + 3] = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
    }

    pub fn coverage(&self, x: u32, y: u32) -> u8 {
        self.pixels[(y as usize * self.width as usize + x as usize) * 4 + 3]
    }

    /// Normalized `(s0, t0, s1, t1)` of `region`.
    pub fn uv(&self, region: &AtlasRegion) -> (f32, f32, f32, f32) {
        let w = self.width as f32;
        let h = self.height as f32;
        (
            region.x as f32 / w,
            region.y as f32 / h,
            (region.x + region.width) as f32 / w,
            (region.y + region.height) as f32 / h,
        )
    }

    pub fn image(&self) -> TextureImage<'_> {
        TextureImage {
            width: self.width,
            height: self.height,
            bgra: &self.pixels,
        }
    }
}
