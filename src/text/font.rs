use crate::error::{Error, Result};
use crate::text::atlas::GlyphAtlas;
use log::{debug, trace};
use rusttype::{point, Scale};
use std::collections::HashMap;

/// One rasterized glyph. Offsets follow the usual bitmap conventions:
/// `offset_x` is the left bearing, `offset_y` the distance from the baseline
/// up to the bitmap's top row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Glyph {
    pub codepoint: char,
    pub width: f32,
    pub height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub advance_x: f32,
    pub s0: f32,
    pub t0: f32,
    pub s1: f32,
    pub t1: f32,
    /// `(previous codepoint, pen adjustment)` pairs.
    pub kerning: Vec<(char, f32)>,
}

impl Glyph {
    /// Pen adjustment when this glyph follows `prev`.
    pub fn kerning(&self, prev: char) -> f32 {
        self.kerning
            .iter()
            .find(|(c, _)| *c == prev)
            .map_or(0.0, |(_, k)| *k)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FontMetrics {
    /// Pixel size the font was rasterized at.
    pub size: f32,
    /// Line height.
    pub height: f32,
    pub ascender: f32,
    /// Negative for descenders below the baseline.
    pub descender: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Font {
    metrics: FontMetrics,
    glyphs: HashMap<char, Glyph>,
}

impl Font {
    pub fn new(metrics: FontMetrics) -> Self {
        Self {
            metrics,
            glyphs: HashMap::new(),
        }
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    pub fn size(&self) -> f32 {
        self.metrics.size
    }

    pub fn height(&self) -> f32 {
        self.metrics.height
    }

    pub fn descender(&self) -> f32 {
        self.metrics.descender
    }

    pub fn insert_glyph(&mut self, glyph: Glyph) {
        self.glyphs.insert(glyph.codepoint, glyph);
    }

    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c)
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Rasterizes `charset` from TrueType/OpenType `data` into `atlas`.
    ///
    /// Characters the font has no outline for are left out, as are glyphs that
    /// no longer fit into the atlas.
    pub fn rasterize(
        atlas: &mut GlyphAtlas,
        data: &[u8],
        size: f32,
        charset: &str,
    ) -> Result<Self> {
        let face = rusttype::Font::try_from_bytes(data).ok_or(Error::InvalidFontData)?;
        let scale = Scale::uniform(size);
        let v = face.v_metrics(scale);

        let mut font = Font::new(FontMetrics {
            size,
            height: v.ascent - v.descent + v.line_gap,
            ascender: v.ascent,
            descender: v.descent,
        });

        let chars: Vec<char> = charset
            .chars()
            .filter(|&c| face.glyph(c).id().0 != 0)
            .collect();

        for &c in &chars {
            let scaled = face.glyph(c).scaled(scale);
            let advance_x = scaled.h_metrics().advance_width;
            let positioned = scaled.positioned(point(0.0, 0.0));

            let mut glyph = Glyph {
                codepoint: c,
                advance_x,
                ..Glyph::default()
            };

            if let Some(bb) = positioned.pixel_bounding_box() {
                let w = bb.width() as u32;
                let h = bb.height() as u32;
                let Some(region) = atlas.allocate(w, h) else {
                    continue;
                };
                positioned.draw(|x, y, coverage| atlas.set_coverage(&region, x, y, coverage));

                let (s0, t0, s1, t1) = atlas.uv(&region);
                glyph.width = w as f32;
                glyph.height = h as f32;
                glyph.offset_x = bb.min.x as f32;
                glyph.offset_y = -bb.min.y as f32;
                glyph.s0 = s0;
                glyph.t0 = t0;
                glyph.s1 = s1;
                glyph.t1 = t1;
            }

            glyph.kerning = chars
                .iter()
                .filter_map(|&prev| {
                    let k = face.pair_kerning(scale, prev, c);
                    (k != 0.0).then_some((prev, k))
                })
                .collect();

            trace!(
                "glyph {:?}: {}x{} advance {} kerning pairs {}",
                c,
                glyph.width,
                glyph.height,
                glyph.advance_x,
                glyph.kerning.len()
            );
            font.insert_glyph(glyph);
        }

        debug!(
            "rasterized {} of {} glyphs at {}px",
            font.glyph_count(),
            charset.chars().count(),
            size
        );
        Ok(font)
    }
}

/// Printable ASCII, the default charset for loaded fonts.
pub fn ascii_charset() -> String {
    (0x20u8..=0x7E).map(char::from).collect()
}
