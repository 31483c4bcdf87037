use crate::error::{Error, GpuError, Result};
use crate::render::{GpuDevice, Primitive, RenderContext, Shader, VertexBuffer};
use crate::style::{DrawState, Style};
use crate::text::atlas::GlyphAtlas;
use crate::text::font::{ascii_charset, Font};
use crate::text::utf8::decode_lossy;
use crate::utils::Color;
use bytemuck::{Pod, Zeroable};
use log::{debug, trace};
use std::rc::Rc;

/// Interleaved glyph vertex: pixel position and atlas coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlyphVertex {
    pub x: f32,
    pub y: f32,
    pub s: f32,
    pub t: f32,
}

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Fonts plus the atlas texture their glyphs live in.
pub struct FontManager<G: GpuDevice> {
    fonts: Vec<Rc<Font>>,
    atlas: GlyphAtlas,
    atlas_texture: G::Texture,
    default_fg: Color,
}

impl<G: GpuDevice> FontManager<G> {
    pub fn new(gpu: &mut G, atlas_size: u32) -> Result<Self> {
        let atlas = GlyphAtlas::new(atlas_size, atlas_size, 1);
        let mut atlas_texture = gpu.create_texture("glyph atlas")?;
        gpu.write_texture(&mut atlas_texture, Some(atlas.image()))?;

        Ok(Self {
            fonts: Vec::new(),
            atlas,
            atlas_texture,
            default_fg: Color::BLACK,
        })
    }

    /// Rasterizes printable ASCII from `data` and returns the new font slot.
    pub fn load_font(&mut self, gpu: &mut G, data: &[u8], size: f32) -> Result<usize> {
        let font = Font::rasterize(&mut self.atlas, data, size, &ascii_charset())?;
        gpu.write_texture(&mut self.atlas_texture, Some(self.atlas.image()))?;
        Ok(self.insert_font(font))
    }

    /// Adds an already built font. Its glyph coordinates must refer to this
    /// manager's atlas.
    pub fn insert_font(&mut self, font: Font) -> usize {
        self.fonts.push(Rc::new(font));
        debug!("font slot {} registered", self.fonts.len() - 1);
        self.fonts.len() - 1
    }

    pub fn font(&self, slot: usize) -> Option<Rc<Font>> {
        self.fonts.get(slot).cloned()
    }

    pub fn main_font(&self) -> Option<Rc<Font>> {
        self.font(0)
    }

    pub fn atlas(&self) -> &GlyphAtlas {
        &self.atlas
    }

    pub fn atlas_texture(&self) -> &G::Texture {
        &self.atlas_texture
    }

    pub fn default_fg(&self) -> Color {
        self.default_fg
    }

    pub fn set_default_fg(&mut self, color: Color) {
        self.default_fg = color;
    }
}

/// A laid out run of text, ready to draw.
pub struct TextObject<G: GpuDevice> {
    fm: Rc<FontManager<G>>,
    font: Rc<Font>,
    vertices: VertexBuffer<G, GlyphVertex>,
    text: Vec<u8>,
    w: i32,
    h: i32,
    xpad: i32,
    ypad: i32,
}

impl<G: GpuDevice> TextObject<G> {
    /// Uses the manager's main font unless `font` is given.
    pub fn new(
        gpu: &mut G,
        fm: Rc<FontManager<G>>,
        font: Option<Rc<Font>>,
        text: Option<&[u8]>,
    ) -> Result<Self> {
        let font = match font {
            Some(font) => font,
            None => fm.main_font().ok_or(Error::NoFont)?,
        };

        let mut obj = Self {
            fm,
            font,
            vertices: VertexBuffer::new(gpu, "text vertices")?,
            text: Vec::new(),
            w: 0,
            h: 0,
            xpad: 0,
            ypad: 0,
        };
        if let Some(text) = text {
            obj.update(gpu, text)?;
        }
        obj.set_padding();
        Ok(obj)
    }

    fn set_padding(&mut self) {
        self.xpad = (self.font.size() * 2.0).floor() as i32;
        self.ypad = (self.font.height() / 2.0).floor() as i32;
    }

    /// Replaces the text and rebuilds the glyph quads. Invalid UTF-8 shows as
    /// U+FFFD (if the font has it); characters without a glyph are skipped.
    pub fn update(&mut self, gpu: &mut G, text: impl AsRef<[u8]>) -> std::result::Result<(), GpuError> {
        let text = text.as_ref();
        let font = &self.font;
        self.vertices.clear();

        let mut x = 0.0f32;
        let y = (font.height() / 2.0).ceil() - font.descender() + 1.0;
        let mut right = 0.0f32;
        let mut prev: Option<char> = None;

        for c in decode_lossy(text) {
            let Some(glyph) = font.glyph(c) else {
                trace!("no glyph for {:?}", c);
                continue;
            };

            if let Some(prev) = prev {
                x += glyph.kerning(prev);
            }

            let x0 = x + glyph.offset_x;
            let y0 = y - glyph.offset_y;
            let x1 = x0 + glyph.width;
            let y1 = y0 + glyph.height;

            let quad = [
                GlyphVertex { x: x0, y: y0, s: glyph.s0, t: glyph.t0 },
                GlyphVertex { x: x0, y: y1, s: glyph.s0, t: glyph.t1 },
                GlyphVertex { x: x1, y: y1, s: glyph.s1, t: glyph.t1 },
                GlyphVertex { x: x1, y: y0, s: glyph.s1, t: glyph.t0 },
            ];
            self.vertices.push_back(&quad, &QUAD_INDICES);

            right = right.max(x1);
            x += glyph.advance_x;
            prev = Some(c);
        }

        self.vertices.upload(gpu)?;

        self.text.clear();
        self.text.extend_from_slice(text);
        self.w = right.ceil() as i32;
        self.h = font.height().ceil() as i32;
        self.set_padding();
        Ok(())
    }

    /// Switches font and lays the current text out again.
    pub fn set_font(&mut self, gpu: &mut G, font: Rc<Font>) -> std::result::Result<(), GpuError> {
        self.font = font;
        let text = self.text.clone();
        self.update(gpu, text)
    }

    pub fn font(&self) -> &Rc<Font> {
        &self.font
    }

    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Number of glyph quads.
    pub fn glyph_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertices(&self) -> &[GlyphVertex] {
        self.vertices.vertices()
    }

    pub fn indices(&self) -> &[u32] {
        self.vertices.indices()
    }

    pub fn width(&self) -> i32 {
        self.w
    }

    pub fn height(&self) -> i32 {
        self.h
    }

    pub fn xpad(&self) -> i32 {
        self.xpad
    }

    pub fn ypad(&self) -> i32 {
        self.ypad
    }
}

impl<G: RenderContext> TextObject<G> {
    /// Draws the text with its top-left corner at `(x, y)`, coloured with the
    /// parent's `color` for `state`.
    pub fn render(&self, gpu: &mut G, parent: Option<&Style>, x: f32, y: f32, state: DrawState) {
        let color = parent
            .and_then(|style| style.color(state, "color"))
            .unwrap_or(self.fm.default_fg());
        self.render_colored(gpu, color, x, y);
    }

    /// Draws the text in `color`, for owners that cache their resolved colour.
    pub fn render_colored(&self, gpu: &mut G, color: Color, x: f32, y: f32) {
        if self.vertices.is_empty() {
            return;
        }

        gpu.use_shader(Shader::Alpha);
        gpu.bind_texture(Some(self.fm.atlas_texture()));
        gpu.set_position(x, y);
        gpu.set_color(color);
        self.vertices.render(gpu, Primitive::Triangles);
    }
}
