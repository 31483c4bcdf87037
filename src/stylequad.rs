//! Nine-patch style quads.
//!
//! A style quad is the visual box behind a widget: background colour,
//! background image, nine-sliced border image and a 1px outline, all resolved
//! from the owner's style.
//!
//! Geometry is a 4x4 grid of control points. With a border image loaded the
//! points are placed like this (centre-relative, y grows downwards):
//!
//! ```text
//!  0 ---- 1 ------------ 4 ---- 5
//!  |      |              |      |
//!  3 ---- 2 ------------ 7 ---- 6
//!  |      |              |      |
//!  |      |    centre    |      |
//!  |      |              |      |
//!  8 ---- 9 ----------- 12 ---- 13
//!  |      |              |      |
//! 11 ---- 10 ---------- 15 ---- 14
//! ```
//!
//! Without a border image only the inner corners 2, 7, 12 and 9 are used and
//! they sit on the outer edge of the rectangle.

use crate::error::GpuError;
use crate::render::{GpuDevice, Primitive, RenderContext, Shader};
use crate::style::{BorderWidths, DrawState, Style, Styled, TextureDefinition};
use crate::utils::{Color, Mat4, Position, Rectangle};
use log::warn;
use std::ops::BitOr;
use std::rc::Rc;

/// The eight outer cells, two triangles each. The centre cell is left out; it
/// is drawn with [`SOLID_INDICES`] when the texture asks for a fill.
pub const BORDER_INDICES: [u8; 48] = [
    0, 2, 1, 3, 2, 0, // top left
    1, 7, 4, 2, 7, 1, // top
    4, 6, 5, 7, 6, 4, // top right
    3, 9, 2, 8, 9, 3, // left
    7, 13, 6, 12, 13, 7, // right
    8, 10, 9, 11, 10, 8, // bottom left
    9, 15, 12, 10, 15, 9, // bottom
    12, 14, 13, 15, 14, 12, // bottom right
];

/// Centre cell as a triangle strip.
pub const SOLID_INDICES: [u8; 4] = [2, 7, 9, 12];

/// Centre cell perimeter as a line loop.
pub const OUTLINE_INDICES: [u8; 4] = [2, 7, 12, 9];

pub type Grid = [[f32; 2]; 16];

/// Control points for `rect`, relative to the rectangle's centre.
pub fn grid_vertices(rect: &Rectangle, border: Option<&BorderWidths>) -> Grid {
    let x = -(rect.width / 2.0);
    let y = -(rect.height / 2.0);
    let x2 = -x;
    let y2 = -y;

    match border {
        Some(b) => {
            let (top, right, bottom, left) =
                (b.top as f32, b.right as f32, b.bottom as f32, b.left as f32);
            [
                [x, y],
                [x + left, y],
                [x + left, y + top],
                [x, y + top],
                [x2 - right, y],
                [x2, y],
                [x2, y + top],
                [x2 - right, y + top],
                [x, y2 - bottom],
                [x + left, y2 - bottom],
                [x + left, y2],
                [x, y2],
                [x2 - right, y2 - bottom],
                [x2, y2 - bottom],
                [x2, y2],
                [x2 - right, y2],
            ]
        }
        None => {
            let mut v = [[0.0; 2]; 16];
            v[2] = [x, y];
            v[7] = [x2, y];
            v[12] = [x2, y2];
            v[9] = [x, y2];
            v
        }
    }
}

/// Texture coordinates slicing `def` along its border widths. Same point
/// order as [`grid_vertices`]; v grows downwards because pixel rows are
/// stored top first.
pub fn border_tex_coords(def: &TextureDefinition) -> Grid {
    let hpxl = 1.0 / def.width as f32;
    let vpxl = 1.0 / def.height as f32;
    let top = def.border.top as f32 * vpxl;
    let right = def.border.right as f32 * hpxl;
    let bottom = def.border.bottom as f32 * vpxl;
    let left = def.border.left as f32 * hpxl;

    [
        [0.0, 0.0],
        [left, 0.0],
        [left, top],
        [0.0, top],
        [1.0 - right, 0.0],
        [1.0, 0.0],
        [1.0, top],
        [1.0 - right, top],
        [0.0, 1.0 - bottom],
        [left, 1.0 - bottom],
        [left, 1.0],
        [0.0, 1.0],
        [1.0 - right, 1.0 - bottom],
        [1.0, 1.0 - bottom],
        [1.0, 1.0],
        [1.0 - right, 1.0],
    ]
}

/// Texture coordinates stretching a whole image over the centre cell.
pub fn fill_tex_coords() -> Grid {
    let mut v = [[0.0; 2]; 16];
    v[2] = [0.0, 0.0];
    v[7] = [1.0, 0.0];
    v[12] = [1.0, 1.0];
    v[9] = [0.0, 1.0];
    v
}

/// Set of cached style properties that changed during one `update_style`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleChanges(u8);

impl StyleChanges {
    pub const NONE: StyleChanges = StyleChanges(0);
    pub const BG_COLOR: StyleChanges = StyleChanges(1 << 0);
    pub const FG_COLOR: StyleChanges = StyleChanges(1 << 1);
    pub const BORDER_COLOR: StyleChanges = StyleChanges(1 << 2);
    pub const BORDER_IMAGE: StyleChanges = StyleChanges(1 << 3);
    pub const BACKGROUND_IMAGE: StyleChanges = StyleChanges(1 << 4);
    /// Reported by text owners when the `font` property picks another font.
    pub const FONT: StyleChanges = StyleChanges(1 << 5);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: StyleChanges) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: StyleChanges) {
        self.0 |= other.0;
    }

    pub fn len(self) -> u32 {
        self.0.count_ones()
    }
}

impl BitOr for StyleChanges {
    type Output = StyleChanges;

    fn bitor(self, rhs: StyleChanges) -> StyleChanges {
        StyleChanges(self.0 | rhs.0)
    }
}

/// Values resolved from the style system, compared against the next pass.
#[derive(Debug, Clone, Default)]
pub struct CachedProperties {
    pub bg_color: Option<Color>,
    pub fg_color: Option<Color>,
    pub border_color: Option<Color>,
    pub border_image: Option<Rc<TextureDefinition>>,
    pub background_image: Option<Rc<TextureDefinition>>,
}

fn same_texture(a: Option<&Rc<TextureDefinition>>, b: Option<&Rc<TextureDefinition>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

fn grid_bytes(grid: &Grid) -> &[u8] {
    bytemuck::cast_slice(grid.as_slice())
}

/// Texture slot of a style quad. Owns its coordinate buffer and texture; the
/// definition is shared with the style system.
pub struct StyleQuadTexture<G: GpuDevice> {
    definition: Option<Rc<TextureDefinition>>,
    coords: G::Buffer,
    handle: G::Texture,
}

impl<G: GpuDevice> StyleQuadTexture<G> {
    fn new(gpu: &mut G, label: &'static str) -> Result<Self, GpuError> {
        Ok(Self {
            definition: None,
            coords: gpu.create_buffer(label)?,
            handle: gpu.create_texture(label)?,
        })
    }

    pub fn definition(&self) -> Option<&Rc<TextureDefinition>> {
        self.definition.as_ref()
    }

    /// Uploads `src` and its texture coordinates unless it is already
    /// loaded. Returns whether an upload happened.
    ///
    /// The definition only becomes current once both uploads succeeded. If the
    /// coordinates fail after the texture was replaced, the slot is left empty
    /// so the next load starts over.
    fn load(
        &mut self,
        gpu: &mut G,
        src: Option<Rc<TextureDefinition>>,
        coords: impl FnOnce(&TextureDefinition) -> Grid,
    ) -> Result<bool, GpuError> {
        if same_texture(self.definition.as_ref(), src.as_ref()) {
            return Ok(false);
        }

        gpu.write_texture(&mut self.handle, src.as_ref().map(|d| d.image()))?;
        if let Some(def) = &src {
            if let Err(e) = gpu.write_buffer(&mut self.coords, grid_bytes(&coords(&**def))) {
                self.definition = None;
                return Err(e);
            }
        }
        self.definition = src;
        Ok(true)
    }
}

pub struct StyleQuad<G: GpuDevice> {
    offset: Position,
    vertices: G::Buffer,
    border_image: StyleQuadTexture<G>,
    background_image: StyleQuadTexture<G>,
    properties: CachedProperties,
}

impl<G: GpuDevice> StyleQuad<G> {
    pub fn new(gpu: &mut G) -> Result<Self, GpuError> {
        Ok(Self {
            offset: Position::default(),
            vertices: gpu.create_buffer("stylequad vertices")?,
            border_image: StyleQuadTexture::new(gpu, "stylequad border image")?,
            background_image: StyleQuadTexture::new(gpu, "stylequad background image")?,
            properties: CachedProperties::default(),
        })
    }

    pub fn offset(&self) -> Position {
        self.offset
    }

    pub fn properties(&self) -> &CachedProperties {
        &self.properties
    }

    pub fn fg_color(&self) -> Option<Color> {
        self.properties.fg_color
    }

    pub fn border_image(&self) -> Option<&Rc<TextureDefinition>> {
        self.border_image.definition()
    }

    pub fn background_image(&self) -> Option<&Rc<TextureDefinition>> {
        self.background_image.definition()
    }

    /// Re-resolves the cached properties for the owner's current draw state
    /// and reloads the images. Every property whose value changed is reported
    /// once; the caller decides how to mark the owner dirty.
    pub fn update_style(
        &mut self,
        gpu: &mut G,
        owner: &impl Styled,
    ) -> Result<StyleChanges, GpuError> {
        let changes = self.resolve(owner.style(), owner.draw_state());

        let border = self.properties.border_image.clone();
        self.set_border_image(gpu, border)?;
        let background = self.properties.background_image.clone();
        self.set_background_image(gpu, background)?;

        Ok(changes)
    }

    fn resolve(&mut self, style: &Style, state: DrawState) -> StyleChanges {
        let mut changes = StyleChanges::NONE;
        let props = &mut self.properties;

        let mut cache_color = |dest: &mut Option<Color>, name: &str, flag: StyleChanges| {
            let value = style.color(state, name);
            if *dest != value {
                changes.insert(flag);
                *dest = value;
            }
        };
        cache_color(&mut props.bg_color, "background-color", StyleChanges::BG_COLOR);
        cache_color(&mut props.fg_color, "color", StyleChanges::FG_COLOR);
        cache_color(&mut props.border_color, "border-color", StyleChanges::BORDER_COLOR);

        let mut cache_texture =
            |dest: &mut Option<Rc<TextureDefinition>>, name: &str, flag: StyleChanges| {
                let value = style.texture(state, name);
                if !same_texture(dest.as_ref(), value.as_ref()) {
                    changes.insert(flag);
                    *dest = value;
                }
            };
        cache_texture(&mut props.border_image, "border-image", StyleChanges::BORDER_IMAGE);
        cache_texture(
            &mut props.background_image,
            "background-image",
            StyleChanges::BACKGROUND_IMAGE,
        );

        changes
    }

    /// Loads `def` as the border image. Loading the definition that is already
    /// loaded does nothing.
    pub fn set_border_image(
        &mut self,
        gpu: &mut G,
        def: Option<Rc<TextureDefinition>>,
    ) -> Result<(), GpuError> {
        self.border_image
            .load(gpu, def, border_tex_coords)
            .inspect_err(|e| warn!("border image upload failed: {}", e))?;
        Ok(())
    }

    pub fn set_background_image(
        &mut self,
        gpu: &mut G,
        def: Option<Rc<TextureDefinition>>,
    ) -> Result<(), GpuError> {
        self.background_image
            .load(gpu, def, |_| fill_tex_coords())
            .inspect_err(|e| warn!("background image upload failed: {}", e))?;
        Ok(())
    }

    /// Places the quad over `rect` (the owner's rectangle in window pixels).
    pub fn update_geometry(&mut self, gpu: &mut G, rect: &Rectangle) -> Result<(), GpuError> {
        self.offset = rect.center();

        let border = self.border_image.definition.as_ref().map(|d| &d.border);
        let grid = grid_vertices(rect, border);
        gpu.write_buffer(&mut self.vertices, grid_bytes(&grid))
    }
}

impl<G: RenderContext> StyleQuad<G> {
    pub fn draw(&self, gpu: &mut G) {
        gpu.reset();
        gpu.use_shader(Shader::StyleQuad);
        self.draw_layers(gpu);
    }

    pub fn draw_with_modelview(&self, gpu: &mut G, modelview: &Mat4) {
        gpu.reset();
        gpu.use_shader(Shader::StyleQuad);
        gpu.set_modelview(modelview);
        self.draw_layers(gpu);
    }

    fn draw_layers(&self, gpu: &mut G) {
        gpu.set_position(self.offset.x, self.offset.y);
        gpu.set_texture_size(0.0, 0.0);

        if let Some(color) = self.properties.bg_color {
            gpu.set_color(color);
            gpu.draw_elements(
                Primitive::TriangleStrip,
                &self.vertices,
                None,
                &SOLID_INDICES,
            );
        }

        if self.background_image.definition.is_some() {
            self.draw_textured(gpu, &self.background_image, |gpu, quad, coords| {
                gpu.draw_elements(
                    Primitive::TriangleStrip,
                    &quad.vertices,
                    Some(coords),
                    &SOLID_INDICES,
                );
            });
        }

        if let Some(def) = &self.border_image.definition {
            let fill = def.fill;
            self.draw_textured(gpu, &self.border_image, |gpu, quad, coords| {
                gpu.draw_elements(
                    Primitive::Triangles,
                    &quad.vertices,
                    Some(coords),
                    &BORDER_INDICES,
                );
                if fill {
                    gpu.draw_elements(
                        Primitive::TriangleStrip,
                        &quad.vertices,
                        Some(coords),
                        &SOLID_INDICES,
                    );
                }
            });
        }

        if let Some(color) = self.properties.border_color {
            gpu.set_color(color);
            gpu.draw_elements(
                Primitive::LineLoop,
                &self.vertices,
                None,
                &OUTLINE_INDICES,
            );
        }
    }

    fn draw_textured(
        &self,
        gpu: &mut G,
        tx: &StyleQuadTexture<G>,
        draw: impl FnOnce(&mut G, &Self, &G::Buffer),
    ) {
        let Some(def) = &tx.definition else {
            return;
        };

        gpu.bind_texture(Some(&tx.handle));
        gpu.set_texture_size(def.width as f32, def.height as f32);
        draw(gpu, self, &tx.coords);
        gpu.bind_texture(None);
        gpu.set_texture_size(0.0, 0.0);
    }
}
