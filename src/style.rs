//! Cascading style properties.
//!
//! A [`Style`] maps `(draw state, property name)` to a resolved value. Lookups
//! fall back from the requested state to [`DrawState::Normal`] and then to the
//! inherited style, recursively.

use crate::error::{Error, Result};
use crate::render::TextureImage;
use crate::utils::Color;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

/// Visual state of an element, used as the pseudo-class for style lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DrawState {
    #[default]
    Normal,
    Focus,
    Hover,
    Active,
}

impl DrawState {
    pub const ALL: [DrawState; 4] = [
        DrawState::Normal,
        DrawState::Focus,
        DrawState::Hover,
        DrawState::Active,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct BorderWidths {
    #[serde(default)]
    pub top: u32,
    #[serde(default)]
    pub right: u32,
    #[serde(default)]
    pub bottom: u32,
    #[serde(default)]
    pub left: u32,
}

impl BorderWidths {
    pub const fn uniform(width: u32) -> Self {
        Self {
            top: width,
            right: width,
            bottom: width,
            left: width,
        }
    }
}

/// Immutable image asset used for border and background images.
///
/// Pixels are straight-alpha BGRA, rows top first.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDefinition {
    pub width: u32,
    pub height: u32,
    pub border: BorderWidths,
    /// Draw the centre cell of a border image too.
    pub fill: bool,
    pixels: Vec<u8>,
}

impl TextureDefinition {
    pub fn from_bgra(
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        border: BorderWidths,
        fill: bool,
    ) -> Self {
        Self {
            width,
            height,
            border,
            fill,
            pixels,
        }
    }

    pub fn from_rgba(
        width: u32,
        height: u32,
        mut pixels: Vec<u8>,
        border: BorderWidths,
        fill: bool,
    ) -> Self {
        for px in pixels.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
        Self::from_bgra(width, height, pixels, border, fill)
    }

    /// Loads a raster image, or rasterizes an `.svg` file at `scale`.
    pub fn load(path: &Path, border: BorderWidths, fill: bool, scale: f32) -> Result<Self> {
        let is_svg = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

        if is_svg {
            return Self::load_svg(path, border, fill, scale);
        }

        let rgba = image::open(path)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self::from_rgba(width, height, rgba.into_raw(), border, fill))
    }

    fn load_svg(path: &Path, border: BorderWidths, fill: bool, scale: f32) -> Result<Self> {
        let data = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let svg_err = |reason: String| Error::Svg {
            path: path.to_path_buf(),
            reason,
        };

        let opt = resvg::usvg::Options::default();
        let tree =
            resvg::usvg::Tree::from_data(&data, &opt).map_err(|e| svg_err(e.to_string()))?;

        let width = (tree.size().width() * scale).ceil() as u32;
        let height = (tree.size().height() * scale).ceil() as u32;
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| svg_err(format!("cannot rasterize at {}x{}", width, height)))?;
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        // tiny-skia stores premultiplied RGBA
        let mut pixels = Vec::with_capacity(pixmap.pixels().len() * 4);
        for px in pixmap.pixels() {
            let c = px.demultiply();
            pixels.extend_from_slice(&[c.blue(), c.green(), c.red(), c.alpha()]);
        }

        Ok(Self::from_bgra(width, height, pixels, border, fill))
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn image(&self) -> TextureImage<'_> {
        TextureImage {
            width: self.width,
            height: self.height,
            bgra: &self.pixels,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Color,
    Texture,
    Font,
}

#[derive(Debug, Clone)]
pub enum PropertyValue {
    Color(Color),
    Texture(Rc<TextureDefinition>),
    /// Slot in the font manager.
    Font(usize),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Color(_) => PropertyKind::Color,
            PropertyValue::Texture(_) => PropertyKind::Texture,
            PropertyValue::Font(_) => PropertyKind::Font,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            PropertyValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_texture(&self) -> Option<&Rc<TextureDefinition>> {
        match self {
            PropertyValue::Texture(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_font(&self) -> Option<usize> {
        match self {
            PropertyValue::Font(slot) => Some(*slot),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Style {
    name: String,
    states: [HashMap<String, PropertyValue>; 4],
    parent: Option<Rc<Style>>,
}

impl Style {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(name: impl Into<String>, parent: Rc<Style>) -> Self {
        Self {
            parent: Some(parent),
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Rc<Style>> {
        self.parent.as_ref()
    }

    pub fn set(&mut self, state: DrawState, property: impl Into<String>, value: PropertyValue) {
        self.states[state.index()].insert(property.into(), value);
    }

    pub fn remove(&mut self, state: DrawState, property: &str) -> Option<PropertyValue> {
        self.states[state.index()].remove(property)
    }

    /// Resolves `property` for `state`. A value of the wrong kind does not
    /// match and the cascade continues.
    pub fn query(
        &self,
        state: DrawState,
        property: &str,
        kind: PropertyKind,
    ) -> Option<&PropertyValue> {
        let lookup = |s: DrawState| {
            self.states[s.index()]
                .get(property)
                .filter(|v| v.kind() == kind)
        };

        lookup(state)
            .or_else(|| {
                if state != DrawState::Normal {
                    lookup(DrawState::Normal)
                } else {
                    None
                }
            })
            .or_else(|| {
                self.parent
                    .as_ref()
                    .and_then(|p| p.query(state, property, kind))
            })
    }

    pub fn color(&self, state: DrawState, property: &str) -> Option<Color> {
        self.query(state, property, PropertyKind::Color)
            .and_then(PropertyValue::as_color)
    }

    pub fn texture(&self, state: DrawState, property: &str) -> Option<Rc<TextureDefinition>> {
        self.query(state, property, PropertyKind::Texture)
            .and_then(PropertyValue::as_texture)
            .cloned()
    }

    pub fn font(&self, state: DrawState, property: &str) -> Option<usize> {
        self.query(state, property, PropertyKind::Font)
            .and_then(PropertyValue::as_font)
    }
}

/// Something that carries a style and a current draw state.
pub trait Styled {
    fn style(&self) -> &Style;
    fn draw_state(&self) -> DrawState;
}
