//! GPU-drawn widget core.
//!
//! Two engines do the drawing: [`stylequad::StyleQuad`] renders the
//! nine-patch box behind a widget from its style, and [`text::TextObject`]
//! lays out and renders a run of text through a glyph atlas. Both talk to the
//! GPU only through the traits in [`render`].

pub mod backend;
pub mod error;
pub mod keyboard;
pub mod render;
pub mod style;
pub mod stylequad;
pub mod text;
pub mod theme;
pub mod utils;
#[cfg(feature = "widgets")]
pub mod widgets;

pub use error::{Error, GpuError, Result};
pub use render::{GpuDevice, Primitive, RenderContext, Shader, TextureImage, VertexBuffer};
pub use style::{BorderWidths, DrawState, PropertyKind, PropertyValue, Style, Styled, TextureDefinition};
pub use stylequad::{StyleChanges, StyleQuad};
pub use text::{Font, FontManager, TextObject};
pub use theme::Theme;
pub use utils::{Color, Position, Rectangle, Size};
