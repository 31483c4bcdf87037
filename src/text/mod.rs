//! Text layout: UTF-8 decoding, fonts, the glyph atlas and laid out text runs.

pub mod atlas;
pub mod font;
pub mod text_object;
pub mod utf8;

pub use atlas::{AtlasRegion, GlyphAtlas};
pub use font::{ascii_charset, Font, FontMetrics, Glyph};
pub use text_object::{FontManager, GlyphVertex, TextObject};
pub use utf8::{decode_lossy, Utf8Decoder, REPLACEMENT};
