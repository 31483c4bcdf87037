use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while creating or filling GPU objects.
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("failed to allocate {what}: {reason}")]
    Allocation { what: &'static str, reason: String },

    #[error("texture {width}x{height} exceeds the device limit of {limit}")]
    TextureTooLarge { width: u32, height: u32, limit: u32 },

    #[error("pixel data holds {actual} bytes, expected {expected}")]
    PixelDataSize { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Gpu(#[from] GpuError),

    #[error("failed to parse theme: {0}")]
    Theme(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to parse SVG {path}: {reason}")]
    Svg { path: PathBuf, reason: String },

    #[error("font data could not be parsed")]
    InvalidFontData,

    #[error("font manager has no font loaded")]
    NoFont,

    #[error("style {style:?} references unknown {kind} {name:?}")]
    UnknownReference {
        style: String,
        kind: &'static str,
        name: String,
    },

    #[error("style {0:?} inherits from itself")]
    InheritanceCycle(String),

    #[error("style {style:?}: invalid value {value:?} for {property:?}")]
    InvalidValue {
        style: String,
        property: String,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
