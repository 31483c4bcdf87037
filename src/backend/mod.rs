//! Implementations of [`GpuDevice`](crate::render::GpuDevice) and
//! [`RenderContext`](crate::render::RenderContext).

pub mod recording;
#[cfg(feature = "backend-wgpu")]
pub mod wgpu_renderer;

pub use recording::{DrawCall, RecordingGpu, Stats};
#[cfg(feature = "backend-wgpu")]
pub use wgpu_renderer::WgpuRenderer;
