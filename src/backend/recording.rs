//! Headless backend that records everything instead of drawing.
//!
//! Used by tests and tooling to observe uploads, releases and the exact
//! sequence of draw calls an engine issues.

use crate::error::GpuError;
use crate::render::{GpuDevice, Primitive, RenderContext, Shader, TextureImage};
use crate::utils::{Color, Mat4, IDENTITY};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub buffers_created: usize,
    pub buffers_released: usize,
    pub buffer_writes: usize,
    pub textures_created: usize,
    pub textures_released: usize,
    pub texture_uploads: usize,
}

impl Stats {
    pub fn live_buffers(&self) -> usize {
        self.buffers_created - self.buffers_released
    }

    pub fn live_textures(&self) -> usize {
        self.textures_created - self.textures_released
    }
}

type SharedStats = Rc<RefCell<Stats>>;

#[derive(Debug)]
pub struct RecordedBuffer {
    id: usize,
    label: &'static str,
    contents: Vec<u8>,
    stats: SharedStats,
}

impl RecordedBuffer {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Contents read back as 2-float points.
    pub fn points(&self) -> Vec<[f32; 2]> {
        self.contents
            .chunks_exact(8)
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }
}

impl Drop for RecordedBuffer {
    fn drop(&mut self) {
        self.stats.borrow_mut().buffers_released += 1;
    }
}

#[derive(Debug)]
pub struct RecordedTexture {
    id: usize,
    label: &'static str,
    size: (u32, u32),
    stats: SharedStats,
}

impl RecordedTexture {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}

impl Drop for RecordedTexture {
    fn drop(&mut self) {
        self.stats.borrow_mut().textures_released += 1;
    }
}

/// Snapshot of the render state at the time of a draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub shader: Option<Shader>,
    pub primitive: Primitive,
    pub position: (f32, f32),
    pub color: Color,
    pub modelview: Mat4,
    pub texture: Option<usize>,
    pub texture_size: (f32, f32),
    pub vertex_buffer: usize,
    pub tex_coord_buffer: Option<usize>,
    /// Client-side indices, or `index_count` GPU indices for indexed draws.
    pub indices: Vec<u8>,
    pub index_count: u32,
}

#[derive(Debug, Clone)]
struct RenderState {
    shader: Option<Shader>,
    position: (f32, f32),
    color: Color,
    modelview: Mat4,
    texture: Option<usize>,
    texture_size: (f32, f32),
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            shader: None,
            position: (0.0, 0.0),
            color: Color::WHITE,
            modelview: IDENTITY,
            texture: None,
            texture_size: (0.0, 0.0),
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingGpu {
    stats: SharedStats,
    next_id: usize,
    fail_allocation: bool,
    fail_upload: bool,
    // buffer writes to let through before one fails
    fail_buffer_write: Option<usize>,
    written: HashMap<usize, Vec<u8>>,
    state: RenderState,
    draws: Vec<DrawCall>,
    max_texture_size: Option<u32>,
}

impl RecordingGpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects textures larger than `limit` on either side.
    pub fn with_max_texture_size(limit: u32) -> Self {
        Self {
            max_texture_size: Some(limit),
            ..Self::default()
        }
    }

    pub fn stats(&self) -> Stats {
        *self.stats.borrow()
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    pub fn take_draws(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.draws)
    }

    /// The next buffer or texture creation fails.
    pub fn fail_next_allocation(&mut self) {
        self.fail_allocation = true;
    }

    /// The next buffer write or texture upload fails.
    pub fn fail_next_upload(&mut self) {
        self.fail_upload = true;
    }

    /// Lets `skip` buffer writes succeed, then fails one. Texture uploads are
    /// not affected.
    pub fn fail_buffer_write_after(&mut self, skip: usize) {
        self.fail_buffer_write = Some(skip);
    }

    /// Last bytes successfully written to the buffer with `id`.
    pub fn written(&self, id: usize) -> Option<&[u8]> {
        self.written.get(&id).map(Vec::as_slice)
    }

    /// [`written`](Self::written) read back as 2-float points.
    pub fn written_points(&self, id: usize) -> Option<Vec<[f32; 2]>> {
        self.written(id).map(|bytes| {
            bytes
                .chunks_exact(8)
                .map(bytemuck::pod_read_unaligned)
                .collect()
        })
    }

    fn allocate(&mut self, what: &'static str) -> Result<usize, GpuError> {
        if std::mem::take(&mut self.fail_allocation) {
            return Err(GpuError::Allocation {
                what,
                reason: "injected failure".to_string(),
            });
        }
        self.next_id += 1;
        Ok(self.next_id)
    }

    fn check_upload(&mut self, what: &'static str) -> Result<(), GpuError> {
        if std::mem::take(&mut self.fail_upload) {
            return Err(GpuError::Allocation {
                what,
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn record(
        &mut self,
        primitive: Primitive,
        vertex_buffer: usize,
        tex_coord_buffer: Option<usize>,
        indices: Vec<u8>,
        index_count: u32,
    ) {
        let s = &self.state;
        self.draws.push(DrawCall {
            shader: s.shader,
            primitive,
            position: s.position,
            color: s.color,
            modelview: s.modelview,
            texture: s.texture,
            texture_size: s.texture_size,
            vertex_buffer,
            tex_coord_buffer,
            indices,
            index_count,
        });
    }
}

impl GpuDevice for RecordingGpu {
    type Buffer = RecordedBuffer;
    type Texture = RecordedTexture;

    fn create_buffer(&mut self, label: &'static str) -> Result<RecordedBuffer, GpuError> {
        let id = self.allocate("buffer")?;
        self.stats.borrow_mut().buffers_created += 1;
        Ok(RecordedBuffer {
            id,
            label,
            contents: Vec::new(),
            stats: self.stats.clone(),
        })
    }

    fn write_buffer(&mut self, buffer: &mut RecordedBuffer, contents: &[u8]) -> Result<(), GpuError> {
        self.check_upload("buffer data")?;
        match self.fail_buffer_write {
            Some(0) => {
                self.fail_buffer_write = None;
                return Err(GpuError::Allocation {
                    what: "buffer data",
                    reason: "injected failure".to_string(),
                });
            }
            Some(n) => self.fail_buffer_write = Some(n - 1),
            None => {}
        }
        self.written.insert(buffer.id, contents.to_vec());
        buffer.contents.clear();
        buffer.contents.extend_from_slice(contents);
        self.stats.borrow_mut().buffer_writes += 1;
        Ok(())
    }

    fn create_texture(&mut self, label: &'static str) -> Result<RecordedTexture, GpuError> {
        let id = self.allocate("texture")?;
        self.stats.borrow_mut().textures_created += 1;
        Ok(RecordedTexture {
            id,
            label,
            size: (0, 0),
            stats: self.stats.clone(),
        })
    }

    fn write_texture(
        &mut self,
        texture: &mut RecordedTexture,
        image: Option<TextureImage<'_>>,
    ) -> Result<(), GpuError> {
        self.check_upload("texture data")?;
        if let Some(image) = &image {
            image.validate()?;
            if let Some(limit) = self.max_texture_size {
                if image.width > limit || image.height > limit {
                    return Err(GpuError::TextureTooLarge {
                        width: image.width,
                        height: image.height,
                        limit,
                    });
                }
            }
        }

        texture.size = image.map_or((0, 0), |i| (i.width, i.height));
        self.stats.borrow_mut().texture_uploads += 1;
        Ok(())
    }
}

impl RenderContext for RecordingGpu {
    fn reset(&mut self) {
        let shader = self.state.shader;
        self.state = RenderState {
            shader,
            ..RenderState::default()
        };
    }

    fn use_shader(&mut self, shader: Shader) {
        self.state.shader = Some(shader);
    }

    fn set_position(&mut self, x: f32, y: f32) {
        self.state.position = (x, y);
    }

    fn set_color(&mut self, color: Color) {
        self.state.color = color;
    }

    fn set_modelview(&mut self, modelview: &Mat4) {
        self.state.modelview = *modelview;
    }

    fn set_texture_size(&mut self, width: f32, height: f32) {
        self.state.texture_size = (width, height);
    }

    fn bind_texture(&mut self, texture: Option<&RecordedTexture>) {
        self.state.texture = texture.map(RecordedTexture::id);
    }

    fn draw_elements(
        &mut self,
        primitive: Primitive,
        positions: &RecordedBuffer,
        tex_coords: Option<&RecordedBuffer>,
        indices: &[u8],
    ) {
        self.record(
            primitive,
            positions.id,
            tex_coords.map(RecordedBuffer::id),
            indices.to_vec(),
            indices.len() as u32,
        );
    }

    fn draw_indexed(
        &mut self,
        primitive: Primitive,
        vertices: &RecordedBuffer,
        _indices: &RecordedBuffer,
        index_count: u32,
    ) {
        self.record(primitive, vertices.id, None, Vec::new(), index_count);
    }
}
