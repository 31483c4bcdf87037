//! The GPU seam.
//!
//! Engines never talk to a graphics API directly. Resource creation goes
//! through [`GpuDevice`], draw state and draw calls through [`RenderContext`].
//! Handles are plain owned values: dropping a `Buffer` or `Texture` releases
//! the GPU object, so nothing needs an explicit `fini`.

use crate::error::GpuError;
use crate::utils::{Color, Mat4};
use bytemuck::Pod;

/// Fixed shader programs provided by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shader {
    /// Solid colour or textured quads; positions and texture coordinates come
    /// from two separate 2-float buffers.
    StyleQuad,
    /// Coverage-alpha glyphs tinted by the current colour; interleaved
    /// `[x, y, s, t]` vertices.
    Alpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Triangles,
    TriangleStrip,
    LineLoop,
}

/// Pixel upload for a texture. Rows are stored top first, 4 bytes per texel in
/// B, G, R, A order.
#[derive(Debug, Clone, Copy)]
pub struct TextureImage<'a> {
    pub width: u32,
    pub height: u32,
    pub bgra: &'a [u8],
}

impl TextureImage<'_> {
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    pub fn validate(&self) -> Result<(), GpuError> {
        if self.bgra.len() != self.expected_len() {
            return Err(GpuError::PixelDataSize {
                expected: self.expected_len(),
                actual: self.bgra.len(),
            });
        }
        Ok(())
    }
}

pub trait GpuDevice {
    type Buffer;
    type Texture;

    fn create_buffer(&mut self, label: &'static str) -> Result<Self::Buffer, GpuError>;

    /// Replaces the whole content of `buffer`.
    fn write_buffer(&mut self, buffer: &mut Self::Buffer, contents: &[u8])
        -> Result<(), GpuError>;

    fn create_texture(&mut self, label: &'static str) -> Result<Self::Texture, GpuError>;

    /// Replaces the texture image. `None` leaves an empty (zero sized) texture.
    fn write_texture(
        &mut self,
        texture: &mut Self::Texture,
        image: Option<TextureImage<'_>>,
    ) -> Result<(), GpuError>;
}

/// Fixed-pipeline draw state. State persists between draws until changed or
/// until [`RenderContext::reset`].
pub trait RenderContext: GpuDevice {
    /// Identity model-view, zero offset, opaque white, no texture.
    fn reset(&mut self);
    fn use_shader(&mut self, shader: Shader);
    /// Pixel offset added to every vertex position.
    fn set_position(&mut self, x: f32, y: f32);
    fn set_color(&mut self, color: Color);
    fn set_modelview(&mut self, modelview: &Mat4);
    /// Size in texels of the bound texture; zero selects untextured drawing.
    fn set_texture_size(&mut self, width: f32, height: f32);
    fn bind_texture(&mut self, texture: Option<&Self::Texture>);

    /// Draws from separate position / texture-coordinate buffers using a
    /// client-side index list.
    fn draw_elements(
        &mut self,
        primitive: Primitive,
        positions: &Self::Buffer,
        tex_coords: Option<&Self::Buffer>,
        indices: &[u8],
    );

    /// Draws interleaved vertices with a GPU index buffer.
    fn draw_indexed(
        &mut self,
        primitive: Primitive,
        vertices: &Self::Buffer,
        indices: &Self::Buffer,
        index_count: u32,
    );
}

/// CPU-side vertex/index store mirrored into a pair of GPU buffers.
///
/// Items are staged with `clear` and `push_back` and become current on a
/// successful `upload`. Until then the accessors and `render` keep showing
/// the previous upload.
pub struct VertexBuffer<G: GpuDevice, V: Pod> {
    vertices: Vec<V>,
    indices: Vec<u32>,
    items: usize,
    staged_vertices: Vec<V>,
    staged_indices: Vec<u32>,
    staged_items: usize,
    gpu_vertices: G::Buffer,
    gpu_indices: G::Buffer,
}

impl<G: GpuDevice, V: Pod> VertexBuffer<G, V> {
    pub fn new(gpu: &mut G, label: &'static str) -> Result<Self, GpuError> {
        Ok(Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            items: 0,
            staged_vertices: Vec::new(),
            staged_indices: Vec::new(),
            staged_items: 0,
            gpu_vertices: gpu.create_buffer(label)?,
            gpu_indices: gpu.create_buffer(label)?,
        })
    }

    pub fn clear(&mut self) {
        self.staged_vertices.clear();
        self.staged_indices.clear();
        self.staged_items = 0;
    }

    pub fn push_back(&mut self, vertices: &[V], indices: &[u32]) {
        let base = self.staged_vertices.len() as u32;
        self.staged_vertices.extend_from_slice(vertices);
        self.staged_indices.extend(indices.iter().map(|i| base + i));
        self.staged_items += 1;
    }

    /// Uploads the staged items and makes them current. On failure the
    /// previous contents stay current on both sides.
    pub fn upload(&mut self, gpu: &mut G) -> Result<(), GpuError> {
        gpu.write_buffer(
            &mut self.gpu_vertices,
            bytemuck::cast_slice(&self.staged_vertices),
        )?;

        if let Err(e) = gpu.write_buffer(
            &mut self.gpu_indices,
            bytemuck::cast_slice(&self.staged_indices),
        ) {
            // put the old vertices back; if even that fails draw nothing
            if gpu
                .write_buffer(&mut self.gpu_vertices, bytemuck::cast_slice(&self.vertices))
                .is_err()
            {
                self.vertices.clear();
                self.indices.clear();
                self.items = 0;
            }
            return Err(e);
        }

        std::mem::swap(&mut self.vertices, &mut self.staged_vertices);
        std::mem::swap(&mut self.indices, &mut self.staged_indices);
        self.items = self.staged_items;
        self.clear();
        Ok(())
    }

    /// Number of uploaded items.
    pub fn len(&self) -> usize {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items == 0
    }

    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

impl<G: RenderContext, V: Pod> VertexBuffer<G, V> {
    pub fn render(&self, gpu: &mut G, primitive: Primitive) {
        gpu.draw_indexed(
            primitive,
            &self.gpu_vertices,
            &self.gpu_indices,
            self.indices.len() as u32,
        );
    }
}
