//! wgpu implementation of the render seam.
//!
//! Draw calls are not encoded immediately. Each one is queued together with a
//! snapshot of the uniforms in effect, and [`WgpuRenderer::render`] replays the
//! queue in a single render pass.

use crate::error::GpuError;
use crate::render::{GpuDevice, Primitive, RenderContext, Shader, TextureImage};
use crate::utils::{Color, Mat4, IDENTITY};
use bytemuck::{Pod, Zeroable};
use log::{debug, warn};
use pollster::block_on;
use std::borrow::Cow;
use std::collections::HashMap;
use std::rc::Rc;
use wgpu::util::DeviceExt;

/// Dynamic uniform offsets must be aligned to this.
const UNIFORM_STRIDE: u64 = 256;
const COPY_BYTES_PER_ROW_ALIGNMENT: usize = 256;
const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8Unorm;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct DrawUniform {
    modelview: [[f32; 4]; 4],
    offset: [f32; 2],
    texture_size: [f32; 2],
    color: [f32; 4],
    viewport: [f32; 2],
    _pad: [f32; 2],
}

pub struct WgpuBuffer {
    label: &'static str,
    inner: Option<Rc<wgpu::Buffer>>,
}

impl WgpuBuffer {
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn size(&self) -> u64 {
        self.inner.as_ref().map_or(0, |b| b.size())
    }
}

struct TextureSlot {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

pub struct WgpuTexture {
    label: &'static str,
    size: (u32, u32),
    inner: Option<Rc<TextureSlot>>,
}

impl WgpuTexture {
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}

#[derive(Clone)]
struct RenderState {
    shader: Shader,
    position: [f32; 2],
    color: Color,
    modelview: Mat4,
    texture: Option<Rc<TextureSlot>>,
    texture_size: [f32; 2],
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            shader: Shader::StyleQuad,
            position: [0.0, 0.0],
            color: Color::WHITE,
            modelview: IDENTITY,
            texture: None,
            texture_size: [0.0, 0.0],
        }
    }
}

enum DrawIndices {
    /// Client indices, copied into the frame's index buffer.
    Client(Vec<u16>),
    Buffer(Rc<wgpu::Buffer>, u32),
}

struct QueuedDraw {
    pipeline: (Shader, Primitive),
    uniform: DrawUniform,
    texture: Option<Rc<TextureSlot>>,
    vertices: Rc<wgpu::Buffer>,
    tex_coords: Option<Rc<wgpu::Buffer>>,
    indices: DrawIndices,
}

pub struct WgpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    target_format: wgpu::TextureFormat,
    viewport: (u32, u32),
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    pipelines: HashMap<(Shader, Primitive), wgpu::RenderPipeline>,
    white: Rc<TextureSlot>,
    state: RenderState,
    frame: Vec<QueuedDraw>,
    clear_color: wgpu::Color,
}

impl WgpuRenderer {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        target_format: wgpu::TextureFormat,
        viewport: (u32, u32),
    ) -> Result<Self, GpuError> {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<DrawUniform>() as _,
                    ),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tuber pipeline layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let stylequad = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("stylequad"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                "../../shaders/stylequad.wgsl"
            ))),
        });
        let text = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("text"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                "../../shaders/text.wgsl"
            ))),
        });

        let point_layout = [
            wgpu::VertexBufferLayout {
                array_stride: 8,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x2],
            },
            wgpu::VertexBufferLayout {
                array_stride: 8,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![1 => Float32x2],
            },
        ];
        let glyph_layout = [wgpu::VertexBufferLayout {
            array_stride: 16,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x4],
        }];

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let mut pipelines = HashMap::new();
        for primitive in [
            Primitive::Triangles,
            Primitive::TriangleStrip,
            Primitive::LineLoop,
        ] {
            pipelines.insert(
                (Shader::StyleQuad, primitive),
                create_pipeline(
                    &device,
                    &pipeline_layout,
                    target_format,
                    &stylequad,
                    &point_layout,
                    primitive,
                ),
            );
        }
        pipelines.insert(
            (Shader::Alpha, Primitive::Triangles),
            create_pipeline(
                &device,
                &pipeline_layout,
                target_format,
                &text,
                &glyph_layout,
                Primitive::Triangles,
            ),
        );
        if let Some(err) = block_on(device.pop_error_scope()) {
            return Err(GpuError::Allocation {
                what: "render pipelines",
                reason: err.to_string(),
            });
        }

        let white = Rc::new(create_texture_slot(
            &device,
            &queue,
            &texture_layout,
            &sampler,
            "white",
            TextureImage {
                width: 1,
                height: 1,
                bgra: &[255, 255, 255, 255],
            },
        ));

        Ok(Self {
            device,
            queue,
            target_format,
            viewport,
            uniform_layout,
            texture_layout,
            sampler,
            pipelines,
            white,
            state: RenderState::default(),
            frame: Vec::new(),
            clear_color: wgpu::Color::TRANSPARENT,
        })
    }

    /// Creates a renderer without a window, for offscreen rendering.
    pub fn headless(width: u32, height: u32) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let adapter = block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
            compatible_surface: None,
        }))
        .ok_or_else(|| GpuError::Allocation {
            what: "adapter",
            reason: "no suitable adapter found".to_string(),
        })?;

        let (device, queue) = block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("tuber device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        ))
        .map_err(|e| GpuError::Allocation {
            what: "device",
            reason: e.to_string(),
        })?;

        debug!("headless renderer on {:?}", adapter.get_info().name);
        Self::new(device, queue, wgpu::TextureFormat::Rgba8Unorm, (width, height))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = wgpu::Color {
            r: color.r as f64,
            g: color.g as f64,
            b: color.b as f64,
            a: color.a as f64,
        };
    }

    /// Number of draws waiting for the next [`render`](Self::render).
    pub fn queued_draws(&self) -> usize {
        self.frame.len()
    }

    /// An offscreen colour target matching the viewport.
    pub fn create_target(&self) -> wgpu::Texture {
        self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen target"),
            size: wgpu::Extent3d {
                width: self.viewport.0,
                height: self.viewport.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.target_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }

    /// Encodes every queued draw into one pass over `view` and submits it.
    pub fn render(&mut self, view: &wgpu::TextureView) {
        let frame = std::mem::take(&mut self.frame);

        let mut uniform_bytes = vec![0u8; frame.len().max(1) * UNIFORM_STRIDE as usize];
        let mut client_indices: Vec<u16> = Vec::new();
        let mut client_ranges = Vec::with_capacity(frame.len());
        for (i, draw) in frame.iter().enumerate() {
            let start = i * UNIFORM_STRIDE as usize;
            uniform_bytes[start..start + std::mem::size_of::<DrawUniform>()]
                .copy_from_slice(bytemuck::bytes_of(&draw.uniform));

            let first = client_indices.len() as u32;
            if let DrawIndices::Client(indices) = &draw.indices {
                client_indices.extend_from_slice(indices);
            }
            client_ranges.push(first..client_indices.len() as u32);
        }
        // keep the index buffer non-empty and 4 byte aligned
        client_indices.resize(client_indices.len().max(2).next_multiple_of(2), 0);

        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("frame uniforms"),
                contents: &uniform_bytes,
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("frame indices"),
                contents: bytemuck::cast_slice(&client_indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let uniform_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame uniform bind group"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniform>() as _),
                }),
            }],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tuber frame"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tuber pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (i, draw) in frame.iter().enumerate() {
                let Some(pipeline) = self.pipelines.get(&draw.pipeline) else {
                    warn!("no pipeline for {:?}", draw.pipeline);
                    continue;
                };
                let texture = draw.texture.as_ref().unwrap_or(&self.white);

                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, &uniform_bind_group, &[(i as u64 * UNIFORM_STRIDE) as u32]);
                rpass.set_bind_group(1, &texture.bind_group, &[]);
                rpass.set_vertex_buffer(0, draw.vertices.slice(..));
                if draw.pipeline.0 == Shader::StyleQuad {
                    // untextured draws ignore the coordinates, any buffer will do
                    let coords = draw.tex_coords.as_ref().unwrap_or(&draw.vertices);
                    rpass.set_vertex_buffer(1, coords.slice(..));
                }

                match &draw.indices {
                    DrawIndices::Client(_) => {
                        rpass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                        rpass.draw_indexed(client_ranges[i].clone(), 0, 0..1);
                    }
                    DrawIndices::Buffer(buffer, count) => {
                        rpass.set_index_buffer(buffer.slice(..), wgpu::IndexFormat::Uint32);
                        rpass.draw_indexed(0..*count, 0, 0..1);
                    }
                }
            }
        }
        self.queue.submit(Some(encoder.finish()));
    }

    /// Copies `texture` back to the CPU as tightly packed RGBA rows.
    pub fn read_rgba(&self, texture: &wgpu::Texture) -> Result<Vec<u8>, GpuError> {
        let width = texture.width();
        let height = texture.height();
        let unpadded = width as usize * 4;
        let padded = unpadded.next_multiple_of(COPY_BYTES_PER_ROW_ALIGNMENT);

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback"),
            size: (padded * height as usize) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded as u32),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(Some(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);

        let mapped = rx
            .recv()
            .map_err(|e| e.to_string())
            .and_then(|r| r.map_err(|e| e.to_string()));
        if let Err(reason) = mapped {
            return Err(GpuError::Allocation {
                what: "readback buffer",
                reason,
            });
        }

        let data = slice.get_mapped_range();
        let mut rgba = Vec::with_capacity(unpadded * height as usize);
        for row in data.chunks(padded) {
            rgba.extend_from_slice(&row[..unpadded]);
        }
        drop(data);
        buffer.unmap();

        if matches!(
            texture.format(),
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        ) {
            for px in rgba.chunks_exact_mut(4) {
                px.swap(0, 2);
            }
        }
        Ok(rgba)
    }

    fn snapshot_uniform(&self) -> DrawUniform {
        let s = &self.state;
        DrawUniform {
            modelview: s.modelview,
            offset: s.position,
            texture_size: s.texture_size,
            color: s.color.to_array(),
            viewport: [self.viewport.0 as f32, self.viewport.1 as f32],
            _pad: [0.0; 2],
        }
    }

    fn with_error_scope<T>(
        &self,
        what: &'static str,
        create: impl FnOnce() -> T,
    ) -> Result<T, GpuError> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = create();
        let validation = block_on(self.device.pop_error_scope());
        let oom = block_on(self.device.pop_error_scope());

        match validation.or(oom) {
            Some(err) => {
                warn!("{} allocation failed: {}", what, err);
                Err(GpuError::Allocation {
                    what,
                    reason: err.to_string(),
                })
            }
            None => Ok(value),
        }
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    target_format: wgpu::TextureFormat,
    module: &wgpu::ShaderModule,
    buffers: &[wgpu::VertexBufferLayout<'_>],
    primitive: Primitive,
) -> wgpu::RenderPipeline {
    let (topology, strip_index_format) = match primitive {
        Primitive::Triangles => (wgpu::PrimitiveTopology::TriangleList, None),
        Primitive::TriangleStrip => (
            wgpu::PrimitiveTopology::TriangleStrip,
            Some(wgpu::IndexFormat::Uint16),
        ),
        // line loops are queued as closed line strips
        Primitive::LineLoop => (
            wgpu::PrimitiveTopology::LineStrip,
            Some(wgpu::IndexFormat::Uint16),
        ),
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("tuber pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Rows padded to the copy alignment.
fn padded_rows(image: &TextureImage<'_>) -> (Vec<u8>, usize) {
    let unpadded = image.width as usize * 4;
    let padded = unpadded.next_multiple_of(COPY_BYTES_PER_ROW_ALIGNMENT);
    let mut out = vec![0u8; padded * image.height as usize];
    for (y, row) in image.bgra.chunks_exact(unpadded).enumerate() {
        out[y * padded..y * padded + unpadded].copy_from_slice(row);
    }
    (out, padded)
}

fn create_texture_slot(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    label: &str,
    image: TextureImage<'_>,
) -> TextureSlot {
    let size = wgpu::Extent3d {
        width: image.width,
        height: image.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    let (padded_buffer, padded_bytes_per_row) = padded_rows(&image);
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("texture upload"),
        contents: &padded_buffer,
        usage: wgpu::BufferUsages::COPY_SRC,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("texture upload encoder"),
    });
    encoder.copy_buffer_to_texture(
        wgpu::ImageCopyBuffer {
            buffer: &buffer,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(padded_bytes_per_row as u32),
                rows_per_image: Some(image.height),
            },
        },
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        size,
    );
    queue.submit(std::iter::once(encoder.finish()));

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    TextureSlot {
        _texture: texture,
        bind_group,
    }
}

impl GpuDevice for WgpuRenderer {
    type Buffer = WgpuBuffer;
    type Texture = WgpuTexture;

    fn create_buffer(&mut self, label: &'static str) -> Result<WgpuBuffer, GpuError> {
        Ok(WgpuBuffer { label, inner: None })
    }

    fn write_buffer(&mut self, buffer: &mut WgpuBuffer, contents: &[u8]) -> Result<(), GpuError> {
        if contents.is_empty() {
            buffer.inner = None;
            return Ok(());
        }

        let label = buffer.label;
        let created = self.with_error_scope(label, || {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::INDEX,
                })
        })?;
        buffer.inner = Some(Rc::new(created));
        Ok(())
    }

    fn create_texture(&mut self, label: &'static str) -> Result<WgpuTexture, GpuError> {
        Ok(WgpuTexture {
            label,
            size: (0, 0),
            inner: None,
        })
    }

    fn write_texture(
        &mut self,
        texture: &mut WgpuTexture,
        image: Option<TextureImage<'_>>,
    ) -> Result<(), GpuError> {
        let Some(image) = image.filter(|i| i.width > 0 && i.height > 0) else {
            texture.inner = None;
            texture.size = (0, 0);
            return Ok(());
        };
        image.validate()?;

        let limit = self.device.limits().max_texture_dimension_2d;
        if image.width > limit || image.height > limit {
            return Err(GpuError::TextureTooLarge {
                width: image.width,
                height: image.height,
                limit,
            });
        }

        let slot = self.with_error_scope(texture.label, || {
            create_texture_slot(
                &self.device,
                &self.queue,
                &self.texture_layout,
                &self.sampler,
                texture.label,
                image,
            )
        })?;
        texture.inner = Some(Rc::new(slot));
        texture.size = (image.width, image.height);
        Ok(())
    }
}

impl RenderContext for WgpuRenderer {
    fn reset(&mut self) {
        let shader = self.state.shader;
        self.state = RenderState {
            shader,
            ..RenderState::default()
        };
    }

    fn use_shader(&mut self, shader: Shader) {
        self.state.shader = shader;
    }

    fn set_position(&mut self, x: f32, y: f32) {
        self.state.position = [x, y];
    }

    fn set_color(&mut self, color: Color) {
        self.state.color = color;
    }

    fn set_modelview(&mut self, modelview: &Mat4) {
        self.state.modelview = *modelview;
    }

    fn set_texture_size(&mut self, width: f32, height: f32) {
        self.state.texture_size = [width, height];
    }

    fn bind_texture(&mut self, texture: Option<&WgpuTexture>) {
        self.state.texture = texture.and_then(|t| t.inner.clone());
    }

    fn draw_elements(
        &mut self,
        primitive: Primitive,
        positions: &WgpuBuffer,
        tex_coords: Option<&WgpuBuffer>,
        indices: &[u8],
    ) {
        let Some(vertices) = positions.inner.clone() else {
            return;
        };

        let mut indices: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
        if primitive == Primitive::LineLoop {
            if let Some(&first) = indices.first() {
                indices.push(first);
            }
        }

        self.frame.push(QueuedDraw {
            pipeline: (self.state.shader, primitive),
            uniform: self.snapshot_uniform(),
            texture: self.state.texture.clone(),
            vertices,
            tex_coords: tex_coords.and_then(|b| b.inner.clone()),
            indices: DrawIndices::Client(indices),
        });
    }

    fn draw_indexed(
        &mut self,
        primitive: Primitive,
        vertices: &WgpuBuffer,
        indices: &WgpuBuffer,
        index_count: u32,
    ) {
        let (Some(vertices), Some(index_buffer)) = (vertices.inner.clone(), indices.inner.clone())
        else {
            return;
        };

        self.frame.push(QueuedDraw {
            pipeline: (self.state.shader, primitive),
            uniform: self.snapshot_uniform(),
            texture: self.state.texture.clone(),
            vertices,
            tex_coords: None,
            indices: DrawIndices::Buffer(index_buffer, index_count),
        });
    }
}
