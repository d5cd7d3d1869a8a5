//! wgpu execution of outline command streams
//!
//! A stream is encoded into a single `wgpu::CommandEncoder` and submitted
//! once. Per-command parameters live in one uniform buffer addressed with
//! dynamic offsets. Pipelines are created on first use and cached per
//! shader pass and silhouette sample count.

use contour_core::{
    BufferDescriptor, BufferFormat, BufferId, CommandStream, GeometryFilter, MaterialHandle,
    OutlineBackend, OutlineCommand, OutlineUniforms, ShaderPass,
};
use image::RgbaImage;
use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use crate::error::{GpuError, Result};
use crate::primitives::{GpuMesh, GpuVertex};
use crate::shaders;

/// Handle of the built-in outline material
pub const OUTLINE_MATERIAL: MaterialHandle = MaterialHandle(0);

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const MASK_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;
const UNIFORM_SIZE: u64 = std::mem::size_of::<OutlineUniforms>() as u64;

/// Configuration for creating a GPU backend
#[derive(Clone, Debug)]
pub struct GpuConfig {
    /// Adapter power preference
    pub power_preference: wgpu::PowerPreference,
    /// Store nearest points as `Rg16Snorm` when the adapter can render to it
    pub prefer_snorm_distance: bool,
    /// Use a software adapter
    pub force_fallback_adapter: bool,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            prefer_snorm_distance: true,
            force_fallback_adapter: false,
        }
    }
}

struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    descriptor: BufferDescriptor,
}

struct PassPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

struct UniformRing {
    buffer: wgpu::Buffer,
    stride: u64,
    capacity: u64,
}

/// Headless wgpu backend
pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    nearest_format: wgpu::TextureFormat,
    mask_sample_counts: Vec<u32>,
    uniforms: UniformRing,
    pipelines: FxHashMap<(ShaderPass, u32), PassPipeline>,
    textures: FxHashMap<BufferId, GpuTexture>,
    color_target: Option<wgpu::Texture>,
    meshes: Vec<GpuMesh>,
}

impl GpuBackend {
    /// Create a backend on a new headless device
    pub async fn new(config: GpuConfig) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: config.power_preference,
                compatible_surface: None,
                force_fallback_adapter: config.force_fallback_adapter,
            })
            .await
            .ok_or(GpuError::AdapterNotFound)?;

        let info = adapter.get_info();
        tracing::debug!(name = %info.name, backend = ?info.backend, "selected adapter");

        let snorm = wgpu::TextureFormat::Rg16Snorm;
        let snorm_renderable = adapter
            .features()
            .contains(wgpu::Features::TEXTURE_FORMAT_16BIT_NORM)
            && adapter
                .get_texture_format_features(snorm)
                .allowed_usages
                .contains(wgpu::TextureUsages::RENDER_ATTACHMENT);
        let (nearest_format, required_features) = if config.prefer_snorm_distance && snorm_renderable
        {
            (snorm, wgpu::Features::TEXTURE_FORMAT_16BIT_NORM)
        } else {
            (wgpu::TextureFormat::Rg32Float, wgpu::Features::empty())
        };
        tracing::debug!(format = ?nearest_format, "nearest point format");

        let mask_flags = adapter.get_texture_format_features(MASK_FORMAT).flags;
        let mask_sample_counts: Vec<u32> = [1, 2, 4, 8]
            .into_iter()
            .filter(|n| mask_flags.sample_count_supported(*n))
            .collect();

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Contour GPU Device"),
                    required_features,
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await?;

        let stride = align_to(
            UNIFORM_SIZE,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let uniforms = UniformRing {
            buffer: create_uniform_buffer(&device, stride * 16),
            stride,
            capacity: 16,
        };

        Ok(Self {
            device,
            queue,
            nearest_format,
            mask_sample_counts,
            uniforms,
            pipelines: FxHashMap::default(),
            textures: FxHashMap::default(),
            color_target: None,
            meshes: Vec::new(),
        })
    }

    pub fn outline_material(&self) -> MaterialHandle {
        OUTLINE_MATERIAL
    }

    pub fn nearest_format(&self) -> wgpu::TextureFormat {
        self.nearest_format
    }

    pub fn set_meshes(&mut self, meshes: Vec<GpuMesh>) {
        self.meshes = meshes;
    }

    pub fn meshes(&self) -> &[GpuMesh] {
        &self.meshes
    }

    pub fn live_buffers(&self) -> usize {
        self.textures.len()
    }

    /// Largest mask sample count the adapter supports, not above `requested`
    pub fn mask_sample_count(&self, requested: u32) -> u32 {
        self.mask_sample_counts
            .iter()
            .copied()
            .filter(|n| *n <= requested.max(1))
            .max()
            .unwrap_or(1)
    }

    /// Upload `image` as the camera color target (linear RGBA8)
    pub fn set_color_target(&mut self, image: &RgbaImage) {
        let (width, height) = image.dimensions();
        let texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some("Contour Color Target"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: COLOR_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::COPY_SRC
                    | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            image.as_raw(),
        );
        self.color_target = Some(texture);
    }

    /// Read the camera color target back to the CPU
    pub fn read_color_target(&self) -> Result<RgbaImage> {
        let texture = self.color_target.as_ref().ok_or(GpuError::NoColorTarget)?;
        let (width, height) = (texture.width(), texture.height());
        let bytes_per_row = padded_bytes_per_row(width);

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Contour Readback Buffer"),
            size: (bytes_per_row * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Contour Readback Encoder"),
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
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| GpuError::Readback(e.to_string()))?
            .map_err(|e| GpuError::Readback(e.to_string()))?;

        let data = slice.get_mapped_range();
        let row_bytes = (width * 4) as usize;
        let mut pixels = Vec::with_capacity(row_bytes * height as usize);
        for row in data.chunks(bytes_per_row as usize).take(height as usize) {
            pixels.extend_from_slice(&row[..row_bytes]);
        }
        drop(data);
        buffer.unmap();

        RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| GpuError::Readback("pixel buffer size mismatch".to_string()))
    }

    fn texture_format(&self, format: BufferFormat) -> wgpu::TextureFormat {
        match format {
            BufferFormat::R8Unorm => MASK_FORMAT,
            BufferFormat::Rg16Snorm => self.nearest_format,
            BufferFormat::Rgba8Unorm => COLOR_FORMAT,
        }
    }

    fn create_texture(&self, id: BufferId, descriptor: &BufferDescriptor) -> Result<GpuTexture> {
        let mut descriptor = *descriptor;
        match descriptor.format {
            BufferFormat::R8Unorm => {
                let supported = self.mask_sample_count(descriptor.sample_count);
                if supported != descriptor.sample_count {
                    tracing::debug!(
                        requested = descriptor.sample_count,
                        supported,
                        "clamping silhouette sample count"
                    );
                }
                descriptor.sample_count = supported;
            }
            BufferFormat::Rg16Snorm => descriptor.sample_count = 1,
            BufferFormat::Rgba8Unorm => return Err(GpuError::UnsupportedFormat(descriptor.format)),
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(id.name()),
            size: wgpu::Extent3d {
                width: descriptor.width,
                height: descriptor.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: descriptor.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: self.texture_format(descriptor.format),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(GpuTexture {
            texture,
            view,
            descriptor,
        })
    }

    fn ensure_pipeline(&mut self, pass: ShaderPass, samples: u32) {
        if self.pipelines.contains_key(&(pass, samples)) {
            return;
        }
        tracing::debug!(?pass, samples, "creating pipeline");
        let pipeline = self.create_pipeline(pass, samples);
        self.pipelines.insert((pass, samples), pipeline);
    }

    fn create_pipeline(&self, pass: ShaderPass, samples: u32) -> PassPipeline {
        let multisampled = samples > 1;
        let mut entries = vec![uniform_entry()];
        match pass {
            ShaderPass::SilhouetteFill | ShaderPass::InteriorStencil => {}
            ShaderPass::JfaInit => entries.push(texture_entry(1, multisampled)),
            ShaderPass::JfaFlood | ShaderPass::JfaFloodSingleAxis => {
                entries.push(texture_entry(1, false))
            }
            ShaderPass::JfaOutline => {
                entries.push(texture_entry(1, multisampled));
                entries.push(texture_entry(2, false));
            }
        }

        let bind_group_layout =
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Contour Pass Bind Group Layout"),
                    entries: &entries,
                });
        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Contour Pass Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let source = shaders::source(pass, multisampled);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Contour Outline Shader"),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

        let silhouette_draw = matches!(
            pass,
            ShaderPass::SilhouetteFill | ShaderPass::InteriorStencil
        );
        let vertex_buffers = [GpuVertex::layout()];
        let (format, blend, sample_count) = match pass {
            ShaderPass::SilhouetteFill | ShaderPass::InteriorStencil => (MASK_FORMAT, None, samples),
            ShaderPass::JfaInit | ShaderPass::JfaFlood | ShaderPass::JfaFloodSingleAxis => {
                (self.nearest_format, None, 1)
            }
            ShaderPass::JfaOutline => (
                COLOR_FORMAT,
                Some(wgpu::BlendState {
                    color: wgpu::BlendComponent {
                        src_factor: wgpu::BlendFactor::SrcAlpha,
                        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                        operation: wgpu::BlendOperation::Add,
                    },
                    alpha: wgpu::BlendComponent {
                        src_factor: wgpu::BlendFactor::One,
                        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                        operation: wgpu::BlendOperation::Add,
                    },
                }),
                1,
            ),
        };

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Contour Pass Pipeline"),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some("vs_main"),
                    buffers: if silhouette_draw {
                        &vertex_buffers
                    } else {
                        &[]
                    },
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some(shaders::fragment_entry(pass)),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState {
                    count: sample_count,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            });

        PassPipeline {
            pipeline,
            bind_group_layout,
        }
    }

    /// Write every command's parameters into the uniform ring and create the
    /// pipelines the stream needs. Returns one slot per drawing command.
    fn prepare(&mut self, stream: &CommandStream) -> Result<Vec<Option<u32>>> {
        let mut descriptors: FxHashMap<BufferId, BufferDescriptor> = self
            .textures
            .iter()
            .map(|(id, texture)| (*id, texture.descriptor))
            .collect();
        let samples_of = |descriptors: &FxHashMap<BufferId, BufferDescriptor>, id: &BufferId| {
            descriptors
                .get(id)
                .map(|d| d.sample_count)
                .ok_or(GpuError::UnknownBuffer(*id))
        };

        let mut slots = Vec::with_capacity(stream.len());
        let mut staged: Vec<OutlineUniforms> = Vec::new();
        let mut needed = Vec::new();

        for command in stream {
            let (uniforms, pass, samples) = match command {
                OutlineCommand::Allocate { id, descriptor } => {
                    let mut descriptor = *descriptor;
                    if descriptor.format == BufferFormat::R8Unorm {
                        descriptor.sample_count = self.mask_sample_count(descriptor.sample_count);
                    }
                    descriptors.insert(*id, descriptor);
                    slots.push(None);
                    continue;
                }
                OutlineCommand::Clear { .. } | OutlineCommand::Release { .. } => {
                    slots.push(None);
                    continue;
                }
                OutlineCommand::DrawSilhouette {
                    target, material, ..
                } => {
                    check_material(*material)?;
                    let descriptor = descriptors
                        .get(target)
                        .ok_or(GpuError::UnknownBuffer(*target))?;
                    let mut uniforms: OutlineUniforms = bytemuck::Zeroable::zeroed();
                    uniforms.target_size = [descriptor.width as f32, descriptor.height as f32];
                    uniforms.sample_count = descriptor.sample_count;
                    (uniforms, ShaderPass::SilhouetteFill, descriptor.sample_count)
                }
                OutlineCommand::JfaInit {
                    source,
                    material,
                    uniforms,
                    ..
                } => {
                    check_material(*material)?;
                    let samples = samples_of(&descriptors, source)?;
                    (*uniforms, ShaderPass::JfaInit, samples)
                }
                OutlineCommand::Flood {
                    material, uniforms, ..
                } => {
                    check_material(*material)?;
                    (*uniforms, ShaderPass::JfaFlood, 1)
                }
                OutlineCommand::FloodAxis {
                    material, uniforms, ..
                } => {
                    check_material(*material)?;
                    (*uniforms, ShaderPass::JfaFloodSingleAxis, 1)
                }
                OutlineCommand::Composite {
                    silhouette,
                    material,
                    uniforms,
                    ..
                } => {
                    check_material(*material)?;
                    let samples = samples_of(&descriptors, silhouette)?;
                    (*uniforms, ShaderPass::JfaOutline, samples)
                }
            };
            slots.push(Some(staged.len() as u32));
            staged.push(uniforms);
            needed.push((pass, samples));
        }

        for (pass, samples) in needed {
            self.ensure_pipeline(pass, samples);
        }

        if staged.len() as u64 > self.uniforms.capacity {
            let capacity = (staged.len() as u64).next_power_of_two();
            self.uniforms.buffer = create_uniform_buffer(&self.device, self.uniforms.stride * capacity);
            self.uniforms.capacity = capacity;
        }
        let stride = self.uniforms.stride as usize;
        let mut bytes = vec![0u8; stride * staged.len()];
        for (i, uniforms) in staged.iter().enumerate() {
            bytes[i * stride..i * stride + UNIFORM_SIZE as usize]
                .copy_from_slice(bytemuck::bytes_of(uniforms));
        }
        if !bytes.is_empty() {
            self.queue.write_buffer(&self.uniforms.buffer, 0, &bytes);
        }
        Ok(slots)
    }

    fn bind_group(&self, pipeline: &PassPipeline, views: &[&wgpu::TextureView]) -> wgpu::BindGroup {
        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &self.uniforms.buffer,
                offset: 0,
                size: wgpu::BufferSize::new(UNIFORM_SIZE),
            }),
        }];
        for (i, view) in views.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: i as u32 + 1,
                resource: wgpu::BindingResource::TextureView(view),
            });
        }
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Contour Pass Bind Group"),
            layout: &pipeline.bind_group_layout,
            entries: &entries,
        })
    }

    fn texture(&self, id: BufferId) -> Result<&GpuTexture> {
        self.textures.get(&id).ok_or(GpuError::UnknownBuffer(id))
    }

    fn pipeline(&self, pass: ShaderPass, samples: u32) -> Result<&PassPipeline> {
        self.pipelines
            .get(&(pass, samples))
            .ok_or(GpuError::MissingPipeline(pass))
    }

    fn offset(&self, slot: Option<u32>) -> u32 {
        slot.map(|s| s * self.uniforms.stride as u32).unwrap_or(0)
    }

    fn silhouette_vertices(&self, filter: &GeometryFilter) -> Vec<GpuVertex> {
        self.meshes
            .iter()
            .filter(|mesh| filter.matches(mesh.layer, mesh.render_queue))
            .flat_map(|mesh| mesh.vertices.iter().copied())
            .collect()
    }

    /// Fullscreen pass writing every texel of `target`
    fn fullscreen(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pass: ShaderPass,
        samples: u32,
        target: &wgpu::TextureView,
        load: wgpu::LoadOp<wgpu::Color>,
        views: &[&wgpu::TextureView],
        slot: Option<u32>,
    ) -> Result<()> {
        let pipeline = self.pipeline(pass, samples)?;
        let bind_group = self.bind_group(pipeline, views);
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Contour Fullscreen Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        render_pass.set_pipeline(&pipeline.pipeline);
        render_pass.set_bind_group(0, &bind_group, &[self.offset(slot)]);
        render_pass.draw(0..3, 0..1);
        Ok(())
    }

    fn encode(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        command: &OutlineCommand,
        slot: Option<u32>,
        retired: &mut Vec<GpuTexture>,
    ) -> Result<()> {
        match command {
            OutlineCommand::Allocate { id, descriptor } => {
                if self.textures.contains_key(id) {
                    return Err(GpuError::AlreadyAllocated(*id));
                }
                let texture = self.create_texture(*id, descriptor)?;
                self.textures.insert(*id, texture);
            }
            OutlineCommand::Clear { id } => {
                let texture = self.texture(*id)?;
                let _clear = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Contour Clear Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &texture.view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(clear_value(texture.descriptor.format)),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
            }
            OutlineCommand::DrawSilhouette { target, filter, .. } => {
                let texture = self.texture(*target)?;
                let vertices = self.silhouette_vertices(filter);
                if vertices.is_empty() {
                    return Ok(());
                }
                let vertex_buffer =
                    self.device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some("Contour Silhouette Vertices"),
                            contents: bytemuck::cast_slice(&vertices),
                            usage: wgpu::BufferUsages::VERTEX,
                        });
                let samples = texture.descriptor.sample_count;
                let pipeline = self.pipeline(ShaderPass::SilhouetteFill, samples)?;
                let bind_group = self.bind_group(pipeline, &[]);

                let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Contour Silhouette Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &texture.view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
                render_pass.set_pipeline(&pipeline.pipeline);
                render_pass.set_bind_group(0, &bind_group, &[self.offset(slot)]);
                render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                render_pass.draw(0..vertices.len() as u32, 0..1);
            }
            OutlineCommand::JfaInit { source, target, .. } => {
                let silhouette = self.texture(*source)?;
                let field = self.texture(*target)?;
                self.fullscreen(
                    encoder,
                    ShaderPass::JfaInit,
                    silhouette.descriptor.sample_count,
                    &field.view,
                    wgpu::LoadOp::Clear(clear_value(BufferFormat::Rg16Snorm)),
                    &[&silhouette.view],
                    slot,
                )?;
            }
            OutlineCommand::Flood { source, target, .. }
            | OutlineCommand::FloodAxis { source, target, .. } => {
                let pass = match command {
                    OutlineCommand::Flood { .. } => ShaderPass::JfaFlood,
                    _ => ShaderPass::JfaFloodSingleAxis,
                };
                let src = self.texture(*source)?;
                let dst = self.texture(*target)?;
                self.fullscreen(
                    encoder,
                    pass,
                    1,
                    &dst.view,
                    wgpu::LoadOp::Clear(clear_value(BufferFormat::Rg16Snorm)),
                    &[&src.view],
                    slot,
                )?;
            }
            OutlineCommand::Composite {
                source, silhouette, ..
            } => {
                let field = self.texture(*source)?;
                let mask = self.texture(*silhouette)?;
                let color = self.color_target.as_ref().ok_or(GpuError::NoColorTarget)?;
                let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
                self.fullscreen(
                    encoder,
                    ShaderPass::JfaOutline,
                    mask.descriptor.sample_count,
                    &color_view,
                    wgpu::LoadOp::Load,
                    &[&mask.view, &field.view],
                    slot,
                )?;
            }
            OutlineCommand::Release { id } => {
                let texture = self.textures.remove(id).ok_or(GpuError::UnknownBuffer(*id))?;
                retired.push(texture);
            }
        }
        Ok(())
    }
}

impl OutlineBackend for GpuBackend {
    type Error = GpuError;

    fn submit(&mut self, stream: &CommandStream) -> Result<()> {
        let slots = self.prepare(stream)?;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(stream.label()),
            });
        let mut retired = Vec::new();
        for (command, slot) in stream.iter().zip(slots) {
            tracing::trace!(command = command.label(), "encode");
            self.encode(&mut encoder, command, slot, &mut retired)?;
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        tracing::debug!(
            stream = stream.label(),
            commands = stream.len(),
            released = retired.len(),
            "gpu submit"
        );
        for texture in retired {
            texture.texture.destroy();
        }
        Ok(())
    }

    fn release(&mut self, id: BufferId) {
        if let Some(texture) = self.textures.remove(&id) {
            tracing::debug!(buffer = %id, "released");
            texture.texture.destroy();
        }
    }
}

fn check_material(material: MaterialHandle) -> Result<()> {
    if material == OUTLINE_MATERIAL {
        Ok(())
    } else {
        Err(GpuError::UnknownMaterial(material))
    }
}

fn clear_value(format: BufferFormat) -> wgpu::Color {
    match format {
        BufferFormat::Rg16Snorm => wgpu::Color {
            r: -1.0,
            g: -1.0,
            b: 0.0,
            a: 0.0,
        },
        BufferFormat::R8Unorm | BufferFormat::Rgba8Unorm => wgpu::Color::TRANSPARENT,
    }
}

fn uniform_entry() -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: true,
            min_binding_size: wgpu::BufferSize::new(UNIFORM_SIZE),
        },
        count: None,
    }
}

fn texture_entry(binding: u32, multisampled: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled,
        },
        count: None,
    }
}

fn create_uniform_buffer(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Contour Uniform Buffer"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn align_to(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment.max(1)) * alignment.max(1)
}

/// Row pitch for texture-to-buffer copies of RGBA8 data
fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}
