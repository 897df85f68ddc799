//! wgpu Backend
//!
//! GPU implementation of [`RenderBackend`] for the analog glitch pass.
//!
//! # Data Flow
//!
//! ```text
//! AnalogGlitchPass (prepare: derive values, declare pass)
//!        │
//!        ▼  RenderGraph::execute
//! WgpuRasterCommands ── transient textures ──► TransientTexturePool
//!        │
//!        ▼  draw_mesh
//! GlitchMaterial (uniform buffer + per-format pipeline cache)
//! ```
//!
//! # Bindings (group 0)
//!
//! | Binding | Resource |
//! |---------|----------|
//! | 0 | `main_tex`: source color, `texture_2d<f32>` |
//! | 1 | linear repeat sampler |
//! | 2 | `GlitchUniforms` uniform buffer |

mod commands;
mod material;
mod transient_pool;

use std::borrow::Cow;

use wgpu::util::DeviceExt;

use crate::backend::{MeshData, RenderBackend, SharedMesh};
use crate::errors::{GlitchError, Result};

pub use commands::WgpuRasterCommands;
pub use material::GlitchMaterial;
pub use transient_pool::{PooledTextureId, TransientTexturePool};

const GLITCH_SHADER_SOURCE: &str = include_str!("analog_glitch.wgsl");

/// The compiled analog glitch program.
pub struct GlitchShader {
    module: wgpu::ShaderModule,
    label: String,
}

impl GlitchShader {
    /// Compiles the bundled `analog_glitch.wgsl`.
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        Self::from_wgsl(device, "Analog Glitch Shader", GLITCH_SHADER_SOURCE)
    }

    /// Compiles a custom WGSL program.
    ///
    /// The source must expose `vs_main` / `fs_main` and the group 0 layout
    /// described in the [module docs](self).
    #[must_use]
    pub fn from_wgsl(device: &wgpu::Device, label: &str, source: &str) -> Self {
        log::debug!("Compiling glitch shader '{label}'");
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
        });
        Self {
            module,
            label: label.to_owned(),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Fullscreen triangle uploaded to GPU buffers.
pub struct WgpuMesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
}

/// wgpu implementation of [`RenderBackend`].
///
/// Owns clones of the device and queue plus the state every glitch
/// material shares: bind group layout, sampler and the fullscreen
/// triangle slot.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    fullscreen_triangle: SharedMesh<WgpuMesh>,
}

impl WgpuBackend {
    #[must_use]
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Analog Glitch BindGroup Layout"),
            entries: &[
                // Binding 0: Source texture
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Binding 1: Sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                // Binding 2: Uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        // Glitch UVs are wrapped with fract() in the shader; repeat keeps the
        // seam filtering consistent with that.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Analog Glitch Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            device: device.clone(),
            queue: queue.clone(),
            layout,
            sampler,
            fullscreen_triangle: SharedMesh::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    #[must_use]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub(crate) fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub(crate) fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

impl RenderBackend for WgpuBackend {
    type Program = GlitchShader;
    type Material = GlitchMaterial;
    type Mesh = WgpuMesh;

    fn create_material(&self, program: &GlitchShader) -> Result<GlitchMaterial> {
        Ok(GlitchMaterial::new(&self.device, &self.layout, program))
    }

    fn create_mesh(&self, data: &MeshData) -> Result<WgpuMesh> {
        if data.positions.is_empty() || data.indices.is_empty() {
            return Err(GlitchError::MeshCreation(data.name.to_owned()));
        }

        log::debug!("Uploading mesh '{}'", data.name);

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(data.name),
                contents: bytemuck::cast_slice(data.positions),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(data.name),
                contents: bytemuck::cast_slice(data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Ok(WgpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        })
    }

    fn shared_fullscreen_triangle(&self) -> &SharedMesh<WgpuMesh> {
        &self.fullscreen_triangle
    }
}
