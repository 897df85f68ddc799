//! Command recording for graph execution on wgpu.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use wgpu::util::DeviceExt;

use super::transient_pool::TransientTexturePool;
use super::{GlitchMaterial, WgpuBackend, WgpuMesh};
use crate::backend::ShaderProperty;
use crate::errors::{GlitchError, Result};
use crate::graph::{GraphExecutor, RasterAttachment, RasterCommands, TextureDesc, TextureHandle};

struct BoundTexture {
    view: wgpu::TextureView,
    format: wgpu::TextureFormat,
    /// Only known for transients realized from the pool.
    texture: Option<wgpu::Texture>,
}

struct ActivePass {
    name: String,
    attachments: SmallVec<[RasterAttachment; 4]>,
}

/// Records a [`RenderGraph`](crate::RenderGraph) into a `wgpu::CommandEncoder`.
///
/// Every imported texture a pass touches must be bound with
/// [`bind_texture`](Self::bind_texture) before execution; otherwise
/// [`RenderGraph::execute`](crate::RenderGraph::execute) fails with
/// [`GlitchError::UnboundTexture`].
///
/// # Usage
///
/// ```rust,ignore
/// let mut commands = WgpuRasterCommands::new(&backend, &mut encoder, &mut pool, time.time_seconds);
/// commands.bind_texture(scene_color, &scene_color_view, scene_color_format);
/// graph.execute(&mut commands)?;
/// let glitched = commands.view(resources.active_color).cloned();
///
/// queue.submit(std::iter::once(encoder.finish()));
/// pool.reset();
/// ```
pub struct WgpuRasterCommands<'a> {
    backend: &'a WgpuBackend,
    encoder: &'a mut wgpu::CommandEncoder,
    pool: &'a mut TransientTexturePool,
    textures: FxHashMap<TextureHandle, BoundTexture>,
    globals: FxHashMap<ShaderProperty, TextureHandle>,
    current: Option<ActivePass>,
    time_seconds: f32,
}

impl<'a> WgpuRasterCommands<'a> {
    /// `time_seconds` seeds the shader's noise.
    pub fn new(
        backend: &'a WgpuBackend,
        encoder: &'a mut wgpu::CommandEncoder,
        pool: &'a mut TransientTexturePool,
        time_seconds: f32,
    ) -> Self {
        Self {
            backend,
            encoder,
            pool,
            textures: FxHashMap::default(),
            globals: FxHashMap::default(),
            current: None,
            time_seconds,
        }
    }

    /// Binds the view backing an imported graph texture.
    pub fn bind_texture(
        &mut self,
        texture: TextureHandle,
        view: &wgpu::TextureView,
        format: wgpu::TextureFormat,
    ) {
        self.textures.insert(
            texture,
            BoundTexture {
                view: view.clone(),
                format,
                texture: None,
            },
        );
    }

    /// The view backing `texture`, once bound or realized.
    #[must_use]
    pub fn view(&self, texture: TextureHandle) -> Option<&wgpu::TextureView> {
        self.textures.get(&texture).map(|t| &t.view)
    }

    /// The pooled texture backing a transient, e.g. for a readback copy.
    #[must_use]
    pub fn texture(&self, texture: TextureHandle) -> Option<&wgpu::Texture> {
        self.textures.get(&texture).and_then(|t| t.texture.as_ref())
    }
}

impl RasterCommands<WgpuBackend> for WgpuRasterCommands<'_> {
    fn set_global_texture(&mut self, property: ShaderProperty, texture: TextureHandle) {
        self.globals.insert(property, texture);
    }

    fn draw_mesh(&mut self, mesh: &WgpuMesh, material: &mut GlitchMaterial) -> Result<()> {
        let pass = self.current.as_ref().ok_or(GlitchError::DrawOutsidePass)?;
        let attachment = pass
            .attachments
            .first()
            .ok_or_else(|| GlitchError::MissingAttachment(pass.name.clone()))?;
        let target = self.textures.get(&attachment.texture).ok_or_else(|| {
            GlitchError::UnboundTexture {
                pass: pass.name.clone(),
                texture: attachment.texture,
            }
        })?;
        let source_handle = self.globals.get(&ShaderProperty::MainTex).ok_or_else(|| {
            GlitchError::UnboundGlobal {
                pass: pass.name.clone(),
                property: ShaderProperty::MainTex,
            }
        })?;
        let source = self
            .textures
            .get(source_handle)
            .ok_or_else(|| GlitchError::UnboundTexture {
                pass: pass.name.clone(),
                texture: *source_handle,
            })?;

        let device = self.backend.device();

        // Snapshot per draw: a shared buffer written with `write_buffer`
        // would only hold the last values at submit time.
        material.uniforms.time = self.time_seconds;
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Analog Glitch Uniforms"),
            contents: bytemuck::bytes_of(&material.uniforms),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Analog Glitch BindGroup"),
            layout: self.backend.layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&source.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(self.backend.sampler()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline = material.pipeline_for(device, target.format);

        let load = if attachment.clear {
            wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT)
        } else {
            // Every pixel is overwritten by the fullscreen triangle.
            wgpu::LoadOp::DontCare(wgpu::LoadOpDontCare::default())
        };

        let mut rpass = self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&pass.name),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        Ok(())
    }
}

impl GraphExecutor<WgpuBackend> for WgpuRasterCommands<'_> {
    fn create_transient(&mut self, texture: TextureHandle, desc: &TextureDesc) {
        let id = self.pool.allocate(self.backend.device(), desc);
        self.textures.insert(
            texture,
            BoundTexture {
                view: self.pool.view(id).clone(),
                format: desc.format,
                texture: Some(self.pool.texture(id).clone()),
            },
        );
    }

    fn begin_raster_pass(
        &mut self,
        name: &str,
        reads: &[TextureHandle],
        attachments: &[RasterAttachment],
    ) -> Result<()> {
        let used = reads.iter().chain(attachments.iter().map(|a| &a.texture));
        for &texture in used {
            if !self.textures.contains_key(&texture) {
                return Err(GlitchError::UnboundTexture {
                    pass: name.to_owned(),
                    texture,
                });
            }
        }

        self.encoder.push_debug_group(name);
        self.current = Some(ActivePass {
            name: name.to_owned(),
            attachments: attachments.iter().copied().collect(),
        });
        Ok(())
    }

    fn end_raster_pass(&mut self) {
        if self.current.take().is_some() {
            self.encoder.pop_debug_group();
        }
    }
}
