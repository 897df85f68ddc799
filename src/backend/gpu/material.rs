//! Glitch program instance.

use glam::Vec2;
use rustc_hash::FxHashMap;

use super::GlitchShader;
use crate::backend::{Material, ShaderProperty};
use crate::params::GlitchUniforms;

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

/// One instance of the glitch program.
///
/// Holds CPU-side uniform values only. Each draw snapshots them into a
/// uniform buffer of its own, so one material can be drawn several times
/// (e.g. once per camera) before a single submit. Render pipelines are
/// compiled lazily, once per target format.
pub struct GlitchMaterial {
    module: wgpu::ShaderModule,
    label: String,
    pipeline_layout: wgpu::PipelineLayout,
    pub(crate) uniforms: GlitchUniforms,
    /// Typically 1 entry
    pipelines: FxHashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,
}

impl GlitchMaterial {
    pub(crate) fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        shader: &GlitchShader,
    ) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Analog Glitch Pipeline Layout"),
            bind_group_layouts: &[Some(layout)],
            immediate_size: 0,
        });

        Self {
            module: shader.module.clone(),
            label: shader.label.clone(),
            pipeline_layout,
            uniforms: GlitchUniforms::default(),
            pipelines: FxHashMap::default(),
        }
    }

    /// Current CPU-side uniform values.
    #[must_use]
    pub fn uniforms(&self) -> &GlitchUniforms {
        &self.uniforms
    }

    /// Gets or creates the pipeline for `format`.
    pub(crate) fn pipeline_for(
        &mut self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> &wgpu::RenderPipeline {
        let module = &self.module;
        let layout = &self.pipeline_layout;
        let label = &self.label;
        self.pipelines
            .entry(format)
            .or_insert_with(|| create_pipeline(device, module, layout, label, format))
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    module: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    label: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    log::debug!("Compiling analog glitch pipeline '{label}' for format {format:?}");

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &POSITION_ATTRIBUTES,
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

impl Material for GlitchMaterial {
    fn set_vector(&mut self, property: ShaderProperty, value: Vec2) {
        match property {
            ShaderProperty::ScanLineJitter => self.uniforms.scan_line_jitter = value,
            ShaderProperty::VerticalJump => self.uniforms.vertical_jump = value,
            ShaderProperty::ColorDrift => self.uniforms.color_drift = value,
            ShaderProperty::HorizontalShake | ShaderProperty::MainTex => {
                log::warn!("'{}' is not a vector property", property.name());
            }
        }
    }

    fn set_float(&mut self, property: ShaderProperty, value: f32) {
        if property == ShaderProperty::HorizontalShake {
            self.uniforms.horizontal_shake = value;
        } else {
            log::warn!("'{}' is not a float property", property.name());
        }
    }
}
