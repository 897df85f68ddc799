//! Analog Glitch Render Pass
//!
//! Screen-space "broken analog video" effect: scanline jitter, vertical
//! jump, horizontal shake and color drift, applied in a single fullscreen
//! draw.
//!
//! # Data Flow
//!
//! ```text
//! ParameterSource ──► EffectParameters
//!                          │
//!                          ▼  evaluate() (per frame, per camera)
//! AnalogGlitchPass ── advances vertical_jump_time, derives uniforms
//!                          │
//!                          ▼  declares raster pass
//! active color ──read──► [glitch pass] ──write──► transient destination
//!                                                     │
//!                                                     ▼
//!                                  published as the new active color
//! ```
//!
//! Every failure on the per-frame path is a skip: the frame keeps its
//! unmodified source image and nothing is declared in the graph.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::backend::{Material, RenderBackend, ShaderProperty};
use crate::frame::{CameraView, FrameResources, FrameTime};
use crate::graph::{RasterGraphContext, RenderGraph, RenderStage, TextureHandle};
use crate::params::{DerivedShaderParameters, advance_vertical_jump_time};
use crate::settings::ParameterSource;

/// Default pass name, used for the graph pass and in diagnostics.
pub const RENDER_PASS_NAME: &str = "AnalogGlitch RenderPass";

/// Pass configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitchPassConfig {
    /// Name of the declared graph pass.
    pub name: String,
    /// Where the host should schedule the pass.
    pub stage: RenderStage,
    /// Repeat the missing-intermediate-texture warning on every offending
    /// frame instead of once per streak.
    pub warn_every_frame: bool,
}

impl Default for GlitchPassConfig {
    fn default() -> Self {
        Self {
            name: RENDER_PASS_NAME.to_owned(),
            stage: RenderStage::AfterPostProcess,
            warn_every_frame: false,
        }
    }
}

impl GlitchPassConfig {
    /// Parses a config from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Why a frame was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The program instance could not be created.
    ProgramUnavailable,
    /// Editor / tooling preview camera.
    PreviewCamera,
    /// Post-processing is disabled for this camera.
    PostProcessingDisabled,
    /// The parameter source has nothing for this frame.
    ParametersUnavailable,
    /// Parameters resolved with `is_active == false`.
    Inactive,
    /// The active color target is the backbuffer with no intermediate texture.
    MissingIntermediateTexture,
    /// The active color handle is not declared in the graph.
    UnknownSource,
    /// The fullscreen triangle could not be created.
    GeometryUnavailable,
    /// The source cannot be sampled through a filtering 2D binding
    /// (multisampled, layered, depth, integer or non-filterable float).
    UnsupportedSource,
}

/// Result of [`AnalogGlitchPass::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// A pass was declared; `destination` is now the frame's active color.
    Recorded { destination: TextureHandle },
    Skipped(SkipReason),
}

impl PassOutcome {
    #[must_use]
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded { .. })
    }
}

/// Data captured by value into the render callback.
struct PassData<B: RenderBackend> {
    source: TextureHandle,
    material: Arc<Mutex<B::Material>>,
    mesh: Arc<B::Mesh>,
    derived: DerivedShaderParameters,
}

/// The analog glitch pass controller.
///
/// Owns one program instance and the vertical jump accumulator. The
/// fullscreen triangle is shared with every other pass on the same backend
/// and released when the last of them is dropped.
pub struct AnalogGlitchPass<B: RenderBackend> {
    config: GlitchPassConfig,
    material: Option<Arc<Mutex<B::Material>>>,
    mesh: Option<Arc<B::Mesh>>,
    parameters: Box<dyn ParameterSource>,
    vertical_jump_time: f32,
    /// Inside a streak of frames without an intermediate texture.
    warned_missing_intermediate: bool,
}

impl<B: RenderBackend> AnalogGlitchPass<B> {
    /// Creates a pass with the default configuration.
    ///
    /// A failed program instantiation is not fatal: the pass is constructed
    /// and skips every frame.
    pub fn new<P>(backend: &B, program: &B::Program, parameters: P) -> Self
    where
        P: ParameterSource + 'static,
    {
        Self::with_config(backend, program, parameters, GlitchPassConfig::default())
    }

    pub fn with_config<P>(
        backend: &B,
        program: &B::Program,
        parameters: P,
        config: GlitchPassConfig,
    ) -> Self
    where
        P: ParameterSource + 'static,
    {
        let material = match backend.create_material(program) {
            Ok(material) => Some(Arc::new(Mutex::new(material))),
            Err(err) => {
                log::debug!("{}: program unavailable: {err}", config.name);
                None
            }
        };
        log::debug!(
            "{}: scheduled at stage {}",
            config.name,
            config.stage.name()
        );

        Self {
            config,
            material,
            mesh: None,
            parameters: Box::new(parameters),
            vertical_jump_time: 0.0,
            warned_missing_intermediate: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    #[inline]
    #[must_use]
    pub fn stage(&self) -> RenderStage {
        self.config.stage
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &GlitchPassConfig {
        &self.config
    }

    /// Accumulated vertical jump phase. Only advances on recorded frames.
    #[inline]
    #[must_use]
    pub fn vertical_jump_time(&self) -> f32 {
        self.vertical_jump_time
    }

    #[inline]
    #[must_use]
    pub fn has_program(&self) -> bool {
        self.material.is_some()
    }

    /// Replaces the parameter source.
    pub fn set_parameter_source<P>(&mut self, parameters: P)
    where
        P: ParameterSource + 'static,
    {
        self.parameters = Box::new(parameters);
    }

    fn warn_missing_intermediate(&mut self) {
        if self.config.warn_every_frame || !self.warned_missing_intermediate {
            log::warn!(
                "{} requires an intermediate color texture. Render the camera into an offscreen color target instead of the swap-chain image.",
                self.config.name
            );
        } else {
            log::debug!("{}: still no intermediate color texture", self.config.name);
        }
        self.warned_missing_intermediate = true;
    }

    /// Decides whether the effect runs this frame and, if so, declares its
    /// raster pass in `graph` and publishes the destination texture as
    /// `resources.active_color`.
    ///
    /// On any skip `resources` is left untouched and the vertical jump
    /// accumulator does not advance.
    pub fn evaluate(
        &mut self,
        backend: &B,
        graph: &mut RenderGraph<B>,
        camera: &CameraView,
        resources: &mut FrameResources,
        time: FrameTime,
    ) -> PassOutcome {
        match self.record(backend, graph, camera, resources, time) {
            Ok(destination) => PassOutcome::Recorded { destination },
            Err(reason) => {
                log::trace!("{}: skipped ({reason:?})", self.config.name);
                PassOutcome::Skipped(reason)
            }
        }
    }

    fn record(
        &mut self,
        backend: &B,
        graph: &mut RenderGraph<B>,
        camera: &CameraView,
        resources: &mut FrameResources,
        time: FrameTime,
    ) -> Result<TextureHandle, SkipReason> {
        // =====================================================================
        // 1. Activity gate
        // =====================================================================
        let material = self.material.clone().ok_or(SkipReason::ProgramUnavailable)?;
        if camera.is_preview() {
            return Err(SkipReason::PreviewCamera);
        }
        if !camera.post_processing_enabled {
            return Err(SkipReason::PostProcessingDisabled);
        }
        let params = self
            .parameters
            .resolve()
            .ok_or(SkipReason::ParametersUnavailable)?
            .saturated();
        if !params.is_active {
            return Err(SkipReason::Inactive);
        }

        if resources.active_target_is_backbuffer {
            self.warn_missing_intermediate();
            return Err(SkipReason::MissingIntermediateTexture);
        }
        self.warned_missing_intermediate = false;

        // =====================================================================
        // 2. Shared geometry
        // =====================================================================
        let mesh = match &self.mesh {
            Some(mesh) => mesh.clone(),
            None => {
                let mesh = backend.fullscreen_triangle().map_err(|err| {
                    log::debug!("{}: geometry unavailable: {err}", self.config.name);
                    SkipReason::GeometryUnavailable
                })?;
                self.mesh = Some(mesh.clone());
                mesh
            }
        };

        // =====================================================================
        // 3. Destination texture
        // =====================================================================
        let source = resources.active_color;
        let mut desc = graph
            .texture_desc(source)
            .cloned()
            .ok_or(SkipReason::UnknownSource)?;
        if !desc.is_filterable_2d() {
            log::debug!(
                "{}: cannot sample '{}' ({:?}, {} samples)",
                self.config.name,
                desc.label,
                desc.format,
                desc.sample_count
            );
            return Err(SkipReason::UnsupportedSource);
        }
        desc.clear_on_bind = false;
        desc.label = format!("CameraColor-{}", self.config.name);
        desc.usage |= wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
        let destination = graph.create_texture(desc);

        // =====================================================================
        // 4. Derive shader values
        // =====================================================================
        self.vertical_jump_time = advance_vertical_jump_time(
            self.vertical_jump_time,
            time.delta_seconds,
            params.vertical_jump,
        );
        let derived =
            DerivedShaderParameters::derive(&params, self.vertical_jump_time, time.time_seconds);

        // =====================================================================
        // 5. Declare the pass
        // =====================================================================
        let data = PassData::<B> {
            source,
            material,
            mesh,
            derived,
        };
        graph.add_raster_pass(self.config.name.clone(), |builder| {
            builder
                .read_texture(source)
                .set_render_attachment(destination, 0)
                .allow_global_state_modification(true)
                .set_render_func(move |ctx| execute_pass(&data, ctx));
        });

        // =====================================================================
        // 6. Publish
        // =====================================================================
        resources.active_color = destination;
        Ok(destination)
    }
}

impl<B: RenderBackend> Drop for AnalogGlitchPass<B> {
    fn drop(&mut self) {
        if let Some(mesh) = self.mesh.take()
            && Arc::strong_count(&mesh) == 1
        {
            log::debug!("{}: releasing shared fullscreen triangle", self.config.name);
        }
        if self.material.take().is_some() {
            log::debug!("{}: releasing program instance", self.config.name);
        }
    }
}

/// Render callback: pushes the uniforms, binds the source and draws.
fn execute_pass<B: RenderBackend>(
    data: &PassData<B>,
    ctx: &mut RasterGraphContext<'_, B>,
) -> crate::Result<()> {
    let d = &data.derived;
    let mut material = data.material.lock();
    material.set_vector(ShaderProperty::ScanLineJitter, d.scan_line_jitter);
    material.set_vector(ShaderProperty::VerticalJump, d.vertical_jump);
    material.set_float(ShaderProperty::HorizontalShake, d.horizontal_shake);
    material.set_vector(ShaderProperty::ColorDrift, d.color_drift);

    ctx.set_global_texture(ShaderProperty::MainTex, data.source);
    ctx.draw_mesh(&data.mesh, &mut material)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_runs_after_post_processing() {
        let config = GlitchPassConfig::default();
        assert_eq!(config.name, RENDER_PASS_NAME);
        assert_eq!(config.stage, RenderStage::AfterPostProcess);
        assert!(!config.warn_every_frame);
    }

    #[test]
    fn config_json_overrides_only_given_fields() {
        let config =
            GlitchPassConfig::from_json(r#"{ "stage": "UI", "warn_every_frame": true }"#).unwrap();
        assert_eq!(config.name, RENDER_PASS_NAME);
        assert_eq!(config.stage, RenderStage::UI);
        assert!(config.warn_every_frame);
    }

    #[test]
    fn outcome_reports_recording() {
        let skipped = PassOutcome::Skipped(SkipReason::Inactive);
        assert!(!skipped.is_recorded());
    }
}
