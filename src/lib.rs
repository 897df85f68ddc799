//! Analog Glitch
//!
//! A single-pass screen-space "broken analog video" effect for frame-graph
//! based renderers: scanline jitter, vertical jump, horizontal shake and
//! color drift.
//!
//! # Overview
//!
//! - [`AnalogGlitchPass`]: the pass controller. Each frame it gates on camera
//!   and parameter state, derives shader values, allocates a transient
//!   destination texture and records one raster pass into a [`RenderGraph`].
//! - [`settings`]: user-facing configuration and the per-frame
//!   [`EffectParameters`] snapshot.
//! - [`backend`]: the rendering backend seam, plus a wgpu implementation.
//!
//! ```rust,ignore
//! let mut pass = AnalogGlitchPass::new(&backend, &shader, settings.clone());
//!
//! let mut graph = RenderGraph::new();
//! let mut resources = FrameResources::new(graph.import_texture(scene_color_desc));
//! pass.evaluate(&backend, &mut graph, &camera, &mut resources, timer.frame_time());
//! graph.execute(&mut commands)?;
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod backend;
pub mod errors;
pub mod frame;
pub mod graph;
pub mod params;
pub mod pass;
pub mod settings;

pub use backend::{Material, RenderBackend, ShaderProperty, SharedMesh};
pub use errors::{GlitchError, Result};
pub use frame::{CameraKind, CameraView, FrameResources, FrameTime, Timer};
pub use graph::{
    GraphExecutor, RasterCommands, RenderGraph, RenderStage, TextureDesc, TextureHandle,
};
pub use params::{DerivedShaderParameters, GlitchUniforms};
pub use pass::{AnalogGlitchPass, GlitchPassConfig, PassOutcome, SkipReason};
pub use settings::{AnalogGlitchSettings, EffectParameters, ParameterSource};
