//! Rendering Backend Seam
//!
//! The glitch pass treats the shader as an opaque program with five named
//! inputs and the fullscreen triangle as an opaque mesh. A [`RenderBackend`]
//! supplies both:
//!
//! - `Program`: a compiled shader the host hands to the pass.
//! - `Material`: a program instance with its own uniform state, owned by a
//!   single pass.
//! - `Mesh`: uploaded geometry; the fullscreen triangle is shared through
//!   the backend's [`SharedMesh`] slot.
//!
//! [`gpu`] provides the wgpu implementation.

mod mesh;
pub mod gpu;

use glam::Vec2;

use crate::errors::Result;

pub use mesh::{FULLSCREEN_TRIANGLE, MeshData, SharedMesh};

/// Named inputs of the analog glitch program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderProperty {
    /// Source color texture, bound as a global.
    MainTex,
    /// `vec2(dispersion, threshold)`
    ScanLineJitter,
    /// `vec2(intensity, accumulated time)`
    VerticalJump,
    /// `f32`
    HorizontalShake,
    /// `vec2(amount, phase)`
    ColorDrift,
}

impl ShaderProperty {
    pub const ALL: [ShaderProperty; 5] = [
        Self::MainTex,
        Self::ScanLineJitter,
        Self::VerticalJump,
        Self::HorizontalShake,
        Self::ColorDrift,
    ];

    /// The name the property has in shader source.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MainTex => "main_tex",
            Self::ScanLineJitter => "scan_line_jitter",
            Self::VerticalJump => "vertical_jump",
            Self::HorizontalShake => "horizontal_shake",
            Self::ColorDrift => "color_drift",
        }
    }
}

/// A program instance with settable uniform values.
pub trait Material {
    fn set_vector(&mut self, property: ShaderProperty, value: Vec2);
    fn set_float(&mut self, property: ShaderProperty, value: f32);
}

/// Creates the GPU objects the glitch pass needs.
pub trait RenderBackend: Sized + 'static {
    /// Opaque compiled shader program.
    type Program: ?Sized;
    /// Program instance bound to a single pass.
    type Material: Material + 'static;
    /// Uploaded geometry.
    type Mesh: 'static;

    /// Creates a new program instance. Each call returns an independent
    /// instance with its own uniform state.
    fn create_material(&self, program: &Self::Program) -> Result<Self::Material>;

    fn create_mesh(&self, data: &MeshData) -> Result<Self::Mesh>;

    /// Slot holding the fullscreen triangle shared by every pass on this backend.
    fn shared_fullscreen_triangle(&self) -> &SharedMesh<Self::Mesh>;

    /// Returns the shared fullscreen triangle, creating it if no pass holds it.
    fn fullscreen_triangle(&self) -> Result<std::sync::Arc<Self::Mesh>> {
        self.shared_fullscreen_triangle()
            .get_or_try_create(|| self.create_mesh(&FULLSCREEN_TRIANGLE))
    }
}
