//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! [`GlitchError`] covers:
//! - Backend failures (program instantiation, mesh upload)
//! - Configuration errors (malformed settings JSON)
//! - Frame graph declaration errors (unknown handles, aliasing)
//! - Execution errors (textures or globals the executor cannot resolve)
//!
//! None of these ever escape [`AnalogGlitchPass::evaluate`](crate::AnalogGlitchPass::evaluate):
//! the pass controller degrades every failure into a skipped frame. They
//! surface from constructors, config loading and [`RenderGraph::execute`](crate::RenderGraph::execute).

use thiserror::Error;

use crate::backend::ShaderProperty;
use crate::graph::TextureHandle;

/// The main error type for the analog glitch crate.
#[derive(Error, Debug)]
pub enum GlitchError {
    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// The backend could not create a program instance from a shader program.
    #[error("Failed to instantiate shader program '{program}': {reason}")]
    ProgramInstantiation {
        /// Label of the program that failed
        program: String,
        /// Backend-specific description
        reason: String,
    },

    /// The backend could not create the fullscreen triangle mesh.
    #[error("Failed to create mesh '{0}'")]
    MeshCreation(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Settings JSON could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    // ========================================================================
    // Frame Graph Errors
    // ========================================================================
    /// A pass referenced a texture the graph never declared.
    #[error("Unknown graph texture {0:?}")]
    UnknownTexture(TextureHandle),

    /// A pass both reads and writes the same texture.
    #[error("Pass '{pass}' reads and writes {texture:?}")]
    ReadWriteAliasing {
        /// Name of the offending pass
        pass: String,
        /// The aliased texture
        texture: TextureHandle,
    },

    /// A raster pass was declared without a color attachment at slot 0.
    #[error("Pass '{0}' has no color attachment")]
    MissingAttachment(String),

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// A pass reads or writes a texture the executor has no storage for
    /// (e.g. an imported texture that was never bound).
    #[error("Pass '{pass}' uses {texture:?}, which is not bound")]
    UnboundTexture {
        /// Name of the offending pass
        pass: String,
        /// The unbound texture
        texture: TextureHandle,
    },

    /// A draw needs a global texture that no pass has set.
    #[error("Pass '{pass}' draws without a bound '{}'", .property.name())]
    UnboundGlobal {
        /// Name of the offending pass
        pass: String,
        /// The missing global
        property: ShaderProperty,
    },

    /// A draw was issued outside of a raster pass.
    #[error("Draw issued outside of a raster pass")]
    DrawOutsidePass,
}

/// Alias for `Result<T, GlitchError>`.
pub type Result<T> = std::result::Result<T, GlitchError>;
