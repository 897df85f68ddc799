//! Raster pass declaration.
//!
//! A pass is declared now and executed later: the builder collects the
//! read set, color attachments and a render callback that captures its
//! per-frame data by value.

use smallvec::SmallVec;

use super::render_graph::RasterCommands;
use super::resource::TextureHandle;
use crate::backend::{RenderBackend, ShaderProperty};
use crate::errors::Result;

/// Render callback invoked when the pass executes.
pub type RenderFn<B> = Box<dyn FnOnce(&mut RasterGraphContext<'_, B>) -> Result<()>>;

/// One declared raster pass.
pub struct RasterPass<B: RenderBackend> {
    pub(crate) name: String,
    pub(crate) reads: SmallVec<[TextureHandle; 4]>,
    pub(crate) color_attachments: SmallVec<[Option<TextureHandle>; 4]>,
    pub(crate) allow_global_state_modification: bool,
    pub(crate) render: Option<RenderFn<B>>,
}

impl<B: RenderBackend> RasterPass<B> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Textures this pass samples.
    #[must_use]
    pub fn reads(&self) -> &[TextureHandle] {
        &self.reads
    }

    /// The texture bound at color attachment `index`, if any.
    #[must_use]
    pub fn color_attachment(&self, index: usize) -> Option<TextureHandle> {
        self.color_attachments.get(index).copied().flatten()
    }

    /// Iterates the bound color attachments in slot order.
    pub fn writes(&self) -> impl Iterator<Item = TextureHandle> + '_ {
        self.color_attachments.iter().filter_map(|a| *a)
    }

    #[must_use]
    pub fn allows_global_state_modification(&self) -> bool {
        self.allow_global_state_modification
    }

    #[must_use]
    pub fn has_render_func(&self) -> bool {
        self.render.is_some()
    }
}

/// Builder handed to [`RenderGraph::add_raster_pass`](super::RenderGraph::add_raster_pass).
pub struct RasterPassBuilder<B: RenderBackend> {
    pass: RasterPass<B>,
}

impl<B: RenderBackend> RasterPassBuilder<B> {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            pass: RasterPass {
                name: name.into(),
                reads: SmallVec::new(),
                color_attachments: SmallVec::new(),
                allow_global_state_modification: false,
                render: None,
            },
        }
    }

    /// Declares a sampled read of `texture`.
    pub fn read_texture(&mut self, texture: TextureHandle) -> &mut Self {
        if !self.pass.reads.contains(&texture) {
            self.pass.reads.push(texture);
        }
        self
    }

    /// Binds `texture` as the color attachment at `index`.
    pub fn set_render_attachment(&mut self, texture: TextureHandle, index: usize) -> &mut Self {
        if self.pass.color_attachments.len() <= index {
            self.pass.color_attachments.resize(index + 1, None);
        }
        self.pass.color_attachments[index] = Some(texture);
        self
    }

    /// Allows the render callback to change global shader state
    /// (e.g. [`RasterGraphContext::set_global_texture`]).
    pub fn allow_global_state_modification(&mut self, allow: bool) -> &mut Self {
        self.pass.allow_global_state_modification = allow;
        self
    }

    /// Sets the callback that records this pass's commands.
    pub fn set_render_func<F>(&mut self, render: F) -> &mut Self
    where
        F: FnOnce(&mut RasterGraphContext<'_, B>) -> Result<()> + 'static,
    {
        self.pass.render = Some(Box::new(render));
        self
    }

    pub(crate) fn finish(self) -> RasterPass<B> {
        self.pass
    }
}

/// Command context handed to a render callback.
///
/// Only exposes what a pass body may do: set globals and draw. Target
/// binding and resource realization stay with the graph.
pub struct RasterGraphContext<'a, B: RenderBackend> {
    cmd: &'a mut dyn RasterCommands<B>,
    allow_global_state_modification: bool,
}

impl<'a, B: RenderBackend> RasterGraphContext<'a, B> {
    pub(crate) fn new(
        cmd: &'a mut dyn RasterCommands<B>,
        allow_global_state_modification: bool,
    ) -> Self {
        Self {
            cmd,
            allow_global_state_modification,
        }
    }

    /// Binds `texture` as a globally visible sampled texture.
    ///
    /// Ignored (with a warning) unless the pass declared
    /// [`allow_global_state_modification`](RasterPassBuilder::allow_global_state_modification).
    pub fn set_global_texture(&mut self, property: ShaderProperty, texture: TextureHandle) {
        if !self.allow_global_state_modification {
            log::warn!(
                "Pass tried to set global {} without declaring global state modification",
                property.name()
            );
            return;
        }
        self.cmd.set_global_texture(property, texture);
    }

    /// Draws `mesh` with `material` into the pass's color attachments.
    pub fn draw_mesh(&mut self, mesh: &B::Mesh, material: &mut B::Material) -> Result<()> {
        self.cmd.draw_mesh(mesh, material)
    }
}
