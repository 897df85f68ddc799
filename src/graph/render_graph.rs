//! Render Graph Executor
//!
//! `RenderGraph` records texture declarations and raster passes for one
//! frame, validates them, and replays them against a [`GraphExecutor`].
//!
//! # Execution Model
//!
//! - Passes execute in declaration order on the calling thread.
//! - Transient textures are realized by the executor before the first pass
//!   runs; imported textures must already be bound.
//! - Each pass is bracketed by `begin_raster_pass` / `end_raster_pass`, and
//!   its render callback runs in between with a [`RasterGraphContext`].
//! - The first executor or callback error stops execution and is returned.
//!
//! The graph is consumed by [`execute`](RenderGraph::execute); build a new
//! one every frame.

use smallvec::SmallVec;

use super::builder::{RasterGraphContext, RasterPass, RasterPassBuilder};
use super::resource::{TextureDesc, TextureHandle};
use crate::backend::{RenderBackend, ShaderProperty};
use crate::errors::{GlitchError, Result};

/// Commands a render callback may issue.
pub trait RasterCommands<B: RenderBackend> {
    /// Binds `texture` as a globally visible sampled texture under `property`.
    fn set_global_texture(&mut self, property: ShaderProperty, texture: TextureHandle);

    /// Draws `mesh` with `material` into the current pass's attachments.
    fn draw_mesh(&mut self, mesh: &B::Mesh, material: &mut B::Material) -> Result<()>;
}

/// Color attachment as seen by the executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RasterAttachment {
    pub texture: TextureHandle,
    /// Clear before drawing instead of loading existing contents.
    pub clear: bool,
}

/// Backend-side sink that realizes resources and brackets passes.
pub trait GraphExecutor<B: RenderBackend>: RasterCommands<B> {
    /// Creates backing storage for a transient texture.
    fn create_transient(&mut self, texture: TextureHandle, desc: &TextureDesc);

    /// Opens a pass. Fails if any of `reads` or `attachments` has no
    /// backing storage; the pass is then neither rendered nor ended.
    fn begin_raster_pass(
        &mut self,
        name: &str,
        reads: &[TextureHandle],
        attachments: &[RasterAttachment],
    ) -> Result<()>;

    fn end_raster_pass(&mut self);
}

struct TextureEntry {
    desc: TextureDesc,
    imported: bool,
}

/// Per-frame render graph.
pub struct RenderGraph<B: RenderBackend> {
    textures: Vec<TextureEntry>,
    passes: Vec<RasterPass<B>>,
}

impl<B: RenderBackend> Default for RenderGraph<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: RenderBackend> RenderGraph<B> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            textures: Vec::new(),
            passes: Vec::new(),
        }
    }

    fn push_texture(&mut self, desc: TextureDesc, imported: bool) -> TextureHandle {
        let handle = TextureHandle(self.textures.len() as u32);
        self.textures.push(TextureEntry { desc, imported });
        handle
    }

    /// Declares a texture owned outside the graph (e.g. the scene color).
    pub fn import_texture(&mut self, desc: TextureDesc) -> TextureHandle {
        self.push_texture(desc, true)
    }

    /// Declares a transient texture the executor allocates for this frame.
    pub fn create_texture(&mut self, desc: TextureDesc) -> TextureHandle {
        self.push_texture(desc, false)
    }

    /// Returns the descriptor of a declared texture.
    #[must_use]
    pub fn texture_desc(&self, texture: TextureHandle) -> Option<&TextureDesc> {
        self.textures.get(texture.index()).map(|e| &e.desc)
    }

    #[must_use]
    pub fn is_imported(&self, texture: TextureHandle) -> bool {
        self.textures
            .get(texture.index())
            .is_some_and(|e| e.imported)
    }

    /// Declares a raster pass. `setup` configures it through the builder.
    pub fn add_raster_pass<F>(&mut self, name: impl Into<String>, setup: F)
    where
        F: FnOnce(&mut RasterPassBuilder<B>),
    {
        let mut builder = RasterPassBuilder::new(name);
        setup(&mut builder);
        self.passes.push(builder.finish());
    }

    #[inline]
    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    #[inline]
    #[must_use]
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    pub fn passes(&self) -> impl Iterator<Item = &RasterPass<B>> {
        self.passes.iter()
    }

    fn check_handle(&self, texture: TextureHandle) -> Result<()> {
        if texture.index() < self.textures.len() {
            Ok(())
        } else {
            Err(GlitchError::UnknownTexture(texture))
        }
    }

    /// Checks every pass: known handles, an attachment at slot 0, and no
    /// texture both read and written by the same pass.
    pub fn validate(&self) -> Result<()> {
        for pass in &self.passes {
            for &read in &pass.reads {
                self.check_handle(read)?;
            }
            if pass.color_attachment(0).is_none() {
                return Err(GlitchError::MissingAttachment(pass.name.clone()));
            }
            for write in pass.writes() {
                self.check_handle(write)?;
                if pass.reads.contains(&write) {
                    return Err(GlitchError::ReadWriteAliasing {
                        pass: pass.name.clone(),
                        texture: write,
                    });
                }
            }
        }
        Ok(())
    }

    /// Validates and runs every pass against `executor`, consuming the graph.
    ///
    /// Nothing is executed if validation fails. The first pass that fails to
    /// begin or render stops execution and its error is returned; the caller
    /// must not present textures written by this graph.
    pub fn execute<E>(self, executor: &mut E) -> Result<()>
    where
        E: GraphExecutor<B>,
    {
        self.validate()?;

        for (index, entry) in self.textures.iter().enumerate() {
            if !entry.imported {
                executor.create_transient(TextureHandle(index as u32), &entry.desc);
            }
        }

        for pass in self.passes {
            let attachments: SmallVec<[RasterAttachment; 4]> = pass
                .writes()
                .map(|texture| RasterAttachment {
                    texture,
                    clear: self.textures[texture.index()].desc.clear_on_bind,
                })
                .collect();

            let Some(render) = pass.render else {
                log::trace!("Pass '{}' has no render function, skipping", pass.name);
                continue;
            };

            executor.begin_raster_pass(&pass.name, &pass.reads, &attachments)?;
            let rendered = {
                let mut ctx =
                    RasterGraphContext::new(executor, pass.allow_global_state_modification);
                render(&mut ctx)
            };
            executor.end_raster_pass();
            rendered?;
        }

        Ok(())
    }
}
