//! Frame Graph
//!
//! The slice of a render graph the glitch pass needs from its host:
//!
//! - [`RenderGraph`]: declares textures (imported or transient) and raster
//!   passes, then executes them in declaration order.
//! - [`RasterPassBuilder`]: read set, color attachments, global-state flag
//!   and the render callback for one pass.
//! - [`GraphExecutor`] / [`RasterCommands`]: the backend-facing command sink
//!   the graph drives during execution.
//! - [`RenderStage`]: injection points a host uses to order passes.

mod builder;
mod render_graph;
mod resource;
mod stage;

pub use builder::{RasterGraphContext, RasterPass, RasterPassBuilder, RenderFn};
pub use render_graph::{GraphExecutor, RasterAttachment, RasterCommands, RenderGraph};
pub use resource::{TextureDesc, TextureHandle};
pub use stage::RenderStage;
