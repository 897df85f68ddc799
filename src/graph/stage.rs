//! Render Stage Definitions
//!
//! `RenderStage` defines the standard stage ordering of a frame, so hosts
//! can place the glitch pass relative to their own passes.

use serde::{Deserialize, Serialize};

/// Render stage enumeration.
///
/// | Stage | Typical Content |
/// |-------|-----------------|
/// | `Opaque` | Forward / deferred scene rendering |
/// | `Transparent` | Alpha-blended objects |
/// | `PostProcess` | Bloom, tone mapping, FXAA |
/// | `AfterPostProcess` | Stylization on the final LDR image |
/// | `UI` | egui, debug overlays |
#[derive(
    Debug, Hash, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum RenderStage {
    Opaque = 0,
    Transparent = 1,
    PostProcess = 2,
    /// After the built-in post-processing chain. The glitch pass's default.
    #[default]
    AfterPostProcess = 3,
    /// Executed last.
    UI = 4,
}

impl RenderStage {
    /// Stage name (for debugging).
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Opaque => "Opaque",
            Self::Transparent => "Transparent",
            Self::PostProcess => "PostProcess",
            Self::AfterPostProcess => "AfterPostProcess",
            Self::UI => "UI",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_ordering() {
        assert!(RenderStage::Opaque < RenderStage::Transparent);
        assert!(RenderStage::Transparent < RenderStage::PostProcess);
        assert!(RenderStage::PostProcess < RenderStage::AfterPostProcess);
        assert!(RenderStage::AfterPostProcess < RenderStage::UI);
        assert_eq!(RenderStage::default(), RenderStage::AfterPostProcess);
    }

    #[test]
    fn test_stage_names_match_serde() {
        let json = serde_json::to_string(&RenderStage::AfterPostProcess).unwrap();
        assert_eq!(json, format!("\"{}\"", RenderStage::AfterPostProcess.name()));
        assert_eq!(RenderStage::UI.name(), "UI");
    }
}
