//! Fullscreen geometry and the shared mesh slot.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::errors::Result;

/// CPU-side mesh description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshData {
    pub name: &'static str,
    pub positions: &'static [[f32; 3]],
    pub indices: &'static [u16],
}

/// One triangle that covers the whole viewport once clipped.
///
/// ```text
///  (-1, 3)
///     |\
///     |  \
///     |____\
///     |    | \
///     |____|___\
///  (-1,-1)     (3,-1)
/// ```
pub const FULLSCREEN_TRIANGLE: MeshData = MeshData {
    name: "Fullscreen Triangle",
    positions: &[[-1.0, -1.0, 0.0], [-1.0, 3.0, 0.0], [3.0, -1.0, 0.0]],
    indices: &[0, 1, 2],
};

/// Reference-counted slot for a mesh shared by several owners.
///
/// Owners hold an `Arc<M>`; the slot only keeps a `Weak`. When the last
/// owner drops its `Arc` the mesh is released, and the next
/// [`get_or_try_create`](Self::get_or_try_create) builds a fresh one.
pub struct SharedMesh<M> {
    slot: Mutex<Weak<M>>,
}

impl<M> Default for SharedMesh<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> SharedMesh<M> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Weak::new()),
        }
    }

    /// Returns the live mesh, or creates one with `create`.
    ///
    /// The slot lock is held across `create`, so concurrent callers never
    /// build two meshes.
    pub fn get_or_try_create<F>(&self, create: F) -> Result<Arc<M>>
    where
        F: FnOnce() -> Result<M>,
    {
        let mut slot = self.slot.lock();
        if let Some(mesh) = slot.upgrade() {
            return Ok(mesh);
        }
        let mesh = Arc::new(create()?);
        *slot = Arc::downgrade(&mesh);
        Ok(mesh)
    }

    /// Returns the live mesh without creating one.
    #[must_use]
    pub fn get(&self) -> Option<Arc<M>> {
        self.slot.lock().upgrade()
    }

    /// `true` while at least one owner holds the mesh.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.owner_count() > 0
    }

    #[must_use]
    pub fn owner_count(&self) -> usize {
        self.slot.lock().strong_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GlitchError;

    #[test]
    fn triangle_covers_clip_space() {
        let p = FULLSCREEN_TRIANGLE.positions;
        assert_eq!(p.len(), 3);
        assert_eq!(FULLSCREEN_TRIANGLE.indices, &[0, 1, 2]);
        // Edge from (-1,3) to (3,-1) passes through (1,1): the top-right corner.
        let (a, b) = (p[1], p[2]);
        let t = (1.0 - a[0]) / (b[0] - a[0]);
        assert!((a[1] + t * (b[1] - a[1]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn slot_reuses_live_mesh() {
        let shared = SharedMesh::new();
        let a = shared.get_or_try_create(|| Ok(7_u32)).unwrap();
        let b = shared
            .get_or_try_create(|| panic!("must not recreate while alive"))
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(shared.owner_count(), 2);
    }

    #[test]
    fn slot_recreates_after_last_owner_drops() {
        let shared = SharedMesh::new();
        let a = shared.get_or_try_create(|| Ok(1_u32)).unwrap();
        drop(a);
        assert!(!shared.is_alive());
        assert!(shared.get().is_none());
        let b = shared.get_or_try_create(|| Ok(2_u32)).unwrap();
        assert_eq!(*b, 2);
    }

    #[test]
    fn failed_creation_leaves_slot_empty() {
        let shared: SharedMesh<u32> = SharedMesh::new();
        let err = shared
            .get_or_try_create(|| Err(GlitchError::MeshCreation("test".into())))
            .unwrap_err();
        assert!(matches!(err, GlitchError::MeshCreation(_)));
        assert!(!shared.is_alive());
    }
}
