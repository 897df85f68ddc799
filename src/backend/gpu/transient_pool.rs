//! Transient Texture Pool
//!
//! GPU texture pool backing the graph's transient textures. Textures are
//! handed out while a graph executes and returned to the free list at frame
//! end, so a steady-state frame allocates nothing.
//!
//! # Design
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              TransientTexturePool                    │
//! │                                                     │
//! │  active: [PooledTexture]  ←── indexed by Id         │
//! │  free:   HashMap<Key, Vec<PooledTexture>>           │
//! │                                                     │
//! │  allocate() → Id    (graph execution)               │
//! │  view(Id)                                           │
//! │  reset()            (end of frame)                  │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Call [`TransientTexturePool::trim`] periodically (e.g. after a resize)
//! to release textures that stopped being requested.

use rustc_hash::FxHashMap;

use crate::graph::TextureDesc;

/// Handle to a texture allocated from the pool. Valid until [`TransientTexturePool::reset`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PooledTextureId(u32);

/// Key for texture recycling. Usage is part of the key because a texture
/// with mismatched usages fails validation.
#[derive(Clone, PartialEq, Eq, Hash)]
struct PoolKey {
    size: (u32, u32, u32),
    dimension: wgpu::TextureDimension,
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsages,
    sample_count: u32,
}

impl PoolKey {
    fn from_desc(desc: &TextureDesc) -> Self {
        Self {
            size: (desc.width, desc.height, desc.depth_or_array_layers),
            dimension: desc.dimension,
            format: desc.format,
            usage: desc.usage,
            sample_count: desc.sample_count,
        }
    }
}

struct PooledTexture {
    key: PoolKey,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    /// Frames spent in the free list without being reused.
    idle_frames: u32,
}

impl PooledTexture {
    fn new(device: &wgpu::Device, desc: &TextureDesc) -> Self {
        log::debug!(
            "Creating transient texture '{}' ({}x{}, {:?})",
            desc.label,
            desc.width,
            desc.height,
            desc.format
        );

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&desc.label),
            size: desc.size(),
            mip_level_count: 1,
            sample_count: desc.sample_count,
            dimension: desc.dimension,
            format: desc.format,
            usage: desc.usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            key: PoolKey::from_desc(desc),
            texture,
            view,
            idle_frames: 0,
        }
    }
}

/// GPU texture pool for transient per-frame allocations.
#[derive(Default)]
pub struct TransientTexturePool {
    active: Vec<PooledTexture>,
    free: FxHashMap<PoolKey, Vec<PooledTexture>>,
}

impl TransientTexturePool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a texture matching `desc`, reusing a free one when possible.
    pub fn allocate(&mut self, device: &wgpu::Device, desc: &TextureDesc) -> PooledTextureId {
        let key = PoolKey::from_desc(desc);

        let pooled = match self.free.get_mut(&key).and_then(Vec::pop) {
            Some(mut t) => {
                t.idle_frames = 0;
                t
            }
            None => PooledTexture::new(device, desc),
        };

        let id = PooledTextureId(self.active.len() as u32);
        self.active.push(pooled);
        id
    }

    #[must_use]
    #[inline]
    pub fn view(&self, id: PooledTextureId) -> &wgpu::TextureView {
        &self.active[id.0 as usize].view
    }

    #[must_use]
    #[inline]
    pub fn texture(&self, id: PooledTextureId) -> &wgpu::Texture {
        &self.active[id.0 as usize].texture
    }

    /// Returns all active textures to the free pool. Outstanding ids become invalid.
    pub fn reset(&mut self) {
        for t in self.active.drain(..) {
            self.free.entry(t.key.clone()).or_default().push(t);
        }
    }

    /// Releases free textures idle for more than `max_idle_frames` calls.
    pub fn trim(&mut self, max_idle_frames: u32) {
        for bucket in self.free.values_mut() {
            for t in bucket.iter_mut() {
                t.idle_frames += 1;
            }
            bucket.retain(|t| t.idle_frames <= max_idle_frames);
        }
        self.free.retain(|_, bucket| !bucket.is_empty());
    }

    /// Total textures owned by the pool (active and free).
    #[must_use]
    pub fn total_texture_count(&self) -> usize {
        self.active.len() + self.free.values().map(Vec::len).sum::<usize>()
    }
}
