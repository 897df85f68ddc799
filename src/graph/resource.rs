//! Graph texture handles and descriptors.

/// Lightweight handle to a texture declared in a [`RenderGraph`](super::RenderGraph).
///
/// Valid only for the graph that issued it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct TextureHandle(pub(crate) u32);

impl TextureHandle {
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Descriptor for a graph texture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureDesc {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub depth_or_array_layers: u32,
    pub dimension: wgpu::TextureDimension,
    pub format: wgpu::TextureFormat,
    pub sample_count: u32,
    pub usage: wgpu::TextureUsages,
    /// Clear the texture when it is bound as a color attachment.
    pub clear_on_bind: bool,
}

impl TextureDesc {
    /// A single-sampled 2D color target that can also be sampled.
    #[must_use]
    pub fn new_2d(
        label: impl Into<String>,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            label: label.into(),
            width,
            height,
            depth_or_array_layers: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            sample_count: 1,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            clear_on_bind: true,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Whether the texture can be bound as a single-sampled 2D texture read
    /// through a filtering sampler.
    #[must_use]
    pub fn is_filterable_2d(&self) -> bool {
        self.sample_count == 1
            && self.dimension == wgpu::TextureDimension::D2
            && self.depth_or_array_layers == 1
            && matches!(
                self.format.sample_type(None, None),
                Some(wgpu::TextureSampleType::Float { filterable: true })
            )
    }

    #[must_use]
    pub fn size(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: self.depth_or_array_layers,
        }
    }
}
