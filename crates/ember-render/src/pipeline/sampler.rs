/// Texture coordinate wrapping, applied to both axes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WrapMode {
    Clamp,
    Repeat,
}

/// Magnification/minification filtering.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

/// Filtering between mip levels.
///
/// Requesting `Nearest` or `Linear` on a texture allocated without a mip
/// chain degrades to `None`; the context applies that silently.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MipFilter {
    None,
    Nearest,
    Linear,
}

/// Sampler configuration, cached per texture handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SamplerState {
    pub wrap: WrapMode,
    pub filter: TextureFilter,
    pub mip_filter: MipFilter,
}

impl SamplerState {
    #[inline]
    pub const fn new(wrap: WrapMode, filter: TextureFilter, mip_filter: MipFilter) -> Self {
        Self {
            wrap,
            filter,
            mip_filter,
        }
    }
}

impl Default for SamplerState {
    /// The state every texture starts with: clamped, nearest, no mip filter.
    fn default() -> Self {
        Self::new(WrapMode::Clamp, TextureFilter::Nearest, MipFilter::None)
    }
}
