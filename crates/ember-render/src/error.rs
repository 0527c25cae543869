use thiserror::Error;

/// Precondition violations raised by context operations.
///
/// This is the closed set of failures a caller can provoke before the
/// underlying API is touched (or, for render targets, before the attachment
/// pair is registered). Errors the API itself reports are polled and logged
/// instead; see [`crate::api::ApiError`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContextError {
    /// Texture dimensions must both be powers of two.
    #[error("invalid texture size {width}x{height}: dimensions must be powers of two")]
    InvalidTextureSize { width: u32, height: u32 },

    /// A uniform reported a type this context cannot describe.
    #[error("unsupported type {type_token:#06x} for uniform `{name}`")]
    UnsupportedUniformType { name: String, type_token: u32 },

    /// The texture was created without render-target promotion.
    #[error("texture {texture} cannot be used as a render target")]
    NotARenderTarget { texture: u32 },

    /// The attachment pair did not assemble into a complete framebuffer.
    #[error("render target framebuffer incomplete (status {status:#06x})")]
    IncompleteRenderTarget { status: u32 },
}
