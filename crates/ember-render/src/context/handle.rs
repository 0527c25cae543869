//! Per-kind handles for GPU-side objects.
//!
//! Handles wrap the API's opaque `u32` names. A handle is only meaningful
//! between the create and delete calls of the context that issued it, and a
//! name never identifies objects of two kinds at once.

/// Name of a GPU-side vertex buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexBufferHandle(pub(crate) u32);

/// Name of a GPU-side index buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct IndexBufferHandle(pub(crate) u32);

/// Name of a GPU-side 2D texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u32);

/// Name of a shader object (vertex or fragment stage).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub(crate) u32);

/// Name of a linked (or linkable) program.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub(crate) u32);

macro_rules! impl_raw {
    ($($handle:ty),*) => {
        $(impl $handle {
            /// Raw API name. Only meaningful while the object is alive.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        })*
    };
}

impl_raw!(
    VertexBufferHandle,
    IndexBufferHandle,
    TextureHandle,
    ShaderHandle,
    ProgramHandle
);
