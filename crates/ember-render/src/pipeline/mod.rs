//! Pipeline state vocabulary.
//!
//! Engine-level enumerations for blend, depth, culling and sampler state,
//! plus the once-built translation tables mapping them to API tokens.
//! Values here are plain data; all diffing and emission happens in
//! [`crate::context`].

mod blend;
mod clear;
mod compare;
mod culling;
mod sampler;
mod viewport;

pub use blend::{
    BlendDestination, BlendMode, BlendSource, DESTINATION_MASK, SOURCE_MASK, blend_factor_token,
};
pub use clear::ClearMask;
pub use compare::{CompareMode, depth_func_token};
pub use culling::TriangleCulling;
pub use sampler::{MipFilter, SamplerState, TextureFilter, WrapMode};
pub use viewport::ViewportRect;
