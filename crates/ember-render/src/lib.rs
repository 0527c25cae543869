//! Ember render crate.
//!
//! This crate owns the GPU execution context used by higher engine layers:
//! - resource creation, upload and deletion (buffers, textures, shaders,
//!   programs, render-target attachments), with the context as the sole
//!   owner of all GPU-side bookkeeping
//! - a cached pipeline state vector that elides redundant API calls
//! - program introspection into typed input lists
//! - render-target switching with viewport preservation
//!
//! The underlying API is reached through the [`api::GlApi`] seam. Scene
//! management, asset loading and windowing live in other crates and consume
//! this one through [`context::RenderContext`].

pub mod api;
pub mod context;
pub mod error;
pub mod logging;
pub mod pipeline;
