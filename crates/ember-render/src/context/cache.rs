//! The pipeline state snapshot the context diffs against.

use std::collections::HashMap;

use crate::pipeline::{BlendMode, CompareMode, SamplerState, TriangleCulling, ViewportRect};

use super::handle::{IndexBufferHandle, ProgramHandle, TextureHandle, VertexBufferHandle};

/// Number of attribute and sampler binding slots.
pub const SLOT_COUNT: usize = 8;

/// One attribute-slot binding.
///
/// Element size, stride and offset are in `f32` units. All four fields
/// participate in the no-op comparison: a rebinding is elided only when the
/// whole tuple is unchanged.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexSlot {
    pub buffer: VertexBufferHandle,
    /// Elements per vertex.
    pub size: u32,
    /// Distance between consecutive vertices.
    pub stride: u32,
    /// First element of the first vertex.
    pub offset: u32,
}

/// Last-applied value for every piece of mutable pipeline state.
///
/// Setters diff against this snapshot and skip the underlying call (and its
/// error poll) when nothing would change.
#[derive(Debug)]
pub(crate) struct StateCache {
    pub program: Option<ProgramHandle>,
    pub index_buffer: Option<IndexBufferHandle>,
    pub vertex_slots: [Option<VertexSlot>; SLOT_COUNT],
    pub texture_slots: [Option<TextureHandle>; SLOT_COUNT],

    /// Sampler state keyed by texture, not by slot, so rebinding a texture
    /// at another slot reuses its last-known configuration.
    pub samplers: HashMap<TextureHandle, SamplerState>,

    /// Window viewport. Offscreen targets set the raw viewport directly and
    /// leave this untouched, so switching back can restore it exactly.
    pub viewport: ViewportRect,

    /// Packed source|destination blend word.
    pub blend: u16,
    pub depth_mask: bool,
    /// `None` until the first depth-test call, which therefore always
    /// reaches the API.
    pub depth_func: Option<CompareMode>,
    pub culling: TriangleCulling,

    /// Active offscreen target; `None` is the backbuffer.
    pub target: Option<TextureHandle>,
}

impl StateCache {
    pub fn new(viewport: ViewportRect) -> Self {
        Self {
            program: None,
            index_buffer: None,
            vertex_slots: [None; SLOT_COUNT],
            texture_slots: [None; SLOT_COUNT],
            samplers: HashMap::new(),
            viewport,
            blend: BlendMode::Default as u16,
            depth_mask: true,
            depth_func: None,
            culling: TriangleCulling::Back,
            target: None,
        }
    }
}
