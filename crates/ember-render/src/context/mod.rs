//! GPU execution context.
//!
//! [`RenderContext`] is the single owner of every GPU-side object it
//! creates: buffers, textures, shaders, programs and render-target
//! attachment pairs, all addressed by handle through per-kind side tables.
//! It caches the full pipeline state vector to elide redundant API calls,
//! polls and classifies API errors after state-mutating calls, and deletes
//! everything still alive when dropped.
//!
//! The context is single-threaded and synchronous: every operation is a
//! direct blocking call into the backend, and callers must serialize access
//! externally (one render thread, one frame at a time).

mod cache;
mod handle;
mod program;
mod resources;
mod state;
mod target;

use std::collections::{HashMap, HashSet};

use crate::api::{ApiError, GlApi};
use crate::pipeline::{CompareMode, ViewportRect};

use cache::StateCache;

pub use cache::{SLOT_COUNT, VertexSlot};
pub use handle::{
    IndexBufferHandle, ProgramHandle, ShaderHandle, TextureHandle, VertexBufferHandle,
};
pub use program::{InputType, ProgramInput};
pub use resources::ShaderStage;

/// Bookkeeping for one texture.
#[derive(Debug, Copy, Clone)]
struct TextureInfo {
    width: u32,
    height: u32,
    mipmapped: bool,
}

/// Offscreen attachment pair of a promoted texture.
#[derive(Debug, Copy, Clone)]
struct TargetAttachments {
    framebuffer: u32,
    renderbuffer: u32,
}

/// The GPU execution context.
///
/// Generic over the [`GlApi`] backend: live rendering uses
/// [`crate::api::LiveGl`], tests observe emitted calls through
/// [`crate::api::RecordingGl`].
///
/// Handle discipline is a caller obligation: deleting a handle twice, or
/// using one after deletion, is not guarded here and leaves the underlying
/// API in an unspecified state.
pub struct RenderContext<A: GlApi> {
    api: A,

    // Resource tables. The context is the sole arena owner of GPU-side
    // metadata; nothing else records handles.
    vertex_buffers: HashMap<VertexBufferHandle, u32>,
    index_buffers: HashMap<IndexBufferHandle, u32>,
    textures: HashMap<TextureHandle, TextureInfo>,
    render_targets: HashMap<TextureHandle, TargetAttachments>,
    shaders: HashMap<ShaderHandle, ShaderStage>,
    programs: HashSet<ProgramHandle>,

    cache: StateCache,
    driver_info: String,
}

impl<A: GlApi> RenderContext<A> {
    /// Takes ownership of the backend and applies the engine's baseline
    /// state: depth test, blending and back-face culling enabled,
    /// counter-clockwise front faces, depth writes on with a `Less` test.
    ///
    /// The backend's current viewport is recorded as the window viewport
    /// and restored whenever drawing returns to the backbuffer.
    pub fn new(mut api: A) -> Self {
        api.enable(gl::DEPTH_TEST);
        api.enable(gl::BLEND);
        api.enable(gl::CULL_FACE);
        api.cull_face(gl::BACK);
        api.front_face(gl::CCW);

        let driver_info = format!(
            "{} {} {}",
            api.get_string(gl::VENDOR),
            api.get_string(gl::RENDERER),
            api.get_string(gl::VERSION)
        );

        let [x, y, width, height] = api.get_viewport();
        let viewport = ViewportRect::new(
            x.max(0) as u32,
            y.max(0) as u32,
            width.max(0) as u32,
            height.max(0) as u32,
        );

        let mut context = Self {
            api,
            vertex_buffers: HashMap::new(),
            index_buffers: HashMap::new(),
            textures: HashMap::new(),
            render_targets: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashSet::new(),
            cache: StateCache::new(viewport),
            driver_info,
        };

        context.set_depth_test(true, CompareMode::Less);
        log::debug!("render context ready: {}", context.driver_info);

        context
    }

    /// Vendor, renderer and version reported by the driver at construction.
    pub fn driver_info(&self) -> &str {
        &self.driver_info
    }

    /// Backend access, mainly for inspection in tests and tooling.
    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut A {
        &mut self.api
    }

    /// Polls the most recent API error and classifies it.
    ///
    /// Errors are logged, never raised: by the time one is observed the
    /// offending call has already partially executed, and nothing here can
    /// roll it back.
    pub fn poll_error(&mut self) -> Option<ApiError> {
        let error = ApiError::classify(self.api.get_error());
        if let Some(error) = error {
            log::error!("graphics api error: {error}");
        }
        error
    }

    /// Post-call error poll used after state-mutating operations.
    pub(crate) fn check_errors(&mut self) {
        self.poll_error();
    }

    /// Deletes every live resource of every kind, in arbitrary order, and
    /// resets the state cache.
    ///
    /// Runs automatically on drop, so a context never leaks handles across
    /// its lifetime; call it earlier when teardown order matters to the
    /// embedding application. The context stays usable afterwards.
    pub fn destroy(&mut self) {
        for (&buffer, _) in &self.vertex_buffers {
            self.api.delete_buffer(buffer.0);
        }
        for (&buffer, _) in &self.index_buffers {
            self.api.delete_buffer(buffer.0);
        }
        for (&texture, _) in &self.textures {
            self.api.delete_texture(texture.0);
            if let Some(attachments) = self.render_targets.get(&texture) {
                self.api.delete_framebuffer(attachments.framebuffer);
                self.api.delete_renderbuffer(attachments.renderbuffer);
            }
        }
        for (&shader, _) in &self.shaders {
            self.api.delete_shader(shader.0);
        }
        for &program in &self.programs {
            self.api.delete_program(program.0);
        }

        self.vertex_buffers.clear();
        self.index_buffers.clear();
        self.textures.clear();
        self.render_targets.clear();
        self.shaders.clear();
        self.programs.clear();

        self.cache = StateCache::new(self.cache.viewport);
    }
}

impl<A: GlApi> Drop for RenderContext<A> {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{Call, RecordingGl};

    use super::*;

    fn context() -> RenderContext<RecordingGl> {
        RenderContext::new(RecordingGl::new())
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn construction_applies_baseline_state() {
        let ctx = context();
        let calls = ctx.api().calls();

        assert!(calls.contains(&Call::Enable(gl::DEPTH_TEST)));
        assert!(calls.contains(&Call::Enable(gl::BLEND)));
        assert!(calls.contains(&Call::Enable(gl::CULL_FACE)));
        assert!(calls.contains(&Call::CullFace(gl::BACK)));
        assert!(calls.contains(&Call::FrontFace(gl::CCW)));
        // initial depth test is not elided: the cached function starts unset
        assert!(calls.contains(&Call::DepthMask(true)));
        assert!(calls.contains(&Call::DepthFunc(gl::LESS)));
    }

    #[test]
    fn construction_records_driver_info() {
        let ctx = context();
        assert_eq!(ctx.driver_info(), "ember recording 0.1");
    }

    // ── error polling ─────────────────────────────────────────────────────

    #[test]
    fn poll_error_classifies_pending_tokens() {
        let mut ctx = context();
        ctx.api_mut().push_error(gl::INVALID_OPERATION);

        assert_eq!(ctx.poll_error(), Some(ApiError::InvalidOperation));
        assert_eq!(ctx.poll_error(), None);
    }

    // ── teardown ──────────────────────────────────────────────────────────

    #[test]
    fn destroy_deletes_every_live_resource() {
        let mut ctx = context();
        let vertex_buffer = ctx.create_vertex_buffer(16);
        let index_buffer = ctx.create_index_buffer(6);
        let texture = ctx.create_texture(64, 64, false, true).unwrap();
        let shader = ctx.create_vertex_shader();
        let program = ctx.create_program();

        ctx.api_mut().take_calls();
        ctx.destroy();

        let calls = ctx.api().calls();
        assert!(calls.contains(&Call::DeleteBuffer(vertex_buffer.raw())));
        assert!(calls.contains(&Call::DeleteBuffer(index_buffer.raw())));
        assert!(calls.contains(&Call::DeleteTexture(texture.raw())));
        assert!(calls.iter().any(|c| matches!(c, Call::DeleteFramebuffer(_))));
        assert!(calls.iter().any(|c| matches!(c, Call::DeleteRenderbuffer(_))));
        assert!(calls.contains(&Call::DeleteShader(shader.raw())));
        assert!(calls.contains(&Call::DeleteProgram(program.raw())));
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut ctx = context();
        ctx.create_vertex_buffer(16);
        ctx.destroy();
        ctx.api_mut().take_calls();

        ctx.destroy();
        assert!(ctx.api().calls().is_empty());
    }
}
