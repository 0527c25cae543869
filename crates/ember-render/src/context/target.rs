//! Render-target management: attachment pairs, target switching, clears
//! and pixel read-back.

use crate::api::GlApi;
use crate::error::ContextError;
use crate::pipeline::{ClearMask, ViewportRect};

use super::{RenderContext, TargetAttachments, TextureHandle};

impl<A: GlApi> RenderContext<A> {
    /// Builds the framebuffer + combined depth/stencil renderbuffer pair
    /// backing a promoted texture. Called at texture creation only.
    ///
    /// An incomplete framebuffer releases both attachments and fails; the
    /// caller owns what happens to the texture itself.
    pub(crate) fn create_target_attachments(
        &mut self,
        texture: TextureHandle,
        width: u32,
        height: u32,
    ) -> Result<(), ContextError> {
        let framebuffer = self.api.gen_framebuffer();
        self.api.bind_framebuffer(framebuffer);
        self.api
            .framebuffer_texture_2d(gl::COLOR_ATTACHMENT0, texture.0);

        let renderbuffer = self.api.gen_renderbuffer();
        self.api.bind_renderbuffer(renderbuffer);
        self.api
            .renderbuffer_storage(gl::DEPTH24_STENCIL8, width, height);
        self.api
            .framebuffer_renderbuffer(gl::DEPTH_STENCIL_ATTACHMENT, renderbuffer);

        let status = self.api.check_framebuffer_status();
        if status != gl::FRAMEBUFFER_COMPLETE {
            self.api.bind_framebuffer(0);
            self.api.bind_renderbuffer(0);
            self.api.delete_framebuffer(framebuffer);
            self.api.delete_renderbuffer(renderbuffer);
            return Err(ContextError::IncompleteRenderTarget { status });
        }

        self.render_targets.insert(
            texture,
            TargetAttachments {
                framebuffer,
                renderbuffer,
            },
        );

        self.api.bind_framebuffer(0);
        self.api.bind_renderbuffer(0);
        self.check_errors();
        Ok(())
    }

    /// Switches drawing to the promoted `texture`. No-op when it is already
    /// the active target.
    ///
    /// The raw viewport becomes the full texture rectangle (the cached
    /// window viewport is deliberately left alone for the switch back), and
    /// the target's color, depth and stencil contents are cleared as part
    /// of the switch, so a target is never drawn into with stale data.
    ///
    /// Fails with [`ContextError::NotARenderTarget`] for a texture created
    /// without the render-target flag.
    pub fn set_render_to_texture(
        &mut self,
        texture: TextureHandle,
        with_depth_stencil: bool,
    ) -> Result<(), ContextError> {
        if self.cache.target == Some(texture) {
            return Ok(());
        }

        let not_promoted = ContextError::NotARenderTarget { texture: texture.0 };
        let Some(attachments) = self.render_targets.get(&texture).copied() else {
            return Err(not_promoted);
        };
        let Some(info) = self.textures.get(&texture).copied() else {
            return Err(not_promoted);
        };

        self.cache.target = Some(texture);

        self.api.bind_framebuffer(attachments.framebuffer);
        if with_depth_stencil {
            self.api.bind_renderbuffer(attachments.renderbuffer);
        }
        self.api.viewport(0, 0, info.width, info.height);
        self.clear(0.0, 0.0, 0.0, 0.0, 1.0, 0, ClearMask::all());

        self.check_errors();
        Ok(())
    }

    /// Restores drawing to the backbuffer. No-op when already there.
    ///
    /// The window viewport recorded by the cache is restored exactly.
    pub fn set_render_to_backbuffer(&mut self) {
        if self.cache.target.is_none() {
            return;
        }
        self.cache.target = None;

        self.api.bind_framebuffer(0);
        self.api.bind_renderbuffer(0);

        let viewport = self.cache.viewport;
        self.api
            .viewport(viewport.x, viewport.y, viewport.width, viewport.height);

        self.check_errors();
    }

    /// Finishes the frame on this context's side: drawing reverts to the
    /// backbuffer. The swap itself belongs to the windowing layer.
    pub fn present(&mut self) {
        self.set_render_to_backbuffer();
    }

    /// Sets the clear values and clears the buffers selected by `mask`.
    ///
    /// Clearing the depth buffer requires depth writes, so the depth mask
    /// is forced on and the cache follows.
    pub fn clear(
        &mut self,
        red: f32,
        green: f32,
        blue: f32,
        alpha: f32,
        depth: f32,
        stencil: u32,
        mask: ClearMask,
    ) {
        self.api.clear_color(red, green, blue, alpha);
        self.api.clear_depth(depth);
        self.api.clear_stencil(stencil);

        if mask.contains(ClearMask::DEPTH) {
            self.cache.depth_mask = true;
            self.api.depth_mask(true);
        }

        self.api.clear(mask.token());
    }

    /// Reads the current target's pixels as tightly packed RGBA8.
    ///
    /// The rectangle is the full texture for an offscreen target and the
    /// window viewport on the backbuffer; `dest` must hold at least
    /// 4 x width x height bytes for it.
    pub fn read_pixels(&mut self, dest: &mut [u8]) {
        let rect = match self.cache.target.and_then(|t| self.textures.get(&t)) {
            Some(info) => ViewportRect::new(0, 0, info.width, info.height),
            None => self.cache.viewport,
        };

        self.api
            .read_pixels(rect.x, rect.y, rect.width, rect.height, dest);
        self.check_errors();
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{Call, RecordingGl};
    use crate::context::RenderContext;
    use crate::error::ContextError;

    fn context() -> RenderContext<RecordingGl> {
        let mut ctx = RenderContext::new(RecordingGl::with_viewport(0, 0, 640, 480));
        ctx.api_mut().take_calls();
        ctx
    }

    // ── promotion ─────────────────────────────────────────────────────────

    #[test]
    fn promoted_texture_gets_an_attachment_pair() {
        let mut ctx = context();
        let texture = ctx.create_texture(128, 128, false, true).unwrap();

        let calls = ctx.api().calls();
        assert!(calls.contains(&Call::FramebufferTexture2d {
            attachment: gl::COLOR_ATTACHMENT0,
            texture: texture.raw(),
        }));
        assert!(calls.contains(&Call::RenderbufferStorage {
            format: gl::DEPTH24_STENCIL8,
            width: 128,
            height: 128,
        }));
        assert!(calls.iter().any(|c| matches!(
            c,
            Call::FramebufferRenderbuffer {
                attachment: gl::DEPTH_STENCIL_ATTACHMENT,
                ..
            }
        )));
        // Both bindings are released once the pair is assembled.
        assert!(calls.contains(&Call::BindFramebuffer(0)));
        assert!(calls.contains(&Call::BindRenderbuffer(0)));
    }

    // ── switching ─────────────────────────────────────────────────────────

    #[test]
    fn switch_clears_and_adopts_the_texture_rectangle() {
        let mut ctx = context();
        let texture = ctx.create_texture(256, 256, false, true).unwrap();
        ctx.api_mut().take_calls();

        ctx.set_render_to_texture(texture, true).unwrap();

        let calls = ctx.api().calls();
        assert!(calls.iter().any(|c| matches!(c, Call::BindFramebuffer(fb) if *fb != 0)));
        assert!(calls.iter().any(|c| matches!(c, Call::BindRenderbuffer(rb) if *rb != 0)));
        assert!(calls.contains(&Call::Viewport {
            x: 0,
            y: 0,
            width: 256,
            height: 256,
        }));
        let mask = gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT | gl::STENCIL_BUFFER_BIT;
        assert!(calls.contains(&Call::Clear(mask)));
    }

    #[test]
    fn switch_back_restores_the_window_viewport() {
        let mut ctx = context();
        let texture = ctx.create_texture(256, 256, false, true).unwrap();
        ctx.set_render_to_texture(texture, true).unwrap();
        ctx.api_mut().take_calls();

        ctx.set_render_to_backbuffer();

        let calls = ctx.api().calls();
        assert!(calls.contains(&Call::BindFramebuffer(0)));
        assert!(calls.contains(&Call::BindRenderbuffer(0)));
        assert!(calls.contains(&Call::Viewport {
            x: 0,
            y: 0,
            width: 640,
            height: 480,
        }));
    }

    #[test]
    fn switch_to_the_active_target_emits_nothing() {
        let mut ctx = context();
        let texture = ctx.create_texture(64, 64, false, true).unwrap();
        ctx.set_render_to_texture(texture, false).unwrap();
        ctx.api_mut().take_calls();

        ctx.set_render_to_texture(texture, false).unwrap();
        assert!(ctx.api().calls().is_empty());

        ctx.set_render_to_backbuffer();
        ctx.api_mut().take_calls();
        ctx.set_render_to_backbuffer();
        assert!(ctx.api().calls().is_empty());
    }

    #[test]
    fn switch_to_unpromoted_texture_fails() {
        let mut ctx = context();
        let texture = ctx.create_texture(64, 64, false, false).unwrap();
        ctx.api_mut().take_calls();

        let result = ctx.set_render_to_texture(texture, true);
        assert_eq!(
            result,
            Err(ContextError::NotARenderTarget {
                texture: texture.raw(),
            })
        );
        assert!(ctx.api().calls().is_empty());
    }

    #[test]
    fn present_reverts_to_the_backbuffer() {
        let mut ctx = context();
        let texture = ctx.create_texture(64, 64, false, true).unwrap();
        ctx.set_render_to_texture(texture, false).unwrap();
        ctx.api_mut().take_calls();

        ctx.present();
        assert!(ctx.api().calls().contains(&Call::BindFramebuffer(0)));
    }

    // ── clears ────────────────────────────────────────────────────────────

    #[test]
    fn depth_clear_forces_the_depth_mask_on() {
        use crate::pipeline::{ClearMask, CompareMode};

        let mut ctx = context();
        ctx.set_depth_test(false, CompareMode::Less);
        ctx.api_mut().take_calls();

        ctx.clear(0.0, 0.0, 0.0, 1.0, 1.0, 0, ClearMask::DEPTH);
        assert!(ctx.api().calls().contains(&Call::DepthMask(true)));

        // The cache followed: re-enabling depth writes is now a no-op diff
        // on the mask, so only the function change would emit.
        ctx.api_mut().take_calls();
        ctx.set_depth_test(true, CompareMode::Less);
        assert!(ctx.api().calls().is_empty());
    }

    // ── read-back ─────────────────────────────────────────────────────────

    #[test]
    fn read_pixels_follows_the_active_target() {
        let mut ctx = context();
        let texture = ctx.create_texture(32, 32, false, true).unwrap();
        let mut pixels = vec![0u8; 32 * 32 * 4];

        ctx.set_render_to_texture(texture, false).unwrap();
        ctx.api_mut().take_calls();
        ctx.read_pixels(&mut pixels);
        assert!(ctx.api().calls().contains(&Call::ReadPixels {
            x: 0,
            y: 0,
            width: 32,
            height: 32,
        }));

        ctx.set_render_to_backbuffer();
        ctx.api_mut().take_calls();
        let mut pixels = vec![0u8; 640 * 480 * 4];
        ctx.read_pixels(&mut pixels);
        assert!(ctx.api().calls().contains(&Call::ReadPixels {
            x: 0,
            y: 0,
            width: 640,
            height: 480,
        }));
    }
}
