//! Diffed state setters, uniform value setters and draw dispatch.
//!
//! Every setter here compares the request against the cached snapshot and,
//! when nothing would change, returns without touching the API: no state
//! call, no error poll. Re-issuing an identical request is therefore
//! observably free, which the test suite checks by counting recorded calls.

use std::mem::size_of;

use crate::api::GlApi;
use crate::pipeline::{
    BlendDestination, BlendMode, BlendSource, CompareMode, DESTINATION_MASK, MipFilter, SOURCE_MASK,
    SamplerState, TextureFilter, TriangleCulling, ViewportRect, WrapMode, blend_factor_token,
    depth_func_token,
};

use super::{IndexBufferHandle, ProgramHandle, RenderContext, TextureHandle, VertexSlot};

impl<A: GlApi> RenderContext<A> {
    /// Activates `program`. No-op when it is already active.
    ///
    /// A program must be active before its uniforms can be set.
    pub fn set_program(&mut self, program: ProgramHandle) {
        if self.cache.program == Some(program) {
            return;
        }
        self.cache.program = Some(program);

        self.api.use_program(program.0);
        self.check_errors();
    }

    /// Binds `binding` at attribute slot `slot`; `None` disables the slot.
    ///
    /// The whole (buffer, size, stride, offset) tuple must differ from the
    /// cached binding for anything to be emitted.
    ///
    /// Panics if `slot >= SLOT_COUNT`.
    pub fn set_vertex_buffer_at(&mut self, slot: usize, binding: Option<VertexSlot>) {
        if self.cache.vertex_slots[slot] == binding {
            return;
        }
        self.cache.vertex_slots[slot] = binding;

        let Some(binding) = binding else {
            self.api.disable_vertex_attrib_array(slot as u32);
            return;
        };

        self.api.enable_vertex_attrib_array(slot as u32);
        self.api.bind_buffer(gl::ARRAY_BUFFER, binding.buffer.0);
        self.api.vertex_attrib_pointer(
            slot as u32,
            binding.size,
            size_of::<f32>() as u32 * binding.stride,
            size_of::<f32>() as u32 * binding.offset,
        );
        self.check_errors();
    }

    /// Binds `texture` at sampler slot `slot`; `None` unbinds.
    ///
    /// When a texture is bound and a shader sampler `location` is supplied,
    /// the sampler uniform is pointed at the slot on every call, not just
    /// on rebinds, since the active program may have changed in between.
    ///
    /// Panics if `slot >= SLOT_COUNT`.
    pub fn set_texture_at(
        &mut self,
        slot: usize,
        texture: Option<TextureHandle>,
        location: Option<u32>,
    ) {
        let rebound = self.cache.texture_slots[slot] != texture;
        if rebound {
            self.cache.texture_slots[slot] = texture;

            self.api.active_texture(gl::TEXTURE0 + slot as u32);
            self.api.bind_texture(texture.map_or(0, |t| t.0));
        }

        let mut pointed = false;
        if let (Some(_), Some(location)) = (texture, location) {
            self.api.uniform1i(location, slot as i32);
            pointed = true;
        }

        if rebound || pointed {
            self.check_errors();
        }
    }

    /// Applies sampler state to the texture bound at `slot`.
    ///
    /// State is cached per texture handle, not per slot: a texture carries
    /// its sampler configuration with it when rebound elsewhere. Requesting
    /// a mip filter on a texture without a mip chain silently degrades to
    /// [`MipFilter::None`]. With no texture bound at the slot there is
    /// nothing to configure and the request is dropped with a warning.
    ///
    /// Panics if `slot >= SLOT_COUNT`.
    pub fn set_sampler_state_at(
        &mut self,
        slot: usize,
        wrap: WrapMode,
        filter: TextureFilter,
        mut mip_filter: MipFilter,
    ) {
        let Some(texture) = self.cache.texture_slots[slot] else {
            log::warn!("sampler state requested on empty slot {slot}");
            return;
        };

        if !self.textures.get(&texture).is_some_and(|t| t.mipmapped) {
            mip_filter = MipFilter::None;
        }

        let current = self
            .cache
            .samplers
            .get(&texture)
            .copied()
            .unwrap_or_default();
        let mut unit_active = false;

        if current.wrap != wrap {
            self.api.active_texture(gl::TEXTURE0 + slot as u32);
            unit_active = true;

            let token = match wrap {
                WrapMode::Clamp => gl::CLAMP_TO_EDGE,
                WrapMode::Repeat => gl::REPEAT,
            };
            self.api.tex_parameter(gl::TEXTURE_WRAP_S, token);
            self.api.tex_parameter(gl::TEXTURE_WRAP_T, token);
        }

        if current.filter != filter || current.mip_filter != mip_filter {
            if !unit_active {
                self.api.active_texture(gl::TEXTURE0 + slot as u32);
                unit_active = true;
            }

            let minify = match (filter, mip_filter) {
                (TextureFilter::Nearest, MipFilter::None) => gl::NEAREST,
                (TextureFilter::Nearest, MipFilter::Nearest) => gl::NEAREST_MIPMAP_NEAREST,
                (TextureFilter::Nearest, MipFilter::Linear) => gl::NEAREST_MIPMAP_LINEAR,
                (TextureFilter::Linear, MipFilter::None) => gl::LINEAR,
                (TextureFilter::Linear, MipFilter::Nearest) => gl::LINEAR_MIPMAP_NEAREST,
                (TextureFilter::Linear, MipFilter::Linear) => gl::LINEAR_MIPMAP_LINEAR,
            };
            let magnify = match filter {
                TextureFilter::Nearest => gl::NEAREST,
                TextureFilter::Linear => gl::LINEAR,
            };
            self.api.tex_parameter(gl::TEXTURE_MIN_FILTER, minify);
            self.api.tex_parameter(gl::TEXTURE_MAG_FILTER, magnify);
        }

        if !unit_active {
            return;
        }

        self.cache
            .samplers
            .insert(texture, SamplerState::new(wrap, filter, mip_filter));
        self.check_errors();
    }

    /// Selects blending from an explicit factor pair.
    pub fn set_blend_factors(&mut self, source: BlendSource, destination: BlendDestination) {
        self.apply_blend(source as u16 | destination as u16);
    }

    /// Selects a precombined blend mode.
    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.apply_blend(mode as u16);
    }

    fn apply_blend(&mut self, mode: u16) {
        if mode == self.cache.blend {
            return;
        }
        self.cache.blend = mode;

        self.api.blend_func(
            blend_factor_token(mode & SOURCE_MASK),
            blend_factor_token(mode & DESTINATION_MASK),
        );
        self.check_errors();
    }

    /// Sets the depth write mask and comparison function together.
    pub fn set_depth_test(&mut self, depth_mask: bool, depth_func: CompareMode) {
        if self.cache.depth_mask == depth_mask && self.cache.depth_func == Some(depth_func) {
            return;
        }
        self.cache.depth_mask = depth_mask;
        self.cache.depth_func = Some(depth_func);

        self.api.depth_mask(depth_mask);
        self.api.depth_func(depth_func_token(depth_func));
        self.check_errors();
    }

    /// Selects the culled triangle face, or disables culling.
    pub fn set_triangle_culling(&mut self, culling: TriangleCulling) {
        if culling == self.cache.culling {
            return;
        }
        // Leaving the disabled state re-enables the capability before the
        // face selection lands.
        if self.cache.culling == TriangleCulling::None {
            self.api.enable(gl::CULL_FACE);
        }
        self.cache.culling = culling;

        match culling {
            TriangleCulling::None => self.api.disable(gl::CULL_FACE),
            TriangleCulling::Back => self.api.cull_face(gl::BACK),
            TriangleCulling::Front => self.api.cull_face(gl::FRONT),
            TriangleCulling::Both => self.api.cull_face(gl::FRONT_AND_BACK),
        }
        self.check_errors();
    }

    /// Moves the window viewport.
    ///
    /// The cache holds the window rectangle even while an offscreen target
    /// is active; see [`RenderContext::set_render_to_backbuffer`].
    pub fn configure_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let requested = ViewportRect::new(x, y, width, height);
        if requested == self.cache.viewport {
            return;
        }
        self.cache.viewport = requested;

        self.api.viewport(x, y, width, height);
    }

    /// Sets a float uniform on the active program.
    pub fn set_uniform_float(&mut self, location: u32, x: f32) {
        self.api.uniform1f(location, x);
    }

    /// Sets a vec2 uniform on the active program.
    pub fn set_uniform_float2(&mut self, location: u32, x: f32, y: f32) {
        self.api.uniform2f(location, x, y);
    }

    /// Sets a vec3 uniform on the active program.
    pub fn set_uniform_float3(&mut self, location: u32, x: f32, y: f32, z: f32) {
        self.api.uniform3f(location, x, y, z);
    }

    /// Sets a vec4 uniform on the active program.
    pub fn set_uniform_float4(&mut self, location: u32, x: f32, y: f32, z: f32, w: f32) {
        self.api.uniform4f(location, x, y, z, w);
    }

    /// Sets `count` mat4 uniforms on the active program from a flat slice.
    pub fn set_uniform_matrix4(
        &mut self,
        location: u32,
        count: u32,
        transpose: bool,
        values: &[f32],
    ) {
        self.api
            .uniform_matrix4fv(location, count, transpose, values);
    }

    /// Draws `triangle_count` indexed triangles.
    ///
    /// The index buffer is rebound only when it differs from the cached
    /// one. Indices are 16-bit, three per triangle, starting at the head of
    /// the buffer. Whether the bound attribute slots satisfy the active
    /// program is not validated here; the API rejects the draw on its own
    /// and the poll afterwards reports it.
    pub fn draw_triangles(&mut self, index_buffer: IndexBufferHandle, triangle_count: u32) {
        if self.cache.index_buffer != Some(index_buffer) {
            self.cache.index_buffer = Some(index_buffer);

            self.api.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, index_buffer.0);
        }

        self.api
            .draw_elements(gl::TRIANGLES, triangle_count * 3, gl::UNSIGNED_SHORT);
        self.check_errors();
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{Call, RecordingGl};
    use crate::context::{RenderContext, VertexSlot};
    use crate::pipeline::{
        BlendDestination, BlendMode, BlendSource, CompareMode, MipFilter, TextureFilter,
        TriangleCulling, WrapMode,
    };

    fn context() -> RenderContext<RecordingGl> {
        let mut ctx = RenderContext::new(RecordingGl::new());
        ctx.api_mut().take_calls();
        ctx
    }

    // ── redundant-call elision ────────────────────────────────────────────

    #[test]
    fn repeated_program_activation_emits_nothing() {
        let mut ctx = context();
        let program = ctx.create_program();

        ctx.set_program(program);
        ctx.api_mut().take_calls();

        ctx.set_program(program);
        assert!(ctx.api().calls().is_empty());
    }

    #[test]
    fn repeated_vertex_binding_emits_nothing() {
        let mut ctx = context();
        let buffer = ctx.create_vertex_buffer(64);
        let binding = Some(VertexSlot {
            buffer,
            size: 3,
            stride: 5,
            offset: 0,
        });

        ctx.set_vertex_buffer_at(2, binding);
        ctx.api_mut().take_calls();

        ctx.set_vertex_buffer_at(2, binding);
        assert!(ctx.api().calls().is_empty());
    }

    #[test]
    fn changed_offset_alone_rebinds_the_slot() {
        let mut ctx = context();
        let buffer = ctx.create_vertex_buffer(64);

        let first = VertexSlot {
            buffer,
            size: 3,
            stride: 5,
            offset: 0,
        };
        ctx.set_vertex_buffer_at(2, Some(first));
        ctx.api_mut().take_calls();

        ctx.set_vertex_buffer_at(2, Some(VertexSlot { offset: 3, ..first }));
        assert!(ctx.api().calls().contains(&Call::VertexAttribPointer {
            index: 2,
            size: 3,
            byte_stride: 20,
            byte_offset: 12,
        }));
    }

    #[test]
    fn unbinding_a_slot_disables_its_array() {
        let mut ctx = context();
        let buffer = ctx.create_vertex_buffer(64);
        ctx.set_vertex_buffer_at(1, Some(VertexSlot {
            buffer,
            size: 3,
            stride: 3,
            offset: 0,
        }));
        ctx.api_mut().take_calls();

        ctx.set_vertex_buffer_at(1, None);
        assert_eq!(ctx.api().calls(), &[Call::DisableVertexAttribArray(1)]);
    }

    #[test]
    fn repeated_blend_mode_emits_nothing() {
        let mut ctx = context();

        ctx.set_blend_mode(BlendMode::Additive);
        ctx.api_mut().take_calls();

        ctx.set_blend_mode(BlendMode::Additive);
        assert!(ctx.api().calls().is_empty());
    }

    #[test]
    fn factor_pair_matching_the_current_mode_emits_nothing() {
        let mut ctx = context();

        // The default mode is One | OneMinusSrcAlpha.
        ctx.set_blend_factors(BlendSource::One, BlendDestination::OneMinusSrcAlpha);
        assert!(ctx.api().calls().is_empty());

        ctx.set_blend_factors(BlendSource::SrcAlpha, BlendDestination::One);
        assert_eq!(ctx.api().calls(), &[
            Call::BlendFunc {
                source: gl::SRC_ALPHA,
                destination: gl::ONE,
            },
            Call::GetError,
        ]);
    }

    #[test]
    fn repeated_depth_test_emits_nothing() {
        let mut ctx = context();

        // Construction left (true, Less) applied.
        ctx.set_depth_test(true, CompareMode::Less);
        assert!(ctx.api().calls().is_empty());

        ctx.set_depth_test(false, CompareMode::LessEqual);
        let calls = ctx.api().calls();
        assert!(calls.contains(&Call::DepthMask(false)));
        assert!(calls.contains(&Call::DepthFunc(gl::LEQUAL)));
    }

    #[test]
    fn repeated_culling_emits_nothing() {
        let mut ctx = context();

        ctx.set_triangle_culling(TriangleCulling::Back);
        assert!(ctx.api().calls().is_empty());

        ctx.set_triangle_culling(TriangleCulling::Front);
        assert!(ctx.api().calls().contains(&Call::CullFace(gl::FRONT)));
    }

    #[test]
    fn leaving_disabled_culling_reenables_the_capability() {
        let mut ctx = context();

        ctx.set_triangle_culling(TriangleCulling::None);
        ctx.api_mut().take_calls();

        ctx.set_triangle_culling(TriangleCulling::Back);
        assert_eq!(ctx.api().calls(), &[
            Call::Enable(gl::CULL_FACE),
            Call::CullFace(gl::BACK),
            Call::GetError,
        ]);
    }

    #[test]
    fn repeated_viewport_emits_nothing() {
        let mut ctx = context();

        ctx.configure_viewport(0, 0, 1024, 768);
        ctx.api_mut().take_calls();

        ctx.configure_viewport(0, 0, 1024, 768);
        assert!(ctx.api().calls().is_empty());
    }

    // ── texture slots and samplers ────────────────────────────────────────

    #[test]
    fn repeated_texture_binding_emits_nothing() {
        let mut ctx = context();
        let texture = ctx.create_texture(64, 64, false, false).unwrap();

        ctx.set_texture_at(3, Some(texture), None);
        ctx.api_mut().take_calls();

        ctx.set_texture_at(3, Some(texture), None);
        assert!(ctx.api().calls().is_empty());
    }

    #[test]
    fn texture_binding_targets_the_slot_unit() {
        let mut ctx = context();
        let texture = ctx.create_texture(64, 64, false, false).unwrap();
        ctx.api_mut().take_calls();

        ctx.set_texture_at(5, Some(texture), None);
        assert_eq!(ctx.api().calls(), &[
            Call::ActiveTexture(gl::TEXTURE0 + 5),
            Call::BindTexture(texture.raw()),
            Call::GetError,
        ]);
    }

    #[test]
    fn sampler_uniform_points_at_the_slot_even_without_rebinding() {
        let mut ctx = context();
        let texture = ctx.create_texture(64, 64, false, false).unwrap();

        ctx.set_texture_at(2, Some(texture), Some(7));
        ctx.api_mut().take_calls();

        // Identical binding, but the sampler uniform still lands.
        ctx.set_texture_at(2, Some(texture), Some(7));
        assert_eq!(ctx.api().calls(), &[
            Call::Uniform1i {
                location: 7,
                value: 2,
            },
            Call::GetError,
        ]);
    }

    #[test]
    fn sampler_state_is_keyed_by_texture_not_slot() {
        let mut ctx = context();
        let texture = ctx.create_texture(64, 64, true, false).unwrap();

        ctx.set_texture_at(0, Some(texture), None);
        ctx.set_sampler_state_at(0, WrapMode::Repeat, TextureFilter::Linear, MipFilter::Linear);

        // Same texture at another slot: its configuration travels with it,
        // so re-applying it there emits nothing.
        ctx.set_texture_at(1, Some(texture), None);
        ctx.api_mut().take_calls();

        ctx.set_sampler_state_at(1, WrapMode::Repeat, TextureFilter::Linear, MipFilter::Linear);
        assert!(ctx.api().calls().is_empty());

        // And restoring the original state at the first slot emits again.
        ctx.set_sampler_state_at(0, WrapMode::Clamp, TextureFilter::Nearest, MipFilter::None);
        let calls = ctx.api().calls();
        assert!(calls.contains(&Call::TexParameter {
            pname: gl::TEXTURE_WRAP_S,
            value: gl::CLAMP_TO_EDGE,
        }));
        assert!(calls.contains(&Call::TexParameter {
            pname: gl::TEXTURE_MIN_FILTER,
            value: gl::NEAREST,
        }));
    }

    #[test]
    fn mip_filter_degrades_silently_without_a_mip_chain() {
        let mut ctx = context();
        let texture = ctx.create_texture(64, 64, false, false).unwrap();
        ctx.set_texture_at(0, Some(texture), None);
        ctx.api_mut().take_calls();

        ctx.set_sampler_state_at(0, WrapMode::Clamp, TextureFilter::Linear, MipFilter::Linear);

        // LINEAR, not LINEAR_MIPMAP_LINEAR.
        assert!(ctx.api().calls().contains(&Call::TexParameter {
            pname: gl::TEXTURE_MIN_FILTER,
            value: gl::LINEAR,
        }));

        // The degraded value is what got cached: repeating the request with
        // any mip filter on this texture changes nothing.
        ctx.api_mut().take_calls();
        ctx.set_sampler_state_at(0, WrapMode::Clamp, TextureFilter::Linear, MipFilter::Nearest);
        assert!(ctx.api().calls().is_empty());
    }

    #[test]
    fn sampler_state_on_empty_slot_is_dropped() {
        let mut ctx = context();

        ctx.set_sampler_state_at(4, WrapMode::Repeat, TextureFilter::Linear, MipFilter::None);
        assert!(ctx.api().calls().is_empty());
    }

    // ── draw dispatch ─────────────────────────────────────────────────────

    #[test]
    fn draw_rebinds_only_on_index_buffer_change() {
        let mut ctx = context();
        let first = ctx.create_index_buffer(6);
        let second = ctx.create_index_buffer(6);
        ctx.api_mut().take_calls();

        // `second` is still bound from its creation.
        ctx.draw_triangles(second, 2);
        assert_eq!(ctx.api().calls(), &[
            Call::DrawElements {
                mode: gl::TRIANGLES,
                count: 6,
                index_type: gl::UNSIGNED_SHORT,
            },
            Call::GetError,
        ]);
        ctx.api_mut().take_calls();

        ctx.draw_triangles(first, 1);
        assert_eq!(ctx.api().calls(), &[
            Call::BindBuffer {
                target: gl::ELEMENT_ARRAY_BUFFER,
                buffer: first.raw(),
            },
            Call::DrawElements {
                mode: gl::TRIANGLES,
                count: 3,
                index_type: gl::UNSIGNED_SHORT,
            },
            Call::GetError,
        ]);
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    #[test]
    fn uniform_setters_forward_to_the_api() {
        let mut ctx = context();
        let program = ctx.create_program();
        ctx.set_program(program);
        ctx.api_mut().take_calls();

        ctx.set_uniform_float(3, 1.5);
        ctx.set_uniform_float4(4, 0.0, 0.25, 0.5, 1.0);
        ctx.set_uniform_matrix4(5, 1, false, &[0.0; 16]);

        assert_eq!(ctx.api().calls(), &[
            Call::Uniform1f { location: 3 },
            Call::Uniform4f { location: 4 },
            Call::UniformMatrix4fv {
                location: 5,
                count: 1,
                transpose: false,
            },
        ]);
    }
}
