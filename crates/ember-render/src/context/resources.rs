//! Resource creation, upload and deletion.
//!
//! Capacities and offsets keep the engine's element units: `f32` elements
//! for vertex data, `u16` indices for index data, texels for textures. Byte
//! conversion happens here, at the API boundary, and nowhere above.

use std::mem::size_of;

use crate::api::GlApi;
use crate::error::ContextError;
use crate::pipeline::SamplerState;

use super::{
    IndexBufferHandle, ProgramHandle, RenderContext, ShaderHandle, TextureHandle, TextureInfo,
    VertexBufferHandle,
};

/// Shader pipeline stage.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Prologue prepended to every shader source before compilation.
const SHADER_VERSION_PROLOGUE: &str = "#version 120\n";

impl<A: GlApi> RenderContext<A> {
    /// Creates a vertex buffer of `size` f32 elements, zero-initialized.
    pub fn create_vertex_buffer(&mut self, size: u32) -> VertexBufferHandle {
        let buffer = VertexBufferHandle(self.api.gen_buffer());

        self.api.bind_buffer(gl::ARRAY_BUFFER, buffer.0);
        self.api
            .buffer_data(gl::ARRAY_BUFFER, size as usize * size_of::<f32>());

        self.vertex_buffers.insert(buffer, size);
        self.check_errors();

        buffer
    }

    /// Writes `data` starting at `offset` f32 elements into the buffer.
    ///
    /// Keeping `offset + data.len()` within the allocated capacity is a
    /// caller obligation; the range is not checked here.
    pub fn upload_vertex_buffer_data(
        &mut self,
        buffer: VertexBufferHandle,
        offset: u32,
        data: &[f32],
    ) {
        self.api.bind_buffer(gl::ARRAY_BUFFER, buffer.0);
        self.api.buffer_sub_data(
            gl::ARRAY_BUFFER,
            offset as usize * size_of::<f32>(),
            bytemuck::cast_slice(data),
        );
        self.check_errors();
    }

    /// Deletes the buffer and resets any attribute slot still bound to it.
    pub fn delete_vertex_buffer(&mut self, buffer: VertexBufferHandle) {
        self.vertex_buffers.remove(&buffer);

        for slot in self.cache.vertex_slots.iter_mut() {
            if slot.is_some_and(|bound| bound.buffer == buffer) {
                *slot = None;
            }
        }

        self.api.delete_buffer(buffer.0);
        self.check_errors();
    }

    /// Creates an index buffer of `size` 16-bit indices, zero-initialized.
    ///
    /// The new buffer stays bound, and the cached current index buffer
    /// follows it.
    pub fn create_index_buffer(&mut self, size: u32) -> IndexBufferHandle {
        let buffer = IndexBufferHandle(self.api.gen_buffer());

        self.api.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, buffer.0);
        self.cache.index_buffer = Some(buffer);
        self.api
            .buffer_data(gl::ELEMENT_ARRAY_BUFFER, size as usize * size_of::<u16>());

        self.index_buffers.insert(buffer, size);
        self.check_errors();

        buffer
    }

    /// Writes `data` starting at `offset` indices into the buffer.
    ///
    /// Range discipline is the caller's, as for vertex uploads. The buffer
    /// stays bound afterwards.
    pub fn upload_index_buffer_data(
        &mut self,
        buffer: IndexBufferHandle,
        offset: u32,
        data: &[u16],
    ) {
        self.api.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, buffer.0);
        self.cache.index_buffer = Some(buffer);
        self.api.buffer_sub_data(
            gl::ELEMENT_ARRAY_BUFFER,
            offset as usize * size_of::<u16>(),
            bytemuck::cast_slice(data),
        );
        self.check_errors();
    }

    /// Deletes the buffer; a matching cached binding is reset.
    pub fn delete_index_buffer(&mut self, buffer: IndexBufferHandle) {
        self.index_buffers.remove(&buffer);

        if self.cache.index_buffer == Some(buffer) {
            self.cache.index_buffer = None;
        }

        self.api.delete_buffer(buffer.0);
        self.check_errors();
    }

    /// Creates a `width` x `height` RGBA8 texture.
    ///
    /// Both dimensions must be powers of two; violations fail before any
    /// underlying allocation. `mipmapped` allocates the full mip chain up
    /// front. `render_target` promotes the texture for offscreen rendering
    /// by creating its attachment pair now; promotion never happens lazily,
    /// so only textures created with the flag can be drawn into.
    pub fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        mipmapped: bool,
        render_target: bool,
    ) -> Result<TextureHandle, ContextError> {
        if !width.is_power_of_two() || !height.is_power_of_two() {
            return Err(ContextError::InvalidTextureSize { width, height });
        }

        let texture = TextureHandle(self.api.gen_texture());
        self.api.bind_texture(texture.0);

        // Default sampler state, mirrored in the per-texture cache.
        self.api.tex_parameter(gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE);
        self.api.tex_parameter(gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE);
        self.api.tex_parameter(gl::TEXTURE_MIN_FILTER, gl::NEAREST);
        self.api.tex_parameter(gl::TEXTURE_MAG_FILTER, gl::NEAREST);

        self.textures.insert(
            texture,
            TextureInfo {
                width,
                height,
                mipmapped,
            },
        );
        self.cache.samplers.insert(texture, SamplerState::default());

        if mipmapped {
            let (mut level_width, mut level_height) = (width, height);
            let mut level = 0;
            let mut extent = width.max(height);
            while extent > 0 {
                // Non-square chains run the smaller axis down to 1 early.
                self.api
                    .tex_image_2d(level, level_width.max(1), level_height.max(1), None);
                level += 1;
                extent >>= 1;
                level_width >>= 1;
                level_height >>= 1;
            }
        } else {
            self.api.tex_image_2d(0, width, height, None);
        }

        if render_target {
            if let Err(error) = self.create_target_attachments(texture, width, height) {
                self.delete_texture(texture);
                return Err(error);
            }
        }

        self.check_errors();
        Ok(texture)
    }

    /// Uploads one mip level of RGBA8 texels.
    pub fn upload_texture_data(
        &mut self,
        texture: TextureHandle,
        width: u32,
        height: u32,
        mip_level: u32,
        data: &[u8],
    ) {
        self.api.bind_texture(texture.0);
        self.api.tex_image_2d(mip_level, width, height, Some(data));
        self.check_errors();
    }

    /// Regenerates the mip chain from the base level.
    ///
    /// Always explicit; uploads and render-target switches never do this on
    /// their own.
    pub fn generate_mipmaps(&mut self, texture: TextureHandle) {
        self.api.bind_texture(texture.0);
        self.api.generate_mipmap();
        self.check_errors();
    }

    /// Deletes the texture, its attachment pair when promoted, and every
    /// cached trace of it: sampler state, sampler-slot bindings, and the
    /// active render target (drawing reverts to the backbuffer first).
    ///
    /// A texture name the API later hands out again therefore starts from
    /// default cached state.
    pub fn delete_texture(&mut self, texture: TextureHandle) {
        if self.cache.target == Some(texture) {
            self.set_render_to_backbuffer();
        }

        self.textures.remove(&texture);
        self.api.delete_texture(texture.0);

        if let Some(attachments) = self.render_targets.remove(&texture) {
            self.api.delete_framebuffer(attachments.framebuffer);
            self.api.delete_renderbuffer(attachments.renderbuffer);
        }

        self.cache.samplers.remove(&texture);
        for slot in self.cache.texture_slots.iter_mut() {
            if *slot == Some(texture) {
                *slot = None;
            }
        }

        self.check_errors();
    }

    /// Creates an empty vertex-stage shader object.
    pub fn create_vertex_shader(&mut self) -> ShaderHandle {
        self.create_shader(ShaderStage::Vertex)
    }

    /// Creates an empty fragment-stage shader object.
    pub fn create_fragment_shader(&mut self) -> ShaderHandle {
        self.create_shader(ShaderStage::Fragment)
    }

    fn create_shader(&mut self, stage: ShaderStage) -> ShaderHandle {
        let token = match stage {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        };
        let shader = ShaderHandle(self.api.create_shader(token));
        self.shaders.insert(shader, stage);
        shader
    }

    /// Stage the shader was created for.
    pub fn shader_stage(&self, shader: ShaderHandle) -> Option<ShaderStage> {
        self.shaders.get(&shader).copied()
    }

    /// Replaces the shader's source text (set before compiling).
    pub fn set_shader_source(&mut self, shader: ShaderHandle, source: &str) {
        let source = format!("{SHADER_VERSION_PROLOGUE}{source}");
        self.api.shader_source(shader.0, &source);
        self.check_errors();
    }

    /// Compiles the shader.
    ///
    /// Diagnostics are logged in debug builds; compilation failure does not
    /// prevent the shader from being attached and linked, it only produces
    /// a program that will fail downstream.
    pub fn compile_shader(&mut self, shader: ShaderHandle) {
        self.api.compile_shader(shader.0);

        if cfg!(debug_assertions) {
            let logs = self.shader_compilation_logs(shader);
            if !logs.is_empty() {
                log::error!("shader {} failed to compile:\n{logs}", shader.0);
            }
        }

        self.check_errors();
    }

    /// Deletes the shader object.
    pub fn delete_shader(&mut self, shader: ShaderHandle) {
        self.shaders.remove(&shader);
        self.api.delete_shader(shader.0);
        self.check_errors();
    }

    /// Creates an empty program object.
    pub fn create_program(&mut self) -> ProgramHandle {
        let program = ProgramHandle(self.api.create_program());
        self.programs.insert(program);
        program
    }

    /// Attaches a compiled (or to-be-compiled) shader to the program.
    pub fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        self.api.attach_shader(program.0, shader.0);
        self.check_errors();
    }

    /// Links the program. Diagnostics are logged in debug builds.
    pub fn link_program(&mut self, program: ProgramHandle) {
        self.api.link_program(program.0);

        if cfg!(debug_assertions) {
            let logs = self.program_info_logs(program);
            if !logs.is_empty() {
                log::warn!("program {} link diagnostics:\n{logs}", program.0);
            }
        }

        self.check_errors();
    }

    /// Deletes the program; a matching cached active program is reset.
    pub fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);

        if self.cache.program == Some(program) {
            self.cache.program = None;
        }

        self.api.delete_program(program.0);
        self.check_errors();
    }
}
