//! Underlying graphics API seam.
//!
//! The context talks to the GPU exclusively through [`GlApi`], a trait whose
//! methods mirror the thin, token-based shape of the C entry points. Tokens
//! are the `gl` crate's constants, so both implementations share one
//! vocabulary:
//! - [`LiveGl`] forwards every method to the loaded function pointers
//! - [`RecordingGl`] captures every method as a typed [`Call`] for tests
//!   and diagnostics

mod live;
mod recording;

use std::fmt;

pub use live::LiveGl;
pub use recording::{ActiveVar, Call, ProgramReflection, RecordingGl};

/// Classified error token polled from the underlying API.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ApiError {
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    InvalidFramebufferOperation,
    OutOfMemory,
    Unknown(u32),
}

impl ApiError {
    /// Classifies a polled token; `None` means no error was pending.
    pub fn classify(token: u32) -> Option<ApiError> {
        match token {
            gl::NO_ERROR => None,
            gl::INVALID_ENUM => Some(ApiError::InvalidEnum),
            gl::INVALID_VALUE => Some(ApiError::InvalidValue),
            gl::INVALID_OPERATION => Some(ApiError::InvalidOperation),
            gl::INVALID_FRAMEBUFFER_OPERATION => Some(ApiError::InvalidFramebufferOperation),
            gl::OUT_OF_MEMORY => Some(ApiError::OutOfMemory),
            other => Some(ApiError::Unknown(other)),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidEnum => f.write_str("invalid enum"),
            ApiError::InvalidValue => f.write_str("invalid value"),
            ApiError::InvalidOperation => f.write_str("invalid operation"),
            ApiError::InvalidFramebufferOperation => f.write_str("invalid framebuffer operation"),
            ApiError::OutOfMemory => f.write_str("out of memory"),
            ApiError::Unknown(token) => write!(f, "unknown error {token:#06x}"),
        }
    }
}

/// Thin seam over the underlying graphics API.
///
/// Methods correspond to the C entry points one-for-one; an implementation
/// should do no more than forward or record. All caching, bookkeeping and
/// validation live above this trait, in the context.
///
/// 2D textures are the only texture kind this engine uses, so texture and
/// framebuffer targets are fixed inside the implementations.
pub trait GlApi {
    // Buffer objects.
    fn gen_buffer(&mut self) -> u32;
    fn bind_buffer(&mut self, target: u32, buffer: u32);
    /// Allocates `byte_size` zeroed bytes for the buffer bound to `target`.
    fn buffer_data(&mut self, target: u32, byte_size: usize);
    fn buffer_sub_data(&mut self, target: u32, byte_offset: usize, data: &[u8]);
    fn delete_buffer(&mut self, buffer: u32);

    // Textures.
    fn gen_texture(&mut self) -> u32;
    fn active_texture(&mut self, unit: u32);
    fn bind_texture(&mut self, texture: u32);
    /// Uploads (or, with `None`, allocates) one RGBA8 mip level.
    fn tex_image_2d(&mut self, level: u32, width: u32, height: u32, data: Option<&[u8]>);
    fn tex_parameter(&mut self, pname: u32, value: u32);
    fn generate_mipmap(&mut self);
    fn delete_texture(&mut self, texture: u32);

    // Shaders and programs.
    fn create_shader(&mut self, stage: u32) -> u32;
    fn shader_source(&mut self, shader: u32, source: &str);
    fn compile_shader(&mut self, shader: u32);
    fn delete_shader(&mut self, shader: u32);
    fn create_program(&mut self) -> u32;
    fn attach_shader(&mut self, program: u32, shader: u32);
    fn link_program(&mut self, program: u32);
    fn use_program(&mut self, program: u32);
    fn delete_program(&mut self, program: u32);
    fn get_shader_iv(&mut self, shader: u32, pname: u32) -> i32;
    fn get_program_iv(&mut self, program: u32, pname: u32) -> i32;
    fn get_shader_info_log(&mut self, shader: u32) -> String;
    fn get_program_info_log(&mut self, program: u32) -> String;
    /// Name and type token of the active uniform at `index`.
    fn get_active_uniform(&mut self, program: u32, index: u32) -> (String, u32);
    /// Name and type token of the active attribute at `index`.
    fn get_active_attrib(&mut self, program: u32, index: u32) -> (String, u32);
    /// Resolved location, negative when the variable was optimized away.
    fn get_uniform_location(&mut self, program: u32, name: &str) -> i32;
    fn get_attrib_location(&mut self, program: u32, name: &str) -> i32;

    // Uniform values (location-addressed, active program).
    fn uniform1i(&mut self, location: u32, value: i32);
    fn uniform1f(&mut self, location: u32, x: f32);
    fn uniform2f(&mut self, location: u32, x: f32, y: f32);
    fn uniform3f(&mut self, location: u32, x: f32, y: f32, z: f32);
    fn uniform4f(&mut self, location: u32, x: f32, y: f32, z: f32, w: f32);
    fn uniform_matrix4fv(&mut self, location: u32, count: u32, transpose: bool, values: &[f32]);

    // Vertex attribute arrays.
    fn enable_vertex_attrib_array(&mut self, index: u32);
    fn disable_vertex_attrib_array(&mut self, index: u32);
    /// Float attribute layout for the array buffer currently bound.
    fn vertex_attrib_pointer(&mut self, index: u32, size: u32, byte_stride: u32, byte_offset: u32);

    // Framebuffers and renderbuffers.
    fn gen_framebuffer(&mut self) -> u32;
    fn bind_framebuffer(&mut self, framebuffer: u32);
    fn framebuffer_texture_2d(&mut self, attachment: u32, texture: u32);
    fn gen_renderbuffer(&mut self) -> u32;
    fn bind_renderbuffer(&mut self, renderbuffer: u32);
    fn renderbuffer_storage(&mut self, format: u32, width: u32, height: u32);
    fn framebuffer_renderbuffer(&mut self, attachment: u32, renderbuffer: u32);
    fn check_framebuffer_status(&mut self) -> u32;
    fn delete_framebuffer(&mut self, framebuffer: u32);
    fn delete_renderbuffer(&mut self, renderbuffer: u32);

    // Fixed-function state.
    fn enable(&mut self, capability: u32);
    fn disable(&mut self, capability: u32);
    fn cull_face(&mut self, mode: u32);
    fn front_face(&mut self, mode: u32);
    fn blend_func(&mut self, source: u32, destination: u32);
    fn depth_mask(&mut self, flag: bool);
    fn depth_func(&mut self, func: u32);
    fn viewport(&mut self, x: u32, y: u32, width: u32, height: u32);

    // Clears, draws, read-back.
    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32);
    fn clear_depth(&mut self, depth: f32);
    fn clear_stencil(&mut self, stencil: u32);
    fn clear(&mut self, mask: u32);
    fn draw_elements(&mut self, mode: u32, count: u32, index_type: u32);
    /// Reads the rectangle as tightly packed RGBA8 into `dest`.
    fn read_pixels(&mut self, x: u32, y: u32, width: u32, height: u32, dest: &mut [u8]);

    // Queries.
    fn get_error(&mut self) -> u32;
    fn get_viewport(&mut self) -> [i32; 4];
    fn get_string(&mut self, name: u32) -> String;
}
