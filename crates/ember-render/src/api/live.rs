//! Live backend: forwards every call to the loaded GL function pointers.

use std::ffi::{CStr, CString, c_void};
use std::ptr;

use gl::types::{GLboolean, GLchar, GLenum, GLint, GLsizei, GLuint};

use super::GlApi;

/// Backend that issues real API calls through the `gl` crate.
///
/// The windowing layer must have made a context current on this thread
/// before constructing one, and keeps it current for the backend's whole
/// lifetime; this type only loads the function pointers.
pub struct LiveGl {
    _private: (),
}

impl LiveGl {
    /// Loads the function pointers through `loader` (typically the
    /// windowing library's `get_proc_address`).
    pub fn new<F>(mut loader: F) -> Self
    where
        F: FnMut(&str) -> *const c_void,
    {
        gl::load_with(|symbol| loader(symbol));
        Self { _private: () }
    }
}

fn as_boolean(flag: bool) -> GLboolean {
    if flag { gl::TRUE } else { gl::FALSE }
}

impl GlApi for LiveGl {
    fn gen_buffer(&mut self) -> u32 {
        let mut buffer: GLuint = 0;
        unsafe { gl::GenBuffers(1, &mut buffer) };
        buffer
    }

    fn bind_buffer(&mut self, target: u32, buffer: u32) {
        unsafe { gl::BindBuffer(target, buffer) };
    }

    fn buffer_data(&mut self, target: u32, byte_size: usize) {
        unsafe { gl::BufferData(target, byte_size as isize, ptr::null(), gl::STATIC_DRAW) };
    }

    fn buffer_sub_data(&mut self, target: u32, byte_offset: usize, data: &[u8]) {
        unsafe {
            gl::BufferSubData(
                target,
                byte_offset as isize,
                data.len() as isize,
                data.as_ptr() as *const c_void,
            )
        };
    }

    fn delete_buffer(&mut self, buffer: u32) {
        unsafe { gl::DeleteBuffers(1, &buffer) };
    }

    fn gen_texture(&mut self) -> u32 {
        let mut texture: GLuint = 0;
        unsafe { gl::GenTextures(1, &mut texture) };
        texture
    }

    fn active_texture(&mut self, unit: u32) {
        unsafe { gl::ActiveTexture(unit) };
    }

    fn bind_texture(&mut self, texture: u32) {
        unsafe { gl::BindTexture(gl::TEXTURE_2D, texture) };
    }

    fn tex_image_2d(&mut self, level: u32, width: u32, height: u32, data: Option<&[u8]>) {
        let pixels = data.map_or(ptr::null(), |d| d.as_ptr() as *const c_void);
        unsafe {
            gl::TexImage2D(
                gl::TEXTURE_2D,
                level as GLint,
                gl::RGBA as GLint,
                width as GLsizei,
                height as GLsizei,
                0,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                pixels,
            )
        };
    }

    fn tex_parameter(&mut self, pname: u32, value: u32) {
        unsafe { gl::TexParameteri(gl::TEXTURE_2D, pname, value as GLint) };
    }

    fn generate_mipmap(&mut self) {
        unsafe { gl::GenerateMipmap(gl::TEXTURE_2D) };
    }

    fn delete_texture(&mut self, texture: u32) {
        unsafe { gl::DeleteTextures(1, &texture) };
    }

    fn create_shader(&mut self, stage: u32) -> u32 {
        unsafe { gl::CreateShader(stage) }
    }

    fn shader_source(&mut self, shader: u32, source: &str) {
        let Ok(source) = CString::new(source) else {
            log::warn!("shader {shader} source contains an interior NUL, ignored");
            return;
        };
        let pointer = source.as_ptr();
        unsafe { gl::ShaderSource(shader, 1, &pointer, ptr::null()) };
    }

    fn compile_shader(&mut self, shader: u32) {
        unsafe { gl::CompileShader(shader) };
    }

    fn delete_shader(&mut self, shader: u32) {
        unsafe { gl::DeleteShader(shader) };
    }

    fn create_program(&mut self) -> u32 {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        unsafe { gl::AttachShader(program, shader) };
    }

    fn link_program(&mut self, program: u32) {
        unsafe { gl::LinkProgram(program) };
    }

    fn use_program(&mut self, program: u32) {
        unsafe { gl::UseProgram(program) };
    }

    fn delete_program(&mut self, program: u32) {
        unsafe { gl::DeleteProgram(program) };
    }

    fn get_shader_iv(&mut self, shader: u32, pname: u32) -> i32 {
        let mut value: GLint = 0;
        unsafe { gl::GetShaderiv(shader, pname, &mut value) };
        value
    }

    fn get_program_iv(&mut self, program: u32, pname: u32) -> i32 {
        let mut value: GLint = 0;
        unsafe { gl::GetProgramiv(program, pname, &mut value) };
        value
    }

    fn get_shader_info_log(&mut self, shader: u32) -> String {
        let length = self.get_shader_iv(shader, gl::INFO_LOG_LENGTH);
        if length <= 0 {
            return String::new();
        }
        let mut buffer = vec![0u8; length as usize];
        let mut written: GLsizei = 0;
        unsafe {
            gl::GetShaderInfoLog(shader, length, &mut written, buffer.as_mut_ptr() as *mut GLchar)
        };
        buffer.truncate(written.max(0) as usize);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    fn get_program_info_log(&mut self, program: u32) -> String {
        let length = self.get_program_iv(program, gl::INFO_LOG_LENGTH);
        if length <= 0 {
            return String::new();
        }
        let mut buffer = vec![0u8; length as usize];
        let mut written: GLsizei = 0;
        unsafe {
            gl::GetProgramInfoLog(program, length, &mut written, buffer.as_mut_ptr() as *mut GLchar)
        };
        buffer.truncate(written.max(0) as usize);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    fn get_active_uniform(&mut self, program: u32, index: u32) -> (String, u32) {
        let max_length = self.get_program_iv(program, gl::ACTIVE_UNIFORM_MAX_LENGTH);
        let mut buffer = vec![0u8; max_length.max(1) as usize];
        let mut written: GLsizei = 0;
        let mut size: GLint = 0;
        let mut type_token: GLenum = 0;
        unsafe {
            gl::GetActiveUniform(
                program,
                index,
                buffer.len() as GLsizei,
                &mut written,
                &mut size,
                &mut type_token,
                buffer.as_mut_ptr() as *mut GLchar,
            )
        };
        buffer.truncate(written.max(0) as usize);
        (String::from_utf8_lossy(&buffer).into_owned(), type_token)
    }

    fn get_active_attrib(&mut self, program: u32, index: u32) -> (String, u32) {
        let max_length = self.get_program_iv(program, gl::ACTIVE_ATTRIBUTE_MAX_LENGTH);
        let mut buffer = vec![0u8; max_length.max(1) as usize];
        let mut written: GLsizei = 0;
        let mut size: GLint = 0;
        let mut type_token: GLenum = 0;
        unsafe {
            gl::GetActiveAttrib(
                program,
                index,
                buffer.len() as GLsizei,
                &mut written,
                &mut size,
                &mut type_token,
                buffer.as_mut_ptr() as *mut GLchar,
            )
        };
        buffer.truncate(written.max(0) as usize);
        (String::from_utf8_lossy(&buffer).into_owned(), type_token)
    }

    fn get_uniform_location(&mut self, program: u32, name: &str) -> i32 {
        // Interior NULs cannot come out of the API's own name queries.
        let Ok(name) = CString::new(name) else {
            return -1;
        };
        unsafe { gl::GetUniformLocation(program, name.as_ptr()) }
    }

    fn get_attrib_location(&mut self, program: u32, name: &str) -> i32 {
        let Ok(name) = CString::new(name) else {
            return -1;
        };
        unsafe { gl::GetAttribLocation(program, name.as_ptr()) }
    }

    fn uniform1i(&mut self, location: u32, value: i32) {
        unsafe { gl::Uniform1i(location as GLint, value) };
    }

    fn uniform1f(&mut self, location: u32, x: f32) {
        unsafe { gl::Uniform1f(location as GLint, x) };
    }

    fn uniform2f(&mut self, location: u32, x: f32, y: f32) {
        unsafe { gl::Uniform2f(location as GLint, x, y) };
    }

    fn uniform3f(&mut self, location: u32, x: f32, y: f32, z: f32) {
        unsafe { gl::Uniform3f(location as GLint, x, y, z) };
    }

    fn uniform4f(&mut self, location: u32, x: f32, y: f32, z: f32, w: f32) {
        unsafe { gl::Uniform4f(location as GLint, x, y, z, w) };
    }

    fn uniform_matrix4fv(&mut self, location: u32, count: u32, transpose: bool, values: &[f32]) {
        unsafe {
            gl::UniformMatrix4fv(
                location as GLint,
                count as GLsizei,
                as_boolean(transpose),
                values.as_ptr(),
            )
        };
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { gl::EnableVertexAttribArray(index) };
    }

    fn disable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { gl::DisableVertexAttribArray(index) };
    }

    fn vertex_attrib_pointer(&mut self, index: u32, size: u32, byte_stride: u32, byte_offset: u32) {
        unsafe {
            gl::VertexAttribPointer(
                index,
                size as GLint,
                gl::FLOAT,
                gl::FALSE,
                byte_stride as GLsizei,
                byte_offset as usize as *const c_void,
            )
        };
    }

    fn gen_framebuffer(&mut self) -> u32 {
        let mut framebuffer: GLuint = 0;
        unsafe { gl::GenFramebuffers(1, &mut framebuffer) };
        framebuffer
    }

    fn bind_framebuffer(&mut self, framebuffer: u32) {
        unsafe { gl::BindFramebuffer(gl::FRAMEBUFFER, framebuffer) };
    }

    fn framebuffer_texture_2d(&mut self, attachment: u32, texture: u32) {
        unsafe {
            gl::FramebufferTexture2D(gl::FRAMEBUFFER, attachment, gl::TEXTURE_2D, texture, 0)
        };
    }

    fn gen_renderbuffer(&mut self) -> u32 {
        let mut renderbuffer: GLuint = 0;
        unsafe { gl::GenRenderbuffers(1, &mut renderbuffer) };
        renderbuffer
    }

    fn bind_renderbuffer(&mut self, renderbuffer: u32) {
        unsafe { gl::BindRenderbuffer(gl::RENDERBUFFER, renderbuffer) };
    }

    fn renderbuffer_storage(&mut self, format: u32, width: u32, height: u32) {
        unsafe {
            gl::RenderbufferStorage(
                gl::RENDERBUFFER,
                format,
                width as GLsizei,
                height as GLsizei,
            )
        };
    }

    fn framebuffer_renderbuffer(&mut self, attachment: u32, renderbuffer: u32) {
        unsafe {
            gl::FramebufferRenderbuffer(gl::FRAMEBUFFER, attachment, gl::RENDERBUFFER, renderbuffer)
        };
    }

    fn check_framebuffer_status(&mut self) -> u32 {
        unsafe { gl::CheckFramebufferStatus(gl::FRAMEBUFFER) }
    }

    fn delete_framebuffer(&mut self, framebuffer: u32) {
        unsafe { gl::DeleteFramebuffers(1, &framebuffer) };
    }

    fn delete_renderbuffer(&mut self, renderbuffer: u32) {
        unsafe { gl::DeleteRenderbuffers(1, &renderbuffer) };
    }

    fn enable(&mut self, capability: u32) {
        unsafe { gl::Enable(capability) };
    }

    fn disable(&mut self, capability: u32) {
        unsafe { gl::Disable(capability) };
    }

    fn cull_face(&mut self, mode: u32) {
        unsafe { gl::CullFace(mode) };
    }

    fn front_face(&mut self, mode: u32) {
        unsafe { gl::FrontFace(mode) };
    }

    fn blend_func(&mut self, source: u32, destination: u32) {
        unsafe { gl::BlendFunc(source, destination) };
    }

    fn depth_mask(&mut self, flag: bool) {
        unsafe { gl::DepthMask(as_boolean(flag)) };
    }

    fn depth_func(&mut self, func: u32) {
        unsafe { gl::DepthFunc(func) };
    }

    fn viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        unsafe {
            gl::Viewport(
                x as GLint,
                y as GLint,
                width as GLsizei,
                height as GLsizei,
            )
        };
    }

    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        unsafe { gl::ClearColor(red, green, blue, alpha) };
    }

    fn clear_depth(&mut self, depth: f32) {
        unsafe { gl::ClearDepth(depth as f64) };
    }

    fn clear_stencil(&mut self, stencil: u32) {
        unsafe { gl::ClearStencil(stencil as GLint) };
    }

    fn clear(&mut self, mask: u32) {
        unsafe { gl::Clear(mask) };
    }

    fn draw_elements(&mut self, mode: u32, count: u32, index_type: u32) {
        unsafe { gl::DrawElements(mode, count as GLsizei, index_type, ptr::null()) };
    }

    fn read_pixels(&mut self, x: u32, y: u32, width: u32, height: u32, dest: &mut [u8]) {
        unsafe {
            gl::ReadPixels(
                x as GLint,
                y as GLint,
                width as GLsizei,
                height as GLsizei,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                dest.as_mut_ptr() as *mut c_void,
            )
        };
    }

    fn get_error(&mut self) -> u32 {
        unsafe { gl::GetError() }
    }

    fn get_viewport(&mut self) -> [i32; 4] {
        let mut viewport = [0i32; 4];
        unsafe { gl::GetIntegerv(gl::VIEWPORT, viewport.as_mut_ptr()) };
        viewport
    }

    fn get_string(&mut self, name: u32) -> String {
        let pointer = unsafe { gl::GetString(name) };
        if pointer.is_null() {
            return String::new();
        }
        unsafe { CStr::from_ptr(pointer as *const _) }
            .to_string_lossy()
            .into_owned()
    }
}
