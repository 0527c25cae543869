//! Recording backend: captures every call as a typed value.
//!
//! Used by the test suite to observe exactly which calls the context emits
//! (and, as importantly, which calls it elides), and by tooling that wants a
//! call trace without a GPU. Object names are simulated with per-kind pools
//! that reuse released names, the way real drivers do; uploaded buffer bytes
//! are retained for read-back checks; program reflection data and error
//! tokens can be scripted.

use std::collections::{HashMap, VecDeque};

use super::GlApi;

/// One recorded API call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GenBuffer,
    BindBuffer { target: u32, buffer: u32 },
    BufferData { target: u32, byte_size: usize },
    BufferSubData { target: u32, byte_offset: usize, byte_len: usize },
    DeleteBuffer(u32),

    GenTexture,
    ActiveTexture(u32),
    BindTexture(u32),
    TexImage2d { level: u32, width: u32, height: u32, with_data: bool },
    TexParameter { pname: u32, value: u32 },
    GenerateMipmap,
    DeleteTexture(u32),

    CreateShader(u32),
    ShaderSource(u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram,
    AttachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    UseProgram(u32),
    DeleteProgram(u32),
    GetShaderIv { shader: u32, pname: u32 },
    GetProgramIv { program: u32, pname: u32 },
    GetShaderInfoLog(u32),
    GetProgramInfoLog(u32),
    GetActiveUniform { program: u32, index: u32 },
    GetActiveAttrib { program: u32, index: u32 },
    GetUniformLocation(u32),
    GetAttribLocation(u32),

    Uniform1i { location: u32, value: i32 },
    Uniform1f { location: u32 },
    Uniform2f { location: u32 },
    Uniform3f { location: u32 },
    Uniform4f { location: u32 },
    UniformMatrix4fv { location: u32, count: u32, transpose: bool },

    EnableVertexAttribArray(u32),
    DisableVertexAttribArray(u32),
    VertexAttribPointer { index: u32, size: u32, byte_stride: u32, byte_offset: u32 },

    GenFramebuffer,
    BindFramebuffer(u32),
    FramebufferTexture2d { attachment: u32, texture: u32 },
    GenRenderbuffer,
    BindRenderbuffer(u32),
    RenderbufferStorage { format: u32, width: u32, height: u32 },
    FramebufferRenderbuffer { attachment: u32, renderbuffer: u32 },
    CheckFramebufferStatus,
    DeleteFramebuffer(u32),
    DeleteRenderbuffer(u32),

    Enable(u32),
    Disable(u32),
    CullFace(u32),
    FrontFace(u32),
    BlendFunc { source: u32, destination: u32 },
    DepthMask(bool),
    DepthFunc(u32),
    Viewport { x: u32, y: u32, width: u32, height: u32 },

    ClearColor { red: f32, green: f32, blue: f32, alpha: f32 },
    ClearDepth(f32),
    ClearStencil(u32),
    Clear(u32),
    DrawElements { mode: u32, count: u32, index_type: u32 },
    ReadPixels { x: u32, y: u32, width: u32, height: u32 },

    GetError,
    GetViewport,
    GetString(u32),
}

/// One scripted active uniform or attribute.
#[derive(Debug, Clone)]
pub struct ActiveVar {
    pub name: String,
    pub type_token: u32,
    /// Negative means the variable was optimized away.
    pub location: i32,
}

impl ActiveVar {
    pub fn new(name: &str, type_token: u32, location: i32) -> Self {
        Self {
            name: name.to_owned(),
            type_token,
            location,
        }
    }
}

/// Scripted reflection data for one linked program.
#[derive(Debug, Clone, Default)]
pub struct ProgramReflection {
    pub uniforms: Vec<ActiveVar>,
    pub attributes: Vec<ActiveVar>,
}

/// Object-name allocator that reuses released names, newest first.
#[derive(Debug, Default)]
struct NamePool {
    next: u32,
    free: Vec<u32>,
}

impl NamePool {
    fn alloc(&mut self) -> u32 {
        self.free.pop().unwrap_or_else(|| {
            self.next += 1;
            self.next
        })
    }

    fn release(&mut self, name: u32) {
        self.free.push(name);
    }
}

/// Recording implementation of [`GlApi`].
pub struct RecordingGl {
    calls: Vec<Call>,

    buffers: NamePool,
    textures: NamePool,
    framebuffers: NamePool,
    renderbuffers: NamePool,
    shaders: NamePool,
    programs: NamePool,

    /// Retained contents per buffer name.
    buffer_store: HashMap<u32, Vec<u8>>,
    bound_array_buffer: u32,
    bound_element_buffer: u32,

    reflections: HashMap<u32, ProgramReflection>,
    failed_shaders: HashMap<u32, String>,
    program_logs: HashMap<u32, String>,

    pending_errors: VecDeque<u32>,
    initial_viewport: [i32; 4],
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::with_viewport(0, 0, 800, 600)
    }

    /// Backend whose initial viewport query reports the given rectangle.
    pub fn with_viewport(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            calls: Vec::new(),
            buffers: NamePool::default(),
            textures: NamePool::default(),
            framebuffers: NamePool::default(),
            renderbuffers: NamePool::default(),
            shaders: NamePool::default(),
            programs: NamePool::default(),
            buffer_store: HashMap::new(),
            bound_array_buffer: 0,
            bound_element_buffer: 0,
            reflections: HashMap::new(),
            failed_shaders: HashMap::new(),
            program_logs: HashMap::new(),
            pending_errors: VecDeque::new(),
            initial_viewport: [x, y, width, height],
        }
    }

    /// Everything recorded so far, in call order.
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Drains the recorded calls, leaving the log empty.
    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    /// Retained bytes of a buffer, if it is alive.
    pub fn buffer_contents(&self, buffer: u32) -> Option<&[u8]> {
        self.buffer_store.get(&buffer).map(Vec::as_slice)
    }

    /// Scripts the active uniforms/attributes a program will report.
    pub fn set_reflection(&mut self, program: u32, reflection: ProgramReflection) {
        self.reflections.insert(program, reflection);
    }

    /// Marks a shader as failed to compile, with the given diagnostics.
    pub fn set_shader_failure(&mut self, shader: u32, info_log: &str) {
        self.failed_shaders.insert(shader, info_log.to_owned());
    }

    /// Scripts a program's info log text.
    pub fn set_program_info_log(&mut self, program: u32, info_log: &str) {
        self.program_logs.insert(program, info_log.to_owned());
    }

    /// Queues an error token for the next `get_error` poll.
    pub fn push_error(&mut self, token: u32) {
        self.pending_errors.push_back(token);
    }

    fn bound_buffer_mut(&mut self, target: u32) -> Option<&mut Vec<u8>> {
        let name = match target {
            gl::ELEMENT_ARRAY_BUFFER => self.bound_element_buffer,
            _ => self.bound_array_buffer,
        };
        self.buffer_store.get_mut(&name)
    }

    fn find_location(vars: &[ActiveVar], name: &str) -> i32 {
        vars.iter()
            .find(|var| var.name == name)
            .map_or(-1, |var| var.location)
    }
}

impl Default for RecordingGl {
    fn default() -> Self {
        Self::new()
    }
}

impl GlApi for RecordingGl {
    fn gen_buffer(&mut self) -> u32 {
        self.calls.push(Call::GenBuffer);
        let buffer = self.buffers.alloc();
        self.buffer_store.insert(buffer, Vec::new());
        buffer
    }

    fn bind_buffer(&mut self, target: u32, buffer: u32) {
        self.calls.push(Call::BindBuffer { target, buffer });
        match target {
            gl::ELEMENT_ARRAY_BUFFER => self.bound_element_buffer = buffer,
            _ => self.bound_array_buffer = buffer,
        }
    }

    fn buffer_data(&mut self, target: u32, byte_size: usize) {
        self.calls.push(Call::BufferData { target, byte_size });
        if let Some(contents) = self.bound_buffer_mut(target) {
            contents.clear();
            contents.resize(byte_size, 0);
        }
    }

    fn buffer_sub_data(&mut self, target: u32, byte_offset: usize, data: &[u8]) {
        self.calls.push(Call::BufferSubData {
            target,
            byte_offset,
            byte_len: data.len(),
        });
        if let Some(contents) = self.bound_buffer_mut(target) {
            let end = byte_offset + data.len();
            if contents.len() < end {
                contents.resize(end, 0);
            }
            contents[byte_offset..end].copy_from_slice(data);
        }
    }

    fn delete_buffer(&mut self, buffer: u32) {
        self.calls.push(Call::DeleteBuffer(buffer));
        self.buffer_store.remove(&buffer);
        self.buffers.release(buffer);
    }

    fn gen_texture(&mut self) -> u32 {
        self.calls.push(Call::GenTexture);
        self.textures.alloc()
    }

    fn active_texture(&mut self, unit: u32) {
        self.calls.push(Call::ActiveTexture(unit));
    }

    fn bind_texture(&mut self, texture: u32) {
        self.calls.push(Call::BindTexture(texture));
    }

    fn tex_image_2d(&mut self, level: u32, width: u32, height: u32, data: Option<&[u8]>) {
        self.calls.push(Call::TexImage2d {
            level,
            width,
            height,
            with_data: data.is_some(),
        });
    }

    fn tex_parameter(&mut self, pname: u32, value: u32) {
        self.calls.push(Call::TexParameter { pname, value });
    }

    fn generate_mipmap(&mut self) {
        self.calls.push(Call::GenerateMipmap);
    }

    fn delete_texture(&mut self, texture: u32) {
        self.calls.push(Call::DeleteTexture(texture));
        self.textures.release(texture);
    }

    fn create_shader(&mut self, stage: u32) -> u32 {
        self.calls.push(Call::CreateShader(stage));
        self.shaders.alloc()
    }

    fn shader_source(&mut self, shader: u32, _source: &str) {
        self.calls.push(Call::ShaderSource(shader));
    }

    fn compile_shader(&mut self, shader: u32) {
        self.calls.push(Call::CompileShader(shader));
    }

    fn delete_shader(&mut self, shader: u32) {
        self.calls.push(Call::DeleteShader(shader));
        self.shaders.release(shader);
    }

    fn create_program(&mut self) -> u32 {
        self.calls.push(Call::CreateProgram);
        self.programs.alloc()
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        self.calls.push(Call::AttachShader { program, shader });
    }

    fn link_program(&mut self, program: u32) {
        self.calls.push(Call::LinkProgram(program));
    }

    fn use_program(&mut self, program: u32) {
        self.calls.push(Call::UseProgram(program));
    }

    fn delete_program(&mut self, program: u32) {
        self.calls.push(Call::DeleteProgram(program));
        self.reflections.remove(&program);
        self.programs.release(program);
    }

    fn get_shader_iv(&mut self, shader: u32, pname: u32) -> i32 {
        self.calls.push(Call::GetShaderIv { shader, pname });
        match pname {
            gl::COMPILE_STATUS => {
                if self.failed_shaders.contains_key(&shader) {
                    gl::FALSE as i32
                } else {
                    gl::TRUE as i32
                }
            }
            gl::INFO_LOG_LENGTH => self
                .failed_shaders
                .get(&shader)
                .map_or(0, |log| log.len() as i32),
            _ => 0,
        }
    }

    fn get_program_iv(&mut self, program: u32, pname: u32) -> i32 {
        self.calls.push(Call::GetProgramIv { program, pname });
        match pname {
            gl::ACTIVE_UNIFORMS => self
                .reflections
                .get(&program)
                .map_or(0, |r| r.uniforms.len() as i32),
            gl::ACTIVE_ATTRIBUTES => self
                .reflections
                .get(&program)
                .map_or(0, |r| r.attributes.len() as i32),
            gl::LINK_STATUS => gl::TRUE as i32,
            gl::INFO_LOG_LENGTH => self
                .program_logs
                .get(&program)
                .map_or(0, |log| log.len() as i32),
            _ => 0,
        }
    }

    fn get_shader_info_log(&mut self, shader: u32) -> String {
        self.calls.push(Call::GetShaderInfoLog(shader));
        self.failed_shaders.get(&shader).cloned().unwrap_or_default()
    }

    fn get_program_info_log(&mut self, program: u32) -> String {
        self.calls.push(Call::GetProgramInfoLog(program));
        self.program_logs.get(&program).cloned().unwrap_or_default()
    }

    fn get_active_uniform(&mut self, program: u32, index: u32) -> (String, u32) {
        self.calls.push(Call::GetActiveUniform { program, index });
        self.reflections
            .get(&program)
            .and_then(|r| r.uniforms.get(index as usize))
            .map_or_else(|| (String::new(), 0), |var| (var.name.clone(), var.type_token))
    }

    fn get_active_attrib(&mut self, program: u32, index: u32) -> (String, u32) {
        self.calls.push(Call::GetActiveAttrib { program, index });
        self.reflections
            .get(&program)
            .and_then(|r| r.attributes.get(index as usize))
            .map_or_else(|| (String::new(), 0), |var| (var.name.clone(), var.type_token))
    }

    fn get_uniform_location(&mut self, program: u32, name: &str) -> i32 {
        self.calls.push(Call::GetUniformLocation(program));
        self.reflections
            .get(&program)
            .map_or(-1, |r| Self::find_location(&r.uniforms, name))
    }

    fn get_attrib_location(&mut self, program: u32, name: &str) -> i32 {
        self.calls.push(Call::GetAttribLocation(program));
        self.reflections
            .get(&program)
            .map_or(-1, |r| Self::find_location(&r.attributes, name))
    }

    fn uniform1i(&mut self, location: u32, value: i32) {
        self.calls.push(Call::Uniform1i { location, value });
    }

    fn uniform1f(&mut self, location: u32, _x: f32) {
        self.calls.push(Call::Uniform1f { location });
    }

    fn uniform2f(&mut self, location: u32, _x: f32, _y: f32) {
        self.calls.push(Call::Uniform2f { location });
    }

    fn uniform3f(&mut self, location: u32, _x: f32, _y: f32, _z: f32) {
        self.calls.push(Call::Uniform3f { location });
    }

    fn uniform4f(&mut self, location: u32, _x: f32, _y: f32, _z: f32, _w: f32) {
        self.calls.push(Call::Uniform4f { location });
    }

    fn uniform_matrix4fv(&mut self, location: u32, count: u32, transpose: bool, _values: &[f32]) {
        self.calls.push(Call::UniformMatrix4fv {
            location,
            count,
            transpose,
        });
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        self.calls.push(Call::EnableVertexAttribArray(index));
    }

    fn disable_vertex_attrib_array(&mut self, index: u32) {
        self.calls.push(Call::DisableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer(&mut self, index: u32, size: u32, byte_stride: u32, byte_offset: u32) {
        self.calls.push(Call::VertexAttribPointer {
            index,
            size,
            byte_stride,
            byte_offset,
        });
    }

    fn gen_framebuffer(&mut self) -> u32 {
        self.calls.push(Call::GenFramebuffer);
        self.framebuffers.alloc()
    }

    fn bind_framebuffer(&mut self, framebuffer: u32) {
        self.calls.push(Call::BindFramebuffer(framebuffer));
    }

    fn framebuffer_texture_2d(&mut self, attachment: u32, texture: u32) {
        self.calls.push(Call::FramebufferTexture2d {
            attachment,
            texture,
        });
    }

    fn gen_renderbuffer(&mut self) -> u32 {
        self.calls.push(Call::GenRenderbuffer);
        self.renderbuffers.alloc()
    }

    fn bind_renderbuffer(&mut self, renderbuffer: u32) {
        self.calls.push(Call::BindRenderbuffer(renderbuffer));
    }

    fn renderbuffer_storage(&mut self, format: u32, width: u32, height: u32) {
        self.calls.push(Call::RenderbufferStorage {
            format,
            width,
            height,
        });
    }

    fn framebuffer_renderbuffer(&mut self, attachment: u32, renderbuffer: u32) {
        self.calls.push(Call::FramebufferRenderbuffer {
            attachment,
            renderbuffer,
        });
    }

    fn check_framebuffer_status(&mut self) -> u32 {
        self.calls.push(Call::CheckFramebufferStatus);
        gl::FRAMEBUFFER_COMPLETE
    }

    fn delete_framebuffer(&mut self, framebuffer: u32) {
        self.calls.push(Call::DeleteFramebuffer(framebuffer));
        self.framebuffers.release(framebuffer);
    }

    fn delete_renderbuffer(&mut self, renderbuffer: u32) {
        self.calls.push(Call::DeleteRenderbuffer(renderbuffer));
        self.renderbuffers.release(renderbuffer);
    }

    fn enable(&mut self, capability: u32) {
        self.calls.push(Call::Enable(capability));
    }

    fn disable(&mut self, capability: u32) {
        self.calls.push(Call::Disable(capability));
    }

    fn cull_face(&mut self, mode: u32) {
        self.calls.push(Call::CullFace(mode));
    }

    fn front_face(&mut self, mode: u32) {
        self.calls.push(Call::FrontFace(mode));
    }

    fn blend_func(&mut self, source: u32, destination: u32) {
        self.calls.push(Call::BlendFunc {
            source,
            destination,
        });
    }

    fn depth_mask(&mut self, flag: bool) {
        self.calls.push(Call::DepthMask(flag));
    }

    fn depth_func(&mut self, func: u32) {
        self.calls.push(Call::DepthFunc(func));
    }

    fn viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.calls.push(Call::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.calls.push(Call::ClearColor {
            red,
            green,
            blue,
            alpha,
        });
    }

    fn clear_depth(&mut self, depth: f32) {
        self.calls.push(Call::ClearDepth(depth));
    }

    fn clear_stencil(&mut self, stencil: u32) {
        self.calls.push(Call::ClearStencil(stencil));
    }

    fn clear(&mut self, mask: u32) {
        self.calls.push(Call::Clear(mask));
    }

    fn draw_elements(&mut self, mode: u32, count: u32, index_type: u32) {
        self.calls.push(Call::DrawElements {
            mode,
            count,
            index_type,
        });
    }

    fn read_pixels(&mut self, x: u32, y: u32, width: u32, height: u32, dest: &mut [u8]) {
        self.calls.push(Call::ReadPixels {
            x,
            y,
            width,
            height,
        });
        dest.fill(0);
    }

    fn get_error(&mut self) -> u32 {
        self.calls.push(Call::GetError);
        self.pending_errors.pop_front().unwrap_or(gl::NO_ERROR)
    }

    fn get_viewport(&mut self) -> [i32; 4] {
        self.calls.push(Call::GetViewport);
        self.initial_viewport
    }

    fn get_string(&mut self, name: u32) -> String {
        self.calls.push(Call::GetString(name));
        match name {
            gl::VENDOR => "ember".to_owned(),
            gl::RENDERER => "recording".to_owned(),
            gl::VERSION => "0.1".to_owned(),
            _ => String::new(),
        }
    }
}
