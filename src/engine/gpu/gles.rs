//! ### English
//! `glow`-backed implementation of [`Gpu`].
//!
//! ### 中文
//! 基于 `glow` 的 [`Gpu`] 实现。

use std::ffi::c_void;
use std::marker::PhantomData;

use glow::HasContext as _;

use super::{
    BufferHandle, Gpu, PlaneFormat, Primitive, ProgramHandle, ShaderHandle, ShaderStage,
    TextureHandle,
};

/// ### English
/// GL ES function table loaded through the session's EGL instance.
///
/// `!Send`: created on the render thread after `eglMakeCurrent` and dies there.
///
/// ### 中文
/// 通过会话 EGL 实例加载的 GL ES 函数表。
///
/// `!Send`：在渲染线程 `eglMakeCurrent` 之后创建，并在该线程销毁。
pub struct GlowGpu {
    gl: glow::Context,
    _thread_bound: PhantomData<*const ()>,
}

impl GlowGpu {
    /// ### English
    /// Loads GL entry points with `loader` (usually `eglGetProcAddress`).
    ///
    /// # Safety
    /// A GL ES context must be current on the calling thread, and every pointer `loader`
    /// returns must be a valid entry point for that context (or null).
    ///
    /// ### 中文
    /// 使用 `loader`（通常为 `eglGetProcAddress`）加载 GL 入口。
    ///
    /// # Safety
    /// 调用线程上必须有 current 的 GL ES 上下文，且 `loader` 返回的每个指针都必须是该上下文的
    /// 有效入口（或为 null）。
    pub unsafe fn load(mut loader: impl FnMut(&str) -> *const c_void) -> Self {
        let gl = unsafe { glow::Context::from_loader_function(|name| loader(name)) };
        Self {
            gl,
            _thread_bound: PhantomData,
        }
    }

    /// ### English
    /// `GL_VERSION` string, for diagnostics.
    ///
    /// ### 中文
    /// `GL_VERSION` 字符串，用于诊断。
    pub fn version_string(&self) -> String {
        unsafe { self.gl.get_parameter_string(glow::VERSION) }
    }
}

fn uniform(location: u32) -> glow::UniformLocation {
    glow::NativeUniformLocation(location)
}

impl Gpu for GlowGpu {
    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderHandle, String> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe { self.gl.create_shader(kind) }.map(|shader| shader.0)
    }

    fn shader_source(&self, shader: ShaderHandle, source: &str) {
        unsafe { self.gl.shader_source(glow::NativeShader(shader), source) };
    }

    fn compile_shader(&self, shader: ShaderHandle) {
        unsafe { self.gl.compile_shader(glow::NativeShader(shader)) };
    }

    fn shader_compile_status(&self, shader: ShaderHandle) -> bool {
        unsafe { self.gl.get_shader_compile_status(glow::NativeShader(shader)) }
    }

    fn shader_info_log(&self, shader: ShaderHandle) -> String {
        unsafe { self.gl.get_shader_info_log(glow::NativeShader(shader)) }
    }

    fn delete_shader(&self, shader: ShaderHandle) {
        unsafe { self.gl.delete_shader(glow::NativeShader(shader)) };
    }

    fn create_program(&self) -> Result<ProgramHandle, String> {
        unsafe { self.gl.create_program() }.map(|program| program.0)
    }

    fn attach_shader(&self, program: ProgramHandle, shader: ShaderHandle) {
        unsafe {
            self.gl
                .attach_shader(glow::NativeProgram(program), glow::NativeShader(shader))
        };
    }

    fn bind_attrib_location(&self, program: ProgramHandle, index: u32, name: &str) {
        unsafe {
            self.gl
                .bind_attrib_location(glow::NativeProgram(program), index, name)
        };
    }

    fn link_program(&self, program: ProgramHandle) {
        unsafe { self.gl.link_program(glow::NativeProgram(program)) };
    }

    fn program_link_status(&self, program: ProgramHandle) -> bool {
        unsafe { self.gl.get_program_link_status(glow::NativeProgram(program)) }
    }

    fn program_info_log(&self, program: ProgramHandle) -> String {
        unsafe { self.gl.get_program_info_log(glow::NativeProgram(program)) }
    }

    fn delete_program(&self, program: ProgramHandle) {
        unsafe { self.gl.delete_program(glow::NativeProgram(program)) };
    }

    fn use_program(&self, program: Option<ProgramHandle>) {
        unsafe { self.gl.use_program(program.map(glow::NativeProgram)) };
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        unsafe {
            self.gl
                .get_uniform_location(glow::NativeProgram(program), name)
        }
        .map(|location| location.0)
    }

    fn create_texture(&self) -> Result<TextureHandle, String> {
        unsafe { self.gl.create_texture() }.map(|texture| texture.0)
    }

    fn delete_texture(&self, texture: TextureHandle) {
        unsafe { self.gl.delete_texture(glow::NativeTexture(texture)) };
    }

    fn bind_texture_unit(&self, unit: u32, texture: TextureHandle) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl
                .bind_texture(glow::TEXTURE_2D, Some(glow::NativeTexture(texture)));
        }
    }

    fn tex_image_2d(&self, width: u32, height: u32, format: PlaneFormat, data: &[u8]) {
        let gl_format = match format {
            PlaneFormat::Luminance => glow::LUMINANCE,
            PlaneFormat::Rgba => glow::RGBA,
        };
        unsafe {
            /*
            ### English
            Chroma planes of odd-width frames are not 4-byte aligned.

            ### 中文
            奇数宽度帧的色度平面行不是 4 字节对齐的。
            */
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                gl_format as i32,
                width as i32,
                height as i32,
                0,
                gl_format,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(data)),
            );
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
        }
    }

    fn create_buffer(&self) -> Result<BufferHandle, String> {
        unsafe { self.gl.create_buffer() }.map(|buffer| buffer.0)
    }

    fn upload_vertices(&self, buffer: BufferHandle, data: &[f32]) {
        let bytes: Vec<u8> = data.iter().flat_map(|value| value.to_ne_bytes()).collect();
        unsafe {
            self.gl
                .bind_buffer(glow::ARRAY_BUFFER, Some(glow::NativeBuffer(buffer)));
            self.gl
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, &bytes, glow::STATIC_DRAW);
        }
    }

    fn vertex_attrib(&self, index: u32, buffer: BufferHandle, components: i32) {
        unsafe {
            self.gl
                .bind_buffer(glow::ARRAY_BUFFER, Some(glow::NativeBuffer(buffer)));
            self.gl
                .vertex_attrib_pointer_f32(index, components, glow::FLOAT, false, 0, 0);
            self.gl.enable_vertex_attrib_array(index);
        }
    }

    fn delete_buffer(&self, buffer: BufferHandle) {
        unsafe { self.gl.delete_buffer(glow::NativeBuffer(buffer)) };
    }

    fn uniform_1i(&self, location: u32, value: i32) {
        unsafe { self.gl.uniform_1_i32(Some(&uniform(location)), value) };
    }

    fn uniform_2f(&self, location: u32, x: f32, y: f32) {
        unsafe { self.gl.uniform_2_f32(Some(&uniform(location)), x, y) };
    }

    fn uniform_3f(&self, location: u32, x: f32, y: f32, z: f32) {
        unsafe { self.gl.uniform_3_f32(Some(&uniform(location)), x, y, z) };
    }

    fn uniform_matrix_3(&self, location: u32, column_major: &[f32; 9]) {
        unsafe {
            self.gl
                .uniform_matrix_3_f32_slice(Some(&uniform(location)), false, column_major)
        };
    }

    fn uniform_matrix_4(&self, location: u32, column_major: &[f32; 16]) {
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(Some(&uniform(location)), false, column_major)
        };
    }

    fn viewport(&self, x: i32, y: i32, width: u32, height: u32) {
        unsafe { self.gl.viewport(x, y, width as i32, height as i32) };
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        unsafe { self.gl.clear_color(rgba[0], rgba[1], rgba[2], rgba[3]) };
    }

    fn clear(&self) {
        unsafe { self.gl.clear(glow::COLOR_BUFFER_BIT) };
    }

    fn draw_arrays(&self, primitive: Primitive, first: i32, count: i32) {
        let mode = match primitive {
            Primitive::TriangleStrip => glow::TRIANGLE_STRIP,
            Primitive::TriangleFan => glow::TRIANGLE_FAN,
        };
        unsafe { self.gl.draw_arrays(mode, first, count) };
    }

    fn get_error(&self) -> u32 {
        unsafe { self.gl.get_error() }
    }
}
