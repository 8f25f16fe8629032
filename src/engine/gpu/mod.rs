//! ### English
//! GL ES command seam used by the program builder, plane manager and renderers.
//!
//! Only the calls this renderer actually issues are exposed. The production implementation
//! forwards to `glow`; tests use a recording double.
//!
//! ### 中文
//! 程序构建器、平面管理器与渲染器所使用的 GL ES 命令接缝。
//!
//! 只暴露本渲染器实际发出的调用。生产实现转发给 `glow`；测试使用记录型替身。

mod gles;

use std::fmt;
use std::num::NonZeroU32;

pub use gles::GlowGpu;

/// ### English
/// Name of a GL shader object.
///
/// ### 中文
/// GL shader 对象名。
pub type ShaderHandle = NonZeroU32;
/// ### English
/// Name of a GL program object.
///
/// ### 中文
/// GL program 对象名。
pub type ProgramHandle = NonZeroU32;
pub type TextureHandle = NonZeroU32;
pub type BufferHandle = NonZeroU32;

/// ### English
/// `GL_NO_ERROR`.
///
/// ### 中文
/// `GL_NO_ERROR`。
pub const NO_ERROR: u32 = 0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// ### English
/// Pixel layout of one uploaded plane.
///
/// ### 中文
/// 单个上传平面的像素布局。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlaneFormat {
    /// ### English
    /// One byte per texel, sampled through the `.r` channel.
    ///
    /// ### 中文
    /// 每纹素一个字节，通过 `.r` 通道采样。
    Luminance,
    Rgba,
}

impl PlaneFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Luminance => 1,
            Self::Rgba => 4,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Primitive {
    TriangleStrip,
    TriangleFan,
}

/// ### English
/// The subset of GL ES 2.0 this renderer drives.
///
/// Implementations are only valid while their EGL context is current on the calling thread.
/// The session creates them on its render thread and never hands them to another thread.
///
/// ### 中文
/// 本渲染器驱动的 GL ES 2.0 子集。
///
/// 实现仅在其 EGL 上下文于调用线程 current 时有效。会话在渲染线程上创建它们，且从不交给其它线程。
pub trait Gpu {
    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderHandle, String>;
    fn shader_source(&self, shader: ShaderHandle, source: &str);
    fn compile_shader(&self, shader: ShaderHandle);
    fn shader_compile_status(&self, shader: ShaderHandle) -> bool;
    /// ### English
    /// Full info log; the implementation sizes it from the GPU-reported length.
    ///
    /// ### 中文
    /// 完整的 info log；实现按 GPU 报告的长度分配缓冲。
    fn shader_info_log(&self, shader: ShaderHandle) -> String;
    fn delete_shader(&self, shader: ShaderHandle);

    fn create_program(&self) -> Result<ProgramHandle, String>;
    fn attach_shader(&self, program: ProgramHandle, shader: ShaderHandle);
    fn bind_attrib_location(&self, program: ProgramHandle, index: u32, name: &str);
    fn link_program(&self, program: ProgramHandle);
    fn program_link_status(&self, program: ProgramHandle) -> bool;
    fn program_info_log(&self, program: ProgramHandle) -> String;
    fn delete_program(&self, program: ProgramHandle);
    fn use_program(&self, program: Option<ProgramHandle>);
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<u32>;

    fn create_texture(&self) -> Result<TextureHandle, String>;
    fn delete_texture(&self, texture: TextureHandle);
    /// ### English
    /// Selects texture unit `GL_TEXTURE0 + unit` and binds `texture` to its 2D target.
    ///
    /// ### 中文
    /// 选择纹理单元 `GL_TEXTURE0 + unit`，并把 `texture` 绑定到其 2D 目标。
    fn bind_texture_unit(&self, unit: u32, texture: TextureHandle);
    /// ### English
    /// Respecifies the bound 2D texture from `data` (tightly packed rows).
    ///
    /// ### 中文
    /// 以 `data`（紧密排列的行）重新指定当前绑定的 2D 纹理。
    fn tex_image_2d(&self, width: u32, height: u32, format: PlaneFormat, data: &[u8]);

    fn create_buffer(&self) -> Result<BufferHandle, String>;
    fn upload_vertices(&self, buffer: BufferHandle, data: &[f32]);
    /// ### English
    /// Points attribute `index` at `buffer`, `components` floats per vertex, and enables it.
    ///
    /// ### 中文
    /// 将属性 `index` 指向 `buffer`（每顶点 `components` 个 float）并启用它。
    fn vertex_attrib(&self, index: u32, buffer: BufferHandle, components: i32);
    fn delete_buffer(&self, buffer: BufferHandle);

    fn uniform_1i(&self, location: u32, value: i32);
    fn uniform_2f(&self, location: u32, x: f32, y: f32);
    fn uniform_3f(&self, location: u32, x: f32, y: f32, z: f32);
    fn uniform_matrix_3(&self, location: u32, column_major: &[f32; 9]);
    fn uniform_matrix_4(&self, location: u32, column_major: &[f32; 16]);

    fn viewport(&self, x: i32, y: i32, width: u32, height: u32);
    fn clear_color(&self, rgba: [f32; 4]);
    fn clear(&self);
    fn draw_arrays(&self, primitive: Primitive, first: i32, count: i32);
    fn get_error(&self) -> u32;
}
