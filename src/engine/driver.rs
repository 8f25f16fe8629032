//! ### English
//! Platform entry: loads EGL and the GL function table for a render thread.
//!
//! ### 中文
//! 平台入口：为渲染线程加载 EGL 与 GL 函数表。

use super::egl::{EglApi, KhronosEgl};
use super::error::RenderError;
use super::gpu::{GlowGpu, Gpu};

/// ### English
/// Produces the EGL and GL implementations a session uses.
///
/// Shared with the render thread, so it must be `Send + Sync`; the objects it returns are
/// created on (and stay on) that thread.
///
/// ### 中文
/// 提供会话使用的 EGL 与 GL 实现。
///
/// 会与渲染线程共享，因此须为 `Send + Sync`；其返回的对象在该线程上创建并留在该线程。
pub trait GraphicsDriver: Send + Sync {
    fn load_egl(&self) -> Result<Box<dyn EglApi>, RenderError>;

    /// ### English
    /// Loads GL entry points. Called only after a context is current on this thread.
    ///
    /// ### 中文
    /// 加载 GL 入口。仅在上下文于本线程 current 之后调用。
    fn load_gpu(&self, egl: &dyn EglApi) -> Box<dyn Gpu>;
}

/// ### English
/// `libEGL` + `glow` driver used in production.
///
/// ### 中文
/// 生产环境使用的 `libEGL` + `glow` driver。
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeDriver;

impl GraphicsDriver for NativeDriver {
    fn load_egl(&self) -> Result<Box<dyn EglApi>, RenderError> {
        Ok(Box::new(KhronosEgl::load()?))
    }

    fn load_gpu(&self, egl: &dyn EglApi) -> Box<dyn Gpu> {
        let gpu = unsafe { GlowGpu::load(|name| egl.proc_address(name)) };
        tracing::debug!(version = %gpu.version_string(), "GL ES loaded");
        Box::new(gpu)
    }
}
