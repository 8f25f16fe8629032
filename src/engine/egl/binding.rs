//! ### English
//! Owned EGL display/context/surface triple, current on the thread that established it.
//!
//! ### 中文
//! 持有的 EGL display/context/surface 三元组，在建立它的线程上保持 current。

use super::config::{CONTEXT_ATTRIBUTES, select_config};
use super::{EglApi, EglContext, EglDisplay, EglSurface};
use crate::engine::error::RenderError;
use crate::engine::surface::NativeHandle;

/// ### English
/// EGL objects acquired for one render session.
///
/// Released exactly once: explicitly through [`EglBinding::release`], or on drop. A binding that
/// fails halfway through [`EglBinding::establish`] releases whatever it had acquired so far.
///
/// ### 中文
/// 为一个渲染会话获取的 EGL 对象。
///
/// 只释放一次：显式调用 [`EglBinding::release`]，或在 drop 时释放。
/// 在 [`EglBinding::establish`] 中途失败的绑定会释放已获取的全部对象。
pub struct EglBinding {
    api: Box<dyn EglApi>,
    display: EglDisplay,
    context: Option<EglContext>,
    surface: Option<EglSurface>,
    initialized: bool,
    current: bool,
}

impl EglBinding {
    /// ### English
    /// Runs the full setup sequence and makes the new context current on the calling thread.
    ///
    /// #### Parameters
    /// - `api`: EGL entry points.
    /// - `native_display`: Host display handle (null selects `EGL_DEFAULT_DISPLAY`).
    /// - `native_window`: Host window the surface renders into.
    /// - `required_buffer_size`: Exact `EGL_BUFFER_SIZE` the config must report.
    ///
    /// ### 中文
    /// 执行完整的建立流程，并让新上下文在调用线程上 current。
    ///
    /// #### 参数
    /// - `api`：EGL 入口。
    /// - `native_display`：宿主 display 句柄（为空表示 `EGL_DEFAULT_DISPLAY`）。
    /// - `native_window`：surface 要渲染到的宿主 window。
    /// - `required_buffer_size`：config 必须报告的 `EGL_BUFFER_SIZE`。
    pub fn establish(
        api: Box<dyn EglApi>,
        native_display: NativeHandle,
        native_window: NativeHandle,
        required_buffer_size: i32,
    ) -> Result<Self, RenderError> {
        let display = api
            .get_display(native_display)
            .ok_or_else(|| RenderError::Context {
                call: "eglGetDisplay",
                reason: "EGL_NO_DISPLAY".to_string(),
            })?;

        let mut binding = Self {
            api,
            display,
            context: None,
            surface: None,
            initialized: false,
            current: false,
        };

        let (major, minor) = binding
            .api
            .initialize(display)
            .map_err(RenderError::context("eglInitialize"))?;
        binding.initialized = true;
        tracing::debug!(major, minor, "EGL initialized");

        binding
            .api
            .bind_gles_api()
            .map_err(RenderError::context("eglBindAPI"))?;

        let config = select_config(binding.api.as_ref(), display, required_buffer_size)?;

        let context = binding
            .api
            .create_context(display, config, &CONTEXT_ATTRIBUTES)
            .map_err(RenderError::context("eglCreateContext"))?;
        binding.context = Some(context);

        let surface = binding
            .api
            .create_window_surface(display, config, native_window)
            .map_err(RenderError::context("eglCreateWindowSurface"))?;
        binding.surface = Some(surface);

        binding
            .api
            .make_current(display, Some((surface, context)))
            .map_err(RenderError::context("eglMakeCurrent"))?;
        binding.current = true;

        Ok(binding)
    }

    pub fn api(&self) -> &dyn EglApi {
        self.api.as_ref()
    }

    /// ### English
    /// Presents the back buffer.
    ///
    /// ### 中文
    /// 呈现后缓冲。
    pub fn swap_buffers(&self) -> Result<(), RenderError> {
        let surface = self.surface.ok_or(RenderError::InvalidSurface)?;
        self.api
            .swap_buffers(self.display, surface)
            .map_err(RenderError::context("eglSwapBuffers"))
    }

    /// ### English
    /// Unbinds the context, destroys surface and context, and terminates the display (idempotent).
    ///
    /// GL objects created through this context must already be deleted.
    ///
    /// ### 中文
    /// 解绑上下文、销毁 surface 与 context，并 terminate display（幂等）。
    ///
    /// 通过该上下文创建的 GL 对象必须已被删除。
    pub fn release(&mut self) {
        if self.current {
            self.current = false;
            if let Err(reason) = self.api.make_current(self.display, None) {
                tracing::warn!(%reason, "eglMakeCurrent(EGL_NO_CONTEXT) failed");
            }
        }

        if let Some(surface) = self.surface.take() {
            if let Err(reason) = self.api.destroy_surface(self.display, surface) {
                tracing::warn!(%reason, "eglDestroySurface failed");
            }
        }

        if let Some(context) = self.context.take() {
            if let Err(reason) = self.api.destroy_context(self.display, context) {
                tracing::warn!(%reason, "eglDestroyContext failed");
            }
        }

        if self.initialized {
            self.initialized = false;
            if let Err(reason) = self.api.terminate(self.display) {
                tracing::warn!(%reason, "eglTerminate failed");
            }
        }
    }
}

impl Drop for EglBinding {
    fn drop(&mut self) {
        self.release();
    }
}
