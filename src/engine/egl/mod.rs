//! ### English
//! EGL seam and the per-session display/context/surface binding.
//!
//! ### 中文
//! EGL 接缝，以及每个会话的 display/context/surface 绑定。

mod binding;
mod config;
mod khronos;

use std::ffi::c_void;

use super::surface::NativeHandle;

pub use binding::EglBinding;
pub use config::{CONFIG_ATTRIBUTES, CONTEXT_ATTRIBUTES, select_config};
pub use khronos::KhronosEgl;

macro_rules! egl_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        pub struct $name(usize);

        impl $name {
            pub const fn from_raw(raw: usize) -> Self {
                Self(raw)
            }

            pub const fn as_raw(self) -> usize {
                self.0
            }

            pub(crate) fn from_ptr(ptr: *mut c_void) -> Self {
                Self(ptr as usize)
            }

            pub(crate) fn as_ptr(self) -> *mut c_void {
                self.0 as *mut c_void
            }
        }
    };
}

egl_handle!(
    /// ### English
    /// `EGLDisplay`.
    ///
    /// ### 中文
    /// `EGLDisplay`。
    EglDisplay
);
egl_handle!(EglConfig);
egl_handle!(EglContext);
egl_handle!(EglSurface);

/// ### English
/// The EGL 1.4 entry points a render session needs.
///
/// Failures carry a human-readable reason (usually the EGL error name).
///
/// ### 中文
/// 渲染会话所需的 EGL 1.4 入口。
///
/// 失败时携带可读原因（通常是 EGL 错误名）。
pub trait EglApi {
    fn get_display(&self, native_display: NativeHandle) -> Option<EglDisplay>;
    /// ### English
    /// Returns `(major, minor)`.
    ///
    /// ### 中文
    /// 返回 `(major, minor)`。
    fn initialize(&self, display: EglDisplay) -> Result<(i32, i32), String>;
    fn bind_gles_api(&self) -> Result<(), String>;
    /// ### English
    /// All configs matching `attribs` (`EGL_NONE`-terminated), in EGL's preference order.
    ///
    /// ### 中文
    /// 匹配 `attribs`（以 `EGL_NONE` 结尾）的全部 config，按 EGL 偏好顺序排列。
    fn choose_configs(&self, display: EglDisplay, attribs: &[i32]) -> Result<Vec<EglConfig>, String>;
    fn config_buffer_size(&self, display: EglDisplay, config: EglConfig) -> Result<i32, String>;
    fn create_context(
        &self,
        display: EglDisplay,
        config: EglConfig,
        attribs: &[i32],
    ) -> Result<EglContext, String>;
    fn create_window_surface(
        &self,
        display: EglDisplay,
        config: EglConfig,
        window: NativeHandle,
    ) -> Result<EglSurface, String>;
    /// ### English
    /// `None` unbinds (`EGL_NO_SURFACE`/`EGL_NO_CONTEXT`).
    ///
    /// ### 中文
    /// `None` 表示解绑（`EGL_NO_SURFACE`/`EGL_NO_CONTEXT`）。
    fn make_current(
        &self,
        display: EglDisplay,
        target: Option<(EglSurface, EglContext)>,
    ) -> Result<(), String>;
    fn swap_buffers(&self, display: EglDisplay, surface: EglSurface) -> Result<(), String>;
    fn destroy_surface(&self, display: EglDisplay, surface: EglSurface) -> Result<(), String>;
    fn destroy_context(&self, display: EglDisplay, context: EglContext) -> Result<(), String>;
    fn terminate(&self, display: EglDisplay) -> Result<(), String>;
    fn proc_address(&self, name: &str) -> *const c_void;
}
