//! ### English
//! Host surface provider: hands out native window/display handles for a `(page_token, surface_id)`
//! pair and is told when a frame has been presented.
//!
//! ### 中文
//! 宿主 surface provider：按 `(page_token, surface_id)` 提供原生 window/display 句柄，
//! 并在帧呈现后收到通知。

use std::ffi::c_void;
use std::num::NonZeroU32;

use dpi::PhysicalSize;

/// ### English
/// Opaque native pointer carried as an integer so it can cross into the render thread.
///
/// ### 中文
/// 以整数形式携带的不透明原生指针，以便传入渲染线程。
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NativeHandle(usize);

impl NativeHandle {
    pub const fn null() -> Self {
        Self(0)
    }

    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub fn from_ptr(ptr: *mut c_void) -> Self {
        Self(ptr as usize)
    }

    pub const fn as_raw(self) -> usize {
        self.0
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0 as *mut c_void
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// ### English
/// Host-side surface/window management, treated as an opaque handle provider.
///
/// Called from the render thread; implementations must be thread-safe.
///
/// ### 中文
/// 宿主侧的 surface/window 管理，视为不透明句柄提供者。
///
/// 由渲染线程调用；实现必须线程安全。
pub trait SurfaceProvider: Send + Sync {
    /// ### English
    /// Native window for the surface, or `None` if the host does not know the id.
    ///
    /// ### 中文
    /// 该 surface 的原生 window；宿主不认识该 id 时返回 `None`。
    fn native_window(&self, page_token: &str, surface_id: u32) -> Option<NativeHandle>;

    /// ### English
    /// Native display for the surface. A null handle selects `EGL_DEFAULT_DISPLAY`.
    ///
    /// ### 中文
    /// 该 surface 的原生 display。空句柄表示使用 `EGL_DEFAULT_DISPLAY`。
    fn native_display(&self, page_token: &str, surface_id: u32) -> NativeHandle;

    /// ### English
    /// Called after every successful `eglSwapBuffers`.
    ///
    /// ### 中文
    /// 每次 `eglSwapBuffers` 成功后调用。
    fn buffers_swapped(&self, page_token: &str, surface_id: u32) {
        let _ = (page_token, surface_id);
    }
}

/// ### English
/// What a start request targets.
///
/// ### 中文
/// 启动请求的目标。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceTarget {
    pub page_token: String,
    pub surface_id: NonZeroU32,
    pub size: PhysicalSize<u32>,
}
