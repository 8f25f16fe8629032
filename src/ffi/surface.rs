//! ### English
//! Host surface provider expressed as a C callback table.
//!
//! ### 中文
//! 以 C 回调表形式表达的宿主 surface provider。

use std::ffi::{CString, c_char, c_void};

use crate::engine::{NativeHandle, SurfaceProvider};

/// ### English
/// Returns the native window (or display) for `(page_token, surface_id)`, or NULL if unknown.
///
/// ### 中文
/// 返回 `(page_token, surface_id)` 对应的原生 window（或 display）；未知时返回 NULL。
pub type NativeHandleFn = unsafe extern "C" fn(
    user_data: *mut c_void,
    page_token: *const c_char,
    surface_id: u32,
) -> *mut c_void;

pub type BuffersSwappedFn =
    unsafe extern "C" fn(user_data: *mut c_void, page_token: *const c_char, surface_id: u32);

#[repr(C)]
#[derive(Copy, Clone)]
/// ### English
/// Host-provided surface callbacks.
///
/// All callbacks run on the render thread; they and `user_data` must be usable from any thread
/// until the renderer is destroyed. `page_token` is only valid for the duration of a call.
///
/// ### 中文
/// 宿主提供的 surface 回调表。
///
/// 所有回调都在渲染线程上执行；在渲染器销毁之前，回调与 `user_data` 必须可在任意线程使用。
/// `page_token` 仅在单次调用期间有效。
pub struct EglYuvSurfaceCallbacks {
    pub user_data: *mut c_void,
    /// ### English
    /// Required.
    ///
    /// ### 中文
    /// 必填。
    pub native_window: Option<NativeHandleFn>,
    /// ### English
    /// Optional; NULL (or a NULL result) selects `EGL_DEFAULT_DISPLAY`.
    ///
    /// ### 中文
    /// 可选；为 NULL（或返回 NULL）时使用 `EGL_DEFAULT_DISPLAY`。
    pub native_display: Option<NativeHandleFn>,
    pub buffers_swapped: Option<BuffersSwappedFn>,
}

/// ### English
/// [`SurfaceProvider`] backed by [`EglYuvSurfaceCallbacks`].
///
/// ### 中文
/// 基于 [`EglYuvSurfaceCallbacks`] 的 [`SurfaceProvider`]。
pub(super) struct HostSurfaces {
    callbacks: EglYuvSurfaceCallbacks,
}

// SAFETY: the host guarantees the callback table is thread-safe (see `EglYuvSurfaceCallbacks`).
unsafe impl Send for HostSurfaces {}
unsafe impl Sync for HostSurfaces {}

impl HostSurfaces {
    /// ### English
    /// Returns `None` when the required `native_window` callback is missing.
    ///
    /// ### 中文
    /// 缺少必填的 `native_window` 回调时返回 `None`。
    pub(super) fn new(callbacks: EglYuvSurfaceCallbacks) -> Option<Self> {
        callbacks.native_window?;
        Some(Self { callbacks })
    }

    fn call(&self, callback: Option<NativeHandleFn>, page_token: &str, surface_id: u32) -> NativeHandle {
        let (Some(callback), Ok(token)) = (callback, CString::new(page_token)) else {
            return NativeHandle::null();
        };
        let ptr = unsafe { callback(self.callbacks.user_data, token.as_ptr(), surface_id) };
        NativeHandle::from_ptr(ptr)
    }
}

impl SurfaceProvider for HostSurfaces {
    fn native_window(&self, page_token: &str, surface_id: u32) -> Option<NativeHandle> {
        let window = self.call(self.callbacks.native_window, page_token, surface_id);
        (!window.is_null()).then_some(window)
    }

    fn native_display(&self, page_token: &str, surface_id: u32) -> NativeHandle {
        self.call(self.callbacks.native_display, page_token, surface_id)
    }

    fn buffers_swapped(&self, page_token: &str, surface_id: u32) {
        let (Some(callback), Ok(token)) = (self.callbacks.buffers_swapped, CString::new(page_token))
        else {
            return;
        };
        unsafe { callback(self.callbacks.user_data, token.as_ptr(), surface_id) };
    }
}
