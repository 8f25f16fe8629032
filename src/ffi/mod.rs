//! ### English
//! C ABI surface for `egl_yuv_renderer`.
//!
//! All exported symbols are `extern "C"` functions; structs are `#[repr(C)]`.
//! Strings passed from the host must be NUL-terminated UTF-8 (C string); they are validated as
//! UTF-8 and truncated at the first NUL byte.
//!
//! Fallible calls return [`EGL_YUV_RENDERER_STATUS_OK`] or [`EGL_YUV_RENDERER_STATUS_FAILURE`]; the
//! failure reason can then be read with `egl_yuv_renderer_last_error_kind` / `_message`.
//!
//! ### 中文
//! `egl_yuv_renderer` 的 C ABI 接口层。
//!
//! 所有导出符号均为 `extern "C"` 函数；结构体使用 `#[repr(C)]`。
//! 宿主传入的字符串必须是以 NUL 结尾的 UTF-8（C 字符串）；Rust 会校验 UTF-8，
//! 且在遇到第一个 NUL 字节处截断。
//!
//! 可失败的调用返回 [`EGL_YUV_RENDERER_STATUS_OK`] 或 [`EGL_YUV_RENDERER_STATUS_FAILURE`]；
//! 失败原因可通过 `egl_yuv_renderer_last_error_kind` / `_message` 读取。
mod abi;
mod frame;
mod render;
mod surface;

use std::ffi::{CStr, CString, c_char};

use parking_lot::Mutex;

use crate::engine::{RenderController, RenderError};

pub use surface::EglYuvSurfaceCallbacks;

/// ### English
/// Call succeeded.
///
/// ### 中文
/// 调用成功。
pub const EGL_YUV_RENDERER_STATUS_OK: i32 = 0;

/// ### English
/// Call failed; see the renderer's last error.
///
/// ### 中文
/// 调用失败；详见渲染器的 last error。
pub const EGL_YUV_RENDERER_STATUS_FAILURE: i32 = 1;

/// ### English
/// C ABI version for `egl_yuv_renderer`.
///
/// ### 中文
/// `egl_yuv_renderer` 的 C ABI 版本号。
const EGL_YUV_RENDERER_ABI_VERSION: u32 = 1;

#[repr(C)]
/// ### English
/// Opaque renderer handle owning at most one render session.
///
/// Every entry point locks the controller, so the handle may be used from any host thread.
///
/// ### 中文
/// 不透明渲染器句柄，最多持有一个渲染会话。
///
/// 每个入口都会锁住控制器，因此宿主可在任意线程使用该句柄。
pub struct EglYuvRenderer {
    controller: Mutex<RenderController>,
    /// ### English
    /// Blocking-stop flag of the session started last.
    ///
    /// ### 中文
    /// 最近一次启动的会话的阻塞停止标志。
    blocking_stop: Mutex<bool>,
    last_error: Mutex<Option<LastError>>,
}

/// ### English
/// Last failure reported through the C ABI. `message` stays valid until the next failing call.
///
/// ### 中文
/// 通过 C ABI 报告的最近一次失败。`message` 在下一次失败调用之前保持有效。
struct LastError {
    kind: &'static CStr,
    message: CString,
}

impl EglYuvRenderer {
    fn new(controller: RenderController) -> Self {
        Self {
            controller: Mutex::new(controller),
            blocking_stop: Mutex::new(false),
            last_error: Mutex::new(None),
        }
    }

    /// ### English
    /// Maps `result` to a status code, remembering the error on failure.
    ///
    /// ### 中文
    /// 将 `result` 映射为状态码，失败时记录错误。
    fn status(&self, result: Result<(), RenderError>) -> i32 {
        match result {
            Ok(()) => EGL_YUV_RENDERER_STATUS_OK,
            Err(err) => {
                tracing::debug!(error = %err, kind = err.kind(), "C ABI call failed");
                let message = CString::new(err.to_string())
                    .unwrap_or_else(|_| CString::from(c"render error"));
                *self.last_error.lock() = Some(LastError {
                    kind: err.kind_cstr(),
                    message,
                });
                EGL_YUV_RENDERER_STATUS_FAILURE
            }
        }
    }
}

/// ### English
/// Converts a NUL-terminated UTF-8 C string into `&str`.
///
/// Returns `None` for NULL pointers or invalid UTF-8.
///
/// # Safety
/// `ptr` must be valid and point to a NUL-terminated string for the lifetime `'a`.
///
/// ### 中文
/// 将 NUL 结尾的 UTF-8 C 字符串转换为 `&str`。
///
/// 对 NULL 指针或 UTF-8 非法返回 `None`。
///
/// # Safety
/// `ptr` 在生命周期 `'a` 内必须有效，并指向以 NUL 结尾的字符串。
unsafe fn cstr_to_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// ### English
/// Borrows `len` bytes at `ptr`; NULL is accepted only for an empty slice.
///
/// # Safety
/// A non-NULL `ptr` must be valid for reads of `len` bytes for the lifetime `'a`.
///
/// ### 中文
/// 借用 `ptr` 处的 `len` 个字节；仅当切片为空时允许 NULL。
///
/// # Safety
/// 非 NULL 的 `ptr` 在生命周期 `'a` 内必须可读 `len` 字节。
unsafe fn bytes<'a>(ptr: *const u8, len: usize) -> Option<&'a [u8]> {
    if ptr.is_null() {
        let empty: &[u8] = &[];
        return (len == 0).then_some(empty);
    }
    Some(unsafe { std::slice::from_raw_parts(ptr, len) })
}
