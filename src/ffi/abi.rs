use std::ffi::c_char;

use super::EglYuvRenderer;

#[unsafe(no_mangle)]
/// ### English
/// Returns the C ABI version.
///
/// ### 中文
/// 返回 C ABI 版本号。
pub extern "C" fn egl_yuv_renderer_abi_version() -> u32 {
    super::EGL_YUV_RENDERER_ABI_VERSION
}

#[unsafe(no_mangle)]
/// ### English
/// Returns the stable kind string of the last failure (e.g. `"invalid_surface"`), or NULL if no
/// call has failed yet. The string is static.
///
/// ### 中文
/// 返回最近一次失败的稳定种类字符串（例如 `"invalid_surface"`）；尚无失败时返回 NULL。
/// 该字符串为静态字符串。
pub unsafe extern "C" fn egl_yuv_renderer_last_error_kind(
    renderer: *const EglYuvRenderer,
) -> *const c_char {
    if renderer.is_null() {
        return std::ptr::null();
    }

    let last_error = unsafe { &(*renderer).last_error }.lock();
    last_error
        .as_ref()
        .map_or(std::ptr::null(), |err| err.kind.as_ptr())
}

#[unsafe(no_mangle)]
/// ### English
/// Returns the human-readable message of the last failure, or NULL if no call has failed yet.
///
/// The pointer stays valid until the next failing call on the same renderer or its destruction.
///
/// ### 中文
/// 返回最近一次失败的可读信息；尚无失败时返回 NULL。
///
/// 该指针在同一渲染器的下一次失败调用或销毁之前保持有效。
pub unsafe extern "C" fn egl_yuv_renderer_last_error_message(
    renderer: *const EglYuvRenderer,
) -> *const c_char {
    if renderer.is_null() {
        return std::ptr::null();
    }

    let last_error = unsafe { &(*renderer).last_error }.lock();
    last_error
        .as_ref()
        .map_or(std::ptr::null(), |err| err.message.as_ptr())
}
