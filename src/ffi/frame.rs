//! ### English
//! C ABI bindings for YUV frame ingestion.
//!
//! ### 中文
//! YUV 帧输入相关的 C ABI 绑定。

use super::{EGL_YUV_RENDERER_STATUS_FAILURE, EglYuvRenderer};
use crate::engine::RenderError;

#[unsafe(no_mangle)]
/// ### English
/// Pushes one YUV 4:2:0 frame as three separate planes; the bytes are copied.
///
/// The frame must match the content size given at start: `Y` holds `w*h` bytes, `U`/`V` hold
/// `(w/2)*(h/2)` bytes each. It is drawn on the next tick or redraw; an undrawn earlier
/// frame is replaced.
///
/// ### 中文
/// 以三个独立平面推送一帧 YUV 4:2:0；字节会被复制。
///
/// 帧必须与启动时给定的内容尺寸一致：`Y` 为 `w*h` 字节，`U`/`V` 各为 `(w/2)*(h/2)` 字节。
/// 该帧在下一次 tick 或 redraw 时绘制；尚未绘制的旧帧会被替换。
pub unsafe extern "C" fn egl_yuv_renderer_push_frame(
    renderer: *mut EglYuvRenderer,
    y: *const u8,
    y_len: usize,
    u: *const u8,
    u_len: usize,
    v: *const u8,
    v_len: usize,
) -> i32 {
    if renderer.is_null() {
        return EGL_YUV_RENDERER_STATUS_FAILURE;
    }
    let renderer = unsafe { &*renderer };

    let planes = unsafe { (super::bytes(y, y_len), super::bytes(u, u_len), super::bytes(v, v_len)) };
    let result = match planes {
        (Some(y), Some(u), Some(v)) => renderer.controller.lock().push_planes(y, u, v),
        _ => {
            let expected = [(y, y_len), (u, u_len), (v, v_len)]
                .into_iter()
                .find(|(ptr, _)| ptr.is_null())
                .map_or(0, |(_, len)| len);
            Err(RenderError::FrameSize {
                what: "plane",
                expected,
                actual: 0,
            })
        }
    };
    renderer.status(result)
}

#[unsafe(no_mangle)]
/// ### English
/// Pushes one frame in the legacy packed layout: `w*h` Y bytes followed by
/// `(w/2)*(h/2)` interleaved `(V, U)` byte pairs.
///
/// ### 中文
/// 以旧版打包布局推送一帧：`w*h` 个 Y 字节，其后为 `(w/2)*(h/2)` 个交错的
/// `(V, U)` 字节对。
pub unsafe extern "C" fn egl_yuv_renderer_push_legacy_frame(
    renderer: *mut EglYuvRenderer,
    data: *const u8,
    len: usize,
) -> i32 {
    if renderer.is_null() {
        return EGL_YUV_RENDERER_STATUS_FAILURE;
    }
    let renderer = unsafe { &*renderer };

    let result = match unsafe { super::bytes(data, len) } {
        Some(data) => renderer.controller.lock().push_legacy_frame(data),
        None => Err(RenderError::FrameSize {
            what: "legacy frame",
            expected: len,
            actual: 0,
        }),
    };
    renderer.status(result)
}
