//! ### English
//! C ABI bindings for renderer lifecycle and session control (create/start/stop/redraw).
//!
//! ### 中文
//! 渲染器生命周期与会话控制相关的 C ABI 绑定（create/start/stop/redraw）。

use std::ffi::c_char;
use std::sync::Arc;
use std::time::Duration;

use dpi::PhysicalSize;

use super::surface::{EglYuvSurfaceCallbacks, HostSurfaces};
use super::{EGL_YUV_RENDERER_STATUS_FAILURE, EglYuvRenderer};
use crate::engine::{RenderController, RenderError, SessionState, StartFlags};

/// ### English
/// Upper bound for the blocking start/stop modes.
///
/// ### 中文
/// 阻塞启动/停止模式的等待上限。
const BLOCKING_TIMEOUT: Duration = Duration::from_secs(5);

#[unsafe(no_mangle)]
/// ### English
/// Creates a renderer that loads the system `libEGL` and asks the host for surfaces through
/// `callbacks` (copied; the table itself need not outlive this call).
///
/// Returns NULL if `callbacks` is NULL or lacks `native_window`.
///
/// ### 中文
/// 创建渲染器：加载系统 `libEGL`，并通过 `callbacks` 向宿主获取 surface
///（回调表会被复制，调用结束后无需保留）。
///
/// `callbacks` 为 NULL 或缺少 `native_window` 时返回 NULL。
pub unsafe extern "C" fn egl_yuv_renderer_create(
    callbacks: *const EglYuvSurfaceCallbacks,
) -> *mut EglYuvRenderer {
    if callbacks.is_null() {
        return std::ptr::null_mut();
    }

    let Some(surfaces) = HostSurfaces::new(unsafe { *callbacks }) else {
        return std::ptr::null_mut();
    };

    let controller = RenderController::native(Arc::new(surfaces));
    Box::into_raw(Box::new(EglYuvRenderer::new(controller)))
}

#[unsafe(no_mangle)]
/// ### English
/// Destroys a renderer created by `egl_yuv_renderer_create`.
///
/// Any running session is stopped and its render thread joined before this returns.
///
/// ### 中文
/// 销毁由 `egl_yuv_renderer_create` 创建的渲染器。
///
/// 返回前会停止正在运行的会话并 join 其渲染线程。
pub unsafe extern "C" fn egl_yuv_renderer_destroy(renderer: *mut EglYuvRenderer) {
    if renderer.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(renderer));
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Starts rendering into the host surface `(page_token, surface_id)`.
///
/// Without `EGL_YUV_RENDERER_FLAG_BLOCKING_START` this returns as soon as the render thread exists;
/// EGL failures then only show up in `egl_yuv_renderer_state` (terminated).
///
/// #### Parameters
/// - `page_token`: NUL-terminated UTF-8 page token.
/// - `surface_id`: Host surface id (`0` fails with `invalid_surface`).
/// - `width`/`height`: Surface size in pixels.
/// - `content_width`/`content_height`: YUV frame size (YUV mode only; both must be non-zero).
/// - `tick_ms`: Loop interval in milliseconds; `0` selects 500 ms.
/// - `flags`: `EGL_YUV_RENDERER_FLAG_*` bits.
///
/// ### 中文
/// 开始渲染到宿主 surface `(page_token, surface_id)`。
///
/// 未指定 `EGL_YUV_RENDERER_FLAG_BLOCKING_START` 时，渲染线程创建后即返回；
/// 此后 EGL 失败只会体现在 `egl_yuv_renderer_state`（terminated）中。
///
/// #### 参数
/// - `page_token`：NUL 结尾的 UTF-8 页面 token。
/// - `surface_id`：宿主 surface id（为 `0` 时以 `invalid_surface` 失败）。
/// - `width`/`height`：surface 尺寸（像素）。
/// - `content_width`/`content_height`：YUV 帧尺寸（仅 YUV 模式；两者都必须非零）。
/// - `tick_ms`：循环间隔（毫秒）；为 `0` 时使用 500 ms。
/// - `flags`：`EGL_YUV_RENDERER_FLAG_*` 位。
pub unsafe extern "C" fn egl_yuv_renderer_start(
    renderer: *mut EglYuvRenderer,
    page_token: *const c_char,
    surface_id: u32,
    width: u32,
    height: u32,
    content_width: u32,
    content_height: u32,
    tick_ms: u32,
    flags: u32,
) -> i32 {
    if renderer.is_null() {
        return EGL_YUV_RENDERER_STATUS_FAILURE;
    }
    let renderer = unsafe { &*renderer };

    let Some(page_token) = (unsafe { super::cstr_to_str(page_token) }) else {
        return renderer.status(Err(RenderError::InvalidSurface));
    };

    let flags = StartFlags::from_bits(flags);
    let content = PhysicalSize::new(content_width, content_height);
    let config = flags.render_config(content, tick_ms);

    let mut controller = renderer.controller.lock();
    let result = controller
        .start(page_token, surface_id, PhysicalSize::new(width, height), config)
        .and_then(|()| {
            *renderer.blocking_stop.lock() = flags.blocking_stop;
            if flags.blocking_start {
                controller.wait_running(BLOCKING_TIMEOUT)
            } else {
                Ok(())
            }
        });
    renderer.status(result)
}

#[unsafe(no_mangle)]
/// ### English
/// Stops the active session.
///
/// Returns immediately unless the session was started with `EGL_YUV_RENDERER_FLAG_BLOCKING_STOP`.
/// Fails with `invalid_surface` when nothing is running, including after a failed initialization.
///
/// ### 中文
/// 停止活动会话。
///
/// 除非会话以 `EGL_YUV_RENDERER_FLAG_BLOCKING_STOP` 启动，否则立即返回。
/// 没有运行中的会话（包括初始化失败之后）时以 `invalid_surface` 失败。
pub unsafe extern "C" fn egl_yuv_renderer_stop(renderer: *mut EglYuvRenderer) -> i32 {
    if renderer.is_null() {
        return EGL_YUV_RENDERER_STATUS_FAILURE;
    }
    let renderer = unsafe { &*renderer };

    let mut controller = renderer.controller.lock();
    let result = if *renderer.blocking_stop.lock() {
        controller.stop_and_wait(BLOCKING_TIMEOUT)
    } else {
        controller.stop()
    };
    renderer.status(result)
}

#[unsafe(no_mangle)]
/// ### English
/// Waits up to `timeout_ms` for every stopped session to finish teardown.
///
/// ### 中文
/// 最多等待 `timeout_ms`，直至所有已停止的会话完成清理。
pub unsafe extern "C" fn egl_yuv_renderer_wait_stopped(
    renderer: *mut EglYuvRenderer,
    timeout_ms: u32,
) -> i32 {
    if renderer.is_null() {
        return EGL_YUV_RENDERER_STATUS_FAILURE;
    }
    let renderer = unsafe { &*renderer };

    let timeout = Duration::from_millis(u64::from(timeout_ms));
    let result = renderer.controller.lock().wait_stopped(timeout);
    renderer.status(result)
}

#[unsafe(no_mangle)]
/// ### English
/// Draws once on the render thread: the shape at pixel `(x, y)`, or the current YUV frame.
///
/// ### 中文
/// 在渲染线程上绘制一次：在像素 `(x, y)` 处绘制形状，或绘制当前 YUV 帧。
pub unsafe extern "C" fn egl_yuv_renderer_redraw(renderer: *mut EglYuvRenderer, x: i32, y: i32) -> i32 {
    if renderer.is_null() {
        return EGL_YUV_RENDERER_STATUS_FAILURE;
    }
    let renderer = unsafe { &*renderer };

    let result = renderer.controller.lock().redraw(x, y);
    renderer.status(result)
}

#[unsafe(no_mangle)]
/// ### English
/// Reports a new surface size (in pixels).
///
/// ### 中文
/// 通知新的 surface 尺寸（单位：像素）。
pub unsafe extern "C" fn egl_yuv_renderer_resize(
    renderer: *mut EglYuvRenderer,
    width: u32,
    height: u32,
) -> i32 {
    if renderer.is_null() {
        return EGL_YUV_RENDERER_STATUS_FAILURE;
    }
    let renderer = unsafe { &*renderer };

    let result = renderer
        .controller
        .lock()
        .resize(PhysicalSize::new(width, height));
    renderer.status(result)
}

#[unsafe(no_mangle)]
/// ### English
/// Returns the session state: 0 uninitialized, 1 initializing, 2 running, 3 stopping,
/// 4 terminated.
///
/// ### 中文
/// 返回会话状态：0 uninitialized，1 initializing，2 running，3 stopping，4 terminated。
pub unsafe extern "C" fn egl_yuv_renderer_state(renderer: *const EglYuvRenderer) -> u32 {
    if renderer.is_null() {
        return SessionState::Uninitialized as u32;
    }
    let renderer = unsafe { &*renderer };
    renderer.controller.lock().state() as u32
}

#[cfg(test)]
pub(super) mod tests {
    use std::ffi::CStr;

    use super::*;
    use crate::engine::flags::{
        EGL_YUV_RENDERER_FLAG_BLOCKING_START, EGL_YUV_RENDERER_FLAG_BLOCKING_STOP,
    };
    use crate::engine::testing::{EglStep, FakeDriver, FakeSurfaces, init_tracing};
    use crate::ffi::EGL_YUV_RENDERER_STATUS_OK;
    use crate::ffi::abi::{egl_yuv_renderer_last_error_kind, egl_yuv_renderer_last_error_message};

    pub(in crate::ffi) const BLOCKING: u32 =
        EGL_YUV_RENDERER_FLAG_BLOCKING_START | EGL_YUV_RENDERER_FLAG_BLOCKING_STOP;

    pub(in crate::ffi) fn fake_renderer() -> (*mut EglYuvRenderer, FakeDriver) {
        init_tracing();
        let driver = FakeDriver::default();
        let controller = RenderController::new(
            Arc::new(driver.clone()),
            Arc::new(FakeSurfaces::default()),
        );
        (Box::into_raw(Box::new(EglYuvRenderer::new(controller))), driver)
    }

    pub(in crate::ffi) fn last_kind(renderer: *mut EglYuvRenderer) -> Option<&'static str> {
        let ptr = unsafe { egl_yuv_renderer_last_error_kind(renderer) };
        (!ptr.is_null()).then(|| unsafe { CStr::from_ptr(ptr) }.to_str().unwrap())
    }

    #[test]
    fn blocking_start_and_stop_round_trip() {
        let (renderer, driver) = fake_renderer();

        let status = unsafe {
            egl_yuv_renderer_start(renderer, c"page".as_ptr(), 7, 1280, 720, 0, 0, 0, BLOCKING)
        };
        assert_eq!(status, EGL_YUV_RENDERER_STATUS_OK);
        assert_eq!(unsafe { egl_yuv_renderer_state(renderer) }, 2);
        assert_eq!(unsafe { egl_yuv_renderer_redraw(renderer, 10, 10) }, 0);
        assert_eq!(unsafe { egl_yuv_renderer_resize(renderer, 640, 480) }, 0);

        assert_eq!(unsafe { egl_yuv_renderer_stop(renderer) }, EGL_YUV_RENDERER_STATUS_OK);
        assert_eq!(unsafe { egl_yuv_renderer_state(renderer) }, 4);
        assert!(driver.egl.ledger.lock().balanced());
        assert_eq!(last_kind(renderer), None);

        assert_eq!(
            unsafe { egl_yuv_renderer_stop(renderer) },
            EGL_YUV_RENDERER_STATUS_FAILURE
        );
        assert_eq!(last_kind(renderer), Some("invalid_surface"));
        unsafe { egl_yuv_renderer_destroy(renderer) };
    }

    #[test]
    fn zero_surface_fails_with_message() {
        let (renderer, driver) = fake_renderer();

        let status =
            unsafe { egl_yuv_renderer_start(renderer, c"page".as_ptr(), 0, 10, 10, 0, 0, 0, 0) };
        assert_eq!(status, EGL_YUV_RENDERER_STATUS_FAILURE);
        assert_eq!(last_kind(renderer), Some("invalid_surface"));
        let message = unsafe { CStr::from_ptr(egl_yuv_renderer_last_error_message(renderer)) };
        assert!(!message.to_bytes().is_empty());
        assert_eq!(unsafe { egl_yuv_renderer_state(renderer) }, 0);
        assert_eq!(driver.egl.ledger.lock().initialized, 0);

        let status =
            unsafe { egl_yuv_renderer_start(renderer, std::ptr::null(), 3, 10, 10, 0, 0, 0, 0) };
        assert_eq!(status, EGL_YUV_RENDERER_STATUS_FAILURE);
        unsafe { egl_yuv_renderer_destroy(renderer) };
    }

    #[test]
    fn blocking_start_reports_egl_failure() {
        let (renderer, driver) = fake_renderer();
        driver.egl.ledger.lock().fail_at = Some(EglStep::Initialize);

        let status = unsafe {
            egl_yuv_renderer_start(renderer, c"page".as_ptr(), 7, 64, 64, 0, 0, 0, BLOCKING)
        };
        assert_eq!(status, EGL_YUV_RENDERER_STATUS_FAILURE);
        assert_eq!(last_kind(renderer), Some("context"));

        assert_eq!(unsafe { egl_yuv_renderer_wait_stopped(renderer, 5_000) }, 0);
        unsafe { egl_yuv_renderer_destroy(renderer) };
        assert!(driver.egl.ledger.lock().balanced());
    }

    #[test]
    fn null_handles_are_rejected() {
        let null = std::ptr::null_mut();
        assert!(unsafe { egl_yuv_renderer_create(std::ptr::null()) }.is_null());
        assert_eq!(unsafe { egl_yuv_renderer_stop(null) }, EGL_YUV_RENDERER_STATUS_FAILURE);
        assert_eq!(unsafe { egl_yuv_renderer_state(null) }, 0);
        assert!(unsafe { egl_yuv_renderer_last_error_kind(null) }.is_null());
        unsafe { egl_yuv_renderer_destroy(null) };

        let callbacks = EglYuvSurfaceCallbacks {
            user_data: std::ptr::null_mut(),
            native_window: None,
            native_display: None,
            buffers_swapped: None,
        };
        assert!(unsafe { egl_yuv_renderer_create(&callbacks) }.is_null());
    }
}
