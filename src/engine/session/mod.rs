//! ### English
//! Render sessions: one dedicated render thread per session, driven by a controller.
//!
//! ### 中文
//! 渲染会话：每个会话一个独立渲染线程，由控制器驱动。

mod controller;
mod pending;
mod render_thread;
mod state;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel as channel;
use dpi::PhysicalSize;

pub use controller::RenderController;
pub use state::{SessionState, SessionStats};

use self::render_thread::{ThreadContext, run_render_thread};
use self::state::SessionShared;
use super::config::{RenderConfig, RenderMode};
use super::driver::GraphicsDriver;
use super::error::RenderError;
use super::frame::YuvFrame;
use super::surface::{SurfaceProvider, SurfaceTarget};

/// ### English
/// Handle to one render thread and the state it shares with the caller.
///
/// Dropping the handle stops the thread and joins it.
///
/// ### 中文
/// 指向一个渲染线程及其共享状态的句柄。
///
/// drop 该句柄会停止并 join 线程。
pub struct RenderSession {
    target: SurfaceTarget,
    mode: RenderMode,
    shared: Arc<SessionShared>,
    /// ### English
    /// Capacity-one wake channel; a full channel already guarantees a wake-up.
    ///
    /// ### 中文
    /// 容量为一的唤醒通道；通道已满即意味着唤醒已在途。
    wake: channel::Sender<()>,
    init: channel::Receiver<Result<(), RenderError>>,
    /// ### English
    /// Disconnects when the render thread exits (the thread holds the only sender).
    ///
    /// ### 中文
    /// 渲染线程退出时断开（线程持有唯一的发送端）。
    exited: channel::Receiver<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl RenderSession {
    /// ### English
    /// Spawns the render thread and returns without waiting for EGL initialization.
    ///
    /// #### Parameters
    /// - `target`: Host surface to render into.
    /// - `config`: Mode, tick and drawing parameters.
    /// - `driver`: EGL/GL loader used on the render thread.
    /// - `surfaces`: Host surface provider.
    ///
    /// ### 中文
    /// 创建渲染线程后立即返回，不等待 EGL 初始化。
    ///
    /// #### 参数
    /// - `target`：要渲染到的宿主 surface。
    /// - `config`：模式、tick 与绘制参数。
    /// - `driver`：渲染线程使用的 EGL/GL 加载器。
    /// - `surfaces`：宿主 surface provider。
    pub(crate) fn spawn(
        target: SurfaceTarget,
        config: RenderConfig,
        driver: Arc<dyn GraphicsDriver>,
        surfaces: Arc<dyn SurfaceProvider>,
    ) -> Result<Self, RenderError> {
        let shared = Arc::new(SessionShared::new());
        let (wake_tx, wake_rx) = channel::bounded(1);
        let (init_tx, init_rx) = channel::bounded(1);
        let (exit_tx, exit_rx) = channel::bounded::<()>(0);

        let mode = config.mode;
        let ctx = ThreadContext {
            target: target.clone(),
            config,
            driver,
            surfaces,
            shared: shared.clone(),
            wake: wake_rx,
            _exit: exit_tx,
        };

        shared.begin_start();
        let thread = thread::Builder::new()
            .name(format!("egl-render-{}", target.surface_id))
            .spawn(move || run_render_thread(ctx, init_tx))
            .map_err(|err| {
                let err = RenderError::Allocation(format!("failed to spawn render thread: {err}"));
                shared.mark_terminated(Some(err.clone()));
                err
            })?;

        tracing::info!(
            surface_id = target.surface_id.get(),
            page_token = %target.page_token,
            size = ?target.size,
            "render session started"
        );

        Ok(Self {
            target,
            mode,
            shared,
            wake: wake_tx,
            init: init_rx,
            exited: exit_rx,
            thread: Some(thread),
        })
    }

    pub fn surface_id(&self) -> u32 {
        self.target.surface_id.get()
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    pub fn stats(&self) -> SessionStats {
        self.shared.stats(self.surface_id())
    }

    /// ### English
    /// Content size of a YUV session, `None` in shape mode.
    ///
    /// ### 中文
    /// YUV 会话的内容尺寸；形状模式下为 `None`。
    pub fn content_size(&self) -> Option<PhysicalSize<u32>> {
        match self.mode {
            RenderMode::Yuv { content } => Some(content),
            RenderMode::Shape => None,
        }
    }

    /// ### English
    /// Flips the running flag and wakes the thread. Returns `false` if the session was not live.
    ///
    /// ### 中文
    /// 翻转运行标志并唤醒线程。会话不处于活动状态时返回 `false`。
    pub(crate) fn request_stop(&self) -> bool {
        let live = self.shared.begin_stop();
        self.wake();
        live
    }

    fn wake(&self) {
        let _ = self.wake.try_send(());
    }

    /// ### English
    /// Blocks until initialization finished, returning its outcome.
    ///
    /// ### 中文
    /// 阻塞直至初始化完成，并返回其结果。
    pub(crate) fn wait_initialized(&self, timeout: Duration) -> Result<(), RenderError> {
        match self.init.recv_timeout(timeout) {
            Ok(result) => result,
            Err(channel::RecvTimeoutError::Timeout) => Err(RenderError::Timeout(timeout)),
            Err(channel::RecvTimeoutError::Disconnected) => match self.shared.failure() {
                Some(err) => Err(err),
                None => Ok(()),
            },
        }
    }

    /// ### English
    /// Waits up to `timeout` for the thread to exit, then joins it (idempotent).
    ///
    /// ### 中文
    /// 最多等待 `timeout` 让线程退出，然后 join（幂等）。
    pub(crate) fn join(&mut self, timeout: Duration) -> Result<(), RenderError> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };

        match self.exited.recv_timeout(timeout) {
            Err(channel::RecvTimeoutError::Timeout) => {
                self.thread = Some(thread);
                Err(RenderError::Timeout(timeout))
            }
            Ok(()) | Err(channel::RecvTimeoutError::Disconnected) => {
                if thread.join().is_err() {
                    tracing::error!(surface_id = self.surface_id(), "render thread panicked");
                }
                Ok(())
            }
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(|thread| thread.is_finished())
    }

    /// ### English
    /// Records a redraw at `(x, y)`. Bursts coalesce into one draw at the latest position.
    ///
    /// ### 中文
    /// 记录一次位于 `(x, y)` 的 redraw。突发的多次请求合并为一次、位于最新位置的绘制。
    pub(crate) fn redraw(&self, x: i32, y: i32) -> Result<(), RenderError> {
        self.ensure_live()?;
        if self.shared.pending.mark_redraw(x, y) {
            self.wake();
        }
        Ok(())
    }

    /// ### English
    /// Records a new surface size; only the latest one is applied.
    ///
    /// ### 中文
    /// 记录新的 surface 尺寸；只应用最新的一次。
    pub(crate) fn resize(&self, size: PhysicalSize<u32>) -> Result<(), RenderError> {
        self.ensure_live()?;
        if self.shared.pending.mark_resize(size) {
            self.wake();
        }
        Ok(())
    }

    fn ensure_live(&self) -> Result<(), RenderError> {
        match self.state() {
            SessionState::Initializing | SessionState::Running => Ok(()),
            _ => Err(RenderError::InvalidSurface),
        }
    }

    /// ### English
    /// Hands `frame` to the render thread; it is drawn on the next tick or redraw.
    ///
    /// ### 中文
    /// 将 `frame` 交给渲染线程；在下一次 tick 或 redraw 时绘制。
    pub(crate) fn push_frame(&self, frame: YuvFrame) -> Result<(), RenderError> {
        let content = self.content_size().ok_or(RenderError::NotYuvSession)?;
        if frame.size() != content {
            return Err(RenderError::FrameDimensions {
                expected: content,
                actual: frame.size(),
            });
        }

        if self.shared.frames.publish(frame) {
            tracing::trace!(surface_id = self.surface_id(), "untaken frame replaced");
        }
        Ok(())
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.request_stop();
            if thread.join().is_err() {
                tracing::error!(surface_id = self.surface_id(), "render thread panicked");
            }
        }
    }
}
