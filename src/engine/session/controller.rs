//! ### English
//! Host-facing controller owning at most one active render session.
//!
//! ### 中文
//! 面向宿主的控制器，最多持有一个活动渲染会话。

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dpi::PhysicalSize;

use super::{RenderSession, SessionState, SessionStats};
use crate::engine::config::{RenderConfig, RenderMode};
use crate::engine::driver::{GraphicsDriver, NativeDriver};
use crate::engine::error::RenderError;
use crate::engine::frame::YuvFrame;
use crate::engine::surface::{SurfaceProvider, SurfaceTarget};

/// ### English
/// Start/stop/redraw entry point for the host.
///
/// Stopped sessions are kept as retired until their threads are joined, so `stop` never blocks.
/// Dropping the controller stops and joins everything it still owns.
///
/// ### 中文
/// 宿主的 start/stop/redraw 入口。
///
/// 已停止的会话在线程 join 之前保留为 retired，因此 `stop` 从不阻塞。
/// drop 控制器会停止并 join 其仍持有的全部会话。
pub struct RenderController {
    driver: Arc<dyn GraphicsDriver>,
    surfaces: Arc<dyn SurfaceProvider>,
    active: Option<RenderSession>,
    retired: Vec<RenderSession>,
}

impl RenderController {
    pub fn new(driver: Arc<dyn GraphicsDriver>, surfaces: Arc<dyn SurfaceProvider>) -> Self {
        Self {
            driver,
            surfaces,
            active: None,
            retired: Vec::new(),
        }
    }

    /// ### English
    /// Controller backed by the system `libEGL`.
    ///
    /// ### 中文
    /// 基于系统 `libEGL` 的控制器。
    pub fn native(surfaces: Arc<dyn SurfaceProvider>) -> Self {
        Self::new(Arc::new(NativeDriver), surfaces)
    }

    /// ### English
    /// Starts rendering into `(page_token, surface_id)`.
    ///
    /// Returns once the render thread exists; EGL setup continues on that thread (see
    /// [`RenderController::wait_running`]). A previous session that already terminated is retired.
    ///
    /// #### Parameters
    /// - `page_token`: Host page the surface belongs to.
    /// - `surface_id`: Host surface id; `0` is rejected with `InvalidSurface`.
    /// - `size`: Surface size in pixels.
    /// - `config`: Render mode and parameters; an empty YUV content size is rejected with
    ///   `EmptyContent`.
    ///
    /// ### 中文
    /// 开始渲染到 `(page_token, surface_id)`。
    ///
    /// 渲染线程创建后即返回；EGL 初始化在该线程上继续（见 [`RenderController::wait_running`]）。
    /// 已终止的旧会话会被移入 retired。
    ///
    /// #### 参数
    /// - `page_token`：surface 所属的宿主页面。
    /// - `surface_id`：宿主 surface id；为 `0` 时以 `InvalidSurface` 拒绝。
    /// - `size`：surface 尺寸（像素）。
    /// - `config`：渲染模式与参数；YUV 内容尺寸为空时以 `EmptyContent` 拒绝。
    pub fn start(
        &mut self,
        page_token: &str,
        surface_id: u32,
        size: PhysicalSize<u32>,
        config: RenderConfig,
    ) -> Result<(), RenderError> {
        let surface_id = NonZeroU32::new(surface_id).ok_or(RenderError::InvalidSurface)?;
        if let RenderMode::Yuv { content } = config.mode {
            if content.width == 0 || content.height == 0 {
                return Err(RenderError::EmptyContent(content));
            }
        }

        if let Some(active) = &self.active {
            if active.state() != SessionState::Terminated {
                return Err(RenderError::AlreadyRunning(active.surface_id()));
            }
        }
        if let Some(previous) = self.active.take() {
            self.retired.push(previous);
        }
        self.retired.retain(|session| !session.is_finished());

        let target = SurfaceTarget {
            page_token: page_token.to_string(),
            surface_id,
            size,
        };
        let session = RenderSession::spawn(
            target,
            config,
            self.driver.clone(),
            self.surfaces.clone(),
        )?;
        self.active = Some(session);
        Ok(())
    }

    /// ### English
    /// Requests the active session to stop and returns immediately.
    ///
    /// Fails with `InvalidSurface` when no session is live, including one whose initialization
    /// failed; repeated calls keep failing the same way.
    ///
    /// ### 中文
    /// 请求活动会话停止并立即返回。
    ///
    /// 没有活动会话时（包括初始化失败的会话）返回 `InvalidSurface`；重复调用结果相同。
    pub fn stop(&mut self) -> Result<(), RenderError> {
        let Some(session) = self.active.take() else {
            return Err(RenderError::InvalidSurface);
        };

        let live = session.request_stop();
        let surface_id = session.surface_id();
        self.retired.push(session);

        if live {
            tracing::info!(surface_id, "render session stop requested");
            Ok(())
        } else {
            Err(RenderError::InvalidSurface)
        }
    }

    /// ### English
    /// Joins every stopped session, waiting at most `timeout` in total.
    ///
    /// ### 中文
    /// join 所有已停止的会话，总共最多等待 `timeout`。
    pub fn wait_stopped(&mut self, timeout: Duration) -> Result<(), RenderError> {
        let deadline = Instant::now().checked_add(timeout);
        for session in &mut self.retired {
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => timeout,
            };
            session
                .join(remaining)
                .map_err(|_| RenderError::Timeout(timeout))?;
        }
        Ok(())
    }

    /// ### English
    /// [`RenderController::stop`] followed by [`RenderController::wait_stopped`].
    ///
    /// ### 中文
    /// 先 [`RenderController::stop`]，再 [`RenderController::wait_stopped`]。
    pub fn stop_and_wait(&mut self, timeout: Duration) -> Result<(), RenderError> {
        let stopped = self.stop();
        self.wait_stopped(timeout)?;
        stopped
    }

    /// ### English
    /// Blocks until the active session finished initializing; returns its setup error if any.
    ///
    /// ### 中文
    /// 阻塞直至活动会话完成初始化；若初始化失败则返回对应错误。
    pub fn wait_running(&self, timeout: Duration) -> Result<(), RenderError> {
        self.active
            .as_ref()
            .ok_or(RenderError::InvalidSurface)?
            .wait_initialized(timeout)
    }

    /// ### English
    /// Draws once at pixel `(x, y)` on the render thread, outside the tick schedule.
    ///
    /// Calls arriving faster than the thread presents are coalesced; the latest position wins.
    ///
    /// ### 中文
    /// 在渲染线程上、tick 节奏之外，于像素 `(x, y)` 处绘制一次。
    ///
    /// 调用速度快于线程呈现速度时会被合并；以最新位置为准。
    pub fn redraw(&self, x: i32, y: i32) -> Result<(), RenderError> {
        self.live()?.redraw(x, y)
    }

    /// ### English
    /// Reports a new surface size; the layout is recomputed on the render thread.
    ///
    /// ### 中文
    /// 通知新的 surface 尺寸；布局在渲染线程上重新计算。
    pub fn resize(&self, size: PhysicalSize<u32>) -> Result<(), RenderError> {
        self.live()?.resize(size)
    }

    pub fn push_frame(&self, frame: YuvFrame) -> Result<(), RenderError> {
        self.live()?.push_frame(frame)
    }

    /// ### English
    /// Validates separate Y/U/V planes against the session's content size and pushes them.
    ///
    /// ### 中文
    /// 按会话内容尺寸校验独立的 Y/U/V 平面并推送。
    pub fn push_planes(&self, y: &[u8], u: &[u8], v: &[u8]) -> Result<(), RenderError> {
        let session = self.live()?;
        let content = session.content_size().ok_or(RenderError::NotYuvSession)?;
        let frame = YuvFrame::from_planes(content, y.to_vec(), u.to_vec(), v.to_vec())?;
        session.push_frame(frame)
    }

    /// ### English
    /// Pushes a frame in the legacy packed layout (Y plane, then `(V, U)` pairs).
    ///
    /// ### 中文
    /// 推送旧版打包布局的帧（Y 平面，其后为 `(V, U)` 字节对）。
    pub fn push_legacy_frame(&self, bytes: &[u8]) -> Result<(), RenderError> {
        let session = self.live()?;
        let content = session.content_size().ok_or(RenderError::NotYuvSession)?;
        session.push_frame(YuvFrame::from_legacy_bytes(content, bytes)?)
    }

    /// ### English
    /// State of the active session, else of the most recently stopped one.
    ///
    /// ### 中文
    /// 活动会话的状态；没有活动会话时为最近停止的会话的状态。
    pub fn state(&self) -> SessionState {
        self.latest()
            .map_or(SessionState::Uninitialized, RenderSession::state)
    }

    pub fn stats(&self) -> Option<SessionStats> {
        self.latest().map(RenderSession::stats)
    }

    fn latest(&self) -> Option<&RenderSession> {
        self.active.as_ref().or(self.retired.last())
    }

    fn live(&self) -> Result<&RenderSession, RenderError> {
        self.active.as_ref().ok_or(RenderError::InvalidSurface)
    }
}
