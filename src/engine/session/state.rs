//! ### English
//! Session state shared between the controller and the render thread.
//!
//! ### 中文
//! 控制器与渲染线程之间共享的会话状态。

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicU64, Ordering};

use parking_lot::Mutex;

use super::pending::PendingSlot;
use crate::engine::error::RenderError;
use crate::engine::frame::FrameSlot;

/// ### English
/// Lifecycle of one render session.
///
/// ### 中文
/// 单个渲染会话的生命周期。
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized = 0,
    /// ### English
    /// Thread spawned; EGL and the GPU program are being set up.
    ///
    /// ### 中文
    /// 线程已创建；正在建立 EGL 与 GPU 程序。
    Initializing = 1,
    Running = 2,
    /// ### English
    /// Stop requested; the loop exits at the next wake-up and tears down.
    ///
    /// ### 中文
    /// 已请求停止；循环在下次唤醒时退出并清理资源。
    Stopping = 3,
    Terminated = 4,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Initializing,
            2 => Self::Running,
            3 => Self::Stopping,
            4 => Self::Terminated,
            _ => Self::Uninitialized,
        }
    }

    /// ### English
    /// Stable lowercase name (crosses the C ABI).
    ///
    /// ### 中文
    /// 稳定的小写名称（跨越 C ABI）。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Terminated => "terminated",
        }
    }
}

/// ### English
/// Point-in-time view of a session, readable from any thread.
///
/// ### 中文
/// 会话的某一时刻快照，可在任意线程读取。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub surface_id: u32,
    pub state: SessionState,
    /// ### English
    /// Linked program name, `0` until initialization succeeds.
    ///
    /// ### 中文
    /// 已链接的 program 名；初始化成功前为 `0`。
    pub program: u32,
    pub frames_rendered: u64,
    pub frames_skipped: u64,
    pub frames_replaced: u64,
    pub failure: Option<RenderError>,
}

pub(crate) struct SessionShared {
    state: AtomicU8,
    running: AtomicBool,
    program: AtomicU32,
    frames_rendered: AtomicU64,
    frames_skipped: AtomicU64,
    failure: Mutex<Option<RenderError>>,
    pub(crate) frames: FrameSlot,
    pub(crate) pending: PendingSlot,
}

impl SessionShared {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(SessionState::Uninitialized as u8),
            running: AtomicBool::new(false),
            program: AtomicU32::new(0),
            frames_rendered: AtomicU64::new(0),
            frames_skipped: AtomicU64::new(0),
            failure: Mutex::new(None),
            frames: FrameSlot::new(),
            pending: PendingSlot::default(),
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// ### English
    /// `Uninitialized -> Initializing`; raises the running flag.
    ///
    /// ### 中文
    /// `Uninitialized -> Initializing`；置起运行标志。
    pub(crate) fn begin_start(&self) {
        self.running.store(true, Ordering::Release);
        self.state
            .store(SessionState::Initializing as u8, Ordering::Release);
    }

    /// ### English
    /// `Initializing -> Running`. Fails if a stop arrived during initialization.
    ///
    /// ### 中文
    /// `Initializing -> Running`。若初始化期间收到停止请求则失败。
    pub(crate) fn mark_running(&self, program: u32) -> bool {
        self.program.store(program, Ordering::Release);
        self.transition(SessionState::Initializing, SessionState::Running)
    }

    /// ### English
    /// Clears the running flag and moves `Initializing`/`Running` to `Stopping`.
    /// Returns `false` if the session was not live.
    ///
    /// ### 中文
    /// 清除运行标志，并将 `Initializing`/`Running` 切换为 `Stopping`。
    /// 会话不处于活动状态时返回 `false`。
    pub(crate) fn begin_stop(&self) -> bool {
        self.running.store(false, Ordering::Release);
        self.transition(SessionState::Running, SessionState::Stopping)
            || self.transition(SessionState::Initializing, SessionState::Stopping)
    }

    pub(crate) fn mark_terminated(&self, failure: Option<RenderError>) {
        self.running.store(false, Ordering::Release);
        if failure.is_some() {
            *self.failure.lock() = failure;
        }
        self.state
            .store(SessionState::Terminated as u8, Ordering::Release);
    }

    pub(crate) fn record_rendered(&self) {
        self.frames_rendered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skipped(&self) {
        self.frames_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn failure(&self) -> Option<RenderError> {
        self.failure.lock().clone()
    }

    pub(crate) fn stats(&self, surface_id: u32) -> SessionStats {
        SessionStats {
            surface_id,
            state: self.state(),
            program: self.program.load(Ordering::Acquire),
            frames_rendered: self.frames_rendered.load(Ordering::Relaxed),
            frames_skipped: self.frames_skipped.load(Ordering::Relaxed),
            frames_replaced: self.frames.replaced(),
            failure: self.failure(),
        }
    }

    fn transition(&self, from: SessionState, to: SessionState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_during_initialization_blocks_running() {
        let shared = SessionShared::new();
        assert_eq!(shared.state(), SessionState::Uninitialized);

        shared.begin_start();
        assert!(shared.is_running());
        assert!(shared.begin_stop());
        assert!(!shared.mark_running(3));
        assert_eq!(shared.state(), SessionState::Stopping);
        assert!(!shared.is_running());
    }

    #[test]
    fn stop_after_termination_is_rejected() {
        let shared = SessionShared::new();
        shared.begin_start();
        assert!(shared.mark_running(3));
        shared.mark_terminated(Some(RenderError::Link { log: "x".into() }));

        assert!(!shared.begin_stop());
        let stats = shared.stats(7);
        assert_eq!(stats.state, SessionState::Terminated);
        assert_eq!(stats.program, 3);
        assert_eq!(stats.failure.map(|e| e.kind()), Some("link"));
    }
}
