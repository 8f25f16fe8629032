//! ### English
//! Single-entry mailbox carrying the newest frame from producers to the render thread.
//!
//! ### 中文
//! 单条目信箱：把最新帧从生产者交给渲染线程。

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::YuvFrame;

/// ### English
/// Latest-frame slot. Frames move in whole under the lock, so a reader never sees a torn frame.
/// A frame published before the previous one was taken replaces it.
///
/// ### 中文
/// 最新帧槽位。帧在锁内整体移动，读者不会看到撕裂的帧。
/// 若上一帧尚未被取走就发布新帧，则新帧替换旧帧。
#[derive(Debug, Default)]
pub struct FrameSlot {
    latest: Mutex<Option<YuvFrame>>,
    replaced: AtomicU64,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// ### English
    /// Stores `frame`; returns `true` if an untaken frame was overwritten.
    ///
    /// ### 中文
    /// 存入 `frame`；若覆盖了尚未取走的帧则返回 `true`。
    pub fn publish(&self, frame: YuvFrame) -> bool {
        let replaced = self.latest.lock().replace(frame).is_some();
        if replaced {
            self.replaced.fetch_add(1, Ordering::Relaxed);
        }
        replaced
    }

    pub fn take(&self) -> Option<YuvFrame> {
        self.latest.lock().take()
    }

    /// ### English
    /// Frames overwritten before the render thread took them.
    ///
    /// ### 中文
    /// 在渲染线程取走之前被覆盖的帧数。
    pub fn replaced(&self) -> u64 {
        self.replaced.load(Ordering::Relaxed)
    }
}
