//! ### English
//! Coalesced redraw/resize requests shared between the controller and the render thread.
//!
//! ### 中文
//! 控制器与渲染线程之间共享的合并（coalesced）redraw/resize 请求。

use dpi::PhysicalSize;
use parking_lot::Mutex;

/// ### English
/// Work drained by the render thread in one wake-up.
///
/// ### 中文
/// 渲染线程一次唤醒中取出的待处理工作。
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub(crate) struct PendingWork {
    /// ### English
    /// Latest redraw position in pixels.
    ///
    /// ### 中文
    /// 最新的 redraw 像素位置。
    pub redraw: Option<(i32, i32)>,
    pub resize: Option<PhysicalSize<u32>>,
}

impl PendingWork {
    fn is_idle(&self) -> bool {
        self.redraw.is_none() && self.resize.is_none()
    }
}

/// ### English
/// Latest-wins slot for redraw/resize requests.
///
/// Every `mark_*` call returns `true` iff it moved the slot from idle to pending, meaning the
/// render thread must be woken; later calls only overwrite the stored values.
///
/// ### 中文
/// redraw/resize 请求的 latest-wins 槽位。
///
/// 每个 `mark_*` 调用仅在把槽位从 idle 切换为 pending 时返回 `true`（表示需要唤醒渲染线程）；
/// 之后的调用只覆盖已存储的值。
#[derive(Default)]
pub(crate) struct PendingSlot {
    work: Mutex<PendingWork>,
}

impl PendingSlot {
    pub(crate) fn mark_redraw(&self, x: i32, y: i32) -> bool {
        let mut work = self.work.lock();
        let wake = work.is_idle();
        work.redraw = Some((x, y));
        wake
    }

    pub(crate) fn mark_resize(&self, size: PhysicalSize<u32>) -> bool {
        let mut work = self.work.lock();
        let wake = work.is_idle();
        work.resize = Some(size);
        wake
    }

    /// ### English
    /// Takes all pending work, leaving the slot idle.
    ///
    /// ### 中文
    /// 取出全部待处理工作，使槽位回到 idle。
    pub(crate) fn take(&self) -> PendingWork {
        std::mem::take(&mut *self.work.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_first_mark_wakes_and_latest_wins() {
        let slot = PendingSlot::default();

        assert!(slot.mark_redraw(1, 2));
        assert!(!slot.mark_resize(PhysicalSize::new(10, 20)));
        assert!(!slot.mark_redraw(3, 4));
        assert!(!slot.mark_resize(PhysicalSize::new(30, 40)));

        assert_eq!(
            slot.take(),
            PendingWork {
                redraw: Some((3, 4)),
                resize: Some(PhysicalSize::new(30, 40)),
            }
        );
        assert_eq!(slot.take(), PendingWork::default());
        assert!(slot.mark_resize(PhysicalSize::new(1, 1)));
    }
}
