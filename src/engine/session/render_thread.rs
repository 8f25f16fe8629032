//! ### English
//! Render thread body: EGL/GPU setup, the tick loop, and teardown.
//!
//! ### 中文
//! 渲染线程主体：EGL/GPU 初始化、tick 循环与资源清理。

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel as channel;
use dpi::PhysicalSize;

use super::pending::PendingWork;
use super::state::SessionShared;
use crate::engine::config::RenderConfig;
use crate::engine::driver::GraphicsDriver;
use crate::engine::egl::EglBinding;
use crate::engine::error::RenderError;
use crate::engine::gpu::Gpu;
use crate::engine::render::Scene;
use crate::engine::surface::{SurfaceProvider, SurfaceTarget};

pub(super) struct ThreadContext {
    pub target: SurfaceTarget,
    pub config: RenderConfig,
    pub driver: Arc<dyn GraphicsDriver>,
    pub surfaces: Arc<dyn SurfaceProvider>,
    pub shared: Arc<SessionShared>,
    /// ### English
    /// Wake-ups for stop requests and coalesced redraw/resize work.
    ///
    /// ### 中文
    /// 停止请求与合并后 redraw/resize 工作的唤醒信号。
    pub wake: channel::Receiver<()>,
    /// ### English
    /// Never sent on; dropping it when the thread ends disconnects the session's exit receiver.
    ///
    /// ### 中文
    /// 从不发送；线程结束时 drop，使会话的 exit 接收端断开。
    pub _exit: channel::Sender<()>,
}

/// ### English
/// GL-side resources of a running session, all bound to the current thread.
///
/// Field order is teardown order: scene objects go before the GL table, the GL table before the
/// EGL context.
///
/// ### 中文
/// 运行中会话的 GL 侧资源，全部绑定到当前线程。
///
/// 字段顺序即清理顺序：场景对象先于 GL 函数表，GL 函数表先于 EGL 上下文。
struct GpuStage {
    scene: Option<Scene>,
    gpu: Box<dyn Gpu>,
    binding: EglBinding,
}

impl GpuStage {
    fn init(ctx: &ThreadContext) -> Result<Self, RenderError> {
        let page_token = ctx.target.page_token.as_str();
        let surface_id = ctx.target.surface_id.get();

        let window = ctx
            .surfaces
            .native_window(page_token, surface_id)
            .ok_or_else(|| RenderError::Context {
                call: "native_window",
                reason: format!("host has no window for surface {surface_id}"),
            })?;
        let display = ctx.surfaces.native_display(page_token, surface_id);

        let egl = ctx.driver.load_egl()?;
        let binding = EglBinding::establish(egl, display, window, ctx.config.buffer_size)?;
        let gpu = ctx.driver.load_gpu(binding.api());
        let scene = Scene::build(gpu.as_ref(), &ctx.config, ctx.target.size)?;

        Ok(Self {
            scene: Some(scene),
            gpu,
            binding,
        })
    }

    fn program(&self) -> u32 {
        self.scene.as_ref().map_or(0, |scene| scene.program_handle().get())
    }

    /// ### English
    /// Draws with `draw`, then swaps and notifies the host. A failed frame is counted and skipped.
    ///
    /// ### 中文
    /// 用 `draw` 绘制，然后交换缓冲并通知宿主。失败的帧会被计数并跳过。
    fn present(
        &mut self,
        ctx: &ThreadContext,
        draw: impl FnOnce(&mut Scene, &dyn Gpu) -> Result<(), RenderError>,
    ) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };

        let result = draw(scene, self.gpu.as_ref()).and_then(|()| self.binding.swap_buffers());
        match result {
            Ok(()) => {
                ctx.surfaces
                    .buffers_swapped(&ctx.target.page_token, ctx.target.surface_id.get());
                ctx.shared.record_rendered();
            }
            Err(err) => {
                tracing::warn!(error = %err, kind = err.kind(), "frame skipped");
                ctx.shared.record_skipped();
            }
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if let Some(scene) = self.scene.as_mut() {
            scene.resize(self.gpu.as_ref(), size);
        }
    }

    /// ### English
    /// Applies drained work: the latest size first, then one redraw at the latest position.
    ///
    /// ### 中文
    /// 应用取出的工作：先应用最新尺寸，再在最新位置 redraw 一次。
    fn apply(&mut self, ctx: &ThreadContext, work: PendingWork) {
        if let Some(size) = work.resize {
            self.resize(size);
        }
        if let Some((x, y)) = work.redraw {
            let frames = &ctx.shared.frames;
            self.present(ctx, |scene, gpu| scene.redraw(gpu, frames, x, y));
        }
    }

    fn advance(&mut self) {
        if let Some(scene) = self.scene.as_mut() {
            scene.advance();
        }
    }

    fn teardown(&mut self) {
        if let Some(scene) = self.scene.take() {
            scene.delete(self.gpu.as_ref());
        }
        self.binding.release();
    }
}

impl Drop for GpuStage {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// ### English
/// Marks the session terminated when the render thread unwinds, so callers never see a dead
/// thread as `Running`.
///
/// ### 中文
/// 渲染线程 panic 展开时将会话标记为终止，调用方不会把已退出的线程视为 `Running`。
struct UnwindGuard<'a> {
    shared: &'a SessionShared,
}

impl Drop for UnwindGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            tracing::error!("render thread panicked");
            self.shared.mark_terminated(Some(RenderError::ThreadPanicked));
        }
    }
}

/// ### English
/// Render thread entry. Returns once the session is `Terminated`.
///
/// `init` receives exactly one initialization outcome and is dropped right after. A stop that
/// arrived during initialization is reported as `InvalidSurface`.
///
/// ### 中文
/// 渲染线程入口。会话进入 `Terminated` 后返回。
///
/// `init` 只接收一次初始化结果，随后立即 drop。初始化期间到达的停止请求报告为 `InvalidSurface`。
pub(super) fn run_render_thread(
    ctx: ThreadContext,
    init: channel::Sender<Result<(), RenderError>>,
) {
    let span = tracing::info_span!(
        "render_thread",
        surface_id = ctx.target.surface_id.get(),
        page_token = %ctx.target.page_token,
    );
    let _entered = span.enter();
    let _unwind = UnwindGuard {
        shared: &ctx.shared,
    };

    let mut stage = match GpuStage::init(&ctx) {
        Ok(stage) => stage,
        Err(err) => {
            tracing::error!(error = %err, kind = err.kind(), "render session failed to initialize");
            ctx.shared.mark_terminated(Some(err.clone()));
            let _ = init.send(Err(err));
            return;
        }
    };

    let program = stage.program();
    let outcome = if ctx.shared.mark_running(program) {
        tracing::info!(program, size = ?ctx.target.size, "render session running");
        Ok(())
    } else {
        tracing::info!("render session stopped during initialization");
        Err(RenderError::InvalidSurface)
    };
    let _ = init.send(outcome);
    drop(init);

    run_loop(&ctx, &mut stage);

    ctx.shared.begin_stop();
    stage.teardown();
    drop(stage);
    ctx.shared.mark_terminated(None);
    tracing::info!("render session terminated");
}

fn run_loop(ctx: &ThreadContext, stage: &mut GpuStage) {
    let tick = ctx.config.tick;
    let mut next_tick = Instant::now().checked_add(tick);

    while ctx.shared.is_running() {
        let woken = match next_tick {
            Some(deadline) => ctx.wake.recv_deadline(deadline),
            None => ctx
                .wake
                .recv()
                .map_err(|_| channel::RecvTimeoutError::Disconnected),
        };
        match woken {
            Ok(()) => {
                if ctx.shared.is_running() {
                    stage.apply(ctx, ctx.shared.pending.take());
                }
                continue;
            }
            Err(channel::RecvTimeoutError::Timeout) => {}
            Err(channel::RecvTimeoutError::Disconnected) => break,
        }

        if !ctx.shared.is_running() {
            break;
        }

        let frames = &ctx.shared.frames;
        stage.present(ctx, |scene, gpu| scene.draw_tick(gpu, frames));
        stage.advance();
        next_tick = next_tick.and_then(|due| following_tick(due, tick));
    }
}

/// ### English
/// Deadline after `due`, restarted from now when the loop fell behind. `None` when it is not
/// representable, in which case the loop waits for wake-ups only.
///
/// ### 中文
/// `due` 之后的下一个截止时间；循环落后时从当前时刻重新计算。无法表示时返回 `None`，
/// 此时循环只等待唤醒。
fn following_tick(due: Instant, tick: Duration) -> Option<Instant> {
    let next = due.checked_add(tick)?;
    let now = Instant::now();
    if next < now {
        now.checked_add(tick)
    } else {
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn following_tick_handles_overflow_and_lag() {
        let now = Instant::now();
        assert_eq!(following_tick(now, Duration::MAX), None);

        let tick = Duration::from_millis(10);
        let ahead = now + Duration::from_secs(60);
        assert_eq!(following_tick(ahead, tick), Some(ahead + tick));

        let behind = following_tick(now, Duration::ZERO).map(|next| next >= now);
        assert_eq!(behind, Some(true));
    }
}
