//! ### English
//! Frame renderers and the per-session scene that drives them.
//!
//! ### 中文
//! 帧渲染器，以及驱动它们的每会话场景。

pub mod color;
mod shape;
mod yuv;

use dpi::PhysicalSize;

pub use shape::{ShapeAnimation, ShapeRenderer, pixel_offset, quad_vertices};
pub use yuv::{FrameRenderer, QUAD_POSITIONS, QUAD_TEX_COORDS};

use super::config::{RenderConfig, RenderMode};
use super::error::RenderError;
use super::frame::{FrameSlot, YuvFrame};
use super::gpu::{Gpu, ProgramHandle};
use super::layout::{Rotation, ViewportRect, compute_viewport};

/// ### English
/// YUV mode state: the renderer, the frame currently on screen and its layout.
///
/// ### 中文
/// YUV 模式状态：渲染器、当前显示的帧及其布局。
pub(crate) struct YuvScene {
    renderer: FrameRenderer,
    content: PhysicalSize<u32>,
    rotation: Rotation,
    viewport: ViewportRect,
    current: YuvFrame,
}

/// ### English
/// Everything the render thread draws with. Lives and dies on the render thread.
///
/// ### 中文
/// 渲染线程绘制所需的全部状态。在渲染线程上创建并销毁。
pub(crate) enum Scene {
    Shape {
        renderer: ShapeRenderer,
        animation: ShapeAnimation,
    },
    Yuv(YuvScene),
}

impl Scene {
    pub(crate) fn build(
        gpu: &dyn Gpu,
        config: &RenderConfig,
        surface: PhysicalSize<u32>,
    ) -> Result<Self, RenderError> {
        match config.mode {
            RenderMode::Shape => Ok(Self::Shape {
                renderer: ShapeRenderer::new(gpu, surface, config.clear_color)?,
                animation: ShapeAnimation::new(config.animation),
            }),
            RenderMode::Yuv { content } => {
                let renderer = FrameRenderer::new(gpu, config.mvp, config.clear_color)?;
                let viewport = compute_viewport(content, surface, config.rotation);
                tracing::debug!(?content, ?surface, ?viewport, "YUV layout");
                Ok(Self::Yuv(YuvScene {
                    renderer,
                    content,
                    rotation: config.rotation,
                    viewport,
                    current: YuvFrame::zeroed(content),
                }))
            }
        }
    }

    pub(crate) fn program_handle(&self) -> ProgramHandle {
        match self {
            Self::Shape { renderer, .. } => renderer.program().handle(),
            Self::Yuv(scene) => scene.renderer.program().handle(),
        }
    }

    /// ### English
    /// Draws one loop frame: the animated quad, or the newest pushed frame (the previous one when
    /// nothing new arrived).
    ///
    /// ### 中文
    /// 绘制一帧循环画面：动画方块，或最新推送的帧（没有新帧时沿用上一帧）。
    pub(crate) fn draw_tick(&mut self, gpu: &dyn Gpu, frames: &FrameSlot) -> Result<(), RenderError> {
        match self {
            Self::Shape {
                renderer,
                animation,
            } => {
                let (x, y) = animation.position();
                renderer.draw_at(gpu, x, y);
                Ok(())
            }
            Self::Yuv(scene) => scene.draw_latest(gpu, frames),
        }
    }

    /// ### English
    /// On-demand draw. Shape mode places the quad at `(x, y)`; YUV mode ignores the position.
    ///
    /// ### 中文
    /// 按需绘制。形状模式将方块放在 `(x, y)`；YUV 模式忽略该位置。
    pub(crate) fn redraw(
        &mut self,
        gpu: &dyn Gpu,
        frames: &FrameSlot,
        x: i32,
        y: i32,
    ) -> Result<(), RenderError> {
        match self {
            Self::Shape { renderer, .. } => {
                renderer.draw_at(gpu, x, y);
                Ok(())
            }
            Self::Yuv(scene) => scene.draw_latest(gpu, frames),
        }
    }

    pub(crate) fn advance(&mut self) {
        if let Self::Shape { animation, .. } = self {
            animation.advance();
        }
    }

    pub(crate) fn resize(&mut self, gpu: &dyn Gpu, surface: PhysicalSize<u32>) {
        match self {
            Self::Shape { renderer, .. } => renderer.resize(gpu, surface),
            Self::Yuv(scene) => {
                scene.viewport = compute_viewport(scene.content, surface, scene.rotation);
                tracing::debug!(?surface, viewport = ?scene.viewport, "YUV layout changed");
            }
        }
    }

    pub(crate) fn delete(self, gpu: &dyn Gpu) {
        match self {
            Self::Shape { renderer, .. } => renderer.delete(gpu),
            Self::Yuv(scene) => scene.renderer.delete(gpu),
        }
    }
}

impl YuvScene {
    fn draw_latest(&mut self, gpu: &dyn Gpu, frames: &FrameSlot) -> Result<(), RenderError> {
        if let Some(frame) = frames.take() {
            self.current = frame;
        }
        self.renderer.draw_frame(gpu, &self.current, self.viewport)
    }
}
