//! ### English
//! Per-session render configuration.
//!
//! ### 中文
//! 每个会话的渲染配置。

use std::time::Duration;

use dpi::PhysicalSize;

use super::layout::Rotation;

/// ### English
/// What the render loop draws.
///
/// ### 中文
/// 渲染循环绘制的内容。
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// ### English
    /// Animated green quad over a gray clear.
    ///
    /// ### 中文
    /// 灰色背景上移动的绿色方块。
    #[default]
    Shape,
    /// ### English
    /// YUV 4:2:0 frames of a fixed content size, pushed by the host.
    ///
    /// ### 中文
    /// 由宿主推送、内容尺寸固定的 YUV 4:2:0 帧。
    Yuv { content: PhysicalSize<u32> },
}

/// ### English
/// Shape animation: both coordinates advance by `step` per tick and restart at 0 once they exceed
/// `limit`.
///
/// ### 中文
/// 形状动画：两个坐标每个 tick 前进 `step`，超过 `limit` 后回到 0。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AnimationConfig {
    pub step: u32,
    pub limit: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            step: 20,
            limit: 300,
        }
    }
}

pub const IDENTITY_MVP: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub mode: RenderMode,
    /// ### English
    /// Delay between two loop frames.
    ///
    /// ### 中文
    /// 两次循环帧之间的间隔。
    pub tick: Duration,
    pub rotation: Rotation,
    /// ### English
    /// Exact `EGL_BUFFER_SIZE` the chosen config must have.
    ///
    /// ### 中文
    /// 所选 config 必须具有的 `EGL_BUFFER_SIZE`。
    pub buffer_size: i32,
    pub clear_color: [f32; 4],
    pub animation: AnimationConfig,
    /// ### English
    /// Column-major MVP for the YUV quad.
    ///
    /// ### 中文
    /// YUV 四边形的列主序 MVP 矩阵。
    pub mvp: [f32; 16],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::Shape,
            tick: Duration::from_millis(500),
            rotation: Rotation::Deg270,
            buffer_size: 32,
            clear_color: [0.5, 0.5, 0.5, 1.0],
            animation: AnimationConfig::default(),
            mvp: IDENTITY_MVP,
        }
    }
}

impl RenderConfig {
    /// ### English
    /// YUV mode for frames of `content` size, other fields default.
    ///
    /// ### 中文
    /// 内容尺寸为 `content` 的 YUV 模式，其它字段取默认值。
    pub fn yuv(content: PhysicalSize<u32>) -> Self {
        Self {
            mode: RenderMode::Yuv { content },
            ..Self::default()
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }
}
