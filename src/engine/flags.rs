//! ### English
//! Bitflags controlling optional session behaviors.
//!
//! These are passed through the C ABI as a `u32` bitmask.
//!
//! ### 中文
//! 控制会话可选行为的位标志（bitflags）。
//!
//! 通过 C ABI 以 `u32` 位掩码传入。

use std::time::Duration;

use dpi::PhysicalSize;

use super::config::{RenderConfig, RenderMode};

/// ### English
/// Render pushed YUV frames instead of the animated shape.
///
/// The content size is taken from the `content_width`/`content_height` arguments of
/// `egl_yuv_renderer_start`; pushed frames must match it exactly.
///
/// ### 中文
/// 渲染推送的 YUV 帧，而不是动画形状。
///
/// 内容尺寸取自 `egl_yuv_renderer_start` 的 `content_width`/`content_height` 参数；
/// 推送的帧必须与之完全一致。
pub const EGL_YUV_RENDERER_FLAG_YUV_MODE: u32 = 1 << 0;

/// ### English
/// `egl_yuv_renderer_stop` waits for the render thread to tear down before returning.
///
/// ### 中文
/// `egl_yuv_renderer_stop` 在返回前等待渲染线程完成清理。
pub const EGL_YUV_RENDERER_FLAG_BLOCKING_STOP: u32 = 1 << 1;

/// ### English
/// `egl_yuv_renderer_start` waits until EGL and the GPU program are ready, and reports their
/// failure as its own status.
///
/// ### 中文
/// `egl_yuv_renderer_start` 等待 EGL 与 GPU 程序就绪，并将其失败作为自身返回状态。
pub const EGL_YUV_RENDERER_FLAG_BLOCKING_START: u32 = 1 << 2;

const KNOWN_FLAGS: u32 = EGL_YUV_RENDERER_FLAG_YUV_MODE
    | EGL_YUV_RENDERER_FLAG_BLOCKING_STOP
    | EGL_YUV_RENDERER_FLAG_BLOCKING_START;

/// ### English
/// Decoded start flags.
///
/// ### 中文
/// 解码后的启动标志。
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct StartFlags {
    pub yuv: bool,
    pub blocking_stop: bool,
    pub blocking_start: bool,
}

impl StartFlags {
    /// ### English
    /// Decodes `bits`; unknown bits are ignored with a warning.
    ///
    /// ### 中文
    /// 解码 `bits`；未知位会被忽略并记录警告。
    pub fn from_bits(bits: u32) -> Self {
        let unknown = bits & !KNOWN_FLAGS;
        if unknown != 0 {
            tracing::warn!(unknown = %format!("{unknown:#x}"), "ignoring unknown start flags");
        }

        Self {
            yuv: bits & EGL_YUV_RENDERER_FLAG_YUV_MODE != 0,
            blocking_stop: bits & EGL_YUV_RENDERER_FLAG_BLOCKING_STOP != 0,
            blocking_start: bits & EGL_YUV_RENDERER_FLAG_BLOCKING_START != 0,
        }
    }

    /// ### English
    /// Builds the session config these flags describe.
    ///
    /// #### Parameters
    /// - `content`: YUV content size; ignored in shape mode.
    /// - `tick_ms`: Tick interval in milliseconds; `0` keeps the default.
    ///
    /// ### 中文
    /// 构建这些标志所描述的会话配置。
    ///
    /// #### 参数
    /// - `content`：YUV 内容尺寸；形状模式下忽略。
    /// - `tick_ms`：tick 间隔（毫秒）；为 `0` 时使用默认值。
    pub fn render_config(self, content: PhysicalSize<u32>, tick_ms: u32) -> RenderConfig {
        let mut config = RenderConfig::default();
        if self.yuv {
            config.mode = RenderMode::Yuv { content };
        }
        if tick_ms != 0 {
            config.tick = Duration::from_millis(u64::from(tick_ms));
        }
        config
    }
}
