//! ### English
//! Error taxonomy shared by the rendering engine and the C ABI.
//!
//! ### 中文
//! 渲染引擎与 C ABI 共用的错误分类。

use std::ffi::CStr;
use std::time::Duration;

use dpi::PhysicalSize;

use super::gpu::ShaderStage;

/// ### English
/// Every failure the renderer reports to its caller.
///
/// Platform seams (`EglApi`, `Gpu`) fail with plain `String`s; they are wrapped into one of these
/// variants at the boundary so the caller always sees a kind plus context.
///
/// ### 中文
/// 渲染器向调用方报告的全部错误。
///
/// 平台接缝（`EglApi`、`Gpu`）以 `String` 返回失败；在边界处统一包装为以下变体，
/// 调用方总能拿到错误种类与上下文。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// ### English
    /// Operation requested on surface id 0, or with no session assigned.
    ///
    /// ### 中文
    /// 在 surface id 为 0 或尚未分配会话时发起操作。
    #[error("failed, the surface id is invalid")]
    InvalidSurface,
    /// ### English
    /// No EGL config with the required color-buffer depth.
    ///
    /// ### 中文
    /// 没有满足所需颜色缓冲位深的 EGL config。
    #[error("no EGL config with a {required}-bit color buffer")]
    Config { required: i32 },
    /// ### English
    /// EGL display/context/surface setup or use failed.
    ///
    /// ### 中文
    /// EGL display/context/surface 的创建或使用失败。
    #[error("{call} failed: {reason}")]
    Context { call: &'static str, reason: String },
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("program failed to link: {log}")]
    Link { log: String },
    /// ### English
    /// Host memory, thread, or GPU object exhaustion.
    ///
    /// ### 中文
    /// 宿主内存、线程或 GPU 对象耗尽。
    #[error("allocation failed: {0}")]
    Allocation(String),
    /// ### English
    /// A plane or packed frame did not carry the expected number of bytes.
    ///
    /// ### 中文
    /// 平面或打包帧的字节数与预期不符。
    #[error("{what} holds {actual} bytes, expected {expected}")]
    FrameSize {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    /// ### English
    /// A frame's dimensions differ from the content size fixed at session start.
    ///
    /// ### 中文
    /// 帧尺寸与会话启动时固定的内容尺寸不一致。
    #[error("frame is {actual:?}, session content is {expected:?}")]
    FrameDimensions {
        expected: PhysicalSize<u32>,
        actual: PhysicalSize<u32>,
    },
    /// ### English
    /// YUV mode started with a zero-width or zero-height content size.
    ///
    /// ### 中文
    /// 以宽或高为零的内容尺寸启动 YUV 模式。
    #[error("YUV content size {0:?} is empty")]
    EmptyContent(PhysicalSize<u32>),
    #[error("a render session is already active on surface {0}")]
    AlreadyRunning(u32),
    /// ### English
    /// YUV frames pushed to a session that renders the animated shape.
    ///
    /// ### 中文
    /// 向绘制动画形状的会话推送了 YUV 帧。
    #[error("the active session does not render YUV frames")]
    NotYuvSession,
    /// ### English
    /// The render thread unwound; its session is terminated.
    ///
    /// ### 中文
    /// 渲染线程发生 panic 并展开；其会话已终止。
    #[error("render thread panicked")]
    ThreadPanicked,
    #[error("render thread did not stop within {0:?}")]
    Timeout(Duration),
}

impl RenderError {
    /// ### English
    /// Stable snake-case kind string (crosses the C ABI as the last-error kind).
    ///
    /// ### 中文
    /// 稳定的 snake-case 错误种类字符串（作为 last-error 种类跨越 C ABI）。
    pub fn kind(&self) -> &'static str {
        match self.kind_cstr().to_str() {
            Ok(kind) => kind,
            Err(_) => "unknown",
        }
    }

    /// ### English
    /// NUL-terminated form of [`RenderError::kind`], valid for the whole process lifetime.
    ///
    /// ### 中文
    /// [`RenderError::kind`] 的 NUL 结尾形式，在整个进程生命周期内有效。
    pub fn kind_cstr(&self) -> &'static CStr {
        match self {
            Self::InvalidSurface => c"invalid_surface",
            Self::Config { .. } => c"config",
            Self::Context { .. } => c"context",
            Self::Compile { .. } => c"compile",
            Self::Link { .. } => c"link",
            Self::Allocation(_) => c"allocation",
            Self::FrameSize { .. } => c"frame_size",
            Self::FrameDimensions { .. } => c"frame_dimensions",
            Self::EmptyContent(_) => c"empty_content",
            Self::AlreadyRunning(_) => c"already_running",
            Self::NotYuvSession => c"not_yuv_session",
            Self::ThreadPanicked => c"thread_panicked",
            Self::Timeout(_) => c"timeout",
        }
    }

    pub(crate) fn context(call: &'static str) -> impl FnOnce(String) -> Self {
        move |reason| Self::Context { call, reason }
    }
}
