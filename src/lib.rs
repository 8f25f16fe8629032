/// ### English
/// `egl_yuv_renderer` cdylib crate root.
/// Exposes the C ABI via `ffi`; the renderer itself lives under `engine`.
///
/// ### 中文
/// `egl_yuv_renderer` 的 cdylib crate 根。
/// 通过 `ffi` 导出 C ABI；渲染器实现位于 `engine` 模块。
pub mod engine;
mod ffi;

pub use engine::{RenderConfig, RenderController, RenderError, RenderMode, SessionState, YuvFrame};
pub use ffi::EglYuvSurfaceCallbacks;
