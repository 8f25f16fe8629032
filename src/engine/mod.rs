/// ### English
/// Renderer internals: EGL binding, GL programs and textures, layout, and the render sessions
/// that tie them to a dedicated thread.
///
/// ### 中文
/// 渲染器内部模块：EGL 绑定、GL 程序与纹理、布局，以及将其绑定到独立线程的渲染会话。
pub mod config;
pub mod driver;
pub mod egl;
pub mod error;
pub mod flags;
pub mod frame;
pub mod gpu;
pub mod layout;
pub mod planes;
pub mod program;
pub mod render;
pub mod session;
pub mod shaders;
pub mod surface;
#[cfg(test)]
pub(crate) mod testing;

pub use config::{RenderConfig, RenderMode};
pub use driver::{GraphicsDriver, NativeDriver};
pub use error::RenderError;
pub use flags::StartFlags;
pub use frame::YuvFrame;
pub use layout::{Rotation, ViewportRect, compute_viewport};
pub use session::{RenderController, SessionState, SessionStats};
pub use surface::{NativeHandle, SurfaceProvider};
