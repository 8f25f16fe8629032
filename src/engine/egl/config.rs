//! ### English
//! EGL config selection: candidates matching the window/ES2 attributes, filtered by exact
//! color-buffer size.
//!
//! ### 中文
//! EGL config 选择：先取匹配 window/ES2 属性的候选，再按颜色缓冲大小精确过滤。

use khronos_egl as egl;

use super::{EglApi, EglConfig, EglDisplay};
use crate::engine::error::RenderError;

/// ### English
/// Window-renderable ES2 configs with at least one bit per RGBA channel.
///
/// ### 中文
/// 可渲染到 window、支持 ES2、且 RGBA 每通道至少 1 位的 config。
pub const CONFIG_ATTRIBUTES: [i32; 13] = [
    egl::SURFACE_TYPE,
    egl::WINDOW_BIT,
    egl::RED_SIZE,
    1,
    egl::GREEN_SIZE,
    1,
    egl::BLUE_SIZE,
    1,
    egl::ALPHA_SIZE,
    1,
    egl::RENDERABLE_TYPE,
    egl::OPENGL_ES2_BIT,
    egl::NONE,
];

pub const CONTEXT_ATTRIBUTES: [i32; 3] = [egl::CONTEXT_CLIENT_VERSION, 2, egl::NONE];

/// ### English
/// Returns the first candidate whose `EGL_BUFFER_SIZE` equals `required_buffer_size`.
///
/// A config whose attribute query fails is skipped rather than aborting the search.
///
/// ### 中文
/// 返回第一个 `EGL_BUFFER_SIZE` 等于 `required_buffer_size` 的候选。
///
/// 属性查询失败的 config 会被跳过，而不是中止搜索。
pub fn select_config(
    egl: &dyn EglApi,
    display: EglDisplay,
    required_buffer_size: i32,
) -> Result<EglConfig, RenderError> {
    let candidates = egl
        .choose_configs(display, &CONFIG_ATTRIBUTES)
        .map_err(RenderError::context("eglChooseConfig"))?;

    tracing::debug!(candidates = candidates.len(), "EGL configs matched");

    candidates
        .into_iter()
        .find(|&config| egl.config_buffer_size(display, config) == Ok(required_buffer_size))
        .ok_or(RenderError::Config {
            required: required_buffer_size,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::FakeEgl;

    #[test]
    fn picks_first_config_with_exact_buffer_size() {
        let egl = FakeEgl::default();
        egl.ledger.lock().config_buffer_sizes = vec![24, 32, 32];
        let display = EglDisplay::from_raw(1);

        let config = select_config(&egl, display, 32).unwrap();
        assert_eq!(config, EglConfig::from_raw(0xc1));
    }

    #[test]
    fn reports_config_error_without_match() {
        let egl = FakeEgl::default();
        egl.ledger.lock().config_buffer_sizes = vec![16, 24];

        let err = select_config(&egl, EglDisplay::from_raw(1), 32).unwrap_err();
        assert_eq!(err, RenderError::Config { required: 32 });
    }

    #[test]
    fn no_candidates_is_a_config_error() {
        let egl = FakeEgl::default();
        egl.ledger.lock().config_buffer_sizes.clear();

        let err = select_config(&egl, EglDisplay::from_raw(1), 32).unwrap_err();
        assert_eq!(err.kind(), "config");
    }
}
