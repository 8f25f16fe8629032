//! ### English
//! [`EglApi`] over `libEGL`, loaded at runtime through `khronos-egl`.
//!
//! ### 中文
//! 通过 `khronos-egl` 在运行时加载 `libEGL` 的 [`EglApi`] 实现。

use std::ffi::c_void;

use khronos_egl as egl;

use super::{EglApi, EglConfig, EglContext, EglDisplay, EglSurface};
use crate::engine::error::RenderError;
use crate::engine::surface::NativeHandle;

/// ### English
/// Dynamically loaded EGL 1.4 instance.
///
/// ### 中文
/// 动态加载的 EGL 1.4 实例。
pub struct KhronosEgl {
    instance: egl::DynamicInstance<egl::EGL1_4>,
}

impl KhronosEgl {
    /// ### English
    /// Loads `libEGL` and resolves the EGL 1.4 entry points.
    ///
    /// ### 中文
    /// 加载 `libEGL` 并解析 EGL 1.4 入口。
    pub fn load() -> Result<Self, RenderError> {
        let instance = unsafe { egl::DynamicInstance::<egl::EGL1_4>::load_required() }
            .map_err(|err| RenderError::Context {
                call: "dlopen(libEGL)",
                reason: format!("{err:?}"),
            })?;
        Ok(Self { instance })
    }
}

fn display(handle: EglDisplay) -> egl::Display {
    unsafe { egl::Display::from_ptr(handle.as_ptr()) }
}

fn config(handle: EglConfig) -> egl::Config {
    unsafe { egl::Config::from_ptr(handle.as_ptr()) }
}

fn context(handle: EglContext) -> egl::Context {
    unsafe { egl::Context::from_ptr(handle.as_ptr()) }
}

fn surface(handle: EglSurface) -> egl::Surface {
    unsafe { egl::Surface::from_ptr(handle.as_ptr()) }
}

fn reason(err: egl::Error) -> String {
    err.to_string()
}

impl EglApi for KhronosEgl {
    fn get_display(&self, native_display: NativeHandle) -> Option<EglDisplay> {
        unsafe { self.instance.get_display(native_display.as_ptr()) }
            .map(|display| EglDisplay::from_ptr(display.as_ptr()))
    }

    fn initialize(&self, handle: EglDisplay) -> Result<(i32, i32), String> {
        self.instance.initialize(display(handle)).map_err(reason)
    }

    fn bind_gles_api(&self) -> Result<(), String> {
        self.instance.bind_api(egl::OPENGL_ES_API).map_err(reason)
    }

    fn choose_configs(&self, handle: EglDisplay, attribs: &[i32]) -> Result<Vec<EglConfig>, String> {
        let display = display(handle);
        let count = self.instance.get_config_count(display).map_err(reason)?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut configs = Vec::with_capacity(count);
        self.instance
            .choose_config(display, attribs, &mut configs)
            .map_err(reason)?;
        Ok(configs
            .into_iter()
            .map(|config| EglConfig::from_ptr(config.as_ptr()))
            .collect())
    }

    fn config_buffer_size(&self, handle: EglDisplay, handle_config: EglConfig) -> Result<i32, String> {
        self.instance
            .get_config_attrib(display(handle), config(handle_config), egl::BUFFER_SIZE)
            .map_err(reason)
    }

    fn create_context(
        &self,
        handle: EglDisplay,
        handle_config: EglConfig,
        attribs: &[i32],
    ) -> Result<EglContext, String> {
        self.instance
            .create_context(display(handle), config(handle_config), None, attribs)
            .map(|context| EglContext::from_ptr(context.as_ptr()))
            .map_err(reason)
    }

    fn create_window_surface(
        &self,
        handle: EglDisplay,
        handle_config: EglConfig,
        window: NativeHandle,
    ) -> Result<EglSurface, String> {
        unsafe {
            self.instance.create_window_surface(
                display(handle),
                config(handle_config),
                window.as_ptr(),
                None,
            )
        }
        .map(|surface| EglSurface::from_ptr(surface.as_ptr()))
        .map_err(reason)
    }

    fn make_current(
        &self,
        handle: EglDisplay,
        target: Option<(EglSurface, EglContext)>,
    ) -> Result<(), String> {
        let (draw, ctx) = match target {
            Some((s, c)) => (Some(surface(s)), Some(context(c))),
            None => (None, None),
        };
        self.instance
            .make_current(display(handle), draw, draw, ctx)
            .map_err(reason)
    }

    fn swap_buffers(&self, handle: EglDisplay, handle_surface: EglSurface) -> Result<(), String> {
        self.instance
            .swap_buffers(display(handle), surface(handle_surface))
            .map_err(reason)
    }

    fn destroy_surface(&self, handle: EglDisplay, handle_surface: EglSurface) -> Result<(), String> {
        self.instance
            .destroy_surface(display(handle), surface(handle_surface))
            .map_err(reason)
    }

    fn destroy_context(&self, handle: EglDisplay, handle_context: EglContext) -> Result<(), String> {
        self.instance
            .destroy_context(display(handle), context(handle_context))
            .map_err(reason)
    }

    fn terminate(&self, handle: EglDisplay) -> Result<(), String> {
        self.instance.terminate(display(handle)).map_err(reason)
    }

    fn proc_address(&self, name: &str) -> *const c_void {
        self.instance
            .get_proc_address(name)
            .map_or(std::ptr::null(), |proc| proc as *const c_void)
    }
}
