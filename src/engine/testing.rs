//! ### English
//! Recording doubles for the GPU, EGL, driver and surface-provider seams (test builds only).
//!
//! ### 中文
//! GPU、EGL、driver 与 surface provider 接缝的记录型替身（仅测试构建）。

use std::collections::HashMap;
use std::ffi::c_void;
use std::num::NonZeroU32;
use std::sync::Arc;

use parking_lot::Mutex;

use super::driver::GraphicsDriver;
use super::egl::{EglApi, EglConfig, EglContext, EglDisplay, EglSurface};
use super::error::RenderError;
use super::gpu::{
    BufferHandle, Gpu, NO_ERROR, PlaneFormat, Primitive, ProgramHandle, ShaderHandle, ShaderStage,
    TextureHandle,
};
use super::surface::{NativeHandle, SurfaceProvider};

pub(crate) const GL_OUT_OF_MEMORY: u32 = 0x0505;

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GpuCall {
    UseProgram(Option<u32>),
    BindTextureUnit { unit: u32, texture: u32 },
    TexImage {
        width: u32,
        height: u32,
        format: PlaneFormat,
        len: usize,
    },
    VertexAttrib { index: u32, buffer: u32, components: i32 },
    Uniform1i(u32, i32),
    Uniform2f(u32, f32, f32),
    Uniform3f(u32, [f32; 3]),
    UniformMatrix3(u32, [f32; 9]),
    UniformMatrix4(u32, [f32; 16]),
    Viewport(i32, i32, u32, u32),
    ClearColor([f32; 4]),
    Clear,
    DrawArrays(Primitive, i32, i32),
}

#[derive(Default)]
pub(crate) struct GpuLog {
    next_name: u32,
    pub calls: Vec<GpuCall>,
    /// Texture sink: last bytes uploaded into each texture name.
    pub textures: HashMap<u32, Vec<u8>>,
    pub vertices: HashMap<u32, Vec<f32>>,
    pub live_shaders: usize,
    pub live_programs: usize,
    pub live_textures: usize,
    pub live_buffers: usize,
    pub sources: Vec<(ShaderStage, String)>,
    pub bound_attribs: Vec<(u32, String)>,
    pub fail_compile: Option<ShaderStage>,
    pub fail_link: bool,
    /// Number of upcoming `tex_image_2d` calls that report `GL_OUT_OF_MEMORY`.
    pub fail_tex_uploads: usize,
    shader_stages: HashMap<u32, ShaderStage>,
    bound_texture: Option<u32>,
    /// Reported (and cleared) by the next `get_error`.
    pub pending_error: u32,
}

impl GpuLog {
    fn name(&mut self) -> NonZeroU32 {
        self.next_name += 1;
        NonZeroU32::new(self.next_name).unwrap()
    }

    pub(crate) fn draws(&self) -> Vec<(Primitive, i32, i32)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                GpuCall::DrawArrays(p, first, count) => Some((*p, *first, *count)),
                _ => None,
            })
            .collect()
    }
}

/// Uniform locations are derived from the name so tests can predict them.
pub(crate) fn location_of(name: &str) -> u32 {
    name.bytes().map(u32::from).sum()
}

#[derive(Clone, Default)]
pub(crate) struct RecordingGpu {
    pub log: Arc<Mutex<GpuLog>>,
}

impl RecordingGpu {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl Gpu for RecordingGpu {
    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderHandle, String> {
        let mut log = self.log.lock();
        let name = log.name();
        log.live_shaders += 1;
        log.shader_stages.insert(name.get(), stage);
        Ok(name)
    }

    fn shader_source(&self, shader: ShaderHandle, source: &str) {
        let mut log = self.log.lock();
        let stage = log.shader_stages[&shader.get()];
        log.sources.push((stage, source.to_string()));
    }

    fn compile_shader(&self, _shader: ShaderHandle) {}

    fn shader_compile_status(&self, shader: ShaderHandle) -> bool {
        let log = self.log.lock();
        log.fail_compile != Some(log.shader_stages[&shader.get()])
    }

    fn shader_info_log(&self, shader: ShaderHandle) -> String {
        let log = self.log.lock();
        format!("0:1: error in {} shader", log.shader_stages[&shader.get()])
    }

    fn delete_shader(&self, _shader: ShaderHandle) {
        self.log.lock().live_shaders -= 1;
    }

    fn create_program(&self) -> Result<ProgramHandle, String> {
        let mut log = self.log.lock();
        log.live_programs += 1;
        Ok(log.name())
    }

    fn attach_shader(&self, _program: ProgramHandle, _shader: ShaderHandle) {}

    fn bind_attrib_location(&self, _program: ProgramHandle, index: u32, name: &str) {
        self.log.lock().bound_attribs.push((index, name.to_string()));
    }

    fn link_program(&self, _program: ProgramHandle) {}

    fn program_link_status(&self, _program: ProgramHandle) -> bool {
        !self.log.lock().fail_link
    }

    fn program_info_log(&self, _program: ProgramHandle) -> String {
        "varying vTexCoor not written".to_string()
    }

    fn delete_program(&self, _program: ProgramHandle) {
        self.log.lock().live_programs -= 1;
    }

    fn use_program(&self, program: Option<ProgramHandle>) {
        self.log
            .lock()
            .calls
            .push(GpuCall::UseProgram(program.map(NonZeroU32::get)));
    }

    fn uniform_location(&self, _program: ProgramHandle, name: &str) -> Option<u32> {
        Some(location_of(name))
    }

    fn create_texture(&self) -> Result<TextureHandle, String> {
        let mut log = self.log.lock();
        log.live_textures += 1;
        Ok(log.name())
    }

    fn delete_texture(&self, texture: TextureHandle) {
        let mut log = self.log.lock();
        log.live_textures -= 1;
        log.textures.remove(&texture.get());
    }

    fn bind_texture_unit(&self, unit: u32, texture: TextureHandle) {
        let mut log = self.log.lock();
        log.bound_texture = Some(texture.get());
        log.calls.push(GpuCall::BindTextureUnit {
            unit,
            texture: texture.get(),
        });
    }

    fn tex_image_2d(&self, width: u32, height: u32, format: PlaneFormat, data: &[u8]) {
        let mut log = self.log.lock();
        log.calls.push(GpuCall::TexImage {
            width,
            height,
            format,
            len: data.len(),
        });
        if log.fail_tex_uploads > 0 {
            log.fail_tex_uploads -= 1;
            log.pending_error = GL_OUT_OF_MEMORY;
            return;
        }
        if let Some(texture) = log.bound_texture {
            log.textures.insert(texture, data.to_vec());
        }
    }

    fn create_buffer(&self) -> Result<BufferHandle, String> {
        let mut log = self.log.lock();
        log.live_buffers += 1;
        Ok(log.name())
    }

    fn upload_vertices(&self, buffer: BufferHandle, data: &[f32]) {
        self.log.lock().vertices.insert(buffer.get(), data.to_vec());
    }

    fn vertex_attrib(&self, index: u32, buffer: BufferHandle, components: i32) {
        self.log.lock().calls.push(GpuCall::VertexAttrib {
            index,
            buffer: buffer.get(),
            components,
        });
    }

    fn delete_buffer(&self, buffer: BufferHandle) {
        let mut log = self.log.lock();
        log.live_buffers -= 1;
        log.vertices.remove(&buffer.get());
    }

    fn uniform_1i(&self, location: u32, value: i32) {
        self.log.lock().calls.push(GpuCall::Uniform1i(location, value));
    }

    fn uniform_2f(&self, location: u32, x: f32, y: f32) {
        self.log.lock().calls.push(GpuCall::Uniform2f(location, x, y));
    }

    fn uniform_3f(&self, location: u32, x: f32, y: f32, z: f32) {
        self.log
            .lock()
            .calls
            .push(GpuCall::Uniform3f(location, [x, y, z]));
    }

    fn uniform_matrix_3(&self, location: u32, column_major: &[f32; 9]) {
        self.log
            .lock()
            .calls
            .push(GpuCall::UniformMatrix3(location, *column_major));
    }

    fn uniform_matrix_4(&self, location: u32, column_major: &[f32; 16]) {
        self.log
            .lock()
            .calls
            .push(GpuCall::UniformMatrix4(location, *column_major));
    }

    fn viewport(&self, x: i32, y: i32, width: u32, height: u32) {
        self.log
            .lock()
            .calls
            .push(GpuCall::Viewport(x, y, width, height));
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.log.lock().calls.push(GpuCall::ClearColor(rgba));
    }

    fn clear(&self) {
        self.log.lock().calls.push(GpuCall::Clear);
    }

    fn draw_arrays(&self, primitive: Primitive, first: i32, count: i32) {
        self.log
            .lock()
            .calls
            .push(GpuCall::DrawArrays(primitive, first, count));
    }

    fn get_error(&self) -> u32 {
        std::mem::replace(&mut self.log.lock().pending_error, NO_ERROR)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum EglStep {
    GetDisplay,
    Initialize,
    BindApi,
    CreateContext,
    CreateSurface,
    MakeCurrent,
    SwapBuffers,
}

#[derive(Debug)]
pub(crate) struct EglLedger {
    pub fail_at: Option<EglStep>,
    pub config_buffer_sizes: Vec<i32>,
    pub initialized: usize,
    pub terminated: usize,
    pub contexts_created: usize,
    pub contexts_destroyed: usize,
    pub surfaces_created: usize,
    pub surfaces_destroyed: usize,
    pub current: bool,
    pub swaps: usize,
    pub native_windows: Vec<usize>,
}

impl Default for EglLedger {
    fn default() -> Self {
        Self {
            fail_at: None,
            config_buffer_sizes: vec![16, 24, 32],
            initialized: 0,
            terminated: 0,
            contexts_created: 0,
            contexts_destroyed: 0,
            surfaces_created: 0,
            surfaces_destroyed: 0,
            current: false,
            swaps: 0,
            native_windows: Vec::new(),
        }
    }
}

impl EglLedger {
    /// Every acquired EGL object has been released.
    pub(crate) fn balanced(&self) -> bool {
        self.initialized == self.terminated
            && self.contexts_created == self.contexts_destroyed
            && self.surfaces_created == self.surfaces_destroyed
            && !self.current
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeEgl {
    pub ledger: Arc<Mutex<EglLedger>>,
}

impl FakeEgl {
    fn check(&self, step: EglStep) -> Result<(), String> {
        if self.ledger.lock().fail_at == Some(step) {
            return Err(format!("{step:?}: EGL_BAD_ALLOC"));
        }
        Ok(())
    }
}

impl EglApi for FakeEgl {
    fn get_display(&self, _native_display: NativeHandle) -> Option<EglDisplay> {
        self.check(EglStep::GetDisplay).ok()?;
        Some(EglDisplay::from_raw(0xd15))
    }

    fn initialize(&self, _display: EglDisplay) -> Result<(i32, i32), String> {
        self.check(EglStep::Initialize)?;
        self.ledger.lock().initialized += 1;
        Ok((1, 4))
    }

    fn bind_gles_api(&self) -> Result<(), String> {
        self.check(EglStep::BindApi)
    }

    fn choose_configs(&self, _display: EglDisplay, attribs: &[i32]) -> Result<Vec<EglConfig>, String> {
        assert_eq!(attribs.last(), Some(&khronos_egl::NONE));
        let count = self.ledger.lock().config_buffer_sizes.len();
        Ok((0..count).map(|i| EglConfig::from_raw(0xc0 + i)).collect())
    }

    fn config_buffer_size(&self, _display: EglDisplay, config: EglConfig) -> Result<i32, String> {
        let ledger = self.ledger.lock();
        Ok(ledger.config_buffer_sizes[config.as_raw() - 0xc0])
    }

    fn create_context(
        &self,
        _display: EglDisplay,
        _config: EglConfig,
        _attribs: &[i32],
    ) -> Result<EglContext, String> {
        self.check(EglStep::CreateContext)?;
        self.ledger.lock().contexts_created += 1;
        Ok(EglContext::from_raw(0xc7))
    }

    fn create_window_surface(
        &self,
        _display: EglDisplay,
        _config: EglConfig,
        window: NativeHandle,
    ) -> Result<EglSurface, String> {
        self.check(EglStep::CreateSurface)?;
        let mut ledger = self.ledger.lock();
        ledger.surfaces_created += 1;
        ledger.native_windows.push(window.as_raw());
        Ok(EglSurface::from_raw(0x5f))
    }

    fn make_current(
        &self,
        _display: EglDisplay,
        target: Option<(EglSurface, EglContext)>,
    ) -> Result<(), String> {
        if target.is_some() {
            self.check(EglStep::MakeCurrent)?;
        }
        self.ledger.lock().current = target.is_some();
        Ok(())
    }

    fn swap_buffers(&self, _display: EglDisplay, _surface: EglSurface) -> Result<(), String> {
        self.check(EglStep::SwapBuffers)?;
        self.ledger.lock().swaps += 1;
        Ok(())
    }

    fn destroy_surface(&self, _display: EglDisplay, _surface: EglSurface) -> Result<(), String> {
        self.ledger.lock().surfaces_destroyed += 1;
        Ok(())
    }

    fn destroy_context(&self, _display: EglDisplay, _context: EglContext) -> Result<(), String> {
        self.ledger.lock().contexts_destroyed += 1;
        Ok(())
    }

    fn terminate(&self, _display: EglDisplay) -> Result<(), String> {
        self.ledger.lock().terminated += 1;
        Ok(())
    }

    fn proc_address(&self, _name: &str) -> *const c_void {
        std::ptr::null()
    }
}

/// Hands out doubles sharing one ledger/log so tests can inspect them after the thread ends.
#[derive(Clone, Default)]
pub(crate) struct FakeDriver {
    pub egl: FakeEgl,
    pub gpu: RecordingGpu,
}

impl GraphicsDriver for FakeDriver {
    fn load_egl(&self) -> Result<Box<dyn EglApi>, RenderError> {
        Ok(Box::new(self.egl.clone()))
    }

    fn load_gpu(&self, _egl: &dyn EglApi) -> Box<dyn Gpu> {
        Box::new(self.gpu.clone())
    }
}

#[derive(Default)]
pub(crate) struct FakeSurfaces {
    pub missing_window: bool,
    /// Unwinds the render thread on the first swap notification.
    pub panic_on_swap: bool,
    pub swaps: Mutex<Vec<(String, u32)>>,
}

impl SurfaceProvider for FakeSurfaces {
    fn native_window(&self, _page_token: &str, surface_id: u32) -> Option<NativeHandle> {
        if self.missing_window {
            return None;
        }
        Some(NativeHandle::from_raw(0x1000 + surface_id as usize))
    }

    fn native_display(&self, _page_token: &str, _surface_id: u32) -> NativeHandle {
        NativeHandle::null()
    }

    fn buffers_swapped(&self, page_token: &str, surface_id: u32) {
        if self.panic_on_swap {
            panic!("host callback panicked on surface {surface_id}");
        }
        self.swaps.lock().push((page_token.to_string(), surface_id));
    }
}
