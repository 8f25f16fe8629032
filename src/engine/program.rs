//! ### English
//! Shader compilation and program linking with GPU-reported diagnostics.
//!
//! ### 中文
//! 着色器编译与程序链接，附带 GPU 报告的诊断信息。

use std::collections::HashMap;

use super::error::RenderError;
use super::gpu::{Gpu, ProgramHandle, ShaderHandle, ShaderStage};

/// ### English
/// Sources and interface of one GPU program.
///
/// ### 中文
/// 一个 GPU 程序的源码与接口描述。
#[derive(Debug, Clone, Copy)]
pub struct ProgramSource {
    pub vertex: &'static str,
    pub fragment: &'static str,
    /// ### English
    /// Attributes bound to fixed indices before linking.
    ///
    /// ### 中文
    /// 链接前绑定到固定索引的属性。
    pub attributes: &'static [(u32, &'static str)],
    pub uniforms: &'static [&'static str],
}

/// ### English
/// Compiles one shader stage.
///
/// On failure the shader object is deleted and the full info log is returned in the error.
///
/// #### Parameters
/// - `gpu`: GL command seam (context must be current).
/// - `stage`: Vertex or fragment.
/// - `source`: GLSL ES 1.00 source.
///
/// ### 中文
/// 编译单个着色器阶段。
///
/// 失败时删除 shader 对象，并在错误中返回完整的 info log。
///
/// #### 参数
/// - `gpu`：GL 命令接缝（上下文必须 current）。
/// - `stage`：顶点或片元。
/// - `source`：GLSL ES 1.00 源码。
pub fn compile_shader(
    gpu: &dyn Gpu,
    stage: ShaderStage,
    source: &str,
) -> Result<ShaderHandle, RenderError> {
    let shader = gpu.create_shader(stage).map_err(RenderError::Allocation)?;
    gpu.shader_source(shader, source);
    gpu.compile_shader(shader);

    if gpu.shader_compile_status(shader) {
        return Ok(shader);
    }

    let log = gpu.shader_info_log(shader);
    gpu.delete_shader(shader);
    tracing::warn!(%stage, %log, "shader compile failed");
    Err(RenderError::Compile { stage, log })
}

/// ### English
/// Links a vertex/fragment pair, binding `attributes` to their indices first.
///
/// On failure the program object is deleted; the shaders stay owned by the caller.
///
/// ### 中文
/// 链接顶点/片元着色器对，链接前先把 `attributes` 绑定到各自索引。
///
/// 失败时删除 program 对象；shader 仍归调用方所有。
pub fn link_program(
    gpu: &dyn Gpu,
    vertex: ShaderHandle,
    fragment: ShaderHandle,
    attributes: &[(u32, &str)],
) -> Result<ProgramHandle, RenderError> {
    let program = gpu.create_program().map_err(RenderError::Allocation)?;
    gpu.attach_shader(program, vertex);
    gpu.attach_shader(program, fragment);
    for &(index, name) in attributes {
        gpu.bind_attrib_location(program, index, name);
    }
    gpu.link_program(program);

    if gpu.program_link_status(program) {
        return Ok(program);
    }

    let log = gpu.program_info_log(program);
    gpu.delete_program(program);
    tracing::warn!(%log, "program link failed");
    Err(RenderError::Link { log })
}

/// ### English
/// A linked program with its shaders and resolved locations.
///
/// Not reclaimed on drop: call [`ShaderProgram::delete`] while the context is still current.
///
/// ### 中文
/// 已链接的程序，连同其 shader 与解析出的位置表。
///
/// drop 时不会回收：需在上下文仍 current 时调用 [`ShaderProgram::delete`]。
#[derive(Debug)]
pub struct ShaderProgram {
    program: ProgramHandle,
    vertex: ShaderHandle,
    fragment: ShaderHandle,
    uniforms: HashMap<&'static str, u32>,
    attributes: HashMap<&'static str, u32>,
}

impl ShaderProgram {
    pub fn build(gpu: &dyn Gpu, source: &ProgramSource) -> Result<Self, RenderError> {
        let vertex = compile_shader(gpu, ShaderStage::Vertex, source.vertex)?;
        let fragment = match compile_shader(gpu, ShaderStage::Fragment, source.fragment) {
            Ok(fragment) => fragment,
            Err(err) => {
                gpu.delete_shader(vertex);
                return Err(err);
            }
        };

        let program = match link_program(gpu, vertex, fragment, source.attributes) {
            Ok(program) => program,
            Err(err) => {
                gpu.delete_shader(vertex);
                gpu.delete_shader(fragment);
                return Err(err);
            }
        };

        let uniforms = source
            .uniforms
            .iter()
            .filter_map(|&name| match gpu.uniform_location(program, name) {
                Some(location) => Some((name, location)),
                None => {
                    tracing::debug!(name, "uniform inactive");
                    None
                }
            })
            .collect();
        let attributes = source
            .attributes
            .iter()
            .map(|&(index, name)| (name, index))
            .collect();

        Ok(Self {
            program,
            vertex,
            fragment,
            uniforms,
            attributes,
        })
    }

    pub fn handle(&self) -> ProgramHandle {
        self.program
    }

    /// ### English
    /// Location of an active uniform, `None` if the linker dropped it.
    ///
    /// ### 中文
    /// 活跃 uniform 的位置；被链接器裁掉时为 `None`。
    pub fn uniform(&self, name: &str) -> Option<u32> {
        self.uniforms.get(name).copied()
    }

    pub fn attribute(&self, name: &str) -> Option<u32> {
        self.attributes.get(name).copied()
    }

    pub fn delete(self, gpu: &dyn Gpu) {
        gpu.use_program(None);
        gpu.delete_program(self.program);
        gpu.delete_shader(self.vertex);
        gpu.delete_shader(self.fragment);
    }
}
