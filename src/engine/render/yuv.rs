//! ### English
//! Full-screen YUV quad: per-frame plane upload, in-shader color conversion, triangle-strip draw.
//!
//! ### 中文
//! 全屏 YUV 四边形：逐帧上传平面、着色器内颜色转换、triangle-strip 绘制。

use super::color::{YUV_OFFSET, YUV_TO_RGB};
use crate::engine::error::RenderError;
use crate::engine::frame::YuvFrame;
use crate::engine::gpu::{BufferHandle, Gpu, Primitive};
use crate::engine::layout::ViewportRect;
use crate::engine::planes::PlaneTextures;
use crate::engine::program::ShaderProgram;
use crate::engine::shaders::{
    A_POSITION, A_TEX_COOR, PLANE_SAMPLERS, U_MVP_MATRIX, U_YUV_OFFSET, U_YUV_TO_RGB, YUV_PROGRAM,
};

pub const QUAD_POSITIONS: [f32; 12] = [
    -1.0, 1.0, 0.0, //
    -1.0, -1.0, 0.0, //
    1.0, 1.0, 0.0, //
    1.0, -1.0, 0.0,
];

pub const QUAD_TEX_COORDS: [f32; 8] = [
    0.0, 0.0, //
    0.0, 1.0, //
    1.0, 0.0, //
    1.0, 1.0,
];

pub(crate) fn vertex_buffer(gpu: &dyn Gpu, data: &[f32]) -> Result<BufferHandle, RenderError> {
    let buffer = gpu.create_buffer().map_err(RenderError::Allocation)?;
    gpu.upload_vertices(buffer, data);
    Ok(buffer)
}

/// ### English
/// GPU state for drawing YUV frames: program, plane textures and the quad's vertex buffers.
///
/// ### 中文
/// 绘制 YUV 帧所需的 GPU 状态：程序、平面纹理与四边形顶点缓冲。
pub struct FrameRenderer {
    program: ShaderProgram,
    textures: PlaneTextures,
    positions: BufferHandle,
    tex_coords: BufferHandle,
    mvp: [f32; 16],
    clear_color: [f32; 4],
}

impl FrameRenderer {
    /// ### English
    /// Builds the YUV program and allocates textures and buffers. Nothing leaks on failure.
    ///
    /// ### 中文
    /// 构建 YUV 程序并分配纹理与缓冲。失败时不泄漏任何对象。
    pub fn new(gpu: &dyn Gpu, mvp: [f32; 16], clear_color: [f32; 4]) -> Result<Self, RenderError> {
        let program = ShaderProgram::build(gpu, &YUV_PROGRAM)?;

        let textures = match PlaneTextures::create(gpu) {
            Ok(textures) => textures,
            Err(err) => {
                program.delete(gpu);
                return Err(err);
            }
        };

        let buffers = vertex_buffer(gpu, &QUAD_POSITIONS).and_then(|positions| {
            match vertex_buffer(gpu, &QUAD_TEX_COORDS) {
                Ok(tex_coords) => Ok((positions, tex_coords)),
                Err(err) => {
                    gpu.delete_buffer(positions);
                    Err(err)
                }
            }
        });
        let (positions, tex_coords) = match buffers {
            Ok(buffers) => buffers,
            Err(err) => {
                textures.delete(gpu);
                program.delete(gpu);
                return Err(err);
            }
        };

        Ok(Self {
            program,
            textures,
            positions,
            tex_coords,
            mvp,
            clear_color,
        })
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    /// ### English
    /// Draws `frame` into `viewport`. Does not swap buffers.
    ///
    /// Planes are uploaded before anything is cleared, so a failed upload leaves the previous
    /// image on screen and issues no draw.
    ///
    /// #### Parameters
    /// - `gpu`: GL command seam (context must be current).
    /// - `frame`: Frame to show.
    /// - `viewport`: Target rect from the layout engine.
    ///
    /// ### 中文
    /// 将 `frame` 绘制到 `viewport`。不交换缓冲。
    ///
    /// 平面上传发生在清屏之前，因此上传失败时屏幕保留上一张图像，且不会发出绘制调用。
    ///
    /// #### 参数
    /// - `gpu`：GL 命令接缝（上下文必须 current）。
    /// - `frame`：要显示的帧。
    /// - `viewport`：布局引擎给出的目标矩形。
    pub fn draw_frame(
        &self,
        gpu: &dyn Gpu,
        frame: &YuvFrame,
        viewport: ViewportRect,
    ) -> Result<(), RenderError> {
        gpu.use_program(Some(self.program.handle()));
        self.textures.upload(gpu, frame)?;

        for (unit, name) in PLANE_SAMPLERS.into_iter().enumerate() {
            if let Some(location) = self.program.uniform(name) {
                gpu.uniform_1i(location, unit as i32);
            }
        }
        if let Some(location) = self.program.uniform(U_YUV_TO_RGB) {
            gpu.uniform_matrix_3(location, &YUV_TO_RGB);
        }
        if let Some(location) = self.program.uniform(U_YUV_OFFSET) {
            let [y, u, v] = YUV_OFFSET;
            gpu.uniform_3f(location, y, u, v);
        }

        if let Some(index) = self.program.attribute(A_POSITION) {
            gpu.vertex_attrib(index, self.positions, 3);
        }
        if let Some(index) = self.program.attribute(A_TEX_COOR) {
            gpu.vertex_attrib(index, self.tex_coords, 2);
        }
        if let Some(location) = self.program.uniform(U_MVP_MATRIX) {
            gpu.uniform_matrix_4(location, &self.mvp);
        }

        gpu.viewport(viewport.x, viewport.y, viewport.width, viewport.height);
        gpu.clear_color(self.clear_color);
        gpu.clear();
        gpu.draw_arrays(Primitive::TriangleStrip, 0, 4);
        Ok(())
    }

    pub fn delete(self, gpu: &dyn Gpu) {
        gpu.delete_buffer(self.positions);
        gpu.delete_buffer(self.tex_coords);
        self.textures.delete(gpu);
        self.program.delete(gpu);
    }
}

#[cfg(test)]
mod tests {
    use dpi::PhysicalSize;

    use super::*;
    use crate::engine::config::IDENTITY_MVP;
    use crate::engine::gpu::{PlaneFormat, ShaderStage};
    use crate::engine::layout::{Rotation, compute_viewport};
    use crate::engine::render::color::yuv_bytes_to_rgb;
    use crate::engine::testing::{GpuCall, RecordingGpu, location_of};

    const GRAY: [f32; 4] = [0.5, 0.5, 0.5, 1.0];

    #[test]
    fn zero_frame_issues_strip_draw_with_conversion_uniforms() {
        let gpu = RecordingGpu::new();
        let renderer = FrameRenderer::new(&gpu, IDENTITY_MVP, GRAY).unwrap();
        let content = PhysicalSize::new(1280, 720);
        let viewport = compute_viewport(content, PhysicalSize::new(1920, 1080), Rotation::Deg0);

        renderer
            .draw_frame(&gpu, &YuvFrame::zeroed(content), viewport)
            .unwrap();

        let log = gpu.log.lock();
        assert_eq!(log.draws(), vec![(Primitive::TriangleStrip, 0, 4)]);
        assert!(log.calls.contains(&GpuCall::UniformMatrix3(
            location_of(U_YUV_TO_RGB),
            YUV_TO_RGB
        )));
        assert!(log.calls.contains(&GpuCall::Uniform3f(
            location_of(U_YUV_OFFSET),
            YUV_OFFSET
        )));
        assert!(log.calls.contains(&GpuCall::UniformMatrix4(
            location_of(U_MVP_MATRIX),
            IDENTITY_MVP
        )));
        assert!(log.calls.contains(&GpuCall::Viewport(0, 0, 1920, 1080)));
        assert!(log.calls.contains(&GpuCall::TexImage {
            width: 1280,
            height: 720,
            format: PlaneFormat::Luminance,
            len: 1280 * 720,
        }));
        assert!(log.textures.values().all(|plane| plane.iter().all(|&b| b == 0)));

        let rgb = yuv_bytes_to_rgb(0, 0, 0);
        assert_eq!(rgb[0], 0.0);
        assert!((rgb[1] - 0.4684).abs() < 1e-3);
        assert_eq!(rgb[2], 0.0);
    }

    #[test]
    fn samplers_and_attributes_use_fixed_slots() {
        let gpu = RecordingGpu::new();
        let renderer = FrameRenderer::new(&gpu, IDENTITY_MVP, GRAY).unwrap();
        let content = PhysicalSize::new(4, 4);

        renderer
            .draw_frame(&gpu, &YuvFrame::zeroed(content), ViewportRect::full(content))
            .unwrap();

        let log = gpu.log.lock();
        for (unit, name) in PLANE_SAMPLERS.into_iter().enumerate() {
            assert!(log.calls.contains(&GpuCall::Uniform1i(location_of(name), unit as i32)));
        }
        let attribs: Vec<_> = log
            .calls
            .iter()
            .filter_map(|call| match call {
                GpuCall::VertexAttrib {
                    index, components, ..
                } => Some((*index, *components)),
                _ => None,
            })
            .collect();
        assert_eq!(attribs, vec![(0, 3), (1, 2)]);
        assert!(log.vertices.values().any(|v| v.as_slice() == QUAD_POSITIONS));
        assert!(log.vertices.values().any(|v| v.as_slice() == QUAD_TEX_COORDS));
    }

    #[test]
    fn failed_upload_skips_clear_and_draw() {
        let gpu = RecordingGpu::new();
        let renderer = FrameRenderer::new(&gpu, IDENTITY_MVP, GRAY).unwrap();
        gpu.log.lock().fail_tex_uploads = 1;
        let content = PhysicalSize::new(8, 8);

        let err = renderer
            .draw_frame(&gpu, &YuvFrame::zeroed(content), ViewportRect::full(content))
            .unwrap_err();
        assert_eq!(err.kind(), "allocation");

        let log = gpu.log.lock();
        assert!(log.draws().is_empty());
        assert!(!log.calls.contains(&GpuCall::Clear));
    }

    #[test]
    fn delete_releases_every_object() {
        let gpu = RecordingGpu::new();
        let renderer = FrameRenderer::new(&gpu, IDENTITY_MVP, GRAY).unwrap();
        renderer.delete(&gpu);

        let log = gpu.log.lock();
        assert_eq!(
            (
                log.live_programs,
                log.live_shaders,
                log.live_textures,
                log.live_buffers
            ),
            (0, 0, 0, 0)
        );
    }

    #[test]
    fn compile_failure_surfaces_from_new() {
        let gpu = RecordingGpu::new();
        gpu.log.lock().fail_compile = Some(ShaderStage::Fragment);

        let err = FrameRenderer::new(&gpu, IDENTITY_MVP, GRAY).err().unwrap();
        assert_eq!(err.kind(), "compile");
        assert_eq!(gpu.log.lock().live_textures, 0);
    }
}
