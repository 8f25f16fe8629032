//! ### English
//! Solid green quad positioned by pixel coordinates, plus its tick-driven animation.
//!
//! ### 中文
//! 按像素坐标定位的纯绿色方块，以及由 tick 驱动的动画。

use dpi::PhysicalSize;

use super::yuv::vertex_buffer;
use crate::engine::config::AnimationConfig;
use crate::engine::error::RenderError;
use crate::engine::gpu::{BufferHandle, Gpu, Primitive};
use crate::engine::layout::ViewportRect;
use crate::engine::program::ShaderProgram;
use crate::engine::shaders::{A_POS, SHAPE_PROGRAM, U_OFFSET};

const HALF_EXTENT: f32 = 0.2;

fn clamped(surface: PhysicalSize<u32>) -> (f32, f32) {
    (surface.width.max(1) as f32, surface.height.max(1) as f32)
}

/// ### English
/// Fan-ordered quad of half-size 0.2, with y scaled by the surface's width/height ratio.
///
/// ### 中文
/// 按 fan 顺序排列、半边长 0.2 的方块，y 方向按 surface 宽高比缩放。
pub fn quad_vertices(surface: PhysicalSize<u32>) -> [f32; 8] {
    let (width, height) = clamped(surface);
    let factor = width / height;
    let e = HALF_EXTENT;
    [
        -e,
        e * factor,
        -e,
        -e * factor,
        e,
        -e * factor,
        e,
        e * factor,
    ]
}

/// ### English
/// Maps a pixel position (origin top-left, y down) to a clip-space offset.
///
/// ### 中文
/// 将像素坐标（原点左上、y 向下）映射为裁剪空间偏移。
pub fn pixel_offset(x: i32, y: i32, surface: PhysicalSize<u32>) -> (f32, f32) {
    let (width, height) = clamped(surface);
    (
        (2.0 * x as f32 - width) / width,
        -(2.0 * y as f32 - height) / height,
    )
}

/// ### English
/// Animated quad position. Both axes move together.
///
/// ### 中文
/// 方块的动画位置。两个轴同步移动。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ShapeAnimation {
    x: u32,
    y: u32,
    config: AnimationConfig,
}

impl ShapeAnimation {
    pub fn new(config: AnimationConfig) -> Self {
        Self { x: 0, y: 0, config }
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }

    /// ### English
    /// Moves one step; a coordinate past the limit restarts at 0.
    ///
    /// ### 中文
    /// 前进一步；超过上限的坐标回到 0。
    pub fn advance(&mut self) {
        let AnimationConfig { step, limit } = self.config;
        let next = |value: u32| if value > limit { 0 } else { value + step };
        self.x = next(self.x);
        self.y = next(self.y);
    }
}

/// ### English
/// GPU state for the shape variant.
///
/// ### 中文
/// 形状变体的 GPU 状态。
pub struct ShapeRenderer {
    program: ShaderProgram,
    vertices: BufferHandle,
    surface: PhysicalSize<u32>,
    clear_color: [f32; 4],
}

impl ShapeRenderer {
    pub fn new(
        gpu: &dyn Gpu,
        surface: PhysicalSize<u32>,
        clear_color: [f32; 4],
    ) -> Result<Self, RenderError> {
        let program = ShaderProgram::build(gpu, &SHAPE_PROGRAM)?;
        let vertices = match vertex_buffer(gpu, &quad_vertices(surface)) {
            Ok(vertices) => vertices,
            Err(err) => {
                program.delete(gpu);
                return Err(err);
            }
        };

        Ok(Self {
            program,
            vertices,
            surface,
            clear_color,
        })
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    /// ### English
    /// Adopts a new surface size and rebuilds the quad for its aspect ratio.
    ///
    /// ### 中文
    /// 采用新的 surface 尺寸，并按其宽高比重建方块顶点。
    pub fn resize(&mut self, gpu: &dyn Gpu, surface: PhysicalSize<u32>) {
        self.surface = surface;
        gpu.upload_vertices(self.vertices, &quad_vertices(surface));
    }

    /// ### English
    /// Clears to the background color and draws the quad centered on pixel `(x, y)`.
    /// Does not swap buffers.
    ///
    /// ### 中文
    /// 以背景色清屏，并以像素 `(x, y)` 为中心绘制方块。不交换缓冲。
    pub fn draw_at(&self, gpu: &dyn Gpu, x: i32, y: i32) {
        gpu.use_program(Some(self.program.handle()));
        if let Some(index) = self.program.attribute(A_POS) {
            gpu.vertex_attrib(index, self.vertices, 2);
        }

        let viewport = ViewportRect::full(self.surface);
        gpu.viewport(viewport.x, viewport.y, viewport.width, viewport.height);
        gpu.clear_color(self.clear_color);
        gpu.clear();

        if let Some(location) = self.program.uniform(U_OFFSET) {
            let (dx, dy) = pixel_offset(x, y, self.surface);
            gpu.uniform_2f(location, dx, dy);
        }
        gpu.draw_arrays(Primitive::TriangleFan, 0, 4);
    }

    pub fn delete(self, gpu: &dyn Gpu) {
        gpu.delete_buffer(self.vertices);
        self.program.delete(gpu);
    }
}
