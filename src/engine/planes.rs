//! ### English
//! YUV 4:2:0 plane buffers and their GPU textures.
//!
//! ### 中文
//! YUV 4:2:0 平面缓冲及其 GPU 纹理。

use dpi::PhysicalSize;

use super::error::RenderError;
use super::frame::YuvFrame;
use super::gpu::{Gpu, NO_ERROR, PlaneFormat, TextureHandle};

/// ### English
/// Size of each chroma plane: half the luma size per axis, rounded down.
///
/// ### 中文
/// 每个色度平面的尺寸：每个轴为亮度尺寸的一半，向下取整。
pub fn chroma_size(size: PhysicalSize<u32>) -> PhysicalSize<u32> {
    PhysicalSize::new(size.width / 2, size.height / 2)
}

/// ### English
/// Byte counts of the Y plane and of each chroma plane.
///
/// ### 中文
/// Y 平面以及每个色度平面的字节数。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PlaneSizes {
    pub luma: usize,
    pub chroma: usize,
}

impl PlaneSizes {
    pub fn total(&self) -> usize {
        self.luma + 2 * self.chroma
    }
}

pub fn plane_sizes(size: PhysicalSize<u32>) -> PlaneSizes {
    let chroma = chroma_size(size);
    PlaneSizes {
        luma: area(size),
        chroma: area(chroma),
    }
}

fn area(size: PhysicalSize<u32>) -> usize {
    size.width as usize * size.height as usize
}

/// ### English
/// Zero-initialized Y/U/V planes.
///
/// ### 中文
/// 零初始化的 Y/U/V 平面。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaneBuffers {
    pub y: Vec<u8>,
    pub u: Vec<u8>,
    pub v: Vec<u8>,
}

/// ### English
/// Allocates zeroed planes for a `width` x `height` frame.
///
/// ### 中文
/// 为 `width` x `height` 的帧分配零初始化的平面。
pub fn allocate_planes(width: u32, height: u32) -> PlaneBuffers {
    let sizes = plane_sizes(PhysicalSize::new(width, height));
    PlaneBuffers {
        y: vec![0; sizes.luma],
        u: vec![0; sizes.chroma],
        v: vec![0; sizes.chroma],
    }
}

/// ### English
/// Stale GL error flags drained before an upload; a lost context may report errors forever.
///
/// ### 中文
/// 上传前最多清除的遗留 GL 错误标志数；丢失的上下文可能一直报告错误。
const MAX_STALE_ERRORS: usize = 8;

/// ### English
/// Binds `texture` on `unit` and respecifies it from `data`.
///
/// `data` must hold exactly `width * height * bytes_per_pixel(format)` bytes. Errors left by
/// earlier calls are cleared first; a GL error raised by the upload is reported as an
/// allocation failure.
///
/// #### Parameters
/// - `gpu`: GL command seam (context must be current).
/// - `unit`: Texture unit index (`GL_TEXTURE0 + unit`).
/// - `texture`: Texture receiving the plane.
/// - `data`: Tightly packed plane bytes.
/// - `size`: Plane size in texels.
/// - `format`: Single-channel luminance or RGBA.
///
/// ### 中文
/// 在 `unit` 上绑定 `texture`，并用 `data` 重新指定其内容。
///
/// `data` 必须恰好包含 `width * height * bytes_per_pixel(format)` 个字节。
/// 先清除之前调用遗留的错误；上传引发的 GL 错误报告为分配失败。
///
/// #### 参数
/// - `gpu`：GL 命令接缝（上下文必须 current）。
/// - `unit`：纹理单元索引（`GL_TEXTURE0 + unit`）。
/// - `texture`：接收平面数据的纹理。
/// - `data`：紧密排列的平面字节。
/// - `size`：平面尺寸（纹素）。
/// - `format`：单通道 luminance 或 RGBA。
pub fn upload_plane(
    gpu: &dyn Gpu,
    unit: u32,
    texture: TextureHandle,
    data: &[u8],
    size: PhysicalSize<u32>,
    format: PlaneFormat,
) -> Result<(), RenderError> {
    let expected = area(size) * format.bytes_per_pixel();
    if data.len() != expected {
        return Err(RenderError::FrameSize {
            what: "plane",
            expected,
            actual: data.len(),
        });
    }

    discard_stale_errors(gpu);
    gpu.bind_texture_unit(unit, texture);
    gpu.tex_image_2d(size.width, size.height, format, data);

    match gpu.get_error() {
        NO_ERROR => Ok(()),
        code => Err(RenderError::Allocation(format!(
            "glTexImage2D on unit {unit} returned 0x{code:04x}"
        ))),
    }
}

fn discard_stale_errors(gpu: &dyn Gpu) {
    for _ in 0..MAX_STALE_ERRORS {
        match gpu.get_error() {
            NO_ERROR => return,
            code => tracing::debug!(code = %format!("{code:#06x}"), "discarding stale GL error"),
        }
    }
}

/// ### English
/// The three plane textures of a YUV session, bound to units 0, 1, 2.
///
/// ### 中文
/// YUV 会话的三个平面纹理，分别绑定到单元 0、1、2。
#[derive(Debug)]
pub struct PlaneTextures {
    textures: [TextureHandle; 3],
}

impl PlaneTextures {
    pub fn create(gpu: &dyn Gpu) -> Result<Self, RenderError> {
        let mut created = Vec::with_capacity(3);
        for _ in 0..3 {
            match gpu.create_texture() {
                Ok(texture) => created.push(texture),
                Err(reason) => {
                    for texture in created {
                        gpu.delete_texture(texture);
                    }
                    return Err(RenderError::Allocation(reason));
                }
            }
        }

        Ok(Self {
            textures: [created[0], created[1], created[2]],
        })
    }

    /// ### English
    /// Uploads Y to unit 0 and U/V (at chroma size) to units 1 and 2. Stops at the first failure.
    ///
    /// ### 中文
    /// 将 Y 上传到单元 0，U/V（色度尺寸）上传到单元 1 与 2。遇到第一个失败即停止。
    pub fn upload(&self, gpu: &dyn Gpu, frame: &YuvFrame) -> Result<(), RenderError> {
        let chroma = chroma_size(frame.size());
        let planes = [
            (frame.y(), frame.size()),
            (frame.u(), chroma),
            (frame.v(), chroma),
        ];

        for (unit, ((data, size), texture)) in planes.into_iter().zip(self.textures).enumerate() {
            upload_plane(gpu, unit as u32, texture, data, size, PlaneFormat::Luminance)?;
        }
        Ok(())
    }

    pub fn handles(&self) -> [TextureHandle; 3] {
        self.textures
    }

    pub fn delete(self, gpu: &dyn Gpu) {
        for texture in self.textures {
            gpu.delete_texture(texture);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{GpuCall, RecordingGpu};

    #[test]
    fn plane_sizes_floor_odd_dimensions() {
        let sizes = plane_sizes(PhysicalSize::new(1281, 721));
        assert_eq!(sizes.luma, 1281 * 721);
        assert_eq!(sizes.chroma, 640 * 360);
        assert_eq!(chroma_size(PhysicalSize::new(1, 1)), PhysicalSize::new(0, 0));
    }

    #[test]
    fn allocate_planes_zero_sized() {
        let planes = allocate_planes(0, 0);
        assert!(planes.y.is_empty());
        assert!(planes.u.is_empty());
        assert!(planes.v.is_empty());
    }

    #[test]
    fn allocate_planes_is_zeroed() {
        let planes = allocate_planes(4, 2);
        assert_eq!(planes.y, vec![0; 8]);
        assert_eq!(planes.u, vec![0; 2]);
        assert_eq!(planes.v, vec![0; 2]);
    }

    #[test]
    fn uploaded_plane_reads_back_identically() {
        let gpu = RecordingGpu::new();
        let texture = gpu.create_texture().unwrap();
        let data: Vec<u8> = (0..=255).cycle().take(64 * 16).collect();

        upload_plane(
            &gpu,
            1,
            texture,
            &data,
            PhysicalSize::new(64, 16),
            PlaneFormat::Luminance,
        )
        .unwrap();

        let log = gpu.log.lock();
        assert_eq!(log.textures[&texture.get()], data);
        assert_eq!(
            log.calls[0],
            GpuCall::BindTextureUnit {
                unit: 1,
                texture: texture.get(),
            }
        );
    }

    #[test]
    fn rgba_plane_needs_four_bytes_per_texel() {
        let gpu = RecordingGpu::new();
        let texture = gpu.create_texture().unwrap();
        let size = PhysicalSize::new(2, 2);

        let err = upload_plane(&gpu, 0, texture, &[0; 4], size, PlaneFormat::Rgba).unwrap_err();
        assert_eq!(
            err,
            RenderError::FrameSize {
                what: "plane",
                expected: 16,
                actual: 4,
            }
        );
        assert!(gpu.log.lock().calls.is_empty());

        upload_plane(&gpu, 0, texture, &[7; 16], size, PlaneFormat::Rgba).unwrap();
        assert_eq!(gpu.log.lock().textures[&texture.get()], vec![7; 16]);
    }

    #[test]
    fn gl_error_after_upload_is_allocation_failure() {
        let gpu = RecordingGpu::new();
        let texture = gpu.create_texture().unwrap();
        gpu.log.lock().fail_tex_uploads = 1;

        let err = upload_plane(
            &gpu,
            2,
            texture,
            &[1; 4],
            PhysicalSize::new(2, 2),
            PlaneFormat::Luminance,
        )
        .unwrap_err();
        assert_eq!(err.kind(), "allocation");
        assert!(!gpu.log.lock().textures.contains_key(&texture.get()));
    }

    #[test]
    fn stale_gl_error_does_not_fail_upload() {
        const GL_INVALID_OPERATION: u32 = 0x0502;
        let gpu = RecordingGpu::new();
        let texture = gpu.create_texture().unwrap();
        gpu.log.lock().pending_error = GL_INVALID_OPERATION;

        upload_plane(
            &gpu,
            0,
            texture,
            &[9; 4],
            PhysicalSize::new(2, 2),
            PlaneFormat::Luminance,
        )
        .unwrap();
        assert_eq!(gpu.log.lock().textures[&texture.get()], vec![9; 4]);
    }

    #[test]
    fn frame_upload_targets_units_in_plane_order() {
        let gpu = RecordingGpu::new();
        let textures = PlaneTextures::create(&gpu).unwrap();
        let frame = YuvFrame::zeroed(PhysicalSize::new(6, 4));

        textures.upload(&gpu, &frame).unwrap();

        {
            let log = gpu.log.lock();
            let uploads: Vec<_> = log
                .calls
                .iter()
                .filter_map(|call| match call {
                    GpuCall::TexImage { width, height, .. } => Some((*width, *height)),
                    _ => None,
                })
                .collect();
            assert_eq!(uploads, vec![(6, 4), (3, 2), (3, 2)]);
            for (unit, texture) in textures.handles().iter().enumerate() {
                assert!(log.calls.contains(&GpuCall::BindTextureUnit {
                    unit: unit as u32,
                    texture: texture.get(),
                }));
            }
        }

        textures.delete(&gpu);
        assert_eq!(gpu.log.lock().live_textures, 0);
    }
}
