//! ### English
//! Validated YUV 4:2:0 frames and the latest-frame handoff slot.
//!
//! ### 中文
//! 经过校验的 YUV 4:2:0 帧，以及最新帧交接槽。

mod slot;

use dpi::PhysicalSize;

pub use slot::FrameSlot;

use super::error::RenderError;
use super::planes::{allocate_planes, plane_sizes};

/// ### English
/// One planar YUV 4:2:0 frame. Plane lengths always match `size`.
///
/// ### 中文
/// 一帧平面 YUV 4:2:0 数据。各平面长度始终与 `size` 一致。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YuvFrame {
    size: PhysicalSize<u32>,
    y: Vec<u8>,
    u: Vec<u8>,
    v: Vec<u8>,
}

impl YuvFrame {
    /// ### English
    /// All-zero frame (renders as the matrix image of YUV `(0, 0, 0)`).
    ///
    /// ### 中文
    /// 全零帧（渲染结果为 YUV `(0, 0, 0)` 经矩阵换算后的颜色）。
    pub fn zeroed(size: PhysicalSize<u32>) -> Self {
        let planes = allocate_planes(size.width, size.height);
        Self {
            size,
            y: planes.y,
            u: planes.u,
            v: planes.v,
        }
    }

    /// ### English
    /// Builds a frame from separate planes, checking each length.
    ///
    /// #### Parameters
    /// - `size`: Luma size in pixels.
    /// - `y`: `width * height` bytes.
    /// - `u`, `v`: `(width / 2) * (height / 2)` bytes each.
    ///
    /// ### 中文
    /// 由独立平面构造帧，并逐一校验长度。
    ///
    /// #### 参数
    /// - `size`：亮度尺寸（像素）。
    /// - `y`：`width * height` 字节。
    /// - `u`、`v`：各 `(width / 2) * (height / 2)` 字节。
    pub fn from_planes(
        size: PhysicalSize<u32>,
        y: Vec<u8>,
        u: Vec<u8>,
        v: Vec<u8>,
    ) -> Result<Self, RenderError> {
        let sizes = plane_sizes(size);
        check_len("Y plane", sizes.luma, y.len())?;
        check_len("U plane", sizes.chroma, u.len())?;
        check_len("V plane", sizes.chroma, v.len())?;
        Ok(Self { size, y, u, v })
    }

    /// ### English
    /// Splits the legacy packed layout: `width * height` Y bytes followed by interleaved
    /// `(V, U)` pairs, one pair per chroma sample.
    ///
    /// ### 中文
    /// 拆分旧版打包布局：先是 `width * height` 个 Y 字节，其后为交错的 `(V, U)` 字节对，
    /// 每个色度采样一对。
    pub fn from_legacy_bytes(size: PhysicalSize<u32>, bytes: &[u8]) -> Result<Self, RenderError> {
        let sizes = plane_sizes(size);
        check_len("legacy frame", sizes.total(), bytes.len())?;

        let (y, chroma) = bytes.split_at(sizes.luma);
        let mut u = Vec::with_capacity(sizes.chroma);
        let mut v = Vec::with_capacity(sizes.chroma);
        for pair in chroma.chunks_exact(2) {
            v.push(pair[0]);
            u.push(pair[1]);
        }

        Ok(Self {
            size,
            y: y.to_vec(),
            u,
            v,
        })
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn y(&self) -> &[u8] {
        &self.y
    }

    pub fn u(&self) -> &[u8] {
        &self.u
    }

    pub fn v(&self) -> &[u8] {
        &self.v
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), RenderError> {
    if expected == actual {
        Ok(())
    } else {
        Err(RenderError::FrameSize {
            what,
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_layout_deinterleaves_v_then_u() {
        let size = PhysicalSize::new(4, 2);
        let mut bytes: Vec<u8> = (1..=8).collect();
        bytes.extend_from_slice(&[0xa0, 0xb0, 0xa1, 0xb1]);

        let frame = YuvFrame::from_legacy_bytes(size, &bytes).unwrap();
        assert_eq!(frame.y(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(frame.v(), &[0xa0, 0xa1]);
        assert_eq!(frame.u(), &[0xb0, 0xb1]);
    }

    #[test]
    fn legacy_layout_rejects_short_buffer() {
        let err = YuvFrame::from_legacy_bytes(PhysicalSize::new(4, 2), &[0; 11]).unwrap_err();
        assert_eq!(
            err,
            RenderError::FrameSize {
                what: "legacy frame",
                expected: 12,
                actual: 11,
            }
        );
    }

    #[test]
    fn from_planes_names_the_bad_plane() {
        let size = PhysicalSize::new(3, 3);
        let err = YuvFrame::from_planes(size, vec![0; 9], vec![0; 1], vec![0; 2]).unwrap_err();
        assert_eq!(
            err,
            RenderError::FrameSize {
                what: "V plane",
                expected: 1,
                actual: 2,
            }
        );

        let frame = YuvFrame::from_planes(size, vec![0; 9], vec![1], vec![2]).unwrap();
        let mut legacy = vec![0; 9];
        legacy.extend_from_slice(&[2, 1]);
        assert_eq!(frame, YuvFrame::from_legacy_bytes(size, &legacy).unwrap());
    }

    #[test]
    fn zeroed_frame_matches_plane_sizes() {
        let frame = YuvFrame::zeroed(PhysicalSize::new(1280, 720));
        assert_eq!(frame.y().len(), 1280 * 720);
        assert_eq!(frame.u().len(), 640 * 360);
        assert!(frame.v().iter().all(|&b| b == 0));
    }
}
