//! ### English
//! Aspect-preserving viewport layout for rotated content.
//!
//! ### 中文
//! 针对旋转内容的保持宽高比的 viewport 布局。

use dpi::PhysicalSize;

/// ### English
/// Display rotation of the content, in quarter turns.
///
/// ### 中文
/// 内容的显示旋转角度（以四分之一圈计）。
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    #[default]
    Deg270,
}

impl Rotation {
    /// ### English
    /// Parses an angle in degrees; anything that is not a multiple of 90 is rejected.
    ///
    /// ### 中文
    /// 解析角度（度）；不是 90 的倍数则返回 `None`。
    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees % 360 {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// ### English
    /// Whether the content's width and height swap on screen.
    ///
    /// ### 中文
    /// 内容的宽高在屏幕上是否互换。
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

/// ### English
/// GL viewport in surface pixels.
///
/// ### 中文
/// 以 surface 像素表示的 GL viewport。
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ViewportRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ViewportRect {
    /// ### English
    /// Whole-surface viewport.
    ///
    /// ### 中文
    /// 覆盖整个 surface 的 viewport。
    pub fn full(surface: PhysicalSize<u32>) -> Self {
        Self {
            x: 0,
            y: 0,
            width: surface.width,
            height: surface.height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// ### English
/// Fits the content into the surface, keeping its aspect ratio after rotation.
///
/// The content ratio is `width / height` for quarter turns and `height / width` otherwise; it is
/// compared with the surface's `height / width`. A taller-than-content surface is
/// width-constrained, otherwise height-constrained. Computed in `f32` and truncated toward zero.
/// The rect is anchored at the origin. Zero-sized content or surface yields an empty rect.
///
/// #### Parameters
/// - `content`: Frame size as decoded (before rotation).
/// - `surface`: Window surface size.
/// - `rotation`: Display rotation of the content.
///
/// ### 中文
/// 将内容放入 surface，并在旋转后保持其宽高比。
///
/// 四分之一圈旋转时内容比例为 `width / height`，否则为 `height / width`；与 surface 的
/// `height / width` 比较。surface 比内容更“高”时按宽度约束，否则按高度约束。
/// 以 `f32` 计算并向零截断。结果锚定在原点。内容或 surface 尺寸为零时返回空矩形。
///
/// #### 参数
/// - `content`：解码后的帧尺寸（旋转前）。
/// - `surface`：window surface 尺寸。
/// - `rotation`：内容的显示旋转。
pub fn compute_viewport(
    content: PhysicalSize<u32>,
    surface: PhysicalSize<u32>,
    rotation: Rotation,
) -> ViewportRect {
    if content.width == 0 || content.height == 0 || surface.width == 0 || surface.height == 0 {
        return ViewportRect::default();
    }

    let (content_w, content_h) = (content.width as f32, content.height as f32);
    let (surface_w, surface_h) = (surface.width as f32, surface.height as f32);

    let radio = if rotation.is_quarter_turn() {
        content_w / content_h
    } else {
        content_h / content_w
    };
    let v_radio = surface_h / surface_w;

    let (width, height) = if v_radio < radio {
        let height = surface_h;
        (height / radio, height)
    } else {
        let width = surface_w;
        (width, width * radio)
    };

    ViewportRect {
        x: 0,
        y: 0,
        width: width as u32,
        height: height as u32,
    }
}
