//! ### English
//! YUV to RGB conversion constants shared by the fragment shader uniforms and the CPU reference.
//!
//! ### 中文
//! YUV 转 RGB 的常量，供片元着色器 uniform 与 CPU 参考实现共用。

/// ### English
/// Conversion matrix, column-major (`mat3` uniform layout).
///
/// ### 中文
/// 转换矩阵，列主序（`mat3` uniform 布局）。
pub const YUV_TO_RGB: [f32; 9] = [
    1.0, 1.0, 1.0, //
    -0.001, -0.3441, 1.772, //
    1.402, -0.7141, 0.001,
];

/// ### English
/// Subtracted from the sampled `(Y, U, V)` before the matrix is applied.
///
/// ### 中文
/// 在应用矩阵之前，从采样得到的 `(Y, U, V)` 中减去。
pub const YUV_OFFSET: [f32; 3] = [16.0 / 255.0, 128.0 / 255.0, 128.0 / 255.0];

/// ### English
/// CPU evaluation of `clamp(M * (yuv - offset), 0, 1)`, matching what the fragment shader writes.
///
/// #### Parameters
/// - `yuv`: Normalized samples in `[0, 1]`.
///
/// ### 中文
/// 在 CPU 上计算 `clamp(M * (yuv - offset), 0, 1)`，与片元着色器的输出一致。
///
/// #### 参数
/// - `yuv`：归一化采样值，范围 `[0, 1]`。
pub fn yuv_to_rgb(yuv: [f32; 3]) -> [f32; 3] {
    let d = [
        yuv[0] - YUV_OFFSET[0],
        yuv[1] - YUV_OFFSET[1],
        yuv[2] - YUV_OFFSET[2],
    ];

    let mut rgb = [0.0; 3];
    for (row, out) in rgb.iter_mut().enumerate() {
        let value = (0..3).map(|col| YUV_TO_RGB[col * 3 + row] * d[col]).sum::<f32>();
        *out = value.clamp(0.0, 1.0);
    }
    rgb
}

pub fn yuv_bytes_to_rgb(y: u8, u: u8, v: u8) -> [f32; 3] {
    yuv_to_rgb([y, u, v].map(|b| f32::from(b) / 255.0))
}
