//! ### English
//! GLSL ES 1.00 sources for the YUV and shape programs.
//!
//! ### 中文
//! YUV 程序与形状程序的 GLSL ES 1.00 源码。

use super::program::ProgramSource;

pub const A_POSITION: &str = "aPosition";
pub const A_TEX_COOR: &str = "aTexCoor";
pub const U_MVP_MATRIX: &str = "uMVPMatrix";
pub const U_YUV_TO_RGB: &str = "uYuvToRgb";
pub const U_YUV_OFFSET: &str = "uYuvOffset";
/// ### English
/// Samplers for the Y, U and V planes, in texture-unit order.
///
/// ### 中文
/// Y、U、V 平面的采样器，按纹理单元顺序排列。
pub const PLANE_SAMPLERS: [&str; 3] = ["yTexture", "uTexture", "vTexture"];

pub const A_POS: &str = "pos";
pub const U_OFFSET: &str = "offset";

const YUV_VERTEX: &str = "\
attribute vec3 aPosition;
attribute vec2 aTexCoor;
uniform mat4 uMVPMatrix;
varying vec2 vTexCoor;
void main() {
    gl_Position = uMVPMatrix * vec4(aPosition, 1.0);
    vTexCoor = aTexCoor;
}
";

const YUV_FRAGMENT: &str = "\
precision mediump float;
uniform sampler2D yTexture;
uniform sampler2D uTexture;
uniform sampler2D vTexture;
uniform mat3 uYuvToRgb;
uniform vec3 uYuvOffset;
varying vec2 vTexCoor;
void main() {
    vec3 yuv = vec3(
        texture2D(yTexture, vTexCoor).r,
        texture2D(uTexture, vTexCoor).r,
        texture2D(vTexture, vTexCoor).r);
    gl_FragColor = vec4(uYuvToRgb * (yuv - uYuvOffset), 1.0);
}
";

const SHAPE_VERTEX: &str = "\
attribute vec4 pos;
uniform vec2 offset;
void main() {
    gl_Position = pos + vec4(offset.x, offset.y, 0.0, 0.0);
}
";

const SHAPE_FRAGMENT: &str = "\
precision mediump float;
void main() {
    gl_FragColor = vec4(0.0, 1.0, 0.0, 1.0);
}
";

pub const YUV_PROGRAM: ProgramSource = ProgramSource {
    vertex: YUV_VERTEX,
    fragment: YUV_FRAGMENT,
    attributes: &[(0, A_POSITION), (1, A_TEX_COOR)],
    uniforms: &[
        U_MVP_MATRIX,
        U_YUV_TO_RGB,
        U_YUV_OFFSET,
        PLANE_SAMPLERS[0],
        PLANE_SAMPLERS[1],
        PLANE_SAMPLERS[2],
    ],
};

pub const SHAPE_PROGRAM: ProgramSource = ProgramSource {
    vertex: SHAPE_VERTEX,
    fragment: SHAPE_FRAGMENT,
    attributes: &[(0, A_POS)],
    uniforms: &[U_OFFSET],
};
