//! 数学类型模块
//!
//! 基于 `nalgebra` 提供几何构建用到的少量类型和函数。
//! 顶点缓冲使用 `[f32; N]` 数组（保证 `Pod`），运算时再转换为 nalgebra 向量。

pub use nalgebra::{Vector3 as Vec3, Vector4 as Vec4};

// 类型别名，使用更简洁的名称
pub type Vector3 = Vec3<f32>;
pub type Vector4 = Vec4<f32>;

/// 颜色类型（RGBA，范围 0.0-1.0）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// 创建新的颜色
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// 从整数值创建颜色（0-255）
    pub fn from_rgba_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// 转换为 Vector4
    pub fn to_vec4(&self) -> Vector4 {
        Vector4::new(self.r, self.g, self.b, self.a)
    }

    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
}

/// 数学常量
pub mod constants {
    /// 浮点数比较的 epsilon
    pub const EPSILON: f32 = 1e-6;
}

/// 数学工具函数
pub mod utils {
    use super::*;

    /// 近似相等比较
    pub fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
        (a - b).abs() < epsilon
    }

    /// 数组转 nalgebra 向量
    #[inline]
    pub fn to_vector3(v: [f32; 3]) -> Vector3 {
        Vector3::new(v[0], v[1], v[2])
    }

    /// nalgebra 向量转数组
    #[inline]
    pub fn to_array3(v: &Vector3) -> [f32; 3] {
        [v.x, v.y, v.z]
    }

    /// 沿方向偏移一个点：`point + direction * distance`
    #[inline]
    pub fn offset_along(point: [f32; 3], direction: [f32; 3], distance: f32) -> [f32; 3] {
        to_array3(&(to_vector3(point) + to_vector3(direction) * distance))
    }
}
