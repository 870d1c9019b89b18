//! 轴对齐包围盒

use crate::math::utils::{to_array3, to_vector3};
use crate::math::Vector3;

/// 轴对齐包围盒
///
/// 初始为空：`min = +inf`、`max = -inf`，随 [`extend`](Self::extend) 单调扩展。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vector3,
    pub max: Vector3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    /// 空包围盒
    pub fn empty() -> Self {
        Self {
            min: Vector3::repeat(f32::INFINITY),
            max: Vector3::repeat(f32::NEG_INFINITY),
        }
    }

    /// 尚未包含任何点
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// 将一个点并入包围盒
    pub fn extend(&mut self, point: [f32; 3]) {
        let p = to_vector3(point);
        self.min = self.min.inf(&p);
        self.max = self.max.sup(&p);
    }

    pub fn min_array(&self) -> [f32; 3] {
        to_array3(&self.min)
    }

    pub fn max_array(&self) -> [f32; 3] {
        to_array3(&self.max)
    }

    /// 中心点；空包围盒返回 `None`
    pub fn center(&self) -> Option<Vector3> {
        (!self.is_empty()).then(|| (self.min + self.max) * 0.5)
    }

    /// 尺寸；空包围盒返回 `None`
    pub fn size(&self) -> Option<Vector3> {
        (!self.is_empty()).then(|| self.max - self.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_box() {
        let bounds = BoundingBox::empty();
        assert!(bounds.is_empty());
        assert!(bounds.center().is_none());
        assert_eq!(bounds.min.x, f32::INFINITY);
        assert_eq!(bounds.max.x, f32::NEG_INFINITY);
    }

    #[test]
    fn test_extend() {
        let mut bounds = BoundingBox::empty();
        bounds.extend([0.0, 0.0, 0.0]);
        bounds.extend([1.0, 2.0, 3.0]);
        bounds.extend([-1.0, 5.0, 0.0]);

        assert_eq!(bounds.min_array(), [-1.0, 0.0, 0.0]);
        assert_eq!(bounds.max_array(), [1.0, 5.0, 3.0]);
        assert_eq!(bounds.size(), Some(Vector3::new(2.0, 5.0, 3.0)));
    }

    #[test]
    fn test_single_negative_point() {
        // 全负坐标也必须被正确记录为最大值
        let mut bounds = BoundingBox::empty();
        bounds.extend([-3.0, -4.0, -5.0]);
        assert_eq!(bounds.max_array(), [-3.0, -4.0, -5.0]);
        assert!(!bounds.is_empty());
    }
}
