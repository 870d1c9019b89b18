/// 渲染顶点定义模块
///
/// 定义几何构建输出的顶点结构。内存布局与GPU兼容，使用 `#[repr(C)]`
/// 保证顺序和对齐，可直接通过 `bytemuck` 转换为字节交给渲染层。

use bytemuck::{Pod, Zeroable};

/// 渲染顶点
///
/// # 内存布局
///
/// - position: 12 bytes (3 * f32)
/// - texcoord: 8 bytes (2 * f32)
/// - normal: 12 bytes (3 * f32)
/// - **总计**: 32 bytes（步长 8 个 f32）
///
/// # 示例
///
/// ```rust
/// use compiled_mesh::geometry::vertex::RenderVertex;
///
/// let vertex = RenderVertex {
///     position: [0.0, 1.0, 0.0],
///     texcoord: [0.5, 0.5],
///     normal: [0.0, 1.0, 0.0],
/// };
/// ```
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct RenderVertex {
    /// 顶点位置 (x, y, z)，已交换为渲染坐标系
    pub position: [f32; 3],

    /// 纹理坐标 (u, v)
    pub texcoord: [f32; 2],

    /// 法线向量 (nx, ny, nz)，已交换为渲染坐标系
    pub normal: [f32; 3],
}

impl RenderVertex {
    /// 创建一个新的顶点
    #[inline]
    pub fn new(position: [f32; 3], texcoord: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            texcoord,
            normal,
        }
    }
}

/// 调试线段顶点（法线线段 / 线框）
///
/// 只有位置属性，步长 12 字节，按线段两两成对。
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct DebugVertex {
    pub position: [f32; 3],
}

impl DebugVertex {
    #[inline]
    pub fn new(position: [f32; 3]) -> Self {
        Self { position }
    }
}
