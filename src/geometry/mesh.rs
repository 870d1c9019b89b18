/// 网格数据结构模块
///
/// 定义几何构建的输出：按材质分组的渲染顶点缓冲、调试线段缓冲和包围盒，
/// 以及加载过程中收集的文件统计信息。

use std::path::PathBuf;

use super::bounds::BoundingBox;
use super::vertex::{DebugVertex, RenderVertex};

/// 子网格描述符
///
/// 渲染顶点缓冲中属于同一材质的一段连续区间。
///
/// # 示例
///
/// ```rust
/// use compiled_mesh::geometry::mesh::Subset;
///
/// // 材质 1 从第 3 个顶点开始，共 6 个顶点（2 个三角形）
/// let subset = Subset::new(1, 3, 6);
/// assert_eq!(subset.face_count(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subset {
    /// 材质索引
    pub material: u32,

    /// 在渲染顶点缓冲中的起始位置
    pub offset: u32,

    /// 顶点数量（三角形数 * 3）
    pub count: u32,
}

impl Subset {
    /// 创建一个新的子网格描述符
    #[inline]
    pub fn new(material: u32, offset: u32, count: u32) -> Self {
        Self {
            material,
            offset,
            count,
        }
    }

    /// 起始三角形索引
    #[inline]
    pub fn face_start(&self) -> u32 {
        self.offset / 3
    }

    /// 三角形数量
    #[inline]
    pub fn face_count(&self) -> u32 {
        self.count / 3
    }

    /// 区间末尾（不含）
    #[inline]
    pub fn end(&self) -> u32 {
        self.offset + self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// 构建后的网格数据
///
/// 非索引的三角形列表：每个面展开为 3 个渲染顶点，按子网格顺序排列。
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// 渲染顶点缓冲（3 * 面数）
    pub vertices: Vec<RenderVertex>,

    /// 子网格列表，按材质索引升序，连续覆盖整个顶点缓冲
    pub subsets: Vec<Subset>,

    /// 法线调试线段，每个角两个端点
    pub normal_lines: Vec<DebugVertex>,

    /// 线框调试线段，每个面 3 条边、每条边两个端点
    pub wire_lines: Vec<DebugVertex>,

    /// 所有输出顶点的包围盒
    pub bounds: BoundingBox,
}

impl MeshData {
    /// 创建一个空的网格数据
    pub fn new() -> Self {
        Self::default()
    }

    /// 按面数预分配各缓冲
    pub fn with_face_capacity(faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(faces * 3),
            subsets: Vec::new(),
            normal_lines: Vec::with_capacity(faces * 6),
            wire_lines: Vec::with_capacity(faces * 6),
            bounds: BoundingBox::empty(),
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// 渲染顶点缓冲的原始字节
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// 法线线段缓冲的原始字节
    pub fn normal_line_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normal_lines)
    }

    /// 线框缓冲的原始字节
    pub fn wire_line_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.wire_lines)
    }

    /// 检查子网格是否恰好、连续地划分了顶点缓冲
    ///
    /// # 返回
    ///
    /// - `Ok(())`: 数据有效
    /// - `Err(String)`: 数据无效，返回错误描述
    pub fn validate(&self) -> Result<(), String> {
        if self.vertices.len() % 3 != 0 {
            return Err(format!(
                "渲染顶点数量必须是3的倍数，当前为: {}",
                self.vertices.len()
            ));
        }

        let mut expected_offset = 0u32;
        for (i, subset) in self.subsets.iter().enumerate() {
            if subset.offset != expected_offset {
                return Err(format!(
                    "子网格 {} 不连续: offset={}, 期望 {}",
                    i, subset.offset, expected_offset
                ));
            }
            if i > 0 && subset.material <= self.subsets[i - 1].material {
                return Err(format!("子网格 {} 的材质索引未按升序排列", i));
            }
            expected_offset = subset.end();
        }

        if expected_offset as usize != self.vertices.len() {
            return Err(format!(
                "子网格覆盖 {} 个顶点，缓冲共有 {} 个",
                expected_offset,
                self.vertices.len()
            ));
        }

        if self.normal_lines.len() != self.vertices.len() * 2 {
            return Err("法线线段数量与顶点数量不匹配".to_string());
        }

        if self.wire_lines.len() != self.vertices.len() * 2 {
            return Err("线框线段数量与顶点数量不匹配".to_string());
        }

        Ok(())
    }

    /// 清空所有数据
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.subsets.clear();
        self.normal_lines.clear();
        self.wire_lines.clear();
        self.bounds = BoundingBox::empty();
    }
}

/// 加载过程中收集的文件信息
#[derive(Debug, Clone, Default)]
pub struct MeshInfo {
    /// 网格文件路径（从内存加载时为空）
    pub path: Option<PathBuf>,

    /// 网格文件所在目录
    pub directory: Option<PathBuf>,

    pub version: u32,
    pub flags: u32,
    pub face_count: u32,

    /// 面表字节数（面数 * 面记录大小）
    pub face_data_size: u32,

    pub vertex_count: u32,

    /// 顶点表字节数（顶点数 * 顶点记录大小）
    pub vertex_data_size: u32,

    /// 材质名称，下标即材质索引
    pub materials: Vec<String>,

    /// 纹理搜索目录，网格所在目录在最前
    pub material_directories: Vec<PathBuf>,

    /// 渲染坐标系下的包围盒
    pub bounding_box: BoundingBox,
}

impl MeshInfo {
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}

/// 一次成功加载的结果
#[derive(Debug, Clone)]
pub struct LoadedMesh {
    pub info: MeshInfo,
    pub mesh: MeshData,
}
