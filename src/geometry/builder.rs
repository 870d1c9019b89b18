/// 几何构建模块
///
/// 将解码后的面表 / 顶点表展开为按材质分组的渲染顶点缓冲，
/// 同时生成法线调试线段、线框调试线段和包围盒。
///
/// # 输出布局
///
/// ```text
/// vertices:     [子网格 0 的所有角][子网格 1 的所有角]...
/// normal_lines: 每个角 2 个端点 (p, p + n * normal_length)
/// wire_lines:   每个面 3 条边 (0,1) (1,2) (2,0)，端点沿各自法线偏移 wire_offset
/// ```

use crate::core::config::GeometryConfig;
use crate::core::error::{IndexKind, MeshError, Result};
use crate::math::utils::offset_along;
use crate::span_trace;

use super::mesh::{MeshData, Subset};
use super::vertex::{DebugVertex, RenderVertex};

/// 几何数据来源
///
/// 由解码后的网格表实现；`corner` 返回已转换到渲染坐标系的角顶点。
pub trait GeometrySource {
    /// 面数量
    fn face_count(&self) -> usize;

    /// 指定面的材质索引
    fn face_material(&self, face: usize) -> u16;

    /// 指定面第 `corner` 个角（0..3）的渲染顶点
    ///
    /// 顶点索引越界时返回 [`MeshError::CorruptIndex`]。
    fn corner(&self, face: usize, corner: usize) -> Result<RenderVertex>;
}

/// 线框边的角索引对
const EDGES: [(usize, usize); 3] = [(0, 1), (1, 2), (2, 0)];

/// 几何构建器
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryBuilder {
    /// 法线调试线段长度
    pub normal_length: f32,

    /// 线框端点沿法线的偏移量
    pub wire_offset: f32,
}

impl Default for GeometryBuilder {
    fn default() -> Self {
        Self {
            normal_length: 8.0,
            wire_offset: 0.001,
        }
    }
}

impl From<&GeometryConfig> for GeometryBuilder {
    fn from(config: &GeometryConfig) -> Self {
        Self::new(config.normal_length, config.wire_offset)
    }
}

impl GeometryBuilder {
    pub fn new(normal_length: f32, wire_offset: f32) -> Self {
        Self {
            normal_length,
            wire_offset,
        }
    }

    /// 构建渲染几何
    ///
    /// # 参数
    ///
    /// * `materials` - 材质名称表，只使用其长度；为空时所有面归入子网格 0
    /// * `source` - 面与顶点数据
    ///
    /// # 错误
    ///
    /// 顶点索引越界，或存在材质时材质索引越界，返回 [`MeshError::CorruptIndex`]，
    /// 不产生任何部分结果。
    pub fn build<S: GeometrySource + ?Sized>(
        &self,
        materials: &[String],
        source: &S,
    ) -> Result<MeshData> {
        let span = span_trace!("build_geometry");
        let _guard = span.enter();

        let buckets = bucket_faces(materials.len(), source)?;
        let mut mesh = MeshData::with_face_capacity(source.face_count());

        for (material, faces) in buckets.iter().enumerate() {
            let offset = mesh.vertices.len() as u32;

            for &face in faces {
                let corners = [
                    source.corner(face, 0)?,
                    source.corner(face, 1)?,
                    source.corner(face, 2)?,
                ];
                self.emit_face(&mut mesh, &corners);
            }

            let count = mesh.vertices.len() as u32 - offset;
            mesh.subsets.push(Subset::new(material as u32, offset, count));
        }

        tracing::trace!(
            "Built {} triangles in {} subsets",
            mesh.triangle_count(),
            mesh.subsets.len()
        );

        Ok(mesh)
    }

    fn emit_face(&self, mesh: &mut MeshData, corners: &[RenderVertex; 3]) {
        for corner in corners {
            mesh.vertices.push(*corner);
            mesh.normal_lines.push(DebugVertex::new(corner.position));
            mesh.normal_lines.push(DebugVertex::new(offset_along(
                corner.position,
                corner.normal,
                self.normal_length,
            )));
            mesh.bounds.extend(corner.position);
        }

        for (a, b) in EDGES {
            mesh.wire_lines.push(self.wire_point(&corners[a]));
            mesh.wire_lines.push(self.wire_point(&corners[b]));
        }
    }

    #[inline]
    fn wire_point(&self, corner: &RenderVertex) -> DebugVertex {
        DebugVertex::new(offset_along(corner.position, corner.normal, self.wire_offset))
    }
}

/// 按材质索引分桶，桶内保持文件顺序
fn bucket_faces<S: GeometrySource + ?Sized>(
    material_count: usize,
    source: &S,
) -> Result<Vec<Vec<usize>>> {
    let mut buckets = vec![Vec::new(); material_count.max(1)];

    for face in 0..source.face_count() {
        if material_count == 0 {
            buckets[0].push(face);
            continue;
        }

        let material = source.face_material(face);
        let bucket = buckets
            .get_mut(material as usize)
            .ok_or(MeshError::CorruptIndex {
                face,
                kind: IndexKind::Material {
                    index: material,
                    count: material_count as u32,
                },
            })?;
        bucket.push(face);
    }

    Ok(buckets)
}
