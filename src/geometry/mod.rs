/// 几何构建与加载模块
///
/// 将 CSM 文件中的面表 / 顶点表转换为可直接上传的渲染缓冲。
///
/// # 模块结构
///
/// - `vertex`: 渲染顶点和调试线段顶点
/// - `bounds`: 轴对齐包围盒
/// - `mesh`: 网格数据、子网格和加载统计
/// - `builder`: 按材质分组的几何构建
/// - `loaders`: 文件加载器
///
/// # 架构设计
///
/// ```text
/// 文件 (CSM v2/v3)
///     ↓
/// CsmLoader (探测版本 → AnyCodec)
///     ↓
/// GeometryBuilder
///     ↓
/// MeshData (CPU侧数据)
///     ↓
/// 渲染层 (vertex_bytes / normal_line_bytes / wire_line_bytes)
/// ```
///
/// # 使用示例
///
/// ```rust,no_run
/// use compiled_mesh::geometry::loaders::load_mesh;
/// use std::path::Path;
///
/// let loaded = load_mesh(Path::new("model.csm"))?;
///
/// println!("顶点数: {}", loaded.mesh.vertex_count());
/// println!("三角形数: {}", loaded.mesh.triangle_count());
///
/// # Ok::<(), compiled_mesh::core::CsmError>(())
/// ```

pub mod vertex;
pub mod bounds;
pub mod mesh;
pub mod builder;
pub mod loaders;

// 重新导出常用类型
pub use bounds::BoundingBox;
pub use builder::{GeometryBuilder, GeometrySource};
pub use mesh::{LoadedMesh, MeshData, MeshInfo, Subset};
pub use vertex::{DebugVertex, RenderVertex};
