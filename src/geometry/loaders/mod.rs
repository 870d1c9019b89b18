/// 网格加载器模块
///
/// 提供统一的网格加载接口和 CSM 格式的具体实现。
///
/// # 支持的格式
///
/// - **CSM**: Compiled Static Mesh，版本 2 和版本 3
///
/// # 使用示例
///
/// ```rust,no_run
/// use compiled_mesh::geometry::loaders::{CsmLoader, MeshLoader};
/// use std::path::Path;
///
/// let loaded = CsmLoader::load_from_file(Path::new("model.csm"))?;
/// println!("材质数: {}", loaded.info.material_count());
/// # Ok::<(), compiled_mesh::core::CsmError>(())
/// ```
use crate::core::config::Config;
use crate::core::error::{MeshError, Result};
use crate::geometry::mesh::LoadedMesh;
use std::path::Path;

pub mod csm_loader;

pub use csm_loader::{CsmLoader, LoadOptions};

/// 网格加载器 trait
///
/// 所有格式的加载器都实现此 trait，使用默认加载选项。
/// 需要自定义选项时使用具体加载器的实例方法。
pub trait MeshLoader {
    /// 从文件路径加载网格
    ///
    /// # 错误
    ///
    /// - 文件不存在或无法读取
    /// - 版本不受支持
    /// - 文件内容损坏（截断、索引越界等）
    /// - 网格为空
    fn load_from_file(path: &Path) -> Result<LoadedMesh>;

    /// 从内存数据加载网格
    fn load_from_memory(data: &[u8]) -> Result<LoadedMesh>;

    /// 支持的文件扩展名（小写，不含点号）
    fn supported_extensions() -> &'static [&'static str];
}

/// 根据文件扩展名选择合适的加载器，使用默认配置
pub fn load_mesh(path: &Path) -> Result<LoadedMesh> {
    load_mesh_with_config(path, &Config::default())
}

/// 根据文件扩展名选择合适的加载器
///
/// # 示例
///
/// ```rust,no_run
/// use compiled_mesh::core::Config;
/// use compiled_mesh::geometry::loaders::load_mesh_with_config;
/// use std::path::Path;
///
/// let config = Config::from_file_or_default("csm.toml");
/// let loaded = load_mesh_with_config(Path::new("model.csm"), &config)?;
/// # Ok::<(), compiled_mesh::core::CsmError>(())
/// ```
pub fn load_mesh_with_config(path: &Path, config: &Config) -> Result<LoadedMesh> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| MeshError::UnsupportedFormat("无法确定文件扩展名".to_string()))?;

    if CsmLoader::supported_extensions().contains(&extension.as_str()) {
        CsmLoader::from_config(config).load(path)
    } else {
        Err(MeshError::UnsupportedFormat(format!("不支持的文件格式: .{}", extension)).into())
    }
}
