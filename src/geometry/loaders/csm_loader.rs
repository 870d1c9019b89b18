/// CSM 文件加载器
///
/// 探测版本、选择编解码器、读取材质表并构建渲染几何，
/// 同时收集文件统计信息供界面或命令行展示。
use super::MeshLoader;
use crate::core::config::Config;
use crate::core::error::{MeshError, Result};
use crate::csm::{AnyCodec, SplitMode};
use crate::geometry::builder::GeometryBuilder;
use crate::geometry::mesh::{LoadedMesh, MeshInfo};
use crate::{loader_info, loader_warn};
use std::path::{Path, PathBuf};

/// 加载选项
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// 材质表分词方式
    pub split: SplitMode,

    /// 额外的纹理搜索目录；相对路径以网格所在目录为基准
    pub search_dirs: Vec<PathBuf>,

    /// 几何构建参数
    pub geometry: GeometryBuilder,
}

impl From<&Config> for LoadOptions {
    fn from(config: &Config) -> Self {
        Self {
            split: config.materials.split,
            search_dirs: config.materials.search_dirs.iter().map(PathBuf::from).collect(),
            geometry: GeometryBuilder::from(&config.geometry),
        }
    }
}

/// CSM 格式加载器
///
/// # 使用示例
///
/// ```rust,no_run
/// use compiled_mesh::core::Config;
/// use compiled_mesh::geometry::loaders::CsmLoader;
/// use std::path::Path;
///
/// let loader = CsmLoader::from_config(&Config::default());
/// let loaded = loader.load(Path::new("model.csm"))?;
/// println!("三角形数: {}", loaded.mesh.triangle_count());
/// # Ok::<(), compiled_mesh::core::CsmError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsmLoader {
    options: LoadOptions,
}

impl CsmLoader {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(LoadOptions::from(config))
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// 加载网格文件
    pub fn load(&self, path: &Path) -> Result<LoadedMesh> {
        let mut codec = AnyCodec::open(path)?;
        loader_info!("Loading {} (version {})", path.display(), codec.version());

        let directory = path.parent().map(Path::to_path_buf);

        let mut loaded = self.load_codec(&mut codec)?;
        loaded.info.material_directories = self.material_directories(directory.as_deref());
        loaded.info.path = Some(path.to_path_buf());
        loaded.info.directory = directory;

        loader_info!(
            "Loaded {}: {} faces, {} vertices, {} materials",
            path.display(),
            loaded.info.face_count,
            loaded.info.vertex_count,
            loaded.info.material_count()
        );

        Ok(loaded)
    }

    /// 从内存数据加载
    pub fn load_bytes(&self, data: &[u8]) -> Result<LoadedMesh> {
        let mut codec = AnyCodec::from_bytes(data.to_vec())?;
        let mut loaded = self.load_codec(&mut codec)?;
        loaded.info.material_directories = self.material_directories(None);
        Ok(loaded)
    }

    fn load_codec(&self, codec: &mut AnyCodec) -> Result<LoadedMesh> {
        let faces = codec.face_count();
        let vertices = codec.vertex_count();
        if faces == 0 || vertices == 0 {
            loader_warn!("Mesh has {} faces and {} vertices", faces, vertices);
            return Err(MeshError::EmptyMesh { faces, vertices }.into());
        }

        let materials = codec.read_materials(self.options.split)?;
        let mesh = codec.build_geometry(&self.options.geometry, &materials)?;

        let info = MeshInfo {
            version: codec.version(),
            flags: codec.flags(),
            face_count: faces,
            face_data_size: faces.saturating_mul(codec.face_size()),
            vertex_count: vertices,
            vertex_data_size: vertices.saturating_mul(codec.vertex_size()),
            materials,
            bounding_box: mesh.bounds,
            ..Default::default()
        };
        codec.close();

        Ok(LoadedMesh { info, mesh })
    }

    /// 网格所在目录在最前，其后是配置的搜索目录
    fn material_directories(&self, directory: Option<&Path>) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = directory.map(Path::to_path_buf).into_iter().collect();

        for dir in &self.options.search_dirs {
            let resolved = match directory {
                Some(base) if dir.is_relative() => base.join(dir),
                _ => dir.clone(),
            };
            if !dirs.contains(&resolved) {
                dirs.push(resolved);
            }
        }

        dirs
    }
}

impl MeshLoader for CsmLoader {
    fn load_from_file(path: &Path) -> Result<LoadedMesh> {
        CsmLoader::default().load(path)
    }

    fn load_from_memory(data: &[u8]) -> Result<LoadedMesh> {
        CsmLoader::default().load_bytes(data)
    }

    fn supported_extensions() -> &'static [&'static str] {
        &["csm"]
    }
}
