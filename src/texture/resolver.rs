//! 材质名称到纹理文件的解析

use std::path::{Path, PathBuf};

use crate::core::config::MaterialConfig;
use crate::geometry::mesh::MeshInfo;

/// 纹理文件查找器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureResolver {
    /// 按顺序搜索的目录
    pub directories: Vec<PathBuf>,

    /// 按顺序尝试的扩展名（不含点号）
    pub extensions: Vec<String>,
}

impl Default for TextureResolver {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl TextureResolver {
    /// 使用默认扩展名 dds、png、bmp、jpg
    pub fn new(directories: Vec<PathBuf>) -> Self {
        Self {
            directories,
            extensions: MaterialConfig::default().extensions,
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// 以加载结果中的搜索目录和配置中的扩展名创建
    pub fn for_mesh(info: &MeshInfo, config: &MaterialConfig) -> Self {
        Self::new(info.material_directories.clone()).with_extensions(config.extensions.clone())
    }

    /// 查找材质对应的纹理文件
    ///
    /// 每个目录中先依次尝试 `name.ext`，都不存在时再尝试不带扩展名的 `name`。
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }

        self.directories
            .iter()
            .find_map(|dir| self.resolve_in(dir, name))
    }

    fn resolve_in(&self, dir: &Path, name: &str) -> Option<PathBuf> {
        self.extensions
            .iter()
            .map(|ext| dir.join(format!("{}.{}", name, ext)))
            .find(|candidate| candidate.is_file())
            .or_else(|| Some(dir.join(name)).filter(|candidate| candidate.is_file()))
    }
}
