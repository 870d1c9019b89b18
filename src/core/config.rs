//! 配置管理模块
//!
//! 提供加载器配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//!
//! # 配置文件格式 (csm.toml)
//!
//! ```toml
//! [materials]
//! search_dirs = ["textures", "../shared/textures"]
//! extensions = ["dds", "png", "bmp", "jpg"]
//! split = "quoted"    # 或 "legacy"
//!
//! [geometry]
//! normal_length = 8.0
//! wire_offset = 0.001
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, Result};
use crate::csm::SplitMode;

/// 加载器配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 材质 / 纹理查找配置
    #[serde(default)]
    pub materials: MaterialConfig,

    /// 几何构建配置
    #[serde(default)]
    pub geometry: GeometryConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 材质配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialConfig {
    /// 额外的纹理搜索目录
    ///
    /// 网格文件所在目录总是第一个被搜索。
    #[serde(default)]
    pub search_dirs: Vec<String>,

    /// 依次尝试的纹理扩展名（不含点号）
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// 材质表的分词方式
    #[serde(default)]
    pub split: SplitMode,
}

/// 几何构建配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// 法线调试线段长度
    #[serde(default = "default_normal_length")]
    pub normal_length: f32,

    /// 线框沿法线的偏移量，用于避免与实体网格 z-fighting
    #[serde(default = "default_wire_offset")]
    pub wire_offset: f32,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_extensions() -> Vec<String> {
    ["dds", "png", "bmp", "jpg"].iter().map(|s| s.to_string()).collect()
}
fn default_normal_length() -> f32 { 8.0 }
fn default_wire_offset() -> f32 { 0.001 }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "csm.log".to_string() }

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            search_dirs: Vec::new(),
            extensions: default_extensions(),
            split: SplitMode::default(),
        }
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            normal_length: default_normal_length(),
            wire_offset: default_wire_offset(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// 从配置文件加载
    ///
    /// # 参数
    ///
    /// * `path` - 配置文件路径
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        Self::from_toml(&contents)
    }

    /// 从 TOML 字符串解析
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在或无法解析则使用默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("Config not found at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(config) => {
                tracing::info!("Loaded config from: {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if !self.geometry.normal_length.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "geometry.normal_length".to_string(),
                reason: "Normal length must be a finite number".to_string(),
            }.into());
        }

        if !self.geometry.wire_offset.is_finite() || self.geometry.wire_offset < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "geometry.wire_offset".to_string(),
                reason: "Wire offset must be finite and non-negative".to_string(),
            }.into());
        }

        if self.materials.extensions.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "materials.extensions".to_string(),
                reason: "At least one texture extension is required".to_string(),
            }.into());
        }

        Ok(())
    }
}
