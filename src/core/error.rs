//! 错误处理模块
//!
//! 定义了 CSM 读写与几何构建中使用的统一错误类型。
//!
//! # 设计原则
//!
//! - 为每种错误类型提供清晰的上下文信息
//! - 支持错误链（error source）
//! - 易于模式匹配和错误处理
//! - 任何加载失败都不暴露部分几何数据

use std::fmt;
use std::path::PathBuf;

/// 统一的 Result 类型
pub type Result<T> = std::result::Result<T, CsmError>;

/// crate 顶层错误类型
#[derive(Debug)]
pub enum CsmError {
    /// 配置错误
    Config(ConfigError),

    /// 网格文件读写 / 几何构建错误
    Mesh(MeshError),

    /// 纹理解析 / 解码错误
    Texture(TextureError),

    /// IO 错误
    Io(std::io::Error),
}

/// 配置相关的错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),

    /// 配置文件解析失败
    ParseError(String),

    /// 配置值无效
    InvalidValue { field: String, reason: String },
}

/// 越界索引的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// 面引用的顶点索引 >= 顶点数量
    Vertex { index: u32, count: u32 },

    /// 面引用的材质索引 >= 材质数量
    Material { index: u16, count: u32 },
}

/// 网格文件相关的错误
#[derive(Debug)]
pub enum MeshError {
    /// 文件不存在
    FileNotFound(PathBuf),

    /// 句柄未打开
    NotOpen,

    /// 无法获取当前文件偏移
    OffsetUnavailable,

    /// 偏移超出 u32 可表示范围
    OffsetOverflow(u64),

    /// 读写字节数不足
    ShortTransfer { expected: usize, actual: usize },

    /// 表的结束偏移小于起始偏移
    OffsetOrder { start: u32, end: u32 },

    /// 不支持的格式版本
    UnsupportedVersion(u32),

    /// 面或顶点数量为零
    EmptyMesh { faces: u32, vertices: u32 },

    /// 材质表在 NUL 之前到达文件末尾
    MalformedMaterialTable { offset: u32 },

    /// 面记录中的索引越界
    CorruptIndex { face: usize, kind: IndexKind },

    /// 记录字节不足以解码
    TruncatedRecord { needed: usize, available: usize },

    /// 不支持的文件类型 / 加载方式
    UnsupportedFormat(String),
}

/// 纹理相关的错误
#[derive(Debug)]
pub enum TextureError {
    /// 所有搜索目录中都找不到该材质的纹理
    NotFound { name: String },

    /// 图像解码失败
    Decode { path: PathBuf, reason: String },
}

impl fmt::Display for CsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsmError::Config(e) => write!(f, "Configuration error: {}", e),
            CsmError::Mesh(e) => write!(f, "Mesh error: {}", e),
            CsmError::Texture(e) => write!(f, "Texture error: {}", e),
            CsmError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Vertex { index, count } => {
                write!(f, "vertex index {} out of range (vertex count {})", index, count)
            }
            IndexKind::Material { index, count } => {
                write!(f, "material index {} out of range (material count {})", index, count)
            }
        }
    }
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::FileNotFound(path) => write!(f, "Mesh file not found: {}", path.display()),
            MeshError::NotOpen => write!(f, "Mesh file is not open"),
            MeshError::OffsetUnavailable => write!(f, "Current file offset is not available"),
            MeshError::OffsetOverflow(offset) => {
                write!(f, "File offset {} does not fit in 32 bits", offset)
            }
            MeshError::ShortTransfer { expected, actual } => {
                write!(f, "Short transfer: expected {} bytes, got {}", expected, actual)
            }
            MeshError::OffsetOrder { start, end } => {
                write!(f, "Table ends at {} before its start offset {}", end, start)
            }
            MeshError::UnsupportedVersion(version) => {
                write!(f, "Unsupported mesh version: {}", version)
            }
            MeshError::EmptyMesh { faces, vertices } => {
                write!(f, "Mesh is empty: {} faces, {} vertices", faces, vertices)
            }
            MeshError::MalformedMaterialTable { offset } => {
                write!(f, "Material table at offset {} is not NUL terminated", offset)
            }
            MeshError::CorruptIndex { face, kind } => write!(f, "Face {}: {}", face, kind),
            MeshError::TruncatedRecord { needed, available } => {
                write!(f, "Truncated record: need {} bytes, {} available", needed, available)
            }
            MeshError::UnsupportedFormat(msg) => write!(f, "Unsupported mesh format: {}", msg),
        }
    }
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::NotFound { name } => write!(f, "No texture found for material '{}'", name),
            TextureError::Decode { path, reason } => {
                write!(f, "Failed to decode '{}': {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for CsmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CsmError::Io(e) => Some(e),
            CsmError::Config(e) => Some(e),
            CsmError::Mesh(e) => Some(e),
            CsmError::Texture(e) => Some(e),
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for MeshError {}
impl std::error::Error for TextureError {}

// 实现 From trait 以便于错误转换
impl From<std::io::Error> for CsmError {
    fn from(err: std::io::Error) -> Self {
        CsmError::Io(err)
    }
}

impl From<ConfigError> for CsmError {
    fn from(err: ConfigError) -> Self {
        CsmError::Config(err)
    }
}

impl From<MeshError> for CsmError {
    fn from(err: MeshError) -> Self {
        CsmError::Mesh(err)
    }
}

impl From<TextureError> for CsmError {
    fn from(err: TextureError) -> Self {
        CsmError::Texture(err)
    }
}

impl CsmError {
    /// 若为网格错误，返回内部的 `MeshError`
    pub fn as_mesh(&self) -> Option<&MeshError> {
        match self {
            CsmError::Mesh(e) => Some(e),
            _ => None,
        }
    }
}
