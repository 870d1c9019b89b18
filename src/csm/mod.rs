//! Compiled Static Mesh (CSM) 文件格式
//!
//! 提供版本 2 / 版本 3 两种磁盘布局的读写，以及根据文件头选择编解码器的探测逻辑。
//!
//! # 模块结构
//!
//! - `file`: 二进制文件读写原语
//! - `layout`: 小端定长记录的编解码
//! - `material`: 材质名称表的分词
//! - `codec`: 版本无关的编解码抽象与分阶段写入
//! - `version2` / `version3`: 两个版本的具体布局
//!
//! # 数据流
//!
//! ```text
//! detect_version (只读前 8 字节)
//!     ↓
//! AnyCodec::V2 / AnyCodec::V3
//!     ↓
//! 材质 / 面 / 顶点
//!     ↓
//! GeometryBuilder
//! ```

pub mod file;
pub mod layout;
pub mod material;
pub mod codec;
pub mod version2;
pub mod version3;

use std::path::Path;

pub use codec::{Codec, MeshFormat, MeshTables, MeshWriter};
pub use file::{BinaryFile, Mode};
pub use material::SplitMode;
pub use version2::Version2;
pub use version3::Version3;

use crate::core::error::{MeshError, Result};
use crate::geometry::builder::GeometryBuilder;
use crate::geometry::mesh::MeshData;

/// 支持的最低版本
pub const MIN_VERSION: u32 = 2;

/// 支持的最高版本
pub const MAX_VERSION: u32 = 3;

/// "IMCS" 按大端打包为 u32
pub const SIGNATURE: u32 =
    ((b'M' as u32) << 24) | ((b'S' as u32) << 16) | ((b'C' as u32) << 8) | b'I' as u32;

/// 探测文件的格式版本
///
/// 只读取前 8 字节 `{signature, version}`，不校验签名。
/// 文件无法打开或不足 8 字节时返回 0。
pub fn detect_version<P: AsRef<Path>>(path: P) -> u32 {
    let mut file = BinaryFile::new();
    if file.open(path, Mode::Read).is_err() {
        return 0;
    }

    let mut prefix = [0u8; 8];
    if file.read(&mut prefix).is_err() {
        return 0;
    }

    detect_version_bytes(&prefix)
}

/// 探测内存数据的格式版本
pub fn detect_version_bytes(bytes: &[u8]) -> u32 {
    bytes
        .get(4..8)
        .map_or(0, |v| u32::from_le_bytes([v[0], v[1], v[2], v[3]]))
}

/// 是否为受支持的版本
pub fn is_supported_version(version: u32) -> bool {
    (MIN_VERSION..=MAX_VERSION).contains(&version)
}

/// 运行时选择的编解码器
#[derive(Debug)]
pub enum AnyCodec {
    V2(Codec<Version2>),
    V3(Codec<Version3>),
}

macro_rules! dispatch {
    ($self:expr, $codec:ident => $body:expr) => {
        match $self {
            AnyCodec::V2($codec) => $body,
            AnyCodec::V3($codec) => $body,
        }
    };
}

impl AnyCodec {
    /// 探测版本并以对应的编解码器打开文件
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MeshError::FileNotFound(path.to_path_buf()).into());
        }

        match detect_version(path) {
            2 => {
                let mut codec = Codec::<Version2>::new();
                codec.open(path)?;
                Ok(AnyCodec::V2(codec))
            }
            3 => {
                let mut codec = Codec::<Version3>::new();
                codec.open(path)?;
                Ok(AnyCodec::V3(codec))
            }
            other => Err(MeshError::UnsupportedVersion(other).into()),
        }
    }

    /// 探测版本并从内存数据打开
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        match detect_version_bytes(&bytes) {
            2 => {
                let mut codec = Codec::<Version2>::new();
                codec.open_bytes(bytes)?;
                Ok(AnyCodec::V2(codec))
            }
            3 => {
                let mut codec = Codec::<Version3>::new();
                codec.open_bytes(bytes)?;
                Ok(AnyCodec::V3(codec))
            }
            other => Err(MeshError::UnsupportedVersion(other).into()),
        }
    }

    pub fn close(&mut self) {
        dispatch!(self, codec => codec.close())
    }

    pub fn version(&self) -> u32 {
        dispatch!(self, codec => codec.version())
    }

    pub fn flags(&self) -> u32 {
        dispatch!(self, codec => codec.flags())
    }

    pub fn face_count(&self) -> u32 {
        dispatch!(self, codec => codec.face_count())
    }

    pub fn vertex_count(&self) -> u32 {
        dispatch!(self, codec => codec.vertex_count())
    }

    pub fn face_size(&self) -> u32 {
        dispatch!(self, codec => codec.face_size())
    }

    pub fn vertex_size(&self) -> u32 {
        dispatch!(self, codec => codec.vertex_size())
    }

    pub fn read_materials(&mut self, mode: SplitMode) -> Result<Vec<String>> {
        dispatch!(self, codec => codec.read_materials(mode))
    }

    /// 读取面表与顶点表并构建渲染几何
    pub fn build_geometry(
        &mut self,
        builder: &GeometryBuilder,
        materials: &[String],
    ) -> Result<MeshData> {
        dispatch!(self, codec => {
            let tables = codec.read_tables()?;
            builder.build(materials, &tables)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_signature_constant() {
        assert_eq!(SIGNATURE, 0x4D53_4349);
    }

    #[test]
    fn test_detect_version_short_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.csm");
        std::fs::File::create(&path).unwrap().write_all(&[1, 2, 3, 4, 3]).unwrap();

        assert_eq!(detect_version(&path), 0);
        assert_eq!(detect_version_bytes(&[0, 0, 0, 0, 3, 0, 0]), 0);
    }

    #[test]
    fn test_detect_version_missing_file() {
        assert_eq!(detect_version("no/such/file.csm"), 0);
    }

    #[test]
    fn test_detect_version_ignores_signature() {
        let mut bytes = 0xDEAD_BEEFu32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&3u32.to_le_bytes());
        assert_eq!(detect_version_bytes(&bytes), 3);
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let mut bytes = SIGNATURE.to_le_bytes().to_vec();
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.resize(2048, 0);

        let err = AnyCodec::from_bytes(bytes).unwrap_err();
        assert!(matches!(err.as_mesh(), Some(MeshError::UnsupportedVersion(4))));
        assert!(!is_supported_version(4));
        assert!(is_supported_version(2));
    }

    #[test]
    fn test_open_missing_file() {
        let err = AnyCodec::open("no/such/file.csm").unwrap_err();
        assert!(matches!(err.as_mesh(), Some(MeshError::FileNotFound(_))));
    }
}
