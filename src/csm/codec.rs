//! 与版本无关的网格编解码抽象
//!
//! 每个磁盘格式版本实现 [`MeshFormat`]，只提供头部与记录的布局；
//! 读写流程由 [`Codec`] 和 [`MeshWriter`] 统一实现。
//!
//! # 读取
//!
//! ```rust,no_run
//! use compiled_mesh::csm::{Codec, SplitMode, Version3};
//!
//! let mut codec = Codec::<Version3>::new();
//! codec.open("model.csm")?;
//! let materials = codec.read_materials(SplitMode::Quoted)?;
//! let tables = codec.read_tables()?;
//! # Ok::<(), compiled_mesh::core::CsmError>(())
//! ```
//!
//! # 写入
//!
//! 写入分为 材质 → 面 → 顶点 → 头部 四个阶段，阶段由类型保证顺序：
//!
//! ```rust,no_run
//! use compiled_mesh::csm::{Codec, Version2};
//! use compiled_mesh::csm::version2::{Face, Vertex};
//!
//! let mut writer = Codec::<Version2>::create("out.csm")?;
//! writer.write_material_names(&["Wood", "Glass"])?;
//! let mut writer = writer.end_materials()?;
//! writer.write_face(&Face::default())?;
//! let mut writer = writer.end_faces()?;
//! writer.write_vertex(&Vertex::default())?;
//! writer.end_vertices()?.finish()?;
//! # Ok::<(), compiled_mesh::core::CsmError>(())
//! ```

use std::fmt::Debug;
use std::marker::PhantomData;
use std::path::Path;

use super::file::{BinaryFile, Mode};
use super::layout::{decode_records, CommonHeader, Record};
use super::material::{self, SplitMode};
use crate::core::error::{IndexKind, MeshError, Result};
use crate::geometry::builder::GeometrySource;
use crate::geometry::vertex::RenderVertex;

/// 文件头部记录
pub trait HeaderRecord: Record + Default + Clone + Debug {
    fn common(&self) -> &CommonHeader;
    fn common_mut(&mut self) -> &mut CommonHeader;
}

/// 面记录
pub trait FaceRecord: Record + Clone + Debug + PartialEq {
    /// 材质索引
    fn material(&self) -> u16;

    /// 三个角的顶点索引
    fn indices(&self) -> [u32; 3];

    /// 三个角的纹理坐标
    fn tex_coords(&self) -> [[f32; 2]; 3];
}

/// 顶点记录（源坐标系，尚未交换 Y/Z）
pub trait VertexRecord: Record + Clone + Debug + PartialEq {
    fn position(&self) -> [f32; 3];
    fn normal(&self) -> [f32; 3];
}

/// 一个磁盘格式版本的布局
pub trait MeshFormat {
    const VERSION: u32;
    const SIGNATURE: u32;

    type Header: HeaderRecord;
    type Face: FaceRecord;
    type Vertex: VertexRecord;
}

/// 源坐标系到渲染坐标系：交换 Y 与 Z
#[inline]
pub fn swap_yz(v: [f32; 3]) -> [f32; 3] {
    [v[0], v[2], v[1]]
}

/// 读取端的编解码器
///
/// 独占一个文件句柄，打开时立即解析头部。
#[derive(Debug)]
pub struct Codec<F: MeshFormat> {
    file: BinaryFile,
    header: F::Header,
    _format: PhantomData<F>,
}

impl<F: MeshFormat> Default for Codec<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: MeshFormat> Codec<F> {
    /// 创建一个未打开的编解码器
    pub fn new() -> Self {
        Self {
            file: BinaryFile::new(),
            header: F::Header::default(),
            _format: PhantomData,
        }
    }

    /// 以只读方式打开文件并解析头部
    ///
    /// 已打开的文件会先被关闭；头部读取失败时句柄被释放。
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.close();
        self.file.open(path, Mode::Read)?;
        self.load_header()
    }

    /// 从内存中的字节解析
    pub fn open_bytes(&mut self, bytes: Vec<u8>) -> Result<()> {
        self.close();
        self.file = BinaryFile::from_bytes(bytes);
        self.load_header()
    }

    fn read_header(&mut self) -> Result<F::Header> {
        let mut bytes = vec![0u8; F::Header::SIZE];
        self.file.seek(0)?;
        self.file.read(&mut bytes)?;
        F::Header::from_bytes(&bytes)
    }

    fn load_header(&mut self) -> Result<()> {
        match self.read_header() {
            Ok(header) => {
                check_record_size("face", header.common().faces.record_size, F::Face::SIZE);
                check_record_size("vertex", header.common().vertices.record_size, F::Vertex::SIZE);
                self.header = header;
                Ok(())
            }
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }

    /// 关闭文件并重置头部，可重复调用
    pub fn close(&mut self) {
        self.file.close();
        self.header = F::Header::default();
    }

    pub fn is_open(&self) -> bool {
        self.file.is_open()
    }

    /// 头部记录的版本号；未打开时为 0
    pub fn version(&self) -> u32 {
        if !self.is_open() {
            return 0;
        }
        self.header.common().version
    }

    pub fn set_version(&mut self, version: u32) {
        self.header.common_mut().version = version;
    }

    /// 模型标志位；未打开时为 0
    pub fn flags(&self) -> u32 {
        if !self.is_open() {
            return 0;
        }
        self.header.common().flags
    }

    pub fn set_flags(&mut self, flags: u32) {
        self.header.common_mut().flags = flags;
    }

    pub fn header(&self) -> &F::Header {
        &self.header
    }

    pub fn face_count(&self) -> u32 {
        self.header.common().faces.count
    }

    pub fn vertex_count(&self) -> u32 {
        self.header.common().vertices.count
    }

    /// 面记录的字节大小
    pub fn face_size(&self) -> u32 {
        F::Face::SIZE as u32
    }

    /// 顶点记录的字节大小
    pub fn vertex_size(&self) -> u32 {
        F::Vertex::SIZE as u32
    }

    /// 读取材质表的原始记号（保留引号）
    pub fn read_material_tokens(&mut self, mode: SplitMode) -> Result<Vec<String>> {
        let offset = self.header.common().material_data_offset;
        self.file.seek(offset)?;

        let mut raw = Vec::new();
        if !self.file.read_until_nul(&mut raw)? {
            return Err(MeshError::MalformedMaterialTable { offset }.into());
        }
        raw.pop();

        Ok(material::split_tokens(&raw, mode))
    }

    /// 读取材质名称列表，名称两端的引号已去除
    pub fn read_materials(&mut self, mode: SplitMode) -> Result<Vec<String>> {
        Ok(self
            .read_material_tokens(mode)?
            .iter()
            .map(|token| material::strip_quotes(token))
            .collect())
    }

    /// 一次性读取整张面表的原始字节
    pub fn read_faces_raw(&mut self) -> Result<Vec<u8>> {
        let faces = self.header.common().faces;
        self.read_table(faces.offset, faces.count, F::Face::SIZE)
    }

    /// 一次性读取整张顶点表的原始字节
    pub fn read_vertices_raw(&mut self) -> Result<Vec<u8>> {
        let vertices = self.header.common().vertices;
        self.read_table(vertices.offset, vertices.count, F::Vertex::SIZE)
    }

    /// 头部声明的表大小不可信，分配前先与数据总长度比较
    fn read_table(&mut self, offset: u32, count: u32, record_size: usize) -> Result<Vec<u8>> {
        let needed = u64::from(count) * record_size as u64;
        let available = self.file.stream_len()?.saturating_sub(u64::from(offset));
        if needed > available {
            return Err(MeshError::ShortTransfer {
                expected: usize::try_from(needed).unwrap_or(usize::MAX),
                actual: usize::try_from(available).unwrap_or(usize::MAX),
            }
            .into());
        }

        let len = usize::try_from(needed).map_err(|_| MeshError::OffsetOverflow(needed))?;
        self.file.seek(offset)?;
        let mut bytes = vec![0u8; len];
        self.file.read(&mut bytes)?;
        Ok(bytes)
    }

    pub fn read_faces(&mut self) -> Result<Vec<F::Face>> {
        let bytes = self.read_faces_raw()?;
        decode_records(&bytes, self.face_count() as usize)
    }

    pub fn read_vertices(&mut self) -> Result<Vec<F::Vertex>> {
        let bytes = self.read_vertices_raw()?;
        decode_records(&bytes, self.vertex_count() as usize)
    }

    /// 读取面表与顶点表
    pub fn read_tables(&mut self) -> Result<MeshTables<F>> {
        Ok(MeshTables {
            faces: self.read_faces()?,
            vertices: self.read_vertices()?,
        })
    }

    /// 创建一个写入会话
    ///
    /// 先写入占位头部，使各表从 `headerSize` 之后开始；
    /// 真正的头部在 [`MeshWriter::finish`] 中回写。
    pub fn create<P: AsRef<Path>>(path: P) -> Result<MeshWriter<F, WriteMaterials>> {
        let mut file = BinaryFile::new();
        file.open(path, Mode::Write)?;

        let mut header = F::Header::default();
        {
            let common = header.common_mut();
            common.signature = F::SIGNATURE;
            common.version = F::VERSION;
            common.header_size = F::Header::SIZE as u32;
            common.faces.record_size = F::Face::SIZE as u32;
            common.vertices.record_size = F::Vertex::SIZE as u32;
        }

        file.write(&header.to_bytes())?;
        let start = file.current_offset()?;
        header.common_mut().material_data_offset = start;

        Ok(MeshWriter {
            file,
            header,
            phase: WriteMaterials { start },
        })
    }
}

fn check_record_size(table: &str, stored: u32, expected: usize) {
    if stored != 0 && stored as usize != expected {
        tracing::warn!(
            "Header declares {} record size {} but the layout uses {}, using {}",
            table, stored, expected, expected
        );
    }
}

/// 写入阶段：材质表
#[derive(Debug)]
pub struct WriteMaterials {
    start: u32,
}

/// 写入阶段：面表
#[derive(Debug)]
pub struct WriteFaces;

/// 写入阶段：顶点表
#[derive(Debug)]
pub struct WriteVertices;

/// 写入阶段：回写头部
#[derive(Debug)]
pub struct WriteHeader;

/// 按阶段推进的写入会话
#[derive(Debug)]
pub struct MeshWriter<F: MeshFormat, P> {
    file: BinaryFile,
    header: F::Header,
    phase: P,
}

impl<F: MeshFormat, P> MeshWriter<F, P> {
    pub fn header(&self) -> &F::Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut F::Header {
        &mut self.header
    }

    pub fn set_flags(&mut self, flags: u32) {
        self.header.common_mut().flags = flags;
    }

    pub fn set_version(&mut self, version: u32) {
        self.header.common_mut().version = version;
    }

    fn advance<Q>(self, phase: Q) -> MeshWriter<F, Q> {
        MeshWriter {
            file: self.file,
            header: self.header,
            phase,
        }
    }
}

impl<F: MeshFormat> MeshWriter<F, WriteMaterials> {
    /// 写入一段原始材质文本，不附加分隔符
    pub fn write_material(&mut self, name: &str) -> Result<()> {
        self.file.write(name.as_bytes())
    }

    /// 写入名称列表：单空格分隔，含空格的名称加引号
    pub fn write_material_names<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        self.write_material(&material::join_names(names))
    }

    /// 结束材质表：写入 NUL 并记录结束偏移，随后开始面表
    pub fn end_materials(mut self) -> Result<MeshWriter<F, WriteFaces>> {
        self.file.write(&[0])?;

        let start = self.phase.start;
        let end = self.file.current_offset()?;
        if start > end {
            return Err(MeshError::OffsetOrder { start, end }.into());
        }

        let common = self.header.common_mut();
        common.material_data_end = end;
        common.faces.offset = end;

        Ok(self.advance(WriteFaces))
    }
}

impl<F: MeshFormat> MeshWriter<F, WriteFaces> {
    /// 追加一条面记录
    pub fn write_face(&mut self, face: &F::Face) -> Result<()> {
        self.file.write(&face.to_bytes())?;
        self.header.common_mut().faces.count += 1;
        Ok(())
    }

    /// 结束面表，随后开始顶点表
    pub fn end_faces(mut self) -> Result<MeshWriter<F, WriteVertices>> {
        let start = self.header.common().faces.offset;
        let end = self.file.current_offset()?;
        if start > end {
            return Err(MeshError::OffsetOrder { start, end }.into());
        }

        self.header.common_mut().vertices.offset = end;
        Ok(self.advance(WriteVertices))
    }
}

impl<F: MeshFormat> MeshWriter<F, WriteVertices> {
    /// 追加一条顶点记录
    pub fn write_vertex(&mut self, vertex: &F::Vertex) -> Result<()> {
        self.file.write(&vertex.to_bytes())?;
        self.header.common_mut().vertices.count += 1;
        Ok(())
    }

    /// 结束顶点表
    pub fn end_vertices(mut self) -> Result<MeshWriter<F, WriteHeader>> {
        let start = self.header.common().vertices.offset;
        let end = self.file.current_offset()?;
        if start > end {
            return Err(MeshError::OffsetOrder { start, end }.into());
        }

        Ok(self.advance(WriteHeader))
    }
}

impl<F: MeshFormat> MeshWriter<F, WriteHeader> {
    /// 回写完整头部并关闭文件，返回最终写入的头部
    pub fn finish(mut self) -> Result<F::Header> {
        self.file.seek(0)?;
        self.file.write(&self.header.to_bytes())?;
        self.file.close();
        Ok(self.header)
    }
}

/// 解码后的面表与顶点表
#[derive(Debug, Clone)]
pub struct MeshTables<F: MeshFormat> {
    pub faces: Vec<F::Face>,
    pub vertices: Vec<F::Vertex>,
}

impl<F: MeshFormat> GeometrySource for MeshTables<F> {
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn face_material(&self, face: usize) -> u16 {
        self.faces[face].material()
    }

    fn corner(&self, face: usize, corner: usize) -> Result<RenderVertex> {
        let record = &self.faces[face];
        let index = record.indices()[corner];

        let vertex = self.vertices.get(index as usize).ok_or(MeshError::CorruptIndex {
            face,
            kind: IndexKind::Vertex {
                index,
                count: self.vertices.len() as u32,
            },
        })?;

        Ok(RenderVertex {
            position: swap_yz(vertex.position()),
            texcoord: record.tex_coords()[corner],
            normal: swap_yz(vertex.normal()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csm::version2::{self, Version2};

    #[test]
    fn test_swap_yz() {
        assert_eq!(swap_yz([1.0, 2.0, 3.0]), [1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_closed_codec_accessors() {
        let mut codec = Codec::<Version2>::new();
        assert!(!codec.is_open());
        assert_eq!(codec.version(), 0);
        assert_eq!(codec.flags(), 0);
        assert!(codec.read_faces_raw().is_err());
        codec.close();
    }

    #[test]
    fn test_truncated_header_releases_handle() {
        let mut codec = Codec::<Version2>::new();
        let err = codec.open_bytes(vec![0u8; 10]).unwrap_err();
        assert!(matches!(err.as_mesh(), Some(MeshError::ShortTransfer { .. })));
        assert!(!codec.is_open());
    }

    #[test]
    fn test_oversized_table_rejected_before_allocation() {
        let mut header = version2::Header::default();
        header.common.material_data_offset = version2::Header::SIZE as u32;
        header.common.faces.offset = version2::Header::SIZE as u32 + 2;
        header.common.faces.count = u32::MAX;
        header.common.vertices.count = 1;
        let mut bytes = header.to_bytes();
        bytes.extend_from_slice(b"A\0");
        bytes.resize(1024, 0);

        let mut codec = Codec::<Version2>::new();
        codec.open_bytes(bytes).unwrap();
        let err = codec.read_faces_raw().unwrap_err();
        assert!(matches!(
            err.as_mesh(),
            Some(MeshError::ShortTransfer { actual: 974, .. })
        ));
        assert!(codec.read_faces().is_err());
    }

    #[test]
    fn test_reopen_replaces_handle() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.csm");
        let second = dir.path().join("second.csm");

        for (path, flags) in [(&first, 1), (&second, 2)] {
            let mut writer = Codec::<Version2>::create(path).unwrap();
            writer.set_flags(flags);
            writer.write_material("A").unwrap();
            let mut writer = writer.end_materials().unwrap();
            for _ in 0..flags {
                writer.write_face(&version2::Face::default()).unwrap();
            }
            let mut writer = writer.end_faces().unwrap();
            writer.write_vertex(&version2::Vertex::default()).unwrap();
            writer.end_vertices().unwrap().finish().unwrap();
        }

        let mut codec = Codec::<Version2>::new();
        codec.open(&first).unwrap();
        assert_eq!(codec.flags(), 1);

        codec.open(&second).unwrap();
        assert!(codec.is_open());
        assert_eq!(codec.flags(), 2);
        assert_eq!(codec.face_count(), 2);
        assert_eq!(codec.read_faces().unwrap().len(), 2);

        // 重新打开失败时旧状态不会残留
        let err = codec.open(dir.path().join("missing.csm")).unwrap_err();
        assert!(matches!(err.as_mesh(), Some(MeshError::FileNotFound(_))));
        assert!(!codec.is_open());
        assert_eq!(codec.flags(), 0);
    }

    #[test]
    fn test_writer_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offsets.csm");

        let mut writer = Codec::<Version2>::create(&path).unwrap();
        writer.write_material("A B").unwrap();
        let mut writer = writer.end_materials().unwrap();
        writer.write_face(&version2::Face::default()).unwrap();
        let mut writer = writer.end_faces().unwrap();
        writer.write_vertex(&version2::Vertex::default()).unwrap();
        let header = writer.end_vertices().unwrap().finish().unwrap();

        let common = header.common();
        let header_size = version2::Header::SIZE as u32;
        assert_eq!(common.header_size, header_size);
        assert_eq!(common.material_data_offset, header_size);
        assert_eq!(common.material_data_end, header_size + 4);
        assert_eq!(common.faces.offset, header_size + 4);
        assert_eq!(common.faces.count, 1);
        assert_eq!(
            common.vertices.offset,
            common.faces.offset + version2::Face::SIZE as u32
        );
        assert_eq!(common.vertices.count, 1);

        let len = std::fs::metadata(&path).unwrap().len();
        assert_eq!(len, u64::from(common.vertices.offset) + version2::Vertex::SIZE as u64);
    }

    #[test]
    fn test_unterminated_material_table() {
        // 头部之后没有 NUL
        let mut header = version2::Header::default();
        header.common.material_data_offset = version2::Header::SIZE as u32;
        let mut bytes = header.to_bytes();
        bytes.extend_from_slice(b"Wood Glass");

        let mut codec = Codec::<Version2>::new();
        codec.open_bytes(bytes).unwrap();
        let err = codec.read_materials(SplitMode::Quoted).unwrap_err();
        assert!(matches!(
            err.as_mesh(),
            Some(MeshError::MalformedMaterialTable { .. })
        ));
    }

    #[test]
    fn test_corner_rejects_bad_vertex_index() {
        let tables = MeshTables::<Version2> {
            faces: vec![version2::Face {
                indices: [0, 1, 5],
                ..Default::default()
            }],
            vertices: vec![version2::Vertex::default(); 3],
        };

        assert!(tables.corner(0, 1).is_ok());
        let err = tables.corner(0, 2).unwrap_err();
        assert!(matches!(
            err.as_mesh(),
            Some(MeshError::CorruptIndex {
                face: 0,
                kind: IndexKind::Vertex { index: 5, count: 3 }
            })
        ));
    }
}
