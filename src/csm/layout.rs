//! 定长记录的字节布局
//!
//! 所有整数和浮点数均为小端序，记录字段紧密排列、没有填充。
//! 记录从字节切片显式解码为拥有所有权的结构体，不做指针重解释。

use crate::core::error::{MeshError, Result};

/// 定长记录
pub trait Record: Sized {
    /// 记录在文件中的字节大小
    const SIZE: usize;

    fn decode(reader: &mut RecordReader<'_>) -> Result<Self>;

    fn encode(&self, writer: &mut RecordWriter);

    /// 编码为恰好 `SIZE` 字节
    fn to_bytes(&self) -> Vec<u8> {
        let mut writer = RecordWriter::with_capacity(Self::SIZE);
        self.encode(&mut writer);
        debug_assert_eq!(writer.len(), Self::SIZE);
        writer.into_bytes()
    }

    /// 从字节切片解码一条记录
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::decode(&mut RecordReader::new(bytes))
    }
}

/// 将连续排列的记录表解码为 `Vec`
///
/// `bytes` 的长度必须恰好是 `count * R::SIZE`。
pub fn decode_records<R: Record>(bytes: &[u8], count: usize) -> Result<Vec<R>> {
    let needed = count.saturating_mul(R::SIZE);
    if bytes.len() != needed {
        return Err(MeshError::TruncatedRecord {
            needed,
            available: bytes.len(),
        }.into());
    }

    bytes.chunks_exact(R::SIZE).map(R::from_bytes).collect()
}

/// 按顺序读取小端字段
pub struct RecordReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self.pos + N;
        let slice = self.bytes.get(self.pos..end).ok_or(MeshError::TruncatedRecord {
            needed: end,
            available: self.bytes.len(),
        })?;

        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        self.pos = end;
        Ok(out)
    }

    pub fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    pub fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    pub fn i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    pub fn f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.take()?))
    }

    pub fn vec2(&mut self) -> Result<[f32; 2]> {
        Ok([self.f32()?, self.f32()?])
    }

    pub fn vec3(&mut self) -> Result<[f32; 3]> {
        Ok([self.f32()?, self.f32()?, self.f32()?])
    }

    pub fn vec2x3(&mut self) -> Result<[[f32; 2]; 3]> {
        Ok([self.vec2()?, self.vec2()?, self.vec2()?])
    }

    pub fn u32x3(&mut self) -> Result<[u32; 3]> {
        Ok([self.u32()?, self.u32()?, self.u32()?])
    }
}

/// 按顺序写入小端字段
#[derive(Debug, Default)]
pub struct RecordWriter {
    buf: Vec<u8>,
}

impl RecordWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity) }
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn u16(&mut self, value: u16) {
        self.bytes(&value.to_le_bytes());
    }

    pub fn u32(&mut self, value: u32) {
        self.bytes(&value.to_le_bytes());
    }

    pub fn i32(&mut self, value: i32) {
        self.bytes(&value.to_le_bytes());
    }

    pub fn f32(&mut self, value: f32) {
        self.bytes(&value.to_le_bytes());
    }

    pub fn vec2(&mut self, value: [f32; 2]) {
        value.iter().for_each(|&v| self.f32(v));
    }

    pub fn vec3(&mut self, value: [f32; 3]) {
        value.iter().for_each(|&v| self.f32(v));
    }

    pub fn vec2x3(&mut self, value: [[f32; 2]; 3]) {
        value.iter().for_each(|&v| self.vec2(v));
    }

    pub fn u32x3(&mut self, value: [u32; 3]) {
        value.iter().for_each(|&v| self.u32(v));
    }
}

/// 一张记录表在文件中的位置：偏移、记录大小、记录数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableDescriptor {
    pub offset: u32,
    pub record_size: u32,
    pub count: u32,
}

impl TableDescriptor {
    pub(crate) fn decode(reader: &mut RecordReader<'_>) -> Result<Self> {
        Ok(Self {
            offset: reader.u32()?,
            record_size: reader.u32()?,
            count: reader.u32()?,
        })
    }

    pub(crate) fn encode(&self, writer: &mut RecordWriter) {
        writer.u32(self.offset);
        writer.u32(self.record_size);
        writer.u32(self.count);
    }
}

/// V2 与 V3 头部共有的字段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommonHeader {
    pub signature: u32,
    pub version: u32,
    pub header_size: u32,
    pub flags: u32,
    pub material_data_offset: u32,
    pub material_data_end: u32,
    pub faces: TableDescriptor,
    pub vertices: TableDescriptor,
}
