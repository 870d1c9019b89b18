//! 版本 2 的磁盘布局
//!
//! ```text
//! Header  (48 字节)
//!   u32 signature, version, headerSize, flags
//!   u32 materialDataOffset, materialDataEnd
//!   u32 facesDataOffset, faceSize, facesCount
//!   u32 vertexDataOffset, vertexSize, vertexCount
//! Face    (40 字节)
//!   u16 material, u16 flags, u32 index[3], f32x2 textureCoord[3]
//! Vertex  (24 字节)
//!   f32x3 position, f32x3 normal
//! ```

use super::codec::{FaceRecord, HeaderRecord, MeshFormat, VertexRecord};
use super::layout::{CommonHeader, Record, RecordReader, RecordWriter, TableDescriptor};
use crate::core::error::Result;

/// 版本 2 格式标记
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Version2;

impl MeshFormat for Version2 {
    const VERSION: u32 = 2;
    // 版本 2 的签名不参与校验，写入时沿用 "IMCS"
    const SIGNATURE: u32 = super::SIGNATURE;

    type Header = Header;
    type Face = Face;
    type Vertex = Vertex;
}

/// 版本 2 文件头
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub common: CommonHeader,
}

impl Record for Header {
    const SIZE: usize = 48;

    fn decode(reader: &mut RecordReader<'_>) -> Result<Self> {
        Ok(Self {
            common: CommonHeader {
                signature: reader.u32()?,
                version: reader.u32()?,
                header_size: reader.u32()?,
                flags: reader.u32()?,
                material_data_offset: reader.u32()?,
                material_data_end: reader.u32()?,
                faces: TableDescriptor::decode(reader)?,
                vertices: TableDescriptor::decode(reader)?,
            },
        })
    }

    fn encode(&self, writer: &mut RecordWriter) {
        let c = &self.common;
        writer.u32(c.signature);
        writer.u32(c.version);
        writer.u32(c.header_size);
        writer.u32(c.flags);
        writer.u32(c.material_data_offset);
        writer.u32(c.material_data_end);
        c.faces.encode(writer);
        c.vertices.encode(writer);
    }
}

impl HeaderRecord for Header {
    fn common(&self) -> &CommonHeader {
        &self.common
    }

    fn common_mut(&mut self) -> &mut CommonHeader {
        &mut self.common
    }
}

/// 版本 2 面记录
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Face {
    pub material: u16,
    pub flags: u16,
    pub indices: [u32; 3],
    pub tex_coords: [[f32; 2]; 3],
}

impl Record for Face {
    const SIZE: usize = 40;

    fn decode(reader: &mut RecordReader<'_>) -> Result<Self> {
        Ok(Self {
            material: reader.u16()?,
            flags: reader.u16()?,
            indices: reader.u32x3()?,
            tex_coords: reader.vec2x3()?,
        })
    }

    fn encode(&self, writer: &mut RecordWriter) {
        writer.u16(self.material);
        writer.u16(self.flags);
        writer.u32x3(self.indices);
        writer.vec2x3(self.tex_coords);
    }
}

impl FaceRecord for Face {
    fn material(&self) -> u16 {
        self.material
    }

    fn indices(&self) -> [u32; 3] {
        self.indices
    }

    fn tex_coords(&self) -> [[f32; 2]; 3] {
        self.tex_coords
    }
}

/// 版本 2 顶点记录
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Record for Vertex {
    const SIZE: usize = 24;

    fn decode(reader: &mut RecordReader<'_>) -> Result<Self> {
        Ok(Self {
            position: reader.vec3()?,
            normal: reader.vec3()?,
        })
    }

    fn encode(&self, writer: &mut RecordWriter) {
        writer.vec3(self.position);
        writer.vec3(self.normal);
    }
}

impl VertexRecord for Vertex {
    fn position(&self) -> [f32; 3] {
        self.position
    }

    fn normal(&self) -> [f32; 3] {
        self.normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sizes() {
        assert_eq!(Header::default().to_bytes().len(), Header::SIZE);
        assert_eq!(Face::default().to_bytes().len(), Face::SIZE);
        assert_eq!(Vertex::default().to_bytes().len(), Vertex::SIZE);
    }

    #[test]
    fn test_header_field_order() {
        let mut header = Header::default();
        header.common.version = 2;
        header.common.vertices.count = 7;

        let bytes = header.to_bytes();
        assert_eq!(&bytes[4..8], &2u32.to_le_bytes());
        assert_eq!(&bytes[44..48], &7u32.to_le_bytes());
    }

    #[test]
    fn test_face_decode() {
        let face = Face {
            material: 3,
            flags: 1,
            indices: [4, 5, 6],
            tex_coords: [[0.0, 1.0], [0.5, 0.5], [1.0, 0.0]],
        };

        let decoded = Face::from_bytes(&face.to_bytes()).unwrap();
        assert_eq!(decoded, face);
        assert_eq!(decoded.material(), 3);
    }
}
