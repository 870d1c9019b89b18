//! 版本 3 的磁盘布局
//!
//! 相比版本 2，头部增加了路径提示、光照贴图 / 细节分组数量和包围盒，
//! 面记录增加了光照贴图坐标与分组，顶点记录增加了 RGBA 颜色。
//!
//! ```text
//! Header  (1128 字节)
//!   u32 signature, version, headerSize, flags
//!   u8  pathes[1024]
//!   u32 lightmapGroups, detailGroups
//!   f32x3 boundingBox.min, f32x3 boundingBox.max
//!   u32 materialDataOffset, materialDataEnd
//!   u32 facesDataOffset, faceSize, facesCount
//!   u32 vertexDataOffset, vertexSize, vertexCount
//!   u32 sidesDataOffset, sideSize, sidesCount
//!   u32 pointsDataOffset, pointSize, pointsCount
//! Face    (72 字节)
//!   u16 material, u16 flags, u32 index[3], i32 lightmapGroup, i32 detailGroup,
//!   f32x2 textureCoord[3], f32x2 lightmapCoord[3]
//! Vertex  (28 字节)
//!   f32x3 position, f32x3 normal, u8x4 color
//! ```

use super::codec::{FaceRecord, HeaderRecord, MeshFormat, VertexRecord};
use super::layout::{CommonHeader, Record, RecordReader, RecordWriter, TableDescriptor};
use crate::core::error::Result;
use crate::math::Color;

/// 路径提示字段的长度
pub const PATHS_LEN: usize = 1024;

/// 模型标志位
pub mod model_flags {
    pub const NONE: u32 = 0x0000_0000;
    pub const HAS_LIGHTMAP_GROUPS: u32 = 0x0000_0001;
    pub const BOUNDING_BOX_COMPUTED: u32 = 0x0000_0002;
    pub const COLLAPSED: u32 = 0x0000_0004;
    pub const KEEP_NORMALS: u32 = 0x0000_0008;
    pub const PORTALS_PROCESSED: u32 = 0x0000_0010;
}

/// 面标志位
pub mod face_flags {
    pub const NONE: u16 = 0x0000;
    pub const FROM_PLANAR_GROUP: u16 = 0x0001;
    pub const FROM_PURE_AXIAL_GROUP: u16 = 0x0002;
    pub const DISSOLVE_FIRST_EDGE: u16 = 0x0004;
    pub const DISSOLVE_SECOND_EDGE: u16 = 0x0008;
    pub const DISSOLVE_THIRD_EDGE: u16 = 0x0010;
    pub const HAS_SOURCE_LIGHTMAP_COORDS: u16 = 0x0020;
    pub const LANDSCAPE: u16 = 0x0040;
    pub const STRUCTURAL: u16 = 0x0080;
    pub const IS_CHECKED: u16 = 0x8000;
    pub const WORLD_TARGET: u16 = FROM_PLANAR_GROUP | FROM_PURE_AXIAL_GROUP;
}

/// 版本 3 格式标记
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Version3;

impl MeshFormat for Version3 {
    const VERSION: u32 = 3;
    const SIGNATURE: u32 = super::SIGNATURE;

    type Header = Header;
    type Face = Face;
    type Vertex = Vertex;
}

/// 版本 3 文件头
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub common: CommonHeader,
    /// NUL 填充的路径提示
    pub paths: [u8; PATHS_LEN],
    pub lightmap_groups: u32,
    pub detail_groups: u32,
    /// 文件中保存的包围盒（源坐标系），可能未计算
    pub bounding_box: [[f32; 3]; 2],
    /// 侧面表，原样保留
    pub sides: TableDescriptor,
    /// 点表，原样保留
    pub points: TableDescriptor,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            common: CommonHeader::default(),
            paths: [0; PATHS_LEN],
            lightmap_groups: 0,
            detail_groups: 0,
            bounding_box: [[0.0; 3]; 2],
            sides: TableDescriptor::default(),
            points: TableDescriptor::default(),
        }
    }
}

impl Header {
    /// 路径提示字段中第一个 NUL 之前的文本
    pub fn paths_hint(&self) -> String {
        let end = self.paths.iter().position(|&b| b == 0).unwrap_or(PATHS_LEN);
        String::from_utf8_lossy(&self.paths[..end]).into_owned()
    }

    /// 设置路径提示，超出部分被截断，至少保留一个结尾 NUL
    pub fn set_paths_hint(&mut self, hint: &str) {
        self.paths = [0; PATHS_LEN];
        let len = hint.len().min(PATHS_LEN - 1);
        self.paths[..len].copy_from_slice(&hint.as_bytes()[..len]);
    }

    /// 头部包围盒是否被标记为已计算
    pub fn has_bounding_box(&self) -> bool {
        self.common.flags & model_flags::BOUNDING_BOX_COMPUTED != 0
    }

    /// 写入包围盒并设置对应标志位
    pub fn set_bounding_box(&mut self, min: [f32; 3], max: [f32; 3]) {
        self.bounding_box = [min, max];
        self.common.flags |= model_flags::BOUNDING_BOX_COMPUTED;
    }
}

impl Record for Header {
    const SIZE: usize = 1128;

    fn decode(reader: &mut RecordReader<'_>) -> Result<Self> {
        let signature = reader.u32()?;
        let version = reader.u32()?;
        let header_size = reader.u32()?;
        let flags = reader.u32()?;
        let paths = reader.take::<PATHS_LEN>()?;
        let lightmap_groups = reader.u32()?;
        let detail_groups = reader.u32()?;
        let bounding_box = [reader.vec3()?, reader.vec3()?];
        let material_data_offset = reader.u32()?;
        let material_data_end = reader.u32()?;
        let faces = TableDescriptor::decode(reader)?;
        let vertices = TableDescriptor::decode(reader)?;

        Ok(Self {
            common: CommonHeader {
                signature,
                version,
                header_size,
                flags,
                material_data_offset,
                material_data_end,
                faces,
                vertices,
            },
            paths,
            lightmap_groups,
            detail_groups,
            bounding_box,
            sides: TableDescriptor::decode(reader)?,
            points: TableDescriptor::decode(reader)?,
        })
    }

    fn encode(&self, writer: &mut RecordWriter) {
        let c = &self.common;
        writer.u32(c.signature);
        writer.u32(c.version);
        writer.u32(c.header_size);
        writer.u32(c.flags);
        writer.bytes(&self.paths);
        writer.u32(self.lightmap_groups);
        writer.u32(self.detail_groups);
        writer.vec3(self.bounding_box[0]);
        writer.vec3(self.bounding_box[1]);
        writer.u32(c.material_data_offset);
        writer.u32(c.material_data_end);
        c.faces.encode(writer);
        c.vertices.encode(writer);
        self.sides.encode(writer);
        self.points.encode(writer);
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

/// 版本 3 面记录
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Face {
    pub material: u16,
    pub flags: u16,
    pub indices: [u32; 3],
    pub lightmap_group: i32,
    pub detail_group: i32,
    pub tex_coords: [[f32; 2]; 3],
    pub lightmap_coords: [[f32; 2]; 3],
}

impl Record for Face {
    const SIZE: usize = 72;

    fn decode(reader: &mut RecordReader<'_>) -> Result<Self> {
        Ok(Self {
            material: reader.u16()?,
            flags: reader.u16()?,
            indices: reader.u32x3()?,
            lightmap_group: reader.i32()?,
            detail_group: reader.i32()?,
            tex_coords: reader.vec2x3()?,
            lightmap_coords: reader.vec2x3()?,
        })
    }

    fn encode(&self, writer: &mut RecordWriter) {
        writer.u16(self.material);
        writer.u16(self.flags);
        writer.u32x3(self.indices);
        writer.i32(self.lightmap_group);
        writer.i32(self.detail_group);
        writer.vec2x3(self.tex_coords);
        writer.vec2x3(self.lightmap_coords);
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

/// 版本 3 顶点记录
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// RGBA
    pub color: [u8; 4],
}

impl Vertex {
    pub fn color(&self) -> Color {
        let [r, g, b, a] = self.color;
        Color::from_rgba_u8(r, g, b, a)
    }
}

impl Record for Vertex {
    const SIZE: usize = 28;

    fn decode(reader: &mut RecordReader<'_>) -> Result<Self> {
        Ok(Self {
            position: reader.vec3()?,
            normal: reader.vec3()?,
            color: reader.take()?,
        })
    }

    fn encode(&self, writer: &mut RecordWriter) {
        writer.vec3(self.position);
        writer.vec3(self.normal);
        writer.bytes(&self.color);
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
    fn test_signature_bytes() {
        // "IMCS" 按大端打包后以小端写入，磁盘上为 "ICSM"
        assert_eq!(Version3::SIGNATURE.to_le_bytes(), *b"ICSM");
    }

    #[test]
    fn test_header_roundtrip_keeps_opaque_fields() {
        let mut header = Header::default();
        header.common.version = 3;
        header.lightmap_groups = 4;
        header.sides = TableDescriptor { offset: 10, record_size: 20, count: 30 };
        header.set_paths_hint("models/props;textures/props");
        header.set_bounding_box([-1.0, -2.0, -3.0], [1.0, 2.0, 3.0]);

        let decoded = Header::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(decoded.paths_hint(), "models/props;textures/props");
        assert!(decoded.has_bounding_box());
    }

    #[test]
    fn test_paths_hint_truncated() {
        let mut header = Header::default();
        header.set_paths_hint(&"x".repeat(PATHS_LEN + 10));
        assert_eq!(header.paths_hint().len(), PATHS_LEN - 1);
    }

    #[test]
    fn test_vertex_color() {
        let vertex = Vertex {
            color: [255, 255, 255, 255],
            ..Default::default()
        };
        assert_eq!(vertex.color(), Color::WHITE);
    }

    #[test]
    fn test_face_flags() {
        assert_eq!(face_flags::WORLD_TARGET, 0x0003);
    }
}
