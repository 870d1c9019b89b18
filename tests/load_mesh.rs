//! CSM 读写与加载的集成测试

use std::path::Path;

use compiled_mesh::core::{Config, MeshError};
use compiled_mesh::csm::version2::{self, Version2};
use compiled_mesh::csm::version3::{self, model_flags, Version3};
use compiled_mesh::csm::layout::Record;
use compiled_mesh::csm::{self, AnyCodec, Codec, MeshFormat, SplitMode};
use compiled_mesh::geometry::loaders::{load_mesh_with_config, CsmLoader, MeshLoader};
use compiled_mesh::geometry::Subset;

const POSITIONS: [[f32; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 2.0],
];

fn v2_records(faces: &[(u16, [u32; 3])]) -> (Vec<version2::Face>, Vec<version2::Vertex>) {
    let faces = faces
        .iter()
        .map(|&(material, indices)| version2::Face {
            material,
            indices,
            tex_coords: [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
            ..Default::default()
        })
        .collect();
    let vertices = POSITIONS
        .iter()
        .map(|&position| version2::Vertex {
            position,
            normal: [0.0, 0.0, 1.0],
        })
        .collect();
    (faces, vertices)
}

/// 写出版本 2 文件，返回写入的面与顶点记录
fn write_v2(
    path: &Path,
    materials: &[&str],
    faces: &[(u16, [u32; 3])],
) -> (Vec<version2::Face>, Vec<version2::Vertex>) {
    let (faces, vertices) = v2_records(faces);

    let mut writer = Codec::<Version2>::create(path).unwrap();
    writer.write_material_names(materials).unwrap();
    let mut writer = writer.end_materials().unwrap();
    for face in &faces {
        writer.write_face(face).unwrap();
    }
    let mut writer = writer.end_faces().unwrap();
    for vertex in &vertices {
        writer.write_vertex(vertex).unwrap();
    }
    writer.end_vertices().unwrap().finish().unwrap();

    (faces, vertices)
}

struct WrittenV3 {
    header: version3::Header,
    faces: Vec<version3::Face>,
    vertices: Vec<version3::Vertex>,
}

fn write_v3(path: &Path, materials: &[&str], faces: &[(u16, [u32; 3])]) -> WrittenV3 {
    let faces: Vec<_> = faces
        .iter()
        .enumerate()
        .map(|(i, &(material, indices))| version3::Face {
            material,
            indices,
            tex_coords: [[0.25, 0.5], [i as f32, 0.0], [1.0, 0.75]],
            lightmap_group: 1,
            detail_group: -1,
            ..Default::default()
        })
        .collect();
    let vertices: Vec<_> = POSITIONS
        .iter()
        .enumerate()
        .map(|(i, &position)| version3::Vertex {
            position,
            normal: [0.0, 1.0, 0.0],
            color: [10, 20, 30, 40 + i as u8],
        })
        .collect();

    let mut writer = Codec::<Version3>::create(path).unwrap();
    writer.set_flags(model_flags::KEEP_NORMALS);
    writer.header_mut().lightmap_groups = 2;
    writer.write_material_names(materials).unwrap();
    let mut writer = writer.end_materials().unwrap();
    for face in &faces {
        writer.write_face(face).unwrap();
    }
    let mut writer = writer.end_faces().unwrap();
    for vertex in &vertices {
        writer.write_vertex(vertex).unwrap();
    }
    let header = writer.end_vertices().unwrap().finish().unwrap();

    WrittenV3 {
        header,
        faces,
        vertices,
    }
}

fn concat_bytes<R: Record>(records: &[R]) -> Vec<u8> {
    records.iter().flat_map(R::to_bytes).collect()
}

#[test]
fn test_v2_tables_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesh.csm");
    let (faces, vertices) = write_v2(&path, &["Wood", "Glass"], &[(0, [0, 1, 2]), (1, [0, 2, 3])]);

    assert_eq!(csm::detect_version(&path), 2);

    let mut codec = Codec::<Version2>::new();
    codec.open(&path).unwrap();
    assert_eq!(codec.version(), 2);
    assert_eq!(codec.face_count(), 2);
    assert_eq!(codec.vertex_count(), 4);
    assert_eq!(codec.read_materials(SplitMode::Quoted).unwrap(), vec!["Wood", "Glass"]);

    assert_eq!(codec.read_faces().unwrap(), faces);
    assert_eq!(codec.read_vertices().unwrap(), vertices);
    assert_eq!(codec.read_faces_raw().unwrap(), concat_bytes(&faces));
    assert_eq!(codec.read_vertices_raw().unwrap(), concat_bytes(&vertices));
    assert_eq!(codec.read_vertices_raw().unwrap().len(), 4 * 24);

    codec.close();
    assert_eq!(codec.version(), 0);
}

#[test]
fn test_v3_tables_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesh.csm");
    let written = write_v3(&path, &["Stone", "Moss"], &[(0, [0, 1, 2]), (1, [3, 2, 0])]);

    assert_eq!(csm::detect_version(&path), 3);

    let mut codec = Codec::<Version3>::new();
    codec.open(&path).unwrap();
    assert_eq!(codec.header(), &written.header);
    assert_eq!(codec.flags(), model_flags::KEEP_NORMALS);
    assert_eq!(codec.header().lightmap_groups, 2);

    assert_eq!(codec.read_faces().unwrap(), written.faces);
    assert_eq!(codec.read_vertices().unwrap(), written.vertices);
    assert_eq!(codec.read_faces_raw().unwrap(), concat_bytes(&written.faces));
    assert_eq!(codec.read_vertices_raw().unwrap(), concat_bytes(&written.vertices));

    let tables = codec.read_tables().unwrap();
    assert_eq!(tables.faces, written.faces);
    assert_eq!(tables.vertices, written.vertices);
}

#[test]
fn test_quoted_material_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quoted.csm");
    write_v2(&path, &["Wood", "Metal Plate", "Glass"], &[(1, [0, 1, 2])]);

    let mut codec = Codec::<Version2>::new();
    codec.open(&path).unwrap();
    assert_eq!(
        codec.read_materials(SplitMode::Quoted).unwrap(),
        vec!["Wood", "Metal Plate", "Glass"]
    );
    assert_eq!(
        codec.read_material_tokens(SplitMode::Legacy).unwrap(),
        vec!["Wood", "\"Metal", "Plate\"", "Glass"]
    );
}

#[test]
fn test_any_codec_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let v2 = dir.path().join("v2.csm");
    let v3 = dir.path().join("v3.csm");
    write_v2(&v2, &["A"], &[(0, [0, 1, 2])]);
    write_v3(&v3, &["A"], &[(0, [0, 1, 2])]);

    let codec = AnyCodec::open(&v2).unwrap();
    assert!(matches!(codec, AnyCodec::V2(_)));
    assert_eq!(codec.face_size(), 40);

    let codec = AnyCodec::open(&v3).unwrap();
    assert!(matches!(codec, AnyCodec::V3(_)));
    assert_eq!(codec.face_size(), 72);
    assert_eq!(codec.vertex_size(), 28);
}

#[test]
fn test_load_v3_geometry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesh.csm");
    write_v3(
        &path,
        &["A", "B"],
        &[(1, [0, 1, 2]), (0, [0, 2, 3]), (1, [1, 2, 3])],
    );

    let loaded = CsmLoader::load_from_file(&path).unwrap();
    let mesh = &loaded.mesh;

    assert_eq!(loaded.info.version, 3);
    assert_eq!(loaded.info.face_data_size, 3 * 72);
    assert_eq!(loaded.info.vertex_data_size, 4 * 28);
    assert_eq!(mesh.subsets, vec![Subset::new(0, 0, 3), Subset::new(1, 3, 6)]);
    assert_eq!(mesh.vertices.len(), 9);
    assert_eq!(mesh.normal_lines.len(), 18);
    assert_eq!(mesh.wire_lines.len(), 18);
    assert!(mesh.validate().is_ok());

    // 子网格 0 的第一个角是面 1 的顶点 0；第三个角是顶点 3，Y/Z 已交换
    assert_eq!(mesh.vertices[0].position, [0.0, 0.0, 0.0]);
    assert_eq!(mesh.vertices[2].position, [0.0, 2.0, 1.0]);
    assert_eq!(mesh.vertices[2].normal, [0.0, 0.0, 1.0]);

    assert_eq!(mesh.bounds.min_array(), [0.0, 0.0, 0.0]);
    assert_eq!(mesh.bounds.max_array(), [1.0, 2.0, 1.0]);
}

#[test]
fn test_corrupt_indices_rejected() {
    let dir = tempfile::tempdir().unwrap();

    let bad_vertex = dir.path().join("bad_vertex.csm");
    write_v2(&bad_vertex, &["A"], &[(0, [0, 1, 7])]);
    let err = CsmLoader::load_from_file(&bad_vertex).unwrap_err();
    assert!(matches!(err.as_mesh(), Some(MeshError::CorruptIndex { face: 0, .. })));

    let bad_material = dir.path().join("bad_material.csm");
    write_v2(&bad_material, &["A"], &[(0, [0, 1, 2]), (3, [0, 1, 2])]);
    let err = CsmLoader::load_from_file(&bad_material).unwrap_err();
    assert!(matches!(err.as_mesh(), Some(MeshError::CorruptIndex { face: 1, .. })));
}

#[test]
fn test_empty_mesh_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csm");
    write_v3(&path, &["A"], &[]);

    let err = CsmLoader::load_from_file(&path).unwrap_err();
    assert!(matches!(err.as_mesh(), Some(MeshError::EmptyMesh { faces: 0, .. })));
}

#[test]
fn test_truncated_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesh.csm");
    write_v2(&path, &["A"], &[(0, [0, 1, 2])]);

    let mut bytes = std::fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 10);

    let err = CsmLoader::load_from_memory(&bytes).unwrap_err();
    assert!(matches!(err.as_mesh(), Some(MeshError::ShortTransfer { .. })));
}

#[test]
fn test_oversized_face_table_rejected() {
    let mut header = version2::Header::default();
    header.common.version = Version2::VERSION;
    header.common.material_data_offset = version2::Header::SIZE as u32;
    header.common.material_data_end = version2::Header::SIZE as u32 + 2;
    header.common.faces.offset = version2::Header::SIZE as u32 + 2;
    header.common.faces.count = u32::MAX;
    header.common.vertices.offset = version2::Header::SIZE as u32 + 2;
    header.common.vertices.count = 1;

    let mut bytes = header.to_bytes();
    bytes.extend_from_slice(b"A\0");
    bytes.resize(1024, 0);

    let err = CsmLoader::load_from_memory(&bytes).unwrap_err();
    assert!(matches!(err.as_mesh(), Some(MeshError::ShortTransfer { .. })));
}

#[test]
fn test_load_with_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesh.csm");
    write_v2(&path, &["Metal Plate"], &[(0, [0, 1, 2])]);

    let config = Config::from_toml(
        r#"
        [materials]
        split = "legacy"
        search_dirs = ["textures"]

        [geometry]
        normal_length = 1.0
        "#,
    )
    .unwrap();

    // 旧版分词把带引号的名称拆成两个材质
    let loaded = load_mesh_with_config(&path, &config).unwrap();
    assert_eq!(loaded.info.materials, vec!["Metal", "Plate"]);
    assert_eq!(loaded.mesh.subsets.len(), 2);
    assert_eq!(
        loaded.info.material_directories,
        vec![dir.path().to_path_buf(), dir.path().join("textures")]
    );
    assert_eq!(loaded.mesh.normal_lines[1].position, [0.0, 1.0, 0.0]);
}
