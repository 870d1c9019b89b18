/// CSM 写入示例
///
/// 写出一个由两个三角形组成、使用两种材质的版本 3 网格，再读回并打印构建结果。
///
/// 运行方式：
/// ```
/// cargo run --example write_quad
/// ```

use compiled_mesh::core::Result;
use compiled_mesh::csm::version3::{self, face_flags, Version3};
use compiled_mesh::csm::{self, Codec};
use compiled_mesh::geometry::loaders::{CsmLoader, MeshLoader};
use std::path::Path;

fn main() {
    // 初始化日志系统
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== CSM 写入示例 ===\n");

    let path = std::env::temp_dir().join("write_quad.csm");

    if let Err(e) = write_quad(&path) {
        eprintln!("✗ 写入失败: {}", e);
        std::process::exit(1);
    }
    println!("已写入: {} (版本 {})", path.display(), csm::detect_version(&path));

    match CsmLoader::load_from_file(&path) {
        Ok(loaded) => {
            println!("\n✓ 加载成功！\n");

            println!("网格信息:");
            println!("  面数: {}", loaded.info.face_count);
            println!("  顶点数: {}", loaded.info.vertex_count);
            println!("  渲染顶点数: {}", loaded.mesh.vertex_count());
            println!("  法线线段端点: {}", loaded.mesh.normal_lines.len());
            println!("  线框线段端点: {}", loaded.mesh.wire_lines.len());

            println!("\n子网格信息:");
            for subset in &loaded.mesh.subsets {
                println!(
                    "  材质 {} ({}): 起始 {}, 三角形 {}",
                    subset.material,
                    loaded.info.materials[subset.material as usize],
                    subset.offset,
                    subset.face_count()
                );
            }

            println!(
                "\n包围盒: {:?} .. {:?}",
                loaded.mesh.bounds.min_array(),
                loaded.mesh.bounds.max_array()
            );

            match loaded.mesh.validate() {
                Ok(()) => println!("\n✓ 数据验证通过"),
                Err(e) => println!("\n✗ 数据验证失败: {}", e),
            }
        }
        Err(e) => {
            eprintln!("\n✗ 加载失败: {}", e);
            std::process::exit(1);
        }
    }
}

/// 地面上的 2x2 四边形（源坐标系 Z 轴向上）
fn write_quad(path: &Path) -> Result<()> {
    let corners = [
        [-1.0, -1.0, 0.0],
        [1.0, -1.0, 0.0],
        [1.0, 1.0, 0.0],
        [-1.0, 1.0, 0.0],
    ];
    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    let mut writer = Codec::<Version3>::create(path)?;
    writer.header_mut().set_paths_hint("textures");
    writer.header_mut().set_bounding_box([-1.0, -1.0, 0.0], [1.0, 1.0, 0.0]);
    writer.write_material_names(&["Floor Tile", "Grass"])?;

    let mut writer = writer.end_materials()?;
    for (material, indices) in [(0u16, [0u32, 1, 2]), (1, [0, 2, 3])] {
        writer.write_face(&version3::Face {
            material,
            flags: face_flags::STRUCTURAL,
            indices,
            tex_coords: indices.map(|i| uvs[i as usize]),
            ..Default::default()
        })?;
    }

    let mut writer = writer.end_faces()?;
    for position in corners {
        writer.write_vertex(&version3::Vertex {
            position,
            normal: [0.0, 0.0, 1.0],
            color: [255, 255, 255, 255],
        })?;
    }

    writer.end_vertices()?.finish()?;
    Ok(())
}
