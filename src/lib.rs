//! compiled_mesh - Compiled Static Mesh 读写与几何构建
//!
//! 本库读写 CSM 二进制网格格式（版本 2 和版本 3），并将其转换为
//! 可直接上传到 GPU 的渲染缓冲。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（日志、配置、错误处理）
//! - `math`: 数学类型（基于 nalgebra）
//! - `csm`: 文件格式（二进制读写、编解码器、版本探测）
//! - `geometry`: 几何构建模块（渲染顶点、子网格、调试线段、包围盒、加载器）
//! - `texture`: 材质纹理查找与缩略图缓存
//!
//! # 使用示例
//!
//! ```no_run
//! use compiled_mesh::core::Config;
//! use compiled_mesh::geometry::loaders::load_mesh_with_config;
//! use std::path::Path;
//!
//! let config = Config::from_file_or_default("csm.toml");
//! let loaded = load_mesh_with_config(Path::new("model.csm"), &config)?;
//!
//! for subset in &loaded.mesh.subsets {
//!     println!("材质 {}: {} 个三角形", subset.material, subset.face_count());
//! }
//! # Ok::<(), compiled_mesh::core::CsmError>(())
//! ```

pub mod core;
pub mod math;
pub mod csm;
pub mod geometry;
pub mod texture;
