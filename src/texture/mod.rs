//! 纹理查找与缓存
//!
//! 材质名称本身不带路径和扩展名，需要在一组目录中按扩展名依次查找。
//! 找到的图像解码为 RGBA8 缩略图，按材质名称缓存。
//!
//! # 使用示例
//!
//! ```rust,no_run
//! use compiled_mesh::texture::{ImageCache, TextureResolver};
//!
//! let resolver = TextureResolver::new(vec!["models".into()]);
//! let mut cache = ImageCache::new();
//! let info = cache.load_material(&resolver, "Wood")?;
//! println!("{}x{}", info.width, info.height);
//! # Ok::<(), compiled_mesh::core::CsmError>(())
//! ```

pub mod resolver;
pub mod cache;

pub use cache::{ImageCache, TextureInfo, THUMBNAIL_SIZE};
pub use resolver::TextureResolver;
