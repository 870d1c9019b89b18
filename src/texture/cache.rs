//! 纹理缩略图缓存

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView, RgbaImage};

use super::resolver::TextureResolver;
use crate::core::error::{Result, TextureError};

/// 缩略图长边的最大像素数
pub const THUMBNAIL_SIZE: u32 = 256;

/// 一张已解码的纹理
#[derive(Debug, Clone)]
pub struct TextureInfo {
    /// 纹理文件路径
    pub path: PathBuf,

    /// 原始宽度
    pub width: u32,

    /// 原始高度
    pub height: u32,

    /// 是否存在不透明度不为 255 的像素
    pub has_alpha: bool,

    /// RGBA8 缩略图，长边不超过 [`THUMBNAIL_SIZE`]
    pub thumbnail: RgbaImage,
}

impl TextureInfo {
    /// 解码图像文件
    pub fn decode(path: &Path) -> Result<Self> {
        let image = image::open(path).map_err(|e| TextureError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(Self::from_image(path, &image))
    }

    fn from_image(path: &Path, image: &DynamicImage) -> Self {
        let (width, height) = image.dimensions();

        let thumbnail = if width.max(height) > THUMBNAIL_SIZE {
            image.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE).to_rgba8()
        } else {
            image.to_rgba8()
        };
        let has_alpha = thumbnail.pixels().any(|p| p.0[3] != u8::MAX);

        Self {
            path: path.to_path_buf(),
            width,
            height,
            has_alpha,
            thumbnail,
        }
    }
}

/// 按材质名称缓存的纹理
///
/// 由一次加载会话持有；`clear` 或丢弃缓存即释放全部图像。
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<String, TextureInfo>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解码 `path` 并以 `name` 缓存，同名条目被替换
    pub fn load(&mut self, name: &str, path: &Path) -> Result<&TextureInfo> {
        if !path.is_file() {
            return Err(TextureError::NotFound {
                name: name.to_string(),
            }
            .into());
        }

        let info = TextureInfo::decode(path)?;
        tracing::debug!(
            "Cached texture '{}' from {} ({}x{})",
            name,
            path.display(),
            info.width,
            info.height
        );

        let info = match self.entries.entry(name.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(info);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(info),
        };
        Ok(info)
    }

    /// 通过查找器定位材质纹理并缓存
    pub fn load_material(&mut self, resolver: &TextureResolver, name: &str) -> Result<&TextureInfo> {
        let path = resolver.resolve(name).ok_or_else(|| TextureError::NotFound {
            name: name.to_string(),
        })?;
        self.load(name, &path)
    }

    pub fn get(&self, name: &str) -> Option<&TextureInfo> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 移除全部条目
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::CsmError;
    use image::Rgba;

    fn write_png(path: &Path, width: u32, height: u32, alpha: u8) {
        let image = RgbaImage::from_pixel(width, height, Rgba([200, 100, 50, alpha]));
        image.save(path).unwrap();
    }

    #[test]
    fn test_load_small_opaque() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Wood.png");
        write_png(&path, 16, 8, 255);

        let mut cache = ImageCache::new();
        let info = cache.load("Wood", &path).unwrap();

        assert_eq!((info.width, info.height), (16, 8));
        assert_eq!(info.thumbnail.dimensions(), (16, 8));
        assert!(!info.has_alpha);
        assert!(cache.contains("Wood"));
    }

    #[test]
    fn test_thumbnail_keeps_aspect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Large.png");
        write_png(&path, 512, 128, 128);

        let mut cache = ImageCache::new();
        let info = cache.load("Large", &path).unwrap();

        assert_eq!((info.width, info.height), (512, 128));
        assert_eq!(info.thumbnail.dimensions(), (256, 64));
        assert!(info.has_alpha);
    }

    #[test]
    fn test_reload_replaces_entry() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.png");
        let second = dir.path().join("b.png");
        write_png(&first, 4, 4, 255);
        write_png(&second, 8, 8, 255);

        let mut cache = ImageCache::new();
        cache.load("Wood", &first).unwrap();
        cache.load("Wood", &second).unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("Wood").unwrap().path, second);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let mut cache = ImageCache::new();
        let err = cache.load("Wood", Path::new("no/such/Wood.png")).unwrap_err();
        assert!(matches!(err, CsmError::Texture(TextureError::NotFound { .. })));
    }

    #[test]
    fn test_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        let mut cache = ImageCache::new();
        let err = cache.load("broken", &path).unwrap_err();
        assert!(matches!(err, CsmError::Texture(TextureError::Decode { .. })));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_load_material_through_resolver() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("Glass.png"), 2, 2, 255);

        let resolver = TextureResolver::new(vec![dir.path().to_path_buf()]);
        let mut cache = ImageCache::new();
        assert!(cache.load_material(&resolver, "Glass").is_ok());

        let err = cache.load_material(&resolver, "Metal").unwrap_err();
        assert!(matches!(err, CsmError::Texture(TextureError::NotFound { .. })));
    }
}
