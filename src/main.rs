//! csm_info - CSM 网格文件检查工具
//!
//! 加载一个 CSM 文件，输出版本、数量统计、包围盒、子网格和材质信息。
//!
//! # 使用方法
//!
//! ```bash
//! # 输出摘要
//! cargo run -- model.csm
//!
//! # 只探测版本
//! cargo run -- model.csm --sniff
//!
//! # 额外的纹理目录，并尝试加载每个材质的纹理
//! cargo run -- model.csm --material-dir textures --textures
//! ```
//!
//! 加载失败时以非零退出码结束。

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use compiled_mesh::core::config::LogLevel;
use compiled_mesh::core::{log, Config};
use compiled_mesh::csm;
use compiled_mesh::geometry::loaders::load_mesh_with_config;
use compiled_mesh::geometry::LoadedMesh;
use compiled_mesh::texture::{ImageCache, TextureResolver};
use compiled_mesh::{app_error, app_info};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "csm_info", version, about = "Inspect Compiled Static Mesh files")]
struct Args {
    /// 要检查的 CSM 文件
    file: PathBuf,

    /// 配置文件路径（默认读取当前目录的 csm.toml）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 额外的纹理搜索目录，可重复
    #[arg(long = "material-dir", value_name = "DIR")]
    material_dirs: Vec<String>,

    /// 覆盖配置中的日志级别
    #[arg(long, value_enum)]
    log_level: Option<LogLevelArg>,

    /// 逐行列出材质名称
    #[arg(long)]
    materials: bool,

    /// 查找并解码每个材质的纹理
    #[arg(long)]
    textures: bool,

    /// 只探测文件版本
    #[arg(long)]
    sniff: bool,
}

/// 命令行中的日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum LogLevelArg {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevelArg> for LogLevel {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Trace => LogLevel::Trace,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Error => LogLevel::Error,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // 1. 加载配置（在初始化日志之前）
    let mut config = match &args.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::from_file_or_default("csm.toml"),
    };

    // 2. 应用命令行参数
    config.materials.search_dirs.extend(args.material_dirs.iter().cloned());
    if let Some(level) = args.log_level {
        config.logging.level = level.into();
    }

    // 3. 验证配置
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    // 4. 初始化日志系统
    let log_file = config
        .logging
        .file_output
        .then(|| config.logging.log_file.as_str());
    log::init_logger(config.logging.level, config.logging.file_output, log_file);
    app_info!(version = env!("CARGO_PKG_VERSION"), "csm_info starting");

    let result = if args.sniff {
        sniff(&args)
    } else {
        inspect(&args, &config)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            app_error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// 只读取文件前 8 字节判断版本
fn sniff(args: &Args) -> Result<()> {
    let version = csm::detect_version(&args.file);
    println!("{}: version {}", args.file.display(), version);

    if !csm::is_supported_version(version) {
        anyhow::bail!("unsupported version {}", version);
    }
    Ok(())
}

fn inspect(args: &Args, config: &Config) -> Result<()> {
    let loaded = load_mesh_with_config(&args.file, config)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    print_summary(&loaded);

    if args.materials {
        println!("Materials:");
        for (index, name) in loaded.info.materials.iter().enumerate() {
            println!("  [{}] {}", index, name);
        }
    }

    if args.textures {
        load_textures(&loaded, config);
    }

    Ok(())
}

fn print_summary(loaded: &LoadedMesh) {
    let info = &loaded.info;
    let mesh = &loaded.mesh;

    println!("File:      {}", loaded_path(loaded));
    println!("Version:   {}", info.version);
    println!("Flags:     0x{:08X}", info.flags);
    println!("Faces:     {} ({} bytes)", info.face_count, info.face_data_size);
    println!("Vertices:  {} ({} bytes)", info.vertex_count, info.vertex_data_size);
    println!("Materials: {}", info.material_count());

    if let Some(size) = info.bounding_box.size() {
        let min = info.bounding_box.min_array();
        let max = info.bounding_box.max_array();
        println!(
            "Bounds:    ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})  size ({:.3}, {:.3}, {:.3})",
            min[0], min[1], min[2], max[0], max[1], max[2], size.x, size.y, size.z
        );
    }

    println!("Subsets:");
    for subset in &mesh.subsets {
        let name = info
            .materials
            .get(subset.material as usize)
            .map(String::as_str)
            .unwrap_or("<default>");
        println!(
            "  [{}] {:<24} offset {:>8}  triangles {:>8}",
            subset.material,
            name,
            subset.offset,
            subset.face_count()
        );
    }
}

fn loaded_path(loaded: &LoadedMesh) -> String {
    loaded
        .info
        .path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<memory>".to_string())
}

/// 纹理缺失或解码失败只记录，不影响退出码
fn load_textures(loaded: &LoadedMesh, config: &Config) {
    let resolver = TextureResolver::for_mesh(&loaded.info, &config.materials);
    let mut cache = ImageCache::new();

    println!("Textures:");
    for name in &loaded.info.materials {
        match cache.load_material(&resolver, name) {
            Ok(texture) => println!(
                "  {:<24} {} ({}x{}{})",
                name,
                texture.path.display(),
                texture.width,
                texture.height,
                if texture.has_alpha { ", alpha" } else { "" }
            ),
            Err(e) => {
                app_error!("{}", e);
                println!("  {:<24} <{}>", name, e);
            }
        }
    }
    app_info!("Loaded {} of {} textures", cache.len(), loaded.info.material_count());
}
