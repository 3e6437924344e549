use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use astra_engine::ShaderSources;
use astra_engine::coords::Extent;
use astra_engine::logging::{init_logging, LoggingConfig};

mod app;
mod headless;

/// Draws a WGSL vertex/fragment pair to a window at the display refresh rate.
#[derive(Debug, Parser)]
#[command(name = "astra-viewer", version, about)]
struct Args {
    /// Vertex shader source; defaults to the built-in triangle.
    #[arg(long, value_name = "PATH")]
    vertex: Option<PathBuf>,

    /// Fragment shader source; defaults to the built-in solid red.
    #[arg(long, value_name = "PATH")]
    fragment: Option<PathBuf>,

    /// Drawable width in physical pixels.
    #[arg(long, value_name = "PX", default_value_t = 640)]
    width: u32,

    /// Drawable height in physical pixels.
    #[arg(long, value_name = "PX", default_value_t = 480)]
    height: u32,

    #[arg(long, value_name = "TEXT", default_value = "astra")]
    title: String,

    /// Log filter in env_logger syntax; overrides RUST_LOG.
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,

    /// Drive N ticks through the headless backend and print what was
    /// recorded instead of opening a window.
    #[arg(long, value_name = "N")]
    headless_frames: Option<u32>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..LoggingConfig::default()
    });

    let shaders = load_shaders(args.vertex.as_deref(), args.fragment.as_deref())?;
    let size = Extent::new(args.width, args.height);

    match args.headless_frames {
        Some(frames) => headless::run(&shaders, size, frames),
        None => app::run(app::ViewerConfig {
            title: args.title,
            size,
            shaders,
            engine: Default::default(),
        }),
    }
}

fn load_shaders(vertex: Option<&Path>, fragment: Option<&Path>) -> Result<ShaderSources> {
    let mut shaders = ShaderSources::default();

    if let Some(path) = vertex {
        shaders.vertex = read_source(path)?;
        shaders.label = Some("viewer".into());
    }
    if let Some(path) = fragment {
        shaders.fragment = read_source(path)?;
        shaders.label = Some("viewer".into());
    }

    Ok(shaders)
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read shader `{}`", path.display()))
}
