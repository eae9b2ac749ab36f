use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use memory_palace::{app::ViewerApp, config::ViewerConfig};

#[derive(Parser, Debug)]
#[command(name = "memory-palace")]
#[command(about = "Parthenon Memory Workshop viewer")]
struct Cli {
    /// Directory that web-style model paths such as /models/x.glb resolve against
    #[arg(long, value_name = "DIR")]
    assets: Option<PathBuf>,

    /// JSON manifest of extra memory objects (repeatable)
    #[arg(long = "memory", value_name = "MANIFEST")]
    memory: Vec<PathBuf>,

    /// Window width in logical pixels
    #[arg(long)]
    width: Option<u32>,

    /// Window height in logical pixels
    #[arg(long)]
    height: Option<u32>,

    /// Present without waiting for vertical sync
    #[arg(long)]
    no_vsync: bool,
}

impl Cli {
    fn into_config(self) -> ViewerConfig {
        let mut config = ViewerConfig::from_env();
        if let Some(assets) = self.assets {
            config = config.with_asset_root(assets);
        }

        let (default_width, default_height) = config.window_size;
        config = config
            .with_window_size(
                self.width.unwrap_or(default_width),
                self.height.unwrap_or(default_height),
            )
            .with_vsync(!self.no_vsync);

        self.memory
            .into_iter()
            .fold(config, |config, manifest| config.with_memory_manifest(manifest))
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("memory_palace=info,wgpu=warn"),
    )
    .init();

    let config = Cli::parse().into_config();
    log::debug!("Asset root: {}", config.asset_root.display());

    ViewerApp::new(config)
        .run()
        .context("Viewer terminated with an error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "memory-palace",
            "--assets",
            "/srv/public",
            "--memory",
            "a.json",
            "--memory",
            "b.json",
            "--width",
            "800",
            "--no-vsync",
        ]);
        let config = cli.into_config();

        assert_eq!(config.asset_root, PathBuf::from("/srv/public"));
        assert_eq!(config.memory_manifests, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        assert_eq!(config.window_size, (800, 800));
        assert!(!config.vsync);
    }

    #[test]
    fn test_cli_defaults() {
        let config = Cli::parse_from(["memory-palace", "--assets", "public"]).into_config();
        assert_eq!(config.window_size, (1280, 800));
        assert!(config.vsync);
        assert!(config.memory_manifests.is_empty());
    }
}
