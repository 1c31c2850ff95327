use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use vertigo_engine::logging::{init_logging, LoggingConfig};
use vertigo_engine::render::RotationMode;
use vertigo_engine::window::{Runtime, RuntimeConfig};

mod demo;

use demo::{DemoScene, SceneKind};

/// Spins a textured model in a window.
#[derive(Debug, Parser)]
#[command(name = "vertigo-viewer", version)]
struct Args {
    /// Draw a single textured quad (default).
    #[arg(long, conflicts_with = "cube")]
    quad: bool,

    /// Draw a textured cube under a wireframe outline.
    #[arg(long)]
    cube: bool,

    /// Rotate around the Z axis only.
    #[arg(long)]
    z_only: bool,

    /// Log filter in env_logger syntax; overrides RUST_LOG.
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,

    /// Image applied to the model. Without one the model is solid gold.
    image: Option<PathBuf>,
}

impl Args {
    fn scene_kind(&self) -> SceneKind {
        match (self.quad, self.cube) {
            (false, true) => SceneKind::Cube,
            _ => SceneKind::Quad,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..LoggingConfig::default()
    });

    let image = args
        .image
        .as_ref()
        .map(|path| {
            let decoded = image::open(path)
                .with_context(|| format!("failed to decode {}", path.display()))?;
            log::info!("loaded {} ({}x{})", path.display(), decoded.width(), decoded.height());
            Ok::<_, anyhow::Error>(decoded.to_rgba8())
        })
        .transpose()?;

    let mut config = RuntimeConfig {
        title: "vertigo".to_string(),
        ..RuntimeConfig::default()
    };
    if args.z_only {
        config.renderer.rotation_mode = RotationMode::ZAxis;
    }

    let scene = DemoScene::new(args.scene_kind(), image);
    Runtime::run(config, scene).context("viewer stopped")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_is_the_default_scene() {
        let args = Args::try_parse_from(["vertigo-viewer"]).unwrap();
        assert_eq!(args.scene_kind(), SceneKind::Quad);
        assert!(args.image.is_none());
    }

    #[test]
    fn cube_and_image_parse() {
        let args = Args::try_parse_from(["vertigo-viewer", "--cube", "robot.png"]).unwrap();
        assert_eq!(args.scene_kind(), SceneKind::Cube);
        assert_eq!(args.image, Some(PathBuf::from("robot.png")));
    }

    #[test]
    fn scenes_are_exclusive() {
        assert!(Args::try_parse_from(["vertigo-viewer", "--quad", "--cube"]).is_err());
    }
}
