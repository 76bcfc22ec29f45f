//! `glint`: render a demo scene to a PNG file.

mod config;
mod scenes;

use anyhow::{bail, Context, Result};
use clap::Parser;
use config::ConfigFile;
use glint_renderer::{load_triangles, Camera, Renderer};
use scenes::{Demo, DemoScene};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Progressive CPU path tracer
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Scene to render
    #[arg(long, value_enum, default_value_t)]
    scene: DemoScene,

    /// Triangle file for the model scene
    #[arg(long)]
    model: Option<PathBuf>,

    /// JSON settings file applied over the scene defaults
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Total samples per pixel
    #[arg(long)]
    samples: Option<u32>,

    /// Samples per pixel added by each pass
    #[arg(long)]
    samples_per_pass: Option<u32>,

    #[arg(long)]
    max_bounces: Option<u32>,

    /// Worker threads besides the main thread
    #[arg(long)]
    threads: Option<usize>,

    /// Output image
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,
}

impl Args {
    fn overrides(&self) -> config::RenderOverrides {
        config::RenderOverrides {
            width: self.width,
            height: self.height,
            samples: self.samples,
            samples_per_pass: self.samples_per_pass,
            max_bounces: self.max_bounces,
            threads: self.threads,
        }
    }
}

fn build_demo(args: &Args) -> Result<Demo> {
    let demo = match args.scene {
        DemoScene::Spheres => scenes::spheres(),
        DemoScene::Cornell => scenes::cornell_box(),
        DemoScene::Model => {
            let Some(path) = &args.model else {
                bail!("The model scene needs a triangle file (--model FILE)");
            };
            let triangles = load_triangles(path)
                .with_context(|| format!("Failed to load model {}", path.display()))?;
            scenes::model(&triangles)
        }
    };
    Ok(demo)
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let Demo {
        scene,
        mut camera,
        mut settings,
    } = build_demo(&args)?;

    if let Some(path) = &args.config {
        ConfigFile::load(path)?.apply(&mut settings, &mut camera);
    }
    args.overrides().apply(&mut settings);

    log::info!(
        "Rendering {:?} at {}x{}, {} samples per pixel",
        args.scene,
        settings.width,
        settings.height,
        settings.samples
    );

    let camera = Camera::try_from(camera).context("Invalid camera settings")?;
    let mut renderer =
        Renderer::new(Arc::new(scene), settings).context("Failed to start renderer")?;

    let start = Instant::now();
    while !renderer.is_complete() {
        let remaining = settings.samples - renderer.sample_index();
        let done = renderer.render_samples(&camera, remaining.min(settings.samples_per_pass));
        log::info!(
            "{}/{} samples ({:.1}s)",
            done,
            settings.samples,
            start.elapsed().as_secs_f64()
        );
    }

    let film = renderer.film();
    let image = image::RgbaImage::from_raw(film.width(), film.height(), film.to_rgba8())
        .context("Film size does not match its pixel buffer")?;
    image
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    log::info!(
        "Wrote {} in {:.1}s",
        args.output.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
