mod pipeline;
mod viewer;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use framelab_core::Frame;
use framelab_photo::Stitcher;
use image::RgbImage;
use log::info;

#[derive(Parser)]
#[command(name = "framelab", version, about = "Interactive image processing playground")]
struct Cli {
    /// Worker threads for the processing pool (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open a still image in the interactive viewer
    Open {
        /// Path to the image file
        image: PathBuf,
    },
    /// Play a video through the processing pipeline
    Play {
        /// Animated GIF or directory of numbered frames
        video: PathBuf,
    },
    /// Stitch overlapping photos into a panorama
    Stitch {
        /// Two or more overlapping images, in capture order
        images: Vec<PathBuf>,
        /// Write the panorama here and exit instead of opening the viewer
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("framelab=info"))
        .init();

    let cli = Cli::parse();
    let threads = framelab_core::init_global_thread_pool(cli.threads);
    info!("processing pool running on {} threads", threads);

    match cli.command {
        Command::Open { image } => {
            let frame = load_frame(&image)?;
            run_viewer(viewer::Source::Still(frame))
        }
        Command::Play { video } => {
            let capture = framelab_videoio::open_video(&video)
                .with_context(|| format!("Could not open video {}", video.display()))?;
            run_viewer(viewer::Source::Video(capture))
        }
        Command::Stitch { images, output } => {
            if images.len() < 2 {
                bail!("Need at least two images to perform stitching");
            }
            let frames = load_rgb_set(&images)?;
            let panorama = Stitcher::default()
                .stitch(&frames)
                .context("stitching failed")?;
            match output {
                Some(path) => {
                    panorama
                        .save(&path)
                        .with_context(|| format!("could not write {}", path.display()))?;
                    info!("panorama saved to {}", path.display());
                    Ok(())
                }
                None => run_viewer(viewer::Source::Panorama(Frame::Rgb(panorama))),
            }
        }
    }
}

fn run_viewer(source: viewer::Source) -> Result<()> {
    viewer::run(source).map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}

fn load_frame(path: &Path) -> Result<Frame> {
    let dynamic = image::open(path)
        .with_context(|| format!("Could not open or find the image {}", path.display()))?;
    Ok(Frame::from_dynamic(dynamic))
}

fn load_rgb_set(paths: &[PathBuf]) -> Result<Vec<RgbImage>> {
    paths
        .iter()
        .map(|path| {
            let dynamic = image::open(path)
                .with_context(|| format!("Could not open or find the image {}", path.display()))?;
            Ok(dynamic.into_rgb8())
        })
        .collect()
}
