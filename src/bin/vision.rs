//! vision - run the heuristic detectors on an image or video and print JSON,
//! or convert images and videos

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

use heuristic_vision::ingest::TranscodeOptions;
use heuristic_vision::{codec, Vision, VisionConfig};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config file (JSON, or TOML by extension).
    #[arg(long, env = "VISION_CONFIG")]
    config: Option<PathBuf>,
    /// Backend name overriding the configured driver (native|null).
    #[arg(long)]
    driver: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect colored regions, shapes and faces in an image.
    Detect { image: PathBuf },
    /// Detect faces in an image.
    Faces { image: PathBuf },
    /// Estimate a coarse pose from an image.
    Pose { image: PathBuf },
    /// Track motion through a video; one JSON line per sampled frame.
    Track { video: PathBuf },
    /// Re-encode an image, optionally resized and rotated, at the configured quality.
    Convert {
        image: PathBuf,
        output: PathBuf,
        /// Fit inside this width (keeps aspect).
        #[arg(long)]
        width: Option<u32>,
        /// Fit inside this height (keeps aspect).
        #[arg(long)]
        height: Option<u32>,
        /// Clockwise rotation in degrees.
        #[arg(long)]
        rotate: Option<f64>,
        /// Fill for corners uncovered by rotation.
        #[arg(long, default_value = "#000000")]
        background: String,
    },
    /// Write the frame at a timestamp of a video to an image file.
    Frame {
        video: PathBuf,
        /// Seconds from the start of the video.
        seconds: f64,
        output: PathBuf,
    },
    /// Re-encode a video.
    Transcode {
        video: PathBuf,
        output: PathBuf,
        #[arg(long, default_value = "libx264")]
        vcodec: String,
        #[arg(long, default_value_t = 23)]
        crf: u8,
        #[arg(long, default_value = "medium")]
        preset: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = VisionConfig::load_from(args.config.as_deref())?;
    if let Some(driver) = args.driver {
        config.driver = driver.trim().to_lowercase();
    }
    let vision = Vision::from_config(config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.command {
        Command::Detect { image } => print_json(&mut out, &vision.detect_objects(&image)?)?,
        Command::Faces { image } => print_json(&mut out, &vision.detect_faces(&image)?)?,
        Command::Pose { image } => print_json(&mut out, &vision.estimate_pose(&image)?)?,
        Command::Track { video } => {
            let mut frames = 0usize;
            for motion in vision.track(&video)? {
                serde_json::to_writer(&mut out, &motion)?;
                writeln!(out)?;
                frames += 1;
            }
            log::info!("tracked {} frames from {}", frames, video.display());
        }
        Command::Convert {
            image,
            output,
            width,
            height,
            rotate,
            background,
        } => {
            let mut buffer = codec::decode(&image)?;
            if width.is_some() || height.is_some() {
                let w = width.unwrap_or(u32::MAX);
                let h = height.unwrap_or(u32::MAX);
                buffer = codec::resize(&buffer, w, h, true);
            }
            if let Some(degrees) = rotate {
                let fill = codec::parse_hex_color(&background)
                    .ok_or_else(|| anyhow!("invalid background color {:?}", background))?;
                buffer = codec::rotate(&buffer, degrees, fill);
            }
            vision.save(&buffer, &output)?;
            log::info!("wrote {}", output.display());
        }
        Command::Frame {
            video,
            seconds,
            output,
        } => {
            vision.extract_frame(&video, seconds, &output)?;
            log::info!("wrote {}", output.display());
        }
        Command::Transcode {
            video,
            output,
            vcodec,
            crf,
            preset,
        } => {
            let options = TranscodeOptions { vcodec, crf, preset };
            vision.transcode(&video, &output, &options)?;
            log::info!("wrote {}", output.display());
        }
    }
    out.flush()?;
    Ok(())
}

fn print_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
