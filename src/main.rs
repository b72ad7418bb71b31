// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use photo_capture::{BackendKind, CaptureTarget};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "photo-capture")]
#[command(about = "Capture still photos through the photo pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a photo, using a JPEG file as the camera frame
    Capture {
        /// JPEG file served as the still frame
        #[arg(short, long)]
        input: PathBuf,

        /// memory, disk, cameraRoll or temp (or the numeric code)
        #[arg(short, long, default_value = "cameraRoll")]
        target: CaptureTarget,

        /// Bound on the output's longer side in pixels
        #[arg(short = 's', long, default_value_t = photo_capture::constants::DEFAULT_MAX_SIZE)]
        max_size: u32,

        /// JPEG quality in (0, 1]
        #[arg(short, long, default_value_t = photo_capture::constants::DEFAULT_JPEG_QUALITY)]
        quality: f64,

        /// Sensor orientation reported by the session, clockwise degrees
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        orientation: i32,

        /// Frame delivery style: legacy or camera2
        #[arg(short, long, default_value = "camera2")]
        backend: BackendKind,

        /// Put library, cache and data directories under this root
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Switch the flash LED
    Flash {
        /// 0 = off, 1 = torch
        #[arg(short, long, default_value = "0")]
        mode: i64,

        /// LED class directory (default: /sys/class/leds)
        #[arg(long)]
        leds_dir: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=photo_capture=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Capture {
            input,
            target,
            max_size,
            quality,
            orientation,
            backend,
            output_dir,
        } => cli::take_photo(cli::PhotoArgs {
            input,
            target,
            max_size,
            quality,
            orientation,
            backend,
            output_dir,
        }),
        Commands::Flash { mode, leds_dir } => cli::switch_flash(mode, leds_dir),
    }
}
