// reelsmith-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use reelsmith_core::config::{Codec, CornerChoice, TransitionKind};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Reelsmith: vertical video assembly",
    long_about = "Compiles concatenation, transitions, watermark removal and cinematic \
                  effects into a single ffmpeg run via reelsmith-core."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true, help = "Enable detailed logging output")]
    pub verbose: bool,

    /// Directory holding bundled ffmpeg/ffprobe binaries
    #[arg(long, global = true, value_name = "DIR", env = "REELSMITH_RESOURCE_DIR")]
    pub resource_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile the pipeline and run it
    Build(BuildArgs),
    /// Compile the pipeline and print the encoder command as JSON without running it
    Plan(BuildArgs),
    /// Report which corner of the first frame most likely holds a watermark
    Locate(LocateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Input videos, in playback order
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Destination file (defaults to output_<YYYYMMDD_HHMM>.mp4)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Directory for the concat manifest
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub work_dir: PathBuf,

    /// Do not play a single input twice
    #[arg(long)]
    pub no_loop: bool,

    /// Use the safe all-round preset; overrides conflicting flags
    #[arg(long)]
    pub auto: bool,

    // --- Canvas and Quality ---
    /// Keep the source frame size instead of letterboxing to 2160x3840
    #[arg(long)]
    pub no_vertical_canvas: bool,

    /// Keep the source frame rate instead of converting to 60 fps
    #[arg(long)]
    pub no_force_fps: bool,

    #[arg(long)]
    pub no_sharpen: bool,

    #[arg(long)]
    pub no_color: bool,

    /// Faster scaling, no sharpening or color tuning
    #[arg(long)]
    pub max_speed: bool,

    // --- Cinematic Effects ---
    /// Add film grain with the given strength (0.1-2.0)
    #[arg(long, value_name = "STRENGTH", num_args = 0..=1, default_missing_value = "0.5")]
    pub film_grain: Option<f64>,

    /// Add a vignette with the given strength (0.1-1.0)
    #[arg(long, value_name = "STRENGTH", num_args = 0..=1, default_missing_value = "0.3")]
    pub vignette: Option<f64>,

    /// Add digital noise with the given strength (0.1-1.0)
    #[arg(long, value_name = "STRENGTH", num_args = 0..=1, default_missing_value = "0.3")]
    pub digital_noise: Option<f64>,

    /// 3D LUT file for color grading; skipped if it cannot be opened
    #[arg(long, value_name = "FILE")]
    pub lut: Option<PathBuf>,

    // --- Watermark Removal ---
    /// Remove a corner watermark
    #[arg(long)]
    pub delogo: bool,

    /// Watermark corner: auto, top_left, top_right, bottom_left or bottom_right
    #[arg(long, value_name = "CORNER", default_value = "auto")]
    pub delogo_corner: CornerChoice,

    #[command(flatten)]
    pub watermark_box: BoxArgs,

    /// Remove the watermark by zooming it out of frame instead of blurring it
    #[arg(long)]
    pub zoom: bool,

    /// Zoom factor (1.01-1.20)
    #[arg(long, value_name = "FACTOR", default_value_t = 1.05)]
    pub zoom_factor: f64,

    /// Derive the zoom factor from the watermark box
    #[arg(long)]
    pub auto_zoom: bool,

    // --- Transition ---
    /// Blend two inputs: fade, crossfade, wipe, slide, zoom_in or blur
    #[arg(long, value_name = "KIND")]
    pub transition: Option<TransitionKind>,

    /// Blend length in seconds (0.2-3.0)
    #[arg(long, value_name = "SECONDS", default_value_t = 0.8)]
    pub transition_duration: f64,

    /// Cosine audio curve instead of triangular
    #[arg(long)]
    pub smooth_transition: bool,

    // --- Export ---
    #[arg(long, value_name = "CODEC", default_value = "h264")]
    pub codec: Codec,

    /// Target video bitrate in Mbps
    #[arg(long, value_name = "MBPS", default_value_t = 12)]
    pub bitrate: u32,

    /// Drop input audio
    #[arg(long)]
    pub no_audio: bool,

    /// Silence the output entirely, including transition audio
    #[arg(long)]
    pub mute: bool,

    #[arg(long)]
    pub keep_metadata: bool,

    /// Blur the four 200x200 corners where QR codes are usually placed
    #[arg(long)]
    pub hide_qr: bool,

    // --- Performance ---
    /// Encode on the GPU (falls back to the CPU encoder on failure)
    #[arg(long)]
    pub hardware_encoder: bool,

    /// Decode on the GPU (retried without it when unavailable)
    #[arg(long)]
    pub hardware_decode: bool,

    #[arg(long, value_name = "PRESET", default_value = "fast")]
    pub preset: String,

    /// Encoder threads (0 = auto)
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub threads: u32,

    /// Filter threads (0 = auto)
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub filter_threads: u32,

    #[arg(long)]
    pub no_faststart: bool,
}

/// Watermark box geometry, shared by `build`, `plan` and `locate`.
#[derive(Args, Debug, Clone, Copy)]
pub struct BoxArgs {
    /// Watermark box size in canvas pixels
    #[arg(long = "box", value_name = "WxH", default_value = "260x110", value_parser = parse_box)]
    pub box_size: (u32, u32),

    /// Distance of the box from the canvas edges
    #[arg(long, value_name = "PIXELS", default_value_t = 30)]
    pub margin: u32,
}

#[derive(Args, Debug)]
pub struct LocateArgs {
    /// Video whose first frame is analysed
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[command(flatten)]
    pub watermark_box: BoxArgs,
}

/// Parses `WIDTHxHEIGHT`.
pub fn parse_box(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid box dimension '{s}': {e}"))
    };
    Ok((parse(w)?, parse(h)?))
}
