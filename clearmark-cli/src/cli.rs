// clearmark-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Clearmark: video watermark removal",
    long_about = "Removes a fixed-position watermark from videos: frames are extracted with ffmpeg, \
                  the watermark is located and erased in each frame, and the video is rebuilt with \
                  its original audio."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Removes the watermark from a video file or every video in a directory
    Process(ProcessArgs),
    /// Erases the watermark from every frame in a folder (no ffmpeg involved)
    Erase(EraseArgs),
    /// Prints the detected watermark region of each image as JSON
    Detect(DetectArgs),
    /// Runs the HTTP ingestion endpoint
    Serve(ServeArgs),
}

/// Options shared by every command that detects watermarks.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(long, value_name = "FILE", env = "CLEARMARK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Luminance threshold below which a pixel counts as watermark (0-255)
    #[arg(long, value_name = "LUMA")]
    pub threshold: Option<u8>,
}

/// Options controlling how detected regions are erased.
#[derive(Args, Debug, Clone, Default)]
pub struct EraserArgs {
    /// Program run once per watermarked frame; replaces the default script invocation
    #[arg(long, value_name = "PROGRAM")]
    pub eraser_program: Option<String>,

    /// Argument passed to the eraser program before the frame arguments (repeatable)
    #[arg(long = "eraser-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub eraser_args: Vec<String>,

    /// Blur the region in-process with this sigma instead of running a program
    #[arg(long, value_name = "SIGMA")]
    pub blur: Option<f32>,

    /// Leave frames without a watermark out of the cleaned folder
    #[arg(long)]
    pub no_passthrough: bool,

    /// Show a progress bar while frames are erased
    #[arg(long)]
    pub progress: bool,
}

/// Options for the ffmpeg side of the pipeline.
#[derive(Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    /// Directory for extracted and cleaned frames (defaults to a temporary directory)
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Frames per second for extraction and reconstruction
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: Option<u32>,

    /// Keep frame folders and the silent video after a video succeeds
    #[arg(long)]
    pub keep_intermediates: bool,

    /// Do not copy the source audio onto the result
    #[arg(long)]
    pub no_audio: bool,
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Input video file or directory of videos
    #[arg(short = 'i', long = "input", value_name = "INPUT_PATH")]
    pub input_path: PathBuf,

    /// Directory where cleaned videos will be saved
    #[arg(short = 'o', long = "output", value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub eraser: EraserArgs,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(Args, Debug)]
pub struct EraseArgs {
    /// Folder of frames (searched recursively)
    #[arg(short = 'i', long = "input", value_name = "FRAMES_DIR")]
    pub input_dir: PathBuf,

    /// Folder receiving the cleaned frames
    #[arg(short = 'o', long = "output", value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub eraser: EraserArgs,
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Images to scan
    #[arg(required = true, value_name = "IMAGE")]
    pub images: Vec<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:3000", value_name = "ADDR")]
    pub addr: SocketAddr,

    /// Directory where cleaned videos will be saved
    #[arg(short = 'o', long = "output", value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Directory receiving downloaded media
    #[arg(long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Maximum simultaneous downloads per request (0 = unlimited)
    #[arg(long, value_name = "N")]
    pub download_concurrency: Option<usize>,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub eraser: EraserArgs,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}
