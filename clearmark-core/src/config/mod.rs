//! Configuration structures and constants for the clearmark-core library.
//!
//! Every path and tunable used by the pipeline lives in [`CoreConfig`] and is
//! passed explicitly to each component. Values are layered: defaults, then an
//! optional TOML file, then `CLEARMARK_*` environment variables, then whatever
//! the caller (usually the CLI) sets last.

mod builder;
pub mod utils;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

pub use crate::scanner::DetectionParams;
pub use builder::CoreConfigBuilder;

// Default constants

/// Frame rate used for both extraction and reconstruction.
pub const DEFAULT_FPS: u32 = 25;

/// Image format of extracted frames.
pub const DEFAULT_FRAME_EXTENSION: &str = "png";

/// ffmpeg `-q:v` value used during frame extraction.
pub const DEFAULT_EXTRACT_QUALITY: u8 = 2;

/// Program used to run the external erasure script.
pub const DEFAULT_ERASER_PROGRAM: &str = "python3";

/// Script passed as the first argument to [`DEFAULT_ERASER_PROGRAM`].
pub const DEFAULT_ERASER_SCRIPT: &str = "remove_watermark.py";

/// Gaussian sigma for the in-process blur strategy.
pub const DEFAULT_BLUR_SIGMA: f32 = 10.0;

/// Video codec for the reconstructed video.
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";

/// CRF for the reconstructed video. Lower is higher quality.
pub const DEFAULT_CRF: u8 = 18;

/// x264 preset for the reconstructed video.
pub const DEFAULT_ENCODER_PRESET: &str = "slow";

/// Output pixel format; yuv420p keeps the result playable everywhere.
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";

/// Directory that receives downloaded media.
pub const DEFAULT_DOWNLOAD_DIR: &str = "input";

/// Maximum simultaneous downloads per ingestion request. 0 means unbounded.
pub const DEFAULT_DOWNLOAD_CONCURRENCY: usize = 4;

/// How a detected watermark region is erased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EraseStrategy {
    /// Run the external erasure program once per frame.
    External,
    /// Blur the region in-process and composite it back onto the frame.
    Blur,
}

/// Settings for the watermark eraser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EraserConfig {
    pub strategy: EraseStrategy,

    /// Program to execute for [`EraseStrategy::External`].
    pub program: String,

    /// Arguments placed before `<input> <output> <width> <height> <left> <top>`.
    pub args: Vec<String>,

    /// Sigma for [`EraseStrategy::Blur`].
    pub blur_sigma: f32,
}

impl Default for EraserConfig {
    fn default() -> Self {
        Self {
            strategy: EraseStrategy::External,
            program: DEFAULT_ERASER_PROGRAM.to_string(),
            args: vec![DEFAULT_ERASER_SCRIPT.to_string()],
            blur_sigma: DEFAULT_BLUR_SIGMA,
        }
    }
}

/// Encoder settings for frame extraction and video reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeSettings {
    pub video_codec: String,
    pub crf: u8,
    pub preset: String,
    pub pixel_format: String,
    pub extract_quality: u8,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            crf: DEFAULT_CRF,
            preset: DEFAULT_ENCODER_PRESET.to_string(),
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
            extract_quality: DEFAULT_EXTRACT_QUALITY,
        }
    }
}

/// Main configuration structure for the clearmark-core library.
///
/// # Examples
///
/// ```rust,no_run
/// use clearmark_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .input_dir(PathBuf::from("/path/to/input"))
///     .output_dir(PathBuf::from("/path/to/output"))
///     .fps(30)
///     .luma_threshold(180)
///     .keep_intermediates(true)
///     .build();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Directory containing input videos
    pub input_dir: PathBuf,

    /// Directory receiving `temp_<name>` and `final_<name>` videos
    pub output_dir: PathBuf,

    /// Directory for per-video frame folders. When unset, a temporary
    /// directory under `output_dir` is used and removed after the batch.
    pub work_dir: Option<PathBuf>,

    /// Directory that receives media downloaded by the ingestion endpoint
    pub download_dir: PathBuf,

    /// Frames per second for extraction and reconstruction
    pub fps: u32,

    /// Image format of the frame sequence
    pub frame_extension: String,

    /// Copy frames that have no watermark, or whose erasure failed, unchanged
    /// into the cleaned sequence so it stays contiguous
    pub passthrough_unprocessed: bool,

    /// Keep frame folders and the silent temp video after a video succeeds
    pub keep_intermediates: bool,

    /// Copy the source audio onto the reconstructed video
    pub merge_audio: bool,

    /// Maximum simultaneous downloads per ingestion request (0 = unbounded)
    pub download_concurrency: usize,

    /// Show a progress bar while frames are processed
    pub show_progress: bool,

    // Nested tables stay last so the TOML form keeps plain keys first.
    pub detection: DetectionParams,

    pub eraser: EraserConfig,

    pub encode: EncodeSettings,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            work_dir: None,
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            fps: DEFAULT_FPS,
            frame_extension: DEFAULT_FRAME_EXTENSION.to_string(),
            passthrough_unprocessed: true,
            keep_intermediates: false,
            merge_audio: true,
            download_concurrency: DEFAULT_DOWNLOAD_CONCURRENCY,
            show_progress: false,
            detection: DetectionParams::default(),
            eraser: EraserConfig::default(),
            encode: EncodeSettings::default(),
        }
    }
}

impl CoreConfig {
    /// Creates a configuration with default settings for the given directories.
    pub fn new(input_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            input_dir,
            output_dir,
            ..Self::default()
        }
    }

    /// Loads a configuration from a TOML file. Missing keys take their
    /// default values.
    pub fn from_toml_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml_string(&self) -> CoreResult<String> {
        toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Applies `CLEARMARK_*` environment variables on top of the current values.
    pub fn apply_env_overrides(&mut self) -> CoreResult<()> {
        self.apply_overrides_with(utils::env_var)
    }

    /// Applies overrides read through `lookup`, keyed by environment variable
    /// name. Split out from [`Self::apply_env_overrides`] so it can be driven
    /// without touching the process environment.
    pub fn apply_overrides_with<F>(&mut self, lookup: F) -> CoreResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        use utils::{parse_bool, parse_value};

        if let Some(dir) = lookup("CLEARMARK_INPUT_DIR") {
            self.input_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("CLEARMARK_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("CLEARMARK_WORK_DIR") {
            self.work_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = lookup("CLEARMARK_DOWNLOAD_DIR") {
            self.download_dir = PathBuf::from(dir);
        }
        if let Some(fps) = parse_value("CLEARMARK_FPS", lookup("CLEARMARK_FPS"))? {
            self.fps = fps;
        }
        if let Some(threshold) =
            parse_value("CLEARMARK_LUMA_THRESHOLD", lookup("CLEARMARK_LUMA_THRESHOLD"))?
        {
            self.detection.luma_threshold = threshold;
        }
        // A new program replaces the whole invocation, default script included.
        if let Some(program) = lookup("CLEARMARK_ERASER_PROGRAM") {
            self.eraser.program = program;
            self.eraser.args.clear();
        }
        if let Some(args) = lookup("CLEARMARK_ERASER_ARGS") {
            self.eraser.args = args.split_whitespace().map(str::to_string).collect();
        }
        if let Some(keep) =
            parse_bool("CLEARMARK_KEEP_INTERMEDIATES", lookup("CLEARMARK_KEEP_INTERMEDIATES"))?
        {
            self.keep_intermediates = keep;
        }
        if let Some(merge) = parse_bool("CLEARMARK_MERGE_AUDIO", lookup("CLEARMARK_MERGE_AUDIO"))? {
            self.merge_audio = merge;
        }
        if let Some(limit) = parse_value(
            "CLEARMARK_DOWNLOAD_CONCURRENCY",
            lookup("CLEARMARK_DOWNLOAD_CONCURRENCY"),
        )? {
            self.download_concurrency = limit;
        }
        Ok(())
    }

    /// Checks the configuration for values the pipeline cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.fps == 0 {
            return Err(CoreError::Config("fps must be greater than 0".to_string()));
        }
        if self.frame_extension.is_empty()
            || !self.frame_extension.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(CoreError::Config(format!(
                "invalid frame extension '{}'",
                self.frame_extension
            )));
        }
        self.detection.validate()?;
        match self.eraser.strategy {
            EraseStrategy::External if self.eraser.program.trim().is_empty() => {
                return Err(CoreError::Config(
                    "eraser program must not be empty".to_string(),
                ));
            }
            EraseStrategy::Blur
                if !self.eraser.blur_sigma.is_finite() || self.eraser.blur_sigma <= 0.0 =>
            {
                return Err(CoreError::Config(format!(
                    "blur sigma must be positive, got {}",
                    self.eraser.blur_sigma
                )));
            }
            _ => {}
        }
        if self.encode.crf > 51 {
            return Err(CoreError::Config(format!(
                "crf must be between 0 and 51, got {}",
                self.encode.crf
            )));
        }
        Ok(())
    }
}
