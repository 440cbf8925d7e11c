// ============================================================================
// clearmark-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig. Every field starts at its default, so
// only the values that differ need to be set. Validation is left to
// CoreConfig::validate so a builder can be used to assemble a config that
// the caller then checks once.

use std::path::PathBuf;

use super::{CoreConfig, EraseStrategy};

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use clearmark_core::config::{CoreConfigBuilder, EraseStrategy};
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .input_dir(PathBuf::from("/path/to/input"))
///     .output_dir(PathBuf::from("/path/to/output"))
///     .erase_strategy(EraseStrategy::Blur)
///     .blur_sigma(6.0)
///     .build();
/// assert_eq!(config.eraser.blur_sigma, 6.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration, e.g. one loaded from a file.
    pub fn from_config(config: CoreConfig) -> Self {
        Self { config }
    }

    /// Sets the directory containing input videos.
    pub fn input_dir(mut self, input_dir: PathBuf) -> Self {
        self.config.input_dir = input_dir;
        self
    }

    /// Sets the directory receiving final videos.
    pub fn output_dir(mut self, output_dir: PathBuf) -> Self {
        self.config.output_dir = output_dir;
        self
    }

    /// Sets the directory for per-video frame folders.
    pub fn work_dir(mut self, work_dir: PathBuf) -> Self {
        self.config.work_dir = Some(work_dir);
        self
    }

    /// Sets the directory that receives downloaded media.
    pub fn download_dir(mut self, download_dir: PathBuf) -> Self {
        self.config.download_dir = download_dir;
        self
    }

    /// Sets the extraction and reconstruction frame rate.
    pub fn fps(mut self, fps: u32) -> Self {
        self.config.fps = fps;
        self
    }

    /// Sets the frame image format (file extension without the dot).
    pub fn frame_extension(mut self, extension: impl Into<String>) -> Self {
        self.config.frame_extension = extension.into();
        self
    }

    /// Sets the luminance threshold below which a pixel counts as ink.
    pub fn luma_threshold(mut self, threshold: u8) -> Self {
        self.config.detection.luma_threshold = threshold;
        self
    }

    /// Sets the search window as fractions of the frame size.
    pub fn search_window(mut self, left: f64, top: f64, width: f64, height: f64) -> Self {
        self.config.detection.left_fraction = left;
        self.config.detection.top_fraction = top;
        self.config.detection.width_fraction = width;
        self.config.detection.height_fraction = height;
        self
    }

    /// Sets how detected regions are erased.
    pub fn erase_strategy(mut self, strategy: EraseStrategy) -> Self {
        self.config.eraser.strategy = strategy;
        self
    }

    /// Sets the external erasure program and the arguments that precede the
    /// per-frame arguments.
    pub fn eraser_command(mut self, program: impl Into<String>, args: Vec<String>) -> Self {
        self.config.eraser.program = program.into();
        self.config.eraser.args = args;
        self
    }

    /// Sets the sigma used by the blur strategy.
    pub fn blur_sigma(mut self, sigma: f32) -> Self {
        self.config.eraser.blur_sigma = sigma;
        self
    }

    /// Sets the CRF used for reconstruction.
    pub fn crf(mut self, crf: u8) -> Self {
        self.config.encode.crf = crf;
        self
    }

    /// Sets whether unprocessed frames are copied into the cleaned sequence.
    pub fn passthrough_unprocessed(mut self, enable: bool) -> Self {
        self.config.passthrough_unprocessed = enable;
        self
    }

    /// Sets whether intermediates are kept after a video succeeds.
    pub fn keep_intermediates(mut self, keep: bool) -> Self {
        self.config.keep_intermediates = keep;
        self
    }

    /// Sets whether the source audio is merged onto the result.
    pub fn merge_audio(mut self, merge: bool) -> Self {
        self.config.merge_audio = merge;
        self
    }

    /// Sets the per-request download concurrency (0 = unbounded).
    pub fn download_concurrency(mut self, limit: usize) -> Self {
        self.config.download_concurrency = limit;
        self
    }

    /// Sets whether a progress bar is shown during frame processing.
    pub fn show_progress(mut self, show: bool) -> Self {
        self.config.show_progress = show;
        self
    }

    /// Builds the CoreConfig.
    pub fn build(self) -> CoreConfig {
        self.config
    }
}
