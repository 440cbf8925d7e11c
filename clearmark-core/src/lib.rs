//! Core library for removing a fixed-position watermark from videos.
//!
//! A video is split into frames with ffmpeg, the watermark box is located in
//! each frame by luminance thresholding over a bottom-right search window,
//! each box is erased (by an external program or an in-process blur), and the
//! cleaned frames are encoded back into a video that gets the source audio.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use clearmark_core::config::CoreConfigBuilder;
//! use clearmark_core::external::{SidecarSpawner, StdCommandRunner};
//! use clearmark_core::{find_processable_files, process_videos};
//! use std::path::PathBuf;
//!
//! let config = CoreConfigBuilder::new()
//!     .input_dir(PathBuf::from("/path/to/input"))
//!     .output_dir(PathBuf::from("/path/to/output"))
//!     .build();
//! config.validate().unwrap();
//!
//! let files = find_processable_files(&config.input_dir).unwrap();
//! let report = process_videos(&SidecarSpawner, &StdCommandRunner, &config, &files).unwrap();
//! for video in &report.videos {
//!     println!("{}: {:?}", video.input.display(), video.stage);
//! }
//! ```

pub mod config;
pub mod discovery;
pub mod download;
pub mod error;
pub mod external;
pub mod frames;
pub mod processing;
pub mod scanner;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use config::CoreConfig;
pub use discovery::find_processable_files;
pub use download::{download_all, download_file};
pub use error::{CoreError, CoreResult};
pub use processing::{process_videos, BatchReport, EraseOutcome, VideoReport, VideoStage};
pub use scanner::{detect, detect_file, DetectionParams, Region};
pub use temp_files::create_temp_dir;
pub use utils::format_elapsed;
