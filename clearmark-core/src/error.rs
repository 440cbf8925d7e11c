// ============================================================================
// clearmark-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Types for the clearmark-core Library
//
// This module defines the error taxonomy used throughout the library. Decode
// failures, external tool failures (ffmpeg and the erasure subprocess),
// configuration problems and request validation all map onto `CoreError`.
//
// A missing watermark is NOT an error: detection returns `Option<Region>` and
// the eraser reports `EraseOutcome::NoWatermark`.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors produced by the clearmark-core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image at `path` could not be opened or decoded.
    #[error("Failed to decode image '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode image '{}': {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Required dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, std::io::Error),

    #[error("Failed to wait for command '{0}': {1}")]
    CommandWait(String, std::io::Error),

    #[error("Command '{cmd}' failed with {status}: {stderr}")]
    CommandFailed {
        cmd: String,
        status: String,
        stderr: String,
    },

    #[error("External tool error ({tool}): {message}")]
    ExternalTool { tool: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse configuration file '{}': {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("No processable video files found")]
    NoFilesFound,

    #[error("Frame sequence of {count} frames exceeds the maximum of {max}")]
    FrameLimitExceeded { count: usize, max: u32 },

    #[error("Download failed: {0}")]
    Download(String),
}

/// Result type for clearmark-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        CoreError::Download(err.to_string())
    }
}

impl CoreError {
    /// True for the external-tool family: spawn, wait and exit failures of
    /// ffmpeg or the erasure subprocess.
    pub fn is_external_tool_error(&self) -> bool {
        matches!(
            self,
            CoreError::DependencyNotFound(_)
                | CoreError::CommandStart(..)
                | CoreError::CommandWait(..)
                | CoreError::CommandFailed { .. }
                | CoreError::ExternalTool { .. }
        )
    }
}

pub(crate) fn command_start_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

pub(crate) fn command_wait_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

pub(crate) fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        cmd: cmd.into(),
        status: status.to_string(),
        stderr: stderr.into(),
    }
}

pub(crate) fn external_tool_error(tool: impl Into<String>, message: impl Into<String>) -> CoreError {
    CoreError::ExternalTool {
        tool: tool.into(),
        message: message.into(),
    }
}
