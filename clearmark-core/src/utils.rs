//! Small helpers shared by the pipeline and the CLI.

use std::path::Path;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

/// Formats an elapsed time for logs: `4.2s`, `3m 07s` or `1h 02m 05s`.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    match total {
        0..=59 => format!("{:.1}s", elapsed.as_secs_f64()),
        60..=3599 => format!("{}m {:02}s", total / 60, total % 60),
        _ => format!("{}h {:02}m {:02}s", total / 3600, (total % 3600) / 60, total % 60),
    }
}

/// Returns the file name of a video as UTF-8.
///
/// The name is embedded in frame folder and output file names and passed to
/// ffmpeg, so a path without a final component or with a non-UTF-8 name is a
/// `PathError`.
pub fn video_file_name(path: &Path) -> CoreResult<&str> {
    path.file_name()
        .ok_or_else(|| CoreError::PathError(format!("{} has no file name", path.display())))?
        .to_str()
        .ok_or_else(|| {
            CoreError::PathError(format!("{} has a non-UTF-8 file name", path.display()))
        })
}
