//! Frame sequence naming.
//!
//! Extracted and cleaned frames are named `frame_%04d.<ext>` starting at 1.
//! The fixed four-digit zero padding keeps lexicographic order identical to
//! numeric order, so indices above [`MAX_FRAME_INDEX`] are rejected rather
//! than allowed to spill into a fifth digit.

use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};

/// Prefix shared by every frame file name.
pub const FRAME_PREFIX: &str = "frame_";

/// Number of digits in a frame index.
pub const FRAME_INDEX_DIGITS: usize = 4;

/// Largest index that fits in [`FRAME_INDEX_DIGITS`] digits.
pub const MAX_FRAME_INDEX: u32 = 9999;

/// The ffmpeg image-sequence pattern, e.g. `frame_%04d.png`.
pub fn frame_pattern(extension: &str) -> String {
    format!("{FRAME_PREFIX}%0{FRAME_INDEX_DIGITS}d.{extension}")
}

/// File name for the frame at `index` (1-based).
pub fn frame_file_name(index: u32, extension: &str) -> CoreResult<String> {
    if index == 0 || index > MAX_FRAME_INDEX {
        return Err(CoreError::Validation(format!(
            "frame index {index} is outside 1..={MAX_FRAME_INDEX}"
        )));
    }
    Ok(format!(
        "{FRAME_PREFIX}{index:0width$}.{extension}",
        width = FRAME_INDEX_DIGITS
    ))
}

/// Parses the index out of a frame file name. Returns `None` for names that do
/// not follow the sequence convention exactly.
pub fn parse_frame_index(file_name: &str) -> Option<u32> {
    let rest = file_name.strip_prefix(FRAME_PREFIX)?;
    let (digits, _extension) = rest.split_once('.')?;
    if digits.len() != FRAME_INDEX_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Lists the frame files with `extension` in `dir`, sorted by index.
pub fn list_frames(dir: &Path, extension: &str) -> CoreResult<Vec<PathBuf>> {
    let mut frames: Vec<(u32, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches_ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if !matches_ext {
            continue;
        }
        if let Some(index) = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(parse_frame_index)
        {
            frames.push((index, path));
        }
    }
    frames.sort_by_key(|(index, _)| *index);
    Ok(frames.into_iter().map(|(_, path)| path).collect())
}

/// Checks that `dir` holds exactly frames `1..=expected` with no gaps.
pub fn verify_contiguous(dir: &Path, extension: &str, expected: usize) -> CoreResult<()> {
    let frames = list_frames(dir, extension)?;
    if frames.len() != expected {
        return Err(CoreError::Validation(format!(
            "expected {expected} frames in {}, found {}",
            dir.display(),
            frames.len()
        )));
    }
    for (position, path) in frames.iter().enumerate() {
        let index = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(parse_frame_index);
        if index != Some(position as u32 + 1) {
            return Err(CoreError::Validation(format!(
                "frame sequence in {} has a gap at position {}",
                dir.display(),
                position + 1
            )));
        }
    }
    Ok(())
}
