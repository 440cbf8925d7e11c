//! File discovery module for finding video files to process.
//!
//! Only the top level of the input directory is searched. Results are sorted
//! with a natural key so `media-2.mp4` comes before `media-10.mp4`.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};

/// Extensions (lowercase) recognised as videos.
pub const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mkv", "mov", "webm", "avi", "m4v"];

/// Checks if the given path is a video file that can be processed.
#[must_use]
pub fn is_valid_video_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| VIDEO_EXTENSIONS.iter().any(|v| ext.eq_ignore_ascii_case(v)))
}

/// Compares two strings so that runs of ASCII digits compare by numeric value
/// and everything else compares byte-wise.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a.as_bytes(), b.as_bytes());
    loop {
        match (a.first(), b.first()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let a_len = a.iter().take_while(|c| c.is_ascii_digit()).count();
                let b_len = b.iter().take_while(|c| c.is_ascii_digit()).count();
                let (a_num, a_rest) = a.split_at(a_len);
                let (b_num, b_rest) = b.split_at(b_len);
                let a_trim = trim_leading_zeros(a_num);
                let b_trim = trim_leading_zeros(b_num);
                let ordering = a_trim
                    .len()
                    .cmp(&b_trim.len())
                    .then_with(|| a_trim.cmp(b_trim))
                    .then_with(|| a_len.cmp(&b_len));
                if ordering != Ordering::Equal {
                    return ordering;
                }
                a = a_rest;
                b = b_rest;
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(y);
                }
                a = &a[1..];
                b = &b[1..];
            }
        }
    }
}

fn trim_leading_zeros(digits: &[u8]) -> &[u8] {
    let zeros = digits.iter().take_while(|&&c| c == b'0').count();
    &digits[zeros..]
}

/// Finds video files eligible for processing in the specified directory.
///
/// Returns `CoreError::NoFilesFound` when the directory holds no videos.
///
/// # Examples
///
/// ```rust,no_run
/// use clearmark_core::find_processable_files;
/// use std::path::Path;
///
/// match find_processable_files(Path::new("/path/to/videos")) {
///     Ok(files) => println!("Found {} video files", files.len()),
///     Err(e) => println!("Error finding video files: {}", e),
/// }
/// ```
pub fn find_processable_files(input_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(input_dir)? {
        let path = entry?.path();
        if is_valid_video_file(&path) {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(CoreError::NoFilesFound);
    }
    files.sort_by(|a, b| {
        let a_name = a.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let b_name = b.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        natural_cmp(&a_name, &b_name)
    });
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_cmp() {
        assert_eq!(natural_cmp("media-2.mp4", "media-10.mp4"), Ordering::Less);
        assert_eq!(natural_cmp("media-10.mp4", "media-9.mp4"), Ordering::Greater);
        assert_eq!(natural_cmp("a.mp4", "b.mp4"), Ordering::Less);
        assert_eq!(natural_cmp("clip", "clip1"), Ordering::Less);
        assert_eq!(natural_cmp("x07", "x7"), Ordering::Greater);
        assert_eq!(natural_cmp("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_is_valid_video_file_checks_extension() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("a.MOV");
        let text = dir.path().join("a.txt");
        std::fs::write(&video, b"").unwrap();
        std::fs::write(&text, b"").unwrap();
        assert!(is_valid_video_file(&video));
        assert!(!is_valid_video_file(&text));
        assert!(!is_valid_video_file(dir.path()));
    }
}
