//! Temporary directory management.
//!
//! Scratch space is created with the tempfile crate so it is removed when the
//! returned handle is dropped, including on early returns.

use std::path::Path;

use tempfile::{Builder as TempFileBuilder, TempDir};

use crate::error::CoreResult;

/// Creates a temporary directory with `prefix` inside `base_dir`, creating
/// `base_dir` first if needed. Auto-cleaned when dropped.
pub fn create_temp_dir(base_dir: &Path, prefix: &str) -> CoreResult<TempDir> {
    std::fs::create_dir_all(base_dir)?;

    Ok(TempFileBuilder::new().prefix(prefix).tempdir_in(base_dir)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_is_removed_on_drop() {
        let base = tempfile::tempdir().unwrap();
        let nested = base.path().join("out");
        let temp = create_temp_dir(&nested, "clearmark_work_").unwrap();
        let path = temp.path().to_path_buf();

        assert!(path.is_dir());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("clearmark_work_"));
        drop(temp);
        assert!(!path.exists());
    }
}
