//! Iterative traversal of a frame folder.
//!
//! [`walk`] mirrors `input_dir` under `output_dir` and runs a [`FrameEraser`]
//! on every image file it finds. Traversal uses an explicit stack, so depth is
//! bounded by memory rather than by the call stack. Output names mirror input
//! names one to one; with pass-through enabled, frames that were not erased
//! are copied unchanged so the cleaned sequence keeps every index.

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info, warn};

use crate::error::{CoreError, CoreResult};
use crate::processing::eraser::{EraseOutcome, FrameEraser};

/// Extensions (lowercase) the walker treats as frames.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Options controlling a walk.
#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    /// Copy frames that were not erased into the output unchanged.
    pub passthrough_unprocessed: bool,
    /// Draw a progress bar on stderr.
    pub show_progress: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            passthrough_unprocessed: true,
            show_progress: false,
        }
    }
}

/// Per-walk counts.
///
/// `untouched` and `failed` count frames by outcome; `passed_through` counts
/// how many of those were copied into the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub erased: usize,
    pub untouched: usize,
    pub failed: usize,
    pub passed_through: usize,
}

impl WalkSummary {
    pub fn total(&self) -> usize {
        self.erased + self.untouched + self.failed
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Collects `(source, destination)` pairs for every image under `input_dir`,
/// in sorted order, creating the mirrored directories as it goes.
fn collect_jobs(input_dir: &Path, output_dir: &Path) -> CoreResult<Vec<(PathBuf, PathBuf)>> {
    let mut jobs = Vec::new();
    let mut stack = vec![(input_dir.to_path_buf(), output_dir.to_path_buf())];

    while let Some((src_dir, dst_dir)) = stack.pop() {
        std::fs::create_dir_all(&dst_dir)?;

        let mut entries = std::fs::read_dir(&src_dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort();

        let mut subdirs = Vec::new();
        for path in entries {
            let Some(name) = path.file_name() else {
                continue;
            };
            let target = dst_dir.join(name);
            if path.is_dir() {
                subdirs.push((path, target));
            } else if is_image(&path) {
                jobs.push((path, target));
            }
        }
        // Reversed so the first subdirectory is popped first.
        stack.extend(subdirs.into_iter().rev());
    }
    Ok(jobs)
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(
        Some(len as u64),
        if visible {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        },
    );
    if let Ok(style) =
        ProgressStyle::default_bar().template("Erasing [{bar:40}] {pos}/{len} frames | {msg}")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

fn pass_through(source: &Path, target: &Path, summary: &mut WalkSummary) {
    match std::fs::copy(source, target) {
        Ok(_) => summary.passed_through += 1,
        Err(e) => warn!(
            "Failed to copy {} to {}: {e}",
            source.display(),
            target.display()
        ),
    }
}

/// Rejects an output tree that overlaps the input tree: writing into the
/// input would overwrite source frames, and a nested output would be walked
/// again as input.
fn ensure_disjoint(input_dir: &Path, output_dir: &Path) -> CoreResult<()> {
    let input_root = input_dir.canonicalize()?;
    let output_root = resolve_path(output_dir)?;
    if output_root.starts_with(&input_root) {
        return Err(CoreError::Validation(format!(
            "output directory {} must not be inside input directory {}",
            output_dir.display(),
            input_dir.display()
        )));
    }
    Ok(())
}

/// Canonicalizes the longest existing prefix of `path` and appends the
/// components that do not exist yet.
fn resolve_path(path: &Path) -> CoreResult<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }
    let mut resolved = existing.canonicalize()?;
    for name in missing.iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

/// Runs `eraser` over every image under `input_dir`, writing results to the
/// mirrored location under `output_dir`.
///
/// Per-frame failures are logged and counted, never propagated. Only failures
/// to read `input_dir` or create directories under `output_dir` abort the
/// walk. `output_dir` must not be `input_dir` or lie inside it.
pub fn walk<E: FrameEraser>(
    input_dir: &Path,
    output_dir: &Path,
    eraser: &E,
    options: WalkOptions,
) -> CoreResult<WalkSummary> {
    ensure_disjoint(input_dir, output_dir)?;
    let jobs = collect_jobs(input_dir, output_dir)?;
    debug!(
        "Walking {} frames from {} into {}",
        jobs.len(),
        input_dir.display(),
        output_dir.display()
    );

    let pb = progress_bar(jobs.len(), options.show_progress);
    let mut summary = WalkSummary::default();

    for (source, target) in &jobs {
        match eraser.erase_frame(source, target) {
            Ok(EraseOutcome::Erased(_)) => summary.erased += 1,
            Ok(EraseOutcome::NoWatermark) => {
                summary.untouched += 1;
                if options.passthrough_unprocessed {
                    pass_through(source, target, &mut summary);
                }
            }
            Err(e) => {
                warn!("Failed to erase {}: {e}", source.display());
                summary.failed += 1;
                if options.passthrough_unprocessed {
                    pass_through(source, target, &mut summary);
                }
            }
        }
        if let Some(name) = source.file_name() {
            pb.set_message(name.to_string_lossy().into_owned());
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!(
        "Frames: {} erased, {} without watermark, {} failed, {} copied unchanged",
        summary.erased, summary.untouched, summary.failed, summary.passed_through
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Region;
    use std::fs;
    use tempfile::tempdir;

    /// Erases files whose name contains "mark", fails on "bad", and leaves
    /// everything else alone.
    struct NameEraser;

    impl FrameEraser for NameEraser {
        fn erase_frame(&self, input: &Path, output: &Path) -> CoreResult<EraseOutcome> {
            let name = input.file_name().unwrap().to_string_lossy();
            if name.contains("bad") {
                return Err(CoreError::Validation("bad frame".into()));
            }
            if name.contains("mark") {
                fs::write(output, b"erased")?;
                return Ok(EraseOutcome::Erased(Region::new(0, 0, 1, 1)));
            }
            Ok(EraseOutcome::NoWatermark)
        }
    }

    #[test]
    fn test_walk_rejects_output_equal_to_input() {
        let input = tempdir().unwrap();
        let frame = input.path().join("frame_0001.png");
        fs::write(&frame, b"original-bytes").unwrap();

        let result = walk(input.path(), input.path(), &NameEraser, WalkOptions::default());
        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert_eq!(fs::read(&frame).unwrap(), b"original-bytes");
    }

    #[test]
    fn test_walk_rejects_output_nested_in_input() {
        let input = tempdir().unwrap();
        fs::write(input.path().join("frame_0001.png"), b"orig").unwrap();
        let nested = input.path().join("cleaned/run");

        let result = walk(input.path(), &nested, &NameEraser, WalkOptions::default());
        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert!(!nested.exists());
    }

    #[test]
    fn test_walk_accepts_sibling_output_with_dot_segments() {
        let root = tempdir().unwrap();
        let input = root.path().join("frames");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("frame_0001.png"), b"orig").unwrap();
        let output = input.join("../cleaned");

        let summary = walk(&input, &output, &NameEraser, WalkOptions::default()).unwrap();
        assert_eq!(summary.passed_through, 1);
        assert!(root.path().join("cleaned/frame_0001.png").is_file());
    }

    #[test]
    fn test_walk_mirrors_tree_and_counts() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        fs::create_dir_all(input.path().join("nested/deeper")).unwrap();
        fs::write(input.path().join("a_mark.png"), b"orig").unwrap();
        fs::write(input.path().join("b_plain.png"), b"orig").unwrap();
        fs::write(input.path().join("notes.txt"), b"ignored").unwrap();
        fs::write(input.path().join("nested/c_bad.JPG"), b"orig").unwrap();
        fs::write(input.path().join("nested/deeper/d_mark.bmp"), b"orig").unwrap();

        let summary = walk(input.path(), output.path(), &NameEraser, WalkOptions::default())
            .unwrap();

        assert_eq!(
            summary,
            WalkSummary {
                erased: 2,
                untouched: 1,
                failed: 1,
                passed_through: 2,
            }
        );
        assert_eq!(fs::read(output.path().join("a_mark.png")).unwrap(), b"erased");
        assert_eq!(fs::read(output.path().join("b_plain.png")).unwrap(), b"orig");
        assert_eq!(fs::read(output.path().join("nested/c_bad.JPG")).unwrap(), b"orig");
        assert!(output.path().join("nested/deeper/d_mark.bmp").is_file());
        assert!(!output.path().join("notes.txt").exists());
    }

    #[test]
    fn test_walk_without_passthrough_leaves_gaps() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        fs::write(input.path().join("frame_0001_mark.png"), b"x").unwrap();
        fs::write(input.path().join("frame_0002.png"), b"x").unwrap();

        let options = WalkOptions {
            passthrough_unprocessed: false,
            ..WalkOptions::default()
        };
        let summary = walk(input.path(), output.path(), &NameEraser, options).unwrap();

        assert_eq!(summary.total(), 2);
        assert_eq!(summary.passed_through, 0);
        assert!(!output.path().join("frame_0002.png").exists());
    }

    #[test]
    fn test_walk_missing_input_dir_is_an_error() {
        let output = tempdir().unwrap();
        let missing = output.path().join("nope");
        assert!(walk(&missing, output.path(), &NameEraser, WalkOptions::default()).is_err());
    }

    #[test]
    fn test_collect_jobs_is_sorted_depth_first() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        fs::create_dir_all(input.path().join("b")).unwrap();
        fs::create_dir_all(input.path().join("a")).unwrap();
        fs::write(input.path().join("b/2.png"), b"").unwrap();
        fs::write(input.path().join("a/1.png"), b"").unwrap();
        fs::write(input.path().join("0.png"), b"").unwrap();

        let jobs = collect_jobs(input.path(), output.path()).unwrap();
        let names: Vec<_> = jobs
            .iter()
            .map(|(src, _)| src.strip_prefix(input.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("0.png"),
                PathBuf::from("a/1.png"),
                PathBuf::from("b/2.png"),
            ]
        );
    }
}
