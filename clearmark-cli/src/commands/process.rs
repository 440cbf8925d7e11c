// clearmark-cli/src/commands/process.rs
//
// Implementation of the `process` command: resolves the input into a list of
// videos, checks for ffmpeg, runs the pipeline and prints a summary.

use anyhow::{bail, Context};
use clearmark_core::discovery::is_valid_video_file;
use clearmark_core::external::{check_dependency, SidecarSpawner, StdCommandRunner};
use clearmark_core::{format_elapsed, process_videos, BatchReport, CoreError};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::ProcessArgs;
use crate::config::{apply_eraser_args, apply_pipeline_args, load_base_config};

/// Resolves `input_path` into the videos to process and the effective input
/// directory. A directory with no videos yields an empty list.
pub fn discover_input_files(input_path: &Path) -> anyhow::Result<(Vec<PathBuf>, PathBuf)> {
    let input_path = input_path
        .canonicalize()
        .with_context(|| format!("Invalid input path '{}'", input_path.display()))?;
    let metadata = fs::metadata(&input_path)
        .with_context(|| format!("Failed to access input path '{}'", input_path.display()))?;

    if metadata.is_dir() {
        match clearmark_core::find_processable_files(&input_path) {
            Ok(files) => Ok((files, input_path)),
            Err(CoreError::NoFilesFound) => Ok((Vec::new(), input_path)),
            Err(e) => Err(e.into()),
        }
    } else if metadata.is_file() {
        if !is_valid_video_file(&input_path) {
            bail!(
                "Input file '{}' is not a supported video file",
                input_path.display()
            );
        }
        let parent_dir = input_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                CoreError::PathError(format!(
                    "Could not determine parent directory for file '{}'",
                    input_path.display()
                ))
            })?;
        Ok((vec![input_path], parent_dir))
    } else {
        bail!(
            "Input path '{}' is neither a file nor a directory",
            input_path.display()
        )
    }
}

pub fn run_process(args: ProcessArgs) -> anyhow::Result<()> {
    let (files, input_dir) = discover_input_files(&args.input_path)?;

    let config = load_base_config(&args.config)?;
    let config = apply_eraser_args(config, &args.eraser);
    let mut config = apply_pipeline_args(config, &args.pipeline);
    config.input_dir = input_dir;
    config.output_dir = args.output_dir;
    config.validate()?;

    if files.is_empty() {
        warn!(
            "No processable video files found in '{}'",
            config.input_dir.display()
        );
        return Ok(());
    }

    check_dependency("ffmpeg")?;

    info!(
        "Processing {} video(s) into '{}'",
        files.len(),
        config.output_dir.display()
    );
    let report = process_videos(&SidecarSpawner, &StdCommandRunner, &config, &files)?;
    print_summary(&report);

    if report.failed() > 0 {
        bail!(
            "{} of {} video(s) failed",
            report.failed(),
            report.videos.len()
        );
    }
    Ok(())
}

fn print_summary(report: &BatchReport) {
    println!("===== Summary =====");
    for video in &report.videos {
        let name = clearmark_core::utils::video_file_name(&video.input)
            .map(str::to_string)
            .unwrap_or_else(|_| video.input.display().to_string());
        match (video.failed_at(), &video.output) {
            (Some(stage), _) => {
                println!(
                    "{name}: FAILED during {stage} ({})",
                    video.error.as_deref().unwrap_or("unknown error")
                );
            }
            (None, Some(output)) => {
                let frames = video
                    .walk
                    .as_ref()
                    .map(|walk| format!(", {} erased / {} clean", walk.erased, walk.untouched))
                    .unwrap_or_default();
                println!(
                    "{name}: {} ({} frames{frames}, {})",
                    output.display(),
                    video.frames_extracted,
                    format_elapsed(video.elapsed)
                );
            }
            (None, None) => println!("{name}: not processed"),
        }
    }
    println!(
        "{} succeeded, {} failed in {}",
        report.succeeded(),
        report.failed(),
        format_elapsed(report.elapsed)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_discover_single_file_uses_parent_dir() {
        let dir = tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        File::create(&video).unwrap();

        let (files, input_dir) = discover_input_files(&video).unwrap();
        assert_eq!(files, vec![video.canonicalize().unwrap()]);
        assert_eq!(input_dir, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_discover_rejects_non_video_file() {
        let dir = tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        File::create(&notes).unwrap();
        assert!(discover_input_files(&notes).is_err());
    }

    #[test]
    fn test_discover_empty_directory_is_not_an_error() {
        let dir = tempdir().unwrap();
        let (files, _) = discover_input_files(dir.path()).unwrap();
        assert!(files.is_empty());
    }
}
