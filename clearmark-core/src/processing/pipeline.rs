// ============================================================================
// clearmark-core/src/processing/pipeline.rs
// ============================================================================
//
// BATCH ORCHESTRATION: Per-Video Watermark Removal
//
// Each input video moves through
//
//   Extracting -> Erasing -> Reconstructing -> MergingAudio -> Done
//
// and a failure at any stage stops that video only. The batch always runs to
// the end and returns one VideoReport per input.
//
// LAYOUT (per input file <name>):
//   <work>/frames_<name>/    extracted frames
//   <work>/blurred_<name>/   cleaned frames, same names as the extracted ones
//   <output>/temp_<name>     silent reconstructed video
//   <output>/final_<name>    result
//
// <work> is config.work_dir, or a temporary directory under the output
// directory that lives for the duration of the batch.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{error, info, warn};
use tempfile::TempDir;

use crate::config::CoreConfig;
use crate::error::CoreResult;
use crate::external::ffmpeg::{extract_frames, merge_audio, reconstruct_video};
use crate::external::{CommandRunner, FfmpegSpawner};
use crate::frames;
use crate::processing::eraser::WatermarkEraser;
use crate::processing::walker::{walk, WalkOptions, WalkSummary};
use crate::temp_files;
use crate::utils::{format_elapsed, video_file_name};

/// Prefix of the per-video extracted frame directory.
pub const FRAMES_DIR_PREFIX: &str = "frames_";
/// Prefix of the per-video cleaned frame directory.
pub const CLEANED_DIR_PREFIX: &str = "blurred_";
/// Prefix of the silent reconstructed video.
pub const TEMP_VIDEO_PREFIX: &str = "temp_";
/// Prefix of the finished video.
pub const FINAL_VIDEO_PREFIX: &str = "final_";

/// Stage a video has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoStage {
    Pending,
    Extracting,
    Erasing,
    Reconstructing,
    MergingAudio,
    Done,
}

impl fmt::Display for VideoStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VideoStage::Pending => "pending",
            VideoStage::Extracting => "extracting",
            VideoStage::Erasing => "erasing",
            VideoStage::Reconstructing => "reconstructing",
            VideoStage::MergingAudio => "merging audio",
            VideoStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Outcome for one input video.
///
/// The failed state is `error: Some(..)`; `stage` then names the stage that
/// failed rather than a separate `Failed` variant. See [`Self::failed_at`].
#[derive(Debug, Clone)]
pub struct VideoReport {
    pub input: PathBuf,
    pub stage: VideoStage,
    pub error: Option<String>,
    pub frames_extracted: usize,
    pub walk: Option<WalkSummary>,
    pub output: Option<PathBuf>,
    pub elapsed: Duration,
}

impl VideoReport {
    fn new(input: &Path) -> Self {
        Self {
            input: input.to_path_buf(),
            stage: VideoStage::Pending,
            error: None,
            frames_extracted: 0,
            walk: None,
            output: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.stage == VideoStage::Done && self.error.is_none()
    }

    /// The stage that failed, or `None` for a video that did not fail.
    pub fn failed_at(&self) -> Option<VideoStage> {
        self.error.as_ref().map(|_| self.stage)
    }
}

/// Outcome for a whole batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub videos: Vec<VideoReport>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.videos.iter().filter(|v| v.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.videos.len() - self.succeeded()
    }
}

/// Working paths for one input video.
#[derive(Debug, Clone)]
struct VideoPaths {
    frames_dir: PathBuf,
    cleaned_dir: PathBuf,
    temp_video: PathBuf,
    final_video: PathBuf,
}

impl VideoPaths {
    fn new(input: &Path, work_root: &Path, output_dir: &Path) -> CoreResult<Self> {
        let name = video_file_name(input)?;
        Ok(Self {
            frames_dir: work_root.join(format!("{FRAMES_DIR_PREFIX}{name}")),
            cleaned_dir: work_root.join(format!("{CLEANED_DIR_PREFIX}{name}")),
            temp_video: output_dir.join(format!("{TEMP_VIDEO_PREFIX}{name}")),
            final_video: output_dir.join(format!("{FINAL_VIDEO_PREFIX}{name}")),
        })
    }
}

/// Empties `dir` so frames from an earlier run cannot leak into this one.
fn reset_dir(dir: &Path) -> CoreResult<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)?;
    }
    std::fs::create_dir_all(dir)?;
    Ok(())
}

fn remove_intermediates(paths: &VideoPaths) {
    for dir in [&paths.frames_dir, &paths.cleaned_dir] {
        if let Err(e) = std::fs::remove_dir_all(dir) {
            warn!("Failed to remove {}: {e}", dir.display());
        }
    }
    if paths.temp_video.exists() {
        if let Err(e) = std::fs::remove_file(&paths.temp_video) {
            warn!("Failed to remove {}: {e}", paths.temp_video.display());
        }
    }
}

fn run_video<S: FfmpegSpawner, R: CommandRunner>(
    spawner: &S,
    runner: &R,
    config: &CoreConfig,
    input: &Path,
    paths: &VideoPaths,
    report: &mut VideoReport,
) -> CoreResult<PathBuf> {
    let ext = config.frame_extension.as_str();

    report.stage = VideoStage::Extracting;
    reset_dir(&paths.frames_dir)?;
    let extracted = extract_frames(
        spawner,
        input,
        &paths.frames_dir,
        config.fps,
        ext,
        config.encode.extract_quality,
    )?;
    report.frames_extracted = extracted.len();

    report.stage = VideoStage::Erasing;
    reset_dir(&paths.cleaned_dir)?;
    let eraser = WatermarkEraser::new(runner, &config.eraser, &config.detection);
    let options = WalkOptions {
        passthrough_unprocessed: config.passthrough_unprocessed,
        show_progress: config.show_progress,
    };
    report.walk = Some(walk(&paths.frames_dir, &paths.cleaned_dir, &eraser, options)?);
    frames::verify_contiguous(&paths.cleaned_dir, ext, extracted.len())?;

    report.stage = VideoStage::Reconstructing;
    reconstruct_video(
        spawner,
        &paths.cleaned_dir,
        config.fps,
        ext,
        &config.encode,
        &paths.temp_video,
    )?;

    if config.merge_audio {
        report.stage = VideoStage::MergingAudio;
        merge_audio(spawner, &paths.temp_video, input, &paths.final_video)?;
    } else {
        std::fs::rename(&paths.temp_video, &paths.final_video)?;
    }

    if !config.keep_intermediates {
        remove_intermediates(paths);
    }
    Ok(paths.final_video.clone())
}

fn process_one<S: FfmpegSpawner, R: CommandRunner>(
    spawner: &S,
    runner: &R,
    config: &CoreConfig,
    work_root: &Path,
    input: &Path,
) -> VideoReport {
    let start = Instant::now();
    let mut report = VideoReport::new(input);

    let result = VideoPaths::new(input, work_root, &config.output_dir)
        .and_then(|paths| run_video(spawner, runner, config, input, &paths, &mut report));

    match result {
        Ok(output) => {
            report.stage = VideoStage::Done;
            report.output = Some(output);
        }
        Err(e) => {
            error!(
                "Failed to process {} while {}: {e}",
                input.display(),
                report.stage
            );
            report.error = Some(e.to_string());
        }
    }
    report.elapsed = start.elapsed();
    report
}

/// Removes the watermark from every video in `files_to_process`.
///
/// Generic over the ffmpeg spawner and the command runner used by the
/// external eraser so both can be replaced in tests. Returns `Err` only for
/// problems that affect the whole batch (invalid configuration, unusable
/// output or work directory); per-video failures are recorded in the report.
///
/// # Examples
///
/// ```rust,no_run
/// use clearmark_core::config::CoreConfigBuilder;
/// use clearmark_core::external::{SidecarSpawner, StdCommandRunner};
/// use clearmark_core::{find_processable_files, process_videos};
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .input_dir(PathBuf::from("input"))
///     .output_dir(PathBuf::from("output"))
///     .build();
/// let files = find_processable_files(&config.input_dir).unwrap();
/// let report = process_videos(&SidecarSpawner, &StdCommandRunner, &config, &files).unwrap();
/// println!("{} of {} videos cleaned", report.succeeded(), report.videos.len());
/// ```
pub fn process_videos<S: FfmpegSpawner, R: CommandRunner>(
    spawner: &S,
    runner: &R,
    config: &CoreConfig,
    files_to_process: &[PathBuf],
) -> CoreResult<BatchReport> {
    config.validate()?;
    std::fs::create_dir_all(&config.output_dir)?;

    // Holds the temporary work directory, if any, until the batch ends.
    let _temp_work: Option<TempDir>;
    let work_root = match &config.work_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            _temp_work = None;
            dir.clone()
        }
        None => {
            let temp = temp_files::create_temp_dir(&config.output_dir, "clearmark_work_")?;
            let path = temp.path().to_path_buf();
            _temp_work = Some(temp);
            path
        }
    };

    let batch_start = Instant::now();
    info!(
        "Processing {} video(s) into {}",
        files_to_process.len(),
        config.output_dir.display()
    );

    let mut report = BatchReport::default();
    for (position, input) in files_to_process.iter().enumerate() {
        info!(
            "[{}/{}] {}",
            position + 1,
            files_to_process.len(),
            input.display()
        );
        let video = process_one(spawner, runner, config, &work_root, input);
        if let Some(output) = &video.output {
            info!(
                "Finished {} in {} -> {}",
                input.display(),
                format_elapsed(video.elapsed),
                output.display()
            );
        }
        report.videos.push(video);
    }

    report.elapsed = batch_start.elapsed();
    info!(
        "Batch finished in {}: {} succeeded, {} failed",
        format_elapsed(report.elapsed),
        report.succeeded(),
        report.failed()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_paths_layout() {
        let paths = VideoPaths::new(
            Path::new("/in/media-3.mp4"),
            Path::new("/work"),
            Path::new("/out"),
        )
        .unwrap();
        assert_eq!(paths.frames_dir, PathBuf::from("/work/frames_media-3.mp4"));
        assert_eq!(paths.cleaned_dir, PathBuf::from("/work/blurred_media-3.mp4"));
        assert_eq!(paths.temp_video, PathBuf::from("/out/temp_media-3.mp4"));
        assert_eq!(paths.final_video, PathBuf::from("/out/final_media-3.mp4"));
    }

    #[test]
    fn test_reset_dir_clears_stale_frames() {
        let dir = tempfile::tempdir().unwrap();
        let frames = dir.path().join("frames_a.mp4");
        std::fs::create_dir_all(&frames).unwrap();
        std::fs::write(frames.join("frame_0042.png"), b"stale").unwrap();

        reset_dir(&frames).unwrap();
        assert!(frames.is_dir());
        assert_eq!(std::fs::read_dir(&frames).unwrap().count(), 0);
    }

    #[test]
    fn test_batch_report_counts() {
        let mut done = VideoReport::new(Path::new("a.mp4"));
        done.stage = VideoStage::Done;
        let mut failed = VideoReport::new(Path::new("b.mp4"));
        failed.stage = VideoStage::Reconstructing;
        failed.error = Some("boom".into());

        let report = BatchReport {
            videos: vec![done, failed],
            elapsed: Duration::ZERO,
        };
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.videos[0].failed_at(), None);
        assert_eq!(report.videos[1].failed_at(), Some(VideoStage::Reconstructing));
        assert_eq!(VideoStage::MergingAudio.to_string(), "merging audio");
    }
}
