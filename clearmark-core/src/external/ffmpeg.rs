//! ffmpeg invocations for the three media stages of the pipeline.
//!
//! - [`extract_frames`] decodes a video into a numbered image sequence
//! - [`reconstruct_video`] encodes a cleaned sequence into a silent video
//! - [`merge_audio`] copies the source audio onto the silent video
//!
//! All three block until ffmpeg exits and surface failures through the
//! external-tool error family.

use std::path::{Path, PathBuf};

use ffmpeg_sidecar::command::FfmpegCommand;
use log::{debug, info};

use crate::config::EncodeSettings;
use crate::error::{external_tool_error, CoreError, CoreResult};
use crate::external::ffmpeg_executor::{run_ffmpeg, FfmpegSpawner};
use crate::frames::{self, FRAME_PREFIX, MAX_FRAME_INDEX};

/// Extracts frames from `video` into `out_dir` at `fps` frames per second.
///
/// Frames are written as `frame_%04d.<extension>` and returned in sequence
/// order. `quality` is passed as `-q:v` (lower is better for lossy formats).
pub fn extract_frames<S: FfmpegSpawner>(
    spawner: &S,
    video: &Path,
    out_dir: &Path,
    fps: u32,
    extension: &str,
    quality: u8,
) -> CoreResult<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;
    let pattern = out_dir.join(frames::frame_pattern(extension));

    let mut cmd = FfmpegCommand::new();
    cmd.input(video.to_string_lossy().as_ref())
        .args(["-vf", &format!("fps={fps}")])
        .args(["-q:v", &quality.to_string()])
        .overwrite()
        .output(pattern.to_string_lossy().as_ref());

    run_ffmpeg(spawner, cmd, "frame extraction")?;

    // Past 9999 ffmpeg widens the index to five digits, which list_frames
    // would silently skip.
    let overflow = out_dir.join(format!("{FRAME_PREFIX}{}.{extension}", MAX_FRAME_INDEX + 1));
    if overflow.exists() {
        return Err(CoreError::FrameLimitExceeded {
            count: count_sequence_files(out_dir, extension)?,
            max: MAX_FRAME_INDEX,
        });
    }

    let extracted = frames::list_frames(out_dir, extension)?;
    if extracted.is_empty() {
        return Err(external_tool_error(
            "ffmpeg",
            format!("no frames were extracted from {}", video.display()),
        ));
    }

    info!(
        "Extracted {} frames from {}",
        extracted.len(),
        video.display()
    );
    Ok(extracted)
}

fn count_sequence_files(dir: &Path, extension: &str) -> CoreResult<usize> {
    let suffix = format!(".{extension}");
    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let name = entry?.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(FRAME_PREFIX) && name.ends_with(&suffix) {
            count += 1;
        }
    }
    Ok(count)
}

/// Encodes the frame sequence in `frame_dir` into a silent video at `output`.
pub fn reconstruct_video<S: FfmpegSpawner>(
    spawner: &S,
    frame_dir: &Path,
    fps: u32,
    extension: &str,
    encode: &EncodeSettings,
    output: &Path,
) -> CoreResult<()> {
    let pattern = frame_dir.join(frames::frame_pattern(extension));
    let rate = fps.to_string();

    let mut cmd = FfmpegCommand::new();
    cmd.args(["-framerate", &rate])
        .input(pattern.to_string_lossy().as_ref())
        .args(["-c:v", &encode.video_codec])
        .args(["-crf", &encode.crf.to_string()])
        .args(["-preset", &encode.preset])
        .args(["-pix_fmt", &encode.pixel_format])
        .args(["-r", &rate])
        .args(["-an"])
        .overwrite()
        .output(output.to_string_lossy().as_ref());

    run_ffmpeg(spawner, cmd, "video reconstruction")?;
    debug!("Reconstructed video written to {}", output.display());
    Ok(())
}

/// Muxes the video stream of `silent` with the audio of `source` into
/// `output`. Both streams are copied; a source without audio is accepted.
pub fn merge_audio<S: FfmpegSpawner>(
    spawner: &S,
    silent: &Path,
    source: &Path,
    output: &Path,
) -> CoreResult<()> {
    let mut cmd = FfmpegCommand::new();
    cmd.input(silent.to_string_lossy().as_ref())
        .input(source.to_string_lossy().as_ref())
        .args(["-map", "0:v", "-map", "1:a?"])
        .args(["-c:v", "copy", "-c:a", "copy"])
        .overwrite()
        .output(output.to_string_lossy().as_ref());

    run_ffmpeg(spawner, cmd, "audio merge")?;
    debug!("Merged audio into {}", output.display());
    Ok(())
}
