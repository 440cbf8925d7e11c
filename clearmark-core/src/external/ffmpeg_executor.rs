// ============================================================================
// clearmark-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// - FfmpegProcess: an active ffmpeg process
// - FfmpegSpawner: creates ffmpeg processes from an FfmpegCommand
// - SidecarSpawner: the ffmpeg-sidecar implementation
// - run_ffmpeg: spawn, drain events, wait and map failure to CoreError

use std::process::ExitStatus;

use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};

use crate::error::{command_failed_error, command_start_error, command_wait_error, CoreResult};

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using a provided handler closure.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;
    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

/// Wrapper around the ffmpeg-sidecar child implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {e}");
            command_failed_error("ffmpeg (event iterator)", ExitStatus::default(), e.to_string())
        })?;
        for event in iterator {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0.wait().map_err(|e| command_wait_error("ffmpeg", e))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg", e))
    }
}

/// Runs `cmd` to completion.
///
/// Error and fatal log lines are collected while the process runs and become
/// the failure message when the exit status is non-zero. `operation` names the
/// step in logs and errors, e.g. "frame extraction".
pub fn run_ffmpeg<S: FfmpegSpawner>(
    spawner: &S,
    cmd: FfmpegCommand,
    operation: &str,
) -> CoreResult<()> {
    log::debug!("Running ffmpeg ({operation}): {cmd:?}");

    let mut process = spawner.spawn(cmd)?;
    let mut stderr_buffer = String::new();
    process.handle_events(|event| {
        match event {
            FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line) | FfmpegEvent::Error(line) => {
                log::trace!("ffmpeg ({operation}): {line}");
                stderr_buffer.push_str(&line);
                stderr_buffer.push('\n');
            }
            FfmpegEvent::Log(_, line) => log::trace!("ffmpeg ({operation}): {line}"),
            _ => {}
        }
        Ok(())
    })?;

    let status = process.wait()?;
    if !status.success() {
        let message = if stderr_buffer.is_empty() {
            format!("{operation} failed")
        } else {
            format!("{operation} failed: {}", stderr_buffer.trim())
        };
        log::error!("ffmpeg {message}");
        return Err(command_failed_error(
            format!("ffmpeg ({operation})"),
            status,
            message,
        ));
    }
    Ok(())
}
