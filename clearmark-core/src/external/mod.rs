// ============================================================================
// clearmark-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and the Erasure Subprocess
//
// Every external program the pipeline launches goes through a trait here so
// tests can substitute recorded fakes:
// - FfmpegSpawner / FfmpegProcess for ffmpeg (backed by ffmpeg-sidecar)
// - CommandRunner for one-shot programs such as the erasure script
//
// Both seams are passed into the pipeline explicitly; nothing in the library
// reaches for a global command runner.

use std::io;
use std::process::{Command, Stdio};

use crate::error::{command_start_error, CoreError, CoreResult};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Frame extraction, reconstruction and audio merge
pub mod ffmpeg;

/// Traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Recording fakes for the process seams (`test-mocks` feature)
#[cfg(all(unix, any(test, feature = "test-mocks")))]
pub mod mocks;

pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that `cmd_name` can be executed by running it with `-version`.
///
/// A missing binary maps to [`CoreError::DependencyNotFound`]; any other
/// spawn failure maps to [`CoreError::CommandStart`]. The exit status itself
/// is not inspected since some tools exit non-zero for `-version`.
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{cmd_name}' not found.");
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{cmd_name}': {e}");
            Err(command_start_error(cmd_name, e))
        }
    }
}

// ============================================================================
// ONE-SHOT COMMANDS
// ============================================================================

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, or `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a program to completion and captures its output.
///
/// Implementations return `Err` only when the program could not be run at
/// all; a non-zero exit is reported through [`CommandOutput::exit_code`].
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String]) -> CoreResult<CommandOutput>;
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdCommandRunner;

impl CommandRunner for StdCommandRunner {
    fn run(&self, program: &str, args: &[String]) -> CoreResult<CommandOutput> {
        log::trace!("Running {program} {}", args.join(" "));
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => CoreError::DependencyNotFound(program.to_string()),
                _ => command_start_error(program, e),
            })?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependency() {
        let result = check_dependency("clearmark-no-such-tool-42");
        assert!(matches!(result, Err(CoreError::DependencyNotFound(_))));
    }

    #[test]
    fn test_std_runner_captures_output_and_exit_code() {
        let runner = StdCommandRunner;
        let output = runner
            .run("sh", &["-c".to_string(), "echo out; echo err >&2; exit 3".to_string()])
            .unwrap();
        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[test]
    fn test_std_runner_missing_program() {
        let result = StdCommandRunner.run("clearmark-no-such-tool-42", &[]);
        assert!(matches!(result, Err(CoreError::DependencyNotFound(_))));
    }
}
