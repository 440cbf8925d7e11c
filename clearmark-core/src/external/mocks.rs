// ============================================================================
// clearmark-core/src/external/mocks.rs
// ============================================================================
//
// TEST DOUBLES: Recording Fakes for FfmpegSpawner and CommandRunner
//
// Expectations are matched against the arguments of each spawned command by
// substring, first match wins, and each expectation is consumed once. Every
// call is recorded so tests can assert on the exact command lines.
//
// Compiled for this crate's own tests, or for anyone enabling the
// `test-mocks` feature (the integration tests do, via a dev-dependency).

use std::cell::RefCell;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::rc::Rc;

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};

use super::{CommandOutput, CommandRunner, FfmpegProcess, FfmpegSpawner};
use crate::error::{external_tool_error, CoreError, CoreResult};

/// Mock implementation of FfmpegProcess.
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Vec<FfmpegEvent>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        for event in self.events_to_emit.drain(..) {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// Files a matched expectation writes before returning its process.
enum MockOutputs {
    None,
    /// An empty file at the last command argument.
    LastArgument,
    Files(Vec<(PathBuf, Vec<u8>)>),
}

struct MockFfmpegExpectation {
    arg_pattern: String,
    result: CoreResult<MockFfmpegProcess>,
    outputs: MockOutputs,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Rc<RefCell<Vec<MockFfmpegExpectation>>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
}

/// Builds an exit status from a process exit code.
pub fn exit_status(code: i32) -> ExitStatus {
    ExitStatus::from_raw(code << 8)
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, arg_pattern: &str, result: CoreResult<MockFfmpegProcess>, outputs: MockOutputs) {
        self.expectations.borrow_mut().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result,
            outputs,
        });
    }

    fn succeeding() -> MockFfmpegProcess {
        MockFfmpegProcess {
            events_to_emit: vec![FfmpegEvent::Done],
            exit_status: exit_status(0),
        }
    }

    /// Succeeds, optionally creating an empty file at the output argument.
    pub fn add_success_expectation(&self, arg_pattern: &str, create_dummy_output: bool) {
        let outputs = if create_dummy_output {
            MockOutputs::LastArgument
        } else {
            MockOutputs::None
        };
        self.push(arg_pattern, Ok(Self::succeeding()), outputs);
    }

    /// Succeeds after writing each `(path, contents)` pair.
    pub fn add_success_with_files(&self, arg_pattern: &str, files: Vec<(PathBuf, Vec<u8>)>) {
        self.push(arg_pattern, Ok(Self::succeeding()), MockOutputs::Files(files));
    }

    /// Runs, logs `message` at error level and exits with `exit_code`.
    pub fn add_exit_error_expectation(&self, arg_pattern: &str, message: &str, exit_code: i32) {
        let process = MockFfmpegProcess {
            events_to_emit: vec![FfmpegEvent::Log(LogLevel::Error, message.to_string())],
            exit_status: exit_status(exit_code),
        };
        self.push(arg_pattern, Ok(process), MockOutputs::None);
    }

    /// Fails to spawn with `error`.
    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.push(arg_pattern, Err(error), MockOutputs::None);
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }

    /// Number of expectations that were never matched.
    pub fn pending_expectations(&self) -> usize {
        self.expectations.borrow().len()
    }
}

fn write_outputs(outputs: MockOutputs, args: &[String]) -> CoreResult<()> {
    let files = match outputs {
        MockOutputs::None => return Ok(()),
        MockOutputs::LastArgument => match args.last() {
            Some(last) => vec![(PathBuf::from(last), Vec::new())],
            None => return Ok(()),
        },
        MockOutputs::Files(files) => files,
    };
    for (path, contents) in files {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, contents)?;
        log::debug!("MockFfmpegSpawner wrote {}", path.display());
    }
    Ok(())
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .as_inner()
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        self.received_calls.borrow_mut().push(args.clone());

        let expectation = {
            let mut expectations = self.expectations.borrow_mut();
            let found = expectations
                .iter()
                .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)));
            match found {
                Some(index) => expectations.remove(index),
                None => {
                    log::error!("MockFfmpegSpawner: no expectation for {args:?}");
                    return Err(external_tool_error(
                        "mock ffmpeg",
                        format!("no expectation matches {}", args.join(" ")),
                    ));
                }
            }
        };

        log::debug!(
            "MockFfmpegSpawner: matched expectation '{}'",
            expectation.arg_pattern
        );
        let process = expectation.result?;
        write_outputs(expectation.outputs, &args)?;
        Ok(process)
    }
}

type Handler = dyn Fn(&str, &[String]) -> CoreResult<CommandOutput>;

/// Recording [`CommandRunner`] whose behavior is a closure.
#[derive(Clone)]
pub struct MockCommandRunner {
    handler: Rc<Handler>,
    calls: Rc<RefCell<Vec<(String, Vec<String>)>>>,
}

impl MockCommandRunner {
    /// Answers every call with the result of `handler`.
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&str, &[String]) -> CoreResult<CommandOutput> + 'static,
    {
        Self {
            handler: Rc::new(handler),
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Exits 0 without touching the filesystem.
    pub fn succeeding() -> Self {
        Self::with_handler(|_, _| {
            Ok(CommandOutput {
                exit_code: Some(0),
                ..CommandOutput::default()
            })
        })
    }

    /// Exits with `code` and writes `stderr`.
    pub fn failing(code: i32, stderr: &str) -> Self {
        let stderr = stderr.to_string();
        Self::with_handler(move |_, _| {
            Ok(CommandOutput {
                exit_code: Some(code),
                stdout: String::new(),
                stderr: stderr.clone(),
            })
        })
    }

    /// Copies the file named by the argument `input_from_end` positions from
    /// the end onto the one `output_from_end` positions from the end, then
    /// exits 0. With the erasure contract (`... <input> <output> <w> <h> <l>
    /// <t>`) that is `copying(6, 5)`.
    pub fn copying(input_from_end: usize, output_from_end: usize) -> Self {
        Self::with_handler(move |_, args| {
            let pick = |from_end: usize| {
                args.len()
                    .checked_sub(from_end)
                    .and_then(|index| args.get(index))
                    .ok_or_else(|| external_tool_error("mock command", "too few arguments"))
            };
            std::fs::copy(pick(input_from_end)?, pick(output_from_end)?)?;
            Ok(CommandOutput {
                exit_code: Some(0),
                ..CommandOutput::default()
            })
        })
    }

    /// Every `(program, args)` pair received so far.
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, program: &str, args: &[String]) -> CoreResult<CommandOutput> {
        self.calls
            .borrow_mut()
            .push((program.to_string(), args.to_vec()));
        (self.handler)(program, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_spawn_records_arguments_and_writes_dummy_output() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.mp4");
        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("-an", true);

        let mut cmd = FfmpegCommand::new();
        cmd.input("in.mp4").args(["-an"]).output(output.to_string_lossy().as_ref());
        let mut process = spawner.spawn(cmd).unwrap();
        assert!(process.wait().unwrap().success());

        let calls = spawner.get_received_calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains(&"in.mp4".to_string()));
        assert_eq!(calls[0].last(), Some(&output.to_string_lossy().into_owned()));
        assert!(output.exists());
        assert_eq!(spawner.pending_expectations(), 0);
    }

    #[test]
    fn test_unmatched_spawn_is_an_error() {
        let spawner = MockFfmpegSpawner::new();
        let mut cmd = FfmpegCommand::new();
        cmd.args(["-version"]);
        assert!(spawner.spawn(cmd).is_err());
    }
}
