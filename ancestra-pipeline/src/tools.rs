//! Typed invocation of external annotator executables.
//!
//! Commands are built structurally (program + argument list), never through
//! shell interpolation. A nonzero exit, a missing expected output file, or
//! exceeding the timeout all surface as distinct [`ToolError`] variants so
//! the pipeline can refuse to advance past a failed stage.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with status {status}")]
    NonZeroExit { program: String, status: i32 },

    #[error("{program} did not finish within {timeout:?} and was killed")]
    TimedOut { program: String, timeout: Duration },

    #[error("{program} finished but produced no output at {path:?}")]
    MissingOutput { program: String, path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolOutput {
    pub status: i32,
}

/// One external-tool invocation.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
    stdout_to: Option<PathBuf>,
    expect_output: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ToolCommand {
    pub fn new(program: &str) -> ToolCommand {
        ToolCommand {
            program: program.to_string(),
            args: Vec::new(),
            stdout_to: None,
            expect_output: None,
            timeout: None,
        }
    }

    pub fn arg<T: AsRef<str>>(mut self, arg: T) -> ToolCommand {
        self.args.push(arg.as_ref().to_string());
        self
    }

    pub fn arg_path<T: AsRef<Path>>(mut self, path: T) -> ToolCommand {
        self.args.push(path.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Redirect the child's stdout into a file (tools that print their
    /// report instead of taking an output flag).
    pub fn stdout_to<T: AsRef<Path>>(mut self, path: T) -> ToolCommand {
        self.stdout_to = Some(path.as_ref().to_path_buf());
        self
    }

    /// File that must exist after a successful run; its absence is a
    /// failure even on exit status 0.
    pub fn expect_output<T: AsRef<Path>>(mut self, path: T) -> ToolCommand {
        self.expect_output = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> ToolCommand {
        self.timeout = Some(timeout);
        self
    }

    /// Run to completion, polling for the timeout if one is set.
    pub fn run(&self) -> Result<ToolOutput, ToolError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command.stdin(Stdio::null());

        if let Some(path) = &self.stdout_to {
            let file = File::create(path)?;
            command.stdout(Stdio::from(file));
        } else {
            command.stdout(Stdio::null());
        }

        let mut child = command.spawn().map_err(|source| ToolError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let status = match self.timeout {
            None => child.wait()?,
            Some(timeout) => {
                let started = Instant::now();
                loop {
                    if let Some(status) = child.try_wait()? {
                        break status;
                    }
                    if started.elapsed() >= timeout {
                        child.kill()?;
                        child.wait()?;
                        return Err(ToolError::TimedOut {
                            program: self.program.clone(),
                            timeout,
                        });
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
            }
        };

        if !status.success() {
            return Err(ToolError::NonZeroExit {
                program: self.program.clone(),
                status: status.code().unwrap_or(-1),
            });
        }

        if let Some(path) = &self.expect_output {
            if !path.exists() {
                return Err(ToolError::MissingOutput {
                    program: self.program.clone(),
                    path: path.clone(),
                });
            }
        }

        Ok(ToolOutput {
            status: status.code().unwrap_or(0),
        })
    }
}
