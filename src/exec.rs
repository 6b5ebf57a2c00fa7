//! External command execution
//!
//! Runs subprocesses while streaming stdout/stderr line-by-line on dedicated
//! reader threads, so full output is buffered for post-hoc error
//! classification without deadlocking on full pipe buffers. Failed commands
//! surface as [`CommandFailure`] values carrying the captured output.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use thiserror::Error;

use crate::error::{PilotError, PilotResult};

/// When to mirror a captured command's output to the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    /// Stream every line as it arrives
    Always,
    /// Stay silent unless the command fails, then replay the buffered output
    OnError,
    /// Never mirror output
    Never,
}

/// Captured output of a completed command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// An external command that did not complete successfully
#[derive(Error, Debug)]
pub enum CommandFailure {
    /// The program could not be started at all
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited with a failure status
    #[error("command `{command}` failed ({status})")]
    Failed {
        command: String,
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
}

impl CommandFailure {
    /// Combined captured output, stderr first, as classified by `classify`.
    pub fn output_text(&self) -> String {
        match self {
            CommandFailure::Spawn { .. } => String::new(),
            CommandFailure::Failed { stdout, stderr, .. } => format!("{stderr}{stdout}"),
        }
    }
}

/// Builder for an external command with an explicit environment.
///
/// Environment bindings are passed to the child verbatim on top of the
/// inherited process environment; tfpilot never mutates its own ambient
/// environment to communicate with child processes.
#[derive(Debug, Clone)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    env: BTreeMap<String, String>,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn envs<'a, I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, value) in vars {
            self.env.insert(key.to_string(), value.to_string());
        }
        self
    }

    /// Human-readable command line for logs and error messages.
    pub fn display(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }
        for (key, value) in &self.env {
            command.env(key, value);
        }
        command
    }

    /// Run without capturing; the child inherits the terminal.
    pub fn run(&self) -> Result<(), CommandFailure> {
        tracing::debug!(command = %self.display(), "running");
        let status = self
            .command()
            .status()
            .map_err(|source| CommandFailure::Spawn {
                command: self.display(),
                source,
            })?;
        if !status.success() {
            return Err(CommandFailure::Failed {
                command: self.display(),
                status,
                stdout: String::new(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    /// Run while capturing both streams, mirroring them per `echo`.
    ///
    /// Output is consumed line-by-line on one reader thread per stream so
    /// the child never blocks on a full pipe while we buffer the other one.
    pub fn run_captured(&self, echo: Echo) -> Result<CommandOutput, CommandFailure> {
        tracing::debug!(command = %self.display(), "running (captured)");
        let mut child = self
            .command()
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CommandFailure::Spawn {
                command: self.display(),
                source,
            })?;

        let live = echo == Echo::Always;
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let stdout_reader =
            thread::spawn(move || read_lines(stdout_pipe, live, StreamTarget::Stdout));
        let stderr_reader =
            thread::spawn(move || read_lines(stderr_pipe, live, StreamTarget::Stderr));

        let status = child.wait().map_err(|source| CommandFailure::Spawn {
            command: self.display(),
            source,
        })?;
        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();

        if !status.success() {
            if echo == Echo::OnError {
                replay(&stdout, StreamTarget::Stdout);
                replay(&stderr, StreamTarget::Stderr);
            }
            return Err(CommandFailure::Failed {
                command: self.display(),
                status,
                stdout,
                stderr,
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

#[derive(Clone, Copy)]
enum StreamTarget {
    Stdout,
    Stderr,
}

fn read_lines(pipe: Option<impl Read>, live: bool, target: StreamTarget) -> String {
    let Some(pipe) = pipe else {
        return String::new();
    };
    let mut buffer = String::new();
    let reader = BufReader::new(pipe);
    for line in reader.lines() {
        let Ok(line) = line else { break };
        if live {
            emit(&line, target);
        }
        buffer.push_str(&line);
        buffer.push('\n');
    }
    buffer
}

fn emit(line: &str, target: StreamTarget) {
    match target {
        StreamTarget::Stdout => {
            let mut out = std::io::stdout().lock();
            let _ = writeln!(out, "{line}");
        }
        StreamTarget::Stderr => {
            let mut err = std::io::stderr().lock();
            let _ = writeln!(err, "{line}");
        }
    }
}

fn replay(buffer: &str, target: StreamTarget) {
    if buffer.is_empty() {
        return;
    }
    match target {
        StreamTarget::Stdout => {
            let mut out = std::io::stdout().lock();
            let _ = out.write_all(buffer.as_bytes());
        }
        StreamTarget::Stderr => {
            let mut err = std::io::stderr().lock();
            let _ = err.write_all(buffer.as_bytes());
        }
    }
}

/// Fail fast when a required external tool is not installed.
pub fn ensure_tools(names: &[&str]) -> PilotResult<()> {
    for name in names {
        if which::which(name).is_err() {
            return Err(PilotError::MissingTool {
                name: (*name).to_string(),
            });
        }
    }
    Ok(())
}

/// Last non-empty line of a command's stdout, used to pick the image
/// reference out of a build command's progress output.
pub fn last_non_empty_line(output: &str) -> Option<&str> {
    output
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
}
