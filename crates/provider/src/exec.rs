//! Subprocess capability used to drive external login tools.
//!
//! Responsibilities:
//! - Define the [`CommandRunner`] seam and the [`CommandInvocation`] it runs.
//! - Provide [`ProcessRunner`], which spawns real processes via `tokio::process`.
//!
//! Does NOT handle:
//! - Interpreting tool output (each provider parses its own tool's output).
//!
//! Invariants:
//! - Secret arguments are only exposed when the process is spawned; `Display`
//!   and `Debug` of an invocation show them as `****`.
//! - Spawned children are killed when the running future is dropped, so
//!   cancelling an operation never leaves a login tool behind.
//! - Inherited invocations share the terminal; nothing is captured.

use std::fmt;
use std::process::Stdio;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::debug;

/// How a child process's standard streams are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
    /// Stdin is closed; stdout and stderr are captured.
    Captured,
    /// All three streams are inherited from the parent (interactive use).
    Inherited,
}

#[derive(Clone)]
enum CommandArg {
    Plain(String),
    Secret(SecretString),
}

/// A program and arguments to run.
#[derive(Clone)]
pub struct CommandInvocation {
    program: String,
    args: Vec<CommandArg>,
    stdio: StdioMode,
}

impl CommandInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdio: StdioMode::Captured,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(CommandArg::Plain(arg.into()));
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args
            .extend(args.into_iter().map(|a| CommandArg::Plain(a.into())));
        self
    }

    /// Append an argument that must never be logged.
    pub fn secret_arg(mut self, arg: SecretString) -> Self {
        self.args.push(CommandArg::Secret(arg));
        self
    }

    pub fn stdio(mut self, stdio: StdioMode) -> Self {
        self.stdio = stdio;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn stdio_mode(&self) -> StdioMode {
        self.stdio
    }

    /// Arguments with secrets replaced by `****`.
    pub fn redacted_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| match arg {
                CommandArg::Plain(s) => s.clone(),
                CommandArg::Secret(_) => "****".to_string(),
            })
            .collect()
    }

    /// Arguments as passed to the process, secrets included.
    pub fn exposed_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| match arg {
                CommandArg::Plain(s) => s.clone(),
                CommandArg::Secret(s) => s.expose_secret().to_string(),
            })
            .collect()
    }

    /// True if any argument equals `needle` (secrets are not compared).
    pub fn has_arg(&self, needle: &str) -> bool {
        self.args
            .iter()
            .any(|arg| matches!(arg, CommandArg::Plain(s) if s == needle))
    }
}

impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in self.redacted_args() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandInvocation")
            .field("program", &self.program)
            .field("args", &self.redacted_args())
            .field("stdio", &self.stdio)
            .finish()
    }
}

/// Result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
    pub success: bool,
    /// Captured stdout; empty for inherited invocations.
    pub stdout: String,
    /// Captured stderr; empty for inherited invocations.
    pub stderr: String,
}

impl CommandOutput {
    /// A short description of why the process failed.
    pub fn failure_reason(&self) -> String {
        let stderr = self.stderr.trim();
        match (self.code, stderr.is_empty()) {
            (Some(code), true) => format!("exited with status {}", code),
            (Some(code), false) => format!("exited with status {}: {}", code, stderr),
            (None, true) => "terminated by signal".to_string(),
            (None, false) => format!("terminated by signal: {}", stderr),
        }
    }
}

/// Failures to run a process at all (as opposed to it exiting non-zero).
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Runs external commands on behalf of providers.
#[async_trait]
pub trait CommandRunner: Send + Sync + fmt::Debug {
    /// Run `invocation` to completion.
    ///
    /// A non-zero exit is reported through [`CommandOutput::success`], not as an error.
    async fn run(&self, invocation: &CommandInvocation) -> Result<CommandOutput, CommandError>;
}

/// [`CommandRunner`] that spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &CommandInvocation) -> Result<CommandOutput, CommandError> {
        debug!(command = %invocation, stdio = ?invocation.stdio, "running command");

        let mut command = tokio::process::Command::new(&invocation.program);
        command.args(invocation.exposed_args()).kill_on_drop(true);

        match invocation.stdio {
            StdioMode::Captured => {
                command
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped());
            }
            StdioMode::Inherited => {
                command
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit());
            }
        }

        let child = command.spawn().map_err(|source| CommandError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| CommandError::Wait {
                program: invocation.program.clone(),
                source,
            })?;

        debug!(
            program = %invocation.program,
            code = ?output.status.code(),
            "command finished"
        );

        Ok(CommandOutput {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
