//! External process invocation.
//!
//! Every call to `aws` and `kubectl` goes through a [`CommandRunner`].

use crate::{
  constants::NOT_FOUND_MESSAGE,
  error::{CommandFailure, ReconcileError, Result},
};
use std::{fmt, future::Future, io, process::Stdio};
use tokio::{io::AsyncWriteExt, process::Command};

/// A single command line, with optional standard input and extra environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
  pub stdin: Option<String>,
  pub envs: Vec<(String, String)>,
}

impl Invocation {
  pub fn new(program: impl Into<String>) -> Self {
    Invocation {
      program: program.into(),
      ..Invocation::default()
    }
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.envs.push((key.into(), value.into()));
    self
  }

  pub fn stdin(mut self, input: impl Into<String>) -> Self {
    self.stdin = Some(input.into());
    self
  }

  #[cfg(test)]
  pub fn env_value(&self, key: &str) -> Option<&str> {
    self
      .envs
      .iter()
      .rev()
      .find(|(k, _)| k == key)
      .map(|(_, v)| v.as_str())
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program)?;
    for arg in &self.args {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

/// Outcome of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
  /// -1 when the process was killed by a signal
  pub exit_code: i32,
  pub stdout: String,
  pub stderr: String,
}

impl CommandResult {
  pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
    CommandResult {
      exit_code,
      stdout: stdout.into(),
      stderr: stderr.into(),
    }
  }

  pub fn success(&self) -> bool {
    self.exit_code == 0
  }

  /// Whether kubectl failed because the aws-auth config map does not exist.
  ///
  /// kubectl exposes no structured error on the CLI, so this reads stderr.
  /// A bare `(NotFound)` is not enough: a missing namespace or API group
  /// reports the same reason.
  pub fn is_not_found(&self) -> bool {
    !self.success() && self.stderr.contains(NOT_FOUND_MESSAGE)
  }

  /// Stdout of a successful run, otherwise [`ReconcileError::CommandExecution`]
  pub fn into_stdout(self, program: &str) -> Result<String> {
    if self.success() {
      Ok(self.stdout)
    } else {
      Err(ReconcileError::CommandExecution(CommandFailure {
        program: program.to_string(),
        code: self.exit_code,
        stderr: self.stderr,
      }))
    }
  }
}

/// Runs an [`Invocation`] to completion.
///
/// `Err` means the process could not be run at all; a non-zero exit is a
/// successful `Ok` carrying that exit code.
pub trait CommandRunner {
  fn run(
    &self,
    invocation: &Invocation,
  ) -> impl Future<Output = io::Result<CommandResult>> + Send;
}

/// Spawns real processes with `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
  async fn run(&self, invocation: &Invocation) -> io::Result<CommandResult> {
    let mut cmd = Command::new(&invocation.program);
    cmd
      .args(&invocation.args)
      .envs(invocation.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
      .stdin(if invocation.stdin.is_some() {
        Stdio::piped()
      } else {
        Stdio::null()
      })
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true);

    let mut child = cmd.spawn()?;

    let pipe = child.stdin.take();
    let input = invocation.stdin.as_deref().unwrap_or_default();
    // stdin is fed while output is collected, so neither side can fill a pipe and stall
    let feed = async move {
      if let Some(mut pipe) = pipe {
        match pipe.write_all(input.as_bytes()).await {
          // the child exited without reading everything; its exit status says why
          Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
          other => other?,
        }
        // dropping the pipe closes it, which ends `kubectl apply -f -` input
      }
      Ok::<(), io::Error>(())
    };

    let (fed, output) = tokio::join!(feed, child.wait_with_output());
    let output = output?;
    fed?;

    Ok(CommandResult {
      exit_code: output.status.code().unwrap_or(-1),
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
  }
}
