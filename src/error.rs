use thiserror::Error;

/// A command that ran to completion but exited non-zero
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{program}` exited with code {code}: {}", .stderr.trim())]
pub struct CommandFailure {
  pub program: String,
  pub code: i32,
  pub stderr: String,
}

#[derive(Debug, Error)]
pub enum ReconcileError {
  #[error("Failed to create kube config file: {0}")]
  CredentialSetup(CommandFailure),
  #[error("Failed to apply identity mappings: {0}")]
  Apply(CommandFailure),
  #[error("Failed to delete identity mappings: {0}")]
  Delete(CommandFailure),
  #[error("Failed to read aws-auth config map: {0}")]
  Read(CommandFailure),
  #[error("Command failed: {0}")]
  CommandExecution(#[from] CommandFailure),
  #[error("Failed to run `{program}`: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },
  #[error("Json decode error: {0:?}")]
  Json(#[from] serde_json::Error),
  #[error("Yaml encode error: {0:?}")]
  Yaml(#[from] serde_yaml::Error),
  #[error("aws-auth config map has no data field")]
  MissingData,
  #[error("Invalid lifecycle event: {0}")]
  InvalidEvent(String),
}

impl ReconcileError {
  /// Attribute a generic command failure to the step that ran the command.
  /// Other errors pass through unchanged.
  pub fn at_step(self, step: fn(CommandFailure) -> ReconcileError) -> Self {
    match self {
      ReconcileError::CommandExecution(failure) => step(failure),
      other => other,
    }
  }

  /// Exit code of the failed command, if this error came from one
  pub fn exit_code(&self) -> Option<i32> {
    match self {
      ReconcileError::CredentialSetup(f)
      | ReconcileError::Apply(f)
      | ReconcileError::Delete(f)
      | ReconcileError::Read(f)
      | ReconcileError::CommandExecution(f) => Some(f.code),
      _ => None,
    }
  }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
