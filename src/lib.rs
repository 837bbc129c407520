use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod command;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod manifest;
pub mod reconciler;

#[cfg(test)]
mod test_utils;

pub use command::{CommandResult, CommandRunner, Invocation, ProcessRunner};
pub use config::Config;
pub use error::{CommandFailure, ReconcileError, Result};
pub use event::{resource_id, LifecycleEvent, RequestType, ResourceProperties};
pub use manifest::render_manifest;
pub use reconciler::{Outcome, Reconciler};

/// Map a role in AWS IAM to Kubernetes groups
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RoleMapping {
  /// ARN of the AWS Role
  #[serde(alias = "RoleArn", alias = "roleArn")]
  pub rolearn: String,
  /// Username inside kube
  #[serde(alias = "Username", default)]
  pub username: String,
  /// Groups in kube
  #[serde(alias = "Groups", default)]
  pub groups: Vec<String>,
  /// Any other keys, rendered into the entry as given
  #[serde(flatten)]
  pub extra: BTreeMap<String, serde_json::Value>,
}
