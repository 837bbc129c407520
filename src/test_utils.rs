//! Test utilities for faking the aws and kubectl binaries.

use crate::command::{CommandResult, CommandRunner, Invocation};
use std::future::Future;
use std::io;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
enum Response {
  Exit(CommandResult),
  SpawnError,
}

/// A fake runner that answers by subcommand and records every invocation.
/// Unmatched invocations succeed with empty output.
#[derive(Clone, Default)]
pub struct FakeRunner {
  responses: Arc<Mutex<Vec<(String, Response)>>>,
  calls: Arc<Mutex<Vec<Invocation>>>,
}

impl FakeRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Answer invocations that have `subcommand` among their arguments
  pub fn on(self, subcommand: &str, result: CommandResult) -> Self {
    self
      .responses
      .lock()
      .unwrap()
      .push((subcommand.to_string(), Response::Exit(result)));
    self
  }

  /// Make invocations with `subcommand` fail as if the binary were missing
  pub fn fail_to_spawn(self, subcommand: &str) -> Self {
    self
      .responses
      .lock()
      .unwrap()
      .push((subcommand.to_string(), Response::SpawnError));
    self
  }

  pub fn calls(&self) -> Vec<Invocation> {
    self.calls.lock().unwrap().clone()
  }

  /// The subcommand of each recorded call, in order
  pub fn subcommands(&self) -> Vec<String> {
    self
      .calls()
      .iter()
      .map(|inv| {
        inv
          .args
          .iter()
          .find(|a| ["update-kubeconfig", "apply", "delete", "get"].contains(&a.as_str()))
          .cloned()
          .unwrap_or_default()
      })
      .collect()
  }

  pub fn call_with(&self, subcommand: &str) -> Option<Invocation> {
    self
      .calls()
      .into_iter()
      .find(|inv| inv.args.iter().any(|a| a == subcommand))
  }

  fn respond(&self, invocation: &Invocation) -> Response {
    let responses = self.responses.lock().unwrap();
    responses
      .iter()
      .find(|(sub, _)| invocation.args.iter().any(|a| a == sub))
      .map(|(_, r)| r.clone())
      .unwrap_or_else(|| Response::Exit(CommandResult::new(0, "", "")))
  }
}

impl CommandRunner for FakeRunner {
  fn run(
    &self,
    invocation: &Invocation,
  ) -> impl Future<Output = io::Result<CommandResult>> + Send {
    self.calls.lock().unwrap().push(invocation.clone());
    let response = self.respond(invocation);
    async move {
      match response {
        Response::Exit(result) => Ok(result),
        Response::SpawnError => Err(io::Error::new(
          io::ErrorKind::NotFound,
          "No such file or directory",
        )),
      }
    }
  }
}

pub fn ok(stdout: &str) -> CommandResult {
  CommandResult::new(0, stdout, "")
}

pub fn failed(code: i32, stderr: &str) -> CommandResult {
  CommandResult::new(code, "", stderr)
}

/// `kubectl get configmap aws-auth -o json` output
pub fn config_map_json(map_roles: &str) -> String {
  serde_json::json!({
    "apiVersion": "v1",
    "kind": "ConfigMap",
    "metadata": {
      "name": "aws-auth",
      "namespace": "kube-system",
      "uid": "test-uid"
    },
    "data": {
      "mapRoles": map_roles
    }
  })
  .to_string()
}
