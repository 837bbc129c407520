use crate::{
  command::{CommandResult, CommandRunner, Invocation},
  config::Config,
  constants::{CONFIG_MAP_NAME, NAMESPACE},
  error::{ReconcileError, Result},
  event::{resource_id, LifecycleEvent, RequestType},
  manifest::render_manifest,
};
use k8s_openapi::api::core::v1::ConfigMap;
use log::{error, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

/// What a successful lifecycle event reports back to CloudFormation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Outcome {
  pub physical_resource_id: String,
  /// aws-auth `data` after a Create/Update, when it could be read back
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data: Option<BTreeMap<String, String>>,
}

/// Drives the aws-auth config map towards the mappings of a lifecycle event.
///
/// Each step runs its command exactly once and the first failure ends the
/// invocation. Nothing is rolled back.
pub struct Reconciler<R> {
  runner: R,
  config: Config,
}

impl<R: CommandRunner> Reconciler<R> {
  pub fn new(runner: R, config: Config) -> Self {
    Reconciler { runner, config }
  }

  pub async fn handle(&self, event: &LifecycleEvent) -> Result<Outcome> {
    event.validate()?;
    let cluster_name = event.cluster_name();
    info!("Handling {:?} for cluster {}", event.request_type, cluster_name);

    self.acquire_credentials(cluster_name).await?;

    let data = match event.request_type {
      RequestType::Create | RequestType::Update => {
        info!("Creating identity mapping... event: {:?}", event);
        let manifest = render_manifest(&event.resource_properties.role_mappings)?;
        info!("rendered template: {}", manifest);
        self.apply_manifest(&manifest).await?;

        match self.read_config_map_data().await {
          Ok(data) => Some(data),
          Err(e) => {
            warn!("Applied aws-auth but could not read it back: {}", e);
            None
          }
        }
      }
      RequestType::Delete => {
        info!("Deleting identity mapping... event: {:?}", event);
        self.delete_config_map().await?;
        None
      }
    };

    Ok(Outcome {
      physical_resource_id: resource_id(cluster_name),
      data,
    })
  }

  /// Write credentials for `cluster_name` to the configured kubeconfig path
  pub async fn acquire_credentials(&self, cluster_name: &str) -> Result<()> {
    info!("Create kube config file.");
    let mut invocation = Invocation::new(&self.config.aws_cli).args([
      "eks",
      "update-kubeconfig",
      "--name",
      cluster_name,
      "--kubeconfig",
      self.kubeconfig().as_str(),
    ]);
    if let Some(region) = &self.config.region {
      invocation = invocation.args(["--region", region.as_str()]);
    }

    self
      .execute(&invocation)
      .await?
      .into_stdout(&invocation.program)
      .map_err(|e| e.at_step(ReconcileError::CredentialSetup))?;

    info!("Successfully created kubeconfig file.");
    Ok(())
  }

  /// Create or replace aws-auth with `manifest`
  pub async fn apply_manifest(&self, manifest: &str) -> Result<()> {
    info!("Updating identity mappings...");
    let invocation = self.kubectl().args(["apply", "-f", "-"]).stdin(manifest);

    self
      .execute(&invocation)
      .await?
      .into_stdout(&invocation.program)
      .map_err(|e| e.at_step(ReconcileError::Apply))?;

    info!("Successfully updated identity mappings.");
    Ok(())
  }

  /// Delete aws-auth. A config map that is already gone counts as deleted.
  pub async fn delete_config_map(&self) -> Result<()> {
    info!("Deleting aws-auth config map...");
    let invocation = self.kubectl().args(["delete", "configmap", CONFIG_MAP_NAME]);
    let result = self.execute(&invocation).await?;

    if result.is_not_found() {
      warn!("aws-auth config map not found during delete operation. Ignoring error...");
      return Ok(());
    }

    result
      .into_stdout(&invocation.program)
      .map_err(|e| e.at_step(ReconcileError::Delete))?;

    info!("Successfully deleted identity mappings.");
    Ok(())
  }

  /// The current `data` of aws-auth
  pub async fn read_config_map_data(&self) -> Result<BTreeMap<String, String>> {
    let invocation = self
      .kubectl()
      .args(["get", "configmap", CONFIG_MAP_NAME, "-o", "json"]);

    let stdout = self
      .execute(&invocation)
      .await?
      .into_stdout(&invocation.program)
      .map_err(|e| e.at_step(ReconcileError::Read))?;

    let config_map: ConfigMap = serde_json::from_str(&stdout)?;
    config_map.data.ok_or(ReconcileError::MissingData)
  }

  fn kubeconfig(&self) -> String {
    self.config.kubeconfig_path.display().to_string()
  }

  // kubectl scoped to kube-system, reading credentials from the configured path only
  fn kubectl(&self) -> Invocation {
    Invocation::new(&self.config.kubectl)
      .env("KUBECONFIG", self.kubeconfig())
      .args(["-n", NAMESPACE])
  }

  async fn execute(&self, invocation: &Invocation) -> Result<CommandResult> {
    info!("Running: {}", invocation);
    let result = self
      .runner
      .run(invocation)
      .await
      .map_err(|source| ReconcileError::Spawn {
        program: invocation.program.clone(),
        source,
      })?;

    if !result.stdout.is_empty() {
      info!("output: {}", result.stdout.trim_end());
    }
    if !result.success() {
      error!(
        "`{}` exited with code {}: {}",
        invocation,
        result.exit_code,
        result.stderr.trim_end()
      );
    }
    Ok(result)
  }
}
