//! CloudFormation custom resource lifecycle events.

use crate::{
  constants::RESOURCE_ID_SUFFIX,
  error::{ReconcileError, Result},
  RoleMapping,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum RequestType {
  Create,
  Update,
  Delete,
}

/// The request CloudFormation sends to the custom resource. Keys this
/// handler does not use (`RequestId`, `ResponseURL`, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
  pub request_type: RequestType,
  pub resource_properties: ResourceProperties,
  #[serde(default)]
  pub physical_resource_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceProperties {
  pub cluster_name: String,
  #[serde(default)]
  pub role_mappings: Vec<RoleMapping>,
}

impl LifecycleEvent {
  pub fn cluster_name(&self) -> &str {
    &self.resource_properties.cluster_name
  }

  pub fn validate(&self) -> Result<()> {
    if self.cluster_name().trim().is_empty() {
      return Err(ReconcileError::InvalidEvent(
        "ClusterName must not be empty".to_string(),
      ));
    }
    Ok(())
  }
}

/// Physical id of the custom resource, stable across Create/Update/Delete
pub fn resource_id(cluster_name: &str) -> String {
  format!("{}{}", cluster_name, RESOURCE_ID_SUFFIX)
}
