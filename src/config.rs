use crate::constants::DEFAULT_KUBECONFIG_PATH;
use std::env;
use std::path::PathBuf;

/// Handler configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  /// Where `aws eks update-kubeconfig` writes credentials and kubectl reads them
  pub kubeconfig_path: PathBuf,
  /// AWS CLI binary
  pub aws_cli: String,
  /// kubectl binary
  pub kubectl: String,
  /// Passed to `aws eks` as `--region` when set
  pub region: Option<String>,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      kubeconfig_path: PathBuf::from(DEFAULT_KUBECONFIG_PATH),
      aws_cli: "aws".to_string(),
      kubectl: "kubectl".to_string(),
      region: None,
    }
  }
}

impl Config {
  /// Load configuration from environment variables
  pub fn from_env() -> Self {
    Self::from_lookup(|key| env::var(key).ok())
  }

  /// Load configuration from any key lookup. Unset or empty keys keep their default.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let defaults = Config::default();

    Config {
      kubeconfig_path: get("KUBECONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or(defaults.kubeconfig_path),
      aws_cli: get("AWS_CLI").unwrap_or(defaults.aws_cli),
      kubectl: get("KUBECTL").unwrap_or(defaults.kubectl),
      region: get("AWS_REGION"),
    }
  }
}
