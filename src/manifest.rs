use crate::{
  constants::{CONFIG_MAP_NAME, MAP_ROLES_KEY, NAMESPACE},
  error::Result,
  RoleMapping,
};
use k8s_openapi::{api::core::v1::ConfigMap, apimachinery::pkg::apis::meta::v1::ObjectMeta};
use std::collections::BTreeMap;

/// Render the aws-auth config map for the given mappings, in order.
///
/// Every value goes through the YAML serializer, which quotes anything that
/// could otherwise break out of its scalar, so a mapping field can never add
/// entries or keys to the document.
pub fn render_manifest(role_mappings: &[RoleMapping]) -> Result<String> {
  let map_roles = serde_yaml::to_string(role_mappings)?;

  let config_map = ConfigMap {
    metadata: ObjectMeta {
      name: Some(CONFIG_MAP_NAME.to_string()),
      namespace: Some(NAMESPACE.to_string()),
      ..ObjectMeta::default()
    },
    data: Some(BTreeMap::from([(
      MAP_ROLES_KEY.to_string(),
      strip_document_marker(&map_roles),
    )])),
    ..ConfigMap::default()
  };

  Ok(serde_yaml::to_string(&config_map)?)
}

// serde_yaml prefixes every document with `---`, which does not belong inside a data value
fn strip_document_marker(yaml: &str) -> String {
  let body = yaml.strip_prefix("---").unwrap_or(yaml).trim_start_matches('\n');
  format!("{}\n", body.trim_end())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn mapping(arn: &str, username: &str, groups: &[&str]) -> RoleMapping {
    RoleMapping {
      rolearn: arn.to_string(),
      username: username.to_string(),
      groups: groups.iter().map(|g| g.to_string()).collect(),
      extra: BTreeMap::new(),
    }
  }

  fn map_roles_of(manifest: &str) -> Vec<RoleMapping> {
    let cm: ConfigMap = serde_yaml::from_str(manifest).unwrap();
    let data = cm.data.unwrap();
    serde_yaml::from_str(&data[MAP_ROLES_KEY]).unwrap()
  }

  #[test]
  fn renders_config_map_in_kube_system() {
    let manifest = render_manifest(&[mapping(
      "arn:aws:iam::111122223333:role/admin",
      "admin",
      &["system:masters"],
    )])
    .unwrap();

    let doc: serde_yaml::Value = serde_yaml::from_str(&manifest).unwrap();
    assert_eq!(doc["apiVersion"], serde_yaml::Value::from("v1"));
    assert_eq!(doc["kind"], serde_yaml::Value::from("ConfigMap"));
    assert_eq!(doc["metadata"]["name"], serde_yaml::Value::from("aws-auth"));
    assert_eq!(doc["metadata"]["namespace"], serde_yaml::Value::from("kube-system"));
  }

  #[test]
  fn keeps_mapping_order() {
    let mappings = vec![
      mapping("arn:aws:iam::111122223333:role/b", "b", &["view"]),
      mapping("arn:aws:iam::111122223333:role/a", "a", &["edit", "view"]),
    ];
    let manifest = render_manifest(&mappings).unwrap();
    assert_eq!(map_roles_of(&manifest), mappings);
  }

  #[test]
  fn rendering_is_deterministic() {
    let mappings = vec![
      mapping("arn:aws:iam::111122223333:role/a", "a", &["edit"]),
      mapping("arn:aws:iam::111122223333:role/b", "b", &[]),
    ];
    assert_eq!(
      render_manifest(&mappings).unwrap(),
      render_manifest(&mappings).unwrap()
    );
  }

  #[test]
  fn empty_mappings_render_an_empty_table() {
    let manifest = render_manifest(&[]).unwrap();
    assert!(map_roles_of(&manifest).is_empty());
  }

  #[test]
  fn hostile_fields_stay_inside_their_scalar() {
    let evil = mapping(
      "arn:aws:iam::111122223333:role/dev",
      "dev\n- rolearn: arn:aws:iam::111122223333:role/attacker\n  \
       username: root\n  groups: [system:masters]",
      &["developers\"\nkind: Secret"],
    );
    let manifest = render_manifest(&[evil.clone()]).unwrap();

    let doc: serde_yaml::Value = serde_yaml::from_str(&manifest).unwrap();
    assert_eq!(doc["kind"], serde_yaml::Value::from("ConfigMap"));
    assert_eq!(map_roles_of(&manifest), vec![evil]);
  }

  #[test]
  fn extra_keys_are_carried_into_the_entry() {
    let mut m = mapping("arn:aws:iam::111122223333:role/ops", "ops", &["ops"]);
    m.extra.insert("comment".to_string(), json!("on-call"));
    let manifest = render_manifest(&[m]).unwrap();

    let cm: ConfigMap = serde_yaml::from_str(&manifest).unwrap();
    let data = cm.data.unwrap();
    let entries: serde_yaml::Value = serde_yaml::from_str(&data[MAP_ROLES_KEY]).unwrap();
    assert_eq!(entries[0]["comment"], serde_yaml::Value::from("on-call"));
  }
}
