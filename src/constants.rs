/// Namespace holding the aws-auth config map
pub const NAMESPACE: &str = "kube-system";

/// Name of the config map EKS reads IAM mappings from
pub const CONFIG_MAP_NAME: &str = "aws-auth";

/// Key under `data` carrying the role mapping table
pub const MAP_ROLES_KEY: &str = "mapRoles";

/// Appended to the cluster name to form the physical resource id
pub const RESOURCE_ID_SUFFIX: &str = "_aws-auth";

/// Scratch location for the generated kubeconfig
pub const DEFAULT_KUBECONFIG_PATH: &str = "/tmp/kubeconfig";

/// What kubectl prints when the aws-auth config map is gone
pub const NOT_FOUND_MESSAGE: &str = "\"aws-auth\" not found";
