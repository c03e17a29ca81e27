//! ProjectDeployKey Custom Resource Definition

use crate::id_or_path::IdOrPath;
use crate::managed::{ManagedStatus, ResourceSpec};
use crate::references::ValueSource;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ProjectDeployKeySpec registers an SSH public key with a project.
///
/// The key itself cannot be changed once registered; only `title` and
/// `canPush` are updated in place.
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "ProjectDeployKey",
    namespaced,
    status = "ProjectDeployKeyStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDeployKeySpec {
    pub for_provider: ProjectDeployKeyParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDeployKeyParameters {
    #[serde(rename = "projectID", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<IdOrPath>,

    pub title: String,

    /// Public key in OpenSSH format
    pub key: ValueSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_push: Option<bool>,

    /// Expiry, RFC 3339
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDeployKeyObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

pub type ProjectDeployKeyStatus = ManagedStatus<ProjectDeployKeyObservation>;

crate::managed_resource!(ProjectDeployKey, ProjectDeployKeyParameters, ProjectDeployKeyObservation);
