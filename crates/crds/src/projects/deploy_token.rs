//! ProjectDeployToken Custom Resource Definition

use crate::id_or_path::IdOrPath;
use crate::managed::{ManagedStatus, ResourceSpec};
use crate::shared::{DeployTokenObservation, DeployTokenParameters};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ProjectDeployTokenSpec defines a project deploy token.
///
/// The token value is only returned on creation and is published to
/// `writeConnectionSecretToRef`, which is therefore required.
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "ProjectDeployToken",
    namespaced,
    status = "ProjectDeployTokenStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDeployTokenSpec {
    pub for_provider: ProjectDeployTokenParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDeployTokenParameters {
    #[serde(rename = "projectID", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<IdOrPath>,

    #[serde(flatten)]
    pub token: DeployTokenParameters,
}

pub type ProjectDeployTokenStatus = ManagedStatus<DeployTokenObservation>;

crate::managed_resource!(ProjectDeployToken, ProjectDeployTokenParameters, DeployTokenObservation);
