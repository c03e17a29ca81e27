//! GroupDeployToken Custom Resource Definition

use crate::id_or_path::IdOrPath;
use crate::managed::{ManagedStatus, ResourceSpec};
use crate::shared::{DeployTokenObservation, DeployTokenParameters};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// GroupDeployTokenSpec defines a deploy token valid for every project of a group
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "GroupDeployToken",
    namespaced,
    status = "GroupDeployTokenStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct GroupDeployTokenSpec {
    pub for_provider: GroupDeployTokenParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupDeployTokenParameters {
    #[serde(rename = "groupID", default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<IdOrPath>,

    #[serde(flatten)]
    pub token: DeployTokenParameters,
}

pub type GroupDeployTokenStatus = ManagedStatus<DeployTokenObservation>;

crate::managed_resource!(GroupDeployToken, GroupDeployTokenParameters, DeployTokenObservation);
