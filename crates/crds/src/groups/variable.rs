//! GroupVariable Custom Resource Definition

use crate::id_or_path::IdOrPath;
use crate::managed::{ManagedStatus, ResourceSpec};
use crate::shared::{VariableObservation, VariableParameters};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// GroupVariableSpec defines a CI/CD variable inherited by every project of a group
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "GroupVariable",
    namespaced,
    status = "GroupVariableStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct GroupVariableSpec {
    pub for_provider: GroupVariableParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupVariableParameters {
    #[serde(rename = "groupID", default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<IdOrPath>,

    #[serde(flatten)]
    pub variable: VariableParameters,
}

pub type GroupVariableStatus = ManagedStatus<VariableObservation>;

crate::managed_resource!(GroupVariable, GroupVariableParameters, VariableObservation);
