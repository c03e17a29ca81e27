//! ProjectVariable Custom Resource Definition

use crate::id_or_path::IdOrPath;
use crate::managed::{ManagedStatus, ResourceSpec};
use crate::shared::{VariableObservation, VariableParameters};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ProjectVariableSpec defines a project-level CI/CD variable.
///
/// The external name is the variable key.
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "ProjectVariable",
    namespaced,
    status = "ProjectVariableStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ProjectVariableSpec {
    pub for_provider: ProjectVariableParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

/// Project variable parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectVariableParameters {
    #[serde(rename = "projectID", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<IdOrPath>,

    #[serde(flatten)]
    pub variable: VariableParameters,
}

pub type ProjectVariableStatus = ManagedStatus<VariableObservation>;

crate::managed_resource!(ProjectVariable, ProjectVariableParameters, VariableObservation);
