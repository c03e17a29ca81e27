//! ProjectMember Custom Resource Definition

use crate::id_or_path::IdOrPath;
use crate::managed::{ManagedStatus, ResourceSpec};
use crate::shared::{MemberObservation, MemberParameters};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ProjectMemberSpec grants a user access to a project
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "ProjectMember",
    namespaced,
    status = "ProjectMemberStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMemberSpec {
    pub for_provider: ProjectMemberParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

/// Project member parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMemberParameters {
    /// Project ID or full path
    #[serde(rename = "projectID", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<IdOrPath>,

    #[serde(flatten)]
    pub member: MemberParameters,
}

pub type ProjectMemberStatus = ManagedStatus<MemberObservation>;

crate::managed_resource!(ProjectMember, ProjectMemberParameters, MemberObservation);
