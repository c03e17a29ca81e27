//! Group Custom Resource Definition

use crate::id_or_path::IdOrPath;
use crate::managed::{ManagedStatus, ResourceSpec};
use crate::shared::{SharedWithGroupObservation, SharedWithGroupParameters};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// GroupSpec defines the desired state of a GitLab group or subgroup
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "Group",
    namespaced,
    status = "GroupStatus",
    shortname = "glgroup",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Synced","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#,
    printcolumn = r#"{"name":"Path","type":"string","jsonPath":".status.atProvider.fullPath"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct GroupSpec {
    pub for_provider: GroupParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

/// Desired group settings. Unset fields are late-initialized from GitLab.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// URL path; defaults to the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Parent group for subgroups
    #[serde(rename = "parentID", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<IdOrPath>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// `private`, `internal` or `public`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lfs_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_access_enabled: Option<bool>,

    /// `noone`, `maintainer` or `developer`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_creation_level: Option<String>,

    /// `owner` or `maintainer`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subgroup_creation_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_with_group_lock: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_two_factor_authentication: Option<bool>,

    /// Hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_factor_grace_period: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_devops_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails_disabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentions_disabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,

    /// Branch protection applied to the default branch of new projects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch_protection_defaults: Option<BranchProtectionDefaultsParameters>,

    /// Groups this group is shared with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_with_groups: Option<Vec<SharedWithGroupParameters>>,

    /// Skip the deletion grace period and remove the group immediately
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanently_remove: Option<bool>,
}

/// Default branch protection
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BranchProtectionDefaultsParameters {
    /// Access levels allowed to push
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_to_push: Option<Vec<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_force_push: Option<bool>,

    /// Access levels allowed to merge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_to_merge: Option<Vec<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_can_initial_push: Option<bool>,
}

/// Observed group state
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marked_for_deletion_on: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_with_groups: Vec<SharedWithGroupObservation>,
}

pub type GroupStatus = ManagedStatus<GroupObservation>;

crate::managed_resource!(Group, GroupParameters, GroupObservation);
