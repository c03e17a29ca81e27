//! ProjectApprovalRule Custom Resource Definition

use crate::id_or_path::IdOrPath;
use crate::managed::{ManagedStatus, ResourceSpec};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ProjectApprovalRuleSpec defines a merge request approval rule (Premium)
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "ProjectApprovalRule",
    namespaced,
    status = "ProjectApprovalRuleStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ProjectApprovalRuleSpec {
    pub for_provider: ProjectApprovalRuleParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

/// Approval rule parameters. ID lists are compared as sets.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectApprovalRuleParameters {
    #[serde(rename = "projectID", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<IdOrPath>,

    pub name: String,

    pub approvals_required: i64,

    /// `regular`, `any_approver` or `report_approver`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,

    /// Report type for `report_approver` rules, e.g. `code_coverage`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,

    #[serde(rename = "userIDs", default, skip_serializing_if = "Option::is_none")]
    pub user_ids: Option<Vec<i64>>,

    #[serde(rename = "groupIDs", default, skip_serializing_if = "Option::is_none")]
    pub group_ids: Option<Vec<i64>>,

    #[serde(rename = "protectedBranchIDs", default, skip_serializing_if = "Option::is_none")]
    pub protected_branch_ids: Option<Vec<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to_all_protected_branches: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectApprovalRuleObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Names of the protected branches the rule covers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protected_branches: Vec<String>,
}

pub type ProjectApprovalRuleStatus = ManagedStatus<ProjectApprovalRuleObservation>;

crate::managed_resource!(
    ProjectApprovalRule,
    ProjectApprovalRuleParameters,
    ProjectApprovalRuleObservation
);
