//! Project Custom Resource Definition
//!
//! A GitLab project together with its push rules and group shares.

use crate::id_or_path::IdOrPath;
use crate::managed::{ManagedStatus, ResourceSpec};
use crate::shared::{SharedWithGroupObservation, SharedWithGroupParameters};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ProjectSpec defines the desired state of a GitLab project
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "Project",
    namespaced,
    status = "ProjectStatus",
    shortname = "glproject",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Synced","type":"string","jsonPath":".status.conditions[?(@.type=='Synced')].status"}"#,
    printcolumn = r#"{"name":"Path","type":"string","jsonPath":".status.atProvider.fullPath"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpec {
    pub for_provider: ProjectParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

/// Desired project settings. Unset fields are late-initialized from GitLab.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectParameters {
    /// Project name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// URL path; defaults to the object name when neither name nor path is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Namespace (group or user namespace) the project lives in
    #[serde(rename = "namespaceID", default, skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<IdOrPath>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,

    /// `private`, `internal` or `public`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,

    /// `disabled`, `private` or `enabled`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues_access_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_registry_access_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_requests_access_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builds_access_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki_access_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippets_access_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lfs_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_access_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_allow_merge_if_pipeline_succeeds: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_allow_merge_if_all_discussions_are_resolved: Option<bool>,

    /// `merge`, `rebase_merge` or `ff`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_method: Option<String>,

    /// `never`, `always`, `default_on` or `default_off`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub squash_option: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_source_branch_after_merge: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_devops_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci_config_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_runners_enabled: Option<bool>,

    /// Job timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_timeout: Option<i64>,

    /// Push rules (Premium); omitted means unmanaged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_rules: Option<PushRulesParameters>,

    /// Groups the project is shared with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_with_groups: Option<Vec<SharedWithGroupParameters>>,

    /// Skip the deletion grace period and remove the project immediately
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanently_remove: Option<bool>,
}

/// Push rules applied to the project repository
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PushRulesParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message_regex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message_negative_regex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name_regex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email_regex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name_regex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny_delete_tag: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_check: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevent_secrets: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_committer_check: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_unsigned_commits: Option<bool>,

    /// Maximum file size in MB, 0 for unlimited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<i64>,
}

/// Observed project state
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// `namespace/path`, used to confirm permanent removal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_url_to_repo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_url_to_repo: Option<String>,

    /// Set while the project waits out its deletion grace period
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marked_for_deletion_on: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_with_groups: Vec<SharedWithGroupObservation>,
}

pub type ProjectStatus = ManagedStatus<ProjectObservation>;

crate::managed_resource!(Project, ProjectParameters, ProjectObservation);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_flattens_resource_fields() {
        let spec: ProjectSpec = serde_json::from_value(serde_json::json!({
            "forProvider": {
                "name": "app",
                "namespaceID": "platform",
                "permanentlyRemove": true
            },
            "deletionPolicy": "Orphan",
            "providerConfigRef": { "name": "gitlab" }
        }))
        .unwrap();
        assert_eq!(spec.for_provider.namespace_id, Some(IdOrPath::from("platform")));
        assert_eq!(spec.resource_spec.provider_config_ref.name, "gitlab");
        assert!(!spec.resource_spec.should_delete_remote());
    }
}
