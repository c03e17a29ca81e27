//! ProjectHook Custom Resource Definition
//!
//! Webhooks fired on project events.

use crate::id_or_path::IdOrPath;
use crate::managed::{ManagedStatus, ResourceSpec};
use crate::references::SecretKeySelector;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ProjectHookSpec defines a project webhook
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "ProjectHook",
    namespaced,
    status = "ProjectHookStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ProjectHookSpec {
    pub for_provider: ProjectHookParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

/// Webhook parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectHookParameters {
    #[serde(rename = "projectID", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<IdOrPath>,

    /// Target URL
    pub url: String,

    /// Secret token sent in `X-Gitlab-Token`. GitLab never returns it, so it is
    /// only sent on create and update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_secret_ref: Option<SecretKeySelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_events: Option<bool>,

    /// Wildcard branch filter for push events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_events_branch_filter: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues_events: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidential_issues_events: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_requests_events: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_push_events: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_events: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_events: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_events: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki_page_events: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_events: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub releases_events: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_ssl_verification: Option<bool>,
}

/// Observed webhook
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectHookObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Whether a token was configured by this provider
    #[serde(default)]
    pub has_token: bool,
}

pub type ProjectHookStatus = ManagedStatus<ProjectHookObservation>;

crate::managed_resource!(ProjectHook, ProjectHookParameters, ProjectHookObservation);
