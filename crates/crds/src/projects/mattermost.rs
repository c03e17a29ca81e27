//! MattermostIntegration Custom Resource Definition

use crate::id_or_path::IdOrPath;
use crate::managed::{ManagedStatus, ResourceSpec};
use crate::references::ValueSource;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// MattermostIntegrationSpec configures Mattermost notifications for a project.
///
/// A project has at most one Mattermost integration; creating it enables the
/// integration and deleting it disables it.
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "MattermostIntegration",
    namespaced,
    status = "MattermostIntegrationStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct MattermostIntegrationSpec {
    pub for_provider: MattermostIntegrationParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MattermostIntegrationParameters {
    #[serde(rename = "projectID", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<IdOrPath>,

    /// Incoming webhook URL; write-only on the GitLab side
    pub webhook: ValueSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_only_broken_pipelines: Option<bool>,

    /// `default`, `protected`, `default_and_protected` or `all`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches_to_be_notified: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_events: Option<bool>,

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
    pub pipeline_events: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki_page_events: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MattermostIntegrationObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default)]
    pub active: bool,

    /// Whether a webhook was sent by this provider
    #[serde(default)]
    pub webhook_configured: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

pub type MattermostIntegrationStatus = ManagedStatus<MattermostIntegrationObservation>;

crate::managed_resource!(
    MattermostIntegration,
    MattermostIntegrationParameters,
    MattermostIntegrationObservation
);
