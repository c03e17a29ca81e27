//! Runner Custom Resource Definition
//!
//! Runners are created through `POST /user/runners`; the authentication
//! token is returned once and published to the connection secret.

use crate::id_or_path::IdOrPath;
use crate::managed::{ManagedStatus, ResourceSpec};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// RunnerSpec defines an instance, group or project runner
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "Runner",
    namespaced,
    status = "RunnerStatus",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.atProvider.status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct RunnerSpec {
    pub for_provider: RunnerParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RunnerParameters {
    /// `instance_type`, `group_type` or `project_type`
    pub runner_type: String,

    /// Required for `group_type`
    #[serde(rename = "groupID", default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<IdOrPath>,

    /// Required for `project_type`
    #[serde(rename = "projectID", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<IdOrPath>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_untagged: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_list: Option<Vec<String>>,

    /// `not_protected` or `ref_protected`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_level: Option<String>,

    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_timeout: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RunnerObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// `online`, `offline`, `stale` or `never_contacted`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default)]
    pub is_shared: bool,
}

pub type RunnerStatus = ManagedStatus<RunnerObservation>;

crate::managed_resource!(Runner, RunnerParameters, RunnerObservation);
