//! PipelineSchedule Custom Resource Definition
//!
//! Scheduled pipelines and their variables. Variables are managed as a
//! sub-collection: the controller adds, edits and removes individual
//! variables to match the desired list.

use crate::id_or_path::IdOrPath;
use crate::managed::{ManagedStatus, ResourceSpec};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// PipelineScheduleSpec defines a scheduled pipeline
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "PipelineSchedule",
    namespaced,
    status = "PipelineScheduleStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct PipelineScheduleSpec {
    pub for_provider: PipelineScheduleParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PipelineScheduleParameters {
    #[serde(rename = "projectID", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<IdOrPath>,

    pub description: String,

    /// Branch or tag to run the pipeline on
    #[serde(rename = "ref")]
    pub git_ref: String,

    /// Cron expression, e.g. `0 1 * * *`
    pub cron: String,

    /// Defaults to `UTC`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_timezone: Option<String>,

    /// Defaults to `true`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<PipelineVariableParameters>,
}

/// A variable passed to scheduled pipelines
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PipelineVariableParameters {
    pub key: String,
    pub value: String,
    /// `env_var` (default) or `file`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PipelineScheduleObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

pub type PipelineScheduleStatus = ManagedStatus<PipelineScheduleObservation>;

crate::managed_resource!(PipelineSchedule, PipelineScheduleParameters, PipelineScheduleObservation);
