//! ApplicationSettings Custom Resource Definition
//!
//! Instance-wide settings are a singleton: creating the object binds it to
//! the settings record, and deleting it leaves the settings untouched.

use crate::managed::{ManagedStatus, ResourceSpec};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ApplicationSettingsSpec defines instance-wide settings
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "ApplicationSettings",
    namespaced,
    status = "ApplicationSettingsStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSettingsSpec {
    pub for_provider: ApplicationSettingsParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

/// Managed subset of the application settings; unset fields are left alone
/// and late-initialized from the instance.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSettingsParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_projects_limit: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signup_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_two_factor_authentication: Option<bool>,

    /// Hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_factor_grace_period: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_project_visibility: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_group_visibility: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restricted_visibility_levels: Option<Vec<String>>,

    /// MB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attachment_size: Option<i64>,

    /// Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_expire_delay: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravatar_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_sign_out_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_page_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_authentication_enabled_for_web: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_devops_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_runners_enabled: Option<bool>,

    /// MB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_artifacts_size: Option<i64>,

    /// Days projects and groups wait before delayed deletion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_adjourned_period: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSettingsObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

pub type ApplicationSettingsStatus = ManagedStatus<ApplicationSettingsObservation>;

crate::managed_resource!(
    ApplicationSettings,
    ApplicationSettingsParameters,
    ApplicationSettingsObservation
);
