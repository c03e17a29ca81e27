//! Instance-level models: licenses and application settings

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Licensee details embedded in a license
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Licensee {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Email")]
    pub email: Option<String>,
    #[serde(rename = "Company")]
    pub company: Option<String>,
}

/// Instance license (`/license`, `/license/:id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct License {
    pub id: i64,
    pub plan: String,
    /// `YYYY-MM-DD`
    pub starts_at: Option<String>,
    /// `YYYY-MM-DD`
    pub expires_at: Option<String>,
    pub expired: bool,
    pub historical_max: Option<i64>,
    pub maximum_user_count: Option<i64>,
    pub user_limit: Option<i64>,
    pub active_users: Option<i64>,
    pub overage: Option<i64>,
    pub licensee: Licensee,
    pub add_ons: BTreeMap<String, i64>,
}

/// Request body for `POST /license`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LicenseOptions {
    pub license: String,
}

/// Application settings (`/application/settings`)
///
/// Only the subset managed by the provider is typed; the API returns far more.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub id: i64,
    pub default_projects_limit: Option<i64>,
    pub signup_enabled: Option<bool>,
    pub require_two_factor_authentication: Option<bool>,
    pub two_factor_grace_period: Option<i64>,
    pub default_project_visibility: Option<String>,
    pub default_group_visibility: Option<String>,
    pub restricted_visibility_levels: Option<Vec<String>>,
    pub max_attachment_size: Option<i64>,
    pub session_expire_delay: Option<i64>,
    pub gravatar_enabled: Option<bool>,
    pub after_sign_out_path: Option<String>,
    pub home_page_url: Option<String>,
    pub password_authentication_enabled_for_web: Option<bool>,
    pub auto_devops_enabled: Option<bool>,
    pub shared_runners_enabled: Option<bool>,
    pub max_artifacts_size: Option<i64>,
    pub deletion_adjourned_period: Option<i64>,
}

/// Request body for `PUT /application/settings`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_projects_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signup_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_two_factor_authentication: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub two_factor_grace_period: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_project_visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_group_visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restricted_visibility_levels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attachment_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_expire_delay: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravatar_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_sign_out_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_page_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_authentication_enabled_for_web: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_devops_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_runners_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_artifacts_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_adjourned_period: Option<i64>,
}

impl SettingsOptions {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
