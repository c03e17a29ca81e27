//! Group-scoped models: groups, LDAP and SAML group links

use super::SharedWithGroup;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Access level entry inside branch protection defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessLevelEntry {
    pub access_level: i64,
}

/// Default branch protection applied to new projects of a group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchProtectionDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_to_push: Option<Vec<AccessLevelEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_force_push: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_to_merge: Option<Vec<AccessLevelEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_can_initial_push: Option<bool>,
}

/// Group (`/groups/:id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub full_name: String,
    pub full_path: String,
    pub description: Option<String>,
    pub visibility: String,
    pub parent_id: Option<i64>,
    pub web_url: String,
    pub lfs_enabled: Option<bool>,
    pub request_access_enabled: Option<bool>,
    pub project_creation_level: Option<String>,
    pub subgroup_creation_level: Option<String>,
    pub share_with_group_lock: Option<bool>,
    pub require_two_factor_authentication: Option<bool>,
    pub two_factor_grace_period: Option<i64>,
    pub auto_devops_enabled: Option<bool>,
    pub emails_disabled: Option<bool>,
    pub mentions_disabled: Option<bool>,
    pub default_branch: Option<String>,
    pub default_branch_protection_defaults: Option<BranchProtectionDefaults>,
    pub shared_with_groups: Vec<SharedWithGroup>,
    pub runners_token: Option<String>,
    /// Set once the group is pending delayed deletion
    pub marked_for_deletion_on: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body for creating (`POST /groups`) or editing (`PUT /groups/:id`) a group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lfs_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_access_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_creation_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subgroup_creation_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_with_group_lock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_two_factor_authentication: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub two_factor_grace_period: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_devops_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emails_disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentions_disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch_protection_defaults: Option<BranchProtectionDefaults>,
}

/// LDAP group link (`/groups/:id/ldap_group_links`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LdapGroupLink {
    pub cn: Option<String>,
    pub filter: Option<String>,
    pub group_access: i64,
    pub provider: String,
    pub member_role_id: Option<i64>,
}

/// Request body for `POST /groups/:id/ldap_group_links`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LdapLinkOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    pub group_access: i64,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_role_id: Option<i64>,
}

/// SAML group link (`/groups/:id/saml_group_links/:name`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamlGroupLink {
    pub name: String,
    pub access_level: i64,
    pub member_role_id: Option<i64>,
}

/// Request body for `POST /groups/:id/saml_group_links`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SamlLinkOptions {
    pub saml_group_name: String,
    pub access_level: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_role_id: Option<i64>,
}
