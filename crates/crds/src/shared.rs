//! Parameter and observation types shared by project- and group-scoped kinds
//!
//! Members, CI/CD variables, deploy tokens, access tokens and group shares
//! look the same whether they hang off a project or a group; the kinds only
//! differ in the parent ID field.

use crate::references::SecretKeySelector;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Membership fields
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MemberParameters {
    /// User ID; one of `userID` or `userName` is required
    #[serde(rename = "userID", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,

    /// Username, resolved to a user ID before creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    /// Access level (10 guest, 15 planner, 20 reporter, 30 developer, 40 maintainer, 50 owner)
    pub access_level: i64,

    /// Membership expiry, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,

    /// Custom member role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_role_id: Option<i64>,
}

/// Observed membership
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MemberObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
}

/// CI/CD variable fields
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VariableParameters {
    /// Variable key
    pub key: String,

    /// Inline value; mutually exclusive with `valueSecretRef`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Value read from a secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_secret_ref: Option<SecretKeySelector>,

    /// `env_var` or `file`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masked: Option<bool>,

    /// Treat the value as raw (no variable expansion)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<bool>,

    /// Environment scope, `*` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_scope: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Observed variable (the value itself is never mirrored)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VariableObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masked: Option<bool>,
}

/// Deploy token fields; deploy tokens cannot be edited, drift recreates them
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeployTokenParameters {
    pub name: String,

    /// Username (defaults to `gitlab+deploy-token-{n}`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Expiry, `YYYY-MM-DD` or RFC 3339
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,

    /// Scopes, e.g. `read_repository`, `read_registry`
    pub scopes: Vec<String>,
}

/// Observed deploy token
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeployTokenObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub expired: bool,
    #[serde(default)]
    pub revoked: bool,
}

/// Access token fields; access tokens cannot be edited, drift recreates them
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenParameters {
    pub name: String,

    /// Scopes, e.g. `api`, `read_repository`
    pub scopes: Vec<String>,

    /// Access level of the token's bot user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_level: Option<i64>,

    /// Expiry, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// Observed access token
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub revoked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// A group to share a project or group with
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SharedWithGroupParameters {
    #[serde(rename = "groupID")]
    pub group_id: i64,
    pub group_access_level: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// Observed share
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SharedWithGroupObservation {
    #[serde(rename = "groupID")]
    pub group_id: i64,
    pub group_full_path: String,
    pub group_access_level: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}
