//! GitLab API models
//!
//! Response models mirror the GitLab REST API entities (`/api/v4`). Request
//! option structs skip unset fields so that PUT requests only touch what the
//! caller declared.

pub mod groups;
pub mod instance;
pub mod projects;

pub use groups::*;
pub use instance::*;
pub use projects::*;

use serde::{Deserialize, Serialize};

/// Minimal user representation (`/users`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub state: String,
}

/// Project or group member (`/projects/:id/members`, `/groups/:id/members`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Member {
    /// User ID of the member
    pub id: i64,
    pub username: String,
    pub name: String,
    pub state: String,
    pub access_level: i64,
    /// `YYYY-MM-DD`
    pub expires_at: Option<String>,
    pub member_role_id: Option<i64>,
    pub web_url: String,
}

/// Request body for adding or editing a member
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_role_id: Option<i64>,
}

/// A group a project or group is shared with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedWithGroup {
    pub group_id: i64,
    pub group_name: String,
    pub group_full_path: String,
    pub group_access_level: i64,
    pub expires_at: Option<String>,
}

/// Request body for `POST /projects/:id/share` and `POST /groups/:id/share`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShareOptions {
    pub group_id: i64,
    pub group_access: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// CI/CD variable (`/projects/:id/variables`, `/groups/:id/variables`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Variable {
    pub key: String,
    pub value: String,
    pub variable_type: String,
    pub protected: bool,
    pub masked: bool,
    pub raw: bool,
    pub environment_scope: String,
    pub description: Option<String>,
}

/// Request body for creating or updating a variable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Deploy token (`/projects/:id/deploy_tokens`, `/groups/:id/deploy_tokens`)
///
/// `token` is only present in the create response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployToken {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub expires_at: Option<String>,
    pub scopes: Vec<String>,
    pub revoked: bool,
    pub expired: bool,
    pub token: Option<String>,
}

/// Request body for creating a deploy token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeployTokenOptions {
    pub name: String,
    pub scopes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// Project or group access token
///
/// `token` is only present in the create response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessToken {
    pub id: i64,
    pub name: String,
    pub scopes: Vec<String>,
    pub access_level: i64,
    /// `YYYY-MM-DD`
    pub expires_at: Option<String>,
    pub active: bool,
    pub revoked: bool,
    pub user_id: Option<i64>,
    pub token: Option<String>,
}

/// Request body for creating an access token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenOptions {
    pub name: String,
    pub scopes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// Query options for deleting a project or group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteOptions {
    /// Bypass delayed deletion (requires the entity to be marked for deletion)
    pub permanently_remove: Option<bool>,
    /// Full path, required together with `permanently_remove`
    pub full_path: Option<String>,
}

impl DeleteOptions {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(permanently_remove) = self.permanently_remove {
            query.push(("permanently_remove", permanently_remove.to_string()));
        }
        if let Some(full_path) = &self.full_path {
            query.push(("full_path", full_path.clone()));
        }
        query
    }
}

/// Outcome of a project or group delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionState {
    /// The entity is gone
    Removed,
    /// The entity was marked for delayed deletion and still exists
    Pending,
}
