//! License Custom Resource Definition
//!
//! Installs an instance license. The license body is published to the
//! connection secret so later reconciles can tell whether it changed.

use crate::managed::{ManagedStatus, ResourceSpec};
use crate::references::ValueSource;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// LicenseSpec defines the license installed on a self-managed instance
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "License",
    namespaced,
    status = "LicenseStatus",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Plan","type":"string","jsonPath":".status.atProvider.plan"}"#,
    printcolumn = r#"{"name":"Expires","type":"string","jsonPath":".status.atProvider.expiresAt"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct LicenseSpec {
    pub for_provider: LicenseParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LicenseParameters {
    /// License file contents (inline, from a secret, or fetched from a URL)
    pub license: ValueSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LicenseObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,

    #[serde(default)]
    pub expired: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_limit: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_users: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub licensee_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub licensee_company: Option<String>,
}

pub type LicenseStatus = ManagedStatus<LicenseObservation>;

crate::managed_resource!(License, LicenseParameters, LicenseObservation);
