//! ProjectAccessToken Custom Resource Definition

use crate::id_or_path::IdOrPath;
use crate::managed::{ManagedStatus, ResourceSpec};
use crate::shared::{AccessTokenObservation, AccessTokenParameters};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ProjectAccessTokenSpec defines a project access token backed by a bot user.
///
/// Requires `writeConnectionSecretToRef`; the token is published there once.
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "ProjectAccessToken",
    namespaced,
    status = "ProjectAccessTokenStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAccessTokenSpec {
    pub for_provider: ProjectAccessTokenParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAccessTokenParameters {
    #[serde(rename = "projectID", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<IdOrPath>,

    #[serde(flatten)]
    pub token: AccessTokenParameters,
}

pub type ProjectAccessTokenStatus = ManagedStatus<AccessTokenObservation>;

crate::managed_resource!(ProjectAccessToken, ProjectAccessTokenParameters, AccessTokenObservation);
