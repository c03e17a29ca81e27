//! GroupAccessToken Custom Resource Definition

use crate::id_or_path::IdOrPath;
use crate::managed::{ManagedStatus, ResourceSpec};
use crate::shared::{AccessTokenObservation, AccessTokenParameters};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// GroupAccessTokenSpec defines a group access token backed by a bot user
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "GroupAccessToken",
    namespaced,
    status = "GroupAccessTokenStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct GroupAccessTokenSpec {
    pub for_provider: GroupAccessTokenParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupAccessTokenParameters {
    #[serde(rename = "groupID", default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<IdOrPath>,

    #[serde(flatten)]
    pub token: AccessTokenParameters,
}

pub type GroupAccessTokenStatus = ManagedStatus<AccessTokenObservation>;

crate::managed_resource!(GroupAccessToken, GroupAccessTokenParameters, AccessTokenObservation);
