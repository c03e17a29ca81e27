//! GroupSamlLink Custom Resource Definition

use crate::id_or_path::IdOrPath;
use crate::managed::{ManagedStatus, ResourceSpec};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// GroupSamlLinkSpec maps a SAML group to a GitLab group access level.
///
/// Like LDAP links, SAML links cannot be edited; the SAML group name is the
/// external name and drift is fixed by re-creating the link.
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "GroupSamlLink",
    namespaced,
    status = "GroupSamlLinkStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct GroupSamlLinkSpec {
    pub for_provider: GroupSamlLinkParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupSamlLinkParameters {
    #[serde(rename = "groupID", default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<IdOrPath>,

    pub saml_group_name: String,

    pub access_level: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_role_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupSamlLinkObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_level: Option<i64>,
}

pub type GroupSamlLinkStatus = ManagedStatus<GroupSamlLinkObservation>;

crate::managed_resource!(GroupSamlLink, GroupSamlLinkParameters, GroupSamlLinkObservation);
