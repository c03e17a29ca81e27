//! GroupLdapLink Custom Resource Definition
//!
//! LDAP group links have no update endpoint; drift is corrected by deleting
//! and re-creating the link. The common name is the external name.

use crate::id_or_path::IdOrPath;
use crate::managed::{ManagedStatus, ResourceSpec};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_provider() -> String {
    "ldapmain".to_string()
}

/// GroupLdapLinkSpec syncs members of an LDAP group into a GitLab group
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "GroupLdapLink",
    namespaced,
    status = "GroupLdapLinkStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct GroupLdapLinkSpec {
    pub for_provider: GroupLdapLinkParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupLdapLinkParameters {
    #[serde(rename = "groupID", default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<IdOrPath>,

    /// LDAP group common name
    pub cn: String,

    /// Access level granted to synced members
    pub group_access: i64,

    /// LDAP provider ID
    #[serde(default = "default_provider")]
    pub provider: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupLdapLinkObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_access: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

pub type GroupLdapLinkStatus = ManagedStatus<GroupLdapLinkObservation>;

crate::managed_resource!(GroupLdapLink, GroupLdapLinkParameters, GroupLdapLinkObservation);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_defaults_to_ldapmain() {
        let params: GroupLdapLinkParameters = serde_json::from_value(serde_json::json!({
            "groupID": 1,
            "cn": "ldap-a",
            "groupAccess": 40
        }))
        .unwrap();
        assert_eq!(params.provider, "ldapmain");
    }
}
