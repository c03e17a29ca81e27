//! GroupMember Custom Resource Definition

use crate::id_or_path::IdOrPath;
use crate::managed::{ManagedStatus, ResourceSpec};
use crate::shared::{MemberObservation, MemberParameters};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// GroupMemberSpec grants a user access to a group and its projects
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "GroupMember",
    namespaced,
    status = "GroupMemberStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct GroupMemberSpec {
    pub for_provider: GroupMemberParameters,

    #[serde(flatten)]
    pub resource_spec: ResourceSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupMemberParameters {
    /// Group ID or full path
    #[serde(rename = "groupID", default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<IdOrPath>,

    #[serde(flatten)]
    pub member: MemberParameters,
}

pub type GroupMemberStatus = ManagedStatus<MemberObservation>;

crate::managed_resource!(GroupMember, GroupMemberParameters, MemberObservation);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_fields_are_flattened() {
        let params: GroupMemberParameters = serde_json::from_value(serde_json::json!({
            "groupID": 1,
            "userID": 7,
            "accessLevel": 30
        }))
        .unwrap();
        assert_eq!(params.group_id, Some(IdOrPath::Id(1)));
        assert_eq!(params.member.user_id, Some(7));
        assert_eq!(params.member.access_level, 30);
    }
}
