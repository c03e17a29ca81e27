//! GroupMember translator

use crate::reconciler::shared::member::{MemberKind, MemberTranslator};
use crate::reconciler::shared::{Scope, scoped_kind};
use crds::{GroupMember, GroupMemberParameters, MemberParameters};

scoped_kind!(GroupMember, "group member", Scope::Group, group_id);

impl MemberKind for GroupMember {
    fn member(params: &GroupMemberParameters) -> &MemberParameters {
        &params.member
    }

    fn member_mut(params: &mut GroupMemberParameters) -> &mut MemberParameters {
        &mut params.member
    }
}

pub type GroupMemberTranslator = MemberTranslator<GroupMember>;
