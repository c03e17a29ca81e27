//! ProjectMember translator

use crate::reconciler::shared::member::{MemberKind, MemberTranslator};
use crate::reconciler::shared::{Scope, scoped_kind};
use crds::{ProjectMember, ProjectMemberParameters, MemberParameters};

scoped_kind!(ProjectMember, "project member", Scope::Project, project_id);

impl MemberKind for ProjectMember {
    fn member(params: &ProjectMemberParameters) -> &MemberParameters {
        &params.member
    }

    fn member_mut(params: &mut ProjectMemberParameters) -> &mut MemberParameters {
        &mut params.member
    }
}

pub type ProjectMemberTranslator = MemberTranslator<ProjectMember>;
