//! ProjectApprovalRule translator

use crate::error::ControllerError;
use crate::managed::external_name;
use crate::managed::translator::{
    ExternalContext, Translator, create_failed, deleted, found, parent_id, update_failed,
};
use crate::managed::{ExternalCreation, ExternalUpdate};
use crate::reconcile_helpers::{is_equal_or_unset, is_set_equal_or_unset, is_str_equal_or_unset, late_init, late_init_str};
use async_trait::async_trait;
use crds::{ManagedResource, ProjectApprovalRule, ProjectApprovalRuleObservation, ProjectApprovalRuleParameters};
use gitlab_client::{ApprovalRule, ApprovalRuleOptions, ResourceId};

const NAME: &str = "approval rule";

pub struct ProjectApprovalRuleTranslator {
    ctx: ExternalContext,
}

fn project(mr: &ProjectApprovalRule) -> Result<ResourceId, ControllerError> {
    parent_id(mr.for_provider().project_id.as_ref(), "projectID")
}

fn options(p: &ProjectApprovalRuleParameters) -> ApprovalRuleOptions {
    ApprovalRuleOptions {
        name: Some(p.name.clone()),
        approvals_required: Some(p.approvals_required),
        rule_type: p.rule_type.clone(),
        report_type: p.report_type.clone(),
        user_ids: p.user_ids.clone(),
        group_ids: p.group_ids.clone(),
        protected_branch_ids: p.protected_branch_ids.clone(),
        applies_to_all_protected_branches: p.applies_to_all_protected_branches,
    }
}

fn ids<T>(items: &[T], id: impl Fn(&T) -> i64) -> Vec<i64> {
    items.iter().map(id).collect()
}

#[async_trait]
impl Translator for ProjectApprovalRuleTranslator {
    type Kind = ProjectApprovalRule;
    type Id = i64;
    type Remote = ApprovalRule;

    const NAME: &'static str = NAME;

    fn new(ctx: ExternalContext) -> Self {
        Self { ctx }
    }

    fn parse_id(&self, external_name: &str) -> Result<i64, ControllerError> {
        external_name::numeric(external_name)
    }

    async fn fetch(&self, mr: &ProjectApprovalRule, id: &i64) -> Result<Option<ApprovalRule>, ControllerError> {
        let project = project(mr)?;
        found(NAME, self.ctx.gitlab.get_approval_rule(&project, *id).await)
    }

    fn late_initialize(&self, p: &mut ProjectApprovalRuleParameters, remote: &ApprovalRule) -> bool {
        let mut changed = late_init_str(&mut p.rule_type, &remote.rule_type);
        changed |= late_init(&mut p.report_type, remote.report_type.clone());
        changed |= late_init(
            &mut p.applies_to_all_protected_branches,
            Some(remote.applies_to_all_protected_branches),
        );
        changed
    }

    fn observation(&self, remote: &ApprovalRule) -> ProjectApprovalRuleObservation {
        ProjectApprovalRuleObservation {
            id: Some(remote.id),
            protected_branches: remote.protected_branches.iter().map(|b| b.name.clone()).collect(),
        }
    }

    async fn is_up_to_date(&self, mr: &ProjectApprovalRule, remote: &ApprovalRule) -> Result<bool, ControllerError> {
        let p = mr.for_provider();
        Ok(p.name == remote.name
            && p.approvals_required == remote.approvals_required
            && is_str_equal_or_unset(p.rule_type.as_ref(), Some(remote.rule_type.as_str()))
            && is_str_equal_or_unset(p.report_type.as_ref(), remote.report_type.as_deref())
            && is_set_equal_or_unset(p.user_ids.as_ref(), &ids(&remote.users, |u| u.id))
            && is_set_equal_or_unset(p.group_ids.as_ref(), &ids(&remote.groups, |g| g.id))
            && is_set_equal_or_unset(p.protected_branch_ids.as_ref(), &ids(&remote.protected_branches, |b| b.id))
            && is_equal_or_unset(
                p.applies_to_all_protected_branches.as_ref(),
                &remote.applies_to_all_protected_branches,
            ))
    }

    async fn create(&self, mr: &ProjectApprovalRule) -> Result<ExternalCreation, ControllerError> {
        let project = project(mr)?;
        let created = self
            .ctx
            .gitlab
            .create_approval_rule(&project, &options(mr.for_provider()))
            .await
            .map_err(create_failed(NAME))?;
        Ok(ExternalCreation {
            external_name: created.id.to_string(),
            ..Default::default()
        })
    }

    async fn update(
        &self,
        mr: &ProjectApprovalRule,
        id: &i64,
        _remote: &ApprovalRule,
    ) -> Result<ExternalUpdate, ControllerError> {
        let project = project(mr)?;
        self.ctx
            .gitlab
            .update_approval_rule(&project, *id, &options(mr.for_provider()))
            .await
            .map_err(update_failed(NAME))?;
        Ok(ExternalUpdate::default())
    }

    async fn delete(&self, mr: &ProjectApprovalRule, id: &i64) -> Result<(), ControllerError> {
        let project = project(mr)?;
        deleted(NAME, self.ctx.gitlab.delete_approval_rule(&project, *id).await)
    }
}
