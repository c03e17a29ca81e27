//! ProjectHook translator
//!
//! The hook token is write-only: GitLab never returns it, so it is sent on
//! every create and update but never compared.

use crate::error::ControllerError;
use crate::managed::external_name;
use crate::managed::translator::{
    ExternalContext, Translator, create_failed, deleted, found, parent_id, update_failed,
};
use crate::managed::{ExternalCreation, ExternalUpdate};
use crate::reconcile_helpers::{is_equal_or_unset, is_str_equal_or_unset, late_init};
use async_trait::async_trait;
use crds::{ManagedResource, ProjectHook, ProjectHookObservation, ProjectHookParameters};
use gitlab_client::{self as gitlab, HookOptions, ResourceId};

const NAME: &str = "project hook";

/// A hook and whether this object configures its token
#[derive(Debug, Clone)]
pub struct ObservedHook {
    pub hook: gitlab::ProjectHook,
    pub has_token: bool,
}

pub struct ProjectHookTranslator {
    ctx: ExternalContext,
}

fn project(mr: &ProjectHook) -> Result<ResourceId, ControllerError> {
    parent_id(mr.for_provider().project_id.as_ref(), "projectID")
}

impl ProjectHookTranslator {
    async fn options(&self, p: &ProjectHookParameters) -> Result<HookOptions, ControllerError> {
        let token = match &p.token_secret_ref {
            Some(selector) => Some(self.ctx.secrets.key(selector, &self.ctx.namespace).await?),
            None => None,
        };
        Ok(HookOptions {
            url: Some(p.url.clone()),
            token,
            push_events: p.push_events,
            push_events_branch_filter: p.push_events_branch_filter.clone(),
            issues_events: p.issues_events,
            confidential_issues_events: p.confidential_issues_events,
            merge_requests_events: p.merge_requests_events,
            tag_push_events: p.tag_push_events,
            note_events: p.note_events,
            job_events: p.job_events,
            pipeline_events: p.pipeline_events,
            wiki_page_events: p.wiki_page_events,
            deployment_events: p.deployment_events,
            releases_events: p.releases_events,
            enable_ssl_verification: p.enable_ssl_verification,
        })
    }
}

#[async_trait]
impl Translator for ProjectHookTranslator {
    type Kind = ProjectHook;
    type Id = i64;
    type Remote = ObservedHook;

    const NAME: &'static str = NAME;

    fn new(ctx: ExternalContext) -> Self {
        Self { ctx }
    }

    fn parse_id(&self, external_name: &str) -> Result<i64, ControllerError> {
        external_name::numeric(external_name)
    }

    async fn fetch(&self, mr: &ProjectHook, id: &i64) -> Result<Option<ObservedHook>, ControllerError> {
        let project = project(mr)?;
        let hook = found(NAME, self.ctx.gitlab.get_project_hook(&project, *id).await)?;
        Ok(hook.map(|hook| ObservedHook {
            hook,
            has_token: mr.for_provider().token_secret_ref.is_some(),
        }))
    }

    fn late_initialize(&self, p: &mut ProjectHookParameters, remote: &ObservedHook) -> bool {
        let h = &remote.hook;
        let mut changed = late_init(&mut p.push_events, Some(h.push_events));
        changed |= late_init(
            &mut p.push_events_branch_filter,
            h.push_events_branch_filter.clone().filter(|f| !f.is_empty()),
        );
        changed |= late_init(&mut p.issues_events, Some(h.issues_events));
        changed |= late_init(&mut p.confidential_issues_events, Some(h.confidential_issues_events));
        changed |= late_init(&mut p.merge_requests_events, Some(h.merge_requests_events));
        changed |= late_init(&mut p.tag_push_events, Some(h.tag_push_events));
        changed |= late_init(&mut p.note_events, Some(h.note_events));
        changed |= late_init(&mut p.job_events, Some(h.job_events));
        changed |= late_init(&mut p.pipeline_events, Some(h.pipeline_events));
        changed |= late_init(&mut p.wiki_page_events, Some(h.wiki_page_events));
        changed |= late_init(&mut p.deployment_events, Some(h.deployment_events));
        changed |= late_init(&mut p.releases_events, Some(h.releases_events));
        changed |= late_init(&mut p.enable_ssl_verification, Some(h.enable_ssl_verification));
        changed
    }

    fn observation(&self, remote: &ObservedHook) -> ProjectHookObservation {
        ProjectHookObservation {
            id: Some(remote.hook.id),
            created_at: remote.hook.created_at.map(|t| t.to_rfc3339()),
            has_token: remote.has_token,
        }
    }

    async fn is_up_to_date(&self, mr: &ProjectHook, remote: &ObservedHook) -> Result<bool, ControllerError> {
        let p = mr.for_provider();
        let h = &remote.hook;
        Ok(p.url == h.url
            && is_equal_or_unset(p.push_events.as_ref(), &h.push_events)
            && is_str_equal_or_unset(p.push_events_branch_filter.as_ref(), h.push_events_branch_filter.as_deref())
            && is_equal_or_unset(p.issues_events.as_ref(), &h.issues_events)
            && is_equal_or_unset(p.confidential_issues_events.as_ref(), &h.confidential_issues_events)
            && is_equal_or_unset(p.merge_requests_events.as_ref(), &h.merge_requests_events)
            && is_equal_or_unset(p.tag_push_events.as_ref(), &h.tag_push_events)
            && is_equal_or_unset(p.note_events.as_ref(), &h.note_events)
            && is_equal_or_unset(p.job_events.as_ref(), &h.job_events)
            && is_equal_or_unset(p.pipeline_events.as_ref(), &h.pipeline_events)
            && is_equal_or_unset(p.wiki_page_events.as_ref(), &h.wiki_page_events)
            && is_equal_or_unset(p.deployment_events.as_ref(), &h.deployment_events)
            && is_equal_or_unset(p.releases_events.as_ref(), &h.releases_events)
            && is_equal_or_unset(p.enable_ssl_verification.as_ref(), &h.enable_ssl_verification))
    }

    async fn create(&self, mr: &ProjectHook) -> Result<ExternalCreation, ControllerError> {
        let project = project(mr)?;
        let opts = self.options(mr.for_provider()).await?;
        let created = self
            .ctx
            .gitlab
            .add_project_hook(&project, &opts)
            .await
            .map_err(create_failed(NAME))?;
        Ok(ExternalCreation {
            external_name: created.id.to_string(),
            ..Default::default()
        })
    }

    async fn update(&self, mr: &ProjectHook, id: &i64, _remote: &ObservedHook) -> Result<ExternalUpdate, ControllerError> {
        let project = project(mr)?;
        let opts = self.options(mr.for_provider()).await?;
        self.ctx
            .gitlab
            .edit_project_hook(&project, *id, &opts)
            .await
            .map_err(update_failed(NAME))?;
        Ok(ExternalUpdate::default())
    }

    async fn delete(&self, mr: &ProjectHook, id: &i64) -> Result<(), ControllerError> {
        let project = project(mr)?;
        deleted(NAME, self.ctx.gitlab.delete_project_hook(&project, *id).await)
    }
}
