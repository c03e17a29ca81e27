//! MattermostIntegration translator
//!
//! A project has one Mattermost integration. It exists while it is active;
//! deleting it disables the integration. GitLab masks the webhook URL in
//! responses, so it is sent on every write and never compared.

use crate::error::ControllerError;
use crate::managed::external_name;
use crate::managed::translator::{
    ExternalContext, Translator, create_failed, deleted, found, parent_id, update_failed,
};
use crate::managed::{ExternalCreation, ExternalUpdate};
use crate::reconcile_helpers::{is_equal_or_unset, is_equal_or_unset_opt, is_str_equal_or_unset, late_init};
use async_trait::async_trait;
use crds::{ManagedResource, MattermostIntegration, MattermostIntegrationObservation, MattermostIntegrationParameters};
use gitlab_client::{self as gitlab, MattermostOptions, ResourceId};

const NAME: &str = "mattermost integration";

pub struct MattermostTranslator {
    ctx: ExternalContext,
}

fn project(mr: &MattermostIntegration) -> Result<ResourceId, ControllerError> {
    parent_id(mr.for_provider().project_id.as_ref(), "projectID")
}

impl MattermostTranslator {
    async fn options(&self, p: &MattermostIntegrationParameters) -> Result<MattermostOptions, ControllerError> {
        Ok(MattermostOptions {
            webhook: self.ctx.secrets.resolve(&p.webhook, &self.ctx.namespace).await?,
            username: p.username.clone(),
            channel: p.channel.clone(),
            notify_only_broken_pipelines: p.notify_only_broken_pipelines,
            branches_to_be_notified: p.branches_to_be_notified.clone(),
            push_events: p.push_events,
            issues_events: p.issues_events,
            confidential_issues_events: p.confidential_issues_events,
            merge_requests_events: p.merge_requests_events,
            tag_push_events: p.tag_push_events,
            note_events: p.note_events,
            pipeline_events: p.pipeline_events,
            wiki_page_events: p.wiki_page_events,
        })
    }
}

#[async_trait]
impl Translator for MattermostTranslator {
    type Kind = MattermostIntegration;
    /// Bound to the integration ID; lookups go through the project
    type Id = i64;
    type Remote = gitlab::MattermostIntegration;

    const NAME: &'static str = NAME;

    fn new(ctx: ExternalContext) -> Self {
        Self { ctx }
    }

    fn parse_id(&self, external_name: &str) -> Result<i64, ControllerError> {
        external_name::numeric(external_name)
    }

    async fn fetch(
        &self,
        mr: &MattermostIntegration,
        id: &i64,
    ) -> Result<Option<gitlab::MattermostIntegration>, ControllerError> {
        let project = project(mr)?;
        let integration = found(NAME, self.ctx.gitlab.get_mattermost(&project).await)?;
        // A recreated integration carries a new ID and is not ours
        Ok(integration.filter(|i| i.active && i.id == *id))
    }

    fn late_initialize(&self, p: &mut MattermostIntegrationParameters, remote: &gitlab::MattermostIntegration) -> bool {
        let props = &remote.properties;
        let mut changed = late_init(&mut p.username, props.username.clone().filter(|u| !u.is_empty()));
        changed |= late_init(&mut p.channel, props.channel.clone().filter(|c| !c.is_empty()));
        changed |= late_init(&mut p.notify_only_broken_pipelines, props.notify_only_broken_pipelines);
        changed |= late_init(&mut p.branches_to_be_notified, props.branches_to_be_notified.clone());
        changed |= late_init(&mut p.push_events, Some(remote.push_events));
        changed |= late_init(&mut p.issues_events, Some(remote.issues_events));
        changed |= late_init(&mut p.confidential_issues_events, Some(remote.confidential_issues_events));
        changed |= late_init(&mut p.merge_requests_events, Some(remote.merge_requests_events));
        changed |= late_init(&mut p.tag_push_events, Some(remote.tag_push_events));
        changed |= late_init(&mut p.note_events, Some(remote.note_events));
        changed |= late_init(&mut p.pipeline_events, Some(remote.pipeline_events));
        changed |= late_init(&mut p.wiki_page_events, Some(remote.wiki_page_events));
        changed
    }

    fn observation(&self, remote: &gitlab::MattermostIntegration) -> MattermostIntegrationObservation {
        MattermostIntegrationObservation {
            id: Some(remote.id),
            active: remote.active,
            webhook_configured: remote.active,
            updated_at: remote.updated_at.map(|t| t.to_rfc3339()),
        }
    }

    async fn is_up_to_date(
        &self,
        mr: &MattermostIntegration,
        remote: &gitlab::MattermostIntegration,
    ) -> Result<bool, ControllerError> {
        let p = mr.for_provider();
        let props = &remote.properties;
        Ok(is_str_equal_or_unset(p.username.as_ref(), props.username.as_deref())
            && is_str_equal_or_unset(p.channel.as_ref(), props.channel.as_deref())
            && is_equal_or_unset_opt(p.notify_only_broken_pipelines.as_ref(), props.notify_only_broken_pipelines.as_ref())
            && is_str_equal_or_unset(p.branches_to_be_notified.as_ref(), props.branches_to_be_notified.as_deref())
            && is_equal_or_unset(p.push_events.as_ref(), &remote.push_events)
            && is_equal_or_unset(p.issues_events.as_ref(), &remote.issues_events)
            && is_equal_or_unset(p.confidential_issues_events.as_ref(), &remote.confidential_issues_events)
            && is_equal_or_unset(p.merge_requests_events.as_ref(), &remote.merge_requests_events)
            && is_equal_or_unset(p.tag_push_events.as_ref(), &remote.tag_push_events)
            && is_equal_or_unset(p.note_events.as_ref(), &remote.note_events)
            && is_equal_or_unset(p.pipeline_events.as_ref(), &remote.pipeline_events)
            && is_equal_or_unset(p.wiki_page_events.as_ref(), &remote.wiki_page_events))
    }

    async fn create(&self, mr: &MattermostIntegration) -> Result<ExternalCreation, ControllerError> {
        let project = project(mr)?;
        let opts = self.options(mr.for_provider()).await?;
        let integration = self
            .ctx
            .gitlab
            .set_mattermost(&project, &opts)
            .await
            .map_err(create_failed(NAME))?;
        Ok(ExternalCreation {
            external_name: integration.id.to_string(),
            ..Default::default()
        })
    }

    async fn update(
        &self,
        mr: &MattermostIntegration,
        _id: &i64,
        _remote: &gitlab::MattermostIntegration,
    ) -> Result<ExternalUpdate, ControllerError> {
        let project = project(mr)?;
        let opts = self.options(mr.for_provider()).await?;
        self.ctx
            .gitlab
            .set_mattermost(&project, &opts)
            .await
            .map_err(update_failed(NAME))?;
        Ok(ExternalUpdate::default())
    }

    async fn delete(&self, mr: &MattermostIntegration, _id: &i64) -> Result<(), ControllerError> {
        let project = project(mr)?;
        deleted(NAME, self.ctx.gitlab.delete_mattermost(&project).await)
    }
}
