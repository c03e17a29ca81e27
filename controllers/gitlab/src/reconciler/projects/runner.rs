//! Runner translator
//!
//! Runners are created with `POST /user/runners`, which returns the runner
//! authentication token exactly once. The token is published as `token`
//! (and `tokenExpiresAt` when the instance enforces expiry), so a sink is
//! required before anything is created.

use crate::error::ControllerError;
use crate::managed::external_name;
use crate::managed::translator::{
    ExternalContext, Translator, create_failed, deleted, details, found, get_failed, update_failed,
};
use crate::managed::{ExternalCreation, ExternalUpdate};
use crate::reconcile_helpers::{
    is_equal_or_unset, is_equal_or_unset_opt, is_set_equal_or_unset, is_str_equal_or_unset, late_init, late_init_list,
    late_init_str,
};
use async_trait::async_trait;
use crds::{IdOrPath, ManagedResource, Runner, RunnerObservation, RunnerParameters};
use gitlab_client::{self as gitlab, CreateRunnerOptions, ResourceId, UpdateRunnerOptions};
use tracing::info;

const NAME: &str = "runner";

pub struct RunnerTranslator {
    ctx: ExternalContext,
}

impl RunnerTranslator {
    /// Numeric owner ID; `POST /user/runners` does not accept paths
    async fn owner_id(&self, owner: Option<&IdOrPath>, field: &'static str) -> Result<Option<i64>, ControllerError> {
        let Some(owner) = owner else {
            return Ok(None);
        };
        if let Some(id) = owner.as_id() {
            return Ok(Some(id));
        }
        let path = ResourceId::Path(owner.to_string());
        let id = match field {
            "groupID" => self.ctx.gitlab.get_group(&path).await.map(|g| g.id),
            _ => self.ctx.gitlab.get_project(&path).await.map(|p| p.id),
        }
        .map_err(get_failed(NAME))?;
        Ok(Some(id))
    }
}

fn update_options(p: &RunnerParameters) -> UpdateRunnerOptions {
    UpdateRunnerOptions {
        description: p.description.clone(),
        paused: p.paused,
        locked: p.locked,
        run_untagged: p.run_untagged,
        tag_list: p.tag_list.clone(),
        access_level: p.access_level.clone(),
        maximum_timeout: p.maximum_timeout,
        maintenance_note: p.maintenance_note.clone(),
    }
}

#[async_trait]
impl Translator for RunnerTranslator {
    type Kind = Runner;
    type Id = i64;
    type Remote = gitlab::Runner;

    const NAME: &'static str = NAME;
    const REQUIRES_SINK: bool = true;

    fn new(ctx: ExternalContext) -> Self {
        Self { ctx }
    }

    fn parse_id(&self, external_name: &str) -> Result<i64, ControllerError> {
        external_name::numeric(external_name)
    }

    async fn fetch(&self, _mr: &Runner, id: &i64) -> Result<Option<gitlab::Runner>, ControllerError> {
        found(NAME, self.ctx.gitlab.get_runner(*id).await)
    }

    fn late_initialize(&self, p: &mut RunnerParameters, remote: &gitlab::Runner) -> bool {
        let mut changed = late_init_str(&mut p.description, &remote.description);
        changed |= late_init(&mut p.paused, Some(remote.paused));
        changed |= late_init(&mut p.locked, Some(remote.locked));
        changed |= late_init(&mut p.run_untagged, Some(remote.run_untagged));
        changed |= late_init_list(&mut p.tag_list, &remote.tag_list);
        changed |= late_init_str(&mut p.access_level, &remote.access_level);
        changed |= late_init(&mut p.maximum_timeout, remote.maximum_timeout);
        changed
    }

    fn observation(&self, remote: &gitlab::Runner) -> RunnerObservation {
        RunnerObservation {
            id: Some(remote.id),
            status: Some(remote.status.clone()).filter(|s| !s.is_empty()),
            is_shared: remote.is_shared,
        }
    }

    async fn is_up_to_date(&self, mr: &Runner, remote: &gitlab::Runner) -> Result<bool, ControllerError> {
        let p = mr.for_provider();
        Ok(is_str_equal_or_unset(p.description.as_ref(), Some(remote.description.as_str()))
            && is_equal_or_unset(p.paused.as_ref(), &remote.paused)
            && is_equal_or_unset(p.locked.as_ref(), &remote.locked)
            && is_equal_or_unset(p.run_untagged.as_ref(), &remote.run_untagged)
            && is_set_equal_or_unset(p.tag_list.as_ref(), &remote.tag_list)
            && is_str_equal_or_unset(p.access_level.as_ref(), Some(remote.access_level.as_str()))
            && is_equal_or_unset_opt(p.maximum_timeout.as_ref(), remote.maximum_timeout.as_ref())
            && is_str_equal_or_unset(p.maintenance_note.as_ref(), remote.maintenance_note.as_deref()))
    }

    async fn create(&self, mr: &Runner) -> Result<ExternalCreation, ControllerError> {
        let p = mr.for_provider();
        let opts = CreateRunnerOptions {
            runner_type: p.runner_type.clone(),
            group_id: self.owner_id(p.group_id.as_ref(), "groupID").await?,
            project_id: self.owner_id(p.project_id.as_ref(), "projectID").await?,
            description: p.description.clone(),
            paused: p.paused,
            locked: p.locked,
            run_untagged: p.run_untagged,
            tag_list: p.tag_list.clone(),
            access_level: p.access_level.clone(),
            maximum_timeout: p.maximum_timeout,
            maintenance_note: p.maintenance_note.clone(),
        };
        match (p.runner_type.as_str(), &opts.group_id, &opts.project_id) {
            ("group_type", None, _) => return Err(ControllerError::MissingParentId("groupID")),
            ("project_type", _, None) => return Err(ControllerError::MissingParentId("projectID")),
            _ => {}
        }

        let created = self
            .ctx
            .gitlab
            .create_runner(&opts)
            .await
            .map_err(create_failed(NAME))?;
        info!("Created {} runner {}", p.runner_type, created.id);
        Ok(ExternalCreation {
            external_name: created.id.to_string(),
            connection_details: details([
                ("token", Some(created.token)),
                ("tokenExpiresAt", created.token_expires_at.map(|t| t.to_rfc3339())),
            ]),
        })
    }

    async fn update(&self, mr: &Runner, id: &i64, _remote: &gitlab::Runner) -> Result<ExternalUpdate, ControllerError> {
        self.ctx
            .gitlab
            .update_runner(*id, &update_options(mr.for_provider()))
            .await
            .map_err(update_failed(NAME))?;
        Ok(ExternalUpdate::default())
    }

    async fn delete(&self, _mr: &Runner, id: &i64) -> Result<(), ControllerError> {
        deleted(NAME, self.ctx.gitlab.delete_runner(*id).await)
    }
}
