//! PipelineSchedule translator
//!
//! The schedule's variables are a sub-collection keyed by variable key:
//! missing ones are created, differing ones edited and undeclared ones
//! deleted, after the schedule itself is edited.

use crate::error::ControllerError;
use crate::managed::external_name;
use crate::managed::translator::{
    ExternalContext, Translator, create_failed, deleted, found, parent_id, update_failed,
};
use crate::managed::{ExternalCreation, ExternalUpdate};
use crate::reconcile_helpers::{CollectionDiff, diff_by_key, is_equal_or_unset, is_str_equal_or_unset, late_init, late_init_str};
use async_trait::async_trait;
use crds::{
    ManagedResource, PipelineSchedule, PipelineScheduleObservation, PipelineScheduleParameters,
    PipelineVariableParameters,
};
use gitlab_client::{self as gitlab, PipelineScheduleOptions, PipelineVariable, ResourceId};
use tracing::debug;

const NAME: &str = "pipeline schedule";
const DEFAULT_VARIABLE_TYPE: &str = "env_var";

pub struct PipelineScheduleTranslator {
    ctx: ExternalContext,
}

fn project(mr: &PipelineSchedule) -> Result<ResourceId, ControllerError> {
    parent_id(mr.for_provider().project_id.as_ref(), "projectID")
}

fn options(p: &PipelineScheduleParameters) -> PipelineScheduleOptions {
    PipelineScheduleOptions {
        description: Some(p.description.clone()),
        git_ref: Some(p.git_ref.clone()),
        cron: Some(p.cron.clone()),
        cron_timezone: p.cron_timezone.clone(),
        active: p.active,
    }
}

fn variable(v: &PipelineVariableParameters) -> PipelineVariable {
    PipelineVariable {
        key: v.key.clone(),
        value: v.value.clone(),
        variable_type: v.variable_type.clone().unwrap_or_else(|| DEFAULT_VARIABLE_TYPE.to_string()),
    }
}

fn variable_diff(
    declared: &[PipelineVariableParameters],
    observed: &[PipelineVariable],
) -> CollectionDiff<String, PipelineVariableParameters> {
    diff_by_key(
        declared,
        observed,
        |d| d.key.clone(),
        |o| o.key.clone(),
        |d, o| d.value == o.value && d.variable_type.as_deref().unwrap_or(DEFAULT_VARIABLE_TYPE) == o.variable_type,
    )
}

fn schedule_up_to_date(p: &PipelineScheduleParameters, r: &gitlab::PipelineSchedule) -> bool {
    p.description == r.description
        && p.git_ref == r.git_ref
        && p.cron == r.cron
        && is_str_equal_or_unset(p.cron_timezone.as_ref(), Some(r.cron_timezone.as_str()))
        && is_equal_or_unset(p.active.as_ref(), &r.active)
}

#[async_trait]
impl Translator for PipelineScheduleTranslator {
    type Kind = PipelineSchedule;
    type Id = i64;
    type Remote = gitlab::PipelineSchedule;

    const NAME: &'static str = NAME;

    fn new(ctx: ExternalContext) -> Self {
        Self { ctx }
    }

    fn parse_id(&self, external_name: &str) -> Result<i64, ControllerError> {
        external_name::numeric(external_name)
    }

    async fn fetch(&self, mr: &PipelineSchedule, id: &i64) -> Result<Option<gitlab::PipelineSchedule>, ControllerError> {
        let project = project(mr)?;
        found(NAME, self.ctx.gitlab.get_pipeline_schedule(&project, *id).await)
    }

    fn late_initialize(&self, p: &mut PipelineScheduleParameters, remote: &gitlab::PipelineSchedule) -> bool {
        let mut changed = late_init_str(&mut p.cron_timezone, &remote.cron_timezone);
        changed |= late_init(&mut p.active, Some(remote.active));
        changed
    }

    fn observation(&self, remote: &gitlab::PipelineSchedule) -> PipelineScheduleObservation {
        PipelineScheduleObservation {
            id: Some(remote.id),
            next_run_at: remote.next_run_at.map(|t| t.to_rfc3339()),
            owner: remote.owner.as_ref().map(|u| u.username.clone()),
            created_at: remote.created_at.map(|t| t.to_rfc3339()),
            updated_at: remote.updated_at.map(|t| t.to_rfc3339()),
        }
    }

    async fn is_up_to_date(&self, mr: &PipelineSchedule, remote: &gitlab::PipelineSchedule) -> Result<bool, ControllerError> {
        let p = mr.for_provider();
        Ok(schedule_up_to_date(p, remote) && variable_diff(&p.variables, &remote.variables).is_empty())
    }

    async fn create(&self, mr: &PipelineSchedule) -> Result<ExternalCreation, ControllerError> {
        let project = project(mr)?;
        let p = mr.for_provider();
        let created = self
            .ctx
            .gitlab
            .create_pipeline_schedule(&project, &options(p))
            .await
            .map_err(create_failed(NAME))?;
        for v in &p.variables {
            self.ctx
                .gitlab
                .create_pipeline_schedule_variable(&project, created.id, &variable(v))
                .await
                .map_err(create_failed(NAME))?;
        }
        Ok(ExternalCreation {
            external_name: created.id.to_string(),
            ..Default::default()
        })
    }

    async fn update(
        &self,
        mr: &PipelineSchedule,
        id: &i64,
        remote: &gitlab::PipelineSchedule,
    ) -> Result<ExternalUpdate, ControllerError> {
        let project = project(mr)?;
        let p = mr.for_provider();
        let gitlab = &self.ctx.gitlab;

        if !schedule_up_to_date(p, remote) {
            gitlab
                .edit_pipeline_schedule(&project, *id, &options(p))
                .await
                .map_err(update_failed(NAME))?;
        }

        let diff = variable_diff(&p.variables, &remote.variables);
        for key in &diff.remove {
            debug!("Removing variable {} from schedule {}", key, id);
            deleted(NAME, gitlab.delete_pipeline_schedule_variable(&project, *id, key).await)?;
        }
        for v in &diff.change {
            gitlab
                .edit_pipeline_schedule_variable(&project, *id, &variable(v))
                .await
                .map_err(update_failed(NAME))?;
        }
        for v in &diff.add {
            gitlab
                .create_pipeline_schedule_variable(&project, *id, &variable(v))
                .await
                .map_err(update_failed(NAME))?;
        }
        Ok(ExternalUpdate::default())
    }

    async fn delete(&self, mr: &PipelineSchedule, id: &i64) -> Result<(), ControllerError> {
        let project = project(mr)?;
        deleted(NAME, self.ctx.gitlab.delete_pipeline_schedule(&project, *id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared(key: &str, value: &str, variable_type: Option<&str>) -> PipelineVariableParameters {
        PipelineVariableParameters {
            key: key.to_string(),
            value: value.to_string(),
            variable_type: variable_type.map(str::to_string),
        }
    }

    fn observed(key: &str, value: &str, variable_type: &str) -> PipelineVariable {
        PipelineVariable {
            key: key.to_string(),
            value: value.to_string(),
            variable_type: variable_type.to_string(),
        }
    }

    #[test]
    fn test_variable_type_defaults_to_env_var() {
        let diff = variable_diff(&[declared("A", "1", None)], &[observed("A", "1", "env_var")]);
        assert!(diff.is_empty());
        let diff = variable_diff(&[declared("A", "1", None)], &[observed("A", "1", "file")]);
        assert_eq!(diff.change.len(), 1);
    }

    #[test]
    fn test_variable_diff_partitions_by_key() {
        let diff = variable_diff(
            &[declared("KEEP", "1", None), declared("EDIT", "new", None), declared("ADD", "x", None)],
            &[observed("KEEP", "1", "env_var"), observed("EDIT", "old", "env_var"), observed("DROP", "y", "env_var")],
        );
        assert_eq!(diff.add.iter().map(|v| v.key.as_str()).collect::<Vec<_>>(), vec!["ADD"]);
        assert_eq!(diff.change.iter().map(|v| v.key.as_str()).collect::<Vec<_>>(), vec!["EDIT"]);
        assert_eq!(diff.remove, vec!["DROP".to_string()]);
    }
}
