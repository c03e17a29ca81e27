//! ProjectDeployKey translator
//!
//! GitLab cannot change a registered key, so only `title` and `canPush`
//! are compared and updated. The public key is published as `publicKey`.

use crate::error::ControllerError;
use crate::managed::external_name;
use crate::managed::translator::{
    ExternalContext, Translator, create_failed, deleted, details, found, parent_id, update_failed,
};
use crate::managed::{ExternalCreation, ExternalUpdate};
use crate::reconcile_helpers::{is_equal_or_unset, late_init};
use async_trait::async_trait;
use crds::{ManagedResource, ProjectDeployKey, ProjectDeployKeyObservation, ProjectDeployKeyParameters};
use gitlab_client::{DeployKey, DeployKeyOptions, ResourceId};
use tracing::debug;

const NAME: &str = "deploy key";

pub struct ProjectDeployKeyTranslator {
    ctx: ExternalContext,
}

fn project(mr: &ProjectDeployKey) -> Result<ResourceId, ControllerError> {
    parent_id(mr.for_provider().project_id.as_ref(), "projectID")
}

#[async_trait]
impl Translator for ProjectDeployKeyTranslator {
    type Kind = ProjectDeployKey;
    type Id = i64;
    type Remote = DeployKey;

    const NAME: &'static str = NAME;

    fn new(ctx: ExternalContext) -> Self {
        Self { ctx }
    }

    fn parse_id(&self, external_name: &str) -> Result<i64, ControllerError> {
        external_name::numeric(external_name)
    }

    async fn fetch(&self, mr: &ProjectDeployKey, id: &i64) -> Result<Option<DeployKey>, ControllerError> {
        let project = project(mr)?;
        found(NAME, self.ctx.gitlab.get_deploy_key(&project, *id).await)
    }

    fn late_initialize(&self, p: &mut ProjectDeployKeyParameters, remote: &DeployKey) -> bool {
        let mut changed = late_init(&mut p.can_push, Some(remote.can_push));
        changed |= late_init(&mut p.expires_at, remote.expires_at.map(|t| t.to_rfc3339()));
        changed
    }

    fn observation(&self, remote: &DeployKey) -> ProjectDeployKeyObservation {
        ProjectDeployKeyObservation {
            id: Some(remote.id),
            fingerprint: remote.fingerprint.clone(),
            created_at: remote.created_at.map(|t| t.to_rfc3339()),
        }
    }

    async fn is_up_to_date(&self, mr: &ProjectDeployKey, remote: &DeployKey) -> Result<bool, ControllerError> {
        let p = mr.for_provider();
        Ok(p.title == remote.title && is_equal_or_unset(p.can_push.as_ref(), &remote.can_push))
    }

    fn connection_details(&self, remote: &DeployKey) -> crate::cluster::ConnectionDetails {
        details([("publicKey", Some(remote.key.clone()))])
    }

    async fn create(&self, mr: &ProjectDeployKey) -> Result<ExternalCreation, ControllerError> {
        let project = project(mr)?;
        let p = mr.for_provider();
        let key = self.ctx.secrets.resolve(&p.key, &self.ctx.namespace).await?;
        let opts = DeployKeyOptions {
            title: Some(p.title.clone()),
            key: Some(key.trim().to_string()),
            can_push: p.can_push,
            expires_at: p.expires_at.clone(),
        };
        let created = self
            .ctx
            .gitlab
            .add_deploy_key(&project, &opts)
            .await
            .map_err(create_failed(NAME))?;
        debug!("Added deploy key {} to project {}", created.id, project);
        Ok(ExternalCreation {
            external_name: created.id.to_string(),
            connection_details: details([("publicKey", Some(created.key))]),
        })
    }

    async fn update(&self, mr: &ProjectDeployKey, id: &i64, _remote: &DeployKey) -> Result<ExternalUpdate, ControllerError> {
        let project = project(mr)?;
        let p = mr.for_provider();
        let opts = DeployKeyOptions {
            title: Some(p.title.clone()),
            can_push: p.can_push,
            ..Default::default()
        };
        self.ctx
            .gitlab
            .update_deploy_key(&project, *id, &opts)
            .await
            .map_err(update_failed(NAME))?;
        Ok(ExternalUpdate::default())
    }

    async fn delete(&self, mr: &ProjectDeployKey, id: &i64) -> Result<(), ControllerError> {
        let project = project(mr)?;
        deleted(NAME, self.ctx.gitlab.delete_deploy_key(&project, *id).await)
    }
}
