//! License translator
//!
//! `GET /license` returns whichever license is current, so the bound ID is
//! checked against it and a different license means ours is gone. The API
//! never returns the license body; the body last applied is kept in the
//! connection secret under `license` and compared with the declared one.
//!
//! During teardown the existence probe is a DELETE, because the GET is
//! eventually consistent right after a license is removed.

use crate::error::ControllerError;
use crate::managed::external_name;
use crate::managed::translator::{
    ExternalContext, Translator, create_failed, delete_failed, deleted, found, update_failed,
};
use crate::managed::{ExternalCreation, ExternalUpdate};
use async_trait::async_trait;
use crds::{License, LicenseObservation, ManagedResource};
use gitlab_client as gitlab;
use tracing::{info, warn};

const NAME: &str = "license";
const LICENSE_KEY: &str = "license";

pub struct LicenseTranslator {
    ctx: ExternalContext,
}

impl LicenseTranslator {
    /// Declared body; `None` when an endpoint source could not be fetched
    async fn declared_body(&self, mr: &License) -> Result<Option<String>, ControllerError> {
        match self.ctx.secrets.resolve(&mr.for_provider().license, &self.ctx.namespace).await {
            Ok(body) => Ok(Some(body)),
            Err(e @ ControllerError::SourceFetch { .. }) => {
                warn!("Skipping license comparison: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Body stored in the connection secret by the last create or update
    async fn applied_body(&self, mr: &License) -> Result<Option<String>, ControllerError> {
        let Some(reference) = &mr.resource_spec().write_connection_secret_to_ref else {
            return Ok(None);
        };
        let data = self.ctx.secrets.connection_secret(reference, &self.ctx.namespace).await?;
        Ok(data
            .get(LICENSE_KEY)
            .map(|body| String::from_utf8_lossy(body).into_owned()))
    }
}

#[async_trait]
impl Translator for LicenseTranslator {
    type Kind = License;
    type Id = i64;
    type Remote = gitlab::License;

    const NAME: &'static str = NAME;
    const REQUIRES_SINK: bool = true;

    fn new(ctx: ExternalContext) -> Self {
        Self { ctx }
    }

    fn parse_id(&self, external_name: &str) -> Result<i64, ControllerError> {
        external_name::numeric(external_name)
    }

    async fn fetch(&self, _mr: &License, id: &i64) -> Result<Option<gitlab::License>, ControllerError> {
        let current = found(NAME, self.ctx.gitlab.get_license().await)?;
        Ok(current.filter(|license| license.id == *id))
    }

    fn observation(&self, remote: &gitlab::License) -> LicenseObservation {
        LicenseObservation {
            id: Some(remote.id),
            plan: Some(remote.plan.clone()).filter(|p| !p.is_empty()),
            starts_at: remote.starts_at.clone(),
            expires_at: remote.expires_at.clone(),
            expired: remote.expired,
            user_limit: remote.user_limit,
            active_users: remote.active_users,
            licensee_name: remote.licensee.name.clone(),
            licensee_company: remote.licensee.company.clone(),
        }
    }

    async fn is_up_to_date(&self, mr: &License, _remote: &gitlab::License) -> Result<bool, ControllerError> {
        let Some(declared) = self.declared_body(mr).await? else {
            return Ok(true);
        };
        Ok(self.applied_body(mr).await?.as_deref() == Some(declared.as_str()))
    }

    async fn create(&self, mr: &License) -> Result<ExternalCreation, ControllerError> {
        let body = self.ctx.secrets.resolve(&mr.for_provider().license, &self.ctx.namespace).await?;
        let license = self.ctx.gitlab.add_license(&body).await.map_err(create_failed(NAME))?;
        info!("Installed {} license {}", license.plan, license.id);
        Ok(ExternalCreation {
            external_name: license.id.to_string(),
            connection_details: [(LICENSE_KEY.to_string(), body.into_bytes())].into(),
        })
    }

    async fn update(&self, mr: &License, id: &i64, _remote: &gitlab::License) -> Result<ExternalUpdate, ControllerError> {
        let Some(declared) = self.declared_body(mr).await? else {
            return Ok(ExternalUpdate::default());
        };
        if self.applied_body(mr).await?.as_deref() == Some(declared.as_str()) {
            return Ok(ExternalUpdate::default());
        }

        let license = self
            .ctx
            .gitlab
            .add_license(&declared)
            .await
            .map_err(update_failed(NAME))?;
        info!("Replaced license {} with {}", id, license.id);
        Ok(ExternalUpdate {
            external_name: Some(license.id.to_string()),
            connection_details: [(LICENSE_KEY.to_string(), declared.into_bytes())].into(),
        })
    }

    async fn delete(&self, _mr: &License, id: &i64) -> Result<(), ControllerError> {
        deleted(NAME, self.ctx.gitlab.delete_license(*id).await)
    }

    async fn gone_while_deleting(&self, _mr: &License, id: &i64) -> Result<bool, ControllerError> {
        match self.ctx.gitlab.delete_license(*id).await {
            Ok(()) => Ok(false),
            Err(e) if e.is_not_found() => Ok(true),
            Err(e) => Err(delete_failed(NAME)(e)),
        }
    }
}
