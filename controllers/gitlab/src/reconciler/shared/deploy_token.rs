//! Project and group deploy tokens
//!
//! Deploy tokens cannot be edited and their secret is only returned by the
//! create call, so drift on any declared field creates a replacement token,
//! publishes it, and deletes the old one.

use super::{ScopedKind, parent};
use crate::error::ControllerError;
use crate::managed::external_name;
use crate::managed::translator::{
    ExternalContext, Translator, create_failed, deleted, details, found,
};
use crate::managed::{ExternalCreation, ExternalUpdate};
use crate::reconcile_helpers::{is_date_equal_or_unset, is_set_equal_or_unset, is_str_equal_or_unset, late_init};
use async_trait::async_trait;
use crds::{DeployTokenObservation, DeployTokenParameters, ManagedResource};
use gitlab_client::{DeployToken, DeployTokenOptions, Parent};
use std::marker::PhantomData;
use tracing::{info, warn};

/// A deploy token kind
pub trait DeployTokenKind: ScopedKind<Observation = DeployTokenObservation> {
    fn token(params: &Self::Parameters) -> &DeployTokenParameters;
    fn token_mut(params: &mut Self::Parameters) -> &mut DeployTokenParameters;
}

/// Issues, replaces and deletes deploy tokens of kind `K`
pub struct DeployTokenTranslator<K> {
    ctx: ExternalContext,
    kind: PhantomData<fn() -> K>,
}

impl<K: DeployTokenKind> DeployTokenTranslator<K> {
    async fn issue(&self, parent: &Parent, token: &DeployTokenParameters) -> Result<ExternalCreation, ControllerError> {
        let opts = DeployTokenOptions {
            name: token.name.clone(),
            scopes: token.scopes.clone(),
            username: token.username.clone(),
            expires_at: token.expires_at.clone(),
        };
        let created = self
            .ctx
            .gitlab
            .create_deploy_token(parent, &opts)
            .await
            .map_err(create_failed(K::NAME))?;
        Ok(ExternalCreation {
            external_name: created.id.to_string(),
            connection_details: details([("username", Some(created.username)), ("token", created.token)]),
        })
    }
}

#[async_trait]
impl<K: DeployTokenKind> Translator for DeployTokenTranslator<K> {
    type Kind = K;
    type Id = i64;
    type Remote = DeployToken;

    const NAME: &'static str = K::NAME;
    const REQUIRES_SINK: bool = true;

    fn new(ctx: ExternalContext) -> Self {
        Self {
            ctx,
            kind: PhantomData,
        }
    }

    fn parse_id(&self, external_name: &str) -> Result<i64, ControllerError> {
        external_name::numeric(external_name)
    }

    async fn fetch(&self, mr: &K, id: &i64) -> Result<Option<DeployToken>, ControllerError> {
        let parent = parent(mr)?;
        let token = found(K::NAME, self.ctx.gitlab.get_deploy_token(&parent, *id).await)?;
        Ok(token.filter(|t| !t.revoked))
    }

    fn late_initialize(&self, params: &mut K::Parameters, remote: &DeployToken) -> bool {
        late_init(&mut K::token_mut(params).expires_at, remote.expires_at.clone())
    }

    fn observation(&self, remote: &DeployToken) -> DeployTokenObservation {
        DeployTokenObservation {
            id: Some(remote.id),
            username: Some(remote.username.clone()),
            expired: remote.expired,
            revoked: remote.revoked,
        }
    }

    async fn is_up_to_date(&self, mr: &K, remote: &DeployToken) -> Result<bool, ControllerError> {
        let token = K::token(mr.for_provider());
        Ok(token.name == remote.name
            && is_str_equal_or_unset(token.username.as_ref(), Some(remote.username.as_str()))
            && is_date_equal_or_unset(token.expires_at.as_ref(), remote.expires_at.as_deref())
            && is_set_equal_or_unset(Some(&token.scopes), &remote.scopes))
    }

    async fn create(&self, mr: &K) -> Result<ExternalCreation, ControllerError> {
        let parent = parent(mr)?;
        self.issue(&parent, K::token(mr.for_provider())).await
    }

    async fn update(&self, mr: &K, id: &i64, _remote: &DeployToken) -> Result<ExternalUpdate, ControllerError> {
        if mr.resource_spec().write_connection_secret_to_ref.is_none() {
            return Err(ControllerError::MissingConnectionSecret(K::NAME));
        }
        let parent = parent(mr)?;
        let replacement = self.issue(&parent, K::token(mr.for_provider())).await?;
        info!("Replaced {} {} with {}", K::NAME, id, replacement.external_name);
        // The replacement is bound even when the old token survives
        if let Err(e) = deleted(K::NAME, self.ctx.gitlab.delete_deploy_token(&parent, *id).await) {
            warn!("Replaced {} {} left behind: {}", K::NAME, id, e);
        }
        Ok(ExternalUpdate {
            external_name: Some(replacement.external_name),
            connection_details: replacement.connection_details,
        })
    }

    async fn delete(&self, mr: &K, id: &i64) -> Result<(), ControllerError> {
        let parent = parent(mr)?;
        deleted(K::NAME, self.ctx.gitlab.delete_deploy_token(&parent, *id).await)
    }
}
