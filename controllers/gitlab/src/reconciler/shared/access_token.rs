//! Project and group access tokens
//!
//! Like deploy tokens, access tokens are immutable and only reveal their
//! secret on creation: drift rotates the token. A revoked token counts as
//! missing, so it is recreated unless the object is being deleted.

use super::{ScopedKind, parent};
use crate::error::ControllerError;
use crate::managed::external_name;
use crate::managed::translator::{
    ExternalContext, Translator, create_failed, deleted, details, found,
};
use crate::managed::{ExternalCreation, ExternalUpdate};
use crate::reconcile_helpers::{is_date_equal_or_unset, is_equal_or_unset, is_set_equal_or_unset, late_init};
use async_trait::async_trait;
use crds::{AccessTokenObservation, AccessTokenParameters, ManagedResource};
use gitlab_client::{AccessToken, AccessTokenOptions, Parent};
use std::marker::PhantomData;
use tracing::{info, warn};

/// An access token kind
pub trait AccessTokenKind: ScopedKind<Observation = AccessTokenObservation> {
    fn token(params: &Self::Parameters) -> &AccessTokenParameters;
    fn token_mut(params: &mut Self::Parameters) -> &mut AccessTokenParameters;
}

/// Issues, rotates and revokes access tokens of kind `K`
pub struct AccessTokenTranslator<K> {
    ctx: ExternalContext,
    kind: PhantomData<fn() -> K>,
}

impl<K: AccessTokenKind> AccessTokenTranslator<K> {
    async fn issue(&self, parent: &Parent, token: &AccessTokenParameters) -> Result<ExternalCreation, ControllerError> {
        let opts = AccessTokenOptions {
            name: token.name.clone(),
            scopes: token.scopes.clone(),
            access_level: token.access_level,
            expires_at: token.expires_at.clone(),
        };
        let created = self
            .ctx
            .gitlab
            .create_access_token(parent, &opts)
            .await
            .map_err(create_failed(K::NAME))?;
        Ok(ExternalCreation {
            external_name: created.id.to_string(),
            connection_details: details([("token", created.token), ("expiresAt", created.expires_at)]),
        })
    }
}

#[async_trait]
impl<K: AccessTokenKind> Translator for AccessTokenTranslator<K> {
    type Kind = K;
    type Id = i64;
    type Remote = AccessToken;

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

    async fn fetch(&self, mr: &K, id: &i64) -> Result<Option<AccessToken>, ControllerError> {
        let parent = parent(mr)?;
        let token = found(K::NAME, self.ctx.gitlab.get_access_token(&parent, *id).await)?;
        Ok(token.filter(|t| !t.revoked))
    }

    fn late_initialize(&self, params: &mut K::Parameters, remote: &AccessToken) -> bool {
        let token = K::token_mut(params);
        let mut changed = late_init(&mut token.access_level, Some(remote.access_level));
        changed |= late_init(&mut token.expires_at, remote.expires_at.clone());
        changed
    }

    fn observation(&self, remote: &AccessToken) -> AccessTokenObservation {
        AccessTokenObservation {
            id: Some(remote.id),
            user_id: remote.user_id,
            active: remote.active,
            revoked: remote.revoked,
            expires_at: remote.expires_at.clone(),
        }
    }

    async fn is_up_to_date(&self, mr: &K, remote: &AccessToken) -> Result<bool, ControllerError> {
        let token = K::token(mr.for_provider());
        Ok(token.name == remote.name
            && is_set_equal_or_unset(Some(&token.scopes), &remote.scopes)
            && is_equal_or_unset(token.access_level.as_ref(), &remote.access_level)
            && is_date_equal_or_unset(token.expires_at.as_ref(), remote.expires_at.as_deref()))
    }

    async fn create(&self, mr: &K) -> Result<ExternalCreation, ControllerError> {
        let parent = parent(mr)?;
        self.issue(&parent, K::token(mr.for_provider())).await
    }

    async fn update(&self, mr: &K, id: &i64, _remote: &AccessToken) -> Result<ExternalUpdate, ControllerError> {
        if mr.resource_spec().write_connection_secret_to_ref.is_none() {
            return Err(ControllerError::MissingConnectionSecret(K::NAME));
        }
        let parent = parent(mr)?;
        let replacement = self.issue(&parent, K::token(mr.for_provider())).await?;
        info!("Rotated {} {} to {}", K::NAME, id, replacement.external_name);
        // The replacement is bound even when the old token survives
        if let Err(e) = deleted(K::NAME, self.ctx.gitlab.revoke_access_token(&parent, *id).await) {
            warn!("Rotated {} {} was not revoked: {}", K::NAME, id, e);
        }
        Ok(ExternalUpdate {
            external_name: Some(replacement.external_name),
            connection_details: replacement.connection_details,
        })
    }

    async fn delete(&self, mr: &K, id: &i64) -> Result<(), ControllerError> {
        let parent = parent(mr)?;
        deleted(K::NAME, self.ctx.gitlab.revoke_access_token(&parent, *id).await)
    }
}
