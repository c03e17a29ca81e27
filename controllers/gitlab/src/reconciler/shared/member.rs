//! Project and group membership
//!
//! The external name is the member's user ID. `userName` is resolved to a
//! user ID on create and the resolved ID is late-initialized into the spec.

use super::{ScopedKind, parent};
use crate::error::ControllerError;
use crate::managed::external_name;
use crate::managed::translator::{
    ExternalContext, Translator, create_failed, deleted, found, get_failed, update_failed,
};
use crate::managed::{ExternalCreation, ExternalUpdate};
use crate::reconcile_helpers::{is_date_equal_or_unset, is_equal_or_unset_opt, late_init};
use async_trait::async_trait;
use crds::{ManagedResource, MemberObservation, MemberParameters};
use gitlab_client::{Member, MemberOptions};
use std::marker::PhantomData;
use tracing::debug;

/// A membership kind
pub trait MemberKind: ScopedKind<Observation = MemberObservation> {
    fn member(params: &Self::Parameters) -> &MemberParameters;
    fn member_mut(params: &mut Self::Parameters) -> &mut MemberParameters;
}

pub struct MemberTranslator<K> {
    ctx: ExternalContext,
    kind: PhantomData<fn() -> K>,
}

impl<K: MemberKind> MemberTranslator<K> {
    fn options(member: &MemberParameters) -> MemberOptions {
        MemberOptions {
            user_id: None,
            access_level: Some(member.access_level),
            expires_at: member.expires_at.clone(),
            member_role_id: member.member_role_id,
        }
    }

    /// Declared user ID, resolving `userName` if needed
    async fn user_id(&self, member: &MemberParameters) -> Result<i64, ControllerError> {
        if let Some(id) = member.user_id {
            return Ok(id);
        }
        let Some(username) = member.user_name.as_deref() else {
            return Err(ControllerError::MissingParentId("userID"));
        };
        let user = self
            .ctx
            .gitlab
            .find_user_by_username(username)
            .await
            .map_err(get_failed(K::NAME))?;
        match user {
            Some(user) => {
                debug!("Resolved user {} to ID {}", username, user.id);
                Ok(user.id)
            }
            None => Err(ControllerError::UnknownUser(username.to_string())),
        }
    }
}

#[async_trait]
impl<K: MemberKind> Translator for MemberTranslator<K> {
    type Kind = K;
    type Id = i64;
    type Remote = Member;

    const NAME: &'static str = K::NAME;

    fn new(ctx: ExternalContext) -> Self {
        Self {
            ctx,
            kind: PhantomData,
        }
    }

    fn parse_id(&self, external_name: &str) -> Result<i64, ControllerError> {
        external_name::numeric(external_name)
    }

    async fn fetch(&self, mr: &K, id: &i64) -> Result<Option<Member>, ControllerError> {
        let parent = parent(mr)?;
        found(K::NAME, self.ctx.gitlab.get_member(&parent, *id).await)
    }

    fn late_initialize(&self, params: &mut K::Parameters, remote: &Member) -> bool {
        let member = K::member_mut(params);
        let mut changed = late_init(&mut member.user_id, Some(remote.id));
        changed |= late_init(&mut member.expires_at, remote.expires_at.clone());
        changed |= late_init(&mut member.member_role_id, remote.member_role_id);
        changed
    }

    fn observation(&self, remote: &Member) -> MemberObservation {
        MemberObservation {
            username: Some(remote.username.clone()),
            name: Some(remote.name.clone()),
            state: Some(remote.state.clone()),
            web_url: Some(remote.web_url.clone()).filter(|u| !u.is_empty()),
        }
    }

    async fn is_up_to_date(&self, mr: &K, remote: &Member) -> Result<bool, ControllerError> {
        let member = K::member(mr.for_provider());
        Ok(member.access_level == remote.access_level
            && is_date_equal_or_unset(member.expires_at.as_ref(), remote.expires_at.as_deref())
            && is_equal_or_unset_opt(member.member_role_id.as_ref(), remote.member_role_id.as_ref()))
    }

    async fn create(&self, mr: &K) -> Result<ExternalCreation, ControllerError> {
        let parent = parent(mr)?;
        let member = K::member(mr.for_provider());
        let user_id = self.user_id(member).await?;

        let opts = MemberOptions {
            user_id: Some(user_id),
            ..Self::options(member)
        };
        let created = self
            .ctx
            .gitlab
            .add_member(&parent, &opts)
            .await
            .map_err(create_failed(K::NAME))?;
        Ok(ExternalCreation {
            external_name: created.id.to_string(),
            ..Default::default()
        })
    }

    async fn update(&self, mr: &K, id: &i64, _remote: &Member) -> Result<ExternalUpdate, ControllerError> {
        let parent = parent(mr)?;
        let opts = Self::options(K::member(mr.for_provider()));
        self.ctx
            .gitlab
            .edit_member(&parent, *id, &opts)
            .await
            .map_err(update_failed(K::NAME))?;
        Ok(ExternalUpdate::default())
    }

    async fn delete(&self, mr: &K, id: &i64) -> Result<(), ControllerError> {
        let parent = parent(mr)?;
        deleted(K::NAME, self.ctx.gitlab.remove_member(&parent, *id).await)
    }
}
