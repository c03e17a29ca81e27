//! Project and group CI/CD variables
//!
//! The external name is the variable key. The value may come inline or from
//! a secret and is compared on every observe; it is never mirrored into
//! the status or logged.

use super::{ScopedKind, parent};
use crate::error::ControllerError;
use crate::managed::external_name;
use crate::managed::translator::{
    ExternalContext, Translator, create_failed, deleted, found, update_failed,
};
use crate::managed::{ExternalCreation, ExternalUpdate};
use crate::reconcile_helpers::{is_equal_or_unset, is_str_equal_or_unset, late_init, late_init_str};
use async_trait::async_trait;
use crds::{ManagedResource, VariableObservation, VariableParameters};
use gitlab_client::{Variable, VariableOptions};
use std::marker::PhantomData;

/// A CI/CD variable kind
pub trait VariableKind: ScopedKind<Observation = VariableObservation> {
    fn variable(params: &Self::Parameters) -> &VariableParameters;
    fn variable_mut(params: &mut Self::Parameters) -> &mut VariableParameters;
}

pub struct VariableTranslator<K> {
    ctx: ExternalContext,
    kind: PhantomData<fn() -> K>,
}

impl<K: VariableKind> VariableTranslator<K> {
    async fn value(&self, variable: &VariableParameters) -> Result<Option<String>, ControllerError> {
        self.ctx
            .secrets
            .inline_or_key(
                variable.value.as_ref(),
                variable.value_secret_ref.as_ref(),
                &self.ctx.namespace,
            )
            .await
    }

    async fn options(&self, variable: &VariableParameters) -> Result<VariableOptions, ControllerError> {
        Ok(VariableOptions {
            key: Some(variable.key.clone()),
            value: self.value(variable).await?,
            variable_type: variable.variable_type.clone(),
            protected: variable.protected,
            masked: variable.masked,
            raw: variable.raw,
            environment_scope: variable.environment_scope.clone(),
            description: variable.description.clone(),
        })
    }
}

#[async_trait]
impl<K: VariableKind> Translator for VariableTranslator<K> {
    type Kind = K;
    type Id = String;
    type Remote = Variable;

    const NAME: &'static str = K::NAME;

    fn new(ctx: ExternalContext) -> Self {
        Self {
            ctx,
            kind: PhantomData,
        }
    }

    fn parse_id(&self, external_name: &str) -> Result<String, ControllerError> {
        external_name::natural_key(external_name)
    }

    async fn fetch(&self, mr: &K, key: &String) -> Result<Option<Variable>, ControllerError> {
        let parent = parent(mr)?;
        let scope = K::variable(mr.for_provider()).environment_scope.as_deref();
        found(K::NAME, self.ctx.gitlab.get_variable(&parent, key, scope).await)
    }

    fn late_initialize(&self, params: &mut K::Parameters, remote: &Variable) -> bool {
        let variable = K::variable_mut(params);
        let mut changed = late_init_str(&mut variable.variable_type, &remote.variable_type);
        changed |= late_init(&mut variable.protected, Some(remote.protected));
        changed |= late_init(&mut variable.masked, Some(remote.masked));
        changed |= late_init(&mut variable.raw, Some(remote.raw));
        changed |= late_init_str(&mut variable.environment_scope, &remote.environment_scope);
        changed |= late_init(&mut variable.description, remote.description.clone());
        changed
    }

    fn observation(&self, remote: &Variable) -> VariableObservation {
        VariableObservation {
            key: Some(remote.key.clone()),
            variable_type: Some(remote.variable_type.clone()),
            environment_scope: Some(remote.environment_scope.clone()),
            protected: Some(remote.protected),
            masked: Some(remote.masked),
        }
    }

    async fn is_up_to_date(&self, mr: &K, remote: &Variable) -> Result<bool, ControllerError> {
        let variable = K::variable(mr.for_provider());
        let value_matches = match self.value(variable).await? {
            Some(value) => value == remote.value,
            None => true,
        };
        Ok(value_matches
            && is_str_equal_or_unset(variable.variable_type.as_ref(), Some(remote.variable_type.as_str()))
            && is_equal_or_unset(variable.protected.as_ref(), &remote.protected)
            && is_equal_or_unset(variable.masked.as_ref(), &remote.masked)
            && is_equal_or_unset(variable.raw.as_ref(), &remote.raw)
            && is_str_equal_or_unset(variable.environment_scope.as_ref(), Some(remote.environment_scope.as_str()))
            && is_str_equal_or_unset(variable.description.as_ref(), remote.description.as_deref()))
    }

    async fn create(&self, mr: &K) -> Result<ExternalCreation, ControllerError> {
        let parent = parent(mr)?;
        let opts = self.options(K::variable(mr.for_provider())).await?;
        let created = self
            .ctx
            .gitlab
            .create_variable(&parent, &opts)
            .await
            .map_err(create_failed(K::NAME))?;
        Ok(ExternalCreation {
            external_name: created.key,
            ..Default::default()
        })
    }

    async fn update(&self, mr: &K, key: &String, _remote: &Variable) -> Result<ExternalUpdate, ControllerError> {
        let parent = parent(mr)?;
        let opts = self.options(K::variable(mr.for_provider())).await?;
        self.ctx
            .gitlab
            .update_variable(&parent, key, &opts)
            .await
            .map_err(update_failed(K::NAME))?;
        Ok(ExternalUpdate::default())
    }

    async fn delete(&self, mr: &K, key: &String) -> Result<(), ControllerError> {
        let parent = parent(mr)?;
        let scope = K::variable(mr.for_provider()).environment_scope.as_deref();
        deleted(K::NAME, self.ctx.gitlab.remove_variable(&parent, key, scope).await)
    }
}
