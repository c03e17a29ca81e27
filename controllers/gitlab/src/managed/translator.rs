//! Per-kind translators and the generic state machine client
//!
//! A [`Translator`] knows how one kind maps onto the GitLab API: how to
//! parse its external name, fetch the remote entity, late-initialize and
//! compare the spec, and issue create/update/delete. [`TranslatedClient`]
//! wraps a translator into an [`ExternalClient`] and owns the parts of the
//! contract shared by every kind (unbound objects, 404 handling, conditions,
//! credential sinks, management policies).

use super::{ExternalClient, ExternalCreation, ExternalObservation, ExternalUpdate};
use crate::cluster::ConnectionDetails;
use crate::error::ControllerError;
use crate::secret_source::SecretResolver;
use async_trait::async_trait;
use crds::{Condition, IdOrPath, ManagedResource, ManagementAction};
use gitlab_client::{GitLabClientTrait, GitLabError, ResourceId};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Everything a translator may use during one reconcile
#[derive(Clone)]
pub struct ExternalContext {
    /// Client for the ProviderConfig the object references
    pub gitlab: Arc<dyn GitLabClientTrait>,
    /// Resolves value sources and reads connection secrets
    pub secrets: SecretResolver,
    /// Namespace of the managed object, the default for secret references
    pub namespace: String,
}

/// Kind-specific half of the reconcile state machine
#[async_trait]
pub trait Translator: Send + Sync + Sized + 'static {
    type Kind: ManagedResource;
    /// Parsed external name
    type Id: Send + Sync;
    /// Remote entity as returned by GitLab
    type Remote: Send + Sync;

    /// Name used in error messages and metrics
    const NAME: &'static str;
    /// Create only returns a write-once credential; refuse to create without a sink
    const REQUIRES_SINK: bool = false;

    fn new(ctx: ExternalContext) -> Self;

    fn parse_id(&self, external_name: &str) -> Result<Self::Id, ControllerError>;

    /// Fetch the bound entity; `None` when it does not exist
    async fn fetch(&self, mr: &Self::Kind, id: &Self::Id) -> Result<Option<Self::Remote>, ControllerError>;

    /// Fill unset spec fields from the remote entity; true if anything changed
    fn late_initialize(
        &self,
        _params: &mut <Self::Kind as ManagedResource>::Parameters,
        _remote: &Self::Remote,
    ) -> bool {
        false
    }

    fn observation(&self, remote: &Self::Remote) -> <Self::Kind as ManagedResource>::Observation;

    async fn is_up_to_date(&self, mr: &Self::Kind, remote: &Self::Remote) -> Result<bool, ControllerError>;

    /// Re-observable outputs
    fn connection_details(&self, _remote: &Self::Remote) -> ConnectionDetails {
        ConnectionDetails::new()
    }

    async fn create(&self, mr: &Self::Kind) -> Result<ExternalCreation, ControllerError>;

    async fn update(
        &self,
        mr: &Self::Kind,
        id: &Self::Id,
        remote: &Self::Remote,
    ) -> Result<ExternalUpdate, ControllerError>;

    async fn delete(&self, mr: &Self::Kind, id: &Self::Id) -> Result<(), ControllerError>;

    /// Whether the remote entity is gone while the object is being deleted
    async fn gone_while_deleting(&self, mr: &Self::Kind, id: &Self::Id) -> Result<bool, ControllerError> {
        Ok(self.fetch(mr, id).await?.is_none())
    }
}

/// [`ExternalClient`] driven by a [`Translator`]
///
/// Holds the entity fetched by `observe` so that `update` in the same
/// reconcile does not fetch it again. Dropped at the end of the reconcile.
pub struct TranslatedClient<T: Translator> {
    translator: T,
    observed: Mutex<Option<Arc<T::Remote>>>,
}

impl<T: Translator> TranslatedClient<T> {
    pub fn new(ctx: ExternalContext) -> Self {
        Self {
            translator: T::new(ctx),
            observed: Mutex::new(None),
        }
    }

    fn remember(&self, remote: Option<Arc<T::Remote>>) {
        match self.observed.lock() {
            Ok(mut observed) => *observed = remote,
            Err(poisoned) => *poisoned.into_inner() = remote,
        }
    }

    fn remembered(&self) -> Option<Arc<T::Remote>> {
        match self.observed.lock() {
            Ok(observed) => observed.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn bound_id(&self, mr: &T::Kind) -> Result<T::Id, ControllerError> {
        let name = mr.external_name();
        if name.is_empty() {
            return Err(ControllerError::MissingExternalName);
        }
        self.translator.parse_id(name)
    }
}

#[async_trait]
impl<T: Translator> ExternalClient<T::Kind> for TranslatedClient<T> {
    async fn observe(&self, mr: &mut T::Kind) -> Result<ExternalObservation, ControllerError> {
        if mr.external_name().is_empty() {
            return Ok(ExternalObservation::absent());
        }
        let id = self.bound_id(mr)?;

        if mr.is_deleting() {
            let gone = self.translator.gone_while_deleting(mr, &id).await?;
            return Ok(ExternalObservation {
                resource_exists: !gone,
                resource_up_to_date: true,
                ..Default::default()
            });
        }

        let Some(remote) = self.translator.fetch(mr, &id).await? else {
            debug!("{} {} not found", T::NAME, mr.external_name());
            return Ok(ExternalObservation::absent());
        };

        let late_initialized = mr.resource_spec().allows(ManagementAction::LateInitialize)
            && self.translator.late_initialize(mr.for_provider_mut(), &remote);

        mr.managed_status_mut().at_provider = self.translator.observation(&remote);
        mr.set_condition(Condition::available());

        let up_to_date = self.translator.is_up_to_date(mr, &remote).await?;
        let connection_details = self.translator.connection_details(&remote);
        self.remember(Some(Arc::new(remote)));

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: up_to_date,
            resource_late_initialized: late_initialized,
            connection_details,
        })
    }

    async fn create(&self, mr: &mut T::Kind) -> Result<ExternalCreation, ControllerError> {
        if T::REQUIRES_SINK && mr.resource_spec().write_connection_secret_to_ref.is_none() {
            return Err(ControllerError::MissingConnectionSecret(T::NAME));
        }
        let creation = self.translator.create(mr).await?;
        mr.set_external_name(&creation.external_name);
        mr.set_condition(Condition::creating());
        Ok(creation)
    }

    async fn update(&self, mr: &mut T::Kind) -> Result<ExternalUpdate, ControllerError> {
        let id = self.bound_id(mr)?;
        let remote = match self.remembered() {
            Some(remote) => remote,
            None => match self.translator.fetch(mr, &id).await? {
                Some(remote) => Arc::new(remote),
                None => {
                    return Err(ControllerError::Update {
                        kind: T::NAME,
                        source: GitLabError::NotFound(format!("{} {}", T::NAME, mr.external_name())),
                    })
                }
            },
        };

        let update = self.translator.update(mr, &id, &remote).await?;
        if let Some(name) = &update.external_name {
            mr.set_external_name(name);
        }
        Ok(update)
    }

    async fn delete(&self, mr: &mut T::Kind) -> Result<(), ControllerError> {
        let id = self.bound_id(mr)?;
        mr.set_condition(Condition::deleting());
        self.translator.delete(mr, &id).await
    }

    async fn disconnect(&self) {
        self.remember(None);
    }
}

/// Map a GitLab lookup to `Some`, `None` for a 404, or a *get-failed* error
pub fn found<T>(kind: &'static str, result: Result<T, GitLabError>) -> Result<Option<T>, ControllerError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(source) => Err(ControllerError::Get { kind, source }),
    }
}

/// Map a GitLab delete; a 404 means the entity is already gone
pub fn deleted<T>(kind: &'static str, result: Result<T, GitLabError>) -> Result<(), ControllerError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.is_not_found() => Ok(()),
        Err(source) => Err(ControllerError::Delete { kind, source }),
    }
}

pub fn get_failed(kind: &'static str) -> impl FnOnce(GitLabError) -> ControllerError {
    move |source| ControllerError::Get { kind, source }
}

pub fn create_failed(kind: &'static str) -> impl FnOnce(GitLabError) -> ControllerError {
    move |source| ControllerError::Create { kind, source }
}

pub fn update_failed(kind: &'static str) -> impl FnOnce(GitLabError) -> ControllerError {
    move |source| ControllerError::Update { kind, source }
}

pub fn delete_failed(kind: &'static str) -> impl FnOnce(GitLabError) -> ControllerError {
    move |source| ControllerError::Delete { kind, source }
}

/// Convert a declared ID-or-path into the client's identifier
pub fn resource_id(id: &IdOrPath) -> ResourceId {
    match id.as_id() {
        Some(numeric) => ResourceId::Numeric(numeric),
        None => ResourceId::Path(id.to_string()),
    }
}

/// Required parent identifier (`projectID`, `groupID`, ...)
pub fn parent_id(id: Option<&IdOrPath>, field: &'static str) -> Result<ResourceId, ControllerError> {
    id.map(resource_id).ok_or(ControllerError::MissingParentId(field))
}

/// Connection details from `(key, value)` pairs, skipping empty values
pub fn details<'a>(pairs: impl IntoIterator<Item = (&'a str, Option<String>)>) -> ConnectionDetails {
    pairs
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| (key.to_string(), v.into_bytes()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_collapses_not_found() {
        let missing: Result<i64, GitLabError> = Err(GitLabError::NotFound("gone".to_string()));
        assert_eq!(found("project", missing).unwrap(), None);

        let failed: Result<i64, GitLabError> = Err(GitLabError::Api {
            status: 500,
            message: "boom".to_string(),
        });
        let err = found("project", failed).unwrap_err();
        assert!(err.to_string().starts_with("cannot get project: "));
    }

    #[test]
    fn test_deleted_treats_404_as_success() {
        let missing: Result<(), GitLabError> = Err(GitLabError::NotFound("gone".to_string()));
        deleted("hook", missing).unwrap();
        let forbidden: Result<(), GitLabError> = Err(GitLabError::Authentication("403".to_string()));
        assert!(deleted("hook", forbidden).unwrap_err().to_string().starts_with("cannot delete hook: "));
    }

    #[test]
    fn test_resource_id_prefers_numeric() {
        assert_eq!(resource_id(&IdOrPath::Id(7)), ResourceId::Numeric(7));
        assert_eq!(resource_id(&IdOrPath::from("7")), ResourceId::Numeric(7));
        assert_eq!(resource_id(&IdOrPath::from("g/app")), ResourceId::Path("g/app".to_string()));
        assert!(matches!(
            parent_id(None, "projectID").unwrap_err(),
            ControllerError::MissingParentId("projectID")
        ));
    }

    #[test]
    fn test_details_skip_empty_values() {
        let details = details([("token", Some("abc".to_string())), ("expiresAt", None), ("empty", Some(String::new()))]);
        assert_eq!(details.len(), 1);
        assert_eq!(details["token"], b"abc".to_vec());
    }
}
