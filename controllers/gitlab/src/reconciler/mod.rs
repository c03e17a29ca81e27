//! Reconciliation logic for GitLab managed resources.
//!
//! This module is organized by GitLab API scope:
//! - `projects`: projects and project-scoped sub-resources
//! - `groups`: groups and group-scoped sub-resources
//! - `instance`: instance license and application settings
//! - `shared`: sub-resources that exist on both projects and groups
//!
//! [`Reconciler::reconcile`] drives one managed object through
//! Connect → Observe → Create/Update/Delete using the kind's translator.

pub mod groups;
pub mod instance;
pub mod projects;
pub mod shared;
#[cfg(test)]
mod reconciler_test;

use crate::backoff::BackoffStates;
use crate::cluster::{ClusterClient, ConnectionDetails};
use crate::connector::Connector;
use crate::error::ControllerError;
use crate::managed::translator::{ExternalContext, TranslatedClient, Translator};
use crate::managed::{ExternalClient, connection};
use crate::metrics::Metrics;
use crate::secret_source::SecretResolver;
use crds::{Condition, FINALIZER, ManagedResource, ManagementAction};
use kube::ResourceExt;
use kube::api::ApiResource;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Requeue delay after a create or delete, to observe the outcome promptly
const SHORT_REQUEUE: Duration = Duration::from_secs(5);

/// Reconciles GitLab managed resources.
pub struct Reconciler {
    pub(crate) connector: Connector,
    pub(crate) cluster: Arc<dyn ClusterClient>,
    /// HTTP client for value endpoints (license URLs)
    pub(crate) http: reqwest::Client,
    pub(crate) metrics: Metrics,
    /// Requeue interval after a successful reconcile
    pub(crate) poll_interval: Duration,
    /// Error count tracking per object (kind/namespace/name)
    pub(crate) backoff: BackoffStates,
}

impl Reconciler {
    pub fn new(
        connector: Connector,
        cluster: Arc<dyn ClusterClient>,
        http: reqwest::Client,
        metrics: Metrics,
        poll_interval: Duration,
    ) -> Self {
        Self {
            connector,
            cluster,
            http,
            metrics,
            poll_interval,
            backoff: BackoffStates::default(),
        }
    }

    /// Backoff key of an object
    pub fn object_key<K: ManagedResource>(mr: &K) -> String {
        format!(
            "{}/{}/{}",
            K::kind(&()),
            mr.namespace().unwrap_or_default(),
            mr.name_any()
        )
    }

    /// Requeue delay after a failed reconcile
    pub fn error_requeue<K: ManagedResource>(&self, mr: &K) -> Duration {
        self.backoff.next_delay(&Self::object_key(mr))
    }

    /// Reconcile one managed object of the translator's kind.
    ///
    /// On failure the error is recorded as `Synced=False` on the object before
    /// it is returned to the controller for a backoff requeue.
    pub async fn reconcile<T: Translator>(&self, obj: Arc<T::Kind>) -> Result<Action, ControllerError> {
        let started = Instant::now();
        let key = Self::object_key(obj.as_ref());
        let original = (*obj).clone();
        let mut mr = (*obj).clone();

        let result = self.reconcile_managed::<T>(&mut mr).await;
        let label = match &result {
            Ok(_) => {
                self.backoff.reset(&key);
                "success"
            }
            Err(e) => {
                warn!("Reconciliation failed for {} {}: {}", T::NAME, key, e);
                if !mr.is_deleting() || mr.has_finalizer() {
                    mr.set_condition(Condition::reconcile_error(e.to_string()));
                    if let Err(status_err) = self.write_status(&original, &mr).await {
                        warn!("Failed to record error status for {}: {}", key, status_err);
                    }
                }
                e.label()
            }
        };
        self.metrics.reconciled(T::NAME, label, started.elapsed());
        result
    }

    async fn reconcile_managed<T: Translator>(&self, mr: &mut T::Kind) -> Result<Action, ControllerError> {
        let original = mr.clone();
        let name = mr.name_any();
        let namespace = mr.namespace().unwrap_or_default();
        let spec = mr.resource_spec().clone();

        if mr.is_deleting() && !mr.has_finalizer() {
            debug!("{} {}/{} is being deleted and holds no finalizer", T::NAME, namespace, name);
            return Ok(Action::await_change());
        }

        if spec.management_policies.is_empty() {
            debug!("Reconciliation of {} {}/{} is paused", T::NAME, namespace, name);
            mr.set_condition(Condition::reconcile_paused());
            self.write_status(&original, mr).await?;
            return Ok(Action::await_change());
        }

        if mr.is_deleting() && !spec.should_delete_remote() {
            info!(
                "Orphaning {} {}/{} (external name {:?})",
                T::NAME,
                namespace,
                name,
                mr.external_name()
            );
            self.remove_finalizer(mr).await?;
            return Ok(Action::await_change());
        }

        if !mr.is_deleting() && !mr.has_finalizer() {
            self.add_finalizer(mr).await?;
        }

        let gitlab = self.connector.connect(&spec).await?;
        let client = TranslatedClient::<T>::new(ExternalContext {
            gitlab,
            secrets: SecretResolver::new(self.cluster.clone(), self.http.clone()),
            namespace: namespace.clone(),
        });

        let observed = client.observe(mr).await;
        self.count(T::NAME, "observe", &observed);
        let observation = observed?;
        debug!(
            "Observed {} {}/{}: exists={} up_to_date={} late_initialized={}",
            T::NAME,
            namespace,
            name,
            observation.resource_exists,
            observation.resource_up_to_date,
            observation.resource_late_initialized
        );

        if mr.is_deleting() {
            if observation.resource_exists {
                let deleted = client.delete(mr).await;
                self.count(T::NAME, "delete", &deleted);
                deleted?;
                info!("Deleted {} {}/{} ({})", T::NAME, namespace, name, mr.external_name());
                self.write_status(&original, mr).await?;
                return Ok(Action::requeue(SHORT_REQUEUE));
            }
            info!("{} {}/{} is gone, releasing finalizer", T::NAME, namespace, name);
            self.remove_finalizer(mr).await?;
            return Ok(Action::await_change());
        }

        self.publish(mr, &observation.connection_details).await?;

        if !observation.resource_exists {
            if !spec.allows(ManagementAction::Create) {
                debug!("{} {}/{} does not exist and Create is not allowed", T::NAME, namespace, name);
                mr.set_condition(Condition::unavailable());
                return self.finish(&original, mr).await;
            }

            let created = client.create(mr).await;
            self.count(T::NAME, "create", &created);
            let creation = created?;
            self.persist_external_name(mr).await?;
            info!(
                "Created {} {}/{} with external name {}",
                T::NAME,
                namespace,
                name,
                creation.external_name
            );
            self.publish(mr, &creation.connection_details).await?;
            mr.set_condition(Condition::reconcile_success());
            self.write_status(&original, mr).await?;
            return Ok(Action::requeue(SHORT_REQUEUE));
        }

        if observation.resource_late_initialized {
            debug!("Persisting late-initialized spec of {} {}/{}", T::NAME, namespace, name);
            self.persist_spec(mr).await?;
        }

        if !observation.resource_up_to_date {
            if spec.allows(ManagementAction::Update) {
                let bound = mr.external_name().to_string();
                let updated = client.update(mr).await;
                self.count(T::NAME, "update", &updated);
                let update = updated?;
                if mr.external_name() != bound {
                    self.persist_external_name(mr).await?;
                }
                info!("Updated {} {}/{} ({})", T::NAME, namespace, name, mr.external_name());
                self.publish(mr, &update.connection_details).await?;
            } else {
                debug!("{} {}/{} has drifted but Update is not allowed", T::NAME, namespace, name);
            }
        }

        client.disconnect().await;
        self.finish(&original, mr).await
    }

    async fn finish<K: ManagedResource>(&self, original: &K, mr: &mut K) -> Result<Action, ControllerError> {
        mr.set_condition(Condition::reconcile_success());
        self.write_status(original, mr).await?;
        Ok(Action::requeue(self.poll_interval))
    }

    fn count<T>(&self, kind: &str, operation: &str, result: &Result<T, ControllerError>) {
        let label = match result {
            Ok(_) => "success",
            Err(e) => e.label(),
        };
        self.metrics.external_operation(kind, operation, label);
    }

    async fn publish<K: ManagedResource>(&self, mr: &K, details: &ConnectionDetails) -> Result<(), ControllerError> {
        connection::publish(self.cluster.as_ref(), mr, details).await
    }

    /// Write the status subresource if it differs from `original`
    async fn write_status<K: ManagedResource>(&self, original: &K, mr: &K) -> Result<(), ControllerError> {
        let before = serde_json::to_value(original.managed_status()).unwrap_or_default();
        let after = serde_json::to_value(mr.managed_status()).unwrap_or_default();
        if before == after {
            return Ok(());
        }
        let patch = serde_json::json!({ "status": after });
        self.cluster
            .patch_object_status(
                &ApiResource::erase::<K>(&()),
                &mr.namespace().unwrap_or_default(),
                &mr.name_any(),
                &patch,
            )
            .await
    }

    async fn patch<K: ManagedResource>(&self, mr: &K, patch: serde_json::Value) -> Result<(), ControllerError> {
        self.cluster
            .patch_object(
                &ApiResource::erase::<K>(&()),
                &mr.namespace().unwrap_or_default(),
                &mr.name_any(),
                &patch,
            )
            .await
    }

    async fn add_finalizer<K: ManagedResource>(&self, mr: &mut K) -> Result<(), ControllerError> {
        let finalizers = mr.finalizers_mut();
        finalizers.push(FINALIZER.to_string());
        let patch = serde_json::json!({ "metadata": { "finalizers": finalizers.clone() } });
        debug!("Adding finalizer to {}", mr.name_any());
        self.patch(mr, patch).await
    }

    async fn remove_finalizer<K: ManagedResource>(&self, mr: &mut K) -> Result<(), ControllerError> {
        let finalizers = mr.finalizers_mut();
        finalizers.retain(|f| f != FINALIZER);
        let patch = serde_json::json!({ "metadata": { "finalizers": finalizers.clone() } });
        debug!("Removing finalizer from {}", mr.name_any());
        self.patch(mr, patch).await
    }

    async fn persist_external_name<K: ManagedResource>(&self, mr: &K) -> Result<(), ControllerError> {
        let patch = serde_json::json!({
            "metadata": { "annotations": { crds::EXTERNAL_NAME_ANNOTATION: mr.external_name() } }
        });
        self.patch(mr, patch).await
    }

    async fn persist_spec<K: ManagedResource>(&self, mr: &K) -> Result<(), ControllerError> {
        let patch = serde_json::json!({ "spec": { "forProvider": mr.for_provider() } });
        self.patch(mr, patch).await
    }
}
