//! Kubernetes resource watchers.
//!
//! One `kube_runtime::Controller` per managed kind, all driven by the generic
//! [`watch_resource`] helper. The controller handles reconnection, debouncing
//! and per-object serialization; [`Reconciler`] handles one object at a time.

use crate::error::ControllerError;
use crate::managed::translator::Translator;
use crate::reconciler::Reconciler;
use futures::StreamExt;
use kube::{Api, Client};
use kube_runtime::controller::{Action, Config as ControllerConfig};
use kube_runtime::{Controller, watcher};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Where and how hard to watch
#[derive(Debug, Clone)]
pub struct WatchSettings {
    /// `None` watches every namespace
    pub namespace: Option<String>,
    /// Concurrent reconciles per kind
    pub concurrency: u16,
}

/// Watch every object of the translator's kind and reconcile it until the
/// stream ends.
///
/// Failed reconciles are requeued with the per-object Fibonacci backoff;
/// successful ones return their own requeue action (poll interval, short
/// requeue after create/delete, or await change).
pub async fn watch_resource<T: Translator>(
    client: Client,
    reconciler: Arc<Reconciler>,
    settings: WatchSettings,
) -> Result<(), ControllerError> {
    let api: Api<T::Kind> = match &settings.namespace {
        Some(namespace) => Api::namespaced(client, namespace),
        None => Api::all(client),
    };
    info!(
        "Starting {} watcher in {}",
        T::NAME,
        settings.namespace.as_deref().unwrap_or("all namespaces")
    );

    let error_policy = |obj: Arc<T::Kind>, error: &ControllerError, ctx: Arc<Reconciler>| {
        let delay = ctx.error_requeue(obj.as_ref());
        debug!(
            "Requeueing {} in {}s after error: {}",
            Reconciler::object_key(obj.as_ref()),
            delay.as_secs(),
            error
        );
        Action::requeue(delay)
    };

    let reconcile = |obj: Arc<T::Kind>, ctx: Arc<Reconciler>| async move { ctx.reconcile::<T>(obj).await };

    // Debounce batches the status and annotation patches written by a reconcile
    let controller_config = ControllerConfig::default()
        .debounce(Duration::from_secs(1))
        .concurrency(settings.concurrency);

    Controller::new(api, watcher::Config::default())
        .with_config(controller_config)
        .shutdown_on_signal()
        .run(reconcile, error_policy, reconciler)
        .for_each(|res| async move {
            match res {
                Ok((obj, _)) => debug!("Reconciled {} {}", T::NAME, obj.name),
                Err(kube_runtime::controller::Error::ReconcilerFailed(..)) => {}
                Err(e) => error!("{} controller error: {}", T::NAME, e),
            }
        })
        .await;

    info!("{} watcher stopped", T::NAME);
    Ok(())
}
