//! GitLab Provider Controller
//!
//! Reconciles GitLab projects, groups and instance settings declared as
//! Kubernetes managed resources. Each object is observed against the GitLab
//! API and created, updated or deleted until the remote entity matches its
//! `spec.forProvider`.

mod backoff;
mod cluster;
mod config;
mod connector;
mod controller;
mod error;
mod managed;
mod metrics;
mod reconcile_helpers;
#[cfg(test)]
mod reconcile_helpers_test;
mod reconciler;
mod secret_source;
#[cfg(test)]
mod test_utils;
mod watcher;

use crate::config::{ControllerConfig, LogFormat};
use crate::error::ControllerError;
use crate::metrics::Metrics;
use controller::Controller;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    // Both kube and reqwest use rustls; pick the provider before either builds a client
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        eprintln!("rustls crypto provider was already installed");
    }

    let config = ControllerConfig::from_env()?;
    init_tracing(config.log_format);

    info!("Starting GitLab provider controller");
    info!("Configuration:");
    info!(
        "  Namespace: {}",
        config.watch_namespace.as_deref().unwrap_or("all namespaces")
    );
    info!("  Poll interval: {}s", config.poll_interval.as_secs());
    info!("  Max concurrent reconciles: {}", config.max_concurrent_reconciles);
    info!("  Metrics address: {}", config.metrics_addr);
    info!("  GitLab HTTP timeout: {}s", config.http_timeout.as_secs());
    info!("  GitLab max retries: {}", config.max_retries);

    let metrics = Metrics::new()?;
    let server = tokio::spawn(metrics::serve(config.metrics_addr, metrics.clone()));

    let controller = Controller::new(&config, metrics.clone()).await?;
    metrics.set_ready();

    tokio::select! {
        result = controller.run() => result,
        result = server => {
            let result = result.map_err(|e| ControllerError::Watch(format!("metrics server panicked: {}", e)))?;
            if let Err(e) = &result {
                error!("Metrics server failed: {}", e);
            }
            result
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
