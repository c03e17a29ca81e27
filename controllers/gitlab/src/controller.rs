//! Main controller implementation.
//!
//! Builds the shared [`Reconciler`] and starts one watcher per managed kind:
//!
//! - projects: Project, ProjectMember, ProjectVariable, ProjectDeployToken,
//!   ProjectAccessToken, ProjectHook, ProjectDeployKey, PipelineSchedule,
//!   ProjectApprovalRule, Runner, MattermostIntegration
//! - groups: Group, GroupMember, GroupVariable, GroupDeployToken,
//!   GroupAccessToken, GroupLdapLink, GroupSamlLink
//! - instance: License, ApplicationSettings

use crate::cluster::KubeCluster;
use crate::config::ControllerConfig;
use crate::connector::{Connector, HttpClientFactory};
use crate::error::ControllerError;
use crate::managed::translator::Translator;
use crate::metrics::Metrics;
use crate::reconciler::Reconciler;
use crate::reconciler::groups::{
    GroupAccessTokenTranslator, GroupDeployTokenTranslator, GroupLdapLinkTranslator, GroupMemberTranslator,
    GroupSamlLinkTranslator, GroupTranslator, GroupVariableTranslator,
};
use crate::reconciler::instance::{ApplicationSettingsTranslator, LicenseTranslator};
use crate::reconciler::projects::{
    MattermostTranslator, PipelineScheduleTranslator, ProjectAccessTokenTranslator, ProjectApprovalRuleTranslator,
    ProjectDeployKeyTranslator, ProjectDeployTokenTranslator, ProjectHookTranslator, ProjectMemberTranslator,
    ProjectTranslator, ProjectVariableTranslator, RunnerTranslator,
};
use crate::watcher::{WatchSettings, watch_resource};
use futures::future::select_all;
use kube::Client;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

type WatcherHandle = (&'static str, JoinHandle<Result<(), ControllerError>>);

/// Main controller for GitLab managed resources.
pub struct Controller {
    watchers: Vec<WatcherHandle>,
}

impl Controller {
    /// Connects to the cluster and starts every watcher.
    pub async fn new(config: &ControllerConfig, metrics: Metrics) -> Result<Self, ControllerError> {
        info!("Initializing GitLab provider controller");

        let kube_client = Client::try_default().await?;
        let cluster = Arc::new(KubeCluster::new(kube_client.clone()));
        let factory = Arc::new(HttpClientFactory::new(config.http_timeout, config.max_retries));
        let connector = Connector::new(cluster.clone(), factory, config.injected_token.clone());

        // Value endpoints (license URLs) share the GitLab timeout
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ControllerError::InvalidConfig(format!("cannot build HTTP client: {}", e)))?;

        let reconciler = Arc::new(Reconciler::new(connector, cluster, http, metrics, config.poll_interval));
        let settings = WatchSettings {
            namespace: config.watch_namespace.clone(),
            concurrency: config.max_concurrent_reconciles,
        };

        let spawner = Spawner {
            client: kube_client,
            reconciler,
            settings,
        };
        let watchers = vec![
            spawner.spawn::<ProjectTranslator>(),
            spawner.spawn::<ProjectMemberTranslator>(),
            spawner.spawn::<ProjectVariableTranslator>(),
            spawner.spawn::<ProjectDeployTokenTranslator>(),
            spawner.spawn::<ProjectAccessTokenTranslator>(),
            spawner.spawn::<ProjectHookTranslator>(),
            spawner.spawn::<ProjectDeployKeyTranslator>(),
            spawner.spawn::<PipelineScheduleTranslator>(),
            spawner.spawn::<ProjectApprovalRuleTranslator>(),
            spawner.spawn::<RunnerTranslator>(),
            spawner.spawn::<MattermostTranslator>(),
            spawner.spawn::<GroupTranslator>(),
            spawner.spawn::<GroupMemberTranslator>(),
            spawner.spawn::<GroupVariableTranslator>(),
            spawner.spawn::<GroupDeployTokenTranslator>(),
            spawner.spawn::<GroupAccessTokenTranslator>(),
            spawner.spawn::<GroupLdapLinkTranslator>(),
            spawner.spawn::<GroupSamlLinkTranslator>(),
            spawner.spawn::<LicenseTranslator>(),
            spawner.spawn::<ApplicationSettingsTranslator>(),
        ];
        info!("Started {} watchers", watchers.len());

        Ok(Self { watchers })
    }

    /// Runs the controller until a watcher exits.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("GitLab provider controller running");

        let (names, handles): (Vec<_>, Vec<_>) = self.watchers.into_iter().unzip();
        let (result, index, remaining) = select_all(handles).await;
        let name = names.get(index).copied().unwrap_or("unknown");
        for handle in remaining {
            handle.abort();
        }

        match result {
            Ok(Ok(())) => {
                info!("{} watcher stopped, shutting down", name);
                Ok(())
            }
            Ok(Err(e)) => {
                error!("{} watcher failed: {}", name, e);
                Err(ControllerError::Watch(format!("{} watcher error: {}", name, e)))
            }
            Err(e) => Err(ControllerError::Watch(format!("{} watcher panicked: {}", name, e))),
        }
    }
}

/// Spawns watchers that share one client, reconciler and settings
struct Spawner {
    client: Client,
    reconciler: Arc<Reconciler>,
    settings: WatchSettings,
}

impl Spawner {
    fn spawn<T: Translator>(&self) -> WatcherHandle {
        let client = self.client.clone();
        let reconciler = self.reconciler.clone();
        let settings = self.settings.clone();
        let handle = tokio::spawn(async move { watch_resource::<T>(client, reconciler, settings).await });
        (T::NAME, handle)
    }
}
