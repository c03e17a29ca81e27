//! Connector: from a managed object to an authenticated GitLab client
//!
//! Follows `spec.providerConfigRef` to a ProviderConfig, loads the credential
//! it names and returns a client bound to the configured base URL.

use crate::cluster::ClusterClient;
use crate::error::ControllerError;
use crds::{CredentialsSource, ProviderConfig, ResourceSpec};
use gitlab_client::{GitLabClient, GitLabClientTrait, RetryPolicy};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

/// Builds GitLab clients for a base URL and token
pub trait ClientFactory: Send + Sync {
    fn build(&self, base_url: &str, token: Option<String>) -> Result<Arc<dyn GitLabClientTrait>, ControllerError>;
}

/// [`ClientFactory`] producing HTTP clients, reused per base URL and token
pub struct HttpClientFactory {
    timeout: Duration,
    retry: RetryPolicy,
    clients: Mutex<HashMap<(String, Option<String>), Arc<dyn GitLabClientTrait>>>,
}

impl HttpClientFactory {
    pub fn new(timeout: Duration, max_retries: u32) -> Self {
        Self {
            timeout,
            retry: RetryPolicy {
                max_retries,
                ..RetryPolicy::default()
            },
            clients: Mutex::new(HashMap::new()),
        }
    }
}

impl ClientFactory for HttpClientFactory {
    fn build(&self, base_url: &str, token: Option<String>) -> Result<Arc<dyn GitLabClientTrait>, ControllerError> {
        let key = (base_url.to_string(), token.clone());
        let mut clients = match self.clients.lock() {
            Ok(clients) => clients,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(client) = clients.get(&key) {
            return Ok(client.clone());
        }

        info!("Creating GitLab client for {}", base_url);
        let client = GitLabClient::new(base_url.to_string(), token, self.timeout, self.retry.clone())
            .map_err(|e| ControllerError::InvalidConfig(format!("cannot build GitLab client for {}: {}", base_url, e)))?;
        let client: Arc<dyn GitLabClientTrait> = Arc::new(client);
        clients.insert(key, client.clone());
        Ok(client)
    }
}

/// Resolves provider configuration and credentials for managed objects
#[derive(Clone)]
pub struct Connector {
    cluster: Arc<dyn ClusterClient>,
    factory: Arc<dyn ClientFactory>,
    /// Token for `InjectedIdentity` provider configs
    injected_token: Option<String>,
}

impl Connector {
    pub fn new(
        cluster: Arc<dyn ClusterClient>,
        factory: Arc<dyn ClientFactory>,
        injected_token: Option<String>,
    ) -> Self {
        Self {
            cluster,
            factory,
            injected_token,
        }
    }

    /// Build a GitLab client for the object's provider config
    pub async fn connect(&self, spec: &ResourceSpec) -> Result<Arc<dyn GitLabClientTrait>, ControllerError> {
        let name = &spec.provider_config_ref.name;
        let config = self
            .cluster
            .get_provider_config(name)
            .await?
            .ok_or_else(|| ControllerError::MissingProviderConfig(name.clone()))?;

        let token = self.token(&config).await?;
        debug!("Connecting to {} via ProviderConfig {}", config.spec.base_url, name);
        self.factory.build(&config.spec.base_url, token)
    }

    async fn token(&self, config: &ProviderConfig) -> Result<Option<String>, ControllerError> {
        let credentials = &config.spec.credentials;
        match credentials.source {
            CredentialsSource::None => Ok(None),
            CredentialsSource::InjectedIdentity => self
                .injected_token
                .clone()
                .map(Some)
                .ok_or_else(|| ControllerError::CredentialUnavailable("GITLAB_TOKEN is not set".to_string())),
            CredentialsSource::Secret => {
                let reference = credentials.secret_ref.as_ref().ok_or_else(|| {
                    ControllerError::CredentialUnavailable("credentials.secretRef is required for source Secret".to_string())
                })?;
                let data = self
                    .cluster
                    .get_secret(&reference.namespace, &reference.name)
                    .await?
                    .ok_or_else(|| {
                        ControllerError::CredentialUnavailable(format!(
                            "secret {}/{} not found",
                            reference.namespace, reference.name
                        ))
                    })?;
                let token = data.get(&reference.key).ok_or_else(|| {
                    ControllerError::CredentialUnavailable(format!(
                        "secret {}/{} has no key {}",
                        reference.namespace, reference.name, reference.key
                    ))
                })?;
                let token = String::from_utf8(token.clone())
                    .map_err(|_| ControllerError::CredentialUnavailable("token is not valid UTF-8".to_string()))?;
                Ok(Some(token.trim().to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakeCluster, MockClientFactory, provider_config};
    use gitlab_client::MockGitLabClient;

    fn connector(cluster: Arc<FakeCluster>, injected: Option<&str>) -> (Connector, Arc<MockClientFactory>) {
        let factory = Arc::new(MockClientFactory::new(MockGitLabClient::new()));
        (
            Connector::new(cluster, factory.clone(), injected.map(str::to_string)),
            factory,
        )
    }

    #[tokio::test]
    async fn test_connect_with_secret_credentials() {
        let cluster = Arc::new(FakeCluster::new());
        cluster.put_provider_config(provider_config("default", CredentialsSource::Secret));
        cluster.put_secret("crossplane-system", "gitlab-creds", &[("token", "glpat-secret\n")]);
        let (connector, factory) = connector(cluster, None);

        connector.connect(&ResourceSpec::default()).await.unwrap();
        assert_eq!(
            factory.requests(),
            vec![("https://gitlab.example.com".to_string(), Some("glpat-secret".to_string()))]
        );
    }

    #[tokio::test]
    async fn test_missing_provider_config() {
        let cluster = Arc::new(FakeCluster::new());
        let (connector, _) = connector(cluster, None);
        let err = connector.connect(&ResourceSpec::default()).await.err().unwrap();
        assert!(matches!(err, ControllerError::MissingProviderConfig(name) if name == "default"));
    }

    #[tokio::test]
    async fn test_missing_credential_key() {
        let cluster = Arc::new(FakeCluster::new());
        cluster.put_provider_config(provider_config("default", CredentialsSource::Secret));
        cluster.put_secret("crossplane-system", "gitlab-creds", &[("password", "x")]);
        let (connector, _) = connector(cluster, None);
        let err = connector.connect(&ResourceSpec::default()).await.err().unwrap();
        assert!(matches!(err, ControllerError::CredentialUnavailable(_)));
    }

    #[tokio::test]
    async fn test_injected_identity_and_anonymous() {
        let cluster = Arc::new(FakeCluster::new());
        cluster.put_provider_config(provider_config("injected", CredentialsSource::InjectedIdentity));
        cluster.put_provider_config(provider_config("anonymous", CredentialsSource::None));
        let (connector, factory) = connector(cluster.clone(), Some("glpat-env"));

        let mut spec = ResourceSpec::default();
        spec.provider_config_ref.name = "injected".to_string();
        connector.connect(&spec).await.unwrap();
        spec.provider_config_ref.name = "anonymous".to_string();
        connector.connect(&spec).await.unwrap();

        let tokens: Vec<Option<String>> = factory.requests().into_iter().map(|(_, t)| t).collect();
        assert_eq!(tokens, vec![Some("glpat-env".to_string()), None]);

        let (without_env, _) = self::connector(cluster, None);
        spec.provider_config_ref.name = "injected".to_string();
        assert!(matches!(
            without_env.connect(&spec).await.err().unwrap(),
            ControllerError::CredentialUnavailable(_)
        ));
    }
}
