//! Inbound secret plumbing
//!
//! Resolves values declared as an inline string, a secret key, or a remote
//! endpoint (license bodies, webhook URLs, hook tokens, variable values).

use crate::cluster::ClusterClient;
use crate::error::ControllerError;
use crds::{EndpointSource, SecretKeySelector, SecretReference, ValueSource};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Reads secret-backed values on behalf of a managed object
#[derive(Clone)]
pub struct SecretResolver {
    cluster: Arc<dyn ClusterClient>,
    http: reqwest::Client,
}

impl SecretResolver {
    pub fn new(cluster: Arc<dyn ClusterClient>, http: reqwest::Client) -> Self {
        Self { cluster, http }
    }

    /// Read one key of a secret, defaulting the namespace to `default_namespace`
    pub async fn key(
        &self,
        selector: &SecretKeySelector,
        default_namespace: &str,
    ) -> Result<String, ControllerError> {
        let namespace = selector.namespace.as_deref().unwrap_or(default_namespace);
        let data = self
            .cluster
            .get_secret(namespace, &selector.name)
            .await?
            .ok_or_else(|| {
                ControllerError::SecretIo(format!("secret {}/{} not found", namespace, selector.name))
            })?;
        let value = data.get(&selector.key).ok_or_else(|| {
            ControllerError::SecretIo(format!(
                "secret {}/{} has no key {}",
                namespace, selector.name, selector.key
            ))
        })?;
        String::from_utf8(value.clone()).map_err(|_| {
            ControllerError::SecretIo(format!(
                "key {} of secret {}/{} is not valid UTF-8",
                selector.key, namespace, selector.name
            ))
        })
    }

    /// Resolve a value source; exactly one source must be set
    pub async fn resolve(
        &self,
        source: &ValueSource,
        default_namespace: &str,
    ) -> Result<String, ControllerError> {
        let count = source.source_count();
        if count != 1 {
            return Err(ControllerError::NoSource(count));
        }

        if let Some(value) = &source.value {
            return Ok(value.clone());
        }
        if let Some(selector) = &source.secret_ref {
            return self.key(selector, default_namespace).await;
        }
        match &source.endpoint {
            Some(endpoint) => self.fetch(endpoint, default_namespace).await,
            None => Err(ControllerError::NoSource(0)),
        }
    }

    /// Either an inline value or a secret key, used by fields such as
    /// `value`/`valueSecretRef` that predate [`ValueSource`]
    pub async fn inline_or_key(
        &self,
        value: Option<&String>,
        selector: Option<&SecretKeySelector>,
        default_namespace: &str,
    ) -> Result<Option<String>, ControllerError> {
        match (value, selector) {
            (Some(_), Some(_)) => Err(ControllerError::NoSource(2)),
            (Some(value), None) => Ok(Some(value.clone())),
            (None, Some(selector)) => self.key(selector, default_namespace).await.map(Some),
            (None, None) => Ok(None),
        }
    }

    /// Current contents of the object's connection secret
    pub async fn connection_secret(
        &self,
        reference: &SecretReference,
        default_namespace: &str,
    ) -> Result<BTreeMap<String, Vec<u8>>, ControllerError> {
        let namespace = reference.namespace.as_deref().unwrap_or(default_namespace);
        Ok(self
            .cluster
            .get_secret(namespace, &reference.name)
            .await?
            .unwrap_or_default())
    }

    async fn fetch(&self, endpoint: &EndpointSource, default_namespace: &str) -> Result<String, ControllerError> {
        let fetch_error = |message: String| ControllerError::SourceFetch {
            url: endpoint.url.clone(),
            message,
        };

        let mut request = self.http.get(&endpoint.url);
        if let Some(selector) = &endpoint.bearer_token_secret_ref {
            request = request.bearer_auth(self.key(selector, default_namespace).await?);
        }
        if let Some(basic) = &endpoint.basic_auth {
            let username = self.key(&basic.username_secret_ref, default_namespace).await?;
            let password = self.key(&basic.password_secret_ref, default_namespace).await?;
            request = request.basic_auth(username, Some(password));
        }

        debug!("Fetching value from {}", endpoint.url);
        let response = request.send().await.map_err(|e| fetch_error(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("unexpected status {}", status)));
        }
        response.text().await.map_err(|e| fetch_error(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeCluster;

    fn resolver(cluster: &Arc<FakeCluster>) -> SecretResolver {
        SecretResolver::new(cluster.clone(), reqwest::Client::new())
    }

    fn selector(name: &str, key: &str) -> SecretKeySelector {
        SecretKeySelector {
            name: name.to_string(),
            namespace: None,
            key: key.to_string(),
        }
    }

    #[tokio::test]
    async fn test_resolve_inline_and_secret() {
        let cluster = Arc::new(FakeCluster::new());
        cluster.put_secret("team-a", "license", &[("body", "LICENSE-DATA")]);
        let resolver = resolver(&cluster);

        let inline = ValueSource {
            value: Some("abc".to_string()),
            ..Default::default()
        };
        assert_eq!(resolver.resolve(&inline, "team-a").await.unwrap(), "abc");

        let from_secret = ValueSource {
            secret_ref: Some(selector("license", "body")),
            ..Default::default()
        };
        assert_eq!(resolver.resolve(&from_secret, "team-a").await.unwrap(), "LICENSE-DATA");
    }

    #[tokio::test]
    async fn test_resolve_requires_exactly_one_source() {
        let cluster = Arc::new(FakeCluster::new());
        let resolver = resolver(&cluster);

        let err = resolver.resolve(&ValueSource::default(), "ns").await.unwrap_err();
        assert!(matches!(err, ControllerError::NoSource(0)));

        let both = ValueSource {
            value: Some("abc".to_string()),
            secret_ref: Some(selector("s", "k")),
            endpoint: None,
        };
        let err = resolver.resolve(&both, "ns").await.unwrap_err();
        assert!(matches!(err, ControllerError::NoSource(2)));
    }

    #[tokio::test]
    async fn test_missing_key_is_secret_io() {
        let cluster = Arc::new(FakeCluster::new());
        cluster.put_secret("ns", "hook", &[("other", "x")]);
        let resolver = resolver(&cluster);

        let err = resolver.key(&selector("hook", "token"), "ns").await.unwrap_err();
        assert!(matches!(err, ControllerError::SecretIo(_)));
        let err = resolver.key(&selector("absent", "token"), "ns").await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_source_fetch() {
        let cluster = Arc::new(FakeCluster::new());
        let resolver = resolver(&cluster);
        let source = ValueSource {
            endpoint: Some(EndpointSource {
                url: "http://127.0.0.1:9/license".to_string(),
                bearer_token_secret_ref: None,
                basic_auth: None,
            }),
            ..Default::default()
        };
        let err = resolver.resolve(&source, "ns").await.unwrap_err();
        assert!(matches!(err, ControllerError::SourceFetch { .. }));
    }
}
