//! Test utilities for unit testing reconcilers
//!
//! Provides an in-memory cluster, a client factory handing out a shared
//! `MockGitLabClient`, builders for managed objects and a harness that runs
//! reconciles and applies the resulting patches back onto the object, the
//! way the API server would.

use crate::cluster::{ClusterClient, ConnectionDetails};
use crate::connector::{ClientFactory, Connector};
use crate::error::ControllerError;
use crate::managed::translator::Translator;
use crate::metrics::Metrics;
use crate::reconciler::Reconciler;
use async_trait::async_trait;
use crds::*;
use gitlab_client::{GitLabClientTrait, MockGitLabClient};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::ApiResource;
use kube_runtime::controller::Action;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A secret as stored by [`FakeCluster`]
#[derive(Debug, Clone, Default)]
pub struct StoredSecret {
    pub data: BTreeMap<String, Vec<u8>>,
    pub owner: Option<OwnerReference>,
}

/// A merge patch sent to a managed object
#[derive(Debug, Clone)]
pub struct RecordedPatch {
    pub kind: String,
    pub name: String,
    pub status: bool,
    pub patch: serde_json::Value,
}

/// In-memory [`ClusterClient`]
#[derive(Default)]
pub struct FakeCluster {
    secrets: Mutex<HashMap<(String, String), StoredSecret>>,
    provider_configs: Mutex<HashMap<String, ProviderConfig>>,
    secret_writes: Mutex<usize>,
    patches: Mutex<Vec<RecordedPatch>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_secret(&self, namespace: &str, name: &str, data: &[(&str, &str)]) {
        let data = data
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
            .collect();
        self.secrets.lock().unwrap().insert(
            (namespace.to_string(), name.to_string()),
            StoredSecret { data, owner: None },
        );
    }

    pub fn put_provider_config(&self, config: ProviderConfig) {
        let name = kube::ResourceExt::name_any(&config);
        self.provider_configs.lock().unwrap().insert(name, config);
    }

    pub fn secret(&self, namespace: &str, name: &str) -> Option<StoredSecret> {
        self.secrets
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    /// Connection secret value as a string
    pub fn secret_value(&self, namespace: &str, name: &str, key: &str) -> Option<String> {
        self.secret(namespace, name)
            .and_then(|s| s.data.get(key).cloned())
            .map(|v| String::from_utf8(v).unwrap())
    }

    /// Number of connection secret creates and updates
    pub fn secret_writes(&self) -> usize {
        *self.secret_writes.lock().unwrap()
    }

    pub fn patches(&self) -> Vec<RecordedPatch> {
        self.patches.lock().unwrap().clone()
    }

    pub fn take_patches(&self) -> Vec<RecordedPatch> {
        std::mem::take(&mut *self.patches.lock().unwrap())
    }

    fn record(&self, resource: &ApiResource, name: &str, status: bool, patch: &serde_json::Value) {
        self.patches.lock().unwrap().push(RecordedPatch {
            kind: resource.kind.clone(),
            name: name.to_string(),
            status,
            patch: patch.clone(),
        });
    }
}

#[async_trait]
impl ClusterClient for FakeCluster {
    async fn get_provider_config(&self, name: &str) -> Result<Option<ProviderConfig>, ControllerError> {
        Ok(self.provider_configs.lock().unwrap().get(name).cloned())
    }

    async fn get_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, Vec<u8>>>, ControllerError> {
        Ok(self.secret(namespace, name).map(|s| s.data))
    }

    async fn apply_secret(
        &self,
        namespace: &str,
        name: &str,
        data: &ConnectionDetails,
        owner: Option<OwnerReference>,
    ) -> Result<(), ControllerError> {
        let mut secrets = self.secrets.lock().unwrap();
        let key = (namespace.to_string(), name.to_string());
        match secrets.get_mut(&key) {
            Some(existing) => {
                if data.iter().all(|(k, v)| existing.data.get(k) == Some(v)) {
                    return Ok(());
                }
                existing.data.extend(data.clone());
            }
            None => {
                secrets.insert(
                    key,
                    StoredSecret {
                        data: data.clone(),
                        owner,
                    },
                );
            }
        }
        *self.secret_writes.lock().unwrap() += 1;
        Ok(())
    }

    async fn patch_object(
        &self,
        resource: &ApiResource,
        _namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<(), ControllerError> {
        self.record(resource, name, false, patch);
        Ok(())
    }

    async fn patch_object_status(
        &self,
        resource: &ApiResource,
        _namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<(), ControllerError> {
        self.record(resource, name, true, patch);
        Ok(())
    }
}

/// [`ClientFactory`] handing out clones of one `MockGitLabClient`
pub struct MockClientFactory {
    client: MockGitLabClient,
    requests: Mutex<Vec<(String, Option<String>)>>,
}

impl MockClientFactory {
    pub fn new(client: MockGitLabClient) -> Self {
        Self {
            client,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Base URL and token of every client requested so far
    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.requests.lock().unwrap().clone()
    }
}

impl ClientFactory for MockClientFactory {
    fn build(&self, base_url: &str, token: Option<String>) -> Result<Arc<dyn GitLabClientTrait>, ControllerError> {
        self.requests.lock().unwrap().push((base_url.to_string(), token));
        Ok(Arc::new(self.client.clone()))
    }
}

/// ProviderConfig pointing at gitlab.example.com, token in
/// `crossplane-system/gitlab-creds`
pub fn provider_config(name: &str, source: CredentialsSource) -> ProviderConfig {
    ProviderConfig::new(
        name,
        ProviderConfigSpec {
            base_url: "https://gitlab.example.com".to_string(),
            credentials: ProviderCredentials {
                source,
                secret_ref: Some(CredentialsSecretRef {
                    name: "gitlab-creds".to_string(),
                    namespace: "crossplane-system".to_string(),
                    key: "token".to_string(),
                }),
            },
        },
    )
}

/// Build a managed object from its `forProvider` JSON
pub fn managed<K: ManagedResource>(name: &str, namespace: &str, for_provider: serde_json::Value) -> K {
    serde_json::from_value(serde_json::json!({
        "apiVersion": K::api_version(&()),
        "kind": K::kind(&()),
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": format!("uid-{}", name),
        },
        "spec": { "forProvider": for_provider },
    }))
    .unwrap()
}

/// Project runner bound to project 7
pub fn runner(name: &str, namespace: &str) -> Runner {
    managed(
        name,
        namespace,
        serde_json::json!({ "runnerType": "project_type", "projectID": 7 }),
    )
}

/// Point the connection secret of `mr` at `name` in its own namespace
pub fn with_sink<K: ManagedResource>(mr: K, name: &str) -> K {
    patched(mr, &serde_json::json!({ "spec": { "writeConnectionSecretToRef": { "name": name } } }))
}

/// Replace the management policies of `mr`
pub fn with_policies<K: ManagedResource>(mr: K, policies: &[&str]) -> K {
    patched(mr, &serde_json::json!({ "spec": { "managementPolicies": policies } }))
}

/// Bind `mr` to an existing remote entity
pub fn bound<K: ManagedResource>(mut mr: K, external_name: &str) -> K {
    mr.set_external_name(external_name);
    mr
}

/// Request deletion of `mr`, as `kubectl delete` would
pub fn mark_deleted<K: ManagedResource>(mr: K) -> K {
    patched(
        mr,
        &serde_json::json!({ "metadata": { "deletionTimestamp": "2026-01-01T00:00:00Z" } }),
    )
}

/// Apply a JSON merge patch to a typed object
pub fn patched<K: ManagedResource>(mr: K, patch: &serde_json::Value) -> K {
    let mut value = serde_json::to_value(&mr).unwrap();
    merge(&mut value, patch);
    serde_json::from_value(value).unwrap()
}

/// RFC 7386 JSON merge patch
fn merge(target: &mut serde_json::Value, patch: &serde_json::Value) {
    match patch {
        serde_json::Value::Object(fields) => {
            if !target.is_object() {
                *target = serde_json::Value::Object(Default::default());
            }
            if let Some(object) = target.as_object_mut() {
                for (key, value) in fields {
                    if value.is_null() {
                        object.remove(key);
                    } else {
                        merge(object.entry(key.clone()).or_insert(serde_json::Value::Null), value);
                    }
                }
            }
        }
        other => *target = other.clone(),
    }
}

/// The `type` condition of `mr`
pub fn condition<K: ManagedResource>(mr: &K, r#type: ConditionType) -> Option<Condition> {
    mr.managed_status().and_then(|s| s.condition(r#type)).cloned()
}

/// A reconciler wired to a [`FakeCluster`] and a shared `MockGitLabClient`
pub struct Harness {
    pub gitlab: MockGitLabClient,
    pub cluster: Arc<FakeCluster>,
    pub factory: Arc<MockClientFactory>,
    pub reconciler: Reconciler,
}

impl Harness {
    /// Default ProviderConfig with a token secret in place
    pub fn new() -> Self {
        let gitlab = MockGitLabClient::new();
        let cluster = Arc::new(FakeCluster::new());
        cluster.put_provider_config(provider_config("default", CredentialsSource::Secret));
        cluster.put_secret("crossplane-system", "gitlab-creds", &[("token", "glpat-test")]);
        let factory = Arc::new(MockClientFactory::new(gitlab.clone()));

        let reconciler = Reconciler::new(
            Connector::new(cluster.clone(), factory.clone(), None),
            cluster.clone(),
            reqwest::Client::new(),
            Metrics::new().unwrap(),
            Duration::from_secs(60),
        );
        Self {
            gitlab,
            cluster,
            factory,
            reconciler,
        }
    }

    /// Run one reconcile and apply the patches it issued to `mr`
    ///
    /// The patches stay readable through `cluster.patches()` until the next
    /// reconcile.
    pub async fn reconcile<T: Translator>(&self, mr: &mut T::Kind) -> Result<Action, ControllerError> {
        self.cluster.take_patches();
        let result = self.reconciler.reconcile::<T>(Arc::new(mr.clone())).await;
        let name = kube::ResourceExt::name_any(mr);
        for recorded in self.cluster.patches() {
            if recorded.name == name {
                *mr = patched(mr.clone(), &recorded.patch);
            }
        }
        result
    }

    /// Reconcile until the object reports Synced without requeueing early
    pub async fn converge<T: Translator>(&self, mr: &mut T::Kind) -> Action {
        let mut last = self.reconcile::<T>(mr).await.unwrap();
        for _ in 0..3 {
            if last == Action::requeue(Duration::from_secs(60)) {
                break;
            }
            last = self.reconcile::<T>(mr).await.unwrap();
        }
        last
    }
}
