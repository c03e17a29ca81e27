//! Cluster-side operations used during a reconcile
//!
//! The [`ClusterClient`] trait abstracts the Kubernetes API so that the
//! reconcile state machine can be exercised against an in-memory fake.

use crate::error::ControllerError;
use async_trait::async_trait;
use crds::ProviderConfig;
use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::api::{ApiResource, DynamicObject, Patch, PatchParams, PostParams};
use kube::{Api, Client};
use std::collections::BTreeMap;
use tracing::debug;

/// Key/value outputs written to a connection secret
pub type ConnectionDetails = BTreeMap<String, Vec<u8>>;

/// Cluster operations the reconciler needs
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Cluster-scoped ProviderConfig; `None` if it does not exist
    async fn get_provider_config(&self, name: &str) -> Result<Option<ProviderConfig>, ControllerError>;

    /// Secret data; `None` if the secret does not exist
    async fn get_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, Vec<u8>>>, ControllerError>;

    /// Create the secret or merge `data` into it
    async fn apply_secret(
        &self,
        namespace: &str,
        name: &str,
        data: &ConnectionDetails,
        owner: Option<OwnerReference>,
    ) -> Result<(), ControllerError>;

    /// Merge-patch a managed object (metadata and spec)
    async fn patch_object(
        &self,
        resource: &ApiResource,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<(), ControllerError>;

    /// Merge-patch the status subresource of a managed object
    async fn patch_object_status(
        &self,
        resource: &ApiResource,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<(), ControllerError>;
}

/// [`ClusterClient`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterClient for KubeCluster {
    async fn get_provider_config(&self, name: &str) -> Result<Option<ProviderConfig>, ControllerError> {
        let api: Api<ProviderConfig> = Api::all(self.client.clone());
        Ok(api.get_opt(name).await?)
    }

    async fn get_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, Vec<u8>>>, ControllerError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = api.get_opt(name).await?;
        Ok(secret.map(|s| {
            s.data
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| (k, v.0))
                .collect()
        }))
    }

    async fn apply_secret(
        &self,
        namespace: &str,
        name: &str,
        data: &ConnectionDetails,
        owner: Option<OwnerReference>,
    ) -> Result<(), ControllerError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let encoded: BTreeMap<String, ByteString> = data
            .iter()
            .map(|(k, v)| (k.clone(), ByteString(v.clone())))
            .collect();

        match api.get_opt(name).await? {
            None => {
                debug!("Creating connection secret {}/{}", namespace, name);
                let secret = Secret {
                    metadata: ObjectMeta {
                        name: Some(name.to_string()),
                        namespace: Some(namespace.to_string()),
                        owner_references: owner.map(|o| vec![o]),
                        ..Default::default()
                    },
                    data: Some(encoded),
                    type_: Some("Opaque".to_string()),
                    ..Default::default()
                };
                api.create(&PostParams::default(), &secret).await?;
            }
            Some(existing) => {
                let current = existing.data.unwrap_or_default();
                if encoded.iter().all(|(k, v)| current.get(k) == Some(v)) {
                    return Ok(());
                }
                debug!("Updating connection secret {}/{}", namespace, name);
                let patch = serde_json::json!({ "data": encoded });
                api.patch(name, &PatchParams::default(), &Patch::Merge(&patch)).await?;
            }
        }
        Ok(())
    }

    async fn patch_object(
        &self,
        resource: &ApiResource,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<(), ControllerError> {
        let api: Api<DynamicObject> = Api::namespaced_with(self.client.clone(), namespace, resource);
        api.patch(name, &PatchParams::default(), &Patch::Merge(patch)).await?;
        Ok(())
    }

    async fn patch_object_status(
        &self,
        resource: &ApiResource,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<(), ControllerError> {
        let api: Api<DynamicObject> = Api::namespaced_with(self.client.clone(), namespace, resource);
        api.patch_status(name, &PatchParams::default(), &Patch::Merge(patch)).await?;
        Ok(())
    }
}
