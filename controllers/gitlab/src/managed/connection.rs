//! Connection-detail publisher
//!
//! Writes outputs (tokens, keys, license bodies) into the secret named by
//! `spec.writeConnectionSecretToRef`.

use crate::cluster::{ClusterClient, ConnectionDetails};
use crate::error::ControllerError;
use crds::ManagedResource;
use kube::ResourceExt;
use tracing::{debug, info};

/// Publish `details` for `mr`; a no-op without details or without a sink.
///
/// The secret namespace defaults to the object's namespace. An owner
/// reference is only set when both live in the same namespace.
pub async fn publish<K: ManagedResource>(
    cluster: &dyn ClusterClient,
    mr: &K,
    details: &ConnectionDetails,
) -> Result<(), ControllerError> {
    if details.is_empty() {
        return Ok(());
    }
    let Some(sink) = &mr.resource_spec().write_connection_secret_to_ref else {
        debug!(
            "No connection secret configured for {}, dropping {} detail(s)",
            mr.name_any(),
            details.len()
        );
        return Ok(());
    };

    let object_namespace = mr.namespace().unwrap_or_default();
    let namespace = sink.namespace.clone().unwrap_or_else(|| object_namespace.clone());
    let owner = if namespace == object_namespace {
        mr.controller_owner_ref(&())
    } else {
        None
    };

    cluster
        .apply_secret(&namespace, &sink.name, details, owner)
        .await
        .map_err(|e| {
            ControllerError::SecretIo(format!(
                "cannot publish connection details to {}/{}: {}",
                namespace, sink.name, e
            ))
        })?;
    info!(
        "Published connection details for {} to secret {}/{}",
        mr.name_any(),
        namespace,
        sink.name
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakeCluster, runner};
    use crds::SecretReference;

    fn details() -> ConnectionDetails {
        ConnectionDetails::from([("token".to_string(), b"glrt-abc".to_vec())])
    }

    #[tokio::test]
    async fn test_publish_defaults_namespace_and_sets_owner() {
        let cluster = FakeCluster::new();
        let mut mr = runner("ci", "team-a");
        mr.spec.resource_spec.write_connection_secret_to_ref = Some(SecretReference {
            name: "runner-token".to_string(),
            namespace: None,
        });

        publish(&cluster, &mr, &details()).await.unwrap();

        let secret = cluster.secret("team-a", "runner-token").unwrap();
        assert_eq!(secret.data.get("token").unwrap(), b"glrt-abc");
        assert_eq!(secret.owner.unwrap().name, "ci");
    }

    #[tokio::test]
    async fn test_publish_to_other_namespace_has_no_owner() {
        let cluster = FakeCluster::new();
        let mut mr = runner("ci", "team-a");
        mr.spec.resource_spec.write_connection_secret_to_ref = Some(SecretReference {
            name: "runner-token".to_string(),
            namespace: Some("shared".to_string()),
        });

        publish(&cluster, &mr, &details()).await.unwrap();
        assert!(cluster.secret("shared", "runner-token").unwrap().owner.is_none());
    }

    #[tokio::test]
    async fn test_publish_without_sink_or_details_is_noop() {
        let cluster = FakeCluster::new();
        let mr = runner("ci", "team-a");
        publish(&cluster, &mr, &details()).await.unwrap();
        publish(&cluster, &mr, &ConnectionDetails::new()).await.unwrap();
        assert_eq!(cluster.secret_writes(), 0);
    }
}
