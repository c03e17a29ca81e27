//! Controller-specific error types.
//!
//! Errors raised while connecting to GitLab, driving the managed-resource
//! state machine, or moving secrets in and out of the cluster. Remote errors
//! are wrapped with a fixed per-operation prefix (`cannot get …`,
//! `cannot create …`, `cannot update …`, `cannot delete …`).

use gitlab_client::{ErrorClass, GitLabError};
use kube::Error as KubeError;
use thiserror::Error;

/// Errors that can occur in the GitLab controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// The external-name annotation does not have the shape the kind expects
    #[error("invalid external name {name:?}: {reason}")]
    InvalidExternalName { name: String, reason: String },

    /// A parent identifier (projectID, groupID, ...) is not set
    #[error("{0} is required but not set")]
    MissingParentId(&'static str),

    /// The external-name annotation is empty where a bound resource is required
    #[error("external name is not set")]
    MissingExternalName,

    /// The referenced ProviderConfig does not exist
    #[error("cannot get ProviderConfig {0}")]
    MissingProviderConfig(String),

    /// The ProviderConfig's credentials cannot be loaded
    #[error("credential unavailable: {0}")]
    CredentialUnavailable(String),

    /// A credential-bearing kind has no `writeConnectionSecretToRef`
    #[error("writeConnectionSecretToRef is required for {0}, the generated credential cannot be read back")]
    MissingConnectionSecret(&'static str),

    /// A value source has zero or several sources set
    #[error("exactly one of value, secretRef or endpoint must be set, found {0}")]
    NoSource(usize),

    /// An input secret is missing or a connection secret cannot be written
    #[error("secret error: {0}")]
    SecretIo(String),

    /// A value endpoint could not be fetched
    #[error("cannot fetch {url}: {message}")]
    SourceFetch { url: String, message: String },

    /// A username could not be resolved
    #[error("cannot find user {0}")]
    UnknownUser(String),

    /// Remote lookup failed
    #[error("cannot get {kind}: {source}")]
    Get {
        kind: &'static str,
        #[source]
        source: GitLabError,
    },

    /// Remote create failed
    #[error("cannot create {kind}: {source}")]
    Create {
        kind: &'static str,
        #[source]
        source: GitLabError,
    },

    /// Remote update failed
    #[error("cannot update {kind}: {source}")]
    Update {
        kind: &'static str,
        #[source]
        source: GitLabError,
    },

    /// Remote delete failed
    #[error("cannot delete {kind}: {source}")]
    Delete {
        kind: &'static str,
        #[source]
        source: GitLabError,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),

    /// Metric registration failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Metrics server I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ControllerError {
    /// Classification of the underlying remote error, if any
    pub fn remote_class(&self) -> Option<ErrorClass> {
        match self {
            ControllerError::Get { source, .. }
            | ControllerError::Create { source, .. }
            | ControllerError::Update { source, .. }
            | ControllerError::Delete { source, .. } => Some(source.class()),
            _ => None,
        }
    }

    /// Short label for metrics
    pub fn label(&self) -> &'static str {
        match self {
            ControllerError::Kube(_) => "kube",
            ControllerError::InvalidExternalName { .. }
            | ControllerError::MissingParentId(_)
            | ControllerError::MissingExternalName => "invalid_managed_object",
            ControllerError::MissingProviderConfig(_) | ControllerError::CredentialUnavailable(_) => {
                "provider_config"
            }
            ControllerError::MissingConnectionSecret(_) | ControllerError::NoSource(_) => "validation",
            ControllerError::SecretIo(_) | ControllerError::SourceFetch { .. } => "secret_io",
            ControllerError::UnknownUser(_) => "unknown_user",
            ControllerError::Get { .. }
            | ControllerError::Create { .. }
            | ControllerError::Update { .. }
            | ControllerError::Delete { .. } => match self.remote_class() {
                Some(ErrorClass::Transient) => "remote_transient",
                Some(ErrorClass::NotFound) => "remote_not_found",
                _ => "remote_permanent",
            },
            ControllerError::InvalidConfig(_)
            | ControllerError::Watch(_)
            | ControllerError::Metrics(_)
            | ControllerError::Io(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_prefixes_are_stable() {
        let err = ControllerError::Get {
            kind: "project",
            source: GitLabError::NotFound("404 Project Not Found".to_string()),
        };
        assert!(err.to_string().starts_with("cannot get project: "));

        let err = ControllerError::Delete {
            kind: "runner",
            source: GitLabError::Api { status: 500, message: "boom".to_string() },
        };
        assert!(err.to_string().starts_with("cannot delete runner: "));
        assert_eq!(err.label(), "remote_transient");
    }

    #[test]
    fn test_missing_connection_secret_label() {
        let err = ControllerError::MissingConnectionSecret("runner");
        assert_eq!(err.label(), "validation");
        assert!(err.to_string().contains("runner"));
    }
}
