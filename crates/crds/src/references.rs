//! Kubernetes object references used by GitLab CRDs
//!
//! Provides references to ProviderConfigs, connection secrets and inbound
//! secret-backed values.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_provider_config_name() -> String {
    "default".to_string()
}

/// Reference to a cluster-scoped ProviderConfig
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigReference {
    /// Name of the ProviderConfig
    #[serde(default = "default_provider_config_name")]
    pub name: String,
}

impl Default for ProviderConfigReference {
    fn default() -> Self {
        Self {
            name: default_provider_config_name(),
        }
    }
}

/// Reference to a whole secret (connection detail sink)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretReference {
    /// Name of the secret
    pub name: String,

    /// Namespace of the secret (defaults to the managed object's namespace)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Reference to one key of a secret
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeySelector {
    /// Name of the secret
    pub name: String,

    /// Namespace of the secret (defaults to the managed object's namespace)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Key within the secret data
    pub key: String,
}

/// HTTP basic-auth credentials for an endpoint source
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BasicAuth {
    pub username_secret_ref: SecretKeySelector,
    pub password_secret_ref: SecretKeySelector,
}

/// Remote URL serving a value (e.g. a license file)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSource {
    /// URL to GET
    pub url: String,

    /// Bearer token sent as `Authorization: Bearer`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token_secret_ref: Option<SecretKeySelector>,

    /// Basic-auth credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<BasicAuth>,
}

/// A value supplied inline, from a secret, or from a remote endpoint.
///
/// Exactly one source must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValueSource {
    /// Inline value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Value stored in a secret key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<SecretKeySelector>,

    /// Value served by an HTTP endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<EndpointSource>,
}

impl ValueSource {
    /// Number of sources set; valid sources have exactly one
    pub fn source_count(&self) -> usize {
        usize::from(self.value.is_some())
            + usize::from(self.secret_ref.is_some())
            + usize::from(self.endpoint.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_config_ref_defaults_to_default() {
        let reference: ProviderConfigReference = serde_json::from_str("{}").unwrap();
        assert_eq!(reference.name, "default");
    }

    #[test]
    fn test_value_source_count() {
        let source = ValueSource {
            value: Some("abc".to_string()),
            secret_ref: Some(SecretKeySelector {
                name: "s".to_string(),
                namespace: None,
                key: "k".to_string(),
            }),
            endpoint: None,
        };
        assert_eq!(source.source_count(), 2);
        assert_eq!(ValueSource::default().source_count(), 0);
    }
}
