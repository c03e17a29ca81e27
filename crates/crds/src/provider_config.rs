//! ProviderConfig Custom Resource Definition
//!
//! Cluster-scoped endpoint and credential configuration referenced by every
//! managed GitLab resource through `spec.providerConfigRef`.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    "https://gitlab.com".to_string()
}

fn default_token_key() -> String {
    "token".to_string()
}

/// ProviderConfigSpec defines how to reach and authenticate against GitLab
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "ProviderConfig",
    shortname = "glpc"
)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigSpec {
    /// GitLab instance URL
    #[serde(rename = "baseURL", default = "default_base_url")]
    pub base_url: String,

    /// Where the API token comes from
    pub credentials: ProviderCredentials,
}

/// Source of the API token
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub enum CredentialsSource {
    /// Read from `credentials.secretRef`
    Secret,
    /// Use the token injected into the provider's own environment
    InjectedIdentity,
    /// Anonymous access
    None,
}

/// Credentials configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredentials {
    pub source: CredentialsSource,

    /// Secret holding the token; required when `source` is `Secret`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<CredentialsSecretRef>,
}

/// Secret key holding the API token
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsSecretRef {
    pub name: String,
    pub namespace: String,
    /// Key within the secret data
    #[serde(default = "default_token_key")]
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let spec: ProviderConfigSpec = serde_json::from_value(serde_json::json!({
            "credentials": {
                "source": "Secret",
                "secretRef": { "name": "gitlab-creds", "namespace": "crossplane-system" }
            }
        }))
        .unwrap();
        assert_eq!(spec.base_url, "https://gitlab.com");
        assert_eq!(spec.credentials.secret_ref.unwrap().key, "token");
    }

    #[test]
    fn test_base_url_field_name() {
        let spec = ProviderConfigSpec {
            base_url: "https://gitlab.example.com".to_string(),
            credentials: ProviderCredentials {
                source: CredentialsSource::InjectedIdentity,
                secret_ref: None,
            },
        };
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["baseURL"], "https://gitlab.example.com");
    }
}
