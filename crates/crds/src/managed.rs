//! Shared lifecycle and status types for managed GitLab resources
//!
//! Every managed kind carries the same lifecycle fields (flattened into its
//! spec next to `forProvider`) and the same status shape (`conditions` plus
//! a kind-specific `atProvider`).

use crate::references::{ProviderConfigReference, SecretReference};
use chrono::{DateTime, Utc};
use k8s_openapi::NamespaceResourceScope;
use kube::Resource;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// API group of every GitLab provider kind
pub const API_GROUP: &str = "gitlab.microscaler.io";

/// Annotation binding a managed object to its remote entity
pub const EXTERNAL_NAME_ANNOTATION: &str = "gitlab.microscaler.io/external-name";

/// Finalizer held while the remote entity may still exist
pub const FINALIZER: &str = "finalizer.managedresource.gitlab.microscaler.io";

/// What happens to the remote entity when the managed object is deleted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
pub enum DeletionPolicy {
    /// Delete the remote entity
    #[default]
    Delete,
    /// Leave the remote entity in place
    Orphan,
}

/// A phase of the reconcile state machine the provider may perform
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum ManagementAction {
    /// Every action
    #[serde(rename = "*")]
    All,
    Observe,
    Create,
    Update,
    Delete,
    LateInitialize,
}

fn default_management_policies() -> Vec<ManagementAction> {
    vec![ManagementAction::All]
}

/// Lifecycle fields shared by every managed kind
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpec {
    /// ProviderConfig holding the endpoint and credentials
    #[serde(default)]
    pub provider_config_ref: ProviderConfigReference,

    /// Secret receiving connection details (tokens, keys)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_connection_secret_to_ref: Option<SecretReference>,

    /// Delete or orphan the remote entity on deletion
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,

    /// Actions the provider may take; `Observe` is always implied
    #[serde(default = "default_management_policies")]
    pub management_policies: Vec<ManagementAction>,
}

impl Default for ResourceSpec {
    fn default() -> Self {
        Self {
            provider_config_ref: ProviderConfigReference::default(),
            write_connection_secret_to_ref: None,
            deletion_policy: DeletionPolicy::Delete,
            management_policies: default_management_policies(),
        }
    }
}

impl ResourceSpec {
    /// Whether the management policies allow `action`
    pub fn allows(&self, action: ManagementAction) -> bool {
        action == ManagementAction::Observe
            || self
                .management_policies
                .iter()
                .any(|p| *p == ManagementAction::All || *p == action)
    }

    /// Whether deleting the managed object should delete the remote entity
    pub fn should_delete_remote(&self) -> bool {
        self.deletion_policy == DeletionPolicy::Delete && self.allows(ManagementAction::Delete)
    }
}

/// Condition type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub enum ConditionType {
    /// The remote entity is usable
    Ready,
    /// The last reconcile succeeded
    Synced,
}

/// Condition status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

/// Machine-readable reason for a condition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub enum ConditionReason {
    Available,
    Creating,
    Deleting,
    Unavailable,
    ReconcileSuccess,
    ReconcileError,
    ReconcilePaused,
}

/// Condition represents a condition of a managed resource
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: ConditionType,
    /// Status of the condition (True, False, Unknown)
    pub status: ConditionStatus,
    /// Reason for the condition
    pub reason: ConditionReason,
    /// Message describing the condition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Last transition time
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    fn new(r#type: ConditionType, status: ConditionStatus, reason: ConditionReason) -> Self {
        Self {
            r#type,
            status,
            reason,
            message: None,
            last_transition_time: Utc::now(),
        }
    }

    /// Ready=True: the remote entity exists and was observed
    pub fn available() -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::True, ConditionReason::Available)
    }

    /// Ready=False: the remote entity is being created
    pub fn creating() -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::False, ConditionReason::Creating)
    }

    /// Ready=False: the remote entity is being deleted
    pub fn deleting() -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::False, ConditionReason::Deleting)
    }

    /// Ready=False: the remote entity is not usable
    pub fn unavailable() -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::False, ConditionReason::Unavailable)
    }

    /// Synced=True
    pub fn reconcile_success() -> Self {
        Self::new(ConditionType::Synced, ConditionStatus::True, ConditionReason::ReconcileSuccess)
    }

    /// Synced=False with the error message
    pub fn reconcile_error(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(ConditionType::Synced, ConditionStatus::False, ConditionReason::ReconcileError)
        }
    }

    /// Synced=False: reconciliation is paused by management policies
    pub fn reconcile_paused() -> Self {
        Self::new(ConditionType::Synced, ConditionStatus::False, ConditionReason::ReconcilePaused)
    }

    /// Equal ignoring `last_transition_time`
    pub fn same_as(&self, other: &Condition) -> bool {
        self.r#type == other.r#type
            && self.status == other.status
            && self.reason == other.reason
            && self.message == other.message
    }
}

/// Observed state of a managed resource
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedStatus<O: Default> {
    /// Conditions represent the latest available observations
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Remote fields mirrored back from GitLab
    #[serde(default)]
    pub at_provider: O,
}

impl<O: Default> ManagedStatus<O> {
    /// Set a condition, replacing any of the same type.
    ///
    /// An identical condition keeps its original transition time. Returns
    /// true if the stored conditions changed.
    pub fn set_condition(&mut self, condition: Condition) -> bool {
        match self.conditions.iter_mut().find(|c| c.r#type == condition.r#type) {
            Some(existing) if existing.same_as(&condition) => false,
            Some(existing) => {
                *existing = condition;
                true
            }
            None => {
                self.conditions.push(condition);
                true
            }
        }
    }

    /// Get the condition of the given type
    pub fn condition(&self, r#type: ConditionType) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.r#type == r#type)
    }
}

/// Common accessors over every managed kind
///
/// Implemented for each kind by [`managed_resource!`](crate::managed_resource).
pub trait ManagedResource:
    Resource<DynamicType = (), Scope = NamespaceResourceScope> + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// `spec.forProvider`
    type Parameters: Clone + Debug + PartialEq + Serialize + Send + Sync;
    /// `status.atProvider`
    type Observation: Clone + Debug + Default + PartialEq + Serialize + Send + Sync;

    /// Lifecycle fields
    fn resource_spec(&self) -> &ResourceSpec;
    fn for_provider(&self) -> &Self::Parameters;
    fn for_provider_mut(&mut self) -> &mut Self::Parameters;
    fn managed_status(&self) -> Option<&ManagedStatus<Self::Observation>>;
    /// Status, created empty if missing
    fn managed_status_mut(&mut self) -> &mut ManagedStatus<Self::Observation>;

    /// External name annotation; empty when unbound
    fn external_name(&self) -> &str {
        self.meta()
            .annotations
            .as_ref()
            .and_then(|a| a.get(EXTERNAL_NAME_ANNOTATION))
            .map(String::as_str)
            .unwrap_or_default()
    }

    fn set_external_name(&mut self, name: &str) {
        self.meta_mut()
            .annotations
            .get_or_insert_with(Default::default)
            .insert(EXTERNAL_NAME_ANNOTATION.to_string(), name.to_string());
    }

    /// The cluster has requested deletion
    fn is_deleting(&self) -> bool {
        self.meta().deletion_timestamp.is_some()
    }

    fn has_finalizer(&self) -> bool {
        self.meta()
            .finalizers
            .as_ref()
            .is_some_and(|f| f.iter().any(|f| f == FINALIZER))
    }

    /// `atProvider`, if a status exists
    fn at_provider(&self) -> Option<&Self::Observation> {
        self.managed_status().map(|s| &s.at_provider)
    }

    /// Set a condition on the status; returns true if it changed
    fn set_condition(&mut self, condition: Condition) -> bool {
        self.managed_status_mut().set_condition(condition)
    }
}

/// Implement [`ManagedResource`] for a kind whose spec has `for_provider`
/// and a flattened `resource_spec`
#[macro_export]
macro_rules! managed_resource {
    ($kind:ty, $params:ty, $obs:ty) => {
        impl $crate::managed::ManagedResource for $kind {
            type Parameters = $params;
            type Observation = $obs;

            fn resource_spec(&self) -> &$crate::managed::ResourceSpec {
                &self.spec.resource_spec
            }

            fn for_provider(&self) -> &$params {
                &self.spec.for_provider
            }

            fn for_provider_mut(&mut self) -> &mut $params {
                &mut self.spec.for_provider
            }

            fn managed_status(&self) -> Option<&$crate::managed::ManagedStatus<$obs>> {
                self.status.as_ref()
            }

            fn managed_status_mut(&mut self) -> &mut $crate::managed::ManagedStatus<$obs> {
                self.status.get_or_insert_with(Default::default)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_management_policies_default_allows_everything() {
        let spec = ResourceSpec::default();
        assert!(spec.allows(ManagementAction::Create));
        assert!(spec.allows(ManagementAction::LateInitialize));
        assert!(spec.should_delete_remote());
    }

    #[test]
    fn test_observe_only_policy() {
        let spec = ResourceSpec {
            management_policies: vec![ManagementAction::Observe],
            ..Default::default()
        };
        assert!(spec.allows(ManagementAction::Observe));
        assert!(!spec.allows(ManagementAction::Update));
        assert!(!spec.should_delete_remote());
    }

    #[test]
    fn test_orphan_policy_keeps_remote() {
        let spec = ResourceSpec {
            deletion_policy: DeletionPolicy::Orphan,
            ..Default::default()
        };
        assert!(!spec.should_delete_remote());
    }

    #[test]
    fn test_identical_condition_keeps_transition_time() {
        let mut status: ManagedStatus<()> = ManagedStatus::default();
        let first = Condition::available();
        let stamp = first.last_transition_time;
        assert!(status.set_condition(first));

        let mut again = Condition::available();
        again.last_transition_time = stamp + chrono::Duration::seconds(30);
        assert!(!status.set_condition(again));
        assert_eq!(status.condition(ConditionType::Ready).unwrap().last_transition_time, stamp);

        assert!(status.set_condition(Condition::deleting()));
        assert_eq!(
            status.condition(ConditionType::Ready).unwrap().reason,
            ConditionReason::Deleting
        );
    }

    #[test]
    fn test_error_message_change_is_a_transition() {
        let mut status: ManagedStatus<()> = ManagedStatus::default();
        status.set_condition(Condition::reconcile_error("cannot get project: boom"));
        assert!(status.set_condition(Condition::reconcile_error("cannot get project: other")));
        assert!(status.set_condition(Condition::reconcile_success()));
        assert_eq!(status.conditions.len(), 1);
    }

    #[test]
    fn test_status_without_at_provider_deserializes() {
        let status: crate::ProjectStatus = serde_json::from_value(serde_json::json!({ "conditions": [] })).unwrap();
        assert_eq!(status.at_provider, crate::ProjectObservation::default());
    }

    fn scope_of<K: Resource<Scope = NamespaceResourceScope>>() -> &'static str {
        std::any::type_name::<K::Scope>()
    }

    fn managed_scope<K: ManagedResource>() -> &'static str {
        scope_of::<K>()
    }

    #[test]
    fn test_managed_kinds_are_namespaced() {
        assert!(managed_scope::<crate::ProjectMember>().ends_with("NamespaceResourceScope"));
        assert!(managed_scope::<crate::License>().ends_with("NamespaceResourceScope"));
    }

    #[test]
    fn test_management_action_serialization() {
        let json = serde_json::to_string(&vec![ManagementAction::All, ManagementAction::LateInitialize]).unwrap();
        assert_eq!(json, r#"["*","LateInitialize"]"#);
    }
}
