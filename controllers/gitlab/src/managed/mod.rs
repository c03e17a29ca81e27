//! Managed-resource reconciliation engine
//!
//! The four-phase contract every kind implements (`observe`, `create`,
//! `update`, `delete`) and the generic client that drives it from a per-kind
//! [`Translator`](translator::Translator).

pub mod connection;
pub mod external_name;
pub mod translator;

use crate::cluster::ConnectionDetails;
use crate::error::ControllerError;
use async_trait::async_trait;
use crds::ManagedResource;

/// Result of observing the remote entity bound to a managed object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalObservation {
    /// The bound remote entity exists
    pub resource_exists: bool,
    /// The remote entity matches the declared spec
    pub resource_up_to_date: bool,
    /// Unset spec fields were filled from the remote entity
    pub resource_late_initialized: bool,
    /// Re-observable outputs to publish
    pub connection_details: ConnectionDetails,
}

impl ExternalObservation {
    /// Nothing is bound, or the bound entity is gone
    pub fn absent() -> Self {
        Self::default()
    }
}

/// Result of a successful create
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalCreation {
    /// Identifier of the new remote entity
    pub external_name: String,
    /// Write-once outputs (tokens, keys)
    pub connection_details: ConnectionDetails,
}

/// Result of a successful update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalUpdate {
    /// New identifier when the update recreated the remote entity
    pub external_name: Option<String>,
    pub connection_details: ConnectionDetails,
}

/// The state machine operations for one kind, scoped to one reconcile
#[async_trait]
pub trait ExternalClient<K: ManagedResource>: Send + Sync {
    async fn observe(&self, mr: &mut K) -> Result<ExternalObservation, ControllerError>;
    async fn create(&self, mr: &mut K) -> Result<ExternalCreation, ControllerError>;
    async fn update(&self, mr: &mut K) -> Result<ExternalUpdate, ControllerError>;
    async fn delete(&self, mr: &mut K) -> Result<(), ControllerError>;

    /// Release per-reconcile state
    async fn disconnect(&self) {}
}
