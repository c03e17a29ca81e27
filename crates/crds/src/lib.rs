//! GitLab provider CRD definitions
//!
//! Kubernetes Custom Resource Definitions for the managed GitLab resources,
//! the ProviderConfig they reference, and the managed-resource contract
//! (`ManagedResource`) the reconciler drives them through.

pub mod groups;
pub mod id_or_path;
pub mod instance;
pub mod managed;
pub mod projects;
pub mod provider_config;
pub mod references;
pub mod shared;

pub use groups::*;
pub use id_or_path::*;
pub use instance::*;
pub use managed::*;
pub use projects::*;
pub use provider_config::*;
pub use references::*;
pub use shared::*;
