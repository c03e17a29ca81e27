//! Instance-level CRDs for self-managed GitLab

pub mod license;
pub mod settings;

pub use license::*;
pub use settings::*;
