//! GitLab REST API Client
//!
//! A Rust client library for the GitLab REST API (`/api/v4`), covering the
//! entities reconciled by the GitLab provider controller.
//!
//! # Example
//!
//! ```no_run
//! use gitlab_client::{GitLabClient, GitLabClientTrait, ProjectOptions, RetryPolicy, ResourceId};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GitLabClient::new(
//!     "https://gitlab.example.com".to_string(),
//!     Some("glpat-xxxxxxxx".to_string()),
//!     Duration::from_secs(30),
//!     RetryPolicy::default(),
//! )?;
//!
//! let project = client
//!     .create_project(&ProjectOptions {
//!         name: Some("demo".to_string()),
//!         visibility: Some("private".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let same = client.get_project(&ResourceId::Numeric(project.id)).await?;
//! assert_eq!(same.path_with_namespace, project.path_with_namespace);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Typed models** for projects, groups and their sub-resources
//! - **ID-or-path parameters** via [`ResourceId`]
//! - **Retry logic**: exponential backoff on 5xx/429 and connection failures
//! - **Pagination**: `x-next-page` walking for collections
//! - **Mocking**: `MockGitLabClient` behind the `test-util` feature

pub mod client;
pub mod common;
pub mod error;
pub mod ids;
pub mod models;
#[path = "trait.rs"]
pub mod gitlab_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::{GitLabClient, deletion_state_from};
pub use common::{HttpClient, RetryPolicy};
pub use error::{ErrorClass, GitLabError};
pub use gitlab_trait::GitLabClientTrait;
pub use ids::{Parent, ResourceId};
pub use models::*;
#[cfg(feature = "test-util")]
pub use mock::MockGitLabClient;
