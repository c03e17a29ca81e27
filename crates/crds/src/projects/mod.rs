//! Project-scoped CRDs
//!
//! The project itself plus everything that hangs off a project: members,
//! hooks, variables, deploy keys and tokens, access tokens, pipeline
//! schedules, approval rules, runners and the Mattermost integration.

pub mod access_token;
pub mod approval_rule;
pub mod deploy_key;
pub mod deploy_token;
pub mod hook;
pub mod mattermost;
pub mod member;
pub mod pipeline_schedule;
pub mod project;
pub mod runner;
pub mod variable;

pub use access_token::*;
pub use approval_rule::*;
pub use deploy_key::*;
pub use deploy_token::*;
pub use hook::*;
pub use mattermost::*;
pub use member::*;
pub use pipeline_schedule::*;
pub use project::*;
pub use runner::*;
pub use variable::*;
