//! Project-scoped translators
//!
//! Projects themselves plus everything that lives under `/projects/:id`.
//! Runners are here too: project runners are the common case, and group and
//! instance runners share the same `/user/runners` endpoint.

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

#[cfg(test)]
mod credentials_test;
#[cfg(test)]
mod member_test;
#[cfg(test)]
mod project_test;

pub use access_token::ProjectAccessTokenTranslator;
pub use approval_rule::ProjectApprovalRuleTranslator;
pub use deploy_key::ProjectDeployKeyTranslator;
pub use deploy_token::ProjectDeployTokenTranslator;
pub use hook::ProjectHookTranslator;
pub use mattermost::MattermostTranslator;
pub use member::ProjectMemberTranslator;
pub use pipeline_schedule::PipelineScheduleTranslator;
pub use project::ProjectTranslator;
pub use runner::RunnerTranslator;
pub use variable::ProjectVariableTranslator;
