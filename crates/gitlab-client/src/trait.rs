//! GitLabClient trait for mocking
//!
//! This trait abstracts the GitLabClient to enable mocking in unit tests.
//! The concrete GitLabClient implements this trait, and tests use
//! `MockGitLabClient` (feature `test-util`).

use crate::error::GitLabError;
use crate::ids::{Parent, ResourceId};
use crate::models::*;

/// Trait for GitLab API client operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
/// Every `get_*` method returns `GitLabError::NotFound` for a 404; callers
/// classify with [`GitLabError::is_not_found`].
#[async_trait::async_trait]
pub trait GitLabClientTrait: Send + Sync {
    /// Get the API root URL
    fn base_url(&self) -> &str;

    // Projects
    async fn get_project(&self, id: &ResourceId) -> Result<Project, GitLabError>;
    async fn create_project(&self, opts: &ProjectOptions) -> Result<Project, GitLabError>;
    async fn edit_project(&self, id: &ResourceId, opts: &ProjectOptions) -> Result<Project, GitLabError>;
    async fn delete_project(&self, id: &ResourceId, opts: &DeleteOptions) -> Result<DeletionState, GitLabError>;

    /// Push rules; `None` when the project has none configured
    async fn get_push_rules(&self, project: &ResourceId) -> Result<Option<PushRules>, GitLabError>;
    async fn add_push_rules(&self, project: &ResourceId, opts: &PushRuleOptions) -> Result<PushRules, GitLabError>;
    async fn edit_push_rules(&self, project: &ResourceId, opts: &PushRuleOptions) -> Result<PushRules, GitLabError>;

    // Sharing (projects and groups)
    async fn share_with_group(&self, parent: &Parent, opts: &ShareOptions) -> Result<(), GitLabError>;
    async fn unshare_with_group(&self, parent: &Parent, group_id: i64) -> Result<(), GitLabError>;

    // Members (projects and groups)
    async fn get_member(&self, parent: &Parent, user_id: i64) -> Result<Member, GitLabError>;
    async fn add_member(&self, parent: &Parent, opts: &MemberOptions) -> Result<Member, GitLabError>;
    async fn edit_member(&self, parent: &Parent, user_id: i64, opts: &MemberOptions) -> Result<Member, GitLabError>;
    async fn remove_member(&self, parent: &Parent, user_id: i64) -> Result<(), GitLabError>;

    // CI/CD variables (projects and groups)
    async fn get_variable(&self, parent: &Parent, key: &str, environment_scope: Option<&str>) -> Result<Variable, GitLabError>;
    async fn create_variable(&self, parent: &Parent, opts: &VariableOptions) -> Result<Variable, GitLabError>;
    async fn update_variable(&self, parent: &Parent, key: &str, opts: &VariableOptions) -> Result<Variable, GitLabError>;
    async fn remove_variable(&self, parent: &Parent, key: &str, environment_scope: Option<&str>) -> Result<(), GitLabError>;

    // Deploy tokens (projects and groups)
    async fn get_deploy_token(&self, parent: &Parent, token_id: i64) -> Result<DeployToken, GitLabError>;
    async fn create_deploy_token(&self, parent: &Parent, opts: &DeployTokenOptions) -> Result<DeployToken, GitLabError>;
    async fn delete_deploy_token(&self, parent: &Parent, token_id: i64) -> Result<(), GitLabError>;

    // Access tokens (projects and groups)
    async fn get_access_token(&self, parent: &Parent, token_id: i64) -> Result<AccessToken, GitLabError>;
    async fn create_access_token(&self, parent: &Parent, opts: &AccessTokenOptions) -> Result<AccessToken, GitLabError>;
    async fn revoke_access_token(&self, parent: &Parent, token_id: i64) -> Result<(), GitLabError>;

    // Project hooks
    async fn get_project_hook(&self, project: &ResourceId, hook_id: i64) -> Result<ProjectHook, GitLabError>;
    async fn add_project_hook(&self, project: &ResourceId, opts: &HookOptions) -> Result<ProjectHook, GitLabError>;
    async fn edit_project_hook(&self, project: &ResourceId, hook_id: i64, opts: &HookOptions) -> Result<ProjectHook, GitLabError>;
    async fn delete_project_hook(&self, project: &ResourceId, hook_id: i64) -> Result<(), GitLabError>;

    // Deploy keys
    async fn get_deploy_key(&self, project: &ResourceId, key_id: i64) -> Result<DeployKey, GitLabError>;
    async fn add_deploy_key(&self, project: &ResourceId, opts: &DeployKeyOptions) -> Result<DeployKey, GitLabError>;
    async fn update_deploy_key(&self, project: &ResourceId, key_id: i64, opts: &DeployKeyOptions) -> Result<DeployKey, GitLabError>;
    async fn delete_deploy_key(&self, project: &ResourceId, key_id: i64) -> Result<(), GitLabError>;

    // Pipeline schedules
    async fn get_pipeline_schedule(&self, project: &ResourceId, schedule_id: i64) -> Result<PipelineSchedule, GitLabError>;
    async fn create_pipeline_schedule(&self, project: &ResourceId, opts: &PipelineScheduleOptions) -> Result<PipelineSchedule, GitLabError>;
    async fn edit_pipeline_schedule(&self, project: &ResourceId, schedule_id: i64, opts: &PipelineScheduleOptions) -> Result<PipelineSchedule, GitLabError>;
    async fn delete_pipeline_schedule(&self, project: &ResourceId, schedule_id: i64) -> Result<(), GitLabError>;
    async fn create_pipeline_schedule_variable(&self, project: &ResourceId, schedule_id: i64, variable: &PipelineVariable) -> Result<PipelineVariable, GitLabError>;
    async fn edit_pipeline_schedule_variable(&self, project: &ResourceId, schedule_id: i64, variable: &PipelineVariable) -> Result<PipelineVariable, GitLabError>;
    async fn delete_pipeline_schedule_variable(&self, project: &ResourceId, schedule_id: i64, key: &str) -> Result<(), GitLabError>;

    // Approval rules
    async fn get_approval_rule(&self, project: &ResourceId, rule_id: i64) -> Result<ApprovalRule, GitLabError>;
    async fn create_approval_rule(&self, project: &ResourceId, opts: &ApprovalRuleOptions) -> Result<ApprovalRule, GitLabError>;
    async fn update_approval_rule(&self, project: &ResourceId, rule_id: i64, opts: &ApprovalRuleOptions) -> Result<ApprovalRule, GitLabError>;
    async fn delete_approval_rule(&self, project: &ResourceId, rule_id: i64) -> Result<(), GitLabError>;

    // Runners
    async fn get_runner(&self, runner_id: i64) -> Result<Runner, GitLabError>;
    async fn create_runner(&self, opts: &CreateRunnerOptions) -> Result<CreatedRunner, GitLabError>;
    async fn update_runner(&self, runner_id: i64, opts: &UpdateRunnerOptions) -> Result<Runner, GitLabError>;
    async fn delete_runner(&self, runner_id: i64) -> Result<(), GitLabError>;

    // Mattermost integration
    async fn get_mattermost(&self, project: &ResourceId) -> Result<MattermostIntegration, GitLabError>;
    async fn set_mattermost(&self, project: &ResourceId, opts: &MattermostOptions) -> Result<MattermostIntegration, GitLabError>;
    async fn delete_mattermost(&self, project: &ResourceId) -> Result<(), GitLabError>;

    // Groups
    async fn get_group(&self, id: &ResourceId) -> Result<Group, GitLabError>;
    async fn create_group(&self, opts: &GroupOptions) -> Result<Group, GitLabError>;
    async fn edit_group(&self, id: &ResourceId, opts: &GroupOptions) -> Result<Group, GitLabError>;
    async fn delete_group(&self, id: &ResourceId, opts: &DeleteOptions) -> Result<DeletionState, GitLabError>;

    // LDAP group links
    async fn list_ldap_links(&self, group: &ResourceId) -> Result<Vec<LdapGroupLink>, GitLabError>;
    async fn add_ldap_link(&self, group: &ResourceId, opts: &LdapLinkOptions) -> Result<LdapGroupLink, GitLabError>;
    async fn delete_ldap_link(&self, group: &ResourceId, cn: &str, provider: &str) -> Result<(), GitLabError>;

    // SAML group links
    async fn get_saml_link(&self, group: &ResourceId, name: &str) -> Result<SamlGroupLink, GitLabError>;
    async fn add_saml_link(&self, group: &ResourceId, opts: &SamlLinkOptions) -> Result<SamlGroupLink, GitLabError>;
    async fn delete_saml_link(&self, group: &ResourceId, name: &str) -> Result<(), GitLabError>;

    // Instance license
    /// The current license; `NotFound` if none is installed
    async fn get_license(&self) -> Result<License, GitLabError>;
    async fn add_license(&self, license: &str) -> Result<License, GitLabError>;
    async fn delete_license(&self, license_id: i64) -> Result<(), GitLabError>;

    // Application settings
    async fn get_settings(&self) -> Result<Settings, GitLabError>;
    async fn update_settings(&self, opts: &SettingsOptions) -> Result<Settings, GitLabError>;

    // Users
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, GitLabError>;
}
