//! Mock GitLabClient for unit testing
//!
//! This module provides a mock implementation of GitLabClientTrait that can be used
//! in unit tests without requiring a running GitLab instance.
//!
//! The mock is organized into domain-specific modules:
//! - `projects.rs` - projects, push rules, hooks, deploy keys, schedules, approval rules, runners, integrations
//! - `groups.rs` - groups, LDAP and SAML group links
//! - `shared.rs` - sub-resources living on both projects and groups (members, variables, tokens, shares)
//! - `instance.rs` - license, application settings, users
//!
//! Every trait call is recorded (see [`MockGitLabClient::calls`]) and can be made
//! to fail with [`MockGitLabClient::fail_on`].

mod groups;
mod instance;
mod projects;
mod shared;

use crate::error::GitLabError;
use crate::gitlab_trait::GitLabClientTrait;
use crate::ids::{Parent, ResourceId};
use crate::models::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Copy every `Some` field of a request options struct onto a model
macro_rules! apply {
    ($target:expr, $opts:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $opts.$field.clone() {
                $target.$field = value.into();
            }
        )+
    };
}
pub(crate) use apply;

/// Mock GitLabClient for testing
///
/// Stores remote state in memory. Clones share state, so a test can keep one
/// handle for assertions while the code under test owns another.
#[derive(Clone, Default)]
pub struct MockGitLabClient {
    pub(crate) projects: Arc<Mutex<HashMap<i64, Project>>>,
    pub(crate) push_rules: Arc<Mutex<HashMap<i64, PushRules>>>,
    pub(crate) hooks: Arc<Mutex<HashMap<(i64, i64), ProjectHook>>>,
    pub(crate) deploy_keys: Arc<Mutex<HashMap<(i64, i64), DeployKey>>>,
    pub(crate) schedules: Arc<Mutex<HashMap<(i64, i64), PipelineSchedule>>>,
    pub(crate) approval_rules: Arc<Mutex<HashMap<(i64, i64), ApprovalRule>>>,
    pub(crate) runners: Arc<Mutex<HashMap<i64, Runner>>>,
    pub(crate) mattermost: Arc<Mutex<HashMap<i64, MattermostIntegration>>>,
    pub(crate) groups: Arc<Mutex<HashMap<i64, Group>>>,
    pub(crate) ldap_links: Arc<Mutex<HashMap<i64, Vec<LdapGroupLink>>>>,
    pub(crate) saml_links: Arc<Mutex<HashMap<(i64, String), SamlGroupLink>>>,
    // Keyed by the parent's API path (`/projects/1`, `/groups/2`)
    pub(crate) members: Arc<Mutex<HashMap<(String, i64), Member>>>,
    pub(crate) variables: Arc<Mutex<HashMap<(String, String, String), Variable>>>,
    pub(crate) deploy_tokens: Arc<Mutex<HashMap<(String, i64), DeployToken>>>,
    pub(crate) access_tokens: Arc<Mutex<HashMap<(String, i64), AccessToken>>>,
    pub(crate) license: Arc<Mutex<Option<License>>>,
    pub(crate) settings: Arc<Mutex<Settings>>,
    pub(crate) users: Arc<Mutex<HashMap<i64, User>>>,
    // Behaviour switches
    pub(crate) delayed_deletion: Arc<Mutex<bool>>,
    pub(crate) failures: Arc<Mutex<HashMap<String, (u16, String)>>>,
    pub(crate) calls: Arc<Mutex<Vec<String>>>,
    // Counter for generating IDs
    pub(crate) next_id: Arc<Mutex<i64>>,
}

impl MockGitLabClient {
    /// Create a new, empty mock client
    pub fn new() -> Self {
        let mock = Self::default();
        *mock.next_id.lock().unwrap() = 100;
        mock.settings.lock().unwrap().id = 1;
        mock
    }

    /// Make every subsequent call of `operation` (trait method name) fail with
    /// the given HTTP status and message until [`Self::clear_failures`]
    pub fn fail_on(&self, operation: &str, status: u16, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(operation.to_string(), (status, message.to_string()));
    }

    /// Remove all injected failures
    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    /// Project and group deletes mark the entity for deletion instead of
    /// removing it, like GitLab Premium's delayed deletion
    pub fn set_delayed_deletion(&self, enabled: bool) {
        *self.delayed_deletion.lock().unwrap() = enabled;
    }

    /// Names of the trait methods called so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of times `operation` was called
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == operation).count()
    }

    /// Forget recorded calls
    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Add a project to the mock store (for test setup)
    pub fn add_project(&self, project: Project) {
        self.projects.lock().unwrap().insert(project.id, project);
    }

    /// Add a group to the mock store (for test setup)
    pub fn add_group(&self, group: Group) {
        self.groups.lock().unwrap().insert(group.id, group);
    }

    /// Add a user to the mock store (for test setup)
    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    /// Install a license directly (for test setup)
    pub fn set_license(&self, license: Option<License>) {
        *self.license.lock().unwrap() = license;
    }

    /// Current project state, for assertions
    pub fn project(&self, id: i64) -> Option<Project> {
        self.projects.lock().unwrap().get(&id).cloned()
    }

    /// Current group state, for assertions
    pub fn group(&self, id: i64) -> Option<Group> {
        self.groups.lock().unwrap().get(&id).cloned()
    }

    /// Mutate a stored project out-of-band (simulates drift)
    pub fn mutate_project(&self, id: i64, f: impl FnOnce(&mut Project)) {
        if let Some(project) = self.projects.lock().unwrap().get_mut(&id) {
            f(project);
        }
    }

    /// Mutate a stored group out-of-band (simulates drift)
    pub fn mutate_group(&self, id: i64, f: impl FnOnce(&mut Group)) {
        if let Some(group) = self.groups.lock().unwrap().get_mut(&id) {
            f(group);
        }
    }

    /// Mutate a stored member out-of-band (simulates drift)
    pub fn mutate_member(&self, parent: &Parent, user_id: i64, f: impl FnOnce(&mut Member)) {
        let key = (self.parent_key(parent), user_id);
        if let Some(member) = self.members.lock().unwrap().get_mut(&key) {
            f(member);
        }
    }

    /// Mutate stored LDAP links of a group out-of-band (simulates drift)
    pub fn mutate_ldap_links(&self, group_id: i64, f: impl FnOnce(&mut Vec<LdapGroupLink>)) {
        f(self.ldap_links.lock().unwrap().entry(group_id).or_default());
    }

    /// Mutate the stored runner out-of-band (simulates drift)
    pub fn mutate_runner(&self, id: i64, f: impl FnOnce(&mut Runner)) {
        if let Some(runner) = self.runners.lock().unwrap().get_mut(&id) {
            f(runner);
        }
    }

    /// Mutate a stored hook out-of-band (simulates drift)
    pub fn mutate_hook(&self, project_id: i64, hook_id: i64, f: impl FnOnce(&mut ProjectHook)) {
        if let Some(hook) = self.hooks.lock().unwrap().get_mut(&(project_id, hook_id)) {
            f(hook);
        }
    }

    /// Mutate application settings out-of-band (simulates drift)
    pub fn mutate_settings(&self, f: impl FnOnce(&mut Settings)) {
        f(&mut self.settings.lock().unwrap());
    }

    /// Generate next ID
    pub(crate) fn next_id(&self) -> i64 {
        let mut id = self.next_id.lock().unwrap();
        let current = *id;
        *id += 1;
        current
    }

    /// Record a call and return the injected failure for it, if any
    fn record(&self, operation: &str) -> Result<(), GitLabError> {
        self.calls.lock().unwrap().push(operation.to_string());
        match self.failures.lock().unwrap().get(operation) {
            Some((status, message)) => Err(GitLabError::from_status(
                *status,
                operation,
                &serde_json::json!({ "message": message }).to_string(),
            )),
            None => Ok(()),
        }
    }

    /// Resolve a project ID or full path to its numeric ID
    pub(crate) fn project_id(&self, id: &ResourceId) -> Result<i64, GitLabError> {
        match id {
            ResourceId::Numeric(id) => Ok(*id),
            ResourceId::Path(path) => self
                .projects
                .lock()
                .unwrap()
                .values()
                .find(|p| p.path_with_namespace == *path)
                .map(|p| p.id)
                .ok_or_else(|| GitLabError::NotFound(format!("Project {} not found", path))),
        }
    }

    /// Resolve a group ID or full path to its numeric ID
    pub(crate) fn group_id(&self, id: &ResourceId) -> Result<i64, GitLabError> {
        match id {
            ResourceId::Numeric(id) => Ok(*id),
            ResourceId::Path(path) => self
                .groups
                .lock()
                .unwrap()
                .values()
                .find(|g| g.full_path == *path)
                .map(|g| g.id)
                .ok_or_else(|| GitLabError::NotFound(format!("Group {} not found", path))),
        }
    }

    /// Canonical map key for a parent, preferring the numeric form
    pub(crate) fn parent_key(&self, parent: &Parent) -> String {
        let canonical = match parent {
            Parent::Project(id) => self.project_id(id).map(|id| Parent::Project(id.into())),
            Parent::Group(id) => self.group_id(id).map(|id| Parent::Group(id.into())),
        };
        canonical.unwrap_or_else(|_| parent.clone()).path()
    }
}

impl std::fmt::Debug for MockGitLabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockGitLabClient").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl GitLabClientTrait for MockGitLabClient {
    fn base_url(&self) -> &str {
        "http://gitlab.mock/api/v4"
    }

    async fn get_project(&self, id: &ResourceId) -> Result<Project, GitLabError> {
        self.record("get_project")?;
        projects::get_project(self, id)
    }

    async fn create_project(&self, opts: &ProjectOptions) -> Result<Project, GitLabError> {
        self.record("create_project")?;
        projects::create_project(self, opts)
    }

    async fn edit_project(&self, id: &ResourceId, opts: &ProjectOptions) -> Result<Project, GitLabError> {
        self.record("edit_project")?;
        projects::edit_project(self, id, opts)
    }

    async fn delete_project(&self, id: &ResourceId, opts: &DeleteOptions) -> Result<DeletionState, GitLabError> {
        self.record("delete_project")?;
        projects::delete_project(self, id, opts)
    }

    async fn get_push_rules(&self, project: &ResourceId) -> Result<Option<PushRules>, GitLabError> {
        self.record("get_push_rules")?;
        projects::get_push_rules(self, project)
    }

    async fn add_push_rules(&self, project: &ResourceId, opts: &PushRuleOptions) -> Result<PushRules, GitLabError> {
        self.record("add_push_rules")?;
        projects::set_push_rules(self, project, opts, false)
    }

    async fn edit_push_rules(&self, project: &ResourceId, opts: &PushRuleOptions) -> Result<PushRules, GitLabError> {
        self.record("edit_push_rules")?;
        projects::set_push_rules(self, project, opts, true)
    }

    async fn share_with_group(&self, parent: &Parent, opts: &ShareOptions) -> Result<(), GitLabError> {
        self.record("share_with_group")?;
        shared::share_with_group(self, parent, opts)
    }

    async fn unshare_with_group(&self, parent: &Parent, group_id: i64) -> Result<(), GitLabError> {
        self.record("unshare_with_group")?;
        shared::unshare_with_group(self, parent, group_id)
    }

    async fn get_member(&self, parent: &Parent, user_id: i64) -> Result<Member, GitLabError> {
        self.record("get_member")?;
        shared::get_member(self, parent, user_id)
    }

    async fn add_member(&self, parent: &Parent, opts: &MemberOptions) -> Result<Member, GitLabError> {
        self.record("add_member")?;
        shared::add_member(self, parent, opts)
    }

    async fn edit_member(&self, parent: &Parent, user_id: i64, opts: &MemberOptions) -> Result<Member, GitLabError> {
        self.record("edit_member")?;
        shared::edit_member(self, parent, user_id, opts)
    }

    async fn remove_member(&self, parent: &Parent, user_id: i64) -> Result<(), GitLabError> {
        self.record("remove_member")?;
        shared::remove_member(self, parent, user_id)
    }

    async fn get_variable(&self, parent: &Parent, key: &str, environment_scope: Option<&str>) -> Result<Variable, GitLabError> {
        self.record("get_variable")?;
        shared::get_variable(self, parent, key, environment_scope)
    }

    async fn create_variable(&self, parent: &Parent, opts: &VariableOptions) -> Result<Variable, GitLabError> {
        self.record("create_variable")?;
        shared::create_variable(self, parent, opts)
    }

    async fn update_variable(&self, parent: &Parent, key: &str, opts: &VariableOptions) -> Result<Variable, GitLabError> {
        self.record("update_variable")?;
        shared::update_variable(self, parent, key, opts)
    }

    async fn remove_variable(&self, parent: &Parent, key: &str, environment_scope: Option<&str>) -> Result<(), GitLabError> {
        self.record("remove_variable")?;
        shared::remove_variable(self, parent, key, environment_scope)
    }

    async fn get_deploy_token(&self, parent: &Parent, token_id: i64) -> Result<DeployToken, GitLabError> {
        self.record("get_deploy_token")?;
        shared::get_deploy_token(self, parent, token_id)
    }

    async fn create_deploy_token(&self, parent: &Parent, opts: &DeployTokenOptions) -> Result<DeployToken, GitLabError> {
        self.record("create_deploy_token")?;
        shared::create_deploy_token(self, parent, opts)
    }

    async fn delete_deploy_token(&self, parent: &Parent, token_id: i64) -> Result<(), GitLabError> {
        self.record("delete_deploy_token")?;
        shared::delete_deploy_token(self, parent, token_id)
    }

    async fn get_access_token(&self, parent: &Parent, token_id: i64) -> Result<AccessToken, GitLabError> {
        self.record("get_access_token")?;
        shared::get_access_token(self, parent, token_id)
    }

    async fn create_access_token(&self, parent: &Parent, opts: &AccessTokenOptions) -> Result<AccessToken, GitLabError> {
        self.record("create_access_token")?;
        shared::create_access_token(self, parent, opts)
    }

    async fn revoke_access_token(&self, parent: &Parent, token_id: i64) -> Result<(), GitLabError> {
        self.record("revoke_access_token")?;
        shared::revoke_access_token(self, parent, token_id)
    }

    async fn get_project_hook(&self, project: &ResourceId, hook_id: i64) -> Result<ProjectHook, GitLabError> {
        self.record("get_project_hook")?;
        projects::get_project_hook(self, project, hook_id)
    }

    async fn add_project_hook(&self, project: &ResourceId, opts: &HookOptions) -> Result<ProjectHook, GitLabError> {
        self.record("add_project_hook")?;
        projects::add_project_hook(self, project, opts)
    }

    async fn edit_project_hook(&self, project: &ResourceId, hook_id: i64, opts: &HookOptions) -> Result<ProjectHook, GitLabError> {
        self.record("edit_project_hook")?;
        projects::edit_project_hook(self, project, hook_id, opts)
    }

    async fn delete_project_hook(&self, project: &ResourceId, hook_id: i64) -> Result<(), GitLabError> {
        self.record("delete_project_hook")?;
        projects::delete_project_hook(self, project, hook_id)
    }

    async fn get_deploy_key(&self, project: &ResourceId, key_id: i64) -> Result<DeployKey, GitLabError> {
        self.record("get_deploy_key")?;
        projects::get_deploy_key(self, project, key_id)
    }

    async fn add_deploy_key(&self, project: &ResourceId, opts: &DeployKeyOptions) -> Result<DeployKey, GitLabError> {
        self.record("add_deploy_key")?;
        projects::add_deploy_key(self, project, opts)
    }

    async fn update_deploy_key(&self, project: &ResourceId, key_id: i64, opts: &DeployKeyOptions) -> Result<DeployKey, GitLabError> {
        self.record("update_deploy_key")?;
        projects::update_deploy_key(self, project, key_id, opts)
    }

    async fn delete_deploy_key(&self, project: &ResourceId, key_id: i64) -> Result<(), GitLabError> {
        self.record("delete_deploy_key")?;
        projects::delete_deploy_key(self, project, key_id)
    }

    async fn get_pipeline_schedule(&self, project: &ResourceId, schedule_id: i64) -> Result<PipelineSchedule, GitLabError> {
        self.record("get_pipeline_schedule")?;
        projects::get_pipeline_schedule(self, project, schedule_id)
    }

    async fn create_pipeline_schedule(&self, project: &ResourceId, opts: &PipelineScheduleOptions) -> Result<PipelineSchedule, GitLabError> {
        self.record("create_pipeline_schedule")?;
        projects::create_pipeline_schedule(self, project, opts)
    }

    async fn edit_pipeline_schedule(&self, project: &ResourceId, schedule_id: i64, opts: &PipelineScheduleOptions) -> Result<PipelineSchedule, GitLabError> {
        self.record("edit_pipeline_schedule")?;
        projects::edit_pipeline_schedule(self, project, schedule_id, opts)
    }

    async fn delete_pipeline_schedule(&self, project: &ResourceId, schedule_id: i64) -> Result<(), GitLabError> {
        self.record("delete_pipeline_schedule")?;
        projects::delete_pipeline_schedule(self, project, schedule_id)
    }

    async fn create_pipeline_schedule_variable(&self, project: &ResourceId, schedule_id: i64, variable: &PipelineVariable) -> Result<PipelineVariable, GitLabError> {
        self.record("create_pipeline_schedule_variable")?;
        projects::upsert_schedule_variable(self, project, schedule_id, variable, false)
    }

    async fn edit_pipeline_schedule_variable(&self, project: &ResourceId, schedule_id: i64, variable: &PipelineVariable) -> Result<PipelineVariable, GitLabError> {
        self.record("edit_pipeline_schedule_variable")?;
        projects::upsert_schedule_variable(self, project, schedule_id, variable, true)
    }

    async fn delete_pipeline_schedule_variable(&self, project: &ResourceId, schedule_id: i64, key: &str) -> Result<(), GitLabError> {
        self.record("delete_pipeline_schedule_variable")?;
        projects::delete_schedule_variable(self, project, schedule_id, key)
    }

    async fn get_approval_rule(&self, project: &ResourceId, rule_id: i64) -> Result<ApprovalRule, GitLabError> {
        self.record("get_approval_rule")?;
        projects::get_approval_rule(self, project, rule_id)
    }

    async fn create_approval_rule(&self, project: &ResourceId, opts: &ApprovalRuleOptions) -> Result<ApprovalRule, GitLabError> {
        self.record("create_approval_rule")?;
        projects::create_approval_rule(self, project, opts)
    }

    async fn update_approval_rule(&self, project: &ResourceId, rule_id: i64, opts: &ApprovalRuleOptions) -> Result<ApprovalRule, GitLabError> {
        self.record("update_approval_rule")?;
        projects::update_approval_rule(self, project, rule_id, opts)
    }

    async fn delete_approval_rule(&self, project: &ResourceId, rule_id: i64) -> Result<(), GitLabError> {
        self.record("delete_approval_rule")?;
        projects::delete_approval_rule(self, project, rule_id)
    }

    async fn get_runner(&self, runner_id: i64) -> Result<Runner, GitLabError> {
        self.record("get_runner")?;
        projects::get_runner(self, runner_id)
    }

    async fn create_runner(&self, opts: &CreateRunnerOptions) -> Result<CreatedRunner, GitLabError> {
        self.record("create_runner")?;
        projects::create_runner(self, opts)
    }

    async fn update_runner(&self, runner_id: i64, opts: &UpdateRunnerOptions) -> Result<Runner, GitLabError> {
        self.record("update_runner")?;
        projects::update_runner(self, runner_id, opts)
    }

    async fn delete_runner(&self, runner_id: i64) -> Result<(), GitLabError> {
        self.record("delete_runner")?;
        projects::delete_runner(self, runner_id)
    }

    async fn get_mattermost(&self, project: &ResourceId) -> Result<MattermostIntegration, GitLabError> {
        self.record("get_mattermost")?;
        projects::get_mattermost(self, project)
    }

    async fn set_mattermost(&self, project: &ResourceId, opts: &MattermostOptions) -> Result<MattermostIntegration, GitLabError> {
        self.record("set_mattermost")?;
        projects::set_mattermost(self, project, opts)
    }

    async fn delete_mattermost(&self, project: &ResourceId) -> Result<(), GitLabError> {
        self.record("delete_mattermost")?;
        projects::delete_mattermost(self, project)
    }

    async fn get_group(&self, id: &ResourceId) -> Result<Group, GitLabError> {
        self.record("get_group")?;
        groups::get_group(self, id)
    }

    async fn create_group(&self, opts: &GroupOptions) -> Result<Group, GitLabError> {
        self.record("create_group")?;
        groups::create_group(self, opts)
    }

    async fn edit_group(&self, id: &ResourceId, opts: &GroupOptions) -> Result<Group, GitLabError> {
        self.record("edit_group")?;
        groups::edit_group(self, id, opts)
    }

    async fn delete_group(&self, id: &ResourceId, opts: &DeleteOptions) -> Result<DeletionState, GitLabError> {
        self.record("delete_group")?;
        groups::delete_group(self, id, opts)
    }

    async fn list_ldap_links(&self, group: &ResourceId) -> Result<Vec<LdapGroupLink>, GitLabError> {
        self.record("list_ldap_links")?;
        groups::list_ldap_links(self, group)
    }

    async fn add_ldap_link(&self, group: &ResourceId, opts: &LdapLinkOptions) -> Result<LdapGroupLink, GitLabError> {
        self.record("add_ldap_link")?;
        groups::add_ldap_link(self, group, opts)
    }

    async fn delete_ldap_link(&self, group: &ResourceId, cn: &str, provider: &str) -> Result<(), GitLabError> {
        self.record("delete_ldap_link")?;
        groups::delete_ldap_link(self, group, cn, provider)
    }

    async fn get_saml_link(&self, group: &ResourceId, name: &str) -> Result<SamlGroupLink, GitLabError> {
        self.record("get_saml_link")?;
        groups::get_saml_link(self, group, name)
    }

    async fn add_saml_link(&self, group: &ResourceId, opts: &SamlLinkOptions) -> Result<SamlGroupLink, GitLabError> {
        self.record("add_saml_link")?;
        groups::add_saml_link(self, group, opts)
    }

    async fn delete_saml_link(&self, group: &ResourceId, name: &str) -> Result<(), GitLabError> {
        self.record("delete_saml_link")?;
        groups::delete_saml_link(self, group, name)
    }

    async fn get_license(&self) -> Result<License, GitLabError> {
        self.record("get_license")?;
        instance::get_license(self)
    }

    async fn add_license(&self, license: &str) -> Result<License, GitLabError> {
        self.record("add_license")?;
        instance::add_license(self, license)
    }

    async fn delete_license(&self, license_id: i64) -> Result<(), GitLabError> {
        self.record("delete_license")?;
        instance::delete_license(self, license_id)
    }

    async fn get_settings(&self) -> Result<Settings, GitLabError> {
        self.record("get_settings")?;
        instance::get_settings(self)
    }

    async fn update_settings(&self, opts: &SettingsOptions) -> Result<Settings, GitLabError> {
        self.record("update_settings")?;
        instance::update_settings(self, opts)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, GitLabError> {
        self.record("find_user_by_username")?;
        instance::find_user_by_username(self, username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls_and_injects_failures() {
        let mock = MockGitLabClient::new();
        let created = mock
            .create_project(&ProjectOptions {
                name: Some("demo".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mock.calls(), vec!["create_project".to_string()]);

        mock.fail_on("get_project", 503, "try later");
        let err = mock.get_project(&created.id.into()).await.unwrap_err();
        assert!(err.is_transient());

        mock.clear_failures();
        assert!(mock.get_project(&created.id.into()).await.is_ok());
        assert_eq!(mock.call_count("get_project"), 2);
    }

    #[tokio::test]
    async fn test_parent_key_resolves_paths() {
        let mock = MockGitLabClient::new();
        mock.add_project(Project {
            id: 7,
            path_with_namespace: "g/app".to_string(),
            ..Default::default()
        });
        assert_eq!(mock.parent_key(&Parent::Project("g/app".into())), "/projects/7");
        assert_eq!(mock.parent_key(&Parent::Group(3.into())), "/groups/3");
    }
}
