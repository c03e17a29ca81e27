//! GitLab API client
//!
//! Implements the GitLab REST API (`/api/v4`) for the entities managed by the
//! provider. All requests go through [`HttpClient`], which adds bearer
//! authentication and retries transient failures.

use crate::common::{HttpClient, RetryPolicy};
use crate::error::GitLabError;
use crate::gitlab_trait::GitLabClientTrait;
use crate::ids::{Parent, ResourceId};
use crate::models::*;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Markers GitLab uses when an entity is in (or enters) delayed deletion
const DELETION_PENDING_MARKERS: [&str; 2] = ["deletion pending", "marked for deletion"];

/// GitLab API client
pub struct GitLabClient {
    http: HttpClient,
}

impl GitLabClient {
    /// Create a new GitLab client
    ///
    /// # Arguments
    /// * `base_url` - GitLab instance URL (e.g., "https://gitlab.com"); `/api/v4` is appended if missing
    /// * `token` - Personal, group or project access token; `None` for anonymous access
    /// * `timeout` - Per-request timeout
    /// * `retry` - Retry policy for 5xx/429 and connection failures
    pub fn new(
        base_url: String,
        token: Option<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, GitLabError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http: HttpClient::new(client, base_url, token, retry),
        })
    }

    fn project_path(id: &ResourceId) -> String {
        format!("/projects/{}", id.to_path_segment())
    }

    fn group_path(id: &ResourceId) -> String {
        format!("/groups/{}", id.to_path_segment())
    }

    /// Issue a project or group DELETE and translate the outcome
    async fn delete_namespaced(&self, path: &str, opts: &DeleteOptions) -> Result<DeletionState, GitLabError> {
        let result = self.http.delete(path, &opts.to_query()).await;
        let state = match &result {
            Ok(status) => deletion_state_from(*status, ""),
            Err(GitLabError::Api { status, message }) => deletion_state_from(*status, message),
            Err(_) => None,
        };
        match (state, result) {
            (Some(state), _) => {
                debug!("DELETE {} -> {:?}", path, state);
                Ok(state)
            }
            (None, Err(e)) => Err(e),
            (None, Ok(status)) => Err(GitLabError::Api {
                status,
                message: format!("unexpected delete status for {}", path),
            }),
        }
    }
}

/// Decide the outcome of a project/group delete from the response.
///
/// `202 Accepted` means GitLab scheduled the deletion; other 2xx codes mean
/// the entity is gone. A 400/409 whose message says the entity is already
/// pending deletion is also a pending outcome. Anything else is `None`.
pub fn deletion_state_from(status: u16, message: &str) -> Option<DeletionState> {
    match status {
        202 => Some(DeletionState::Pending),
        200..=299 => Some(DeletionState::Removed),
        400 | 409 => {
            let lowered = message.to_lowercase();
            DELETION_PENDING_MARKERS
                .iter()
                .any(|marker| lowered.contains(marker))
                .then_some(DeletionState::Pending)
        }
        _ => None,
    }
}

/// Append the environment scope filter used by the variables API
fn scoped_query(environment_scope: Option<&str>) -> Vec<(&'static str, String)> {
    environment_scope
        .map(|scope| vec![("filter[environment_scope]", scope.to_string())])
        .unwrap_or_default()
}

fn with_query(path: String, query: &[(&str, String)]) -> String {
    if query.is_empty() {
        return path;
    }
    let encoded: Vec<String> = query
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();
    format!("{}?{}", path, encoded.join("&"))
}

#[async_trait::async_trait]
impl GitLabClientTrait for GitLabClient {
    fn base_url(&self) -> &str {
        self.http.base_url()
    }

    async fn get_project(&self, id: &ResourceId) -> Result<Project, GitLabError> {
        self.http.get(&Self::project_path(id)).await
    }

    async fn create_project(&self, opts: &ProjectOptions) -> Result<Project, GitLabError> {
        let project: Project = self.http.post("/projects", opts).await?;
        info!("Created GitLab project {} (id {})", project.path_with_namespace, project.id);
        Ok(project)
    }

    async fn edit_project(&self, id: &ResourceId, opts: &ProjectOptions) -> Result<Project, GitLabError> {
        self.http.put(&Self::project_path(id), opts).await
    }

    async fn delete_project(&self, id: &ResourceId, opts: &DeleteOptions) -> Result<DeletionState, GitLabError> {
        self.delete_namespaced(&Self::project_path(id), opts).await
    }

    async fn get_push_rules(&self, project: &ResourceId) -> Result<Option<PushRules>, GitLabError> {
        let path = format!("{}/push_rule", Self::project_path(project));
        match self.http.get::<Option<PushRules>>(&path).await {
            Ok(rules) => Ok(rules),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn add_push_rules(&self, project: &ResourceId, opts: &PushRuleOptions) -> Result<PushRules, GitLabError> {
        self.http.post(&format!("{}/push_rule", Self::project_path(project)), opts).await
    }

    async fn edit_push_rules(&self, project: &ResourceId, opts: &PushRuleOptions) -> Result<PushRules, GitLabError> {
        self.http.put(&format!("{}/push_rule", Self::project_path(project)), opts).await
    }

    async fn share_with_group(&self, parent: &Parent, opts: &ShareOptions) -> Result<(), GitLabError> {
        let _: serde_json::Value = self.http.post(&format!("{}/share", parent.path()), opts).await?;
        Ok(())
    }

    async fn unshare_with_group(&self, parent: &Parent, group_id: i64) -> Result<(), GitLabError> {
        self.http.delete(&format!("{}/share/{}", parent.path(), group_id), &[]).await?;
        Ok(())
    }

    async fn get_member(&self, parent: &Parent, user_id: i64) -> Result<Member, GitLabError> {
        self.http.get(&format!("{}/members/{}", parent.path(), user_id)).await
    }

    async fn add_member(&self, parent: &Parent, opts: &MemberOptions) -> Result<Member, GitLabError> {
        self.http.post(&format!("{}/members", parent.path()), opts).await
    }

    async fn edit_member(&self, parent: &Parent, user_id: i64, opts: &MemberOptions) -> Result<Member, GitLabError> {
        self.http.put(&format!("{}/members/{}", parent.path(), user_id), opts).await
    }

    async fn remove_member(&self, parent: &Parent, user_id: i64) -> Result<(), GitLabError> {
        self.http.delete(&format!("{}/members/{}", parent.path(), user_id), &[]).await?;
        Ok(())
    }

    async fn get_variable(&self, parent: &Parent, key: &str, environment_scope: Option<&str>) -> Result<Variable, GitLabError> {
        let path = format!("{}/variables/{}", parent.path(), urlencoding::encode(key));
        self.http.get_with_query(&path, &scoped_query(environment_scope)).await
    }

    async fn create_variable(&self, parent: &Parent, opts: &VariableOptions) -> Result<Variable, GitLabError> {
        self.http.post(&format!("{}/variables", parent.path()), opts).await
    }

    async fn update_variable(&self, parent: &Parent, key: &str, opts: &VariableOptions) -> Result<Variable, GitLabError> {
        let path = format!("{}/variables/{}", parent.path(), urlencoding::encode(key));
        let path = with_query(path, &scoped_query(opts.environment_scope.as_deref()));
        self.http.put(&path, opts).await
    }

    async fn remove_variable(&self, parent: &Parent, key: &str, environment_scope: Option<&str>) -> Result<(), GitLabError> {
        let path = format!("{}/variables/{}", parent.path(), urlencoding::encode(key));
        self.http.delete(&path, &scoped_query(environment_scope)).await?;
        Ok(())
    }

    async fn get_deploy_token(&self, parent: &Parent, token_id: i64) -> Result<DeployToken, GitLabError> {
        self.http.get(&format!("{}/deploy_tokens/{}", parent.path(), token_id)).await
    }

    async fn create_deploy_token(&self, parent: &Parent, opts: &DeployTokenOptions) -> Result<DeployToken, GitLabError> {
        self.http.post(&format!("{}/deploy_tokens", parent.path()), opts).await
    }

    async fn delete_deploy_token(&self, parent: &Parent, token_id: i64) -> Result<(), GitLabError> {
        self.http.delete(&format!("{}/deploy_tokens/{}", parent.path(), token_id), &[]).await?;
        Ok(())
    }

    async fn get_access_token(&self, parent: &Parent, token_id: i64) -> Result<AccessToken, GitLabError> {
        self.http.get(&format!("{}/access_tokens/{}", parent.path(), token_id)).await
    }

    async fn create_access_token(&self, parent: &Parent, opts: &AccessTokenOptions) -> Result<AccessToken, GitLabError> {
        self.http.post(&format!("{}/access_tokens", parent.path()), opts).await
    }

    async fn revoke_access_token(&self, parent: &Parent, token_id: i64) -> Result<(), GitLabError> {
        self.http.delete(&format!("{}/access_tokens/{}", parent.path(), token_id), &[]).await?;
        Ok(())
    }

    async fn get_project_hook(&self, project: &ResourceId, hook_id: i64) -> Result<ProjectHook, GitLabError> {
        self.http.get(&format!("{}/hooks/{}", Self::project_path(project), hook_id)).await
    }

    async fn add_project_hook(&self, project: &ResourceId, opts: &HookOptions) -> Result<ProjectHook, GitLabError> {
        self.http.post(&format!("{}/hooks", Self::project_path(project)), opts).await
    }

    async fn edit_project_hook(&self, project: &ResourceId, hook_id: i64, opts: &HookOptions) -> Result<ProjectHook, GitLabError> {
        self.http.put(&format!("{}/hooks/{}", Self::project_path(project), hook_id), opts).await
    }

    async fn delete_project_hook(&self, project: &ResourceId, hook_id: i64) -> Result<(), GitLabError> {
        self.http.delete(&format!("{}/hooks/{}", Self::project_path(project), hook_id), &[]).await?;
        Ok(())
    }

    async fn get_deploy_key(&self, project: &ResourceId, key_id: i64) -> Result<DeployKey, GitLabError> {
        self.http.get(&format!("{}/deploy_keys/{}", Self::project_path(project), key_id)).await
    }

    async fn add_deploy_key(&self, project: &ResourceId, opts: &DeployKeyOptions) -> Result<DeployKey, GitLabError> {
        self.http.post(&format!("{}/deploy_keys", Self::project_path(project)), opts).await
    }

    async fn update_deploy_key(&self, project: &ResourceId, key_id: i64, opts: &DeployKeyOptions) -> Result<DeployKey, GitLabError> {
        // The key material itself cannot be changed
        let opts = DeployKeyOptions { key: None, ..opts.clone() };
        self.http.put(&format!("{}/deploy_keys/{}", Self::project_path(project), key_id), &opts).await
    }

    async fn delete_deploy_key(&self, project: &ResourceId, key_id: i64) -> Result<(), GitLabError> {
        self.http.delete(&format!("{}/deploy_keys/{}", Self::project_path(project), key_id), &[]).await?;
        Ok(())
    }

    async fn get_pipeline_schedule(&self, project: &ResourceId, schedule_id: i64) -> Result<PipelineSchedule, GitLabError> {
        self.http.get(&format!("{}/pipeline_schedules/{}", Self::project_path(project), schedule_id)).await
    }

    async fn create_pipeline_schedule(&self, project: &ResourceId, opts: &PipelineScheduleOptions) -> Result<PipelineSchedule, GitLabError> {
        self.http.post(&format!("{}/pipeline_schedules", Self::project_path(project)), opts).await
    }

    async fn edit_pipeline_schedule(&self, project: &ResourceId, schedule_id: i64, opts: &PipelineScheduleOptions) -> Result<PipelineSchedule, GitLabError> {
        self.http.put(&format!("{}/pipeline_schedules/{}", Self::project_path(project), schedule_id), opts).await
    }

    async fn delete_pipeline_schedule(&self, project: &ResourceId, schedule_id: i64) -> Result<(), GitLabError> {
        self.http.delete(&format!("{}/pipeline_schedules/{}", Self::project_path(project), schedule_id), &[]).await?;
        Ok(())
    }

    async fn create_pipeline_schedule_variable(&self, project: &ResourceId, schedule_id: i64, variable: &PipelineVariable) -> Result<PipelineVariable, GitLabError> {
        let path = format!("{}/pipeline_schedules/{}/variables", Self::project_path(project), schedule_id);
        self.http.post(&path, variable).await
    }

    async fn edit_pipeline_schedule_variable(&self, project: &ResourceId, schedule_id: i64, variable: &PipelineVariable) -> Result<PipelineVariable, GitLabError> {
        let path = format!(
            "{}/pipeline_schedules/{}/variables/{}",
            Self::project_path(project),
            schedule_id,
            urlencoding::encode(&variable.key)
        );
        self.http.put(&path, variable).await
    }

    async fn delete_pipeline_schedule_variable(&self, project: &ResourceId, schedule_id: i64, key: &str) -> Result<(), GitLabError> {
        let path = format!(
            "{}/pipeline_schedules/{}/variables/{}",
            Self::project_path(project),
            schedule_id,
            urlencoding::encode(key)
        );
        self.http.delete(&path, &[]).await?;
        Ok(())
    }

    async fn get_approval_rule(&self, project: &ResourceId, rule_id: i64) -> Result<ApprovalRule, GitLabError> {
        self.http.get(&format!("{}/approval_rules/{}", Self::project_path(project), rule_id)).await
    }

    async fn create_approval_rule(&self, project: &ResourceId, opts: &ApprovalRuleOptions) -> Result<ApprovalRule, GitLabError> {
        self.http.post(&format!("{}/approval_rules", Self::project_path(project)), opts).await
    }

    async fn update_approval_rule(&self, project: &ResourceId, rule_id: i64, opts: &ApprovalRuleOptions) -> Result<ApprovalRule, GitLabError> {
        self.http.put(&format!("{}/approval_rules/{}", Self::project_path(project), rule_id), opts).await
    }

    async fn delete_approval_rule(&self, project: &ResourceId, rule_id: i64) -> Result<(), GitLabError> {
        self.http.delete(&format!("{}/approval_rules/{}", Self::project_path(project), rule_id), &[]).await?;
        Ok(())
    }

    async fn get_runner(&self, runner_id: i64) -> Result<Runner, GitLabError> {
        self.http.get(&format!("/runners/{}", runner_id)).await
    }

    async fn create_runner(&self, opts: &CreateRunnerOptions) -> Result<CreatedRunner, GitLabError> {
        let runner: CreatedRunner = self.http.post("/user/runners", opts).await?;
        info!("Created GitLab runner {} ({})", runner.id, opts.runner_type);
        Ok(runner)
    }

    async fn update_runner(&self, runner_id: i64, opts: &UpdateRunnerOptions) -> Result<Runner, GitLabError> {
        self.http.put(&format!("/runners/{}", runner_id), opts).await
    }

    async fn delete_runner(&self, runner_id: i64) -> Result<(), GitLabError> {
        self.http.delete(&format!("/runners/{}", runner_id), &[]).await?;
        Ok(())
    }

    async fn get_mattermost(&self, project: &ResourceId) -> Result<MattermostIntegration, GitLabError> {
        self.http.get(&format!("{}/integrations/mattermost", Self::project_path(project))).await
    }

    async fn set_mattermost(&self, project: &ResourceId, opts: &MattermostOptions) -> Result<MattermostIntegration, GitLabError> {
        self.http.put(&format!("{}/integrations/mattermost", Self::project_path(project)), opts).await
    }

    async fn delete_mattermost(&self, project: &ResourceId) -> Result<(), GitLabError> {
        self.http.delete(&format!("{}/integrations/mattermost", Self::project_path(project)), &[]).await?;
        Ok(())
    }

    async fn get_group(&self, id: &ResourceId) -> Result<Group, GitLabError> {
        self.http.get(&Self::group_path(id)).await
    }

    async fn create_group(&self, opts: &GroupOptions) -> Result<Group, GitLabError> {
        let group: Group = self.http.post("/groups", opts).await?;
        info!("Created GitLab group {} (id {})", group.full_path, group.id);
        Ok(group)
    }

    async fn edit_group(&self, id: &ResourceId, opts: &GroupOptions) -> Result<Group, GitLabError> {
        self.http.put(&Self::group_path(id), opts).await
    }

    async fn delete_group(&self, id: &ResourceId, opts: &DeleteOptions) -> Result<DeletionState, GitLabError> {
        self.delete_namespaced(&Self::group_path(id), opts).await
    }

    async fn list_ldap_links(&self, group: &ResourceId) -> Result<Vec<LdapGroupLink>, GitLabError> {
        self.http
            .get_all_pages(&format!("{}/ldap_group_links", Self::group_path(group)), &[])
            .await
    }

    async fn add_ldap_link(&self, group: &ResourceId, opts: &LdapLinkOptions) -> Result<LdapGroupLink, GitLabError> {
        self.http.post(&format!("{}/ldap_group_links", Self::group_path(group)), opts).await
    }

    async fn delete_ldap_link(&self, group: &ResourceId, cn: &str, provider: &str) -> Result<(), GitLabError> {
        let path = format!(
            "{}/ldap_group_links/{}/{}",
            Self::group_path(group),
            urlencoding::encode(provider),
            urlencoding::encode(cn)
        );
        self.http.delete(&path, &[]).await?;
        Ok(())
    }

    async fn get_saml_link(&self, group: &ResourceId, name: &str) -> Result<SamlGroupLink, GitLabError> {
        self.http
            .get(&format!("{}/saml_group_links/{}", Self::group_path(group), urlencoding::encode(name)))
            .await
    }

    async fn add_saml_link(&self, group: &ResourceId, opts: &SamlLinkOptions) -> Result<SamlGroupLink, GitLabError> {
        self.http.post(&format!("{}/saml_group_links", Self::group_path(group)), opts).await
    }

    async fn delete_saml_link(&self, group: &ResourceId, name: &str) -> Result<(), GitLabError> {
        let path = format!("{}/saml_group_links/{}", Self::group_path(group), urlencoding::encode(name));
        self.http.delete(&path, &[]).await?;
        Ok(())
    }

    async fn get_license(&self) -> Result<License, GitLabError> {
        // GitLab answers `null` when no license is installed
        match self.http.get::<Option<License>>("/license").await? {
            Some(license) => Ok(license),
            None => Err(GitLabError::NotFound("/license: no license installed".to_string())),
        }
    }

    async fn add_license(&self, license: &str) -> Result<License, GitLabError> {
        let body = LicenseOptions { license: license.to_string() };
        let license: License = self.http.post("/license", &body).await?;
        info!("Added GitLab license {} (plan {})", license.id, license.plan);
        Ok(license)
    }

    async fn delete_license(&self, license_id: i64) -> Result<(), GitLabError> {
        self.http.delete(&format!("/license/{}", license_id), &[]).await?;
        Ok(())
    }

    async fn get_settings(&self) -> Result<Settings, GitLabError> {
        self.http.get("/application/settings").await
    }

    async fn update_settings(&self, opts: &SettingsOptions) -> Result<Settings, GitLabError> {
        self.http.put("/application/settings", opts).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, GitLabError> {
        let users: Vec<User> = self
            .http
            .get_all_pages("/users", &[("username", username.to_string())])
            .await?;
        Ok(users.into_iter().find(|u| u.username.eq_ignore_ascii_case(username)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deletion_state_from_accepted() {
        assert_eq!(deletion_state_from(202, ""), Some(DeletionState::Pending));
        assert_eq!(deletion_state_from(204, ""), Some(DeletionState::Removed));
        assert_eq!(deletion_state_from(200, ""), Some(DeletionState::Removed));
    }

    #[test]
    fn test_deletion_state_from_pending_message() {
        assert_eq!(
            deletion_state_from(400, "Project has been already marked for deletion"),
            Some(DeletionState::Pending)
        );
        assert_eq!(deletion_state_from(400, "Deletion pending."), Some(DeletionState::Pending));
        assert_eq!(deletion_state_from(409, "DELETION PENDING"), Some(DeletionState::Pending));
    }

    #[test]
    fn test_deletion_state_from_other_errors() {
        assert_eq!(deletion_state_from(400, "full_path is missing"), None);
        assert_eq!(deletion_state_from(403, "Deletion pending."), None);
        assert_eq!(deletion_state_from(500, ""), None);
    }

    #[test]
    fn test_with_query_encodes_filter() {
        let path = with_query(
            "/projects/1/variables/KEY".to_string(),
            &scoped_query(Some("production")),
        );
        assert_eq!(
            path,
            "/projects/1/variables/KEY?filter%5Benvironment_scope%5D=production"
        );
        assert_eq!(with_query("/x".to_string(), &[]), "/x");
    }

    #[test]
    fn test_new_normalises_base_url() {
        let client = GitLabClient::new(
            "https://gitlab.example.com/".to_string(),
            Some("glpat-test".to_string()),
            Duration::from_secs(5),
            RetryPolicy::none(),
        )
        .unwrap();
        assert_eq!(client.base_url(), "https://gitlab.example.com/api/v4");
    }
}
