//! Project-scoped models: projects, push rules, hooks, deploy keys,
//! pipeline schedules, approval rules, runners, integrations

use super::SharedWithGroup;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Namespace a project belongs to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectNamespace {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub kind: String,
    pub full_path: String,
}

/// Project (`/projects/:id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub path_with_namespace: String,
    pub description: Option<String>,
    pub default_branch: Option<String>,
    pub visibility: String,
    pub namespace: Option<ProjectNamespace>,
    pub topics: Vec<String>,
    pub web_url: String,
    pub http_url_to_repo: String,
    pub ssh_url_to_repo: String,
    pub archived: bool,
    pub issues_access_level: Option<String>,
    pub merge_requests_access_level: Option<String>,
    pub builds_access_level: Option<String>,
    pub wiki_access_level: Option<String>,
    pub snippets_access_level: Option<String>,
    pub container_registry_access_level: Option<String>,
    pub lfs_enabled: Option<bool>,
    pub request_access_enabled: Option<bool>,
    pub only_allow_merge_if_pipeline_succeeds: Option<bool>,
    pub only_allow_merge_if_all_discussions_are_resolved: Option<bool>,
    pub merge_method: Option<String>,
    pub squash_option: Option<String>,
    pub remove_source_branch_after_merge: Option<bool>,
    pub auto_devops_enabled: Option<bool>,
    pub ci_config_path: Option<String>,
    pub shared_runners_enabled: Option<bool>,
    pub build_timeout: Option<i64>,
    pub runners_token: Option<String>,
    pub shared_with_groups: Vec<SharedWithGroup>,
    /// Set once the project is pending delayed deletion
    pub marked_for_deletion_on: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_activity_at: Option<DateTime<Utc>>,
}

/// Request body for creating (`POST /projects`) or editing (`PUT /projects/:id`) a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues_access_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_requests_access_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builds_access_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wiki_access_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippets_access_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_registry_access_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lfs_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_access_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_allow_merge_if_pipeline_succeeds: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_allow_merge_if_all_discussions_are_resolved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub squash_option: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_source_branch_after_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_devops_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_config_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_runners_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_timeout: Option<i64>,
}

/// Push rules of a project (`/projects/:id/push_rule`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushRules {
    pub id: i64,
    pub project_id: Option<i64>,
    pub commit_message_regex: Option<String>,
    pub commit_message_negative_regex: Option<String>,
    pub branch_name_regex: Option<String>,
    pub author_email_regex: Option<String>,
    pub file_name_regex: Option<String>,
    pub deny_delete_tag: Option<bool>,
    pub member_check: Option<bool>,
    pub prevent_secrets: Option<bool>,
    pub commit_committer_check: Option<bool>,
    pub reject_unsigned_commits: Option<bool>,
    pub max_file_size: Option<i64>,
}

/// Request body for adding or editing push rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushRuleOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message_regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message_negative_regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_name_regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email_regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name_regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deny_delete_tag: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prevent_secrets: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_committer_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject_unsigned_commits: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<i64>,
}

/// Project webhook (`/projects/:id/hooks/:hook_id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectHook {
    pub id: i64,
    pub url: String,
    pub project_id: i64,
    pub push_events: bool,
    pub push_events_branch_filter: Option<String>,
    pub issues_events: bool,
    pub confidential_issues_events: bool,
    pub merge_requests_events: bool,
    pub tag_push_events: bool,
    pub note_events: bool,
    pub job_events: bool,
    pub pipeline_events: bool,
    pub wiki_page_events: bool,
    pub deployment_events: bool,
    pub releases_events: bool,
    pub enable_ssl_verification: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body for adding or editing a project hook
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HookOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Secret token; write-only, never returned by the API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_events_branch_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidential_issues_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_requests_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_push_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wiki_page_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub releases_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_ssl_verification: Option<bool>,
}

/// Deploy key (`/projects/:id/deploy_keys/:key_id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployKey {
    pub id: i64,
    pub title: String,
    pub key: String,
    pub fingerprint: Option<String>,
    pub can_push: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body for adding or editing a deploy key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeployKeyOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_push: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// Variable attached to a pipeline schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineVariable {
    pub key: String,
    pub value: String,
    pub variable_type: String,
}

/// Pipeline schedule (`/projects/:id/pipeline_schedules/:schedule_id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSchedule {
    pub id: i64,
    pub description: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub cron: String,
    pub cron_timezone: String,
    pub active: bool,
    pub next_run_at: Option<DateTime<Utc>>,
    pub owner: Option<super::User>,
    pub variables: Vec<PipelineVariable>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request body for creating or editing a pipeline schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineScheduleOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron_timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Protected branch reference inside an approval rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectedBranchRef {
    pub id: i64,
    pub name: String,
}

/// Group reference inside an approval rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupRef {
    pub id: i64,
    pub name: String,
    pub full_path: String,
}

/// Merge request approval rule (`/projects/:id/approval_rules/:rule_id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalRule {
    pub id: i64,
    pub name: String,
    pub rule_type: String,
    pub report_type: Option<String>,
    pub approvals_required: i64,
    pub users: Vec<super::User>,
    pub groups: Vec<GroupRef>,
    pub protected_branches: Vec<ProtectedBranchRef>,
    pub applies_to_all_protected_branches: bool,
}

/// Request body for creating or updating an approval rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRuleOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approvals_required: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protected_branch_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applies_to_all_protected_branches: Option<bool>,
}

/// Runner details (`/runners/:id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Runner {
    pub id: i64,
    pub description: String,
    pub paused: bool,
    pub is_shared: bool,
    pub runner_type: String,
    pub status: String,
    pub online: Option<bool>,
    pub tag_list: Vec<String>,
    pub run_untagged: bool,
    pub locked: bool,
    pub access_level: String,
    pub maximum_timeout: Option<i64>,
    pub maintenance_note: Option<String>,
}

/// Request body for `POST /user/runners`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateRunnerOptions {
    /// `instance_type`, `group_type` or `project_type`
    pub runner_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_untagged: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_list: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_note: Option<String>,
}

/// Response of `POST /user/runners`; the token is returned only here
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatedRunner {
    pub id: i64,
    pub token: String,
    pub token_expires_at: Option<DateTime<Utc>>,
}

/// Request body for `PUT /runners/:id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateRunnerOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_untagged: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_list: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_note: Option<String>,
}

/// Mattermost notification settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MattermostProperties {
    /// Masked or absent in responses
    pub webhook: Option<String>,
    pub username: Option<String>,
    pub channel: Option<String>,
    pub notify_only_broken_pipelines: Option<bool>,
    pub branches_to_be_notified: Option<String>,
}

/// Mattermost integration (`/projects/:id/integrations/mattermost`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MattermostIntegration {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub active: bool,
    pub push_events: bool,
    pub issues_events: bool,
    pub confidential_issues_events: bool,
    pub merge_requests_events: bool,
    pub tag_push_events: bool,
    pub note_events: bool,
    pub pipeline_events: bool,
    pub wiki_page_events: bool,
    pub properties: MattermostProperties,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request body for `PUT /projects/:id/integrations/mattermost`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MattermostOptions {
    pub webhook: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_only_broken_pipelines: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches_to_be_notified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidential_issues_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_requests_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_push_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wiki_page_events: Option<bool>,
}
