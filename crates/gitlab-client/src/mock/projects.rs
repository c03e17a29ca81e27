//! Project operations for MockGitLabClient
//!
//! Handles projects, push rules, hooks, deploy keys, pipeline schedules,
//! approval rules, runners and the Mattermost integration

use super::{MockGitLabClient, apply};
use crate::client::deletion_state_from;
use crate::error::GitLabError;
use crate::ids::ResourceId;
use crate::models::*;
use chrono::Utc;

fn not_found(what: &str, id: impl std::fmt::Display) -> GitLabError {
    GitLabError::NotFound(format!("{} {} not found", what, id))
}

pub fn get_project(client: &MockGitLabClient, id: &ResourceId) -> Result<Project, GitLabError> {
    let id = client.project_id(id)?;
    client
        .projects
        .lock()
        .unwrap()
        .get(&id)
        .cloned()
        .ok_or_else(|| not_found("Project", id))
}

pub fn create_project(client: &MockGitLabClient, opts: &ProjectOptions) -> Result<Project, GitLabError> {
    let name = opts
        .name
        .clone()
        .or_else(|| opts.path.clone())
        .ok_or_else(|| GitLabError::InvalidRequest("name or path is required".to_string()))?;
    let path = opts.path.clone().unwrap_or_else(|| name.to_lowercase().replace(' ', "-"));

    let namespace = match opts.namespace_id {
        Some(ns) => client
            .groups
            .lock()
            .unwrap()
            .get(&ns)
            .map(|g| ProjectNamespace {
                id: g.id,
                name: g.name.clone(),
                path: g.path.clone(),
                kind: "group".to_string(),
                full_path: g.full_path.clone(),
            })
            .unwrap_or(ProjectNamespace {
                id: ns,
                name: format!("group-{}", ns),
                path: format!("group-{}", ns),
                kind: "group".to_string(),
                full_path: format!("group-{}", ns),
            }),
        None => ProjectNamespace {
            id: 1,
            name: "root".to_string(),
            path: "root".to_string(),
            kind: "user".to_string(),
            full_path: "root".to_string(),
        },
    };

    let id = client.next_id();
    let full_path = format!("{}/{}", namespace.full_path, path);
    let mut project = Project {
        id,
        name,
        path,
        path_with_namespace: full_path.clone(),
        visibility: "private".to_string(),
        default_branch: Some("main".to_string()),
        web_url: format!("http://gitlab.mock/{}", full_path),
        http_url_to_repo: format!("http://gitlab.mock/{}.git", full_path),
        ssh_url_to_repo: format!("git@gitlab.mock:{}.git", full_path),
        namespace: Some(namespace),
        runners_token: Some(format!("GR1348941mock{}", id)),
        issues_access_level: Some("enabled".to_string()),
        merge_requests_access_level: Some("enabled".to_string()),
        builds_access_level: Some("enabled".to_string()),
        wiki_access_level: Some("enabled".to_string()),
        snippets_access_level: Some("enabled".to_string()),
        container_registry_access_level: Some("enabled".to_string()),
        lfs_enabled: Some(true),
        request_access_enabled: Some(true),
        only_allow_merge_if_pipeline_succeeds: Some(false),
        only_allow_merge_if_all_discussions_are_resolved: Some(false),
        merge_method: Some("merge".to_string()),
        squash_option: Some("default_off".to_string()),
        remove_source_branch_after_merge: Some(true),
        auto_devops_enabled: Some(false),
        ci_config_path: Some(String::new()),
        shared_runners_enabled: Some(true),
        build_timeout: Some(3600),
        created_at: Some(Utc::now()),
        ..Default::default()
    };
    apply_project_options(&mut project, opts);
    client.projects.lock().unwrap().insert(id, project.clone());
    Ok(project)
}

fn apply_project_options(project: &mut Project, opts: &ProjectOptions) {
    apply!(
        project,
        opts,
        name,
        description,
        default_branch,
        visibility,
        topics,
        archived,
        issues_access_level,
        merge_requests_access_level,
        builds_access_level,
        wiki_access_level,
        snippets_access_level,
        container_registry_access_level,
        lfs_enabled,
        request_access_enabled,
        only_allow_merge_if_pipeline_succeeds,
        only_allow_merge_if_all_discussions_are_resolved,
        merge_method,
        squash_option,
        remove_source_branch_after_merge,
        auto_devops_enabled,
        ci_config_path,
        shared_runners_enabled,
        build_timeout,
    );
}

pub fn edit_project(client: &MockGitLabClient, id: &ResourceId, opts: &ProjectOptions) -> Result<Project, GitLabError> {
    let id = client.project_id(id)?;
    let mut projects = client.projects.lock().unwrap();
    let project = projects.get_mut(&id).ok_or_else(|| not_found("Project", id))?;
    apply_project_options(project, opts);
    Ok(project.clone())
}

pub fn delete_project(client: &MockGitLabClient, id: &ResourceId, opts: &DeleteOptions) -> Result<DeletionState, GitLabError> {
    let id = client.project_id(id)?;
    let delayed = *client.delayed_deletion.lock().unwrap();
    let mut projects = client.projects.lock().unwrap();
    let project = projects.get_mut(&id).ok_or_else(|| not_found("Project", id))?;

    if opts.permanently_remove == Some(true) {
        if project.marked_for_deletion_on.is_none() {
            return Err(GitLabError::Api {
                status: 400,
                message: "Project must be marked for deletion first".to_string(),
            });
        }
        if opts.full_path.as_deref() != Some(project.path_with_namespace.as_str()) {
            return Err(GitLabError::Api {
                status: 400,
                message: "full_path does not match".to_string(),
            });
        }
        projects.remove(&id);
        return Ok(DeletionState::Removed);
    }

    if !delayed {
        projects.remove(&id);
        return Ok(DeletionState::Removed);
    }
    if project.marked_for_deletion_on.is_some() {
        let message = "Project has been already marked for deletion";
        return deletion_state_from(400, message).ok_or_else(|| GitLabError::Api {
            status: 400,
            message: message.to_string(),
        });
    }
    project.marked_for_deletion_on = Some(Utc::now().format("%Y-%m-%d").to_string());
    Ok(DeletionState::Pending)
}

pub fn get_push_rules(client: &MockGitLabClient, project: &ResourceId) -> Result<Option<PushRules>, GitLabError> {
    let id = get_project(client, project)?.id;
    Ok(client.push_rules.lock().unwrap().get(&id).cloned())
}

pub fn set_push_rules(
    client: &MockGitLabClient,
    project: &ResourceId,
    opts: &PushRuleOptions,
    existing: bool,
) -> Result<PushRules, GitLabError> {
    let id = get_project(client, project)?.id;
    let mut all = client.push_rules.lock().unwrap();
    if existing != all.contains_key(&id) {
        return Err(GitLabError::Api {
            status: if existing { 404 } else { 422 },
            message: "push rule state mismatch".to_string(),
        });
    }
    let rules = all.entry(id).or_insert_with(|| PushRules {
        id,
        project_id: Some(id),
        ..Default::default()
    });
    apply!(
        rules,
        opts,
        commit_message_regex,
        commit_message_negative_regex,
        branch_name_regex,
        author_email_regex,
        file_name_regex,
        deny_delete_tag,
        member_check,
        prevent_secrets,
        commit_committer_check,
        reject_unsigned_commits,
        max_file_size,
    );
    Ok(rules.clone())
}

pub fn get_project_hook(client: &MockGitLabClient, project: &ResourceId, hook_id: i64) -> Result<ProjectHook, GitLabError> {
    let pid = client.project_id(project)?;
    client
        .hooks
        .lock()
        .unwrap()
        .get(&(pid, hook_id))
        .cloned()
        .ok_or_else(|| not_found("Hook", hook_id))
}

fn apply_hook_options(hook: &mut ProjectHook, opts: &HookOptions) {
    apply!(
        hook,
        opts,
        url,
        push_events,
        push_events_branch_filter,
        issues_events,
        confidential_issues_events,
        merge_requests_events,
        tag_push_events,
        note_events,
        job_events,
        pipeline_events,
        wiki_page_events,
        deployment_events,
        releases_events,
        enable_ssl_verification,
    );
}

pub fn add_project_hook(client: &MockGitLabClient, project: &ResourceId, opts: &HookOptions) -> Result<ProjectHook, GitLabError> {
    let pid = get_project(client, project)?.id;
    if opts.url.as_deref().unwrap_or_default().is_empty() {
        return Err(GitLabError::Api {
            status: 400,
            message: "url is missing".to_string(),
        });
    }
    let id = client.next_id();
    let mut hook = ProjectHook {
        id,
        project_id: pid,
        push_events: true,
        enable_ssl_verification: true,
        created_at: Some(Utc::now()),
        ..Default::default()
    };
    apply_hook_options(&mut hook, opts);
    client.hooks.lock().unwrap().insert((pid, id), hook.clone());
    Ok(hook)
}

pub fn edit_project_hook(client: &MockGitLabClient, project: &ResourceId, hook_id: i64, opts: &HookOptions) -> Result<ProjectHook, GitLabError> {
    let pid = client.project_id(project)?;
    let mut hooks = client.hooks.lock().unwrap();
    let hook = hooks.get_mut(&(pid, hook_id)).ok_or_else(|| not_found("Hook", hook_id))?;
    apply_hook_options(hook, opts);
    Ok(hook.clone())
}

pub fn delete_project_hook(client: &MockGitLabClient, project: &ResourceId, hook_id: i64) -> Result<(), GitLabError> {
    let pid = client.project_id(project)?;
    client
        .hooks
        .lock()
        .unwrap()
        .remove(&(pid, hook_id))
        .map(|_| ())
        .ok_or_else(|| not_found("Hook", hook_id))
}

pub fn get_deploy_key(client: &MockGitLabClient, project: &ResourceId, key_id: i64) -> Result<DeployKey, GitLabError> {
    let pid = client.project_id(project)?;
    client
        .deploy_keys
        .lock()
        .unwrap()
        .get(&(pid, key_id))
        .cloned()
        .ok_or_else(|| not_found("Deploy key", key_id))
}

pub fn add_deploy_key(client: &MockGitLabClient, project: &ResourceId, opts: &DeployKeyOptions) -> Result<DeployKey, GitLabError> {
    let pid = get_project(client, project)?.id;
    let key = opts
        .key
        .clone()
        .ok_or_else(|| GitLabError::InvalidRequest("key is missing".to_string()))?;
    let id = client.next_id();
    let deploy_key = DeployKey {
        id,
        title: opts.title.clone().unwrap_or_default(),
        key,
        fingerprint: Some(format!("SHA256:mock{}", id)),
        can_push: opts.can_push.unwrap_or(false),
        expires_at: None,
        created_at: Some(Utc::now()),
    };
    client.deploy_keys.lock().unwrap().insert((pid, id), deploy_key.clone());
    Ok(deploy_key)
}

pub fn update_deploy_key(client: &MockGitLabClient, project: &ResourceId, key_id: i64, opts: &DeployKeyOptions) -> Result<DeployKey, GitLabError> {
    let pid = client.project_id(project)?;
    let mut keys = client.deploy_keys.lock().unwrap();
    let key = keys.get_mut(&(pid, key_id)).ok_or_else(|| not_found("Deploy key", key_id))?;
    apply!(key, opts, title, can_push);
    Ok(key.clone())
}

pub fn delete_deploy_key(client: &MockGitLabClient, project: &ResourceId, key_id: i64) -> Result<(), GitLabError> {
    let pid = client.project_id(project)?;
    client
        .deploy_keys
        .lock()
        .unwrap()
        .remove(&(pid, key_id))
        .map(|_| ())
        .ok_or_else(|| not_found("Deploy key", key_id))
}

pub fn get_pipeline_schedule(client: &MockGitLabClient, project: &ResourceId, schedule_id: i64) -> Result<PipelineSchedule, GitLabError> {
    let pid = client.project_id(project)?;
    client
        .schedules
        .lock()
        .unwrap()
        .get(&(pid, schedule_id))
        .cloned()
        .ok_or_else(|| not_found("Pipeline schedule", schedule_id))
}

pub fn create_pipeline_schedule(client: &MockGitLabClient, project: &ResourceId, opts: &PipelineScheduleOptions) -> Result<PipelineSchedule, GitLabError> {
    let pid = get_project(client, project)?.id;
    let id = client.next_id();
    let mut schedule = PipelineSchedule {
        id,
        cron_timezone: "UTC".to_string(),
        active: true,
        created_at: Some(Utc::now()),
        ..Default::default()
    };
    apply!(schedule, opts, description, git_ref, cron, cron_timezone, active);
    client.schedules.lock().unwrap().insert((pid, id), schedule.clone());
    Ok(schedule)
}

pub fn edit_pipeline_schedule(client: &MockGitLabClient, project: &ResourceId, schedule_id: i64, opts: &PipelineScheduleOptions) -> Result<PipelineSchedule, GitLabError> {
    let pid = client.project_id(project)?;
    let mut schedules = client.schedules.lock().unwrap();
    let schedule = schedules
        .get_mut(&(pid, schedule_id))
        .ok_or_else(|| not_found("Pipeline schedule", schedule_id))?;
    apply!(schedule, opts, description, git_ref, cron, cron_timezone, active);
    schedule.updated_at = Some(Utc::now());
    Ok(schedule.clone())
}

pub fn delete_pipeline_schedule(client: &MockGitLabClient, project: &ResourceId, schedule_id: i64) -> Result<(), GitLabError> {
    let pid = client.project_id(project)?;
    client
        .schedules
        .lock()
        .unwrap()
        .remove(&(pid, schedule_id))
        .map(|_| ())
        .ok_or_else(|| not_found("Pipeline schedule", schedule_id))
}

pub fn upsert_schedule_variable(
    client: &MockGitLabClient,
    project: &ResourceId,
    schedule_id: i64,
    variable: &PipelineVariable,
    existing: bool,
) -> Result<PipelineVariable, GitLabError> {
    let pid = client.project_id(project)?;
    let mut schedules = client.schedules.lock().unwrap();
    let schedule = schedules
        .get_mut(&(pid, schedule_id))
        .ok_or_else(|| not_found("Pipeline schedule", schedule_id))?;
    let mut stored = variable.clone();
    if stored.variable_type.is_empty() {
        stored.variable_type = "env_var".to_string();
    }
    let position = schedule.variables.iter().position(|v| v.key == variable.key);
    match (position, existing) {
        (Some(index), true) => schedule.variables[index] = stored.clone(),
        (None, false) => schedule.variables.push(stored.clone()),
        (Some(_), false) => {
            return Err(GitLabError::Api {
                status: 400,
                message: format!("Variable {} has already been taken", variable.key),
            });
        }
        (None, true) => return Err(not_found("Variable", &variable.key)),
    }
    Ok(stored)
}

pub fn delete_schedule_variable(client: &MockGitLabClient, project: &ResourceId, schedule_id: i64, key: &str) -> Result<(), GitLabError> {
    let pid = client.project_id(project)?;
    let mut schedules = client.schedules.lock().unwrap();
    let schedule = schedules
        .get_mut(&(pid, schedule_id))
        .ok_or_else(|| not_found("Pipeline schedule", schedule_id))?;
    let before = schedule.variables.len();
    schedule.variables.retain(|v| v.key != key);
    if schedule.variables.len() == before {
        return Err(not_found("Variable", key));
    }
    Ok(())
}

fn apply_rule_options(client: &MockGitLabClient, rule: &mut ApprovalRule, opts: &ApprovalRuleOptions) {
    apply!(rule, opts, name, approvals_required, rule_type, report_type, applies_to_all_protected_branches);
    if let Some(user_ids) = &opts.user_ids {
        let users = client.users.lock().unwrap();
        rule.users = user_ids
            .iter()
            .map(|id| {
                users.get(id).cloned().unwrap_or(User {
                    id: *id,
                    ..Default::default()
                })
            })
            .collect();
    }
    if let Some(group_ids) = &opts.group_ids {
        rule.groups = group_ids
            .iter()
            .map(|id| GroupRef {
                id: *id,
                ..Default::default()
            })
            .collect();
    }
    if let Some(branch_ids) = &opts.protected_branch_ids {
        rule.protected_branches = branch_ids
            .iter()
            .map(|id| ProtectedBranchRef {
                id: *id,
                ..Default::default()
            })
            .collect();
    }
}

pub fn get_approval_rule(client: &MockGitLabClient, project: &ResourceId, rule_id: i64) -> Result<ApprovalRule, GitLabError> {
    let pid = client.project_id(project)?;
    client
        .approval_rules
        .lock()
        .unwrap()
        .get(&(pid, rule_id))
        .cloned()
        .ok_or_else(|| not_found("Approval rule", rule_id))
}

pub fn create_approval_rule(client: &MockGitLabClient, project: &ResourceId, opts: &ApprovalRuleOptions) -> Result<ApprovalRule, GitLabError> {
    let pid = get_project(client, project)?.id;
    let id = client.next_id();
    let mut rule = ApprovalRule {
        id,
        rule_type: "regular".to_string(),
        ..Default::default()
    };
    apply_rule_options(client, &mut rule, opts);
    client.approval_rules.lock().unwrap().insert((pid, id), rule.clone());
    Ok(rule)
}

pub fn update_approval_rule(client: &MockGitLabClient, project: &ResourceId, rule_id: i64, opts: &ApprovalRuleOptions) -> Result<ApprovalRule, GitLabError> {
    let pid = client.project_id(project)?;
    let mut rule = get_approval_rule(client, project, rule_id)?;
    apply_rule_options(client, &mut rule, opts);
    client.approval_rules.lock().unwrap().insert((pid, rule_id), rule.clone());
    Ok(rule)
}

pub fn delete_approval_rule(client: &MockGitLabClient, project: &ResourceId, rule_id: i64) -> Result<(), GitLabError> {
    let pid = client.project_id(project)?;
    client
        .approval_rules
        .lock()
        .unwrap()
        .remove(&(pid, rule_id))
        .map(|_| ())
        .ok_or_else(|| not_found("Approval rule", rule_id))
}

pub fn get_runner(client: &MockGitLabClient, runner_id: i64) -> Result<Runner, GitLabError> {
    client
        .runners
        .lock()
        .unwrap()
        .get(&runner_id)
        .cloned()
        .ok_or_else(|| not_found("Runner", runner_id))
}

pub fn create_runner(client: &MockGitLabClient, opts: &CreateRunnerOptions) -> Result<CreatedRunner, GitLabError> {
    let id = client.next_id();
    let mut runner = Runner {
        id,
        runner_type: opts.runner_type.clone(),
        is_shared: opts.runner_type == "instance_type",
        status: "never_contacted".to_string(),
        access_level: "not_protected".to_string(),
        ..Default::default()
    };
    apply!(
        runner,
        opts,
        description,
        paused,
        locked,
        run_untagged,
        tag_list,
        access_level,
        maximum_timeout,
        maintenance_note,
    );
    client.runners.lock().unwrap().insert(id, runner);
    Ok(CreatedRunner {
        id,
        token: format!("glrt-mock{}", id),
        token_expires_at: None,
    })
}

pub fn update_runner(client: &MockGitLabClient, runner_id: i64, opts: &UpdateRunnerOptions) -> Result<Runner, GitLabError> {
    let mut runners = client.runners.lock().unwrap();
    let runner = runners.get_mut(&runner_id).ok_or_else(|| not_found("Runner", runner_id))?;
    apply!(
        runner,
        opts,
        description,
        paused,
        locked,
        run_untagged,
        tag_list,
        access_level,
        maximum_timeout,
        maintenance_note,
    );
    Ok(runner.clone())
}

pub fn delete_runner(client: &MockGitLabClient, runner_id: i64) -> Result<(), GitLabError> {
    client
        .runners
        .lock()
        .unwrap()
        .remove(&runner_id)
        .map(|_| ())
        .ok_or_else(|| not_found("Runner", runner_id))
}

pub fn get_mattermost(client: &MockGitLabClient, project: &ResourceId) -> Result<MattermostIntegration, GitLabError> {
    let pid = client.project_id(project)?;
    client
        .mattermost
        .lock()
        .unwrap()
        .get(&pid)
        .cloned()
        .ok_or_else(|| not_found("Mattermost integration for project", pid))
}

pub fn set_mattermost(client: &MockGitLabClient, project: &ResourceId, opts: &MattermostOptions) -> Result<MattermostIntegration, GitLabError> {
    let pid = get_project(client, project)?.id;
    let id = client.next_id();
    let mut all = client.mattermost.lock().unwrap();
    let integration = all.entry(pid).or_insert_with(|| MattermostIntegration {
        id,
        title: "Mattermost notifications".to_string(),
        slug: "mattermost".to_string(),
        created_at: Some(Utc::now()),
        ..Default::default()
    });
    integration.active = true;
    // The webhook is write-only; the API never echoes it back
    integration.properties.webhook = None;
    integration.properties.username = opts.username.clone();
    integration.properties.channel = opts.channel.clone();
    integration.properties.notify_only_broken_pipelines = opts.notify_only_broken_pipelines;
    integration.properties.branches_to_be_notified = opts.branches_to_be_notified.clone();
    apply!(
        integration,
        opts,
        push_events,
        issues_events,
        confidential_issues_events,
        merge_requests_events,
        tag_push_events,
        note_events,
        pipeline_events,
        wiki_page_events,
    );
    integration.updated_at = Some(Utc::now());
    Ok(integration.clone())
}

pub fn delete_mattermost(client: &MockGitLabClient, project: &ResourceId) -> Result<(), GitLabError> {
    let pid = client.project_id(project)?;
    client
        .mattermost
        .lock()
        .unwrap()
        .remove(&pid)
        .map(|_| ())
        .ok_or_else(|| not_found("Mattermost integration for project", pid))
}
