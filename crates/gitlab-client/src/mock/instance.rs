//! Instance-level operations for MockGitLabClient
//!
//! Handles the license, application settings and user lookups

use super::{MockGitLabClient, apply};
use crate::error::GitLabError;
use crate::models::*;
use chrono::{Duration, Utc};

pub fn get_license(client: &MockGitLabClient) -> Result<License, GitLabError> {
    client
        .license
        .lock()
        .unwrap()
        .clone()
        .ok_or_else(|| GitLabError::NotFound("/license: no license installed".to_string()))
}

pub fn add_license(client: &MockGitLabClient, body: &str) -> Result<License, GitLabError> {
    if body.trim().is_empty() {
        return Err(GitLabError::Api {
            status: 400,
            message: "license is missing".to_string(),
        });
    }
    let id = client.next_id();
    let today = Utc::now().date_naive();
    let license = License {
        id,
        plan: "ultimate".to_string(),
        starts_at: Some(today.format("%Y-%m-%d").to_string()),
        expires_at: Some((today + Duration::days(365)).format("%Y-%m-%d").to_string()),
        expired: false,
        user_limit: Some(100),
        active_users: Some(1),
        licensee: Licensee {
            name: Some("Mock Licensee".to_string()),
            email: Some("licensee@example.com".to_string()),
            company: Some("Example".to_string()),
        },
        ..Default::default()
    };
    *client.license.lock().unwrap() = Some(license.clone());
    Ok(license)
}

pub fn delete_license(client: &MockGitLabClient, license_id: i64) -> Result<(), GitLabError> {
    let mut current = client.license.lock().unwrap();
    if current.as_ref().is_some_and(|license| license.id == license_id) {
        *current = None;
        Ok(())
    } else {
        Err(GitLabError::NotFound(format!("License {} not found", license_id)))
    }
}

pub fn get_settings(client: &MockGitLabClient) -> Result<Settings, GitLabError> {
    Ok(client.settings.lock().unwrap().clone())
}

pub fn update_settings(client: &MockGitLabClient, opts: &SettingsOptions) -> Result<Settings, GitLabError> {
    let mut settings = client.settings.lock().unwrap();
    apply!(
        settings,
        opts,
        default_projects_limit,
        signup_enabled,
        require_two_factor_authentication,
        two_factor_grace_period,
        default_project_visibility,
        default_group_visibility,
        restricted_visibility_levels,
        max_attachment_size,
        session_expire_delay,
        gravatar_enabled,
        after_sign_out_path,
        home_page_url,
        password_authentication_enabled_for_web,
        auto_devops_enabled,
        shared_runners_enabled,
        max_artifacts_size,
        deletion_adjourned_period,
    );
    Ok(settings.clone())
}

pub fn find_user_by_username(client: &MockGitLabClient, username: &str) -> Result<Option<User>, GitLabError> {
    Ok(client
        .users
        .lock()
        .unwrap()
        .values()
        .find(|u| u.username.eq_ignore_ascii_case(username))
        .cloned())
}
