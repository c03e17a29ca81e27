//! Operations shared by projects and groups for MockGitLabClient
//!
//! Handles members, CI/CD variables, deploy tokens, access tokens and shares

use super::{MockGitLabClient, apply};
use crate::error::GitLabError;
use crate::ids::Parent;
use crate::models::*;

/// Scope used when the caller does not pass one
const DEFAULT_SCOPE: &str = "*";

/// Fail with 404 unless the parent project or group exists
fn ensure_parent(client: &MockGitLabClient, parent: &Parent) -> Result<(), GitLabError> {
    let exists = match parent {
        Parent::Project(id) => client
            .project_id(id)
            .map(|id| client.projects.lock().unwrap().contains_key(&id))
            .unwrap_or(false),
        Parent::Group(id) => client
            .group_id(id)
            .map(|id| client.groups.lock().unwrap().contains_key(&id))
            .unwrap_or(false),
    };
    if exists {
        Ok(())
    } else {
        Err(GitLabError::NotFound(format!("{} not found", parent)))
    }
}

pub fn share_with_group(client: &MockGitLabClient, parent: &Parent, opts: &ShareOptions) -> Result<(), GitLabError> {
    ensure_parent(client, parent)?;
    let (group_name, group_full_path) = client
        .groups
        .lock()
        .unwrap()
        .get(&opts.group_id)
        .map(|g| (g.name.clone(), g.full_path.clone()))
        .unwrap_or_else(|| (format!("group-{}", opts.group_id), format!("group-{}", opts.group_id)));
    let share = SharedWithGroup {
        group_id: opts.group_id,
        group_name,
        group_full_path,
        group_access_level: opts.group_access,
        expires_at: opts.expires_at.clone(),
    };

    let shares = |list: &mut Vec<SharedWithGroup>| -> Result<(), GitLabError> {
        if list.iter().any(|s| s.group_id == share.group_id) {
            return Err(GitLabError::Api {
                status: 409,
                message: "Group already shared with this group".to_string(),
            });
        }
        list.push(share.clone());
        Ok(())
    };
    match parent {
        Parent::Project(id) => {
            let id = client.project_id(id)?;
            let mut projects = client.projects.lock().unwrap();
            let project = projects.get_mut(&id).ok_or_else(|| GitLabError::NotFound(format!("Project {} not found", id)))?;
            shares(&mut project.shared_with_groups)
        }
        Parent::Group(id) => {
            let id = client.group_id(id)?;
            let mut groups = client.groups.lock().unwrap();
            let group = groups.get_mut(&id).ok_or_else(|| GitLabError::NotFound(format!("Group {} not found", id)))?;
            shares(&mut group.shared_with_groups)
        }
    }
}

pub fn unshare_with_group(client: &MockGitLabClient, parent: &Parent, group_id: i64) -> Result<(), GitLabError> {
    ensure_parent(client, parent)?;
    let unshare = |list: &mut Vec<SharedWithGroup>| -> Result<(), GitLabError> {
        let before = list.len();
        list.retain(|s| s.group_id != group_id);
        if list.len() == before {
            return Err(GitLabError::NotFound(format!("Share with group {} not found", group_id)));
        }
        Ok(())
    };
    match parent {
        Parent::Project(id) => {
            let id = client.project_id(id)?;
            let mut projects = client.projects.lock().unwrap();
            match projects.get_mut(&id) {
                Some(project) => unshare(&mut project.shared_with_groups),
                None => Err(GitLabError::NotFound(format!("Project {} not found", id))),
            }
        }
        Parent::Group(id) => {
            let id = client.group_id(id)?;
            let mut groups = client.groups.lock().unwrap();
            match groups.get_mut(&id) {
                Some(group) => unshare(&mut group.shared_with_groups),
                None => Err(GitLabError::NotFound(format!("Group {} not found", id))),
            }
        }
    }
}

pub fn get_member(client: &MockGitLabClient, parent: &Parent, user_id: i64) -> Result<Member, GitLabError> {
    client
        .members
        .lock()
        .unwrap()
        .get(&(client.parent_key(parent), user_id))
        .cloned()
        .ok_or_else(|| GitLabError::NotFound(format!("Member {} of {} not found", user_id, parent)))
}

pub fn add_member(client: &MockGitLabClient, parent: &Parent, opts: &MemberOptions) -> Result<Member, GitLabError> {
    ensure_parent(client, parent)?;
    let user_id = opts
        .user_id
        .ok_or_else(|| GitLabError::InvalidRequest("user_id is missing".to_string()))?;
    let access_level = opts
        .access_level
        .ok_or_else(|| GitLabError::InvalidRequest("access_level is missing".to_string()))?;
    let user = client.users.lock().unwrap().get(&user_id).cloned().unwrap_or(User {
        id: user_id,
        username: format!("user{}", user_id),
        name: format!("User {}", user_id),
        state: "active".to_string(),
    });

    let key = (client.parent_key(parent), user_id);
    let mut members = client.members.lock().unwrap();
    if members.contains_key(&key) {
        return Err(GitLabError::Api {
            status: 409,
            message: "Member already exists".to_string(),
        });
    }
    let member = Member {
        id: user_id,
        username: user.username.clone(),
        name: user.name,
        state: user.state,
        access_level,
        expires_at: opts.expires_at.clone(),
        member_role_id: opts.member_role_id,
        web_url: format!("http://gitlab.mock/{}", user.username),
    };
    members.insert(key, member.clone());
    Ok(member)
}

pub fn edit_member(client: &MockGitLabClient, parent: &Parent, user_id: i64, opts: &MemberOptions) -> Result<Member, GitLabError> {
    let key = (client.parent_key(parent), user_id);
    let mut members = client.members.lock().unwrap();
    let member = members
        .get_mut(&key)
        .ok_or_else(|| GitLabError::NotFound(format!("Member {} of {} not found", user_id, parent)))?;
    apply!(member, opts, access_level, expires_at, member_role_id);
    Ok(member.clone())
}

pub fn remove_member(client: &MockGitLabClient, parent: &Parent, user_id: i64) -> Result<(), GitLabError> {
    client
        .members
        .lock()
        .unwrap()
        .remove(&(client.parent_key(parent), user_id))
        .map(|_| ())
        .ok_or_else(|| GitLabError::NotFound(format!("Member {} of {} not found", user_id, parent)))
}

fn variable_key(client: &MockGitLabClient, parent: &Parent, key: &str, scope: &str) -> (String, String, String) {
    (client.parent_key(parent), key.to_string(), scope.to_string())
}

pub fn get_variable(client: &MockGitLabClient, parent: &Parent, key: &str, environment_scope: Option<&str>) -> Result<Variable, GitLabError> {
    let parent_key = client.parent_key(parent);
    let variables = client.variables.lock().unwrap();
    let found = match environment_scope {
        Some(scope) => variables.get(&(parent_key, key.to_string(), scope.to_string())),
        None => variables
            .get(&(parent_key.clone(), key.to_string(), DEFAULT_SCOPE.to_string()))
            .or_else(|| {
                variables
                    .iter()
                    .find(|((p, k, _), _)| *p == parent_key && k == key)
                    .map(|(_, v)| v)
            }),
    };
    found
        .cloned()
        .ok_or_else(|| GitLabError::NotFound(format!("Variable {} of {} not found", key, parent)))
}

pub fn create_variable(client: &MockGitLabClient, parent: &Parent, opts: &VariableOptions) -> Result<Variable, GitLabError> {
    ensure_parent(client, parent)?;
    let key = opts
        .key
        .clone()
        .ok_or_else(|| GitLabError::InvalidRequest("key is missing".to_string()))?;
    let scope = opts.environment_scope.clone().unwrap_or_else(|| DEFAULT_SCOPE.to_string());
    let map_key = variable_key(client, parent, &key, &scope);

    let mut variables = client.variables.lock().unwrap();
    if variables.contains_key(&map_key) {
        return Err(GitLabError::Api {
            status: 400,
            message: format!("(key) {} has already been taken", key),
        });
    }
    let mut variable = Variable {
        key,
        variable_type: "env_var".to_string(),
        environment_scope: scope,
        ..Default::default()
    };
    apply!(variable, opts, value, variable_type, protected, masked, raw, description);
    variables.insert(map_key, variable.clone());
    Ok(variable)
}

pub fn update_variable(client: &MockGitLabClient, parent: &Parent, key: &str, opts: &VariableOptions) -> Result<Variable, GitLabError> {
    let scope = opts.environment_scope.as_deref().unwrap_or(DEFAULT_SCOPE);
    let map_key = variable_key(client, parent, key, scope);
    let mut variables = client.variables.lock().unwrap();
    let variable = variables
        .get_mut(&map_key)
        .ok_or_else(|| GitLabError::NotFound(format!("Variable {} of {} not found", key, parent)))?;
    apply!(variable, opts, value, variable_type, protected, masked, raw, description);
    Ok(variable.clone())
}

pub fn remove_variable(client: &MockGitLabClient, parent: &Parent, key: &str, environment_scope: Option<&str>) -> Result<(), GitLabError> {
    let map_key = variable_key(client, parent, key, environment_scope.unwrap_or(DEFAULT_SCOPE));
    client
        .variables
        .lock()
        .unwrap()
        .remove(&map_key)
        .map(|_| ())
        .ok_or_else(|| GitLabError::NotFound(format!("Variable {} of {} not found", key, parent)))
}

pub fn get_deploy_token(client: &MockGitLabClient, parent: &Parent, token_id: i64) -> Result<DeployToken, GitLabError> {
    client
        .deploy_tokens
        .lock()
        .unwrap()
        .get(&(client.parent_key(parent), token_id))
        .cloned()
        .ok_or_else(|| GitLabError::NotFound(format!("Deploy token {} of {} not found", token_id, parent)))
}

pub fn create_deploy_token(client: &MockGitLabClient, parent: &Parent, opts: &DeployTokenOptions) -> Result<DeployToken, GitLabError> {
    ensure_parent(client, parent)?;
    if opts.scopes.is_empty() {
        return Err(GitLabError::Api {
            status: 400,
            message: "scopes is missing".to_string(),
        });
    }
    let id = client.next_id();
    let created = DeployToken {
        id,
        name: opts.name.clone(),
        username: opts.username.clone().unwrap_or_else(|| format!("gitlab+deploy-token-{}", id)),
        expires_at: opts.expires_at.clone(),
        scopes: opts.scopes.clone(),
        revoked: false,
        expired: false,
        token: Some(format!("gldt-mock{}", id)),
    };
    let stored = DeployToken {
        token: None,
        ..created.clone()
    };
    client
        .deploy_tokens
        .lock()
        .unwrap()
        .insert((client.parent_key(parent), id), stored);
    Ok(created)
}

pub fn delete_deploy_token(client: &MockGitLabClient, parent: &Parent, token_id: i64) -> Result<(), GitLabError> {
    client
        .deploy_tokens
        .lock()
        .unwrap()
        .remove(&(client.parent_key(parent), token_id))
        .map(|_| ())
        .ok_or_else(|| GitLabError::NotFound(format!("Deploy token {} of {} not found", token_id, parent)))
}

pub fn get_access_token(client: &MockGitLabClient, parent: &Parent, token_id: i64) -> Result<AccessToken, GitLabError> {
    client
        .access_tokens
        .lock()
        .unwrap()
        .get(&(client.parent_key(parent), token_id))
        .cloned()
        .ok_or_else(|| GitLabError::NotFound(format!("Access token {} of {} not found", token_id, parent)))
}

pub fn create_access_token(client: &MockGitLabClient, parent: &Parent, opts: &AccessTokenOptions) -> Result<AccessToken, GitLabError> {
    ensure_parent(client, parent)?;
    let id = client.next_id();
    let created = AccessToken {
        id,
        name: opts.name.clone(),
        scopes: opts.scopes.clone(),
        access_level: opts.access_level.unwrap_or(40),
        expires_at: opts.expires_at.clone(),
        active: true,
        revoked: false,
        user_id: Some(id + 10_000),
        token: Some(format!("glpat-mock{}", id)),
    };
    let stored = AccessToken {
        token: None,
        ..created.clone()
    };
    client
        .access_tokens
        .lock()
        .unwrap()
        .insert((client.parent_key(parent), id), stored);
    Ok(created)
}

pub fn revoke_access_token(client: &MockGitLabClient, parent: &Parent, token_id: i64) -> Result<(), GitLabError> {
    let key = (client.parent_key(parent), token_id);
    let mut tokens = client.access_tokens.lock().unwrap();
    let token = tokens
        .get_mut(&key)
        .ok_or_else(|| GitLabError::NotFound(format!("Access token {} of {} not found", token_id, parent)))?;
    // Revoked tokens stay readable, like on GitLab
    token.revoked = true;
    token.active = false;
    Ok(())
}
