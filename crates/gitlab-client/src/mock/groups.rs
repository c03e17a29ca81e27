//! Group operations for MockGitLabClient
//!
//! Handles groups and LDAP/SAML group links

use super::{MockGitLabClient, apply};
use crate::client::deletion_state_from;
use crate::error::GitLabError;
use crate::ids::ResourceId;
use crate::models::*;
use chrono::Utc;

pub fn get_group(client: &MockGitLabClient, id: &ResourceId) -> Result<Group, GitLabError> {
    let id = client.group_id(id)?;
    client
        .groups
        .lock()
        .unwrap()
        .get(&id)
        .cloned()
        .ok_or_else(|| GitLabError::NotFound(format!("Group {} not found", id)))
}

fn apply_group_options(group: &mut Group, opts: &GroupOptions) {
    apply!(
        group,
        opts,
        name,
        description,
        visibility,
        lfs_enabled,
        request_access_enabled,
        project_creation_level,
        subgroup_creation_level,
        share_with_group_lock,
        require_two_factor_authentication,
        two_factor_grace_period,
        auto_devops_enabled,
        emails_disabled,
        mentions_disabled,
        default_branch,
        default_branch_protection_defaults,
    );
}

pub fn create_group(client: &MockGitLabClient, opts: &GroupOptions) -> Result<Group, GitLabError> {
    let name = opts
        .name
        .clone()
        .ok_or_else(|| GitLabError::InvalidRequest("name is missing".to_string()))?;
    let path = opts
        .path
        .clone()
        .ok_or_else(|| GitLabError::InvalidRequest("path is missing".to_string()))?;
    let parent_path = match opts.parent_id {
        Some(parent_id) => Some(get_group(client, &parent_id.into())?.full_path),
        None => None,
    };
    let full_path = match parent_path {
        Some(parent) => format!("{}/{}", parent, path),
        None => path.clone(),
    };

    let mut groups = client.groups.lock().unwrap();
    if groups.values().any(|g| g.full_path == full_path) {
        return Err(GitLabError::Api {
            status: 400,
            message: "Failed to save group {:path=>[\"has already been taken\"]}".to_string(),
        });
    }
    let id = client.next_id();
    let mut group = Group {
        id,
        name: name.clone(),
        path,
        full_name: name,
        full_path: full_path.clone(),
        visibility: "private".to_string(),
        parent_id: opts.parent_id,
        web_url: format!("http://gitlab.mock/groups/{}", full_path),
        lfs_enabled: Some(true),
        request_access_enabled: Some(true),
        project_creation_level: Some("developer".to_string()),
        subgroup_creation_level: Some("maintainer".to_string()),
        share_with_group_lock: Some(false),
        require_two_factor_authentication: Some(false),
        two_factor_grace_period: Some(48),
        auto_devops_enabled: None,
        emails_disabled: Some(false),
        mentions_disabled: Some(false),
        runners_token: Some(format!("GR1348941group{}", id)),
        created_at: Some(Utc::now()),
        ..Default::default()
    };
    apply_group_options(&mut group, opts);
    groups.insert(id, group.clone());
    Ok(group)
}

pub fn edit_group(client: &MockGitLabClient, id: &ResourceId, opts: &GroupOptions) -> Result<Group, GitLabError> {
    let id = client.group_id(id)?;
    let mut groups = client.groups.lock().unwrap();
    let group = groups
        .get_mut(&id)
        .ok_or_else(|| GitLabError::NotFound(format!("Group {} not found", id)))?;
    apply_group_options(group, opts);
    Ok(group.clone())
}

pub fn delete_group(client: &MockGitLabClient, id: &ResourceId, opts: &DeleteOptions) -> Result<DeletionState, GitLabError> {
    let id = client.group_id(id)?;
    let delayed = *client.delayed_deletion.lock().unwrap();
    let mut groups = client.groups.lock().unwrap();
    let group = groups
        .get_mut(&id)
        .ok_or_else(|| GitLabError::NotFound(format!("Group {} not found", id)))?;

    if opts.permanently_remove == Some(true) {
        if group.marked_for_deletion_on.is_none() || opts.full_path.as_deref() != Some(group.full_path.as_str()) {
            return Err(GitLabError::Api {
                status: 400,
                message: "`full_path` is incorrect. You must enter the complete path for the group.".to_string(),
            });
        }
        groups.remove(&id);
        return Ok(DeletionState::Removed);
    }

    if !delayed {
        groups.remove(&id);
        return Ok(DeletionState::Removed);
    }
    if group.marked_for_deletion_on.is_some() {
        let message = "Group has been already marked for deletion";
        return deletion_state_from(400, message).ok_or_else(|| GitLabError::Api {
            status: 400,
            message: message.to_string(),
        });
    }
    group.marked_for_deletion_on = Some(Utc::now().format("%Y-%m-%d").to_string());
    Ok(DeletionState::Pending)
}

pub fn list_ldap_links(client: &MockGitLabClient, group: &ResourceId) -> Result<Vec<LdapGroupLink>, GitLabError> {
    let gid = get_group(client, group)?.id;
    Ok(client.ldap_links.lock().unwrap().get(&gid).cloned().unwrap_or_default())
}

pub fn add_ldap_link(client: &MockGitLabClient, group: &ResourceId, opts: &LdapLinkOptions) -> Result<LdapGroupLink, GitLabError> {
    let gid = get_group(client, group)?.id;
    if opts.cn.is_none() && opts.filter.is_none() {
        return Err(GitLabError::Api {
            status: 400,
            message: "cn, filter are missing, exactly one parameter must be provided".to_string(),
        });
    }
    let mut all = client.ldap_links.lock().unwrap();
    let links = all.entry(gid).or_default();
    if links
        .iter()
        .any(|l| l.cn == opts.cn && l.filter == opts.filter && l.provider == opts.provider)
    {
        return Err(GitLabError::Api {
            status: 409,
            message: "Link already exists".to_string(),
        });
    }
    let link = LdapGroupLink {
        cn: opts.cn.clone(),
        filter: opts.filter.clone(),
        group_access: opts.group_access,
        provider: opts.provider.clone(),
        member_role_id: opts.member_role_id,
    };
    links.push(link.clone());
    Ok(link)
}

pub fn delete_ldap_link(client: &MockGitLabClient, group: &ResourceId, cn: &str, provider: &str) -> Result<(), GitLabError> {
    let gid = client.group_id(group)?;
    let mut all = client.ldap_links.lock().unwrap();
    let links = all.entry(gid).or_default();
    let before = links.len();
    links.retain(|l| !(l.cn.as_deref() == Some(cn) && l.provider == provider));
    if links.len() == before {
        return Err(GitLabError::NotFound(format!("LDAP group link {} not found", cn)));
    }
    Ok(())
}

pub fn get_saml_link(client: &MockGitLabClient, group: &ResourceId, name: &str) -> Result<SamlGroupLink, GitLabError> {
    let gid = client.group_id(group)?;
    client
        .saml_links
        .lock()
        .unwrap()
        .get(&(gid, name.to_string()))
        .cloned()
        .ok_or_else(|| GitLabError::NotFound(format!("SAML group link {} not found", name)))
}

pub fn add_saml_link(client: &MockGitLabClient, group: &ResourceId, opts: &SamlLinkOptions) -> Result<SamlGroupLink, GitLabError> {
    let gid = get_group(client, group)?.id;
    let key = (gid, opts.saml_group_name.clone());
    let mut links = client.saml_links.lock().unwrap();
    if links.contains_key(&key) {
        return Err(GitLabError::Api {
            status: 400,
            message: "SAML group link already exists".to_string(),
        });
    }
    let link = SamlGroupLink {
        name: opts.saml_group_name.clone(),
        access_level: opts.access_level,
        member_role_id: opts.member_role_id,
    };
    links.insert(key, link.clone());
    Ok(link)
}

pub fn delete_saml_link(client: &MockGitLabClient, group: &ResourceId, name: &str) -> Result<(), GitLabError> {
    let gid = client.group_id(group)?;
    client
        .saml_links
        .lock()
        .unwrap()
        .remove(&(gid, name.to_string()))
        .map(|_| ())
        .ok_or_else(|| GitLabError::NotFound(format!("SAML group link {} not found", name)))
}
