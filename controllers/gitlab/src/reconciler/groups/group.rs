//! Group translator
//!
//! Groups follow the same delayed deletion rules as projects. Subgroups are
//! created under `parentID`, which may be given as a full path.

use crate::error::ControllerError;
use crate::managed::external_name;
use crate::managed::translator::{
    ExternalContext, Translator, create_failed, delete_failed, deleted, found, get_failed, update_failed,
};
use crate::managed::{ExternalCreation, ExternalUpdate};
use crate::reconcile_helpers::{
    is_equal_or_unset_opt, is_set_equal_or_unset, is_str_equal_or_unset, late_init, late_init_str,
};
use crate::reconciler::shared::shares;
use async_trait::async_trait;
use crds::{BranchProtectionDefaultsParameters, Group, GroupObservation, GroupParameters, IdOrPath, ManagedResource};
use gitlab_client::{
    self as gitlab, AccessLevelEntry, BranchProtectionDefaults, DeleteOptions, DeletionState, GroupOptions, Parent,
    ResourceId,
};
use kube::ResourceExt;
use tracing::{debug, info};

const NAME: &str = "group";

pub struct GroupTranslator {
    ctx: ExternalContext,
}

fn levels(entries: &[AccessLevelEntry]) -> Vec<i64> {
    entries.iter().map(|e| e.access_level).collect()
}

fn entries(levels: &[i64]) -> Vec<AccessLevelEntry> {
    levels.iter().map(|&access_level| AccessLevelEntry { access_level }).collect()
}

fn protection_options(p: &BranchProtectionDefaultsParameters) -> BranchProtectionDefaults {
    BranchProtectionDefaults {
        allowed_to_push: p.allowed_to_push.as_deref().map(entries),
        allow_force_push: p.allow_force_push,
        allowed_to_merge: p.allowed_to_merge.as_deref().map(entries),
        developer_can_initial_push: p.developer_can_initial_push,
    }
}

fn protection_up_to_date(
    declared: Option<&BranchProtectionDefaultsParameters>,
    observed: Option<&BranchProtectionDefaults>,
) -> bool {
    let Some(declared) = declared else {
        return true;
    };
    let observed = observed.cloned().unwrap_or_default();
    is_set_equal_or_unset(
        declared.allowed_to_push.as_ref(),
        &levels(observed.allowed_to_push.as_deref().unwrap_or_default()),
    ) && is_equal_or_unset_opt(declared.allow_force_push.as_ref(), observed.allow_force_push.as_ref())
        && is_set_equal_or_unset(
            declared.allowed_to_merge.as_ref(),
            &levels(observed.allowed_to_merge.as_deref().unwrap_or_default()),
        )
        && is_equal_or_unset_opt(
            declared.developer_can_initial_push.as_ref(),
            observed.developer_can_initial_push.as_ref(),
        )
}

fn group_options(p: &GroupParameters) -> GroupOptions {
    GroupOptions {
        name: p.name.clone(),
        path: p.path.clone(),
        parent_id: None,
        description: p.description.clone(),
        visibility: p.visibility.clone(),
        lfs_enabled: p.lfs_enabled,
        request_access_enabled: p.request_access_enabled,
        project_creation_level: p.project_creation_level.clone(),
        subgroup_creation_level: p.subgroup_creation_level.clone(),
        share_with_group_lock: p.share_with_group_lock,
        require_two_factor_authentication: p.require_two_factor_authentication,
        two_factor_grace_period: p.two_factor_grace_period,
        auto_devops_enabled: p.auto_devops_enabled,
        emails_disabled: p.emails_disabled,
        mentions_disabled: p.mentions_disabled,
        default_branch: p.default_branch.clone(),
        default_branch_protection_defaults: p.default_branch_protection_defaults.as_ref().map(protection_options),
    }
}

fn group_up_to_date(p: &GroupParameters, r: &gitlab::Group) -> bool {
    is_str_equal_or_unset(p.name.as_ref(), Some(r.name.as_str()))
        && is_str_equal_or_unset(p.path.as_ref(), Some(r.path.as_str()))
        && is_str_equal_or_unset(p.description.as_ref(), r.description.as_deref())
        && is_str_equal_or_unset(p.visibility.as_ref(), Some(r.visibility.as_str()))
        && is_equal_or_unset_opt(p.lfs_enabled.as_ref(), r.lfs_enabled.as_ref())
        && is_equal_or_unset_opt(p.request_access_enabled.as_ref(), r.request_access_enabled.as_ref())
        && is_str_equal_or_unset(p.project_creation_level.as_ref(), r.project_creation_level.as_deref())
        && is_str_equal_or_unset(p.subgroup_creation_level.as_ref(), r.subgroup_creation_level.as_deref())
        && is_equal_or_unset_opt(p.share_with_group_lock.as_ref(), r.share_with_group_lock.as_ref())
        && is_equal_or_unset_opt(
            p.require_two_factor_authentication.as_ref(),
            r.require_two_factor_authentication.as_ref(),
        )
        && is_equal_or_unset_opt(p.two_factor_grace_period.as_ref(), r.two_factor_grace_period.as_ref())
        && is_equal_or_unset_opt(p.auto_devops_enabled.as_ref(), r.auto_devops_enabled.as_ref())
        && is_equal_or_unset_opt(p.emails_disabled.as_ref(), r.emails_disabled.as_ref())
        && is_equal_or_unset_opt(p.mentions_disabled.as_ref(), r.mentions_disabled.as_ref())
        && is_str_equal_or_unset(p.default_branch.as_ref(), r.default_branch.as_deref())
        && protection_up_to_date(
            p.default_branch_protection_defaults.as_ref(),
            r.default_branch_protection_defaults.as_ref(),
        )
}

impl GroupTranslator {
    async fn parent_group_id(&self, parent: &IdOrPath) -> Result<i64, ControllerError> {
        if let Some(id) = parent.as_id() {
            return Ok(id);
        }
        let group = self
            .ctx
            .gitlab
            .get_group(&ResourceId::Path(parent.to_string()))
            .await
            .map_err(get_failed("parent group"))?;
        debug!("Resolved parent group {} to ID {}", parent, group.id);
        Ok(group.id)
    }
}

#[async_trait]
impl Translator for GroupTranslator {
    type Kind = Group;
    type Id = i64;
    type Remote = gitlab::Group;

    const NAME: &'static str = NAME;

    fn new(ctx: ExternalContext) -> Self {
        Self { ctx }
    }

    fn parse_id(&self, external_name: &str) -> Result<i64, ControllerError> {
        external_name::numeric(external_name)
    }

    async fn fetch(&self, _mr: &Group, id: &i64) -> Result<Option<gitlab::Group>, ControllerError> {
        found(NAME, self.ctx.gitlab.get_group(&ResourceId::Numeric(*id)).await)
    }

    fn late_initialize(&self, p: &mut GroupParameters, r: &gitlab::Group) -> bool {
        let mut changed = late_init_str(&mut p.name, &r.name);
        changed |= late_init_str(&mut p.path, &r.path);
        changed |= late_init(&mut p.parent_id, r.parent_id.map(IdOrPath::Id));
        changed |= late_init(&mut p.description, r.description.clone().filter(|d| !d.is_empty()));
        changed |= late_init_str(&mut p.visibility, &r.visibility);
        changed |= late_init(&mut p.lfs_enabled, r.lfs_enabled);
        changed |= late_init(&mut p.request_access_enabled, r.request_access_enabled);
        changed |= late_init(&mut p.project_creation_level, r.project_creation_level.clone());
        changed |= late_init(&mut p.subgroup_creation_level, r.subgroup_creation_level.clone());
        changed |= late_init(&mut p.share_with_group_lock, r.share_with_group_lock);
        changed |= late_init(&mut p.require_two_factor_authentication, r.require_two_factor_authentication);
        changed |= late_init(&mut p.two_factor_grace_period, r.two_factor_grace_period);
        changed |= late_init(&mut p.auto_devops_enabled, r.auto_devops_enabled);
        changed |= late_init(&mut p.emails_disabled, r.emails_disabled);
        changed |= late_init(&mut p.mentions_disabled, r.mentions_disabled);
        changed |= late_init(&mut p.default_branch, r.default_branch.clone().filter(|b| !b.is_empty()));
        changed
    }

    fn observation(&self, r: &gitlab::Group) -> GroupObservation {
        GroupObservation {
            id: Some(r.id),
            full_path: Some(r.full_path.clone()),
            full_name: Some(r.full_name.clone()),
            web_url: Some(r.web_url.clone()).filter(|u| !u.is_empty()),
            marked_for_deletion_on: r.marked_for_deletion_on.clone(),
            created_at: r.created_at.map(|t| t.to_rfc3339()),
            shared_with_groups: shares::observations(&r.shared_with_groups),
        }
    }

    async fn is_up_to_date(&self, mr: &Group, r: &gitlab::Group) -> Result<bool, ControllerError> {
        let p = mr.for_provider();
        Ok(group_up_to_date(p, r) && shares::up_to_date(p.shared_with_groups.as_ref(), &r.shared_with_groups))
    }

    async fn create(&self, mr: &Group) -> Result<ExternalCreation, ControllerError> {
        let p = mr.for_provider();
        let mut opts = group_options(p);
        let fallback = mr.name_any();
        opts.name = opts.name.or_else(|| opts.path.clone()).or_else(|| Some(fallback.clone()));
        opts.path = opts.path.or_else(|| Some(fallback));
        if let Some(parent) = &p.parent_id {
            opts.parent_id = Some(self.parent_group_id(parent).await?);
        }

        let created = self
            .ctx
            .gitlab
            .create_group(&opts)
            .await
            .map_err(create_failed(NAME))?;
        info!("Created group {} ({})", created.full_path, created.id);
        Ok(ExternalCreation {
            external_name: created.id.to_string(),
            ..Default::default()
        })
    }

    async fn update(&self, mr: &Group, id: &i64, r: &gitlab::Group) -> Result<ExternalUpdate, ControllerError> {
        let p = mr.for_provider();
        let rid = ResourceId::Numeric(*id);
        if !group_up_to_date(p, r) {
            self.ctx
                .gitlab
                .edit_group(&rid, &group_options(p))
                .await
                .map_err(update_failed(NAME))?;
        }
        shares::apply(
            self.ctx.gitlab.as_ref(),
            NAME,
            &Parent::Group(rid),
            p.shared_with_groups.as_ref(),
            &r.shared_with_groups,
        )
        .await?;
        Ok(ExternalUpdate::default())
    }

    async fn delete(&self, mr: &Group, id: &i64) -> Result<(), ControllerError> {
        let rid = ResourceId::Numeric(*id);
        let state = match self.ctx.gitlab.delete_group(&rid, &DeleteOptions::default()).await {
            Ok(state) => state,
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(delete_failed(NAME)(e)),
        };
        if state == DeletionState::Removed || mr.for_provider().permanently_remove != Some(true) {
            return Ok(());
        }

        let full_path = match mr.at_provider().and_then(|o| o.full_path.clone()) {
            Some(path) => path,
            None => match found(NAME, self.ctx.gitlab.get_group(&rid).await)? {
                Some(group) => group.full_path,
                None => return Ok(()),
            },
        };
        info!("Permanently removing group {} ({})", full_path, id);
        let opts = DeleteOptions {
            permanently_remove: Some(true),
            full_path: Some(full_path),
        };
        deleted(NAME, self.ctx.gitlab.delete_group(&rid, &opts).await)
    }

    async fn gone_while_deleting(&self, mr: &Group, id: &i64) -> Result<bool, ControllerError> {
        let group = found(NAME, self.ctx.gitlab.get_group(&ResourceId::Numeric(*id)).await)?;
        Ok(group.is_none_or(|g| g.marked_for_deletion_on.is_some() && mr.for_provider().permanently_remove != Some(true)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_protection_levels_compare_as_sets() {
        let declared = BranchProtectionDefaultsParameters {
            allowed_to_push: Some(vec![40, 30]),
            ..Default::default()
        };
        let observed = BranchProtectionDefaults {
            allowed_to_push: Some(entries(&[30, 40])),
            allow_force_push: Some(false),
            ..Default::default()
        };
        assert!(protection_up_to_date(Some(&declared), Some(&observed)));
        assert!(!protection_up_to_date(Some(&declared), None));
        assert!(protection_up_to_date(None, None));
    }
}
