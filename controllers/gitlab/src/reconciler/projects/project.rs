//! Project translator
//!
//! A project is observed together with its push rules (only when the spec
//! declares them) and its group shares. Push rules and shares are diffed
//! and reconciled after the project itself is edited.
//!
//! Deletion may be delayed by GitLab: the first DELETE only marks the
//! project. With `permanentlyRemove` a second DELETE carrying the project's
//! full path removes it for good; without it, a marked project counts as gone.

use crate::error::ControllerError;
use crate::managed::external_name;
use crate::managed::translator::{
    ExternalContext, Translator, create_failed, deleted, delete_failed, details, found, get_failed, update_failed,
};
use crate::managed::{ExternalCreation, ExternalUpdate};
use crate::reconcile_helpers::{
    is_equal_or_unset_opt, is_set_equal_or_unset, is_str_equal_or_unset, late_init, late_init_list, late_init_str,
};
use crate::reconciler::shared::shares;
use async_trait::async_trait;
use crds::{IdOrPath, ManagedResource, Project, ProjectObservation, ProjectParameters, PushRulesParameters};
use gitlab_client::{
    self as gitlab, DeleteOptions, DeletionState, Parent, ProjectOptions, PushRuleOptions, PushRules, ResourceId,
};
use kube::ResourceExt;
use tracing::{debug, info};

const NAME: &str = "project";

/// A project and, if declared, its push rules
#[derive(Debug, Clone)]
pub struct ObservedProject {
    pub project: gitlab::Project,
    pub push_rules: Option<PushRules>,
}

pub struct ProjectTranslator {
    ctx: ExternalContext,
}

/// Non-empty string from an optional API field
fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

fn project_options(params: &ProjectParameters) -> ProjectOptions {
    ProjectOptions {
        name: params.name.clone(),
        path: params.path.clone(),
        namespace_id: None,
        description: params.description.clone(),
        default_branch: params.default_branch.clone(),
        visibility: params.visibility.clone(),
        topics: params.topics.clone(),
        archived: params.archived,
        issues_access_level: params.issues_access_level.clone(),
        merge_requests_access_level: params.merge_requests_access_level.clone(),
        builds_access_level: params.builds_access_level.clone(),
        wiki_access_level: params.wiki_access_level.clone(),
        snippets_access_level: params.snippets_access_level.clone(),
        container_registry_access_level: params.container_registry_access_level.clone(),
        lfs_enabled: params.lfs_enabled,
        request_access_enabled: params.request_access_enabled,
        only_allow_merge_if_pipeline_succeeds: params.only_allow_merge_if_pipeline_succeeds,
        only_allow_merge_if_all_discussions_are_resolved: params.only_allow_merge_if_all_discussions_are_resolved,
        merge_method: params.merge_method.clone(),
        squash_option: params.squash_option.clone(),
        remove_source_branch_after_merge: params.remove_source_branch_after_merge,
        auto_devops_enabled: params.auto_devops_enabled,
        ci_config_path: params.ci_config_path.clone(),
        shared_runners_enabled: params.shared_runners_enabled,
        build_timeout: params.build_timeout,
    }
}

fn push_rule_options(rules: &PushRulesParameters) -> PushRuleOptions {
    PushRuleOptions {
        commit_message_regex: rules.commit_message_regex.clone(),
        commit_message_negative_regex: rules.commit_message_negative_regex.clone(),
        branch_name_regex: rules.branch_name_regex.clone(),
        author_email_regex: rules.author_email_regex.clone(),
        file_name_regex: rules.file_name_regex.clone(),
        deny_delete_tag: rules.deny_delete_tag,
        member_check: rules.member_check,
        prevent_secrets: rules.prevent_secrets,
        commit_committer_check: rules.commit_committer_check,
        reject_unsigned_commits: rules.reject_unsigned_commits,
        max_file_size: rules.max_file_size,
    }
}

fn late_init_push_rules(declared: &mut PushRulesParameters, observed: &PushRules) -> bool {
    let mut changed = late_init(&mut declared.commit_message_regex, non_empty(&observed.commit_message_regex));
    changed |= late_init(
        &mut declared.commit_message_negative_regex,
        non_empty(&observed.commit_message_negative_regex),
    );
    changed |= late_init(&mut declared.branch_name_regex, non_empty(&observed.branch_name_regex));
    changed |= late_init(&mut declared.author_email_regex, non_empty(&observed.author_email_regex));
    changed |= late_init(&mut declared.file_name_regex, non_empty(&observed.file_name_regex));
    changed |= late_init(&mut declared.deny_delete_tag, observed.deny_delete_tag);
    changed |= late_init(&mut declared.member_check, observed.member_check);
    changed |= late_init(&mut declared.prevent_secrets, observed.prevent_secrets);
    changed |= late_init(&mut declared.commit_committer_check, observed.commit_committer_check);
    changed |= late_init(&mut declared.reject_unsigned_commits, observed.reject_unsigned_commits);
    changed |= late_init(&mut declared.max_file_size, observed.max_file_size);
    changed
}

/// Declared push rules against the observed ones; absent rules only match
/// a declaration with nothing set
fn push_rules_up_to_date(declared: Option<&PushRulesParameters>, observed: Option<&PushRules>) -> bool {
    let Some(declared) = declared else {
        return true;
    };
    let Some(observed) = observed else {
        return *declared == PushRulesParameters::default();
    };
    is_str_equal_or_unset(declared.commit_message_regex.as_ref(), observed.commit_message_regex.as_deref())
        && is_str_equal_or_unset(
            declared.commit_message_negative_regex.as_ref(),
            observed.commit_message_negative_regex.as_deref(),
        )
        && is_str_equal_or_unset(declared.branch_name_regex.as_ref(), observed.branch_name_regex.as_deref())
        && is_str_equal_or_unset(declared.author_email_regex.as_ref(), observed.author_email_regex.as_deref())
        && is_str_equal_or_unset(declared.file_name_regex.as_ref(), observed.file_name_regex.as_deref())
        && is_equal_or_unset_opt(declared.deny_delete_tag.as_ref(), observed.deny_delete_tag.as_ref())
        && is_equal_or_unset_opt(declared.member_check.as_ref(), observed.member_check.as_ref())
        && is_equal_or_unset_opt(declared.prevent_secrets.as_ref(), observed.prevent_secrets.as_ref())
        && is_equal_or_unset_opt(declared.commit_committer_check.as_ref(), observed.commit_committer_check.as_ref())
        && is_equal_or_unset_opt(declared.reject_unsigned_commits.as_ref(), observed.reject_unsigned_commits.as_ref())
        && is_equal_or_unset_opt(declared.max_file_size.as_ref(), observed.max_file_size.as_ref())
}

fn project_up_to_date(p: &ProjectParameters, r: &gitlab::Project) -> bool {
    is_str_equal_or_unset(p.name.as_ref(), Some(r.name.as_str()))
        && is_str_equal_or_unset(p.path.as_ref(), Some(r.path.as_str()))
        && is_str_equal_or_unset(p.description.as_ref(), r.description.as_deref())
        && is_str_equal_or_unset(p.default_branch.as_ref(), r.default_branch.as_deref())
        && is_str_equal_or_unset(p.visibility.as_ref(), Some(r.visibility.as_str()))
        && is_set_equal_or_unset(p.topics.as_ref(), &r.topics)
        && is_equal_or_unset_opt(p.archived.as_ref(), Some(&r.archived))
        && is_str_equal_or_unset(p.issues_access_level.as_ref(), r.issues_access_level.as_deref())
        && is_str_equal_or_unset(p.merge_requests_access_level.as_ref(), r.merge_requests_access_level.as_deref())
        && is_str_equal_or_unset(p.builds_access_level.as_ref(), r.builds_access_level.as_deref())
        && is_str_equal_or_unset(p.wiki_access_level.as_ref(), r.wiki_access_level.as_deref())
        && is_str_equal_or_unset(p.snippets_access_level.as_ref(), r.snippets_access_level.as_deref())
        && is_str_equal_or_unset(
            p.container_registry_access_level.as_ref(),
            r.container_registry_access_level.as_deref(),
        )
        && is_equal_or_unset_opt(p.lfs_enabled.as_ref(), r.lfs_enabled.as_ref())
        && is_equal_or_unset_opt(p.request_access_enabled.as_ref(), r.request_access_enabled.as_ref())
        && is_equal_or_unset_opt(
            p.only_allow_merge_if_pipeline_succeeds.as_ref(),
            r.only_allow_merge_if_pipeline_succeeds.as_ref(),
        )
        && is_equal_or_unset_opt(
            p.only_allow_merge_if_all_discussions_are_resolved.as_ref(),
            r.only_allow_merge_if_all_discussions_are_resolved.as_ref(),
        )
        && is_str_equal_or_unset(p.merge_method.as_ref(), r.merge_method.as_deref())
        && is_str_equal_or_unset(p.squash_option.as_ref(), r.squash_option.as_deref())
        && is_equal_or_unset_opt(
            p.remove_source_branch_after_merge.as_ref(),
            r.remove_source_branch_after_merge.as_ref(),
        )
        && is_equal_or_unset_opt(p.auto_devops_enabled.as_ref(), r.auto_devops_enabled.as_ref())
        && is_str_equal_or_unset(p.ci_config_path.as_ref(), r.ci_config_path.as_deref())
        && is_equal_or_unset_opt(p.shared_runners_enabled.as_ref(), r.shared_runners_enabled.as_ref())
        && is_equal_or_unset_opt(p.build_timeout.as_ref(), r.build_timeout.as_ref())
}

impl ProjectTranslator {
    /// Numeric namespace ID, looking up a group path if needed
    async fn namespace_id(&self, namespace: &IdOrPath) -> Result<i64, ControllerError> {
        if let Some(id) = namespace.as_id() {
            return Ok(id);
        }
        let group = self
            .ctx
            .gitlab
            .get_group(&ResourceId::Path(namespace.to_string()))
            .await
            .map_err(get_failed("namespace"))?;
        debug!("Resolved namespace {} to ID {}", namespace, group.id);
        Ok(group.id)
    }

    async fn full_path(&self, mr: &Project, id: i64) -> Result<Option<String>, ControllerError> {
        if let Some(path) = mr.at_provider().and_then(|o| o.full_path.clone()) {
            return Ok(Some(path));
        }
        let project = found(NAME, self.ctx.gitlab.get_project(&ResourceId::Numeric(id)).await)?;
        Ok(project.map(|p| p.path_with_namespace))
    }
}

#[async_trait]
impl Translator for ProjectTranslator {
    type Kind = Project;
    type Id = i64;
    type Remote = ObservedProject;

    const NAME: &'static str = NAME;

    fn new(ctx: ExternalContext) -> Self {
        Self { ctx }
    }

    fn parse_id(&self, external_name: &str) -> Result<i64, ControllerError> {
        external_name::numeric(external_name)
    }

    async fn fetch(&self, mr: &Project, id: &i64) -> Result<Option<ObservedProject>, ControllerError> {
        let rid = ResourceId::Numeric(*id);
        let Some(project) = found(NAME, self.ctx.gitlab.get_project(&rid).await)? else {
            return Ok(None);
        };
        let push_rules = match mr.for_provider().push_rules {
            Some(_) => self
                .ctx
                .gitlab
                .get_push_rules(&rid)
                .await
                .map_err(get_failed("project push rules"))?,
            None => None,
        };
        Ok(Some(ObservedProject { project, push_rules }))
    }

    fn late_initialize(&self, p: &mut ProjectParameters, remote: &ObservedProject) -> bool {
        let r = &remote.project;
        let mut changed = late_init_str(&mut p.name, &r.name);
        changed |= late_init_str(&mut p.path, &r.path);
        changed |= late_init(&mut p.namespace_id, r.namespace.as_ref().map(|ns| IdOrPath::Id(ns.id)));
        changed |= late_init(&mut p.description, non_empty(&r.description));
        changed |= late_init(&mut p.default_branch, non_empty(&r.default_branch));
        changed |= late_init_str(&mut p.visibility, &r.visibility);
        changed |= late_init_list(&mut p.topics, &r.topics);
        changed |= late_init(&mut p.archived, Some(r.archived));
        changed |= late_init(&mut p.issues_access_level, r.issues_access_level.clone());
        changed |= late_init(&mut p.merge_requests_access_level, r.merge_requests_access_level.clone());
        changed |= late_init(&mut p.builds_access_level, r.builds_access_level.clone());
        changed |= late_init(&mut p.wiki_access_level, r.wiki_access_level.clone());
        changed |= late_init(&mut p.snippets_access_level, r.snippets_access_level.clone());
        changed |= late_init(&mut p.container_registry_access_level, r.container_registry_access_level.clone());
        changed |= late_init(&mut p.lfs_enabled, r.lfs_enabled);
        changed |= late_init(&mut p.request_access_enabled, r.request_access_enabled);
        changed |= late_init(
            &mut p.only_allow_merge_if_pipeline_succeeds,
            r.only_allow_merge_if_pipeline_succeeds,
        );
        changed |= late_init(
            &mut p.only_allow_merge_if_all_discussions_are_resolved,
            r.only_allow_merge_if_all_discussions_are_resolved,
        );
        changed |= late_init(&mut p.merge_method, r.merge_method.clone());
        changed |= late_init(&mut p.squash_option, r.squash_option.clone());
        changed |= late_init(&mut p.remove_source_branch_after_merge, r.remove_source_branch_after_merge);
        changed |= late_init(&mut p.auto_devops_enabled, r.auto_devops_enabled);
        changed |= late_init(&mut p.ci_config_path, non_empty(&r.ci_config_path));
        changed |= late_init(&mut p.shared_runners_enabled, r.shared_runners_enabled);
        changed |= late_init(&mut p.build_timeout, r.build_timeout);
        if let (Some(declared), Some(observed)) = (p.push_rules.as_mut(), remote.push_rules.as_ref()) {
            changed |= late_init_push_rules(declared, observed);
        }
        changed
    }

    fn observation(&self, remote: &ObservedProject) -> ProjectObservation {
        let r = &remote.project;
        ProjectObservation {
            id: Some(r.id),
            full_path: Some(r.path_with_namespace.clone()),
            web_url: Some(r.web_url.clone()),
            http_url_to_repo: Some(r.http_url_to_repo.clone()),
            ssh_url_to_repo: Some(r.ssh_url_to_repo.clone()),
            marked_for_deletion_on: r.marked_for_deletion_on.clone(),
            created_at: r.created_at.map(|t| t.to_rfc3339()),
            shared_with_groups: shares::observations(&r.shared_with_groups),
        }
    }

    async fn is_up_to_date(&self, mr: &Project, remote: &ObservedProject) -> Result<bool, ControllerError> {
        let p = mr.for_provider();
        Ok(project_up_to_date(p, &remote.project)
            && push_rules_up_to_date(p.push_rules.as_ref(), remote.push_rules.as_ref())
            && shares::up_to_date(p.shared_with_groups.as_ref(), &remote.project.shared_with_groups))
    }

    fn connection_details(&self, remote: &ObservedProject) -> crate::cluster::ConnectionDetails {
        details([("runnersToken", remote.project.runners_token.clone())])
    }

    async fn create(&self, mr: &Project) -> Result<ExternalCreation, ControllerError> {
        let p = mr.for_provider();
        let mut opts = project_options(p);
        if opts.name.is_none() && opts.path.is_none() {
            opts.path = Some(mr.name_any());
        }
        if let Some(namespace) = &p.namespace_id {
            opts.namespace_id = Some(self.namespace_id(namespace).await?);
        }

        let created = self
            .ctx
            .gitlab
            .create_project(&opts)
            .await
            .map_err(create_failed(NAME))?;
        info!("Created project {} ({})", created.path_with_namespace, created.id);
        Ok(ExternalCreation {
            external_name: created.id.to_string(),
            connection_details: details([("runnersToken", created.runners_token)]),
        })
    }

    async fn update(&self, mr: &Project, id: &i64, remote: &ObservedProject) -> Result<ExternalUpdate, ControllerError> {
        let p = mr.for_provider();
        let rid = ResourceId::Numeric(*id);

        if !project_up_to_date(p, &remote.project) {
            self.ctx
                .gitlab
                .edit_project(&rid, &project_options(p))
                .await
                .map_err(update_failed(NAME))?;
        }

        if let Some(rules) = &p.push_rules {
            if !push_rules_up_to_date(Some(rules), remote.push_rules.as_ref()) {
                let opts = push_rule_options(rules);
                let result = match remote.push_rules {
                    Some(_) => self.ctx.gitlab.edit_push_rules(&rid, &opts).await,
                    None => self.ctx.gitlab.add_push_rules(&rid, &opts).await,
                };
                result.map_err(update_failed("project push rules"))?;
            }
        }

        shares::apply(
            self.ctx.gitlab.as_ref(),
            NAME,
            &Parent::Project(rid),
            p.shared_with_groups.as_ref(),
            &remote.project.shared_with_groups,
        )
        .await?;
        Ok(ExternalUpdate::default())
    }

    async fn delete(&self, mr: &Project, id: &i64) -> Result<(), ControllerError> {
        let rid = ResourceId::Numeric(*id);
        let state = match self.ctx.gitlab.delete_project(&rid, &DeleteOptions::default()).await {
            Ok(state) => state,
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(delete_failed(NAME)(e)),
        };
        if state == DeletionState::Removed {
            return Ok(());
        }
        if mr.for_provider().permanently_remove != Some(true) {
            info!("Project {} is marked for deletion", id);
            return Ok(());
        }

        let Some(full_path) = self.full_path(mr, *id).await? else {
            return Ok(());
        };
        info!("Permanently removing project {} ({})", full_path, id);
        let opts = DeleteOptions {
            permanently_remove: Some(true),
            full_path: Some(full_path),
        };
        deleted(NAME, self.ctx.gitlab.delete_project(&rid, &opts).await)
    }

    async fn gone_while_deleting(&self, mr: &Project, id: &i64) -> Result<bool, ControllerError> {
        let project = found(NAME, self.ctx.gitlab.get_project(&ResourceId::Numeric(*id)).await)?;
        Ok(match project {
            None => true,
            Some(project) => {
                project.marked_for_deletion_on.is_some() && mr.for_provider().permanently_remove != Some(true)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_push_rules_match_empty_declaration() {
        assert!(push_rules_up_to_date(None, None));
        assert!(push_rules_up_to_date(Some(&PushRulesParameters::default()), None));
        let declared = PushRulesParameters {
            deny_delete_tag: Some(true),
            ..Default::default()
        };
        assert!(!push_rules_up_to_date(Some(&declared), None));
        let observed = PushRules {
            deny_delete_tag: Some(true),
            ..Default::default()
        };
        assert!(push_rules_up_to_date(Some(&declared), Some(&observed)));
    }

    #[test]
    fn test_late_init_push_rules_skips_empty_regexes() {
        let mut declared = PushRulesParameters::default();
        let observed = PushRules {
            commit_message_regex: Some(String::new()),
            max_file_size: Some(100),
            ..Default::default()
        };
        assert!(late_init_push_rules(&mut declared, &observed));
        assert_eq!(declared.commit_message_regex, None);
        assert_eq!(declared.max_file_size, Some(100));
        assert!(!late_init_push_rules(&mut declared, &observed));
    }
}
