//! ApplicationSettings translator
//!
//! The settings record always exists. Create binds the object to its ID
//! and applies the declared fields; updates send only the fields that
//! differ. Deleting the object leaves the instance settings as they are.

use crate::error::ControllerError;
use crate::managed::external_name;
use crate::managed::translator::{ExternalContext, Translator, create_failed, found, get_failed, update_failed};
use crate::managed::{ExternalCreation, ExternalUpdate};
use crate::reconcile_helpers::{late_init, late_init_list};
use async_trait::async_trait;
use crds::{ApplicationSettings, ApplicationSettingsObservation, ApplicationSettingsParameters, ManagedResource};
use gitlab_client::{Settings, SettingsOptions};
use std::collections::BTreeSet;
use tracing::info;

const NAME: &str = "application settings";

pub struct ApplicationSettingsTranslator {
    ctx: ExternalContext,
}

/// Declared value when it differs from the observed one
fn changed<T: Clone + PartialEq>(declared: &Option<T>, observed: &Option<T>) -> Option<T> {
    declared.as_ref().filter(|d| observed.as_ref() != Some(*d)).cloned()
}

fn changed_set(declared: &Option<Vec<String>>, observed: &Option<Vec<String>>) -> Option<Vec<String>> {
    let as_set = |v: &Vec<String>| v.iter().cloned().collect::<BTreeSet<_>>();
    declared
        .as_ref()
        .filter(|d| observed.as_ref().map(as_set) != Some(as_set(d)))
        .cloned()
}

/// The PUT body: declared fields that differ from the instance
fn changes(p: &ApplicationSettingsParameters, s: &Settings) -> SettingsOptions {
    SettingsOptions {
        default_projects_limit: changed(&p.default_projects_limit, &s.default_projects_limit),
        signup_enabled: changed(&p.signup_enabled, &s.signup_enabled),
        require_two_factor_authentication: changed(
            &p.require_two_factor_authentication,
            &s.require_two_factor_authentication,
        ),
        two_factor_grace_period: changed(&p.two_factor_grace_period, &s.two_factor_grace_period),
        default_project_visibility: changed(&p.default_project_visibility, &s.default_project_visibility),
        default_group_visibility: changed(&p.default_group_visibility, &s.default_group_visibility),
        restricted_visibility_levels: changed_set(&p.restricted_visibility_levels, &s.restricted_visibility_levels),
        max_attachment_size: changed(&p.max_attachment_size, &s.max_attachment_size),
        session_expire_delay: changed(&p.session_expire_delay, &s.session_expire_delay),
        gravatar_enabled: changed(&p.gravatar_enabled, &s.gravatar_enabled),
        after_sign_out_path: changed(&p.after_sign_out_path, &s.after_sign_out_path),
        home_page_url: changed(&p.home_page_url, &s.home_page_url),
        password_authentication_enabled_for_web: changed(
            &p.password_authentication_enabled_for_web,
            &s.password_authentication_enabled_for_web,
        ),
        auto_devops_enabled: changed(&p.auto_devops_enabled, &s.auto_devops_enabled),
        shared_runners_enabled: changed(&p.shared_runners_enabled, &s.shared_runners_enabled),
        max_artifacts_size: changed(&p.max_artifacts_size, &s.max_artifacts_size),
        deletion_adjourned_period: changed(&p.deletion_adjourned_period, &s.deletion_adjourned_period),
    }
}

impl ApplicationSettingsTranslator {
    async fn apply(&self, p: &ApplicationSettingsParameters, current: &Settings) -> Result<(), gitlab_client::GitLabError> {
        let opts = changes(p, current);
        if opts == SettingsOptions::default() {
            return Ok(());
        }
        self.ctx.gitlab.update_settings(&opts).await.map(|_| ())
    }
}

#[async_trait]
impl Translator for ApplicationSettingsTranslator {
    type Kind = ApplicationSettings;
    type Id = i64;
    type Remote = Settings;

    const NAME: &'static str = NAME;

    fn new(ctx: ExternalContext) -> Self {
        Self { ctx }
    }

    fn parse_id(&self, external_name: &str) -> Result<i64, ControllerError> {
        external_name::numeric(external_name)
    }

    async fn fetch(&self, _mr: &ApplicationSettings, id: &i64) -> Result<Option<Settings>, ControllerError> {
        let current = found(NAME, self.ctx.gitlab.get_settings().await)?;
        Ok(current.filter(|s| s.id == *id))
    }

    fn late_initialize(&self, p: &mut ApplicationSettingsParameters, s: &Settings) -> bool {
        let mut c = late_init(&mut p.default_projects_limit, s.default_projects_limit);
        c |= late_init(&mut p.signup_enabled, s.signup_enabled);
        c |= late_init(&mut p.require_two_factor_authentication, s.require_two_factor_authentication);
        c |= late_init(&mut p.two_factor_grace_period, s.two_factor_grace_period);
        c |= late_init(&mut p.default_project_visibility, s.default_project_visibility.clone());
        c |= late_init(&mut p.default_group_visibility, s.default_group_visibility.clone());
        c |= late_init_list(
            &mut p.restricted_visibility_levels,
            s.restricted_visibility_levels.as_deref().unwrap_or_default(),
        );
        c |= late_init(&mut p.max_attachment_size, s.max_attachment_size);
        c |= late_init(&mut p.session_expire_delay, s.session_expire_delay);
        c |= late_init(&mut p.gravatar_enabled, s.gravatar_enabled);
        c |= late_init(&mut p.after_sign_out_path, s.after_sign_out_path.clone().filter(|v| !v.is_empty()));
        c |= late_init(&mut p.home_page_url, s.home_page_url.clone().filter(|v| !v.is_empty()));
        c |= late_init(
            &mut p.password_authentication_enabled_for_web,
            s.password_authentication_enabled_for_web,
        );
        c |= late_init(&mut p.auto_devops_enabled, s.auto_devops_enabled);
        c |= late_init(&mut p.shared_runners_enabled, s.shared_runners_enabled);
        c |= late_init(&mut p.max_artifacts_size, s.max_artifacts_size);
        c |= late_init(&mut p.deletion_adjourned_period, s.deletion_adjourned_period);
        c
    }

    fn observation(&self, s: &Settings) -> ApplicationSettingsObservation {
        ApplicationSettingsObservation { id: Some(s.id) }
    }

    async fn is_up_to_date(&self, mr: &ApplicationSettings, s: &Settings) -> Result<bool, ControllerError> {
        Ok(changes(mr.for_provider(), s) == SettingsOptions::default())
    }

    async fn create(&self, mr: &ApplicationSettings) -> Result<ExternalCreation, ControllerError> {
        let current = self.ctx.gitlab.get_settings().await.map_err(get_failed(NAME))?;
        self.apply(mr.for_provider(), &current)
            .await
            .map_err(create_failed(NAME))?;
        info!("Bound application settings {}", current.id);
        Ok(ExternalCreation {
            external_name: current.id.to_string(),
            ..Default::default()
        })
    }

    async fn update(
        &self,
        mr: &ApplicationSettings,
        _id: &i64,
        current: &Settings,
    ) -> Result<ExternalUpdate, ControllerError> {
        self.apply(mr.for_provider(), current)
            .await
            .map_err(update_failed(NAME))?;
        Ok(ExternalUpdate::default())
    }

    async fn delete(&self, _mr: &ApplicationSettings, id: &i64) -> Result<(), ControllerError> {
        info!("Releasing application settings {}; instance settings are left unchanged", id);
        Ok(())
    }

    async fn gone_while_deleting(&self, _mr: &ApplicationSettings, _id: &i64) -> Result<bool, ControllerError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_only_carry_drifted_fields() {
        let declared = ApplicationSettingsParameters {
            signup_enabled: Some(false),
            default_projects_limit: Some(10),
            restricted_visibility_levels: Some(vec!["public".to_string(), "internal".to_string()]),
            ..Default::default()
        };
        let current = Settings {
            id: 1,
            signup_enabled: Some(true),
            default_projects_limit: Some(10),
            restricted_visibility_levels: Some(vec!["internal".to_string(), "public".to_string()]),
            ..Default::default()
        };
        let opts = changes(&declared, &current);
        assert_eq!(
            opts,
            SettingsOptions {
                signup_enabled: Some(false),
                ..Default::default()
            }
        );
    }
}
