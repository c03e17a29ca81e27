//! Unit tests for the license and application settings

#[cfg(test)]
mod tests {
    use crate::error::ControllerError;
    use crate::reconciler::instance::{ApplicationSettingsTranslator, LicenseTranslator};
    use crate::test_utils::{Harness, managed, mark_deleted, patched, with_sink};
    use crds::{ApplicationSettings, License, ManagedResource};
    use gitlab_client::{GitLabClientTrait, License as InstalledLicense};
    use kube_runtime::controller::Action;

    fn license(body: &str) -> License {
        with_sink(
            managed("instance", "gitlab-system", serde_json::json!({ "license": { "value": body } })),
            "license-state",
        )
    }

    #[tokio::test]
    async fn test_license_without_sink_is_rejected() {
        let h = Harness::new();
        let mut mr: License = managed(
            "instance",
            "gitlab-system",
            serde_json::json!({ "license": { "value": "eyJsaWNlbnNlIjoxfQ==" } }),
        );
        let err = h.reconcile::<LicenseTranslator>(&mut mr).await.unwrap_err();
        assert!(matches!(err, ControllerError::MissingConnectionSecret("license")));
        assert_eq!(h.gitlab.call_count("add_license"), 0);
    }

    #[tokio::test]
    async fn test_license_is_installed_and_published() {
        let h = Harness::new();
        let mut mr = license("body-v1");
        h.converge::<LicenseTranslator>(&mut mr).await;

        assert_eq!(mr.external_name(), "100");
        assert_eq!(
            h.cluster.secret_value("gitlab-system", "license-state", "license").as_deref(),
            Some("body-v1")
        );
        let observed = mr.at_provider().cloned().unwrap_or_default();
        assert_eq!(observed.plan.as_deref(), Some("ultimate"));
        assert_eq!(observed.licensee_company.as_deref(), Some("Example"));
    }

    #[tokio::test]
    async fn test_same_license_body_is_not_reinstalled() {
        let h = Harness::new();
        let mut mr = license("body-v1");
        h.converge::<LicenseTranslator>(&mut mr).await;

        h.gitlab.reset_calls();
        let action = h.reconcile::<LicenseTranslator>(&mut mr).await.unwrap();
        assert_eq!(action, Action::requeue(std::time::Duration::from_secs(60)));
        assert_eq!(h.gitlab.calls(), vec!["get_license"]);
    }

    #[tokio::test]
    async fn test_changed_license_body_is_installed_and_rebound() {
        let h = Harness::new();
        let mut mr = license("body-v1");
        h.converge::<LicenseTranslator>(&mut mr).await;

        mr = patched(mr, &serde_json::json!({ "spec": { "forProvider": { "license": { "value": "body-v2" } } } }));
        h.gitlab.reset_calls();
        h.reconcile::<LicenseTranslator>(&mut mr).await.unwrap();

        assert_eq!(h.gitlab.calls(), vec!["get_license", "add_license"]);
        assert_eq!(mr.external_name(), "101");
        assert_eq!(
            h.cluster.secret_value("gitlab-system", "license-state", "license").as_deref(),
            Some("body-v2")
        );
    }

    #[tokio::test]
    async fn test_other_current_license_means_ours_is_missing() {
        let h = Harness::new();
        let mut mr = license("body-v1");
        h.converge::<LicenseTranslator>(&mut mr).await;

        h.gitlab.set_license(Some(InstalledLicense {
            id: 42,
            plan: "premium".to_string(),
            ..Default::default()
        }));
        h.gitlab.reset_calls();
        h.reconcile::<LicenseTranslator>(&mut mr).await.unwrap();

        assert_eq!(h.gitlab.calls(), vec!["get_license", "add_license"]);
        assert_eq!(mr.external_name(), "101");
        assert_eq!(h.gitlab.get_license().await.unwrap().id, 101);
    }

    #[tokio::test]
    async fn test_license_delete_uses_delete_as_probe() {
        let h = Harness::new();
        let mut mr = license("body-v1");
        h.converge::<LicenseTranslator>(&mut mr).await;

        let mut mr = mark_deleted(mr);
        h.gitlab.reset_calls();
        h.reconcile::<LicenseTranslator>(&mut mr).await.unwrap();
        assert_eq!(h.gitlab.call_count("get_license"), 0);
        assert!(mr.has_finalizer());
        assert!(h.gitlab.get_license().await.unwrap_err().is_not_found());

        h.gitlab.reset_calls();
        let action = h.reconcile::<LicenseTranslator>(&mut mr).await.unwrap();
        assert_eq!(action, Action::await_change());
        assert!(!mr.has_finalizer());
        assert_eq!(h.gitlab.calls(), vec!["delete_license"]);
    }

    #[tokio::test]
    async fn test_settings_bind_to_instance_and_put_only_changes() {
        let h = Harness::new();
        h.gitlab.mutate_settings(|s| {
            s.signup_enabled = Some(true);
            s.default_projects_limit = Some(100000);
        });
        let mut mr: ApplicationSettings = managed(
            "instance",
            "gitlab-system",
            serde_json::json!({ "signupEnabled": false, "defaultProjectsLimit": 100000 }),
        );
        h.converge::<ApplicationSettingsTranslator>(&mut mr).await;

        assert_eq!(mr.external_name(), "1");
        assert_eq!(h.gitlab.call_count("update_settings"), 1);
        let settings = h.gitlab.get_settings().await.unwrap();
        assert_eq!(settings.signup_enabled, Some(false));
        assert_eq!(mr.at_provider().and_then(|o| o.id), Some(1));
    }

    #[tokio::test]
    async fn test_settings_drift_is_reverted() {
        let h = Harness::new();
        let mut mr: ApplicationSettings = managed(
            "instance",
            "gitlab-system",
            serde_json::json!({ "requireTwoFactorAuthentication": true }),
        );
        h.converge::<ApplicationSettingsTranslator>(&mut mr).await;

        h.gitlab.mutate_settings(|s| s.require_two_factor_authentication = Some(false));
        h.gitlab.reset_calls();
        h.reconcile::<ApplicationSettingsTranslator>(&mut mr).await.unwrap();
        assert_eq!(h.gitlab.calls(), vec!["get_settings", "update_settings"]);
        assert_eq!(
            h.gitlab.get_settings().await.unwrap().require_two_factor_authentication,
            Some(true)
        );
    }

    #[tokio::test]
    async fn test_settings_delete_leaves_instance_untouched() {
        let h = Harness::new();
        let mut mr: ApplicationSettings = managed(
            "instance",
            "gitlab-system",
            serde_json::json!({ "gravatarEnabled": false }),
        );
        h.converge::<ApplicationSettingsTranslator>(&mut mr).await;

        let mut mr = mark_deleted(mr);
        h.gitlab.reset_calls();
        let action = h.reconcile::<ApplicationSettingsTranslator>(&mut mr).await.unwrap();
        assert_eq!(action, Action::await_change());
        assert!(!mr.has_finalizer());
        assert!(h.gitlab.calls().is_empty());
        assert_eq!(h.gitlab.get_settings().await.unwrap().gravatar_enabled, Some(false));
    }
}
