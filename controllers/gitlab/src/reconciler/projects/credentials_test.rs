//! Unit tests for kinds whose create returns a write-once credential

#[cfg(test)]
mod tests {
    use crate::error::ControllerError;
    use crate::reconciler::projects::{
        ProjectAccessTokenTranslator, ProjectDeployKeyTranslator, ProjectDeployTokenTranslator, RunnerTranslator,
    };
    use crate::test_utils::{Harness, condition, managed, mark_deleted, patched, runner, with_sink};
    use crds::{ConditionStatus, ConditionType, ManagedResource, ProjectAccessToken, ProjectDeployKey, ProjectDeployToken};
    use gitlab_client::{GitLabClientTrait, Parent, Project, ResourceId};

    fn harness_with_project() -> Harness {
        let h = Harness::new();
        h.gitlab.add_project(Project {
            id: 1,
            path_with_namespace: "g/app".to_string(),
            ..Default::default()
        });
        h
    }

    #[tokio::test]
    async fn test_runner_without_sink_is_rejected() {
        let h = Harness::new();
        let mut mr = runner("build", "team-a");

        let err = h.reconcile::<RunnerTranslator>(&mut mr).await.unwrap_err();
        assert!(matches!(err, ControllerError::MissingConnectionSecret("runner")));
        assert_eq!(h.gitlab.call_count("create_runner"), 0);
        assert_eq!(mr.external_name(), "");
        let synced = condition(&mr, ConditionType::Synced).unwrap();
        assert_eq!(synced.status, ConditionStatus::False);
    }

    #[tokio::test]
    async fn test_runner_token_is_captured_on_create() {
        let h = Harness::new();
        let mut mr = with_sink(runner("build", "team-a"), "runner-token");
        h.converge::<RunnerTranslator>(&mut mr).await;

        assert_eq!(mr.external_name(), "100");
        assert_eq!(
            h.cluster.secret_value("team-a", "runner-token", "token").as_deref(),
            Some("glrt-mock100")
        );
        let observed = mr.at_provider().cloned().unwrap_or_default();
        assert_eq!(observed.status.as_deref(), Some("never_contacted"));
        assert_eq!(mr.for_provider().access_level.as_deref(), Some("not_protected"));
    }

    #[tokio::test]
    async fn test_runner_drift_is_updated_in_place() {
        let h = Harness::new();
        let mut mr = with_sink(runner("build", "team-a"), "runner-token");
        mr = patched(mr, &serde_json::json!({ "spec": { "forProvider": { "tagList": ["docker", "linux"] } } }));
        h.converge::<RunnerTranslator>(&mut mr).await;

        h.gitlab.mutate_runner(100, |r| r.tag_list = vec!["linux".to_string()]);
        h.gitlab.reset_calls();
        h.reconcile::<RunnerTranslator>(&mut mr).await.unwrap();
        assert_eq!(h.gitlab.calls(), vec!["get_runner", "update_runner"]);
        assert_eq!(mr.external_name(), "100");
        // The token survives an in-place update
        assert_eq!(
            h.cluster.secret_value("team-a", "runner-token", "token").as_deref(),
            Some("glrt-mock100")
        );
    }

    #[tokio::test]
    async fn test_group_runner_requires_group() {
        let h = Harness::new();
        let mut mr = with_sink(
            managed::<crds::Runner>("group", "team-a", serde_json::json!({ "runnerType": "group_type" })),
            "runner-token",
        );
        let err = h.reconcile::<RunnerTranslator>(&mut mr).await.unwrap_err();
        assert!(matches!(err, ControllerError::MissingParentId("groupID")));
        assert_eq!(h.gitlab.call_count("create_runner"), 0);
    }

    #[tokio::test]
    async fn test_deploy_token_drift_rotates_and_republishes() {
        let h = harness_with_project();
        let mut mr: ProjectDeployToken = with_sink(
            managed(
                "registry",
                "team-a",
                serde_json::json!({ "projectID": 1, "name": "registry", "scopes": ["read_registry"] }),
            ),
            "registry-token",
        );
        h.converge::<ProjectDeployTokenTranslator>(&mut mr).await;
        assert_eq!(mr.external_name(), "100");
        assert_eq!(
            h.cluster.secret_value("team-a", "registry-token", "token").as_deref(),
            Some("gldt-mock100")
        );
        assert_eq!(
            h.cluster.secret_value("team-a", "registry-token", "username").as_deref(),
            Some("gitlab+deploy-token-100")
        );

        mr = patched(
            mr,
            &serde_json::json!({ "spec": { "forProvider": { "scopes": ["read_registry", "read_repository"] } } }),
        );
        h.reconcile::<ProjectDeployTokenTranslator>(&mut mr).await.unwrap();

        assert_eq!(mr.external_name(), "101");
        assert_eq!(
            h.cluster.secret_value("team-a", "registry-token", "token").as_deref(),
            Some("gldt-mock101")
        );
        let parent = Parent::Project(ResourceId::Numeric(1));
        assert!(h.gitlab.get_deploy_token(&parent, 100).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_deploy_token_rotation_binds_replacement_when_old_delete_fails() {
        let h = harness_with_project();
        let mut mr: ProjectDeployToken = with_sink(
            managed(
                "registry",
                "team-a",
                serde_json::json!({ "projectID": 1, "name": "registry", "scopes": ["read_registry"] }),
            ),
            "registry-token",
        );
        h.converge::<ProjectDeployTokenTranslator>(&mut mr).await;
        assert_eq!(mr.external_name(), "100");

        mr = patched(
            mr,
            &serde_json::json!({ "spec": { "forProvider": { "scopes": ["read_registry", "read_repository"] } } }),
        );
        h.gitlab.fail_on("delete_deploy_token", 500, "boom");
        h.reconcile::<ProjectDeployTokenTranslator>(&mut mr).await.unwrap();

        assert_eq!(mr.external_name(), "101");
        assert_eq!(
            h.cluster.secret_value("team-a", "registry-token", "token").as_deref(),
            Some("gldt-mock101")
        );
        let parent = Parent::Project(ResourceId::Numeric(1));
        assert!(h.gitlab.get_deploy_token(&parent, 100).await.is_ok());

        // The next pass observes the bound replacement and issues nothing new
        h.gitlab.reset_calls();
        h.reconcile::<ProjectDeployTokenTranslator>(&mut mr).await.unwrap();
        assert_eq!(h.gitlab.call_count("create_deploy_token"), 0);
        assert_eq!(mr.external_name(), "101");
    }

    #[tokio::test]
    async fn test_access_token_rotation_binds_replacement_when_revoke_fails() {
        let h = harness_with_project();
        let mut mr: ProjectAccessToken = with_sink(
            managed(
                "ci",
                "team-a",
                serde_json::json!({ "projectID": 1, "name": "ci", "scopes": ["api"] }),
            ),
            "ci-token",
        );
        h.converge::<ProjectAccessTokenTranslator>(&mut mr).await;

        mr = patched(
            mr,
            &serde_json::json!({ "spec": { "forProvider": { "scopes": ["api", "read_repository"] } } }),
        );
        h.gitlab.fail_on("revoke_access_token", 500, "boom");
        h.reconcile::<ProjectAccessTokenTranslator>(&mut mr).await.unwrap();

        assert_eq!(mr.external_name(), "101");
        assert_eq!(
            h.cluster.secret_value("team-a", "ci-token", "token").as_deref(),
            Some("glpat-mock101")
        );
    }

    #[tokio::test]
    async fn test_revoked_access_token_is_recreated() {
        let h = harness_with_project();
        let mut mr: ProjectAccessToken = with_sink(
            managed(
                "ci",
                "team-a",
                serde_json::json!({
                    "projectID": 1,
                    "name": "ci",
                    "scopes": ["api"],
                    "expiresAt": "2027-01-01"
                }),
            ),
            "ci-token",
        );
        h.converge::<ProjectAccessTokenTranslator>(&mut mr).await;
        assert_eq!(mr.for_provider().token.access_level, Some(40));
        assert_eq!(
            h.cluster.secret_value("team-a", "ci-token", "expiresAt").as_deref(),
            Some("2027-01-01")
        );

        let parent = Parent::Project(ResourceId::Numeric(1));
        h.gitlab.revoke_access_token(&parent, 100).await.unwrap();
        h.converge::<ProjectAccessTokenTranslator>(&mut mr).await;

        assert_eq!(mr.external_name(), "101");
        assert_eq!(
            h.cluster.secret_value("team-a", "ci-token", "token").as_deref(),
            Some("glpat-mock101")
        );
    }

    #[tokio::test]
    async fn test_access_token_delete_revokes() {
        let h = harness_with_project();
        let mut mr: ProjectAccessToken = with_sink(
            managed(
                "ci",
                "team-a",
                serde_json::json!({ "projectID": 1, "name": "ci", "scopes": ["api"] }),
            ),
            "ci-token",
        );
        h.converge::<ProjectAccessTokenTranslator>(&mut mr).await;

        let mut mr = mark_deleted(mr);
        h.reconcile::<ProjectAccessTokenTranslator>(&mut mr).await.unwrap();
        let parent = Parent::Project(ResourceId::Numeric(1));
        assert!(h.gitlab.get_access_token(&parent, 100).await.unwrap().revoked);

        h.reconcile::<ProjectAccessTokenTranslator>(&mut mr).await.unwrap();
        assert!(!mr.has_finalizer());
    }

    #[tokio::test]
    async fn test_deploy_key_publishes_public_key() {
        let h = harness_with_project();
        h.cluster.put_secret("team-a", "keys", &[("pub", "ssh-ed25519 AAAA deploy@ci\n")]);
        let mut mr: ProjectDeployKey = with_sink(
            managed(
                "ci",
                "team-a",
                serde_json::json!({
                    "projectID": 1,
                    "title": "ci",
                    "key": { "secretRef": { "name": "keys", "key": "pub" } }
                }),
            ),
            "ci-key",
        );
        h.converge::<ProjectDeployKeyTranslator>(&mut mr).await;

        assert_eq!(
            h.cluster.secret_value("team-a", "ci-key", "publicKey").as_deref(),
            Some("ssh-ed25519 AAAA deploy@ci")
        );
        let observed = mr.at_provider().cloned().unwrap_or_default();
        assert_eq!(observed.fingerprint.as_deref(), Some("SHA256:mock100"));

        mr = patched(mr, &serde_json::json!({ "spec": { "forProvider": { "title": "ci-renamed", "canPush": true } } }));
        h.gitlab.reset_calls();
        h.reconcile::<ProjectDeployKeyTranslator>(&mut mr).await.unwrap();
        assert_eq!(h.gitlab.calls(), vec!["get_deploy_key", "update_deploy_key"]);
        let key = h.gitlab.get_deploy_key(&ResourceId::Numeric(1), 100).await.unwrap();
        assert_eq!(key.title, "ci-renamed");
        assert!(key.can_push);
    }
}
