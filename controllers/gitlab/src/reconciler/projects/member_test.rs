//! Unit tests for project membership and variables

#[cfg(test)]
mod tests {
    use crate::error::ControllerError;
    use crate::reconciler::projects::{ProjectMemberTranslator, ProjectVariableTranslator};
    use crate::test_utils::{Harness, bound, managed, mark_deleted, patched};
    use crds::{ManagedResource, ProjectMember, ProjectVariable};
    use gitlab_client::{GitLabClientTrait, MemberOptions, Parent, Project, ResourceId, User};

    fn harness_with_project() -> Harness {
        let h = Harness::new();
        h.gitlab.add_project(Project {
            id: 1,
            path_with_namespace: "g/app".to_string(),
            ..Default::default()
        });
        h
    }

    fn project() -> Parent {
        Parent::Project(ResourceId::Numeric(1))
    }

    #[tokio::test]
    async fn test_access_level_drift_requires_update() {
        let h = harness_with_project();
        h.gitlab
            .add_member(
                &project(),
                &MemberOptions {
                    user_id: Some(7),
                    access_level: Some(30),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        h.gitlab.reset_calls();

        let mut mr: ProjectMember = bound(
            managed("dev", "team-a", serde_json::json!({ "projectID": 1, "userID": 7, "accessLevel": 10 })),
            "7",
        );
        h.reconcile::<ProjectMemberTranslator>(&mut mr).await.unwrap();

        assert_eq!(h.gitlab.calls(), vec!["get_member", "edit_member"]);
        let member = h.gitlab.get_member(&project(), 7).await.unwrap();
        assert_eq!(member.access_level, 10);
        assert_eq!(mr.external_name(), "7");
    }

    #[tokio::test]
    async fn test_username_is_resolved_and_late_initialized() {
        let h = harness_with_project();
        h.gitlab.add_user(User {
            id: 42,
            username: "alice".to_string(),
            name: "Alice".to_string(),
            state: "active".to_string(),
        });
        let mut mr: ProjectMember = managed(
            "alice",
            "team-a",
            serde_json::json!({ "projectID": "g/app", "userName": "alice", "accessLevel": 30 }),
        );
        h.converge::<ProjectMemberTranslator>(&mut mr).await;

        assert_eq!(mr.external_name(), "42");
        assert_eq!(mr.for_provider().member.user_id, Some(42));
        let observed = mr.at_provider().cloned().unwrap_or_default();
        assert_eq!(observed.username.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_unknown_username_fails_without_binding() {
        let h = harness_with_project();
        let mut mr: ProjectMember = managed(
            "ghost",
            "team-a",
            serde_json::json!({ "projectID": 1, "userName": "ghost", "accessLevel": 30 }),
        );
        let err = h.reconcile::<ProjectMemberTranslator>(&mut mr).await.unwrap_err();
        assert!(matches!(err, ControllerError::UnknownUser(ref name) if name == "ghost"));
        assert_eq!(mr.external_name(), "");
        assert_eq!(h.gitlab.call_count("add_member"), 0);
    }

    #[tokio::test]
    async fn test_member_without_parent_is_rejected() {
        let h = harness_with_project();
        let mut mr: ProjectMember = managed("dev", "team-a", serde_json::json!({ "userID": 7, "accessLevel": 30 }));
        let err = h.reconcile::<ProjectMemberTranslator>(&mut mr).await.unwrap_err();
        assert!(matches!(err, ControllerError::MissingParentId("projectID")));
    }

    #[tokio::test]
    async fn test_removed_member_releases_finalizer() {
        let h = harness_with_project();
        let mut mr: ProjectMember = managed(
            "dev",
            "team-a",
            serde_json::json!({ "projectID": 1, "userID": 7, "accessLevel": 30 }),
        );
        h.converge::<ProjectMemberTranslator>(&mut mr).await;

        let mut mr = mark_deleted(mr);
        h.reconcile::<ProjectMemberTranslator>(&mut mr).await.unwrap();
        assert!(h.gitlab.get_member(&project(), 7).await.unwrap_err().is_not_found());
        h.reconcile::<ProjectMemberTranslator>(&mut mr).await.unwrap();
        assert!(!mr.has_finalizer());
    }

    #[tokio::test]
    async fn test_variable_value_from_secret_is_compared() {
        let h = harness_with_project();
        h.cluster.put_secret("team-a", "ci", &[("deploy-token", "s3cret")]);
        let mut mr: ProjectVariable = managed(
            "deploy-token",
            "team-a",
            serde_json::json!({
                "projectID": 1,
                "key": "DEPLOY_TOKEN",
                "valueSecretRef": { "name": "ci", "key": "deploy-token" },
                "masked": true
            }),
        );
        h.converge::<ProjectVariableTranslator>(&mut mr).await;
        assert_eq!(mr.external_name(), "DEPLOY_TOKEN");

        let stored = h.gitlab.get_variable(&project(), "DEPLOY_TOKEN", None).await.unwrap();
        assert_eq!(stored.value, "s3cret");
        assert_eq!(mr.for_provider().variable.environment_scope.as_deref(), Some("*"));

        // Rotating the secret is drift
        h.cluster.put_secret("team-a", "ci", &[("deploy-token", "rotated")]);
        h.gitlab.reset_calls();
        h.reconcile::<ProjectVariableTranslator>(&mut mr).await.unwrap();
        assert_eq!(h.gitlab.calls(), vec!["get_variable", "update_variable"]);
        let stored = h.gitlab.get_variable(&project(), "DEPLOY_TOKEN", None).await.unwrap();
        assert_eq!(stored.value, "rotated");
    }

    #[tokio::test]
    async fn test_variable_with_both_sources_is_rejected() {
        let h = harness_with_project();
        let mut mr: ProjectVariable = managed(
            "both",
            "team-a",
            serde_json::json!({
                "projectID": 1,
                "key": "BOTH",
                "value": "inline",
                "valueSecretRef": { "name": "ci", "key": "k" }
            }),
        );
        let err = h.reconcile::<ProjectVariableTranslator>(&mut mr).await.unwrap_err();
        assert!(matches!(err, ControllerError::NoSource(2)));
        assert_eq!(h.gitlab.call_count("create_variable"), 0);

        let mut mr = patched(mr, &serde_json::json!({ "spec": { "forProvider": { "valueSecretRef": null } } }));
        h.converge::<ProjectVariableTranslator>(&mut mr).await;
        assert_eq!(mr.external_name(), "BOTH");
    }
}
