//! Unit tests for the reconcile state machine

#[cfg(test)]
mod tests {
    use crate::error::ControllerError;
    use crate::reconciler::Reconciler;
    use crate::reconciler::projects::{ProjectMemberTranslator, ProjectTranslator};
    use crate::test_utils::{Harness, bound, condition, managed, mark_deleted, patched, with_policies};
    use crds::{
        ConditionReason, ConditionStatus, ConditionType, FINALIZER, ManagedResource, Project, ProjectMember,
    };
    use gitlab_client::{GitLabClientTrait, MemberOptions, Parent, Project as RemoteProject, ResourceId};
    use kube::ResourceExt;
    use kube_runtime::controller::Action;
    use prometheus::Encoder;
    use std::time::Duration;

    fn project() -> Parent {
        Parent::Project(ResourceId::Numeric(1))
    }

    fn developer() -> ProjectMember {
        managed(
            "dev",
            "team-a",
            serde_json::json!({ "projectID": 1, "userID": 7, "accessLevel": 30 }),
        )
    }

    fn harness() -> Harness {
        let h = Harness::new();
        h.gitlab.add_project(RemoteProject {
            id: 1,
            path_with_namespace: "team-a/app".to_string(),
            ..Default::default()
        });
        h
    }

    async fn harness_with_member(access_level: i64) -> Harness {
        let h = harness();
        h.gitlab
            .add_member(
                &project(),
                &MemberOptions {
                    user_id: Some(7),
                    access_level: Some(access_level),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        h.gitlab.reset_calls();
        h
    }

    #[tokio::test]
    async fn test_first_reconcile_adds_finalizer() {
        let h = harness();
        let mut mr = developer();
        h.reconcile::<ProjectMemberTranslator>(&mut mr).await.unwrap();

        assert!(mr.has_finalizer());
        assert_eq!(mr.finalizers(), &[FINALIZER.to_string()]);
        assert_eq!(mr.external_name(), "7");
    }

    #[tokio::test]
    async fn test_empty_policies_pause_reconciliation() {
        let h = harness_with_member(10).await;
        let mut mr = with_policies(bound(developer(), "7"), &[]);

        let action = h.reconcile::<ProjectMemberTranslator>(&mut mr).await.unwrap();
        assert_eq!(action, Action::await_change());
        assert!(h.gitlab.calls().is_empty());
        assert!(!mr.has_finalizer());
        let synced = condition(&mr, ConditionType::Synced).unwrap();
        assert_eq!(synced.status, ConditionStatus::False);
        assert_eq!(synced.reason, ConditionReason::ReconcilePaused);
    }

    #[tokio::test]
    async fn test_observe_only_never_creates() {
        let h = harness();
        let mut mr = with_policies(developer(), &["Observe"]);

        let action = h.reconcile::<ProjectMemberTranslator>(&mut mr).await.unwrap();
        assert_eq!(action, Action::requeue(Duration::from_secs(60)));
        assert_eq!(h.gitlab.call_count("add_member"), 0);
        assert_eq!(mr.external_name(), "");
        let ready = condition(&mr, ConditionType::Ready).unwrap();
        assert_eq!(ready.reason, ConditionReason::Unavailable);
    }

    #[tokio::test]
    async fn test_observe_only_reports_drift_without_updating() {
        let h = harness_with_member(10).await;
        let mut mr = with_policies(bound(developer(), "7"), &["Observe"]);

        h.reconcile::<ProjectMemberTranslator>(&mut mr).await.unwrap();
        assert_eq!(h.gitlab.calls(), vec!["get_member"]);
        assert_eq!(h.gitlab.get_member(&project(), 7).await.unwrap().access_level, 10);
        let ready = condition(&mr, ConditionType::Ready).unwrap();
        assert_eq!(ready.status, ConditionStatus::True);
    }

    #[tokio::test]
    async fn test_late_init_requires_its_policy() {
        let h = harness();
        let mut mr: Project = with_policies(
            managed("demo", "team-a", serde_json::json!({ "name": "demo" })),
            &["Observe", "Create", "Update", "Delete"],
        );
        h.converge::<ProjectTranslator>(&mut mr).await;

        assert_eq!(mr.external_name(), "100");
        assert_eq!(mr.for_provider().default_branch, None);
        assert!(
            h.cluster
                .patches()
                .iter()
                .all(|p| p.patch.pointer("/spec/forProvider").is_none())
        );
    }

    #[tokio::test]
    async fn test_steady_state_observe_writes_nothing() {
        let h = harness();
        let mut mr = developer();
        h.converge::<ProjectMemberTranslator>(&mut mr).await;

        h.reconcile::<ProjectMemberTranslator>(&mut mr).await.unwrap();
        let observed = serde_json::to_value(mr.at_provider()).unwrap();
        let ready_at = condition(&mr, ConditionType::Ready).unwrap().last_transition_time;
        let synced_at = condition(&mr, ConditionType::Synced).unwrap().last_transition_time;

        h.gitlab.reset_calls();
        let action = h.reconcile::<ProjectMemberTranslator>(&mut mr).await.unwrap();
        assert_eq!(action, Action::requeue(Duration::from_secs(60)));
        assert_eq!(h.gitlab.calls(), vec!["get_member"]);
        assert!(h.cluster.patches().is_empty());
        assert_eq!(serde_json::to_value(mr.at_provider()).unwrap(), observed);
        assert_eq!(condition(&mr, ConditionType::Ready).unwrap().last_transition_time, ready_at);
        assert_eq!(condition(&mr, ConditionType::Synced).unwrap().last_transition_time, synced_at);
    }

    #[tokio::test]
    async fn test_orphan_policy_keeps_remote() {
        let h = harness();
        let mut mr = developer();
        h.converge::<ProjectMemberTranslator>(&mut mr).await;

        let mut mr = mark_deleted(patched(mr, &serde_json::json!({ "spec": { "deletionPolicy": "Orphan" } })));
        h.gitlab.reset_calls();
        let action = h.reconcile::<ProjectMemberTranslator>(&mut mr).await.unwrap();

        assert_eq!(action, Action::await_change());
        assert!(h.gitlab.calls().is_empty());
        assert!(!mr.has_finalizer());
        assert!(h.gitlab.get_member(&project(), 7).await.is_ok());
    }

    #[tokio::test]
    async fn test_deleted_object_without_finalizer_is_ignored() {
        let h = harness();
        let mut mr = mark_deleted(bound(developer(), "7"));

        let action = h.reconcile::<ProjectMemberTranslator>(&mut mr).await.unwrap();
        assert_eq!(action, Action::await_change());
        assert!(h.gitlab.calls().is_empty());
        assert!(h.cluster.patches().is_empty());
    }

    #[tokio::test]
    async fn test_unbound_object_releases_finalizer_on_delete() {
        let h = harness();
        h.gitlab.fail_on("add_member", 403, "403 Forbidden");
        let mut mr = developer();
        assert!(h.reconcile::<ProjectMemberTranslator>(&mut mr).await.is_err());
        assert!(mr.has_finalizer());
        assert_eq!(mr.external_name(), "");

        let mut mr = mark_deleted(mr);
        h.gitlab.reset_calls();
        h.reconcile::<ProjectMemberTranslator>(&mut mr).await.unwrap();
        assert!(h.gitlab.calls().is_empty());
        assert!(!mr.has_finalizer());
    }

    #[tokio::test]
    async fn test_delete_not_found_counts_as_success() {
        let h = harness();
        let mut mr = developer();
        h.converge::<ProjectMemberTranslator>(&mut mr).await;

        h.gitlab.fail_on("delete_member", 404, "404 Not found");
        let mut mr = mark_deleted(mr);
        let action = h.reconcile::<ProjectMemberTranslator>(&mut mr).await.unwrap();
        assert_eq!(action, Action::requeue(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_finalizer() {
        let h = harness();
        let mut mr = developer();
        h.converge::<ProjectMemberTranslator>(&mut mr).await;

        h.gitlab.fail_on("delete_member", 500, "boom");
        let mut mr = mark_deleted(mr);
        let err = h.reconcile::<ProjectMemberTranslator>(&mut mr).await.unwrap_err();
        assert!(err.to_string().starts_with("cannot delete project member: "));
        assert!(mr.has_finalizer());
        let synced = condition(&mr, ConditionType::Synced).unwrap();
        assert_eq!(synced.status, ConditionStatus::False);
    }

    #[tokio::test]
    async fn test_malformed_external_name_is_rejected() {
        let h = harness();
        let mut mr = bound(developer(), "alice");

        let err = h.reconcile::<ProjectMemberTranslator>(&mut mr).await.unwrap_err();
        assert!(matches!(err, ControllerError::InvalidExternalName { .. }));
        assert!(h.gitlab.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_provider_config_is_reported() {
        let h = harness();
        let mut mr = patched(
            developer(),
            &serde_json::json!({ "spec": { "providerConfigRef": { "name": "missing" } } }),
        );

        let err = h.reconcile::<ProjectMemberTranslator>(&mut mr).await.unwrap_err();
        assert!(matches!(err, ControllerError::MissingProviderConfig(ref name) if name == "missing"));
        let synced = condition(&mr, ConditionType::Synced).unwrap();
        assert_eq!(synced.reason, ConditionReason::ReconcileError);
        assert!(synced.message.as_deref().unwrap_or_default().contains("missing"));
    }

    #[tokio::test]
    async fn test_error_backoff_grows_and_resets() {
        let h = harness_with_member(30).await;
        let mut mr = bound(developer(), "7");
        h.gitlab.fail_on("get_member", 503, "unavailable");

        assert!(h.reconcile::<ProjectMemberTranslator>(&mut mr).await.is_err());
        let minutes = |d: Duration| d.as_secs() / 60;
        assert_eq!(minutes(h.reconciler.error_requeue(&mr)), 1);
        assert_eq!(minutes(h.reconciler.error_requeue(&mr)), 1);
        assert_eq!(minutes(h.reconciler.error_requeue(&mr)), 2);

        h.gitlab.clear_failures();
        h.reconcile::<ProjectMemberTranslator>(&mut mr).await.unwrap();
        assert_eq!(minutes(h.reconciler.error_requeue(&mr)), 1);
        assert_eq!(Reconciler::object_key(&mr), "ProjectMember/team-a/dev");
    }

    #[tokio::test]
    async fn test_reconciles_are_counted() {
        let h = harness();
        let mut mr = developer();
        h.converge::<ProjectMemberTranslator>(&mut mr).await;

        let mut buffer = Vec::new();
        prometheus::TextEncoder::new()
            .encode(&h.reconciler.metrics.gather(), &mut buffer)
            .unwrap();
        let body = String::from_utf8(buffer).unwrap();
        assert!(body.contains("gitlab_provider_reconcile_total{kind=\"project member\",result=\"success\"} 2"));
        assert!(body.contains("operation=\"create\""));
    }
}
