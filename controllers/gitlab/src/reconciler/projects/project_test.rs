//! Unit tests for the Project translator

#[cfg(test)]
mod tests {
    use crate::reconciler::projects::ProjectTranslator;
    use crate::test_utils::{Harness, condition, managed, mark_deleted, patched, with_sink};
    use crds::{ConditionStatus, ConditionType, ManagedResource, Project};
    use gitlab_client::{GitLabClientTrait, Group, ResourceId};
    use kube_runtime::controller::Action;
    use std::time::Duration;

    fn demo() -> Project {
        managed(
            "demo",
            "team-a",
            serde_json::json!({ "name": "demo", "visibility": "private" }),
        )
    }

    #[tokio::test]
    async fn test_create_binds_and_publishes_runners_token() {
        let h = Harness::new();
        let mut mr = with_sink(demo(), "demo-conn");

        let action = h.reconcile::<ProjectTranslator>(&mut mr).await.unwrap();
        assert_eq!(action, Action::requeue(Duration::from_secs(5)));
        assert_eq!(mr.external_name(), "100");
        assert_eq!(
            h.cluster.secret_value("team-a", "demo-conn", "runnersToken").as_deref(),
            Some("GR1348941mock100")
        );

        let action = h.reconcile::<ProjectTranslator>(&mut mr).await.unwrap();
        assert_eq!(action, Action::requeue(Duration::from_secs(60)));
        let at_provider = mr.at_provider().cloned().unwrap_or_default();
        assert_eq!(at_provider.id, Some(100));
        assert_eq!(at_provider.full_path.as_deref(), Some("root/demo"));
        let ready = condition(&mr, ConditionType::Ready).unwrap();
        assert_eq!(ready.status, ConditionStatus::True);
        assert_eq!(h.gitlab.call_count("create_project"), 1);
    }

    #[tokio::test]
    async fn test_late_init_fills_unset_fields_once() {
        let h = Harness::new();
        let mut mr = demo();
        h.converge::<ProjectTranslator>(&mut mr).await;

        let params = mr.for_provider();
        assert_eq!(params.default_branch.as_deref(), Some("main"));
        assert_eq!(params.merge_method.as_deref(), Some("merge"));
        // An empty CI config path means "default" and is not copied
        assert_eq!(params.ci_config_path, None);

        h.gitlab.reset_calls();
        h.reconcile::<ProjectTranslator>(&mut mr).await.unwrap();
        assert_eq!(h.gitlab.calls(), vec!["get_project"]);
    }

    #[tokio::test]
    async fn test_description_drift_is_reverted() {
        let h = Harness::new();
        let mut mr = patched(demo(), &serde_json::json!({ "spec": { "forProvider": { "description": "declared" } } }));
        h.converge::<ProjectTranslator>(&mut mr).await;

        h.gitlab.mutate_project(100, |p| p.description = Some("edited in the UI".to_string()));
        h.gitlab.reset_calls();
        h.reconcile::<ProjectTranslator>(&mut mr).await.unwrap();

        assert_eq!(h.gitlab.calls(), vec!["get_project", "edit_project"]);
        let project = h.gitlab.project(100).unwrap();
        assert_eq!(project.description.as_deref(), Some("declared"));
    }

    #[tokio::test]
    async fn test_namespace_path_is_resolved_on_create() {
        let h = Harness::new();
        h.gitlab.add_group(Group {
            id: 9,
            name: "Platform".to_string(),
            path: "platform".to_string(),
            full_path: "platform".to_string(),
            ..Default::default()
        });
        let mut mr: Project = managed("api", "team-a", serde_json::json!({ "namespaceID": "platform" }));
        h.converge::<ProjectTranslator>(&mut mr).await;

        let project = h.gitlab.project(100).unwrap();
        assert_eq!(project.path_with_namespace, "platform/api");
        // The declared path is kept; only unset fields are late-initialized
        assert_eq!(mr.for_provider().namespace_id, Some(crds::IdOrPath::from("platform")));
    }

    #[tokio::test]
    async fn test_push_rules_and_shares_follow_create() {
        let h = Harness::new();
        for id in [5, 6] {
            h.gitlab.add_group(Group {
                id,
                full_path: format!("team-{}", id),
                ..Default::default()
            });
        }
        let mut mr = patched(
            demo(),
            &serde_json::json!({ "spec": { "forProvider": {
                "pushRules": { "denyDeleteTag": true },
                "sharedWithGroups": [
                    { "groupID": 5, "groupAccessLevel": 30 },
                    { "groupID": 6, "groupAccessLevel": 20 }
                ]
            } } }),
        );
        h.converge::<ProjectTranslator>(&mut mr).await;

        assert_eq!(h.gitlab.call_count("add_push_rules"), 1);
        assert_eq!(h.gitlab.call_count("share_with_group"), 2);
        let rules = h.gitlab.get_push_rules(&ResourceId::Numeric(100)).await.unwrap();
        assert_eq!(rules.and_then(|r| r.deny_delete_tag), Some(true));

        // Dropping a share from the spec unshares it and nothing else
        mr = patched(
            mr,
            &serde_json::json!({ "spec": { "forProvider": {
                "sharedWithGroups": [{ "groupID": 5, "groupAccessLevel": 30 }]
            } } }),
        );
        h.gitlab.reset_calls();
        h.reconcile::<ProjectTranslator>(&mut mr).await.unwrap();
        assert_eq!(h.gitlab.call_count("unshare_with_group"), 1);
        assert_eq!(h.gitlab.call_count("share_with_group"), 0);
        let shared: Vec<i64> = h
            .gitlab
            .project(100)
            .unwrap()
            .shared_with_groups
            .iter()
            .map(|s| s.group_id)
            .collect();
        assert_eq!(shared, vec![5]);
    }

    #[tokio::test]
    async fn test_permanent_removal_issues_second_delete() {
        let h = Harness::new();
        h.gitlab.set_delayed_deletion(true);
        let mut mr: Project = managed(
            "demo",
            "team-a",
            serde_json::json!({ "path": "demo", "permanentlyRemove": true }),
        );
        h.converge::<ProjectTranslator>(&mut mr).await;
        assert_eq!(mr.at_provider().and_then(|o| o.full_path.clone()).as_deref(), Some("root/demo"));

        let mut mr = mark_deleted(mr);
        h.gitlab.reset_calls();
        let action = h.reconcile::<ProjectTranslator>(&mut mr).await.unwrap();
        assert_eq!(action, Action::requeue(Duration::from_secs(5)));
        assert_eq!(h.gitlab.call_count("delete_project"), 2);
        assert!(h.gitlab.project(100).is_none());

        let action = h.reconcile::<ProjectTranslator>(&mut mr).await.unwrap();
        assert_eq!(action, Action::await_change());
        assert!(!mr.has_finalizer());
    }

    #[tokio::test]
    async fn test_marked_project_counts_as_gone() {
        let h = Harness::new();
        h.gitlab.set_delayed_deletion(true);
        let mut mr = demo();
        h.converge::<ProjectTranslator>(&mut mr).await;

        let mut mr = mark_deleted(mr);
        h.reconcile::<ProjectTranslator>(&mut mr).await.unwrap();
        assert_eq!(h.gitlab.call_count("delete_project"), 1);
        let project = h.gitlab.project(100).unwrap();
        assert!(project.marked_for_deletion_on.is_some());

        let action = h.reconcile::<ProjectTranslator>(&mut mr).await.unwrap();
        assert_eq!(action, Action::await_change());
        assert!(!mr.has_finalizer());
        assert_eq!(h.gitlab.call_count("delete_project"), 1);
    }

    #[tokio::test]
    async fn test_get_failure_sets_error_condition() {
        let h = Harness::new();
        let mut mr = demo();
        h.converge::<ProjectTranslator>(&mut mr).await;

        h.gitlab.fail_on("get_project", 500, "boom");
        let err = h.reconcile::<ProjectTranslator>(&mut mr).await.unwrap_err();
        assert!(err.to_string().starts_with("cannot get project: "));
        let synced = condition(&mr, ConditionType::Synced).unwrap();
        assert_eq!(synced.status, ConditionStatus::False);
        assert_eq!(mr.external_name(), "100");
    }
}
