//! Unit tests for groups and their shared sub-resources

#[cfg(test)]
mod tests {
    use crate::reconciler::groups::{
        GroupAccessTokenTranslator, GroupDeployTokenTranslator, GroupMemberTranslator, GroupTranslator,
        GroupVariableTranslator,
    };
    use crate::test_utils::{Harness, managed, mark_deleted, patched, with_sink};
    use crds::{Group, GroupAccessToken, GroupDeployToken, GroupMember, GroupVariable, IdOrPath, ManagedResource};
    use gitlab_client::{GitLabClientTrait, Parent, ResourceId};
    use kube_runtime::controller::Action;

    fn platform() -> Group {
        managed("platform", "team-a", serde_json::json!({ "name": "Platform" }))
    }

    #[tokio::test]
    async fn test_create_defaults_path_to_object_name() {
        let h = Harness::new();
        let mut mr = platform();
        h.converge::<GroupTranslator>(&mut mr).await;

        assert_eq!(mr.external_name(), "100");
        let group = h.gitlab.group(100).unwrap();
        assert_eq!(group.path, "platform");
        assert_eq!(group.name, "Platform");
        let params = mr.for_provider();
        assert_eq!(params.path.as_deref(), Some("platform"));
        assert_eq!(params.visibility.as_deref(), Some("private"));
        assert_eq!(params.two_factor_grace_period, Some(48));
        assert_eq!(
            mr.at_provider().and_then(|o| o.full_path.clone()).as_deref(),
            Some("platform")
        );
    }

    #[tokio::test]
    async fn test_subgroup_resolves_parent_path() {
        let h = Harness::new();
        let mut parent = platform();
        h.converge::<GroupTranslator>(&mut parent).await;

        let mut mr: Group = managed(
            "api",
            "team-a",
            serde_json::json!({ "name": "API", "path": "api", "parentID": "platform" }),
        );
        h.converge::<GroupTranslator>(&mut mr).await;

        let group = h.gitlab.group(101).unwrap();
        assert_eq!(group.full_path, "platform/api");
        assert_eq!(group.parent_id, Some(100));
        assert_eq!(mr.for_provider().parent_id, Some(IdOrPath::from("platform")));
    }

    #[tokio::test]
    async fn test_visibility_drift_is_reverted() {
        let h = Harness::new();
        let mut mr = platform();
        h.converge::<GroupTranslator>(&mut mr).await;

        h.gitlab.mutate_group(100, |g| g.visibility = "public".to_string());
        h.gitlab.reset_calls();
        h.reconcile::<GroupTranslator>(&mut mr).await.unwrap();
        assert_eq!(h.gitlab.calls(), vec!["get_group", "edit_group"]);
        assert_eq!(h.gitlab.group(100).unwrap().visibility, "private");
    }

    #[tokio::test]
    async fn test_permanent_group_removal() {
        let h = Harness::new();
        h.gitlab.set_delayed_deletion(true);
        let mut mr = patched(platform(), &serde_json::json!({ "spec": { "forProvider": { "permanentlyRemove": true } } }));
        h.converge::<GroupTranslator>(&mut mr).await;

        let mut mr = mark_deleted(mr);
        h.reconcile::<GroupTranslator>(&mut mr).await.unwrap();
        assert_eq!(h.gitlab.call_count("delete_group"), 2);
        assert!(h.gitlab.group(100).is_none());

        let action = h.reconcile::<GroupTranslator>(&mut mr).await.unwrap();
        assert_eq!(action, Action::await_change());
        assert!(!mr.has_finalizer());
    }

    #[tokio::test]
    async fn test_marked_group_counts_as_gone() {
        let h = Harness::new();
        h.gitlab.set_delayed_deletion(true);
        let mut mr = platform();
        h.converge::<GroupTranslator>(&mut mr).await;

        let mut mr = mark_deleted(mr);
        h.reconcile::<GroupTranslator>(&mut mr).await.unwrap();
        assert!(h.gitlab.group(100).unwrap().marked_for_deletion_on.is_some());
        h.reconcile::<GroupTranslator>(&mut mr).await.unwrap();
        assert!(!mr.has_finalizer());
        assert_eq!(h.gitlab.call_count("delete_group"), 1);
    }

    #[tokio::test]
    async fn test_group_scoped_kinds_share_translators() {
        let h = Harness::new();
        let mut group = platform();
        h.converge::<GroupTranslator>(&mut group).await;
        let parent = Parent::Group(ResourceId::Numeric(100));

        let mut member: GroupMember = managed(
            "dev",
            "team-a",
            serde_json::json!({ "groupID": "platform", "userID": 7, "accessLevel": 30 }),
        );
        h.converge::<GroupMemberTranslator>(&mut member).await;
        assert_eq!(member.external_name(), "7");
        assert_eq!(h.gitlab.get_member(&parent, 7).await.unwrap().access_level, 30);

        let mut variable: GroupVariable = managed(
            "region",
            "team-a",
            serde_json::json!({ "groupID": 100, "key": "REGION", "value": "eu-west-1" }),
        );
        h.converge::<GroupVariableTranslator>(&mut variable).await;
        assert_eq!(variable.external_name(), "REGION");
        assert_eq!(h.gitlab.get_variable(&parent, "REGION", None).await.unwrap().value, "eu-west-1");

        let mut deploy_token: GroupDeployToken = with_sink(
            managed(
                "registry",
                "team-a",
                serde_json::json!({ "groupID": 100, "name": "registry", "scopes": ["read_registry"] }),
            ),
            "group-registry",
        );
        h.converge::<GroupDeployTokenTranslator>(&mut deploy_token).await;
        let token_id: i64 = deploy_token.external_name().parse().unwrap();
        assert_eq!(
            h.cluster.secret_value("team-a", "group-registry", "token"),
            Some(format!("gldt-mock{}", token_id))
        );

        let mut access_token: GroupAccessToken = with_sink(
            managed(
                "bot",
                "team-a",
                serde_json::json!({ "groupID": 100, "name": "bot", "scopes": ["read_api"] }),
            ),
            "group-bot",
        );
        h.converge::<GroupAccessTokenTranslator>(&mut access_token).await;
        let token_id: i64 = access_token.external_name().parse().unwrap();
        assert_eq!(
            h.cluster.secret_value("team-a", "group-bot", "token"),
            Some(format!("glpat-mock{}", token_id))
        );
    }

    #[tokio::test]
    async fn test_group_access_token_without_sink_is_rejected() {
        let h = Harness::new();
        let mut group = platform();
        h.converge::<GroupTranslator>(&mut group).await;

        let mut token: GroupAccessToken = managed(
            "bot",
            "team-a",
            serde_json::json!({ "groupID": 100, "name": "bot", "scopes": ["read_api"] }),
        );
        let err = h.reconcile::<GroupAccessTokenTranslator>(&mut token).await.unwrap_err();
        assert!(matches!(err, crate::error::ControllerError::MissingConnectionSecret(_)));
        assert_eq!(h.gitlab.call_count("create_access_token"), 0);
    }
}
