//! Unit tests for LDAP and SAML group links

#[cfg(test)]
mod tests {
    use crate::reconciler::groups::{GroupLdapLinkTranslator, GroupSamlLinkTranslator};
    use crate::test_utils::{Harness, managed, mark_deleted, patched};
    use crds::{GroupLdapLink, GroupSamlLink, ManagedResource};
    use gitlab_client::{GitLabClientTrait, Group, ResourceId};

    fn harness_with_group() -> Harness {
        let h = Harness::new();
        h.gitlab.add_group(Group {
            id: 1,
            name: "Platform".to_string(),
            path: "platform".to_string(),
            full_path: "platform".to_string(),
            ..Default::default()
        });
        h
    }

    fn devs() -> GroupLdapLink {
        managed(
            "devs",
            "team-a",
            serde_json::json!({ "groupID": 1, "cn": "devs", "groupAccess": 30 }),
        )
    }

    #[tokio::test]
    async fn test_ldap_link_is_bound_to_its_cn() {
        let h = harness_with_group();
        let mut mr = devs();
        h.converge::<GroupLdapLinkTranslator>(&mut mr).await;

        assert_eq!(mr.external_name(), "devs");
        let observed = mr.at_provider().cloned().unwrap_or_default();
        assert_eq!(observed.provider.as_deref(), Some("ldapmain"));
        assert_eq!(observed.group_access, Some(30));

        h.gitlab.reset_calls();
        h.reconcile::<GroupLdapLinkTranslator>(&mut mr).await.unwrap();
        assert_eq!(h.gitlab.calls(), vec!["list_ldap_links"]);
    }

    #[tokio::test]
    async fn test_ldap_access_change_recreates_link_under_same_name() {
        let h = harness_with_group();
        let mut mr = devs();
        h.converge::<GroupLdapLinkTranslator>(&mut mr).await;

        mr = patched(mr, &serde_json::json!({ "spec": { "forProvider": { "groupAccess": 40 } } }));
        h.gitlab.reset_calls();
        h.reconcile::<GroupLdapLinkTranslator>(&mut mr).await.unwrap();

        assert_eq!(
            h.gitlab.calls(),
            vec!["list_ldap_links", "delete_ldap_link", "add_ldap_link"]
        );
        assert_eq!(mr.external_name(), "devs");
        let links = h.gitlab.list_ldap_links(&ResourceId::Numeric(1)).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].group_access, 40);
    }

    #[tokio::test]
    async fn test_ldap_link_removed_out_of_band_is_recreated() {
        let h = harness_with_group();
        let mut mr = devs();
        h.converge::<GroupLdapLinkTranslator>(&mut mr).await;

        h.gitlab.mutate_ldap_links(1, |links| links.clear());
        h.gitlab.reset_calls();
        h.converge::<GroupLdapLinkTranslator>(&mut mr).await;
        assert_eq!(h.gitlab.call_count("add_ldap_link"), 1);
        assert_eq!(mr.external_name(), "devs");
    }

    #[tokio::test]
    async fn test_ldap_link_delete() {
        let h = harness_with_group();
        let mut mr = devs();
        h.converge::<GroupLdapLinkTranslator>(&mut mr).await;

        let mut mr = mark_deleted(mr);
        h.reconcile::<GroupLdapLinkTranslator>(&mut mr).await.unwrap();
        assert!(h.gitlab.list_ldap_links(&ResourceId::Numeric(1)).await.unwrap().is_empty());
        h.reconcile::<GroupLdapLinkTranslator>(&mut mr).await.unwrap();
        assert!(!mr.has_finalizer());
    }

    #[tokio::test]
    async fn test_saml_link_drift_recreates() {
        let h = harness_with_group();
        let mut mr: GroupSamlLink = managed(
            "admins",
            "team-a",
            serde_json::json!({ "groupID": "platform", "samlGroupName": "admins", "accessLevel": 40 }),
        );
        h.converge::<GroupSamlLinkTranslator>(&mut mr).await;
        assert_eq!(mr.external_name(), "admins");

        mr = patched(mr, &serde_json::json!({ "spec": { "forProvider": { "accessLevel": 50 } } }));
        h.gitlab.reset_calls();
        h.reconcile::<GroupSamlLinkTranslator>(&mut mr).await.unwrap();
        assert_eq!(h.gitlab.calls(), vec!["get_saml_link", "delete_saml_link", "add_saml_link"]);
        let link = h.gitlab.get_saml_link(&ResourceId::Numeric(1), "admins").await.unwrap();
        assert_eq!(link.access_level, 50);
        assert_eq!(mr.external_name(), "admins");
    }
}
