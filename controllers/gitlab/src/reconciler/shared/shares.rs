//! Group shares of projects and groups
//!
//! GitLab has no endpoint to edit a share, so a changed access level or
//! expiry is applied by unsharing and sharing again.

use crate::error::ControllerError;
use crate::managed::translator::update_failed;
use crate::reconcile_helpers::{CollectionDiff, diff_by_key, is_date_equal_or_unset};
use crds::{SharedWithGroupObservation, SharedWithGroupParameters};
use gitlab_client::{GitLabClientTrait, Parent, ShareOptions, SharedWithGroup};
use tracing::debug;

fn diff(
    declared: &[SharedWithGroupParameters],
    observed: &[SharedWithGroup],
) -> CollectionDiff<i64, SharedWithGroupParameters> {
    diff_by_key(
        declared,
        observed,
        |d| d.group_id,
        |o| o.group_id,
        |d, o| {
            d.group_access_level == o.group_access_level
                && is_date_equal_or_unset(d.expires_at.as_ref(), o.expires_at.as_deref())
        },
    )
}

/// Unset declared shares are unmanaged
pub fn up_to_date(declared: Option<&Vec<SharedWithGroupParameters>>, observed: &[SharedWithGroup]) -> bool {
    declared.is_none_or(|declared| diff(declared, observed).is_empty())
}

pub fn observations(observed: &[SharedWithGroup]) -> Vec<SharedWithGroupObservation> {
    observed
        .iter()
        .map(|s| SharedWithGroupObservation {
            group_id: s.group_id,
            group_full_path: s.group_full_path.clone(),
            group_access_level: s.group_access_level,
            expires_at: s.expires_at.clone(),
        })
        .collect()
}

/// Issue the minimum unshare/share calls; stops at the first failure
pub async fn apply(
    gitlab: &dyn GitLabClientTrait,
    kind: &'static str,
    parent: &Parent,
    declared: Option<&Vec<SharedWithGroupParameters>>,
    observed: &[SharedWithGroup],
) -> Result<(), ControllerError> {
    let Some(declared) = declared else {
        return Ok(());
    };
    let diff = diff(declared, observed);

    for group_id in &diff.remove {
        debug!("Unsharing {} with group {}", parent, group_id);
        gitlab
            .unshare_with_group(parent, *group_id)
            .await
            .map_err(update_failed(kind))?;
    }
    for share in &diff.change {
        debug!("Re-sharing {} with group {}", parent, share.group_id);
        gitlab
            .unshare_with_group(parent, share.group_id)
            .await
            .map_err(update_failed(kind))?;
        gitlab
            .share_with_group(parent, &options(share))
            .await
            .map_err(update_failed(kind))?;
    }
    for share in &diff.add {
        debug!("Sharing {} with group {}", parent, share.group_id);
        gitlab
            .share_with_group(parent, &options(share))
            .await
            .map_err(update_failed(kind))?;
    }
    Ok(())
}

fn options(share: &SharedWithGroupParameters) -> ShareOptions {
    ShareOptions {
        group_id: share.group_id,
        group_access: share.group_access_level,
        expires_at: share.expires_at.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitlab_client::{Group, MockGitLabClient, Project, ResourceId};

    fn share(group_id: i64, level: i64) -> SharedWithGroupParameters {
        SharedWithGroupParameters {
            group_id,
            group_access_level: level,
            expires_at: None,
        }
    }

    #[test]
    fn test_unset_shares_are_unmanaged() {
        let observed = vec![SharedWithGroup {
            group_id: 5,
            group_access_level: 30,
            ..Default::default()
        }];
        assert!(up_to_date(None, &observed));
        assert!(!up_to_date(Some(&vec![]), &observed));
        assert!(up_to_date(Some(&vec![share(5, 30)]), &observed));
        assert!(!up_to_date(Some(&vec![share(5, 40)]), &observed));
    }

    #[tokio::test]
    async fn test_apply_issues_minimum_calls() {
        let gitlab = MockGitLabClient::new();
        gitlab.add_project(Project {
            id: 1,
            path_with_namespace: "g/app".to_string(),
            ..Default::default()
        });
        for id in [5, 6, 7] {
            gitlab.add_group(Group {
                id,
                full_path: format!("team-{}", id),
                ..Default::default()
            });
        }
        let parent = Parent::Project(ResourceId::Numeric(1));
        gitlab.share_with_group(&parent, &options(&share(5, 30))).await.unwrap();
        gitlab.share_with_group(&parent, &options(&share(6, 30))).await.unwrap();
        gitlab.reset_calls();

        let observed = gitlab.project(1).unwrap().shared_with_groups;
        let declared = vec![share(5, 30), share(6, 40), share(7, 20)];
        apply(&gitlab, "project", &parent, Some(&declared), &observed).await.unwrap();

        assert_eq!(
            gitlab.calls(),
            vec!["unshare_with_group", "share_with_group", "share_with_group"]
        );
        let after = gitlab.project(1).unwrap().shared_with_groups;
        assert!(up_to_date(Some(&declared), &after));
    }
}
