//! GroupLdapLink translator
//!
//! There is no single-link GET, so the group's links are listed and matched
//! on CN and provider. A changed access level is applied by deleting the link
//! and adding it again; the CN, and so the external name, stays the same.

use crate::error::ControllerError;
use crate::managed::external_name;
use crate::managed::translator::{
    ExternalContext, Translator, create_failed, deleted, found, parent_id, update_failed,
};
use crate::managed::{ExternalCreation, ExternalUpdate};
use async_trait::async_trait;
use crds::{GroupLdapLink, GroupLdapLinkObservation, GroupLdapLinkParameters, ManagedResource};
use gitlab_client::{GitLabError, LdapGroupLink, LdapLinkOptions, ResourceId};
use tracing::info;

const NAME: &str = "LDAP group link";

pub struct GroupLdapLinkTranslator {
    ctx: ExternalContext,
}

fn group(mr: &GroupLdapLink) -> Result<ResourceId, ControllerError> {
    parent_id(mr.for_provider().group_id.as_ref(), "groupID")
}

fn options(cn: &str, p: &GroupLdapLinkParameters) -> LdapLinkOptions {
    LdapLinkOptions {
        cn: Some(cn.to_string()),
        filter: None,
        group_access: p.group_access,
        provider: p.provider.clone(),
        member_role_id: None,
    }
}

impl GroupLdapLinkTranslator {
    async fn add(&self, group: &ResourceId, cn: &str, p: &GroupLdapLinkParameters) -> Result<(), GitLabError> {
        self.ctx.gitlab.add_ldap_link(group, &options(cn, p)).await.map(|_| ())
    }
}

#[async_trait]
impl Translator for GroupLdapLinkTranslator {
    type Kind = GroupLdapLink;
    /// Common name
    type Id = String;
    type Remote = LdapGroupLink;

    const NAME: &'static str = NAME;

    fn new(ctx: ExternalContext) -> Self {
        Self { ctx }
    }

    fn parse_id(&self, external_name: &str) -> Result<String, ControllerError> {
        external_name::natural_key(external_name)
    }

    async fn fetch(&self, mr: &GroupLdapLink, cn: &String) -> Result<Option<LdapGroupLink>, ControllerError> {
        let group = group(mr)?;
        let provider = &mr.for_provider().provider;
        let links = found(NAME, self.ctx.gitlab.list_ldap_links(&group).await)?.unwrap_or_default();
        Ok(links
            .into_iter()
            .find(|l| l.cn.as_deref() == Some(cn.as_str()) && &l.provider == provider))
    }

    fn observation(&self, remote: &LdapGroupLink) -> GroupLdapLinkObservation {
        GroupLdapLinkObservation {
            cn: remote.cn.clone(),
            group_access: Some(remote.group_access),
            provider: Some(remote.provider.clone()),
        }
    }

    async fn is_up_to_date(&self, mr: &GroupLdapLink, remote: &LdapGroupLink) -> Result<bool, ControllerError> {
        Ok(mr.for_provider().group_access == remote.group_access)
    }

    async fn create(&self, mr: &GroupLdapLink) -> Result<ExternalCreation, ControllerError> {
        let group = group(mr)?;
        let p = mr.for_provider();
        self.add(&group, &p.cn, p).await.map_err(create_failed(NAME))?;
        Ok(ExternalCreation {
            external_name: p.cn.clone(),
            ..Default::default()
        })
    }

    async fn update(
        &self,
        mr: &GroupLdapLink,
        cn: &String,
        remote: &LdapGroupLink,
    ) -> Result<ExternalUpdate, ControllerError> {
        let group = group(mr)?;
        let p = mr.for_provider();
        info!(
            "Re-creating LDAP link {} on {}: access {} -> {}",
            cn, group, remote.group_access, p.group_access
        );
        deleted(NAME, self.ctx.gitlab.delete_ldap_link(&group, cn, &remote.provider).await)?;
        self.add(&group, cn, p).await.map_err(update_failed(NAME))?;
        Ok(ExternalUpdate::default())
    }

    async fn delete(&self, mr: &GroupLdapLink, cn: &String) -> Result<(), ControllerError> {
        let group = group(mr)?;
        deleted(NAME, self.ctx.gitlab.delete_ldap_link(&group, cn, &mr.for_provider().provider).await)
    }
}
