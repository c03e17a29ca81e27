//! GroupSamlLink translator

use crate::error::ControllerError;
use crate::managed::external_name;
use crate::managed::translator::{
    ExternalContext, Translator, create_failed, deleted, found, parent_id, update_failed,
};
use crate::managed::{ExternalCreation, ExternalUpdate};
use crate::reconcile_helpers::{is_equal_or_unset_opt, late_init};
use async_trait::async_trait;
use crds::{GroupSamlLink, GroupSamlLinkObservation, GroupSamlLinkParameters, ManagedResource};
use gitlab_client::{ResourceId, SamlGroupLink, SamlLinkOptions};
use tracing::info;

const NAME: &str = "SAML group link";

pub struct GroupSamlLinkTranslator {
    ctx: ExternalContext,
}

fn group(mr: &GroupSamlLink) -> Result<ResourceId, ControllerError> {
    parent_id(mr.for_provider().group_id.as_ref(), "groupID")
}

fn options(name: &str, p: &GroupSamlLinkParameters) -> SamlLinkOptions {
    SamlLinkOptions {
        saml_group_name: name.to_string(),
        access_level: p.access_level,
        member_role_id: p.member_role_id,
    }
}

#[async_trait]
impl Translator for GroupSamlLinkTranslator {
    type Kind = GroupSamlLink;
    /// SAML group name
    type Id = String;
    type Remote = SamlGroupLink;

    const NAME: &'static str = NAME;

    fn new(ctx: ExternalContext) -> Self {
        Self { ctx }
    }

    fn parse_id(&self, external_name: &str) -> Result<String, ControllerError> {
        external_name::natural_key(external_name)
    }

    async fn fetch(&self, mr: &GroupSamlLink, name: &String) -> Result<Option<SamlGroupLink>, ControllerError> {
        let group = group(mr)?;
        found(NAME, self.ctx.gitlab.get_saml_link(&group, name).await)
    }

    fn late_initialize(&self, p: &mut GroupSamlLinkParameters, remote: &SamlGroupLink) -> bool {
        late_init(&mut p.member_role_id, remote.member_role_id)
    }

    fn observation(&self, remote: &SamlGroupLink) -> GroupSamlLinkObservation {
        GroupSamlLinkObservation {
            name: Some(remote.name.clone()),
            access_level: Some(remote.access_level),
        }
    }

    async fn is_up_to_date(&self, mr: &GroupSamlLink, remote: &SamlGroupLink) -> Result<bool, ControllerError> {
        let p = mr.for_provider();
        Ok(p.access_level == remote.access_level
            && is_equal_or_unset_opt(p.member_role_id.as_ref(), remote.member_role_id.as_ref()))
    }

    async fn create(&self, mr: &GroupSamlLink) -> Result<ExternalCreation, ControllerError> {
        let group = group(mr)?;
        let p = mr.for_provider();
        let link = self
            .ctx
            .gitlab
            .add_saml_link(&group, &options(&p.saml_group_name, p))
            .await
            .map_err(create_failed(NAME))?;
        Ok(ExternalCreation {
            external_name: link.name,
            ..Default::default()
        })
    }

    async fn update(
        &self,
        mr: &GroupSamlLink,
        name: &String,
        _remote: &SamlGroupLink,
    ) -> Result<ExternalUpdate, ControllerError> {
        let group = group(mr)?;
        info!("Re-creating SAML link {} on {}", name, group);
        deleted(NAME, self.ctx.gitlab.delete_saml_link(&group, name).await)?;
        self.ctx
            .gitlab
            .add_saml_link(&group, &options(name, mr.for_provider()))
            .await
            .map_err(update_failed(NAME))?;
        Ok(ExternalUpdate::default())
    }

    async fn delete(&self, mr: &GroupSamlLink, name: &String) -> Result<(), ControllerError> {
        let group = group(mr)?;
        deleted(NAME, self.ctx.gitlab.delete_saml_link(&group, name).await)
    }
}
