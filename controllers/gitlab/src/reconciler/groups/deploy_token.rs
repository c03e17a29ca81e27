//! GroupDeployToken translator

use crate::reconciler::shared::deploy_token::{DeployTokenKind, DeployTokenTranslator};
use crate::reconciler::shared::{Scope, scoped_kind};
use crds::{GroupDeployToken, GroupDeployTokenParameters, DeployTokenParameters};

scoped_kind!(GroupDeployToken, "group deploy token", Scope::Group, group_id);

impl DeployTokenKind for GroupDeployToken {
    fn token(params: &GroupDeployTokenParameters) -> &DeployTokenParameters {
        &params.token
    }

    fn token_mut(params: &mut GroupDeployTokenParameters) -> &mut DeployTokenParameters {
        &mut params.token
    }
}

pub type GroupDeployTokenTranslator = DeployTokenTranslator<GroupDeployToken>;
