//! ProjectDeployToken translator

use crate::reconciler::shared::deploy_token::{DeployTokenKind, DeployTokenTranslator};
use crate::reconciler::shared::{Scope, scoped_kind};
use crds::{ProjectDeployToken, ProjectDeployTokenParameters, DeployTokenParameters};

scoped_kind!(ProjectDeployToken, "project deploy token", Scope::Project, project_id);

impl DeployTokenKind for ProjectDeployToken {
    fn token(params: &ProjectDeployTokenParameters) -> &DeployTokenParameters {
        &params.token
    }

    fn token_mut(params: &mut ProjectDeployTokenParameters) -> &mut DeployTokenParameters {
        &mut params.token
    }
}

pub type ProjectDeployTokenTranslator = DeployTokenTranslator<ProjectDeployToken>;
