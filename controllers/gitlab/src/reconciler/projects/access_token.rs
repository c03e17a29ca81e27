//! ProjectAccessToken translator

use crate::reconciler::shared::access_token::{AccessTokenKind, AccessTokenTranslator};
use crate::reconciler::shared::{Scope, scoped_kind};
use crds::{ProjectAccessToken, ProjectAccessTokenParameters, AccessTokenParameters};

scoped_kind!(ProjectAccessToken, "project access token", Scope::Project, project_id);

impl AccessTokenKind for ProjectAccessToken {
    fn token(params: &ProjectAccessTokenParameters) -> &AccessTokenParameters {
        &params.token
    }

    fn token_mut(params: &mut ProjectAccessTokenParameters) -> &mut AccessTokenParameters {
        &mut params.token
    }
}

pub type ProjectAccessTokenTranslator = AccessTokenTranslator<ProjectAccessToken>;
