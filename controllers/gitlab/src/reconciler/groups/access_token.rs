//! GroupAccessToken translator

use crate::reconciler::shared::access_token::{AccessTokenKind, AccessTokenTranslator};
use crate::reconciler::shared::{Scope, scoped_kind};
use crds::{GroupAccessToken, GroupAccessTokenParameters, AccessTokenParameters};

scoped_kind!(GroupAccessToken, "group access token", Scope::Group, group_id);

impl AccessTokenKind for GroupAccessToken {
    fn token(params: &GroupAccessTokenParameters) -> &AccessTokenParameters {
        &params.token
    }

    fn token_mut(params: &mut GroupAccessTokenParameters) -> &mut AccessTokenParameters {
        &mut params.token
    }
}

pub type GroupAccessTokenTranslator = AccessTokenTranslator<GroupAccessToken>;
