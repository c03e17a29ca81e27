//! Translators for sub-resources that exist on both projects and groups
//!
//! Members, CI/CD variables, deploy tokens and access tokens behave the same
//! under `/projects/:id` and `/groups/:id`. Each translator here is generic
//! over a [`ScopedKind`], implemented by the project and group variants of
//! the kind, which tells it where the parent ID lives.

pub mod access_token;
pub mod deploy_token;
pub mod member;
pub mod shares;
pub mod variable;

use crate::error::ControllerError;
use crate::managed::translator::parent_id;
use crds::{IdOrPath, ManagedResource};
use gitlab_client::{Parent, ResourceId};

/// Owner scope of a shared sub-resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Project,
    Group,
}

impl Scope {
    /// Spec field naming the parent
    pub fn field(self) -> &'static str {
        match self {
            Scope::Project => "projectID",
            Scope::Group => "groupID",
        }
    }

    pub fn parent(self, id: ResourceId) -> Parent {
        match self {
            Scope::Project => Parent::Project(id),
            Scope::Group => Parent::Group(id),
        }
    }
}

/// A managed kind owned by a project or a group
pub trait ScopedKind: ManagedResource {
    /// Name used in error messages and metrics
    const NAME: &'static str;
    const SCOPE: Scope;

    fn parent_ref(params: &Self::Parameters) -> Option<&IdOrPath>;
}

/// The parent of a scoped object; *missing-parent-id* if unset
pub fn parent<K: ScopedKind>(mr: &K) -> Result<Parent, ControllerError> {
    let id = parent_id(K::parent_ref(mr.for_provider()), K::SCOPE.field())?;
    Ok(K::SCOPE.parent(id))
}

/// Implement [`ScopedKind`] for a kind whose parameters carry the parent ID
/// in `$field`
macro_rules! scoped_kind {
    ($kind:ty, $name:literal, $scope:expr, $field:ident) => {
        impl $crate::reconciler::shared::ScopedKind for $kind {
            const NAME: &'static str = $name;
            const SCOPE: $crate::reconciler::shared::Scope = $scope;

            fn parent_ref(params: &Self::Parameters) -> Option<&crds::IdOrPath> {
                params.$field.as_ref()
            }
        }
    };
}
pub(crate) use scoped_kind;
