//! Identifiers accepted by GitLab path parameters
//!
//! Most GitLab endpoints accept either the numeric ID or the URL-encoded
//! full path of a project or group (`:id` in the API docs).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A project or group identifier: numeric ID or full path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    /// Numeric ID, e.g. `42`
    Numeric(i64),
    /// Full path, e.g. `my-group/my-project`
    Path(String),
}

impl ResourceId {
    /// Render as a single URL path segment (paths are percent-encoded)
    pub fn to_path_segment(&self) -> String {
        match self {
            ResourceId::Numeric(id) => id.to_string(),
            ResourceId::Path(path) => urlencoding::encode(path).into_owned(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Numeric(id) => write!(f, "{}", id),
            ResourceId::Path(path) => write!(f, "{}", path),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId::Numeric(id)
    }
}

impl From<&str> for ResourceId {
    fn from(path: &str) -> Self {
        ResourceId::Path(path.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(path: String) -> Self {
        ResourceId::Path(path)
    }
}

/// Owner of a sub-resource that exists on both projects and groups
/// (members, variables, deploy tokens, access tokens, shares).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Parent {
    Project(ResourceId),
    Group(ResourceId),
}

impl Parent {
    /// API path prefix, e.g. `/projects/42` or `/groups/a%2Fb`
    pub fn path(&self) -> String {
        match self {
            Parent::Project(id) => format!("/projects/{}", id.to_path_segment()),
            Parent::Group(id) => format!("/groups/{}", id.to_path_segment()),
        }
    }

    /// The identifier of the owning project or group
    pub fn id(&self) -> &ResourceId {
        match self {
            Parent::Project(id) | Parent::Group(id) => id,
        }
    }
}

impl fmt::Display for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parent::Project(id) => write!(f, "project {}", id),
            Parent::Group(id) => write!(f, "group {}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segment_encodes_namespaced_path() {
        let id = ResourceId::from("my-group/sub group/app");
        assert_eq!(id.to_path_segment(), "my-group%2Fsub%20group%2Fapp");
        assert_eq!(ResourceId::from(42).to_path_segment(), "42");
    }

    #[test]
    fn test_untagged_deserialize() {
        let numeric: ResourceId = serde_json::from_str("7").unwrap();
        assert_eq!(numeric, ResourceId::Numeric(7));
        let path: ResourceId = serde_json::from_str("\"g/p\"").unwrap();
        assert_eq!(path, ResourceId::Path("g/p".to_string()));
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(Parent::Project(ResourceId::Numeric(3)).path(), "/projects/3");
        assert_eq!(Parent::Group("a/b".into()).path(), "/groups/a%2Fb");
    }
}
