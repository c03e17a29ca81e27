//! Int-or-string identifier for GitLab projects and groups

use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Numeric ID (`42`) or full path (`my-group/my-project`) of a project or group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdOrPath {
    Id(i64),
    Path(String),
}

impl IdOrPath {
    /// The numeric ID, if this is one
    pub fn as_id(&self) -> Option<i64> {
        match self {
            IdOrPath::Id(id) => Some(*id),
            IdOrPath::Path(path) => path.parse().ok(),
        }
    }
}

impl fmt::Display for IdOrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdOrPath::Id(id) => write!(f, "{}", id),
            IdOrPath::Path(path) => write!(f, "{}", path),
        }
    }
}

impl From<i64> for IdOrPath {
    fn from(id: i64) -> Self {
        IdOrPath::Id(id)
    }
}

impl From<&str> for IdOrPath {
    fn from(path: &str) -> Self {
        IdOrPath::Path(path.to_string())
    }
}

impl JsonSchema for IdOrPath {
    fn schema_name() -> Cow<'static, str> {
        "IdOrPath".into()
    }

    fn inline_schema() -> bool {
        true
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "description": "Numeric ID or full path",
            "x-kubernetes-int-or-string": true,
            "anyOf": [{ "type": "integer" }, { "type": "string" }]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_int_or_string() {
        let id: IdOrPath = serde_json::from_str("42").unwrap();
        assert_eq!(id, IdOrPath::Id(42));
        let path: IdOrPath = serde_json::from_str("\"group/app\"").unwrap();
        assert_eq!(path, IdOrPath::Path("group/app".to_string()));
        assert_eq!(path.as_id(), None);
        assert_eq!(IdOrPath::from("17").as_id(), Some(17));
    }
}
