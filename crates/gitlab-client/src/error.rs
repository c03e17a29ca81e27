//! GitLab client errors

use thiserror::Error;

/// Errors that can occur when interacting with the GitLab API
#[derive(Debug, Error)]
pub enum GitLabError {
    /// HTTP transport error (connection refused, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GitLab API returned a non-success status
    #[error("GitLab API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (invalid token, expired, insufficient scope)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (e.g., missing required fields)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Coarse classification used by the controller to decide how an error surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// 404 - the entity does not exist
    NotFound,
    /// 5xx, 429, timeouts, connection failures - retry later
    Transient,
    /// Any other 4xx or a malformed payload
    Permanent,
}

impl GitLabError {
    /// Build an error from a non-success HTTP status and response body
    pub fn from_status(status: u16, path: &str, body: &str) -> Self {
        let message = extract_message(body);
        match status {
            404 => GitLabError::NotFound(format!("{}: {}", path, message)),
            401 | 403 => GitLabError::Authentication(format!("{}: {}", path, message)),
            _ => GitLabError::Api { status, message },
        }
    }

    /// Returns true for a 404-class response
    pub fn is_not_found(&self) -> bool {
        matches!(self, GitLabError::NotFound(_))
    }

    /// Returns true if the same request may succeed later
    pub fn is_transient(&self) -> bool {
        match self {
            GitLabError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            GitLabError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Classify into not-found / transient / permanent
    pub fn class(&self) -> ErrorClass {
        if self.is_not_found() {
            ErrorClass::NotFound
        } else if self.is_transient() {
            ErrorClass::Transient
        } else {
            ErrorClass::Permanent
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            GitLabError::Api { status, .. } => Some(*status),
            GitLabError::NotFound(_) => Some(404),
            GitLabError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// GitLab reports errors as `{"message": ...}` or `{"error": ...}`, where
/// `message` may itself be an object of field -> [errors].
fn extract_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.chars().take(500).collect();
    };
    let field = value.get("message").or_else(|| value.get("error"));
    match field {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => body.chars().take(500).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_not_found() {
        let err = GitLabError::from_status(404, "/projects/42", r#"{"message":"404 Project Not Found"}"#);
        assert!(err.is_not_found());
        assert_eq!(err.class(), ErrorClass::NotFound);
        assert!(err.to_string().contains("404 Project Not Found"));
    }

    #[test]
    fn test_from_status_transient() {
        let err = GitLabError::from_status(503, "/projects", "upstream unavailable");
        assert!(err.is_transient());
        assert_eq!(err.status(), Some(503));

        let err = GitLabError::from_status(429, "/projects", r#"{"message":"Retry later"}"#);
        assert_eq!(err.class(), ErrorClass::Transient);
    }

    #[test]
    fn test_from_status_permanent_with_field_errors() {
        let err = GitLabError::from_status(
            400,
            "/projects",
            r#"{"message":{"name":["has already been taken"]}}"#,
        );
        assert_eq!(err.class(), ErrorClass::Permanent);
        assert!(err.to_string().contains("has already been taken"));
    }

    #[test]
    fn test_from_status_auth() {
        let err = GitLabError::from_status(401, "/user", r#"{"message":"401 Unauthorized"}"#);
        assert!(matches!(err, GitLabError::Authentication(_)));
        assert_eq!(err.class(), ErrorClass::Permanent);
    }
}
