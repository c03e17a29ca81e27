//! External-name parsing
//!
//! The annotation is written once at creation; these helpers turn it back
//! into the identifier a kind expects.

use crate::error::ControllerError;

/// Parse a base-10 remote ID
pub fn numeric(name: &str) -> Result<i64, ControllerError> {
    name.parse::<i64>().map_err(|_| ControllerError::InvalidExternalName {
        name: name.to_string(),
        reason: "must be an integer".to_string(),
    })
}

/// A natural key (variable key, LDAP CN, SAML group name); must not contain
/// surrounding whitespace
pub fn natural_key(name: &str) -> Result<String, ControllerError> {
    if name.trim() != name {
        return Err(ControllerError::InvalidExternalName {
            name: name.to_string(),
            reason: "must not contain leading or trailing whitespace".to_string(),
        });
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric() {
        assert_eq!(numeric("42").unwrap(), 42);
        let err = numeric("my-project").unwrap_err();
        assert!(matches!(err, ControllerError::InvalidExternalName { .. }));
        assert!(numeric("4 2").is_err());
    }

    #[test]
    fn test_natural_key() {
        assert_eq!(natural_key("cn=devs,ou=groups").unwrap(), "cn=devs,ou=groups");
        assert!(natural_key(" DEPLOY_TOKEN").is_err());
    }
}
