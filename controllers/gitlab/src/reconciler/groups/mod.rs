//! Group-scoped translators

pub mod access_token;
pub mod deploy_token;
pub mod group;
pub mod ldap_link;
pub mod member;
pub mod saml_link;
pub mod variable;

#[cfg(test)]
mod group_test;
#[cfg(test)]
mod links_test;

pub use access_token::GroupAccessTokenTranslator;
pub use deploy_token::GroupDeployTokenTranslator;
pub use group::GroupTranslator;
pub use ldap_link::GroupLdapLinkTranslator;
pub use member::GroupMemberTranslator;
pub use saml_link::GroupSamlLinkTranslator;
pub use variable::GroupVariableTranslator;
