//! Group-scoped CRDs

pub mod access_token;
pub mod deploy_token;
pub mod group;
pub mod ldap_link;
pub mod member;
pub mod saml_link;
pub mod variable;

pub use access_token::*;
pub use deploy_token::*;
pub use group::*;
pub use ldap_link::*;
pub use member::*;
pub use saml_link::*;
pub use variable::*;
