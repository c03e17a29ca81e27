//! Instance-scoped translators

pub mod license;
pub mod settings;

#[cfg(test)]
mod instance_test;

pub use license::LicenseTranslator;
pub use settings::ApplicationSettingsTranslator;
