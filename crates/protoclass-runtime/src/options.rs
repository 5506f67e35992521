//! Registry configuration

use crate::error::OptionsError;
use serde::Deserialize;

/// What `define` does when the name is already registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedefinitionPolicy {
    /// Replace the existing entry
    #[default]
    Overwrite,
    /// Fail with `DefinitionError::AlreadyDefined`
    Reject,
}

/// What `define` does when the declared parent is not registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingParentPolicy {
    /// Fail with `DefinitionError::UnknownParent`
    #[default]
    Reject,
    /// Link under the base class instead
    Base,
}

/// Configuration options for a [`crate::ClassRegistry`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryOptions {
    /// Root namespace owned by the runtime; kept on registry teardown
    pub root_namespace: String,

    /// Name the root base class is registered under, and the parent of every
    /// class that does not declare one
    pub base_class: String,

    /// Redefinition behaviour
    pub redefinition: RedefinitionPolicy,

    /// Unregistered-parent behaviour
    pub missing_parent: MissingParentPolicy,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            root_namespace: "Proto".to_string(),
            base_class: "Proto.BaseClass".to_string(),
            redefinition: RedefinitionPolicy::Overwrite,
            missing_parent: MissingParentPolicy::Reject,
        }
    }
}

impl RegistryOptions {
    /// Load options from TOML; missing fields keep their defaults
    ///
    /// ```toml
    /// root_namespace = "App"
    /// base_class = "App.Base"
    /// redefinition = "reject"
    /// missing_parent = "base"
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, OptionsError> {
        Ok(toml::from_str(source)?)
    }

    /// Reject redefinition of registered names
    pub fn rejecting_redefinition(mut self) -> Self {
        self.redefinition = RedefinitionPolicy::Reject;
        self
    }

    /// Link classes with an unregistered parent under the base class
    pub fn falling_back_to_base(mut self) -> Self {
        self.missing_parent = MissingParentPolicy::Base;
        self
    }
}
