//! Class descriptors
//!
//! The declarative input to `ClassRegistry::define`: parent, mixins,
//! statics, instance members and lifecycle flags.

use indexmap::IndexMap;
use protoclass_core::{CoreResult, Function, Invocation, Value};

/// Declarative class definition
#[derive(Debug, Clone, Default)]
pub struct ClassDescriptor {
    /// Parent class name (defaults to the registry's base class)
    pub extend: Option<String>,
    /// Mixin class names, highest priority first
    pub mixins: Vec<String>,
    /// Members copied onto the class itself
    pub statics: IndexMap<String, Value>,
    /// Members copied onto the prototype
    pub members: IndexMap<String, Value>,
    /// Collapse the class into one eagerly created instance
    pub singleton: bool,
    /// Secondary lookup name
    pub alias: Option<String>,
    /// Key this class is recorded under when used as a mixin
    pub mixin_id: Option<String>,
}

impl ClassDescriptor {
    /// Create an empty descriptor
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the parent class
    pub fn extend(mut self, parent: impl Into<String>) -> Self {
        self.extend = Some(parent.into());
        self
    }

    /// Append a mixin
    pub fn mixin(mut self, name: impl Into<String>) -> Self {
        self.mixins.push(name.into());
        self
    }

    /// Add a static member
    pub fn static_member(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.statics.insert(name.into(), value.into());
        self
    }

    /// Add a static function
    pub fn static_method<F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> CoreResult<Value> + Send + Sync + 'static,
    {
        self.static_member(name, Function::new(body))
    }

    /// Add an instance member
    pub fn member(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.insert(name.into(), value.into());
        self
    }

    /// Add an instance method
    pub fn method<F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> CoreResult<Value> + Send + Sync + 'static,
    {
        self.member(name, Function::new(body))
    }

    /// Override the `constructor` member
    pub fn constructor<F>(self, body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> CoreResult<Value> + Send + Sync + 'static,
    {
        self.method("constructor", body)
    }

    /// Mark as singleton
    pub fn singleton(mut self, singleton: bool) -> Self {
        self.singleton = singleton;
        self
    }

    /// Set the alias
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Set the mixin identity key
    pub fn mixin_id(mut self, id: impl Into<String>) -> Self {
        self.mixin_id = Some(id.into());
        self
    }
}
