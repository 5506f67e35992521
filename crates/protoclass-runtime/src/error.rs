//! Registry error taxonomy

use protoclass_core::CoreError;
use thiserror::Error;

/// Failures surfaced while defining a class
#[derive(Debug, Clone, Error)]
pub enum DefinitionError {
    /// Empty name or empty dotted-path segment
    #[error("Invalid class name: {0:?}")]
    InvalidName(String),

    /// Declared parent is not registered
    #[error("Class `{class}` extends unknown class `{parent}`")]
    UnknownParent {
        /// Class being defined
        class: String,
        /// Declared parent
        parent: String,
    },

    /// Declared parent was collapsed into a singleton instance
    #[error("Class `{class}` extends `{parent}`, which is a singleton instance")]
    ParentNotConstructible {
        /// Class being defined
        class: String,
        /// Declared parent
        parent: String,
    },

    /// Class declared itself as its parent
    #[error("Class `{0}` cannot extend itself")]
    CyclicParent(String),

    /// Declared mixin is not registered
    #[error("Class `{class}` mixes in unknown class `{mixin}`")]
    UnknownMixin {
        /// Class being defined
        class: String,
        /// Declared mixin
        mixin: String,
    },

    /// Declared mixin was collapsed into a singleton instance
    #[error("Class `{class}` mixes in `{mixin}`, which is a singleton instance")]
    MixinNotConstructible {
        /// Class being defined
        class: String,
        /// Declared mixin
        mixin: String,
    },

    /// Member name reserved by the composition engine
    #[error("Class `{class}` declares reserved member `{member}`")]
    ReservedMember {
        /// Class being defined
        class: String,
        /// Offending member
        member: String,
    },

    /// Name already registered while redefinition is rejected
    #[error("Class `{0}` is already defined")]
    AlreadyDefined(String),

    /// Object model failure while linking, composing or publishing
    #[error("Failed to define `{class}`: {source}")]
    Composition {
        /// Class being defined
        class: String,
        /// Underlying failure
        #[source]
        source: CoreError,
    },
}

/// Failures resolving a name or alias to something instantiable
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// No class registered under the name
    #[error("Unknown class: {0}")]
    UnknownClass(String),

    /// No class registered under the alias
    #[error("Unknown alias: {0}")]
    UnknownAlias(String),

    /// The entry is a singleton instance, not a constructor
    #[error("`{0}` is a singleton instance and cannot be instantiated")]
    NotConstructible(String),
}

/// Registry errors
#[derive(Debug, Clone, Error)]
pub enum ClassError {
    /// Definition failure
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// Lookup failure
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Failure raised by the object model or by member code
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Registry result
pub type ClassResult<T> = Result<T, ClassError>;

/// Failures loading [`crate::RegistryOptions`]
#[derive(Debug, Error)]
pub enum OptionsError {
    /// Malformed TOML or unknown field values
    #[error("Invalid registry options: {0}")]
    Toml(#[from] toml::de::Error),
}
