//! Protoclass Core Object Model
//!
//! This crate provides the host the class runtime is layered on:
//! - Dynamic values (`Value`)
//! - Property-bag objects with a delegation link (`ObjectRef`)
//! - Prototype chaining without constructor side effects (`chain`)
//! - Native member functions with super-dispatch tags (`Function`)
//! - Constructor artifacts (`Class`)
//! - Dotted-path symbol tables (`Namespace`)
//! - Type tagging, structural clone/equality and coercion (`TypeUtility`)

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod chain;
pub mod class;
pub mod function;
pub mod namespace;
pub mod object;
pub mod ops;
pub mod types;
pub mod value;

pub use chain::chain;
pub use class::Class;
pub use function::{Function, Invocation, MemberTag};
pub use namespace::Namespace;
pub use object::{ObjectRef, TeardownGuard, WeakObjectRef};
pub use types::{CastTarget, StandardTypeUtility, TypeTag, TypeUtility};
pub use value::{ArrayRef, Value};

/// Failure of `callParent`-style super dispatch
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The executing function was never registered as a class member
    #[error("callParent invoked from a function that is not a registered class member")]
    Untagged,

    /// The member's class back-reference was stripped by teardown
    #[error("member `{method}` was detached from its class")]
    Detached {
        /// Name the member was registered under
        method: String,
    },

    /// No ancestor of the owning class defines the member
    #[error("no ancestor of `{class_name}` defines `{method}`")]
    NoParentMethod {
        /// Class the executing member belongs to
        class_name: String,
        /// Name the member was registered under
        method: String,
    },
}

/// Object model errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum CoreError {
    /// Attempted to call a value that is not a function
    #[error("`{0}` is not a function")]
    NotCallable(String),

    /// Malformed dotted namespace path
    #[error("Invalid namespace path: {0:?}")]
    InvalidPath(String),

    /// An intermediate namespace segment holds a non-container value
    #[error("Namespace segment `{segment}` of `{path}` is not a container")]
    NotAContainer {
        /// Full path being published
        path: String,
        /// Offending segment
        segment: String,
    },

    /// Class used before its prototype was linked
    #[error("Class `{0}` is not linked to a prototype")]
    Unlinked(String),

    /// Class prototype linked twice
    #[error("Class `{0}` is already linked")]
    AlreadyLinked(String),

    /// Super dispatch failure
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Error raised by member code
    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

impl CoreError {
    /// Build a runtime error from member code
    pub fn runtime(message: impl Into<String>) -> Self {
        CoreError::RuntimeError(message.into())
    }
}

/// Object model result
pub type CoreResult<T> = Result<T, CoreError>;
