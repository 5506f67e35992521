//! Protoclass Runtime
//!
//! The class registry and composition engine:
//! - Named classes with single inheritance
//! - Mixins merged first-writer-wins in declaration order
//! - Static members, singleton collapse and alias lookup
//! - Super dispatch through captured ancestor methods
//! - Cascading instance destroy and registry-wide teardown

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod base;
pub mod compose;
pub mod descriptor;
pub mod error;
pub mod options;
pub mod registry;

pub use descriptor::ClassDescriptor;
pub use error::{ClassError, ClassResult, DefinitionError, LookupError, OptionsError};
pub use options::{MissingParentPolicy, RedefinitionPolicy, RegistryOptions};
pub use registry::{ClassRegistry, Registered};

pub use protoclass_core::{
    Class, CoreError, CoreResult, DispatchError, Function, Invocation, Namespace, ObjectRef, Value,
};
