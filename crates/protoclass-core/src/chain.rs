//! Prototype chaining
//!
//! The single primitive inheritance is built on: a fresh object whose
//! lookups delegate to a parent. No constructor or initializer of the parent
//! runs.

use crate::object::ObjectRef;

/// Create an empty object that delegates unresolved lookups to `parent`
pub fn chain(parent: &ObjectRef) -> ObjectRef {
    ObjectRef::with_proto(parent.clone())
}
