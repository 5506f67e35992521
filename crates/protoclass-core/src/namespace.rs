//! Dotted-path symbol table
//!
//! `publish("App.Model.User", value)` creates `App` and `App.Model` as plain
//! containers when missing and stores `value` in the leaf slot. A segment
//! that already holds a class descends into that class's static table, and
//! one holding an object descends into the object.

use crate::object::ObjectRef;
use crate::value::Value;
use crate::{CoreError, CoreResult};
use tracing::trace;

/// Split a dotted path, rejecting empty paths and empty segments
pub fn split_path(path: &str) -> CoreResult<Vec<&str>> {
    let parts: Vec<&str> = path.split('.').collect();
    if path.is_empty() || parts.iter().any(|p| p.is_empty()) {
        return Err(CoreError::InvalidPath(path.to_string()));
    }
    Ok(parts)
}

/// Container a non-leaf segment resolves to
fn container_of(value: &Value) -> Option<ObjectRef> {
    match value {
        Value::Object(object) => Some(object.clone()),
        Value::Class(class) => Some(class.statics().clone()),
        _ => None,
    }
}

/// Symbol table rooted at a single object
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    root: ObjectRef,
}

impl Namespace {
    /// Create an empty symbol table
    pub fn new() -> Self {
        Self::default()
    }

    /// Root container
    pub fn root(&self) -> &ObjectRef {
        &self.root
    }

    /// Store `value` at `path`, creating intermediate containers
    pub fn publish(&self, path: &str, value: Value) -> CoreResult<Value> {
        let parts = split_path(path)?;
        let (leaf, branches) = parts
            .split_last()
            .ok_or_else(|| CoreError::InvalidPath(path.to_string()))?;

        let mut container = self.root.clone();
        for segment in branches {
            let existing = container.get_own(segment).unwrap_or_default();
            container = if existing.is_truthy() {
                container_of(&existing).ok_or_else(|| CoreError::NotAContainer {
                    path: path.to_string(),
                    segment: segment.to_string(),
                })?
            } else {
                let fresh = ObjectRef::new();
                container.set(*segment, fresh.clone());
                fresh
            };
        }

        container.set(*leaf, value.clone());
        trace!(path, "published");
        Ok(value)
    }

    /// Resolve the value stored at `path`
    pub fn resolve(&self, path: &str) -> Option<Value> {
        let parts = split_path(path).ok()?;
        let (leaf, branches) = parts.split_last()?;

        let mut container = self.root.clone();
        for segment in branches {
            container = container_of(&container.get_own(segment)?)?;
        }
        container.get_own(leaf)
    }

    /// Remove the leaf slot at `path`, leaving intermediate containers and
    /// sibling paths intact
    pub fn retract(&self, path: &str) -> Option<Value> {
        let parts = split_path(path).ok()?;
        let (leaf, branches) = parts.split_last()?;

        let mut container = self.root.clone();
        for segment in branches {
            container = container_of(&container.get_own(segment)?)?;
        }
        let removed = container.delete(leaf);
        if removed.is_some() {
            trace!(path, "retracted");
        }
        removed
    }

    /// Remove a whole root segment
    pub fn remove_root(&self, segment: &str) -> Option<Value> {
        self.root.delete(segment)
    }

    /// Root segment names
    pub fn roots(&self) -> Vec<String> {
        self.root.own_keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Class;

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("A.B.C").unwrap(), vec!["A", "B", "C"]);
        assert!(split_path("").is_err());
        assert!(split_path("A..B").is_err());
        assert!(split_path(".A").is_err());
    }

    #[test]
    fn test_publish_creates_intermediates() {
        let ns = Namespace::new();
        ns.publish("A.B.C", Value::Int(1)).unwrap();

        assert_eq!(ns.resolve("A.B.C"), Some(Value::Int(1)));
        assert!(matches!(ns.resolve("A.B"), Some(Value::Object(_))));
        assert_eq!(ns.roots(), vec!["A".to_string()]);
    }

    #[test]
    fn test_retract_keeps_siblings() {
        let ns = Namespace::new();
        ns.publish("A.B.C", Value::Int(1)).unwrap();
        ns.publish("A.B.D", Value::Int(2)).unwrap();

        assert_eq!(ns.retract("A.B.C"), Some(Value::Int(1)));
        assert_eq!(ns.resolve("A.B.C"), None);
        assert_eq!(ns.resolve("A.B.D"), Some(Value::Int(2)));
        assert_eq!(ns.retract("A.B.C"), None);
        assert_eq!(ns.retract("Missing.Path"), None);
    }

    #[test]
    fn test_publish_under_class_uses_statics() {
        let ns = Namespace::new();
        let class = Class::new("A.Outer");
        ns.publish("A.Outer", Value::Class(class.clone())).unwrap();
        ns.publish("A.Outer.Inner", Value::Int(3)).unwrap();

        assert_eq!(class.get_static("Inner"), Value::Int(3));
        assert_eq!(ns.resolve("A.Outer.Inner"), Some(Value::Int(3)));
    }

    #[test]
    fn test_publish_through_scalar_fails() {
        let ns = Namespace::new();
        ns.publish("A.flag", Value::Bool(true)).unwrap();

        let err = ns.publish("A.flag.X", Value::Null).unwrap_err();
        assert!(matches!(err, CoreError::NotAContainer { ref segment, .. } if segment == "flag"));
    }

    #[test]
    fn test_remove_root() {
        let ns = Namespace::new();
        ns.publish("A.X", Value::Null).unwrap();
        ns.publish("B.Y", Value::Null).unwrap();

        assert!(ns.remove_root("A").is_some());
        assert_eq!(ns.resolve("A.X"), None);
        assert_eq!(ns.roots(), vec!["B".to_string()]);
    }
}
