//! Object helpers shared by the class runtime

use crate::object::ObjectRef;
use crate::types::TypeUtility;
use crate::value::Value;

/// Copy every own property of `config` onto `target` (last write wins),
/// after first applying `defaults` the same way
pub fn apply(target: &ObjectRef, config: &ObjectRef, defaults: Option<&ObjectRef>) {
    if let Some(defaults) = defaults {
        apply(target, defaults, None);
    }
    for (key, value) in config.own_entries() {
        target.set(key, value);
    }
}

/// Copy own properties of `config` that resolve to undefined on `target`
pub fn apply_if_not(target: &ObjectRef, config: &ObjectRef) {
    for (key, value) in config.own_entries() {
        if target.get(&key).is_undefined() {
            target.set(key, value);
        }
    }
}

/// Own property names
pub fn properties(object: &ObjectRef) -> Vec<String> {
    object.own_keys()
}

/// Own property values
pub fn values(object: &ObjectRef) -> Vec<Value> {
    object.own_entries().into_iter().map(|(_, v)| v).collect()
}

/// Merge the own properties of `objects` into a fresh object, cloning each
/// value; later objects win
pub fn merge(types: &dyn TypeUtility, objects: &[ObjectRef]) -> ObjectRef {
    let result = ObjectRef::new();
    for object in objects {
        for (key, value) in object.own_entries() {
            result.set(key, types.clone_value(&value, false));
        }
    }
    result
}
