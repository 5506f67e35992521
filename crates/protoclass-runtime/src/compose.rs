//! Class composition: inheritance linking, member tagging and mixin merge

use protoclass_core::{chain, Class, CoreResult, MemberTag, ObjectRef, Value};
use std::sync::Arc;
use tracing::debug;

/// Prototype member holding the per-prototype mixins table
pub const MIXINS_KEY: &str = "mixins";

/// Prototype member naming the identity a class is recorded under as a mixin
pub const MIXIN_ID_KEY: &str = "mixinId";

/// Prototype member recording the alias a class was registered under
pub const ALIAS_KEY: &str = "alias";

/// Prototype member flagging a singleton class
pub const SINGLETON_KEY: &str = "singleton";

/// Registry bookkeeping members that describe the mixin class itself and
/// are never copied into a host
const NON_MIXABLE_KEYS: [&str; 3] = [MIXIN_ID_KEY, ALIAS_KEY, SINGLETON_KEY];

/// Link `class` under `parent`
pub fn extend(class: &Class, parent: &Class) -> CoreResult<()> {
    class.link(parent)?;
    debug!(class = class.name(), parent = parent.name(), "linked");
    Ok(())
}

/// Copy `members` onto the prototype of `class`
///
/// Function members are tagged with their owning class and registered name,
/// and capture the ancestor implementation they shadow so `callParent` can
/// reach it later.
pub fn add_members<I>(class: &Arc<Class>, members: I) -> CoreResult<()>
where
    I: IntoIterator<Item = (String, Value)>,
{
    let prototype = class.prototype()?;
    let superclass = class.superclass();

    for (name, value) in members {
        if let Value::Function(function) = &value {
            let parent = superclass.and_then(|s| match s.get(&name) {
                Value::Function(parent) => Some(parent),
                _ => None,
            });
            function.tag(MemberTag::new(class, name.as_str(), parent));
        }
        prototype.set(name, value);
    }
    Ok(())
}

/// The prototype's own mixins table, created on first use
///
/// An inherited table is chained and reassigned as an own property so that
/// recording a mixin here never alters the parent's set.
fn own_mixins_table(prototype: &ObjectRef) -> ObjectRef {
    if let Some(Value::Object(table)) = prototype.get_own(MIXINS_KEY) {
        return table;
    }
    let table = match prototype.get(MIXINS_KEY) {
        Value::Object(inherited) => chain(&inherited),
        _ => ObjectRef::new(),
    };
    prototype.set(MIXINS_KEY, table.clone());
    table
}

/// Identity key of a mixin: its `mixinId` member, or its class name
pub fn mixin_identity(mixin: &Class) -> CoreResult<String> {
    Ok(match mixin.prototype()?.get(MIXIN_ID_KEY) {
        Value::Str(id) => id.to_string(),
        _ => mixin.name().to_string(),
    })
}

/// Merge `mixin` into `class`
///
/// Every enumerable member of the mixin prototype is copied only where the
/// target does not already resolve it, so host and inherited members outrank
/// any mixin and earlier mixins outrank later ones. The mixin's `mixinId`,
/// `alias` and `singleton` members stay with the mixin. The mixin's own mixins
/// table is merged with the same copy-if-absent rule. Returns the identity
/// key the mixin was recorded under.
pub fn mixin(class: &Class, mixin: &Class) -> CoreResult<String> {
    let target = class.prototype()?;
    let source = mixin.prototype()?;
    let table = own_mixins_table(target);

    for key in source.keys() {
        if NON_MIXABLE_KEYS.contains(&key.as_str()) {
            continue;
        }
        let value = source.get(&key);
        if key == MIXINS_KEY {
            if let Value::Object(nested) = value {
                for nested_key in nested.keys() {
                    if table.get(&nested_key).is_undefined() {
                        table.set(nested_key.clone(), nested.get(&nested_key));
                    }
                }
            }
        } else if target.get(&key).is_undefined() {
            target.set(key, value);
        }
    }

    let id = mixin_identity(mixin)?;
    table.set(id.clone(), source.clone());
    debug!(class = class.name(), mixin = mixin.name(), id = id.as_str(), "mixed in");
    Ok(id)
}

/// Check whether `class` has `id` recorded in its mixins table
pub fn has_mixin(class: &Class, id: &str) -> bool {
    mixin_prototype(class, id).is_some()
}

/// Prototype recorded under `id` in the mixins table of `class`
pub fn mixin_prototype(class: &Class, id: &str) -> Option<ObjectRef> {
    let prototype = class.prototype().ok()?;
    match prototype.get(MIXINS_KEY) {
        Value::Object(table) => match table.get(id) {
            Value::Object(proto) => Some(proto),
            _ => None,
        },
        _ => None,
    }
}
