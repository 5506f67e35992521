//! Root base class
//!
//! Every registered class descends from this one. It supplies the instance
//! contract: a no-op `constructor`, `initConfig` for shallow configuration
//! and a cascading `destroy`.

use crate::compose;
use protoclass_core::{
    ops, Class, CoreResult, Function, ObjectRef, TypeTag, TypeUtility, Value, WeakObjectRef,
};
use std::sync::Arc;

/// Check whether `value` is an instance created through the base contract
pub(crate) fn is_base_instance(types: &dyn TypeUtility, value: &Value, base: &ObjectRef) -> bool {
    if types.type_tag(value) != TypeTag::Object {
        return false;
    }
    match value {
        Value::Object(object) => object.inherits_from(base),
        _ => false,
    }
}

/// Destroy cascade shared by every instance
///
/// Nested instances are destroyed through their own `destroy` member so
/// overrides run. An instance already being torn down further up the stack
/// is skipped, so cyclic ownership terminates.
fn destroy_cascade(types: &dyn TypeUtility, this: &ObjectRef, base: &WeakObjectRef) -> CoreResult<Value> {
    let Some(_guard) = this.begin_teardown() else {
        return Ok(Value::Undefined);
    };
    let base = base.upgrade();

    for (key, value) in this.own_entries() {
        if let (Some(base), Value::Object(child)) = (&base, &value) {
            if is_base_instance(types, &value, base) {
                child.invoke("destroy", Vec::new())?;
            }
        }
        this.delete(&key);
    }
    Ok(Value::Undefined)
}

/// Build and link the base class named `name`
pub(crate) fn base_class(name: &str, types: Arc<dyn TypeUtility>) -> CoreResult<Arc<Class>> {
    let class = Class::new(name);
    class.link_root()?;
    let base = class.prototype()?.downgrade();

    let config_types = Arc::clone(&types);
    let init_config = Function::new(move |inv| {
        let config = inv.arg(0);
        if config_types.type_tag(&config) == TypeTag::Object {
            if let Value::Object(config) = config {
                ops::apply(inv.this(), &config, None);
            }
        }
        Ok(Value::Undefined)
    });

    let destroy = Function::new(move |inv| destroy_cascade(types.as_ref(), inv.this(), &base));

    compose::add_members(
        &class,
        [
            ("className".to_string(), Value::string(name)),
            (
                "constructor".to_string(),
                Value::Function(Function::new(|_| Ok(Value::Undefined))),
            ),
            ("initConfig".to_string(), Value::Function(init_config)),
            ("destroy".to_string(), Value::Function(destroy)),
        ],
    )?;
    Ok(class)
}
