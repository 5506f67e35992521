//! Integration tests for super dispatch (`callParent`)

use parking_lot::Mutex;
use protoclass_runtime::{
    ClassDescriptor, ClassError, ClassRegistry, CoreError, DispatchError, RegistryOptions, Value,
};
use std::sync::Arc;

fn registry() -> ClassRegistry {
    ClassRegistry::new(RegistryOptions::default()).unwrap()
}

#[test]
fn test_call_parent_forwards_arguments() {
    let registry = registry();
    let seen: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));

    let record = Arc::clone(&seen);
    registry
        .define(
            "Sup.Parent",
            ClassDescriptor::new().method("handle", move |inv| {
                record.lock().extend(inv.args().iter().cloned());
                inv.this().set("handledBy", "parent");
                Ok(Value::string("parent"))
            }),
        )
        .unwrap();
    registry
        .define(
            "Sup.Child",
            ClassDescriptor::new()
                .extend("Sup.Parent")
                .method("handle", |inv| {
                    let result = inv.call_parent()?;
                    Ok(Value::string(format!("child+{}", result)))
                }),
        )
        .unwrap();

    let child = registry.create("Sup.Child", vec![]).unwrap();
    let result = child
        .invoke("handle", vec![Value::Int(1), Value::string("two")])
        .unwrap();

    assert_eq!(result, Value::string("child+parent"));
    assert_eq!(*seen.lock(), vec![Value::Int(1), Value::string("two")]);
    // the parent ran with the child instance as receiver
    assert_eq!(child.get_own("handledBy"), Some(Value::string("parent")));
}

#[test]
fn test_call_parent_with_explicit_arguments() {
    let registry = registry();
    registry
        .define(
            "Sup.Adder",
            ClassDescriptor::new().method("add", |inv| {
                let sum: f64 = inv.args().iter().filter_map(Value::as_number).sum();
                Ok(Value::Float(sum))
            }),
        )
        .unwrap();
    registry
        .define(
            "Sup.Doubler",
            ClassDescriptor::new().extend("Sup.Adder").method("add", |inv| {
                let doubled: Vec<Value> = inv
                    .args()
                    .iter()
                    .filter_map(Value::as_number)
                    .map(|n| Value::Float(n * 2.0))
                    .collect();
                inv.call_parent_with(doubled)
            }),
        )
        .unwrap();

    let doubler = registry.create("Sup.Doubler", vec![]).unwrap();
    assert_eq!(
        doubler.invoke("add", vec![Value::Int(1), Value::Int(2)]).unwrap(),
        Value::Float(6.0)
    );
}

#[test]
fn test_call_parent_walks_multiple_levels() {
    let registry = registry();
    registry
        .define(
            "Sup.A",
            ClassDescriptor::new().method("path", |_| Ok(Value::string("A"))),
        )
        .unwrap();
    registry
        .define(
            "Sup.B",
            ClassDescriptor::new()
                .extend("Sup.A")
                .method("path", |inv| Ok(Value::string(format!("B>{}", inv.call_parent()?)))),
        )
        .unwrap();
    // C does not override, D does
    registry
        .define("Sup.C", ClassDescriptor::new().extend("Sup.B"))
        .unwrap();
    registry
        .define(
            "Sup.D",
            ClassDescriptor::new()
                .extend("Sup.C")
                .method("path", |inv| Ok(Value::string(format!("D>{}", inv.call_parent()?)))),
        )
        .unwrap();

    let d = registry.create("Sup.D", vec![]).unwrap();
    assert_eq!(d.invoke("path", vec![]).unwrap(), Value::string("D>B>A"));
}

#[test]
fn test_constructor_call_parent() {
    let registry = registry();
    registry
        .define(
            "Sup.Model",
            ClassDescriptor::new().constructor(|inv| {
                inv.this().invoke("initConfig", vec![inv.arg(0)])?;
                inv.this().set("ready", true);
                Ok(Value::Undefined)
            }),
        )
        .unwrap();
    registry
        .define(
            "Sup.User",
            ClassDescriptor::new().extend("Sup.Model").constructor(|inv| {
                inv.call_parent()?;
                inv.this().set("role", "user");
                Ok(Value::Undefined)
            }),
        )
        .unwrap();

    let config = protoclass_runtime::ObjectRef::from_pairs([("name", "ada")]);
    let user = registry
        .create("Sup.User", vec![Value::Object(config)])
        .unwrap();
    assert_eq!(user.own_keys(), vec!["name", "ready", "role"]);
}

#[test]
fn test_call_parent_without_ancestor_fails() {
    let registry = registry();
    registry
        .define(
            "Sup.Lonely",
            ClassDescriptor::new().method("unique", |inv| inv.call_parent()),
        )
        .unwrap();

    let lonely = registry.create("Sup.Lonely", vec![]).unwrap();
    let err = lonely.invoke("unique", vec![]).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Dispatch(DispatchError::NoParentMethod { ref class_name, ref method })
            if class_name == "Sup.Lonely" && method == "unique"
    ));
}

#[test]
fn test_mixin_method_dispatches_to_its_own_ancestor() {
    let registry = registry();
    registry
        .define(
            "Sup.LoggerBase",
            ClassDescriptor::new().method("log", |_| Ok(Value::string("base-log"))),
        )
        .unwrap();
    registry
        .define(
            "Sup.Logger",
            ClassDescriptor::new()
                .extend("Sup.LoggerBase")
                .method("log", |inv| Ok(Value::string(format!("logger>{}", inv.call_parent()?)))),
        )
        .unwrap();
    registry
        .define("Sup.Service", ClassDescriptor::new().mixin("Sup.Logger"))
        .unwrap();

    let service = registry.create("Sup.Service", vec![]).unwrap();
    assert_eq!(
        service.invoke("log", vec![]).unwrap(),
        Value::string("logger>base-log")
    );
}

#[test]
fn test_destroy_override_calls_parent() {
    let registry = registry();
    registry
        .define(
            "Sup.Resource",
            ClassDescriptor::new().method("destroy", |inv| {
                inv.this().set("closing", true);
                inv.call_parent()
            }),
        )
        .unwrap();

    let resource = registry.create("Sup.Resource", vec![]).unwrap();
    resource.set("handle", 42);
    registry
        .destroy_instance(&Value::Object(resource.clone()))
        .unwrap();
    assert!(resource.is_empty());
}

#[test]
fn test_dispatch_after_teardown_is_detached() {
    let registry = registry();
    registry
        .define(
            "Sup.Temp",
            ClassDescriptor::new().method("initConfig", |inv| inv.call_parent()),
        )
        .unwrap();
    let temp = registry.create("Sup.Temp", vec![]).unwrap();

    registry.destroy().unwrap();
    let err = temp
        .invoke("initConfig", vec![Value::Null])
        .map_err(ClassError::from)
        .unwrap_err();
    assert!(matches!(
        err,
        ClassError::Core(CoreError::Dispatch(DispatchError::Detached { .. }))
    ));
}
