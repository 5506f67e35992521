//! Integration tests for class definition
//!
//! Tests cover:
//! - Inheritance ("is-a") and member reachability
//! - Static members
//! - Self-referential definitions through a factory
//! - Aliases and namespace publication
//! - Definition errors and redefinition policy

use protoclass_runtime::{
    ClassDescriptor, ClassError, ClassRegistry, CoreError, DefinitionError, LookupError,
    RegistryOptions, Registered, Value,
};

fn registry() -> ClassRegistry {
    ClassRegistry::new(RegistryOptions::default()).unwrap()
}

fn define_shape(registry: &ClassRegistry) {
    registry
        .define(
            "Geo.Shape",
            ClassDescriptor::new()
                .member("sides", 0)
                .method("describe", |inv| {
                    Ok(Value::string(format!(
                        "{} with {} sides",
                        inv.this().get("className"),
                        inv.this().get("sides")
                    )))
                })
                .constructor(|inv| {
                    inv.this().set("label", inv.arg(0));
                    Ok(Value::Undefined)
                }),
        )
        .unwrap();
}

#[test]
fn test_subclass_is_a_parent() {
    let registry = registry();
    define_shape(&registry);
    registry
        .define("Geo.Square", ClassDescriptor::new().extend("Geo.Shape").member("sides", 4))
        .unwrap();

    let square = registry.create("Geo.Square", vec![Value::string("sq")]).unwrap();

    // parent-only members are reachable and bound to the subclass instance
    assert_eq!(
        square.invoke("describe", vec![]).unwrap(),
        Value::string("Geo.Square with 4 sides")
    );
    assert_eq!(square.get_own("label"), Some(Value::string("sq")));
    assert!(registry.instance_of(&Value::Object(square.clone()), "Geo.Shape"));
    assert!(registry.instance_of(&Value::Object(square.clone()), "Geo.Square"));
    assert!(registry.is_instance(&Value::Object(square)));

    let shape = registry.create("Geo.Shape", vec![]).unwrap();
    assert!(!registry.instance_of(&Value::Object(shape), "Geo.Square"));
}

#[test]
fn test_constructor_receives_arguments() {
    let registry = registry();
    registry
        .define(
            "App.Pair",
            ClassDescriptor::new().constructor(|inv| {
                inv.this().set("count", Value::Int(inv.args().len() as i64));
                inv.this().set("first", inv.arg(0));
                Ok(Value::Undefined)
            }),
        )
        .unwrap();

    let pair = registry
        .create("App.Pair", vec![Value::Int(1), Value::Int(2)])
        .unwrap();
    assert_eq!(pair.get("count"), Value::Int(2));
    assert_eq!(pair.get("first"), Value::Int(1));
}

#[test]
fn test_init_config_from_constructor() {
    let registry = registry();
    registry
        .define(
            "App.Widget",
            ClassDescriptor::new().constructor(|inv| {
                inv.this().invoke("initConfig", vec![inv.arg(0)])?;
                Ok(Value::Undefined)
            }),
        )
        .unwrap();

    let config = protoclass_runtime::ObjectRef::from_pairs([("width", 10), ("height", 20)]);
    let widget = registry
        .create("App.Widget", vec![Value::Object(config)])
        .unwrap();
    assert_eq!(widget.own_keys(), vec!["width", "height"]);
}

#[test]
fn test_statics_on_class_not_instances() {
    let registry = registry();
    registry
        .define(
            "App.Counter",
            ClassDescriptor::new()
                .static_member("LIMIT", 10)
                .static_method("describe", |_| Ok(Value::string("counter"))),
        )
        .unwrap();

    let class = registry.get_class("App.Counter").unwrap();
    assert_eq!(class.get_static("LIMIT"), Value::Int(10));
    assert_eq!(
        class.invoke_static("describe", vec![]).unwrap(),
        Value::string("counter")
    );

    let counter = registry.create("App.Counter", vec![]).unwrap();
    assert!(counter.get("LIMIT").is_undefined());
    assert!(!counter.keys().contains(&"LIMIT".to_string()));
}

#[test]
fn test_factory_receives_unlinked_class() {
    let registry = registry();
    registry
        .define_with("App.Node", |class| {
            assert!(!class.is_linked());
            ClassDescriptor::new().static_member("self", Value::Class(class.clone()))
        })
        .unwrap();

    let class = registry.get_class("App.Node").unwrap();
    match class.get_static("self") {
        Value::Class(stored) => assert!(std::sync::Arc::ptr_eq(&stored, &class)),
        other => panic!("expected class, got {:?}", other),
    }
}

#[test]
fn test_alias_creation() {
    let registry = registry();
    registry
        .define(
            "App.view.Grid",
            ClassDescriptor::new().alias("widget.grid").member("kind", "grid"),
        )
        .unwrap();

    let grid = registry.create_by_alias("widget.grid", vec![]).unwrap();
    assert_eq!(grid.get("kind"), Value::string("grid"));
    assert!(registry.instance_of(&Value::Object(grid), "App.view.Grid"));
}

#[test]
fn test_namespace_round_trip() {
    let registry = registry();
    registry.define("A.B.C", ClassDescriptor::new()).unwrap();
    registry.define("A.B.D", ClassDescriptor::new()).unwrap();

    assert!(matches!(registry.namespace().resolve("A.B.C"), Some(Value::Class(_))));

    registry.unregister("A.B.C");
    assert!(registry.namespace().resolve("A.B.C").is_none());
    assert!(matches!(registry.namespace().resolve("A.B.D"), Some(Value::Class(_))));
    assert!(registry.contains("A.B.D"));
}

#[test]
fn test_unknown_parent_is_fatal() {
    let registry = registry();
    let err = registry
        .define("App.Orphan", ClassDescriptor::new().extend("App.Missing"))
        .unwrap_err();

    assert!(matches!(
        err,
        ClassError::Definition(DefinitionError::UnknownParent { ref parent, .. }) if parent == "App.Missing"
    ));
    assert!(!registry.contains("App.Orphan"));
    assert!(registry.namespace().resolve("App.Orphan").is_none());
}

#[test]
fn test_self_parent_is_rejected() {
    let registry = registry();
    let err = registry
        .define("App.Loop", ClassDescriptor::new().extend("App.Loop"))
        .unwrap_err();
    assert!(matches!(err, ClassError::Definition(DefinitionError::CyclicParent(_))));
}

#[test]
fn test_unknown_mixin_is_fatal() {
    let registry = registry();
    let err = registry
        .define("App.Mixed", ClassDescriptor::new().mixin("App.Nowhere"))
        .unwrap_err();
    assert!(matches!(err, ClassError::Definition(DefinitionError::UnknownMixin { .. })));
}

#[test]
fn test_redefinition_overwrites_by_default() {
    let registry = registry();
    registry
        .define("App.Thing", ClassDescriptor::new().member("version", 1))
        .unwrap();
    registry
        .define("App.Thing", ClassDescriptor::new().member("version", 2))
        .unwrap();

    let thing = registry.create("App.Thing", vec![]).unwrap();
    assert_eq!(thing.get("version"), Value::Int(2));
}

#[test]
fn test_redefinition_can_be_rejected() {
    let registry = ClassRegistry::new(RegistryOptions::default().rejecting_redefinition()).unwrap();
    registry
        .define("App.Thing", ClassDescriptor::new().member("version", 1))
        .unwrap();

    let err = registry
        .define("App.Thing", ClassDescriptor::new().member("version", 2))
        .unwrap_err();
    assert!(matches!(err, ClassError::Definition(DefinitionError::AlreadyDefined(_))));

    let thing = registry.create("App.Thing", vec![]).unwrap();
    assert_eq!(thing.get("version"), Value::Int(1));
}

#[test]
fn test_superclass_fixed_at_definition_time() {
    let registry = registry();
    registry
        .define("App.Parent", ClassDescriptor::new().member("generation", 1))
        .unwrap();
    registry
        .define("App.Child", ClassDescriptor::new().extend("App.Parent"))
        .unwrap();
    registry
        .define("App.Parent", ClassDescriptor::new().member("generation", 2))
        .unwrap();

    let child = registry.create("App.Child", vec![]).unwrap();
    assert_eq!(child.get("generation"), Value::Int(1));
}

#[test]
fn test_extending_singleton_is_rejected() {
    let registry = registry();
    registry
        .define("App.Config", ClassDescriptor::new().singleton(true))
        .unwrap();

    let err = registry
        .define("App.Derived", ClassDescriptor::new().extend("App.Config"))
        .unwrap_err();
    assert!(matches!(
        err,
        ClassError::Definition(DefinitionError::ParentNotConstructible { .. })
    ));
    assert!(matches!(
        registry.add_members("App.Config", Vec::<(String, Value)>::new()),
        Err(ClassError::Lookup(LookupError::NotConstructible(_)))
    ));
}

#[test]
fn test_late_members_and_statics() {
    let registry = registry();
    registry.define("App.Late", ClassDescriptor::new()).unwrap();
    let instance = registry.create("App.Late", vec![]).unwrap();

    registry
        .add_members("App.Late", vec![("added".to_string(), Value::Int(1))])
        .unwrap();
    registry
        .add_statics("App.Late", vec![("COUNT".to_string(), Value::Int(3))])
        .unwrap();

    assert_eq!(instance.get("added"), Value::Int(1));
    let class = registry.get_class("App.Late").unwrap();
    assert_eq!(class.get_static("COUNT"), Value::Int(3));
}

#[test]
fn test_custom_root_from_toml() {
    let options = RegistryOptions::from_toml_str(
        r#"
        root_namespace = "Kit"
        base_class = "Kit.Object"
        "#,
    )
    .unwrap();
    let registry = ClassRegistry::new(options).unwrap();
    registry.define("Kit.Button", ClassDescriptor::new()).unwrap();

    let button = registry.create("Kit.Button", vec![]).unwrap();
    assert!(registry.instance_of(&Value::Object(button), "Kit.Object"));
    assert!(matches!(registry.get("Kit.Object"), Some(Registered::Class(_))));
}

#[test]
fn test_constructor_errors_propagate() {
    let registry = registry();
    registry
        .define(
            "App.Strict",
            ClassDescriptor::new().constructor(|inv| match inv.arg(0) {
                Value::Undefined => Err(CoreError::runtime("config required")),
                _ => Ok(Value::Undefined),
            }),
        )
        .unwrap();

    assert!(matches!(
        registry.create("App.Strict", vec![]),
        Err(ClassError::Core(CoreError::RuntimeError(ref message))) if message == "config required"
    ));
    assert!(registry.create("App.Strict", vec![Value::Int(1)]).is_ok());

    // a failing singleton constructor leaves nothing registered
    let err = registry
        .define(
            "App.BrokenSingleton",
            ClassDescriptor::new()
                .singleton(true)
                .constructor(|_| Err(CoreError::runtime("boom"))),
        )
        .unwrap_err();
    assert!(matches!(err, ClassError::Core(CoreError::RuntimeError(_))));
    assert!(!registry.contains("App.BrokenSingleton"));
}

#[test]
fn test_unknown_parent_can_fall_back_to_base() {
    let registry = ClassRegistry::new(RegistryOptions::default().falling_back_to_base()).unwrap();
    registry
        .define("App.Stray", ClassDescriptor::new().extend("App.NotYet"))
        .unwrap();

    let stray = registry.create("App.Stray", vec![]).unwrap();
    assert!(registry.is_instance(&Value::Object(stray.clone())));
    assert_eq!(stray.get("className"), Value::string("App.Stray"));

    // a self parent is still rejected
    assert!(registry
        .define("App.Loop", ClassDescriptor::new().extend("App.Loop"))
        .is_err());
}
