//! Class registry
//!
//! Owns the name → class and alias → class tables, publishes every entry
//! into its [`Namespace`], and orchestrates definition (link, statics,
//! members, mixins, singleton collapse) and teardown.
//!
//! Table mutation happens under a write lock; lookups for `create` take a
//! read lock. No lock is held while member code runs, so constructors and
//! destroy overrides may call back into the registry.

use crate::base;
use crate::compose;
use crate::descriptor::ClassDescriptor;
use crate::error::{ClassError, ClassResult, DefinitionError, LookupError};
use crate::options::{MissingParentPolicy, RedefinitionPolicy, RegistryOptions};
use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use protoclass_core::namespace::split_path;
use protoclass_core::{
    Class, CoreError, Namespace, ObjectRef, StandardTypeUtility, TypeUtility, Value,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// A registry entry: a constructor, or the instance a singleton collapsed to
#[derive(Debug, Clone)]
pub enum Registered {
    /// Instantiable class
    Class(Arc<Class>),
    /// Singleton instance
    Singleton(ObjectRef),
}

impl Registered {
    /// The class, if this entry is instantiable
    pub fn as_class(&self) -> Option<&Arc<Class>> {
        match self {
            Registered::Class(class) => Some(class),
            Registered::Singleton(_) => None,
        }
    }

    /// The instance, if this entry is a singleton
    pub fn as_instance(&self) -> Option<&ObjectRef> {
        match self {
            Registered::Class(_) => None,
            Registered::Singleton(instance) => Some(instance),
        }
    }

    /// Value published into the namespace
    pub fn to_value(&self) -> Value {
        match self {
            Registered::Class(class) => Value::Class(Arc::clone(class)),
            Registered::Singleton(instance) => Value::Object(instance.clone()),
        }
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    /// Entries by class name, in registration order
    classes: IndexMap<String, Registered>,
    /// Entries by alias
    aliases: FxHashMap<String, Registered>,
}

/// Class registry
pub struct ClassRegistry {
    options: RegistryOptions,
    types: Arc<dyn TypeUtility>,
    namespace: Namespace,
    /// Root base class, kept for instance checks after teardown
    base: Arc<Class>,
    state: RwLock<RegistryState>,
}

impl ClassRegistry {
    /// Create a registry with the standard type utility
    pub fn new(options: RegistryOptions) -> ClassResult<Self> {
        Self::with_type_utility(options, Arc::new(StandardTypeUtility))
    }

    /// Create a registry with a custom type utility
    ///
    /// The base class is defined and registered under
    /// `options.base_class` before this returns.
    pub fn with_type_utility(
        options: RegistryOptions,
        types: Arc<dyn TypeUtility>,
    ) -> ClassResult<Self> {
        split_path(&options.root_namespace)
            .map_err(|_| DefinitionError::InvalidName(options.root_namespace.clone()))?;
        split_path(&options.base_class)
            .map_err(|_| DefinitionError::InvalidName(options.base_class.clone()))?;

        let base = base::base_class(&options.base_class, Arc::clone(&types))
            .map_err(|source| DefinitionError::Composition {
                class: options.base_class.clone(),
                source,
            })?;
        let registry = Self {
            options,
            types,
            namespace: Namespace::new(),
            base: Arc::clone(&base),
            state: RwLock::new(RegistryState::default()),
        };
        let name = registry.options.base_class.clone();
        registry.register(&name, Registered::Class(base))?;
        Ok(registry)
    }

    /// Registry options
    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// Type utility
    pub fn types(&self) -> &dyn TypeUtility {
        self.types.as_ref()
    }

    /// Symbol table every class is published into
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Root base class
    pub fn base_class(&self) -> &Arc<Class> {
        &self.base
    }

    /// Define a class
    pub fn define(&self, name: &str, descriptor: ClassDescriptor) -> ClassResult<Registered> {
        self.define_with(name, move |_| descriptor)
    }

    /// Define a class from a factory that receives the not-yet-linked class
    ///
    /// The factory can capture the class handle, e.g. to store the class in
    /// one of its own static members.
    ///
    /// A class must not (directly or through other classes) declare itself
    /// as its parent; the parent must already be registered, so such chains
    /// surface as `UnknownParent` or `CyclicParent`.
    pub fn define_with<F>(&self, name: &str, factory: F) -> ClassResult<Registered>
    where
        F: FnOnce(&Arc<Class>) -> ClassDescriptor,
    {
        split_path(name).map_err(|_| DefinitionError::InvalidName(name.to_string()))?;
        if self.contains(name) {
            match self.options.redefinition {
                RedefinitionPolicy::Reject => {
                    return Err(DefinitionError::AlreadyDefined(name.to_string()).into());
                }
                RedefinitionPolicy::Overwrite => warn!(class = name, "redefining class"),
            }
        }

        let class = Class::new(name);
        let descriptor = factory(&class);
        let composition = |source: CoreError| DefinitionError::Composition {
            class: name.to_string(),
            source,
        };

        if descriptor.members.contains_key(compose::MIXINS_KEY) {
            return Err(DefinitionError::ReservedMember {
                class: name.to_string(),
                member: compose::MIXINS_KEY.to_string(),
            }
            .into());
        }

        let parent_name = descriptor
            .extend
            .clone()
            .unwrap_or_else(|| self.options.base_class.clone());
        if parent_name == name {
            return Err(DefinitionError::CyclicParent(name.to_string()).into());
        }
        let parent = match self.get(&parent_name) {
            Some(Registered::Class(parent)) => parent,
            Some(Registered::Singleton(_)) => {
                return Err(DefinitionError::ParentNotConstructible {
                    class: name.to_string(),
                    parent: parent_name,
                }
                .into());
            }
            None => match self.options.missing_parent {
                MissingParentPolicy::Base => {
                    warn!(
                        class = name,
                        parent = parent_name.as_str(),
                        "unknown parent, linking under base class"
                    );
                    Arc::clone(&self.base)
                }
                MissingParentPolicy::Reject => {
                    return Err(DefinitionError::UnknownParent {
                        class: name.to_string(),
                        parent: parent_name,
                    }
                    .into());
                }
            },
        };

        let mut mixins = Vec::with_capacity(descriptor.mixins.len());
        for mixin_name in &descriptor.mixins {
            match self.get(mixin_name) {
                Some(Registered::Class(mixin)) => mixins.push(mixin),
                Some(Registered::Singleton(_)) => {
                    return Err(DefinitionError::MixinNotConstructible {
                        class: name.to_string(),
                        mixin: mixin_name.clone(),
                    }
                    .into());
                }
                None => {
                    return Err(DefinitionError::UnknownMixin {
                        class: name.to_string(),
                        mixin: mixin_name.clone(),
                    }
                    .into());
                }
            }
        }

        compose::extend(&class, &parent).map_err(composition)?;
        class.add_statics(descriptor.statics);

        let mut members = descriptor.members;
        members.insert("className".to_string(), Value::string(name));
        if descriptor.singleton {
            members.insert(compose::SINGLETON_KEY.to_string(), Value::Bool(true));
        }
        if let Some(alias) = &descriptor.alias {
            members.insert(compose::ALIAS_KEY.to_string(), Value::string(alias));
        }
        if let Some(id) = &descriptor.mixin_id {
            members.insert(compose::MIXIN_ID_KEY.to_string(), Value::string(id));
        }
        compose::add_members(&class, members).map_err(composition)?;

        for mixin in &mixins {
            compose::mixin(&class, mixin).map_err(composition)?;
        }

        let entry = if descriptor.singleton {
            let instance = class.instantiate(Vec::new())?;
            debug!(class = name, "collapsed to singleton");
            Registered::Singleton(instance)
        } else {
            Registered::Class(class)
        };

        self.register(name, entry.clone())?;
        if let Some(alias) = descriptor.alias {
            self.register_alias(&alias, entry.clone());
        }
        debug!(class = name, parent = parent.name(), mixins = mixins.len(), "defined");
        Ok(entry)
    }

    /// Publish `entry` under `name` in the namespace and the class table
    pub fn register(&self, name: &str, entry: Registered) -> ClassResult<()> {
        self.namespace
            .publish(name, entry.to_value())
            .map_err(|source| DefinitionError::Composition {
                class: name.to_string(),
                source,
            })?;
        self.state.write().classes.insert(name.to_string(), entry);
        trace!(class = name, "registered");
        Ok(())
    }

    /// Remove `name` from the namespace and the class table together
    pub fn unregister(&self, name: &str) -> Option<Registered> {
        self.namespace.retract(name);
        let removed = self.state.write().classes.shift_remove(name);
        trace!(class = name, found = removed.is_some(), "unregistered");
        removed
    }

    /// Record an alias
    pub fn register_alias(&self, alias: &str, entry: Registered) {
        self.state.write().aliases.insert(alias.to_string(), entry);
    }

    /// Remove an alias
    pub fn unregister_alias(&self, alias: &str) -> Option<Registered> {
        self.state.write().aliases.remove(alias)
    }

    /// Entry registered under `name`
    pub fn get(&self, name: &str) -> Option<Registered> {
        self.state.read().classes.get(name).cloned()
    }

    /// Class registered under `name`, if it is instantiable
    pub fn get_class(&self, name: &str) -> Option<Arc<Class>> {
        self.get(name).and_then(|entry| entry.as_class().cloned())
    }

    /// Entry registered under `alias`
    pub fn get_by_alias(&self, alias: &str) -> Option<Registered> {
        self.state.read().aliases.get(alias).cloned()
    }

    /// Check whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.state.read().classes.contains_key(name)
    }

    /// Registered names in registration order
    pub fn class_names(&self) -> Vec<String> {
        self.state.read().classes.keys().cloned().collect()
    }

    /// Number of registered names
    pub fn len(&self) -> usize {
        self.state.read().classes.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.state.read().classes.is_empty()
    }

    /// Instantiate the class registered under `name`
    pub fn create(&self, name: &str, args: Vec<Value>) -> ClassResult<ObjectRef> {
        let class = match self.get(name) {
            Some(Registered::Class(class)) => class,
            Some(Registered::Singleton(_)) => {
                return Err(LookupError::NotConstructible(name.to_string()).into());
            }
            None => return Err(LookupError::UnknownClass(name.to_string()).into()),
        };
        Ok(class.instantiate(args)?)
    }

    /// Instantiate the class registered under `alias`
    pub fn create_by_alias(&self, alias: &str, args: Vec<Value>) -> ClassResult<ObjectRef> {
        let class = match self.get_by_alias(alias) {
            Some(Registered::Class(class)) => class,
            Some(Registered::Singleton(_)) => {
                return Err(LookupError::NotConstructible(alias.to_string()).into());
            }
            None => return Err(LookupError::UnknownAlias(alias.to_string()).into()),
        };
        Ok(class.instantiate(args)?)
    }

    /// Check whether `value` is an instance of the base contract
    pub fn is_instance(&self, value: &Value) -> bool {
        match self.base.prototype() {
            Ok(proto) => base::is_base_instance(self.types.as_ref(), value, proto),
            Err(_) => false,
        }
    }

    /// Check whether `value` is an instance of the class registered under
    /// `name` or of one of its subclasses
    pub fn instance_of(&self, value: &Value, name: &str) -> bool {
        match (value, self.get_class(name)) {
            (Value::Object(object), Some(class)) => class.is_instance(object),
            _ => false,
        }
    }

    /// Destroy `value` if it is an instance of the base contract
    pub fn destroy_instance(&self, value: &Value) -> ClassResult<()> {
        if let Value::Object(instance) = value {
            if self.is_instance(value) {
                instance.invoke("destroy", Vec::new())?;
            }
        }
        Ok(())
    }

    /// Copy static members onto the class registered under `name`
    pub fn add_statics<I>(&self, name: &str, statics: I) -> ClassResult<()>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let class = self.ensure(name)?;
        class.add_statics(statics);
        Ok(())
    }

    /// Copy instance members onto the class registered under `name`
    pub fn add_members<I>(&self, name: &str, members: I) -> ClassResult<()>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let class = self.ensure(name)?;
        Ok(compose::add_members(&class, members)?)
    }

    /// Check whether the class registered under `name` mixes in `id`
    pub fn has_mixin(&self, name: &str, id: &str) -> bool {
        match self.get_class(name) {
            Some(class) => compose::has_mixin(&class, id),
            None => false,
        }
    }

    fn ensure(&self, name: &str) -> ClassResult<Arc<Class>> {
        match self.get(name) {
            Some(Registered::Class(class)) => Ok(class),
            Some(Registered::Singleton(_)) => Err(LookupError::NotConstructible(name.to_string()).into()),
            None => Err(LookupError::UnknownClass(name.to_string()).into()),
        }
    }

    /// Retire a class: strip the class back-reference from each of its own
    /// member functions, then drop its alias and its name
    pub fn destroy_class(&self, class: &Class) -> ClassResult<()> {
        let prototype = class.prototype()?;
        for (_, value) in prototype.own_entries() {
            if let Value::Function(function) = value {
                function.strip_member_of();
            }
        }
        if let Some(Value::Str(alias)) = prototype.get_own(compose::ALIAS_KEY) {
            self.unregister_alias(&alias);
        }
        self.unregister(class.name());
        Ok(())
    }

    /// Tear the whole registry down
    ///
    /// Singletons are destroyed and unregistered first, then every remaining
    /// class is retired, then every root namespace segment any class touched
    /// is removed except the runtime's own root. A second call operates on
    /// an empty registry and does nothing.
    ///
    /// A failing singleton `destroy` does not stop the teardown: every step
    /// still runs and the first error is returned once the registry is empty.
    pub fn destroy(&self) -> ClassResult<()> {
        let entries: Vec<(String, Registered)> = self
            .state
            .read()
            .classes
            .iter()
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect();

        let mut roots = IndexSet::new();
        let mut singletons = 0usize;
        let mut first_error: Option<ClassError> = None;
        for (name, entry) in &entries {
            if let Some(root) = name.split('.').next() {
                roots.insert(root.to_string());
            }
            if let Registered::Singleton(instance) = entry {
                let alias = instance
                    .proto()
                    .and_then(|proto| proto.get_own(compose::ALIAS_KEY));
                if let Err(err) = instance.invoke("destroy", Vec::new()) {
                    warn!(class = name.as_str(), error = %err, "singleton destroy failed");
                    first_error.get_or_insert(err.into());
                }
                if let Some(Value::Str(alias)) = alias {
                    self.unregister_alias(&alias);
                }
                self.unregister(name);
                singletons += 1;
            }
        }

        let remaining: Vec<Arc<Class>> = self
            .state
            .read()
            .classes
            .values()
            .filter_map(|entry| entry.as_class().cloned())
            .collect();
        for class in &remaining {
            if let Err(err) = self.destroy_class(class) {
                first_error.get_or_insert(err);
                // an unlinked class still leaves the table
                self.unregister(class.name());
            }
        }

        roots.shift_remove(&self.options.root_namespace);
        for root in &roots {
            self.namespace.remove_root(root);
        }

        info!(
            singletons,
            classes = remaining.len(),
            namespaces = roots.len(),
            "class registry destroyed"
        );
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("ClassRegistry")
            .field("options", &self.options)
            .field("classes", &state.classes.keys().collect::<Vec<_>>())
            .field("aliases", &state.aliases.keys().collect::<Vec<_>>())
            .finish()
    }
}
