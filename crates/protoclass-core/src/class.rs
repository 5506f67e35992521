//! Class constructor artifact
//!
//! A `Class` is what a successful definition produces: a name, a prototype
//! and superclass pointer that are each set exactly once when the class is
//! linked, and a table of static members that lives on the class itself and
//! never on its prototype.

use crate::chain::chain;
use crate::object::ObjectRef;
use crate::value::Value;
use crate::{CoreError, CoreResult};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// Runtime class (the constructor of its instances)
pub struct Class {
    /// Class name (dotted path)
    name: String,
    /// Instance-member table, set at link time
    prototype: OnceCell<ObjectRef>,
    /// Parent's prototype, set at link time (absent for root classes)
    superclass: OnceCell<ObjectRef>,
    /// Static members
    statics: ObjectRef,
}

impl Class {
    /// Create an unlinked class
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            prototype: OnceCell::new(),
            superclass: OnceCell::new(),
            statics: ObjectRef::new(),
        })
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check whether the prototype has been linked
    pub fn is_linked(&self) -> bool {
        self.prototype.get().is_some()
    }

    /// Instance-member table
    pub fn prototype(&self) -> CoreResult<&ObjectRef> {
        self.prototype
            .get()
            .ok_or_else(|| CoreError::Unlinked(self.name.clone()))
    }

    /// Parent's prototype
    pub fn superclass(&self) -> Option<&ObjectRef> {
        self.superclass.get()
    }

    /// Link this class as a root: a fresh prototype with no parent
    pub fn link_root(&self) -> CoreResult<()> {
        self.prototype
            .set(ObjectRef::new())
            .map_err(|_| CoreError::AlreadyLinked(self.name.clone()))
    }

    /// Link this class under `parent`
    ///
    /// The prototype becomes `chain(parent.prototype)` and the superclass
    /// pointer is fixed to `parent.prototype`; neither is ever re-pointed, so
    /// redefining the parent later leaves this class on the old prototype.
    pub fn link(&self, parent: &Class) -> CoreResult<()> {
        let parent_proto = parent.prototype()?;
        self.prototype
            .set(chain(parent_proto))
            .map_err(|_| CoreError::AlreadyLinked(self.name.clone()))?;
        // prototype and superclass are only ever set together
        let _ = self.superclass.set(parent_proto.clone());
        Ok(())
    }

    /// Static member table
    pub fn statics(&self) -> &ObjectRef {
        &self.statics
    }

    /// Read a static member
    pub fn get_static(&self, name: &str) -> Value {
        self.statics.get(name)
    }

    /// Copy static members onto the class
    pub fn add_statics<K, I>(&self, statics: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        for (name, value) in statics {
            self.statics.set(name, value);
        }
    }

    /// Call a static function with the static table as receiver
    pub fn invoke_static(&self, name: &str, args: Vec<Value>) -> CoreResult<Value> {
        self.statics.invoke(name, args)
    }

    /// Check whether `object` was created by this class or a subclass
    pub fn is_instance(&self, object: &ObjectRef) -> bool {
        match self.prototype.get() {
            Some(proto) => object.inherits_from(proto),
            None => false,
        }
    }

    /// Create an instance and run its `constructor` member with `args`
    pub fn instantiate(&self, args: Vec<Value>) -> CoreResult<ObjectRef> {
        let instance = chain(self.prototype()?);
        match instance.get("constructor") {
            Value::Function(constructor) => {
                constructor.call(&instance, args)?;
            }
            Value::Undefined => {}
            _ => return Err(CoreError::NotCallable(format!("{}.constructor", self.name))),
        }
        Ok(instance)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("linked", &self.is_linked())
            .finish()
    }
}
