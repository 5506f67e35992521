//! Object model
//!
//! An object is an insertion-ordered table of own properties plus an optional
//! delegation parent. Reads that miss the own table fall through to the
//! parent; writes and deletes only ever touch the own table.

use crate::value::Value;
use crate::{CoreError, CoreResult};
use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Global counter for generating unique object IDs
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a new unique object ID
fn generate_object_id() -> u64 {
    NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Object storage behind the shared handle
struct ObjectData {
    /// Delegation parent for unresolved lookups
    proto: Option<ObjectRef>,
    /// Own (enumerable) properties in insertion order
    properties: IndexMap<String, Value>,
    /// Set while a destroy cascade is running on this object
    tearing_down: bool,
}

/// Shared object handle (heap-allocated)
#[derive(Clone)]
pub struct ObjectRef {
    /// Unique object ID (assigned on creation, used for identity)
    object_id: u64,
    data: Arc<RwLock<ObjectData>>,
}

/// Non-owning object handle
#[derive(Clone)]
pub struct WeakObjectRef {
    object_id: u64,
    data: Weak<RwLock<ObjectData>>,
}

impl WeakObjectRef {
    /// Upgrade to a strong handle if the object is still alive
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.data.upgrade().map(|data| ObjectRef {
            object_id: self.object_id,
            data,
        })
    }
}

impl ObjectRef {
    /// Create a new empty object with no delegation parent
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a new empty object delegating to `proto`
    pub(crate) fn with_proto(proto: ObjectRef) -> Self {
        Self::build(Some(proto))
    }

    fn build(proto: Option<ObjectRef>) -> Self {
        Self {
            object_id: generate_object_id(),
            data: Arc::new(RwLock::new(ObjectData {
                proto,
                properties: IndexMap::new(),
                tearing_down: false,
            })),
        }
    }

    /// Create a plain object from key/value pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let object = Self::new();
        for (key, value) in pairs {
            object.set(key, value);
        }
        object
    }

    /// Unique object ID
    pub fn id(&self) -> u64 {
        self.object_id
    }

    /// Delegation parent
    pub fn proto(&self) -> Option<ObjectRef> {
        self.data.read().proto.clone()
    }

    /// Downgrade to a non-owning handle
    pub fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef {
            object_id: self.object_id,
            data: Arc::downgrade(&self.data),
        }
    }

    /// Look up a property, falling through the delegation chain
    ///
    /// Returns `Value::Undefined` when no object on the chain defines `key`.
    pub fn get(&self, key: &str) -> Value {
        let mut current = self.clone();
        loop {
            let next = {
                let data = current.data.read();
                if let Some(value) = data.properties.get(key) {
                    return value.clone();
                }
                data.proto.clone()
            };
            match next {
                Some(proto) => current = proto,
                None => return Value::Undefined,
            }
        }
    }

    /// Look up an own property only
    pub fn get_own(&self, key: &str) -> Option<Value> {
        self.data.read().properties.get(key).cloned()
    }

    /// Check for an own property
    pub fn has_own(&self, key: &str) -> bool {
        self.data.read().properties.contains_key(key)
    }

    /// Check for a property anywhere on the delegation chain
    pub fn has(&self, key: &str) -> bool {
        let mut current = Some(self.clone());
        while let Some(object) = current {
            if object.has_own(key) {
                return true;
            }
            current = object.proto();
        }
        false
    }

    /// Set an own property
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.write().properties.insert(key.into(), value.into());
    }

    /// Delete an own property, returning its previous value
    pub fn delete(&self, key: &str) -> Option<Value> {
        self.data.write().properties.shift_remove(key)
    }

    /// Own property names in insertion order
    pub fn own_keys(&self) -> Vec<String> {
        self.data.read().properties.keys().cloned().collect()
    }

    /// Snapshot of own properties in insertion order
    pub fn own_entries(&self) -> Vec<(String, Value)> {
        self.data
            .read()
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Every enumerable name reachable from this object: own names first,
    /// then inherited names not already seen, nearest ancestor first
    pub fn keys(&self) -> Vec<String> {
        let mut seen = FxHashSet::default();
        let mut keys = Vec::new();
        let mut current = Some(self.clone());
        while let Some(object) = current {
            for key in object.own_keys() {
                if seen.insert(key.clone()) {
                    keys.push(key);
                }
            }
            current = object.proto();
        }
        keys
    }

    /// Number of own properties
    pub fn len(&self) -> usize {
        self.data.read().properties.len()
    }

    /// Check if the object has no own properties
    pub fn is_empty(&self) -> bool {
        self.data.read().properties.is_empty()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Check whether `proto` appears on this object's delegation chain
    pub fn inherits_from(&self, proto: &ObjectRef) -> bool {
        let mut current = self.proto();
        while let Some(object) = current {
            if object.ptr_eq(proto) {
                return true;
            }
            current = object.proto();
        }
        false
    }

    /// Look up `method` and call it with this object as receiver
    pub fn invoke(&self, method: &str, args: Vec<Value>) -> CoreResult<Value> {
        match self.get(method) {
            Value::Function(function) => function.call(self, args),
            _ => Err(CoreError::NotCallable(method.to_string())),
        }
    }

    /// Mark the object as being torn down
    ///
    /// Returns `None` when a teardown of this object is already running
    /// further up the stack, which is how destroy cascades break cycles.
    pub fn begin_teardown(&self) -> Option<TeardownGuard> {
        let mut data = self.data.write();
        if data.tearing_down {
            return None;
        }
        data.tearing_down = true;
        Some(TeardownGuard {
            object: self.clone(),
        })
    }
}

impl Default for ObjectRef {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("id", &self.object_id)
            .field("keys", &self.own_keys())
            .finish()
    }
}

/// Clears the teardown mark when dropped
pub struct TeardownGuard {
    object: ObjectRef,
}

impl Drop for TeardownGuard {
    fn drop(&mut self) {
        self.object.data.write().tearing_down = false;
    }
}
