//! Native functions and super dispatch
//!
//! A member function carries a [`MemberTag`] once it is written onto a class
//! prototype: the class it belongs to, the name it was registered under and
//! the ancestor implementation it shadows, captured at definition time.
//! `callParent` resolves through that captured reference instead of walking
//! the call stack, so a member must stay registered under one fixed name.

use crate::class::Class;
use crate::object::ObjectRef;
use crate::value::Value;
use crate::{CoreResult, DispatchError};
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

type NativeFn = dyn Fn(&Invocation<'_>) -> CoreResult<Value> + Send + Sync;

/// Back-references written onto a member function when it joins a class
#[derive(Clone)]
pub struct MemberTag {
    /// Name of the owning class
    pub class_name: String,
    /// Owning class (stripped on teardown)
    pub member_of: Option<Weak<Class>>,
    /// Property name the member was registered under
    pub method_name: String,
    /// Shadowed ancestor implementation
    pub parent: Option<Function>,
}

impl MemberTag {
    /// Tag for `method_name` on `class`, shadowing `parent`
    pub fn new(class: &Arc<Class>, method_name: impl Into<String>, parent: Option<Function>) -> Self {
        Self {
            class_name: class.name().to_string(),
            member_of: Some(Arc::downgrade(class)),
            method_name: method_name.into(),
            parent,
        }
    }
}

struct FunctionInner {
    body: Box<NativeFn>,
    tag: RwLock<Option<MemberTag>>,
}

/// Shared native function
#[derive(Clone)]
pub struct Function(Arc<FunctionInner>);

impl Function {
    /// Wrap a native closure
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> CoreResult<Value> + Send + Sync + 'static,
    {
        Function(Arc::new(FunctionInner {
            body: Box::new(body),
            tag: RwLock::new(None),
        }))
    }

    /// Call with `this` as receiver
    pub fn call(&self, this: &ObjectRef, args: Vec<Value>) -> CoreResult<Value> {
        let invocation = Invocation {
            this,
            args: &args,
            callee: self,
        };
        (self.0.body)(&invocation)
    }

    /// Record the member back-references, replacing any earlier tag
    pub fn tag(&self, tag: MemberTag) {
        *self.0.tag.write() = Some(tag);
    }

    /// Current member tag
    pub fn member_tag(&self) -> Option<MemberTag> {
        self.0.tag.read().clone()
    }

    /// Name this function was registered under
    pub fn method_name(&self) -> Option<String> {
        self.0.tag.read().as_ref().map(|t| t.method_name.clone())
    }

    /// Owning class, if tagged and still alive
    pub fn member_of(&self) -> Option<Arc<Class>> {
        self.0
            .tag
            .read()
            .as_ref()
            .and_then(|t| t.member_of.as_ref())
            .and_then(Weak::upgrade)
    }

    /// Drop the class back-reference and the captured ancestor
    pub fn strip_member_of(&self) {
        if let Some(tag) = self.0.tag.write().as_mut() {
            tag.member_of = None;
            tag.parent = None;
        }
    }

    /// Ancestor implementation `callParent` resolves to
    pub fn parent_method(&self) -> Result<Function, DispatchError> {
        let guard = self.0.tag.read();
        let tag = guard.as_ref().ok_or(DispatchError::Untagged)?;
        if tag.member_of.is_none() {
            return Err(DispatchError::Detached {
                method: tag.method_name.clone(),
            });
        }
        tag.parent.clone().ok_or_else(|| DispatchError::NoParentMethod {
            class_name: tag.class_name.clone(),
            method: tag.method_name.clone(),
        })
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.tag.read().as_ref() {
            Some(tag) => write!(f, "Function({}.{})", tag.class_name, tag.method_name),
            None => write!(f, "Function(<anonymous>)"),
        }
    }
}

/// A single call of a native function
pub struct Invocation<'a> {
    this: &'a ObjectRef,
    args: &'a [Value],
    callee: &'a Function,
}

impl<'a> Invocation<'a> {
    /// Receiver
    pub fn this(&self) -> &ObjectRef {
        self.this
    }

    /// Arguments as passed
    pub fn args(&self) -> &[Value] {
        self.args
    }

    /// Argument at `index` (undefined when missing)
    pub fn arg(&self, index: usize) -> Value {
        self.args.get(index).cloned().unwrap_or_default()
    }

    /// The function currently executing
    pub fn callee(&self) -> &Function {
        self.callee
    }

    /// Invoke the shadowed ancestor implementation with this call's arguments
    pub fn call_parent(&self) -> CoreResult<Value> {
        self.call_parent_with(self.args.to_vec())
    }

    /// Invoke the shadowed ancestor implementation with explicit arguments
    pub fn call_parent_with(&self, args: Vec<Value>) -> CoreResult<Value> {
        let parent = self.callee.parent_method()?;
        parent.call(self.this, args)
    }
}
