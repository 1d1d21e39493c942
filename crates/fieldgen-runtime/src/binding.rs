//! Member bindings
//!
//! The static-analysis pass hands the compiler one `MemberBinding` per
//! resolvable member: the erased body the generated dispatch function will
//! invoke. The typed constructors here take care of downcasting receivers
//! and converting results into `Value`s, so bodies can be written against
//! plain Rust types.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use futures::FutureExt;
use indexmap::IndexMap;

use fieldgen_common::ResolverKind;

use crate::error::ResolverError;
use crate::value::{ObjectValue, Value};

pub type MethodFn =
    dyn Fn(Option<&ObjectValue>, Arguments) -> Result<Value, ResolverError> + Send + Sync;

type ResolverFuture = BoxFuture<'static, Result<Value, ResolverError>>;

pub type AsyncMethodFn = dyn Fn(Option<ObjectValue>, Arguments) -> ResolverFuture + Send + Sync;

pub type PropertyFn = dyn Fn(Option<&ObjectValue>) -> Result<Value, ResolverError> + Send + Sync;

/// Positional argument values, in slot order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<Value>,
}

impl Arguments {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn value(&self, index: usize) -> Result<&Value, ResolverError> {
        self.values.get(index).ok_or_else(|| {
            ResolverError::TypeError(format!(
                "argument {} out of range ({} bound)",
                index,
                self.values.len()
            ))
        })
    }

    pub fn int(&self, index: usize) -> Result<i64, ResolverError> {
        let v = self.value(index)?;
        v.as_int().ok_or_else(|| expected("Int", index, v))
    }

    pub fn float(&self, index: usize) -> Result<f64, ResolverError> {
        let v = self.value(index)?;
        v.as_float().ok_or_else(|| expected("Float", index, v))
    }

    pub fn string(&self, index: usize) -> Result<&str, ResolverError> {
        let v = self.value(index)?;
        v.as_str().ok_or_else(|| expected("String", index, v))
    }

    pub fn boolean(&self, index: usize) -> Result<bool, ResolverError> {
        let v = self.value(index)?;
        v.as_bool().ok_or_else(|| expected("Boolean", index, v))
    }

    pub fn object<T: Any>(&self, index: usize) -> Result<&T, ResolverError> {
        let v = self.value(index)?;
        v.as_object()
            .and_then(|obj| obj.downcast_ref::<T>())
            .ok_or_else(|| expected(std::any::type_name::<T>(), index, v))
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.values
    }
}

fn expected(what: &str, index: usize, found: &Value) -> ResolverError {
    ResolverError::TypeError(format!(
        "argument {}: expected {}, found {}",
        index,
        what,
        found.type_name()
    ))
}

/// The erased body of one resolvable member.
#[derive(Clone)]
pub enum MemberBinding {
    Method(Arc<MethodFn>),
    AsyncMethod(Arc<AsyncMethodFn>),
    Property(Arc<PropertyFn>),
}

impl fmt::Debug for MemberBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberBinding::Method(_) => write!(f, "MemberBinding::Method(...)"),
            MemberBinding::AsyncMethod(_) => write!(f, "MemberBinding::AsyncMethod(...)"),
            MemberBinding::Property(_) => write!(f, "MemberBinding::Property(...)"),
        }
    }
}

impl MemberBinding {
    /// The resolver kind this body can back.
    pub fn kind(&self) -> ResolverKind {
        match self {
            MemberBinding::Method(_) => ResolverKind::Sync,
            MemberBinding::AsyncMethod(_) => ResolverKind::Async,
            MemberBinding::Property(_) => ResolverKind::Property,
        }
    }

    /// Wrap an instance method on `T`.
    ///
    /// # Example
    /// ```ignore
    /// let binding = MemberBinding::instance_method(|p: &Product, _args| Ok(p.name.clone()));
    /// ```
    pub fn instance_method<T, F, R>(func: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&T, Arguments) -> Result<R, ResolverError> + Send + Sync + 'static,
        R: Into<Value>,
    {
        MemberBinding::Method(Arc::new(
            move |receiver: Option<&ObjectValue>, args: Arguments| -> Result<Value, ResolverError> {
                let this = downcast::<T>(receiver)?;
                func(this, args).map(Into::into)
            },
        ))
    }

    pub fn static_method<F, R>(func: F) -> Self
    where
        F: Fn(Arguments) -> Result<R, ResolverError> + Send + Sync + 'static,
        R: Into<Value>,
    {
        MemberBinding::Method(Arc::new(
            move |_: Option<&ObjectValue>, args: Arguments| -> Result<Value, ResolverError> {
                func(args).map(Into::into)
            },
        ))
    }

    /// Wrap an async instance method. The receiver is handed over as an
    /// `Arc<T>` so the returned future can outlive the call.
    pub fn instance_async<T, F, Fut, R>(func: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(Arc<T>, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, ResolverError>> + Send + 'static,
        R: Into<Value>,
    {
        MemberBinding::AsyncMethod(Arc::new(
            move |receiver: Option<ObjectValue>, args: Arguments| -> ResolverFuture {
                let this = match receiver.as_ref().map(|r| (r, r.downcast_arc::<T>())) {
                    Some((_, Some(this))) => this,
                    Some((r, None)) => return future::ready(Err(mismatch::<T>(Some(r)))).boxed(),
                    None => return future::ready(Err(mismatch::<T>(None))).boxed(),
                };
                func(this, args).map(|r| r.map(Into::into)).boxed()
            },
        ))
    }

    pub fn static_async<F, Fut, R>(func: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, ResolverError>> + Send + 'static,
        R: Into<Value>,
    {
        MemberBinding::AsyncMethod(Arc::new(
            move |_receiver: Option<ObjectValue>, args: Arguments| -> ResolverFuture {
                func(args).map(|r| r.map(Into::into)).boxed()
            },
        ))
    }

    pub fn instance_property<T, F, R>(func: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: Into<Value>,
    {
        MemberBinding::Property(Arc::new(
            move |receiver: Option<&ObjectValue>| -> Result<Value, ResolverError> {
                let this = downcast::<T>(receiver)?;
                Ok(func(this).into())
            },
        ))
    }

    pub fn static_property<F, R>(func: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: Into<Value>,
    {
        MemberBinding::Property(Arc::new(
            move |_receiver: Option<&ObjectValue>| -> Result<Value, ResolverError> {
                Ok(func().into())
            },
        ))
    }
}

fn downcast<T: Any>(receiver: Option<&ObjectValue>) -> Result<&T, ResolverError> {
    receiver
        .and_then(|r| r.downcast_ref::<T>())
        .ok_or_else(|| mismatch::<T>(receiver))
}

fn mismatch<T>(receiver: Option<&ObjectValue>) -> ResolverError {
    ResolverError::ReceiverMismatch {
        expected: std::any::type_name::<T>().to_string(),
        found: match receiver {
            Some(r) => format!("host object of '{}'", r.type_name()),
            None => "no receiver".to_string(),
        },
    }
}

/// Member bodies of one extension, by member name.
#[derive(Debug, Clone, Default)]
pub struct ExtensionBindings {
    members: IndexMap<String, MemberBinding>,
}

impl ExtensionBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, member: impl Into<String>, binding: MemberBinding) -> Self {
        self.insert(member, binding);
        self
    }

    /// Add or replace the body for `member`.
    pub fn insert(&mut self, member: impl Into<String>, binding: MemberBinding) {
        self.members.insert(member.into(), binding);
    }

    pub fn get(&self, member: &str) -> Option<&MemberBinding> {
        self.members.get(member)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }
}
