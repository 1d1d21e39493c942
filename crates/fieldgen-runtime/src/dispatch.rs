use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use fieldgen_common::ir::IrResolver;
use fieldgen_common::{ArgumentPlan, Receiver, ResolverKind, ResolverName, TypeRef};

use crate::context::CallContext;
use crate::error::RegistrationError;
use crate::result::AsyncResult;

/// A generated dispatch function: `(context) -> AsyncResult`.
#[derive(Clone)]
pub struct DispatchFn(Arc<dyn Fn(Arc<dyn CallContext>) -> AsyncResult + Send + Sync>);

impl DispatchFn {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(Arc<dyn CallContext>) -> AsyncResult + Send + Sync + 'static,
    {
        Self(Arc::new(func))
    }

    pub fn call(&self, context: Arc<dyn CallContext>) -> AsyncResult {
        (self.0)(context)
    }

    /// Whether both handles refer to the same generated function.
    pub fn ptr_eq(&self, other: &DispatchFn) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for DispatchFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DispatchFn(...)")
    }
}

/// Dense index of a dispatch table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolverId(u32);

impl ResolverId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ResolverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One dispatch function together with the metadata it was built from.
#[derive(Debug, Clone)]
pub struct DispatchEntry {
    pub id: ResolverId,
    pub name: ResolverName,
    pub kind: ResolverKind,
    pub receiver: Receiver,
    pub arguments: ArgumentPlan,
    pub ty: TypeRef,
    pub dispatch: DispatchFn,
}

impl DispatchEntry {
    /// A new entry; its id is assigned when inserted into a table.
    pub fn new(
        name: ResolverName,
        kind: ResolverKind,
        receiver: Receiver,
        arguments: ArgumentPlan,
        ty: TypeRef,
        dispatch: DispatchFn,
    ) -> Self {
        Self {
            id: ResolverId(0),
            name,
            kind,
            receiver,
            arguments,
            ty,
            dispatch,
        }
    }

    pub fn to_ir(&self) -> IrResolver {
        IrResolver {
            id: Some(self.id.as_u32()),
            name: self.name.clone(),
            kind: self.kind,
            receiver: self.receiver.clone(),
            arguments: self.arguments.clone(),
            ty: self.ty.clone(),
        }
    }
}

/// Lookup table from `(TypeName, MemberName)` to dispatch functions.
///
/// Entries are stored densely in insertion order; the name index is only
/// consulted to obtain a `ResolverId`, after which a call is a single
/// indexed load and indirect call.
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    entries: Vec<DispatchEntry>,
    index: HashMap<(String, String), ResolverId>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mut entry: DispatchEntry) -> Result<ResolverId, RegistrationError> {
        let key = (entry.name.type_name.clone(), entry.name.member_name.clone());
        if self.index.contains_key(&key) {
            return Err(RegistrationError::DuplicateResolver {
                type_name: key.0,
                member: key.1,
            });
        }
        let id = ResolverId(self.entries.len() as u32);
        entry.id = id;
        self.entries.push(entry);
        self.index.insert(key, id);
        Ok(id)
    }

    /// Move every entry of `other` into this table, assigning new ids.
    /// Returns the new ids in `other`'s order.
    pub fn append(&mut self, other: DispatchTable) -> Result<Vec<ResolverId>, RegistrationError> {
        other
            .entries
            .into_iter()
            .map(|entry| self.insert(entry))
            .collect()
    }

    pub fn lookup(&self, type_name: &str, member_name: &str) -> Option<ResolverId> {
        self.index
            .get(&(type_name.to_string(), member_name.to_string()))
            .copied()
    }

    pub fn get(&self, id: ResolverId) -> Option<&DispatchEntry> {
        self.entries.get(id.index())
    }

    pub fn resolver(&self, type_name: &str, member_name: &str) -> Option<&DispatchFn> {
        self.lookup(type_name, member_name)
            .and_then(|id| self.get(id))
            .map(|entry| &entry.dispatch)
    }

    /// Invoke the dispatch function with the given id.
    pub fn dispatch(&self, id: ResolverId, context: Arc<dyn CallContext>) -> Option<AsyncResult> {
        self.get(id).map(|entry| entry.dispatch.call(context))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DispatchEntry> {
        self.entries.iter()
    }

    pub fn to_ir(&self) -> Vec<IrResolver> {
        self.entries.iter().map(DispatchEntry::to_ir).collect()
    }
}
