//! Dispatch synthesis
//!
//! Turns a `ResolverPlan` plus the member body into a `DispatchFn` with the
//! uniform `(context) -> AsyncResult` shape. Everything that can be decided
//! from the plan (receiver kind, whether any slots exist) is decided here,
//! once, and captured by the generated closure.

use std::sync::Arc;

use fieldgen_common::{ArgumentPlan, ResolverKind};
use fieldgen_runtime::binding::{AsyncMethodFn, MethodFn, PropertyFn};
use fieldgen_runtime::{
    Arguments, AsyncResult, CallContext, DispatchFn, MemberBinding, ObjectValue, ResolverError,
};
use tracing::trace;

use crate::error::CompileError;
use crate::plan::ResolverPlan;

/// Build the dispatch function for `plan`, invoking `binding`.
pub fn synthesize(
    plan: &ResolverPlan,
    binding: &MemberBinding,
) -> Result<DispatchFn, CompileError> {
    let resolver: Arc<str> = Arc::from(plan.name.to_string());
    let parent_type: Option<Arc<str>> = plan.receiver.parent_type().map(Arc::from);
    let slots = (!plan.arguments.is_empty()).then(|| plan.arguments.clone());

    let dispatch = match (plan.kind, binding) {
        (ResolverKind::Sync, MemberBinding::Method(body)) => {
            sync_dispatch(resolver, parent_type, slots, body.clone())
        }
        (ResolverKind::Async, MemberBinding::AsyncMethod(body)) => {
            async_dispatch(resolver, parent_type, slots, body.clone())
        }
        (ResolverKind::Property, MemberBinding::Property(body)) => {
            property_dispatch(resolver, parent_type, body.clone())
        }
        (expected, other) => {
            return Err(CompileError::BindingMismatch {
                resolver: resolver.to_string(),
                expected,
                found: other.kind(),
            })
        }
    };
    Ok(dispatch)
}

fn sync_dispatch(
    resolver: Arc<str>,
    parent_type: Option<Arc<str>>,
    slots: Option<ArgumentPlan>,
    body: Arc<MethodFn>,
) -> DispatchFn {
    DispatchFn::new(move |context: Arc<dyn CallContext>| {
        let result = extract_arguments(context.as_ref(), slots.as_ref())
            .and_then(|args| {
                let receiver = resolve_receiver(context.as_ref(), parent_type.as_deref())?;
                body(receiver.as_ref(), args)
            });
        if let Err(error) = &result {
            trace!(resolver = %resolver, %error, "dispatch failed");
        }
        AsyncResult::from_result(result)
    })
}

fn async_dispatch(
    resolver: Arc<str>,
    parent_type: Option<Arc<str>>,
    slots: Option<ArgumentPlan>,
    body: Arc<AsyncMethodFn>,
) -> DispatchFn {
    DispatchFn::new(move |context: Arc<dyn CallContext>| {
        let token = context.cancellation().clone();
        if token.is_cancelled() {
            trace!(resolver = %resolver, "cancelled before dispatch");
            return AsyncResult::failed(ResolverError::Cancelled);
        }
        let started = extract_arguments(context.as_ref(), slots.as_ref()).and_then(|args| {
            let receiver = resolve_receiver(context.as_ref(), parent_type.as_deref())?;
            Ok(body(receiver, args))
        });
        match started {
            Ok(future) => AsyncResult::cancellable(future, token),
            Err(error) => {
                trace!(resolver = %resolver, %error, "dispatch failed");
                AsyncResult::failed(error)
            }
        }
    })
}

fn property_dispatch(
    resolver: Arc<str>,
    parent_type: Option<Arc<str>>,
    body: Arc<PropertyFn>,
) -> DispatchFn {
    DispatchFn::new(move |context: Arc<dyn CallContext>| {
        let result = resolve_receiver(context.as_ref(), parent_type.as_deref())
            .and_then(|receiver| body(receiver.as_ref()));
        if let Err(error) = &result {
            trace!(resolver = %resolver, %error, "dispatch failed");
        }
        AsyncResult::from_result(result)
    })
}

/// Ask the context for every slot, in ascending index order.
fn extract_arguments(
    context: &dyn CallContext,
    slots: Option<&ArgumentPlan>,
) -> Result<Arguments, ResolverError> {
    let Some(plan) = slots else {
        return Ok(Arguments::default());
    };
    let mut values = Vec::with_capacity(plan.len());
    for slot in plan.slots() {
        values.push(context.argument(slot)?);
    }
    Ok(Arguments::new(values))
}

fn resolve_receiver(
    context: &dyn CallContext,
    parent_type: Option<&str>,
) -> Result<Option<ObjectValue>, ResolverError> {
    match parent_type {
        Some(runtime_type) => context.parent(runtime_type).map(Some),
        None => Ok(None),
    }
}
