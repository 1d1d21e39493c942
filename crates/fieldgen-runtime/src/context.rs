use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;

use fieldgen_common::{ArgumentSlot, ParameterSource};

use crate::error::ResolverError;
use crate::value::{ObjectValue, Value};

/// What a dispatch function needs from the engine for one field invocation.
///
/// The execution engine implements this; dispatch functions only consume it.
pub trait CallContext: Send + Sync {
    /// The current parent object, which must be of exactly `runtime_type`.
    fn parent(&self, runtime_type: &str) -> Result<ObjectValue, ResolverError>;

    /// The value bound to `slot`, already conforming to the slot's type.
    fn argument(&self, slot: &ArgumentSlot) -> Result<Value, ResolverError>;

    /// Cancellation signal for the request this invocation belongs to.
    fn cancellation(&self) -> &CancellationToken;
}

/// A self-contained `CallContext` for a single field invocation.
///
/// Holds the parent object, field arguments by name, and request-scoped
/// state by key.
#[derive(Debug, Default)]
pub struct RequestContext {
    parent: Option<ObjectValue>,
    arguments: IndexMap<String, Value>,
    state: IndexMap<String, Value>,
    cancellation: CancellationToken,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(mut self, parent: ObjectValue) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// Bind every entry of an already-parsed JSON object as an argument.
    pub fn with_json_arguments(
        mut self,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        for (name, value) in arguments {
            self.arguments.insert(name, Value::from(value));
        }
        self
    }

    pub fn with_state(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.state.insert(key.into(), value.into());
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    fn check(slot: &ArgumentSlot, value: Value, what: &str) -> Result<Value, ResolverError> {
        if value.conforms_to(&slot.ty) {
            return Ok(value);
        }
        let message = if value.is_null() {
            format!("required {} was not provided", what)
        } else {
            format!(
                "{} of type {} does not conform to {}",
                what,
                value.type_name(),
                slot.ty
            )
        };
        Err(ResolverError::Argument {
            slot: slot.index,
            name: slot.name.clone(),
            message,
        })
    }
}

impl CallContext for RequestContext {
    fn parent(&self, runtime_type: &str) -> Result<ObjectValue, ResolverError> {
        match &self.parent {
            Some(parent) if parent.type_name() == runtime_type => Ok(parent.clone()),
            Some(parent) => Err(ResolverError::ReceiverMismatch {
                expected: runtime_type.to_string(),
                found: format!("'{}'", parent.type_name()),
            }),
            None => Err(ResolverError::ReceiverMismatch {
                expected: runtime_type.to_string(),
                found: "no parent".to_string(),
            }),
        }
    }

    fn argument(&self, slot: &ArgumentSlot) -> Result<Value, ResolverError> {
        match &slot.source {
            ParameterSource::Argument { .. } => {
                let name = slot.argument_name().unwrap_or(&slot.name);
                let value = self.arguments.get(name).cloned().unwrap_or(Value::Null);
                Self::check(slot, value, &format!("argument '{}'", name))
            }
            ParameterSource::Parent => {
                let value = self.parent.clone().map_or(Value::Null, Value::Object);
                Self::check(slot, value, "parent")
            }
            ParameterSource::State { key } => {
                let value = self.state.get(key).cloned().unwrap_or(Value::Null);
                Self::check(slot, value, &format!("state '{}'", key))
            }
        }
    }

    fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}
