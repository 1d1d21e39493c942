use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::context::CallContext;
use crate::dispatch::DispatchFn;
use crate::error::RegistrationError;
use crate::result::AsyncResult;

/// The type-registration surface generated initializers write to.
pub trait TypeDescriptorBuilder {
    /// Name of the type being configured.
    fn type_name(&self) -> &str;

    /// Mark the type as a node resolvable by global id.
    fn implements_node(&mut self, resolver: DispatchFn) -> Result<(), RegistrationError>;

    /// Attach `resolver` to the field `name`, replacing any earlier one.
    fn field(&mut self, name: &str, resolver: DispatchFn) -> Result<(), RegistrationError>;
}

/// Hand-written configuration run after the generated wiring.
pub type ConfigureFn =
    dyn Fn(&mut dyn TypeDescriptorBuilder) -> Result<(), RegistrationError> + Send + Sync;

/// In-memory object type descriptor.
///
/// Without declared fields every registration creates the field. With
/// declared fields, registering an undeclared one is an error.
#[derive(Debug, Default)]
pub struct ObjectTypeDescriptor {
    name: String,
    declared: Option<IndexSet<String>>,
    node_resolver: Option<DispatchFn>,
    fields: IndexMap<String, DispatchFn>,
}

impl ObjectTypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_declared_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declared = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_node(&self) -> bool {
        self.node_resolver.is_some()
    }

    pub fn node_resolver(&self) -> Option<&DispatchFn> {
        self.node_resolver.as_ref()
    }

    pub fn field_resolver(&self, name: &str) -> Option<&DispatchFn> {
        self.fields.get(name)
    }

    /// Registered field names, in first-registration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Resolve one field through its registered dispatch function.
    pub fn resolve(&self, field: &str, context: Arc<dyn CallContext>) -> Option<AsyncResult> {
        self.fields.get(field).map(|dispatch| dispatch.call(context))
    }

    /// Resolve a node through the registered node resolver.
    pub fn resolve_node(&self, context: Arc<dyn CallContext>) -> Option<AsyncResult> {
        self.node_resolver.as_ref().map(|dispatch| dispatch.call(context))
    }
}

impl TypeDescriptorBuilder for ObjectTypeDescriptor {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn implements_node(&mut self, resolver: DispatchFn) -> Result<(), RegistrationError> {
        self.node_resolver = Some(resolver);
        Ok(())
    }

    fn field(&mut self, name: &str, resolver: DispatchFn) -> Result<(), RegistrationError> {
        if let Some(declared) = &self.declared {
            if !declared.contains(name) {
                return Err(RegistrationError::UnknownField {
                    type_name: self.name.clone(),
                    field: name.to_string(),
                });
            }
        }
        self.fields.insert(name.to_string(), resolver);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use crate::value::Value;

    fn constant(v: i64) -> DispatchFn {
        DispatchFn::new(move |_ctx| AsyncResult::completed(Value::Int(v)))
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let mut desc = ObjectTypeDescriptor::new("Product");
        desc.field("price", constant(1)).unwrap();
        desc.field("price", constant(2)).unwrap();
        assert_eq!(desc.field_names().collect::<Vec<_>>(), vec!["price"]);
        let result = desc.resolve("price", Arc::new(RequestContext::new())).unwrap();
        assert_eq!(result.into_completed().unwrap().unwrap(), Value::Int(2));
    }

    #[test]
    fn undeclared_field_is_rejected() {
        let mut desc = ObjectTypeDescriptor::new("Product").with_declared_fields(["name"]);
        assert!(desc.field("name", constant(1)).is_ok());
        let err = desc.field("sku", constant(1)).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::UnknownField {
                type_name: "Product".into(),
                field: "sku".into()
            }
        );
    }

    #[test]
    fn node_registration() {
        let mut desc = ObjectTypeDescriptor::new("Product");
        assert!(!desc.is_node());
        assert!(desc.resolve_node(Arc::new(RequestContext::new())).is_none());
        desc.implements_node(constant(7)).unwrap();
        assert!(desc.is_node());
        let result = desc.resolve_node(Arc::new(RequestContext::new())).unwrap();
        assert_eq!(result.into_completed().unwrap().unwrap(), Value::Int(7));
    }
}
