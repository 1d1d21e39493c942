use std::fmt;
use std::sync::Arc;

use fieldgen_common::ir::{IrExtension, IrInitStep, IrResolver};
use fieldgen_common::Diagnostic;
use fieldgen_runtime::{
    ConfigureFn, DispatchFn, DispatchTable, RegistrationError, ResolverId, TypeDescriptorBuilder,
};
use tracing::debug;

use crate::plan::{ResolverPlan, SkippedMember};

/// One generated registration, replayed by `CompiledExtension::initialize`.
#[derive(Debug, Clone)]
pub enum InitStep {
    ImplementsNode(DispatchFn),
    Field {
        name: String,
        resolver: ResolverId,
        dispatch: DispatchFn,
    },
}

/// The node resolver of an extension. Not a table entry.
#[derive(Debug, Clone)]
pub struct NodeResolver {
    pub plan: ResolverPlan,
    pub dispatch: DispatchFn,
}

/// Output of compiling one extension: its dispatch table and the
/// initializer that registers the table against a type descriptor.
pub struct CompiledExtension {
    runtime_type: String,
    extension_type: String,
    node_resolver: Option<NodeResolver>,
    table: DispatchTable,
    steps: Vec<InitStep>,
    skipped: Vec<SkippedMember>,
    configure: Option<Arc<ConfigureFn>>,
    warnings: Vec<Diagnostic>,
}

/// Build the initializer for a compiled table: node registration first,
/// then one field registration per table entry in table order.
pub fn emit(
    runtime_type: String,
    extension_type: String,
    node_resolver: Option<NodeResolver>,
    table: DispatchTable,
    skipped: Vec<SkippedMember>,
    warnings: Vec<Diagnostic>,
) -> CompiledExtension {
    let mut steps = Vec::with_capacity(table.len() + 1);
    if let Some(node) = &node_resolver {
        steps.push(InitStep::ImplementsNode(node.dispatch.clone()));
    }
    for entry in table.iter() {
        steps.push(InitStep::Field {
            name: entry.name.member_name.clone(),
            resolver: entry.id,
            dispatch: entry.dispatch.clone(),
        });
    }
    CompiledExtension {
        runtime_type,
        extension_type,
        node_resolver,
        table,
        steps,
        skipped,
        configure: None,
        warnings,
    }
}

impl CompiledExtension {
    pub fn runtime_type(&self) -> &str {
        &self.runtime_type
    }

    pub fn extension_type(&self) -> &str {
        &self.extension_type
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    pub fn node_resolver(&self) -> Option<&DispatchFn> {
        self.node_resolver.as_ref().map(|n| &n.dispatch)
    }

    /// The dispatch function generated for `member`, if it became a resolver.
    pub fn resolver(&self, member: &str) -> Option<&DispatchFn> {
        self.table.resolver(&self.runtime_type, member)
    }

    pub fn steps(&self) -> &[InitStep] {
        &self.steps
    }

    pub fn skipped(&self) -> &[SkippedMember] {
        &self.skipped
    }

    /// Non-fatal diagnostics produced while planning.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Install the hand-written configuration hook, run after every
    /// generated registration.
    pub fn with_configure<F>(mut self, configure: F) -> Self
    where
        F: Fn(&mut dyn TypeDescriptorBuilder) -> Result<(), RegistrationError>
            + Send
            + Sync
            + 'static,
    {
        self.configure = Some(Arc::new(configure));
        self
    }

    pub fn set_configure(&mut self, configure: Arc<ConfigureFn>) {
        self.configure = Some(configure);
    }

    /// Register the node resolver, then every field in declaration order,
    /// then run the configure hook.
    pub fn initialize(
        &self,
        descriptor: &mut dyn TypeDescriptorBuilder,
    ) -> Result<(), RegistrationError> {
        if descriptor.type_name() != self.runtime_type {
            return Err(RegistrationError::TypeMismatch {
                expected: self.runtime_type.clone(),
                found: descriptor.type_name().to_string(),
            });
        }
        for step in &self.steps {
            match step {
                InitStep::ImplementsNode(dispatch) => descriptor.implements_node(dispatch.clone())?,
                InitStep::Field { name, dispatch, .. } => descriptor.field(name, dispatch.clone())?,
            }
        }
        if let Some(configure) = &self.configure {
            configure(descriptor)?;
        }
        debug!(
            type_name = %self.runtime_type,
            steps = self.steps.len(),
            "initialized type descriptor"
        );
        Ok(())
    }

    /// Lower to IR with table ids shifted by `first_id`.
    pub fn to_ir(&self, first_id: u32) -> IrExtension {
        let resolvers: Vec<IrResolver> = self
            .table
            .iter()
            .map(|entry| {
                let mut ir = entry.to_ir();
                ir.id = Some(first_id + entry.id.as_u32());
                ir
            })
            .collect();
        let mut initialize: Vec<IrInitStep> = self
            .steps
            .iter()
            .map(|step| match step {
                InitStep::ImplementsNode(_) => IrInitStep::ImplementsNode,
                InitStep::Field { name, resolver, .. } => IrInitStep::Field {
                    name: name.clone(),
                    resolver: first_id + resolver.as_u32(),
                },
            })
            .collect();
        initialize.push(IrInitStep::Configure);
        IrExtension {
            runtime_type: self.runtime_type.clone(),
            extension_type: self.extension_type.clone(),
            node_resolver: self.node_resolver.as_ref().map(|n| n.plan.to_ir(None)),
            resolvers,
            skipped: self.skipped.iter().map(SkippedMember::to_ir).collect(),
            initialize,
        }
    }
}

impl fmt::Debug for CompiledExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledExtension")
            .field("runtime_type", &self.runtime_type)
            .field("extension_type", &self.extension_type)
            .field("node_resolver", &self.node_resolver.is_some())
            .field("resolvers", &self.table.len())
            .field("skipped", &self.skipped)
            .field("configure", &self.configure.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use fieldgen_common::{ArgumentPlan, Receiver, ResolverKind, ResolverName, TypeRef};
    use fieldgen_runtime::{AsyncResult, DispatchEntry, ObjectTypeDescriptor, Value};

    use super::*;

    fn constant(v: i64) -> DispatchFn {
        DispatchFn::new(move |_ctx| AsyncResult::completed(Value::Int(v)))
    }

    fn entry(member: &str, v: i64) -> DispatchEntry {
        DispatchEntry::new(
            ResolverName::new("Product", member, 0),
            ResolverKind::Property,
            Receiver::Parent {
                runtime_type: "Product".into(),
            },
            ArgumentPlan::empty(),
            TypeRef::new("Int"),
            constant(v),
        )
    }

    fn compiled(with_node: bool) -> CompiledExtension {
        let mut table = DispatchTable::new();
        table.insert(entry("b", 1)).unwrap();
        table.insert(entry("a", 2)).unwrap();
        let node = with_node.then(|| NodeResolver {
            plan: ResolverPlan {
                name: ResolverName::new("Product", "GetById", 1),
                kind: ResolverKind::Sync,
                receiver: Receiver::Static {
                    declaring_type: "Product".into(),
                },
                arguments: ArgumentPlan::empty(),
                ty: TypeRef::new("Product"),
            },
            dispatch: constant(0),
        });
        emit("Product".into(), "Product".into(), node, table, Vec::new(), Vec::new())
    }

    /// Logs every call it receives.
    struct Recorder {
        name: String,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl TypeDescriptorBuilder for Recorder {
        fn type_name(&self) -> &str {
            &self.name
        }

        fn implements_node(&mut self, _resolver: DispatchFn) -> Result<(), RegistrationError> {
            self.calls.lock().unwrap().push("node".into());
            Ok(())
        }

        fn field(&mut self, name: &str, _resolver: DispatchFn) -> Result<(), RegistrationError> {
            self.calls.lock().unwrap().push(format!("field:{}", name));
            Ok(())
        }
    }

    #[test]
    fn node_then_fields_in_order_then_configure() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let log = calls.clone();
        let ext = compiled(true).with_configure(move |_d| {
            log.lock().unwrap().push("configure".into());
            Ok(())
        });
        let mut recorder = Recorder {
            name: "Product".into(),
            calls: calls.clone(),
        };
        ext.initialize(&mut recorder).unwrap();
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["node", "field:b", "field:a", "configure"]
        );
    }

    #[test]
    fn no_node_registration_without_node_resolver() {
        let ext = compiled(false);
        let mut desc = ObjectTypeDescriptor::new("Product");
        ext.initialize(&mut desc).unwrap();
        assert!(!desc.is_node());
        assert_eq!(desc.field_names().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn wrong_descriptor_type_is_rejected() {
        let mut desc = ObjectTypeDescriptor::new("Review");
        let err = compiled(false).initialize(&mut desc).unwrap_err();
        assert!(matches!(err, RegistrationError::TypeMismatch { .. }));
        assert_eq!(desc.field_names().count(), 0);
    }

    #[test]
    fn configure_errors_propagate() {
        let ext = compiled(false)
            .with_configure(|_d| Err(RegistrationError::Configure("no price field".into())));
        let mut desc = ObjectTypeDescriptor::new("Product");
        let err = ext.initialize(&mut desc).unwrap_err();
        assert_eq!(err.to_string(), "configure failed: no price field");
    }

    #[test]
    fn ir_shifts_ids() {
        let ir = compiled(true).to_ir(5);
        let ids: Vec<_> = ir.resolvers.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![Some(5), Some(6)]);
        assert_eq!(
            ir.initialize,
            vec![
                IrInitStep::ImplementsNode,
                IrInitStep::Field {
                    name: "b".into(),
                    resolver: 5
                },
                IrInitStep::Field {
                    name: "a".into(),
                    resolver: 6
                },
                IrInitStep::Configure,
            ]
        );
        assert_eq!(ir.node_resolver.map(|n| n.name.member_name), Some("GetById".to_string()));
    }
}
