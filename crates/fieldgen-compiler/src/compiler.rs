use std::sync::Arc;

use fieldgen_common::config::{FieldgenConfig, UnsupportedMemberPolicy};
use fieldgen_common::{DiagnosticBag, DispatchManifest, ObjectTypeExtensionInfo};
use fieldgen_runtime::{
    ConfigureFn, DispatchEntry, DispatchTable, ExtensionBindings, MemberBinding, RegistrationError,
    TypeDescriptorBuilder,
};
use tracing::debug;

use crate::error::{CompileError, Result};
use crate::plan::{ExtensionPlan, Planner, ResolverPlan};
use crate::register::{self, CompiledExtension, NodeResolver};
use crate::synthesize::synthesize;

/// Compiles extension descriptors into dispatch tables and initializers.
///
/// Holds only settings; every call is an independent pass, so one
/// `Compiler` can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    unsupported_members: UnsupportedMemberPolicy,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &FieldgenConfig) -> Self {
        Self {
            unsupported_members: config.unsupported_members,
        }
    }

    pub fn with_policy(mut self, policy: UnsupportedMemberPolicy) -> Self {
        self.unsupported_members = policy;
        self
    }

    /// Classify and plan one extension without binding any member bodies.
    pub fn plan(&self, ext: &ObjectTypeExtensionInfo) -> (ExtensionPlan, DiagnosticBag) {
        Planner::new(self.unsupported_members).plan(ext)
    }

    /// Compile one extension against the bodies in `bindings`.
    ///
    /// Fails with every planning diagnostic if any of them is an error,
    /// or on the first member that has no body or a body of the wrong kind.
    pub fn compile(
        &self,
        ext: &ObjectTypeExtensionInfo,
        bindings: &ExtensionBindings,
    ) -> Result<CompiledExtension> {
        let (plan, diagnostics) = self.plan(ext);
        if diagnostics.has_errors() {
            return Err(CompileError::Diagnostics {
                type_name: ext.runtime_type.clone(),
                diagnostics: diagnostics.into_diagnostics(),
            });
        }

        let node_resolver = match plan.node_resolver {
            Some(node) => {
                let dispatch = synthesize(&node, lookup(&plan.runtime_type, &node, bindings)?)?;
                Some(NodeResolver {
                    plan: node,
                    dispatch,
                })
            }
            None => None,
        };

        let mut table = DispatchTable::new();
        for resolver in plan.resolvers {
            let dispatch = synthesize(&resolver, lookup(&plan.runtime_type, &resolver, bindings)?)?;
            table.insert(DispatchEntry::new(
                resolver.name,
                resolver.kind,
                resolver.receiver,
                resolver.arguments,
                resolver.ty,
                dispatch,
            ))?;
        }
        for name in bindings.names() {
            if table.lookup(&plan.runtime_type, name).is_none()
                && ext.node_resolver.as_ref().map_or(true, |n| n.name != name)
            {
                debug!(
                    type_name = %plan.runtime_type,
                    member = name,
                    "binding has no matching resolver"
                );
            }
        }
        debug!(type_name = %plan.runtime_type, resolvers = table.len(), "compiled extension");

        Ok(register::emit(
            plan.runtime_type,
            plan.extension_type,
            node_resolver,
            table,
            plan.skipped,
            diagnostics.into_diagnostics(),
        ))
    }

    /// Compile a whole schema's extensions, merging their tables.
    pub fn compile_all<'a, I>(&self, units: I) -> Result<CompiledSchema>
    where
        I: IntoIterator<Item = (&'a ObjectTypeExtensionInfo, &'a ExtensionBindings)>,
    {
        let mut schema = CompiledSchema::default();
        for (ext, bindings) in units {
            let compiled = self.compile(ext, bindings)?;
            schema.table.append(compiled.table().clone())?;
            schema.extensions.push(compiled);
        }
        Ok(schema)
    }

    /// Plan every extension and describe the result as a manifest.
    ///
    /// Extensions whose plans have errors are still described; the
    /// returned diagnostics say which ones are unusable.
    pub fn manifest(&self, exts: &[ObjectTypeExtensionInfo]) -> (DispatchManifest, DiagnosticBag) {
        let mut diagnostics = DiagnosticBag::new();
        let mut extensions = Vec::with_capacity(exts.len());
        let mut next_id = 0u32;
        for ext in exts {
            let (plan, diags) = self.plan(ext);
            extensions.push(plan.to_ir(next_id));
            next_id += plan.resolvers.len() as u32;
            diagnostics.extend(diags);
        }
        (DispatchManifest::new(extensions), diagnostics)
    }
}

fn lookup<'b>(
    type_name: &str,
    resolver: &ResolverPlan,
    bindings: &'b ExtensionBindings,
) -> Result<&'b MemberBinding> {
    bindings
        .get(resolver.member())
        .ok_or_else(|| CompileError::MissingBinding {
            type_name: type_name.to_string(),
            member: resolver.member().to_string(),
        })
}

/// Every extension of a schema, with one merged dispatch table.
#[derive(Debug, Default)]
pub struct CompiledSchema {
    extensions: Vec<CompiledExtension>,
    table: DispatchTable,
}

impl CompiledSchema {
    /// The merged table. Ids are dense across all extensions, in
    /// compilation order.
    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    pub fn extensions(&self) -> &[CompiledExtension] {
        &self.extensions
    }

    /// The extension compiled from the members of `extension_type`.
    pub fn extension(&self, extension_type: &str) -> Option<&CompiledExtension> {
        self.extensions
            .iter()
            .find(|e| e.extension_type() == extension_type)
    }

    /// Every extension that configures `runtime_type`, in compilation order.
    pub fn extensions_of<'s>(
        &'s self,
        runtime_type: &'s str,
    ) -> impl Iterator<Item = &'s CompiledExtension> + 's {
        self.extensions
            .iter()
            .filter(move |e| e.runtime_type() == runtime_type)
    }

    /// Install the configure hook of the extension for `extension_type`.
    /// Returns `false` if there is no such extension.
    pub fn configure<F>(&mut self, extension_type: &str, configure: F) -> bool
    where
        F: Fn(&mut dyn TypeDescriptorBuilder) -> std::result::Result<(), RegistrationError>
            + Send
            + Sync
            + 'static,
    {
        match self
            .extensions
            .iter_mut()
            .find(|e| e.extension_type() == extension_type)
        {
            Some(ext) => {
                let hook: Arc<ConfigureFn> = Arc::new(configure);
                ext.set_configure(hook);
                true
            }
            None => false,
        }
    }

    pub fn manifest(&self) -> DispatchManifest {
        let mut next_id = 0u32;
        let extensions = self
            .extensions
            .iter()
            .map(|ext| {
                let ir = ext.to_ir(next_id);
                next_id += ext.table().len() as u32;
                ir
            })
            .collect();
        DispatchManifest::new(extensions)
    }
}
