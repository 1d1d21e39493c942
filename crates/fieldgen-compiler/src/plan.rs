use std::collections::HashSet;

use fieldgen_common::config::UnsupportedMemberPolicy;
use fieldgen_common::ir::{IrExtension, IrInitStep, IrResolver, IrSkipped};
use fieldgen_common::{
    ArgumentPlan, Diagnostic, DiagnosticBag, MemberInfo, ObjectTypeExtensionInfo, Receiver,
    ResolverKind, ResolverName, TypeRef,
};
use tracing::{debug, warn};

use crate::classify::{classify, ResolverShape, SkipReason};

/// Everything needed to synthesize one dispatch function.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverPlan {
    pub name: ResolverName,
    pub kind: ResolverKind,
    pub receiver: Receiver,
    pub arguments: ArgumentPlan,
    /// GraphQL-facing value type.
    pub ty: TypeRef,
}

impl ResolverPlan {
    pub fn member(&self) -> &str {
        &self.name.member_name
    }

    pub fn to_ir(&self, id: Option<u32>) -> IrResolver {
        IrResolver {
            id,
            name: self.name.clone(),
            kind: self.kind,
            receiver: self.receiver.clone(),
            arguments: self.arguments.clone(),
            ty: self.ty.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedMember {
    pub member: String,
    pub reason: SkipReason,
}

impl SkippedMember {
    pub fn to_ir(&self) -> IrSkipped {
        IrSkipped {
            member: self.member.clone(),
            reason: self.reason.to_string(),
        }
    }
}

/// The planned shape of one extension, before any member body is bound.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionPlan {
    pub runtime_type: String,
    pub extension_type: String,
    pub node_resolver: Option<ResolverPlan>,
    /// Resolvable members, in declaration order.
    pub resolvers: Vec<ResolverPlan>,
    pub skipped: Vec<SkippedMember>,
}

impl ExtensionPlan {
    /// Lower to IR, numbering table entries from `first_id`.
    pub fn to_ir(&self, first_id: u32) -> IrExtension {
        let resolvers: Vec<IrResolver> = self
            .resolvers
            .iter()
            .zip(first_id..)
            .map(|(resolver, id)| resolver.to_ir(Some(id)))
            .collect();
        let mut initialize = Vec::with_capacity(resolvers.len() + 2);
        if self.node_resolver.is_some() {
            initialize.push(IrInitStep::ImplementsNode);
        }
        for (resolver, id) in self.resolvers.iter().zip(first_id..) {
            initialize.push(IrInitStep::Field {
                name: resolver.member().to_string(),
                resolver: id,
            });
        }
        initialize.push(IrInitStep::Configure);
        IrExtension {
            runtime_type: self.runtime_type.clone(),
            extension_type: self.extension_type.clone(),
            node_resolver: self.node_resolver.as_ref().map(|n| n.to_ir(None)),
            resolvers,
            skipped: self.skipped.iter().map(SkippedMember::to_ir).collect(),
            initialize,
        }
    }
}

/// Classifies the members of one extension and builds their argument
/// plans.
///
/// Reports:
///  - duplicate member names (the first declaration wins),
///  - unsupported members, according to the configured policy,
///  - unusable node resolvers,
///  - duplicate parameter names and malformed parameter types.
pub struct Planner {
    policy: UnsupportedMemberPolicy,
    diagnostics: DiagnosticBag,
}

impl Planner {
    pub fn new(policy: UnsupportedMemberPolicy) -> Self {
        Self {
            policy,
            diagnostics: DiagnosticBag::new(),
        }
    }

    pub fn plan(mut self, ext: &ObjectTypeExtensionInfo) -> (ExtensionPlan, DiagnosticBag) {
        let node_resolver = ext
            .node_resolver
            .as_ref()
            .and_then(|member| self.plan_node_resolver(ext, member));

        let mut seen = HashSet::new();
        let mut resolvers = Vec::with_capacity(ext.members.len());
        let mut skipped = Vec::new();
        for member in &ext.members {
            if !seen.insert(member.name.as_str()) {
                self.diagnostics.report(
                    Diagnostic::error(format!("duplicate member '{}'", member.name))
                        .with_subject(&ext.runtime_type, &member.name)
                        .with_location(member.location.clone())
                        .with_suggestion(
                            "the first declaration is used; rename or remove this one",
                        ),
                );
                continue;
            }
            match classify(member) {
                ResolverShape::Skip(reason) => {
                    self.report_skip(ext, member, reason);
                    skipped.push(SkippedMember {
                        member: member.name.clone(),
                        reason,
                    });
                }
                shape => {
                    if let Some(plan) = self.plan_resolver(ext, member, &shape) {
                        debug!(
                            resolver = %plan.name,
                            kind = %plan.kind,
                            slots = plan.arguments.len(),
                            "planned resolver"
                        );
                        resolvers.push(plan);
                    }
                }
            }
        }

        let plan = ExtensionPlan {
            runtime_type: ext.runtime_type.clone(),
            extension_type: ext.extension_type.clone(),
            node_resolver,
            resolvers,
            skipped,
        };
        (plan, self.diagnostics)
    }

    fn plan_node_resolver(
        &mut self,
        ext: &ObjectTypeExtensionInfo,
        member: &MemberInfo,
    ) -> Option<ResolverPlan> {
        let shape = classify(member);
        let found = match &shape {
            ResolverShape::Sync(_) | ResolverShape::Async(_) => None,
            ResolverShape::Property(_) => Some("a property".to_string()),
            ResolverShape::Skip(reason) => Some(format!("a method that {}", reason)),
        };
        if let Some(found) = found {
            self.diagnostics.report(
                Diagnostic::error(format!(
                    "node resolver '{}' must be a method returning a value or a future, found {}",
                    member.name, found
                ))
                .with_subject(&ext.runtime_type, &member.name)
                .with_location(member.location.clone()),
            );
            return None;
        }
        if member.parameters().is_empty() {
            self.diagnostics.report(
                Diagnostic::error(format!(
                    "node resolver '{}' must take the node id as a parameter",
                    member.name
                ))
                .with_subject(&ext.runtime_type, &member.name)
                .with_location(member.location.clone())
                .with_suggestion("add an `id` argument parameter"),
            );
            return None;
        }
        let plan = self.plan_resolver(ext, member, &shape)?;
        debug!(resolver = %plan.name, kind = %plan.kind, "planned node resolver");
        Some(plan)
    }

    fn plan_resolver(
        &mut self,
        ext: &ObjectTypeExtensionInfo,
        member: &MemberInfo,
        shape: &ResolverShape,
    ) -> Option<ResolverPlan> {
        let kind = shape.kind()?;
        let ty = shape.value_type()?.clone();
        let arguments = self.plan_arguments(ext, member)?;
        let receiver = if member.is_static {
            Receiver::Static {
                declaring_type: ext.extension_type.clone(),
            }
        } else {
            Receiver::Parent {
                runtime_type: ext.runtime_type.clone(),
            }
        };
        Some(ResolverPlan {
            name: ResolverName::new(&ext.runtime_type, &member.name, arguments.len()),
            kind,
            receiver,
            arguments,
            ty,
        })
    }

    /// One slot per parameter in declaration order, or `None` after
    /// reporting why the parameters cannot be bound.
    fn plan_arguments(
        &mut self,
        ext: &ObjectTypeExtensionInfo,
        member: &MemberInfo,
    ) -> Option<ArgumentPlan> {
        let parameters = member.parameters();
        let mut valid = true;
        let mut names = HashSet::with_capacity(parameters.len());
        for param in parameters {
            if !names.insert(param.name.as_str()) {
                valid = false;
                self.diagnostics.report(
                    Diagnostic::error(format!("duplicate parameter '{}'", param.name))
                        .with_subject(&ext.runtime_type, &member.name)
                        .with_location(member.location.clone()),
                );
            }
            if !param.ty.is_well_formed() {
                valid = false;
                self.diagnostics.report(
                    Diagnostic::error(format!(
                        "parameter '{}' has malformed type '{}'",
                        param.name, param.ty
                    ))
                    .with_subject(&ext.runtime_type, &member.name)
                    .with_location(member.location.clone()),
                );
            }
        }
        valid.then(|| ArgumentPlan::from_parameters(parameters))
    }

    fn report_skip(
        &mut self,
        ext: &ObjectTypeExtensionInfo,
        member: &MemberInfo,
        reason: SkipReason,
    ) {
        let message = format!("member '{}' {} and is not exposed as a field", member.name, reason);
        match self.policy {
            UnsupportedMemberPolicy::Skip => {
                debug!(
                    type_name = %ext.runtime_type,
                    member = %member.name,
                    %reason,
                    "skipping member"
                );
            }
            UnsupportedMemberPolicy::Warn => {
                warn!(
                    type_name = %ext.runtime_type,
                    member = %member.name,
                    %reason,
                    "skipping member"
                );
                self.diagnostics.report(
                    Diagnostic::warning(message)
                        .with_subject(&ext.runtime_type, &member.name)
                        .with_location(member.location.clone()),
                );
            }
            UnsupportedMemberPolicy::Error => {
                self.diagnostics.report(
                    Diagnostic::error(message)
                        .with_subject(&ext.runtime_type, &member.name)
                        .with_location(member.location.clone()),
                );
            }
        }
    }
}
