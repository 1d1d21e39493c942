pub mod config;
pub mod descriptor;
pub mod errors;
pub mod ir;
pub mod location;
pub mod plan;
pub mod types;

pub use descriptor::{
    MemberInfo, MemberKind, ObjectTypeExtensionInfo, ParameterInfo, ParameterSource,
    ResolverName, ReturnType,
};
pub use errors::{Diagnostic, DiagnosticBag, Severity};
pub use ir::DispatchManifest;
pub use location::SourceLocation;
pub use plan::{ArgumentPlan, ArgumentSlot, Receiver, ResolverKind};
pub use types::TypeRef;
