pub mod classify;
pub mod compiler;
pub mod error;
pub mod plan;
pub mod register;
pub mod synthesize;

pub use classify::{classify, ResolverShape, SkipReason};
pub use compiler::{CompiledSchema, Compiler};
pub use error::CompileError;
pub use plan::{ExtensionPlan, ResolverPlan, SkippedMember};
pub use register::{CompiledExtension, InitStep};
