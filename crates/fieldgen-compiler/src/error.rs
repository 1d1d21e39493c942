use fieldgen_common::{Diagnostic, ResolverKind};
use fieldgen_runtime::RegistrationError;

/// Errors that stop a compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error(
        "extension '{type_name}' has {} error(s)",
        .diagnostics.iter().filter(|d| d.is_error()).count()
    )]
    Diagnostics {
        type_name: String,
        /// Every diagnostic of the failed plan, warnings included.
        diagnostics: Vec<Diagnostic>,
    },

    #[error("no binding supplied for member '{member}' of {type_name}")]
    MissingBinding { type_name: String, member: String },

    #[error("binding for '{resolver}' is {found} but the member is {expected}")]
    BindingMismatch {
        resolver: String,
        expected: ResolverKind,
        found: ResolverKind,
    },

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

impl CompileError {
    /// Diagnostics carried by the error, if it came from planning.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CompileError::Diagnostics { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
