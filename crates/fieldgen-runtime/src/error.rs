use std::sync::Arc;

use thiserror::Error;

/// Why a single field dispatch failed.
///
/// Every variant aborts only the field being resolved; none is retried.
#[derive(Error, Debug, Clone)]
pub enum ResolverError {
    /// The context could not produce a parent of the expected runtime type.
    /// Indicates a schema/registration mismatch.
    #[error("receiver mismatch: expected parent of type '{expected}', found {found}")]
    ReceiverMismatch { expected: String, found: String },

    #[error("argument error: slot {slot} ('{name}'): {message}")]
    Argument {
        slot: usize,
        name: String,
        message: String,
    },

    #[error("type error: {0}")]
    TypeError(String),

    #[error("resolver cancelled")]
    Cancelled,

    /// Failure reported by the resolver member itself.
    #[error("{message}")]
    Failed {
        message: String,
        code: Option<String>,
    },

    #[error(transparent)]
    External(Arc<dyn std::error::Error + Send + Sync>),
}

impl ResolverError {
    pub fn failed(message: impl Into<String>) -> Self {
        ResolverError::Failed {
            message: message.into(),
            code: None,
        }
    }

    pub fn failed_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        ResolverError::Failed {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    pub fn external<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ResolverError::External(Arc::new(error))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ResolverError::Cancelled)
    }
}

/// Errors raised while wiring dispatch functions onto type descriptors.
/// These are build-time failures, never produced inside a dispatch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("type mismatch: initializer for '{expected}' applied to descriptor of '{found}'")]
    TypeMismatch { expected: String, found: String },

    #[error("field error: no field '{field}' declared on {type_name}")]
    UnknownField { type_name: String, field: String },

    #[error("duplicate resolver '{type_name}.{member}'")]
    DuplicateResolver { type_name: String, member: String },

    #[error("configure failed: {0}")]
    Configure(String),
}

pub type Result<T> = std::result::Result<T, ResolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receiver_mismatch_display() {
        let e = ResolverError::ReceiverMismatch {
            expected: "Product".to_string(),
            found: "'Review'".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "receiver mismatch: expected parent of type 'Product', found 'Review'"
        );
    }

    #[test]
    fn failed_displays_message_verbatim() {
        let e = ResolverError::failed_with_code("out of stock", "STOCK");
        assert_eq!(e.to_string(), "out of stock");
        assert!(matches!(e, ResolverError::Failed { code: Some(ref c), .. } if c == "STOCK"));
    }

    #[test]
    fn external_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let e = ResolverError::external(io);
        assert_eq!(e.to_string(), "disk gone");
    }

    #[test]
    fn unknown_field_display() {
        let e = RegistrationError::UnknownField {
            type_name: "Product".to_string(),
            field: "sku".to_string(),
        };
        assert_eq!(e.to_string(), "field error: no field 'sku' declared on Product");
    }
}
