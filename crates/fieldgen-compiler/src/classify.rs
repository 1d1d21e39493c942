use std::fmt;

use fieldgen_common::{MemberInfo, MemberKind, ResolverKind, ReturnType, TypeRef};

/// Why a member produces no dispatch function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Method returning nothing.
    Void,
    /// Method returning a reference-like value.
    ByRef,
    /// Method returning a future with no payload.
    BareFuture,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::Void => "returns no value",
            SkipReason::ByRef => "returns by reference",
            SkipReason::BareFuture => "returns a future without a result",
        };
        f.write_str(s)
    }
}

/// The dispatch shape of one member, with the GraphQL-facing value type
/// for members that become resolvers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverShape {
    Sync(TypeRef),
    Async(TypeRef),
    Property(TypeRef),
    Skip(SkipReason),
}

impl ResolverShape {
    /// The resolver kind, or `None` for skipped members.
    pub fn kind(&self) -> Option<ResolverKind> {
        match self {
            ResolverShape::Sync(_) => Some(ResolverKind::Sync),
            ResolverShape::Async(_) => Some(ResolverKind::Async),
            ResolverShape::Property(_) => Some(ResolverKind::Property),
            ResolverShape::Skip(_) => None,
        }
    }

    pub fn value_type(&self) -> Option<&TypeRef> {
        match self {
            ResolverShape::Sync(ty) | ResolverShape::Async(ty) | ResolverShape::Property(ty) => {
                Some(ty)
            }
            ResolverShape::Skip(_) => None,
        }
    }
}

/// Decide the dispatch shape of a member. Pure; the same member always
/// classifies the same way.
pub fn classify(member: &MemberInfo) -> ResolverShape {
    match &member.kind {
        MemberKind::Property { ty } => ResolverShape::Property(ty.clone()),
        MemberKind::Method { returns, .. } => match returns {
            ReturnType::Future(Some(ty)) => ResolverShape::Async(ty.clone()),
            ReturnType::Future(None) => ResolverShape::Skip(SkipReason::BareFuture),
            ReturnType::Void => ResolverShape::Skip(SkipReason::Void),
            ReturnType::ByRef(_) => ResolverShape::Skip(SkipReason::ByRef),
            ReturnType::Value(ty) => ResolverShape::Sync(ty.clone()),
        },
    }
}

#[cfg(test)]
mod tests {
    use fieldgen_common::ParameterInfo;

    use super::*;

    #[test]
    fn value_method_is_sync() {
        let m = MemberInfo::method("GetName", ReturnType::value("String!"));
        assert_eq!(classify(&m), ResolverShape::Sync(TypeRef::new("String!")));
        assert_eq!(classify(&m).kind(), Some(ResolverKind::Sync));
    }

    #[test]
    fn future_with_payload_is_async() {
        let m = MemberInfo::method("FetchReviewsAsync", ReturnType::future("[Review!]!"))
            .with_parameter(ParameterInfo::argument("limit", "Int!"));
        assert_eq!(classify(&m), ResolverShape::Async(TypeRef::new("[Review!]!")));
    }

    #[test]
    fn property_is_property() {
        let m = MemberInfo::property("Price", "Float!");
        assert_eq!(classify(&m).kind(), Some(ResolverKind::Property));
        assert_eq!(classify(&m).value_type(), Some(&TypeRef::new("Float!")));
    }

    #[test]
    fn unsupported_methods_are_skipped() {
        let void = MemberInfo::method("Touch", ReturnType::Void);
        assert_eq!(classify(&void), ResolverShape::Skip(SkipReason::Void));
        let by_ref = MemberInfo::method("Span", ReturnType::ByRef(TypeRef::new("String")));
        assert_eq!(classify(&by_ref), ResolverShape::Skip(SkipReason::ByRef));
        let bare = MemberInfo::method("SaveAsync", ReturnType::bare_future());
        assert_eq!(classify(&bare), ResolverShape::Skip(SkipReason::BareFuture));
        assert!(classify(&bare).kind().is_none());
        assert!(classify(&bare).value_type().is_none());
    }

    #[test]
    fn static_flag_does_not_change_shape() {
        let m = MemberInfo::method("Version", ReturnType::value("String")).into_static();
        assert_eq!(classify(&m), ResolverShape::Sync(TypeRef::new("String")));
    }
}
