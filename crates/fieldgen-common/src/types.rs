use serde::{Deserialize, Serialize};

/// A declared type in GraphQL notation: `Int`, `String!`, `[Review!]`.
///
/// The compiler never interprets types beyond this notation. Matching a
/// runtime value against a declared type is the call context's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(String);

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the type text is well formed: non-empty, balanced list
    /// brackets, and `!` only as a suffix of a named or list type.
    pub fn is_well_formed(&self) -> bool {
        fn check(s: &str) -> bool {
            let s = s.strip_suffix('!').unwrap_or(s);
            if let Some(inner) = s.strip_prefix('[') {
                return match inner.strip_suffix(']') {
                    Some(item) => check(item),
                    None => false,
                };
            }
            !s.is_empty()
                && s.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        }
        check(self.0.trim())
    }

    pub fn is_non_null(&self) -> bool {
        self.0.ends_with('!')
    }

    /// The same type with a trailing `!` removed.
    pub fn nullable(&self) -> TypeRef {
        TypeRef(self.0.strip_suffix('!').unwrap_or(&self.0).to_string())
    }

    /// For a list type `[T]` (nullable or not), the item type `T`.
    pub fn list_item(&self) -> Option<TypeRef> {
        let s = self.0.strip_suffix('!').unwrap_or(&self.0);
        s.strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .map(|item| TypeRef(item.to_string()))
    }

    /// The innermost named type, with list brackets and `!` removed.
    pub fn named(&self) -> &str {
        self.0.trim_matches(|c| c == '[' || c == ']' || c == '!')
    }
}

impl From<&str> for TypeRef {
    fn from(value: &str) -> Self {
        TypeRef::new(value)
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_null_and_nullable() {
        let t = TypeRef::new("Int!");
        assert!(t.is_non_null());
        assert_eq!(t.nullable(), TypeRef::new("Int"));
        assert!(!TypeRef::new("Int").is_non_null());
    }

    #[test]
    fn list_item_of_non_null_list() {
        let t = TypeRef::new("[Review!]!");
        assert_eq!(t.list_item(), Some(TypeRef::new("Review!")));
        assert_eq!(t.named(), "Review");
        assert_eq!(TypeRef::new("Review").list_item(), None);
    }

    #[test]
    fn well_formed_types() {
        assert!(TypeRef::new("Int").is_well_formed());
        assert!(TypeRef::new("[[String!]]!").is_well_formed());
        assert!(!TypeRef::new("").is_well_formed());
        assert!(!TypeRef::new("[Int").is_well_formed());
        assert!(!TypeRef::new("Int!!").is_well_formed());
        assert!(!TypeRef::new("Map<K, V>").is_well_formed());
    }
}
