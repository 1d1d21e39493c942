use serde::{Deserialize, Serialize};

/// Where a member was declared, as reported by the static-analysis pass
/// that produced the descriptors (1-based line/column).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file path.
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_file_line_column() {
        let loc = SourceLocation::new("src/product.rs", 12, 5);
        assert_eq!(loc.to_string(), "src/product.rs:12:5");
    }

    #[test]
    fn deserializes_from_json() {
        let loc: SourceLocation =
            serde_json::from_str(r#"{"file":"a.rs","line":3,"column":1}"#).unwrap();
        assert_eq!(loc, SourceLocation::new("a.rs", 3, 1));
    }
}
