//! Error types for schema parsing

use thiserror::Error;

/// Errors that can occur while parsing a schema document.
///
/// Every failure surfaced by the parser is one of three kinds. The
/// message carried by each variant is what the forward-reference retry
/// queue records and aggregates, so it never repeats the kind prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A required input was missing (null value, empty document)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Structurally valid JSON that breaks the schema language rules
    #[error("Schema parse error: {0}")]
    Parse(String),
    /// JSON whose shape cannot be interpreted as any schema form
    #[error("Schema type error: {0}")]
    Type(String),
}

/// Result alias used throughout the schema module
pub type SchemaResult<T> = Result<T, SchemaError>;

impl SchemaError {
    /// The bare message, without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            SchemaError::InvalidArgument(msg) | SchemaError::Parse(msg) | SchemaError::Type(msg) => {
                msg
            }
        }
    }

    /// Whether this is a [`SchemaError::Parse`].
    pub fn is_parse_error(&self) -> bool {
        matches!(self, SchemaError::Parse(_))
    }

    pub(crate) fn duplicate_name(fullname: &str) -> Self {
        SchemaError::Parse(format!("Duplicate schema name {}", fullname))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = SchemaError::Parse("Property type is required".to_string());
        assert_eq!(
            err.to_string(),
            "Schema parse error: Property type is required"
        );
        assert_eq!(err.message(), "Property type is required");
    }

    #[test]
    fn test_is_parse_error() {
        assert!(SchemaError::duplicate_name("a.B").is_parse_error());
        assert!(!SchemaError::Type("x".to_string()).is_parse_error());
        assert!(!SchemaError::InvalidArgument("x".to_string()).is_parse_error());
    }
}
