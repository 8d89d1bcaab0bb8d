//! Schema kind tags and their string tokens.

use std::fmt;

/// The kind of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    /// No value.
    Null,
    /// A binary value.
    Boolean,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit IEEE 754 floating-point.
    Float,
    /// 64-bit IEEE 754 floating-point.
    Double,
    /// Sequence of 8-bit unsigned bytes.
    Bytes,
    /// Unicode character sequence.
    String,
    /// Named collection of fields.
    Record,
    /// Enumeration of symbols.
    Enumeration,
    /// Array of values.
    Array,
    /// Map of values with string keys.
    Map,
    /// Union of branch schemas.
    Union,
    /// Fixed-length byte string.
    Fixed,
    /// Protocol error (a record declared with `"type": "error"`).
    Error,
    /// Logical type annotating a base schema.
    Logical,
}

impl SchemaType {
    /// The eight primitive kinds.
    pub const PRIMITIVES: [SchemaType; 8] = [
        SchemaType::Null,
        SchemaType::Boolean,
        SchemaType::Int,
        SchemaType::Long,
        SchemaType::Float,
        SchemaType::Double,
        SchemaType::Bytes,
        SchemaType::String,
    ];

    /// The token written in the `type` attribute of canonical JSON.
    ///
    /// This is the lowercase tag name, except that [`SchemaType::Enumeration`]
    /// is written as `"enum"`.
    pub fn type_string(self) -> &'static str {
        match self {
            SchemaType::Null => "null",
            SchemaType::Boolean => "boolean",
            SchemaType::Int => "int",
            SchemaType::Long => "long",
            SchemaType::Float => "float",
            SchemaType::Double => "double",
            SchemaType::Bytes => "bytes",
            SchemaType::String => "string",
            SchemaType::Record => "record",
            SchemaType::Enumeration => "enum",
            SchemaType::Array => "array",
            SchemaType::Map => "map",
            SchemaType::Union => "union",
            SchemaType::Fixed => "fixed",
            SchemaType::Error => "error",
            SchemaType::Logical => "logical",
        }
    }

    /// Parse a tag from its lowercase tag-name token.
    ///
    /// Matching is exact and case-sensitive. Note that the enumeration tag
    /// is spelled `"enumeration"` here, so `parse_type("enum", false)` is
    /// `None` even though [`type_string`](Self::type_string) writes `"enum"`.
    ///
    /// With `strip_quotes`, one leading and one trailing `"` are removed
    /// when both are present.
    ///
    /// # Example
    /// ```
    /// use contrail::SchemaType;
    ///
    /// assert_eq!(SchemaType::parse_type("\"int\"", true), Some(SchemaType::Int));
    /// assert_eq!(SchemaType::parse_type("enum", false), None);
    /// ```
    pub fn parse_type(token: &str, strip_quotes: bool) -> Option<SchemaType> {
        let token = if strip_quotes {
            remove_quotes(token)
        } else {
            token
        };

        match token {
            "enumeration" => Some(SchemaType::Enumeration),
            "record" => Some(SchemaType::Record),
            "array" => Some(SchemaType::Array),
            "map" => Some(SchemaType::Map),
            "union" => Some(SchemaType::Union),
            "fixed" => Some(SchemaType::Fixed),
            "error" => Some(SchemaType::Error),
            "logical" => Some(SchemaType::Logical),
            other => SchemaType::primitive(other),
        }
    }

    /// Look up one of the eight reserved primitive type names.
    pub fn primitive(name: &str) -> Option<SchemaType> {
        match name {
            "null" => Some(SchemaType::Null),
            "boolean" => Some(SchemaType::Boolean),
            "int" => Some(SchemaType::Int),
            "long" => Some(SchemaType::Long),
            "float" => Some(SchemaType::Float),
            "double" => Some(SchemaType::Double),
            "bytes" => Some(SchemaType::Bytes),
            "string" => Some(SchemaType::String),
            _ => None,
        }
    }

    /// Check if this tag is one of the primitive kinds.
    pub fn is_primitive(self) -> bool {
        SchemaType::PRIMITIVES.contains(&self)
    }

    /// Check if this tag is a named kind (record, enum, fixed, error).
    pub fn is_named(self) -> bool {
        matches!(
            self,
            SchemaType::Record | SchemaType::Enumeration | SchemaType::Fixed | SchemaType::Error
        )
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_string())
    }
}

pub(crate) fn remove_quotes(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
