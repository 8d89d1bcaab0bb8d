//! Avro schema types and parsing.
//!
//! This module defines the schema tree, the named-type registry, the JSON
//! parser that builds the tree and the writer that turns it back into
//! canonical JSON.

mod logical;
mod named;
mod names;
mod options;
mod parser;
mod properties;
mod retry;
mod tag;
mod types;
mod writer;

pub use logical::{LogicalSchema, LogicalTypeName};
pub use named::{EnumSchema, Field, FieldOrder, FixedSchema, RecordSchema};
pub use names::{SchemaName, SchemaNames};
pub use options::{ParseOptions, DEFAULT_MAX_DEPTH};
pub use parser::{parse_schema, parse_schema_with_options, SchemaParser};
pub use properties::PropertyMap;
pub use tag::SchemaType;
pub use types::{
    ArraySchema, MapSchema, NamedReference, PrimitiveSchema, Schema, SchemaNode, UnionSchema,
};
