//! Avro schema parsing and canonical JSON writing
//!
//! This library turns Avro schema JSON into a typed, fully resolved schema
//! tree. Named types (records, enums, fixed, errors) are tracked in a
//! registry so later parts of a document can refer to them by name, and a
//! top-level union may reference names declared by later branches.
//!
//! ```
//! use contrail::{parse_schema, SchemaNode, SchemaType};
//!
//! let schema = parse_schema(r#"["null", {"type": "long", "logicalType": "timestamp-millis"}]"#).unwrap();
//! assert_eq!(schema.tag(), SchemaType::Union);
//! ```

pub mod error;
pub mod schema;

pub use error::{SchemaError, SchemaResult};
pub use schema::{
    parse_schema, parse_schema_with_options, ArraySchema, EnumSchema, Field, FieldOrder,
    FixedSchema, LogicalSchema, LogicalTypeName, MapSchema, NamedReference, ParseOptions,
    PrimitiveSchema, PropertyMap, RecordSchema, Schema, SchemaName, SchemaNames, SchemaNode,
    SchemaParser, SchemaType, UnionSchema,
};
