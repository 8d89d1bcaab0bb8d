//! JSON schema parser for Avro schemas.
//!
//! Parses Avro schema JSON into the [`Schema`] tree, registering named
//! types as they are declared so later references resolve to them.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::error::{SchemaError, SchemaResult};
use crate::schema::retry::RetryQueue;
use crate::schema::tag::remove_quotes;
use crate::schema::{
    ArraySchema, EnumSchema, FixedSchema, LogicalSchema, MapSchema, ParseOptions,
    PrimitiveSchema, PropertyMap, RecordSchema, Schema, SchemaName, SchemaNames, SchemaNode,
    SchemaType, UnionSchema,
};

/// Parse an Avro schema from a JSON string.
///
/// # Arguments
/// * `json` - JSON string representing an Avro schema
///
/// # Returns
/// The parsed schema or a SchemaError
///
/// # Example
/// ```
/// use contrail::{parse_schema, SchemaNode, SchemaType};
///
/// let schema = parse_schema(r#""string""#).unwrap();
/// assert_eq!(schema.tag(), SchemaType::String);
/// ```
pub fn parse_schema(json: &str) -> SchemaResult<Arc<Schema>> {
    parse_schema_with_options(json, &ParseOptions::default())
}

/// Parse an Avro schema from a JSON string with validation options.
///
/// # Example
/// ```
/// use contrail::{parse_schema_with_options, ParseOptions};
///
/// let json = r#"{"type": "fixed", "name": "2fast", "size": 4}"#;
///
/// // Permissive mode - warnings only
/// assert!(parse_schema_with_options(json, &ParseOptions::default()).is_ok());
///
/// // Strict mode - fails on invalid names
/// assert!(parse_schema_with_options(json, &ParseOptions::new().strict()).is_err());
/// ```
pub fn parse_schema_with_options(json: &str, options: &ParseOptions) -> SchemaResult<Arc<Schema>> {
    SchemaParser::with_options(options.clone()).parse_str(json)
}

/// Schema parser with named type resolution context.
///
/// Owns the registry of named types for the document being parsed. A parser
/// can be seeded with a registry from earlier parses to resolve references
/// to types declared elsewhere.
#[derive(Debug, Default)]
pub struct SchemaParser {
    /// Registry of named types by their fully qualified name
    names: SchemaNames,
    options: ParseOptions,
    /// Current nesting depth of `parse_value`
    depth: usize,
}

impl SchemaParser {
    /// Create a new SchemaParser with default settings (permissive mode).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new SchemaParser with the given options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Use `names` as the registry, making its types resolvable by name.
    pub fn with_names(mut self, names: SchemaNames) -> Self {
        self.names = names;
        self
    }

    /// Get the registry of named types seen so far.
    pub fn names(&self) -> &SchemaNames {
        &self.names
    }

    pub(crate) fn names_mut(&mut self) -> &mut SchemaNames {
        &mut self.names
    }

    /// Take the registry, e.g. to seed another parser.
    pub fn into_names(self) -> SchemaNames {
        self.names
    }

    /// Get the options this parser was created with.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse a schema document.
    ///
    /// A bare primitive name (quoted or not) is recognized without running
    /// the JSON parser. A document that is a JSON array is a standalone
    /// union whose branches may refer to names declared by later branches.
    pub fn parse_str(&mut self, json: &str) -> SchemaResult<Arc<Schema>> {
        let json = json.trim();
        if json.is_empty() {
            return Err(SchemaError::InvalidArgument(
                "json must not be empty".to_string(),
            ));
        }

        if let Some(primitive) = PrimitiveSchema::new_instance(remove_quotes(json), None) {
            return Ok(Arc::new(Schema::Primitive(primitive)));
        }

        let value: Value = serde_json::from_str(json)
            .map_err(|e| SchemaError::Parse(format!("Could not parse. {}\n{}", e, json)))?;

        match value {
            Value::Array(branches) => {
                let committed = self.names.snapshot();
                let result = self.parse_union_document(branches);
                if result.is_err() {
                    self.names = committed;
                }
                result
            }
            value => self.parse_value(Some(&value), None),
        }
    }

    /// Parse the branches of a top-level union, retrying branches that
    /// refer to names declared further down the document.
    fn parse_union_document(&mut self, branches: Vec<Value>) -> SchemaResult<Arc<Schema>> {
        let mut queue = RetryQueue::new(branches);
        let mut parsed = Vec::new();

        while let Some(value) = queue.dequeue() {
            match self.parse_value(Some(&value), None) {
                Ok(schema) => {
                    parsed.push(schema);
                    queue.reset_failed();
                }
                Err(err) if value.is_object() && err.is_parse_error() => {
                    debug!(
                        pending = queue.len() + 1,
                        error = err.message(),
                        "Deferring union branch"
                    );
                    queue.add_failed(value, err.message().to_string());
                }
                Err(err) => return Err(err),
            }
        }

        if !queue.is_empty() {
            return Err(SchemaError::Parse(format!(
                "Can't parse schema: {}",
                queue.errors()
            )));
        }

        Ok(Arc::new(Schema::Union(UnionSchema::create(parsed, None)?)))
    }

    /// Parse a JSON value into a schema.
    ///
    /// `encspace` is the namespace enclosing the value; unqualified names
    /// declared or referenced inside it are qualified with it.
    ///
    /// A top-level call either succeeds or leaves the registry as it was:
    /// names declared (or reserved) by a failed parse are dropped again.
    pub fn parse_value(
        &mut self,
        value: Option<&Value>,
        encspace: Option<&str>,
    ) -> SchemaResult<Arc<Schema>> {
        if self.depth > 0 {
            return self.parse_nested(value, encspace);
        }

        let committed = self.names.snapshot();
        let result = self.parse_nested(value, encspace);
        if result.is_err() {
            self.names = committed;
        }
        result
    }

    fn parse_nested(
        &mut self,
        value: Option<&Value>,
        encspace: Option<&str>,
    ) -> SchemaResult<Arc<Schema>> {
        if self.depth >= self.options.max_depth {
            return Err(SchemaError::Parse(format!(
                "Schema nesting exceeds maximum depth of {}",
                self.options.max_depth
            )));
        }

        self.depth += 1;
        trace!(depth = self.depth, "Parsing schema value");
        let result = self.dispatch(value, encspace);
        self.depth -= 1;
        result
    }

    fn dispatch(
        &mut self,
        value: Option<&Value>,
        encspace: Option<&str>,
    ) -> SchemaResult<Arc<Schema>> {
        let value = match value {
            None | Some(Value::Null) => {
                return Err(SchemaError::InvalidArgument(
                    "value must not be null".to_string(),
                ))
            }
            Some(value) => value,
        };

        match value {
            // Primitive name or a reference to a named type
            Value::String(s) => match PrimitiveSchema::new_instance(s, None) {
                Some(primitive) => Ok(Arc::new(Schema::Primitive(primitive))),
                None => self.resolve_reference(s, encspace),
            },
            // Union without a 'type' attribute
            Value::Array(items) => {
                let union = UnionSchema::new_instance(self, items, None, encspace)?;
                Ok(Arc::new(Schema::Union(union)))
            }
            Value::Object(obj) => self.parse_object(obj, value, encspace),
            other => Err(SchemaError::Type(format!(
                "Invalid JSON for schema: {}",
                other
            ))),
        }
    }

    /// Parse a schema object, which must carry a `type` attribute.
    fn parse_object(
        &mut self,
        obj: &Map<String, Value>,
        value: &Value,
        encspace: Option<&str>,
    ) -> SchemaResult<Arc<Schema>> {
        let type_value = obj
            .get("type")
            .ok_or_else(|| SchemaError::Parse("Property type is required".to_string()))?;

        let props = PropertyMap::extract(obj);

        match type_value {
            Value::String(kind) => match kind.as_str() {
                "array" => {
                    let array = ArraySchema::new_instance(self, obj, props, encspace)?;
                    Ok(Arc::new(Schema::Array(array)))
                }
                "map" => {
                    let map = MapSchema::new_instance(self, obj, props, encspace)?;
                    Ok(Arc::new(Schema::Map(map)))
                }
                _ if obj.contains_key("logicalType") => {
                    LogicalSchema::new_instance(self, obj, props, encspace)
                }
                kind => match SchemaType::primitive(kind) {
                    Some(tag) => Ok(Arc::new(Schema::Primitive(
                        PrimitiveSchema::new(tag).with_props(props),
                    ))),
                    None => self.parse_named(obj, props, kind, encspace),
                },
            },
            Value::Array(items) => {
                let union = UnionSchema::new_instance(self, items, props, encspace)?;
                Ok(Arc::new(Schema::Union(union)))
            }
            Value::Object(_) => {
                if obj.contains_key("logicalType") {
                    return LogicalSchema::new_instance(self, obj, props, encspace);
                }

                // Primitives may be wrapped in an object to attach metadata
                let schema = self.parse_value(Some(type_value), encspace)?;
                if schema.is_primitive() {
                    Ok(schema)
                } else {
                    Err(SchemaError::Type(format!(
                        "Invalid JSON for schema: {}",
                        value
                    )))
                }
            }
            _ => Err(SchemaError::Type(format!(
                "Invalid JSON for schema: {}",
                value
            ))),
        }
    }

    /// Parse a named type declaration, or resolve `kind` as a reference to
    /// one declared earlier.
    ///
    /// Declared types are registered under their fully qualified name.
    /// Custom attributes next to a reference are ignored, since the
    /// referenced node is shared.
    pub(crate) fn parse_named(
        &mut self,
        obj: &Map<String, Value>,
        props: Option<PropertyMap>,
        kind: &str,
        encspace: Option<&str>,
    ) -> SchemaResult<Arc<Schema>> {
        if is_declaration_keyword(kind) {
            let schema = self.declare(obj, props, kind, encspace)?;
            return self.register(schema);
        }

        if let Some(props) = &props {
            warn!(
                reference = kind,
                ignored = props.len(),
                "Ignoring attributes on a named type reference"
            );
        }
        self.resolve_reference(kind, encspace)
    }

    /// Build the node declared by `obj` without registering it.
    ///
    /// A record or error has already reserved its name at this point.
    pub(crate) fn declare(
        &mut self,
        obj: &Map<String, Value>,
        props: Option<PropertyMap>,
        kind: &str,
        encspace: Option<&str>,
    ) -> SchemaResult<Schema> {
        match kind {
            "record" => Ok(Schema::Record(RecordSchema::new_instance(
                self,
                obj,
                props,
                encspace,
                SchemaType::Record,
            )?)),
            "error" => Ok(Schema::Record(RecordSchema::new_instance(
                self,
                obj,
                props,
                encspace,
                SchemaType::Error,
            )?)),
            "enum" => Ok(Schema::Enum(EnumSchema::new_instance(
                self, obj, props, encspace,
            )?)),
            "fixed" => Ok(Schema::Fixed(FixedSchema::new_instance(
                self, obj, props, encspace,
            )?)),
            other => Err(SchemaError::Parse(format!(
                "{} does not declare a named type",
                other
            ))),
        }
    }

    pub(crate) fn register(&mut self, schema: Schema) -> SchemaResult<Arc<Schema>> {
        let schema = Arc::new(schema);

        if let Some(name) = schema.schema_name() {
            if !self.names.add(name, Arc::clone(&schema)) {
                return Err(SchemaError::duplicate_name(name.fullname()));
            }
            debug!(fullname = name.fullname(), tag = %schema.tag(), "Registered named schema");
        }

        Ok(schema)
    }

    /// Resolve a reference to a previously declared named type.
    fn resolve_reference(&self, name: &str, encspace: Option<&str>) -> SchemaResult<Arc<Schema>> {
        self.names.try_resolve(name, encspace).ok_or_else(|| {
            SchemaError::Parse(format!(
                "Undefined name: {}",
                SchemaName::new(name, None, encspace)
            ))
        })
    }

    /// Validate that a name follows Avro naming rules.
    ///
    /// Avro names must:
    /// - Start with [A-Za-z_]
    /// - Contain only [A-Za-z0-9_]
    pub(crate) fn validate_name(&self, name: &str, context: &str) -> SchemaResult<()> {
        let mut chars = name.chars();
        let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

        if valid {
            Ok(())
        } else {
            self.rule_violation(format!(
                "{} name '{}' must start with a letter or underscore and contain only alphanumeric characters and underscores",
                context, name
            ))
        }
    }

    /// Fail in strict mode, warn otherwise.
    pub(crate) fn rule_violation(&self, message: String) -> SchemaResult<()> {
        if self.options.strict {
            Err(SchemaError::Parse(message))
        } else {
            warn!("{}", message);
            Ok(())
        }
    }
}

/// Type names that declare a new named type.
pub(crate) fn is_declaration_keyword(kind: &str) -> bool {
    matches!(kind, "record" | "error" | "enum" | "fixed")
}
