//! Named schema kinds: records, errors, enums and fixed.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::error::{SchemaError, SchemaResult};
use crate::schema::properties::RESERVED_FIELD_KEYS;
use crate::schema::{PropertyMap, Schema, SchemaName, SchemaNames, SchemaNode, SchemaParser, SchemaType};

/// Attributes shared by every named kind.
struct NamedHeader {
    name: SchemaName,
    aliases: Vec<SchemaName>,
    doc: Option<String>,
}

impl NamedHeader {
    fn parse(
        parser: &SchemaParser,
        obj: &Map<String, Value>,
        encspace: Option<&str>,
        kind: &str,
    ) -> SchemaResult<Self> {
        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::Parse(format!("{} does not have 'name'", kind)))?;

        let namespace = match obj.get("namespace") {
            None | Some(Value::Null) => None,
            Some(Value::String(ns)) => Some(ns.as_str()),
            Some(other) => {
                return Err(SchemaError::Parse(format!(
                    "{} namespace must be a string, found {}",
                    kind, other
                )))
            }
        };

        let name = SchemaName::new(name, namespace, encspace);
        parser.validate_name(name.name(), kind)?;
        if let Some(ns) = name.namespace() {
            for part in ns.split('.') {
                parser.validate_name(part, "Namespace")?;
            }
        }

        let aliases = match obj.get("aliases") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|alias| {
                    alias
                        .as_str()
                        .map(|a| SchemaName::new(a, None, name.namespace()))
                        .ok_or_else(|| {
                            SchemaError::Parse(format!(
                                "Aliases of {} must be strings, found {}",
                                name, alias
                            ))
                        })
                })
                .collect::<SchemaResult<Vec<_>>>()?,
            Some(other) => {
                return Err(SchemaError::Parse(format!(
                    "Aliases of {} must be an array, found {}",
                    name, other
                )))
            }
        };

        let doc = obj.get("doc").and_then(Value::as_str).map(String::from);

        Ok(Self { name, aliases, doc })
    }
}

fn write_header(
    obj: &mut Map<String, Value>,
    name: &SchemaName,
    aliases: &[SchemaName],
    doc: Option<&str>,
    encspace: Option<&str>,
) {
    obj.insert("name".to_string(), json!(name.name()));

    if name.namespace() != encspace {
        // An empty namespace switches back to the null namespace
        obj.insert(
            "namespace".to_string(),
            json!(name.namespace().unwrap_or("")),
        );
    }

    if let Some(doc) = doc {
        obj.insert("doc".to_string(), json!(doc));
    }

    if !aliases.is_empty() {
        let aliases: Vec<&str> = aliases
            .iter()
            .map(|alias| alias.relative_to(name.namespace()))
            .collect();
        obj.insert("aliases".to_string(), json!(aliases));
    }
}

/// Schema for a fixed-size byte array.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSchema {
    pub(crate) name: SchemaName,
    /// Alternate names for this type.
    pub aliases: Vec<SchemaName>,
    /// Optional documentation.
    pub doc: Option<String>,
    /// The size in bytes.
    pub size: usize,
    pub(crate) props: Option<PropertyMap>,
}

impl FixedSchema {
    /// Create a new FixedSchema with the given name and size.
    pub fn new(name: SchemaName, size: usize) -> Self {
        Self {
            name,
            aliases: Vec::new(),
            doc: None,
            size,
            props: None,
        }
    }

    pub fn schema_name(&self) -> &SchemaName {
        &self.name
    }

    pub(crate) fn new_instance(
        parser: &SchemaParser,
        obj: &Map<String, Value>,
        props: Option<PropertyMap>,
        encspace: Option<&str>,
    ) -> SchemaResult<Self> {
        let header = NamedHeader::parse(parser, obj, encspace, "Fixed")?;

        let size = obj
            .get("size")
            .and_then(Value::as_u64)
            .and_then(|size| usize::try_from(size).ok())
            .ok_or_else(|| {
                SchemaError::Parse(format!(
                    "Fixed {} must have a non-negative integer 'size'",
                    header.name
                ))
            })?;

        Ok(Self {
            name: header.name,
            aliases: header.aliases,
            doc: header.doc,
            size,
            props,
        })
    }
}

impl SchemaNode for FixedSchema {
    fn tag(&self) -> SchemaType {
        SchemaType::Fixed
    }

    fn props(&self) -> Option<&PropertyMap> {
        self.props.as_ref()
    }

    fn name(&self) -> &str {
        self.name.name()
    }

    fn fullname(&self) -> &str {
        self.name.fullname()
    }

    fn write_fields(
        &self,
        obj: &mut Map<String, Value>,
        _names: &mut SchemaNames,
        encspace: Option<&str>,
    ) {
        write_header(obj, &self.name, &self.aliases, self.doc.as_deref(), encspace);
        obj.insert("size".to_string(), json!(self.size));
    }
}

/// Schema for an enumeration type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    pub(crate) name: SchemaName,
    /// Alternate names for this type.
    pub aliases: Vec<SchemaName>,
    /// Optional documentation.
    pub doc: Option<String>,
    /// The symbols of the enum, in declaration order.
    pub symbols: Vec<String>,
    /// Default symbol (for schema resolution).
    pub default: Option<String>,
    pub(crate) props: Option<PropertyMap>,
}

impl EnumSchema {
    /// Create a new EnumSchema with the given name and symbols.
    pub fn new(name: SchemaName, symbols: Vec<String>) -> Self {
        Self {
            name,
            aliases: Vec::new(),
            doc: None,
            symbols,
            default: None,
            props: None,
        }
    }

    pub fn schema_name(&self) -> &SchemaName {
        &self.name
    }

    /// Get the index of a symbol.
    pub fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    pub(crate) fn new_instance(
        parser: &SchemaParser,
        obj: &Map<String, Value>,
        props: Option<PropertyMap>,
        encspace: Option<&str>,
    ) -> SchemaResult<Self> {
        let header = NamedHeader::parse(parser, obj, encspace, "Enum")?;

        let symbols = obj
            .get("symbols")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                SchemaError::Parse(format!("Enum {} does not have 'symbols'", header.name))
            })?
            .iter()
            .map(|symbol| {
                symbol.as_str().map(String::from).ok_or_else(|| {
                    SchemaError::Parse(format!(
                        "Symbols of enum {} must be strings, found {}",
                        header.name, symbol
                    ))
                })
            })
            .collect::<SchemaResult<Vec<_>>>()?;

        if symbols.is_empty() {
            return Err(SchemaError::Parse(format!(
                "Enum {} must have at least one symbol",
                header.name
            )));
        }

        let mut seen = HashSet::new();
        for symbol in &symbols {
            if !seen.insert(symbol.as_str()) {
                return Err(SchemaError::Parse(format!(
                    "Duplicate symbol {} in enum {}",
                    symbol, header.name
                )));
            }
            parser.validate_name(symbol, "Enum symbol")?;
        }

        let default = match obj.get("default") {
            None | Some(Value::Null) => None,
            Some(Value::String(default)) if symbols.contains(default) => Some(default.clone()),
            Some(other) => {
                return Err(SchemaError::Parse(format!(
                    "Default {} is not a symbol of enum {}",
                    other, header.name
                )))
            }
        };

        Ok(Self {
            name: header.name,
            aliases: header.aliases,
            doc: header.doc,
            symbols,
            default,
            props,
        })
    }
}

impl SchemaNode for EnumSchema {
    fn tag(&self) -> SchemaType {
        SchemaType::Enumeration
    }

    fn props(&self) -> Option<&PropertyMap> {
        self.props.as_ref()
    }

    fn name(&self) -> &str {
        self.name.name()
    }

    fn fullname(&self) -> &str {
        self.name.fullname()
    }

    fn write_fields(
        &self,
        obj: &mut Map<String, Value>,
        _names: &mut SchemaNames,
        encspace: Option<&str>,
    ) {
        write_header(obj, &self.name, &self.aliases, self.doc.as_deref(), encspace);
        obj.insert("symbols".to_string(), json!(&self.symbols));

        if let Some(default) = &self.default {
            obj.insert("default".to_string(), json!(default));
        }
    }
}

/// Schema for a record (or protocol error) type.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub(crate) name: SchemaName,
    /// Alternate names for this type.
    pub aliases: Vec<SchemaName>,
    /// Optional documentation.
    pub doc: Option<String>,
    /// The fields of the record, in declaration order.
    pub fields: Vec<Field>,
    is_error: bool,
    pub(crate) props: Option<PropertyMap>,
}

impl RecordSchema {
    /// Create a new RecordSchema with the given name and fields.
    pub fn new(name: SchemaName, fields: Vec<Field>) -> Self {
        Self {
            name,
            aliases: Vec::new(),
            doc: None,
            fields,
            is_error: false,
            props: None,
        }
    }

    /// Mark this record as a protocol error.
    pub fn into_error(mut self) -> Self {
        self.is_error = true;
        self
    }

    pub fn schema_name(&self) -> &SchemaName {
        &self.name
    }

    /// Get a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub(crate) fn new_instance(
        parser: &mut SchemaParser,
        obj: &Map<String, Value>,
        props: Option<PropertyMap>,
        encspace: Option<&str>,
        tag: SchemaType,
    ) -> SchemaResult<Self> {
        let kind = if tag == SchemaType::Error {
            "Error"
        } else {
            "Record"
        };
        let header = NamedHeader::parse(parser, obj, encspace, kind)?;

        let fields_json = obj.get("fields").and_then(Value::as_array).ok_or_else(|| {
            SchemaError::Parse(format!("{} {} does not have 'fields'", kind, header.name))
        })?;

        // Fields may refer back to the record being defined
        if !parser.names_mut().reserve(&header.name, tag) {
            return Err(SchemaError::duplicate_name(header.name.fullname()));
        }

        let record_space = header.name.namespace().map(str::to_owned);
        let mut fields = Vec::with_capacity(fields_json.len());
        for (position, field) in fields_json.iter().enumerate() {
            let field = Field::parse(parser, field, position, record_space.as_deref())?;
            if fields.iter().any(|f: &Field| f.name == field.name) {
                return Err(SchemaError::Parse(format!(
                    "Duplicate field name {} in {} {}",
                    field.name,
                    kind.to_lowercase(),
                    header.name
                )));
            }
            fields.push(field);
        }

        Ok(Self {
            name: header.name,
            aliases: header.aliases,
            doc: header.doc,
            fields,
            is_error: tag == SchemaType::Error,
            props,
        })
    }
}

impl SchemaNode for RecordSchema {
    fn tag(&self) -> SchemaType {
        if self.is_error {
            SchemaType::Error
        } else {
            SchemaType::Record
        }
    }

    fn props(&self) -> Option<&PropertyMap> {
        self.props.as_ref()
    }

    fn name(&self) -> &str {
        self.name.name()
    }

    fn fullname(&self) -> &str {
        self.name.fullname()
    }

    fn write_fields(
        &self,
        obj: &mut Map<String, Value>,
        names: &mut SchemaNames,
        encspace: Option<&str>,
    ) {
        write_header(obj, &self.name, &self.aliases, self.doc.as_deref(), encspace);

        let fields: Vec<Value> = self
            .fields
            .iter()
            .map(|f| f.write_json(names, self.name.namespace()))
            .collect();
        obj.insert("fields".to_string(), Value::Array(fields));
    }
}

/// Field ordering for record comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldOrder {
    #[default]
    Ascending,
    Descending,
    Ignore,
}

impl FieldOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ascending" => Some(FieldOrder::Ascending),
            "descending" => Some(FieldOrder::Descending),
            "ignore" => Some(FieldOrder::Ignore),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldOrder::Ascending => "ascending",
            FieldOrder::Descending => "descending",
            FieldOrder::Ignore => "ignore",
        }
    }
}

/// A field within a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// The name of the field.
    pub name: String,
    /// The schema of the field's value.
    pub schema: Arc<Schema>,
    /// Position of the field within its record.
    pub position: usize,
    /// Optional default value for the field.
    pub default: Option<Value>,
    /// Optional documentation.
    pub doc: Option<String>,
    /// Field ordering (ascending, descending, ignore).
    pub order: FieldOrder,
    /// Aliases for this field.
    pub aliases: Vec<String>,
    props: Option<PropertyMap>,
}

impl Field {
    /// Create a new Field with the given name and schema.
    pub fn new(name: impl Into<String>, schema: Arc<Schema>, position: usize) -> Self {
        Self {
            name: name.into(),
            schema,
            position,
            default: None,
            doc: None,
            order: FieldOrder::Ascending,
            aliases: Vec::new(),
            props: None,
        }
    }

    /// Set the default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Custom attributes of the field.
    pub fn props(&self) -> Option<&PropertyMap> {
        self.props.as_ref()
    }

    fn parse(
        parser: &mut SchemaParser,
        value: &Value,
        position: usize,
        encspace: Option<&str>,
    ) -> SchemaResult<Self> {
        let obj = value.as_object().ok_or_else(|| {
            SchemaError::Parse(format!("Field must be an object, found {}", value))
        })?;

        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::Parse(format!("No 'name' in field {}", value)))?
            .to_string();
        parser.validate_name(&name, "Field")?;

        let type_value = obj.get("type").ok_or_else(|| {
            SchemaError::Parse(format!("Field {} does not have 'type'", name))
        })?;
        let schema = parser.parse_value(Some(type_value), encspace)?;

        let order = match obj.get("order").and_then(Value::as_str) {
            None => FieldOrder::Ascending,
            Some(order) => match FieldOrder::parse(order) {
                Some(order) => order,
                None => {
                    parser.rule_violation(format!(
                        "Field {} has unknown order '{}'",
                        name, order
                    ))?;
                    FieldOrder::Ascending
                }
            },
        };

        let aliases = obj
            .get("aliases")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            name,
            schema,
            position,
            default: obj.get("default").cloned(),
            doc: obj.get("doc").and_then(Value::as_str).map(String::from),
            order,
            aliases,
            props: PropertyMap::extract_excluding(obj, RESERVED_FIELD_KEYS),
        })
    }

    fn write_json(&self, names: &mut SchemaNames, encspace: Option<&str>) -> Value {
        let mut obj = Map::new();
        obj.insert("name".to_string(), json!(&self.name));
        obj.insert("type".to_string(), self.schema.write_json(names, encspace));

        if let Some(doc) = &self.doc {
            obj.insert("doc".to_string(), json!(doc));
        }

        if let Some(default) = &self.default {
            obj.insert("default".to_string(), default.clone());
        }

        if self.order != FieldOrder::Ascending {
            obj.insert("order".to_string(), json!(self.order.as_str()));
        }

        if !self.aliases.is_empty() {
            obj.insert("aliases".to_string(), json!(&self.aliases));
        }

        if let Some(props) = &self.props {
            props.write_into(&mut obj);
        }

        Value::Object(obj)
    }
}
