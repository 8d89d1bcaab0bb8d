//! Schema node types.
//!
//! A parsed schema is a tree of [`Schema`] nodes. Every node exposes the
//! shared [`SchemaNode`] interface; the concrete kinds add their own fields.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{SchemaError, SchemaResult};
use crate::schema::{
    EnumSchema, FixedSchema, LogicalSchema, PropertyMap, RecordSchema, SchemaName, SchemaNames,
    SchemaParser, SchemaType,
};

/// Behavior shared by every schema kind.
pub trait SchemaNode {
    /// The kind of this schema.
    fn tag(&self) -> SchemaType;

    /// Custom attributes, `None` when the node has none.
    fn props(&self) -> Option<&PropertyMap>;

    /// The declared name for named kinds, otherwise the type's own name
    /// (e.g. `"int"`, `"array"`).
    fn name(&self) -> &str;

    /// The namespace-qualified name for named kinds, otherwise [`name`](Self::name).
    fn fullname(&self) -> &str {
        self.name()
    }

    /// Write the kind-specific members of this schema's JSON object.
    fn write_fields(
        &self,
        _obj: &mut Map<String, Value>,
        _names: &mut SchemaNames,
        _encspace: Option<&str>,
    ) {
    }

    /// Whether data written with `writer` can be read with this schema.
    ///
    /// The base rule only compares tags.
    fn can_read(&self, writer: &Schema) -> bool {
        self.tag() == writer.tag()
    }
}

/// A parsed Avro schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// One of the eight primitive types.
    Primitive(PrimitiveSchema),
    /// Array of items with a single schema.
    Array(ArraySchema),
    /// Map with string keys and values of a single schema.
    Map(MapSchema),
    /// Union of branch schemas.
    Union(UnionSchema),
    /// Fixed-size byte array.
    Fixed(FixedSchema),
    /// Enumeration type.
    Enum(EnumSchema),
    /// Record or protocol error.
    Record(RecordSchema),
    /// Logical type wrapping a base schema.
    Logical(LogicalSchema),
    /// Recursive reference to an enclosing record that was still being
    /// defined where the reference appeared.
    Reference(NamedReference),
}

impl Schema {
    fn node(&self) -> &dyn SchemaNode {
        match self {
            Schema::Primitive(s) => s,
            Schema::Array(s) => s,
            Schema::Map(s) => s,
            Schema::Union(s) => s,
            Schema::Fixed(s) => s,
            Schema::Enum(s) => s,
            Schema::Record(s) => s,
            Schema::Logical(s) => s,
            Schema::Reference(s) => s,
        }
    }

    /// The schema name of a named kind (or of a recursive reference).
    pub fn schema_name(&self) -> Option<&SchemaName> {
        match self {
            Schema::Fixed(s) => Some(&s.name),
            Schema::Enum(s) => Some(&s.name),
            Schema::Record(s) => Some(&s.name),
            Schema::Reference(s) => Some(&s.name),
            _ => None,
        }
    }

    /// Check if this schema is a primitive type.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Schema::Primitive(_))
    }

    /// Check if this schema is a named type (record, enum, fixed, error).
    pub fn is_named(&self) -> bool {
        matches!(self, Schema::Fixed(_) | Schema::Enum(_) | Schema::Record(_))
    }

    /// Get a custom property by key.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.props().and_then(|props| props.get(key))
    }

    /// Replace the custom properties of this node.
    ///
    /// Recursive references carry no properties and are returned unchanged.
    pub(crate) fn with_props(mut self, props: Option<PropertyMap>) -> Self {
        match &mut self {
            Schema::Primitive(s) => s.props = props,
            Schema::Array(s) => s.props = props,
            Schema::Map(s) => s.props = props,
            Schema::Union(s) => s.props = props,
            Schema::Fixed(s) => s.props = props,
            Schema::Enum(s) => s.props = props,
            Schema::Record(s) => s.props = props,
            Schema::Logical(s) => s.props = props,
            Schema::Reference(_) => {}
        }
        self
    }
}

impl SchemaNode for Schema {
    fn tag(&self) -> SchemaType {
        self.node().tag()
    }

    fn props(&self) -> Option<&PropertyMap> {
        self.node().props()
    }

    fn name(&self) -> &str {
        self.node().name()
    }

    fn fullname(&self) -> &str {
        self.node().fullname()
    }

    fn write_fields(
        &self,
        obj: &mut Map<String, Value>,
        names: &mut SchemaNames,
        encspace: Option<&str>,
    ) {
        self.node().write_fields(obj, names, encspace)
    }

    fn can_read(&self, writer: &Schema) -> bool {
        self.node().can_read(writer)
    }
}

/// A primitive type, optionally carrying custom properties.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveSchema {
    tag: SchemaType,
    props: Option<PropertyMap>,
}

impl PrimitiveSchema {
    /// Create a primitive schema without properties.
    ///
    /// `tag` must be one of [`SchemaType::PRIMITIVES`].
    pub fn new(tag: SchemaType) -> Self {
        debug_assert!(tag.is_primitive(), "{} is not a primitive type", tag);
        Self { tag, props: None }
    }

    /// Create a primitive schema from its type name.
    ///
    /// Returns `None` if `name` is not one of the eight primitive names.
    pub fn new_instance(name: &str, props: Option<PropertyMap>) -> Option<Self> {
        SchemaType::primitive(name).map(|tag| Self { tag, props })
    }

    /// Attach custom properties.
    pub fn with_props(mut self, props: Option<PropertyMap>) -> Self {
        self.props = props;
        self
    }
}

impl SchemaNode for PrimitiveSchema {
    fn tag(&self) -> SchemaType {
        self.tag
    }

    fn props(&self) -> Option<&PropertyMap> {
        self.props.as_ref()
    }

    fn name(&self) -> &str {
        self.tag.type_string()
    }
}

/// Array of items with a single schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    /// Schema of the array items.
    pub items: Arc<Schema>,
    props: Option<PropertyMap>,
}

impl ArraySchema {
    pub fn new(items: Arc<Schema>) -> Self {
        Self { items, props: None }
    }

    pub(crate) fn new_instance(
        parser: &mut SchemaParser,
        obj: &Map<String, Value>,
        props: Option<PropertyMap>,
        encspace: Option<&str>,
    ) -> SchemaResult<Self> {
        let items = obj
            .get("items")
            .ok_or_else(|| SchemaError::Parse("Array does not have 'items'".to_string()))?;

        let items = parser.parse_value(Some(items), encspace)?;
        Ok(Self { items, props })
    }
}

impl SchemaNode for ArraySchema {
    fn tag(&self) -> SchemaType {
        SchemaType::Array
    }

    fn props(&self) -> Option<&PropertyMap> {
        self.props.as_ref()
    }

    fn name(&self) -> &str {
        "array"
    }

    fn write_fields(
        &self,
        obj: &mut Map<String, Value>,
        names: &mut SchemaNames,
        encspace: Option<&str>,
    ) {
        obj.insert("items".to_string(), self.items.write_json(names, encspace));
    }
}

/// Map with string keys and values of a single schema.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSchema {
    /// Schema of the map values.
    pub values: Arc<Schema>,
    props: Option<PropertyMap>,
}

impl MapSchema {
    pub fn new(values: Arc<Schema>) -> Self {
        Self {
            values,
            props: None,
        }
    }

    pub(crate) fn new_instance(
        parser: &mut SchemaParser,
        obj: &Map<String, Value>,
        props: Option<PropertyMap>,
        encspace: Option<&str>,
    ) -> SchemaResult<Self> {
        let values = obj
            .get("values")
            .ok_or_else(|| SchemaError::Parse("Map does not have 'values'".to_string()))?;

        let values = parser.parse_value(Some(values), encspace)?;
        Ok(Self { values, props })
    }
}

impl SchemaNode for MapSchema {
    fn tag(&self) -> SchemaType {
        SchemaType::Map
    }

    fn props(&self) -> Option<&PropertyMap> {
        self.props.as_ref()
    }

    fn name(&self) -> &str {
        "map"
    }

    fn write_fields(
        &self,
        obj: &mut Map<String, Value>,
        names: &mut SchemaNames,
        encspace: Option<&str>,
    ) {
        obj.insert("values".to_string(), self.values.write_json(names, encspace));
    }
}

/// Union of branch schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionSchema {
    branches: Vec<Arc<Schema>>,
    props: Option<PropertyMap>,
}

impl UnionSchema {
    /// Build a union from already parsed branches.
    ///
    /// Branches that are themselves unions are spliced in, so the result is
    /// always flat. A union must have at least one branch and may not contain
    /// two branches with the same name.
    pub fn create(
        branches: Vec<Arc<Schema>>,
        props: Option<PropertyMap>,
    ) -> SchemaResult<Self> {
        let mut flat = Vec::with_capacity(branches.len());
        for branch in branches {
            match branch.as_ref() {
                Schema::Union(inner) => flat.extend(inner.branches.iter().cloned()),
                _ => flat.push(branch),
            }
        }

        if flat.is_empty() {
            return Err(SchemaError::Parse(
                "Union must have at least one branch".to_string(),
            ));
        }

        {
            let mut seen = HashSet::new();
            for branch in &flat {
                if !seen.insert(branch.fullname()) {
                    return Err(SchemaError::Parse(format!(
                        "Duplicate type in union: {}",
                        branch.fullname()
                    )));
                }
            }
        }

        Ok(Self {
            branches: flat,
            props,
        })
    }

    pub(crate) fn new_instance(
        parser: &mut SchemaParser,
        items: &[Value],
        props: Option<PropertyMap>,
        encspace: Option<&str>,
    ) -> SchemaResult<Self> {
        let branches = items
            .iter()
            .map(|item| parser.parse_value(Some(item), encspace))
            .collect::<SchemaResult<Vec<_>>>()?;

        Self::create(branches, props)
    }

    pub fn branches(&self) -> &[Arc<Schema>] {
        &self.branches
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Position of the branch with the given (full) name.
    pub fn branch_index(&self, fullname: &str) -> Option<usize> {
        self.branches.iter().position(|b| b.fullname() == fullname)
    }

    /// Check if one of the branches is `null`.
    pub fn is_nullable(&self) -> bool {
        self.branches.iter().any(|b| b.tag() == SchemaType::Null)
    }
}

impl SchemaNode for UnionSchema {
    fn tag(&self) -> SchemaType {
        SchemaType::Union
    }

    fn props(&self) -> Option<&PropertyMap> {
        self.props.as_ref()
    }

    fn name(&self) -> &str {
        "union"
    }
}

/// Back-reference to a named schema that encloses the reference.
///
/// Produced when a record's fields refer to the record itself (directly or
/// through nested types) before the record definition is complete.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedReference {
    pub(crate) name: SchemaName,
    tag: SchemaType,
}

impl NamedReference {
    pub fn new(name: SchemaName, tag: SchemaType) -> Self {
        Self { name, tag }
    }

    pub fn schema_name(&self) -> &SchemaName {
        &self.name
    }
}

impl SchemaNode for NamedReference {
    fn tag(&self) -> SchemaType {
        self.tag
    }

    fn props(&self) -> Option<&PropertyMap> {
        None
    }

    fn name(&self) -> &str {
        self.name.name()
    }

    fn fullname(&self) -> &str {
        self.name.fullname()
    }
}
