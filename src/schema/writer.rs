//! Canonical JSON writing.

use std::fmt;

use serde_json::{json, Map, Value};

use crate::schema::{Schema, SchemaNames, SchemaNode};

impl Schema {
    /// Serialize the schema to a JSON Value.
    ///
    /// `names` holds the named types already written (or otherwise known to
    /// the reader of the output); those are written by name instead of being
    /// expanded again. Every named type expanded here is added to `names`.
    /// `encspace` is the namespace the value will be embedded in.
    ///
    /// A union is written as a bare JSON array, so its custom properties
    /// are not part of the output.
    pub fn write_json(&self, names: &mut SchemaNames, encspace: Option<&str>) -> Value {
        match self {
            Schema::Primitive(p) if p.props().is_none() => json!(p.name()),
            Schema::Union(u) => Value::Array(
                u.branches()
                    .iter()
                    .map(|branch| branch.write_json(names, encspace))
                    .collect(),
            ),
            Schema::Logical(l) => l.write_json(names, encspace),
            Schema::Reference(r) => json!(r.schema_name().relative_to(encspace)),
            _ => {
                if let Some(name) = self.schema_name() {
                    if !names.reserve(name, self.tag()) {
                        return json!(name.relative_to(encspace));
                    }
                }
                write_object(self, names, encspace)
            }
        }
    }

    /// Serialize the schema to a JSON string.
    ///
    /// Writes as a standalone document: no enclosing namespace and no
    /// previously written names.
    ///
    /// # Example
    /// ```
    /// use contrail::parse_schema;
    ///
    /// let schema = parse_schema(r#"{"type": "array", "items": "string"}"#).unwrap();
    /// assert_eq!(schema.to_json(), r#"{"type":"array","items":"string"}"#);
    /// ```
    pub fn to_json(&self) -> String {
        let value = self.write_json(&mut SchemaNames::new(), None);
        serde_json::to_string(&value).unwrap_or_else(|_| "null".to_string())
    }

    /// Serialize the schema to an indented JSON string.
    pub fn to_json_pretty(&self) -> String {
        let value = self.write_json(&mut SchemaNames::new(), None);
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "null".to_string())
    }
}

/// Open an object with the `type` attribute, then append the kind-specific
/// members and the custom properties.
fn write_object(node: &dyn SchemaNode, names: &mut SchemaNames, encspace: Option<&str>) -> Value {
    let mut obj = Map::new();
    obj.insert("type".to_string(), json!(node.tag().type_string()));
    node.write_fields(&mut obj, names, encspace);

    if let Some(props) = node.props() {
        props.write_into(&mut obj);
    }

    Value::Object(obj)
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}
