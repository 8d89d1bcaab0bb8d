//! Custom schema properties.

use serde_json::{Map, Value};

/// Attributes consumed by the schema kinds themselves.
pub(crate) const RESERVED_SCHEMA_KEYS: &[&str] = &[
    "type",
    "name",
    "namespace",
    "fields",
    "items",
    "size",
    "symbols",
    "values",
    "aliases",
    "order",
    "doc",
    "default",
    "logicalType",
];

/// Attributes consumed by a record field.
pub(crate) const RESERVED_FIELD_KEYS: &[&str] = &["name", "type", "default", "doc", "order", "aliases"];

/// Custom (non-reserved) JSON attributes attached to a schema node.
///
/// Entries keep the order in which they appeared in the source document so
/// that writing a schema back out reproduces them in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap {
    entries: Map<String, Value>,
}

impl PropertyMap {
    /// Create an empty property map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the custom attributes of a schema object.
    ///
    /// Returns `None` rather than an empty map when the object carries no
    /// custom attributes.
    pub fn extract(obj: &Map<String, Value>) -> Option<Self> {
        Self::extract_excluding(obj, RESERVED_SCHEMA_KEYS)
    }

    pub(crate) fn extract_excluding(obj: &Map<String, Value>, reserved: &[&str]) -> Option<Self> {
        let entries: Map<String, Value> = obj
            .iter()
            .filter(|(key, _)| !reserved.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if entries.is_empty() {
            None
        } else {
            Some(Self { entries })
        }
    }

    /// Get a property value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Insert a property, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Append every property to a JSON object being written.
    pub(crate) fn write_into(&self, obj: &mut Map<String, Value>) {
        for (key, value) in &self.entries {
            obj.insert(key.clone(), value.clone());
        }
    }
}

impl FromIterator<(String, Value)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(obj) => obj,
            _ => panic!("Expected object"),
        }
    }

    #[test]
    fn test_extract_skips_reserved_keys() {
        let obj = object(json!({
            "type": "record",
            "name": "User",
            "fields": [],
            "owner": "billing",
            "doc": "ignored",
            "version": 3
        }));

        let props = PropertyMap::extract(&obj).unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(props.get("owner"), Some(&json!("billing")));
        assert_eq!(props.get("version"), Some(&json!(3)));
        assert!(props.get("doc").is_none());
    }

    #[test]
    fn test_extract_absent_when_nothing_custom() {
        let obj = object(json!({"type": "int"}));
        assert!(PropertyMap::extract(&obj).is_none());
    }

    #[test]
    fn test_extract_preserves_document_order() {
        let obj = object(json!({"type": "int", "zeta": 1, "alpha": 2, "mid": 3}));
        let props = PropertyMap::extract(&obj).unwrap();
        let keys: Vec<&str> = props.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_field_reserved_keys_keep_schema_keys() {
        let obj = object(json!({"name": "id", "type": "long", "size": 4, "extra": true}));
        let props = PropertyMap::extract_excluding(&obj, RESERVED_FIELD_KEYS).unwrap();
        assert_eq!(props.len(), 2);
        assert!(props.get("size").is_some());
    }
}
