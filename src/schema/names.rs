//! Schema names and the named-type registry.
//!
//! Named types (records, enums, fixed, errors) are registered under their
//! fully qualified name while a document is parsed so that later parts of
//! the document can refer to them by name.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::schema::{NamedReference, Schema, SchemaType};

/// The name of a named schema, split into namespace and simple name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaName {
    name: String,
    namespace: Option<String>,
    fullname: String,
}

impl SchemaName {
    /// Build a schema name.
    ///
    /// A dotted `name` carries its own namespace. Otherwise the explicit
    /// `namespace` is used, falling back to the enclosing namespace. An empty
    /// namespace means the null namespace.
    ///
    /// # Example
    /// ```
    /// use contrail::SchemaName;
    ///
    /// let name = SchemaName::new("User", None, Some("com.example"));
    /// assert_eq!(name.fullname(), "com.example.User");
    ///
    /// let dotted = SchemaName::new("org.acme.User", Some("ignored"), None);
    /// assert_eq!(dotted.namespace(), Some("org.acme"));
    /// ```
    pub fn new(name: &str, namespace: Option<&str>, encspace: Option<&str>) -> Self {
        let (namespace, name) = match name.rsplit_once('.') {
            Some((ns, simple)) => (Some(ns), simple),
            None => (namespace.or(encspace), name),
        };
        let namespace = namespace.filter(|ns| !ns.is_empty()).map(str::to_owned);

        let fullname = match &namespace {
            Some(ns) => format!("{}.{}", ns, name),
            None => name.to_string(),
        };

        Self {
            name: name.to_string(),
            namespace,
            fullname,
        }
    }

    /// The simple (unqualified) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The fully qualified name.
    pub fn fullname(&self) -> &str {
        &self.fullname
    }

    /// The shortest form that resolves to this name inside `encspace`.
    pub fn relative_to(&self, encspace: Option<&str>) -> &str {
        if self.namespace() == encspace {
            &self.name
        } else {
            &self.fullname
        }
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fullname)
    }
}

/// Registry of named schemas keyed by fully qualified name.
///
/// One registry spans a single top-level parse unless the caller hands the
/// same registry to several parses on purpose. Entries are never removed
/// or replaced once defined.
#[derive(Debug, Clone, Default)]
pub struct SchemaNames {
    names: HashMap<String, Arc<Schema>>,
}

impl SchemaNames {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a name as written in a document.
    ///
    /// The token is first tried as an already qualified name, then
    /// qualified with the enclosing namespace.
    pub fn try_resolve(&self, name: &str, encspace: Option<&str>) -> Option<Arc<Schema>> {
        if let Some(schema) = self.names.get(name) {
            return Some(Arc::clone(schema));
        }
        let qualified = SchemaName::new(name, None, encspace);
        self.names.get(qualified.fullname()).cloned()
    }

    /// Register a named schema.
    ///
    /// Returns `false` if a schema is already defined under the same fully
    /// qualified name. A pending reservation (see [`reserve`](Self::reserve))
    /// is replaced.
    pub fn add(&mut self, name: &SchemaName, schema: Arc<Schema>) -> bool {
        match self.names.get(name.fullname()) {
            Some(existing) if !matches!(existing.as_ref(), Schema::Reference(_)) => false,
            _ => {
                self.names.insert(name.fullname().to_string(), schema);
                true
            }
        }
    }

    /// Reserve a name before its definition is complete.
    ///
    /// Until [`add`](Self::add) replaces it, the name resolves to a
    /// [`NamedReference`] back to the enclosing definition, which is what
    /// lets a record refer to itself from its own fields. Returns `false`
    /// if the name is already taken.
    pub fn reserve(&mut self, name: &SchemaName, tag: SchemaType) -> bool {
        if self.names.contains_key(name.fullname()) {
            return false;
        }
        let reference = Schema::Reference(NamedReference::new(name.clone(), tag));
        self.names
            .insert(name.fullname().to_string(), Arc::new(reference));
        true
    }

    /// Shallow copy of the name to schema mapping.
    ///
    /// Schemas are shared with the original; only the table is copied, so
    /// registrations made on the copy do not leak back.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Check if a fully qualified name is registered.
    pub fn contains(&self, fullname: &str) -> bool {
        self.names.contains_key(fullname)
    }

    /// Get a schema by fully qualified name.
    pub fn get(&self, fullname: &str) -> Option<&Arc<Schema>> {
        self.names.get(fullname)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over all registered names and schemas, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Schema>)> {
        self.names.iter().map(|(k, v)| (k.as_str(), v))
    }
}
