//! Logical types layered over a base schema.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::warn;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::parser::is_declaration_keyword;
use crate::schema::{PropertyMap, Schema, SchemaNames, SchemaNode, SchemaParser, SchemaType};

/// Logical type names with their parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalTypeName {
    /// Decimal with precision and scale (bytes or fixed).
    Decimal { precision: u32, scale: u32 },
    /// UUID (string or fixed[16]).
    Uuid,
    /// Date (days since Unix epoch, int).
    Date,
    /// Time in milliseconds (int).
    TimeMillis,
    /// Time in microseconds (long).
    TimeMicros,
    /// Timestamp in milliseconds since Unix epoch (long).
    TimestampMillis,
    /// Timestamp in microseconds since Unix epoch (long).
    TimestampMicros,
    /// Timestamp in nanoseconds since Unix epoch (long).
    TimestampNanos,
    /// Local timestamp in milliseconds (long).
    LocalTimestampMillis,
    /// Local timestamp in microseconds (long).
    LocalTimestampMicros,
    /// Local timestamp in nanoseconds (long).
    LocalTimestampNanos,
    /// Duration (months, days, milliseconds) as fixed[12].
    Duration,
}

impl LogicalTypeName {
    /// Get the string name of the logical type.
    pub fn name(&self) -> &'static str {
        match self {
            LogicalTypeName::Decimal { .. } => "decimal",
            LogicalTypeName::Uuid => "uuid",
            LogicalTypeName::Date => "date",
            LogicalTypeName::TimeMillis => "time-millis",
            LogicalTypeName::TimeMicros => "time-micros",
            LogicalTypeName::TimestampMillis => "timestamp-millis",
            LogicalTypeName::TimestampMicros => "timestamp-micros",
            LogicalTypeName::TimestampNanos => "timestamp-nanos",
            LogicalTypeName::LocalTimestampMillis => "local-timestamp-millis",
            LogicalTypeName::LocalTimestampMicros => "local-timestamp-micros",
            LogicalTypeName::LocalTimestampNanos => "local-timestamp-nanos",
            LogicalTypeName::Duration => "duration",
        }
    }

    /// Resolve a logical type against its base schema.
    ///
    /// Decimal parameters are read from the custom properties, where
    /// `precision` and `scale` live. Returns a reason when the name is
    /// unknown or does not fit the base.
    fn resolve(name: &str, props: Option<&PropertyMap>, base: &Schema) -> Result<Self, String> {
        let tag = base.tag();
        let fixed_size = match base {
            Schema::Fixed(f) => Some(f.size),
            _ => None,
        };

        let (logical, fits) = match name {
            "decimal" => {
                let logical = decimal_parameters(props, fixed_size)?;
                (logical, matches!(tag, SchemaType::Bytes | SchemaType::Fixed))
            }
            "uuid" => (
                LogicalTypeName::Uuid,
                tag == SchemaType::String || fixed_size == Some(16),
            ),
            "date" => (LogicalTypeName::Date, tag == SchemaType::Int),
            "time-millis" => (LogicalTypeName::TimeMillis, tag == SchemaType::Int),
            "time-micros" => (LogicalTypeName::TimeMicros, tag == SchemaType::Long),
            "timestamp-millis" => (LogicalTypeName::TimestampMillis, tag == SchemaType::Long),
            "timestamp-micros" => (LogicalTypeName::TimestampMicros, tag == SchemaType::Long),
            "timestamp-nanos" => (LogicalTypeName::TimestampNanos, tag == SchemaType::Long),
            "local-timestamp-millis" => {
                (LogicalTypeName::LocalTimestampMillis, tag == SchemaType::Long)
            }
            "local-timestamp-micros" => {
                (LogicalTypeName::LocalTimestampMicros, tag == SchemaType::Long)
            }
            "local-timestamp-nanos" => {
                (LogicalTypeName::LocalTimestampNanos, tag == SchemaType::Long)
            }
            "duration" => (LogicalTypeName::Duration, fixed_size == Some(12)),
            other => return Err(format!("unknown logical type '{}'", other)),
        };

        if fits {
            Ok(logical)
        } else {
            Err(format!(
                "logical type '{}' cannot annotate {}",
                logical.name(),
                base.fullname()
            ))
        }
    }
}

fn decimal_parameters(
    props: Option<&PropertyMap>,
    fixed_size: Option<usize>,
) -> Result<LogicalTypeName, String> {
    let integer = |key: &str| -> Result<Option<u32>, String> {
        match props.and_then(|p| p.get(key)) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .map(Some)
                .ok_or_else(|| format!("decimal {} must be a non-negative integer", key)),
        }
    };

    let precision = integer("precision")?.ok_or("decimal requires 'precision'")?;
    let scale = integer("scale")?.unwrap_or(0);

    if precision < 1 {
        return Err("decimal precision must be positive".to_string());
    }
    if scale > precision {
        return Err(format!(
            "decimal scale {} exceeds precision {}",
            scale, precision
        ));
    }
    if let Some(size) = fixed_size {
        // Largest number of base-10 digits a signed value of `size` bytes holds
        let max = ((8.0 * size as f64 - 1.0) * 2f64.log10()).floor();
        if f64::from(precision) > max {
            return Err(format!(
                "decimal precision {} does not fit in fixed({})",
                precision, size
            ));
        }
    }

    Ok(LogicalTypeName::Decimal { precision, scale })
}

/// Logical type wrapper around a base schema.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalSchema {
    /// The underlying schema.
    pub base: Arc<Schema>,
    /// The logical type name and parameters.
    pub logical_type: LogicalTypeName,
    pub(crate) props: Option<PropertyMap>,
}

impl LogicalSchema {
    /// Create a new LogicalSchema.
    pub fn new(base: Arc<Schema>, logical_type: LogicalTypeName) -> Self {
        Self {
            base,
            logical_type,
            props: None,
        }
    }

    /// Parse a schema object carrying a `logicalType` attribute.
    ///
    /// Unknown logical types, or ones whose base does not fit, are ignored:
    /// the base schema is returned in their place, carrying the custom
    /// properties and the `logicalType` attribute as plain metadata.
    pub(crate) fn new_instance(
        parser: &mut SchemaParser,
        obj: &Map<String, Value>,
        props: Option<PropertyMap>,
        encspace: Option<&str>,
    ) -> SchemaResult<Arc<Schema>> {
        let logical_name = obj
            .get("logicalType")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::Parse("logicalType must be a string".to_string()))?;

        match obj.get("type") {
            // Named bases are declared by the same object
            Some(Value::String(kind)) if is_declaration_keyword(kind) => {
                let base = parser.declare(obj, None, kind, encspace)?;
                match LogicalTypeName::resolve(logical_name, props.as_ref(), &base) {
                    Ok(logical_type) => {
                        let base = parser.register(base)?;
                        Ok(Arc::new(Schema::Logical(Self {
                            base,
                            logical_type,
                            props,
                        })))
                    }
                    Err(reason) => {
                        warn_ignored(logical_name, &base, &reason);
                        let props = metadata(None, props, logical_name);
                        parser.register(base.with_props(props))
                    }
                }
            }
            Some(type_value) => {
                let base = parser.parse_value(Some(type_value), encspace)?;
                match LogicalTypeName::resolve(logical_name, props.as_ref(), &base) {
                    Ok(logical_type) => Ok(Arc::new(Schema::Logical(Self {
                        base,
                        logical_type,
                        props,
                    }))),
                    Err(reason) => {
                        warn_ignored(logical_name, &base, &reason);
                        // Registered named types are shared and keep their own attributes
                        if base.schema_name().is_some() {
                            return Ok(base);
                        }
                        let props = metadata(base.props(), props, logical_name);
                        let base = Arc::try_unwrap(base).unwrap_or_else(|shared| (*shared).clone());
                        Ok(Arc::new(base.with_props(props)))
                    }
                }
            }
            None => Err(SchemaError::Parse(
                "Property type is required".to_string(),
            )),
        }
    }

    /// Write this schema as a JSON object whose `type` is the base schema.
    pub(crate) fn write_json(&self, names: &mut SchemaNames, encspace: Option<&str>) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), self.base.write_json(names, encspace));
        obj.insert(
            "logicalType".to_string(),
            json!(self.logical_type.name()),
        );

        if let Some(props) = &self.props {
            props.write_into(&mut obj);
        }

        Value::Object(obj)
    }
}

impl SchemaNode for LogicalSchema {
    fn tag(&self) -> SchemaType {
        SchemaType::Logical
    }

    fn props(&self) -> Option<&PropertyMap> {
        self.props.as_ref()
    }

    fn name(&self) -> &str {
        self.base.name()
    }

    fn fullname(&self) -> &str {
        self.base.fullname()
    }
}

fn warn_ignored(logical_name: &str, base: &Schema, reason: &str) {
    warn!(
        logical_type = logical_name,
        base = base.fullname(),
        "Ignoring logical type: {}",
        reason
    );
}

/// Properties for a base schema standing in for an ignored logical type:
/// the base's own, then the outer object's, then `logicalType` itself.
fn metadata(
    base: Option<&PropertyMap>,
    outer: Option<PropertyMap>,
    logical_name: &str,
) -> Option<PropertyMap> {
    let mut merged = base.cloned().unwrap_or_default();
    for (key, value) in outer.iter().flat_map(PropertyMap::iter) {
        merged.insert(key, value.clone());
    }
    merged.insert("logicalType", json!(logical_name));
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FixedSchema, PrimitiveSchema, SchemaName};

    fn primitive(tag: SchemaType) -> Schema {
        Schema::Primitive(PrimitiveSchema::new(tag))
    }

    fn decimal_props(precision: u64, scale: u64) -> PropertyMap {
        let mut props = PropertyMap::new();
        props.insert("precision", json!(precision));
        props.insert("scale", json!(scale));
        props
    }

    #[test]
    fn test_resolve_checks_base() {
        let long = primitive(SchemaType::Long);
        assert_eq!(
            LogicalTypeName::resolve("timestamp-millis", None, &long),
            Ok(LogicalTypeName::TimestampMillis)
        );
        assert!(LogicalTypeName::resolve("date", None, &long).is_err());
        assert!(LogicalTypeName::resolve("made-up", None, &long).is_err());
    }

    #[test]
    fn test_resolve_decimal() {
        let bytes = primitive(SchemaType::Bytes);
        let props = decimal_props(10, 2);
        assert_eq!(
            LogicalTypeName::resolve("decimal", Some(&props), &bytes),
            Ok(LogicalTypeName::Decimal {
                precision: 10,
                scale: 2
            })
        );

        let bad_scale = decimal_props(2, 3);
        assert!(LogicalTypeName::resolve("decimal", Some(&bad_scale), &bytes).is_err());
        assert!(LogicalTypeName::resolve("decimal", None, &bytes).is_err());
    }

    #[test]
    fn test_decimal_precision_bounded_by_fixed_size() {
        let fixed = Schema::Fixed(FixedSchema::new(SchemaName::new("d", None, None), 4));
        // 4 bytes hold at most 9 decimal digits
        assert!(LogicalTypeName::resolve("decimal", Some(&decimal_props(9, 0)), &fixed).is_ok());
        assert!(LogicalTypeName::resolve("decimal", Some(&decimal_props(10, 0)), &fixed).is_err());
    }

    #[test]
    fn test_uuid_and_duration_sizes() {
        let fixed16 = Schema::Fixed(FixedSchema::new(SchemaName::new("u", None, None), 16));
        let fixed12 = Schema::Fixed(FixedSchema::new(SchemaName::new("d", None, None), 12));
        assert!(LogicalTypeName::resolve("uuid", None, &fixed16).is_ok());
        assert!(LogicalTypeName::resolve("uuid", None, &fixed12).is_err());
        assert!(LogicalTypeName::resolve("duration", None, &fixed12).is_ok());
        assert!(LogicalTypeName::resolve("duration", None, &fixed16).is_err());
    }

    #[test]
    fn test_logical_takes_base_name() {
        let logical = LogicalSchema::new(
            Arc::new(primitive(SchemaType::Long)),
            LogicalTypeName::TimestampMicros,
        );
        assert_eq!(logical.tag(), SchemaType::Logical);
        assert_eq!(logical.name(), "long");
    }
}
