//! Property-based tests for schema parsing.
//!
//! These tests use proptest to check parser invariants across many generated
//! schema documents.

use proptest::prelude::*;
use serde_json::{json, Value};

use contrail::schema::*;

// ============================================================================
// Schema Generators
// ============================================================================

fn arb_primitive_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(SchemaType::PRIMITIVES.map(SchemaType::type_string).to_vec())
}

/// Generate valid Avro names (must start with [A-Za-z_] and contain only [A-Za-z0-9_]).
fn arb_avro_name() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,15}".prop_filter("must not be a primitive name", |s| {
        SchemaType::primitive(s).is_none()
    })
}

/// Generate valid Avro namespace (dot-separated names).
fn arb_namespace() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        arb_avro_name().prop_map(Some),
        (arb_avro_name(), arb_avro_name()).prop_map(|(a, b)| Some(format!("{}.{}", a, b))),
    ]
}

fn arb_whitespace() -> impl Strategy<Value = String> {
    "[ \t\r\n]{0,4}"
}

/// Generate custom properties with keys that are never reserved.
fn arb_props() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::vec(
        (
            "x-[a-z]{1,6}",
            prop_oneof![
                any::<i32>().prop_map(|n| json!(n)),
                "[a-z]{0,8}".prop_map(|s| json!(s)),
                any::<bool>().prop_map(|b| json!(b)),
            ],
        ),
        0..3,
    )
}

fn with_props(mut obj: serde_json::Map<String, Value>, props: Vec<(String, Value)>) -> Value {
    for (key, value) in props {
        obj.insert(key, value);
    }
    Value::Object(obj)
}

/// Generate unnamed schema documents: primitives nested in arrays and maps,
/// with optional custom properties.
fn arb_unnamed_schema() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        arb_primitive_name().prop_map(|name| json!(name)),
        (arb_primitive_name(), arb_props()).prop_map(|(name, props)| {
            let mut obj = serde_json::Map::new();
            obj.insert("type".to_string(), json!(name));
            with_props(obj, props)
        }),
    ];

    leaf.prop_recursive(4, 24, 4, |inner| {
        prop_oneof![
            (inner.clone(), arb_props()).prop_map(|(items, props)| {
                let mut obj = serde_json::Map::new();
                obj.insert("type".to_string(), json!("array"));
                obj.insert("items".to_string(), items);
                with_props(obj, props)
            }),
            (inner, arb_props()).prop_map(|(values, props)| {
                let mut obj = serde_json::Map::new();
                obj.insert("type".to_string(), json!("map"));
                obj.insert("values".to_string(), values);
                with_props(obj, props)
            }),
        ]
    })
}

/// Generate a record holding a fixed, an enum and a reference to the fixed.
fn arb_record_document() -> impl Strategy<Value = Value> {
    (
        arb_avro_name(),
        arb_namespace(),
        arb_avro_name(),
        1usize..64,
        arb_avro_name(),
        arb_avro_name(),
    )
        .prop_filter("names must differ", |(record, _, fixed, _, enumeration, _)| {
            record != fixed
                && record != enumeration
                && fixed != enumeration
                && !["f", "e", "g"].contains(&fixed.as_str())
        })
        .prop_map(|(record, namespace, fixed, size, enumeration, symbol)| {
            json!({
                "type": "record",
                "name": record,
                "namespace": namespace,
                "fields": [
                    {"name": "f", "type": {"type": "fixed", "name": fixed, "size": size}},
                    {"name": "e", "type": {"type": "enum", "name": enumeration, "symbols": [symbol]}},
                    {"name": "g", "type": ["null", fixed]}
                ]
            })
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Surrounding whitespace and quoting do not change a primitive document.
    #[test]
    fn prop_primitive_shortcut(
        name in arb_primitive_name(),
        quoted in any::<bool>(),
        before in arb_whitespace(),
        after in arb_whitespace(),
    ) {
        let token = if quoted { format!("\"{}\"", name) } else { name.to_string() };
        let schema = parse_schema(&format!("{}{}{}", before, token, after)).unwrap();
        prop_assert_eq!(schema.tag(), SchemaType::primitive(name).unwrap());
    }

    /// Writing a parsed unnamed schema and parsing it again is stable, and
    /// custom properties survive in document order.
    #[test]
    fn prop_unnamed_round_trip(doc in arb_unnamed_schema()) {
        let schema = parse_schema(&doc.to_string()).unwrap();
        let written = schema.to_json();
        let reparsed = parse_schema(&written).unwrap();

        prop_assert_eq!(reparsed.to_json(), written.clone());
        prop_assert_eq!(&*reparsed, &*schema);

        // Documents without a bare `{"type": prim}` wrapper are already canonical
        let canonical: Value = serde_json::from_str(&written).unwrap();
        if !contains_bare_wrapper(&doc) {
            prop_assert_eq!(canonical, doc);
        }
    }

    /// Named types are expanded once and written by name afterwards, and the
    /// output parses back to the same tree.
    #[test]
    fn prop_record_round_trip(doc in arb_record_document()) {
        let schema = parse_schema(&doc.to_string()).unwrap();
        let written = schema.to_json();

        let fixed_name = doc["fields"][0]["type"]["name"].as_str().unwrap();
        let expanded = format!(r#""name":"{}""#, fixed_name);
        prop_assert_eq!(written.matches(&expanded).count(), 1);

        let reparsed = parse_schema(&written).unwrap();
        prop_assert_eq!(reparsed.to_json(), written);
    }

    /// Branch order of a standalone union does not decide whether it parses.
    #[test]
    fn prop_union_order_independent(doc in arb_record_document(), reverse in any::<bool>()) {
        let record = doc.clone();
        let fixed = doc["fields"][0]["type"]["name"].as_str().unwrap().to_string();
        let namespace = doc["namespace"].as_str();
        let reference = match namespace {
            Some(ns) => format!("{}.{}", ns, fixed),
            None => fixed,
        };
        let user = json!({"type": "array", "items": reference});

        let branches = if reverse { vec![user, record] } else { vec![record, user] };
        let schema = parse_schema(&Value::Array(branches).to_string()).unwrap();

        let Schema::Union(union) = schema.as_ref() else {
            panic!("expected union");
        };
        prop_assert_eq!(union.len(), 2);
        prop_assert_eq!(union.branches()[0].tag(), SchemaType::Record);
    }

    /// Names that break the naming rules only fail in strict mode.
    #[test]
    fn prop_strict_rejects_invalid_names(name in "[0-9-][A-Za-z0-9-]{0,8}") {
        let doc = json!({"type": "fixed", "name": name, "size": 1}).to_string();
        prop_assert!(parse_schema(&doc).is_ok());
        prop_assert!(parse_schema_with_options(&doc, &ParseOptions::new().strict()).is_err());
    }
}

/// Whether `doc` contains a `{"type": prim}` object without custom properties,
/// which the writer collapses to a plain string.
fn contains_bare_wrapper(doc: &Value) -> bool {
    match doc {
        Value::Object(obj) => {
            let bare_primitive = obj.len() == 1
                && obj
                    .get("type")
                    .and_then(Value::as_str)
                    .is_some_and(|t| SchemaType::primitive(t).is_some());
            bare_primitive || obj.values().any(contains_bare_wrapper)
        }
        _ => false,
    }
}
