//! Tests for standalone union documents whose branches refer to names
//! declared by later branches.

use std::sync::Arc;

use contrail::schema::*;
use contrail::SchemaError;

fn branches(schema: &Schema) -> &[Arc<Schema>] {
    match schema {
        Schema::Union(u) => u.branches(),
        other => panic!("expected union, got {:?}", other),
    }
}

const POINT: &str = r#"{"type": "record", "name": "Point", "fields": [{"name": "x", "type": "int"}]}"#;
const LINE: &str = r#"{"type": "record", "name": "Line", "fields": [
    {"name": "from", "type": "Point"},
    {"name": "to", "type": "Point"}
]}"#;

#[test]
fn test_declaration_before_use() {
    let schema = parse_schema(&format!("[{}, {}]", POINT, LINE)).unwrap();
    let names: Vec<&str> = branches(&schema).iter().map(|b| b.fullname()).collect();
    assert_eq!(names, vec!["Point", "Line"]);
}

#[test]
fn test_use_before_declaration() {
    let schema = parse_schema(&format!("[{}, {}]", LINE, POINT)).unwrap();
    let branches = branches(&schema);

    // Deferred branches land after the ones that unlocked them
    let names: Vec<&str> = branches.iter().map(|b| b.fullname()).collect();
    assert_eq!(names, vec!["Point", "Line"]);

    let Schema::Record(line) = branches[1].as_ref() else {
        panic!("expected record");
    };
    assert!(Arc::ptr_eq(&line.fields[0].schema, &branches[0]));
}

#[test]
fn test_chain_of_forward_references() {
    let json = r#"[
        {"type": "record", "name": "A", "fields": [{"name": "b", "type": "B"}]},
        {"type": "record", "name": "B", "fields": [{"name": "c", "type": "C"}]},
        {"type": "enum", "name": "C", "symbols": ["X"]}
    ]"#;

    let schema = parse_schema(json).unwrap();
    let names: Vec<&str> = branches(&schema).iter().map(|b| b.fullname()).collect();
    assert_eq!(names, vec!["C", "B", "A"]);
}

#[test]
fn test_primitive_branches_mixed_with_forward_references() {
    let json = format!(r#"["null", {}, "string", {}]"#, LINE, POINT);
    let schema = parse_schema(&json).unwrap();
    let names: Vec<&str> = branches(&schema).iter().map(|b| b.fullname()).collect();
    assert_eq!(names, vec!["null", "string", "Point", "Line"]);
}

#[test]
fn test_unresolvable_reference_fails_with_aggregated_errors() {
    let json = r#"[
        {"type": "record", "name": "A", "fields": [{"name": "x", "type": "Missing"}]},
        {"type": "record", "name": "B", "fields": [{"name": "y", "type": "Absent"}]},
        "int"
    ]"#;

    let err = parse_schema(json).unwrap_err();
    assert_eq!(
        err,
        SchemaError::Parse(
            "Can't parse schema: Undefined name: Missing,Undefined name: Absent".to_string()
        )
    );
}

#[test]
fn test_failed_attempt_leaves_no_partial_registration() {
    // Inner is declared inside a branch that cannot complete on the first
    // pass; the retry must not see Inner as a duplicate.
    let json = r#"[
        {"type": "record", "name": "Outer", "fields": [
            {"name": "inner", "type": {"type": "fixed", "name": "Inner", "size": 4}},
            {"name": "later", "type": "Later"}
        ]},
        {"type": "enum", "name": "Later", "symbols": ["A"]}
    ]"#;

    let mut parser = SchemaParser::new();
    let schema = parser.parse_str(json).unwrap();
    let names: Vec<&str> = branches(&schema).iter().map(|b| b.fullname()).collect();
    assert_eq!(names, vec!["Later", "Outer"]);

    assert_eq!(parser.names().len(), 3);
    assert!(parser.names().contains("Inner"));
}

#[test]
fn test_non_parse_errors_are_not_retried() {
    let json = r#"[{"type": 5}, {"type": "fixed", "name": "F", "size": 1}]"#;
    assert!(matches!(parse_schema(json), Err(SchemaError::Type(_))));
}

#[test]
fn test_string_branch_errors_are_not_retried() {
    let json = r#"["Later", {"type": "fixed", "name": "Later", "size": 1}]"#;
    assert_eq!(
        parse_schema(json).unwrap_err(),
        SchemaError::Parse("Undefined name: Later".to_string())
    );
}

#[test]
fn test_duplicate_declarations_across_branches() {
    let json = r#"[
        {"type": "fixed", "name": "F", "size": 1},
        {"type": "fixed", "name": "F", "size": 2}
    ]"#;

    // Duplicates are parse errors, so the branch is deferred and then reported
    let err = parse_schema(json).unwrap_err();
    assert_eq!(
        err,
        SchemaError::Parse("Can't parse schema: Duplicate schema name F".to_string())
    );
}

#[test]
fn test_union_with_type_attribute_does_not_retry() {
    let json = format!(r#"{{"type": [{}, {}]}}"#, LINE, POINT);
    assert_eq!(
        parse_schema(&json).unwrap_err(),
        SchemaError::Parse("Undefined name: Point".to_string())
    );
}

#[test]
fn test_primitive_and_record_in_either_order() {
    let record = r#"{"type": "record", "name": "MyRecord", "fields": [{"name": "a", "type": "long"}]}"#;

    let forward = parse_schema(&format!(r#"["int", {}]"#, record)).unwrap();
    let reversed = parse_schema(&format!(r#"[{}, "int"]"#, record)).unwrap();

    let forward_names: Vec<&str> = branches(&forward).iter().map(|b| b.fullname()).collect();
    let reversed_names: Vec<&str> = branches(&reversed).iter().map(|b| b.fullname()).collect();
    assert_eq!(forward_names, vec!["int", "MyRecord"]);
    assert_eq!(reversed_names, vec!["MyRecord", "int"]);
    assert_eq!(branches(&forward)[1], branches(&reversed)[0]);
}
