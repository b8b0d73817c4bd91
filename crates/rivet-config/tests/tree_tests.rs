//! Layered configuration behavior across the public surface.

use rivet_config::{ConfigError, ConfigTree};
use serde_json::json;

#[test]
fn test_later_partial_wins_on_scalar_collision() {
    let mut tree = ConfigTree::new();
    tree.merge(json!({ "parameters": { "db": { "timeout": 30 } } }))
        .unwrap();
    tree.merge(json!({ "parameters": { "db": { "timeout": 60 } } }))
        .unwrap();
    assert_eq!(tree.parameter("db.timeout"), Some(&json!(60)));
}

#[test]
fn test_definitions_from_separate_partials_coexist() {
    let mut tree = ConfigTree::new();
    tree.merge(json!({ "shared": { "foo": ["app.foo"] } })).unwrap();
    tree.merge(json!({ "shared": { "bar": ["app.bar"] } })).unwrap();
    assert_eq!(tree.shared_definition("foo"), Some(&json!(["app.foo"])));
    assert_eq!(tree.shared_definition("bar"), Some(&json!(["app.bar"])));
}

#[test]
fn test_sections_exist_on_every_construction_path() {
    for tree in [
        ConfigTree::new(),
        ConfigTree::default(),
        ConfigTree::from_value(json!({})).unwrap(),
        ConfigTree::from_value(json!({ "parameters": { "a": 1 } })).unwrap(),
    ] {
        let value = tree.as_value();
        assert!(value.get("parameters").is_some());
        assert!(value.get("shared").is_some());
        assert!(value.get("multiple").is_some());
    }
}

#[test]
fn test_set_parameter_deep_autocreate() {
    let mut tree = ConfigTree::new();
    tree.set_parameter("a.b.c.d", json!("deep")).unwrap();
    assert_eq!(tree.parameter("a.b.c.d"), Some(&json!("deep")));
    assert_eq!(tree.parameter("a.b"), Some(&json!({ "c": { "d": "deep" } })));
}

#[test]
fn test_set_parameter_cannot_descend_through_scalar() {
    let mut tree = ConfigTree::new();
    tree.set_parameter("a.b", json!(5)).unwrap();
    let err = tree.set_parameter("a.b.c", json!(1)).unwrap_err();
    match err {
        ConfigError::ScalarInPath { segment, path } => {
            assert_eq!(segment, "b");
            assert_eq!(path, "a.b.c");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_final_segment_replaces_whole_subtree() {
    let mut tree = ConfigTree::new();
    tree.set_parameter("a.b.c", json!(1)).unwrap();
    tree.set_parameter("a.b", json!("flat")).unwrap();
    assert_eq!(tree.parameter("a.b"), Some(&json!("flat")));
    assert_eq!(tree.parameter("a.b.c"), None);
}

#[test]
fn test_merged_definition_list_is_replaced_not_spliced() {
    // A definition is an array, and arrays overwrite wholesale on merge, so
    // redefining a service swaps the whole constructor spec and argument list.
    let mut tree = ConfigTree::new();
    tree.merge(json!({ "shared": { "svc": ["app.one", "a", "b"] } }))
        .unwrap();
    tree.merge(json!({ "shared": { "svc": ["app.two"] } })).unwrap();
    assert_eq!(tree.shared_definition("svc"), Some(&json!(["app.two"])));
}

#[test]
fn test_parameter_on_non_object_section_is_none() {
    let mut tree = ConfigTree::new();
    tree.merge(json!({ "parameters": "oops" })).unwrap();
    assert_eq!(tree.parameter("anything"), None);
    assert!(tree.parameters_section().is_none());
}
