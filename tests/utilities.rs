//! Helper contract tests
//!
//! Exercises merge laws, instance naming, path prefixing, and the template
//! and file writers through the public crate API.

mod support;

use provkit::{
    format_instance_name, merge, prefix_with_rel_path, write_file, write_template,
    InstanceDescriptor, InstanceOptions, Mapping, MergeError, TemplateError,
};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use support::{mapping, test_template_dir};

// =============================================================================
// Merge
// =============================================================================

#[test]
fn test_merge_example() {
    let base = mapping(json!({"name": "remy", "city": "Berkeley", "age": 21}));
    let overlay = mapping(json!({"name": "remy", "city": "Austin"}));

    let merged = merge(&base, &overlay, false).unwrap();

    assert_eq!(
        merged,
        mapping(json!({"name": "remy", "city": "Austin", "age": 21}))
    );
}

#[test]
fn test_disjoint_keys_union() {
    let a = mapping(json!({"ansible": {"playbook": "site.yml"}, "verbose": true}));
    let b = mapping(json!({"vagrant": {"instances": []}, "tags": ["x"]}));

    let merged = merge(&a, &b, true).unwrap();

    let mut union = a.clone();
    union.extend(b.clone());
    assert_eq!(merged, union);
    assert_eq!(merge(&b, &a, true).unwrap(), union);
}

#[test]
fn test_empty_identity() {
    let a = mapping(json!({
        "users": {"remy": {"email": "remy@cisco.com", "office": "San Jose"}},
        "count": 3
    }));
    let empty = Mapping::new();

    assert_eq!(merge(&a, &empty, false).unwrap(), a);
    assert_eq!(merge(&empty, &a, false).unwrap(), a);
}

#[test]
fn test_recursive_law() {
    let a = mapping(json!({"users": {"remy": {"office": "San Jose", "age": 21}}, "x": 1}));
    let b = mapping(json!({"users": {"remy": {"office": "Austin"}, "sam": {}}}));

    let merged = merge(&a, &b, false).unwrap();

    let inner_a = mapping(a["users"].clone());
    let inner_b = mapping(b["users"].clone());
    let inner = merge(&inner_a, &inner_b, false).unwrap();
    assert_eq!(merged["users"], serde_json::Value::Object(inner));
    assert_eq!(merged["x"], 1);
}

#[test]
fn test_scalar_conflict() {
    let a = mapping(json!({"office": "San Jose"}));
    let b = mapping(json!({"office": "Austin"}));

    assert_eq!(merge(&a, &b, false).unwrap()["office"], "Austin");

    match merge(&a, &b, true) {
        Err(MergeError::Conflict { path, .. }) => assert_eq!(path, "office"),
        other => panic!("expected conflict, got {other:?}"),
    }
}

// =============================================================================
// Instance naming
// =============================================================================

#[test]
fn test_format_instance_name_examples() {
    let plain = vec![InstanceDescriptor::new("test-01")];
    assert_eq!(format_instance_name("test-02", "rhel-7", &plain), None);
    assert_eq!(
        format_instance_name("test-01", "rhel-7", &plain).as_deref(),
        Some("test-01-rhel-7")
    );

    let opted_out = vec![InstanceDescriptor::new("test-01").with_options(InstanceOptions {
        append_platform_to_hostname: Some(false),
    })];
    assert_eq!(
        format_instance_name("test-01", "rhel-7", &opted_out).as_deref(),
        Some("test-01")
    );
}

// =============================================================================
// Path prefixing
// =============================================================================

#[cfg(unix)]
#[test]
fn test_absolute_path_not_prefixed() {
    assert_eq!(
        prefix_with_rel_path(Path::new("/abs/path"), Some(Path::new("some/prefix"))),
        PathBuf::from("/abs/path")
    );
}

#[test]
fn test_relative_path_prefixed() {
    let prefix = Path::new("a1").join("b2");
    let path = Path::new("c3").join("d4");
    assert_eq!(
        prefix_with_rel_path(&path, Some(&prefix)),
        prefix.join(&path)
    );
    assert_eq!(prefix_with_rel_path(&path, None), path);
}

// =============================================================================
// Writers
// =============================================================================

#[test]
fn test_write_template_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("test_utilities_write_template.tmp");

    write_template(
        "test_write_template.j2",
        &dest,
        &json!({"test": "chicken"}),
        &test_template_dir(),
    )
    .unwrap();

    assert_eq!(fs::read_to_string(&dest).unwrap(), "this is a chicken\n");
}

#[test]
fn test_write_template_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = write_template(
        "does_not_exist.j2",
        &dir.path().join("out"),
        &json!({}),
        &test_template_dir(),
    )
    .unwrap_err();

    assert!(matches!(err, TemplateError::NotFound(_)));
}

#[test]
fn test_write_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test_utilities_write_file.tmp");
    let contents = "9f3a1c0be4d27785aa01c6e2f4b3d9";

    write_file(&path, contents).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), contents);
}
