//! Shared helpers for integration tests.

#![allow(dead_code)]

use provkit::Mapping;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Directory holding the templates used by the tests
pub fn test_template_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates/tests")
}

/// Unwrap a `json!` object literal into a mapping
pub fn mapping(value: Value) -> Mapping {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
