//! Mapping merge logic
//!
//! Two flavours live here:
//! - `merge`: borrowed, optionally strict. Reports scalar conflicts by key path.
//! - `deep_merge` / `merge_layers`: owned and infallible, used to stack config layers.
//!
//! Both share the same rule. Mappings merge by key, and for everything else
//! the overlay wins.

use log::debug;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::Mapping;

/// Shape of a value as far as merging is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// A nested mapping, merged key by key
    Mapping,
    /// Anything else (strings, numbers, bools, arrays, null), replaced wholesale
    Scalar,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => ValueKind::Mapping,
            _ => ValueKind::Scalar,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Mapping => f.write_str("mapping"),
            ValueKind::Scalar => f.write_str("scalar"),
        }
    }
}

/// Errors raised by a strict merge
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// Both sides hold different values at the same key
    #[error("conflicting values at '{path}' ({base} vs {overlay})")]
    Conflict {
        /// Dotted key path, e.g. `users.remy.office`. Keys that contain a
        /// dot are quoted: `"a.b".c`
        path: String,
        base: ValueKind,
        overlay: ValueKind,
    },
}

/// Merge `overlay` into a copy of `base`.
///
/// Keys found on one side only are copied as-is. When both sides hold a
/// mapping the two are merged recursively. Otherwise the overlay value
/// replaces the base value, unless `raise_on_conflict` is set and the values
/// differ, in which case a [`MergeError::Conflict`] is returned instead.
///
/// Neither input is modified.
pub fn merge(
    base: &Mapping,
    overlay: &Mapping,
    raise_on_conflict: bool,
) -> Result<Mapping, MergeError> {
    debug!(
        "merging {} overlay key(s) onto {} base key(s) (strict: {})",
        overlay.len(),
        base.len(),
        raise_on_conflict
    );
    let mut path = Vec::new();
    merge_at(base, overlay, raise_on_conflict, &mut path)
}

fn merge_at<'a>(
    base: &Mapping,
    overlay: &'a Mapping,
    raise_on_conflict: bool,
    path: &mut Vec<&'a str>,
) -> Result<Mapping, MergeError> {
    let mut merged = base.clone();

    for (key, overlay_value) in overlay {
        let combined = match merged.get(key) {
            None => overlay_value.clone(),
            Some(base_value) => {
                path.push(key.as_str());
                let result = combine(base_value, overlay_value, raise_on_conflict, path);
                path.pop();
                result?
            }
        };
        merged.insert(key.clone(), combined);
    }

    Ok(merged)
}

fn combine<'a>(
    base: &Value,
    overlay: &'a Value,
    raise_on_conflict: bool,
    path: &mut Vec<&'a str>,
) -> Result<Value, MergeError> {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => Ok(Value::Object(merge_at(
            base_map,
            overlay_map,
            raise_on_conflict,
            path,
        )?)),
        _ if base == overlay => Ok(overlay.clone()),
        _ if raise_on_conflict => Err(MergeError::Conflict {
            path: format_path(path),
            base: ValueKind::of(base),
            overlay: ValueKind::of(overlay),
        }),
        _ => Ok(overlay.clone()),
    }
}

fn format_path(path: &[&str]) -> String {
    path.iter()
        .map(|key| {
            if key.contains('.') {
                format!("{:?}", key)
            } else {
                (*key).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Deep merge two owned JSON values.
///
/// Same rule as [`merge`] without conflict detection. Non-object roots are
/// treated as scalars, so the overlay wins.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = if let Some(base_value) = base_map.remove(&key) {
                    deep_merge(base_value, overlay_value)
                } else {
                    overlay_value
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Merge config layers in order (first is base, last has highest precedence)
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}
