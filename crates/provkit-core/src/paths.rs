//! Relative path prefixing.
//!
//! Config files refer to other files relative to their own directory. When a
//! config file lives elsewhere, those paths are re-anchored on its directory.

use log::debug;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::Mapping;

/// Join `path` onto `prefix`, leaving rooted paths alone.
///
/// A missing or empty prefix returns `path` unchanged, as does a path that
/// starts at the filesystem root.
pub fn prefix_with_rel_path(path: &Path, prefix: Option<&Path>) -> PathBuf {
    match prefix {
        Some(prefix) if !prefix.as_os_str().is_empty() && !path.has_root() => prefix.join(path),
        _ => path.to_path_buf(),
    }
}

/// Apply [`prefix_with_rel_path`] to the string values stored under `keys`.
///
/// Keys that are missing or not strings are skipped. Returns how many values
/// were rewritten.
pub fn prefix_keys(map: &mut Mapping, keys: &[&str], prefix: Option<&Path>) -> usize {
    let mut rewritten = 0;

    for key in keys {
        if let Some(Value::String(current)) = map.get_mut(*key) {
            let prefixed = prefix_with_rel_path(Path::new(current.as_str()), prefix);
            let prefixed = prefixed.to_string_lossy().into_owned();
            if prefixed != *current {
                debug!("{}: '{}' -> '{}'", key, current, prefixed);
                *current = prefixed;
                rewritten += 1;
            }
        }
    }

    rewritten
}
