//! Template rendering
//!
//! Templates live as plain files under a template directory and use
//! `{{ key }}` placeholders. Dotted keys (`{{ config.ansible.playbook }}`)
//! walk nested objects in the context. Strings are inserted raw; any other
//! value is inserted as compact JSON.

use log::{debug, warn};
use regex_lite::{Captures, Regex};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

use crate::output::write_file;

/// Errors during template rendering
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template with that name in the template directory
    #[error("template not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)\s*\}\}")
            .unwrap_or_else(|e| unreachable!("placeholder pattern is valid: {e}"))
    })
}

fn lookup<'a>(context: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.')
        .try_fold(context, |current, part| current.get(part))
}

/// Substitute placeholders in `template` from `context`.
///
/// Unknown keys render as an empty string.
pub fn render_str(template: &str, context: &Value) -> String {
    placeholder()
        .replace_all(template, |caps: &Captures<'_>| {
            let key = &caps[1];
            match lookup(context, key) {
                Some(Value::String(s)) => s.clone(),
                Some(value) => value.to_string(),
                None => {
                    warn!("template variable '{}' is not defined", key);
                    String::new()
                }
            }
        })
        .into_owned()
}

/// Render `template_dir/template_name` with `context` and write it to `dest`
pub fn write_template(
    template_name: &str,
    dest: &Path,
    context: &Value,
    template_dir: &Path,
) -> Result<(), TemplateError> {
    let source = template_dir.join(template_name);
    let template = match fs::read_to_string(&source) {
        Ok(template) => template,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(TemplateError::NotFound(source));
        }
        Err(e) => return Err(e.into()),
    };

    debug!("rendering {} -> {}", source.display(), dest.display());
    write_file(dest, render_str(&template, context))?;
    Ok(())
}
