//! ansible-playbook invocation
//!
//! Derives the playbook path, command-line arguments and environment for
//! `ansible-playbook` from the `ansible` section of the scenario config.
//! Nothing is executed here.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use serde_json::Value;

use crate::config::{ConfigError, ScenarioConfig};

/// Keys passed through the environment instead of as `--key=value`
const ENV_ONLY_KEYS: &[&str] = &["raw_ssh_args", "host_key_checking", "config_file", "raw_env_vars"];

/// Keys with their own command-line form
const SPECIAL_KEYS: &[&str] = &["playbook", "verbose"];

/// Everything needed to run `ansible-playbook`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybookInvocation {
    pub playbook: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl PlaybookInvocation {
    /// Build the invocation from `config`. `tags`, when given, overrides
    /// `ansible.tags`.
    pub fn from_config(config: &ScenarioConfig, tags: Option<&str>) -> Result<Self, ConfigError> {
        let mut ansible = config
            .get("ansible")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| ConfigError::ValidationError("missing [ansible] section".to_string()))?;

        if let Some(tags) = tags {
            ansible.insert("tags".to_string(), Value::String(tags.to_string()));
        }

        let playbook = ansible
            .get("playbook")
            .and_then(Value::as_str)
            .ok_or_else(|| ConfigError::ValidationError("ansible.playbook is not set".to_string()))?
            .to_string();

        let mut env = BTreeMap::new();
        if let Some(Value::Object(raw)) = ansible.get("raw_env_vars") {
            for (key, value) in raw {
                env.insert(key.clone(), render_value(value));
            }
        }
        env.insert("PYTHONUNBUFFERED".to_string(), "1".to_string());
        env.insert("ANSIBLE_FORCE_COLOR".to_string(), "true".to_string());
        if let Some(checking) = ansible.get("host_key_checking") {
            env.insert(
                "ANSIBLE_HOST_KEY_CHECKING".to_string(),
                render_value(checking).to_lowercase(),
            );
        }
        if let Some(ssh_args) = ansible.get("raw_ssh_args") {
            let joined = match ssh_args {
                Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join(" "),
                other => render_value(other),
            };
            env.insert("ANSIBLE_SSH_ARGS".to_string(), joined);
        }
        if let Some(config_file) = ansible.get("config_file") {
            env.insert("ANSIBLE_CONFIG".to_string(), render_value(config_file));
        }

        let mut args = Vec::new();
        match ansible.get("verbose") {
            Some(Value::String(level)) if !level.is_empty() => args.push(format!("-{}", level)),
            Some(Value::Bool(true)) => args.push("-v".to_string()),
            _ => {}
        }

        for (key, value) in &ansible {
            if ENV_ONLY_KEYS.contains(&key.as_str()) || SPECIAL_KEYS.contains(&key.as_str()) {
                continue;
            }
            if !is_truthy(value) {
                continue;
            }
            let flag = format!("--{}", key.replace('_', "-"));
            match value {
                Value::Bool(true) => args.push(flag),
                other => args.push(format!("{}={}", flag, render_value(other))),
            }
        }

        debug!("ansible-playbook {} with {} arg(s)", playbook, args.len());
        Ok(Self {
            playbook,
            args,
            env,
        })
    }
}

impl fmt::Display for PlaybookInvocation {
    /// Shell-style rendering: `KEY=value` lines, then the command line
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            writeln!(f, "{}={}", key, value)?;
        }
        write!(f, "ansible-playbook {}", self.playbook)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}
