//! Scenario configuration with provenance
//!
//! The scenario config is built-in defaults, then each config file that
//! exists (user-wide first, scenario file last), then CLI overrides. Every
//! contributing source is recorded along with a digest of its bytes.

use log::debug;
use provkit_core::{deep_merge, prefix_keys, InstanceDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::defaults::BuiltinDefaults;

/// Keys under `ansible` that hold paths relative to the scenario file
const ANSIBLE_PATH_KEYS: &[&str] = &["inventory_file", "playbook", "config_file"];

/// Keys under `ansible.raw_env_vars` that hold paths
const ENV_PATH_KEYS: &[&str] = &[
    "ANSIBLE_CONFIG",
    "ANSIBLE_VAR_DEFAULTS_GLOB",
    "ANSIBLE_FILTER_PLUGINS",
    "ANSIBLE_ROLES_PATH",
    "ANSIBLE_LOOKUP_PLUGINS",
    "ANSIBLE_VARS_PLUGINS",
    "VAGRANT_VAGRANTFILE",
    "ANSIBLE_LIBRARY",
];

/// Origin of a configuration source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    /// Origin of this source
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Merged scenario configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// The merged configuration object
    pub config: Value,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,
}

impl ScenarioConfig {
    /// Build the scenario config from layer files and CLI overrides.
    ///
    /// Layer files that do not exist are skipped. Later layers win.
    pub fn build(layers: &[PathBuf], cli_overrides: Option<Value>) -> Result<Self, ConfigError> {
        let mut merged = BuiltinDefaults::default().to_value();
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        for path in layers {
            if !path.exists() {
                debug!("config layer {} not found, skipping", path.display());
                continue;
            }
            let (value, digest) = Self::load_toml_file(path)?;
            debug!("merging config layer {} ({})", path.display(), digest);
            merged = deep_merge(merged, value);
            sources.push(ConfigSource {
                origin: ConfigOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides {
            merged = deep_merge(merged, cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        Self::validate_config(&merged)?;

        Ok(Self {
            config: merged,
            sources,
        })
    }

    /// Load the user-wide layer (if any) and then the scenario file.
    ///
    /// When the scenario file sits in another directory, file paths in the
    /// merged config are re-anchored on that directory.
    pub fn load_scenario(
        user_config: Option<&Path>,
        scenario_file: &Path,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut layers: Vec<PathBuf> = user_config.map(Path::to_path_buf).into_iter().collect();
        layers.push(scenario_file.to_path_buf());

        let mut config = Self::build(&layers, cli_overrides)?;

        if let Some(dir) = scenario_file
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
        {
            let rewritten = config.fix_relative_paths(dir);
            debug!("re-anchored {} path(s) on {}", rewritten, dir.display());
        }

        Ok(config)
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;

        let toml_value: toml::Value = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

        Ok((toml_to_json(toml_value), digest))
    }

    /// Instances must parse and have unique names
    fn validate_config(config: &Value) -> Result<(), ConfigError> {
        let instances = Self::parse_instances(config)?;

        let mut seen = HashSet::new();
        for instance in &instances {
            if instance.name.is_empty() {
                return Err(ConfigError::ValidationError(
                    "instance name must not be empty".to_string(),
                ));
            }
            if !seen.insert(instance.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate instance name: '{}'",
                    instance.name
                )));
            }
        }

        Ok(())
    }

    fn parse_instances(config: &Value) -> Result<Vec<InstanceDescriptor>, ConfigError> {
        match config.pointer("/vagrant/instances") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| ConfigError::ValidationError(format!("vagrant.instances: {}", e))),
        }
    }

    /// Re-anchor file paths on the directory of the scenario file.
    ///
    /// Used when the scenario file is not in the working directory. Returns
    /// how many values were rewritten.
    pub fn fix_relative_paths(&mut self, rel_dir: &Path) -> usize {
        let mut rewritten = 0;

        if let Some(Value::Object(ansible)) = self.config.get_mut("ansible") {
            rewritten += prefix_keys(ansible, ANSIBLE_PATH_KEYS, Some(rel_dir));

            if let Some(Value::Object(env)) = ansible.get_mut("raw_env_vars") {
                rewritten += prefix_keys(env, ENV_PATH_KEYS, Some(rel_dir));
            }
        }

        rewritten
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get a config value by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.config;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Get a config value as string
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    /// Get a config value as bool
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(|v| v.as_bool())
    }

    /// Declared instances
    pub fn instances(&self) -> Result<Vec<InstanceDescriptor>, ConfigError> {
        Self::parse_instances(&self.config)
    }

    /// Names of the configured platforms, in declaration order
    pub fn platform_names(&self) -> Vec<String> {
        self.names_under("vagrant.platforms")
    }

    /// Names of the configured providers, in declaration order
    pub fn provider_names(&self) -> Vec<String> {
        self.names_under("vagrant.providers")
    }

    fn names_under(&self, path: &str) -> Vec<String> {
        self.get(path)
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.get("name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// User-wide config layer, `~/.config/molecule/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/molecule/config.toml"))
}

/// Convert TOML Value to JSON Value
pub fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            Value::Object(map)
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
