//! Scenario configuration
//!
//! Implements the layered configuration merge:
//! 1. Built-in defaults
//! 2. User-wide config (~/.config/molecule/config.toml)
//! 3. Scenario file (molecule.toml)
//! 4. CLI overrides

mod defaults;
mod scenario;

pub use defaults::BuiltinDefaults;
pub use scenario::{
    toml_to_json, user_config_path, ConfigError, ConfigOrigin, ConfigSource, ScenarioConfig,
};
