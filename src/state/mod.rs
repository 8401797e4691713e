//! Scenario state file
//!
//! Remembers the platform and provider the user last selected so later
//! commands pick them up without flags. Stored as JSON in the working
//! directory (`molecule.state_file`).

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use crate::output::write_file;

/// Name used when no platforms or providers are configured
pub const STATIC_FALLBACK: &str = "static";

/// Errors for state file operations
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid {kind} '{name}'")]
    UnknownChoice { kind: &'static str, name: String },
}

/// Persisted scenario selections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_platform: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,
}

impl ScenarioState {
    /// Load from file, returning `None` if it does not exist yet
    pub fn load(path: &Path) -> Result<Option<Self>, StateError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Load from file, starting fresh if it does not exist yet
    pub fn load_or_default(path: &Path) -> Result<Self, StateError> {
        Ok(Self::load(path)?.unwrap_or_default())
    }

    /// Write to file, creating its directory if needed
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        write_file(path, json)?;
        Ok(())
    }

    /// Store `name` as the default platform if it is one of `candidates`
    pub fn select_platform(&mut self, name: &str, candidates: &[String]) -> Result<(), StateError> {
        self.default_platform = Some(checked_choice("platform", name, candidates)?);
        Ok(())
    }

    /// Store `name` as the default provider if it is one of `candidates`
    pub fn select_provider(&mut self, name: &str, candidates: &[String]) -> Result<(), StateError> {
        self.default_provider = Some(checked_choice("provider", name, candidates)?);
        Ok(())
    }

    /// Platform to use given the configured candidates
    pub fn platform(&self, candidates: &[String]) -> String {
        resolve_default(candidates, self.default_platform.as_deref())
            .unwrap_or_else(|| STATIC_FALLBACK.to_string())
    }

    /// Provider to use given the configured candidates
    pub fn provider(&self, candidates: &[String]) -> String {
        resolve_default(candidates, self.default_provider.as_deref())
            .unwrap_or_else(|| STATIC_FALLBACK.to_string())
    }
}

fn checked_choice(kind: &'static str, name: &str, candidates: &[String]) -> Result<String, StateError> {
    if candidates.iter().any(|candidate| candidate == name) {
        Ok(name.to_string())
    } else {
        Err(StateError::UnknownChoice {
            kind,
            name: name.to_string(),
        })
    }
}

/// Pick the stored choice if there is one, else the first candidate.
///
/// Returns `None` only when there are no candidates. An empty stored value
/// counts as unset.
pub fn resolve_default(candidates: &[String], stored: Option<&str>) -> Option<String> {
    let first = candidates.first()?;
    match stored {
        Some(stored) if !stored.is_empty() => {
            debug!("using stored selection '{}'", stored);
            Some(stored.to_string())
        }
        _ => Some(first.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_default() {
        let platforms = names(&["trusty64", "centos7"]);

        assert_eq!(resolve_default(&[], Some("centos7")), None);
        assert_eq!(resolve_default(&platforms, None).as_deref(), Some("trusty64"));
        assert_eq!(resolve_default(&platforms, Some("")).as_deref(), Some("trusty64"));
        assert_eq!(
            resolve_default(&platforms, Some("centos7")).as_deref(),
            Some("centos7")
        );
    }

    #[test]
    fn test_static_fallback() {
        let state = ScenarioState {
            default_platform: Some("centos7".to_string()),
            default_provider: None,
        };
        assert_eq!(state.platform(&[]), STATIC_FALLBACK);
        assert_eq!(state.provider(&names(&["virtualbox"])), "virtualbox");
    }

    #[test]
    fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");
        assert_eq!(ScenarioState::load(&path).unwrap(), None);
        assert_eq!(
            ScenarioState::load_or_default(&path).unwrap(),
            ScenarioState::default()
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");
        let state = ScenarioState {
            default_platform: Some("centos7".to_string()),
            default_provider: Some("virtualbox".to_string()),
        };

        state.save(&path).unwrap();

        assert_eq!(ScenarioState::load(&path).unwrap(), Some(state));
    }

    #[test]
    fn test_select_checks_candidates() {
        let mut state = ScenarioState::default();
        let providers = names(&["virtualbox", "libvirt"]);

        state.select_provider("libvirt", &providers).unwrap();
        assert_eq!(state.provider(&providers), "libvirt");

        let err = state.select_platform("centos7", &names(&["trusty64"])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid platform 'centos7'");
        assert_eq!(state.default_platform, None);
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".molecule").join("state");

        ScenarioState::default().save(&path).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_load_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            ScenarioState::load(&path),
            Err(StateError::JsonError(_))
        ));
    }
}
