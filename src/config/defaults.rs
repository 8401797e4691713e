//! Built-in scenario defaults (layer 1)
//!
//! Hardcoded defaults for every key the tooling reads.

use serde::{Deserialize, Serialize};

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Working directory for generated files (default: ".molecule")
    pub molecule_dir: String,

    /// Directory templates are looked up in (default: "templates")
    pub template_dir: String,

    /// Scenario state file name inside `molecule_dir` (default: "state")
    pub state_file: String,

    /// Generated inventory file name inside `molecule_dir`
    pub inventory_file: String,

    /// Generated ansible.cfg name inside `molecule_dir`
    pub ansible_config_file: String,

    /// Playbook to run (default: "playbook.yml")
    pub playbook: String,

    /// Verify SSH host keys (default: false)
    pub host_key_checking: bool,

    /// Extra SSH arguments passed through to ansible
    pub raw_ssh_args: Vec<String>,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            molecule_dir: ".molecule".to_string(),
            template_dir: "templates".to_string(),
            state_file: "state".to_string(),
            inventory_file: "ansible_inventory".to_string(),
            ansible_config_file: "ansible.cfg".to_string(),
            playbook: "playbook.yml".to_string(),
            host_key_checking: false,
            raw_ssh_args: vec![
                "-o UserKnownHostsFile=/dev/null".to_string(),
                "-o IdentitiesOnly=yes".to_string(),
            ],
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging.
    ///
    /// File names are joined onto `molecule_dir` here so later layers can
    /// override either the directory-relative or the final path.
    pub fn to_value(&self) -> serde_json::Value {
        let in_dir = |name: &str| format!("{}/{}", self.molecule_dir, name);

        serde_json::json!({
            "molecule": {
                "molecule_dir": self.molecule_dir,
                "template_dir": self.template_dir,
                "state_file": in_dir(&self.state_file),
                "inventory_file": in_dir(&self.inventory_file),
                "config_file": in_dir(&self.ansible_config_file)
            },
            "ansible": {
                "playbook": self.playbook,
                "config_file": in_dir(&self.ansible_config_file),
                "inventory_file": in_dir(&self.inventory_file),
                "host_key_checking": self.host_key_checking,
                "raw_ssh_args": self.raw_ssh_args
            },
            "vagrant": {
                "platforms": [],
                "providers": [],
                "instances": []
            }
        })
    }
}
