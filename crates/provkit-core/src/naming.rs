//! Instance host name derivation.
//!
//! A scenario declares instances by base name. The name handed to the
//! provider gets the platform label appended unless the instance opts out
//! with `append_platform_to_hostname = false`.

use log::debug;
use serde::{Deserialize, Serialize};

/// Per-instance naming options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceOptions {
    /// Append `-{platform}` to the host name (default: true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub append_platform_to_hostname: Option<bool>,
}

impl InstanceOptions {
    /// Resolved flag, applying the default when unset
    pub fn append_platform(&self) -> bool {
        self.append_platform_to_hostname.unwrap_or(true)
    }
}

/// An instance declared in the scenario config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDescriptor {
    /// Base name, unique within the scenario
    pub name: String,

    /// Naming options (absent means all defaults)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<InstanceOptions>,

    /// Inventory groups this instance belongs to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ansible_groups: Vec<String>,

    /// Full host name, filled in by [`populate_instance_names`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_name: Option<String>,
}

impl InstanceDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: None,
            ansible_groups: Vec::new(),
            vm_name: None,
        }
    }

    pub fn with_options(mut self, options: InstanceOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ansible_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the platform label is appended to this instance's host name
    pub fn append_platform(&self) -> bool {
        self.options
            .as_ref()
            .map_or(true, InstanceOptions::append_platform)
    }

    /// Host name of this instance on `platform`
    pub fn hostname(&self, platform: &str) -> String {
        if self.append_platform() {
            format!("{}-{}", self.name, platform)
        } else {
            self.name.clone()
        }
    }
}

/// Format the host name for `base_name` on `platform`.
///
/// Returns `None` when no instance in `instances` is called `base_name`.
pub fn format_instance_name(
    base_name: &str,
    platform: &str,
    instances: &[InstanceDescriptor],
) -> Option<String> {
    instances
        .iter()
        .find(|instance| instance.name == base_name)
        .map(|instance| instance.hostname(platform))
}

/// Record the full host name of every instance in its `vm_name`
pub fn populate_instance_names(instances: &mut [InstanceDescriptor], platform: &str) {
    for instance in instances.iter_mut() {
        let vm_name = instance.hostname(platform);
        debug!("instance '{}' -> '{}'", instance.name, vm_name);
        instance.vm_name = Some(vm_name);
    }
}
