//! Ansible inventory generation
//!
//! Builds the static inventory handed to `ansible-playbook`: one host line per
//! instance with its SSH connection details, followed by a section per
//! inventory group.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::Path;

use log::{debug, warn};
use provkit_core::InstanceDescriptor;
use serde::{Deserialize, Serialize};

use crate::output::write_file;

/// SSH connection details for one host, as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConnection {
    /// Address to connect to
    #[serde(alias = "HostName")]
    pub host: String,

    /// SSH port (default: 22)
    #[serde(default = "default_port", alias = "Port")]
    pub port: u16,

    /// Path to SSH private key
    #[serde(alias = "IdentityFile")]
    pub identity_file: String,

    /// SSH user (default: "vagrant")
    #[serde(default = "default_user", alias = "User")]
    pub user: String,
}

fn default_port() -> u16 {
    22
}

fn default_user() -> String {
    "vagrant".to_string()
}

/// A rendered inventory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    hosts: Vec<String>,
    groups: BTreeMap<String, Vec<String>>,
}

impl Inventory {
    /// Build the inventory for `instances` on `platform`.
    ///
    /// `connections` is keyed by full host name. Instances without a
    /// connection are left out of the host lines but still listed in their
    /// groups.
    pub fn build(
        instances: &[InstanceDescriptor],
        platform: &str,
        connections: &BTreeMap<String, HostConnection>,
    ) -> Self {
        let mut inventory = Self::default();

        for instance in instances {
            let vm_name = instance.hostname(platform);
            match connections.get(&vm_name) {
                Some(conn) => inventory.hosts.push(format!(
                    "{} ansible_ssh_host={} ansible_ssh_port={} ansible_ssh_private_key_file={} ansible_ssh_user={}",
                    vm_name, conn.host, conn.port, conn.identity_file, conn.user
                )),
                None => warn!("no SSH connection details for '{}', skipping host line", vm_name),
            }
        }

        for instance in instances {
            for group in &instance.ansible_groups {
                inventory
                    .groups
                    .entry(group.clone())
                    .or_default()
                    .push(instance.hostname(platform));
            }
        }

        debug!(
            "inventory: {} host(s), {} group(s)",
            inventory.hosts.len(),
            inventory.groups.len()
        );
        inventory
    }

    /// Group names in sorted order
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Write the rendered inventory to `path`
    pub fn write(&self, path: &Path) -> io::Result<()> {
        write_file(path, self.to_string())
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for host in &self.hosts {
            writeln!(f, "{}", host)?;
        }
        for (group, members) in &self.groups {
            write!(f, "\n[{}]\n", group)?;
            for member in members {
                writeln!(f, "{}", member)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provkit_core::InstanceOptions;

    fn connection(host: &str, port: u16) -> HostConnection {
        HostConnection {
            host: host.to_string(),
            port,
            identity_file: "/home/user/.vagrant.d/insecure_private_key".to_string(),
            user: "vagrant".to_string(),
        }
    }

    fn instances() -> Vec<InstanceDescriptor> {
        vec![
            InstanceDescriptor::new("web-01").with_groups(["web", "all_hosts"]),
            InstanceDescriptor::new("db-01")
                .with_options(InstanceOptions {
                    append_platform_to_hostname: Some(false),
                })
                .with_groups(["all_hosts"]),
        ]
    }

    #[test]
    fn test_build_inventory() {
        let mut connections = BTreeMap::new();
        connections.insert("web-01-trusty64".to_string(), connection("127.0.0.1", 2222));
        connections.insert("db-01".to_string(), connection("127.0.0.1", 2200));

        let inventory = Inventory::build(&instances(), "trusty64", &connections);

        let expected = "\
web-01-trusty64 ansible_ssh_host=127.0.0.1 ansible_ssh_port=2222 ansible_ssh_private_key_file=/home/user/.vagrant.d/insecure_private_key ansible_ssh_user=vagrant
db-01 ansible_ssh_host=127.0.0.1 ansible_ssh_port=2200 ansible_ssh_private_key_file=/home/user/.vagrant.d/insecure_private_key ansible_ssh_user=vagrant

[all_hosts]
web-01-trusty64
db-01

[web]
web-01-trusty64
";
        assert_eq!(inventory.to_string(), expected);
        assert_eq!(inventory.group_names().collect::<Vec<_>>(), vec!["all_hosts", "web"]);
    }

    #[test]
    fn test_missing_connection_skips_host_line() {
        let inventory = Inventory::build(&instances(), "trusty64", &BTreeMap::new());
        let rendered = inventory.to_string();

        assert!(!rendered.contains("ansible_ssh_host"));
        assert!(rendered.contains("[web]\nweb-01-trusty64\n"));
    }

    #[test]
    fn test_groups_use_each_instance_options() {
        // same base name twice, only the second opts out of the suffix
        let instances = vec![
            InstanceDescriptor::new("aio-01").with_groups(["first"]),
            InstanceDescriptor::new("aio-01")
                .with_options(InstanceOptions {
                    append_platform_to_hostname: Some(false),
                })
                .with_groups(["second"]),
        ];

        let rendered = Inventory::build(&instances, "centos7", &BTreeMap::new()).to_string();

        assert!(rendered.contains("[first]\naio-01-centos7\n"));
        assert!(rendered.contains("[second]\naio-01\n"));
    }

    #[test]
    fn test_connection_from_ssh_config_keys() {
        let conn: HostConnection = serde_json::from_str(
            r#"{"HostName": "10.0.0.5", "Port": 2201, "IdentityFile": "/tmp/key", "User": "admin"}"#,
        )
        .unwrap();
        assert_eq!(conn.host, "10.0.0.5");
        assert_eq!(conn.port, 2201);
        assert_eq!(conn.user, "admin");

        let conn: HostConnection =
            serde_json::from_str(r#"{"host": "10.0.0.6", "identity_file": "/tmp/key"}"#).unwrap();
        assert_eq!(conn.port, 22);
        assert_eq!(conn.user, "vagrant");
    }

    #[test]
    fn test_write_inventory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ansible_inventory");
        let inventory = Inventory::build(&instances(), "centos7", &BTreeMap::new());

        inventory.write(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), inventory.to_string());
    }
}
