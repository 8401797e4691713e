//! provkit - helpers for provisioning test scenarios
//!
//! Layered scenario configuration, instance naming, template rendering,
//! inventory generation, ansible-playbook arguments and the small
//! file/console writers these share.
//! The pure merge and naming logic lives in `provkit-core` and is re-exported
//! here.

pub mod config;
pub mod idempotence;
pub mod inventory;
pub mod output;
pub mod playbook;
pub mod state;
pub mod template;

pub use config::{ConfigError, ScenarioConfig};
pub use inventory::{HostConnection, Inventory};
pub use output::{print_stderr, print_stdout, write_file, write_stream, Stream};
pub use playbook::PlaybookInvocation;
pub use provkit_core::{
    deep_merge, format_instance_name, merge, merge_layers, populate_instance_names, prefix_keys,
    prefix_with_rel_path, InstanceDescriptor, InstanceOptions, Mapping, MergeError, ValueKind,
};
pub use state::{ScenarioState, StateError};
pub use template::{render_str, write_template, TemplateError};
