//! Pure helpers shared by the provkit tooling.
//!
//! Deep merging of nested config mappings, instance host name derivation,
//! and relative path prefixing. Nothing in this crate touches the filesystem.

mod merge;
mod naming;
mod paths;

pub use merge::{deep_merge, merge, merge_layers, MergeError, ValueKind};
pub use naming::{
    format_instance_name, populate_instance_names, InstanceDescriptor, InstanceOptions,
};
pub use paths::{prefix_keys, prefix_with_rel_path};

/// JSON object used as the mapping type throughout the workspace.
pub type Mapping = serde_json::Map<String, serde_json::Value>;
