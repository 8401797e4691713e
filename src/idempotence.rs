//! Idempotence check on provisioning output.

use regex_lite::Regex;
use std::sync::OnceLock;

fn changed_pattern() -> &'static Regex {
    static CHANGED: OnceLock<Regex> = OnceLock::new();
    CHANGED.get_or_init(|| {
        Regex::new(r"changed=[1-9][0-9]*")
            .unwrap_or_else(|e| unreachable!("changed pattern is valid: {e}"))
    })
}

/// True when no host in the play recap reports a change.
///
/// A second provisioning run over an already converged instance must report
/// `changed=0` everywhere.
pub fn is_idempotent(output: &str) -> bool {
    !changed_pattern().is_match(output)
}
