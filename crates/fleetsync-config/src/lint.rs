//! Unused-key lint.
//!
//! Every leaf of the effective config should be read by something. A leaf no
//! consumed pointer covers is usually a typo (`stein.buname`) that would
//! otherwise be silently ignored.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::leaves::leaves;

/// JSON pointers read by the sync tool.
///
/// Keep this in step with `settings::SyncSettings::from_config_json` and
/// `secrets::parse_env_names`. Do not "wish-consume" whole sections.
pub const CONSUMED_POINTERS: &[&str] = &[
    "/sync/direction",
    "/sync/cooldown_ms",
    "/divera/base_url",
    "/divera/keys_env/accesskey",
    "/stein/base_url",
    "/stein/business_unit",
    "/stein/group_ids",
    "/stein/keys_env/api_key",
    "/stein/keys_env/username",
    "/stein/keys_env/password",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Leaf pointers no consumed pointer covers, sorted.
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Lint `config_json` against [`CONSUMED_POINTERS`]. With
/// [`UnusedKeyPolicy::Fail`] a non-clean report is returned as an error.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let mut unused: Vec<String> = leaves(config_json)
        .into_iter()
        .map(|(pointer, _)| pointer)
        .filter(|leaf| !CONSUMED_POINTERS.iter().any(|c| covers(c, leaf)))
        .collect();
    unused.sort();

    let report = UnusedKeyReport {
        unused_leaf_pointers: unused,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        let shown: Vec<&str> = report
            .unused_leaf_pointers
            .iter()
            .take(12)
            .map(String::as_str)
            .collect();
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config key(s): {}",
            report.unused_leaf_pointers.len(),
            shown.join(", ")
        );
    }
    Ok(report)
}

/// `/a/b` covers `/a/b` and `/a/b/0` but not `/a/bc`.
fn covers(consumed: &str, leaf: &str) -> bool {
    match leaf.strip_prefix(consumed) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
