//! fleetsync-config
//!
//! Layered YAML configuration for the sync tool:
//! - merge order: earlier documents are the base, later ones override
//! - canonical JSON + SHA-256 `config_hash` so a pass can be tied to its config
//! - literal secrets are refused; YAML stores env var NAMES only (see [`secrets`])
//! - unused-key lint against the registry of pointers the code actually reads
//! - typed [`SyncSettings`] for the runtime (see [`settings`])
//!
//! JSON config files load as well (YAML is a superset).

mod guard;
mod leaves;
mod lint;
pub mod secrets;
pub mod settings;

pub use lint::{report_unused_keys, UnusedKeyPolicy, UnusedKeyReport, CONSUMED_POINTERS};
pub use settings::{DiveraSettings, SteinSettings, SyncSettings};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// The effective config after merging every layer.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Hex SHA-256 of `canonical_json`.
    pub config_hash: String,
    /// Compact JSON with object keys in sorted order.
    pub canonical_json: String,
    pub config_json: Value,
}

/// Read and merge config files in the given order.
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let docs = paths
        .iter()
        .map(|p| {
            std::fs::read_to_string(p).with_context(|| format!("failed to read config path: {p}"))
        })
        .collect::<Result<Vec<String>>>()?;
    let refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    load_layered_yaml_from_strings(&refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = Value::Object(Map::new());
    for (layer, raw) in yaml_docs.iter().enumerate() {
        let doc: serde_yaml::Value = serde_yaml::from_str(raw)
            .with_context(|| format!("config layer {layer}: invalid yaml"))?;
        let doc = serde_json::to_value(doc)
            .with_context(|| format!("config layer {layer}: not representable as json"))?;
        // An empty document parses as null; it contributes nothing.
        if !doc.is_null() {
            merge_into(&mut merged, doc);
        }
    }

    guard::reject_secret_literals(&merged)?;

    // serde_json's default Map is a BTreeMap, so serialization is canonical.
    let canonical_json = serde_json::to_string(&merged).context("canonical json serialize failed")?;
    let config_hash = hex::encode(Sha256::digest(canonical_json.as_bytes()));
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

/// Objects merge key by key; anything else in `overlay` replaces `base`.
fn merge_into(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn later_layer_overrides_earlier() {
        let loaded = load_layered_yaml_from_strings(&[
            "sync:\n  direction: bidirectional\n  cooldown_ms: 500\n",
            "sync:\n  direction: force_left\n",
        ])
        .unwrap();
        assert_eq!(loaded.config_json["sync"]["direction"], "force_left");
        assert_eq!(loaded.config_json["sync"]["cooldown_ms"], 500);
    }

    #[test]
    fn arrays_are_replaced_not_concatenated() {
        let mut base = json!({"stein": {"group_ids": [1, 5]}});
        merge_into(&mut base, json!({"stein": {"group_ids": [3]}}));
        assert_eq!(base, json!({"stein": {"group_ids": [3]}}));
    }

    #[test]
    fn empty_layer_is_ignored() {
        let a = load_layered_yaml_from_strings(&["sync:\n  cooldown_ms: 1\n"]).unwrap();
        let b = load_layered_yaml_from_strings(&["sync:\n  cooldown_ms: 1\n", ""]).unwrap();
        assert_eq!(a.config_hash, b.config_hash);
    }

    #[test]
    fn invalid_yaml_names_the_layer() {
        let err = load_layered_yaml_from_strings(&["a: 1\n", "b: [\n"]).unwrap_err();
        assert!(err.to_string().contains("layer 1"));
    }
}
