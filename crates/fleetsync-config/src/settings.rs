//! Typed, validated view of the loaded config.
//!
//! ```yaml
//! sync:
//!   direction: bidirectional   # bidirectional | force_left | force_right
//!   cooldown_ms: 1000          # minimum gap between two outbound requests
//! divera:
//!   base_url: https://app.divera247.com
//!   keys_env:
//!     accesskey: FLEETSYNC_DIVERA_ACCESSKEY
//! stein:
//!   base_url: https://stein.app
//!   business_unit: Paderborn
//!   group_ids: [1, 5]
//!   keys_env:
//!     api_key: FLEETSYNC_STEIN_API_KEY
//! ```

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use fleetsync_reconcile::{GroupFilter, SyncDirection};
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_COOLDOWN_MS: u64 = 1_000;
pub const DEFAULT_DIVERA_BASE_URL: &str = "https://app.divera247.com";
pub const DEFAULT_STEIN_BASE_URL: &str = "https://stein.app";
pub const DEFAULT_STEIN_GROUP_IDS: [i64; 2] = [1, 5];

/// Upper bound on `sync.cooldown_ms`.
const MAX_COOLDOWN_MS: u64 = 60_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiveraSettings {
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SteinSettings {
    pub base_url: String,
    /// Name of the one business unit ("Ortsverband") to sync.
    pub business_unit: String,
    pub group_ids: Vec<i64>,
}

impl SteinSettings {
    pub fn group_filter(&self) -> GroupFilter {
        GroupFilter::new(self.group_ids.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub direction: SyncDirection,
    pub cooldown: Duration,
    pub divera: DiveraSettings,
    pub stein: SteinSettings,
}

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(default)]
    sync: RawSync,
    #[serde(default)]
    divera: RawDivera,
    #[serde(default)]
    stein: RawStein,
}

#[derive(Debug, Default, Deserialize)]
struct RawSync {
    direction: Option<String>,
    cooldown_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDivera {
    base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawStein {
    base_url: Option<String>,
    business_unit: Option<String>,
    group_ids: Option<Vec<i64>>,
}

impl SyncSettings {
    /// Build settings from the merged config. Unknown keys are ignored here;
    /// `report_unused_keys` is the place that flags them.
    pub fn from_config_json(config_json: &Value) -> Result<Self> {
        let raw: RawSettings =
            serde_json::from_value(config_json.clone()).context("config has invalid shape")?;

        let direction = match raw.sync.direction.as_deref() {
            Some(s) => SyncDirection::parse(s).map_err(|e| anyhow!("sync.direction: {e}"))?,
            None => SyncDirection::default(),
        };

        let cooldown_ms = raw.sync.cooldown_ms.unwrap_or(DEFAULT_COOLDOWN_MS);
        if cooldown_ms > MAX_COOLDOWN_MS {
            bail!("sync.cooldown_ms={cooldown_ms} exceeds maximum of {MAX_COOLDOWN_MS}");
        }

        let divera = DiveraSettings {
            base_url: base_url(raw.divera.base_url, DEFAULT_DIVERA_BASE_URL, "divera.base_url")?,
        };

        let business_unit = raw
            .stein
            .business_unit
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .context("stein.business_unit is required")?;

        let group_ids = raw
            .stein
            .group_ids
            .unwrap_or_else(|| DEFAULT_STEIN_GROUP_IDS.to_vec());
        if group_ids.is_empty() {
            bail!("stein.group_ids must not be empty");
        }

        let stein = SteinSettings {
            base_url: base_url(raw.stein.base_url, DEFAULT_STEIN_BASE_URL, "stein.base_url")?,
            business_unit,
            group_ids,
        };

        Ok(Self {
            direction,
            cooldown: Duration::from_millis(cooldown_ms),
            divera,
            stein,
        })
    }

    /// Same settings with the direction replaced (CLI `--direction`).
    pub fn with_direction(mut self, direction: SyncDirection) -> Self {
        self.direction = direction;
        self
    }
}

fn base_url(raw: Option<String>, default: &str, field: &str) -> Result<String> {
    let url = raw.unwrap_or_else(|| default.to_string());
    let url = url.trim().trim_end_matches('/').to_string();
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        bail!("{field} must be an http(s) URL, got '{url}'");
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_apply() {
        let s = SyncSettings::from_config_json(&json!({"stein": {"business_unit": "Paderborn"}}))
            .unwrap();
        assert_eq!(s.direction, SyncDirection::Bidirectional);
        assert_eq!(s.cooldown, Duration::from_millis(DEFAULT_COOLDOWN_MS));
        assert_eq!(s.divera.base_url, DEFAULT_DIVERA_BASE_URL);
        assert_eq!(s.stein.base_url, DEFAULT_STEIN_BASE_URL);
        assert_eq!(s.stein.group_ids, vec![1, 5]);
    }

    #[test]
    fn business_unit_is_required() {
        let err = SyncSettings::from_config_json(&json!({})).unwrap_err();
        assert!(err.to_string().contains("stein.business_unit"));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let s = SyncSettings::from_config_json(&json!({
            "divera": {"base_url": "http://127.0.0.1:9000/"},
            "stein": {"business_unit": "X"}
        }))
        .unwrap();
        assert_eq!(s.divera.base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn non_http_url_is_rejected() {
        assert!(SyncSettings::from_config_json(&json!({
            "stein": {"business_unit": "X", "base_url": "ftp://stein.app"}
        }))
        .is_err());
    }

    #[test]
    fn empty_group_ids_rejected() {
        assert!(SyncSettings::from_config_json(&json!({
            "stein": {"business_unit": "X", "group_ids": []}
        }))
        .is_err());
    }

    #[test]
    fn direction_alias_accepted() {
        let s = SyncSettings::from_config_json(&json!({
            "sync": {"direction": "divera"},
            "stein": {"business_unit": "X"}
        }))
        .unwrap();
        assert_eq!(s.direction, SyncDirection::ForceRight);
    }

    #[test]
    fn excessive_cooldown_rejected() {
        assert!(SyncSettings::from_config_json(&json!({
            "sync": {"cooldown_ms": 3_600_000},
            "stein": {"business_unit": "X"}
        }))
        .is_err());
    }
}
