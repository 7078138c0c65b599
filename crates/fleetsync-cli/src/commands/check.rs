use anyhow::Result;
use fleetsync_config::{report_unused_keys, SyncSettings, UnusedKeyPolicy};

use super::load_config;

pub fn run_check(config_paths: &[String], strict: bool) -> Result<()> {
    let loaded = load_config(config_paths)?;
    let settings = SyncSettings::from_config_json(&loaded.config_json)?;

    let policy = if strict {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = report_unused_keys(&loaded.config_json, policy)?;

    println!("config_hash={}", loaded.config_hash);
    println!("direction={}", settings.direction);
    println!("cooldown_ms={}", settings.cooldown.as_millis());
    println!("divera_base_url={}", settings.divera.base_url);
    println!("stein_base_url={}", settings.stein.base_url);
    println!("stein_business_unit={}", settings.stein.business_unit);
    let groups: Vec<String> = settings.stein.group_ids.iter().map(|g| g.to_string()).collect();
    println!("stein_group_ids={}", groups.join(","));
    println!("unused_keys={}", report.unused_leaf_pointers.len());
    for p in &report.unused_leaf_pointers {
        println!("unused_key={p}");
    }
    Ok(())
}
