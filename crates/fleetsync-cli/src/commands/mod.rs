//! Command handlers for the fleetsync CLI.

pub mod check;
pub mod sync;

use anyhow::{anyhow, Result};
use fleetsync_config::LoadedConfig;
use fleetsync_reconcile::SyncDirection;
use fleetsync_runtime::PassReport;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

pub fn load_config(paths: &[String]) -> Result<LoadedConfig> {
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    fleetsync_config::load_layered_yaml(&path_refs)
}

/// Parse a CLI `--direction` value.
pub fn parse_direction(raw: &str) -> Result<SyncDirection> {
    SyncDirection::parse(raw).map_err(|_| {
        anyhow!(
            "invalid --direction '{}'. expected one of: both | stein | divera | bidirectional | force-left | force-right",
            raw
        )
    })
}

pub fn print_report(r: &PassReport) {
    println!("pass_id={}", r.pass_id);
    println!("dry_run={}", r.dry_run);
    println!("divera_records={}", r.left_records);
    println!("stein_records={}", r.right_records);
    println!("matched={}", r.matched);
    println!("unchanged={}", r.unchanged);
    println!("updated_divera={}", r.updated_left);
    println!("updated_stein={}", r.updated_right);
    println!("skipped={}", r.skipped);
    println!("write_failures={}", r.write_failures);
}
