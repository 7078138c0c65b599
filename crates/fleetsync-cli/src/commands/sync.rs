use std::sync::Arc;

use anyhow::{Context, Result};
use fleetsync_config::secrets::resolve_secrets;
use fleetsync_config::{report_unused_keys, SyncSettings, UnusedKeyPolicy};
use fleetsync_platforms::{DiveraClient, RequestGate, SteinClient};
use fleetsync_reconcile::ReconciliationEngine;
use fleetsync_runtime::{PassReport, SyncPass};
use tracing::{info, warn};

use super::{load_config, parse_direction};

pub async fn run_sync(
    config_paths: &[String],
    direction: Option<&str>,
    dry_run: bool,
) -> Result<PassReport> {
    let direction_override = direction.map(parse_direction).transpose()?;

    let loaded = load_config(config_paths)?;
    info!(config_hash = %loaded.config_hash, "config loaded");

    let unused = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
    if !unused.is_clean() {
        warn!(keys = ?unused.unused_leaf_pointers, "config has unused keys");
    }

    let mut settings = SyncSettings::from_config_json(&loaded.config_json)?;
    if let Some(d) = direction_override {
        settings = settings.with_direction(d);
    }
    let secrets = resolve_secrets(&loaded.config_json)?;

    let gate = Arc::new(RequestGate::new(settings.cooldown));
    let divera = DiveraClient::new_with_base_url(
        secrets.divera_accesskey.clone(),
        settings.divera.base_url.clone(),
        gate.clone(),
    );
    let stein = SteinClient::new_with_base_url(
        settings.stein.base_url.clone(),
        settings.stein.business_unit.clone(),
        &secrets.stein_api_key,
        secrets.stein_login.clone(),
        gate,
    )
    .context("stein client setup failed")?;

    info!(
        direction = %settings.direction,
        business_unit = %settings.stein.business_unit,
        dry_run,
        "starting sync"
    );

    let report = SyncPass::new(
        &divera,
        &stein,
        ReconciliationEngine::new(settings.direction),
    )
    .with_group_filter(settings.stein.group_filter())
    .with_dry_run(dry_run)
    .run()
    .await?;

    Ok(report)
}
