//! Divera 24/7 client.
//!
//! Read: `GET {base}/api/v2/pull/vehicle-status?accesskey=…`
//! Write: `POST {base}/api/v2/using-vehicles/set-status/{id}?accesskey=…`
//!
//! The access key travels as a query parameter, so URLs are stripped from
//! transport errors and never logged.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use fleetsync_reconcile::snapshot_adapter::{divera_snapshot, NormalizedSnapshot};
use fleetsync_reconcile::{normalize_comment, Platform, UpdatePayload};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::{FleetPlatform, RequestGate};

#[derive(Debug, Clone)]
pub struct DiveraClient {
    accesskey: String,
    http: reqwest::Client,
    base_url: String,
    gate: Arc<RequestGate>,
}

impl DiveraClient {
    pub fn new_with_base_url(accesskey: String, base_url: String, gate: Arc<RequestGate>) -> Self {
        Self {
            accesskey,
            http: reqwest::Client::new(),
            base_url,
            gate,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v2/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait::async_trait]
impl FleetPlatform for DiveraClient {
    fn platform(&self) -> Platform {
        Platform::Divera
    }

    async fn fetch_snapshot(&self) -> Result<NormalizedSnapshot> {
        self.gate.acquire().await;
        let resp = self
            .http
            .get(self.api_url("pull/vehicle-status"))
            .query(&[("accesskey", self.accesskey.as_str())])
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("divera vehicle-status request failed")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!(
                "divera vehicle-status http error status={}",
                status.as_u16()
            ));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("divera vehicle-status json decode failed")?;

        let snapshot = divera_snapshot(&body).context("divera vehicle-status")?;
        for err in &snapshot.errors {
            warn!(platform = "divera", %err, "dropping vehicle record");
        }
        debug!(
            platform = "divera",
            records = snapshot.records.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    async fn push_status(&self, source_id: &str, payload: &UpdatePayload) -> Result<()> {
        let code = payload.status.as_divera_code().ok_or_else(|| {
            anyhow!(
                "divera write for vehicle {} carries non-divera status {}",
                source_id,
                payload.status
            )
        })?;

        // Divera keeps the note on one line.
        let body = json!({
            "status": code,
            "status_id": code,
            "status_note": normalize_comment(Some(&payload.comment)),
        });
        debug!(platform = "divera", vehicle_id = source_id, payload = %body, "set-status");

        self.gate.acquire().await;
        let resp = self
            .http
            .post(self.api_url(&format!("using-vehicles/set-status/{source_id}")))
            .query(&[("accesskey", self.accesskey.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("divera set-status request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(anyhow!(
                "divera set-status http error status={} body={}",
                status.as_u16(),
                text
            ));
        }
        Ok(())
    }
}
