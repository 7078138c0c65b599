//! stein.app client.
//!
//! All endpoints live under `{base}/api/api`. Every request carries the
//! `X-API-KEY` header; with a configured login the client also holds a
//! session cookie (in memory only).
//!
//! Session setup runs lazily on first use:
//! 1. `GET /userinfo`; a body without `name` means no session, so
//!    `POST /login_check` and read `/userinfo` again.
//! 2. `GET /app/data` and pick the business unit by name from `bus[]`.
//!
//! Writes re-read the asset list and PATCH the full current record with the
//! new `status` and `comment` merged in.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use fleetsync_config::secrets::SteinLogin;
use fleetsync_reconcile::snapshot_adapter::{stein_snapshot, NormalizedSnapshot};
use fleetsync_reconcile::{Platform, UpdatePayload};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::{FleetPlatform, RequestGate};

/// The business unit the client is bound to, resolved from `/app/data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessUnit {
    pub id: i64,
    pub name: String,
}

#[derive(Debug)]
pub struct SteinClient {
    http: reqwest::Client,
    api_url: String,
    business_unit: String,
    login: Option<SteinLogin>,
    gate: Arc<RequestGate>,
    session: OnceCell<BusinessUnit>,
}

impl SteinClient {
    pub fn new_with_base_url(
        base_url: String,
        business_unit: String,
        api_key: &str,
        login: Option<SteinLogin>,
        gate: Arc<RequestGate>,
    ) -> Result<Self> {
        let mut api_key_value =
            HeaderValue::from_str(api_key).context("stein api key is not a valid header value")?;
        api_key_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
        headers.insert("X-API-KEY", api_key_value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .context("stein http client build failed")?;

        Ok(Self {
            http,
            api_url: format!("{}/api/api", base_url.trim_end_matches('/')),
            business_unit,
            login,
            gate,
            session: OnceCell::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }

    async fn send(&self, req: RequestBuilder) -> reqwest::Result<Response> {
        self.gate.acquire().await;
        req.send().await
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let resp = self
            .send(self.http.get(self.url(path)))
            .await
            .with_context(|| format!("stein GET /{path} failed"))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("stein GET /{} http error status={}", path, status.as_u16());
        }
        resp.json()
            .await
            .with_context(|| format!("stein GET /{path} json decode failed"))
    }

    /// Log in (when credentials are configured) and resolve the business
    /// unit. Runs once per client.
    pub async fn connect(&self) -> Result<&BusinessUnit> {
        self.session
            .get_or_try_init(|| async {
                if let Some(login) = &self.login {
                    self.ensure_login(login).await?;
                }
                self.resolve_business_unit().await
            })
            .await
    }

    async fn ensure_login(&self, login: &SteinLogin) -> Result<()> {
        let userinfo = self.get_json("userinfo").await?;
        if userinfo.get("name").is_some() {
            debug!(platform = "stein", "existing session reused");
            return Ok(());
        }

        let resp = self
            .send(self.http.post(self.url("login_check")).json(&json!({
                "username": login.username,
                "password": login.password,
            })))
            .await
            .context("stein login request failed")?;
        let status = resp.status();
        if !status.is_success() {
            bail!("stein login rejected status={}", status.as_u16());
        }

        let userinfo = self.get_json("userinfo").await?;
        if userinfo.get("name").is_none() {
            bail!("stein login did not yield a session (userinfo has no name)");
        }
        info!(platform = "stein", "logged in");
        Ok(())
    }

    async fn resolve_business_unit(&self) -> Result<BusinessUnit> {
        let data = self.get_json("app/data").await?;
        let bus = data
            .get("bus")
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow!("stein /app/data has no 'bus' array"))?;

        let bu = bus
            .iter()
            .find(|bu| {
                bu.get("name").and_then(Value::as_str) == Some(self.business_unit.as_str())
            })
            .ok_or_else(|| anyhow!("stein business unit '{}' not found", self.business_unit))?;

        let id = bu
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                anyhow!(
                    "stein business unit '{}' has no numeric id",
                    self.business_unit
                )
            })?;

        debug!(platform = "stein", bu_id = id, "business unit resolved");
        Ok(BusinessUnit {
            id,
            name: self.business_unit.clone(),
        })
    }

    /// Raw asset list of the business unit, as Stein returns it.
    pub async fn fetch_assets(&self) -> Result<Value> {
        let bu = self.connect().await?;
        let resp = self
            .send(
                self.http
                    .get(self.url("assets/"))
                    .query(&[("buIds", bu.id)]),
            )
            .await
            .context("stein assets request failed")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("stein assets http error status={}", status.as_u16());
        }
        resp.json().await.context("stein assets json decode failed")
    }

    /// Merge `update` into the current record of asset `id` and PATCH it back.
    /// `id` in `update` is ignored so the write can never retarget another asset.
    pub async fn update_asset(
        &self,
        id: i64,
        update: &serde_json::Map<String, Value>,
        notify: bool,
    ) -> Result<()> {
        let assets = self.fetch_assets().await?;
        let mut record = assets
            .as_array()
            .and_then(|list| {
                list.iter()
                    .find(|a| a.get("id").and_then(Value::as_i64) == Some(id))
            })
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| anyhow!("stein asset {id} not found in business unit"))?;

        for (k, v) in update {
            if k != "id" {
                record.insert(k.clone(), v.clone());
            }
        }
        debug!(platform = "stein", asset_id = id, payload = %serde_json::Value::Object(record.clone()), "patch");

        let resp = self
            .send(
                self.http
                    .patch(self.url(&format!("assets/{id}")))
                    .query(&[("notifyRadio", if notify { "true" } else { "false" })])
                    .json(&record),
            )
            .await
            .context("stein asset update request failed")?;

        let status = resp.status();
        if status != StatusCode::OK {
            let text = resp.text().await.unwrap_or_default();
            bail!(
                "stein asset update http error status={} body={}",
                status.as_u16(),
                text
            );
        }
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        let resp = self
            .send(self.http.post(self.url("logout")))
            .await
            .context("stein logout request failed")?;
        let status = resp.status();
        if status != StatusCode::NO_CONTENT {
            bail!("stein logout unexpected status={}", status.as_u16());
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl FleetPlatform for SteinClient {
    fn platform(&self) -> Platform {
        Platform::Stein
    }

    async fn fetch_snapshot(&self) -> Result<NormalizedSnapshot> {
        let body = self.fetch_assets().await?;
        let snapshot = stein_snapshot(&body).context("stein assets")?;
        for err in &snapshot.errors {
            warn!(platform = "stein", %err, "dropping asset record");
        }
        debug!(
            platform = "stein",
            records = snapshot.records.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    async fn push_status(&self, source_id: &str, payload: &UpdatePayload) -> Result<()> {
        let token = payload.status.as_stein_token().ok_or_else(|| {
            anyhow!(
                "stein write for asset {} carries non-stein status {}",
                source_id,
                payload.status
            )
        })?;
        let id: i64 = source_id
            .parse()
            .with_context(|| format!("stein asset id '{source_id}' is not numeric"))?;

        let mut update = serde_json::Map::new();
        update.insert("status".to_string(), json!(token));
        update.insert("comment".to_string(), json!(payload.comment));
        self.update_asset(id, &update, false).await
    }

    /// Logs out only when a login session was opened.
    async fn close(&self) -> Result<()> {
        if self.login.is_some() && self.session.initialized() {
            self.logout().await?;
        }
        Ok(())
    }
}
