//! fleetsync-platforms
//!
//! HTTP clients for the two fleet-status platforms and the seam the sync
//! driver talks to.
//!
//! - [`DiveraClient`]: Divera 24/7 vehicle status (left side)
//! - [`SteinClient`]: stein.app assets (right side)
//! - [`RequestGate`]: cooldown shared by both clients
//!
//! Secrets are passed in by the caller and never logged.

pub mod divera;
pub mod gate;
pub mod stein;

pub use divera::DiveraClient;
pub use gate::RequestGate;
pub use stein::SteinClient;

use anyhow::Result;
use fleetsync_reconcile::snapshot_adapter::NormalizedSnapshot;
use fleetsync_reconcile::{Platform, UpdatePayload};

/// One fleet-status platform as seen by the sync driver.
#[async_trait::async_trait]
pub trait FleetPlatform: Send + Sync {
    fn platform(&self) -> Platform;

    /// Current state of every vehicle, normalized. Per-record decode problems
    /// are returned in [`NormalizedSnapshot::errors`]; only transport or
    /// shape failures are `Err`.
    async fn fetch_snapshot(&self) -> Result<NormalizedSnapshot>;

    /// Write `payload` to the record identified by `source_id`.
    async fn push_status(&self, source_id: &str, payload: &UpdatePayload) -> Result<()>;

    /// End the session, if the platform has one.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
