use std::collections::BTreeSet;
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use fleetsync_platforms::FleetPlatform;
use fleetsync_reconcile::snapshot_adapter::{NormalizedSnapshot, SnapshotAdapterError};
use fleetsync_reconcile::{AssetRecord, Platform, UpdatePayload};

/// One write the fake accepted (or refused, when injected to fail).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWrite {
    pub source_id: String,
    pub payload: UpdatePayload,
}

#[derive(Debug, Default)]
struct FakeState {
    records: Vec<AssetRecord>,
    decode_errors: Vec<SnapshotAdapterError>,
    writes: Vec<RecordedWrite>,
    fetch_calls: usize,
    close_calls: usize,
    fail_fetch: Option<String>,
    fail_writes_for: BTreeSet<String>,
}

/// In-memory platform.
///
/// Accepted writes are applied to the stored record, so a second pass over
/// the same fake sees the converged state.
#[derive(Debug)]
pub struct FakePlatform {
    platform: Platform,
    state: Mutex<FakeState>,
}

impl FakePlatform {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            state: Mutex::new(FakeState::default()),
        }
    }

    pub fn with_records(self, records: Vec<AssetRecord>) -> Self {
        self.lock().records = records;
        self
    }

    /// Snapshot will carry this decode error next to the records.
    pub fn with_decode_error(self, err: SnapshotAdapterError) -> Self {
        self.lock().decode_errors.push(err);
        self
    }

    /// Every `fetch_snapshot` fails with `message`.
    pub fn failing_fetch(self, message: &str) -> Self {
        self.lock().fail_fetch = Some(message.to_string());
        self
    }

    /// Writes to `source_id` fail (and are not applied).
    pub fn failing_write_for(self, source_id: &str) -> Self {
        self.lock().fail_writes_for.insert(source_id.to_string());
        self
    }

    /// Successful writes, in call order.
    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.lock().writes.clone()
    }

    pub fn records(&self) -> Vec<AssetRecord> {
        self.lock().records.clone()
    }

    pub fn fetch_calls(&self) -> usize {
        self.lock().fetch_calls
    }

    pub fn close_calls(&self) -> usize {
        self.lock().close_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        // A panicking test thread poisons the lock; the state is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait::async_trait]
impl FleetPlatform for FakePlatform {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch_snapshot(&self) -> Result<NormalizedSnapshot> {
        let mut st = self.lock();
        st.fetch_calls += 1;
        if let Some(msg) = &st.fail_fetch {
            return Err(anyhow!("{} fetch failed: {}", self.platform, msg));
        }
        Ok(NormalizedSnapshot {
            records: st.records.clone(),
            errors: st.decode_errors.clone(),
        })
    }

    async fn push_status(&self, source_id: &str, payload: &UpdatePayload) -> Result<()> {
        if payload.status.platform() != self.platform {
            bail!(
                "{} fake got a {} status",
                self.platform,
                payload.status.platform()
            );
        }

        let mut st = self.lock();
        if st.fail_writes_for.contains(source_id) {
            bail!("{} write to {} failed: http 500", self.platform, source_id);
        }

        let rec = st
            .records
            .iter_mut()
            .find(|r| r.source_id == source_id)
            .ok_or_else(|| anyhow!("{} has no record {}", self.platform, source_id))?;
        rec.status = payload.status.clone();
        rec.comment = payload.comment.clone();

        st.writes.push(RecordedWrite {
            source_id: source_id.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.lock().close_calls += 1;
        Ok(())
    }
}
