use fleetsync_platforms::FleetPlatform;
use fleetsync_reconcile::{
    match_assets, AssetRecord, GroupFilter, MatchedPair, Platform, ReconciliationEngine, Side,
    Verdict,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::{DispatchOutcome, UpdateDispatcher};

/// Failures that end a pass before any pair is looked at.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PassError {
    #[error("{platform} snapshot fetch failed: {reason}")]
    SnapshotFetch { platform: Platform, reason: String },
}

/// Counters of one pass. Every matched pair lands in exactly one of
/// `unchanged`, `updated_left`, `updated_right`, `skipped`, `write_failures`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub pass_id: Uuid,
    pub left_records: usize,
    pub right_records: usize,
    pub matched: usize,
    pub unchanged: usize,
    pub updated_left: usize,
    pub updated_right: usize,
    pub skipped: usize,
    pub write_failures: usize,
    pub dry_run: bool,
}

impl PassReport {
    pub fn updated(&self) -> usize {
        self.updated_left + self.updated_right
    }
}

/// One reconciliation pass over a left (Divera) and right (Stein) platform.
pub struct SyncPass<'a> {
    left: &'a dyn FleetPlatform,
    right: &'a dyn FleetPlatform,
    engine: ReconciliationEngine,
    filter: GroupFilter,
    dry_run: bool,
}

impl<'a> SyncPass<'a> {
    pub fn new(
        left: &'a dyn FleetPlatform,
        right: &'a dyn FleetPlatform,
        engine: ReconciliationEngine,
    ) -> Self {
        Self {
            left,
            right,
            engine,
            filter: GroupFilter::default(),
            dry_run: false,
        }
    }

    pub fn with_group_filter(mut self, filter: GroupFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run the pass, then close both platform sessions. A failing close is
    /// logged and does not change the result.
    pub async fn run(&self) -> Result<PassReport, PassError> {
        let pass_id = Uuid::new_v4();
        let span = info_span!(
            "sync_pass",
            %pass_id,
            direction = %self.engine.direction(),
            dry_run = self.dry_run
        );

        async {
            let result = self.run_inner(pass_id).await;
            for platform in [self.left, self.right] {
                if let Err(err) = platform.close().await {
                    let reason = format!("{err:#}");
                    warn!(platform = %platform.platform(), %reason, "close failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_inner(&self, pass_id: Uuid) -> Result<PassReport, PassError> {
        let mut report = PassReport {
            pass_id,
            dry_run: self.dry_run,
            ..PassReport::default()
        };

        info!("reading {}", self.left.platform());
        let left = fetch(self.left).await?;
        info!("reading {}", self.right.platform());
        let right = fetch(self.right).await?;
        report.left_records = left.len();
        report.right_records = right.len();

        let pairs = match_assets(left, right, |r| self.filter.accepts(r));
        report.matched = pairs.len();
        info!(
            left = report.left_records,
            right = report.right_records,
            matched = report.matched,
            "snapshots joined"
        );

        let dispatcher = UpdateDispatcher::new(self.left, self.right, self.dry_run);
        for pair in &pairs {
            self.process(&dispatcher, pair, &mut report).await;
        }

        info!(
            unchanged = report.unchanged,
            updated_left = report.updated_left,
            updated_right = report.updated_right,
            skipped = report.skipped,
            write_failures = report.write_failures,
            "pass finished"
        );
        Ok(report)
    }

    async fn process(
        &self,
        dispatcher: &UpdateDispatcher<'_>,
        pair: &MatchedPair,
        report: &mut PassReport,
    ) {
        let (authority, decision) = match self.engine.judge(pair) {
            Verdict::InSync => {
                info!(vehicle = %pair.match_key(), "unchanged");
                report.unchanged += 1;
                return;
            }
            Verdict::Skipped { .. } => {
                report.skipped += 1;
                return;
            }
            Verdict::Diverged {
                authority,
                decision,
            } => (authority, decision),
        };

        info!(
            vehicle = %pair.left.display_name,
            source = %authority.platform(),
            divera_status = %pair.left.status,
            stein_status = %pair.right.status,
            divera_comment = %pair.left.comment,
            stein_comment = %pair.right.comment,
            "newer data on {}",
            authority.platform()
        );

        match dispatcher.dispatch(pair, &decision).await {
            Ok(DispatchOutcome::Written { target } | DispatchOutcome::WouldWrite { target }) => {
                match target {
                    Side::Left => report.updated_left += 1,
                    Side::Right => report.updated_right += 1,
                }
            }
            Ok(DispatchOutcome::Nothing) => report.unchanged += 1,
            Err(err) => {
                warn!(%err, "write failed; next pass retries");
                report.write_failures += 1;
            }
        }
    }
}

async fn fetch(platform: &dyn FleetPlatform) -> Result<Vec<AssetRecord>, PassError> {
    let snapshot = platform
        .fetch_snapshot()
        .await
        .map_err(|e| PassError::SnapshotFetch {
            platform: platform.platform(),
            reason: format!("{e:#}"),
        })?;
    if !snapshot.errors.is_empty() {
        warn!(
            platform = %platform.platform(),
            dropped = snapshot.errors.len(),
            "records dropped while reading snapshot"
        );
    }
    Ok(snapshot.records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetsync_reconcile::SyncDirection;
    use fleetsync_testkit::{divera_vehicle, stein_asset, FakePlatform};

    #[tokio::test]
    async fn left_fetch_failure_aborts_before_right_is_read() {
        let l = FakePlatform::new(Platform::Divera).failing_fetch("connection refused");
        let r = FakePlatform::new(Platform::Stein);
        let pass = SyncPass::new(&l, &r, ReconciliationEngine::new(SyncDirection::Bidirectional));

        let err = pass.run().await.unwrap_err();
        assert!(matches!(
            err,
            PassError::SnapshotFetch {
                platform: Platform::Divera,
                ..
            }
        ));
        assert_eq!(r.fetch_calls(), 0);
        // Sessions are closed even after a failed fetch.
        assert_eq!(l.close_calls(), 1);
        assert_eq!(r.close_calls(), 1);
    }

    #[tokio::test]
    async fn report_counts_add_up() {
        let l = FakePlatform::new(Platform::Divera).with_records(vec![
            divera_vehicle("A", 2, None, 100, 1),
            divera_vehicle("B", 2, None, 100, 2),
            divera_vehicle("C", 9, None, 100, 3),
            divera_vehicle("D", 2, None, 100, 4),
        ]);
        let r = FakePlatform::new(Platform::Stein).with_records(vec![
            stein_asset("A", "ready", None, "1970-01-01T00:00:50Z", 11, 1),
            stein_asset("B", "inuse", None, "1970-01-01T00:00:50Z", 12, 1),
            stein_asset("C", "ready", None, "1970-01-01T00:00:50Z", 13, 5),
            stein_asset("D", "ready", Some("x"), "1970-01-01T00:10:00Z", 14, 1),
        ]);

        let report = SyncPass::new(&l, &r, ReconciliationEngine::new(SyncDirection::Bidirectional))
            .run()
            .await
            .unwrap();

        assert_eq!(report.matched, 4);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.updated_right, 1);
        assert_eq!(report.updated_left, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.write_failures, 0);
        assert_eq!(
            report.unchanged
                + report.updated()
                + report.skipped
                + report.write_failures,
            report.matched
        );
        assert!(!report.pass_id.is_nil());
    }
}
