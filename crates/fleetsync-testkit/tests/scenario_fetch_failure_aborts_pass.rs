//! Snapshot fetch failures are fatal for the pass: nothing is written.

use fleetsync_reconcile::{Platform, ReconciliationEngine, SyncDirection};
use fleetsync_runtime::{PassError, SyncPass};
use fleetsync_testkit::{divera_vehicle, FakePlatform};

#[tokio::test]
async fn right_fetch_failure_aborts_with_no_writes() {
    let divera = FakePlatform::new(Platform::Divera)
        .with_records(vec![divera_vehicle("THW-1", 2, None, 1000, 1)]);
    let stein = FakePlatform::new(Platform::Stein).failing_fetch("http 502");

    let err = SyncPass::new(
        &divera,
        &stein,
        ReconciliationEngine::new(SyncDirection::ForceLeft),
    )
    .run()
    .await
    .unwrap_err();

    match err {
        PassError::SnapshotFetch { platform, reason } => {
            assert_eq!(platform, Platform::Stein);
            assert!(reason.contains("http 502"));
        }
    }
    assert!(divera.writes().is_empty());
    assert!(stein.writes().is_empty());
}
