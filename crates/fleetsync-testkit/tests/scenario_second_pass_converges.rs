//! After one pass has written its updates, a second pass over the same
//! platforms finds nothing to do.

use fleetsync_reconcile::{GroupFilter, Platform, ReconciliationEngine, SyncDirection};
use fleetsync_runtime::SyncPass;
use fleetsync_testkit::{divera_vehicle, stein_asset, FakePlatform};

fn platforms() -> (FakePlatform, FakePlatform) {
    let divera = FakePlatform::new(Platform::Divera).with_records(vec![
        divera_vehicle("THW-1", 3, Some("Einsatz\nHochwasser"), 2_000_000_000, 1),
        divera_vehicle("THW-2", 6, Some("Reifen"), 1_000, 2),
        divera_vehicle("THW-3", 1, None, 1_000, 3),
        divera_vehicle("", 2, None, 1_000, 4),
    ]);
    let stein = FakePlatform::new(Platform::Stein).with_records(vec![
        stein_asset("THW-1", "ready", None, "2022-10-18T13:36:04+02:00", 11, 1),
        stein_asset("THW-2", "ready", None, "2022-10-18T13:36:04+02:00", 12, 5),
        stein_asset("THW-3", "semiready", None, "2022-10-18T13:36:04+02:00", 13, 1),
        stein_asset("Anhaenger", "ready", None, "2022-10-18T13:36:04+02:00", 14, 3),
    ]);
    (divera, stein)
}

#[tokio::test]
async fn bidirectional_pass_is_idempotent() {
    let (divera, stein) = platforms();
    let engine = ReconciliationEngine::new(SyncDirection::Bidirectional);

    let first = SyncPass::new(&divera, &stein, engine.clone())
        .run()
        .await
        .unwrap();
    assert_eq!(first.matched, 3);
    assert_eq!(first.updated_right, 1, "THW-1: divera is newer");
    assert_eq!(first.updated_left, 1, "THW-2: stein is newer");
    assert_eq!(first.unchanged, 1, "THW-3: already agrees");

    let second = SyncPass::new(&divera, &stein, engine).run().await.unwrap();
    assert_eq!(second.unchanged, 3);
    assert_eq!(second.updated(), 0);
    assert_ne!(first.pass_id, second.pass_id);
}

#[tokio::test]
async fn group_filter_limits_matching() {
    let (divera, stein) = platforms();
    let report = SyncPass::new(
        &divera,
        &stein,
        ReconciliationEngine::new(SyncDirection::ForceLeft),
    )
    .with_group_filter(GroupFilter::new([5]))
    .run()
    .await
    .unwrap();

    assert_eq!(report.matched, 1);
    let writes = stein.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].source_id, "12");
}
