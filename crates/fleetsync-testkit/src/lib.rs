//! Test support for sync scenarios: record builders and an in-memory
//! [`FakePlatform`] that stands in for Divera or Stein.

mod fake_platform;

pub use fake_platform::{FakePlatform, RecordedWrite};

use fleetsync_reconcile::{AssetRecord, NativeStatus, RawTimestamp};

/// A Divera vehicle as the snapshot adapter would produce it.
pub fn divera_vehicle(
    number: &str,
    fmsstatus: i64,
    note: Option<&str>,
    ts: i64,
    id: i64,
) -> AssetRecord {
    AssetRecord::new(
        number,
        NativeStatus::Divera(fmsstatus),
        note,
        RawTimestamp::EpochSeconds(ts),
        id.to_string(),
    )
}

/// A Stein asset as the snapshot adapter would produce it.
pub fn stein_asset(
    name: &str,
    status: &str,
    comment: Option<&str>,
    last_modified: &str,
    id: i64,
    group_id: i64,
) -> AssetRecord {
    AssetRecord::new(
        name,
        NativeStatus::Stein(status.to_string()),
        comment,
        RawTimestamp::Iso8601(last_modified.to_string()),
        id.to_string(),
    )
    .with_group_id(group_id)
}
