//! Snapshot adapter: deserialize platform wire formats and normalize to [`AssetRecord`].
//!
//! # Purpose
//! Divera and Stein return vehicles in their own JSON schemas. This module
//! defines the *raw* (wire-level) structs mirroring those responses and the
//! functions converting them into the platform-agnostic [`AssetRecord`]
//! consumed by the matcher and engine.
//!
//! # Design constraints
//! - Pure, deterministic conversion. No IO, no async.
//! - Required fields are required: a record missing one fails to decode and is
//!   reported as a [`SnapshotAdapterError`] instead of flowing on as a `None`.
//! - A malformed record never poisons the whole snapshot; the `*_snapshot`
//!   functions return the good records plus the per-record errors. Only a
//!   wrong top-level shape is a hard error.
//! - Status codes and timestamps are carried raw; translating them is the
//!   engine's job so failures stay scoped to one pair.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::{AssetRecord, NativeStatus, Platform, RawTimestamp};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotAdapterError {
    /// The response body did not have the expected top-level shape.
    #[error("{platform} snapshot has unexpected shape: {message}")]
    UnexpectedShape { platform: Platform, message: String },

    /// One record failed to deserialize (missing or mistyped field).
    #[error("{platform} record #{index} could not be decoded: {message}")]
    Decode {
        platform: Platform,
        index: usize,
        message: String,
    },

    /// The native id is not usable for write-back.
    #[error("{platform} record '{match_key}' has invalid id {id}")]
    InvalidId {
        platform: Platform,
        match_key: String,
        id: i64,
    },
}

// ---------------------------------------------------------------------------
// Raw wire-level structs
// ---------------------------------------------------------------------------

/// One entry of Divera's `pull/vehicle-status` `data` array.
///
/// Unknown fields are ignored; the listed ones (except `name` and the note)
/// are required.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDiveraVehicle {
    pub id: i64,
    /// Human vehicle number; empty when the vehicle takes no part in matching.
    pub number: String,
    #[serde(default)]
    pub name: String,
    pub fmsstatus: i64,
    #[serde(default)]
    pub fmsstatus_note: Option<String>,
    /// Last status change, epoch seconds.
    pub fmsstatus_ts: i64,
}

/// One Stein asset as returned by `GET /assets/?buIds=…`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSteinAsset {
    pub id: i64,
    /// Human asset name, matched against Divera's `number`.
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    pub group_id: i64,
    pub status: String,
    /// `null` or absent both mean "no comment".
    #[serde(default)]
    pub comment: Option<String>,
    pub last_modified: String,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

pub fn normalize_divera_vehicle(raw: RawDiveraVehicle) -> Result<AssetRecord, SnapshotAdapterError> {
    let match_key = raw.number.trim().to_string();
    if raw.id <= 0 {
        return Err(SnapshotAdapterError::InvalidId {
            platform: Platform::Divera,
            match_key,
            id: raw.id,
        });
    }

    let display_name = if raw.name.trim().is_empty() {
        match_key.clone()
    } else {
        raw.name.trim().to_string()
    };

    Ok(AssetRecord::new(
        match_key,
        NativeStatus::Divera(raw.fmsstatus),
        raw.fmsstatus_note.as_deref(),
        RawTimestamp::EpochSeconds(raw.fmsstatus_ts),
        raw.id.to_string(),
    )
    .with_display_name(display_name))
}

pub fn normalize_stein_asset(raw: RawSteinAsset) -> Result<AssetRecord, SnapshotAdapterError> {
    let match_key = raw.name.trim().to_string();
    if raw.id <= 0 {
        return Err(SnapshotAdapterError::InvalidId {
            platform: Platform::Stein,
            match_key,
            id: raw.id,
        });
    }

    let display_name = raw
        .label
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(&match_key)
        .to_string();

    Ok(AssetRecord::new(
        match_key,
        NativeStatus::Stein(raw.status.trim().to_string()),
        raw.comment.as_deref(),
        RawTimestamp::Iso8601(raw.last_modified),
        raw.id.to_string(),
    )
    .with_display_name(display_name)
    .with_group_id(raw.group_id))
}

/// Records that normalized cleanly plus the errors of those that did not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedSnapshot {
    pub records: Vec<AssetRecord>,
    pub errors: Vec<SnapshotAdapterError>,
}

fn normalize_items<R, F>(
    platform: Platform,
    items: &[Value],
    normalize: F,
) -> NormalizedSnapshot
where
    R: for<'de> Deserialize<'de>,
    F: Fn(R) -> Result<AssetRecord, SnapshotAdapterError>,
{
    let mut out = NormalizedSnapshot::default();
    for (index, item) in items.iter().enumerate() {
        let decoded = R::deserialize(item).map_err(|e| SnapshotAdapterError::Decode {
            platform,
            index,
            message: e.to_string(),
        });
        match decoded.and_then(&normalize) {
            Ok(rec) => out.records.push(rec),
            Err(e) => out.errors.push(e),
        }
    }
    out
}

/// Normalize a full Divera `pull/vehicle-status` body (`{"data": [...]}`).
pub fn divera_snapshot(body: &Value) -> Result<NormalizedSnapshot, SnapshotAdapterError> {
    let items = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| SnapshotAdapterError::UnexpectedShape {
            platform: Platform::Divera,
            message: "missing 'data' array".to_string(),
        })?;
    Ok(normalize_items(Platform::Divera, items, normalize_divera_vehicle))
}

/// Normalize a Stein asset list (top-level JSON array).
pub fn stein_snapshot(body: &Value) -> Result<NormalizedSnapshot, SnapshotAdapterError> {
    let items = body
        .as_array()
        .ok_or_else(|| SnapshotAdapterError::UnexpectedShape {
            platform: Platform::Stein,
            message: "expected a JSON array of assets".to_string(),
        })?;
    Ok(normalize_items(Platform::Stein, items, normalize_stein_asset))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn divera_vehicle_normalizes() {
        let body = json!({
            "success": true,
            "data": [{
                "id": 4711,
                "number": " THW-12345 ",
                "name": "MTW-ZTr",
                "fmsstatus": 2,
                "fmsstatus_note": "line one\nline two",
                "fmsstatus_ts": 1666092964,
                "latitude": 51.7
            }]
        });
        let snap = divera_snapshot(&body).unwrap();
        assert!(snap.errors.is_empty());
        let r = &snap.records[0];
        assert_eq!(r.match_key, "THW-12345");
        assert_eq!(r.display_name, "MTW-ZTr");
        assert_eq!(r.status, NativeStatus::Divera(2));
        assert_eq!(r.comment, "line one line two");
        assert_eq!(r.last_modified, RawTimestamp::EpochSeconds(1666092964));
        assert_eq!(r.source_id, "4711");
        assert_eq!(r.group_id, None);
    }

    #[test]
    fn divera_missing_data_is_shape_error() {
        let err = divera_snapshot(&json!({"success": false})).unwrap_err();
        assert!(matches!(err, SnapshotAdapterError::UnexpectedShape { .. }));
    }

    #[test]
    fn divera_record_missing_status_is_reported_not_fatal() {
        let body = json!({"data": [
            {"id": 1, "number": "A", "fmsstatus": 2, "fmsstatus_ts": 10},
            {"id": 2, "number": "B", "fmsstatus_ts": 10}
        ]});
        let snap = divera_snapshot(&body).unwrap();
        assert_eq!(snap.records.len(), 1);
        assert_eq!(snap.errors.len(), 1);
        assert!(matches!(
            snap.errors[0],
            SnapshotAdapterError::Decode { index: 1, .. }
        ));
    }

    #[test]
    fn stein_null_comment_becomes_empty() {
        let body = json!([{
            "buId": 600,
            "groupId": 1,
            "id": 12,
            "label": "[1] MTW-ZTr",
            "name": "THW-12345",
            "status": "semiready",
            "comment": null,
            "category": "ZTr TZ",
            "deleted": false,
            "lastModified": "2022-10-18T13:36:04+02:00"
        }]);
        let snap = stein_snapshot(&body).unwrap();
        let r = &snap.records[0];
        assert_eq!(r.comment, "");
        assert_eq!(r.display_name, "[1] MTW-ZTr");
        assert_eq!(r.group_id, Some(1));
        assert_eq!(r.status, NativeStatus::Stein("semiready".into()));
    }

    #[test]
    fn stein_absent_comment_becomes_empty() {
        let body = json!([{
            "id": 12, "name": "X", "groupId": 1, "status": "ready",
            "lastModified": "2022-10-18T13:36:04+02:00"
        }]);
        let snap = stein_snapshot(&body).unwrap();
        assert!(snap.errors.is_empty());
        assert_eq!(snap.records.len(), 1);
        assert_eq!(snap.records[0].comment, "");
    }

    #[test]
    fn stein_missing_status_is_decode_error() {
        let body = json!([{
            "id": 12, "name": "X", "groupId": 1, "comment": null,
            "lastModified": "2022-10-18T13:36:04+02:00"
        }]);
        let snap = stein_snapshot(&body).unwrap();
        assert!(snap.records.is_empty());
        assert!(matches!(
            snap.errors[0],
            SnapshotAdapterError::Decode { index: 0, .. }
        ));
    }

    #[test]
    fn stein_non_array_is_shape_error() {
        assert!(stein_snapshot(&json!({"assets": []})).is_err());
    }

    #[test]
    fn non_positive_id_is_rejected() {
        let raw = RawSteinAsset {
            id: 0,
            name: "X".into(),
            label: None,
            group_id: 1,
            status: "ready".into(),
            comment: None,
            last_modified: "2022-10-18T13:36:04+02:00".into(),
        };
        assert!(matches!(
            normalize_stein_asset(raw),
            Err(SnapshotAdapterError::InvalidId { .. })
        ));
    }
}
