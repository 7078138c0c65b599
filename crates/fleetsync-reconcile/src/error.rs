use thiserror::Error;

use crate::{NativeStatus, Platform, RawTimestamp};

/// Per-record failures of the reconciliation core.
///
/// None of these are fatal to a pass: the caller logs and moves on to the
/// next matched pair.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("unknown {platform} status code '{code}'")]
    UnknownStatusCode { platform: Platform, code: NativeStatus },

    #[error("malformed {platform} timestamp '{raw}': {reason}")]
    MalformedTimestamp {
        platform: Platform,
        raw: RawTimestamp,
        reason: String,
    },

    #[error("unknown sync direction '{0}' (expected bidirectional | force_left | force_right)")]
    UnknownDirection(String),
}
