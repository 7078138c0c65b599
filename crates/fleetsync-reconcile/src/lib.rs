//! fleetsync-reconcile
//!
//! Status reconciliation core for Divera 24/7 (left) and stein.app (right).
//!
//! - `status`: both native status vocabularies ⇄ [`CanonicalStatus`]
//! - `timestamp`: both timestamp formats → UTC epoch seconds
//! - `matcher`: join both snapshots on the shared vehicle identifier
//! - `engine`: per-pair divergence check, authority resolution, payload
//! - `snapshot_adapter`: platform JSON → [`AssetRecord`]
//!
//! Deterministic, pure logic. No IO. No platform calls.

mod engine;
mod error;
mod matcher;
pub mod snapshot_adapter;
mod status;
mod timestamp;
mod types;

pub use engine::{ReconciliationEngine, Verdict};
pub use error::ReconcileError;
pub use matcher::{match_assets, GroupFilter};
pub use status::{
    StatusCodeTranslator, DIVERA_IN_USE_CODE, DIVERA_KNOWN_CODES, DIVERA_MAINTENANCE_CODE,
    STEIN_KNOWN_TOKENS,
};
pub use timestamp::TimestampNormalizer;
pub use types::*;
