//! Status vocabulary translation.
//!
//! # Pinned table
//!
//! | Divera code | canonical     | Stein token |
//! |-------------|---------------|-------------|
//! | 1           | `SemiReady`   | `semiready` |
//! | 2           | `Ready`       | `ready`     |
//! | 3, 4        | `InUse`       | `inuse`     |
//! | 6           | `NotReady`    | `notready`  |
//! | (none)      | `Maintenance` | `maint`     |
//!
//! Earlier revisions of this mapping wrote "semi-ready" to Divera as code 6
//! while reading code 1 as semi-ready. This table pins code 1 in both
//! directions; `tests/scenario_status_table_locked.rs` guards it.

use crate::{CanonicalStatus, NativeStatus, Platform, ReconcileError};

/// Divera code written for [`CanonicalStatus::InUse`]. Code 4 is read as
/// in-use too but never written.
pub const DIVERA_IN_USE_CODE: i64 = 3;

/// Divera code written for [`CanonicalStatus::Maintenance`]. Divera has no
/// workshop status, so maintenance degrades to "not ready".
pub const DIVERA_MAINTENANCE_CODE: i64 = 6;

/// Every Divera code the translator accepts.
pub const DIVERA_KNOWN_CODES: [i64; 5] = [1, 2, 3, 4, 6];

/// Every Stein token the translator accepts.
pub const STEIN_KNOWN_TOKENS: [&str; 5] = ["ready", "semiready", "notready", "inuse", "maint"];

/// Bidirectional mapping between both native vocabularies and
/// [`CanonicalStatus`]. Stateless; cheap to copy.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatusCodeTranslator;

impl StatusCodeTranslator {
    pub fn new() -> Self {
        Self
    }

    /// Native status → canonical status.
    ///
    /// Fails with [`ReconcileError::UnknownStatusCode`] for codes outside the
    /// pinned table; callers skip the record.
    pub fn to_canonical(&self, native: &NativeStatus) -> Result<CanonicalStatus, ReconcileError> {
        let canonical = match native {
            NativeStatus::Divera(code) => match code {
                1 => Some(CanonicalStatus::SemiReady),
                2 => Some(CanonicalStatus::Ready),
                3 | 4 => Some(CanonicalStatus::InUse),
                6 => Some(CanonicalStatus::NotReady),
                _ => None,
            },
            NativeStatus::Stein(token) => match token.as_str() {
                "ready" => Some(CanonicalStatus::Ready),
                "semiready" => Some(CanonicalStatus::SemiReady),
                "notready" => Some(CanonicalStatus::NotReady),
                "inuse" => Some(CanonicalStatus::InUse),
                "maint" => Some(CanonicalStatus::Maintenance),
                _ => None,
            },
        };

        canonical.ok_or_else(|| ReconcileError::UnknownStatusCode {
            platform: native.platform(),
            code: native.clone(),
        })
    }

    /// Canonical status → the one native value written to `platform`.
    pub fn from_canonical(&self, platform: Platform, status: CanonicalStatus) -> NativeStatus {
        match platform {
            Platform::Divera => NativeStatus::Divera(match status {
                CanonicalStatus::SemiReady => 1,
                CanonicalStatus::Ready => 2,
                CanonicalStatus::InUse => DIVERA_IN_USE_CODE,
                CanonicalStatus::NotReady => 6,
                CanonicalStatus::Maintenance => DIVERA_MAINTENANCE_CODE,
            }),
            Platform::Stein => NativeStatus::Stein(
                match status {
                    CanonicalStatus::Ready => "ready",
                    CanonicalStatus::SemiReady => "semiready",
                    CanonicalStatus::NotReady => "notready",
                    CanonicalStatus::InUse => "inuse",
                    CanonicalStatus::Maintenance => "maint",
                }
                .to_string(),
            ),
        }
    }

    /// Translate a native status straight into `target`'s vocabulary.
    pub fn translate(
        &self,
        native: &NativeStatus,
        target: Platform,
    ) -> Result<NativeStatus, ReconcileError> {
        Ok(self.from_canonical(target, self.to_canonical(native)?))
    }
}
