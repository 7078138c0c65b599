use tracing::warn;

use crate::{
    CanonicalStatus, MatchedPair, ReconcileError, Side, StatusCodeTranslator, SyncDecision,
    SyncDirection, TimestampNormalizer, UpdatePayload,
};

/// Full outcome of judging one pair, richer than [`SyncDecision`] so callers
/// can count and log what happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Canonical status and comment agree on both sides, or the losing side
    /// already holds exactly what would be written to it.
    InSync,
    /// The pair diverged; `authority` is the side whose state gets copied.
    Diverged {
        authority: Side,
        decision: SyncDecision,
    },
    /// A translation or timestamp failure; the pair is left alone this pass.
    Skipped { error: ReconcileError },
}

impl Verdict {
    pub fn decision(&self) -> SyncDecision {
        match self {
            Verdict::Diverged { decision, .. } => decision.clone(),
            Verdict::InSync | Verdict::Skipped { .. } => SyncDecision::NoOp,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Verdict::Skipped { .. })
    }
}

/// Per-pair reconciliation policy. Pure: no I/O, no clock.
#[derive(Clone, Debug)]
pub struct ReconciliationEngine {
    direction: SyncDirection,
    translator: StatusCodeTranslator,
    normalizer: TimestampNormalizer,
}

impl ReconciliationEngine {
    pub fn new(direction: SyncDirection) -> Self {
        Self {
            direction,
            translator: StatusCodeTranslator::new(),
            normalizer: TimestampNormalizer::new(),
        }
    }

    pub fn direction(&self) -> SyncDirection {
        self.direction
    }

    /// Fallible core: divergence check, authority resolution, payload.
    ///
    /// Returns `Ok(None)` when the pair is in sync or the write would be a
    /// no-op on the target platform.
    pub fn decide(&self, pair: &MatchedPair) -> Result<Option<(Side, SyncDecision)>, ReconcileError> {
        let left_status = self.translator.to_canonical(&pair.left.status)?;
        let right_status = self.translator.to_canonical(&pair.right.status)?;

        if left_status == right_status && pair.left.comment == pair.right.comment {
            return Ok(None);
        }

        let authority = self.authority(pair)?;
        let (status, comment) = match authority {
            Side::Left => (left_status, &pair.left.comment),
            Side::Right => (right_status, &pair.right.comment),
        };

        let target = authority.opposite();
        let decision = self.payload_for(target, status, comment);
        if self.target_already_holds(pair, target, &decision) {
            return Ok(None);
        }
        Ok(Some((authority, decision)))
    }

    /// True when the write would leave the target unchanged. Divera folds
    /// `Maintenance` into code 6, so `6` against `maint` can land here.
    fn target_already_holds(
        &self,
        pair: &MatchedPair,
        target: Side,
        decision: &SyncDecision,
    ) -> bool {
        let current = pair.record(target);
        match decision {
            SyncDecision::UpdateLeft { payload } | SyncDecision::UpdateRight { payload } => {
                payload.status == current.status && payload.comment == current.comment
            }
            SyncDecision::NoOp => true,
        }
    }

    /// Like [`decide`](Self::decide) but never fails: errors become
    /// [`Verdict::Skipped`] and are logged.
    pub fn judge(&self, pair: &MatchedPair) -> Verdict {
        match self.decide(pair) {
            Ok(None) => Verdict::InSync,
            Ok(Some((authority, decision))) => Verdict::Diverged {
                authority,
                decision,
            },
            Err(error) => {
                warn!(
                    vehicle = %pair.match_key(),
                    %error,
                    "skipping pair: cannot reconcile"
                );
                Verdict::Skipped { error }
            }
        }
    }

    /// Best-effort decision for one pair; failures downgrade to `NoOp`.
    pub fn evaluate(&self, pair: &MatchedPair) -> SyncDecision {
        self.judge(pair).decision()
    }

    fn authority(&self, pair: &MatchedPair) -> Result<Side, ReconcileError> {
        match self.direction {
            SyncDirection::ForceLeft => Ok(Side::Left),
            SyncDirection::ForceRight => Ok(Side::Right),
            SyncDirection::Bidirectional => {
                let left_ts = self.normalizer.parse(&pair.left.last_modified)?;
                let right_ts = self.normalizer.parse(&pair.right.last_modified)?;
                // Ties go to the right side.
                if left_ts > right_ts {
                    Ok(Side::Left)
                } else {
                    Ok(Side::Right)
                }
            }
        }
    }

    fn payload_for(&self, target: Side, status: CanonicalStatus, comment: &str) -> SyncDecision {
        let payload = UpdatePayload {
            status: self.translator.from_canonical(target.platform(), status),
            comment: comment.to_string(),
        };
        match target {
            Side::Left => SyncDecision::UpdateLeft { payload },
            Side::Right => SyncDecision::UpdateRight { payload },
        }
    }
}
