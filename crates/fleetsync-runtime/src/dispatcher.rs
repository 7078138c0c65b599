use fleetsync_platforms::FleetPlatform;
use fleetsync_reconcile::{MatchedPair, Platform, Side, SyncDecision};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The target platform refused the write or could not be reached.
    #[error("write to {platform} record {source_id} ({vehicle}) failed: {reason}")]
    OutboundWriteFailed {
        platform: Platform,
        vehicle: String,
        source_id: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Decision was `NoOp`.
    Nothing,
    Written { target: Side },
    /// Dry run: the write was logged, not sent.
    WouldWrite { target: Side },
}

/// Routes a decision to the platform that has to change.
pub struct UpdateDispatcher<'a> {
    left: &'a dyn FleetPlatform,
    right: &'a dyn FleetPlatform,
    dry_run: bool,
}

impl<'a> UpdateDispatcher<'a> {
    pub fn new(left: &'a dyn FleetPlatform, right: &'a dyn FleetPlatform, dry_run: bool) -> Self {
        Self {
            left,
            right,
            dry_run,
        }
    }

    pub async fn dispatch(
        &self,
        pair: &MatchedPair,
        decision: &SyncDecision,
    ) -> Result<DispatchOutcome, DispatchError> {
        let (target, payload) = match decision {
            SyncDecision::NoOp => return Ok(DispatchOutcome::Nothing),
            SyncDecision::UpdateLeft { payload } => (Side::Left, payload),
            SyncDecision::UpdateRight { payload } => (Side::Right, payload),
        };

        let record = pair.record(target);
        let platform = match target {
            Side::Left => self.left,
            Side::Right => self.right,
        };

        if self.dry_run {
            info!(
                vehicle = %pair.match_key(),
                target = %platform.platform(),
                status = %payload.status,
                comment = %payload.comment,
                "dry run: write not sent"
            );
            return Ok(DispatchOutcome::WouldWrite { target });
        }

        debug!(
            vehicle = %pair.match_key(),
            target = %platform.platform(),
            source_id = %record.source_id,
            ?payload,
            "dispatching write"
        );
        platform
            .push_status(&record.source_id, payload)
            .await
            .map_err(|e| DispatchError::OutboundWriteFailed {
                platform: platform.platform(),
                vehicle: pair.match_key().to_string(),
                source_id: record.source_id.clone(),
                reason: format!("{e:#}"),
            })?;

        Ok(DispatchOutcome::Written { target })
    }
}
