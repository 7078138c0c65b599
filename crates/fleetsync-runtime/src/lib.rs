//! fleetsync-runtime
//!
//! One reconciliation pass, start to finish:
//!
//! 1. fetch both snapshots (either failing aborts the pass)
//! 2. join them on the vehicle identifier
//! 3. judge every pair with the [`ReconciliationEngine`]
//! 4. hand non-`NoOp` decisions to the [`UpdateDispatcher`]
//!
//! Pairs are processed one at a time; a failed write is counted and the pass
//! moves on.
//!
//! [`ReconciliationEngine`]: fleetsync_reconcile::ReconciliationEngine

mod dispatcher;
mod pass;

pub use dispatcher::{DispatchError, DispatchOutcome, UpdateDispatcher};
pub use pass::{PassError, PassReport, SyncPass};
