use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Minimum spacing between outbound requests.
///
/// One gate is shared (behind an `Arc`) by every platform client of a pass,
/// so the spacing holds across both platforms. The gate only delays; it never
/// rejects and never times out.
#[derive(Debug)]
pub struct RequestGate {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RequestGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    /// A gate that never waits (tests, dry runs against local mocks).
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Wait until `interval` has passed since the previous acquisition.
    ///
    /// The lock is held across the sleep so concurrent callers queue up
    /// instead of all waking at the same deadline.
    pub async fn acquire(&self) {
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.interval;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}
