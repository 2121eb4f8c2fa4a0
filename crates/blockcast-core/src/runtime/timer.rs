//! Boundary timer: one pending wake-up at the next block boundary.

use std::pin::Pin;

use chrono::{DateTime, Utc};
use tokio::time::{Instant, Sleep};

/// Pending wake-up for a wall-clock boundary.
///
/// Exactly one deadline is pending for the lifetime of the timer; firing
/// does not disarm it, the owner re-arms it in place with [`rearm`](Self::rearm).
/// Dropping the timer cancels the wake-up.
#[derive(Debug)]
pub struct BoundaryTimer {
    sleep: Pin<Box<Sleep>>,
    boundary: DateTime<Utc>,
}

impl BoundaryTimer {
    /// Arm for `boundary`, measured from the wall-clock `now`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(boundary: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            sleep: Box::pin(tokio::time::sleep_until(deadline(boundary, now))),
            boundary,
        }
    }

    /// Replace the pending deadline.
    pub fn rearm(&mut self, boundary: DateTime<Utc>, now: DateTime<Utc>) {
        self.sleep.as_mut().reset(deadline(boundary, now));
        self.boundary = boundary;
    }

    /// Wall-clock boundary the timer is armed for.
    pub fn boundary(&self) -> DateTime<Utc> {
        self.boundary
    }

    /// Wait for the deadline and return the boundary it stands for.
    ///
    /// Cancel safe. Resolves immediately again until re-armed.
    pub async fn fired(&mut self) -> DateTime<Utc> {
        self.sleep.as_mut().await;
        self.boundary
    }
}

/// Monotonic deadline for a wall-clock instant; past instants fire at once.
fn deadline(boundary: DateTime<Utc>, now: DateTime<Utc>) -> Instant {
    let wait = (boundary - now).to_std().unwrap_or_default();
    Instant::now() + wait
}
