//! Async host for attached predictors.
//!
//! Each attached predictor runs in its own tokio task. The task owns the
//! engine, the signal subscription and the boundary timer, and dispatches
//! both event sources through [`BlockPredictor::handle`] one at a time:
//!
//! ```text
//! SignalSender ──► SignalSubscription ─┐
//!                                      ├─► dispatch loop ──► StatePublisher
//! BoundaryTimer (re-armed in place) ───┘
//! ```
//!
//! Detaching stops the loop before any further input is handled and drops
//! both the subscription and the timer.

mod clock;
mod subscription;
mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use subscription::{signal_channel, SignalSender, SignalSubscription};
pub use timer::BoundaryTimer;

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::predictor::{BlockPredictor, PredictorAttributes, PredictorInput};

/// Early wake-ups within this many seconds of the boundary count as on time.
const CLOCK_SKEW_SECS: i64 = 2;

/// Receives the attribute set and events after every handled input.
pub trait StatePublisher: Send + 'static {
    fn publish(&mut self, attributes: &PredictorAttributes, events: &[Event]);
}

impl<F> StatePublisher for F
where
    F: FnMut(&PredictorAttributes, &[Event]) + Send + 'static,
{
    fn publish(&mut self, attributes: &PredictorAttributes, events: &[Event]) {
        self(attributes, events)
    }
}

/// Handle to an attached predictor.
///
/// Dropping the handle without calling [`detach`](Self::detach) aborts the
/// task.
pub struct PredictorHandle {
    name: String,
    task: Option<JoinHandle<PredictorAttributes>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl PredictorHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the dispatch task has stopped.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Stop the predictor and return its final attributes.
    pub async fn detach(mut self) -> Result<PredictorAttributes> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let task = self.task.take().ok_or_else(|| {
            CoreError::Runtime(format!("predictor '{}' already detached", self.name))
        })?;
        Ok(task.await?)
    }
}

impl Drop for PredictorHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Attach `predictor`: restore, align, classify, publish, then start the
/// dispatch loop with the boundary timer armed.
///
/// Must be called from within a tokio runtime.
pub fn attach<P, C>(
    mut predictor: BlockPredictor,
    persisted: Option<PredictorAttributes>,
    subscription: SignalSubscription,
    mut publisher: P,
    clock: Arc<C>,
) -> PredictorHandle
where
    P: StatePublisher,
    C: Clock,
{
    let now = clock.now();
    let attached = predictor.attach(persisted, now);
    publisher.publish(&predictor.attributes(), &[attached]);

    let timer = BoundaryTimer::arm(predictor.next_boundary(now), now);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let name = predictor.name().to_string();

    let task = tokio::spawn(dispatch(
        predictor,
        subscription,
        timer,
        publisher,
        clock,
        shutdown_rx,
    ));

    PredictorHandle {
        name,
        task: Some(task),
        shutdown: Some(shutdown_tx),
    }
}

async fn dispatch<P, C>(
    mut predictor: BlockPredictor,
    mut subscription: SignalSubscription,
    mut timer: BoundaryTimer,
    mut publisher: P,
    clock: Arc<C>,
    mut shutdown: oneshot::Receiver<()>,
) -> PredictorAttributes
where
    P: StatePublisher,
    C: Clock,
{
    let mut signals_open = true;

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => break,

            scheduled = timer.fired() => {
                let now = clock.now();
                let events = if now + chrono::Duration::seconds(CLOCK_SKEW_SECS) < scheduled {
                    // Wall clock moved backwards: no block has ended.
                    warn!(
                        predictor = %predictor.name(),
                        scheduled = %scheduled,
                        now = %now,
                        "Wall clock moved backwards, re-arming"
                    );
                    let events = predictor.realign(now);
                    timer.rearm(predictor.next_boundary(now), now);
                    events
                } else {
                    // A late wake-up still lands in the block that has started.
                    let at = scheduled.max(now);
                    let events = predictor.handle(PredictorInput::BoundaryElapsed { at }, at);
                    timer.rearm(predictor.next_boundary(at), now);
                    events
                };
                publisher.publish(&predictor.attributes(), &events);
            }

            signal = subscription.recv(), if signals_open => match signal {
                Some(state) => {
                    let now = clock.now();
                    let events = predictor.handle(PredictorInput::SignalChanged(state), now);
                    publisher.publish(&predictor.attributes(), &events);
                }
                None => {
                    debug!(predictor = %predictor.name(), "Signal source closed");
                    signals_open = false;
                }
            },
        }
    }

    drop(subscription);
    drop(timer);

    let at = clock.now();
    info!(predictor = %predictor.name(), "Predictor detached");
    let attributes = predictor.attributes();
    publisher.publish(&attributes, &[Event::PredictorDetached { at }]);
    attributes
}
