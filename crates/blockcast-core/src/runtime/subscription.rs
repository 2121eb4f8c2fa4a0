//! Signal subscription: the channel between a signal source and one
//! attached predictor.

use tokio::sync::mpsc;

use crate::error::{CoreError, Result};
use crate::predictor::SignalState;

/// Create a connected sender/subscription pair.
pub fn signal_channel(capacity: usize) -> (SignalSender, SignalSubscription) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (SignalSender { tx }, SignalSubscription { rx })
}

/// Producer side, held by whatever observes the external signal.
#[derive(Debug, Clone)]
pub struct SignalSender {
    tx: mpsc::Sender<SignalState>,
}

impl SignalSender {
    /// Deliver a state change, waiting for queue space.
    ///
    /// # Errors
    ///
    /// Returns an error once the subscribed predictor has been detached.
    pub async fn notify(&self, state: SignalState) -> Result<()> {
        self.tx
            .send(state)
            .await
            .map_err(|_| CoreError::Runtime("signal subscription closed".into()))
    }

    /// Whether the subscribed predictor has been detached.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side, owned by the attached predictor. Dropping it releases
/// the subscription.
#[derive(Debug)]
pub struct SignalSubscription {
    rx: mpsc::Receiver<SignalState>,
}

impl SignalSubscription {
    /// Next state change, or `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<SignalState> {
        self.rx.recv().await
    }
}
