//! Request sequencing and teardown cancellation.
//!
//! A [`RequestSequence`] hands out monotonically increasing [`Ticket`]s for
//! one kind of operation; only the most recently issued ticket is current.
//! A [`Teardown`] signals every in-flight request to give up.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use crate::error::{LocatorError, Result};

/// Identifies one issued request of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new ticket, superseding every earlier one.
    pub fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    /// Supersedes every issued ticket without issuing a new one.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

/// Owner side of the teardown signal. Dropping it also cancels.
#[derive(Debug)]
pub struct Teardown {
    sender: watch::Sender<bool>,
}

impl Default for Teardown {
    fn default() -> Self {
        Self::new()
    }
}

impl Teardown {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    pub fn signal(&self) -> TeardownSignal {
        TeardownSignal {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }
}

/// Receiver side, carried by each in-flight request.
#[derive(Debug, Clone)]
pub struct TeardownSignal {
    receiver: watch::Receiver<bool>,
}

impl TeardownSignal {
    /// Resolves once teardown has been requested (or its owner dropped).
    pub async fn cancelled(&mut self) {
        // An Err means the owner is gone, which counts as teardown.
        let _ = self.receiver.wait_for(|cancelled| *cancelled).await;
    }

    /// Runs `operation` bounded by `limit`, giving up early on teardown.
    pub async fn guard<T, F>(mut self, limit: Duration, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            () = self.cancelled() => {
                debug!("request cancelled by teardown");
                Err(LocatorError::Cancelled)
            }
            outcome = tokio::time::timeout(limit, operation) => {
                outcome.unwrap_or(Err(LocatorError::Timeout))
            }
        }
    }
}
