use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};

/// Single-slot, coalescing redraw notification.
///
/// At most one notification is ever pending: a `notify` while the slot is
/// full is dropped, so a slow render loop sees one wakeup for any burst of
/// frames. Closing drops the sender and wakes every blocked listener.
#[derive(Debug)]
pub struct RedrawSignal {
    sender: Option<Sender<()>>,
    receiver: Receiver<()>,
}

impl RedrawSignal {
    pub fn new() -> Self {
        let (sender, receiver) = bounded(1);
        Self {
            sender: Some(sender),
            receiver,
        }
    }

    /// Queues a redraw unless one is already pending. Returns whether a new
    /// notification was queued.
    pub fn notify(&self) -> bool {
        match &self.sender {
            Some(sender) => match sender.try_send(()) {
                Ok(()) => true,
                Err(TrySendError::Full(())) | Err(TrySendError::Disconnected(())) => false,
            },
            None => false,
        }
    }

    /// Drops the sending side. Idempotent.
    pub fn close(&mut self) {
        if self.sender.take().is_some() {
            tracing::debug!("redraw signal closed");
        }
    }

    pub fn subscribe(&self) -> RedrawListener {
        RedrawListener {
            receiver: self.receiver.clone(),
        }
    }
}

impl Default for RedrawSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a bounded wait on a [`RedrawListener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawWait {
    Redraw,
    Timeout,
    Closed,
}

/// Receiving end of a [`RedrawSignal`], held by the render loop.
#[derive(Debug, Clone)]
pub struct RedrawListener {
    receiver: Receiver<()>,
}

impl RedrawListener {
    /// Blocks until a redraw is requested (`true`) or the signal is closed
    /// and drained (`false`).
    pub fn wait(&self) -> bool {
        self.receiver.recv().is_ok()
    }

    pub fn wait_timeout(&self, timeout: Duration) -> RedrawWait {
        match self.receiver.recv_timeout(timeout) {
            Ok(()) => RedrawWait::Redraw,
            Err(RecvTimeoutError::Timeout) => RedrawWait::Timeout,
            Err(RecvTimeoutError::Disconnected) => RedrawWait::Closed,
        }
    }

    /// Takes a pending notification without blocking.
    pub fn try_take(&self) -> bool {
        self.receiver.try_recv().is_ok()
    }

    /// Number of queued notifications, 0 or 1.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}
