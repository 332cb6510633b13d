//! Stop signal for the GeoClue polling thread.
//!
//! The signal is the closing of a channel, so the worker sees it whether the
//! handle is dropped or explicitly shut down.

use async_channel::{Receiver, Sender};

/// Signals shutdown when dropped or when [`shutdown`](Self::shutdown) is called.
#[derive(Debug)]
pub(super) struct ShutdownHandle {
    sender: Sender<()>,
}

impl ShutdownHandle {
    /// Create a new shutdown handle and receiver pair.
    pub(super) fn new() -> (Self, ShutdownReceiver) {
        let (sender, receiver) = async_channel::bounded(1);
        (Self { sender }, ShutdownReceiver { receiver })
    }

    pub(super) fn shutdown(&self) {
        self.sender.close();
    }
}

impl Drop for ShutdownHandle {
    fn drop(&mut self) {
        self.sender.close();
    }
}

/// The worker side of a [`ShutdownHandle`].
#[derive(Debug, Clone)]
pub(super) struct ShutdownReceiver {
    receiver: Receiver<()>,
}

impl ShutdownReceiver {
    pub(super) fn is_shutdown(&self) -> bool {
        self.receiver.is_closed()
    }
}
