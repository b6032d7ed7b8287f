//! Bounded buffer of resources that are not checked out.
//!
//! Backed by a multi-producer multi-consumer channel: every pushed item is
//! delivered to exactly one taker, waiting takers are woken in order, and
//! once closed the buffer refuses writes while still letting the remaining
//! items be drained.

use async_channel::{Receiver, Sender, TrySendError};
use tokio::time::Instant;

/// Outcome of a timed take.
#[derive(Debug)]
pub(crate) enum Take<T> {
    /// An item was taken.
    Item(T),
    /// The deadline passed first.
    TimedOut,
    /// The buffer is closed and empty.
    Closed,
}

/// Why an item could not be pushed back; the item is handed back either way.
#[derive(Debug)]
pub(crate) enum Rejected<T> {
    /// The buffer is at capacity.
    Full(T),
    /// The buffer has been closed.
    Closed(T),
}

pub(crate) struct AvailableBuffer<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> AvailableBuffer<T> {
    /// `capacity` must be non-zero.
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, rx) = async_channel::bounded(capacity);
        Self { tx, rx }
    }

    /// Push without waiting.
    pub(crate) fn push(&self, item: T) -> Result<(), Rejected<T>> {
        self.tx.try_send(item).map_err(|e| match e {
            TrySendError::Full(item) => Rejected::Full(item),
            TrySendError::Closed(item) => Rejected::Closed(item),
        })
    }

    /// Wait for an item until `deadline`, or indefinitely when there is none.
    /// Dropping the future never loses an item.
    pub(crate) async fn take(&self, deadline: Option<Instant>) -> Take<T> {
        let received = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, self.rx.recv()).await {
                Ok(received) => received,
                Err(_) => return Take::TimedOut,
            },
            None => self.rx.recv().await,
        };
        match received {
            Ok(item) => Take::Item(item),
            Err(_) => Take::Closed,
        }
    }

    /// Take an item if one is immediately available.
    pub(crate) fn try_take(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    pub(crate) fn len(&self) -> usize {
        self.rx.len()
    }

    /// Refuse further pushes. Returns `false` if already closed.
    pub(crate) fn close(&self) -> bool {
        self.tx.close()
    }
}

impl<T> std::fmt::Debug for AvailableBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailableBuffer")
            .field("len", &self.rx.len())
            .field("capacity", &self.rx.capacity())
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}
