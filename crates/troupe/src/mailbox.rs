//! # Mailbox
//!
//! A bounded FIFO queue of messages for one actor. The producer half is
//! shared (any thread may enqueue); the consumer half is guarded by an async
//! mutex so that at most one step at a time can drain it: whoever holds the
//! guard *is* the running step.

use tokio::sync::{mpsc, Mutex, MutexGuard};

use crate::behavior::Message;

/// Enqueue failure modes. Overflow is the one that matters: it is not
/// silent, it kills the receiving actor (see [`ActorCell::deliver`]).
///
/// [`ActorCell::deliver`]: crate::cell::ActorCell::deliver
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum OfferError {
    /// The queue is at capacity.
    Full,
    /// The consumer half is gone. Only reachable while the cell is being
    /// torn down; the message is dropped.
    Disconnected,
}

pub(crate) struct Mailbox {
    sender: mpsc::Sender<Message>,
    receiver: Mutex<mpsc::Receiver<Message>>,
}

impl Mailbox {
    /// Creates a mailbox holding at most `capacity` messages. Capacity is
    /// fixed for the life of the actor.
    pub(crate) fn bounded(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity);
        Mailbox {
            sender,
            receiver: Mutex::new(receiver),
        }
    }

    /// Non-blocking enqueue.
    pub(crate) fn try_offer(&self, message: Message) -> Result<(), OfferError> {
        self.sender.try_send(message).map_err(|error| match error {
            mpsc::error::TrySendError::Full(_) => OfferError::Full,
            mpsc::error::TrySendError::Closed(_) => OfferError::Disconnected,
        })
    }

    /// Takes the consumer guard. Steps queue here: holding the guard is what
    /// makes execution single-threaded per actor.
    pub(crate) async fn consumer(&self) -> MutexGuard<'_, mpsc::Receiver<Message>> {
        self.receiver.lock().await
    }
}
