//! # Death Reasons and Termination Envelopes
//!
//! When an actor dies, the runtime tells its observers why. A death carries a
//! [`Reason`]: `None` for a clean exit, or an [`ExitReason`] describing the
//! failure. Observers learn of the death through a [`Signal`] envelope
//! enqueued into their mailbox like any other message; behaviors recognize
//! one by downcasting the received message:
//!
//! ```ignore
//! if let Some(signal) = message.downcast_ref::<Signal>() {
//!     match signal {
//!         Signal::Down { watch, reason } => { /* a watched actor died */ }
//!         Signal::Exit { peer, reason } => { /* a linked actor died */ }
//!     }
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::id::{ActorId, WatchId};

/// Why an actor died. `None` is the clean exit (the behavior returned no
/// successor).
pub type Reason = Option<Arc<ExitReason>>;

/// The non-clean causes of death.
pub enum ExitReason {
    /// The actor's mailbox overflowed on enqueue. This is the single upward
    /// error path out of a mailbox: the failed send kills the receiver with
    /// exactly this reason, and the sender never hears about it.
    MailboxBlocked,
    /// The actor honored a kill while blocked in
    /// [`receive`](crate::Context::receive) or while polling
    /// [`should_die`](crate::Context::should_die).
    Interrupted,
    /// The behavior returned an error from a step.
    Fault(Box<dyn std::error::Error + Send + Sync>),
    /// The behavior panicked during a step. Carries the panic message when
    /// one could be extracted.
    Panicked(String),
    /// A host- or peer-supplied kill reason, carried verbatim.
    Killed(Arc<dyn Any + Send + Sync>),
    /// A linked peer died and the kill cascaded across the link. `cause` is
    /// the reason the peer itself died, so transitive cascades keep their
    /// provenance.
    LinkDown { peer: ActorId, cause: Reason },
}

impl ExitReason {
    /// Wraps an arbitrary value as a kill reason.
    pub fn killed<T: Any + Send + Sync>(value: T) -> Reason {
        Some(Arc::new(ExitReason::Killed(Arc::new(value))))
    }

    /// Wraps an error as a fault reason.
    pub fn fault<E: std::error::Error + Send + Sync + 'static>(error: E) -> Reason {
        Some(Arc::new(ExitReason::Fault(Box::new(error))))
    }
}

impl fmt::Debug for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::MailboxBlocked => f.write_str("MailboxBlocked"),
            ExitReason::Interrupted => f.write_str("Interrupted"),
            ExitReason::Fault(error) => f.debug_tuple("Fault").field(error).finish(),
            ExitReason::Panicked(message) => f.debug_tuple("Panicked").field(message).finish(),
            ExitReason::Killed(value) => {
                // Kill reasons are opaque, but the common string cases are
                // worth echoing in logs.
                if let Some(text) = value.downcast_ref::<&str>() {
                    f.debug_tuple("Killed").field(text).finish()
                } else if let Some(text) = value.downcast_ref::<String>() {
                    f.debug_tuple("Killed").field(text).finish()
                } else {
                    f.write_str("Killed(..)")
                }
            }
            ExitReason::LinkDown { peer, cause } => f
                .debug_struct("LinkDown")
                .field("peer", peer)
                .field("cause", cause)
                .finish(),
        }
    }
}

/// Termination envelopes the runtime synthesizes into observer mailboxes.
///
/// These are the only messages the runtime itself ever sends.
#[derive(Debug)]
pub enum Signal {
    /// A watched actor died (or did not exist when the watch was
    /// registered, in which case `reason` is `None`). Delivered exactly once
    /// per outstanding [`WatchId`].
    Down { watch: WatchId, reason: Reason },
    /// A linked actor died and this actor traps exits. Non-trapping link
    /// peers are killed instead of receiving this envelope.
    Exit { peer: ActorId, reason: Reason },
}
