//! # Actor Cell
//!
//! The per-actor state machine: the current behavior, the mailbox, and the
//! death signal. The cell defines the single-message step ([`run_once`]);
//! schedulers decide *when* steps run, the cell decides *what* a step does.
//!
//! [`run_once`]: ActorCell::run_once

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use crate::behavior::{Behavior, Message};
use crate::context::Context;
use crate::director::Director;
use crate::error::Interrupted;
use crate::id::ActorId;
use crate::mailbox::{Mailbox, OfferError};
use crate::signal::ExitReason;

/// One live actor: behavior slot, mailbox, death signal.
///
/// Cells are handed to schedulers at creation and driven by them from then
/// on. Host code and behaviors never touch a cell directly; they go through
/// the director and the [`Context`].
pub struct ActorCell {
    id: ActorId,
    description: Option<String>,
    director: Director,
    mailbox: Mailbox,
    /// `None` means dead, or "must die at the next step". Steps take the
    /// behavior out while running it, but only ever under the mailbox
    /// consumer guard, so the emptiness is never observable from another
    /// step.
    behavior: Mutex<Option<Box<dyn Behavior>>>,
    /// Monotonic death flag. A watch channel rather than a bare bool so a
    /// step blocked in `receive()` can be woken by the kill.
    death: watch::Sender<bool>,
}

impl ActorCell {
    pub(crate) fn new(
        id: ActorId,
        description: Option<String>,
        initial: Box<dyn Behavior>,
        mailbox_capacity: usize,
        director: Director,
    ) -> Self {
        let (death, _) = watch::channel(false);
        ActorCell {
            id,
            description,
            director,
            mailbox: Mailbox::bounded(mailbox_capacity),
            behavior: Mutex::new(Some(initial)),
            death,
        }
    }

    /// The actor's id.
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// The human-readable description given at creation, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// True once the actor has been killed. Monotonic.
    pub fn should_die(&self) -> bool {
        *self.death.borrow()
    }

    /// Raises the death signal: the next step short-circuits to
    /// drain-and-exit, and a step blocked in `receive()` wakes with
    /// [`Interrupted`]. Called by schedulers from [`Scheduler::stop`].
    ///
    /// [`Scheduler::stop`]: crate::scheduler::Scheduler::stop
    pub fn interrupt(&self) {
        self.death.send_replace(true);
    }

    pub(crate) fn death_signal(&self) -> watch::Receiver<bool> {
        self.death.subscribe()
    }

    pub(crate) fn director(&self) -> &Director {
        &self.director
    }

    /// Enqueues a message. Overflow is the mailbox's one upward error path:
    /// it kills this actor with [`ExitReason::MailboxBlocked`], and the
    /// sender never learns of it.
    pub fn deliver(&self, message: Message) {
        match self.mailbox.try_offer(message) {
            Ok(()) => {}
            Err(OfferError::Full) => {
                warn!(actor = %self.id, "mailbox overflow, killing actor");
                self.director
                    .kill(self.id, Some(Arc::new(ExitReason::MailboxBlocked)));
            }
            Err(OfferError::Disconnected) => {
                trace!(actor = %self.id, "message to dead mailbox dropped");
            }
        }
    }

    /// Runs the current behavior on at most one message.
    ///
    /// Schedulers submit one `run_once` per relayed message; surplus
    /// submissions find the mailbox empty and return (a spurious wake-up is
    /// harmless). Steps serialize on the mailbox consumer guard, so this may
    /// be submitted concurrently without breaching the one-step-in-flight
    /// rule.
    pub async fn run_once(self: Arc<Self>) {
        let mut inbox = self.mailbox.consumer().await;

        if self.should_die() {
            // Drop anything still queued so a stale wake-up cannot respawn
            // work for a dead actor.
            while inbox.try_recv().is_ok() {}
            return;
        }

        let behavior = self.behavior.lock().take();
        let Some(behavior) = behavior else {
            // A live actor always has a behavior between steps; reaching
            // this means a scheduler stepped an actor it was told to stop.
            panic!("{} stepped without a behavior; scheduler bug", self.id);
        };

        let Ok(message) = inbox.try_recv() else {
            *self.behavior.lock() = Some(behavior);
            return;
        };

        let mut ctx = Context::new(&self, &mut inbox);
        let outcome = AssertUnwindSafe(behavior.apply(&mut ctx, message))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(Some(next))) => {
                *self.behavior.lock() = Some(next);
            }
            Ok(Ok(None)) => {
                debug!(actor = %self.id, "behavior finished, exiting cleanly");
                self.director.kill(self.id, None);
            }
            Ok(Err(fault)) => {
                let reason = match fault.downcast::<Interrupted>() {
                    Ok(_) => ExitReason::Interrupted,
                    Err(fault) => ExitReason::Fault(fault),
                };
                debug!(actor = %self.id, reason = ?reason, "behavior faulted");
                self.director.kill(self.id, Some(Arc::new(reason)));
            }
            Err(payload) => {
                let message = panic_message(&payload);
                debug!(actor = %self.id, panic = %message, "behavior panicked");
                self.director
                    .kill(self.id, Some(Arc::new(ExitReason::Panicked(message))));
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        String::from("non-string panic payload")
    }
}
