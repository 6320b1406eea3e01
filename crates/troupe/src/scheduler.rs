//! # Schedulers
//!
//! A scheduler maps actors onto workers and drives their steps. The runtime
//! ships one implementation, [`PoolScheduler`], which submits steps to a
//! tokio runtime; hosts with special placement needs (a dedicated runtime
//! for blocking-heavy actors, a current-thread runtime for determinism) can
//! implement [`Scheduler`] themselves and register the result under its own
//! name with the director.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::runtime::Handle;
use tracing::trace;

use crate::behavior::Message;
use crate::cell::ActorCell;
use crate::id::ActorId;

/// The contract between the director and an execution backend.
///
/// Implementations must uphold two promises: a relayed message is followed
/// by at least one [`ActorCell::run_once`] submission for that actor, and a
/// stopped actor is never stepped again (in-flight work is signalled through
/// [`ActorCell::interrupt`]). Single-threaded execution per actor comes free:
/// `run_once` itself serializes on the mailbox consumer.
pub trait Scheduler: Send + Sync {
    /// Registers an actor with this scheduler. Called exactly once per actor
    /// at creation.
    ///
    /// # Panics
    /// If an actor with the same id is already scheduled; two live actors
    /// can never share an id, so this indicates a registry bug.
    fn schedule(&self, actor: Arc<ActorCell>);

    /// Places the message in the target's mailbox and ensures the actor is
    /// stepped at least once afterwards. Unknown targets are silently
    /// dropped.
    fn relay(&self, id: ActorId, message: Message);

    /// The actor has been removed from the registry: forget it, discard any
    /// pending wake-ups, and signal in-flight work to terminate.
    fn stop(&self, id: ActorId);
}

/// Scheduler backed by a tokio runtime.
///
/// Wraps an externally-supplied [`Handle`] as the opaque work-submitter and
/// keeps its own id→cell map; each relayed message enqueues through the cell
/// and submits one step to the runtime.
pub struct PoolScheduler {
    handle: Handle,
    cells: DashMap<ActorId, Arc<ActorCell>>,
}

impl PoolScheduler {
    /// Wraps the given runtime handle.
    pub fn new(handle: Handle) -> Self {
        PoolScheduler {
            handle,
            cells: DashMap::new(),
        }
    }

    /// Wraps the runtime the caller is currently on.
    ///
    /// # Panics
    /// Outside a tokio runtime context, like [`Handle::current`].
    pub fn current() -> Self {
        PoolScheduler::new(Handle::current())
    }
}

impl Scheduler for PoolScheduler {
    fn schedule(&self, actor: Arc<ActorCell>) {
        let id = actor.id();
        match self.cells.entry(id) {
            Entry::Occupied(_) => panic!("{id} is already scheduled; registry bug"),
            Entry::Vacant(slot) => {
                slot.insert(actor);
            }
        }
    }

    fn relay(&self, id: ActorId, message: Message) {
        let Some(cell) = self.cells.get(&id).map(|entry| Arc::clone(entry.value())) else {
            trace!(actor = %id, "relay to unknown actor dropped");
            return;
        };
        cell.deliver(message);
        // One step submission per message keeps the at-least-once promise;
        // a surplus step finds the mailbox empty and returns.
        self.handle.spawn(Arc::clone(&cell).run_once());
    }

    fn stop(&self, id: ActorId) {
        if let Some((_, cell)) = self.cells.remove(&id) {
            cell.interrupt();
        }
    }
}
