//! # Execution Context
//!
//! The one interface a behavior uses to speak to the runtime. Every
//! operation works in terms of ids, never live actor references, so holding
//! a context never keeps another actor alive or reachable.
//!
//! A fresh context is constructed for each step and handed to
//! [`Behavior::apply`](crate::Behavior::apply); it borrows the actor's
//! mailbox consumer for the duration of the step, which is what lets
//! [`receive`](Context::receive) take messages without breaking the
//! single-consumer rule.

use tokio::sync::mpsc;

use crate::behavior::{Behavior, Message};
use crate::cell::ActorCell;
use crate::director::ActorOptions;
use crate::error::{Interrupted, RuntimeError};
use crate::id::{ActorId, WatchId};
use crate::signal::Reason;

/// Handle to the runtime for the behavior currently being applied.
pub struct Context<'a> {
    cell: &'a ActorCell,
    inbox: &'a mut mpsc::Receiver<Message>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(cell: &'a ActorCell, inbox: &'a mut mpsc::Receiver<Message>) -> Self {
        Context { cell, inbox }
    }

    /// The id of the actor running this behavior.
    pub fn self_id(&self) -> ActorId {
        self.cell.id()
    }

    /// The actor's description, as given at creation.
    pub fn description(&self) -> Option<&str> {
        self.cell.description()
    }

    /// Toggles whether this actor survives the death of a linked peer. When
    /// trapping, link deaths arrive as [`Signal::Exit`](crate::Signal::Exit)
    /// envelopes instead of cascading the kill.
    ///
    /// The flag is read at the moment a death propagates; toggling while a
    /// kill is in flight races that read.
    pub fn trap_exit(&self, trap: bool) {
        self.cell.director().set_exit_trapping(self.self_id(), trap);
    }

    /// Sends a message to `to`. Best-effort: if no actor is registered under
    /// that id the message is silently dropped. Messages from this actor to
    /// a given live receiver arrive in the order they were sent; no ordering
    /// holds across different sender/receiver pairs.
    pub fn send<M: Send + 'static>(&self, to: ActorId, message: M) {
        self.cell.director().send_message(to, message);
    }

    /// [`send`](Context::send) for an already-boxed message, e.g. when
    /// forwarding something received.
    pub fn send_boxed(&self, to: ActorId, message: Message) {
        self.cell.director().send_boxed(to, message);
    }

    /// Creates a new actor with default options and returns its id. The
    /// actor is installed and schedulable on return, though it may already
    /// have been killed by the time the caller looks.
    pub fn create(&self, behavior: impl Behavior) -> Result<ActorId, RuntimeError> {
        self.cell.director().create_actor(behavior)
    }

    /// Creates a new actor with explicit [`ActorOptions`].
    pub fn create_with(
        &self,
        behavior: impl Behavior,
        options: ActorOptions,
    ) -> Result<ActorId, RuntimeError> {
        self.cell.director().create_actor_with(behavior, options)
    }

    /// Initiates death propagation of `id` with the given reason. Killing a
    /// dead or unknown actor is a no-op. There is no temporal guarantee
    /// between a kill and the target's in-flight message processing.
    pub fn kill(&self, id: ActorId, reason: Reason) {
        self.cell.director().kill(id, reason);
    }

    /// Watches `id` for death. When it dies, exactly one
    /// [`Signal::Down`](crate::Signal::Down) carrying the returned watch id
    /// arrives in this actor's mailbox. Watching a nonexistent actor
    /// delivers the envelope immediately with reason `None`. The same target
    /// may be watched any number of times; each watch fires independently.
    pub fn watch(&self, id: ActorId) -> WatchId {
        self.cell.director().watch(self.self_id(), id)
    }

    /// Removes a watch previously placed on `id`. Idempotent; no
    /// notification is sent, and a removed watch will never fire.
    pub fn unwatch(&self, id: ActorId, watch: WatchId) {
        self.cell.director().unwatch(id, watch);
    }

    /// Links this actor to `id`. Equivalent to
    /// [`link_pair`](Context::link_pair)`(self_id(), id)`.
    pub fn link(&self, id: ActorId) {
        self.link_pair(self.self_id(), id);
    }

    /// Links two actors. If either dies, the other is killed unless it traps
    /// exits, in which case it receives a
    /// [`Signal::Exit`](crate::Signal::Exit) envelope instead. Links are
    /// symmetric, and at most one link exists per pair: repeated links are
    /// idempotent.
    ///
    /// Linking races against concurrent deaths: link before the first
    /// message is delivered if the supervision must not miss anything.
    pub fn link_pair(&self, a: ActorId, b: ActorId) {
        self.cell.director().link(a, b);
    }

    /// Removes the link between this actor and `id`, if any.
    pub fn unlink(&self, id: ActorId) {
        self.unlink_pair(self.self_id(), id);
    }

    /// Removes the link between two actors. Best-effort symmetric removal;
    /// no notification.
    pub fn unlink_pair(&self, a: ActorId, b: ActorId) {
        self.cell.director().unlink(a, b);
    }

    /// Blocks until the next message is available in this actor's mailbox
    /// and takes it, jumping the usual one-message-per-step cadence.
    ///
    /// Returns [`Interrupted`] once the actor has been killed; propagate it
    /// (after any cleanup) to finish the step promptly.
    ///
    /// Caveat: while suspended here the actor holds its step slot, so every
    /// other message queued behind this one waits. Prefer receiving messages
    /// through [`Behavior::apply`](crate::Behavior::apply) parameters when
    /// you can.
    pub async fn receive(&mut self) -> Result<Message, Interrupted> {
        let mut death = self.cell.death_signal();
        tokio::select! {
            biased;
            _ = death.wait_for(|dead| *dead) => Err(Interrupted),
            message = self.inbox.recv() => message.ok_or(Interrupted),
        }
    }

    /// True once this actor has been killed. Long computations should poll
    /// this and bail out with an [`Interrupted`] fault when it reads true.
    pub fn should_die(&self) -> bool {
        self.cell.should_die()
    }

    /// Binds `name` to `id` if, and only if, the name is currently unbound.
    /// Returns whether the binding was installed. The id need not belong to
    /// a live actor.
    pub fn register_alias(&self, name: &str, id: ActorId) -> bool {
        self.cell.director().register_alias(name, id)
    }

    /// Atomically rebinds `name` from `old` to `new`; succeeds iff the name
    /// is currently bound to `old`.
    pub fn replace_alias(&self, name: &str, old: ActorId, new: ActorId) -> bool {
        self.cell.director().replace_alias(name, old, new)
    }

    /// Removes the binding for `name`, if any. Idempotent.
    pub fn deregister_alias(&self, name: &str) {
        self.cell.director().deregister_alias(name);
    }

    /// Looks up `name`, returning [`ActorId::NONEXISTENT`] on a miss.
    pub fn lookup_alias(&self, name: &str) -> ActorId {
        self.cell.director().lookup_alias(name)
    }
}
