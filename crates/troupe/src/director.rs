//! # Director
//!
//! The director owns the directory of live actors and marshals everything
//! that happens between them: creation, message relay, death propagation,
//! links, watches, and the alias table.
//!
//! Hosts typically touch the director twice: once to register a scheduler
//! and once to create the bootstrap actor. From then on the system grows
//! from the inside, with behaviors using their [`Context`](crate::Context)
//! rather than the director directly.
//!
//! # Architecture Note
//! All supervision-graph mutations (kill, watch, unwatch, link, unlink)
//! serialize on one registry-wide mutex, while plain lookups (message sends,
//! trap-exit reads) go through the concurrent maps without it. Linking
//! touches two records at once, so it inherits the global ordering; there is
//! no fine-grained two-lock protocol here. The coarse lock is only ever held
//! for pointer-sized bookkeeping, never for delivery.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::{debug, info, trace};

use crate::alias::AliasTable;
use crate::behavior::{Behavior, Message};
use crate::cell::ActorCell;
use crate::error::RuntimeError;
use crate::id::{ActorId, WatchId};
use crate::scheduler::Scheduler;
use crate::signal::{ExitReason, Reason, Signal};

/// Name under which a scheduler becomes the implicit default.
pub const DEFAULT_SCHEDULER_NAME: &str = "troupe.default-scheduler";

/// Default mailbox capacity when [`ActorOptions`] doesn't override it.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 10_000_000;

static GLOBAL: Lazy<Director> = Lazy::new(Director::new);

/// Configuration for one actor creation.
#[derive(Default)]
pub struct ActorOptions {
    description: Option<String>,
    scheduler: Option<String>,
    mailbox_capacity: Option<usize>,
    trap_exit: bool,
}

impl ActorOptions {
    pub fn new() -> Self {
        ActorOptions::default()
    }

    /// Human-readable description, echoed in logging. Opaque to the runtime.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Name of the scheduler to place the actor on. Defaults to the
    /// registered default.
    pub fn scheduler(mut self, name: impl Into<String>) -> Self {
        self.scheduler = Some(name.into());
        self
    }

    /// Mailbox capacity; must be positive. Defaults to
    /// [`DEFAULT_MAILBOX_CAPACITY`].
    pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = Some(capacity);
        self
    }

    /// Whether the actor starts out trapping exits (default false).
    pub fn trap_exit(mut self, trap: bool) -> Self {
        self.trap_exit = trap;
        self
    }
}

/// Per-actor supervision record. Owned exclusively by the director; user
/// code never sees one.
struct ActorRecord {
    /// Responsible for executing this actor. Immutable after creation.
    scheduler: Arc<dyn Scheduler>,
    /// When set, a linked peer's death arrives as a
    /// [`Signal::Exit`] envelope instead of cascading the kill.
    traps_exit: AtomicBool,
    /// Ids of linked peers. Symmetric: this id appears in each peer's set.
    linkages: HashSet<ActorId>,
    /// Outstanding watches on this actor: watch id → watcher.
    watches: HashMap<WatchId, ActorId>,
}

impl ActorRecord {
    fn new(scheduler: Arc<dyn Scheduler>, traps_exit: bool) -> Self {
        ActorRecord {
            scheduler,
            traps_exit: AtomicBool::new(traps_exit),
            linkages: HashSet::new(),
            watches: HashMap::new(),
        }
    }
}

struct DirectorInner {
    actors: DashMap<ActorId, ActorRecord>,
    schedulers: DashMap<String, Arc<dyn Scheduler>>,
    default_scheduler: Mutex<Option<String>>,
    aliases: AliasTable,
    /// Serializes supervision-graph mutations. Lookups stay lock-free on the
    /// concurrent maps; this only guards the critical sections that read and
    /// write link/watch sets across records.
    graph: Mutex<()>,
}

/// Process-wide facade over the actor directory. Cheap to clone; clones
/// share the same directory.
#[derive(Clone)]
pub struct Director {
    inner: Arc<DirectorInner>,
}

impl Default for Director {
    fn default() -> Self {
        Director::new()
    }
}

impl Director {
    /// Creates an empty directory. At least one scheduler must be registered
    /// before the first actor is created.
    pub fn new() -> Self {
        Director {
            inner: Arc::new(DirectorInner {
                actors: DashMap::new(),
                schedulers: DashMap::new(),
                default_scheduler: Mutex::new(None),
                aliases: AliasTable::new(),
                graph: Mutex::new(()),
            }),
        }
    }

    /// The process-default instance. Provided as a convenience for hosts
    /// that want exactly one directory; nothing in the runtime depends on
    /// it, and tests should construct their own with [`Director::new`].
    pub fn global() -> &'static Director {
        &GLOBAL
    }

    /// Registers a scheduler under `name`. If it is the only scheduler it
    /// doubles as the default; with several registered, the default is the
    /// one named [`DEFAULT_SCHEDULER_NAME`] or whatever
    /// [`set_default_scheduler`](Director::set_default_scheduler) chose.
    /// Schedulers cannot be replaced or unregistered.
    pub fn register_scheduler(
        &self,
        name: &str,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<(), RuntimeError> {
        match self.inner.schedulers.entry(name.to_string()) {
            Entry::Occupied(_) => Err(RuntimeError::SchedulerAlreadyRegistered(name.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(scheduler);
                info!(scheduler = name, "scheduler registered");
                Ok(())
            }
        }
    }

    /// Makes the scheduler registered under `name` the implicit default for
    /// actors created without an explicit scheduler.
    pub fn set_default_scheduler(&self, name: &str) -> Result<(), RuntimeError> {
        if !self.inner.schedulers.contains_key(name) {
            return Err(RuntimeError::UnknownScheduler(name.to_string()));
        }
        *self.inner.default_scheduler.lock() = Some(name.to_string());
        Ok(())
    }

    fn resolve_scheduler(&self, name: Option<&str>) -> Result<Arc<dyn Scheduler>, RuntimeError> {
        if let Some(name) = name {
            return self
                .inner
                .schedulers
                .get(name)
                .map(|entry| Arc::clone(entry.value()))
                .ok_or_else(|| RuntimeError::UnknownScheduler(name.to_string()));
        }
        if let Some(name) = self.inner.default_scheduler.lock().clone() {
            return self
                .inner
                .schedulers
                .get(&name)
                .map(|entry| Arc::clone(entry.value()))
                .ok_or(RuntimeError::UnknownScheduler(name));
        }
        if let Some(entry) = self.inner.schedulers.get(DEFAULT_SCHEDULER_NAME) {
            return Ok(Arc::clone(entry.value()));
        }
        if self.inner.schedulers.len() == 1 {
            if let Some(entry) = self.inner.schedulers.iter().next() {
                return Ok(Arc::clone(entry.value()));
            }
        }
        Err(RuntimeError::UnknownScheduler(
            DEFAULT_SCHEDULER_NAME.to_string(),
        ))
    }

    /// Creates an actor with default options and returns its id.
    pub fn create_actor(&self, behavior: impl Behavior) -> Result<ActorId, RuntimeError> {
        self.create_actor_with(behavior, ActorOptions::new())
    }

    /// Creates an actor. On return the actor is installed and schedulable,
    /// though nothing stops it from already having been killed by the time
    /// the caller looks at the returned id.
    pub fn create_actor_with(
        &self,
        behavior: impl Behavior,
        options: ActorOptions,
    ) -> Result<ActorId, RuntimeError> {
        let ActorOptions {
            description,
            scheduler: scheduler_name,
            mailbox_capacity,
            trap_exit,
        } = options;
        let capacity = mailbox_capacity.unwrap_or(DEFAULT_MAILBOX_CAPACITY);
        if capacity == 0 {
            return Err(RuntimeError::InvalidMailboxCapacity);
        }
        let scheduler = self.resolve_scheduler(scheduler_name.as_deref())?;

        loop {
            let id = ActorId::random();
            match self.inner.actors.entry(id) {
                // A collision with a live id: draw again.
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    slot.insert(ActorRecord::new(Arc::clone(&scheduler), trap_exit));
                }
            }
            let cell = Arc::new(ActorCell::new(
                id,
                description,
                Box::new(behavior),
                capacity,
                self.clone(),
            ));
            debug!(actor = %id, description = cell.description(), "actor created");
            scheduler.schedule(cell);
            return Ok(id);
        }
    }

    /// Sends a message to `to`. Best-effort: unknown ids drop silently.
    pub fn send_message<M: Send + 'static>(&self, to: ActorId, message: M) {
        self.send_boxed(to, Box::new(message));
    }

    /// [`send_message`](Director::send_message) for an already-boxed value.
    pub fn send_boxed(&self, to: ActorId, message: Message) {
        let Some(scheduler) = self
            .inner
            .actors
            .get(&to)
            .map(|record| Arc::clone(&record.scheduler))
        else {
            trace!(actor = %to, "message to unknown actor dropped");
            return;
        };
        scheduler.relay(to, message);
    }

    /// Kills `id` and propagates the death: every outstanding watch fires a
    /// [`Signal::Down`], every linked peer either receives a
    /// [`Signal::Exit`] (if it traps exits) or is killed in turn with a
    /// [`ExitReason::LinkDown`] reason. Killing an unknown or already-dead
    /// actor is a no-op. Never fails: notifications to peers that died in
    /// the meantime are swallowed.
    ///
    /// Removal from the directory is the moment of death: whatever watches
    /// and links the record holds right then are notified exactly once, in
    /// no particular order.
    pub fn kill(&self, id: ActorId, reason: Reason) {
        let mut notifications: Vec<(ActorId, Signal)> = Vec::new();
        {
            let _graph = self.inner.graph.lock();
            // Iterative worklist: link graphs can cycle, and a cascade must
            // neither revisit a record (removal already took it out of the
            // directory) nor recurse into the non-reentrant graph lock.
            let mut doomed: Vec<(ActorId, Reason)> = vec![(id, reason)];
            while let Some((id, reason)) = doomed.pop() {
                let Some((_, record)) = self.inner.actors.remove(&id) else {
                    continue;
                };
                // Stopping the scheduler first keeps a half-dead actor from
                // stepping over the notifications below.
                record.scheduler.stop(id);
                debug!(actor = %id, reason = ?reason, "actor died");

                for (watch, watcher) in record.watches {
                    notifications.push((
                        watcher,
                        Signal::Down {
                            watch,
                            reason: reason.clone(),
                        },
                    ));
                }
                for linked in record.linkages {
                    let mut traps = None;
                    if let Some(mut peer) = self.inner.actors.get_mut(&linked) {
                        peer.linkages.remove(&id);
                        traps = Some(peer.traps_exit.load(Ordering::Acquire));
                    }
                    match traps {
                        // The peer died first; its own propagation covers us.
                        None => continue,
                        Some(true) => notifications.push((
                            linked,
                            Signal::Exit {
                                peer: id,
                                reason: reason.clone(),
                            },
                        )),
                        Some(false) => doomed.push((
                            linked,
                            Some(Arc::new(ExitReason::LinkDown {
                                peer: id,
                                cause: reason.clone(),
                            })),
                        )),
                    }
                }
            }
        }
        // Deliver after releasing the graph lock: a notification can itself
        // overflow a mailbox and re-enter kill.
        for (target, signal) in notifications {
            self.send_boxed(target, Box::new(signal));
        }
    }

    /// Registers a watch of `target` on behalf of `watcher` and returns its
    /// id. If the target does not exist the watcher immediately receives
    /// [`Signal::Down`] with reason `None`.
    ///
    /// # Panics
    /// If `watcher` itself is unknown. Watches can only be placed by live
    /// actors, so this indicates a runtime bug.
    pub fn watch(&self, watcher: ActorId, target: ActorId) -> WatchId {
        let mut fired = false;
        let watch = {
            let _graph = self.inner.graph.lock();
            if !self.inner.actors.contains_key(&watcher) {
                panic!("watch requested by unknown {watcher}; almost certainly a runtime bug, please report");
            }
            match self.inner.actors.get_mut(&target) {
                None => {
                    fired = true;
                    WatchId::random()
                }
                Some(mut record) => {
                    let mut watch = WatchId::random();
                    while record.watches.contains_key(&watch) {
                        watch = WatchId::random();
                    }
                    record.watches.insert(watch, watcher);
                    watch
                }
            }
        };
        if fired {
            self.send_boxed(
                watcher,
                Box::new(Signal::Down {
                    watch,
                    reason: None,
                }),
            );
        }
        watch
    }

    /// Removes one watch from `target`. Idempotent; no notification, and a
    /// removed watch never fires.
    pub fn unwatch(&self, target: ActorId, watch: WatchId) {
        let _graph = self.inner.graph.lock();
        if let Some(mut record) = self.inner.actors.get_mut(&target) {
            record.watches.remove(&watch);
        }
    }

    /// Links `a` and `b`. If exactly one of them is already gone, the
    /// survivor is treated as if the link had existed when the other died:
    /// an exit envelope if it traps, a kill otherwise. Idempotent for live
    /// pairs; at most one link exists per pair.
    ///
    /// Linking races against concurrent deaths, so a death that interleaves
    /// with the link may go unobserved by one side. Link before first
    /// message delivery where that matters.
    ///
    /// # Panics
    /// If both endpoints are unknown, which is almost certainly an
    /// unintended race in the caller.
    pub fn link(&self, a: ActorId, b: ActorId) {
        if a == b {
            // A self-link could never fire: propagation skips the dead id.
            return;
        }
        let lone_survivor = {
            let _graph = self.inner.graph.lock();
            let a_live = self.inner.actors.contains_key(&a);
            let b_live = self.inner.actors.contains_key(&b);
            match (a_live, b_live) {
                (false, false) => {
                    panic!("link between two unknown actors ({a}, {b}); almost certainly an unintended race, please report")
                }
                (true, false) => Some((a, b)),
                (false, true) => Some((b, a)),
                (true, true) => {
                    if let Some(mut record) = self.inner.actors.get_mut(&a) {
                        record.linkages.insert(b);
                    }
                    if let Some(mut record) = self.inner.actors.get_mut(&b) {
                        record.linkages.insert(a);
                    }
                    None
                }
            }
        };
        if let Some((survivor, dead)) = lone_survivor {
            self.deliver_link_down(survivor, dead, None);
        }
    }

    /// Exit-or-kill decision for a link firing, read at this moment.
    fn deliver_link_down(&self, survivor: ActorId, dead: ActorId, cause: Reason) {
        let traps = self
            .inner
            .actors
            .get(&survivor)
            .map(|record| record.traps_exit.load(Ordering::Acquire));
        match traps {
            None => {}
            Some(true) => self.send_boxed(
                survivor,
                Box::new(Signal::Exit {
                    peer: dead,
                    reason: cause,
                }),
            ),
            Some(false) => self.kill(
                survivor,
                Some(Arc::new(ExitReason::LinkDown { peer: dead, cause })),
            ),
        }
    }

    /// Removes the link between `a` and `b`, if any. Best-effort symmetric
    /// removal; no notification. The same race caveats as [`link`] apply.
    ///
    /// [`link`]: Director::link
    pub fn unlink(&self, a: ActorId, b: ActorId) {
        let _graph = self.inner.graph.lock();
        if let Some(mut record) = self.inner.actors.get_mut(&a) {
            record.linkages.remove(&b);
        }
        if let Some(mut record) = self.inner.actors.get_mut(&b) {
            record.linkages.remove(&a);
        }
    }

    /// Sets the trap-exit flag on `id`. No-op for unknown ids. Takes effect
    /// for the next link-propagation decision that reads the record.
    pub fn set_exit_trapping(&self, id: ActorId, trap: bool) {
        if let Some(record) = self.inner.actors.get(&id) {
            record.traps_exit.store(trap, Ordering::Release);
        }
    }

    /// Alias put-if-absent; succeeds iff `name` is unbound.
    pub fn register_alias(&self, name: &str, id: ActorId) -> bool {
        self.inner.aliases.register(name, id)
    }

    /// Alias compare-and-replace; succeeds iff `name` is bound to `old`.
    pub fn replace_alias(&self, name: &str, old: ActorId, new: ActorId) -> bool {
        self.inner.aliases.replace(name, old, new)
    }

    /// Removes the alias, if bound. Idempotent.
    pub fn deregister_alias(&self, name: &str) {
        self.inner.aliases.deregister(name);
    }

    /// The id bound to `name`, or [`ActorId::NONEXISTENT`] on a miss.
    pub fn lookup_alias(&self, name: &str) -> ActorId {
        self.inner.aliases.lookup(name)
    }
}
