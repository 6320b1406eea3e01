//! String-to-id directory with compare-and-set semantics.
//!
//! Aliases let actors find each other by well-known name. The bound id is
//! not required to belong to a live actor, and dying actors do not clear
//! their aliases; supervisors use [`replace`](AliasTable::replace) to swing
//! a name atomically from a dead incarnation to its replacement.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::id::ActorId;

pub(crate) struct AliasTable {
    entries: DashMap<String, ActorId>,
}

impl AliasTable {
    pub(crate) fn new() -> Self {
        AliasTable {
            entries: DashMap::new(),
        }
    }

    /// Atomic put-if-absent. Succeeds iff `name` is unbound.
    pub(crate) fn register(&self, name: &str, id: ActorId) -> bool {
        match self.entries.entry(name.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(id);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Atomic compare-and-replace. Succeeds iff `name` is currently bound to
    /// `old`.
    pub(crate) fn replace(&self, name: &str, old: ActorId, new: ActorId) -> bool {
        match self.entries.entry(name.to_string()) {
            Entry::Occupied(mut slot) if *slot.get() == old => {
                slot.insert(new);
                true
            }
            _ => false,
        }
    }

    /// Removes the binding, if any. Idempotent.
    pub(crate) fn deregister(&self, name: &str) {
        self.entries.remove(name);
    }

    /// The bound id, or [`ActorId::NONEXISTENT`] on a miss.
    pub(crate) fn lookup(&self, name: &str) -> ActorId {
        self.entries
            .get(name)
            .map(|entry| *entry.value())
            .unwrap_or(ActorId::NONEXISTENT)
    }
}
