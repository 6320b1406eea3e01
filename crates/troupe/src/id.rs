//! # Identifiers
//!
//! Actors and watches are referred to by opaque 64-bit identifiers, never by
//! reference. Identifiers are drawn uniformly at random; the zero value is
//! reserved as the "no such actor" sentinel and is never issued. Collisions
//! with live identifiers are possible in principle but astronomically rare,
//! and the registries that install a fresh id detect them at insertion time
//! and simply draw again.

use std::fmt;

/// Opaque identifier of an actor.
///
/// The only id that can never belong to a live actor is
/// [`ActorId::NONEXISTENT`], which alias lookup returns on a miss.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId(u64);

impl ActorId {
    /// The reserved "no such actor" id. Never issued to a real actor.
    pub const NONEXISTENT: ActorId = ActorId(0);

    /// Draws a fresh random id, re-rolling the reserved zero value.
    pub fn random() -> Self {
        loop {
            let raw: u64 = rand::random();
            if raw != 0 {
                return ActorId(raw);
            }
        }
    }

    /// True for the reserved sentinel id.
    pub fn is_nonexistent(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor-{:016x}", self.0)
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({:016x})", self.0)
    }
}

/// Opaque identifier of one watch registration.
///
/// The same (watcher, target) pair may hold any number of distinct watch
/// ids; each fires independently.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

impl WatchId {
    /// Draws a fresh random watch id, re-rolling the reserved zero value.
    pub(crate) fn random() -> Self {
        loop {
            let raw: u64 = rand::random();
            if raw != 0 {
                return WatchId(raw);
            }
        }
    }
}

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "watch-{:016x}", self.0)
    }
}

impl fmt::Debug for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WatchId({:016x})", self.0)
    }
}
