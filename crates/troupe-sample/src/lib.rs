//! # Troupe Sample
//!
//! A small host program built on the `troupe` runtime: a trap-exit
//! [`Supervisor`](supervisor::Supervisor) spawns a pool of linked
//! [`Worker`](worker::Worker) actors, hands them jobs, and restarts any that
//! die. The modules are exposed so the integration tests can drive the same
//! behaviors `main` does.

pub mod model;
pub mod supervisor;
pub mod worker;
