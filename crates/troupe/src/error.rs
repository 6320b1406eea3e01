//! # Runtime Errors
//!
//! Programmer errors are surfaced synchronously through [`RuntimeError`];
//! everything that goes wrong *inside* an actor becomes that actor's death
//! reason instead (see [`crate::signal::ExitReason`]).

/// Errors returned by the director's configuration and creation surface.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// No scheduler is registered under the requested name, and no default
    /// could be resolved.
    #[error("unknown scheduler `{0}`")]
    UnknownScheduler(String),
    /// A scheduler is already registered under this name. Schedulers cannot
    /// be replaced once registered.
    #[error("scheduler `{0}` is already registered")]
    SchedulerAlreadyRegistered(String),
    /// Mailboxes must be able to hold at least one message.
    #[error("mailbox capacity must be positive")]
    InvalidMailboxCapacity,
}

/// The cooperative-interruption error.
///
/// [`Context::receive`](crate::Context::receive) yields this once the actor
/// has been killed. By convention a behavior propagates it (after any
/// cleanup) so the step terminates promptly; the duplicate self-kill this
/// causes is a no-op because the actor is already gone from the registry.
#[derive(Debug, thiserror::Error)]
#[error("actor was killed while waiting")]
pub struct Interrupted;
