//! # Troupe
//!
//! A lightweight in-process actor runtime in the Erlang/OTP tradition:
//! independent concurrent actors with private bounded mailboxes,
//! message-driven behavior transitions, lifecycle supervision through links
//! and watches, and pluggable execution backends. Troupe is embedded as a
//! library inside a host program; there is no network, no persistence, no
//! distribution.
//!
//! ## Core Abstractions
//!
//! - **[`Behavior`]**: the unit of actor logic. Consume one message, answer
//!   with the behavior for the next one (or `None` to terminate). State
//!   lives in the behavior value; "become" is returning a different one.
//! - **[`Director`]**: the process-wide facade owning the directory of live
//!   actors, the supervision graph, and the alias table. Hosts use it to
//!   register schedulers and bootstrap the first actor.
//! - **[`Context`]**: the interface a running behavior sees. Send, create,
//!   kill, watch, link, alias operations, a blocking `receive`, and the
//!   cooperative-death probe `should_die`.
//! - **[`Scheduler`]**: maps actors onto workers. [`PoolScheduler`] drives
//!   steps on a tokio runtime; custom placements implement the trait.
//! - **[`Signal`]**: the termination envelopes the runtime synthesizes.
//!   `Down` when a watched actor dies, `Exit` when a linked peer dies and
//!   the survivor traps exits.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use troupe::{Behavior, Context, Director, Fault, Message, Next, PoolScheduler};
//!
//! struct Greeter;
//!
//! #[async_trait]
//! impl Behavior for Greeter {
//!     async fn apply(
//!         self: Box<Self>,
//!         _ctx: &mut Context<'_>,
//!         message: Message,
//!     ) -> Result<Next, Fault> {
//!         if let Ok(name) = message.downcast::<String>() {
//!             println!("hello, {name}");
//!         }
//!         Ok(Some(self))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), troupe::RuntimeError> {
//!     let director = Director::new();
//!     director.register_scheduler("pool", Arc::new(PoolScheduler::current()))?;
//!     let greeter = director.create_actor(Greeter)?;
//!     director.send_message(greeter, String::from("world"));
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! - Each message step runs as a task on the scheduler's pool; steps for one
//!   actor are totally ordered (at most one in flight), steps for different
//!   actors run in parallel up to pool capacity.
//! - Messages from one sender to one living receiver arrive in emission
//!   order. Nothing is promised across different sender/receiver pairs, or
//!   across the kill boundary.
//! - `kill` is cooperative: it removes the actor from the directory, wakes a
//!   step blocked in [`Context::receive`], and makes the next step
//!   short-circuit. A long computation must poll [`Context::should_die`];
//!   there is no forced termination.
//! - Mailboxes are bounded and overflow is fatal to the *receiver* (death
//!   reason [`ExitReason::MailboxBlocked`]), never an error for the sender.
//!   There is no backpressure.
//!
//! ## Supervision
//!
//! Links are symmetric: when either end dies the other is killed with a
//! [`ExitReason::LinkDown`] reason, unless it traps exits, in which case it
//! receives the death as a [`Signal::Exit`] envelope and carries on. Watches
//! are directed and fire exactly one [`Signal::Down`] per registration.
//! Behaviors recognize envelopes by downcasting received messages to
//! [`Signal`].
//!
//! ## Testing
//!
//! The [`probe`] module ships a ready-made observer behavior: create a probe
//! actor, point reply-to ids (or watches, or links) at it, and assert on the
//! messages its handle collects. See that module for the patterns the
//! integration tests use.

mod alias;
pub mod behavior;
pub mod cell;
pub mod context;
pub mod director;
pub mod error;
pub mod id;
mod mailbox;
pub mod probe;
pub mod scheduler;
pub mod signal;
pub mod tracing;

// Re-export the working set so hosts rarely need the module paths.
pub use behavior::{Behavior, Fault, Message, Next};
pub use cell::ActorCell;
pub use context::Context;
pub use director::{
    ActorOptions, Director, DEFAULT_MAILBOX_CAPACITY, DEFAULT_SCHEDULER_NAME,
};
pub use error::{Interrupted, RuntimeError};
pub use id::{ActorId, WatchId};
pub use scheduler::{PoolScheduler, Scheduler};
pub use signal::{ExitReason, Reason, Signal};
