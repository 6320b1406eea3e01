//! # Behavior Contract
//!
//! A behavior is the unit of actor logic: a value with a single operation
//! that consumes one message and answers with the behavior for the *next*
//! message. State lives in the behavior value itself; transitioning state
//! means returning a new value. This keeps behaviors free of shared mutable
//! state and unit-testable without the runtime.
//!
//! # Architecture Note
//! Why consume `self: Box<Self>`? Because "become" is a move: the actor's
//! current behavior is replaced wholesale by whatever the step returns.
//! Returning `Ok(Some(self))` keeps the current behavior; returning a
//! different boxed value transitions; returning `Ok(None)` ends the actor
//! cleanly. Errors (and panics) end the actor too, with the error as the
//! death reason delivered to its watchers and links.

use async_trait::async_trait;
use std::any::Any;

use crate::context::Context;

/// A message. The runtime never inspects user messages; it only synthesizes
/// [`Signal`](crate::Signal) envelopes, which arrive through the same type.
pub type Message = Box<dyn Any + Send>;

/// An error escaping a behavior step. Becomes the actor's death reason.
pub type Fault = Box<dyn std::error::Error + Send + Sync>;

/// The behavior to apply to the next message, or `None` to terminate.
pub type Next = Option<Box<dyn Behavior>>;

/// The single-method contract every actor implements.
#[async_trait]
pub trait Behavior: Send + 'static {
    /// Processes one message and returns the behavior for the following
    /// message.
    ///
    /// Termination rules:
    /// - `Ok(Some(behavior))`: the actor lives on with that behavior.
    /// - `Ok(None)`: the actor terminates cleanly (reason `None`).
    /// - `Err(fault)`: the actor terminates with `fault` as its reason.
    ///
    /// There is no forced termination in this runtime. A long-running step
    /// should periodically consult [`Context::should_die`] and bail out with
    /// an [`Interrupted`](crate::Interrupted) fault once it reads true;
    /// behaviors blocked in [`Context::receive`] are woken with the same
    /// error when the actor is killed. Catch it only if cleanup is needed,
    /// and propagate it afterwards.
    async fn apply(self: Box<Self>, ctx: &mut Context<'_>, message: Message) -> Result<Next, Fault>;
}
