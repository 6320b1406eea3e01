//! # Probe (Test Support)
//!
//! A [`Probe`] is a behavior that forwards every message it receives onto a
//! channel the test holds, so assertions can be written against exactly what
//! an actor was sent, in order, with timeouts.
//!
//! ```ignore
//! let (probe, mut handle) = probe();
//! let observer = director.create_actor(probe)?;
//! director.send_message(observer, 7u32);
//! assert_eq!(handle.expect::<u32>().await, 7);
//! ```
//!
//! Probes stand in for the "sender" side of end-to-end scenarios: point
//! reply-to ids at a probe actor and drain the handle. They are ordinary
//! actors, so they can also be watched, linked, and killed, which makes
//! them the natural receiver for [`Signal`](crate::Signal) envelopes in
//! supervision tests.

use std::any::{type_name, Any};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::behavior::{Behavior, Fault, Message, Next};
use crate::context::Context;

const DEFAULT_WAIT: Duration = Duration::from_secs(5);

/// Creates a probe behavior and the handle observing it.
pub fn probe() -> (Probe, ProbeHandle) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Probe { sender }, ProbeHandle { receiver })
}

/// Behavior that forwards every received message to its [`ProbeHandle`].
/// Exits cleanly once the handle is dropped.
pub struct Probe {
    sender: mpsc::UnboundedSender<Message>,
}

#[async_trait]
impl Behavior for Probe {
    async fn apply(
        self: Box<Self>,
        _ctx: &mut Context<'_>,
        message: Message,
    ) -> Result<Next, Fault> {
        match self.sender.send(message) {
            Ok(()) => Ok(Some(self)),
            // Nobody is listening any more.
            Err(_) => Ok(None),
        }
    }
}

/// The observing end of a [`Probe`].
pub struct ProbeHandle {
    receiver: mpsc::UnboundedReceiver<Message>,
}

impl ProbeHandle {
    /// The next message the probe received, in arrival order.
    ///
    /// # Panics
    /// If nothing arrives within five seconds.
    pub async fn next(&mut self) -> Message {
        match timeout(DEFAULT_WAIT, self.receiver.recv()).await {
            Ok(Some(message)) => message,
            Ok(None) => panic!("probe actor died while the handle was waiting"),
            Err(_) => panic!("timed out waiting for a probe message"),
        }
    }

    /// The next message, downcast to `T`.
    ///
    /// # Panics
    /// On timeout, or if the next message is not a `T`.
    pub async fn expect<T: Any + Send>(&mut self) -> T {
        let message = self.next().await;
        match message.downcast::<T>() {
            Ok(value) => *value,
            Err(_) => panic!("probe expected a {}", type_name::<T>()),
        }
    }

    /// A message if one is already queued; never waits.
    pub fn try_next(&mut self) -> Option<Message> {
        self.receiver.try_recv().ok()
    }

    /// Asserts that nothing arrives for the whole `window`.
    ///
    /// # Panics
    /// If any message shows up.
    pub async fn expect_idle(&mut self, window: Duration) {
        if let Ok(Some(_)) = timeout(window, self.receiver.recv()).await {
            panic!("probe expected quiet but received a message");
        }
    }
}
