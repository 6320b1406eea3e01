//! The supervisor actor: traps exits, links every worker it spawns, and
//! replaces workers as they die. One-for-one restarts with no backoff; the
//! demo is about the supervision wiring, not restart policy.

use async_trait::async_trait;
use tracing::{info, warn};

use troupe::{ActorId, ActorOptions, Behavior, Context, Fault, Message, Next, Signal};

use crate::model::{SpawnWorkers, WorkerRestarted, WorkersReady};
use crate::worker::Worker;

/// Well-known alias the supervisor claims for itself.
pub const SUPERVISOR_ALIAS: &str = "sample.supervisor";

pub struct Supervisor {
    report_to: ActorId,
}

impl Supervisor {
    pub fn new(report_to: ActorId) -> Self {
        Supervisor { report_to }
    }

    fn spawn_worker(&self, ctx: &Context<'_>) -> Result<ActorId, Fault> {
        let worker = ctx.create_with(Worker, ActorOptions::new().description("worker"))?;
        ctx.link(worker);
        Ok(worker)
    }
}

#[async_trait]
impl Behavior for Supervisor {
    async fn apply(
        self: Box<Self>,
        ctx: &mut Context<'_>,
        message: Message,
    ) -> Result<Next, Fault> {
        let message = match message.downcast::<SpawnWorkers>() {
            Ok(spawn) => {
                // Trap before the first link exists, so no worker death can
                // take the supervisor down with it.
                ctx.trap_exit(true);
                ctx.register_alias(SUPERVISOR_ALIAS, ctx.self_id());

                let mut workers = Vec::with_capacity(spawn.count);
                for _ in 0..spawn.count {
                    workers.push(self.spawn_worker(ctx)?);
                }
                info!(count = workers.len(), "worker pool up");
                ctx.send(self.report_to, WorkersReady { workers });
                return Ok(Some(self));
            }
            Err(message) => message,
        };

        match message.downcast::<Signal>() {
            Ok(signal) => match *signal {
                Signal::Exit { peer, reason } => {
                    warn!(worker = %peer, reason = ?reason, "worker died, restarting");
                    let replacement = self.spawn_worker(ctx)?;
                    ctx.send(
                        self.report_to,
                        WorkerRestarted {
                            failed: peer,
                            replacement,
                        },
                    );
                    Ok(Some(self))
                }
                Signal::Down { .. } => Ok(Some(self)),
            },
            // Not for us; stay as we are.
            Err(_message) => Ok(Some(self)),
        }
    }
}
