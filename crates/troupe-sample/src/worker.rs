//! The worker actor: hashes job payloads and reports back. Sabotage makes it
//! fault, which is the supervisor's cue in this demo.

use async_trait::async_trait;
use tracing::debug;

use troupe::{Behavior, Context, Fault, Message, Next};

use crate::model::{Job, JobDone, Sabotage};

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("worker was sabotaged")]
    Sabotaged,
}

/// Stateless job runner. Lives until killed or sabotaged.
pub struct Worker;

#[async_trait]
impl Behavior for Worker {
    async fn apply(
        self: Box<Self>,
        ctx: &mut Context<'_>,
        message: Message,
    ) -> Result<Next, Fault> {
        let message = match message.downcast::<Job>() {
            Ok(job) => {
                debug!(worker = %ctx.self_id(), payload = job.payload, "job accepted");
                ctx.send(
                    job.reply_to,
                    JobDone {
                        worker: ctx.self_id(),
                        payload: job.payload,
                        digest: digest(job.payload),
                    },
                );
                return Ok(Some(self));
            }
            Err(message) => message,
        };
        if message.downcast::<Sabotage>().is_ok() {
            return Err(WorkerError::Sabotaged.into());
        }
        // Anything else is noise; stay as we are.
        Ok(Some(self))
    }
}

/// A keyed xorshift scramble, enough to look like work.
fn digest(payload: u64) -> u64 {
    let mut x = payload ^ 0x9e37_79b9_7f4a_7c15;
    for _ in 0..32 {
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
    }
    x
}
