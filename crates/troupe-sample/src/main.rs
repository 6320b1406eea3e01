//! Demo: bring up a supervised worker pool, run jobs through it, sabotage a
//! worker, and watch the supervisor replace it.
//!
//! Run with `RUST_LOG=info cargo run -p troupe-sample` (or `RUST_LOG=debug`
//! to see the runtime's own events).

use std::sync::Arc;

use tracing::info;

use troupe::probe::probe;
use troupe::tracing::setup_tracing;
use troupe::{Director, PoolScheduler, RuntimeError};
use troupe_sample::model::{Job, JobDone, Sabotage, SpawnWorkers, WorkerRestarted, WorkersReady};
use troupe_sample::supervisor::{Supervisor, SUPERVISOR_ALIAS};

#[tokio::main]
async fn main() -> Result<(), RuntimeError> {
    setup_tracing();

    let director = Director::new();
    director.register_scheduler("pool", Arc::new(PoolScheduler::current()))?;

    // The probe stands in for the host side of the conversation: every
    // reply-to below points at it.
    let (collector, mut events) = probe();
    let host = director.create_actor(collector)?;

    let supervisor = director.create_actor(Supervisor::new(host))?;
    director.send_message(supervisor, SpawnWorkers { count: 3 });

    let WorkersReady { workers } = events.expect::<WorkersReady>().await;
    info!(?workers, "pool ready");
    assert_eq!(director.lookup_alias(SUPERVISOR_ALIAS), supervisor);

    for (slot, worker) in workers.iter().enumerate() {
        director.send_message(
            *worker,
            Job {
                payload: slot as u64,
                reply_to: host,
            },
        );
    }
    for _ in &workers {
        let done = events.expect::<JobDone>().await;
        info!(worker = %done.worker, payload = done.payload, digest = done.digest, "job done");
    }

    // Now break something.
    director.send_message(workers[0], Sabotage);
    let restarted = events.expect::<WorkerRestarted>().await;
    info!(failed = %restarted.failed, replacement = %restarted.replacement, "worker replaced");

    // The replacement is a full citizen.
    director.send_message(
        restarted.replacement,
        Job {
            payload: 99,
            reply_to: host,
        },
    );
    let done = events.expect::<JobDone>().await;
    info!(worker = %done.worker, digest = done.digest, "replacement answered");

    Ok(())
}
