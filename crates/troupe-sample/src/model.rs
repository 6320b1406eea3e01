//! Message types exchanged between the host, the supervisor, and the
//! workers. Plain data; every actor recognizes them by downcast.

use troupe::ActorId;

/// Host → supervisor: bring up `count` linked workers.
#[derive(Debug)]
pub struct SpawnWorkers {
    pub count: usize,
}

/// Supervisor → host: the pool is up.
#[derive(Debug)]
pub struct WorkersReady {
    pub workers: Vec<ActorId>,
}

/// Host → worker: one unit of work.
#[derive(Debug)]
pub struct Job {
    pub payload: u64,
    pub reply_to: ActorId,
}

/// Worker → host: the work, done.
#[derive(Debug)]
pub struct JobDone {
    pub worker: ActorId,
    pub payload: u64,
    pub digest: u64,
}

/// Host → worker: die messily, so the supervisor has something to do.
#[derive(Debug)]
pub struct Sabotage;

/// Supervisor → host: a worker died and was replaced.
#[derive(Debug)]
pub struct WorkerRestarted {
    pub failed: ActorId,
    pub replacement: ActorId,
}
