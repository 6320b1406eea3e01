//! End-to-end lifecycle behavior: clean exits, become-transitions, ordering,
//! mailbox overflow, and cooperative interruption of a blocked receive.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use troupe::probe::probe;
use troupe::{
    ActorId, ActorOptions, Behavior, Context, Director, ExitReason, Fault, Message, Next,
    PoolScheduler, Signal,
};

fn stage() -> Director {
    let director = Director::new();
    director
        .register_scheduler("pool", Arc::new(PoolScheduler::current()))
        .unwrap();
    director
}

// --- Test Behaviors ---

/// Replies with the received integer and terminates cleanly.
struct EchoOnce;

#[async_trait]
impl Behavior for EchoOnce {
    async fn apply(
        self: Box<Self>,
        ctx: &mut Context<'_>,
        message: Message,
    ) -> Result<Next, Fault> {
        let (reply_to, value) = *message.downcast::<(ActorId, i32)>().unwrap();
        ctx.send(reply_to, value);
        Ok(None)
    }
}

/// Reports its count and becomes itself-plus-one.
struct Counter {
    count: u32,
    report_to: ActorId,
}

#[async_trait]
impl Behavior for Counter {
    async fn apply(
        self: Box<Self>,
        ctx: &mut Context<'_>,
        _message: Message,
    ) -> Result<Next, Fault> {
        ctx.send(self.report_to, self.count);
        Ok(Some(Box::new(Counter {
            count: self.count + 1,
            report_to: self.report_to,
        })))
    }
}

/// Takes its time over every message.
struct Sleeper;

#[async_trait]
impl Behavior for Sleeper {
    async fn apply(
        self: Box<Self>,
        _ctx: &mut Context<'_>,
        _message: Message,
    ) -> Result<Next, Fault> {
        sleep(Duration::from_millis(200)).await;
        Ok(Some(self))
    }
}

/// Parks in `receive()` after the first message and reports when the
/// interruption wakes it.
struct Waiter {
    report_to: ActorId,
}

#[async_trait]
impl Behavior for Waiter {
    async fn apply(
        self: Box<Self>,
        ctx: &mut Context<'_>,
        _message: Message,
    ) -> Result<Next, Fault> {
        loop {
            match ctx.receive().await {
                Ok(_ignored) => continue,
                Err(interrupted) => {
                    ctx.send(self.report_to, String::from("cleanup"));
                    return Err(interrupted.into());
                }
            }
        }
    }
}

struct Bomb;

#[async_trait]
impl Behavior for Bomb {
    async fn apply(
        self: Box<Self>,
        _ctx: &mut Context<'_>,
        _message: Message,
    ) -> Result<Next, Fault> {
        panic!("kaboom");
    }
}

#[derive(Debug, thiserror::Error)]
#[error("worker exploded")]
struct Exploded;

struct Faulty;

#[async_trait]
impl Behavior for Faulty {
    async fn apply(
        self: Box<Self>,
        _ctx: &mut Context<'_>,
        _message: Message,
    ) -> Result<Next, Fault> {
        Err(Exploded.into())
    }
}

// --- Tests ---

#[tokio::test(flavor = "multi_thread")]
async fn echo_once_replies_exits_cleanly_and_goes_silent() {
    let director = stage();
    let (observer, mut handle) = probe();
    let observer = director.create_actor(observer).unwrap();
    let echo = director.create_actor(EchoOnce).unwrap();
    let watch = director.watch(observer, echo);

    director.send_message(echo, (observer, 7i32));

    assert_eq!(handle.expect::<i32>().await, 7);
    match handle.expect::<Signal>().await {
        Signal::Down { watch: fired, reason } => {
            assert_eq!(fired, watch);
            assert!(reason.is_none(), "clean exit carries no reason");
        }
        other => panic!("unexpected envelope {other:?}"),
    }

    // The echo actor is gone: further sends vanish without a trace.
    director.send_message(echo, (observer, 8i32));
    handle.expect_idle(Duration::from_millis(200)).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn become_transition_carries_state_forward() {
    let director = stage();
    let (observer, mut handle) = probe();
    let report_to = director.create_actor(observer).unwrap();
    let counter = director
        .create_actor(Counter {
            count: 0,
            report_to,
        })
        .unwrap();

    for _ in 0..3 {
        director.send_message(counter, ());
    }
    for expected in 0u32..3 {
        assert_eq!(handle.expect::<u32>().await, expected);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn messages_from_one_sender_arrive_in_order() {
    let director = stage();
    let (observer, mut handle) = probe();
    let receiver = director.create_actor(observer).unwrap();

    for n in 0u32..50 {
        director.send_message(receiver, n);
    }
    for n in 0u32..50 {
        assert_eq!(handle.expect::<u32>().await, n);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn overflow_kills_the_receiver_with_mailbox_blocked() {
    let director = stage();
    let (observer, mut handle) = probe();
    let observer = director.create_actor(observer).unwrap();
    let slow = director
        .create_actor_with(Sleeper, ActorOptions::new().mailbox_capacity(1))
        .unwrap();
    director.watch(observer, slow);

    director.send_message(slow, ());
    // Give the step time to pick the first message up and park in the
    // behavior, so the queue is empty again.
    sleep(Duration::from_millis(50)).await;
    director.send_message(slow, ()); // fills the single slot
    director.send_message(slow, ()); // overflows

    match handle.expect::<Signal>().await {
        Signal::Down { reason, .. } => {
            let reason = reason.expect("overflow death carries a reason");
            assert!(
                matches!(&*reason, ExitReason::MailboxBlocked),
                "unexpected reason {reason:?}"
            );
        }
        other => panic!("unexpected envelope {other:?}"),
    }

    // Dead actors swallow sends without complaint.
    director.send_message(slow, ());
    handle.expect_idle(Duration::from_millis(200)).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn blocked_receive_wakes_when_killed() {
    let director = stage();
    let (observer, mut handle) = probe();
    let report_to = director.create_actor(observer).unwrap();
    let waiter = director.create_actor(Waiter { report_to }).unwrap();

    // First message drives the behavior into its receive() loop.
    director.send_message(waiter, ());
    sleep(Duration::from_millis(50)).await;

    director.kill(waiter, ExitReason::killed("stop"));

    assert_eq!(handle.expect::<String>().await, "cleanup");
}

#[tokio::test(flavor = "multi_thread")]
async fn a_panicking_behavior_dies_with_the_panic_as_reason() {
    let director = stage();
    let (observer, mut handle) = probe();
    let observer = director.create_actor(observer).unwrap();
    let bomb = director.create_actor(Bomb).unwrap();
    director.watch(observer, bomb);

    director.send_message(bomb, ());

    match handle.expect::<Signal>().await {
        Signal::Down { reason, .. } => {
            let reason = reason.expect("a panic is not a clean exit");
            match &*reason {
                ExitReason::Panicked(message) => assert!(message.contains("kaboom")),
                other => panic!("unexpected reason {other:?}"),
            }
        }
        other => panic!("unexpected envelope {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn a_faulting_behavior_dies_with_the_error_as_reason() {
    let director = stage();
    let (observer, mut handle) = probe();
    let observer = director.create_actor(observer).unwrap();
    let faulty = director.create_actor(Faulty).unwrap();
    director.watch(observer, faulty);

    director.send_message(faulty, ());

    match handle.expect::<Signal>().await {
        Signal::Down { reason, .. } => {
            let reason = reason.expect("a fault is not a clean exit");
            match &*reason {
                ExitReason::Fault(error) => {
                    assert_eq!(error.to_string(), "worker exploded");
                }
                other => panic!("unexpected reason {other:?}"),
            }
        }
        other => panic!("unexpected envelope {other:?}"),
    }
}
