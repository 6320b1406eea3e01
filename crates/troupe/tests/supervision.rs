//! Supervision graph behavior: watches fire exactly once, links cascade or
//! trap, removal prevents notification, and edge cases around dead peers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use troupe::probe::probe;
use troupe::{
    ActorId, ActorOptions, Behavior, Context, Director, ExitReason, Fault, Message, Next,
    PoolScheduler, Signal, WatchId,
};

fn stage() -> Director {
    let director = Director::new();
    director
        .register_scheduler("pool", Arc::new(PoolScheduler::current()))
        .unwrap();
    director
}

fn killed_str(reason: &ExitReason) -> &str {
    match reason {
        ExitReason::Killed(value) => value
            .downcast_ref::<&str>()
            .copied()
            .expect("kill reason is a &str in these tests"),
        other => panic!("expected a kill reason, got {other:?}"),
    }
}

// --- Test Behaviors ---

/// Accepts messages forever and does nothing with them.
struct Idle;

#[async_trait]
impl Behavior for Idle {
    async fn apply(
        self: Box<Self>,
        _ctx: &mut Context<'_>,
        _message: Message,
    ) -> Result<Next, Fault> {
        Ok(Some(self))
    }
}

/// On its first message (a peer id), starts trapping exits and links to the
/// peer, then forwards everything it receives.
struct Arm {
    report_to: ActorId,
}

#[async_trait]
impl Behavior for Arm {
    async fn apply(
        self: Box<Self>,
        ctx: &mut Context<'_>,
        message: Message,
    ) -> Result<Next, Fault> {
        let peer = *message.downcast::<ActorId>().unwrap();
        ctx.trap_exit(true);
        ctx.link(peer);
        Ok(Some(Box::new(Forward {
            report_to: self.report_to,
        })))
    }
}

/// Forwards every message, envelopes included, to `report_to`.
struct Forward {
    report_to: ActorId,
}

#[async_trait]
impl Behavior for Forward {
    async fn apply(
        self: Box<Self>,
        ctx: &mut Context<'_>,
        message: Message,
    ) -> Result<Next, Fault> {
        ctx.send_boxed(self.report_to, message);
        Ok(Some(self))
    }
}

// --- Tests ---

#[tokio::test(flavor = "multi_thread")]
async fn each_watch_registration_fires_exactly_once() {
    let director = stage();
    let (observer, mut handle) = probe();
    let observer = director.create_actor(observer).unwrap();
    let target = director.create_actor(Idle).unwrap();

    let first = director.watch(observer, target);
    let second = director.watch(observer, target);
    assert_ne!(first, second, "watches on the same pair stay distinct");

    director.kill(target, ExitReason::killed("boom"));

    let mut fired: Vec<WatchId> = Vec::new();
    for _ in 0..2 {
        match handle.expect::<Signal>().await {
            Signal::Down { watch, reason } => {
                assert_eq!(killed_str(&reason.unwrap()), "boom");
                fired.push(watch);
            }
            other => panic!("unexpected envelope {other:?}"),
        }
    }
    assert_eq!(fired.len(), 2);
    assert!(fired.contains(&first));
    assert!(fired.contains(&second));

    handle.expect_idle(Duration::from_millis(200)).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn watching_a_nonexistent_actor_fires_immediately() {
    let director = stage();
    let (observer, mut handle) = probe();
    let observer = director.create_actor(observer).unwrap();

    let watch = director.watch(observer, ActorId::random());

    match handle.expect::<Signal>().await {
        Signal::Down { watch: fired, reason } => {
            assert_eq!(fired, watch);
            assert!(reason.is_none());
        }
        other => panic!("unexpected envelope {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn a_removed_watch_never_fires() {
    let director = stage();
    let (observer, mut handle) = probe();
    let observer = director.create_actor(observer).unwrap();
    let target = director.create_actor(Idle).unwrap();

    let watch = director.watch(observer, target);
    director.unwatch(target, watch);
    director.unwatch(target, watch); // idempotent

    director.kill(target, ExitReason::killed("boom"));
    handle.expect_idle(Duration::from_millis(200)).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn link_death_cascades_to_the_peer() {
    let director = stage();
    let (observer, mut handle) = probe();
    let observer = director.create_actor(observer).unwrap();
    let a = director.create_actor(Idle).unwrap();
    let b = director.create_actor(Idle).unwrap();
    let watch_a = director.watch(observer, a);
    let watch_b = director.watch(observer, b);

    director.link(a, b);
    director.kill(a, ExitReason::killed("r"));

    for _ in 0..2 {
        match handle.expect::<Signal>().await {
            Signal::Down { watch, reason } if watch == watch_a => {
                assert_eq!(killed_str(&reason.unwrap()), "r");
            }
            Signal::Down { watch, reason } if watch == watch_b => match &*reason.unwrap() {
                ExitReason::LinkDown { peer, cause } => {
                    assert_eq!(*peer, a);
                    assert_eq!(killed_str(cause.as_ref().unwrap()), "r");
                }
                other => panic!("expected a link-down reason, got {other:?}"),
            },
            other => panic!("unexpected envelope {other:?}"),
        }
    }

    // Both are gone: sends to either disappear.
    director.send_message(a, ());
    director.send_message(b, ());
    handle.expect_idle(Duration::from_millis(200)).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn a_trapping_peer_receives_the_exit_and_survives() {
    let director = stage();
    let (survivor, mut handle) = probe();
    let survivor = director
        .create_actor_with(survivor, ActorOptions::new().trap_exit(true))
        .unwrap();
    let doomed = director.create_actor(Idle).unwrap();

    director.link(doomed, survivor);
    director.kill(doomed, ExitReason::killed("r"));

    match handle.expect::<Signal>().await {
        Signal::Exit { peer, reason } => {
            assert_eq!(peer, doomed);
            assert_eq!(killed_str(&reason.unwrap()), "r");
        }
        other => panic!("unexpected envelope {other:?}"),
    }

    // Still alive and receiving.
    director.send_message(survivor, 42u32);
    assert_eq!(handle.expect::<u32>().await, 42);
}

#[tokio::test(flavor = "multi_thread")]
async fn unlink_prevents_the_cascade() {
    let director = stage();
    let (observer, mut handle) = probe();
    let observer = director.create_actor(observer).unwrap();
    let a = director.create_actor(Idle).unwrap();
    let b = director.create_actor(Idle).unwrap();
    director.watch(observer, a);

    director.link(a, b);
    director.unlink(a, b);
    director.kill(a, ExitReason::killed("r"));

    // Exactly one down, for a itself; b is untouched.
    match handle.expect::<Signal>().await {
        Signal::Down { reason, .. } => assert_eq!(killed_str(&reason.unwrap()), "r"),
        other => panic!("unexpected envelope {other:?}"),
    }
    handle.expect_idle(Duration::from_millis(200)).await;

    // b still answers.
    let watch_b = director.watch(observer, b);
    director.kill(b, None);
    match handle.expect::<Signal>().await {
        Signal::Down { watch, reason } => {
            assert_eq!(watch, watch_b);
            assert!(reason.is_none());
        }
        other => panic!("unexpected envelope {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn a_behavior_can_trap_and_link_through_its_context() {
    let director = stage();
    let (observer, mut handle) = probe();
    let report_to = director.create_actor(observer).unwrap();
    let doomed = director.create_actor(Idle).unwrap();
    let trapper = director.create_actor(Arm { report_to }).unwrap();

    director.send_message(trapper, doomed);
    // Let the arming step run before the kill races it.
    tokio::time::sleep(Duration::from_millis(50)).await;

    director.kill(doomed, ExitReason::killed("peer gone"));

    match handle.expect::<Signal>().await {
        Signal::Exit { peer, reason } => {
            assert_eq!(peer, doomed);
            assert_eq!(killed_str(&reason.unwrap()), "peer gone");
        }
        other => panic!("unexpected envelope {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn linking_to_a_dead_peer_kills_the_survivor() {
    let director = stage();
    let (observer, mut handle) = probe();
    let observer = director.create_actor(observer).unwrap();
    let lonely = director.create_actor(Idle).unwrap();
    director.watch(observer, lonely);

    let never_existed = ActorId::random();
    director.link(lonely, never_existed);

    match handle.expect::<Signal>().await {
        Signal::Down { reason, .. } => match &*reason.unwrap() {
            ExitReason::LinkDown { peer, cause } => {
                assert_eq!(*peer, never_existed);
                assert!(cause.is_none());
            }
            other => panic!("expected a link-down reason, got {other:?}"),
        },
        other => panic!("unexpected envelope {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn linking_a_trapping_survivor_to_a_dead_peer_delivers_an_exit() {
    let director = stage();
    let (survivor, mut handle) = probe();
    let survivor = director
        .create_actor_with(survivor, ActorOptions::new().trap_exit(true))
        .unwrap();

    let never_existed = ActorId::random();
    director.link(survivor, never_existed);

    match handle.expect::<Signal>().await {
        Signal::Exit { peer, reason } => {
            assert_eq!(peer, never_existed);
            assert!(reason.is_none());
        }
        other => panic!("unexpected envelope {other:?}"),
    }

    director.send_message(survivor, 7u32);
    assert_eq!(handle.expect::<u32>().await, 7);
}

#[test]
#[should_panic(expected = "two unknown actors")]
fn linking_two_unknown_actors_is_a_runtime_bug() {
    let director = Director::new();
    director.link(ActorId::random(), ActorId::random());
}
