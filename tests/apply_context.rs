// SPDX-License-Identifier: MIT OR Apache-2.0

//! Futures carry their context into whichever unit polls them.

use ambient_context::{ApplyContext, Context};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use test_executors::async_test;

/// Returns `Pending` once before completing, so the wrapper is polled twice.
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

#[async_test]
async fn wrapped_future_sees_its_context() {
    let ctx = Context::background();
    let depth_before = ambient_context::depth();

    let seen = ApplyContext::new(ctx.clone(), async {
        let first = ambient_context::current();
        YieldOnce(false).await;
        let second = ambient_context::current();
        (first, second)
    })
    .await;

    assert_eq!(seen.0, ctx);
    assert_eq!(seen.1, ctx);
    // nothing is left pushed on the polling thread between or after polls
    assert_eq!(ambient_context::depth(), depth_before);
}

#[async_test]
async fn scopes_inside_a_poll_nest_under_the_wrapper() {
    let outer = Context::background();
    let inner = Context::background();
    let expected = (inner.clone(), outer.clone());

    let seen = ApplyContext::new(outer, async move {
        let during = ambient_context::scoped(inner, ambient_context::current);
        (during, ambient_context::current())
    })
    .await;

    assert_eq!(seen, expected);
}

#[async_test]
async fn spawn_inside_wrapped_future_inherits() {
    let ctx = Context::background();
    let seen = ApplyContext::new(ctx.clone(), async {
        ambient_context::spawn(ambient_context::current)
            .join()
            .unwrap()
    })
    .await;
    assert_eq!(seen, ctx);
}

#[test]
fn apply_captures_at_call_site() {
    std::thread::spawn(|| {
        let root = ambient_context::initialize();
        let scoped = Context::background();
        let release = ambient_context::set(scoped.clone());
        let fut = ambient_context::apply(async { ambient_context::current() });
        release.release();

        assert_eq!(fut.context(), &scoped);
        let seen = test_executors::spin_on(fut);
        assert_eq!(seen, scoped);
        assert_eq!(ambient_context::current(), root);
    })
    .join()
    .unwrap();
}

#[test]
fn wrapped_future_polled_on_another_unit() {
    let ctx = Context::background();
    let fut = ApplyContext::new(ctx.clone(), async { ambient_context::current() });
    // this thread was never initialized; only the wrapper gives it a context
    let seen = std::thread::spawn(move || test_executors::spin_on(fut))
        .join()
        .unwrap();
    assert_eq!(seen, ctx);
}
