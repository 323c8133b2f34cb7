// SPDX-License-Identifier: MIT OR Apache-2.0

//! Async context preservation.

use std::future::Future;
use std::pin::Pin;
use std::task::Poll;

use super::context_impl::Context;

/// A [`Future`] wrapper that carries a context across executor boundaries.
///
/// An executor may poll a future on any of its threads, and those threads have
/// no registry entry of their own (or have an unrelated one).  `ApplyContext`
/// opens a scope with its context around every poll, so [`current`](crate::current)
/// inside the future always returns the wrapped context, whichever unit polls it.
///
/// # Examples
///
/// ```rust
/// use ambient_context::{ApplyContext, Context};
///
/// # async fn example() {
/// let ctx = Context::background();
/// let expected = ctx.clone();
///
/// let seen = ApplyContext::new(ctx, async { ambient_context::current() }).await;
/// assert_eq!(seen, expected);
/// # }
/// ```
///
/// # Implementation Details
///
/// `ApplyContext` implements [`Future`] by:
/// 1. Pushing its context for the polling unit
/// 2. Polling the inner future
/// 3. Releasing the push, even if the poll panics
///
/// The inner future must release any scope it opens before it yields; a scope
/// left open across an `.await` is reported as an unreleased scope when the
/// poll ends.
pub struct ApplyContext<F>(Context, F);

impl<F> ApplyContext<F> {
    /// Wraps `f` so that it runs under `context`.
    pub fn new(context: Context, f: F) -> Self {
        Self(context, f)
    }

    /// The context every poll runs under.
    pub fn context(&self) -> &Context {
        &self.0
    }
}

impl<F> Future for ApplyContext<F>
where
    F: Future,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Self::Output> {
        // SAFETY: the inner future is never moved out of `self`; the context is
        // only cloned
        let (context, fut) = unsafe {
            let d = self.get_unchecked_mut();
            (d.0.clone(), Pin::new_unchecked(&mut d.1))
        };
        crate::scope::scoped(context, || fut.poll(cx))
    }
}

/// Wraps `f` so that it runs under the caller's current context.
///
/// The context is captured now, not when the future is first polled.
///
/// # Panics
///
/// With [`Fault::UnregisteredUnit`](crate::Fault::UnregisteredUnit) if the
/// caller has no context.
#[track_caller]
pub fn apply<F: Future>(f: F) -> ApplyContext<F> {
    ApplyContext::new(crate::current(), f)
}
