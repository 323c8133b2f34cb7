//SPDX-License-Identifier: MIT OR Apache-2.0
/*!
# ambient_context

ambient_context propagates a cancellable, request-scoped context to the code
running on a thread without threading it through every function signature.

# The problem

A request handler derives a context with a deadline, then calls into a dozen
layers of library code, some of which spawn helpers.  Every one of those
functions needs a `ctx` parameter just to pass the value along, and forgetting
it once silently drops the deadline for everything underneath.

# The model

Each execution unit (a thread) owns a stack of contexts in a process-wide
registry.  The top of the stack is the unit's *current* context.

| Function         | Effect                                                               |
|------------------|----------------------------------------------------------------------|
| [`initialize`]   | pushes a fresh root ([`Background`]) for the calling unit            |
| [`current`]      | returns the top of the calling unit's stack                          |
| [`set`]          | pushes a context, returns a [`Release`] that must be invoked once    |
| [`scoped`]       | pushes a context for the duration of a closure                       |
| [`spawn`]        | spawns a thread seeded with a snapshot of the caller's context       |
| [`spawn_with`]   | spawns a thread seeded with an explicit context                      |

Scopes are strictly last-in-first-out.  Releasing a scope twice, or releasing
an outer scope while an inner one is still open, is a programmer error: it is
logged and then panics with a [`Fault`].  So does asking for the current
context on a thread that was never initialized or spawned through this crate.

```rust
use ambient_context::Context;

let root = ambient_context::initialize();

let request = Context::background();
let release = ambient_context::set(request.clone());

let handle = ambient_context::spawn(|| ambient_context::current());
assert_eq!(handle.join().unwrap(), request);

release.release();
assert_eq!(ambient_context::current(), root);
```

# The context value

Cancellation, deadlines and key/value data belong to the value, not to this
crate.  Implement [`ContextValue`] for whatever your application uses; this
crate only stores and hands out [`Context`] handles to it.

Deriving a child context is therefore `set(derive(current()))`: build the
child from the current value with your own type, push it, release it when the
narrower scope ends.

```rust
use ambient_context::{Context, ContextError, ContextValue, Duration, Instant};
use std::any::Any;

#[derive(Debug)]
struct WithTimeout {
    parent: Context,
    deadline: Instant,
}

impl ContextValue for WithTimeout {
    fn deadline(&self) -> Option<Instant> {
        Some(self.parent.deadline().map_or(self.deadline, |d| d.min(self.deadline)))
    }
    fn wait_done(&self, timeout: Duration) -> bool {
        self.parent.wait_done(timeout)
    }
    fn err(&self) -> Option<ContextError> {
        self.parent.err()
    }
    fn value(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.parent.as_value().value(key)
    }
}

fn with_timeout(parent: Context, after: Duration) -> Context {
    let deadline = Instant::now() + after;
    Context::new(WithTimeout { parent, deadline })
}

ambient_context::initialize();
let release = ambient_context::set(with_timeout(ambient_context::current(), Duration::from_secs(5)));
assert!(ambient_context::deadline().is_some());
release.release();
assert!(ambient_context::deadline().is_none());
```

# Async

A future may be polled on any executor thread.  Wrap it in [`ApplyContext`]
(or call [`apply`]) and [`current`] will return the wrapped context inside it.

# Leaks

A thread that exits with scopes still open leaves its registry entry behind
until the process exits.  Threads created with [`spawn`]/[`spawn_with`] clean
up their own seed; everything pushed with [`set`] or [`initialize`] is the
caller's to release.
*/

mod fault;
mod identity;
mod registry;
mod scope;
mod spawn;
mod spinlock;
mod sys;

pub mod context;

logwise::declare_logging_domain!();

pub use context::{ApplyContext, Background, Context, ContextValue, apply};
pub use fault::{ContextError, Fault};
pub use identity::{UnitId, identity, parse_unit_id, try_identity};
pub use scope::Release;
pub use sys::{Duration, Instant};

/// Pushes a fresh root context for the calling unit and returns it.
///
/// Call once at each top-level entry point (`main`, a thread you did not
/// spawn through this crate) before anything else here.  The root has no
/// deadline, is never cancelled and has no keys.
///
/// The push is never released; it lives as long as the thread.
pub fn initialize() -> Context {
    let root = Context::background();
    registry::registry().push(identity::identity(), root.clone());
    root
}

/// The calling unit's current context.
///
/// # Panics
///
/// With [`Fault::UnregisteredUnit`] if the calling unit never called
/// [`initialize`] and was not spawned through this crate.
#[track_caller]
pub fn current() -> Context {
    try_current().unwrap_or_else(|f| fault::raise(f))
}

/// Like [`current`], but hands back the fault instead of panicking.
pub fn try_current() -> Result<Context, Fault> {
    registry::registry().peek(try_identity()?)
}

/// Makes `ctx` the current context until the returned [`Release`] is invoked.
///
/// Scopes nest: release them inner-to-outer.
///
/// ```rust
/// use ambient_context::Context;
///
/// let root = ambient_context::initialize();
/// let (a, b) = (Context::background(), Context::background());
///
/// let release_a = ambient_context::set(a.clone());
/// let release_b = ambient_context::set(b.clone());
/// assert_eq!(ambient_context::current(), b);
/// release_b.release();
/// assert_eq!(ambient_context::current(), a);
/// release_a.release();
/// assert_eq!(ambient_context::current(), root);
/// ```
pub fn set(ctx: Context) -> Release {
    scope::set(ctx)
}

/// Runs `f` with `ctx` as the current context.
///
/// The scope ends when `f` returns or panics.
///
/// ```rust
/// use ambient_context::Context;
///
/// let root = ambient_context::initialize();
/// let inner = Context::background();
/// let seen = ambient_context::scoped(inner.clone(), ambient_context::current);
/// assert_eq!(seen, inner);
/// assert_eq!(ambient_context::current(), root);
/// ```
pub fn scoped<R>(ctx: Context, f: impl FnOnce() -> R) -> R {
    scope::scoped(ctx, f)
}

/// Spawns a thread that starts with the caller's current context.
///
/// The context is captured before this returns, so releasing or replacing it
/// afterwards does not affect the new thread.
///
/// # Panics
///
/// With [`Fault::UnregisteredUnit`] if the caller has no context.
#[track_caller]
pub fn spawn<F, T>(f: F) -> sys::thread::JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    spawn::spawn(f)
}

/// Spawns a thread that starts with `ctx` as its current context.
///
/// The thread's registry entry is removed when `f` returns or panics.
pub fn spawn_with<F, T>(ctx: Context, f: F) -> sys::thread::JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    spawn::spawn_with(ctx, f)
}

/// Deadline of the current context.
#[track_caller]
pub fn deadline() -> Option<Instant> {
    current().deadline()
}

/// Error cause of the current context, once it is done.
#[track_caller]
pub fn err() -> Option<ContextError> {
    current().err()
}

/// Looks up `key` in the current context.
#[track_caller]
pub fn value<T: std::any::Any + Clone>(key: &str) -> Option<T> {
    current().value(key)
}

/// Blocks until the current context is cancelled or `timeout` elapses.
#[track_caller]
pub fn wait_done(timeout: Duration) -> bool {
    current().wait_done(timeout)
}

/// Stack depth of the calling unit; 0 if it has no context.
pub fn depth() -> usize {
    registry::registry().depth(identity::identity())
}

/// Number of units that currently have a context.
///
/// Useful for spotting threads that exited with scopes still open.
pub fn registered_units() -> usize {
    registry::registry().units()
}
