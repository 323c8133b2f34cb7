// SPDX-License-Identifier: MIT OR Apache-2.0

//! Creating units that start out with a context.

use crate::context::Context;
use crate::scope::Seeded;
use crate::sys::thread;

/// Spawns a unit whose registry entry is seeded with `ctx` before `f` runs.
///
/// The seed is pushed under the new unit's identity, not the caller's, and is
/// popped (erasing the entry) when `f` returns or panics.
pub(crate) fn spawn_with<F, T>(ctx: Context, f: F) -> thread::JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::spawn(move || {
        let _seed = Seeded::new(ctx);
        f()
    })
}

/// Spawns a unit seeded with the caller's current context.
///
/// The context is read here, on the calling unit, before the new one is
/// scheduled.
#[track_caller]
pub(crate) fn spawn<F, T>(f: F) -> thread::JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let snapshot = crate::current();
    spawn_with(snapshot, f)
}
