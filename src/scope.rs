// SPDX-License-Identifier: MIT OR Apache-2.0

//! Push/pop discipline over the registry.

use crate::context::Context;
use crate::fault::{self, Fault};
use crate::identity::{self, UnitId};
use crate::registry::registry;

/// Where a push landed: the unit it was made for and the depth right after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScopeToken {
    unit: UnitId,
    depth: usize,
}

impl ScopeToken {
    fn push(ctx: Context) -> ScopeToken {
        let unit = identity::identity();
        let depth = registry().push(unit, ctx);
        ScopeToken { unit, depth }
    }

    fn release(self) -> Result<(), Fault> {
        registry().pop(self.unit, self.depth)
    }
}

/// The capability to end a scope opened by [`set`](crate::set).
///
/// Must be invoked exactly once, after every scope opened later on the same
/// unit has been released.  `Release` is `Copy`, so invoking it a second
/// time compiles; it faults with [`Fault::DoubleRelease`] at runtime.
///
/// ```rust
/// let root = ambient_context::initialize();
/// let release = ambient_context::set(ambient_context::Context::background());
/// assert_ne!(ambient_context::current(), root);
/// release.release();
/// assert_eq!(ambient_context::current(), root);
/// ```
#[must_use = "a scope that is never released leaks its context"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Release(ScopeToken);

impl Release {
    /// Ends the scope.
    ///
    /// # Panics
    ///
    /// With [`Fault::DoubleRelease`] if this scope was already released, or
    /// [`Fault::UnreleasedScope`] if a scope opened after it is still open.
    #[track_caller]
    pub fn release(self) {
        if let Err(f) = self.try_release() {
            fault::raise(f)
        }
    }

    /// Ends the scope, handing back the fault instead of panicking.
    ///
    /// The registry is left unchanged when this returns an error.
    pub fn try_release(self) -> Result<(), Fault> {
        self.0.release()
    }

    /// The unit this scope belongs to.
    pub fn unit(&self) -> UnitId {
        self.0.unit
    }

    /// Stack depth right after the push that opened this scope.
    pub fn depth(&self) -> usize {
        self.0.depth
    }
}

pub(crate) fn set(ctx: Context) -> Release {
    Release(ScopeToken::push(ctx))
}

/// Releases on drop, including while unwinding.
struct ScopeGuard(ScopeToken);

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if let Err(f) = self.0.release() {
            if std::thread::panicking() {
                // a second panic here would abort the process
                logwise::error_sync!(
                    "ambient_context fault during unwind: {fault}",
                    fault = f.kind()
                );
            } else {
                fault::raise(f)
            }
        }
    }
}

pub(crate) fn scoped<R>(ctx: Context, f: impl FnOnce() -> R) -> R {
    let _guard = ScopeGuard(ScopeToken::push(ctx));
    f()
}

/// Pushes `ctx` for the calling unit and pops it when dropped.  The spawner
/// holds one for the whole life of a unit it created.
///
/// If the unit leaves a scope of its own open, the seed can't be popped: the
/// entry is left behind and a warning is logged instead of a panic.
pub(crate) struct Seeded(ScopeToken);

impl Seeded {
    pub(crate) fn new(ctx: Context) -> Seeded {
        Seeded(ScopeToken::push(ctx))
    }
}

impl Drop for Seeded {
    fn drop(&mut self) {
        if let Err(f) = self.0.release() {
            let (unit, depth) = (self.0.unit.as_u64(), self.0.depth as u64);
            logwise::warn_sync!(
                "unit {unit} finished with scopes open above its seed at depth {depth}: {fault}",
                unit = unit,
                depth = depth,
                fault = f.kind()
            );
        }
    }
}
