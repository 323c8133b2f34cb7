// SPDX-License-Identifier: MIT OR Apache-2.0
/*!
The process-wide map from unit identity to its stack of contexts.

One reader/writer lock guards the whole map.  `peek` takes the read side;
`push` and `pop` take the write side.  Every critical section is a single
hash lookup plus a `Vec` push/pop, so contention scales with the number of
live units rather than with how often they read.

An entry exists exactly while its stack is non-empty: it is created by the
first push for a unit and removed when the last matching pop drains it.  A
unit that exits with pushes outstanding leaves its entry behind until process
exit.
*/

use crate::context::Context;
use crate::fault::Fault;
use crate::identity::UnitId;
use crate::spinlock::Spinlock;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::OnceLock;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// The registry shared by every facade call in this process.
pub(crate) fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

pub(crate) struct Registry {
    stacks: Spinlock<HashMap<UnitId, Vec<Context>>>,
}

impl Registry {
    pub(crate) fn new() -> Registry {
        Registry {
            stacks: Spinlock::new(HashMap::new()),
        }
    }

    /// Pushes `ctx` on `unit`'s stack, returning the new depth.
    pub(crate) fn push(&self, unit: UnitId, ctx: Context) -> usize {
        let depth = {
            let mut stacks = self.stacks.write();
            let stack = stacks.entry(unit).or_default();
            stack.push(ctx);
            stack.len()
        };
        let (id, logged_depth) = (unit.as_u64(), depth as u64);
        logwise::trace_sync!("push unit {id} depth {depth}", id = id, depth = logged_depth);
        depth
    }

    /// The active (top) context of `unit`.
    pub(crate) fn peek(&self, unit: UnitId) -> Result<Context, Fault> {
        self.stacks
            .read()
            .get(&unit)
            .and_then(|stack| stack.last())
            .cloned()
            .ok_or(Fault::UnregisteredUnit { unit })
    }

    /// Pops `unit`'s top context if the stack is exactly `expected` deep.
    ///
    /// A mismatch leaves the stack untouched.  A stack that is already gone
    /// counts as depth 0, so releasing a drained scope again is a double
    /// release.
    pub(crate) fn pop(&self, unit: UnitId, expected: usize) -> Result<(), Fault> {
        let mut stacks = self.stacks.write();
        let actual = stacks.get(&unit).map_or(0, Vec::len);
        if actual < expected {
            return Err(Fault::DoubleRelease {
                unit,
                expected,
                actual,
            });
        }
        if actual > expected {
            return Err(Fault::UnreleasedScope {
                unit,
                expected,
                actual,
            });
        }
        // the popped context may hold the last reference to a user value, whose
        // drop must run after the lock is released
        let mut popped = None;
        let mut drained = None;
        if let Entry::Occupied(mut entry) = stacks.entry(unit) {
            popped = entry.get_mut().pop();
            if entry.get().is_empty() {
                drained = Some(entry.remove());
            }
        }
        drop(stacks);
        drop(drained);
        drop(popped);
        let (id, logged_depth) = (unit.as_u64(), expected.saturating_sub(1) as u64);
        logwise::trace_sync!("pop unit {id} depth {depth}", id = id, depth = logged_depth);
        Ok(())
    }

    /// Current stack depth of `unit`; 0 when it has no entry.
    pub(crate) fn depth(&self, unit: UnitId) -> usize {
        self.stacks.read().get(&unit).map_or(0, Vec::len)
    }

    /// Number of units with an entry.
    pub(crate) fn units(&self) -> usize {
        self.stacks.read().len()
    }
}
