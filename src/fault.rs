// SPDX-License-Identifier: MIT OR Apache-2.0

//! Programmer-misuse faults.
//!
//! Every variant indicates broken call-site discipline rather than a transient
//! condition.  The public entry points log the fault and panic; the `try_`
//! variants hand it back so it can be inspected, but it is never meant to be
//! retried.

use crate::identity::UnitId;
use std::fmt::Display;

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fault {
    /// No context was ever pushed for `unit`: it was neither initialized nor
    /// spawned through this crate.
    UnregisteredUnit { unit: UnitId },
    /// A release found the stack shallower than the depth it was issued at,
    /// i.e. the same scope was released twice.
    DoubleRelease {
        unit: UnitId,
        expected: usize,
        actual: usize,
    },
    /// A release found the stack deeper than the depth it was issued at: a
    /// scope pushed later is still open.
    UnreleasedScope {
        unit: UnitId,
        expected: usize,
        actual: usize,
    },
    /// The thread diagnostic text did not contain a parseable identifier.
    IdentityFormat { text: String },
}

impl Fault {
    /// Short, stable name of the fault kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Fault::UnregisteredUnit { .. } => "UnregisteredUnit",
            Fault::DoubleRelease { .. } => "DoubleRelease",
            Fault::UnreleasedScope { .. } => "UnreleasedScope",
            Fault::IdentityFormat { .. } => "IdentityFormat",
        }
    }
}

impl Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fault::UnregisteredUnit { unit } => write!(
                f,
                "UnregisteredUnit: unit {unit} has no context; it was not initialized or spawned through ambient_context"
            ),
            Fault::DoubleRelease {
                unit,
                expected,
                actual,
            } => write!(
                f,
                "DoubleRelease: unit {unit} released scope at depth {expected} but the stack is at depth {actual}"
            ),
            Fault::UnreleasedScope {
                unit,
                expected,
                actual,
            } => write!(
                f,
                "UnreleasedScope: unit {unit} released scope at depth {expected} while depth {actual} is still open"
            ),
            Fault::IdentityFormat { text } => {
                write!(f, "IdentityFormat: cannot parse unit id from {text:?}")
            }
        }
    }
}

impl std::error::Error for Fault {}

/// Logs `fault` at error level, then panics with it.
#[track_caller]
pub(crate) fn raise(fault: Fault) -> ! {
    logwise::error_sync!("ambient_context fault: {fault}", fault = fault.kind());
    panic!("{fault}")
}

/// Why a context value is done, as reported by [`ContextValue::err`](crate::ContextValue::err).
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextError {
    Canceled,
    DeadlineExceeded,
}

impl Display for ContextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextError::Canceled => write!(f, "context canceled"),
            ContextError::DeadlineExceeded => write!(f, "context deadline exceeded"),
        }
    }
}

impl std::error::Error for ContextError {}
