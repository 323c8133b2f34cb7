// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity of the currently executing unit.
//!
//! `std::thread::ThreadId` is opaque; its only stable integer exposure is the
//! `Debug` text (`ThreadId(<n>)`).  We format that into a fixed-size scratch
//! buffer on the stack and parse the number back out, so resolving an
//! identity neither allocates nor takes a lock.  [`parse_unit_id`] is the
//! single place that knows the text format.

use crate::fault::{self, Fault};
use std::fmt::{Display, Write};

/// Bytes in one scratch buffer.  `ThreadId(18446744073709551615)` is 30.
pub(crate) const SCRATCH_LEN: usize = 64;

const PREFIX: &str = "ThreadId(";

/// Identifier of an execution unit.
///
/// Unique among live units and never reused within a process (thread ids are
/// allocated from a monotonic counter).  Not meaningful across processes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(pub(crate) u64);

impl UnitId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Scratch {
    bytes: [u8; SCRATCH_LEN],
    len: usize,
}

impl Scratch {
    fn new() -> Scratch {
        Scratch {
            bytes: [0; SCRATCH_LEN],
            len: 0,
        }
    }

    fn as_str(&self) -> &str {
        // write_str only ever copies whole &str values in
        std::str::from_utf8(&self.bytes[..self.len]).unwrap_or("")
    }
}

impl Write for Scratch {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        let end = self.len + s.len();
        if end > SCRATCH_LEN {
            return Err(std::fmt::Error);
        }
        self.bytes[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

/// Parses the `Debug` text of a `ThreadId`.
pub fn parse_unit_id(text: &str) -> Result<UnitId, Fault> {
    text.strip_prefix(PREFIX)
        .and_then(|rest| rest.strip_suffix(')'))
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok())
        .map(UnitId)
        .ok_or_else(|| Fault::IdentityFormat {
            text: text.to_string(),
        })
}

/// Like [`identity`], but hands back a format fault instead of panicking.
pub fn try_identity() -> Result<UnitId, Fault> {
    let mut scratch = Scratch::new();
    match write!(scratch, "{:?}", std::thread::current().id()) {
        Ok(()) => parse_unit_id(scratch.as_str()),
        Err(_) => Err(Fault::IdentityFormat {
            text: format!("{:?}", std::thread::current().id()),
        }),
    }
}

/// Returns the identity of the calling unit.
///
/// # Panics
///
/// With [`Fault::IdentityFormat`] if the runtime's diagnostic text no longer
/// matches the expected shape.
#[track_caller]
pub fn identity() -> UnitId {
    try_identity().unwrap_or_else(|f| fault::raise(f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::*;

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn parses_thread_id_text() {
        assert_eq!(parse_unit_id("ThreadId(1)"), Ok(UnitId(1)));
        assert_eq!(parse_unit_id("ThreadId(9876543210)"), Ok(UnitId(9876543210)));
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn rejects_unexpected_text() {
        for text in [
            "",
            "ThreadId()",
            "ThreadId(12",
            "ThreadId(-3)",
            "ThreadId(1 2)",
            "goroutine 7 [running]:",
            "ThreadId(99999999999999999999999)",
        ] {
            match parse_unit_id(text) {
                Err(Fault::IdentityFormat { text: t }) => assert_eq!(t, text),
                other => panic!("{text:?} parsed as {other:?}"),
            }
        }
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn stable_within_a_unit() {
        assert_eq!(identity(), identity());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn distinct_across_units() {
        let here = identity();
        let handles: Vec<_> = (0..8).map(|_| std::thread::spawn(identity)).collect();
        let mut ids: Vec<UnitId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.push(here);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 9);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn concurrent_resolution_agrees_with_each_unit() {
        use std::sync::{Arc, Barrier};

        // many units resolving at once each get their own id, every time
        let gate = Arc::new(Barrier::new(16));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let gate = gate.clone();
                std::thread::spawn(move || {
                    let first = identity();
                    gate.wait();
                    for _ in 0..1000 {
                        assert_eq!(identity(), first);
                    }
                    first
                })
            })
            .collect();
        let mut ids: Vec<UnitId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 16);
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
    fn scratch_rejects_overflow() {
        let mut scratch = Scratch::new();
        let long = "x".repeat(SCRATCH_LEN + 1);
        assert!(scratch.write_str(&long).is_err());
        assert!(scratch.write_str("ThreadId(3)").is_ok());
        assert_eq!(scratch.as_str(), "ThreadId(3)");
    }
}
