// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform-specific time and thread types.
//!
//! On native platforms these come from `std`; on WASM, `std::time::Instant`
//! panics and `std::thread::spawn` is unavailable, so we use `web_time` and
//! `wasm_thread` instead. Everything else in the crate goes through this module.

#[cfg(not(target_arch = "wasm32"))]
pub use std::time::{Duration, Instant};
#[cfg(target_arch = "wasm32")]
pub use web_time::{Duration, Instant};

#[cfg(not(target_arch = "wasm32"))]
pub(crate) use std::thread;
#[cfg(target_arch = "wasm32")]
pub(crate) use wasm_thread as thread;
