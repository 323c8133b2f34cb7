// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context values and the handle the registry stores.
//!
//! This module provides the types application code passes around:
//!
//! - [`ContextValue`]: the contract a cancellable, request-scoped value fulfils
//!   (deadline, cancellation signal, error cause, key/value lookup)
//! - [`Background`]: the root value created by [`initialize`](crate::initialize)
//! - [`Context`]: a cheap, identity-compared handle to a value
//! - [`ApplyContext`]: a [`Future`] wrapper that keeps a context active while
//!   the future is polled
//!
//! # Bringing your own value
//!
//! Cancellation, deadlines and key/value composition are not implemented here.
//! Wrap whatever cancellable value your application already uses:
//!
//! ```rust
//! use ambient_context::{Context, ContextError, ContextValue};
//! use std::any::Any;
//! use std::time::{Duration, Instant};
//!
//! #[derive(Debug)]
//! struct Deadline(Instant);
//!
//! impl ContextValue for Deadline {
//!     fn deadline(&self) -> Option<Instant> {
//!         Some(self.0)
//!     }
//!     fn wait_done(&self, timeout: Duration) -> bool {
//!         let now = Instant::now();
//!         std::thread::sleep(self.0.saturating_duration_since(now).min(timeout));
//!         Instant::now() >= self.0
//!     }
//!     fn err(&self) -> Option<ContextError> {
//!         (Instant::now() >= self.0).then_some(ContextError::DeadlineExceeded)
//!     }
//!     fn value(&self, _key: &str) -> Option<&(dyn Any + Send + Sync)> {
//!         None
//!     }
//! }
//!
//! let ctx = Context::new(Deadline(Instant::now() + Duration::from_millis(10)));
//! assert!(ctx.wait_done(Duration::from_secs(1)));
//! assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
//! ```

mod apply_context;
mod context_impl;

#[cfg(test)]
mod tests;

// Re-export public types
pub use apply_context::{ApplyContext, apply};
pub use context_impl::{Background, Context, ContextValue};
