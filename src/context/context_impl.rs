// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core Context implementation.

use crate::fault::ContextError;
use crate::sys::{Duration, Instant, thread};
use std::any::Any;
use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// The contract a cancellable, request-scoped value fulfils.
///
/// This crate only stores and hands out references to such values; it never
/// constructs or interprets cancellation state.  Deriving children with a
/// narrower deadline, a cancel handle or extra keys is the implementing type's
/// business.
///
/// # Examples
///
/// ```rust
/// use ambient_context::{ContextValue, ContextError};
/// use std::any::Any;
/// use std::time::{Duration, Instant};
///
/// #[derive(Debug)]
/// struct RequestId(u64);
///
/// impl ContextValue for RequestId {
///     fn deadline(&self) -> Option<Instant> { None }
///     fn wait_done(&self, timeout: Duration) -> bool {
///         std::thread::sleep(timeout);
///         false
///     }
///     fn err(&self) -> Option<ContextError> { None }
///     fn value(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
///         (key == "request_id").then_some(&self.0 as &(dyn Any + Send + Sync))
///     }
/// }
/// ```
pub trait ContextValue: Debug + Send + Sync {
    /// When this value will be cancelled on its own, if ever.
    fn deadline(&self) -> Option<Instant>;

    /**
    Blocks until this value is cancelled or `timeout` elapses.

    Returns `true` if the value was cancelled.  Values that can never be
    cancelled simply wait out the timeout and return `false`.
    */
    fn wait_done(&self, timeout: Duration) -> bool;

    /// `None` while live; the cause once done.
    fn err(&self) -> Option<ContextError>;

    /// Looks up request-scoped data.
    fn value(&self, key: &str) -> Option<&(dyn Any + Send + Sync)>;
}

/// The root value: no deadline, never cancelled, no keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Background;

impl ContextValue for Background {
    fn deadline(&self) -> Option<Instant> {
        None
    }

    fn wait_done(&self, timeout: Duration) -> bool {
        thread::sleep(timeout);
        false
    }

    fn err(&self) -> Option<ContextError> {
        None
    }

    fn value(&self, _key: &str) -> Option<&(dyn Any + Send + Sync)> {
        None
    }
}

/// A shared handle to a [`ContextValue`].
///
/// Contexts are cheap to clone (Arc-based) and thread-safe.  Two handles are
/// equal only if they point at the same value, so a snapshot taken by
/// [`spawn`](crate::spawn) compares equal to exactly the context it was taken from.
///
/// # Examples
///
/// ```rust
/// use ambient_context::{Background, Context};
///
/// let a = Context::new(Background);
/// let b = a.clone();
/// let c = Context::new(Background);
///
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// assert!(a.deadline().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Context {
    pub(crate) inner: Arc<dyn ContextValue>,
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Context {}

impl Hash for Context {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.inner) as *const ()).hash(state);
    }
}

impl Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.inner)
    }
}

impl<V: ContextValue + 'static> From<Arc<V>> for Context {
    fn from(value: Arc<V>) -> Self {
        let inner: Arc<dyn ContextValue> = value;
        Context { inner }
    }
}

impl Context {
    pub fn new(value: impl ContextValue + 'static) -> Context {
        let inner: Arc<dyn ContextValue> = Arc::new(value);
        Context { inner }
    }

    /// A fresh root value.  Each call yields a distinct context.
    pub fn background() -> Context {
        Context::new(Background)
    }

    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline()
    }

    #[inline]
    pub fn wait_done(&self, timeout: Duration) -> bool {
        self.inner.wait_done(timeout)
    }

    #[inline]
    pub fn err(&self) -> Option<ContextError> {
        self.inner.err()
    }

    /// Looks up `key` and downcasts it to `T`.
    ///
    /// Returns `None` if the key is absent or holds a different type.
    pub fn value<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.inner
            .value(key)
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }

    /// The underlying value.
    pub fn as_value(&self) -> &dyn ContextValue {
        &*self.inner
    }
}
