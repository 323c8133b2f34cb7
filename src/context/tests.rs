// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tests for the context module.

use super::context_impl::{Background, Context, ContextValue};
use crate::fault::ContextError;
use crate::sys::{Duration, Instant};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_test::*;
#[cfg(target_arch = "wasm32")]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

#[derive(Debug)]
struct Tagged {
    user: String,
    attempt: u32,
}

impl ContextValue for Tagged {
    fn deadline(&self) -> Option<Instant> {
        None
    }

    fn wait_done(&self, _timeout: Duration) -> bool {
        false
    }

    fn err(&self) -> Option<ContextError> {
        Some(ContextError::Canceled)
    }

    fn value(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        match key {
            "user" => Some(&self.user as &(dyn Any + Send + Sync)),
            "attempt" => Some(&self.attempt as &(dyn Any + Send + Sync)),
            _ => None,
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
fn test_context_equality() {
    let context1 = Context::background();
    let context2 = context1.clone();
    let context3 = Context::background();

    // Same Arc pointer should be equal
    assert_eq!(context1, context2);

    // Different Arc pointers should not be equal, even for identical values
    assert_ne!(context1, context3);
    assert_ne!(context2, context3);
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
#[allow(clippy::mutable_key_type)]
fn test_context_hash() {
    let context1 = Context::background();
    let context2 = context1.clone();
    let context3 = Context::background();

    let mut map = HashMap::new();
    map.insert(context1.clone(), "value1");
    map.insert(context3.clone(), "value3");

    assert_eq!(map.get(&context1), Some(&"value1"));
    assert_eq!(map.get(&context2), Some(&"value1")); // same as context1
    assert_eq!(map.get(&context3), Some(&"value3"));
    assert_eq!(map.len(), 2);
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
fn test_background_is_inert() {
    let ctx = Context::background();
    assert_eq!(ctx.deadline(), None);
    assert_eq!(ctx.err(), None);
    assert_eq!(ctx.value::<String>("anything"), None);
    assert!(!ctx.wait_done(Duration::from_millis(1)));
    assert_eq!(format!("{ctx}"), "Background");
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
fn test_value_downcasts() {
    let ctx = Context::new(Tagged {
        user: "alice".to_string(),
        attempt: 3,
    });
    assert_eq!(ctx.value::<String>("user"), Some("alice".to_string()));
    assert_eq!(ctx.value::<u32>("attempt"), Some(3));
    // wrong type and missing key both read as absent
    assert_eq!(ctx.value::<u64>("attempt"), None);
    assert_eq!(ctx.value::<u32>("missing"), None);
    assert_eq!(ctx.err(), Some(ContextError::Canceled));
}

#[cfg_attr(not(target_arch = "wasm32"), test)]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
fn test_from_arc_keeps_identity() {
    let shared = Arc::new(Background);
    let a = Context::from(shared.clone());
    let b = Context::from(shared);
    assert_eq!(a, b);
    assert!(a.as_value().deadline().is_none());
}
