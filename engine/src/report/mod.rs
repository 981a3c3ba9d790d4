//! Structured per-query reporting (§1 ambient stack): a thread-local stack
//! of nested `serde_json::Value` objects, with a `report!` macro that writes
//! into the current top-of-stack context and `report_time_with_key` that
//! times a closure and records its duration alongside the rest of a query's
//! statistics. The runner binary (not this crate) decides where a flushed
//! report ends up — stdout, `--log PATH`, or (feature `report-to-stderr`)
//! stderr.

use scoped_tls::scoped_thread_local;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::time::Instant;

scoped_thread_local!(static CONTEXT_STACK: RefCell<Vec<Map<String, Value>>>);

/// Runs `f` with a fresh top-level report context pushed, returning both
/// `f`'s result and the finished JSON object. Queries call this once, at
/// the very top of the query driver (§4.3's propagation loop reports into
/// the context this establishes).
pub fn with_report<T>(f: impl FnOnce() -> T) -> (T, Value) {
    let stack = RefCell::new(vec![Map::new()]);
    let result = CONTEXT_STACK.set(&stack, f);
    let mut stack = stack.into_inner();
    let top = stack.pop().expect("context stack underflow");
    (result, Value::Object(top))
}

/// Insert `key: value` into the current top-of-stack context. Panics (via
/// `report!`'s `unwrap`-style contract) if called outside `with_report` --
/// a programming error, not a runtime condition callers should handle.
pub fn report_value(key: &str, value: Value) {
    if CONTEXT_STACK.is_set() {
        CONTEXT_STACK.with(|stack| {
            stack.borrow_mut().last_mut().expect("empty context stack").insert(key.to_string(), value);
        });
    }
}

#[macro_export]
macro_rules! report {
    ($key:expr, $value:expr) => {
        $crate::report::report_value($key, serde_json::json!($value))
    };
}

/// Time `f` and record its duration (seconds, as used throughout the label-
/// setting core's per-phase timings) under `key`, returning `f`'s result.
pub fn report_time_with_key<T>(_label: &str, key: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed().as_secs_f64();
    report_value(key, Value::from(elapsed));
    result
}

/// Push a new nested array context under `key` in the current top context,
/// and make it the new top for the duration of `f` -- used for per-iteration
/// collections (e.g. one entry per relaxed edge when `detailed-stats` is on).
pub fn push_collection_context<T>(key: &str, f: impl FnOnce() -> T) -> T {
    if !CONTEXT_STACK.is_set() {
        return f();
    }
    CONTEXT_STACK.with(|stack| stack.borrow_mut().push(Map::new()));
    let result = f();
    CONTEXT_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        let item = stack.pop().expect("context stack underflow");
        let parent = stack.last_mut().expect("empty context stack");
        let entry = parent.entry(key.to_string()).or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(items) = entry {
            items.push(Value::Object(item));
        }
    });
    result
}

/// Push a single already-built item into the named collection on the
/// current context, without establishing a nested scope (for the common
/// case where the item is a scalar/small struct rather than built up via
/// further `report!` calls).
pub fn push_collection_item(key: &str, value: Value) {
    if !CONTEXT_STACK.is_set() {
        return;
    }
    CONTEXT_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        let top = stack.last_mut().expect("empty context stack");
        let entry = top.entry(key.to_string()).or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(items) = entry {
            items.push(value);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_nests_values_under_with_report() {
        let (_, json) = with_report(|| {
            report!("algo", "omega");
            report_time_with_key("link", "link_time", || 1 + 1);
        });
        assert_eq!(json["algo"], "omega");
        assert!(json["link_time"].as_f64().unwrap() >= 0.0);
    }

    #[test]
    fn report_outside_with_report_is_a_noop() {
        report!("ignored", "value");
    }

    #[test]
    fn collection_context_nests_and_collects() {
        let (_, json) = with_report(|| {
            for i in 0..3 {
                push_collection_context("relaxations", || {
                    report!("i", i);
                });
            }
        });
        assert_eq!(json["relaxations"].as_array().unwrap().len(), 3);
    }
}
