#![forbid(unsafe_code)]

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::value::Value;

/// Append-only sink that a `capture` matcher feeds every matching argument into.
///
/// Clones share the same storage.
#[derive(Clone, Default)]
pub struct Capture {
    values: Arc<RwLock<Vec<Value>>>,
}

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capture(&self, value: Value) {
        self.values.write().push(value);
    }

    pub fn values(&self) -> Vec<Value> {
        self.values.read().clone()
    }

    pub fn last(&self) -> Option<Value> {
        self.values.read().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn same_sink(&self, other: &Capture) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }
}

impl fmt::Display for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "container({})", Value::List(self.values()))
    }
}

impl fmt::Debug for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
