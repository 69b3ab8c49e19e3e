#![forbid(unsafe_code)]

use std::fmt;

use parking_lot::RwLock;

use crate::call::{display_name, MockRef};
use crate::template::CallTemplate;
use crate::value::Value;

/// Record of one intercepted call. Never mutated after creation.
#[derive(Clone, Debug, PartialEq)]
pub struct CallTrace {
    pub receiver: MockRef,
    pub signature: String,
    pub args: Vec<Value>,
    pub order_stamp: u64,
}

impl CallTrace {
    pub fn matches(&self, template: &CallTemplate) -> bool {
        self.receiver == template.receiver
            && self.signature == template.signature
            && self.args.len() == template.matchers.len()
            && template
                .matchers
                .iter()
                .zip(&self.args)
                .all(|(m, arg)| m.matches(arg))
    }
}

impl fmt::Display for CallTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.receiver, display_name(&self.signature))?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

#[derive(Debug)]
struct TraceEntry {
    trace: CallTrace,
    verified: bool,
}

/// Append-only call history of one mock, kept in stamp order.
#[derive(Debug, Default)]
pub struct TraceStore {
    entries: RwLock<Vec<TraceEntry>>,
}

impl TraceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, trace: CallTrace) {
        let mut entries = self.entries.write();
        // Stamps are taken before the lock, so a racing append may land out of order.
        let at = entries
            .iter()
            .rposition(|e| e.trace.order_stamp < trace.order_stamp)
            .map_or(0, |i| i + 1);
        entries.insert(
            at,
            TraceEntry {
                trace,
                verified: false,
            },
        );
    }

    pub fn snapshot(&self) -> Vec<CallTrace> {
        self.entries.read().iter().map(|e| e.trace.clone()).collect()
    }

    pub fn unverified(&self) -> Vec<CallTrace> {
        self.entries
            .read()
            .iter()
            .filter(|e| !e.verified)
            .map(|e| e.trace.clone())
            .collect()
    }

    pub fn mark_verified(&self, stamps: &[u64]) {
        let mut entries = self.entries.write();
        for entry in entries.iter_mut() {
            if stamps.contains(&entry.trace.order_stamp) {
                entry.verified = true;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
