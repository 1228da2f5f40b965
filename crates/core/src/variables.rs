//! Copy-on-write variable bag attached to a leased job.
//!
//! A handler sees the engine's variable snapshot from lease time and
//! records its own writes in a separate overlay. Completion hands back
//! only the overlay, so sibling state in the workflow instance is never
//! deleted or overwritten by accident.

use serde_json::{Map, Value};

/// JSON object mapping variable names to values.
///
/// `serde_json::Map` is backed by a sorted map, so iteration order is
/// deterministic -- useful when dumping all variables for an operator.
pub type VariableMap = Map<String, Value>;

/// A job's variable scope during one lease.
///
/// Reads fall through the overlay to the immutable snapshot; writes go
/// to the overlay only. Two handlers executing concurrently can never
/// observe each other's in-flight edits because each lease gets its own
/// overlay over its own snapshot.
pub struct VariableContext<'a> {
    snapshot: &'a VariableMap,
    overlay: VariableMap,
}

impl<'a> VariableContext<'a> {
    /// Create a context over the lease-time snapshot with an empty overlay.
    pub fn new(snapshot: &'a VariableMap) -> Self {
        Self {
            snapshot,
            overlay: VariableMap::new(),
        }
    }

    /// Look up a variable, preferring values set during this lease.
    ///
    /// Returns `None` for absent keys -- never a falsy placeholder value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.overlay.get(name).or_else(|| self.snapshot.get(name))
    }

    /// Look up a variable and require it to be a JSON string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Set a variable in the overlay. The snapshot is never mutated.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.overlay.insert(name.into(), value);
    }

    /// Consume the context and return only the explicitly-set variables.
    pub fn into_delta(self) -> VariableMap {
        self.overlay
    }

    /// Full view of the scope: snapshot with the overlay applied on top.
    ///
    /// Used when a correlation message must carry the complete variable
    /// set, including flags set during this lease.
    pub fn merged(&self) -> VariableMap {
        let mut merged = self.snapshot.clone();
        for (name, value) in &self.overlay {
            merged.insert(name.clone(), value.clone());
        }
        merged
    }

    /// All visible variables sorted by name, for operator-facing logs.
    pub fn sorted_entries(&self) -> Vec<(&str, &Value)> {
        let mut entries: std::collections::BTreeMap<&str, &Value> = self
            .snapshot
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        for (name, value) in &self.overlay {
            entries.insert(name.as_str(), value);
        }
        entries.into_iter().collect()
    }
}
