//! Diagnostic sinks for non-fatal parse findings.
//!
//! Parsing never logs through a global logger. The caller hands a sink to the
//! [`ParserContext`](crate::context::ParserContext) and decides where
//! deprecation warnings end up.

use std::collections::HashSet;
use std::sync::Mutex;

/// A deprecated construct that was accepted for backwards compatibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deprecation {
    /// Deduplication key (the offending parameter name)
    pub key: String,
    /// Human readable warning
    pub message: String,
}

impl Deprecation {
    /// Warning for a parameter dropped from a legacy dynamic template definition.
    pub fn unknown_template_parameter(parameter: &str, field: &str, type_name: &str) -> Self {
        Self {
            key: parameter.to_string(),
            message: format!(
                "Parameter [{}] is used in a dynamic template mapping and has no effect on type [{}] \
                 (runtime field [{}]). Usage will result in an error in future major versions and \
                 should be removed.",
                parameter, type_name, field
            ),
        }
    }
}

/// Receiver of deprecation warnings raised during parsing.
pub trait DiagnosticSink: Send + Sync {
    fn deprecation(&self, deprecation: Deprecation);
}

/// Forwards deprecations to `tracing` under the `deprecation` target.
///
/// Each key is logged once per sink; later deprecations with the same key are
/// dropped.
#[derive(Debug, Default)]
pub struct TracingSink {
    logged: Mutex<HashSet<String>>,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key`, returning whether it had not been seen before.
    fn first_occurrence(&self, key: &str) -> bool {
        match self.logged.lock() {
            Ok(mut logged) => logged.insert(key.to_string()),
            Err(poisoned) => poisoned.into_inner().insert(key.to_string()),
        }
    }
}

impl DiagnosticSink for TracingSink {
    fn deprecation(&self, deprecation: Deprecation) {
        if self.first_occurrence(&deprecation.key) {
            tracing::warn!(target: "deprecation", key = %deprecation.key, "{}", deprecation.message);
        }
    }
}

/// Keeps every deprecation in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    collected: Mutex<Vec<Deprecation>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the deprecations received so far.
    pub fn deprecations(&self) -> Vec<Deprecation> {
        match self.collected.lock() {
            Ok(collected) => collected.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.deprecations().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn deprecation(&self, deprecation: Deprecation) {
        match self.collected.lock() {
            Ok(mut collected) => collected.push(deprecation),
            Err(poisoned) => poisoned.into_inner().push(deprecation),
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn deprecation(&self, _deprecation: Deprecation) {}
}
