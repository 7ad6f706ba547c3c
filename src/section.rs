//! The current runtime section of a document and how updates apply to it.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::collector::collect_field_types;
use crate::error::Result;
use crate::field::{QueryableField, RuntimeField};
use crate::field_set::ParsedFieldSet;

/// Runtime fields currently defined on a document.
#[derive(Debug, Clone, Default)]
pub struct RuntimeSection {
    fields: IndexMap<String, Arc<dyn RuntimeField>>,
}

impl RuntimeSection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an update: definitions replace fields with the same name and
    /// removal markers delete them.
    ///
    /// The update is checked with [`collect_field_types`] against the
    /// resulting section before anything changes, so a rejected update leaves
    /// the section untouched.
    pub fn apply(&mut self, update: ParsedFieldSet) -> Result<()> {
        let mut next = self.fields.clone();
        for (name, field) in update.into_entries() {
            match field {
                Some(field) => {
                    next.insert(name, field);
                }
                None => {
                    if next.shift_remove(&name).is_none() {
                        tracing::debug!(field = %name, "removal of undefined runtime field ignored");
                    }
                }
            }
        }

        collect_field_types(next.values().map(|f| f.as_ref()))?;
        self.fields = next;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn RuntimeField> {
        self.fields.get(name).map(|f| f.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys().map(|name| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_types(&self) -> Result<IndexMap<String, QueryableField>> {
        collect_field_types(self.fields.values().map(|f| f.as_ref()))
    }

    pub fn to_xcontent(&self, include_defaults: bool) -> Value {
        let mut out = Map::new();
        for (name, field) in &self.fields {
            out.insert(
                name.clone(),
                Value::Object(field.to_xcontent_body(include_defaults)),
            );
        }
        Value::Object(out)
    }
}
