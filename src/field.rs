//! Parsed runtime field definitions and the queryable fields they expose.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::parameter::{AnyParameter, Meta};
use crate::script::Script;
use crate::types::date::DateFormat;

/// Field as seen by the query engine.
///
/// A runtime field usually exposes a single queryable field with its own name;
/// composite fields expose one per sub-field, named `<parent>.<sub>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryableField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<Script>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<DateFormat>,
}

impl QueryableField {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            meta: Meta::new(),
            script: None,
            format: None,
        }
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_script(mut self, script: Option<Script>) -> Self {
        self.script = script;
        self
    }

    pub fn with_format(mut self, format: DateFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Whether this field lives inside `parent`'s namespace: it is named
    /// `parent` exactly, or `parent.` followed by at least one character.
    pub fn belongs_to(&self, parent: &str) -> bool {
        if self.name == parent {
            return true;
        }
        match self.name.strip_prefix(parent) {
            Some(rest) => rest.len() > 1 && rest.starts_with('.'),
            None => false,
        }
    }
}

/// An immutable, validated runtime field definition.
pub trait RuntimeField: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn type_name(&self) -> &str;

    /// Fields backing this runtime field, used to run queries and aggregations.
    fn queryable_fields(&self) -> Vec<QueryableField>;

    /// Write the type specific parameters (everything except `type`).
    fn write_parameters(&self, include_defaults: bool, out: &mut Map<String, Value>);

    /// `{"type": <type>, <parameters>...}`
    fn to_xcontent_body(&self, include_defaults: bool) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("type".to_string(), Value::String(self.type_name().to_string()));
        self.write_parameters(include_defaults, &mut body);
        body
    }

    /// `{<name>: {"type": <type>, <parameters>...}}`
    fn to_xcontent(&self, include_defaults: bool) -> Value {
        let mut outer = Map::new();
        outer.insert(
            self.name().to_string(),
            Value::Object(self.to_xcontent_body(include_defaults)),
        );
        Value::Object(outer)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct FrozenParameter {
    name: &'static str,
    value: Value,
    is_default: bool,
}

/// Serialized snapshot of a builder's parameters, taken when it is sealed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrozenParameters {
    parameters: Vec<FrozenParameter>,
}

impl FrozenParameters {
    pub fn capture(parameters: &[&dyn AnyParameter]) -> Self {
        Self {
            parameters: parameters
                .iter()
                .map(|p| FrozenParameter {
                    name: p.name(),
                    value: p.serialize(),
                    is_default: p.is_default(),
                })
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    pub fn write(&self, include_defaults: bool, out: &mut Map<String, Value>) {
        for parameter in &self.parameters {
            if include_defaults || !parameter.is_default {
                out.insert(parameter.name.to_string(), parameter.value.clone());
            }
        }
    }
}
