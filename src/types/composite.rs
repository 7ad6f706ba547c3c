//! `composite` runtime field: one script emitting several named sub-fields.
//!
//! A composite field named `obj` with sub-fields `a` and `b` exposes the
//! queryable fields `obj.a` and `obj.b`, and nothing named `obj`.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::builder::{BuilderBase, FieldBuilder};
use crate::context::ParserContext;
use crate::error::{MappingError, Result};
use crate::field::{FrozenParameters, QueryableField, RuntimeField};
use crate::parameter::{AnyParameter, Meta, Parameter};
use crate::script::Script;
use crate::types::date::DateFormat;
use crate::types::{is_sub_field_type, COMPOSITE, DATE};

/// Sub-field name -> sub-field type name.
pub type SubFields = IndexMap<String, String>;

fn parse_sub_fields(field: &str, raw: &Value) -> std::result::Result<SubFields, String> {
    let map = match raw {
        Value::Object(map) => map,
        other => {
            return Err(format!(
                "[fields] must be an object but got a [{}]",
                crate::json_kind(other)
            ))
        }
    };
    if map.is_empty() {
        return Err(format!("composite runtime field [{}] must declare at least one sub-field", field));
    }

    let mut sub_fields = SubFields::new();
    for (sub_name, definition) in map {
        if sub_name.is_empty() || sub_name.starts_with('.') || sub_name.ends_with('.') {
            return Err(format!("invalid sub-field name [{}]", sub_name));
        }
        let definition = match definition {
            Value::Object(definition) => definition,
            other => {
                return Err(format!(
                    "expected map for sub-field [{}] but got a [{}]",
                    sub_name,
                    crate::json_kind(other)
                ))
            }
        };
        let type_name = match definition.get("type") {
            Some(Value::String(t)) => t,
            Some(_) | None => return Err(format!("no type specified for sub-field [{}]", sub_name)),
        };
        if !is_sub_field_type(type_name) {
            return Err(format!(
                "sub-field [{}] cannot be of type [{}]",
                sub_name, type_name
            ));
        }
        if let Some(key) = definition.keys().find(|k| k.as_str() != "type") {
            return Err(format!(
                "unknown parameter [{}] on sub-field [{}]",
                key, sub_name
            ));
        }
        sub_fields.insert(sub_name.clone(), type_name.clone());
    }
    Ok(sub_fields)
}

fn serialize_sub_fields(sub_fields: &SubFields) -> Value {
    Value::Object(
        sub_fields
            .iter()
            .map(|(name, type_name)| {
                let mut definition = Map::new();
                definition.insert("type".to_string(), Value::String(type_name.clone()));
                (name.clone(), Value::Object(definition))
            })
            .collect(),
    )
}

#[derive(Debug, Clone)]
pub struct CompositeFieldBuilder {
    base: BuilderBase,
    script: Parameter<Option<Script>>,
    fields: Parameter<SubFields>,
}

impl CompositeFieldBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            base: BuilderBase::new(name),
            script: Parameter::script(),
            fields: Parameter::new("fields", SubFields::new(), parse_sub_fields, serialize_sub_fields),
        }
    }

    fn missing(&self, parameter: &str, reason: &str) -> MappingError {
        MappingError::Validation {
            field: self.base.name().to_string(),
            type_name: COMPOSITE.to_string(),
            parameter: parameter.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl FieldBuilder for CompositeFieldBuilder {
    fn base(&self) -> &BuilderBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        COMPOSITE
    }

    fn parameters(&self) -> Vec<&dyn AnyParameter> {
        self.base.parameters(vec![
            &self.script as &dyn AnyParameter,
            &self.fields as &dyn AnyParameter,
        ])
    }

    fn parameters_mut(&mut self) -> Vec<&mut dyn AnyParameter> {
        self.base.parameters_mut(vec![
            &mut self.script as &mut dyn AnyParameter,
            &mut self.fields as &mut dyn AnyParameter,
        ])
    }

    fn build(self: Box<Self>, _ctx: &ParserContext<'_>) -> Result<Arc<dyn RuntimeField>> {
        let script = match self.script.value() {
            Some(script) => script.clone(),
            None => return Err(self.missing("script", "composite runtime fields require a script")),
        };
        if self.fields.value().is_empty() {
            return Err(self.missing("fields", "composite runtime fields require [fields]"));
        }

        let parameters = FrozenParameters::capture(&self.parameters());
        Ok(Arc::new(CompositeField {
            name: self.base.name().to_string(),
            meta: self.base.meta.value().clone(),
            script,
            sub_fields: self.fields.value().clone(),
            parameters,
        }))
    }
}

/// Sealed `composite` runtime field.
#[derive(Debug, Clone)]
pub struct CompositeField {
    name: String,
    meta: Meta,
    script: Script,
    sub_fields: SubFields,
    parameters: FrozenParameters,
}

impl CompositeField {
    pub fn sub_fields(&self) -> &SubFields {
        &self.sub_fields
    }

    pub fn script(&self) -> &Script {
        &self.script
    }
}

impl RuntimeField for CompositeField {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        COMPOSITE
    }

    fn queryable_fields(&self) -> Vec<QueryableField> {
        self.sub_fields
            .iter()
            .map(|(sub_name, type_name)| {
                let field = QueryableField::new(format!("{}.{}", self.name, sub_name), type_name)
                    .with_meta(self.meta.clone())
                    .with_script(Some(self.script.clone()));
                if type_name == DATE {
                    field.with_format(DateFormat::default())
                } else {
                    field
                }
            })
            .collect()
    }

    fn write_parameters(&self, include_defaults: bool, out: &mut Map<String, Value>) {
        self.parameters.write(include_defaults, out);
    }
}
