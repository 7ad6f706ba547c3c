//! Script backed runtime fields with no type specific parameters.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::builder::{BuilderBase, FieldBuilder};
use crate::context::ParserContext;
use crate::error::Result;
use crate::field::{FrozenParameters, QueryableField, RuntimeField};
use crate::parameter::{AnyParameter, Meta, Parameter};
use crate::script::Script;

/// Runtime field types whose only parameters are `meta` and `script`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafType {
    Boolean,
    Double,
    GeoPoint,
    Ip,
    Keyword,
    Long,
}

impl LeafType {
    pub const ALL: [LeafType; 6] = [
        LeafType::Boolean,
        LeafType::Double,
        LeafType::GeoPoint,
        LeafType::Ip,
        LeafType::Keyword,
        LeafType::Long,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LeafType::Boolean => "boolean",
            LeafType::Double => "double",
            LeafType::GeoPoint => "geo_point",
            LeafType::Ip => "ip",
            LeafType::Keyword => "keyword",
            LeafType::Long => "long",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        LeafType::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for LeafType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct LeafFieldBuilder {
    base: BuilderBase,
    leaf_type: LeafType,
    script: Parameter<Option<Script>>,
}

impl LeafFieldBuilder {
    pub fn new(name: &str, leaf_type: LeafType) -> Self {
        Self {
            base: BuilderBase::new(name),
            leaf_type,
            script: Parameter::script(),
        }
    }
}

impl FieldBuilder for LeafFieldBuilder {
    fn base(&self) -> &BuilderBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        self.leaf_type.name()
    }

    fn parameters(&self) -> Vec<&dyn AnyParameter> {
        self.base.parameters(vec![&self.script as &dyn AnyParameter])
    }

    fn parameters_mut(&mut self) -> Vec<&mut dyn AnyParameter> {
        self.base.parameters_mut(vec![&mut self.script as &mut dyn AnyParameter])
    }

    fn build(self: Box<Self>, _ctx: &ParserContext<'_>) -> Result<Arc<dyn RuntimeField>> {
        let parameters = FrozenParameters::capture(&self.parameters());
        Ok(Arc::new(LeafField {
            name: self.base.name().to_string(),
            leaf_type: self.leaf_type,
            meta: self.base.meta.value().clone(),
            script: self.script.value().clone(),
            parameters,
        }))
    }
}

/// Sealed leaf runtime field.
#[derive(Debug, Clone)]
pub struct LeafField {
    name: String,
    leaf_type: LeafType,
    meta: Meta,
    script: Option<Script>,
    parameters: FrozenParameters,
}

impl LeafField {
    pub fn leaf_type(&self) -> LeafType {
        self.leaf_type
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn script(&self) -> Option<&Script> {
        self.script.as_ref()
    }
}

impl RuntimeField for LeafField {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        self.leaf_type.name()
    }

    fn queryable_fields(&self) -> Vec<QueryableField> {
        vec![QueryableField::new(&self.name, self.leaf_type.name())
            .with_meta(self.meta.clone())
            .with_script(self.script.clone())]
    }

    fn write_parameters(&self, include_defaults: bool, out: &mut Map<String, Value>) {
        self.parameters.write(include_defaults, out);
    }
}
