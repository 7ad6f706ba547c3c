//! Field builders: the mutable staging step between raw configuration and a
//! sealed [`RuntimeField`].

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::context::ParserContext;
use crate::diagnostics::Deprecation;
use crate::error::{MappingError, Result};
use crate::field::RuntimeField;
use crate::parameter::{AnyParameter, Meta, Parameter};

/// Attribute keys a builder left unconsumed after parsing.
///
/// The field-set parser rejects a definition whose residual is not empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Residual {
    keys: Vec<String>,
}

impl Residual {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// State shared by every builder: the field name and the `meta` parameter.
#[derive(Debug, Clone)]
pub struct BuilderBase {
    name: String,
    pub meta: Parameter<Meta>,
}

impl BuilderBase {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            meta: Parameter::meta(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `meta` followed by the type specific parameters.
    pub fn parameters<'a>(&'a self, rest: Vec<&'a dyn AnyParameter>) -> Vec<&'a dyn AnyParameter> {
        let mut all: Vec<&'a dyn AnyParameter> = Vec::with_capacity(rest.len() + 1);
        all.push(&self.meta);
        all.extend(rest);
        all
    }

    /// Mutable counterpart of [`BuilderBase::parameters`].
    pub fn parameters_mut<'a>(
        &'a mut self,
        rest: Vec<&'a mut dyn AnyParameter>,
    ) -> Vec<&'a mut dyn AnyParameter> {
        let mut all: Vec<&'a mut dyn AnyParameter> = Vec::with_capacity(rest.len() + 1);
        all.push(&mut self.meta);
        all.extend(rest);
        all
    }
}

/// Per-type builder turning one raw definition into a [`RuntimeField`].
///
/// A builder is created fresh for every field, fed one configuration node via
/// [`FieldBuilder::parse`] and then consumed by [`FieldBuilder::build`].
pub trait FieldBuilder {
    fn base(&self) -> &BuilderBase;

    /// Type name this builder is registered under.
    fn type_name(&self) -> &'static str;

    /// All parameters of this type, `meta` first.
    fn parameters(&self) -> Vec<&dyn AnyParameter>;

    fn parameters_mut(&mut self) -> Vec<&mut dyn AnyParameter>;

    /// Seal the validated parameter state into an immutable field.
    fn build(self: Box<Self>, ctx: &ParserContext<'_>) -> Result<Arc<dyn RuntimeField>>;

    fn name(&self) -> &str {
        self.base().name()
    }

    fn meta(&self) -> &Meta {
        self.base().meta.value()
    }

    /// Apply every attribute of `node` (except `type`) to the matching parameter.
    ///
    /// Unknown attributes are rejected, unless the context allows the legacy
    /// dynamic template behaviour, in which case they are reported to the
    /// diagnostic sink and dropped. Builders overriding this method return the
    /// keys they did not look at.
    fn parse(&mut self, ctx: &ParserContext<'_>, node: &Map<String, Value>) -> Result<Residual> {
        let field = self.name().to_string();
        let type_name = self.type_name();
        let mut parameters = self.parameters_mut();
        let index: HashMap<&'static str, usize> = parameters
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name(), i))
            .collect();

        for (key, raw) in node {
            if key == "type" {
                continue;
            }

            let parameter = match index.get(key.as_str()) {
                Some(&i) => &mut parameters[i],
                None => {
                    if ctx.allows_legacy_unknown_parameters() {
                        ctx.diagnostics().deprecation(Deprecation::unknown_template_parameter(
                            key, &field, type_name,
                        ));
                        continue;
                    }
                    return Err(MappingError::UnknownParameter {
                        field,
                        type_name: type_name.to_string(),
                        parameter: key.clone(),
                    });
                }
            };

            if raw.is_null() && !parameter.accepts_null() {
                return Err(MappingError::NullNotAllowed {
                    field,
                    type_name: type_name.to_string(),
                    parameter: key.clone(),
                });
            }

            parameter
                .parse(&field, raw)
                .map_err(|reason| MappingError::Validation {
                    field: field.clone(),
                    type_name: type_name.to_string(),
                    parameter: key.clone(),
                    reason,
                })?;
        }

        Ok(Residual::default())
    }

    /// Current parameters, skipping defaults unless `include_defaults` is set.
    fn to_xcontent(&self, include_defaults: bool) -> Map<String, Value> {
        let mut out = Map::new();
        for parameter in self.parameters() {
            parameter.to_xcontent(include_defaults, &mut out);
        }
        out
    }
}
