//! Parsing of a whole runtime section into runtime field definitions.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::collector::collect_field_types;
use crate::context::ParserContext;
use crate::error::{MappingError, Result};
use crate::field::{QueryableField, RuntimeField};

/// Result of parsing a runtime section, in input order.
///
/// A name maps to `None` when the input set it to `null` to request removal.
#[derive(Debug, Clone, Default)]
pub struct ParsedFieldSet {
    fields: IndexMap<String, Option<Arc<dyn RuntimeField>>>,
}

impl ParsedFieldSet {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Whether `name` was set to `null`.
    pub fn is_removal(&self, name: &str) -> bool {
        matches!(self.fields.get(name), Some(None))
    }

    pub fn get(&self, name: &str) -> Option<&dyn RuntimeField> {
        self.fields.get(name).and_then(|f| f.as_deref())
    }

    /// Parsed definitions, removals excluded.
    pub fn definitions(&self) -> impl Iterator<Item = &dyn RuntimeField> + '_ {
        self.fields.values().filter_map(|f| f.as_deref())
    }

    /// Names marked for removal.
    pub fn removals(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields
            .iter()
            .filter(|(_, f)| f.is_none())
            .map(|(name, _)| name.as_str())
    }

    /// Every top-level name this section consumed. The enclosing document parser
    /// must not interpret these as anything else.
    pub fn consumed_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys().map(|name| name.as_str())
    }

    /// Queryable fields of every definition in this set.
    pub fn field_types(&self) -> Result<IndexMap<String, QueryableField>> {
        collect_field_types(self.definitions())
    }

    /// Render the section back to its configuration shape, removals as `null`.
    pub fn to_xcontent(&self, include_defaults: bool) -> Value {
        let mut out = Map::new();
        for (name, field) in &self.fields {
            let body = match field {
                Some(field) => Value::Object(field.to_xcontent_body(include_defaults)),
                None => Value::Null,
            };
            out.insert(name.clone(), body);
        }
        Value::Object(out)
    }

    pub fn into_entries(self) -> IndexMap<String, Option<Arc<dyn RuntimeField>>> {
        self.fields
    }
}

/// Parse runtime field definitions from a runtime section.
///
/// # Arguments
///
/// * `node` - Map of field name to definition (or `null` for removal)
/// * `ctx` - Parser context (version, dynamic template flag, registry, sink)
/// * `supports_removal` - Whether `null` definitions are accepted
///
/// # Returns
///
/// Parsed definitions keyed by field name, in input order. The first invalid
/// definition aborts the whole parse.
///
/// # Example
///
/// ```
/// use runtime_fields::{parse_runtime_fields, NoopSink, ParserContext, TypeRegistry};
/// use serde_json::json;
///
/// let registry = TypeRegistry::with_builtin_types();
/// let ctx = ParserContext::new(&registry, &NoopSink);
/// let node = json!({"age": {"type": "long"}});
///
/// let parsed = parse_runtime_fields(node.as_object().unwrap(), &ctx, false).unwrap();
/// assert_eq!(parsed.get("age").unwrap().type_name(), "long");
/// ```
pub fn parse_runtime_fields(
    node: &Map<String, Value>,
    ctx: &ParserContext<'_>,
    supports_removal: bool,
) -> Result<ParsedFieldSet> {
    let mut fields = IndexMap::with_capacity(node.len());

    for (field_name, value) in node {
        match value {
            Value::Null => {
                if !supports_removal {
                    return Err(MappingError::RemovalNotSupported {
                        field: field_name.clone(),
                    });
                }
                fields.insert(field_name.clone(), None);
            }
            Value::Object(definition) => {
                let type_name = match definition.get("type") {
                    None | Some(Value::Null) => {
                        return Err(MappingError::MissingType {
                            field: field_name.clone(),
                        })
                    }
                    Some(Value::String(type_name)) => type_name.clone(),
                    Some(other) => other.to_string(),
                };

                let parser = ctx.type_parser(&type_name).ok_or_else(|| MappingError::UnknownType {
                    field: field_name.clone(),
                    type_name: type_name.clone(),
                })?;

                let (field, residual) = parser.parse(field_name, definition, ctx)?;
                if let Some(leftover) = residual.keys().first() {
                    return Err(MappingError::UnknownParameter {
                        field: field_name.clone(),
                        type_name,
                        parameter: leftover.clone(),
                    });
                }

                tracing::debug!(field = %field_name, type_name = %type_name, "parsed runtime field");
                fields.insert(field_name.clone(), Some(field));
            }
            other => {
                return Err(MappingError::InvalidShape {
                    field: field_name.clone(),
                    kind: crate::json_kind(other),
                })
            }
        }
    }

    Ok(ParsedFieldSet { fields })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuilderBase, FieldBuilder, Residual};
    use crate::diagnostics::{CollectingSink, NoopSink};
    use crate::parameter::AnyParameter;
    use crate::registry::{TypeParser, TypeRegistry};
    use crate::types::leaf::{LeafFieldBuilder, LeafType};
    use crate::version::Version;
    use serde_json::json;

    fn parse(input: Value, supports_removal: bool) -> Result<ParsedFieldSet> {
        let registry = TypeRegistry::with_builtin_types();
        let ctx = ParserContext::new(&registry, &NoopSink);
        parse_runtime_fields(input.as_object().unwrap(), &ctx, supports_removal)
    }

    #[test]
    fn test_single_long_field() {
        let parsed = parse(json!({"age": {"type": "long"}}), false).unwrap();

        assert_eq!(parsed.len(), 1);
        let age = parsed.get("age").unwrap();
        assert_eq!(age.name(), "age");
        assert_eq!(age.type_name(), "long");
        let names: Vec<String> = age.queryable_fields().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["age"]);
    }

    #[test]
    fn test_removal_marker() {
        let parsed = parse(json!({"age": null}), true).unwrap();

        assert!(parsed.contains("age"));
        assert!(parsed.is_removal("age"));
        assert!(parsed.get("age").is_none());
        assert_eq!(parsed.removals().collect::<Vec<_>>(), vec!["age"]);
        assert_eq!(parsed.definitions().count(), 0);
    }

    #[test]
    fn test_removal_not_supported() {
        let err = parse(json!({"age": null}), false).unwrap_err();
        assert_eq!(
            err,
            MappingError::RemovalNotSupported {
                field: "age".to_string()
            }
        );
    }

    #[test]
    fn test_missing_type() {
        let err = parse(json!({"age": {"script": "emit(1)"}}), false).unwrap_err();
        assert!(matches!(err, MappingError::MissingType { .. }));

        let err = parse(json!({"age": {"type": null}}), false).unwrap_err();
        assert!(matches!(err, MappingError::MissingType { .. }));
    }

    #[test]
    fn test_unknown_type() {
        let err = parse(json!({"age": {"type": "unsigned_long"}}), false).unwrap_err();
        assert_eq!(
            err,
            MappingError::UnknownType {
                field: "age".to_string(),
                type_name: "unsigned_long".to_string(),
            }
        );

        let err = parse(json!({"age": {"type": 5}}), false).unwrap_err();
        assert!(matches!(err, MappingError::UnknownType { ref type_name, .. } if type_name == "5"));
    }

    #[test]
    fn test_invalid_shape() {
        let err = parse(json!({"age": "long"}), false).unwrap_err();
        assert_eq!(
            err,
            MappingError::InvalidShape {
                field: "age".to_string(),
                kind: "string"
            }
        );

        let err = parse(json!({"age": [1, 2]}), false).unwrap_err();
        assert!(matches!(err, MappingError::InvalidShape { kind: "array", .. }));
    }

    #[test]
    fn test_unknown_parameter_outside_template() {
        let err = parse(json!({"age": {"type": "long", "bogus": 1}}), false).unwrap_err();
        assert!(matches!(err, MappingError::UnknownParameter { ref parameter, .. } if parameter == "bogus"));
    }

    #[test]
    fn test_unknown_parameter_in_legacy_template() {
        let registry = TypeRegistry::with_builtin_types();
        let sink = CollectingSink::new();
        let ctx = ParserContext::new(&registry, &sink)
            .with_index_version(Version::new(7, 12, 0))
            .with_dynamic_template(true);
        let input = json!({"age": {"type": "long", "bogus": 1}});

        let parsed = parse_runtime_fields(input.as_object().unwrap(), &ctx, false).unwrap();

        assert_eq!(sink.deprecations().len(), 1);
        let rendered = parsed.get("age").unwrap().to_xcontent(true);
        assert!(rendered["age"].get("bogus").is_none());
    }

    #[test]
    fn test_unknown_parameter_in_current_template_fails() {
        let registry = TypeRegistry::with_builtin_types();
        let sink = CollectingSink::new();
        let ctx = ParserContext::new(&registry, &sink).with_dynamic_template(true);
        let input = json!({"age": {"type": "long", "bogus": 1}});

        let err = parse_runtime_fields(input.as_object().unwrap(), &ctx, false).unwrap_err();

        assert!(matches!(err, MappingError::UnknownParameter { .. }));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_first_error_aborts() {
        let err = parse(
            json!({"ok": {"type": "long"}, "bad": {"type": "nope"}, "worse": 1}),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, MappingError::UnknownType { .. }));
    }

    #[test]
    fn test_input_order_and_consumed_names() {
        let parsed = parse(
            json!({"b": {"type": "keyword"}, "a": {"type": "double"}, "c": null}),
            true,
        )
        .unwrap();

        assert_eq!(parsed.consumed_names().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(
            parsed.to_xcontent(false),
            json!({"b": {"type": "keyword"}, "a": {"type": "double"}, "c": null})
        );
    }

    /// Builder that only looks at `script`, leaving everything else behind.
    #[derive(Debug)]
    struct PartialBuilder(LeafFieldBuilder);

    impl FieldBuilder for PartialBuilder {
        fn base(&self) -> &BuilderBase {
            self.0.base()
        }

        fn type_name(&self) -> &'static str {
            "partial"
        }

        fn parameters(&self) -> Vec<&dyn AnyParameter> {
            self.0.parameters()
        }

        fn parameters_mut(&mut self) -> Vec<&mut dyn AnyParameter> {
            self.0.parameters_mut()
        }

        fn build(self: Box<Self>, ctx: &ParserContext<'_>) -> Result<Arc<dyn RuntimeField>> {
            Box::new(self.0).build(ctx)
        }

        fn parse(&mut self, _ctx: &ParserContext<'_>, node: &Map<String, Value>) -> Result<Residual> {
            Ok(Residual::new(
                node.keys()
                    .filter(|k| k.as_str() != "type" && k.as_str() != "script")
                    .cloned()
                    .collect(),
            ))
        }
    }

    #[test]
    fn test_residual_is_rejected() {
        let mut registry = TypeRegistry::new();
        registry.register(
            "partial",
            TypeParser::new(|name| Box::new(PartialBuilder(LeafFieldBuilder::new(name, LeafType::Long)))),
        );
        let ctx = ParserContext::new(&registry, &NoopSink);
        let input = json!({"age": {"type": "partial", "script": "emit(1)", "leftover": true}});

        let err = parse_runtime_fields(input.as_object().unwrap(), &ctx, false).unwrap_err();

        assert_eq!(
            err,
            MappingError::UnknownParameter {
                field: "age".to_string(),
                type_name: "partial".to_string(),
                parameter: "leftover".to_string(),
            }
        );
    }
}
