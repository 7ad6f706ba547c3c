//! Integration tests for runtime field parsing, collection and sections

use runtime_fields::{
    collect_field_types, parse_runtime_fields, AnyParameter, BuilderBase, CollectingSink,
    FieldBuilder, FrozenParameters, MappingError, NoopSink, Parameter, ParserContext,
    QueryableField, RuntimeDocument, RuntimeField, RuntimeSection, Script, TypeParser,
    TypeRegistry, Version,
};
use serde_json::{json, Map, Value};
use std::io::Write;
use std::sync::Arc;
use std::thread;

fn parse_with(input: &Value, ctx: &ParserContext<'_>, supports_removal: bool) -> runtime_fields::Result<runtime_fields::ParsedFieldSet> {
    parse_runtime_fields(input.as_object().unwrap(), ctx, supports_removal)
}

#[test]
fn test_long_field_exposes_itself() {
    let registry = TypeRegistry::with_builtin_types();
    let ctx = ParserContext::new(&registry, &NoopSink);

    let parsed = parse_with(&json!({"age": {"type": "long"}}), &ctx, false).unwrap();

    let age = parsed.get("age").unwrap();
    assert_eq!(age.name(), "age");
    assert_eq!(age.type_name(), "long");
    let names: Vec<String> = age.queryable_fields().into_iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["age"]);
}

#[test]
fn test_removal_marker_depends_on_support() {
    let registry = TypeRegistry::with_builtin_types();
    let ctx = ParserContext::new(&registry, &NoopSink);
    let input = json!({"age": null});

    let parsed = parse_with(&input, &ctx, true).unwrap();
    assert!(parsed.is_removal("age"));

    let err = parse_with(&input, &ctx, false).unwrap_err();
    assert_eq!(
        err,
        MappingError::RemovalNotSupported {
            field: "age".to_string()
        }
    );
    assert_eq!(
        err.to_string(),
        "Runtime field [age] was set to null but its removal is not supported in this context"
    );
}

#[test]
fn test_unknown_parameter_rejected() {
    let registry = TypeRegistry::with_builtin_types();
    let sink = CollectingSink::new();
    let ctx = ParserContext::new(&registry, &sink);

    let err = parse_with(&json!({"age": {"type": "long", "bogus": 1}}), &ctx, false).unwrap_err();

    assert_eq!(
        err,
        MappingError::UnknownParameter {
            field: "age".to_string(),
            type_name: "long".to_string(),
            parameter: "bogus".to_string(),
        }
    );
    assert!(sink.is_empty());
}

#[test]
fn test_unknown_parameter_dropped_in_legacy_dynamic_template() {
    let registry = TypeRegistry::with_builtin_types();
    let sink = CollectingSink::new();
    let ctx = ParserContext::new(&registry, &sink)
        .with_index_version(Version::V_7_0_0)
        .with_dynamic_template(true);

    let parsed = parse_with(&json!({"age": {"type": "long", "bogus": 1}}), &ctx, false).unwrap();

    let deprecations = sink.deprecations();
    assert_eq!(deprecations.len(), 1);
    assert_eq!(deprecations[0].key, "bogus");
    assert!(deprecations[0].message.contains("[bogus]"));
    assert!(deprecations[0].message.contains("runtime field [age]"));

    let rendered = parsed.get("age").unwrap().to_xcontent(true);
    assert!(rendered["age"].get("bogus").is_none());
}

#[test]
fn test_null_for_non_nullable_parameter() {
    let registry = TypeRegistry::with_builtin_types();
    let ctx = ParserContext::new(&registry, &NoopSink);

    let err = parse_with(&json!({"when": {"type": "date", "format": null}}), &ctx, false).unwrap_err();
    assert!(matches!(err, MappingError::NullNotAllowed { ref parameter, .. } if parameter == "format"));

    // script is nullable
    let parsed = parse_with(&json!({"age": {"type": "long", "script": null}}), &ctx, false).unwrap();
    assert_eq!(parsed.len(), 1);
}

#[test]
fn test_duplicate_queryable_names() {
    let registry = TypeRegistry::with_builtin_types();
    let ctx = ParserContext::new(&registry, &NoopSink);

    let first = parse_with(&json!({"age": {"type": "long"}}), &ctx, false).unwrap();
    let second = parse_with(&json!({"age": {"type": "keyword"}}), &ctx, false).unwrap();

    let err = collect_field_types(first.definitions().chain(second.definitions())).unwrap_err();
    assert_eq!(
        err,
        MappingError::DuplicateFieldName {
            name: "age".to_string()
        }
    );
}

#[test]
fn test_composite_sub_field_clashes_with_dotted_field() {
    let registry = TypeRegistry::with_builtin_types();
    let ctx = ParserContext::new(&registry, &NoopSink);
    let input = json!({
        "http.verb": {"type": "keyword"},
        "http": {"type": "composite", "script": "emit(...)", "fields": {"verb": {"type": "keyword"}}}
    });

    let parsed = parse_with(&input, &ctx, false).unwrap();

    let err = parsed.field_types().unwrap_err();
    assert!(matches!(err, MappingError::DuplicateFieldName { ref name } if name == "http.verb"));
    assert!(err.field().is_none());
}

#[test]
fn test_concurrent_parses_share_one_registry() {
    let registry = Arc::new(TypeRegistry::with_builtin_types());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let ctx = ParserContext::new(&registry, &NoopSink);
                let name = format!("f{}", i);
                let mut node = Map::new();
                node.insert(name.clone(), json!({"type": "long"}));

                let parsed = parse_runtime_fields(&node, &ctx, false).unwrap();
                let field = parsed.get(&name).unwrap();
                (field.name().to_string(), field.type_name().to_string())
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let (name, type_name) = handle.join().unwrap();
        assert_eq!(name, format!("f{}", i));
        assert_eq!(type_name, "long");
    }
}

/// Keyword field with an extra boolean `strict` flag, registered from outside the crate.
#[derive(Debug)]
struct StrictKeywordBuilder {
    base: BuilderBase,
    script: Parameter<Option<Script>>,
    strict: Parameter<bool>,
}

impl StrictKeywordBuilder {
    fn new(name: &str) -> Self {
        Self {
            base: BuilderBase::new(name),
            script: Parameter::script(),
            strict: Parameter::boolean("strict", false),
        }
    }
}

impl FieldBuilder for StrictKeywordBuilder {
    fn base(&self) -> &BuilderBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        "strict_keyword"
    }

    fn parameters(&self) -> Vec<&dyn AnyParameter> {
        self.base.parameters(vec![
            &self.script as &dyn AnyParameter,
            &self.strict as &dyn AnyParameter,
        ])
    }

    fn parameters_mut(&mut self) -> Vec<&mut dyn AnyParameter> {
        self.base.parameters_mut(vec![
            &mut self.script as &mut dyn AnyParameter,
            &mut self.strict as &mut dyn AnyParameter,
        ])
    }

    fn build(self: Box<Self>, _ctx: &ParserContext<'_>) -> runtime_fields::Result<Arc<dyn RuntimeField>> {
        let parameters = FrozenParameters::capture(&self.parameters());
        Ok(Arc::new(StrictKeywordField {
            name: self.base.name().to_string(),
            parameters,
        }))
    }
}

#[derive(Debug)]
struct StrictKeywordField {
    name: String,
    parameters: FrozenParameters,
}

impl RuntimeField for StrictKeywordField {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        "strict_keyword"
    }

    fn queryable_fields(&self) -> Vec<QueryableField> {
        vec![QueryableField::new(self.name.clone(), "keyword")]
    }

    fn write_parameters(&self, include_defaults: bool, out: &mut Map<String, Value>) {
        self.parameters.write(include_defaults, out);
    }
}

#[test]
fn test_custom_type_with_boolean_parameter() {
    let mut registry = TypeRegistry::with_builtin_types();
    registry.register(
        "strict_keyword",
        TypeParser::new(|name| Box::new(StrictKeywordBuilder::new(name))),
    );
    let ctx = ParserContext::new(&registry, &NoopSink);

    let parsed = parse_with(
        &json!({"tag": {"type": "strict_keyword", "strict": "true"}, "plain": {"type": "strict_keyword"}}),
        &ctx,
        false,
    )
    .unwrap();

    assert_eq!(
        parsed.to_xcontent(false),
        json!({"tag": {"type": "strict_keyword", "strict": true}, "plain": {"type": "strict_keyword"}})
    );
    assert_eq!(parsed.get("plain").unwrap().to_xcontent(true)["plain"]["strict"], json!(false));

    let err = parse_with(&json!({"tag": {"type": "strict_keyword", "strict": "yes"}}), &ctx, false).unwrap_err();
    assert!(matches!(err, MappingError::Validation { ref parameter, .. } if parameter == "strict"));
}

#[test]
fn test_round_trip_with_defaults() {
    let registry = TypeRegistry::with_builtin_types();
    let ctx = ParserContext::new(&registry, &NoopSink);
    let input = json!({
        "when": {
            "type": "date",
            "script": {"source": "emit(doc['ts'].value)", "params": {"offset": 3}},
            "format": "yyyy-MM-dd",
            "meta": {"unit": "day"}
        },
        "http": {
            "type": "composite",
            "script": "emit(...)",
            "fields": {"clientip": {"type": "ip"}, "ts": {"type": "date"}}
        },
        "flag": {"type": "boolean"}
    });

    let parsed = parse_with(&input, &ctx, false).unwrap();
    let rendered = parsed.to_xcontent(true);
    let reparsed = parse_with(&rendered, &ctx, false).unwrap();

    assert_eq!(reparsed.to_xcontent(true), rendered);
    assert_eq!(reparsed.to_xcontent(false), parsed.to_xcontent(false));
    assert_eq!(rendered["flag"]["meta"], json!({}));
    assert_eq!(rendered["when"]["locale"], json!("ROOT"));
    assert!(parsed.to_xcontent(false)["when"].get("locale").is_none());
}

#[test]
fn test_invalid_meta_and_date_format() {
    let registry = TypeRegistry::with_builtin_types();
    let ctx = ParserContext::new(&registry, &NoopSink);

    let too_many = json!({"age": {"type": "long", "meta": {"a": "1", "b": "2", "c": "3", "d": "4", "e": "5", "f": "6"}}});
    assert!(matches!(
        parse_with(&too_many, &ctx, false).unwrap_err(),
        MappingError::Validation { ref parameter, .. } if parameter == "meta"
    ));

    let not_string = json!({"age": {"type": "long", "meta": {"unit": 5}}});
    assert!(matches!(
        parse_with(&not_string, &ctx, false).unwrap_err(),
        MappingError::Validation { ref parameter, .. } if parameter == "meta"
    ));

    let bad_format = json!({"when": {"type": "date", "format": "yyyy-MM-dd'T"}});
    assert!(matches!(
        parse_with(&bad_format, &ctx, false).unwrap_err(),
        MappingError::Validation { ref parameter, .. } if parameter == "format"
    ));
}

#[test]
fn test_section_updates() {
    let registry = TypeRegistry::with_builtin_types();
    let ctx = ParserContext::new(&registry, &NoopSink);
    let mut section = RuntimeSection::new();

    section
        .apply(parse_with(&json!({"age": {"type": "long"}, "tag": {"type": "keyword"}}), &ctx, true).unwrap())
        .unwrap();
    section
        .apply(parse_with(&json!({"age": null}), &ctx, true).unwrap())
        .unwrap();

    assert_eq!(section.names().collect::<Vec<_>>(), vec!["tag"]);
}

#[test]
fn test_yaml_document_matches_in_memory_map() {
    let yaml = r#"
supports_removal: true
runtime:
  day_of_week:
    type: keyword
    script:
      source: "emit(doc['@timestamp'].value.dayOfWeekEnum.toString())"
  http:
    type: composite
    script: "emit(...)"
    fields:
      clientip:
        type: ip
  legacy: null
"#;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    let doc = RuntimeDocument::load_from_file(file.path()).unwrap();
    let registry = TypeRegistry::with_builtin_types();
    let from_file = doc.parse(&registry, &NoopSink).unwrap();

    let ctx = ParserContext::new(&registry, &NoopSink);
    let in_memory = parse_with(
        &json!({
            "day_of_week": {
                "type": "keyword",
                "script": {"source": "emit(doc['@timestamp'].value.dayOfWeekEnum.toString())"}
            },
            "http": {"type": "composite", "script": "emit(...)", "fields": {"clientip": {"type": "ip"}}},
            "legacy": null
        }),
        &ctx,
        true,
    )
    .unwrap();

    assert_eq!(from_file.to_xcontent(true), in_memory.to_xcontent(true));
    assert_eq!(
        from_file.field_types().unwrap().keys().collect::<Vec<_>>(),
        vec!["day_of_week", "http.clientip"]
    );
}
