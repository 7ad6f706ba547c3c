//! Collection of the queryable fields exposed by a set of runtime fields.

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::error::{MappingError, Result};
use crate::field::{QueryableField, RuntimeField};

/// Collect every queryable field exposed by `runtime_fields`, keyed by name.
///
/// Two checks run across the whole set:
///
/// 1. Every queryable field must be named after its runtime field, or be a
///    sub-field `<name>.<sub>`. Violations are reported together as
///    [`MappingError::SubFieldNaming`], a defect in the field type.
/// 2. No queryable field name may be produced twice
///    ([`MappingError::DuplicateFieldName`]).
///
/// # Example
///
/// ```
/// use runtime_fields::{collect_field_types, parse_runtime_fields, NoopSink, ParserContext, TypeRegistry};
/// use serde_json::json;
///
/// let registry = TypeRegistry::with_builtin_types();
/// let ctx = ParserContext::new(&registry, &NoopSink);
/// let node = json!({"age": {"type": "long"}, "tag": {"type": "keyword"}});
/// let parsed = parse_runtime_fields(node.as_object().unwrap(), &ctx, false).unwrap();
///
/// let catalogue = collect_field_types(parsed.definitions()).unwrap();
/// assert_eq!(catalogue.keys().collect::<Vec<_>>(), vec!["age", "tag"]);
/// ```
pub fn collect_field_types<'a, I>(runtime_fields: I) -> Result<IndexMap<String, QueryableField>>
where
    I: IntoIterator<Item = &'a dyn RuntimeField>,
{
    let mut exposed: Vec<QueryableField> = Vec::new();
    let mut violations: Vec<String> = Vec::new();

    for runtime_field in runtime_fields {
        let parent = runtime_field.name();
        for field in runtime_field.queryable_fields() {
            if !field.belongs_to(parent) {
                violations.push(field.name.clone());
            }
            exposed.push(field);
        }
    }

    if !violations.is_empty() {
        return Err(MappingError::SubFieldNaming { names: violations });
    }

    let mut collected = IndexMap::new();
    for field in exposed {
        match collected.entry(field.name.clone()) {
            Entry::Occupied(entry) => {
                return Err(MappingError::DuplicateFieldName {
                    name: entry.key().clone(),
                })
            }
            Entry::Vacant(entry) => {
                entry.insert(field);
            }
        }
    }

    Ok(collected)
}
