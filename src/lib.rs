//! # Runtime Fields: computed field definitions for document mappings
//!
//! A runtime section maps field names to definitions whose values are computed
//! by a script at query time instead of being indexed. This crate parses such
//! sections into sealed field definitions and works out the queryable fields
//! they expose.
//!
//! ## Features
//!
//! - **Typed parameters**: each field type declares named parameters with
//!   defaults, parsers, validators and serializers
//! - **Type registry**: field types are registered by name and dispatched on the
//!   definition's `type` key
//! - **Removal markers**: `null` definitions request removal on mapping updates
//! - **Legacy dynamic templates**: unknown parameters in templates of indices
//!   created before 8.0.0 are dropped with a deprecation warning
//! - **Field-type collection**: union of every exposed queryable field, with
//!   sub-field naming and duplicate checks
//!
//! ## Example: runtime section
//!
//! ```yaml
//! runtime:
//!   day_of_week:
//!     type: keyword
//!     script: "emit(doc['@timestamp'].value.dayOfWeekEnum.toString())"
//!   http:
//!     type: composite
//!     script: "emit(grok('%{COMMONAPACHELOG}').extract(params._source.message))"
//!     fields:
//!       clientip: { type: ip }
//!       verb: { type: keyword }
//! ```
//!
//! ## Example: parsing
//!
//! ```
//! use runtime_fields::{parse_runtime_fields, NoopSink, ParserContext, TypeRegistry};
//! use serde_json::json;
//!
//! let registry = TypeRegistry::with_builtin_types();
//! let ctx = ParserContext::new(&registry, &NoopSink);
//! let node = json!({
//!     "http": {
//!         "type": "composite",
//!         "script": "emit(...)",
//!         "fields": {"clientip": {"type": "ip"}, "verb": {"type": "keyword"}}
//!     }
//! });
//!
//! let parsed = parse_runtime_fields(node.as_object().unwrap(), &ctx, false).unwrap();
//! let types = parsed.field_types().unwrap();
//! assert_eq!(types.keys().collect::<Vec<_>>(), vec!["http.clientip", "http.verb"]);
//! ```

// Core modules
pub mod error;
pub mod version;
pub mod diagnostics;
pub mod script;
pub mod parameter;

// Field definitions and their builders
pub mod field;
pub mod builder;
pub mod context;
pub mod registry;
pub mod types;

// Runtime sections
pub mod field_set;
pub mod collector;
pub mod section;
pub mod config_loader;

// Re-export commonly used types
pub use builder::{BuilderBase, FieldBuilder, Residual};
pub use collector::collect_field_types;
pub use config_loader::RuntimeDocument;
pub use context::ParserContext;
pub use diagnostics::{CollectingSink, Deprecation, DiagnosticSink, NoopSink, TracingSink};
pub use error::{MappingError, Result};
pub use field::{FrozenParameters, QueryableField, RuntimeField};
pub use field_set::{parse_runtime_fields, ParsedFieldSet};
pub use parameter::{AnyParameter, Meta, Parameter};
pub use registry::{TypeParser, TypeRegistry};
pub use script::Script;
pub use section::RuntimeSection;
pub use types::{
    CompositeField, CompositeFieldBuilder, DateField, DateFieldBuilder, DateFormat, LeafField,
    LeafFieldBuilder, LeafType,
};
pub use version::Version;

use serde_json::Value;

/// Name of a JSON value's kind, as used in error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
