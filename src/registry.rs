//! Type registry mapping runtime field type names to builder factories.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::builder::{FieldBuilder, Residual};
use crate::context::ParserContext;
use crate::error::Result;
use crate::field::RuntimeField;

type BuilderFactory = dyn Fn(&str) -> Box<dyn FieldBuilder> + Send + Sync;

/// Parser for one runtime field type.
///
/// Wraps a factory that creates a fresh builder for a given field name.
#[derive(Clone)]
pub struct TypeParser {
    factory: Arc<BuilderFactory>,
}

impl TypeParser {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&str) -> Box<dyn FieldBuilder> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
        }
    }

    /// Fresh, unparsed builder for `name`.
    pub fn builder(&self, name: &str) -> Box<dyn FieldBuilder> {
        (self.factory)(name)
    }

    /// Parse one field definition.
    ///
    /// # Arguments
    ///
    /// * `name` - Runtime field name
    /// * `node` - Field definition, including its `type` attribute
    /// * `ctx` - Parser context
    ///
    /// # Returns
    ///
    /// The sealed field together with the attributes its builder left unconsumed
    pub fn parse(
        &self,
        name: &str,
        node: &Map<String, Value>,
        ctx: &ParserContext<'_>,
    ) -> Result<(Arc<dyn RuntimeField>, Residual)> {
        let mut builder = self.builder(name);
        let residual = builder.parse(ctx, node)?;
        let field = builder.build(ctx)?;
        Ok((field, residual))
    }
}

impl fmt::Debug for TypeParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TypeParser")
    }
}

/// Registry of runtime field types.
///
/// Read-only while parsing, so one registry can back any number of concurrent
/// parses.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    parsers: HashMap<String, TypeParser>,
}

impl TypeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Registry holding every built-in runtime field type.
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        crate::types::register_builtin_types(&mut registry);
        registry
    }

    /// Register a parser, replacing any previous one with the same type name.
    ///
    /// # Example
    ///
    /// ```
    /// use runtime_fields::{LeafFieldBuilder, LeafType, TypeParser, TypeRegistry};
    ///
    /// let mut registry = TypeRegistry::new();
    /// registry.register(
    ///     "long",
    ///     TypeParser::new(|name| Box::new(LeafFieldBuilder::new(name, LeafType::Long))),
    /// );
    /// assert!(registry.contains("long"));
    /// ```
    pub fn register(&mut self, type_name: impl Into<String>, parser: TypeParser) {
        self.parsers.insert(type_name.into(), parser);
    }

    pub fn get(&self, type_name: &str) -> Option<&TypeParser> {
        self.parsers.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.parsers.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.parsers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}
