//! Parser context threaded through every runtime field parse.

use std::fmt;

use crate::diagnostics::DiagnosticSink;
use crate::registry::{TypeParser, TypeRegistry};
use crate::version::Version;

/// Caller supplied environment for parsing one runtime section.
///
/// Borrows the type registry and the diagnostic sink, so a context is cheap to
/// create per document and several contexts can share one registry across
/// threads.
#[derive(Clone, Copy)]
pub struct ParserContext<'a> {
    registry: &'a TypeRegistry,
    diagnostics: &'a dyn DiagnosticSink,
    index_version: Version,
    from_dynamic_template: bool,
}

impl<'a> ParserContext<'a> {
    /// Create a context for the current version, outside of dynamic templates.
    ///
    /// # Example
    ///
    /// ```
    /// use runtime_fields::{ParserContext, TracingSink, TypeRegistry, Version};
    ///
    /// let registry = TypeRegistry::with_builtin_types();
    /// let sink = TracingSink::new();
    /// let ctx = ParserContext::new(&registry, &sink)
    ///     .with_index_version(Version::new(7, 10, 0))
    ///     .with_dynamic_template(true);
    ///
    /// assert!(ctx.allows_legacy_unknown_parameters());
    /// ```
    pub fn new(registry: &'a TypeRegistry, diagnostics: &'a dyn DiagnosticSink) -> Self {
        Self {
            registry,
            diagnostics,
            index_version: Version::CURRENT,
            from_dynamic_template: false,
        }
    }

    pub fn with_index_version(mut self, index_version: Version) -> Self {
        self.index_version = index_version;
        self
    }

    pub fn with_dynamic_template(mut self, from_dynamic_template: bool) -> Self {
        self.from_dynamic_template = from_dynamic_template;
        self
    }

    /// Copy of this context flagged as coming from a dynamic template.
    pub fn dynamic_template_context(&self) -> Self {
        self.with_dynamic_template(true)
    }

    pub fn index_version(&self) -> Version {
        self.index_version
    }

    pub fn is_from_dynamic_template(&self) -> bool {
        self.from_dynamic_template
    }

    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    pub fn diagnostics(&self) -> &'a dyn DiagnosticSink {
        self.diagnostics
    }

    /// Parser registered for `type_name`, if any.
    pub fn type_parser(&self, type_name: &str) -> Option<&'a TypeParser> {
        self.registry.get(type_name)
    }

    /// Unknown parameters are dropped with a deprecation instead of rejected
    /// for dynamic template definitions of documents created before 8.0.0.
    pub fn allows_legacy_unknown_parameters(&self) -> bool {
        self.from_dynamic_template && self.index_version.before(Version::V_8_0_0)
    }
}

impl fmt::Debug for ParserContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserContext")
            .field("index_version", &self.index_version)
            .field("from_dynamic_template", &self.from_dynamic_template)
            .field("types", &self.registry.type_names())
            .finish()
    }
}
