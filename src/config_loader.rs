//! Runtime section document loader.
//!
//! Loads a runtime section and its parse settings from YAML (or JSON, which
//! YAML accepts as well).
//!
//! ```yaml
//! index_version: "7.10.0"
//! from_dynamic_template: false
//! supports_removal: true
//! runtime:
//!   day_of_week:
//!     type: keyword
//!     script: "emit(doc['@timestamp'].value.dayOfWeekEnum.toString())"
//!   legacy: null
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::context::ParserContext;
use crate::diagnostics::DiagnosticSink;
use crate::error::Result;
use crate::field_set::{parse_runtime_fields, ParsedFieldSet};
use crate::registry::TypeRegistry;
use crate::version::Version;

/// A runtime section together with the settings it should be parsed with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeDocument {
    /// Version the document was created with (defaults to the current version)
    #[serde(default)]
    pub index_version: Option<Version>,

    /// Whether the section comes from a dynamic template expansion
    #[serde(default)]
    pub from_dynamic_template: bool,

    /// Whether `null` definitions (removals) are accepted
    #[serde(default)]
    pub supports_removal: bool,

    /// Field name -> definition
    #[serde(default)]
    pub runtime: Map<String, Value>,
}

impl RuntimeDocument {
    /// Load a runtime document from a YAML or JSON file.
    ///
    /// # Arguments
    /// * `path` - Path to the document
    ///
    /// # Errors
    /// Returns error if the file can't be read or has an invalid format
    ///
    /// # Example
    /// ```ignore
    /// use runtime_fields::RuntimeDocument;
    ///
    /// let doc = RuntimeDocument::load_from_file("config/runtime.yaml")?;
    /// println!("{} runtime fields", doc.runtime.len());
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, String> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read runtime document {}: {}", path.display(), e))?;

        Self::from_yaml_str(&contents)
            .map_err(|e| format!("Invalid runtime document {}: {}", path.display(), e))
    }

    /// Parse a runtime document from YAML or JSON text.
    pub fn from_yaml_str(contents: &str) -> std::result::Result<Self, String> {
        serde_yaml::from_str(contents).map_err(|e| format!("Failed to parse YAML: {}", e))
    }

    pub fn index_version(&self) -> Version {
        self.index_version.unwrap_or_default()
    }

    /// Parser context for this document's settings.
    pub fn context<'a>(
        &self,
        registry: &'a TypeRegistry,
        diagnostics: &'a dyn DiagnosticSink,
    ) -> ParserContext<'a> {
        ParserContext::new(registry, diagnostics)
            .with_index_version(self.index_version())
            .with_dynamic_template(self.from_dynamic_template)
    }

    /// Parse the `runtime` section with this document's settings.
    pub fn parse(
        &self,
        registry: &TypeRegistry,
        diagnostics: &dyn DiagnosticSink,
    ) -> Result<ParsedFieldSet> {
        let ctx = self.context(registry, diagnostics);
        parse_runtime_fields(&self.runtime, &ctx, self.supports_removal)
    }
}
