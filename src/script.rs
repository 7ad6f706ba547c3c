//! Script attached to a runtime field.
//!
//! The query engine evaluates the script to compute field values; this crate
//! only validates its shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Language assumed when a script does not name one.
pub const DEFAULT_SCRIPT_LANG: &str = "painless";

/// Inline script definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub source: String,
    pub lang: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl Script {
    pub fn inline(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            lang: DEFAULT_SCRIPT_LANG.to_string(),
            params: Map::new(),
        }
    }

    /// Parse a script from either a bare source string or an object with
    /// `source`, optional `lang` and optional `params`.
    ///
    /// # Example
    ///
    /// ```
    /// use runtime_fields::Script;
    /// use serde_json::json;
    ///
    /// let script = Script::parse(&json!({"source": "emit(1)", "params": {"x": 2}})).unwrap();
    /// assert_eq!(script.lang, "painless");
    /// assert_eq!(script.params["x"], json!(2));
    /// ```
    pub fn parse(raw: &Value) -> Result<Self, String> {
        match raw {
            Value::String(source) => {
                if source.trim().is_empty() {
                    return Err("script source must not be empty".to_string());
                }
                Ok(Self::inline(source.clone()))
            }
            Value::Object(map) => {
                let mut source = None;
                let mut lang = DEFAULT_SCRIPT_LANG.to_string();
                let mut params = Map::new();

                for (key, value) in map {
                    match key.as_str() {
                        "source" => match value {
                            Value::String(s) if !s.trim().is_empty() => source = Some(s.clone()),
                            _ => return Err("script [source] must be a non-empty string".to_string()),
                        },
                        "lang" => match value {
                            Value::String(s) if !s.is_empty() => lang = s.clone(),
                            _ => return Err("script [lang] must be a non-empty string".to_string()),
                        },
                        "params" => match value {
                            Value::Object(p) => params = p.clone(),
                            _ => return Err("script [params] must be an object".to_string()),
                        },
                        other => return Err(format!("unknown key [{}] for script", other)),
                    }
                }

                let source = source.ok_or_else(|| "script must specify [source]".to_string())?;
                Ok(Self {
                    source,
                    lang,
                    params,
                })
            }
            other => Err(format!(
                "expected a string or an object for script but got a [{}]",
                crate::json_kind(other)
            )),
        }
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("source".to_string(), Value::String(self.source.clone()));
        map.insert("lang".to_string(), Value::String(self.lang.clone()));
        if !self.params.is_empty() {
            map.insert("params".to_string(), Value::Object(self.params.clone()));
        }
        Value::Object(map)
    }
}
