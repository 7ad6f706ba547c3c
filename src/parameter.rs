//! Typed parameter descriptors shared by all field builders.
//!
//! A [`Parameter`] knows its attribute name, its default, how to parse a raw
//! configuration value and how to write its current value back out. Builders
//! expose their parameters as `dyn AnyParameter` so the generic parse loop can
//! drive them without knowing the value types.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::script::Script;

/// Free-form string metadata carried by every runtime field.
pub type Meta = IndexMap<String, String>;

/// Attribute name of the metadata parameter.
pub const META: &str = "meta";

const META_MAX_ENTRIES: usize = 5;
const META_MAX_KEY_CHARS: usize = 20;
const META_MAX_VALUE_CHARS: usize = 50;

/// Parses a raw value for the named field.
pub type ParseFn<T> = fn(&str, &Value) -> Result<T, String>;
pub type SerializeFn<T> = fn(&T) -> Value;
pub type ValidateFn<T> = fn(&T) -> Result<(), String>;

/// A named, typed configuration attribute.
#[derive(Debug, Clone)]
pub struct Parameter<T> {
    name: &'static str,
    default: T,
    value: Option<T>,
    parser: ParseFn<T>,
    serializer: SerializeFn<T>,
    validator: Option<ValidateFn<T>>,
    accepts_null: bool,
}

impl<T: Clone + PartialEq> Parameter<T> {
    pub fn new(
        name: &'static str,
        default: T,
        parser: ParseFn<T>,
        serializer: SerializeFn<T>,
    ) -> Self {
        Self {
            name,
            default,
            value: None,
            parser,
            serializer,
            validator: None,
            accepts_null: false,
        }
    }

    /// Allow an explicit `null` in the configuration.
    pub fn accepts_null(mut self) -> Self {
        self.accepts_null = true;
        self
    }

    /// Run an extra check on every successfully parsed value.
    pub fn with_validator(mut self, validator: ValidateFn<T>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current value, or the default when never set.
    pub fn value(&self) -> &T {
        self.value.as_ref().unwrap_or(&self.default)
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    pub fn is_default(&self) -> bool {
        *self.value() == self.default
    }

    /// Parse and store a raw value.
    ///
    /// On error the previously stored value is kept.
    pub fn parse(&mut self, field: &str, raw: &Value) -> Result<(), String> {
        if raw.is_null() && !self.accepts_null {
            return Err(format!("[{}] must not have a [null] value", self.name));
        }
        let parsed = (self.parser)(field, raw)?;
        if let Some(validator) = self.validator {
            validator(&parsed)?;
        }
        self.value = Some(parsed);
        Ok(())
    }

    pub fn serialize(&self) -> Value {
        (self.serializer)(self.value())
    }
}

/// Type-erased view of a [`Parameter`].
pub trait AnyParameter {
    fn name(&self) -> &'static str;

    fn accepts_null(&self) -> bool;

    fn parse(&mut self, field: &str, raw: &Value) -> Result<(), String>;

    fn is_default(&self) -> bool;

    fn serialize(&self) -> Value;

    /// Write `name: value` into `out` unless the value is the default and
    /// defaults were not requested.
    fn to_xcontent(&self, include_defaults: bool, out: &mut Map<String, Value>) {
        if include_defaults || !self.is_default() {
            out.insert(self.name().to_string(), self.serialize());
        }
    }
}

impl<T: Clone + PartialEq> AnyParameter for Parameter<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn accepts_null(&self) -> bool {
        self.accepts_null
    }

    fn parse(&mut self, field: &str, raw: &Value) -> Result<(), String> {
        Parameter::parse(self, field, raw)
    }

    fn is_default(&self) -> bool {
        Parameter::is_default(self)
    }

    fn serialize(&self) -> Value {
        Parameter::serialize(self)
    }
}

impl Parameter<Meta> {
    /// The `meta` parameter every runtime field type inherits.
    pub fn meta() -> Self {
        Parameter::new(META, Meta::new(), parse_meta, serialize_meta)
    }
}

impl Parameter<String> {
    pub fn string(name: &'static str, default: &str) -> Self {
        Parameter::new(name, default.to_string(), parse_string, |v| {
            Value::String(v.clone())
        })
    }
}

impl Parameter<bool> {
    /// Boolean parameter for field types registered outside this crate; accepts
    /// `true`/`false` or their string forms.
    pub fn boolean(name: &'static str, default: bool) -> Self {
        Parameter::new(name, default, parse_bool, |v| Value::Bool(*v))
    }
}

impl Parameter<Option<Script>> {
    /// Optional `script` parameter; `null` means "no script".
    pub fn script() -> Self {
        Parameter::new("script", None, parse_script, |v| {
            v.as_ref().map(Script::to_value).unwrap_or(Value::Null)
        })
        .accepts_null()
    }
}

fn parse_string(_field: &str, raw: &Value) -> Result<String, String> {
    match raw {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!(
            "expected a string but got a [{}]",
            crate::json_kind(other)
        )),
    }
}

fn parse_bool(_field: &str, raw: &Value) -> Result<bool, String> {
    match raw {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s == "true" => Ok(true),
        Value::String(s) if s == "false" => Ok(false),
        other => Err(format!("expected [true] or [false] but got [{}]", other)),
    }
}

fn parse_script(_field: &str, raw: &Value) -> Result<Option<Script>, String> {
    if raw.is_null() {
        return Ok(None);
    }
    Script::parse(raw).map(Some)
}

fn parse_meta(field: &str, raw: &Value) -> Result<Meta, String> {
    let map = match raw {
        Value::Object(map) => map,
        other => {
            return Err(format!(
                "[meta] must be an object but got a [{}]",
                crate::json_kind(other)
            ))
        }
    };

    if map.len() > META_MAX_ENTRIES {
        return Err(format!(
            "[meta] can't have more than {} entries, but got {} on field [{}]",
            META_MAX_ENTRIES,
            map.len(),
            field
        ));
    }

    let mut meta = Meta::new();
    for (key, value) in map {
        if key.is_empty() {
            return Err(format!("[meta] keys can't be empty on field [{}]", field));
        }
        if key.chars().count() > META_MAX_KEY_CHARS {
            return Err(format!(
                "[meta] keys can't be longer than {} chars, but got [{}] for field [{}]",
                META_MAX_KEY_CHARS, key, field
            ));
        }
        let value = match value {
            Value::String(s) => s,
            other => {
                return Err(format!(
                    "[meta] values can only be strings, but got a [{}] for key [{}] on field [{}]",
                    crate::json_kind(other),
                    key,
                    field
                ))
            }
        };
        if value.chars().count() > META_MAX_VALUE_CHARS {
            return Err(format!(
                "[meta] values can't be longer than {} chars, but got [{}] for key [{}] on field [{}]",
                META_MAX_VALUE_CHARS, value, key, field
            ));
        }
        meta.insert(key.clone(), value.clone());
    }

    Ok(meta)
}

fn serialize_meta(meta: &Meta) -> Value {
    Value::Object(
        meta.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}
