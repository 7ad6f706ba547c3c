//! `date` runtime field with `format` and `locale` parameters.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::builder::{BuilderBase, FieldBuilder};
use crate::context::ParserContext;
use crate::error::Result;
use crate::field::{FrozenParameters, QueryableField, RuntimeField};
use crate::parameter::{AnyParameter, Meta, Parameter};
use crate::script::Script;
use crate::types::DATE;

pub const DEFAULT_DATE_FORMAT: &str = "strict_date_optional_time||epoch_millis";
pub const DEFAULT_LOCALE: &str = "ROOT";

const NAMED_FORMATS: &[&str] = &[
    "epoch_millis",
    "epoch_second",
    "date_optional_time",
    "strict_date_optional_time",
    "strict_date_optional_time_nanos",
    "basic_date",
    "basic_date_time",
    "basic_date_time_no_millis",
    "date",
    "strict_date",
    "date_time",
    "strict_date_time",
    "date_time_no_millis",
    "strict_date_time_no_millis",
    "date_hour_minute_second",
    "strict_date_hour_minute_second",
    "date_hour_minute_second_millis",
    "strict_date_hour_minute_second_millis",
    "hour_minute_second",
    "strict_hour_minute_second",
    "time",
    "strict_time",
    "week_date",
    "strict_week_date",
    "year",
    "strict_year",
    "year_month",
    "strict_year_month",
    "year_month_day",
    "strict_year_month_day",
    "ordinal_date",
    "strict_ordinal_date",
];

// Unquoted letters must be pattern letters; anything quoted or non-alphabetic passes.
const PATTERN_REGEX: &str = r"^(?:[GuyDMLdQqYwWEecFahKkHmsSAnNVzOXxZp]|'[^']*'|[^A-Za-z'])+$";
const LOCALE_REGEX: &str = r"^(?:ROOT|[a-z]{2,3}(?:[_-][A-Z]{2})?)$";

thread_local! {
    static PATTERN: Regex = Regex::new(PATTERN_REGEX).expect("Failed to compile date pattern regex");
    static LOCALE: Regex = Regex::new(LOCALE_REGEX).expect("Failed to compile locale regex");
}

/// Date parsing settings handed to the query engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateFormat {
    pub pattern: String,
    pub locale: String,
}

impl Default for DateFormat {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_DATE_FORMAT.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

/// Check a `||` separated list of named formats or date patterns.
pub fn validate_date_format(format: &String) -> std::result::Result<(), String> {
    for element in format.split("||") {
        if element.trim().is_empty() {
            return Err(format!("empty date format in [{}]", format));
        }
        if NAMED_FORMATS.contains(&element) {
            continue;
        }
        if !PATTERN.with(|pattern| pattern.is_match(element)) {
            return Err(format!("Invalid format: [{}]: unknown pattern [{}]", format, element));
        }
    }
    Ok(())
}

pub fn validate_locale(locale: &String) -> std::result::Result<(), String> {
    if LOCALE.with(|pattern| pattern.is_match(locale)) {
        Ok(())
    } else {
        Err(format!("unsupported locale [{}]", locale))
    }
}

#[derive(Debug, Clone)]
pub struct DateFieldBuilder {
    base: BuilderBase,
    script: Parameter<Option<Script>>,
    format: Parameter<String>,
    locale: Parameter<String>,
}

impl DateFieldBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            base: BuilderBase::new(name),
            script: Parameter::script(),
            format: Parameter::string("format", DEFAULT_DATE_FORMAT)
                .with_validator(validate_date_format),
            locale: Parameter::string("locale", DEFAULT_LOCALE).with_validator(validate_locale),
        }
    }
}

impl FieldBuilder for DateFieldBuilder {
    fn base(&self) -> &BuilderBase {
        &self.base
    }

    fn type_name(&self) -> &'static str {
        DATE
    }

    fn parameters(&self) -> Vec<&dyn AnyParameter> {
        self.base.parameters(vec![
            &self.script as &dyn AnyParameter,
            &self.format as &dyn AnyParameter,
            &self.locale as &dyn AnyParameter,
        ])
    }

    fn parameters_mut(&mut self) -> Vec<&mut dyn AnyParameter> {
        self.base.parameters_mut(vec![
            &mut self.script as &mut dyn AnyParameter,
            &mut self.format as &mut dyn AnyParameter,
            &mut self.locale as &mut dyn AnyParameter,
        ])
    }

    fn build(self: Box<Self>, _ctx: &ParserContext<'_>) -> Result<Arc<dyn RuntimeField>> {
        let parameters = FrozenParameters::capture(&self.parameters());
        Ok(Arc::new(DateField {
            name: self.base.name().to_string(),
            meta: self.base.meta.value().clone(),
            script: self.script.value().clone(),
            format: DateFormat {
                pattern: self.format.value().clone(),
                locale: self.locale.value().clone(),
            },
            parameters,
        }))
    }
}

/// Sealed `date` runtime field.
#[derive(Debug, Clone)]
pub struct DateField {
    name: String,
    meta: Meta,
    script: Option<Script>,
    format: DateFormat,
    parameters: FrozenParameters,
}

impl DateField {
    pub fn format(&self) -> &DateFormat {
        &self.format
    }
}

impl RuntimeField for DateField {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        DATE
    }

    fn queryable_fields(&self) -> Vec<QueryableField> {
        vec![QueryableField::new(&self.name, DATE)
            .with_meta(self.meta.clone())
            .with_script(self.script.clone())
            .with_format(self.format.clone())]
    }

    fn write_parameters(&self, include_defaults: bool, out: &mut Map<String, Value>) {
        self.parameters.write(include_defaults, out);
    }
}
