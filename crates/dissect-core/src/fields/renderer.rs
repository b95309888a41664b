//! Template rendering for field values.
//!
//! Templates use the Jinja2 language. Region group values are top-level
//! variables and document metadata lives under `document`:
//!
//! ```text
//! {{ amount | parse_monetary }}
//! {{ date | parse_date("%d.%m.%Y") }}
//! {% if nr is defined %}{{ nr }}{% else %}{{ document.title }}{% endif %}
//! ```

use std::collections::BTreeMap;

use minijinja::{Environment, Error, ErrorKind, UndefinedBehavior, Value};
use serde_json::{Map, Value as JsonValue};

use super::filters::Filter;
use crate::error::FieldError;

/// Values a template can refer to, by name.
///
/// A dotted key such as `document.title` is exposed as attribute `title` of
/// the variable `document`.
pub type RenderContext = BTreeMap<String, String>;

/// Renders a field template against a context.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, context: &RenderContext) -> Result<String, FieldError>;
}

/// Jinja2 renderer with the `parse_monetary`, `parse_date` and `trim` filters.
///
/// Using an undefined variable is an error. Use `is defined` or the
/// `default` filter for optional values.
#[derive(Clone)]
pub struct JinjaRenderer {
    env: Environment<'static>,
}

impl JinjaRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_filter("parse_monetary", |value: Value| {
            apply(&Filter::ParseMonetary, &value)
        });
        env.add_filter("parse_date", |value: Value, format: Option<String>| {
            apply(&Filter::ParseDate(format), &value)
        });
        env.add_filter("trim", |value: Value| apply(&Filter::Trim, &value));
        Self { env }
    }
}

impl Default for JinjaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for JinjaRenderer {
    fn render(&self, template: &str, context: &RenderContext) -> Result<String, FieldError> {
        let compiled = self
            .env
            .template_from_str(template)
            .map_err(|e| to_field_error(e, || None))?;

        compiled.render(to_value(context)).map_err(|e| {
            to_field_error(e, || {
                let mut missing: Vec<String> = compiled
                    .undeclared_variables(true)
                    .into_iter()
                    .filter(|name| !is_defined(context, name))
                    .collect();
                missing.sort();
                missing.into_iter().next()
            })
        })
    }
}

/// Run a filter on a template value.
fn apply(filter: &Filter, value: &Value) -> Result<String, Error> {
    if value.is_undefined() {
        return Err(Error::from(ErrorKind::UndefinedError));
    }
    let text = match value.as_str() {
        Some(text) => text.to_string(),
        None => value.to_string(),
    };
    filter
        .apply(&text)
        .map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()).with_source(e))
}

/// Nest dotted keys into objects.
fn to_value(context: &RenderContext) -> JsonValue {
    let mut root = Map::new();
    let mut nested: BTreeMap<&str, Map<String, JsonValue>> = BTreeMap::new();

    for (key, value) in context {
        match key.split_once('.') {
            Some((outer, inner)) => {
                nested
                    .entry(outer)
                    .or_default()
                    .insert(inner.to_string(), JsonValue::String(value.clone()));
            }
            None => {
                root.insert(key.clone(), JsonValue::String(value.clone()));
            }
        }
    }
    for (outer, inner) in nested {
        root.insert(outer.to_string(), JsonValue::Object(inner));
    }

    JsonValue::Object(root)
}

/// Check if `name`, possibly dotted, resolves in the context.
fn is_defined(context: &RenderContext, name: &str) -> bool {
    context.contains_key(name) || {
        let prefix = format!("{}.", name);
        context.keys().any(|key| key.starts_with(&prefix))
    }
}

fn to_field_error(err: Error, missing_name: impl FnOnce() -> Option<String>) -> FieldError {
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        if let Some(field_error) = cause.downcast_ref::<FieldError>() {
            return field_error.clone();
        }
        source = cause.source();
    }

    let detail = err.detail().map(str::to_string).unwrap_or_else(|| err.to_string());
    match err.kind() {
        ErrorKind::UndefinedError => FieldError::UndefinedVariable(missing_name().unwrap_or(detail)),
        ErrorKind::UnknownFilter => FieldError::UnknownFilter(detail),
        ErrorKind::SyntaxError => FieldError::Syntax(detail),
        _ => FieldError::Template(err.to_string()),
    }
}
