//! Field rendering.
//!
//! Fields turn the retained values of a pattern's regions into values for the
//! document-management system, through a [`TemplateRenderer`].

mod data_type;
mod filters;
mod renderer;

pub use data_type::DataType;
pub use filters::{parse_date, parse_monetary, Filter, DEFAULT_DATE_FORMAT};
pub use renderer::{JinjaRenderer, RenderContext, TemplateRenderer};

use tracing::debug;

use crate::lookup::{Category, NameLookup};
use crate::models::document::Document;
use crate::models::pattern::{Field, FieldKind};
use crate::models::results::{FieldResult, RegionResult};

/// Build the render context for a document.
///
/// Group values of every retained result are merged in region order, so a
/// later region wins on a name clash. Document metadata is stored under
/// `document.*` keys, which templates read as `document.title` and so on.
/// Unset metadata is left out.
pub fn build_context(document: &Document, retained: &[Option<&RegionResult>]) -> RenderContext {
    let mut context = RenderContext::new();

    for result in retained.iter().flatten() {
        if let Some(values) = &result.group_values {
            context.extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }

    let mut put = |key: &str, value: Option<String>| {
        if let Some(value) = value {
            context.insert(format!("document.{}", key), value);
        }
    };
    put("id", Some(document.id.to_string()));
    put("title", Some(document.title.clone()));
    put("correspondent", document.correspondent.clone());
    put("document_type", document.document_type.clone());
    put("storage_path", document.storage_path.clone());
    put("date_created", document.date_created.map(|d| d.format("%Y-%m-%d").to_string()));

    context
}

/// Get the data type a field's value must convert to, if known.
pub fn field_data_type(field: &Field, lookup: Option<&dyn NameLookup>) -> Option<String> {
    match field.kind {
        FieldKind::Attr => match field.name.as_str() {
            "title" => Some(DataType::String.to_string()),
            "created" => Some(DataType::Date.to_string()),
            _ => None,
        },
        FieldKind::Custom => lookup
            .and_then(|lookup| lookup.find(Category::CustomFields, &field.name))
            .and_then(|element| element.data_type),
    }
}

/// Render one field. A blank template produces no result.
pub fn render_field(
    field: &Field,
    context: &RenderContext,
    renderer: &dyn TemplateRenderer,
    lookup: Option<&dyn NameLookup>,
) -> Option<FieldResult> {
    if field.template.trim().is_empty() {
        return None;
    }

    let data_type = field_data_type(field, lookup);

    let result = match renderer.render(&field.template, context) {
        Ok(value) => {
            // Unknown type names are passed through without validation
            let error = data_type
                .as_deref()
                .and_then(|name| name.parse::<DataType>().ok())
                .and_then(|dt| dt.validate(&value).err())
                .map(|e| e.to_string());
            FieldResult {
                data_type,
                value: Some(value),
                error,
            }
        }
        Err(e) => FieldResult {
            data_type,
            value: None,
            error: Some(e.to_string()),
        },
    };

    debug!("Field {:?} -> {:?}", field.name, result.value);
    Some(result)
}
