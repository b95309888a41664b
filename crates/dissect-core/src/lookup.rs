//! Name lookup for entities of the document-management system.
//!
//! Checks compare names as plain strings and never consult a lookup. It is
//! used for editor suggestions, for flagging names that do not exist, and
//! for the data type of custom fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::pattern::{Check, FieldKind, Pattern};

/// Kinds of named entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Tags,
    Correspondents,
    DocumentTypes,
    StoragePaths,
    CustomFields,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tags => "tags",
            Category::Correspondents => "correspondents",
            Category::DocumentTypes => "document_types",
            Category::StoragePaths => "storage_paths",
            Category::CustomFields => "custom_fields",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedElement {
    pub id: u64,
    pub name: String,

    /// Data type name, custom fields only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

impl NamedElement {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            data_type: None,
        }
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }
}

/// Source of entity names.
pub trait NameLookup: Send + Sync {
    /// List all entities of a category.
    fn list(&self, category: Category) -> Vec<NamedElement>;

    /// Find an entity by exact name.
    fn find(&self, category: Category, name: &str) -> Option<NamedElement> {
        self.list(category).into_iter().find(|e| e.name == name)
    }
}

/// In-memory name lookup, loadable from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub tags: Vec<NamedElement>,
    pub correspondents: Vec<NamedElement>,
    pub document_types: Vec<NamedElement>,
    pub storage_paths: Vec<NamedElement>,
    pub custom_fields: Vec<NamedElement>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a catalog from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Add an entity.
    pub fn with(mut self, category: Category, element: NamedElement) -> Self {
        self.elements_mut(category).push(element);
        self
    }

    fn elements(&self, category: Category) -> &[NamedElement] {
        match category {
            Category::Tags => &self.tags,
            Category::Correspondents => &self.correspondents,
            Category::DocumentTypes => &self.document_types,
            Category::StoragePaths => &self.storage_paths,
            Category::CustomFields => &self.custom_fields,
        }
    }

    fn elements_mut(&mut self, category: Category) -> &mut Vec<NamedElement> {
        match category {
            Category::Tags => &mut self.tags,
            Category::Correspondents => &mut self.correspondents,
            Category::DocumentTypes => &mut self.document_types,
            Category::StoragePaths => &mut self.storage_paths,
            Category::CustomFields => &mut self.custom_fields,
        }
    }
}

impl NameLookup for Catalog {
    fn list(&self, category: Category) -> Vec<NamedElement> {
        self.elements(category).to_vec()
    }

    fn find(&self, category: Category, name: &str) -> Option<NamedElement> {
        self.elements(category).iter().find(|e| e.name == name).cloned()
    }
}

/// Get entities whose name starts with `prefix` (case-insensitive), sorted
/// by name.
pub fn suggest(lookup: &dyn NameLookup, category: Category, prefix: &str) -> Vec<NamedElement> {
    let prefix = prefix.to_lowercase();
    let mut found: Vec<NamedElement> = lookup
        .list(category)
        .into_iter()
        .filter(|e| e.name.to_lowercase().starts_with(&prefix))
        .collect();
    found.sort_by(|a, b| a.name.cmp(&b.name));
    found
}

/// A name used in a pattern that the lookup does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownName {
    pub category: Category,
    pub name: String,
}

/// List the names referenced by `pattern`'s checks and custom fields that do
/// not resolve, in check order.
pub fn unknown_names(pattern: &Pattern, lookup: &dyn NameLookup) -> Vec<UnknownName> {
    let mut referenced: Vec<(Category, &str)> = Vec::new();

    for check in &pattern.checks {
        check.walk(&mut |node| match node {
            Check::Correspondent { name } => referenced.push((Category::Correspondents, name.as_str())),
            Check::DocumentType { name } => referenced.push((Category::DocumentTypes, name.as_str())),
            Check::StoragePath { name } => referenced.push((Category::StoragePaths, name.as_str())),
            Check::Tags { includes, excludes } => {
                for tag in includes.iter().chain(excludes) {
                    referenced.push((Category::Tags, tag.as_str()));
                }
            }
            _ => {}
        });
    }
    for field in &pattern.fields {
        if field.kind == FieldKind::Custom {
            referenced.push((Category::CustomFields, field.name.as_str()));
        }
    }

    let mut unknown: Vec<UnknownName> = Vec::new();
    for (category, name) in referenced {
        let known = lookup.find(category, name).is_some();
        let reported = unknown.iter().any(|u| u.category == category && u.name == name);
        if !known && !reported {
            unknown.push(UnknownName {
                category,
                name: name.to_string(),
            });
        }
    }
    unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pattern::Field;
    use pretty_assertions::assert_eq;

    fn catalog() -> Catalog {
        Catalog::new()
            .with(Category::Tags, NamedElement::new(1, "inbox"))
            .with(Category::Tags, NamedElement::new(2, "Insurance"))
            .with(Category::Tags, NamedElement::new(3, "finance"))
            .with(Category::Correspondents, NamedElement::new(1, "ACME"))
            .with(
                Category::CustomFields,
                NamedElement::new(1, "Total").with_data_type("monetary"),
            )
    }

    #[test]
    fn test_suggest() {
        let names: Vec<String> = suggest(&catalog(), Category::Tags, "IN")
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Insurance".to_string(), "inbox".to_string()]);

        assert_eq!(suggest(&catalog(), Category::Tags, "").len(), 3);
        assert!(suggest(&catalog(), Category::StoragePaths, "").is_empty());
    }

    #[test]
    fn test_find() {
        let catalog = catalog();
        let total = catalog.find(Category::CustomFields, "Total").unwrap();
        assert_eq!(total.data_type.as_deref(), Some("monetary"));
        assert!(catalog.find(Category::Correspondents, "acme").is_none());
    }

    #[test]
    fn test_unknown_names() {
        let pattern = Pattern {
            checks: vec![
                Check::Correspondent {
                    name: "ACME".to_string(),
                },
                Check::not(Check::Tags {
                    includes: vec!["inbox".to_string(), "tax".to_string()],
                    excludes: vec!["tax".to_string()],
                }),
                Check::DocumentType {
                    name: "Invoice".to_string(),
                },
            ],
            fields: vec![
                Field {
                    kind: FieldKind::Custom,
                    name: "Total".to_string(),
                    template: "{{ amt }}".to_string(),
                },
                Field {
                    kind: FieldKind::Attr,
                    name: "title".to_string(),
                    template: "{{ nr }}".to_string(),
                },
            ],
            ..Pattern::new("Invoices")
        };

        let unknown = unknown_names(&pattern, &catalog());
        assert_eq!(
            unknown,
            vec![
                UnknownName {
                    category: Category::Tags,
                    name: "tax".to_string(),
                },
                UnknownName {
                    category: Category::DocumentTypes,
                    name: "Invoice".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_catalog_json() {
        let catalog = Catalog::from_json(
            r#"{"custom_fields": [{"id": 4, "name": "Due", "data_type": "date"}]}"#,
        )
        .unwrap();
        assert_eq!(catalog.custom_fields[0].data_type.as_deref(), Some("date"));
        assert!(catalog.tags.is_empty());
    }
}
