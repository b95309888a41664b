//! Document data as provided by the document source.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use super::pattern::Rectangle;

/// A positioned piece of text on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    #[serde(flatten)]
    pub rect: Rectangle,

    pub text: String,
}

impl TextRun {
    pub fn new(rect: Rectangle, text: impl Into<String>) -> Self {
        Self {
            rect,
            text: text.into(),
        }
    }
}

/// A single page of a document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Page {
    /// Page width in points.
    #[serde(default)]
    pub width: f64,

    /// Page height in points.
    #[serde(default)]
    pub height: f64,

    /// Text runs on this page, in extraction order.
    #[serde(default)]
    pub text_runs: Vec<TextRun>,
}

impl Page {
    pub fn new(width: f64, height: f64, text_runs: Vec<TextRun>) -> Self {
        Self {
            width,
            height,
            text_runs,
        }
    }
}

/// A parsed document with its metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub id: u64,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub correspondent: Option<String>,

    #[serde(default)]
    pub document_type: Option<String>,

    #[serde(default)]
    pub storage_path: Option<String>,

    /// Tag names.
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub date_created: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime_added: Option<DateTime<FixedOffset>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paperless_url: Option<String>,

    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Document {
    /// Load a document from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Check if the document carries a tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
