//! Pattern definitions: regions, checks, and fields.
//!
//! The JSON shapes here are the contract with the pattern editor and must
//! round-trip without loss.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in page coordinates (points).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rectangle {
    pub fn new(x: f64, y: f64, x2: f64, y2: f64) -> Self {
        Self { x, y, x2, y2 }
    }

    /// Get the rectangle with inverted edges swapped back into place.
    pub fn normalized(&self) -> Self {
        Self {
            x: self.x.min(self.x2),
            y: self.y.min(self.y2),
            x2: self.x.max(self.x2),
            y2: self.y.max(self.y2),
        }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y
    }

    /// Check if the rectangle encloses no area.
    pub fn is_empty(&self) -> bool {
        !(self.x < self.x2 && self.y < self.y2)
    }

    /// Check if `other` lies entirely within this rectangle.
    ///
    /// The left and top edges are exclusive, the right and bottom edges
    /// inclusive: a rectangle starting exactly on `x` or `y` is outside.
    pub fn contains(&self, other: &Rectangle) -> bool {
        other.x > self.x && other.x2 <= self.x2 && other.y > self.y && other.y2 <= self.y2
    }
}

/// An extraction expression, in one of the two supported syntaxes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    /// Simple expression with `<name:kind>` placeholders.
    Simple(String),
    /// Raw regular expression.
    Regex(String),
}

impl ExpressionKind {
    /// Get the expression source text.
    pub fn source(&self) -> &str {
        match self {
            ExpressionKind::Simple(text) | ExpressionKind::Regex(text) => text,
        }
    }
}

/// Which of the two expression fields of a region is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionSyntax {
    #[default]
    Simple,
    Regex,
}

/// Expression fields of a region as stored by the editor.
///
/// Both texts are kept so that switching syntax in the editor does not lose
/// the other one; only the one selected by `kind` is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegionExpression {
    #[serde(default)]
    pub kind: ExpressionSyntax,
    #[serde(default)]
    pub simple_expr: Option<String>,
    #[serde(default)]
    pub regex_expr: Option<String>,
}

impl RegionExpression {
    /// Create an active simple expression.
    pub fn simple(expr: impl Into<String>) -> Self {
        Self {
            kind: ExpressionSyntax::Simple,
            simple_expr: Some(expr.into()),
            regex_expr: None,
        }
    }

    /// Create an active raw regex expression.
    pub fn regex(expr: impl Into<String>) -> Self {
        Self {
            kind: ExpressionSyntax::Regex,
            simple_expr: None,
            regex_expr: Some(expr.into()),
        }
    }

    /// Get the active expression. A missing text is the empty expression.
    pub fn active(&self) -> ExpressionKind {
        match self.kind {
            ExpressionSyntax::Simple => {
                ExpressionKind::Simple(self.simple_expr.clone().unwrap_or_default())
            }
            ExpressionSyntax::Regex => {
                ExpressionKind::Regex(self.regex_expr.clone().unwrap_or_default())
            }
        }
    }
}

impl From<ExpressionKind> for RegionExpression {
    fn from(expr: ExpressionKind) -> Self {
        match expr {
            ExpressionKind::Simple(text) => Self::simple(text),
            ExpressionKind::Regex(text) => Self::regex(text),
        }
    }
}

/// How a region picks the one page whose value is retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PageSelectorRepr", into = "PageSelectorRepr")]
pub enum PageSelector {
    /// A fixed 0-based page index.
    ExactPage(usize),
    FirstPage,
    LastPage,
    /// First page on which the expression matched.
    FirstMatch,
    /// Last page on which the expression matched.
    LastMatch,
}

impl Default for PageSelector {
    fn default() -> Self {
        Self::LastMatch
    }
}

/// Wire form of [`PageSelector`]: a page index or a policy name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum PageSelectorRepr {
    Index(i64),
    Named(NamedPage),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum NamedPage {
    FirstPage,
    LastPage,
    FirstMatch,
    LastMatch,
}

impl TryFrom<PageSelectorRepr> for PageSelector {
    type Error = String;

    fn try_from(repr: PageSelectorRepr) -> Result<Self, Self::Error> {
        match repr {
            // The editor historically encodes "last page" as -1.
            PageSelectorRepr::Index(-1) => Ok(PageSelector::LastPage),
            PageSelectorRepr::Index(index) => usize::try_from(index)
                .map(PageSelector::ExactPage)
                .map_err(|_| format!("invalid page index {}", index)),
            PageSelectorRepr::Named(NamedPage::FirstPage) => Ok(PageSelector::FirstPage),
            PageSelectorRepr::Named(NamedPage::LastPage) => Ok(PageSelector::LastPage),
            PageSelectorRepr::Named(NamedPage::FirstMatch) => Ok(PageSelector::FirstMatch),
            PageSelectorRepr::Named(NamedPage::LastMatch) => Ok(PageSelector::LastMatch),
        }
    }
}

impl From<PageSelector> for PageSelectorRepr {
    fn from(selector: PageSelector) -> Self {
        match selector {
            PageSelector::ExactPage(index) => PageSelectorRepr::Index(index as i64),
            PageSelector::FirstPage => PageSelectorRepr::Named(NamedPage::FirstPage),
            PageSelector::LastPage => PageSelectorRepr::Named(NamedPage::LastPage),
            PageSelector::FirstMatch => PageSelectorRepr::Named(NamedPage::FirstMatch),
            PageSelector::LastMatch => PageSelectorRepr::Named(NamedPage::LastMatch),
        }
    }
}

/// A rectangular page area with an extraction expression and page policy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Region {
    #[serde(flatten)]
    pub rect: Rectangle,

    #[serde(default)]
    pub page: PageSelector,

    #[serde(flatten)]
    pub expr: RegionExpression,
}

impl Region {
    pub fn new(rect: Rectangle, page: PageSelector, expr: impl Into<RegionExpression>) -> Self {
        Self {
            rect,
            page,
            expr: expr.into(),
        }
    }
}

/// One node of the boolean predicate tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Check {
    /// Document has exactly this many pages.
    NumPages { num_pages: usize },

    /// Region's retained page produced a value.
    #[serde(rename = "region")]
    RegionPredicate(Region),

    /// Title matches a regex (unanchored search).
    Title { regex: String },

    Correspondent { name: String },

    DocumentType { name: String },

    StoragePath { name: String },

    /// Document has all `includes` tags and none of the `excludes` tags.
    Tags {
        #[serde(default)]
        includes: Vec<String>,
        #[serde(default)]
        excludes: Vec<String>,
    },

    /// Creation date bounds; unset bounds are ignored.
    DateCreated {
        #[serde(default)]
        before: Option<NaiveDate>,
        #[serde(default)]
        after: Option<NaiveDate>,
        #[serde(default)]
        year: Option<i32>,
    },

    And {
        #[serde(default)]
        checks: Vec<Check>,
    },

    Or {
        #[serde(default)]
        checks: Vec<Check>,
    },

    /// Negation. An unset child never passes.
    Not {
        #[serde(default)]
        check: Option<Box<Check>>,
    },
}

impl Check {
    /// Create a negation of `check`.
    pub fn not(check: Check) -> Self {
        Check::Not {
            check: Some(Box::new(check)),
        }
    }

    /// Visit this node and all descendants in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Check)) {
        visit(self);
        match self {
            Check::And { checks } | Check::Or { checks } => {
                for child in checks {
                    child.walk(visit);
                }
            }
            Check::Not { check: Some(child) } => child.walk(visit),
            _ => {}
        }
    }
}

/// Whether a field targets a built-in document attribute or a custom field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Attr,
    #[default]
    Custom,
}

/// A value to produce for matching documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub kind: FieldKind,
    pub name: String,
    pub template: String,
}

/// Preprocessing requested from the document source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preprocess {
    #[serde(rename = "force-ocr")]
    ForceOcr,
}

/// A named, user-authored classification and extraction rule.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pattern {
    pub name: String,

    /// Page the editor opens on. Not used during evaluation.
    #[serde(default)]
    pub page_default: usize,

    #[serde(default)]
    pub preprocess: Option<Preprocess>,

    #[serde(default)]
    pub checks: Vec<Check>,

    #[serde(default)]
    pub regions: Vec<Region>,

    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Pattern {
    /// Create an empty pattern.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Load a pattern from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get every region used as a check, anywhere in the check tree.
    pub fn check_regions(&self) -> Vec<&Region> {
        let mut regions = Vec::new();
        for check in &self.checks {
            check.walk(&mut |node| {
                if let Check::RegionPredicate(region) = node {
                    regions.push(region);
                }
            });
        }
        regions
    }
}
