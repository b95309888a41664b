//! Data models shared by the engine and its callers.

pub mod config;
pub mod document;
pub mod pattern;
pub mod results;

pub use config::DissectConfig;
pub use document::{Document, Page, TextRun};
pub use pattern::{
    Check, ExpressionKind, ExpressionSyntax, Field, FieldKind, PageSelector, Pattern, Preprocess,
    Rectangle, Region, RegionExpression,
};
pub use results::{
    CheckResult, FieldResult, PatternEvaluationResult, ProcessedDocument, ProcessingError,
    ProcessingResults, RegionResult,
};
