//! Core library for document classification patterns.
//!
//! This crate provides:
//! - Simple expression compilation (`Total: <amount:number>` to a named-group regex)
//! - Region evaluation over positioned page text, with page selection policies
//! - Boolean check trees over document metadata and regions
//! - Field rendering with monetary and date filters
//! - Batch classification of documents against patterns

pub mod checks;
pub mod engine;
pub mod error;
pub mod expression;
pub mod fields;
pub mod lookup;
pub mod models;
pub mod region;

pub use checks::DocumentContext;
pub use engine::{evaluate_pattern, PatternEvaluator};
pub use error::{DissectError, EvaluationError, ExpressionError, FieldError, Result};
pub use expression::{compile_simple, simple_expr_to_regex, CompiledExpression};
pub use fields::{DataType, JinjaRenderer, RenderContext, TemplateRenderer};
pub use lookup::{Catalog, Category, NameLookup, NamedElement};
pub use models::{
    Check, CheckResult, DissectConfig, Document, Field, FieldKind, FieldResult, Page, PageSelector,
    Pattern, PatternEvaluationResult, ProcessingResults, Rectangle, Region, RegionExpression,
    RegionResult, TextRun,
};
pub use region::{evaluate_region, resolve};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
