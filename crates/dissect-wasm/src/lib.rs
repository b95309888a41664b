//! WASM bindings for live pattern preview.
//!
//! The pattern editor runs these in the browser while the user draws regions
//! and types expressions, so every call works on plain JSON-shaped values.

use wasm_bindgen::prelude::*;

use dissect_core::lookup::{suggest, Catalog, Category};
use dissect_core::models::{DissectConfig, Document, Pattern, Rectangle, Region};
use dissect_core::{region, PatternEvaluator};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    dissect_core::VERSION.to_string()
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    // Maps become plain objects so group values read naturally in JS
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).map_err(to_js_error)
}

/// Compile a simple expression to its regex source.
#[wasm_bindgen]
pub fn simple_expr_to_regex(expr: &str) -> Result<String, JsValue> {
    dissect_core::simple_expr_to_regex(expr).map_err(to_js_error)
}

/// Evaluate a region's active expression against already extracted text.
#[wasm_bindgen]
pub fn evaluate_region(region: JsValue, text: &str) -> Result<JsValue, JsValue> {
    let region: Region = serde_wasm_bindgen::from_value(region)?;
    to_js(&region::evaluate_region(&region, text))
}

/// Evaluate a pattern against a document, both given as JS objects.
#[wasm_bindgen]
pub fn evaluate_pattern(pattern: JsValue, document: JsValue) -> Result<JsValue, JsValue> {
    let pattern: Pattern = serde_wasm_bindgen::from_value(pattern)?;
    let document: Document = serde_wasm_bindgen::from_value(document)?;
    to_js(&dissect_core::evaluate_pattern(&pattern, &document))
}

/// Preview session for one open document.
///
/// Holds the parsed document, so repeated evaluations while editing do not
/// cross the JS boundary with the full page text each time.
#[wasm_bindgen]
pub struct PatternPreview {
    document: Document,
    evaluator: PatternEvaluator,
    catalog: Option<Catalog>,
}

impl PatternPreview {
    fn with_document(document: Document) -> Self {
        Self {
            document,
            evaluator: PatternEvaluator::new(),
            catalog: None,
        }
    }

    fn rebuild_evaluator(&self, config: DissectConfig) -> PatternEvaluator {
        let evaluator = PatternEvaluator::new().with_config(config);
        match &self.catalog {
            Some(catalog) => evaluator.with_lookup(std::sync::Arc::new(catalog.clone())),
            None => evaluator,
        }
    }
}

#[wasm_bindgen]
impl PatternPreview {
    /// Create a preview from a document object.
    #[wasm_bindgen(constructor)]
    pub fn new(document: JsValue) -> Result<PatternPreview, JsValue> {
        let document: Document = serde_wasm_bindgen::from_value(document)?;
        Ok(Self::with_document(document))
    }

    /// Create a preview from a document JSON string.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<PatternPreview, JsValue> {
        let document = Document::from_json(json).map_err(to_js_error)?;
        Ok(Self::with_document(document))
    }

    /// Replace the engine configuration.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: DissectConfig = serde_wasm_bindgen::from_value(config)?;
        config.validate().map_err(to_js_error)?;
        self.evaluator = self.rebuild_evaluator(config);
        Ok(())
    }

    /// Set the names known to the document system.
    ///
    /// Custom field data types come from here.
    #[wasm_bindgen(js_name = setCatalog)]
    pub fn set_catalog(&mut self, catalog: JsValue) -> Result<(), JsValue> {
        self.catalog = Some(serde_wasm_bindgen::from_value(catalog)?);
        self.evaluator = self.rebuild_evaluator(self.evaluator.config().clone());
        Ok(())
    }

    /// Number of pages in the document.
    #[wasm_bindgen(getter, js_name = pageCount)]
    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    /// Text inside a rectangle on one page, as the engine sees it.
    #[wasm_bindgen(js_name = regionText)]
    pub fn region_text(&self, page: usize, x: f64, y: f64, x2: f64, y2: f64) -> Option<String> {
        let rect = Rectangle::new(x, y, x2, y2);
        self.document
            .pages
            .get(page)
            .map(|p| p.region_text(&rect, &self.evaluator.config().layout))
    }

    /// Evaluate a region on every page, with the retained page marked.
    #[wasm_bindgen(js_name = evaluateRegion)]
    pub fn evaluate_region(&self, region: JsValue) -> Result<JsValue, JsValue> {
        let region: Region = serde_wasm_bindgen::from_value(region)?;
        to_js(&region::evaluate_pages(
            &region,
            &self.document,
            self.evaluator.config(),
        ))
    }

    /// Evaluate a full pattern against the document.
    #[wasm_bindgen]
    pub fn evaluate(&self, pattern: JsValue) -> Result<JsValue, JsValue> {
        let pattern: Pattern = serde_wasm_bindgen::from_value(pattern)?;
        to_js(&self.evaluator.evaluate_pattern(&pattern, &self.document))
    }

    /// Catalog names in a category starting with `prefix`, for autocompletion.
    #[wasm_bindgen]
    pub fn suggest(&self, category: &str, prefix: &str) -> Result<JsValue, JsValue> {
        let category: Category = serde_json::from_value(serde_json::Value::String(
            category.to_string(),
        ))
        .map_err(to_js_error)?;

        let names: Vec<String> = match &self.catalog {
            Some(catalog) => suggest(catalog, category, prefix)
                .into_iter()
                .map(|element| element.name)
                .collect(),
            None => Vec::new(),
        };
        to_js(&names)
    }
}
