//! Configuration structures for the evaluation engine.

use serde::{Deserialize, Serialize};

use crate::error::{DissectError, Result};

/// Main configuration for dissect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DissectConfig {
    /// Expression compilation configuration.
    pub expression: ExpressionConfig,

    /// Region text layout configuration.
    pub layout: LayoutConfig,

    /// Batch processing configuration.
    pub processing: ProcessingConfig,
}

/// Expression compilation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionConfig {
    /// Upper bound (bytes) on the size of a compiled regex.
    pub size_limit: usize,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            size_limit: 1 << 20,
        }
    }
}

/// Region text layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Fraction of a run's height ignored at its top when grouping runs into
    /// lines. Absorbs slight page skew between neighbouring lines.
    pub line_top_inset: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { line_top_inset: 0.25 }
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Only documents carrying all of these tags are classified.
    pub required_tags: Vec<String>,

    /// Number of documents evaluated concurrently.
    pub jobs: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            required_tags: Vec::new(),
            jobs: 4,
        }
    }
}

impl DissectConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.layout.line_top_inset) {
            return Err(DissectError::Config(format!(
                "layout.line_top_inset must be in [0, 1), got {}",
                self.layout.line_top_inset
            )));
        }
        if self.processing.jobs == 0 {
            return Err(DissectError::Config("processing.jobs must be at least 1".to_string()));
        }
        Ok(())
    }
}
