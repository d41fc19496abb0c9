// Copyright 2025 Cowboy AI, LLC.

//! Evaluator configuration

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::{CriteriaError, CriteriaResult};

/// Configuration for evaluating specifications against a data source
///
/// ```json
/// { "default_page_size": 50, "max_page_size": 500, "log_evaluations": true }
/// ```
///
/// Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Take applied when a specification sets none
    pub default_page_size: Option<usize>,
    /// Upper bound on any take; larger values are clamped
    pub max_page_size: usize,
    /// Emit a debug event for every evaluation
    pub log_evaluations: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            default_page_size: None,
            max_page_size: 1000,
            log_evaluations: false,
        }
    }
}

impl EvaluatorConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> CriteriaResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the limits are consistent
    pub fn validate(&self) -> CriteriaResult<()> {
        if self.max_page_size == 0 {
            return Err(CriteriaError::Configuration(
                "max_page_size must be positive".to_string(),
            ));
        }
        match self.default_page_size {
            Some(0) => Err(CriteriaError::Configuration(
                "default_page_size must be positive".to_string(),
            )),
            Some(size) if size > self.max_page_size => Err(CriteriaError::Configuration(format!(
                "default_page_size {size} exceeds max_page_size {}",
                self.max_page_size
            ))),
            _ => Ok(()),
        }
    }

    /// Effective take for a requested one
    pub fn effective_take(&self, requested: Option<usize>) -> Option<usize> {
        requested
            .or(self.default_page_size)
            .map(|take| take.min(self.max_page_size))
    }

    /// JSON Schema describing this configuration
    pub fn json_schema() -> CriteriaResult<serde_json::Value> {
        Ok(serde_json::to_value(schemars::schema_for!(EvaluatorConfig))?)
    }
}
