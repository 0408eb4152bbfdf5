use serde::{Deserialize, Serialize};
use sqlparser::dialect::Dialect;

use crate::error::{Result, RewriteError};
use crate::parser::sql_parser::dialect_by_name;

/// Settings for the substitution policies.
///
/// Every field has a default, so a JSON document only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Condition emitted when a fragment is unconditionally satisfied.
    pub true_condition: String,
    /// Condition emitted when a fragment can never be satisfied.
    pub false_condition: String,
    /// Permission value meaning "every row is visible".
    pub all_permission_sentinel: String,
    /// `sqlparser` dialect name used when parsing fragments.
    pub dialect: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            true_condition: "1=1".to_string(),
            false_condition: "1=0".to_string(),
            all_permission_sentinel: "@DATART_ALL_PERMISSION@".to_string(),
            dialect: "generic".to_string(),
        }
    }
}

impl RewriteConfig {
    /// Load a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RewriteConfig = serde_json::from_str(json)
            .map_err(|e| RewriteError::Config(format!("invalid rewrite config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject empty constant conditions and unknown dialects.
    pub fn validate(&self) -> Result<()> {
        if self.true_condition.trim().is_empty() || self.false_condition.trim().is_empty() {
            return Err(RewriteError::Config(
                "true_condition and false_condition must not be empty".to_string(),
            ));
        }
        if self.all_permission_sentinel.is_empty() {
            return Err(RewriteError::Config(
                "all_permission_sentinel must not be empty".to_string(),
            ));
        }
        self.sql_dialect().map(|_| ())
    }

    /// The configured `sqlparser` dialect.
    pub fn sql_dialect(&self) -> Result<Box<dyn Dialect>> {
        dialect_by_name(&self.dialect)
    }
}
