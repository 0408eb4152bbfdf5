use std::collections::{BTreeSet, HashSet};

use crate::parser::names::normalize_function_name;

/// Observer notified for every function call the tree walker passes through.
///
/// Renderers that special-case user-defined functions hook in here; the
/// substitution core never reads anything back.
pub trait FunctionObserver {
    /// Called with the function name exactly as written in the expression.
    fn on_function(&mut self, name: &str);
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl FunctionObserver for NoopObserver {
    fn on_function(&mut self, _name: &str) {}
}

/// Registry of user-defined function names, and of every function seen
/// during substitution.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    /// Normalized names of known user-defined functions.
    user_defined: HashSet<String>,
    /// Function names encountered during substitution, as written.
    encountered: BTreeSet<String>,
}

impl FunctionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load user-defined function names from a JSON array of strings.
    pub fn load_from_json(&mut self, json: &str) -> Result<(), String> {
        let parsed: Vec<String> = serde_json::from_str(json)
            .map_err(|e| format!("Invalid function registry JSON: {e}"))?;
        for name in parsed {
            self.register_user_defined(&name);
        }
        Ok(())
    }

    /// Mark `name` as a user-defined function.
    pub fn register_user_defined(&mut self, name: &str) {
        self.user_defined.insert(normalize_function_name(name));
    }

    /// Check whether `name` (possibly schema-qualified or quoted) is user-defined.
    pub fn is_user_defined(&self, name: &str) -> bool {
        self.user_defined.contains(&normalize_function_name(name))
    }

    /// Every function name seen so far, sorted.
    pub fn encountered(&self) -> impl Iterator<Item = &str> {
        self.encountered.iter().map(String::as_str)
    }

    /// Encountered functions that are registered as user-defined.
    pub fn encountered_user_defined(&self) -> Vec<&str> {
        self.encountered()
            .filter(|name| self.is_user_defined(name))
            .collect()
    }
}

impl FunctionObserver for FunctionRegistry {
    fn on_function(&mut self, name: &str) {
        self.encountered.insert(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_from_json_registers_normalized_names() {
        let mut registry = FunctionRegistry::new();
        registry
            .load_from_json(r#"["util.mask_email", "\"Region_Of\""]"#)
            .expect("registry json should parse");

        assert!(registry.is_user_defined("MASK_EMAIL"));
        assert!(registry.is_user_defined("public.mask_email"));
        assert!(registry.is_user_defined("region_of"));
        assert!(!registry.is_user_defined("upper"));
    }

    #[test]
    fn load_from_json_rejects_malformed_input() {
        let mut registry = FunctionRegistry::new();
        let err = registry.load_from_json("{\"not\": \"a list\"}").unwrap_err();
        assert!(err.contains("Invalid function registry JSON"));
    }

    #[test]
    fn observer_records_encountered_functions() {
        let mut registry = FunctionRegistry::new();
        registry.register_user_defined("mask_email");
        registry.on_function("upper");
        registry.on_function("mask_email");
        registry.on_function("upper");

        assert_eq!(
            registry.encountered().collect::<Vec<_>>(),
            vec!["mask_email", "upper"]
        );
        assert_eq!(registry.encountered_user_defined(), vec!["mask_email"]);
    }
}
