//! Substitute bound script variables into parsed SQL predicates, rewriting
//! operators when a variable carries more values than its comparison accepts.
#![warn(missing_docs)]

/// Closed expression-node model and SQL rendering.
pub mod ast;
/// Substitution policy configuration.
pub mod config;
/// Error taxonomy shared by every stage.
pub mod error;
/// `sqlparser` bridge: expression parsing, lowering and name normalization.
pub mod parser;
/// Permission/query policy selection and the placeholder entry point.
pub mod policy;
/// Tree walking, operator auto-fix and value reduction.
pub mod rewriter;

pub use config::RewriteConfig;
pub use error::{Result, RewriteError};
pub use policy::placeholder::VariablePlaceholder;
pub use policy::policy_engine::PolicyEngine;
pub use policy::variables::{ReplacementPair, Resolution, ScriptVariable, ValueType, VariableKind};
