use sqlparser::dialect::Dialect;
use sqlparser::tokenizer::Location;

use crate::ast::node::SqlNode;
use crate::error::Result;
use crate::parser::sql_parser::parse_expression;
use crate::policy::policy_engine::PolicyEngine;
use crate::policy::variables::{Resolution, ScriptVariable};
use crate::rewriter::function_registry::FunctionObserver;

/// One placeholder-bearing expression found in a script, with the variables
/// bound to it.
///
/// The outer script scan builds one of these per fragment and later replaces
/// `original_fragment` with the rewritten text.
#[derive(Debug, Clone)]
pub struct VariablePlaceholder {
    variables: Vec<ScriptVariable>,
    expression: SqlNode,
    original_fragment: String,
    start: Location,
}

impl VariablePlaceholder {
    /// Wrap an already-lowered expression. `start` is where the fragment
    /// begins in the surrounding script.
    pub fn new(
        variables: Vec<ScriptVariable>,
        expression: SqlNode,
        original_fragment: &str,
        start: Location,
    ) -> Self {
        Self {
            variables,
            expression,
            original_fragment: original_fragment.to_string(),
            start,
        }
    }

    /// Parse `fragment` with `dialect` and take its start position from the
    /// parsed expression.
    pub fn parse(
        variables: Vec<ScriptVariable>,
        fragment: &str,
        dialect: &dyn Dialect,
    ) -> Result<Self> {
        let expression = parse_expression(fragment, dialect)?;
        let start = expression.span().start;
        Ok(Self::new(variables, expression, fragment, start))
    }

    /// Variables bound to this placeholder.
    pub fn variables(&self) -> &[ScriptVariable] {
        &self.variables
    }

    /// The expression being rewritten.
    pub fn expression(&self) -> &SqlNode {
        &self.expression
    }

    /// Fragment text as it appears in the script.
    pub fn original_fragment(&self) -> &str {
        &self.original_fragment
    }

    /// Start of the fragment in the surrounding script.
    pub fn start_position(&self) -> Location {
        self.start
    }

    /// Run the substitution policies on this placeholder.
    pub fn replacement_pair(
        &self,
        engine: &PolicyEngine,
        observer: &mut dyn FunctionObserver,
    ) -> Result<Resolution> {
        engine.resolve(
            &self.variables,
            &self.expression,
            &self.original_fragment,
            observer,
        )
    }
}
