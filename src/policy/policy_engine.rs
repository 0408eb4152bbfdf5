use tracing::{debug, warn};

use crate::ast::node::{SqlCall, SqlNode, SqlOperator};
use crate::ast::render::{AnsiRenderer, SqlRenderer};
use crate::config::RewriteConfig;
use crate::error::{Result, RewriteError};
use crate::policy::variables::{
    Diagnostic, DiagnosticLevel, ReplacementPair, Resolution, ScriptVariable, VariableKind,
};
use crate::rewriter::function_registry::FunctionObserver;
use crate::rewriter::operator_rewriter::auto_fix;
use crate::rewriter::tree_walker::{substitute, substitute_all};

/// Which substitution policy applies to a set of bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstitutionPolicy {
    /// Every binding is a permission variable.
    Permission,
    /// At least one binding is a query variable (mixed sets included).
    Query,
}

/// Pick the policy for `variables`. An empty set is a permission set.
pub fn classify_variables(variables: &[ScriptVariable]) -> SubstitutionPolicy {
    if variables
        .iter()
        .all(|variable| variable.kind == VariableKind::Permission)
    {
        SubstitutionPolicy::Permission
    } else {
        SubstitutionPolicy::Query
    }
}

/// Resolves placeholder-bearing expressions into replacement pairs.
pub struct PolicyEngine {
    config: RewriteConfig,
    renderer: Box<dyn SqlRenderer>,
}

impl PolicyEngine {
    /// Engine with the default ANSI renderer.
    pub fn new(config: RewriteConfig) -> Self {
        Self {
            config,
            renderer: Box::new(AnsiRenderer),
        }
    }

    /// Replace the renderer used for the final SQL text.
    pub fn with_renderer(mut self, renderer: Box<dyn SqlRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    /// Substitute `variables` into `expression` and pair the rendered result
    /// with `original_fragment`.
    ///
    /// The caller's bindings are never modified; reductions happen on a local
    /// copy. Bindings sharing a normalized name collapse to the first one.
    pub fn resolve(
        &self,
        variables: &[ScriptVariable],
        expression: &SqlNode,
        original_fragment: &str,
        observer: &mut dyn FunctionObserver,
    ) -> Result<Resolution> {
        let variables = distinct_variables(variables);
        match classify_variables(&variables) {
            SubstitutionPolicy::Permission => {
                self.resolve_permission(variables, expression, original_fragment, observer)
            }
            SubstitutionPolicy::Query => {
                self.resolve_query(variables, expression, original_fragment, observer)
            }
        }
    }

    /// Permission rules, first match wins:
    /// 1. nothing bound -> true condition
    /// 2. several variables -> direct substitution
    /// 3. bound but empty -> false condition
    /// 4. match-all sentinel present -> true condition
    /// 5. one value -> direct substitution
    /// 6. several values -> operator auto-fix
    fn resolve_permission(
        &self,
        mut variables: Vec<ScriptVariable>,
        expression: &SqlNode,
        original_fragment: &str,
        observer: &mut dyn FunctionObserver,
    ) -> Result<Resolution> {
        if variables.is_empty() {
            debug!(fragment = original_fragment, "no permission variable bound, granting");
            return Ok(self.constant(original_fragment, true));
        }

        if variables.len() > 1 {
            let node = substitute_all(expression, &variables, observer)?;
            return Ok(self.rendered(original_fragment, &node));
        }

        let mut variable = variables.remove(0);
        if variable.values.is_empty() {
            debug!(variable = %variable.name, "permission variable has no values, denying");
            return Ok(self.constant(original_fragment, false));
        }

        if variable
            .values
            .iter()
            .any(|value| *value == self.config.all_permission_sentinel)
        {
            debug!(variable = %variable.name, "permission variable grants all rows");
            return Ok(self.constant(original_fragment, true));
        }

        let node = if variable.values.len() == 1 {
            substitute(expression, &variable, observer)?
        } else {
            fix_or_substitute(expression, &mut variable, observer)?
        };
        Ok(self.rendered(original_fragment, &node))
    }

    /// Query rules, first match wins:
    /// 1. nothing bound -> fragment unchanged
    /// 2. several variables -> direct substitution
    /// 3. bound but empty -> `left IS NULL`, with a warning diagnostic
    /// 4. several values in a predicate -> operator auto-fix
    /// 5. otherwise -> direct substitution
    fn resolve_query(
        &self,
        mut variables: Vec<ScriptVariable>,
        expression: &SqlNode,
        original_fragment: &str,
        observer: &mut dyn FunctionObserver,
    ) -> Result<Resolution> {
        if variables.is_empty() {
            return Ok(Resolution::clean(ReplacementPair::new(
                original_fragment,
                original_fragment,
            )));
        }

        if variables.len() > 1 {
            let node = substitute_all(expression, &variables, observer)?;
            return Ok(self.rendered(original_fragment, &node));
        }

        let mut variable = variables.remove(0);
        if variable.values.is_empty() {
            let message = format!(
                "query variable [{}] has no default values; condition degraded to IS NULL",
                variable.name
            );
            warn!(variable = %variable.name, fragment = original_fragment, "{message}");
            let node = is_null_of_left_operand(expression)?;
            let mut resolution = self.rendered(original_fragment, &node);
            resolution.diagnostics.push(Diagnostic {
                level: DiagnosticLevel::Warning,
                variable: variable.name,
                message,
            });
            return Ok(resolution);
        }

        let is_predicate = expression
            .as_call()
            .is_some_and(|call| call.operator.is_predicate());
        let node = if variable.values.len() > 1 && is_predicate {
            fix_or_substitute(expression, &mut variable, observer)?
        } else {
            substitute(expression, &variable, observer)?
        };
        Ok(self.rendered(original_fragment, &node))
    }

    fn constant(&self, original_fragment: &str, value: bool) -> Resolution {
        let condition = if value {
            &self.config.true_condition
        } else {
            &self.config.false_condition
        };
        Resolution::clean(ReplacementPair::new(original_fragment, condition.as_str()))
    }

    fn rendered(&self, original_fragment: &str, node: &SqlNode) -> Resolution {
        Resolution::clean(ReplacementPair::new(
            original_fragment,
            self.renderer.render(node),
        ))
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new(RewriteConfig::default())
    }
}

fn fix_or_substitute(
    expression: &SqlNode,
    variable: &mut ScriptVariable,
    observer: &mut dyn FunctionObserver,
) -> Result<SqlNode> {
    match expression.as_call() {
        Some(call) => auto_fix(call, variable, observer),
        None => substitute(expression, variable, observer),
    }
}

fn is_null_of_left_operand(expression: &SqlNode) -> Result<SqlNode> {
    let left = expression
        .as_call()
        .and_then(|call| call.operands.first())
        .ok_or_else(|| {
            RewriteError::InvariantViolation(format!(
                "cannot build IS NULL fallback: '{expression}' has no left operand"
            ))
        })?;
    Ok(SqlNode::Call(SqlCall {
        operator: SqlOperator::IsNull,
        operands: vec![left.clone()],
        span: expression.span(),
    }))
}

fn distinct_variables(variables: &[ScriptVariable]) -> Vec<ScriptVariable> {
    let mut seen = Vec::new();
    let mut distinct = Vec::with_capacity(variables.len());
    for variable in variables {
        let name = variable.normalized_name();
        if seen.contains(&name) {
            debug!(variable = %variable.name, "duplicate binding ignored");
            continue;
        }
        seen.push(name);
        distinct.push(variable.clone());
    }
    distinct
}
