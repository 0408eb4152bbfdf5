use tracing::debug;

use crate::ast::node::{SqlCall, SqlNode, SqlOperator};
use crate::error::Result;
use crate::policy::variables::ScriptVariable;
use crate::rewriter::function_registry::FunctionObserver;
use crate::rewriter::tree_walker::{references, substitute, value_literals};
use crate::rewriter::value_reducer::{reduce_to_max, reduce_to_min};

/// Rewrite `call` so that a multi-valued `variable` yields valid SQL meaning
/// "matches any bound value".
///
/// | operator | rewrite |
/// |---|---|
/// | `>` `>=` | reduce to the minimum, substitute |
/// | `<` `<=` | reduce to the maximum, substitute |
/// | `=` | `left IN (v1, v2, ...)` |
/// | `<>` | `left NOT IN (v1, v2, ...)` |
/// | `LIKE` `ILIKE` | `(left LIKE v1 OR left LIKE v2 ...)` |
/// | `NOT LIKE` `NOT ILIKE` | `(left NOT LIKE v1 AND ...)` |
/// | other | plain substitution |
///
/// The reduction branches collapse `variable.values` to a single element.
/// When the variable sits on the left of a range comparison the reduction
/// direction is mirrored. An equality whose right operand is not the bare
/// variable expands into one comparison per value instead of an `IN` list.
///
/// The plain-substitution fallback only succeeds when every reference to the
/// variable sits in a list slot such as `IN (...)`; anything else, `BETWEEN`
/// included, fails with an invariant violation instead of guessing.
pub fn auto_fix(
    call: &SqlCall,
    variable: &mut ScriptVariable,
    observer: &mut dyn FunctionObserver,
) -> Result<SqlNode> {
    let node = SqlNode::Call(call.clone());
    match call.operator {
        SqlOperator::Gt | SqlOperator::GtEq => {
            if variable_is_left_operand(call, variable) {
                reduce_to_max(variable)?;
            } else {
                reduce_to_min(variable)?;
            }
            substitute(&node, variable, observer)
        }
        SqlOperator::Lt | SqlOperator::LtEq => {
            if variable_is_left_operand(call, variable) {
                reduce_to_min(variable)?;
            } else {
                reduce_to_max(variable)?;
            }
            substitute(&node, variable, observer)
        }
        SqlOperator::Eq => membership(call, variable, SqlOperator::In, SqlOperator::Or, observer),
        SqlOperator::NotEq => {
            membership(call, variable, SqlOperator::NotIn, SqlOperator::And, observer)
        }
        SqlOperator::Like | SqlOperator::ILike => {
            expand_per_value(call, variable, SqlOperator::Or, observer)
        }
        SqlOperator::NotLike | SqlOperator::NotILike => {
            expand_per_value(call, variable, SqlOperator::And, observer)
        }
        _ => {
            debug!(
                operator = ?call.operator,
                variable = %variable.name,
                "no multi-value rewrite for operator; only list slots can take every value"
            );
            substitute(&node, variable, observer)
        }
    }
}

fn variable_is_left_operand(call: &SqlCall, variable: &ScriptVariable) -> bool {
    match call.operands.as_slice() {
        [left, right] => left.is_variable_reference(&variable.name) && !references(right, variable),
        _ => false,
    }
}

/// `left = $v` becomes `left IN (...)`; other shapes fall back to one
/// comparison per value joined by `connective`.
fn membership(
    call: &SqlCall,
    variable: &ScriptVariable,
    list_operator: SqlOperator,
    connective: SqlOperator,
    observer: &mut dyn FunctionObserver,
) -> Result<SqlNode> {
    match call.operands.as_slice() {
        [left, right]
            if right.is_variable_reference(&variable.name) && !references(left, variable) =>
        {
            // Walk the left operand only to report its functions.
            let left = substitute(left, variable, observer)?;
            let list = SqlNode::list(value_literals(variable, right.span())?, right.span());
            Ok(SqlNode::Call(SqlCall {
                operator: list_operator,
                operands: vec![left, list],
                span: call.span,
            }))
        }
        _ => expand_per_value(call, variable, connective, observer),
    }
}

/// One copy of `call` per bound value, joined by `connective`.
fn expand_per_value(
    call: &SqlCall,
    variable: &ScriptVariable,
    connective: SqlOperator,
    observer: &mut dyn FunctionObserver,
) -> Result<SqlNode> {
    let node = SqlNode::Call(call.clone());
    let mut branches = Vec::with_capacity(variable.values.len());
    for value in &variable.values {
        branches.push(substitute(&node, &variable.with_single_value(value), observer)?);
    }
    Ok(SqlNode::Call(SqlCall {
        operator: connective,
        operands: branches,
        span: call.span,
    }))
}
