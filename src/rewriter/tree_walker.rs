use sqlparser::dialect::GenericDialect;
use sqlparser::tokenizer::{Span, Token, Tokenizer};

use crate::ast::node::{LiteralValue, RawSql, SqlCall, SqlNode, SqlNodeList};
use crate::error::{Result, RewriteError};
use crate::parser::names::normalize_variable_name;
use crate::policy::variables::{ScriptVariable, ValueType};
use crate::rewriter::function_registry::FunctionObserver;
use crate::rewriter::value_reducer::parse_numeric;

/// Return a copy of `node` with every reference to `variable` replaced by its
/// bound value(s).
///
/// - A reference in a single-value slot becomes one literal; an unbound
///   variable becomes `NULL`. More than one value in such a slot is an
///   [`RewriteError::InvariantViolation`]: the caller should have routed the
///   expression through the operator rewriter.
/// - A reference inside a node list expands in place into one literal per value.
/// - A [`SqlNode::Raw`] node that mentions the variable cannot be rewritten
///   and fails with [`RewriteError::UnsupportedNode`]; one that does not is
///   kept as is.
///
/// `observer` is told about every function call on the way down.
pub fn substitute(
    node: &SqlNode,
    variable: &ScriptVariable,
    observer: &mut dyn FunctionObserver,
) -> Result<SqlNode> {
    match node {
        SqlNode::Call(call) => {
            if let Some(name) = call.operator.function_name() {
                observer.on_function(name);
            }
            let mut operands = Vec::with_capacity(call.operands.len());
            for operand in &call.operands {
                operands.push(substitute(operand, variable, observer)?);
            }
            Ok(SqlNode::Call(SqlCall {
                operator: call.operator.clone(),
                operands,
                span: call.span,
            }))
        }
        SqlNode::Literal(_) => Ok(node.clone()),
        SqlNode::Identifier(ident) => {
            if node.is_variable_reference(&variable.name) {
                single_literal(variable, ident.span)
            } else {
                Ok(node.clone())
            }
        }
        SqlNode::NodeList(list) => {
            let mut items = Vec::with_capacity(list.items.len());
            for item in &list.items {
                match item {
                    SqlNode::Identifier(ident) if item.is_variable_reference(&variable.name) => {
                        items.extend(value_literals(variable, ident.span)?);
                    }
                    _ => items.push(substitute(item, variable, observer)?),
                }
            }
            Ok(SqlNode::NodeList(SqlNodeList {
                items,
                span: list.span,
            }))
        }
        SqlNode::Raw(raw) => {
            if raw_references(raw, variable) {
                Err(RewriteError::UnsupportedNode {
                    sql: raw.sql.clone(),
                })
            } else {
                Ok(node.clone())
            }
        }
    }
}

/// Substitute several variables one after another.
pub fn substitute_all(
    node: &SqlNode,
    variables: &[ScriptVariable],
    observer: &mut dyn FunctionObserver,
) -> Result<SqlNode> {
    let mut current = node.clone();
    for variable in variables {
        current = substitute(&current, variable, observer)?;
    }
    Ok(current)
}

/// Returns `true` when `variable` is referenced anywhere inside `node`.
pub(crate) fn references(node: &SqlNode, variable: &ScriptVariable) -> bool {
    match node {
        SqlNode::Call(call) => call.operands.iter().any(|op| references(op, variable)),
        SqlNode::NodeList(list) => list.items.iter().any(|item| references(item, variable)),
        SqlNode::Identifier(_) => node.is_variable_reference(&variable.name),
        SqlNode::Raw(raw) => raw_references(raw, variable),
        SqlNode::Literal(_) => false,
    }
}

/// Scan raw SQL for a placeholder naming `variable`.
///
/// Text that no longer tokenizes counts as a reference.
fn raw_references(raw: &RawSql, variable: &ScriptVariable) -> bool {
    let Ok(tokens) = Tokenizer::new(&GenericDialect {}, &raw.sql).tokenize() else {
        return true;
    };
    let name = normalize_variable_name(&variable.name);
    tokens.iter().any(|token| {
        matches!(token, Token::Placeholder(text) if normalize_variable_name(text) == name)
    })
}

/// Literal for one bound value, typed after the variable.
///
/// Numeric values must parse as numbers: they are emitted unquoted.
pub(crate) fn value_literal(variable: &ScriptVariable, value: &str, span: Span) -> Result<SqlNode> {
    let literal = match variable.value_type {
        ValueType::Numeric => {
            parse_numeric(variable, value)?;
            LiteralValue::Number(value.trim().to_string())
        }
        ValueType::String | ValueType::Date | ValueType::Other => {
            LiteralValue::String(value.to_string())
        }
    };
    Ok(SqlNode::literal(literal, span))
}

/// One literal per bound value, in binding order.
pub(crate) fn value_literals(variable: &ScriptVariable, span: Span) -> Result<Vec<SqlNode>> {
    variable
        .values
        .iter()
        .map(|value| value_literal(variable, value, span))
        .collect()
}

fn single_literal(variable: &ScriptVariable, span: Span) -> Result<SqlNode> {
    match variable.values.as_slice() {
        [] => Ok(SqlNode::literal(LiteralValue::Null, span)),
        [value] => value_literal(variable, value, span),
        values => Err(RewriteError::InvariantViolation(format!(
            "variable '{}' is bound to {} values but occupies a single-value slot",
            variable.name,
            values.len()
        ))),
    }
}
