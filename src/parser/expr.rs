use sqlparser::ast::{
    BinaryOperator, CastKind, Expr, Function, FunctionArg, FunctionArgExpr, FunctionArguments,
    Spanned, UnaryOperator, Value,
};
use sqlparser::tokenizer::Span;

use crate::ast::node::{
    CastStyle, LiteralValue, RawSql, SqlCall, SqlIdentifier, SqlNode, SqlOperator,
};

/// Lower a `sqlparser` expression into the substitution node tree.
///
/// Parentheses are dropped (the renderer restores them from operator
/// precedence) and chains of the same boolean connective are flattened into a
/// single n-ary call. Constructs without a structured counterpart become
/// [`SqlNode::Raw`] so they still render; the walker rejects one only when
/// its text mentions the variable being substituted.
pub fn lower_expr(expr: &Expr) -> SqlNode {
    let span = expr.span();
    match expr {
        Expr::Identifier(ident) => SqlNode::Identifier(SqlIdentifier {
            parts: vec![ident.clone()],
            placeholder: false,
            span,
        }),
        Expr::CompoundIdentifier(parts) => SqlNode::Identifier(SqlIdentifier {
            parts: parts.clone(),
            placeholder: false,
            span,
        }),
        Expr::Value(v) => lower_value(&v.value, span),
        // `DATE '2024-01-01'`, `INTERVAL '1' DAY`: typed constants stay verbatim.
        Expr::TypedString { .. } => {
            SqlNode::literal(LiteralValue::Verbatim(expr.to_string()), span)
        }
        Expr::Interval(interval) if matches!(*interval.value, Expr::Value(_)) => {
            SqlNode::literal(LiteralValue::Verbatim(expr.to_string()), span)
        }
        Expr::Nested(inner) => lower_expr(inner),
        Expr::BinaryOp { left, op, right } => {
            let operator = binary_operator(op);
            let left = lower_expr(left);
            let right = lower_expr(right);
            if matches!(operator, SqlOperator::And | SqlOperator::Or) {
                return connective(operator, left, right, span);
            }
            call(operator, vec![left, right], span)
        }
        Expr::UnaryOp { op, expr: inner } => match op {
            UnaryOperator::Not => call(SqlOperator::Not, vec![lower_expr(inner)], span),
            UnaryOperator::Minus => call(SqlOperator::Negate, vec![lower_expr(inner)], span),
            UnaryOperator::Plus => lower_expr(inner),
            _ => raw(expr, span),
        },
        Expr::InList {
            expr: inner,
            list,
            negated,
        } => {
            let operator = if *negated {
                SqlOperator::NotIn
            } else {
                SqlOperator::In
            };
            let items = SqlNode::list(list.iter().map(lower_expr).collect(), span);
            call(operator, vec![lower_expr(inner), items], span)
        }
        Expr::Tuple(items) => SqlNode::list(items.iter().map(lower_expr).collect(), span),
        Expr::Like {
            negated,
            any: false,
            expr: inner,
            pattern,
            escape_char: None,
        } => {
            let operator = if *negated {
                SqlOperator::NotLike
            } else {
                SqlOperator::Like
            };
            call(operator, vec![lower_expr(inner), lower_expr(pattern)], span)
        }
        Expr::ILike {
            negated,
            any: false,
            expr: inner,
            pattern,
            escape_char: None,
        } => {
            let operator = if *negated {
                SqlOperator::NotILike
            } else {
                SqlOperator::ILike
            };
            call(operator, vec![lower_expr(inner), lower_expr(pattern)], span)
        }
        Expr::Between {
            expr: inner,
            negated,
            low,
            high,
        } => {
            let operator = if *negated {
                SqlOperator::NotBetween
            } else {
                SqlOperator::Between
            };
            call(
                operator,
                vec![lower_expr(inner), lower_expr(low), lower_expr(high)],
                span,
            )
        }
        Expr::IsNull(inner) => call(SqlOperator::IsNull, vec![lower_expr(inner)], span),
        Expr::IsNotNull(inner) => call(SqlOperator::IsNotNull, vec![lower_expr(inner)], span),
        Expr::IsTrue(inner) => call(SqlOperator::IsTrue, vec![lower_expr(inner)], span),
        Expr::IsFalse(inner) => call(SqlOperator::IsFalse, vec![lower_expr(inner)], span),
        Expr::Function(func) => lower_function(func, expr, span),
        Expr::Case {
            operand,
            conditions,
            else_result,
            ..
        } => {
            let mut operands = Vec::with_capacity(conditions.len() * 2 + 2);
            if let Some(operand) = operand {
                operands.push(lower_expr(operand));
            }
            for when in conditions {
                operands.push(lower_expr(&when.condition));
                operands.push(lower_expr(&when.result));
            }
            if let Some(else_result) = else_result {
                operands.push(lower_expr(else_result));
            }
            call(
                SqlOperator::Case {
                    has_operand: operand.is_some(),
                    has_else: else_result.is_some(),
                },
                operands,
                span,
            )
        }
        Expr::Cast {
            kind,
            expr: inner,
            data_type,
            format: None,
            ..
        } => {
            let style = match kind {
                CastKind::Cast => CastStyle::Function,
                CastKind::DoubleColon => CastStyle::DoubleColon,
                _ => return raw(expr, span),
            };
            call(
                SqlOperator::Cast {
                    data_type: data_type.to_string(),
                    style,
                },
                vec![lower_expr(inner)],
                span,
            )
        }
        _ => raw(expr, span),
    }
}

fn lower_value(value: &Value, span: Span) -> SqlNode {
    let literal = match value {
        Value::Number(n, _) => LiteralValue::Number(n.clone()),
        Value::SingleQuotedString(s) => LiteralValue::String(s.clone()),
        Value::Boolean(b) => LiteralValue::Boolean(*b),
        Value::Null => LiteralValue::Null,
        // `$name`, `:name` and `?` placeholders are references, not values.
        Value::Placeholder(name) => {
            return SqlNode::Identifier(SqlIdentifier {
                parts: vec![sqlparser::ast::Ident::new(name.clone())],
                placeholder: true,
                span,
            });
        }
        other => LiteralValue::Verbatim(other.to_string()),
    };
    SqlNode::literal(literal, span)
}

fn lower_function(func: &Function, expr: &Expr, span: Span) -> SqlNode {
    let decorated = func.filter.is_some()
        || func.over.is_some()
        || func.null_treatment.is_some()
        || !func.within_group.is_empty()
        || !matches!(func.parameters, FunctionArguments::None);
    if decorated {
        return raw(expr, span);
    }

    let name = func.name.to_string();
    match &func.args {
        FunctionArguments::None => call(
            SqlOperator::Function {
                name,
                parenthesized: false,
            },
            Vec::new(),
            span,
        ),
        FunctionArguments::List(list) => {
            if list.duplicate_treatment.is_some() || !list.clauses.is_empty() {
                return raw(expr, span);
            }
            let mut operands = Vec::with_capacity(list.args.len());
            for arg in &list.args {
                match positional_arg_expr(arg) {
                    Some(arg_expr) => operands.push(lower_expr(arg_expr)),
                    None => return raw(expr, span),
                }
            }
            call(
                SqlOperator::Function {
                    name,
                    parenthesized: true,
                },
                operands,
                span,
            )
        }
        FunctionArguments::Subquery(_) => raw(expr, span),
    }
}

/// Extract the expression payload of a positional function argument.
fn positional_arg_expr(arg: &FunctionArg) -> Option<&Expr> {
    match arg {
        FunctionArg::Unnamed(FunctionArgExpr::Expr(expr)) => Some(expr),
        _ => None,
    }
}

fn binary_operator(op: &BinaryOperator) -> SqlOperator {
    match op {
        BinaryOperator::Eq => SqlOperator::Eq,
        BinaryOperator::NotEq => SqlOperator::NotEq,
        BinaryOperator::Gt => SqlOperator::Gt,
        BinaryOperator::GtEq => SqlOperator::GtEq,
        BinaryOperator::Lt => SqlOperator::Lt,
        BinaryOperator::LtEq => SqlOperator::LtEq,
        BinaryOperator::And => SqlOperator::And,
        BinaryOperator::Or => SqlOperator::Or,
        BinaryOperator::Plus => SqlOperator::Plus,
        BinaryOperator::Minus => SqlOperator::Minus,
        BinaryOperator::Multiply => SqlOperator::Multiply,
        BinaryOperator::Divide => SqlOperator::Divide,
        BinaryOperator::Modulo => SqlOperator::Modulo,
        BinaryOperator::StringConcat => SqlOperator::Concat,
        other => SqlOperator::Binary(other.to_string()),
    }
}

fn connective(operator: SqlOperator, left: SqlNode, right: SqlNode, span: Span) -> SqlNode {
    let mut operands = Vec::new();
    for side in [left, right] {
        match side {
            SqlNode::Call(inner) if inner.operator == operator => operands.extend(inner.operands),
            other => operands.push(other),
        }
    }
    call(operator, operands, span)
}

fn call(operator: SqlOperator, operands: Vec<SqlNode>, span: Span) -> SqlNode {
    SqlNode::Call(SqlCall {
        operator,
        operands,
        span,
    })
}

fn raw(expr: &Expr, span: Span) -> SqlNode {
    SqlNode::Raw(RawSql {
        sql: expr.to_string(),
        span,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlparser::dialect::GenericDialect;
    use sqlparser::parser::Parser;

    fn lower(sql: &str) -> SqlNode {
        let expr = Parser::new(&GenericDialect {})
            .try_with_sql(sql)
            .unwrap()
            .parse_expr()
            .unwrap();
        lower_expr(&expr)
    }

    #[test]
    fn comparison_lowers_to_call_with_identifier_and_literal() {
        let node = lower("amount >= 10");
        let call = node.as_call().expect("comparison should lower to a call");
        assert_eq!(call.operator, SqlOperator::GtEq);
        assert!(matches!(call.operands[0], SqlNode::Identifier(_)));
        assert!(matches!(
            &call.operands[1],
            SqlNode::Literal(lit) if lit.value == LiteralValue::Number("10".to_string())
        ));
    }

    #[test]
    fn in_list_lowers_to_node_list_operand() {
        let node = lower("dept NOT IN ($dept, 'hr')");
        let call = node.as_call().unwrap();
        assert_eq!(call.operator, SqlOperator::NotIn);
        let SqlNode::NodeList(list) = &call.operands[1] else {
            panic!("expected node list, got {:?}", call.operands[1]);
        };
        assert_eq!(list.items.len(), 2);
    }

    #[test]
    fn connective_chains_are_flattened() {
        let node = lower("a = 1 AND (b = 2 AND c = 3)");
        let call = node.as_call().unwrap();
        assert_eq!(call.operator, SqlOperator::And);
        assert_eq!(call.operands.len(), 3);
        assert_eq!(node.to_string(), "(a = 1 AND b = 2 AND c = 3)");
    }

    #[test]
    fn mixed_connectives_keep_grouping() {
        let node = lower("a = 1 AND (b = 2 OR c = 3)");
        assert_eq!(node.to_string(), "(a = 1 AND (b = 2 OR c = 3))");
    }

    #[test]
    fn like_between_and_functions_round_trip() {
        assert_eq!(
            lower("name NOT LIKE 'a%'").to_string(),
            "name NOT LIKE 'a%'"
        );
        assert_eq!(
            lower("created BETWEEN '2024-01-01' AND '2024-12-31'").to_string(),
            "created BETWEEN '2024-01-01' AND '2024-12-31'"
        );
        assert_eq!(lower("upper(name) = 'X'").to_string(), "upper(name) = 'X'");
        assert_eq!(lower("t.owner IS NULL").to_string(), "t.owner IS NULL");
    }

    #[test]
    fn typed_constants_lower_to_literals() {
        let node = lower("created > DATE '2024-01-01'");
        let call = node.as_call().unwrap();
        assert!(matches!(call.operands[1], SqlNode::Literal(_)));
        assert_eq!(node.to_string(), "created > DATE '2024-01-01'");
    }

    #[test]
    fn placeholder_and_same_named_column_stay_distinct() {
        let node = lower("region = $region");
        let call = node.as_call().unwrap();
        assert!(!call.operands[0].is_variable_reference("region"));
        assert!(call.operands[1].is_variable_reference("region"));
    }

    #[test]
    fn case_lowers_to_call() {
        let node = lower("CASE WHEN a = $v THEN 'x' ELSE 'y' END");
        let call = node.as_call().expect("CASE should lower to a call");
        assert_eq!(
            call.operator,
            SqlOperator::Case {
                has_operand: false,
                has_else: true,
            }
        );
        assert_eq!(call.operands.len(), 3);
        assert_eq!(node.to_string(), "CASE WHEN a = $v THEN 'x' ELSE 'y' END");

        assert_eq!(
            lower("CASE kind WHEN 1 THEN 'a' WHEN 2 THEN 'b' END").to_string(),
            "CASE kind WHEN 1 THEN 'a' WHEN 2 THEN 'b' END"
        );
    }

    #[test]
    fn unsupported_constructs_lower_to_raw() {
        let node = lower("id IN (SELECT id FROM archived)");
        assert!(matches!(node, SqlNode::Raw(_)));
        assert_eq!(node.to_string(), "id IN (SELECT id FROM archived)");
    }
}
