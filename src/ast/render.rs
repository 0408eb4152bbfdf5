use sqlparser::ast::Value;

use crate::ast::node::{CastStyle, LiteralValue, SqlCall, SqlNode, SqlOperator};

/// Turns an expression tree back into SQL text.
///
/// Implement this to plug in dialect-specific output; [`AnsiRenderer`] is the
/// default used by the policy engine.
pub trait SqlRenderer {
    /// Render `node` as SQL.
    fn render(&self, node: &SqlNode) -> String;
}

/// Default renderer producing ANSI-style SQL.
///
/// Literal escaping and identifier quoting are delegated to `sqlparser`'s
/// `Value` and `Ident` display. `AND`/`OR` calls are always parenthesized so a
/// rendered fragment keeps its meaning wherever it is spliced back.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiRenderer;

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

impl SqlRenderer for AnsiRenderer {
    fn render(&self, node: &SqlNode) -> String {
        match node {
            SqlNode::Call(call) => self.render_call(call),
            SqlNode::Identifier(ident) => ident
                .parts
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("."),
            SqlNode::Literal(literal) => render_literal(&literal.value),
            SqlNode::NodeList(list) => format!("({})", self.render_all(&list.items)),
            SqlNode::Raw(raw) => raw.sql.clone(),
        }
    }
}

impl AnsiRenderer {
    fn render_all(&self, nodes: &[SqlNode]) -> String {
        nodes
            .iter()
            .map(|node| self.render(node))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn render_call(&self, call: &SqlCall) -> String {
        let op = &call.operator;
        let prec = op.precedence();
        let operand = |idx: usize, side: Side| -> String {
            call.operands
                .get(idx)
                .map(|node| self.render_operand(node, prec, side))
                .unwrap_or_default()
        };

        match op {
            SqlOperator::And | SqlOperator::Or => {
                let joiner = if *op == SqlOperator::And {
                    " AND "
                } else {
                    " OR "
                };
                let parts: Vec<String> = call
                    .operands
                    .iter()
                    .map(|node| self.render_operand(node, prec, Side::Left))
                    .collect();
                format!("({})", parts.join(joiner))
            }
            SqlOperator::Not => format!("NOT {}", operand(0, Side::Right)),
            SqlOperator::Negate => {
                let inner = operand(0, Side::Right);
                // `--` would start a line comment.
                if inner.starts_with('-') {
                    format!("-({inner})")
                } else {
                    format!("-{inner}")
                }
            }
            SqlOperator::IsNull
            | SqlOperator::IsNotNull
            | SqlOperator::IsTrue
            | SqlOperator::IsFalse => {
                let suffix = match op {
                    SqlOperator::IsNull => "IS NULL",
                    SqlOperator::IsNotNull => "IS NOT NULL",
                    SqlOperator::IsTrue => "IS TRUE",
                    _ => "IS FALSE",
                };
                format!("{} {suffix}", operand(0, Side::Left))
            }
            SqlOperator::In | SqlOperator::NotIn => {
                let keyword = if *op == SqlOperator::In {
                    "IN"
                } else {
                    "NOT IN"
                };
                let list = match call.operands.get(1) {
                    Some(SqlNode::NodeList(list)) => format!("({})", self.render_all(&list.items)),
                    Some(other) => format!("({})", self.render(other)),
                    None => "()".to_string(),
                };
                format!("{} {keyword} {list}", operand(0, Side::Left))
            }
            SqlOperator::Between | SqlOperator::NotBetween => {
                let keyword = if *op == SqlOperator::Between {
                    "BETWEEN"
                } else {
                    "NOT BETWEEN"
                };
                format!(
                    "{} {keyword} {} AND {}",
                    operand(0, Side::Left),
                    operand(1, Side::Right),
                    operand(2, Side::Right)
                )
            }
            SqlOperator::Function {
                name,
                parenthesized,
            } => {
                if *parenthesized || !call.operands.is_empty() {
                    format!("{name}({})", self.render_all(&call.operands))
                } else {
                    name.clone()
                }
            }
            SqlOperator::Case {
                has_operand,
                has_else,
            } => self.render_case(&call.operands, *has_operand, *has_else),
            SqlOperator::Cast {
                data_type,
                style: CastStyle::Function,
            } => format!("CAST({} AS {data_type})", self.render_all(&call.operands)),
            SqlOperator::Cast {
                data_type,
                style: CastStyle::DoubleColon,
            } => format!("{}::{data_type}", operand(0, Side::Left)),
            _ => format!(
                "{} {} {}",
                operand(0, Side::Left),
                infix_symbol(op),
                operand(1, Side::Right)
            ),
        }
    }

    fn render_case(&self, operands: &[SqlNode], has_operand: bool, has_else: bool) -> String {
        let mut rest = operands;
        let mut sql = String::from("CASE");
        if has_operand {
            if let Some((operand, tail)) = rest.split_first() {
                sql.push(' ');
                sql.push_str(&self.render(operand));
                rest = tail;
            }
        }
        let mut else_result = None;
        if has_else {
            if let Some((last, head)) = rest.split_last() {
                else_result = Some(last);
                rest = head;
            }
        }
        for pair in rest.chunks(2) {
            if let [condition, result] = pair {
                sql.push_str(&format!(
                    " WHEN {} THEN {}",
                    self.render(condition),
                    self.render(result)
                ));
            }
        }
        if let Some(else_result) = else_result {
            sql.push_str(&format!(" ELSE {}", self.render(else_result)));
        }
        sql.push_str(" END");
        sql
    }

    fn render_operand(&self, node: &SqlNode, parent_prec: u8, side: Side) -> String {
        let rendered = self.render(node);
        let SqlNode::Call(child) = node else {
            return rendered;
        };
        // AND/OR render their own parentheses.
        if matches!(child.operator, SqlOperator::And | SqlOperator::Or) {
            return rendered;
        }
        let child_prec = child.operator.precedence();
        let comparison_level = parent_prec == 4;
        let wrap = match side {
            Side::Left => child_prec < parent_prec || (comparison_level && child_prec == parent_prec),
            Side::Right => child_prec <= parent_prec,
        };
        if wrap {
            format!("({rendered})")
        } else {
            rendered
        }
    }
}

fn infix_symbol(op: &SqlOperator) -> &str {
    match op {
        SqlOperator::Eq => "=",
        SqlOperator::NotEq => "<>",
        SqlOperator::Gt => ">",
        SqlOperator::GtEq => ">=",
        SqlOperator::Lt => "<",
        SqlOperator::LtEq => "<=",
        SqlOperator::Like => "LIKE",
        SqlOperator::NotLike => "NOT LIKE",
        SqlOperator::ILike => "ILIKE",
        SqlOperator::NotILike => "NOT ILIKE",
        SqlOperator::Plus => "+",
        SqlOperator::Minus => "-",
        SqlOperator::Multiply => "*",
        SqlOperator::Divide => "/",
        SqlOperator::Modulo => "%",
        SqlOperator::Concat => "||",
        SqlOperator::Binary(symbol) => symbol.as_str(),
        // Non-infix operators are rendered by their own arms.
        _ => "",
    }
}

fn render_literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Number(n) => Value::Number(n.clone(), false).to_string(),
        LiteralValue::String(s) => Value::SingleQuotedString(s.clone()).to_string(),
        LiteralValue::Boolean(b) => Value::Boolean(*b).to_string(),
        LiteralValue::Null => Value::Null.to_string(),
        LiteralValue::Verbatim(sql) => sql.clone(),
    }
}
