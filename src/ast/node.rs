use std::fmt;

use sqlparser::ast::Ident;
use sqlparser::tokenizer::Span;

use crate::ast::render::{AnsiRenderer, SqlRenderer};
use crate::parser::names::normalize_variable_name;

/// A node of a parsed SQL expression.
///
/// The set of variants is closed: every traversal matches exhaustively, and
/// constructs the lowering step could not decompose travel as [`SqlNode::Raw`].
#[derive(Debug, Clone, PartialEq)]
pub enum SqlNode {
    /// Operator application: comparison, connective, function call, cast, ...
    Call(SqlCall),
    /// Column name or placeholder; only placeholders can match a variable.
    Identifier(SqlIdentifier),
    /// Concrete value; never matched or rewritten.
    Literal(SqlLiteral),
    /// Parenthesized list, e.g. the right side of `IN`.
    NodeList(SqlNodeList),
    /// Verbatim SQL for constructs without a structured representation.
    Raw(RawSql),
}

/// Operator application.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlCall {
    /// Applied operator.
    pub operator: SqlOperator,
    /// Operands in source order.
    pub operands: Vec<SqlNode>,
    /// Source position of the whole call.
    pub span: Span,
}

/// Possibly qualified identifier such as `region` or `t."Region"`, or a
/// placeholder such as `$region`.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlIdentifier {
    /// Name parts, outermost qualifier first. Placeholders keep their sigil.
    pub parts: Vec<Ident>,
    /// `true` when the parser produced this from `$name`, `:name` or `?`.
    pub placeholder: bool,
    /// Source position.
    pub span: Span,
}

/// Literal value with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlLiteral {
    /// The value.
    pub value: LiteralValue,
    /// Source position.
    pub span: Span,
}

/// Literal payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralValue {
    /// Numeric literal, kept in its textual form.
    Number(String),
    /// Single-quoted string literal (unescaped content).
    String(String),
    /// `TRUE` / `FALSE`.
    Boolean(bool),
    /// `NULL`.
    Null,
    /// Any other literal, rendered exactly as written.
    Verbatim(String),
}

/// Parenthesized node list.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlNodeList {
    /// List items in order.
    pub items: Vec<SqlNode>,
    /// Source position.
    pub span: Span,
}

/// SQL kept as text because it has no structured representation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSql {
    /// The SQL text.
    pub sql: String,
    /// Source position.
    pub span: Span,
}

/// How a cast was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastStyle {
    /// `CAST(expr AS type)`
    Function,
    /// `expr::type`
    DoubleColon,
}

/// Operators understood by the rewriter and the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlOperator {
    /// `=`
    Eq,
    /// `<>` / `!=`
    NotEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `ILIKE`
    ILike,
    /// `NOT ILIKE`
    NotILike,
    /// `IN (list)`
    In,
    /// `NOT IN (list)`
    NotIn,
    /// `BETWEEN low AND high`
    Between,
    /// `NOT BETWEEN low AND high`
    NotBetween,
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    IsNotNull,
    /// `IS TRUE`
    IsTrue,
    /// `IS FALSE`
    IsFalse,
    /// n-ary `AND`
    And,
    /// n-ary `OR`
    Or,
    /// prefix `NOT`
    Not,
    /// prefix `-`
    Negate,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Modulo,
    /// `||`
    Concat,
    /// Any other infix operator, kept as its SQL symbol.
    Binary(String),
    /// Function call.
    Function {
        /// Function name as written, possibly schema-qualified.
        name: String,
        /// `false` for niladic forms written without parentheses (`CURRENT_DATE`).
        parenthesized: bool,
    },
    /// `CASE [operand] WHEN .. THEN .. [ELSE ..] END`.
    ///
    /// Operands are laid out as `[operand?, when_1, then_1, ..., else?]`.
    Case {
        /// A simple `CASE x WHEN ..` carries `x` as its first operand.
        has_operand: bool,
        /// The last operand is the `ELSE` result.
        has_else: bool,
    },
    /// Type cast.
    Cast {
        /// Target type as written.
        data_type: String,
        /// Surface syntax.
        style: CastStyle,
    },
}

impl SqlOperator {
    /// Returns `true` for operators whose result is a boolean condition:
    /// comparisons, pattern matches, membership and range tests, `IS` tests
    /// and boolean connectives.
    pub fn is_predicate(&self) -> bool {
        matches!(
            self,
            SqlOperator::Eq
                | SqlOperator::NotEq
                | SqlOperator::Gt
                | SqlOperator::GtEq
                | SqlOperator::Lt
                | SqlOperator::LtEq
                | SqlOperator::Like
                | SqlOperator::NotLike
                | SqlOperator::ILike
                | SqlOperator::NotILike
                | SqlOperator::In
                | SqlOperator::NotIn
                | SqlOperator::Between
                | SqlOperator::NotBetween
                | SqlOperator::IsNull
                | SqlOperator::IsNotNull
                | SqlOperator::IsTrue
                | SqlOperator::IsFalse
                | SqlOperator::And
                | SqlOperator::Or
                | SqlOperator::Not
        )
    }

    /// Function name when this operator is a function call.
    pub fn function_name(&self) -> Option<&str> {
        match self {
            SqlOperator::Function { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Binding strength used by the renderer to decide where parentheses go.
    pub fn precedence(&self) -> u8 {
        match self {
            SqlOperator::Or => 1,
            SqlOperator::And => 2,
            SqlOperator::Not => 3,
            SqlOperator::Eq
            | SqlOperator::NotEq
            | SqlOperator::Gt
            | SqlOperator::GtEq
            | SqlOperator::Lt
            | SqlOperator::LtEq
            | SqlOperator::Like
            | SqlOperator::NotLike
            | SqlOperator::ILike
            | SqlOperator::NotILike
            | SqlOperator::In
            | SqlOperator::NotIn
            | SqlOperator::Between
            | SqlOperator::NotBetween
            | SqlOperator::IsNull
            | SqlOperator::IsNotNull
            | SqlOperator::IsTrue
            | SqlOperator::IsFalse => 4,
            SqlOperator::Plus
            | SqlOperator::Minus
            | SqlOperator::Concat
            | SqlOperator::Binary(_) => 5,
            SqlOperator::Multiply | SqlOperator::Divide | SqlOperator::Modulo => 6,
            SqlOperator::Negate => 7,
            SqlOperator::Cast {
                style: CastStyle::DoubleColon,
                ..
            } => 8,
            SqlOperator::Function { .. }
            | SqlOperator::Case { .. }
            | SqlOperator::Cast {
                style: CastStyle::Function,
                ..
            } => 10,
        }
    }
}

impl SqlNode {
    /// Build a call with an empty span.
    pub fn call(operator: SqlOperator, operands: Vec<SqlNode>) -> Self {
        SqlNode::Call(SqlCall {
            operator,
            operands,
            span: Span::empty(),
        })
    }

    /// Build an unqualified, unquoted column identifier.
    pub fn identifier(name: &str) -> Self {
        SqlNode::Identifier(SqlIdentifier {
            parts: vec![Ident::new(name)],
            placeholder: false,
            span: Span::empty(),
        })
    }

    /// Build a placeholder reference; `text` keeps its sigil, e.g. `$region`.
    pub fn placeholder(text: &str) -> Self {
        SqlNode::Identifier(SqlIdentifier {
            parts: vec![Ident::new(text)],
            placeholder: true,
            span: Span::empty(),
        })
    }

    /// Build a literal.
    pub fn literal(value: LiteralValue, span: Span) -> Self {
        SqlNode::Literal(SqlLiteral { value, span })
    }

    /// Build a node list.
    pub fn list(items: Vec<SqlNode>, span: Span) -> Self {
        SqlNode::NodeList(SqlNodeList { items, span })
    }

    /// Source position of this node.
    pub fn span(&self) -> Span {
        match self {
            SqlNode::Call(call) => call.span,
            SqlNode::Identifier(ident) => ident.span,
            SqlNode::Literal(literal) => literal.span,
            SqlNode::NodeList(list) => list.span,
            SqlNode::Raw(raw) => raw.span,
        }
    }

    /// The node as a call, if it is one.
    pub fn as_call(&self) -> Option<&SqlCall> {
        match self {
            SqlNode::Call(call) => Some(call),
            _ => None,
        }
    }

    /// Returns `true` when this node is a placeholder naming `variable_name`.
    ///
    /// Column identifiers never match, even when they share the variable's
    /// name: `region = $region` only references the variable on the right.
    /// Both names go through [`normalize_variable_name`], so case and the
    /// sigil style (`$name`, `$name$`, `:name`) do not matter.
    pub fn is_variable_reference(&self, variable_name: &str) -> bool {
        match self {
            SqlNode::Identifier(ident) if ident.placeholder => {
                ident.normalized() == normalize_variable_name(variable_name)
            }
            _ => false,
        }
    }
}

impl SqlIdentifier {
    /// Normalized identifier text, sigils and quotes removed.
    pub fn normalized(&self) -> String {
        self.parts
            .iter()
            .map(|part| normalize_variable_name(&part.value))
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for SqlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&AnsiRenderer.render(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicate_operators_cover_comparisons_and_connectives() {
        assert!(SqlOperator::Eq.is_predicate());
        assert!(SqlOperator::NotILike.is_predicate());
        assert!(SqlOperator::Or.is_predicate());
        assert!(!SqlOperator::Plus.is_predicate());
        assert!(!SqlOperator::Function {
            name: "upper".to_string(),
            parenthesized: true,
        }
        .is_predicate());
    }

    #[test]
    fn variable_reference_ignores_case_and_sigil_style() {
        let placeholder = SqlNode::placeholder("$Region");
        assert!(placeholder.is_variable_reference("region"));
        assert!(placeholder.is_variable_reference("$REGION$"));
        assert!(SqlNode::placeholder(":region").is_variable_reference("$region"));
        assert!(!placeholder.is_variable_reference("regions"));
    }

    #[test]
    fn columns_never_match_variables() {
        assert!(!SqlNode::identifier("region").is_variable_reference("region"));
        assert!(!SqlNode::identifier("region").is_variable_reference("$region"));

        let quoted = SqlNode::Identifier(SqlIdentifier {
            parts: vec![Ident::with_quote('"', "$region")],
            placeholder: false,
            span: Span::empty(),
        });
        assert!(!quoted.is_variable_reference("region"));
    }

    #[test]
    fn literals_never_match_variables() {
        let literal = SqlNode::literal(LiteralValue::String("region".to_string()), Span::empty());
        assert!(!literal.is_variable_reference("region"));
    }
}
