use sqlparser::parser::ParserError;

/// Failure modes of a variable substitution.
///
/// Every failure is a structural mismatch between the bound variables and the
/// shape of the expression, so none of them is retried and no partially
/// rewritten SQL is ever returned alongside one.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// The walker reached a node it has no substitution rule for.
    #[error("unsupported SQL node in variable substitution: {sql}")]
    UnsupportedNode {
        /// Rendered SQL text of the offending node.
        sql: String,
    },

    /// A value bound to a numeric variable is not a finite number.
    #[error("value '{value}' of numeric variable '{variable}' is not a number")]
    ValueParse {
        /// Name of the variable being reduced.
        variable: String,
        /// The offending value.
        value: String,
    },

    /// Internal policy-selection bug: an operation was reached with a binding
    /// shape it must never see.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// The fragment handed to [`crate::parser::sql_parser::parse_expression`]
    /// is not a valid SQL expression.
    #[error("SQL parse error: {0}")]
    Parse(#[from] ParserError),

    /// Invalid rewrite configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RewriteError>;
