/// Lowering of `sqlparser` expressions into the substitution node tree.
pub mod expr;
/// Identifier and variable-name normalization helpers (quoting, case, placeholder sigils).
pub mod names;
/// Thin wrapper around `sqlparser` for parsing a single expression fragment.
pub mod sql_parser;
