/// Function-call observer interface and the user-defined function registry.
pub mod function_registry;
/// Operator auto-fix for multi-valued variables (IN lists, per-value OR/AND, min/max reduction).
pub mod operator_rewriter;
/// Identifier substitution over the node tree, with list-slot expansion.
pub mod tree_walker;
/// Type-aware min/max reduction of a variable's bound values.
pub mod value_reducer;
