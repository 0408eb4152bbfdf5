/// Placeholder entry point: fragment, expression, bindings and source position.
pub mod placeholder;
/// Permission and query substitution policies.
pub mod policy_engine;
/// Script variables, replacement pairs and in-band diagnostics.
pub mod variables;
