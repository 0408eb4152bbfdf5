/// Closed expression-node model: calls, identifiers, literals, node lists.
pub mod node;
/// Renderer trait and the default ANSI renderer.
pub mod render;
