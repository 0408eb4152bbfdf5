use sqlvar::ast::node::SqlNode;
use sqlvar::ast::render::{AnsiRenderer, SqlRenderer};
use sqlvar::policy::variables::{ScriptVariable, ValueType};
use sqlvar::rewriter::function_registry::{FunctionRegistry, NoopObserver};
use sqlvar::PolicyEngine;

mod support;

use support::{parse, rewrite};

fn permission(values: &[&str], value_type: ValueType) -> Vec<ScriptVariable> {
    vec![ScriptVariable::permission("var", value_type, values.iter().copied())]
}

// ── Operator table ───────────────────────────────────────────────────────────

#[test]
fn equality_becomes_membership_in_order() {
    let variables = permission(&["a", "b", "c"], ValueType::String);
    assert_eq!(rewrite(&variables, "col = $var"), "col IN ('a', 'b', 'c')");
}

#[test]
fn greater_than_uses_numeric_minimum() {
    let variables = permission(&["3", "1", "2"], ValueType::Numeric);
    assert_eq!(rewrite(&variables, "col > $var"), "col > 1");
}

#[test]
fn like_becomes_parenthesized_disjunction() {
    let variables = permission(&["%a%", "%b%"], ValueType::String);
    assert_eq!(
        rewrite(&variables, "col LIKE $var"),
        "(col LIKE '%a%' OR col LIKE '%b%')"
    );
}

#[test]
fn less_than_on_dates_uses_lexicographic_maximum() {
    let variables = permission(&["2024-02-01", "2024-11-30", "2023-05-05"], ValueType::Date);
    assert_eq!(
        rewrite(&variables, "shipped_at < $var"),
        "shipped_at < '2024-11-30'"
    );
}

#[test]
fn non_numeric_value_in_numeric_reduction_is_rejected() {
    let variables = permission(&["3", "three"], ValueType::Numeric);
    let err = support::resolve(&variables, "col >= $var").unwrap_err();
    assert!(matches!(err, sqlvar::RewriteError::ValueParse { .. }));
}

// ── Multiple variables ───────────────────────────────────────────────────────

#[test]
fn two_variables_vanish_from_rendered_text() {
    let variables = vec![
        ScriptVariable::query("from_day", ValueType::Date, ["2024-01-01"]),
        ScriptVariable::query("to_day", ValueType::Date, ["2024-01-31"]),
    ];
    let out = rewrite(
        &variables,
        "created_at >= $from_day AND created_at < $to_day OR updated_at >= $from_day",
    );
    assert!(!out.contains("from_day"), "unexpected placeholder in {out}");
    assert!(!out.contains("to_day"), "unexpected placeholder in {out}");
    assert_eq!(
        out,
        "((created_at >= '2024-01-01' AND created_at < '2024-01-31') OR updated_at >= '2024-01-01')"
    );
}

// ── Determinism and observers ────────────────────────────────────────────────

#[test]
fn repeated_resolution_is_byte_identical() {
    let fragment = "name LIKE $var";
    let first = rewrite(&permission(&["x%", "y%"], ValueType::String), fragment);
    let second = rewrite(&permission(&["x%", "y%"], ValueType::String), fragment);
    assert_eq!(first, second);
}

#[test]
fn function_observer_sees_user_defined_functions() {
    let mut registry = FunctionRegistry::new();
    registry.load_from_json(r#"["mask_region"]"#).unwrap();

    let variables = permission(&["north", "south"], ValueType::String);
    let fragment = "mask_region(region) = $var";
    let resolution = PolicyEngine::default()
        .resolve(&variables, &parse(fragment), fragment, &mut registry)
        .unwrap();

    assert_eq!(
        resolution.replacement.rewritten_fragment,
        "mask_region(region) IN ('north', 'south')"
    );
    assert_eq!(registry.encountered_user_defined(), vec!["mask_region"]);
}

struct LowercaseRenderer;

impl SqlRenderer for LowercaseRenderer {
    fn render(&self, node: &SqlNode) -> String {
        AnsiRenderer.render(node).to_lowercase()
    }
}

#[test]
fn custom_renderer_formats_final_text() {
    let engine = PolicyEngine::default().with_renderer(Box::new(LowercaseRenderer));
    let variables = permission(&["A", "B"], ValueType::String);
    let fragment = "col = $var";
    let resolution = engine
        .resolve(&variables, &parse(fragment), fragment, &mut NoopObserver)
        .unwrap();
    assert_eq!(resolution.replacement.rewritten_fragment, "col in ('a', 'b')");
}
