mod support;

use support::{load_fixture_bindings, read_fixture_expected, read_fixture_fragment, rewrite};

fn assert_fixture(fixture: &str) {
    let bindings = load_fixture_bindings(fixture);
    let fragment = read_fixture_fragment(fixture);
    let expected = read_fixture_expected(fixture);
    assert_eq!(
        rewrite(&bindings, &fragment),
        expected,
        "fixture '{fixture}' rewrote unexpectedly"
    );
}

#[test]
fn region_permission_fixture() {
    assert_fixture("region_permission");
}

#[test]
fn price_ceiling_fixture() {
    assert_fixture("price_ceiling");
}

#[test]
fn name_patterns_fixture() {
    assert_fixture("name_patterns");
}

#[test]
fn missing_query_value_fixture() {
    assert_fixture("missing_query_value");
}

#[test]
fn missing_query_value_fixture_reports_warning() {
    use sqlvar::policy::variables::DiagnosticLevel;

    let fixture = "missing_query_value";
    let bindings = load_fixture_bindings(fixture);
    let resolution = support::resolve(&bindings, &read_fixture_fragment(fixture)).unwrap();

    assert_eq!(resolution.diagnostics.len(), 1);
    assert_eq!(resolution.diagnostics[0].level, DiagnosticLevel::Warning);
    assert_eq!(resolution.diagnostics[0].variable, "since");
}
