#![allow(dead_code)]

use std::path::PathBuf;

use sqlparser::dialect::GenericDialect;
use sqlvar::ast::node::SqlNode;
use sqlvar::parser::sql_parser::parse_expression;
use sqlvar::rewriter::function_registry::NoopObserver;
use sqlvar::{PolicyEngine, Resolution, ScriptVariable};

pub(crate) fn fixture_dir(fixture: &str) -> PathBuf {
    PathBuf::from("tests/fixtures").join(fixture)
}

fn read_fixture_file(fixture: &str, file: &str) -> String {
    let path = fixture_dir(fixture).join(file);
    std::fs::read_to_string(path).expect("fixture file should be readable")
}

pub(crate) fn read_fixture_fragment(fixture: &str) -> String {
    read_fixture_file(fixture, "fragment.sql").trim().to_string()
}

pub(crate) fn read_fixture_expected(fixture: &str) -> String {
    read_fixture_file(fixture, "expected.sql").trim().to_string()
}

pub(crate) fn load_fixture_bindings(fixture: &str) -> Vec<ScriptVariable> {
    serde_json::from_str(&read_fixture_file(fixture, "bindings.json"))
        .expect("fixture bindings should parse")
}

pub(crate) fn parse(fragment: &str) -> SqlNode {
    parse_expression(fragment, &GenericDialect {}).expect("fragment should parse")
}

pub(crate) fn resolve(variables: &[ScriptVariable], fragment: &str) -> sqlvar::Result<Resolution> {
    PolicyEngine::default().resolve(variables, &parse(fragment), fragment, &mut NoopObserver)
}

pub(crate) fn rewrite(variables: &[ScriptVariable], fragment: &str) -> String {
    resolve(variables, fragment)
        .expect("resolution should succeed")
        .replacement
        .rewritten_fragment
}
