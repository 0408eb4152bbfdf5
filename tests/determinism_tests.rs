use proptest::prelude::*;
use sqlvar::policy::variables::{ScriptVariable, ValueType};

mod support;

fn operator() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("="),
        Just("<>"),
        Just(">"),
        Just(">="),
        Just("<"),
        Just("<="),
        Just("LIKE"),
        Just("NOT LIKE"),
    ]
}

proptest! {
    #[test]
    fn resolution_is_deterministic(
        op in operator(),
        values in prop::collection::vec("[a-z%]{1,6}", 0..5),
        permission in any::<bool>(),
    ) {
        let fragment = format!("col {op} $var");
        let build = || {
            let variable = if permission {
                ScriptVariable::permission("var", ValueType::String, values.clone())
            } else {
                ScriptVariable::query("var", ValueType::String, values.clone())
            };
            vec![variable]
        };

        let first = support::resolve(&build(), &fragment).unwrap();
        let second = support::resolve(&build(), &fragment).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn equality_membership_keeps_every_value(values in prop::collection::vec(0u32..1000, 2..8)) {
        let texts: Vec<String> = values.iter().map(ToString::to_string).collect();
        let variables = vec![ScriptVariable::permission("var", ValueType::Numeric, texts.clone())];
        let out = support::rewrite(&variables, "col = $var");
        prop_assert_eq!(out, format!("col IN ({})", texts.join(", ")));
    }
}
