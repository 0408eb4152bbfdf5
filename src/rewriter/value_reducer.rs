use std::cmp::Ordering;

use crate::error::{Result, RewriteError};
use crate::policy::variables::{ScriptVariable, ValueType};

/// Collapse `variable.values` to its minimum under the value type's ordering.
///
/// Used for `>` / `>=` so the reduced comparison is the least restrictive one.
pub fn reduce_to_min(variable: &mut ScriptVariable) -> Result<()> {
    reduce(variable, Ordering::Less)
}

/// Collapse `variable.values` to its maximum under the value type's ordering.
///
/// Used for `<` / `<=`.
pub fn reduce_to_max(variable: &mut ScriptVariable) -> Result<()> {
    reduce(variable, Ordering::Greater)
}

/// Parse a value bound to a numeric variable.
///
/// Only finite numbers are accepted; `NaN` and infinities are rejected along
/// with anything that is not a number.
pub(crate) fn parse_numeric(variable: &ScriptVariable, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| RewriteError::ValueParse {
            variable: variable.name.clone(),
            value: value.to_string(),
        })
}

/// Keep the value that sorts towards `wanted` (`Less` = min, `Greater` = max).
/// The chosen value keeps its original text.
fn reduce(variable: &mut ScriptVariable, wanted: Ordering) -> Result<()> {
    let Some(first) = variable.values.first() else {
        return Err(RewriteError::InvariantViolation(format!(
            "cannot reduce variable '{}' without values",
            variable.name
        )));
    };

    let chosen = match variable.value_type {
        ValueType::String | ValueType::Date => {
            let mut best = first;
            for value in &variable.values[1..] {
                if value.cmp(best) == wanted {
                    best = value;
                }
            }
            best.clone()
        }
        ValueType::Numeric => {
            let mut best = (parse_numeric(variable, first)?, first);
            for value in &variable.values[1..] {
                let n = parse_numeric(variable, value)?;
                if n.total_cmp(&best.0) == wanted {
                    best = (n, value);
                }
            }
            best.1.clone()
        }
        // No total order: the first binding stands in for the whole set.
        ValueType::Other => first.clone(),
    };

    variable.values = vec![chosen];
    Ok(())
}
