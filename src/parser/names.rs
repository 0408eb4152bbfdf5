/// Return the identifier without one pair of surrounding quotes.
///
/// Recognizes ANSI double quotes, MySQL backticks and T-SQL brackets.
pub fn unquote_identifier(ident: &str) -> &str {
    for (open, close) in [('"', '"'), ('`', '`'), ('[', ']')] {
        if let Some(inner) = ident
            .strip_prefix(open)
            .and_then(|s| s.strip_suffix(close))
        {
            return inner;
        }
    }
    ident
}

/// Normalize an identifier for case-insensitive matching.
///
/// Trims whitespace, removes surrounding quotes on a single identifier,
/// and lowercases the result.
pub fn normalize_identifier(ident: &str) -> String {
    unquote_identifier(ident.trim()).to_ascii_lowercase()
}

/// Strip placeholder sigils: `$name$`, `$name`, `:name`, `@name`.
pub fn strip_placeholder_sigils(name: &str) -> &str {
    if let Some(inner) = name.strip_prefix('$') {
        return inner.strip_suffix('$').unwrap_or(inner);
    }
    name.strip_prefix(':')
        .or_else(|| name.strip_prefix('@'))
        .unwrap_or(name)
}

/// Canonical form of a script-variable name or of identifier text that may
/// reference one.
///
/// This is the single normalization rule for variable matching: both the
/// bound variable name and every candidate identifier go through it.
///
/// Examples:
/// - `"$Region$"` -> `"region"`
/// - `":region"` -> `"region"`
/// - `"\"REGION\""` -> `"region"`
pub fn normalize_variable_name(name: &str) -> String {
    let trimmed = unquote_identifier(name.trim());
    normalize_identifier(strip_placeholder_sigils(trimmed))
}

/// Split a potentially qualified name on dots that sit outside quotes.
///
/// Handles dots inside quoted identifiers, e.g. `"my.schema"."fn.name"`.
pub fn split_qualified_name(name: &str) -> Vec<&str> {
    let mut in_quotes = false;
    let mut start = 0usize;
    let mut parts: Vec<&str> = Vec::new();

    for (idx, ch) in name.char_indices() {
        match ch {
            '"' | '`' => in_quotes = !in_quotes,
            '.' if !in_quotes => {
                parts.push(name[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(name[start..].trim());
    parts
}

/// Normalize a function name to its terminal, unquoted, lowercase component.
///
/// Examples:
/// - `"public.my_udf"` -> `"my_udf"`
/// - `"\"Util\".\"Mask\""` -> `"mask"`
pub fn normalize_function_name(name: &str) -> String {
    let parts = split_qualified_name(name.trim());
    let terminal = parts.last().copied().unwrap_or_default();
    normalize_identifier(terminal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_names_fold_case_quotes_and_sigils() {
        assert_eq!(normalize_variable_name("$Region$"), "region");
        assert_eq!(normalize_variable_name("$region"), "region");
        assert_eq!(normalize_variable_name(":region"), "region");
        assert_eq!(normalize_variable_name("@Region"), "region");
        assert_eq!(normalize_variable_name(r#""REGION""#), "region");
        assert_eq!(normalize_variable_name("  `Region`  "), "region");
        assert_eq!(normalize_variable_name("region"), "region");
    }

    #[test]
    fn sigil_stripping_leaves_plain_names_alone() {
        assert_eq!(strip_placeholder_sigils("dept_id"), "dept_id");
        assert_eq!(strip_placeholder_sigils("$dept_id$"), "dept_id");
    }

    #[test]
    fn split_qualified_name_handles_quoted_dots() {
        assert_eq!(
            split_qualified_name(r#""my.schema"."fn.name""#),
            vec![r#""my.schema""#, r#""fn.name""#]
        );
        assert_eq!(split_qualified_name("upper"), vec!["upper"]);
    }

    #[test]
    fn normalize_function_name_handles_schema_quotes_and_case() {
        assert_eq!(normalize_function_name("public.my_udf"), "my_udf");
        assert_eq!(normalize_function_name(r#""Util"."Mask""#), "mask");
        assert_eq!(normalize_function_name("UPPER"), "upper");
    }
}
