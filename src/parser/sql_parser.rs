use std::borrow::Cow;

use sqlparser::dialect::{dialect_from_str, Dialect};
use sqlparser::parser::Parser;

use crate::ast::node::SqlNode;
use crate::error::{Result, RewriteError};
use crate::parser::expr::lower_expr;

/// Resolve a dialect by its `sqlparser` name (`generic`, `postgresql`, `mysql`, ...).
pub fn dialect_by_name(name: &str) -> Result<Box<dyn Dialect>> {
    dialect_from_str(name).ok_or_else(|| RewriteError::Config(format!("unknown SQL dialect: {name}")))
}

/// Convenience: parse one SQL expression and lower it into a [`SqlNode`].
///
/// Enclosed placeholders (`$name$`) are accepted and read as `$name`.
pub fn parse_expression(sql: &str, dialect: &dyn Dialect) -> Result<SqlNode> {
    let sql = open_enclosed_placeholders(sql);
    let expr = Parser::new(dialect).try_with_sql(&sql)?.parse_expr()?;
    Ok(lower_expr(&expr))
}

/// Rewrite every `$name$` outside quotes to `$name`.
///
/// `sqlparser` tokenizes `$name$` as the opening tag of a dollar-quoted
/// string, so the closing sigil has to go before the fragment is parsed.
/// Text inside single quotes, double quotes and backticks is left alone.
pub fn open_enclosed_placeholders(sql: &str) -> Cow<'_, str> {
    if !sql.contains('$') {
        return Cow::Borrowed(sql);
    }

    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len());
    let mut quote: Option<char> = None;
    let mut changed = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
                out.push(ch);
                i += 1;
            }
            None if matches!(ch, '\'' | '"' | '`') => {
                quote = Some(ch);
                out.push(ch);
                i += 1;
            }
            None if ch == '$' && !follows_word(&chars, i) => {
                let name_len = chars[i + 1..]
                    .iter()
                    .take_while(|c| c.is_alphanumeric() || **c == '_')
                    .count();
                let close = i + 1 + name_len;
                out.push('$');
                out.extend(&chars[i + 1..close]);
                if name_len > 0 && chars.get(close) == Some(&'$') {
                    changed = true;
                    i = close + 1;
                } else {
                    i = close;
                }
            }
            None => {
                out.push(ch);
                i += 1;
            }
        }
    }

    if changed {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(sql)
    }
}

fn follows_word(chars: &[char], idx: usize) -> bool {
    idx > 0 && {
        let prev = chars[idx - 1];
        prev.is_alphanumeric() || prev == '_' || prev == '$'
    }
}
