// SPDX-License-Identifier: MIT

//! Read-only guardrail for generated SQL
//!
//! Generated queries are untrusted. Only a single SELECT-shaped statement
//! is let through; the connection itself is read-only as a second layer.
//! String literals and SQL comments are masked before any check.

use crate::adk::error::QueryError;

const MUTATING_KEYWORDS: &[&str] = &[
    "insert", "update", "delete", "create", "alter", "drop", "truncate", "attach", "detach",
    "pragma", "vacuum", "reindex", "analyze", "begin", "commit", "rollback", "savepoint",
];

/// Validate a query and return it without trailing semicolons or comments
pub fn validate_read_only_sql(raw_sql: &str) -> Result<&str, QueryError> {
    // Keywords and separators inside literals or comments do not count.
    // Masking keeps byte offsets, so spans in `code` index into `raw_sql`.
    let code = mask_literals_and_comments(raw_sql);

    let trimmed = code.trim_end_matches(|ch: char| ch.is_whitespace() || ch == ';');
    let code = trimmed.trim_start();
    if code.is_empty() {
        return Err(QueryError::Rejected("SQL query is empty".to_string()));
    }
    let candidate = &raw_sql[trimmed.len() - code.len()..trimmed.len()];

    if code.contains(';') {
        return Err(QueryError::Rejected(
            "multi-statement SQL is not allowed".to_string(),
        ));
    }

    let normalized = code.to_ascii_lowercase();
    if let Some(keyword) = first_mutating_keyword(&normalized) {
        return Err(QueryError::Rejected(format!(
            "mutating keyword `{}` is not allowed",
            keyword
        )));
    }

    let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    let allowed = normalized.starts_with("select")
        || normalized.starts_with("with")
        || normalized.starts_with("explain select")
        || normalized.starts_with("explain query plan select");
    if !allowed {
        let leading = normalized.split(' ').next().unwrap_or_default();
        return Err(QueryError::Rejected(format!(
            "only SELECT statements are allowed, got `{}`",
            leading
        )));
    }

    Ok(candidate)
}

#[derive(Clone, Copy)]
enum Scan {
    Code,
    Quoted(char),
    LineComment,
    BlockComment,
}

/// Blank out literal contents and `--` / `/* */` comments, byte for byte
fn mask_literals_and_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut state = Scan::Code;
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        match state {
            Scan::Code => match ch {
                '\'' | '"' => {
                    state = Scan::Quoted(ch);
                    out.push(ch);
                }
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    out.push_str("  ");
                    state = Scan::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = Scan::BlockComment;
                }
                _ => out.push(ch),
            },
            Scan::Quoted(q) if ch == q => {
                state = Scan::Code;
                out.push(ch);
            }
            Scan::LineComment if ch == '\n' => {
                state = Scan::Code;
                out.push(ch);
            }
            Scan::BlockComment if ch == '*' && chars.peek() == Some(&'/') => {
                chars.next();
                out.push_str("  ");
                state = Scan::Code;
            }
            _ => out.push_str(&" ".repeat(ch.len_utf8())),
        }
    }

    out
}

fn first_mutating_keyword(normalized_sql: &str) -> Option<&'static str> {
    normalized_sql
        .split(|ch: char| !ch.is_ascii_alphanumeric() && ch != '_')
        .find_map(|token| MUTATING_KEYWORDS.iter().copied().find(|k| *k == token))
}
