//! Read-only statement check for model-written SQL.
//!
//! Accepts exactly one `SELECT` or `WITH` statement. A single trailing `;` is
//! allowed. String literals, quoted identifiers and comments are skipped when
//! looking for statement separators and write keywords.

use crate::error::DatasetError;

const WRITE_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "REPLACE", "DROP", "ALTER", "CREATE", "ATTACH", "DETACH",
    "PRAGMA", "VACUUM", "REINDEX",
];

/// Splits `sql` into upper-cased bare words plus `;` and `(` markers,
/// ignoring quoted text and comments.
fn scan(sql: &str) -> Result<Vec<String>, DatasetError> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut chars = sql.chars().peekable();

    let flush = |word: &mut String, tokens: &mut Vec<String>| {
        if !word.is_empty() {
            tokens.push(word.to_uppercase());
            word.clear();
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                flush(&mut word, &mut tokens);
                let quote = c;
                loop {
                    match chars.next() {
                        Some(q) if q == quote => {
                            if chars.peek() == Some(&quote) {
                                chars.next();
                            } else {
                                break;
                            }
                        }
                        Some(_) => {}
                        None => {
                            return Err(DatasetError::Rejected("unterminated quoted text".into()))
                        }
                    }
                }
            }
            '[' => {
                flush(&mut word, &mut tokens);
                if !chars.by_ref().any(|c| c == ']') {
                    return Err(DatasetError::Rejected("unterminated identifier".into()));
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                flush(&mut word, &mut tokens);
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                flush(&mut word, &mut tokens);
                chars.next();
                let mut prev = '\0';
                let mut closed = false;
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        closed = true;
                        break;
                    }
                    prev = c;
                }
                if !closed {
                    return Err(DatasetError::Rejected("unterminated comment".into()));
                }
            }
            ';' | '(' => {
                flush(&mut word, &mut tokens);
                tokens.push(c.to_string());
            }
            c if c.is_alphanumeric() || c == '_' => word.push(c),
            _ => flush(&mut word, &mut tokens),
        }
    }
    flush(&mut word, &mut tokens);
    Ok(tokens)
}

/// Returns the statement without its trailing `;` if it is a single read-only query.
pub fn ensure_read_only(query: &str) -> Result<&str, DatasetError> {
    let trimmed = query.trim();
    let statement = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
    if statement.is_empty() {
        return Err(DatasetError::Rejected("empty query".into()));
    }

    let tokens = scan(statement)?;
    if tokens.iter().any(|t| t == ";") {
        return Err(DatasetError::Rejected(
            "only a single statement is allowed".into(),
        ));
    }
    match tokens.first().map(String::as_str) {
        Some("SELECT") | Some("WITH") => {}
        _ => {
            return Err(DatasetError::Rejected(
                "only SELECT or WITH queries are allowed".into(),
            ))
        }
    }
    // A keyword directly followed by `(` is a function call, e.g. replace(...).
    let write_keyword = tokens.iter().enumerate().find(|(i, t)| {
        WRITE_KEYWORDS.contains(&t.as_str())
            && tokens.get(i + 1).map(String::as_str) != Some("(")
    });
    if let Some((_, kw)) = write_keyword {
        return Err(DatasetError::Rejected(format!(
            "{} is not allowed in a read-only query",
            kw
        )));
    }
    Ok(statement)
}
