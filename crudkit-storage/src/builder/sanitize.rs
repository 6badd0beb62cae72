//! Read-path statement guard.
//!
//! Read templates come from callers as raw text, so anything that could turn
//! a read into a mutation is rejected outright before building begins.

use std::sync::LazyLock;

use regex::Regex;

use crudkit_core::errors::QueryError;

/// Whole-word destructive keywords, matched case-insensitively.
static FORBIDDEN_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(DELETE|ALTER|DROP|UPDATE|CREATE|INSERT|UNION)\b").unwrap()
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Comment tokens, matched anywhere.
const FORBIDDEN_TOKENS: [&str; 4] = ["--", "#", "/*", "*/"];

/// Normalize whitespace and reject templates carrying destructive SQL or
/// comment tokens, naming the offending token.
pub fn sanitize_statement(query: &str) -> Result<String, QueryError> {
    let normalized = WHITESPACE.replace_all(query.trim(), " ").into_owned();

    if let Some(found) = FORBIDDEN_KEYWORDS.find(&normalized) {
        return Err(QueryError::ForbiddenStatement {
            token: found.as_str().to_ascii_uppercase(),
        });
    }
    for token in FORBIDDEN_TOKENS {
        if normalized.contains(token) {
            return Err(QueryError::ForbiddenStatement {
                token: token.to_string(),
            });
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_select_passes_with_whitespace_normalized() {
        let sql = sanitize_statement("SELECT *\n  FROM users\t{filter}").unwrap();
        assert_eq!(sql, "SELECT * FROM users {filter}");
    }

    #[test]
    fn destructive_keywords_are_rejected_by_name() {
        let err = sanitize_statement("SELECT * FROM users; DROP TABLE users").unwrap_err();
        assert!(matches!(err, QueryError::ForbiddenStatement { token } if token == "DROP"));

        let err = sanitize_statement("select * from t union select * from s").unwrap_err();
        assert!(matches!(err, QueryError::ForbiddenStatement { token } if token == "UNION"));
    }

    #[test]
    fn keywords_only_match_whole_words() {
        // "updated_at" contains UPDATE as a substring but not as a word.
        assert!(sanitize_statement("SELECT updated_at FROM users").is_ok());
    }

    #[test]
    fn comment_tokens_are_rejected() {
        let err = sanitize_statement("SELECT * FROM users -- comment").unwrap_err();
        assert!(matches!(err, QueryError::ForbiddenStatement { token } if token == "--"));

        assert!(sanitize_statement("SELECT * FROM users /* hidden */").is_err());
        assert!(sanitize_statement("SELECT * FROM users # note").is_err());
    }
}
