//! Primary-table resolution from a SQL template.
//!
//! String surgery by design: the read path needs the main table's name to
//! qualify filter columns, and the template is the only source. The
//! heuristic lives behind a trait so it can be swapped for a real tokenizer
//! without touching the builder.

use std::sync::LazyLock;

use regex::Regex;

/// Resolves the primary table of a read template.
pub trait TableResolver: Send + Sync {
    /// The identifier after the first `FROM` that is not inside a
    /// parenthesized subquery, if any.
    fn primary_table(&self, sql: &str) -> Option<String>;
}

/// Regex-based resolver: masks out parenthesized subqueries, then scans for
/// the first `FROM <identifier>`.
pub struct HeuristicTableResolver;

/// A parenthesized `( ... SELECT ... FROM ... )` group with no nested parens.
static SUBQUERY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\([^()]*SELECT[^()]*FROM[^()]*\)").unwrap());

static FROM_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bFROM\b\s+([A-Za-z0-9_]+)").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

impl TableResolver for HeuristicTableResolver {
    fn primary_table(&self, sql: &str) -> Option<String> {
        let flattened = WHITESPACE
            .replace_all(&sql.replace(['\n', '\t', '\r'], " "), " ")
            .into_owned();

        // Mask innermost subqueries until none remain, so the scan below
        // only sees the outer query.
        let mut masked = flattened.clone();
        while SUBQUERY.is_match(&masked) {
            masked = SUBQUERY.replace_all(&masked, " __subquery__ ").into_owned();
        }

        FROM_TABLE
            .captures(&masked)
            .or_else(|| FROM_TABLE.captures(&flattened))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }
}

/// True when the statement has a `WHERE` belonging to the outer query —
/// i.e. one that appears outside all parentheses.
pub(crate) fn has_top_level_where(sql: &str) -> bool {
    let upper = sql.to_ascii_uppercase();
    let Some(position) = upper.find("WHERE") else {
        return false;
    };
    let mut depth = 0i32;
    for (i, c) in upper.char_indices() {
        if i >= position {
            break;
        }
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    depth == 0
}
