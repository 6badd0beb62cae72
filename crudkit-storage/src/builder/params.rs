//! Binding filter: keep only parameters the final SQL actually references.
//!
//! The read path accumulates a binding for every caller-supplied parameter,
//! including filter directives that never become placeholders. Binding a
//! name the statement does not mention is a driver error, so the list is
//! narrowed against the rendered text before execution.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crudkit_core::types::statement::ParamBinding;

static PLACEHOLDERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([A-Za-z0-9_]+)").unwrap());

/// Drop every binding whose `:name` does not appear in `sql`.
pub fn filter_bindings(sql: &str, bindings: Vec<ParamBinding>) -> Vec<ParamBinding> {
    let referenced: HashSet<&str> = PLACEHOLDERS
        .captures_iter(sql)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();

    bindings
        .into_iter()
        .filter(|b| referenced.contains(b.column.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crudkit_core::types::value::CoercedValue;

    #[test]
    fn keeps_only_referenced_bindings() {
        let bindings = vec![
            ParamBinding::new("id", CoercedValue::Int(1)),
            ParamBinding::new("name", CoercedValue::Text("x".to_string())),
        ];
        let kept = filter_bindings("SELECT * FROM t WHERE t.id = :id", bindings);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].column, "id");
    }

    #[test]
    fn empty_when_nothing_is_referenced() {
        let bindings = vec![ParamBinding::new("limit", CoercedValue::Int(10))];
        assert!(filter_bindings("SELECT * FROM t", bindings).is_empty());
    }
}
